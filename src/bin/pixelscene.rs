use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pixelscene", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one screen of a project as a PNG.
    Frame(FrameArgs),
    /// Render every screen of a project into a directory.
    Screens(ScreensArgs),
    /// Render a text specimen of a BDF font.
    Specimen(SpecimenArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Screen id; defaults to the screen the project was saved on.
    #[arg(long)]
    screen: Option<u32>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Foreground color as `#RRGGBB`.
    #[arg(long, default_value = "#FFFFFF")]
    color: String,
}

#[derive(Parser, Debug)]
struct ScreensArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; one `screen-<id>.png` per screen.
    #[arg(long)]
    out_dir: PathBuf,

    /// Foreground color as `#RRGGBB`.
    #[arg(long, default_value = "#FFFFFF")]
    color: String,
}

#[derive(Parser, Debug)]
struct SpecimenArgs {
    /// BDF font file.
    #[arg(long)]
    bdf: PathBuf,

    /// Text to render; unknown characters fall back to a specimen of the font.
    #[arg(long, default_value = "The quick brown fox")]
    text: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Screens(args) => cmd_screens(args),
        Command::Specimen(args) => cmd_specimen(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<pixelscene::Project> {
    let json =
        fs::read_to_string(path).with_context(|| format!("open project '{}'", path.display()))?;
    let project = pixelscene::Project::parse(&json).with_context(|| "parse project JSON")?;
    Ok(project)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn session_for(project: &pixelscene::Project, color: &str) -> anyhow::Result<pixelscene::Session> {
    let foreground =
        pixelscene::Rgba8::from_hex(color).with_context(|| format!("parse color '{color}'"))?;
    let opts = pixelscene::SessionOpts {
        foreground,
        ..pixelscene::SessionOpts::default()
    };
    let mut session = pixelscene::Session::new(opts);
    session.load_project(project)?;
    Ok(session)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut session = session_for(&project, &args.color)?;
    if let Some(id) = args.screen {
        session
            .set_active_screen(id)
            .with_context(|| format!("select screen {id}"))?;
    }
    let frame = session.render()?;

    ensure_parent(&args.out)?;
    frame
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_screens(args: ScreensArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let session = session_for(&project, &args.color)?;
    let frames = project.render_screens(session.compositor(), session.fonts(), session.registry())?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (id, frame) in frames {
        let out = args.out_dir.join(format!("screen-{id}.png"));
        frame
            .save_png(&out)
            .with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_specimen(args: SpecimenArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.bdf)
        .with_context(|| format!("open font '{}'", args.bdf.display()))?;
    let font = pixelscene::font::decode_bdf(&text)
        .with_context(|| format!("decode font '{}'", args.bdf.display()))?;
    let buf = pixelscene::font::render_specimen(&font, &args.text, pixelscene::Rgba8::WHITE)
        .with_context(|| format!("font '{}' has no drawable glyphs", font.name()))?;
    let frame = pixelscene::Frame::from_buffer(buf).on_background([0, 0, 0]);

    ensure_parent(&args.out)?;
    frame
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
