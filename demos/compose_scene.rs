use std::path::Path;

use pixelscene::font::{ColumnarFontSpec, FontSource, PlatformFont};
use pixelscene::{LayerKind, Point, ProjectMeta, Session, SessionOpts, Size};

/// 3x5 digits, one column per byte with the top row in bit 0.
fn digits() -> PlatformFont {
    let data = vec![
        vec![0x1F, 0x11, 0x1F],
        vec![0x12, 0x1F, 0x10],
        vec![0x1D, 0x15, 0x17],
        vec![0x15, 0x15, 0x1F],
        vec![0x07, 0x04, 0x1F],
        vec![0x17, 0x15, 0x1D],
        vec![0x1F, 0x15, 0x1D],
        vec![0x01, 0x01, 0x1F],
        vec![0x1F, 0x15, 0x1F],
        vec![0x17, 0x15, 0x1F],
    ];
    PlatformFont {
        name: "digits3x5".to_string(),
        title: "Digits 3x5".to_string(),
        source: FontSource::Columnar(ColumnarFontSpec {
            data,
            char_height: 5,
            char_width: 3,
            first_char: u32::from(b'0'),
            name: "digits3x5".to_string(),
            char_count: None,
        }),
        options: None,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut session = Session::new(SessionOpts {
        display: Size::new(64, 32),
        ..SessionOpts::default()
    });
    session.load_font(&digits())?;

    let frame = session.create_layer(LayerKind::Rectangle {
        pos: Point::new(0, 0),
        size: Size::new(64, 32),
        fill: false,
    });
    session.add_layer(frame)?;

    let group = session.create_layer(LayerKind::group());
    let group = session.add_layer(group)?;
    session.select_layer(group, false)?;

    let clock = session.create_layer(LayerKind::Text {
        pos: Point::new(4, 12),
        text: "1234".to_string(),
        font: "digits3x5".to_string(),
        scale: 2,
    });
    session.add_layer(clock)?;
    let dot = session.create_layer(LayerKind::Circle {
        center: Point::new(50, 16),
        radius: 6,
        fill: true,
    });
    let dot = session.add_layer(dot)?;
    session.update_layer(dot, |l| l.inverted = true)?;

    let out_dir = Path::new("target/demos");
    std::fs::create_dir_all(out_dir)?;
    let out = out_dir.join("compose_scene.png");
    session.render()?.scaled(4, 4).save_png(&out)?;
    eprintln!("wrote {}", out.display());

    let project = session.export_project(ProjectMeta::new("compose_scene", "2026-01-01T00:00:00Z"))?;
    let json_out = out_dir.join("compose_scene.json");
    std::fs::write(&json_out, project)?;
    eprintln!("wrote {}", json_out.display());
    Ok(())
}
