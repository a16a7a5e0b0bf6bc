//! Versioned JSON project container.
//!
//! ```json
//! { "version": "1.0",
//!   "metadata": { "projectName": "...", "created": "...", "modified": "...", "appVersion": "..." },
//!   "session": { "platform": "...", "display": {"x":128,"y":64}, "pixelSize": {"x":1,"y":1},
//!                "scale": {"x":4,"y":4}, "screens": [{"id":1,"name":"...","layers":[...],"preview":""}],
//!                "activeScreenId": 1, "customImages": [], "customFonts": [] } }
//! ```

use rayon::prelude::*;

use crate::font::library::{FontLibrary, PlatformFont};
use crate::foundation::core::{Size, Vec2};
use crate::foundation::error::{SceneError, SceneResult};
use crate::render::compositor::Compositor;
use crate::render::frame::Frame;
use crate::scene::layer::DrawContext;
use crate::scene::state::{LayerRegistry, LayerState};
use crate::session::editor::{Session, SessionOpts};
use crate::session::screen::Screen;

/// The only container version this crate reads and writes.
pub const PROJECT_VERSION: &str = "1.0";

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Xy<T> {
    pub x: T,
    pub y: T,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMeta {
    pub project_name: String,
    /// RFC 3339 timestamps supplied by the caller.
    pub created: String,
    pub modified: String,
    pub app_version: String,
}

impl ProjectMeta {
    /// Metadata for a project saved for the first time at `created`.
    pub fn new(project_name: impl Into<String>, created: impl Into<String>) -> Self {
        let created = created.into();
        Self {
            project_name: project_name.into(),
            modified: created.clone(),
            created,
            app_version: concat!("pixelscene-", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectScreen {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub layers: Vec<LayerState>,
    #[serde(default)]
    pub preview: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSession {
    #[serde(default)]
    pub platform: Option<String>,
    pub display: Xy<u32>,
    pub pixel_size: Xy<u32>,
    pub scale: Xy<f64>,
    pub screens: Vec<ProjectScreen>,
    #[serde(default)]
    pub active_screen_id: Option<u32>,
    #[serde(default)]
    pub custom_images: Vec<serde_json::Value>,
    #[serde(default)]
    pub custom_fonts: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    pub version: String,
    #[serde(default)]
    pub metadata: ProjectMeta,
    pub session: ProjectSession,
}

impl Project {
    /// Snapshot of every screen of `session`.
    pub fn from_session(session: &Session, metadata: ProjectMeta) -> Self {
        let opts = session.opts();
        Self {
            version: PROJECT_VERSION.to_string(),
            metadata,
            session: ProjectSession {
                platform: opts.platform.clone(),
                display: Xy {
                    x: opts.display.w,
                    y: opts.display.h,
                },
                pixel_size: Xy {
                    x: opts.pixel_size.w,
                    y: opts.pixel_size.h,
                },
                scale: Xy {
                    x: opts.scale.x,
                    y: opts.scale.y,
                },
                screens: session
                    .screens()
                    .iter()
                    .map(|s| ProjectScreen {
                        id: s.id,
                        name: s.name.clone(),
                        layers: s.layers(),
                        preview: s.preview().to_string(),
                    })
                    .collect(),
                active_screen_id: Some(session.active_screen_id()),
                custom_images: session.custom_images().to_vec(),
                custom_fonts: session.custom_fonts().to_vec(),
            },
        }
    }

    /// Parse a container, rejecting a missing or unknown version before anything else.
    #[tracing::instrument(skip(json), fields(bytes = json.len()))]
    pub fn parse(json: &str) -> SceneResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| SceneError::import(format!("invalid project json: {e}")))?;
        match value.get("version") {
            Some(serde_json::Value::String(v)) if v == PROJECT_VERSION => {}
            Some(v) => {
                return Err(SceneError::import(format!(
                    "unsupported project version {v}"
                )));
            }
            None => return Err(SceneError::import("project version is missing")),
        }
        let project: Project = serde_json::from_value(value)
            .map_err(|e| SceneError::import(format!("malformed project: {e}")))?;
        project.validate()?;
        Ok(project)
    }

    fn validate(&self) -> SceneResult<()> {
        let s = &self.session;
        if s.display.x == 0 || s.display.y == 0 {
            return Err(SceneError::import(format!(
                "display must be non-empty, got {}x{}",
                s.display.x, s.display.y
            )));
        }
        if s.pixel_size.x == 0 || s.pixel_size.y == 0 {
            return Err(SceneError::import("pixel size must be at least 1x1"));
        }
        if !(s.scale.x.is_finite() && s.scale.y.is_finite() && s.scale.x > 0.0 && s.scale.y > 0.0)
        {
            return Err(SceneError::import("scale must be positive"));
        }
        let mut ids: Vec<u32> = s.screens.iter().map(|sc| sc.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(SceneError::import("duplicate screen id"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::serde(e.to_string()))
    }

    pub fn display(&self) -> Size {
        Size::new(self.session.display.x, self.session.display.y)
    }

    /// Session settings carried by the container; the rest comes from `base`.
    pub fn opts(&self, base: &SessionOpts) -> SessionOpts {
        let s = &self.session;
        SessionOpts {
            display: self.display(),
            scale: Vec2::new(s.scale.x, s.scale.y),
            pixel_size: Size::new(s.pixel_size.x, s.pixel_size.y),
            platform: s.platform.clone(),
            ..base.clone()
        }
    }

    /// Screen the project was saved on, falling back to the first one.
    pub fn active_screen_id(&self) -> Option<u32> {
        let screens = &self.session.screens;
        self.session
            .active_screen_id
            .filter(|id| screens.iter().any(|s| s.id == *id))
            .or_else(|| screens.first().map(|s| s.id))
    }

    /// Catalog records of the custom fonts that parse; the rest are skipped.
    pub fn custom_fonts(&self) -> Vec<PlatformFont> {
        self.session
            .custom_fonts
            .iter()
            .filter_map(|v| match serde_json::from_value::<PlatformFont>(v.clone()) {
                Ok(f) => Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable custom font");
                    None
                }
            })
            .collect()
    }

    /// Render every screen independently, in parallel, in screen order.
    pub fn render_screens(
        &self,
        compositor: &Compositor,
        fonts: &FontLibrary,
        registry: &LayerRegistry,
    ) -> SceneResult<Vec<(u32, Frame)>> {
        let display = self.display();
        let scale = Vec2::new(self.session.scale.x, self.session.scale.y);
        self.session
            .screens
            .par_iter()
            .map(|ps| {
                let mut screen = Screen::from_states(ps.id, ps.name.clone(), &ps.layers, registry);
                let tree = screen.tree_mut();
                tree.resize_all(display, scale);
                tree.draw_all(&DrawContext { fonts })?;
                let frame = compositor.render(tree, display)?;
                Ok((ps.id, frame))
            })
            .collect()
    }
}

impl Session {
    /// Serialize every screen plus the persisted settings. Pending thumbnails are generated
    /// first so the container carries current previews.
    pub fn export_project(&mut self, metadata: ProjectMeta) -> SceneResult<String> {
        self.flush_previews()?;
        Project::from_session(self, metadata).to_json()
    }

    /// Replace the session contents with a parsed container.
    ///
    /// Unknown layer kinds and unreadable custom fonts are skipped and logged. Any other
    /// failure leaves the session untouched.
    #[tracing::instrument(skip(self, json))]
    pub fn import_project(&mut self, json: &str) -> SceneResult<()> {
        let project = Project::parse(json)?;
        self.load_project(&project)
    }

    pub fn load_project(&mut self, project: &Project) -> SceneResult<()> {
        let opts = project.opts(self.opts());
        let mut fonts = self.fonts().clone();
        for font in project.custom_fonts() {
            if let Err(e) = fonts.load(&font) {
                tracing::warn!(font = %font.name, error = %e, "skipping custom font");
            }
        }
        let screens: Vec<Screen> = project
            .session
            .screens
            .iter()
            .map(|ps| {
                let mut screen = Screen::from_states(ps.id, ps.name.clone(), &ps.layers, self.registry());
                screen.set_preview_uri(ps.preview.clone());
                screen
            })
            .collect();
        let active = project.active_screen_id().unwrap_or(1);
        self.replace_screens(
            opts,
            screens,
            active,
            fonts,
            project.session.custom_images.clone(),
            project.session.custom_fonts.clone(),
        )?;
        tracing::debug!(
            screens = project.session.screens.len(),
            active,
            "imported project"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/project.rs"]
mod tests;
