use base64ct::{Base64, Encoding};

use crate::foundation::error::SceneResult;
use crate::history::change::ChangeHistory;
use crate::render::frame::{Frame, FrameFingerprint};
use crate::scene::state::{LayerRegistry, LayerState};
use crate::scene::tree::{SceneTree, Slot};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A named scene with its own undo history and cached thumbnail.
#[derive(Clone, Debug)]
pub struct Screen {
    pub id: u32,
    pub name: String,
    tree: SceneTree,
    history: ChangeHistory,
    preview: String,
    preview_fingerprint: Option<FrameFingerprint>,
}

impl Screen {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tree: SceneTree::new(),
            history: ChangeHistory::new(),
            preview: String::new(),
            preview_fingerprint: None,
        }
    }

    /// Rebuild a screen from persisted layer blobs, skipping blobs that cannot be rebuilt.
    pub fn from_states(
        id: u32,
        name: impl Into<String>,
        layers: &[LayerState],
        registry: &LayerRegistry,
    ) -> Self {
        let mut screen = Self::new(id, name);
        for state in layers {
            let at = screen.tree.roots().len();
            if let Err(e) = screen
                .tree
                .rehydrate(state, registry, Slot { parent: None, at })
            {
                tracing::warn!(screen = id, tag = %state.tag, uid = %state.uid, error = %e, "skipping layer");
            }
        }
        screen
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    pub fn history(&self) -> &ChangeHistory {
        &self.history
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut SceneTree, &mut ChangeHistory) {
        (&mut self.tree, &mut self.history)
    }

    /// Persisted blobs of the top-level layers.
    pub fn layers(&self) -> Vec<LayerState> {
        self.tree.states()
    }

    /// Thumbnail as a PNG data URI; empty until one has been generated.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub(crate) fn set_preview_uri(&mut self, uri: impl Into<String>) {
        self.preview = uri.into();
        self.preview_fingerprint = None;
    }

    /// Store `frame` as the thumbnail. Returns `false` when it matches the current one.
    pub(crate) fn update_preview(&mut self, frame: &Frame) -> SceneResult<bool> {
        let fp = frame.fingerprint();
        if self.preview_fingerprint == Some(fp) {
            return Ok(false);
        }
        let png = frame.to_png()?;
        self.preview = format!("{PNG_DATA_URI_PREFIX}{}", Base64::encode_string(&png));
        self.preview_fingerprint = Some(fp);
        Ok(true)
    }
}

/// Decode the PNG bytes of a preview data URI.
pub fn decode_preview_uri(uri: &str) -> Option<Vec<u8>> {
    let b64 = uri.strip_prefix(PNG_DATA_URI_PREFIX)?;
    Base64::decode_vec(b64).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/session/screen.rs"]
mod tests;
