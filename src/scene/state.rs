use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::foundation::core::{Point, Size};
use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::kind::LayerKind;
use crate::scene::layer::{Layer, LayerId, Modifiers};

fn yes() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Serialized layer blob: enough to rebuild the layer from scratch.
///
/// Shared fields use short keys; variant fields are flattened next to them. Groups carry their
/// children's blobs under `ch`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerState {
    #[serde(rename = "t")]
    pub tag: String,
    pub uid: LayerId,
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(rename = "v", default = "yes")]
    pub visible: bool,
    #[serde(rename = "l", default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(rename = "inv", default, skip_serializing_if = "is_false")]
    pub inverted: bool,
    #[serde(rename = "ov", default, skip_serializing_if = "is_false")]
    pub overlay: bool,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl LayerState {
    /// Shared fields and variant properties of `layer`, without group children.
    pub fn of(layer: &Layer) -> Self {
        Self {
            tag: layer.tag().to_string(),
            uid: layer.uid(),
            name: layer.name.clone(),
            index: layer.index,
            visible: layer.visible,
            locked: layer.locked,
            inverted: layer.inverted,
            overlay: layer.modifiers.overlay,
            props: layer.kind.props(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.tag == "group"
    }

    /// Child blobs of a group, in paint order. Malformed entries are reported as errors.
    pub fn children(&self) -> SceneResult<Vec<LayerState>> {
        match self.props.get("ch") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| SceneError::structural(format!("group {} children: {e}", self.uid))),
        }
    }

    /// Child blobs that parse; others are skipped with a warning.
    pub(crate) fn children_lenient(&self) -> Vec<LayerState> {
        let Some(Value::Array(items)) = self.props.get("ch") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|v| match serde_json::from_value::<LayerState>(v.clone()) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(group = %self.uid, error = %e, "skipping malformed child blob");
                    None
                }
            })
            .collect()
    }

    pub(crate) fn set_children(&mut self, children: Vec<LayerState>) {
        let arr = children
            .into_iter()
            .filter_map(|c| serde_json::to_value(c).ok())
            .collect();
        self.props.insert("ch".to_string(), Value::Array(arr));
    }

    /// Copy with the `ch` entry emptied; used when a group's members are tracked separately.
    pub fn without_children(&self) -> Self {
        let mut out = self.clone();
        if out.is_group() {
            out.set_children(Vec::new());
        }
        out
    }

    /// This blob and every nested child blob, depth first.
    pub fn flatten(&self) -> Vec<LayerState> {
        let mut out = vec![self.clone()];
        for c in self.children_lenient() {
            out.extend(c.flatten());
        }
        out
    }
}

fn prop<T: DeserializeOwned>(props: &Map<String, Value>, key: &str) -> SceneResult<T> {
    let v = props
        .get(key)
        .ok_or_else(|| SceneError::structural(format!("layer blob is missing '{key}'")))?;
    serde_json::from_value(v.clone())
        .map_err(|e| SceneError::structural(format!("layer blob field '{key}': {e}")))
}

fn prop_or<T: DeserializeOwned>(props: &Map<String, Value>, key: &str, default: T) -> SceneResult<T> {
    if props.contains_key(key) {
        prop(props, key)
    } else {
        Ok(default)
    }
}

/// Builds the variant payload for one tag.
pub type LayerCtor = fn(&Map<String, Value>) -> SceneResult<LayerKind>;

fn rectangle(p: &Map<String, Value>, fill: bool) -> SceneResult<LayerKind> {
    Ok(LayerKind::Rectangle {
        pos: prop(p, "p")?,
        size: prop_or(p, "s", Size::new(1, 1))?,
        fill: prop_or(p, "f", fill)?,
    })
}

fn frame_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    rectangle(p, false)
}

fn box_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    rectangle(p, true)
}

fn circle(p: &Map<String, Value>, fill: bool) -> SceneResult<LayerKind> {
    Ok(LayerKind::Circle {
        center: prop(p, "c")?,
        radius: prop_or(p, "r", 0)?,
        fill: prop_or(p, "f", fill)?,
    })
}

fn circle_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    circle(p, false)
}

fn disc_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    circle(p, true)
}

fn ellipse_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Ellipse {
        center: prop(p, "c")?,
        rx: prop_or(p, "rx", 0)?,
        ry: prop_or(p, "ry", 0)?,
        fill: prop_or(p, "f", false)?,
    })
}

fn line_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Line {
        p1: prop(p, "p1")?,
        p2: prop(p, "p2")?,
    })
}

fn text_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Text {
        pos: prop(p, "p")?,
        text: prop_or(p, "txt", String::new())?,
        font: prop_or(p, "f", String::new())?,
        scale: prop_or(p, "s", 1)?,
    })
}

fn icon_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Icon {
        pos: prop_or(p, "p", Point::default())?,
        name: prop_or(p, "nm", String::new())?,
        bitmap: prop(p, "bmp")?,
    })
}

fn paint_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Paint {
        pos: prop_or(p, "p", Point::default())?,
        bitmap: prop(p, "bmp")?,
    })
}

fn group_ctor(p: &Map<String, Value>) -> SceneResult<LayerKind> {
    Ok(LayerKind::Group {
        children: Vec::new(),
        expanded: prop_or(p, "ex", true)?,
    })
}

/// Tag → constructor table used when rebuilding layers from blobs.
#[derive(Clone, Debug)]
pub struct LayerRegistry {
    ctors: HashMap<String, LayerCtor>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let mut r = Self::empty();
        r.register("rect", frame_ctor);
        r.register("frame", frame_ctor);
        r.register("box", box_ctor);
        r.register("circle", circle_ctor);
        r.register("disc", disc_ctor);
        r.register("ellipse", ellipse_ctor);
        r.register("line", line_ctor);
        r.register("string", text_ctor);
        r.register("icon", icon_ctor);
        r.register("paint", paint_ctor);
        r.register("group", group_ctor);
        r
    }
}

impl LayerRegistry {
    pub fn empty() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, ctor: LayerCtor) {
        self.ctors.insert(tag.into(), ctor);
    }

    pub fn unregister(&mut self, tag: &str) -> bool {
        self.ctors.remove(tag).is_some()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.ctors.contains_key(tag)
    }

    /// Variant payload for `state`. Group children are not attached.
    ///
    /// Payloads whose geometry exceeds the coordinate limit are rejected like malformed ones.
    pub fn kind(&self, state: &LayerState) -> SceneResult<LayerKind> {
        let ctor = self.ctors.get(&state.tag).ok_or_else(|| {
            SceneError::structural(format!("unknown layer kind '{}'", state.tag))
        })?;
        let kind = ctor(&state.props)?;
        kind.check_extent()?;
        Ok(kind)
    }

    /// A detached layer built from `state`; group children are left empty.
    pub fn build(&self, state: &LayerState) -> SceneResult<Layer> {
        let mut layer = Layer::new(state.uid, self.kind(state)?);
        apply_common(&mut layer, state);
        Ok(layer)
    }
}

/// Copy the shared persisted fields of `state` onto `layer`.
pub(crate) fn apply_common(layer: &mut Layer, state: &LayerState) {
    layer.name = state.name.clone();
    layer.index = state.index;
    layer.visible = state.visible;
    layer.locked = state.locked;
    layer.inverted = state.inverted;
    layer.modifiers = Modifiers {
        overlay: state.overlay,
    };
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
