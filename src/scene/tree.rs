use std::collections::{HashMap, HashSet};

use crate::font::library::FontLibrary;
use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::foundation::error::{SceneError, SceneResult};
use crate::raster::buffer::PixelBuffer;
use crate::raster::composite::BlendOp;
use crate::scene::kind::LayerKind;
use crate::scene::layer::{DrawContext, Layer, LayerId};
use crate::scene::state::{LayerRegistry, LayerState, apply_common};

/// Position of a layer within its sibling list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Owning group, or `None` for the top-level list.
    pub parent: Option<LayerId>,
    pub at: usize,
}

impl Slot {
    pub const FRONT: Slot = Slot {
        parent: None,
        at: 0,
    };

    pub fn front_of(parent: Option<LayerId>) -> Self {
        Self { parent, at: 0 }
    }
}

/// Arena of layers for one screen.
///
/// Every layer lives in one flat table; the top-level list and each group's child list hold ids
/// only. An id appears in exactly one sibling list.
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    layers: HashMap<LayerId, Layer>,
    roots: Vec<LayerId>,
    next_uid: u64,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh identity, never handed out before by this tree.
    pub fn alloc_id(&mut self) -> LayerId {
        self.next_uid += 1;
        LayerId(self.next_uid)
    }

    fn reserve_id(&mut self, id: LayerId) {
        self.next_uid = self.next_uid.max(id.0);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    /// Alias of [`SceneTree::get`] named after the lookup it performs.
    pub fn find(&self, id: LayerId) -> Option<&Layer> {
        self.get(id)
    }

    pub fn roots(&self) -> &[LayerId] {
        &self.roots
    }

    pub fn children(&self, id: LayerId) -> &[LayerId] {
        self.layers.get(&id).map_or(&[], Layer::children)
    }

    fn siblings(&self, parent: Option<LayerId>) -> Option<&Vec<LayerId>> {
        match parent {
            None => Some(&self.roots),
            Some(p) => match &self.layers.get(&p)?.kind {
                LayerKind::Group { children, .. } => Some(children),
                _ => None,
            },
        }
    }

    fn siblings_mut(&mut self, parent: Option<LayerId>) -> Option<&mut Vec<LayerId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.layers.get_mut(&p)?.children_mut(),
        }
    }

    /// Depth-first, top-level first, each group followed by its children.
    pub fn all_layers(&self) -> Vec<LayerId> {
        let mut out = Vec::with_capacity(self.layers.len());
        let mut stack: Vec<LayerId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn selected(&self) -> Vec<LayerId> {
        self.all_layers()
            .into_iter()
            .filter(|id| self.layers.get(id).is_some_and(|l| l.selected))
            .collect()
    }

    pub fn slot_of(&self, id: LayerId) -> Option<Slot> {
        if let Some(at) = self.roots.iter().position(|c| *c == id) {
            return Some(Slot { parent: None, at });
        }
        self.layers.values().find_map(|l| {
            let at = l.children().iter().position(|c| *c == id)?;
            Some(Slot {
                parent: Some(l.uid()),
                at,
            })
        })
    }

    /// Owning group, or `None` for top-level and unknown layers.
    pub fn parent_of(&self, id: LayerId) -> Option<LayerId> {
        self.slot_of(id).and_then(|s| s.parent)
    }

    /// Owning groups from the direct parent up to the top level.
    pub fn ancestors(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut cur = self.parent_of(id);
        while let Some(p) = cur {
            if out.contains(&p) {
                break;
            }
            out.push(p);
            cur = self.parent_of(p);
        }
        out
    }

    /// Whether `ancestor` is `id` itself or one of the groups containing it.
    pub fn is_ancestor(&self, ancestor: LayerId, id: LayerId) -> bool {
        ancestor == id || self.ancestors(id).contains(&ancestor)
    }

    /// A layer is shown only when it and every group above it are visible.
    pub fn effective_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|l| l.visible)
            && self
                .ancestors(id)
                .iter()
                .all(|a| self.layers.get(a).is_some_and(|l| l.visible))
    }

    /// Largest paint index in use plus one.
    pub fn next_index(&self) -> u32 {
        self.layers
            .values()
            .filter_map(|l| l.index)
            .max()
            .map_or(1, |m| m.saturating_add(1))
    }

    /// Add a detached layer to the table and link it at `slot`.
    pub fn insert(&mut self, layer: Layer, slot: Slot) -> SceneResult<LayerId> {
        let id = layer.uid();
        if self.layers.contains_key(&id) {
            return Err(SceneError::structural(format!("layer {id} is already in the tree")));
        }
        if self.siblings(slot.parent).is_none() {
            return Err(SceneError::structural(format!(
                "cannot insert {id}: parent {:?} is not a group in this tree",
                slot.parent
            )));
        }
        self.reserve_id(id);
        for c in layer.children() {
            self.reserve_id(*c);
        }
        self.layers.insert(id, layer);
        self.link(id, slot);
        Ok(id)
    }

    /// Insert at the front of `parent`'s children, or of the top-level list.
    pub fn insert_front(&mut self, layer: Layer, parent: Option<LayerId>) -> SceneResult<LayerId> {
        self.insert(layer, Slot::front_of(parent))
    }

    fn link(&mut self, id: LayerId, slot: Slot) {
        if let Some(list) = self.siblings_mut(slot.parent) {
            let at = slot.at.min(list.len());
            list.insert(at, id);
        }
        self.dedup_indices(slot.parent);
    }

    /// Unlink `id` from its sibling list without dropping it; returns where it was.
    pub fn detach(&mut self, id: LayerId) -> Option<Slot> {
        let slot = self.slot_of(id)?;
        let list = self.siblings_mut(slot.parent)?;
        list.remove(slot.at);
        Some(slot)
    }

    /// Link an already stored, detached layer at `slot`, refusing to create cycles.
    pub fn attach(&mut self, id: LayerId, slot: Slot) -> SceneResult<()> {
        if !self.layers.contains_key(&id) {
            return Err(SceneError::structural(format!("layer {id} is not in the tree")));
        }
        if self.slot_of(id).is_some() {
            return Err(SceneError::structural(format!("layer {id} is already linked")));
        }
        if let Some(p) = slot.parent {
            if self.is_ancestor(id, p) || self.is_descendant_of_detached(p, id) {
                return Err(SceneError::structural(format!(
                    "moving {id} under {p} would create a cycle"
                )));
            }
            if !self.layers.get(&p).is_some_and(Layer::is_group) {
                return Err(SceneError::structural(format!("{p} is not a group")));
            }
        }
        self.link(id, slot);
        Ok(())
    }

    /// Whether `id` sits somewhere in the subtree owned by `root` (which may be unlinked).
    fn is_descendant_of_detached(&self, id: LayerId, root: LayerId) -> bool {
        self.subtree(root).contains(&id)
    }

    /// `root` and every layer below it, depth first.
    pub fn subtree(&self, root: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.layers.contains_key(&id) || !seen.insert(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Move `id` (with its subtree) to `slot`; cycles are rejected and nothing changes.
    pub fn move_to(&mut self, id: LayerId, slot: Slot) -> SceneResult<()> {
        if let Some(p) = slot.parent
            && self.is_ancestor(id, p)
        {
            return Err(SceneError::structural(format!(
                "moving {id} under {p} would create a cycle"
            )));
        }
        let old = self.detach(id);
        if let Err(e) = self.attach(id, slot) {
            if let Some(old) = old {
                self.link(id, old);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Unlink `id` and drop it along with its subtree. Returns whether anything was removed.
    pub fn remove(&mut self, id: LayerId) -> bool {
        if self.detach(id).is_none() {
            return false;
        }
        for d in self.subtree(id) {
            self.layers.remove(&d);
        }
        true
    }

    /// Unlink and drop a group, leaving its children stored but detached.
    pub(crate) fn dissolve(&mut self, group: LayerId) -> Option<(Slot, Vec<LayerId>)> {
        let slot = self.detach(group)?;
        let layer = self.layers.remove(&group)?;
        Some((slot, layer.children().to_vec()))
    }

    /// Drop everything; returns the top-level blobs in list order.
    pub fn clear(&mut self) -> Vec<LayerState> {
        let states = self.states();
        self.layers.clear();
        self.roots.clear();
        states
    }

    /// Give siblings under `parent` distinct paint indices, keeping the first holder of each.
    fn dedup_indices(&mut self, parent: Option<LayerId>) {
        let Some(list) = self.siblings(parent).cloned() else {
            return;
        };
        let mut seen = HashSet::new();
        let mut next = self.next_index();
        // Later list entries are older; they keep their index.
        for id in list.iter().rev() {
            let Some(layer) = self.layers.get_mut(id) else {
                continue;
            };
            if let Some(i) = layer.index
                && !seen.insert(i)
            {
                layer.index = Some(next);
                seen.insert(next);
                next = next.saturating_add(1);
            }
        }
    }

    /// Blob of `id` including nested children.
    pub fn state_of(&self, id: LayerId) -> Option<LayerState> {
        let layer = self.layers.get(&id)?;
        let mut state = LayerState::of(layer);
        if layer.is_group() {
            let children = layer
                .children()
                .iter()
                .filter_map(|c| self.state_of(*c))
                .collect();
            state.set_children(children);
        }
        Some(state)
    }

    /// Blobs of the top-level layers, in list order.
    pub fn states(&self) -> Vec<LayerState> {
        self.roots.iter().filter_map(|id| self.state_of(*id)).collect()
    }

    /// Rebuild a layer (and for groups, its children) from `state` and link it at `slot`.
    ///
    /// An unknown tag on `state` itself is an error; unknown child tags are skipped. A uid that
    /// is already taken is replaced by a fresh one.
    pub fn rehydrate(
        &mut self,
        state: &LayerState,
        registry: &LayerRegistry,
        slot: Slot,
    ) -> SceneResult<LayerId> {
        let mut layer = registry.build(state)?;
        if self.layers.contains_key(&layer.uid()) || layer.uid().0 == 0 {
            let fresh = self.alloc_id();
            tracing::debug!(old = %layer.uid(), new = %fresh, "reassigning colliding layer id");
            layer.set_uid(fresh);
        }
        let id = self.insert(layer, slot)?;
        if state.is_group() {
            for child in state.children_lenient() {
                let at = self.children(id).len();
                let child_slot = Slot {
                    parent: Some(id),
                    at,
                };
                if let Err(e) = self.rehydrate(&child, registry, child_slot) {
                    tracing::warn!(group = %id, tag = %child.tag, error = %e, "skipping child layer");
                }
            }
        }
        Ok(id)
    }

    /// Overwrite the persisted fields of an existing layer. Group membership is kept; children
    /// still in the group also take their nested blob.
    pub fn apply_state(
        &mut self,
        id: LayerId,
        state: &LayerState,
        registry: &LayerRegistry,
    ) -> SceneResult<()> {
        let mut kind = registry.kind(state)?;
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or_else(|| SceneError::structural(format!("layer {id} is not in the tree")))?;
        if kind.is_group() != layer.is_group() {
            return Err(SceneError::structural(format!(
                "cannot turn {} layer {id} into {}",
                layer.tag(),
                state.tag
            )));
        }
        if let (
            LayerKind::Group { children, .. },
            LayerKind::Group {
                children: current, ..
            },
        ) = (&mut kind, &layer.kind)
        {
            *children = current.clone();
        }
        layer.kind = kind;
        apply_common(layer, state);
        // Nested blobs carry the children's geometry; bring along the ones still owned here.
        for child in state.children_lenient() {
            if self.parent_of(child.uid) == Some(id) {
                self.apply_state(child.uid, &child, registry)?;
            }
        }
        Ok(())
    }

    /// Move `id` by `delta`; groups move their whole subtree.
    pub fn translate(&mut self, id: LayerId, delta: Point) {
        for d in self.subtree(id) {
            if let Some(l) = self.layers.get_mut(&d) {
                l.kind.translate(delta);
            }
        }
    }

    /// Shift only the layers below `id`; the layer itself has already moved.
    pub(crate) fn translate_descendants(&mut self, id: LayerId, delta: Point) {
        for d in self.subtree(id).into_iter().skip(1) {
            if let Some(l) = self.layers.get_mut(&d) {
                l.kind.translate(delta);
            }
        }
    }

    /// Display-space bounds; groups cover the union of their children.
    pub fn bounds(&self, id: LayerId, fonts: &FontLibrary) -> Rect {
        let Some(layer) = self.layers.get(&id) else {
            return Rect::default();
        };
        if layer.is_group() {
            return layer
                .children()
                .iter()
                .fold(Rect::default(), |acc, c| acc.union(self.bounds(*c, fonts)));
        }
        layer.bounds(fonts)
    }

    /// Resize every layer's buffer to the display.
    pub fn resize_all(&mut self, display: Size, scale: Vec2) {
        for layer in self.layers.values_mut() {
            layer.resize(display, scale);
        }
    }

    /// Repaint one layer. A group recomposites its visible children in list order.
    pub fn draw_layer(&mut self, id: LayerId, ctx: &DrawContext<'_>) -> SceneResult<()> {
        let Some(layer) = self.layers.get_mut(&id) else {
            return Err(SceneError::structural(format!("layer {id} is not in the tree")));
        };
        if !layer.is_group() {
            layer.draw(ctx);
            return Ok(());
        }

        let mut buf = std::mem::take(layer.buffer_mut());
        buf.clear();
        let children = layer.children().to_vec();
        for c in children {
            let Some(child) = self.layers.get(&c) else {
                continue;
            };
            if !child.visible {
                continue;
            }
            let op = if child.inverted {
                BlendOp::Xor
            } else {
                BlendOp::Over
            };
            if child.buffer().size() == buf.size() {
                buf.draw_buffer(child.buffer(), op, 1.0)?;
            }
        }
        if let Some(layer) = self.layers.get_mut(&id) {
            *layer.buffer_mut() = buf;
        }
        Ok(())
    }

    /// Repaint `id` and then every group above it.
    pub fn refresh(&mut self, id: LayerId, ctx: &DrawContext<'_>) -> SceneResult<()> {
        self.draw_layer(id, ctx)?;
        for a in self.ancestors(id) {
            self.draw_layer(a, ctx)?;
        }
        Ok(())
    }

    /// Repaint `id` with everything below it, children before their group.
    pub fn draw_subtree(&mut self, id: LayerId, ctx: &DrawContext<'_>) -> SceneResult<()> {
        for d in self.subtree(id).into_iter().rev() {
            self.draw_layer(d, ctx)?;
        }
        Ok(())
    }

    /// Repaint every layer, children before their group.
    pub fn draw_all(&mut self, ctx: &DrawContext<'_>) -> SceneResult<()> {
        for id in self.all_layers().into_iter().rev() {
            self.draw_layer(id, ctx)?;
        }
        Ok(())
    }

    /// Current buffer of `id`.
    pub fn buffer_of(&self, id: LayerId) -> Option<&PixelBuffer> {
        self.layers.get(&id).map(Layer::buffer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/tree.rs"]
mod tests;
