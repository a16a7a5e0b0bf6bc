use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::font::glyph::FontPack;
use crate::font::library::{FontLibrary, PlatformFont};
use crate::foundation::core::{Point, Rect, Rgba8, Size, Vec2};
use crate::foundation::error::{SceneError, SceneResult};
use crate::history::change::{Change, ChangeHistory};
use crate::history::replay::{Direction, replay};
use crate::raster::buffer::PixelBuffer;
use crate::raster::composite::BlendOp;
use crate::render::compositor::{Compositor, DEFAULT_OVERLAY_OPACITY};
use crate::render::frame::Frame;
use crate::scene::bitmap::Bitmap;
use crate::scene::kind::LayerKind;
use crate::scene::layer::{DrawContext, EditMode, EditOutcome, Layer, LayerId};
use crate::scene::state::{LayerRegistry, LayerState};
use crate::scene::tree::{SceneTree, Slot};
use crate::session::preview::{Clock, DEFAULT_PREVIEW_DEBOUNCE, PreviewScheduler, SystemClock};
use crate::session::screen::Screen;

/// Editor configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOpts {
    /// Display resolution in device pixels.
    pub display: Size,
    /// View magnification; only hit testing in view coordinates uses it.
    pub scale: Vec2,
    /// Aspect of one device pixel, applied to previews.
    pub pixel_size: Size,
    pub foreground: Rgba8,
    pub overlay_opacity: f32,
    pub preview_debounce: Duration,
    pub platform: Option<String>,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            display: Size::new(128, 64),
            scale: Vec2::new(4.0, 4.0),
            pixel_size: Size::new(1, 1),
            foreground: Rgba8::WHITE,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            preview_debounce: DEFAULT_PREVIEW_DEBOUNCE,
            platform: None,
        }
    }
}

/// Borrowed view of the active screen plus what painting it needs.
struct Parts<'a> {
    tree: &'a mut SceneTree,
    history: &'a mut ChangeHistory,
    registry: &'a LayerRegistry,
    ctx: DrawContext<'a>,
    display: Size,
    scale: Vec2,
}

impl Parts<'_> {
    /// Link `layer` where a new layer belongs and paint it.
    ///
    /// The front of the top-level list, unless exactly one layer is selected and it is an
    /// expanded group, which then receives the layer as its first child.
    fn insert(&mut self, mut layer: Layer, record: bool) -> SceneResult<LayerId> {
        layer.kind.check_extent()?;
        layer.resize(self.display, self.scale);
        if layer.index.is_none() {
            layer.index = Some(self.tree.next_index());
        }
        if layer.name.is_none() {
            layer.name = Some(format!("Layer {}", self.tree.roots().len() + 1));
        }
        if layer.uid().0 == 0 || self.tree.contains(layer.uid()) {
            layer.set_uid(self.tree.alloc_id());
        }

        let parent = match self.tree.selected().as_slice() {
            [only] if self.tree.get(*only).is_some_and(Layer::is_expanded_group) => Some(*only),
            _ => None,
        };
        let id = self.tree.insert_front(layer, parent)?;
        self.repaint(id)?;
        tracing::debug!(uid = %id, parent = ?parent, "added layer");

        if record {
            let state = self.state_of(id)?;
            let slot = self.slot_of(id)?;
            self.history.record(Change::Add { layer: state, slot });
        }
        Ok(id)
    }

    /// Paint `id` with its subtree, then the groups above it.
    fn repaint(&mut self, id: LayerId) -> SceneResult<()> {
        self.tree.draw_subtree(id, &self.ctx)?;
        for a in self.tree.ancestors(id) {
            self.tree.draw_layer(a, &self.ctx)?;
        }
        Ok(())
    }

    fn repaint_all(&mut self) -> SceneResult<()> {
        self.tree.resize_all(self.display, self.scale);
        self.tree.draw_all(&self.ctx)
    }

    fn state_of(&self, id: LayerId) -> SceneResult<LayerState> {
        self.tree
            .state_of(id)
            .ok_or_else(|| SceneError::structural(format!("layer {id} is not in the tree")))
    }

    fn slot_of(&self, id: LayerId) -> SceneResult<Slot> {
        self.tree
            .slot_of(id)
            .ok_or_else(|| SceneError::structural(format!("layer {id} is not linked")))
    }

    fn layer_mut(&mut self, id: LayerId) -> SceneResult<&mut Layer> {
        self.tree
            .get_mut(id)
            .ok_or_else(|| SceneError::structural(format!("layer {id} is not in the tree")))
    }

    fn clear_selection(&mut self) {
        for id in self.tree.all_layers() {
            if let Some(l) = self.tree.get_mut(id) {
                l.selected = false;
            }
        }
    }

    fn select(&mut self, id: LayerId, multi: bool) -> SceneResult<()> {
        if !self.tree.contains(id) {
            return Err(SceneError::structural(format!("layer {id} is not in the tree")));
        }
        if !multi {
            self.clear_selection();
        }
        let layer = self.layer_mut(id)?;
        layer.selected = !multi || !layer.selected;
        Ok(())
    }

    /// Existing ids from `ids`, first occurrence only.
    fn existing(&self, ids: &[LayerId]) -> Vec<LayerId> {
        let mut out: Vec<LayerId> = Vec::with_capacity(ids.len());
        for id in ids {
            if self.tree.contains(*id) && !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }
}

/// The editing session: screens, their scene trees and histories, and the live output.
///
/// Every mutation goes through here so each screen's history observes one consistent sequence.
/// The live frame is recomposited synchronously after each mutation; screen thumbnails are
/// regenerated through the debounced [`PreviewScheduler`].
#[derive(Debug)]
pub struct Session {
    opts: SessionOpts,
    // Never empty; `active` always indexes into it.
    screens: Vec<Screen>,
    active: usize,
    registry: LayerRegistry,
    fonts: FontLibrary,
    compositor: Compositor,
    previews: PreviewScheduler,
    clock: Arc<dyn Clock>,
    last_frame: Option<Frame>,
    editing: Option<(LayerId, LayerState)>,
    custom_images: Vec<serde_json::Value>,
    custom_fonts: Vec<serde_json::Value>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOpts::default())
    }
}

impl Session {
    pub fn new(opts: SessionOpts) -> Self {
        Self::with_fonts(opts, FontLibrary::new())
    }

    pub fn with_fonts(opts: SessionOpts, fonts: FontLibrary) -> Self {
        Self {
            compositor: Compositor::new(opts.foreground, opts.overlay_opacity),
            previews: PreviewScheduler::new(opts.preview_debounce),
            clock: Arc::new(SystemClock),
            screens: vec![Screen::new(1, "Screen 1")],
            active: 0,
            registry: LayerRegistry::default(),
            fonts,
            last_frame: None,
            editing: None,
            custom_images: Vec::new(),
            custom_fonts: Vec::new(),
            opts,
        }
    }

    fn active_parts(&mut self) -> Parts<'_> {
        let (tree, history) = self.screens[self.active].parts_mut();
        Parts {
            tree,
            history,
            registry: &self.registry,
            ctx: DrawContext { fonts: &self.fonts },
            display: self.opts.display,
            scale: self.opts.scale,
        }
    }

    /// Recomposite the live frame and schedule a thumbnail refresh of the active screen.
    fn after_mutation(&mut self) -> SceneResult<()> {
        self.render()?;
        let id = self.active_screen_id();
        self.previews.request(id, self.clock.now());
        Ok(())
    }

    /// Clock that stamps preview requests; [`SystemClock`] unless replaced.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Stamp future preview requests with `clock`, e.g. a
    /// [`ManualClock`](crate::session::preview::ManualClock) for deterministic scheduling.
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Register or replace layer constructors, e.g. for project-specific kinds.
    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Scene tree of the active screen.
    pub fn tree(&self) -> &SceneTree {
        self.active_screen().tree()
    }

    /// Undo history of the active screen.
    pub fn history(&self) -> &ChangeHistory {
        self.active_screen().history()
    }

    pub fn can_undo(&self) -> bool {
        self.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history().can_redo()
    }

    /// Decode `font` once and repaint, so text layers naming it pick it up.
    pub fn load_font(&mut self, font: &PlatformFont) -> SceneResult<Arc<FontPack>> {
        let pack = self.fonts.load(font)?;
        self.active_parts().repaint_all()?;
        self.render()?;
        Ok(pack)
    }

    /// Load a user-supplied font and keep its catalog record for project export.
    pub fn add_custom_font(&mut self, font: &PlatformFont) -> SceneResult<Arc<FontPack>> {
        let value = serde_json::to_value(font).map_err(|e| SceneError::serde(e.to_string()))?;
        let pack = self.load_font(font)?;
        self.custom_fonts.push(value);
        Ok(pack)
    }

    pub fn custom_fonts(&self) -> &[serde_json::Value] {
        &self.custom_fonts
    }

    pub fn custom_images(&self) -> &[serde_json::Value] {
        &self.custom_images
    }

    /// Opaque image records carried through project export.
    pub fn add_custom_image(&mut self, image: serde_json::Value) {
        self.custom_images.push(image);
    }

    // ---- layers -------------------------------------------------------------------------

    /// New detached layer with an identity unused in the active screen.
    pub fn create_layer(&mut self, kind: LayerKind) -> Layer {
        let uid = self.screens[self.active].tree_mut().alloc_id();
        Layer::new(uid, kind)
    }

    /// Insert `layer` into the active screen and record it.
    pub fn add_layer(&mut self, layer: Layer) -> SceneResult<LayerId> {
        let id = self.active_parts().insert(layer, true)?;
        self.after_mutation()?;
        Ok(id)
    }

    /// Remove `id` wherever it is nested. Returns whether anything was removed.
    pub fn remove_layer(&mut self, id: LayerId) -> SceneResult<bool> {
        let mut p = self.active_parts();
        let (Some(state), Some(slot)) = (p.tree.state_of(id), p.tree.slot_of(id)) else {
            return Ok(false);
        };
        p.tree.remove(id);
        if let Some(parent) = slot.parent {
            p.repaint(parent)?;
        }
        p.history.record(Change::Remove { layer: state, slot });
        tracing::debug!(uid = %id, "removed layer");
        self.after_mutation()?;
        Ok(true)
    }

    /// Wrap `ids` in a new group, ordered by paint index, and select the group.
    ///
    /// Returns `None` when none of the ids exist.
    pub fn group_layers(&mut self, ids: &[LayerId]) -> SceneResult<Option<LayerId>> {
        let mut p = self.active_parts();
        let mut members = p.existing(ids);
        if members.is_empty() {
            return Ok(None);
        }
        members.sort_by_key(|id| p.tree.get(*id).and_then(|l| l.index).unwrap_or(0));

        let n = p
            .tree
            .roots()
            .iter()
            .filter(|id| p.tree.get(**id).is_some_and(Layer::is_group))
            .count()
            + 1;

        let mut detached = Vec::with_capacity(members.len());
        let mut former_parents = Vec::new();
        for id in &members {
            p.layer_mut(*id)?.selected = false;
            if let Some(slot) = p.tree.detach(*id) {
                former_parents.extend(slot.parent);
                detached.push((*id, slot));
            }
        }

        let mut group = Layer::new(p.tree.alloc_id(), LayerKind::group());
        group.name = Some(format!("Group {n}"));
        let gid = p.insert(group, false)?;
        for (at, (id, _)) in detached.iter().enumerate() {
            p.tree.attach(*id, Slot { parent: Some(gid), at })?;
        }
        p.repaint(gid)?;
        for parent in former_parents {
            if p.tree.contains(parent) {
                p.repaint(parent)?;
            }
        }

        let group_state = p.state_of(gid)?.without_children();
        let group_slot = p.slot_of(gid)?;
        p.history.record(Change::Group {
            group: group_state,
            group_slot,
            members: detached,
        });
        p.select(gid, false)?;
        tracing::debug!(group = %gid, members = members.len(), "grouped layers");
        self.after_mutation()?;
        Ok(Some(gid))
    }

    /// Dissolve `group`, moving its children to the top level and selecting exactly them.
    ///
    /// Non-groups are left alone and yield an empty list.
    pub fn ungroup_layers(&mut self, group: LayerId) -> SceneResult<Vec<LayerId>> {
        let mut p = self.active_parts();
        if !p.tree.get(group).is_some_and(Layer::is_group) {
            return Ok(Vec::new());
        }
        let group_state = p.state_of(group)?.without_children();
        let (group_slot, children) = p
            .tree
            .dissolve(group)
            .ok_or_else(|| SceneError::structural(format!("group {group} is not linked")))?;
        for c in &children {
            p.tree.attach(*c, Slot::FRONT)?;
        }

        p.clear_selection();
        for c in &children {
            p.layer_mut(*c)?.selected = true;
        }
        if let Some(parent) = group_slot.parent {
            p.repaint(parent)?;
        }
        p.history.record(Change::Ungroup {
            group: group_state,
            group_slot,
            children: children.clone(),
        });
        tracing::debug!(%group, children = children.len(), "ungrouped layers");
        self.after_mutation()?;
        Ok(children)
    }

    /// Flatten `ids` into one paint layer holding their combined ink, then select it.
    ///
    /// Inverted sources are combined with xor, the rest drawn over.
    pub fn merge_layers(&mut self, ids: &[LayerId]) -> SceneResult<Option<LayerId>> {
        let mut p = self.active_parts();
        let sources = p.existing(ids);
        if sources.is_empty() {
            return Ok(None);
        }

        let mut buf = PixelBuffer::with_size(p.display);
        for id in &sources {
            let Some(l) = p.tree.get(*id) else {
                continue;
            };
            if l.buffer().size() != buf.size() {
                continue;
            }
            let op = if l.inverted {
                BlendOp::Xor
            } else {
                BlendOp::Over
            };
            buf.draw_buffer(l.buffer(), op, 1.0)?;
        }

        let mut removed = Vec::with_capacity(sources.len());
        let mut former_parents = Vec::new();
        for id in &sources {
            // A source nested in an earlier source went with it.
            let (Some(state), Some(slot)) = (p.tree.state_of(*id), p.tree.slot_of(*id)) else {
                continue;
            };
            p.tree.remove(*id);
            former_parents.extend(slot.parent);
            removed.push((state, slot));
        }

        let region = buf.ink_bounds().unwrap_or_default();
        let bitmap = Bitmap::from_buffer(&buf, region);
        let merged = Layer::new(
            p.tree.alloc_id(),
            LayerKind::Paint {
                pos: region.pos,
                bitmap,
            },
        );
        p.clear_selection();
        let id = p.insert(merged, false)?;
        for parent in former_parents {
            if p.tree.contains(parent) {
                p.repaint(parent)?;
            }
        }

        let merged_state = p.state_of(id)?;
        let merged_slot = p.slot_of(id)?;
        p.history.record(Change::Merge {
            merged: merged_state,
            merged_slot,
            sources: removed,
        });
        p.select(id, false)?;
        tracing::debug!(uid = %id, sources = sources.len(), "merged layers");
        self.after_mutation()?;
        Ok(Some(id))
    }

    pub fn lock_layer(&mut self, id: LayerId) -> SceneResult<()> {
        let mut p = self.active_parts();
        p.layer_mut(id)?.locked = true;
        p.history.record(Change::Lock { uid: id });
        self.after_mutation()
    }

    pub fn unlock_layer(&mut self, id: LayerId) -> SceneResult<()> {
        let mut p = self.active_parts();
        p.layer_mut(id)?.locked = false;
        p.history.record(Change::Unlock { uid: id });
        self.after_mutation()
    }

    /// Mutate one layer in place and record the before/after blobs.
    ///
    /// `f` may not change whether the layer is a group nor a group's membership; such edits
    /// are rolled back and rejected.
    pub fn update_layer(&mut self, id: LayerId, f: impl FnOnce(&mut Layer)) -> SceneResult<()> {
        let mut p = self.active_parts();
        let (display, scale) = (p.display, p.scale);
        let before = p.state_of(id)?;
        let layer = p.layer_mut(id)?;
        let saved = layer.clone();
        f(layer);
        if layer.is_group() != saved.is_group() || layer.children() != saved.children() {
            *layer = saved;
            return Err(SceneError::structural(format!(
                "layer {id}: kind and group membership cannot change in place"
            )));
        }
        if let Err(e) = layer.kind.check_extent() {
            *layer = saved;
            return Err(e);
        }
        layer.resize(display, scale);
        p.repaint(id)?;
        let after = p.state_of(id)?;
        if after != before {
            p.history.record(Change::Change {
                uid: id,
                before,
                after,
            });
        }
        self.after_mutation()
    }

    /// Start an interactive edit of `id`; the matching [`Session::end_edit`] records it.
    pub fn begin_edit(&mut self, id: LayerId, mode: EditMode, point: Point) -> SceneResult<()> {
        let mut p = self.active_parts();
        let before = p.state_of(id)?;
        p.layer_mut(id)?.start_edit(mode, point);
        if mode == EditMode::Creating {
            p.repaint(id)?;
        }
        self.editing = Some((id, before));
        self.render()?;
        Ok(())
    }

    /// One pointer step of the current edit. Groups drag their descendants along.
    pub fn edit(&mut self, id: LayerId, point: Point) -> SceneResult<EditOutcome> {
        let mut p = self.active_parts();
        let outcome = p.layer_mut(id)?.edit(point);
        if let EditOutcome::Moved(delta) = outcome {
            p.tree.translate_descendants(id, delta);
        }
        if outcome != EditOutcome::Idle {
            p.repaint(id)?;
            self.render()?;
        }
        Ok(outcome)
    }

    pub fn end_edit(&mut self, id: LayerId) -> SceneResult<()> {
        let mut p = self.active_parts();
        p.layer_mut(id)?.stop_edit();
        let after = p.state_of(id)?;
        match self.editing.take() {
            Some((uid, before)) if uid == id && before != after => {
                let mut p = self.active_parts();
                p.history.record(Change::Change {
                    uid: id,
                    before,
                    after,
                });
            }
            Some((uid, before)) if uid != id => self.editing = Some((uid, before)),
            _ => {}
        }
        self.after_mutation()
    }

    /// Drop every layer of the active screen, recording their blobs for undo.
    pub fn clear_layers(&mut self) -> SceneResult<()> {
        let mut p = self.active_parts();
        let layers = p.tree.clear();
        tracing::debug!(layers = layers.len(), "cleared layers");
        p.history.record(Change::Clear { layers });
        self.editing = None;
        self.after_mutation()
    }

    /// Select `id` alone, or toggle it when `multi` is set.
    pub fn select_layer(&mut self, id: LayerId, multi: bool) -> SceneResult<()> {
        self.active_parts().select(id, multi)
    }

    pub fn clear_selection(&mut self) {
        self.active_parts().clear_selection();
    }

    pub fn selected_layers(&self) -> Vec<LayerId> {
        self.tree().selected()
    }

    /// Every layer of the active screen, depth first.
    pub fn all_layers(&self) -> Vec<LayerId> {
        self.tree().all_layers()
    }

    pub fn find_layer(&self, id: LayerId) -> Option<&Layer> {
        self.tree().find(id)
    }

    /// Visible non-group layers under display pixel `p`, front-most first.
    pub fn layers_at(&self, p: Point) -> Vec<LayerId> {
        let tree = self.tree();
        tree.all_layers()
            .into_iter()
            .filter(|id| tree.effective_visible(*id))
            .filter(|id| {
                tree.get(*id)
                    .is_some_and(|l| !l.is_group() && l.contains(p, &self.fonts))
            })
            .collect()
    }

    // ---- history ------------------------------------------------------------------------

    /// Revert the latest recorded change. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> SceneResult<bool> {
        self.step(Direction::Undo)
    }

    /// Re-apply the latest undone change. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> SceneResult<bool> {
        self.step(Direction::Redo)
    }

    fn step(&mut self, dir: Direction) -> SceneResult<bool> {
        let mut p = self.active_parts();
        let record = match dir {
            Direction::Undo => p.history.pop_undo(),
            Direction::Redo => p.history.pop_redo(),
        };
        let Some(record) = record else {
            return Ok(false);
        };
        match replay(&record.change, dir, &mut *p.tree, p.registry) {
            Ok(()) => tracing::debug!(
                seq = record.seq,
                kind = record.change.kind_name(),
                ?dir,
                "replayed history entry"
            ),
            Err(e) => tracing::warn!(
                seq = record.seq,
                kind = record.change.kind_name(),
                ?dir,
                error = %e,
                "skipping history entry"
            ),
        }
        p.repaint_all()?;
        self.editing = None;
        self.after_mutation()?;
        Ok(true)
    }

    // ---- output -------------------------------------------------------------------------

    /// Paint layer capturing the current output inside `size` at `pos`, added and selected.
    pub fn grab(&mut self, pos: Point, size: Size) -> SceneResult<LayerId> {
        if !pos.within_limit() || !size.within_limit() {
            return Err(SceneError::validation(format!(
                "grab region {}x{} at ({}, {}) is out of range",
                size.w, size.h, pos.x, pos.y
            )));
        }
        let out = self
            .compositor
            .render_quantized(self.tree(), self.opts.display)?;
        let bitmap = Bitmap::from_buffer(&out, Rect::new(pos, size));
        let layer = self.create_layer(LayerKind::Paint { pos, bitmap });
        let id = self.add_layer(layer)?;
        self.select_layer(id, false)?;
        Ok(id)
    }

    /// Synchronously recomposite the active screen.
    pub fn render(&mut self) -> SceneResult<&Frame> {
        let frame = self
            .compositor
            .render(self.screens[self.active].tree(), self.opts.display)?;
        Ok(&*self.last_frame.insert(frame))
    }

    /// Frame produced by the most recent [`Session::render`].
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn set_display(&mut self, display: Size) -> SceneResult<()> {
        self.opts.display = display;
        self.repaint_screens()?;
        self.request_all_previews();
        self.render()?;
        Ok(())
    }

    /// Set the view magnification from a percentage (`400` is 4x), then recomposite.
    pub fn set_scale(&mut self, percent: f64) -> SceneResult<()> {
        let f = percent / 100.0;
        self.opts.scale = Vec2::new(f, f);
        self.repaint_screens()?;
        self.render()?;
        Ok(())
    }

    pub fn set_pixel_size(&mut self, pixel_size: Size) -> SceneResult<()> {
        self.opts.pixel_size = pixel_size;
        self.request_all_previews();
        self.render()?;
        Ok(())
    }

    pub fn set_foreground(&mut self, color: Rgba8) -> SceneResult<()> {
        self.opts.foreground = color;
        self.compositor.foreground = color;
        self.request_all_previews();
        self.render()?;
        Ok(())
    }

    fn repaint_screens(&mut self) -> SceneResult<()> {
        let ctx = DrawContext { fonts: &self.fonts };
        for screen in &mut self.screens {
            let tree = screen.tree_mut();
            tree.resize_all(self.opts.display, self.opts.scale);
            tree.draw_all(&ctx)?;
        }
        Ok(())
    }

    // ---- screens ------------------------------------------------------------------------

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screen(&self, id: u32) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    pub fn active_screen(&self) -> &Screen {
        &self.screens[self.active]
    }

    pub fn active_screen_id(&self) -> u32 {
        self.active_screen().id
    }

    /// Append an empty screen and switch to it.
    pub fn add_screen(&mut self, name: impl Into<String>) -> SceneResult<u32> {
        let id = self.screens.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.screens.push(Screen::new(id, name));
        self.set_active_screen(id)?;
        Ok(id)
    }

    pub fn rename_screen(&mut self, id: u32, name: impl Into<String>) -> SceneResult<()> {
        let screen = self
            .screens
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SceneError::structural(format!("unknown screen {id}")))?;
        screen.name = name.into();
        Ok(())
    }

    /// Make `id` the edited screen; the outgoing screen gets its thumbnail refreshed.
    pub fn set_active_screen(&mut self, id: u32) -> SceneResult<()> {
        let next = self
            .screens
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SceneError::structural(format!("unknown screen {id}")))?;
        let outgoing = self.active_screen_id();
        self.previews.request(outgoing, self.clock.now());
        self.editing = None;
        self.active = next;
        self.active_parts().repaint_all()?;
        self.render()?;
        tracing::debug!(from = outgoing, to = id, "switched screen");
        Ok(())
    }

    /// Regenerate the thumbnails whose debounce elapsed by `now`; returns the screens whose
    /// preview changed.
    pub fn poll_previews(&mut self, now: Instant) -> SceneResult<Vec<u32>> {
        let due = self.previews.due(now);
        self.refresh_previews(due)
    }

    /// [`Session::poll_previews`] at the session clock's current time.
    pub fn poll_due_previews(&mut self) -> SceneResult<Vec<u32>> {
        let now = self.clock.now();
        self.poll_previews(now)
    }

    /// Regenerate every pending thumbnail immediately.
    pub fn flush_previews(&mut self) -> SceneResult<Vec<u32>> {
        let due = self.previews.drain();
        self.refresh_previews(due)
    }

    pub fn pending_previews(&self) -> &PreviewScheduler {
        &self.previews
    }

    fn request_all_previews(&mut self) {
        let now = self.clock.now();
        for screen in &self.screens {
            self.previews.request(screen.id, now);
        }
    }

    fn refresh_previews(&mut self, ids: Vec<u32>) -> SceneResult<Vec<u32>> {
        let mut changed = Vec::new();
        for id in ids {
            if self.refresh_preview(id)? {
                changed.push(id);
            }
        }
        Ok(changed)
    }

    /// Thumbnail of screen `id`: the composited output over black, stretched by the pixel size.
    pub fn preview_frame(&mut self, id: u32) -> SceneResult<Frame> {
        let ctx = DrawContext { fonts: &self.fonts };
        let screen = self
            .screens
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SceneError::structural(format!("unknown screen {id}")))?;
        let tree = screen.tree_mut();
        tree.resize_all(self.opts.display, self.opts.scale);
        tree.draw_all(&ctx)?;
        let frame = self.compositor.render(tree, self.opts.display)?;
        let px = self.opts.pixel_size;
        Ok(frame.scaled(px.w, px.h).on_background([0, 0, 0]))
    }

    fn refresh_preview(&mut self, id: u32) -> SceneResult<bool> {
        if self.screen(id).is_none() {
            return Ok(false);
        }
        let frame = self.preview_frame(id)?;
        let Some(screen) = self.screens.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        let changed = screen.update_preview(&frame)?;
        if changed {
            tracing::debug!(screen = id, "updated preview");
        }
        Ok(changed)
    }

    // ---- projects -----------------------------------------------------------------------

    /// Replace every screen and the persisted settings in one step.
    ///
    /// Everything fallible happens before the session is touched.
    pub(crate) fn replace_screens(
        &mut self,
        opts: SessionOpts,
        mut screens: Vec<Screen>,
        active_id: u32,
        fonts: FontLibrary,
        custom_images: Vec<serde_json::Value>,
        custom_fonts: Vec<serde_json::Value>,
    ) -> SceneResult<()> {
        if screens.is_empty() {
            screens.push(Screen::new(1, "Screen 1"));
        }
        let active = screens
            .iter()
            .position(|s| s.id == active_id)
            .unwrap_or(0);
        let ctx = DrawContext { fonts: &fonts };
        for screen in &mut screens {
            let tree = screen.tree_mut();
            tree.resize_all(opts.display, opts.scale);
            tree.draw_all(&ctx)?;
        }
        let compositor = Compositor::new(opts.foreground, opts.overlay_opacity);
        let frame = compositor.render(screens[active].tree(), opts.display)?;

        self.previews = PreviewScheduler::new(opts.preview_debounce);
        self.compositor = compositor;
        self.opts = opts;
        self.screens = screens;
        self.active = active;
        self.fonts = fonts;
        self.custom_images = custom_images;
        self.custom_fonts = custom_fonts;
        self.editing = None;
        self.last_frame = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
