use crate::foundation::error::{SceneError, SceneResult};
use crate::history::change::Change;
use crate::scene::layer::LayerId;
use crate::scene::state::{LayerRegistry, LayerState};
use crate::scene::tree::{SceneTree, Slot};

/// Which way a record is replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

fn replay_err(change: &Change, e: SceneError) -> SceneError {
    match e {
        SceneError::HistoryReplay(_) => e,
        other => SceneError::history_replay(format!("{}: {other}", change.kind_name())),
    }
}

fn restore(
    tree: &mut SceneTree,
    registry: &LayerRegistry,
    state: &LayerState,
    slot: Slot,
) -> SceneResult<LayerId> {
    if tree.contains(state.uid) {
        return Err(SceneError::structural(format!(
            "layer {} is still in the tree",
            state.uid
        )));
    }
    tree.rehydrate(state, registry, slot)
}

fn set_locked(tree: &mut SceneTree, uid: LayerId, locked: bool) -> SceneResult<()> {
    let layer = tree
        .get_mut(uid)
        .ok_or_else(|| SceneError::structural(format!("layer {uid} is gone")))?;
    layer.locked = locked;
    Ok(())
}

/// Apply `change` to `tree` in `dir`. Structure only; callers repaint afterwards.
///
/// A `Clear` undo restores every layer it can and skips kinds missing from `registry`; every
/// other failure aborts the record with [`SceneError::HistoryReplay`].
pub fn replay(
    change: &Change,
    dir: Direction,
    tree: &mut SceneTree,
    registry: &LayerRegistry,
) -> SceneResult<()> {
    apply(change, dir, tree, registry).map_err(|e| replay_err(change, e))
}

fn apply(
    change: &Change,
    dir: Direction,
    tree: &mut SceneTree,
    registry: &LayerRegistry,
) -> SceneResult<()> {
    use Direction::{Redo, Undo};

    match (change, dir) {
        (Change::Add { layer, .. }, Undo) | (Change::Remove { layer, .. }, Redo) => {
            if !tree.remove(layer.uid) {
                return Err(SceneError::structural(format!(
                    "layer {} is not in the tree",
                    layer.uid
                )));
            }
        }
        (Change::Add { layer, slot }, Redo) | (Change::Remove { layer, slot }, Undo) => {
            restore(tree, registry, layer, *slot)?;
        }
        (Change::Change { uid, before, .. }, Undo) => tree.apply_state(*uid, before, registry)?,
        (Change::Change { uid, after, .. }, Redo) => tree.apply_state(*uid, after, registry)?,
        (Change::Merge { merged, sources, .. }, Undo) => {
            // Check every source first so a failure leaves the merged layer in place.
            if let Some((s, _)) = sources.iter().find(|(s, _)| !registry.contains(&s.tag)) {
                return Err(SceneError::structural(format!(
                    "unknown layer kind '{}'",
                    s.tag
                )));
            }
            tree.remove(merged.uid);
            for (state, slot) in sources.iter().rev() {
                restore(tree, registry, state, *slot)?;
            }
        }
        (Change::Merge { merged, merged_slot, sources }, Redo) => {
            for (state, _) in sources {
                tree.remove(state.uid);
            }
            restore(tree, registry, merged, *merged_slot)?;
        }
        (Change::Group { group, members, .. }, Undo) => {
            tree.dissolve(group.uid).ok_or_else(|| {
                SceneError::structural(format!("group {} is not in the tree", group.uid))
            })?;
            for (id, slot) in members.iter().rev() {
                tree.attach(*id, *slot)?;
            }
        }
        (Change::Group { group, group_slot, members }, Redo) => {
            for (id, _) in members {
                tree.detach(*id);
            }
            let g = restore(tree, registry, group, *group_slot)?;
            for (at, (id, _)) in members.iter().enumerate() {
                tree.attach(*id, Slot { parent: Some(g), at })?;
            }
        }
        (Change::Ungroup { group, group_slot, children }, Undo) => {
            for id in children.iter().rev() {
                tree.detach(*id);
            }
            let g = restore(tree, registry, group, *group_slot)?;
            for (at, id) in children.iter().enumerate() {
                tree.attach(*id, Slot { parent: Some(g), at })?;
            }
        }
        (Change::Ungroup { group, children, .. }, Redo) => {
            tree.dissolve(group.uid).ok_or_else(|| {
                SceneError::structural(format!("group {} is not in the tree", group.uid))
            })?;
            for id in children {
                tree.attach(*id, Slot::FRONT)?;
            }
        }
        (Change::Lock { uid }, Undo) | (Change::Unlock { uid }, Redo) => {
            set_locked(tree, *uid, false)?
        }
        (Change::Lock { uid }, Redo) | (Change::Unlock { uid }, Undo) => {
            set_locked(tree, *uid, true)?
        }
        (Change::Clear { layers }, Undo) => {
            let mut at = 0;
            for state in layers {
                if !registry.contains(&state.tag) {
                    tracing::warn!(
                        tag = %state.tag,
                        uid = %state.uid,
                        "skipping cleared layer of unknown kind"
                    );
                    continue;
                }
                match restore(tree, registry, state, Slot { parent: None, at }) {
                    Ok(_) => at += 1,
                    Err(e) => {
                        tracing::warn!(uid = %state.uid, error = %e, "skipping cleared layer")
                    }
                }
            }
        }
        (Change::Clear { .. }, Redo) => {
            tree.clear();
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/history/replay.rs"]
mod tests;
