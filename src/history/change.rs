use crate::scene::layer::LayerId;
use crate::scene::state::LayerState;
use crate::scene::tree::Slot;

/// One reversible mutation of a scene tree.
///
/// Records hold blobs rather than live layers, so replaying them never depends on a layer
/// object surviving in the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Add {
        layer: LayerState,
        slot: Slot,
    },
    Remove {
        layer: LayerState,
        slot: Slot,
    },
    Change {
        uid: LayerId,
        before: LayerState,
        after: LayerState,
    },
    /// `sources` are listed in removal order, each with the slot it was removed from.
    Merge {
        merged: LayerState,
        merged_slot: Slot,
        sources: Vec<(LayerState, Slot)>,
    },
    /// `group` has no `ch` entry; `members` keep their ids and are listed in detach order.
    Group {
        group: LayerState,
        group_slot: Slot,
        members: Vec<(LayerId, Slot)>,
    },
    Ungroup {
        group: LayerState,
        group_slot: Slot,
        children: Vec<LayerId>,
    },
    Lock {
        uid: LayerId,
    },
    Unlock {
        uid: LayerId,
    },
    Clear {
        layers: Vec<LayerState>,
    },
}

impl Change {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Change::Add { .. } => "add",
            Change::Remove { .. } => "remove",
            Change::Change { .. } => "change",
            Change::Merge { .. } => "merge",
            Change::Group { .. } => "group",
            Change::Ungroup { .. } => "ungroup",
            Change::Lock { .. } => "lock",
            Change::Unlock { .. } => "unlock",
            Change::Clear { .. } => "clear",
        }
    }
}

/// A change plus the sequence number it was recorded under.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub seq: u64,
    pub change: Change,
}

/// Undo and redo stacks.
///
/// Recording an action clears stale redo entries and then pushes the same record onto both
/// stacks, so redo is seeded for the action just performed. A redo entry whose record is still
/// on top of the undo stack is already applied and is not replayed.
#[derive(Clone, Debug, Default)]
pub struct ChangeHistory {
    undo: Vec<Record>,
    redo: Vec<Record>,
    next_seq: u64,
    limit: Option<usize>,
}

impl ChangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo entries; the oldest are dropped first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Append to the undo stack.
    pub fn push(&mut self, record: Record) {
        self.undo.push(record);
        if let Some(limit) = self.limit
            && self.undo.len() > limit
        {
            let excess = self.undo.len() - limit;
            self.undo.drain(..excess);
        }
    }

    /// Append to the redo stack.
    pub fn push_redo(&mut self, record: Record) {
        self.redo.push(record);
    }

    /// Record a new action: invalidate redo, then push onto both stacks.
    pub fn record(&mut self, change: Change) -> u64 {
        self.next_seq += 1;
        let record = Record {
            seq: self.next_seq,
            change,
        };
        self.redo.clear();
        self.push_redo(record.clone());
        self.push(record);
        self.next_seq
    }

    /// Pop the latest applied record, making sure it is available for redo.
    pub fn pop_undo(&mut self) -> Option<Record> {
        let record = self.undo.pop()?;
        if self.redo.last().map(|r| r.seq) != Some(record.seq) {
            self.redo.push(record.clone());
        }
        Some(record)
    }

    /// Pop the latest undone record; `None` when it is still applied or nothing was undone.
    pub fn pop_redo(&mut self) -> Option<Record> {
        if !self.can_redo() {
            return None;
        }
        let record = self.redo.pop()?;
        self.push(record.clone());
        Some(record)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        match (self.redo.last(), self.undo.last()) {
            (Some(r), Some(u)) => r.seq != u.seq,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Number of undoable entries.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/change.rs"]
mod tests;
