use crate::store::NodeId;
use ahash::AHashMap;

/// Transient UI flags of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub selected: bool,
    pub editing: bool,
}

/// Selection and edit-mode flags, keyed by node id and kept apart from the store.
///
/// Nothing here is read by conversion or serialization.
#[derive(Debug, Default)]
pub struct PresentationState {
    flags: AHashMap<NodeId, NodeFlags>,
}

impl PresentationState {
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.flags.get(&id).copied().unwrap_or_default()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.flags(id).selected
    }

    pub fn is_editing(&self, id: NodeId) -> bool {
        self.flags(id).editing
    }

    /// Selects `id` and deselects every other node.
    pub fn select(&mut self, id: NodeId) {
        for flags in self.flags.values_mut() {
            flags.selected = false;
        }
        self.flags.entry(id).or_default().selected = true;
        self.prune_defaults();
    }

    pub fn deselect_all(&mut self) {
        for flags in self.flags.values_mut() {
            flags.selected = false;
        }
        self.prune_defaults();
    }

    pub fn set_editing(&mut self, id: NodeId, editing: bool) {
        self.flags.entry(id).or_default().editing = editing;
        self.prune_defaults();
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.flags
            .iter()
            .find(|(_, flags)| flags.selected)
            .map(|(id, _)| *id)
    }

    /// Drops the flags of every node for which `exists` returns `false`.
    pub fn retain_existing(&mut self, exists: impl Fn(NodeId) -> bool) {
        self.flags.retain(|id, _| exists(*id));
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    fn prune_defaults(&mut self) {
        self.flags.retain(|_, flags| *flags != NodeFlags::default());
    }
}
