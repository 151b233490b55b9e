use crate::block::{Block, BlockKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a visual node. Generated once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A block placed in one of the store's collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub id: NodeId,
    pub kind: BlockKind,
    pub block: Block,
    /// Zero-based position inside the owning collection.
    pub order: usize,
    /// For a step, the job node it belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
}

impl VisualNode {
    pub(crate) fn new(kind: BlockKind, block: Block, order: usize, parent_id: Option<NodeId>) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            block,
            order,
            parent_id,
        }
    }

    /// The job identifier carried by the block, if any.
    pub fn job_ref(&self) -> Option<&str> {
        self.block.job_ref()
    }
}
