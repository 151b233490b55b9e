use crate::block::BlockKind;
use crate::store::NodeId;
use crate::validate::DropTarget;
use thiserror::Error;

/// Reasons a dropped block is refused.
///
/// Every variant is an expected, user-facing outcome: the `Display` text is meant to be
/// shown as is, and the store is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DropRejection {
    #[error("{kind} blocks cannot be placed in the {target}")]
    IncompatibleKind { kind: BlockKind, target: DropTarget },

    #[error("Add a trigger before adding {kind} blocks")]
    MissingTrigger { kind: BlockKind },

    #[error("Add a job before adding steps")]
    MissingJob,

    #[error("The job '{0}' this step was dropped on no longer exists")]
    UnknownJob(NodeId),

    #[error("A trigger already exists; only one trigger is allowed")]
    DuplicateTrigger,

    #[error("The dropped block could not be read: {0}")]
    MalformedDescriptor(String),

    #[error("{0}")]
    Custom(String),
}

/// Errors returned by node store lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Node '{0}' not found")]
    NodeNotFound(NodeId),

    #[error("Node '{id}' is a {found} block, but a {expected} block was expected")]
    KindMismatch {
        id: NodeId,
        expected: BlockKind,
        found: BlockKind,
    },
}

/// Errors that can occur while reading an external workflow document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse workflow document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to parse block list: {0}")]
    Blocks(#[from] serde_json::Error),
}
