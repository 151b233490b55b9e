use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of block a pipeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(alias = "trigger")]
    Trigger,
    #[serde(alias = "job")]
    Job,
    #[serde(alias = "step")]
    Step,
}

impl BlockKind {
    /// All kinds, in the order their collections are listed.
    pub const ALL: [BlockKind; 3] = [BlockKind::Trigger, BlockKind::Job, BlockKind::Step];
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Trigger => write!(f, "Trigger"),
            BlockKind::Job => write!(f, "Job"),
            BlockKind::Step => write!(f, "Step"),
        }
    }
}
