//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the pipeblocks
//! crate. Import this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use pipeblocks::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/workflow.yaml")?;
//! let doc = parse_document(&text)?;
//!
//! let mut store = NodeStore::new();
//! store.rehydrate(from_document(doc.as_ref()));
//!
//! let blocks = to_blocks(&store);
//! println!("{}", assemble(&blocks).to_yaml());
//! # Ok(())
//! # }
//! ```

// Block model
pub use crate::block::{Block, BlockKind, ConfigMap, ConfigValue};

// Node store
pub use crate::store::{BlockListObserver, NodeId, NodeStore, VisualNode};

// Conversions
pub use crate::convert::{from_document, parse_blocks, parse_document, to_blocks};

// Assembly and rendering
pub use crate::workflow::{
    SerializerOptions, WorkflowDocument, assemble, normalize_job_id, serialize, serialize_with,
};

// Validation and session
pub use crate::editor::{Editor, PresentationState};
pub use crate::validate::{DropPlan, DropTarget, DropValidator, Placement};

// Error types
pub use crate::error::{DocumentError, DropRejection, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
