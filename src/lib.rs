//! # pipeblocks - Block-based CI/CD Pipeline Model
//!
//! **pipeblocks** models a CI/CD pipeline assembled from typed blocks (a trigger, jobs
//! and steps) and keeps three representations of it in sync:
//!
//! 1.  **The node store**: the visual graph, three ordered collections of nodes with
//!     parent links from steps to their jobs.
//! 2.  **The block list**: a flat, ordered list of semantic blocks, the unit handed to
//!     persistence.
//! 3.  **The workflow document**: the nested configuration rendered as YAML for an
//!     external execution engine.
//!
//! ## Core Workflow
//!
//! 1.  **Drop blocks**: the `DropValidator` decides whether a block may enter a target
//!     area; accepted blocks are added to the `NodeStore`.
//! 2.  **Convert**: `convert::to_blocks` flattens the store into an ordered block list.
//! 3.  **Assemble and render**: `workflow::assemble` folds the list into a
//!     `WorkflowDocument`, and `workflow::serialize` renders it as text.
//! 4.  **Load**: `convert::from_document` reads an external document back into blocks,
//!     which `NodeStore::rehydrate` turns into nodes again.
//!
//! The `Editor` wires these steps together for an editing session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipeblocks::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mut editor = Editor::new();
//!
//!     let config = |value: serde_json::Value| ConfigValue::from(value).into_mapping().unwrap_or_default();
//!
//!     editor.drop_block(
//!         Block::trigger("CI").with_config(config(json!({
//!             "name": "CI",
//!             "on": { "push": { "branches": ["main"] } }
//!         }))),
//!         DropTarget::Trigger,
//!     )?;
//!     editor.drop_block(
//!         Block::job("Build").with_config(config(json!({ "runs-on": "ubuntu-latest" }))),
//!         DropTarget::Jobs,
//!     )?;
//!     editor.drop_block(
//!         Block::step("Checkout").with_config(config(json!({ "uses": "actions/checkout@v4" }))),
//!         DropTarget::Steps,
//!     )?;
//!
//!     // Deliver one change notification for the whole gesture.
//!     editor.settle();
//!
//!     println!("{}", editor.render());
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod convert;
pub mod editor;
pub mod error;
pub mod prelude;
pub mod store;
pub mod validate;
pub mod workflow;
