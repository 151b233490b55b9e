//! Assembling block lists into workflow documents and rendering them as text.

use crate::block::{Block, ConfigMap, ConfigValue};
use crate::convert::JOBS_KEY;
use serde::{Deserialize, Serialize};

mod assembler;
mod serializer;

pub use assembler::*;
pub use serializer::*;

/// Comment rendered in place of a document when there are no blocks at all.
pub const EMPTY_DOCUMENT_COMMENT: &str = "# Add a trigger block to start building the workflow";

/// Extension of exported workflow files.
pub const WORKFLOW_FILE_EXTENSION: &str = "yaml";

/// A fully assembled workflow: trigger fields at the top level plus the `jobs` mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDocument {
    root: ConfigMap,
}

impl WorkflowDocument {
    pub fn from_root(root: ConfigMap) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigMap {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.root.get(key)
    }

    pub fn jobs(&self) -> Option<&ConfigMap> {
        self.root.get(JOBS_KEY).and_then(ConfigValue::as_mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn into_value(self) -> ConfigValue {
        ConfigValue::Mapping(self.root)
    }

    /// Renders the document as YAML text.
    pub fn to_yaml(&self) -> String {
        serialize_mapping(&self.root)
    }

    pub fn to_yaml_with(&self, options: &SerializerOptions) -> String {
        serialize_mapping_with(&self.root, options)
    }
}

/// The "full document" view: assembles `blocks` and renders the result.
///
/// With no blocks at all the output is `empty_comment` instead of the generic empty
/// configuration comment.
pub fn render_document(blocks: &[Block], options: &SerializerOptions, empty_comment: &str) -> String {
    if blocks.is_empty() {
        return format!("{}\n", empty_comment);
    }
    assemble(blocks).to_yaml_with(options)
}

/// The "single block" view: renders one block's bare configuration.
pub fn render_block(block: &Block, options: &SerializerOptions) -> String {
    serialize_mapping_with(&block.config, options)
}
