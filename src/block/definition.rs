use super::{BlockKind, ConfigMap, ConfigValue};
use serde::{Deserialize, Serialize};

/// The portable unit of pipeline configuration exchanged between the node store,
/// the converters and the outside world.
///
/// A block knows nothing about where it is placed: ordering and parent links live on
/// the [`VisualNode`](crate::store::VisualNode) that wraps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub name: String,
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// For a step, the identifier of the owning job. For a job, its own identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub config: ConfigMap,
}

impl Block {
    pub fn new(kind: BlockKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            job_ref: None,
            domain: None,
            tags: Vec::new(),
            config: ConfigMap::new(),
        }
    }

    pub fn trigger(name: impl Into<String>) -> Self {
        Self::new(BlockKind::Trigger, name)
    }

    pub fn job(name: impl Into<String>) -> Self {
        Self::new(BlockKind::Job, name)
    }

    pub fn step(name: impl Into<String>) -> Self {
        Self::new(BlockKind::Step, name)
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_job_ref(mut self, job_ref: impl Into<String>) -> Self {
        self.job_ref = Some(job_ref.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a single configuration entry, keeping the position of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.config.insert(key.into(), value.into());
    }

    /// The job reference, treating an empty string as unassigned.
    pub fn job_ref(&self) -> Option<&str> {
        self.job_ref.as_deref().filter(|r| !r.is_empty())
    }

    /// Compares the parts of two blocks that survive a trip through a workflow
    /// document: kind, job reference and configuration.
    ///
    /// Display metadata (`name`, `description`, `domain`, `tags`) is not part of the
    /// document and is ignored here.
    pub fn same_semantics(&self, other: &Block) -> bool {
        self.kind == other.kind && self.job_ref() == other.job_ref() && self.config == other.config
    }
}
