//! Admission of dropped blocks into the node store.

use crate::block::{Block, BlockKind};
use crate::error::DropRejection;
use crate::store::{NodeId, NodeStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

mod rules;

pub use rules::DropRule;

use rules::{KindCompatibility, NamedBlock, Prerequisites};

/// Where a block was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropTarget {
    Trigger,
    Jobs,
    /// The generic step area; the step joins the most recently added job.
    Steps,
    /// The step area nested inside a specific job.
    JobSteps(NodeId),
}

impl DropTarget {
    /// Whether a block of `kind` belongs in this area at all.
    pub fn accepts(&self, kind: BlockKind) -> bool {
        matches!(
            (self, kind),
            (DropTarget::Trigger, BlockKind::Trigger)
                | (DropTarget::Jobs, BlockKind::Job)
                | (DropTarget::Steps | DropTarget::JobSteps(_), BlockKind::Step)
        )
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropTarget::Trigger => write!(f, "trigger area"),
            DropTarget::Jobs => write!(f, "job area"),
            DropTarget::Steps => write!(f, "step area"),
            DropTarget::JobSteps(_) => write!(f, "job's step area"),
        }
    }
}

/// How an accepted block enters the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended as a new node.
    Insert,
    /// Replaces the payload of the existing trigger node.
    ReplaceTrigger(NodeId),
}

/// The outcome of an accepted drop: everything needed to apply it to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropPlan {
    pub kind: BlockKind,
    pub placement: Placement,
    pub parent_id: Option<NodeId>,
}

/// Decides whether a dropped block may be added to a target collection.
///
/// The checks run in a fixed order: kind compatibility, prerequisites, then any rules
/// added with [`DropValidatorBuilder::with_rule`]. Accepted drops resolve the duplicate
/// policy into a [`DropPlan`]. Validation never mutates the store.
pub struct DropValidator {
    rules: Vec<Box<dyn DropRule>>,
}

pub struct DropValidatorBuilder {
    rules: Vec<Box<dyn DropRule>>,
}

impl DropValidatorBuilder {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(KindCompatibility),
                Box::new(Prerequisites),
                Box::new(NamedBlock),
            ],
        }
    }

    pub fn with_rule(mut self, rule: Box<dyn DropRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> DropValidator {
        DropValidator { rules: self.rules }
    }
}

impl Default for DropValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for DropValidator {
    fn default() -> Self {
        DropValidatorBuilder::new().build()
    }
}

impl DropValidator {
    pub fn builder() -> DropValidatorBuilder {
        DropValidatorBuilder::new()
    }

    pub fn validate(
        &self,
        candidate: &Block,
        target: DropTarget,
        store: &NodeStore,
    ) -> Result<DropPlan, DropRejection> {
        for rule in &self.rules {
            if let Err(rejection) = rule.check(candidate, &target, store) {
                debug!(
                    "Rule '{}' rejected {} '{}': {}",
                    rule.name(),
                    candidate.kind,
                    candidate.name,
                    rejection
                );
                return Err(rejection);
            }
        }

        let plan = match candidate.kind {
            BlockKind::Trigger => DropPlan {
                kind: BlockKind::Trigger,
                placement: store
                    .trigger()
                    .map_or(Placement::Insert, |existing| Placement::ReplaceTrigger(existing.id)),
                parent_id: None,
            },
            BlockKind::Job => DropPlan {
                kind: BlockKind::Job,
                placement: Placement::Insert,
                parent_id: None,
            },
            BlockKind::Step => DropPlan {
                kind: BlockKind::Step,
                placement: Placement::Insert,
                parent_id: match target {
                    DropTarget::JobSteps(job_id) => Some(job_id),
                    _ => store.last_job().map(|job| job.id),
                },
            },
        };
        Ok(plan)
    }

    /// Parses a serialized block descriptor and validates it.
    ///
    /// Input that does not parse into a block is rejected like any other drop.
    pub fn validate_descriptor(
        &self,
        raw: &str,
        target: DropTarget,
        store: &NodeStore,
    ) -> Result<(Block, DropPlan), DropRejection> {
        let candidate: Block = serde_json::from_str(raw)
            .map_err(|e| DropRejection::MalformedDescriptor(e.to_string()))?;
        let plan = self.validate(&candidate, target, store)?;
        Ok((candidate, plan))
    }
}
