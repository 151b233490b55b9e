use super::DropTarget;
use crate::block::{Block, BlockKind};
use crate::error::DropRejection;
use crate::store::NodeStore;

/// A single admission check run by the [`DropValidator`](super::DropValidator).
///
/// Rules run in registration order; the first rejection wins.
pub trait DropRule {
    fn name(&self) -> &str;
    fn check(
        &self,
        candidate: &Block,
        target: &DropTarget,
        store: &NodeStore,
    ) -> Result<(), DropRejection>;
}

/// Each kind may only enter its own area; steps may also enter a job's step area.
pub(super) struct KindCompatibility;

impl DropRule for KindCompatibility {
    fn name(&self) -> &str {
        "kind-compatibility"
    }

    fn check(
        &self,
        candidate: &Block,
        target: &DropTarget,
        _store: &NodeStore,
    ) -> Result<(), DropRejection> {
        if target.accepts(candidate.kind) {
            Ok(())
        } else {
            Err(DropRejection::IncompatibleKind {
                kind: candidate.kind,
                target: *target,
            })
        }
    }
}

/// Nothing but a trigger enters an empty pipeline, and steps need a job to live in.
pub(super) struct Prerequisites;

impl DropRule for Prerequisites {
    fn name(&self) -> &str {
        "prerequisites"
    }

    fn check(
        &self,
        candidate: &Block,
        target: &DropTarget,
        store: &NodeStore,
    ) -> Result<(), DropRejection> {
        if candidate.kind != BlockKind::Trigger && store.triggers().is_empty() {
            return Err(DropRejection::MissingTrigger {
                kind: candidate.kind,
            });
        }
        if candidate.kind == BlockKind::Step {
            if store.jobs().is_empty() {
                return Err(DropRejection::MissingJob);
            }
            if let DropTarget::JobSteps(job_id) = target {
                if !store.jobs().iter().any(|job| job.id == *job_id) {
                    return Err(DropRejection::UnknownJob(*job_id));
                }
            }
        }
        Ok(())
    }
}

/// Rejects descriptors that carry no usable name.
pub(super) struct NamedBlock;

impl DropRule for NamedBlock {
    fn name(&self) -> &str {
        "named-block"
    }

    fn check(
        &self,
        candidate: &Block,
        _target: &DropTarget,
        _store: &NodeStore,
    ) -> Result<(), DropRejection> {
        if candidate.name.trim().is_empty() {
            Err(DropRejection::MalformedDescriptor(
                "block name is empty".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
