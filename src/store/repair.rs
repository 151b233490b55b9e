//! Invariant maintenance passes over the store's collections.
//!
//! Structural mutations (insert, remove, move) happen in `NodeStore`; everything that
//! re-establishes an invariant afterwards lives here as a separate deterministic pass.

use super::{NodeId, VisualNode};
use ahash::AHashSet;
use tracing::{debug, warn};

/// Builds the canonical identifier of the job at 1-based `position`.
pub(crate) fn job_identifier(prefix: &str, position: usize) -> String {
    format!("{}{}", prefix, position)
}

/// Rewrites `order` so it matches each node's position.
pub(crate) fn renumber(nodes: &mut [VisualNode]) {
    for (index, node) in nodes.iter_mut().enumerate() {
        node.order = index;
    }
}

/// Removes every step attached to `parent`, renumbering the survivors.
pub(crate) fn remove_children(steps: &mut Vec<VisualNode>, parent: NodeId) -> Vec<VisualNode> {
    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(steps)
        .into_iter()
        .partition(|step| step.parent_id == Some(parent));
    *steps = kept;
    renumber(steps);
    removed
}

/// Sets `job_ref` on every step attached to `parent`. Returns the number of steps touched.
pub(crate) fn cascade(steps: &mut [VisualNode], parent: NodeId, job_ref: &str) -> usize {
    let mut touched = 0;
    for step in steps.iter_mut().filter(|s| s.parent_id == Some(parent)) {
        step.block.job_ref = Some(job_ref.to_string());
        touched += 1;
    }
    touched
}

/// Re-derives every job identifier from its position and cascades the result onto the
/// steps still attached to each job.
pub(crate) fn rederive_job_identifiers(
    jobs: &mut [VisualNode],
    steps: &mut [VisualNode],
    prefix: &str,
) {
    for (index, job) in jobs.iter_mut().enumerate() {
        let identifier = job_identifier(prefix, index + 1);
        if job.job_ref() != Some(identifier.as_str()) {
            debug!(
                "Job '{}' re-derived as '{}' (was {:?})",
                job.id, identifier, job.block.job_ref
            );
            job.block.job_ref = Some(identifier.clone());
        }
        cascade(steps, job.id, &identifier);
    }
}

/// Links each unattached step to the job its `job_ref` names, if that job exists.
/// Returns the number of steps linked.
pub(crate) fn adopt_orphans(steps: &mut [VisualNode], jobs: &[VisualNode]) -> usize {
    let mut adopted = 0;
    for step in steps.iter_mut().filter(|s| s.parent_id.is_none()) {
        let job = step
            .job_ref()
            .and_then(|job_ref| jobs.iter().find(|job| job.job_ref() == Some(job_ref)));
        if let Some(job) = job {
            step.parent_id = Some(job.id);
            adopted += 1;
        }
    }
    adopted
}

/// Clears any `parent_id` that does not name one of `jobs`. Returns the number repaired.
pub(crate) fn clear_dangling_parents(steps: &mut [VisualNode], jobs: &[VisualNode]) -> usize {
    let known: AHashSet<NodeId> = jobs.iter().map(|job| job.id).collect();
    let mut repaired = 0;
    for step in steps.iter_mut() {
        if let Some(parent) = step.parent_id {
            if !known.contains(&parent) {
                warn!(
                    "Step '{}' referenced missing job node '{}'; reference cleared",
                    step.id, parent
                );
                step.parent_id = None;
                repaired += 1;
            }
        }
    }
    repaired
}
