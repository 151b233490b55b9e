//! Conversions between the node store, the flat block list and workflow documents.

use crate::block::Block;
use crate::store::{NodeId, NodeStore, VisualNode};
use ahash::AHashSet;
use itertools::Itertools;

mod document;

pub use document::*;

/// Flattens a store snapshot into an ordered block list.
///
/// Order: the trigger, then each job immediately followed by its steps (both in
/// collection order), then every step not attached to an existing job. Detached steps
/// keep whatever `job_ref` they last had. The same store state always yields the same
/// list.
pub fn to_blocks(store: &NodeStore) -> Vec<Block> {
    let job_ids: AHashSet<NodeId> = store.jobs().iter().map(|job| job.id).collect();
    let (attached, detached): (Vec<&VisualNode>, Vec<&VisualNode>) = store
        .steps()
        .iter()
        .partition(|step| step.parent_id.is_some_and(|parent| job_ids.contains(&parent)));
    let mut steps_by_job = attached
        .into_iter()
        .into_group_map_by(|step| step.parent_id);

    let mut blocks = Vec::with_capacity(store.len());
    blocks.extend(store.triggers().iter().map(|node| node.block.clone()));
    for job in store.jobs() {
        blocks.push(job.block.clone());
        if let Some(steps) = steps_by_job.remove(&Some(job.id)) {
            blocks.extend(steps.into_iter().map(|step| step.block.clone()));
        }
    }
    blocks.extend(detached.into_iter().map(|step| step.block.clone()));
    blocks
}
