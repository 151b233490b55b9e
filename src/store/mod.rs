use crate::block::{Block, BlockKind};
use crate::convert;
use crate::error::StoreError;
use tracing::{debug, info, warn};

mod node;
mod notify;
mod repair;

pub use node::*;
pub use notify::BlockListObserver;

use notify::ChangeNotifier;

/// Prefix of auto-derived job identifiers (`job1`, `job2`, ...).
pub const DEFAULT_JOB_ID_PREFIX: &str = "job";

/// The aggregate root of an editing session: three ordered collections of visual nodes.
///
/// Invariants held after every public call returns:
/// - at most one trigger;
/// - `order` is `0..n` in every collection, matching the vector position;
/// - every step `parent_id` names an existing job, and an attached step's `job_ref`
///   is that job's identifier;
/// - an unattached step's `job_ref` names no job.
///
/// Every mutation schedules a change notification. Notifications are delivered only by
/// [`NodeStore::flush_notifications`], never from inside a mutation.
pub struct NodeStore {
    triggers: Vec<VisualNode>,
    jobs: Vec<VisualNode>,
    steps: Vec<VisualNode>,
    job_id_prefix: String,
    notifier: ChangeNotifier,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub fn new() -> Self {
        Self::with_job_id_prefix(DEFAULT_JOB_ID_PREFIX)
    }

    pub fn with_job_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            triggers: Vec::new(),
            jobs: Vec::new(),
            steps: Vec::new(),
            job_id_prefix: prefix.into(),
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn triggers(&self) -> &[VisualNode] {
        &self.triggers
    }

    pub fn jobs(&self) -> &[VisualNode] {
        &self.jobs
    }

    pub fn steps(&self) -> &[VisualNode] {
        &self.steps
    }

    pub fn collection(&self, kind: BlockKind) -> &[VisualNode] {
        match kind {
            BlockKind::Trigger => &self.triggers,
            BlockKind::Job => &self.jobs,
            BlockKind::Step => &self.steps,
        }
    }

    fn collection_mut(&mut self, kind: BlockKind) -> &mut Vec<VisualNode> {
        match kind {
            BlockKind::Trigger => &mut self.triggers,
            BlockKind::Job => &mut self.jobs,
            BlockKind::Step => &mut self.steps,
        }
    }

    /// All nodes: triggers, then jobs, then steps, each in collection order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &VisualNode> {
        self.triggers
            .iter()
            .chain(self.jobs.iter())
            .chain(self.steps.iter())
    }

    pub fn len(&self) -> usize {
        self.triggers.len() + self.jobs.len() + self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&VisualNode> {
        self.all_nodes().find(|node| node.id == id)
    }

    pub fn trigger(&self) -> Option<&VisualNode> {
        self.triggers.first()
    }

    /// The most recently added job still present.
    pub fn last_job(&self) -> Option<&VisualNode> {
        self.jobs.last()
    }

    pub fn job_by_ref(&self, job_ref: &str) -> Option<&VisualNode> {
        self.jobs.iter().find(|job| job.job_ref() == Some(job_ref))
    }

    /// Steps attached to the job node `job_id`, in collection order.
    pub fn steps_of(&self, job_id: NodeId) -> impl Iterator<Item = &VisualNode> {
        self.steps
            .iter()
            .filter(move |step| step.parent_id == Some(job_id))
    }

    fn locate(&self, id: NodeId) -> Option<(BlockKind, usize)> {
        BlockKind::ALL.into_iter().find_map(|kind| {
            self.collection(kind)
                .iter()
                .position(|node| node.id == id)
                .map(|index| (kind, index))
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut VisualNode, StoreError> {
        let (kind, index) = self.locate(id).ok_or(StoreError::NodeNotFound(id))?;
        Ok(&mut self.collection_mut(kind)[index])
    }

    /// Appends a new node wrapping `block` to the collection for `kind`.
    ///
    /// A job always receives a freshly derived identifier. A step is linked to
    /// `parent_id` when that job exists (taking its identifier), otherwise to the job
    /// whose identifier matches the block's `job_ref`, otherwise it stays unattached.
    /// Returns `None` without touching the store when a trigger already exists.
    pub fn add_node(
        &mut self,
        kind: BlockKind,
        mut block: Block,
        parent_id: Option<NodeId>,
    ) -> Option<VisualNode> {
        block.kind = kind;
        let parent_id = match kind {
            BlockKind::Trigger => {
                if !self.triggers.is_empty() {
                    debug!("Ignoring second trigger '{}'", block.name);
                    return None;
                }
                None
            }
            BlockKind::Job => {
                block.job_ref = Some(self.next_job_identifier());
                None
            }
            BlockKind::Step => self.resolve_step_parent(&mut block, parent_id),
        };

        let collection = self.collection_mut(kind);
        let node = VisualNode::new(kind, block, collection.len(), parent_id);
        collection.push(node.clone());
        debug!(
            "Added {} node '{}' at order {} (job_ref: {:?})",
            kind, node.id, node.order, node.block.job_ref
        );
        if kind == BlockKind::Job {
            self.adopt_orphans();
        }
        self.notifier.schedule();
        Some(node)
    }

    /// The identifier the next added job will receive: `{prefix}{n}` with `n` the new
    /// job count, bumped past identifiers already in use.
    pub fn next_job_identifier(&self) -> String {
        let mut position = self.jobs.len() + 1;
        loop {
            let candidate = repair::job_identifier(&self.job_id_prefix, position);
            if self.job_by_ref(&candidate).is_none() {
                return candidate;
            }
            position += 1;
        }
    }

    fn resolve_step_parent(&self, block: &mut Block, parent_id: Option<NodeId>) -> Option<NodeId> {
        if let Some(parent_id) = parent_id {
            match self.jobs.iter().find(|job| job.id == parent_id) {
                Some(job) => {
                    block.job_ref = job.block.job_ref.clone();
                    return Some(job.id);
                }
                None => warn!(
                    "Step '{}' was given missing parent '{}'; reference cleared",
                    block.name, parent_id
                ),
            }
        }
        block
            .job_ref()
            .and_then(|job_ref| self.job_by_ref(job_ref))
            .map(|job| job.id)
    }

    /// Removes a node and repairs everything that depended on it.
    ///
    /// Deleting a job runs in two phases: the structural removal of the job and its
    /// steps, then a re-derivation of every remaining job identifier by position,
    /// cascaded onto the steps still attached to each job.
    pub fn delete_node(&mut self, id: NodeId) -> Option<VisualNode> {
        let (kind, index) = self.locate(id)?;
        let collection = self.collection_mut(kind);
        let removed = collection.remove(index);
        repair::renumber(collection);

        if kind == BlockKind::Job {
            let orphaned = repair::remove_children(&mut self.steps, id);
            debug!(
                "Deleted job '{}' along with {} step(s)",
                id,
                orphaned.len()
            );
            repair::rederive_job_identifiers(&mut self.jobs, &mut self.steps, &self.job_id_prefix);
            self.adopt_orphans();
        } else {
            debug!("Deleted {} node '{}'", kind, id);
        }

        self.notifier.schedule();
        Some(removed)
    }

    /// Replaces the block payload of a node. Order and kind are kept.
    ///
    /// A job keeps its identifier; use [`NodeStore::rename_job`] to change it. A step
    /// stays with its job and takes that job's identifier, unless the new payload's
    /// `job_ref` names a different job, in which case the step moves to that job. A
    /// `job_ref` naming no job leaves the step unattached.
    pub fn update_node_data(&mut self, id: NodeId, mut block: Block) -> Result<(), StoreError> {
        let (kind, index) = self.locate(id).ok_or(StoreError::NodeNotFound(id))?;
        block.kind = kind;
        let mut parent_id = self.collection(kind)[index].parent_id;

        match kind {
            BlockKind::Trigger => {}
            BlockKind::Job => {
                let current = self.jobs[index].block.job_ref.clone();
                if let Some(requested) = block.job_ref().filter(|r| Some(*r) != current.as_deref()) {
                    debug!(
                        "Keeping identifier of job '{}'; '{}' must go through rename_job",
                        id, requested
                    );
                }
                block.job_ref = current;
            }
            BlockKind::Step => parent_id = self.relink_step(&mut block, parent_id),
        }

        let node = &mut self.collection_mut(kind)[index];
        node.block = block;
        node.parent_id = parent_id;
        debug!("Updated {} node '{}'", kind, id);
        self.notifier.schedule();
        Ok(())
    }

    /// Keeps a step's `parent_id` and `job_ref` naming the same job after its payload
    /// changed. The payload's `job_ref` wins when set.
    fn relink_step(&self, block: &mut Block, current_parent: Option<NodeId>) -> Option<NodeId> {
        if let Some(job_ref) = block.job_ref() {
            let job = self.job_by_ref(job_ref);
            if job.is_none() {
                debug!(
                    "Step '{}' names unknown job '{}'; left unattached",
                    block.name, job_ref
                );
            }
            return job.map(|job| job.id);
        }
        let job = current_parent.and_then(|parent| self.jobs.iter().find(|job| job.id == parent))?;
        block.job_ref = job.block.job_ref.clone();
        Some(job.id)
    }

    /// Attaches every unattached step whose `job_ref` names an existing job.
    fn adopt_orphans(&mut self) -> usize {
        let adopted = repair::adopt_orphans(&mut self.steps, &self.jobs);
        if adopted > 0 {
            debug!("{} unattached step(s) joined their job", adopted);
        }
        adopted
    }

    /// Sets `job_ref` on every step attached to the job node `job_id`.
    pub fn cascade_job_rename(&mut self, job_id: NodeId, new_job_ref: &str) -> usize {
        let touched = repair::cascade(&mut self.steps, job_id, new_job_ref);
        if touched > 0 {
            debug!(
                "Cascaded job identifier '{}' onto {} step(s)",
                new_job_ref, touched
            );
            self.notifier.schedule();
        }
        touched
    }

    /// Changes a job's identifier and cascades it onto its steps.
    pub fn rename_job(&mut self, job_id: NodeId, new_job_ref: &str) -> Result<usize, StoreError> {
        let job = self.node_mut(job_id)?;
        if job.kind != BlockKind::Job {
            return Err(StoreError::KindMismatch {
                id: job_id,
                expected: BlockKind::Job,
                found: job.kind,
            });
        }
        job.block.job_ref = Some(new_job_ref.to_string());
        self.notifier.schedule();
        let touched = self.cascade_job_rename(job_id, new_job_ref);
        self.adopt_orphans();
        Ok(touched)
    }

    /// Moves a node to `new_index` within its collection (clamped to the last position).
    pub fn move_node(&mut self, id: NodeId, new_index: usize) -> Result<(), StoreError> {
        let (kind, index) = self.locate(id).ok_or(StoreError::NodeNotFound(id))?;
        let collection = self.collection_mut(kind);
        let target = new_index.min(collection.len() - 1);
        if target != index {
            let node = collection.remove(index);
            collection.insert(target, node);
            repair::renumber(collection);
            debug!("Moved {} node '{}' from {} to {}", kind, id, index, target);
            self.notifier.schedule();
        }
        Ok(())
    }

    /// Clears any step parent reference that names a missing job.
    pub fn repair_dangling_parents(&mut self) -> usize {
        let repaired = repair::clear_dangling_parents(&mut self.steps, &self.jobs);
        if repaired > 0 {
            self.notifier.schedule();
        }
        repaired
    }

    /// Empties all three collections.
    pub fn clear(&mut self) {
        self.triggers.clear();
        self.jobs.clear();
        self.steps.clear();
        info!("Node store cleared");
        self.notifier.schedule();
    }

    /// Replaces the store's contents with `blocks`, keeping their job identifiers.
    ///
    /// Blocks are loaded kind by kind so a step can find its job regardless of input
    /// order. A second trigger is dropped; a job without an identifier gets a derived
    /// one; a step whose `job_ref` matches no job is kept unattached.
    pub fn rehydrate(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.triggers.clear();
        self.jobs.clear();
        self.steps.clear();

        let mut blocks: Vec<Block> = blocks.into_iter().collect();
        // Stable, so each kind keeps its relative order.
        blocks.sort_by_key(|block| block.kind as u8);

        for mut block in blocks {
            match block.kind {
                BlockKind::Trigger if !self.triggers.is_empty() => {
                    warn!("Dropping extra trigger '{}' during rehydration", block.name);
                }
                BlockKind::Trigger => {
                    self.triggers.push(VisualNode::new(BlockKind::Trigger, block, 0, None));
                }
                BlockKind::Job => {
                    if block.job_ref().is_none() {
                        block.job_ref = Some(self.next_job_identifier());
                    }
                    let order = self.jobs.len();
                    self.jobs.push(VisualNode::new(BlockKind::Job, block, order, None));
                }
                BlockKind::Step => {
                    let parent_id = self.resolve_step_parent(&mut block, None);
                    if parent_id.is_none() {
                        debug!("Step '{}' rehydrated without a job", block.name);
                    }
                    let order = self.steps.len();
                    self.steps.push(VisualNode::new(BlockKind::Step, block, order, parent_id));
                }
            }
        }

        info!(
            "Rehydrated store: {} trigger(s), {} job(s), {} step(s)",
            self.triggers.len(),
            self.jobs.len(),
            self.steps.len()
        );
        self.notifier.schedule();
    }

    /// Registers an observer for settled block lists.
    pub fn subscribe(&mut self, observer: impl BlockListObserver + 'static) {
        self.notifier.subscribe(Box::new(observer));
    }

    pub fn has_pending_changes(&self) -> bool {
        self.notifier.is_pending()
    }

    /// Delivers at most one notification covering every mutation since the last flush.
    ///
    /// Call this at the host's quiescent point (end of a user gesture or event-loop
    /// turn). Returns `true` when a notification was due.
    pub fn flush_notifications(&mut self) -> bool {
        if !self.notifier.take_pending() {
            return false;
        }
        let blocks = convert::to_blocks(self);
        let delivered = self.notifier.deliver(&blocks);
        debug!(
            "Delivered {} block(s) to {} observer(s)",
            blocks.len(),
            delivered
        );
        true
    }
}
