//! The editing session: validator, store, presentation state and rendering wired
//! together along the user-action data flow.

use crate::block::{Block, ConfigValue};
use crate::convert::{self, parse_document};
use crate::error::{DocumentError, DropRejection, StoreError};
use crate::store::{BlockListObserver, DEFAULT_JOB_ID_PREFIX, NodeId, NodeStore, VisualNode};
use crate::validate::{DropPlan, DropRule, DropTarget, DropValidator, DropValidatorBuilder, Placement};
use crate::workflow::{
    self, EMPTY_DOCUMENT_COMMENT, SerializerOptions, WorkflowDocument, assemble,
};
use tracing::{debug, info};

mod presentation;

pub use presentation::*;

/// One editing session over a pipeline.
///
/// User actions go through [`Editor::drop_block`] (validated) or the edit methods;
/// observers registered with [`Editor::subscribe`] receive the converted block list
/// once per [`Editor::settle`], however many mutations happened in between.
pub struct Editor {
    store: NodeStore,
    validator: DropValidator,
    presentation: PresentationState,
    serializer: SerializerOptions,
    empty_document_comment: String,
}

pub struct EditorBuilder {
    job_id_prefix: String,
    serializer: SerializerOptions,
    empty_document_comment: String,
    validator: DropValidatorBuilder,
}

impl EditorBuilder {
    pub fn new() -> Self {
        Self {
            job_id_prefix: DEFAULT_JOB_ID_PREFIX.to_string(),
            serializer: SerializerOptions::default(),
            empty_document_comment: EMPTY_DOCUMENT_COMMENT.to_string(),
            validator: DropValidator::builder(),
        }
    }

    pub fn job_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.job_id_prefix = prefix.into();
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.serializer.indent = indent.max(1);
        self
    }

    pub fn empty_config_comment(mut self, comment: impl Into<String>) -> Self {
        self.serializer.empty_comment = comment.into();
        self
    }

    pub fn empty_document_comment(mut self, comment: impl Into<String>) -> Self {
        self.empty_document_comment = comment.into();
        self
    }

    pub fn with_drop_rule(mut self, rule: Box<dyn DropRule>) -> Self {
        self.validator = self.validator.with_rule(rule);
        self
    }

    pub fn build(self) -> Editor {
        Editor {
            store: NodeStore::with_job_id_prefix(self.job_id_prefix),
            validator: self.validator.build(),
            presentation: PresentationState::default(),
            serializer: self.serializer,
            empty_document_comment: self.empty_document_comment,
        }
    }
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Editor {
    fn default() -> Self {
        EditorBuilder::new().build()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EditorBuilder {
        EditorBuilder::new()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut PresentationState {
        &mut self.presentation
    }

    /// Validates a dropped block and, when accepted, applies it to the store.
    ///
    /// A trigger dropped while one exists replaces the existing trigger's payload.
    /// Returns the id of the node that now holds the block.
    pub fn drop_block(&mut self, block: Block, target: DropTarget) -> Result<NodeId, DropRejection> {
        let plan = self.validator.validate(&block, target, &self.store)?;
        self.apply(block, plan)
    }

    /// Same as [`Editor::drop_block`] for a serialized block descriptor.
    pub fn drop_descriptor(&mut self, raw: &str, target: DropTarget) -> Result<NodeId, DropRejection> {
        let (block, plan) = self.validator.validate_descriptor(raw, target, &self.store)?;
        self.apply(block, plan)
    }

    fn apply(&mut self, block: Block, plan: DropPlan) -> Result<NodeId, DropRejection> {
        match plan.placement {
            Placement::Insert => self
                .store
                .add_node(plan.kind, block, plan.parent_id)
                .map(|node| node.id)
                .ok_or(DropRejection::DuplicateTrigger),
            Placement::ReplaceTrigger(id) => {
                debug!("Replacing trigger '{}'", id);
                self.store
                    .update_node_data(id, block)
                    .map_err(|e| DropRejection::Custom(e.to_string()))?;
                Ok(id)
            }
        }
    }

    /// Replaces a node's payload. See [`NodeStore::update_node_data`] for how job
    /// identifiers are kept.
    pub fn update_block(&mut self, id: NodeId, block: Block) -> Result<(), StoreError> {
        self.store.update_node_data(id, block)
    }

    pub fn rename_job(&mut self, id: NodeId, new_job_ref: &str) -> Result<usize, StoreError> {
        self.store.rename_job(id, new_job_ref)
    }

    pub fn move_node(&mut self, id: NodeId, new_index: usize) -> Result<(), StoreError> {
        self.store.move_node(id, new_index)
    }

    /// Deletes a node (and, for a job, its steps), dropping the flags of removed nodes.
    pub fn delete_node(&mut self, id: NodeId) -> Option<VisualNode> {
        let removed = self.store.delete_node(id)?;
        let store = &self.store;
        self.presentation
            .retain_existing(|id| store.node(id).is_some());
        Some(removed)
    }

    pub fn select(&mut self, id: NodeId) {
        if self.store.node(id).is_some() {
            self.presentation.select(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.presentation.deselect_all();
    }

    pub fn set_editing(&mut self, id: NodeId, editing: bool) {
        if self.store.node(id).is_some() {
            self.presentation.set_editing(id, editing);
        }
    }

    /// Empties the session.
    pub fn reset(&mut self) {
        self.store.clear();
        self.presentation.clear();
    }

    /// Seeds the session from an already parsed workflow document. Returns the number
    /// of nodes loaded.
    pub fn load_document(&mut self, doc: Option<&ConfigValue>) -> usize {
        let blocks = convert::from_document(doc);
        self.load_blocks(blocks)
    }

    /// Seeds the session from workflow text.
    pub fn load_yaml(&mut self, text: &str) -> Result<usize, DocumentError> {
        let doc = parse_document(text)?;
        Ok(self.load_document(doc.as_ref()))
    }

    /// Seeds the session from a persisted block list.
    pub fn load_blocks(&mut self, blocks: Vec<Block>) -> usize {
        self.presentation.clear();
        self.store.rehydrate(blocks);
        info!("Session loaded with {} node(s)", self.store.len());
        self.store.len()
    }

    pub fn subscribe(&mut self, observer: impl BlockListObserver + 'static) {
        self.store.subscribe(observer);
    }

    /// Marks the end of a user gesture and delivers the pending notification, if any.
    pub fn settle(&mut self) -> bool {
        self.store.flush_notifications()
    }

    /// The ordered block list handed to persistence.
    pub fn blocks(&self) -> Vec<Block> {
        convert::to_blocks(&self.store)
    }

    pub fn document(&self) -> WorkflowDocument {
        assemble(&self.blocks())
    }

    /// The full workflow text.
    pub fn render(&self) -> String {
        workflow::render_document(&self.blocks(), &self.serializer, &self.empty_document_comment)
    }

    /// The configuration preview of one node.
    pub fn render_node(&self, id: NodeId) -> Option<String> {
        self.store
            .node(id)
            .map(|node| workflow::render_block(&node.block, &self.serializer))
    }
}
