use super::WorkflowDocument;
use crate::block::{Block, BlockKind, ConfigMap, ConfigValue};
use crate::convert::{JOBS_KEY, STEPS_KEY};
use ahash::AHashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

const FALLBACK_JOB_ID: &str = "job";

/// Normalizes a display name into a job identifier.
///
/// Lower-cases, turns each run of internal whitespace into a single `-`, strips every
/// character outside `[a-z0-9-_]`, and falls back to `"job"` when nothing is left.
pub fn normalize_job_id(name: &str) -> String {
    let id: String = name
        .to_lowercase()
        .split_whitespace()
        .join("-")
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_'))
        .collect();
    if id.is_empty() {
        FALLBACK_JOB_ID.to_string()
    } else {
        id
    }
}

/// The key a job block is stored under in the assembled document.
pub fn job_key(block: &Block) -> String {
    block
        .job_ref()
        .map(str::to_string)
        .unwrap_or_else(|| normalize_job_id(&block.name))
}

/// Folds an ordered block list into one workflow document.
///
/// Trigger fields land at the top level in their own order. Each job becomes
/// `jobs.<id>` (later jobs with the same id overwrite earlier ones), and each step whose
/// `job_ref` names a known job is appended to that job's `steps`. Steps naming no job are
/// left out of the document.
pub fn assemble(blocks: &[Block]) -> WorkflowDocument {
    let mut root = ConfigMap::new();

    for trigger in blocks.iter().filter(|b| b.kind == BlockKind::Trigger) {
        for (key, value) in &trigger.config {
            if key == JOBS_KEY {
                debug!("Ignoring '{}' key in trigger '{}'", JOBS_KEY, trigger.name);
                continue;
            }
            root.insert(key.clone(), value.clone());
        }
    }

    let mut jobs: IndexMap<String, ConfigMap> = IndexMap::new();
    for job in blocks.iter().filter(|b| b.kind == BlockKind::Job) {
        let mut config = job.config.clone();
        config.shift_remove(STEPS_KEY);
        jobs.insert(job_key(job), config);
    }

    let mut steps_by_job: AHashMap<&str, Vec<ConfigValue>> = AHashMap::new();
    for step in blocks.iter().filter(|b| b.kind == BlockKind::Step) {
        match step.job_ref().filter(|job_ref| jobs.contains_key(*job_ref)) {
            Some(job_ref) => steps_by_job
                .entry(job_ref)
                .or_default()
                .push(step_entry(step)),
            None => debug!(
                "Step '{}' has no matching job ({:?}); left out of the document",
                step.name, step.job_ref
            ),
        }
    }

    if !jobs.is_empty() {
        let jobs: ConfigMap = jobs
            .into_iter()
            .map(|(id, mut config)| {
                if let Some(steps) = steps_by_job.remove(id.as_str()) {
                    config.insert(STEPS_KEY.to_string(), ConfigValue::Sequence(steps));
                }
                (id, ConfigValue::Mapping(config))
            })
            .collect();
        root.insert(JOBS_KEY.to_string(), ConfigValue::Mapping(jobs));
    }

    WorkflowDocument::from_root(root)
}

/// Builds the document entry of a step: `name` first, then the rest of its config.
fn step_entry(step: &Block) -> ConfigValue {
    let mut entry = ConfigMap::with_capacity(step.config.len() + 1);
    let name = step
        .config
        .get("name")
        .cloned()
        .unwrap_or_else(|| ConfigValue::String(step.name.clone()));
    entry.insert("name".to_string(), name);
    entry.extend(
        step.config
            .iter()
            .filter(|(key, _)| key.as_str() != "name")
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    ConfigValue::Mapping(entry)
}
