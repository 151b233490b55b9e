use crate::block::{Block, BlockKind, ConfigMap, ConfigValue};
use crate::error::DocumentError;
use tracing::{debug, warn};

/// Top-level key holding the job mapping of a workflow document.
pub const JOBS_KEY: &str = "jobs";
/// Key holding a job's step sequence.
pub const STEPS_KEY: &str = "steps";

const DEFAULT_TRIGGER_NAME: &str = "Trigger";
const DEFAULT_STEP_NAME: &str = "Step";

/// Parses workflow text (YAML, or JSON which YAML accepts) into a configuration value.
///
/// Text that is blank or holds only comments yields `Ok(None)`.
pub fn parse_document(text: &str) -> Result<Option<ConfigValue>, DocumentError> {
    let has_content = text.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(None);
    }
    let value: ConfigValue = serde_yaml::from_str(text)?;
    Ok(Some(value).filter(|value| !value.is_null()))
}

/// Parses a persisted block list.
pub fn parse_blocks(json: &str) -> Result<Vec<Block>, DocumentError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads an external workflow document back into an ordered block list.
///
/// Every top-level field other than `jobs` becomes the trigger's configuration,
/// verbatim and in order; no trigger is produced when there are no such fields. Each
/// `jobs` entry becomes a job block keyed by its map key, followed by one step block
/// per element of its `steps` sequence.
///
/// Parsing is permissive: a missing document, a non-mapping document or a non-mapping
/// `jobs` produce nothing, a missing or non-sequence `steps` produces no steps, and
/// step elements that are not mappings are skipped.
pub fn from_document(doc: Option<&ConfigValue>) -> Vec<Block> {
    let Some(root) = doc.and_then(ConfigValue::as_mapping) else {
        if doc.is_some_and(|value| !value.is_null()) {
            warn!("Workflow document is not a mapping; nothing to load");
        }
        return Vec::new();
    };

    let mut blocks = Vec::new();

    let trigger_config: ConfigMap = root
        .iter()
        .filter(|(key, _)| key.as_str() != JOBS_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !trigger_config.is_empty() {
        let name = display_name(&trigger_config, DEFAULT_TRIGGER_NAME);
        blocks.push(Block::trigger(name).with_config(trigger_config));
    }

    let jobs = match root.get(JOBS_KEY) {
        Some(ConfigValue::Mapping(jobs)) => jobs,
        Some(other) if !other.is_null() => {
            warn!("'{}' is not a mapping; treating it as empty", JOBS_KEY);
            return blocks;
        }
        _ => return blocks,
    };

    for (job_key, entry) in jobs {
        let Some(entry) = entry.as_mapping() else {
            warn!("Job '{}' is not a mapping; loading it without configuration", job_key);
            blocks.push(Block::job(job_key.clone()).with_job_ref(job_key.clone()));
            continue;
        };

        let mut job_config = entry.clone();
        let steps = job_config.shift_remove(STEPS_KEY);
        let name = display_name(&job_config, job_key);
        blocks.push(
            Block::job(name)
                .with_job_ref(job_key.clone())
                .with_config(job_config),
        );

        match steps {
            Some(ConfigValue::Sequence(steps)) => {
                blocks.extend(read_steps(job_key, steps));
            }
            Some(ConfigValue::Null) | None => {}
            Some(_) => warn!("Steps of job '{}' are not a sequence; skipped", job_key),
        }
    }

    debug!("Read {} block(s) from workflow document", blocks.len());
    blocks
}

fn read_steps(job_key: &str, steps: Vec<ConfigValue>) -> impl Iterator<Item = Block> + '_ {
    steps
        .into_iter()
        .enumerate()
        .filter_map(move |(index, step)| match step {
            ConfigValue::Mapping(config) => {
                let name = display_name(&config, DEFAULT_STEP_NAME);
                Some(
                    Block::new(BlockKind::Step, name)
                        .with_job_ref(job_key)
                        .with_config(config),
                )
            }
            _ => {
                warn!("Step {} of job '{}' is not a mapping; skipped", index, job_key);
                None
            }
        })
}

fn display_name(config: &ConfigMap, fallback: &str) -> String {
    config
        .get("name")
        .and_then(ConfigValue::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
