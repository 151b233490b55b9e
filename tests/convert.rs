//! Tests for store flattening and workflow document import.
mod common;
use common::*;
use pipeblocks::prelude::*;
use serde_json::json;

#[cfg(test)]
mod conversion_tests {
    use super::*;

    fn names(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_to_blocks_groups_steps_under_their_jobs() {
        let pipeline = create_pipeline();
        let blocks = to_blocks(&pipeline.store);

        // Steps were added interleaved but come out grouped by job.
        assert_eq!(
            names(&blocks),
            vec!["CI", "Build", "Checkout", "Compile", "Test", "Unit tests"]
        );
        assert_eq!(blocks[0].kind, BlockKind::Trigger);
        assert_eq!(blocks[2].job_ref(), Some("job1"));
        assert_eq!(blocks[5].job_ref(), Some("job2"));
    }

    #[test]
    fn test_to_blocks_follows_job_collection_order() {
        let mut pipeline = create_pipeline();
        pipeline.store.move_node(pipeline.test, 0).unwrap();

        let blocks = to_blocks(&pipeline.store);
        assert_eq!(
            names(&blocks),
            vec!["CI", "Test", "Unit tests", "Build", "Checkout", "Compile"]
        );
    }

    #[test]
    fn test_to_blocks_appends_detached_steps() {
        let mut pipeline = create_pipeline();
        pipeline
            .store
            .add_node(BlockKind::Step, run_step("Stray", "true"), None)
            .unwrap();
        pipeline
            .store
            .add_node(
                BlockKind::Step,
                run_step("Lost", "false").with_job_ref("nowhere"),
                None,
            )
            .unwrap();

        let blocks = to_blocks(&pipeline.store);
        assert_eq!(blocks.len(), 8);
        assert_eq!(names(&blocks[6..]), vec!["Stray", "Lost"]);
        assert_eq!(blocks[7].job_ref(), Some("nowhere"));
    }

    #[test]
    fn test_to_blocks_is_deterministic() {
        let pipeline = create_pipeline();
        assert_eq!(to_blocks(&pipeline.store), to_blocks(&pipeline.store));
    }

    #[test]
    fn test_to_blocks_empty_store() {
        assert!(to_blocks(&NodeStore::new()).is_empty());
    }

    #[test]
    fn test_from_document_reads_trigger_jobs_and_steps() {
        let doc = ConfigValue::from(json!({
            "name": "CI",
            "on": { "push": { "branches": ["main"] } },
            "jobs": {
                "build": {
                    "runs-on": "ubuntu-latest",
                    "steps": [
                        { "name": "Checkout", "uses": "actions/checkout@v4" },
                        { "run": "cargo build" }
                    ]
                },
                "lint": { "name": "Lint", "runs-on": "ubuntu-latest" }
            }
        }));

        let blocks = from_document(Some(&doc));
        assert_eq!(
            names(&blocks),
            vec!["CI", "build", "Checkout", "Step", "Lint"]
        );

        let trigger = &blocks[0];
        assert_eq!(trigger.kind, BlockKind::Trigger);
        let keys: Vec<&str> = trigger.config.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "on"]);

        let build = &blocks[1];
        assert_eq!(build.kind, BlockKind::Job);
        assert_eq!(build.job_ref(), Some("build"));
        assert!(build.config.get("steps").is_none());
        assert_eq!(
            build.config.get("runs-on").and_then(ConfigValue::as_str),
            Some("ubuntu-latest")
        );

        assert_eq!(blocks[3].kind, BlockKind::Step);
        assert_eq!(blocks[3].job_ref(), Some("build"));
        assert_eq!(blocks[4].job_ref(), Some("lint"));
    }

    #[test]
    fn test_from_document_without_trigger_fields() {
        let doc = ConfigValue::from(json!({ "jobs": { "build": { "runs-on": "x" } } }));
        let blocks = from_document(Some(&doc));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Job);
    }

    #[test]
    fn test_from_document_is_permissive() {
        assert!(from_document(None).is_empty());
        assert!(from_document(Some(&ConfigValue::from("just text"))).is_empty());
        assert!(from_document(Some(&ConfigValue::Null)).is_empty());

        // `jobs` that is not a mapping yields only the trigger.
        let doc = ConfigValue::from(json!({ "name": "CI", "jobs": ["build"] }));
        let blocks = from_document(Some(&doc));
        assert_eq!(names(&blocks), vec!["CI"]);

        // Non-sequence steps and non-mapping step elements are skipped.
        let doc = ConfigValue::from(json!({
            "jobs": {
                "a": { "steps": "echo hi" },
                "b": { "steps": ["echo hi", { "run": "make" }, 3] },
                "c": null
            }
        }));
        let blocks = from_document(Some(&doc));
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Job, BlockKind::Job, BlockKind::Step, BlockKind::Job]
        );
        assert!(blocks[3].config.is_empty());
        assert_eq!(blocks[3].job_ref(), Some("c"));
    }

    #[test]
    fn test_parse_document_handles_blank_and_comment_only_text() {
        assert!(parse_document("").unwrap().is_none());
        assert!(parse_document("   \n\n").unwrap().is_none());
        assert!(parse_document("# Add a trigger block to start building the workflow\n")
            .unwrap()
            .is_none());
        assert!(parse_document("~\n").unwrap().is_none());
    }

    #[test]
    fn test_parse_document_reads_yaml() {
        let text = "\
name: CI
on:
  push:
    branches: [main]
jobs:
  build:
    runs-on: ubuntu-latest
    timeout-minutes: 30
";
        let doc = parse_document(text).unwrap().expect("document has content");
        let blocks = from_document(Some(&doc));
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].config.get("timeout-minutes"),
            Some(&ConfigValue::Number(30.0))
        );
    }

    #[test]
    fn test_parse_document_accepts_integers_beyond_u64() {
        let doc = parse_document("big: 100000000000000000000\nsmall: -170141183460469231731687303715884105728\n")
            .unwrap()
            .expect("document has content");
        assert_eq!(doc.get("big"), Some(&ConfigValue::Number(1e20)));
        assert_eq!(doc.get("small"), Some(&ConfigValue::Number(-(2f64.powi(127)))));
    }

    #[test]
    fn test_parse_document_rejects_invalid_yaml() {
        let result = parse_document("jobs: [unterminated\n");
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_parse_blocks_reads_persisted_list() {
        let json = r#"[
            { "name": "CI", "kind": "trigger", "config": { "name": "CI", "on": "push" } },
            { "name": "Build", "kind": "Job", "jobRef": "job1", "config": { "runs-on": "ubuntu-latest" } },
            { "name": "Checkout", "kind": "step", "jobRef": "job1", "tags": ["git"],
              "config": { "uses": "actions/checkout@v4" } }
        ]"#;
        let blocks = parse_blocks(json).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].job_ref(), Some("job1"));
        assert_eq!(blocks[2].tags, vec!["git".to_string()]);

        assert!(matches!(parse_blocks("{"), Err(DocumentError::Blocks(_))));
    }

    #[test]
    fn test_block_list_keeps_display_metadata() {
        let described = checkout_step()
            .with_job_ref("job1")
            .with_description("Clones the repository");
        let json = serde_json::to_string(&vec![described.clone()]).unwrap();
        assert!(json.contains(r#""description":"Clones the repository""#));
        assert!(json.contains(r#""jobRef":"job1""#));

        let loaded = parse_blocks(&json).unwrap();
        assert_eq!(loaded, vec![described.clone()]);

        // Descriptions never reach the document.
        let plain = checkout_step().with_job_ref("job1");
        assert!(described.same_semantics(&plain));
        assert_ne!(described, plain);
    }
}
