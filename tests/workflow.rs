//! Tests for document assembly and YAML rendering.
mod common;
use common::*;
use pipeblocks::prelude::*;
use pipeblocks::workflow::{EMPTY_CONFIG_COMMENT, EMPTY_DOCUMENT_COMMENT, render_block, render_document};
use serde_json::json;

#[cfg(test)]
mod workflow_tests {
    use super::*;

    #[test]
    fn test_assemble_single_job_pipeline() {
        let blocks = vec![
            ci_trigger(),
            ubuntu_job("Build").with_job_ref("job1"),
            checkout_step().with_job_ref("job1"),
        ];
        let doc = assemble(&blocks);

        let expected = ConfigValue::from(json!({
            "name": "CI",
            "on": { "push": { "branches": ["main"] } },
            "jobs": {
                "job1": {
                    "runs-on": "ubuntu-latest",
                    "steps": [{ "name": "Checkout", "uses": "actions/checkout@v4" }]
                }
            }
        }));
        assert_eq!(doc.into_value(), expected);
    }

    #[test]
    fn test_assemble_keeps_trigger_field_order() {
        let trigger = Block::trigger("CI").with_config(config(json!({
            "on": "push",
            "name": "CI",
            "env": { "RUST_LOG": "debug" }
        })));
        let doc = assemble(&[trigger]);
        let keys: Vec<&str> = doc.root().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["on", "name", "env"]);
        assert!(doc.jobs().is_none(), "no jobs key without job blocks");
    }

    #[test]
    fn test_assemble_ignores_jobs_key_in_trigger() {
        let trigger = Block::trigger("CI").with_config(config(json!({
            "name": "CI",
            "jobs": { "sneaky": {} }
        })));
        let doc = assemble(&[trigger, ubuntu_job("Build").with_job_ref("build")]);
        let jobs = doc.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(jobs.contains_key("build"));
    }

    #[test]
    fn test_assemble_omits_orphaned_steps() {
        let blocks = vec![
            ci_trigger(),
            ubuntu_job("Build").with_job_ref("job1"),
            run_step("Orphan", "true").with_job_ref("job9"),
            run_step("Unassigned", "true"),
        ];
        let doc = assemble(&blocks);
        let job = doc.jobs().unwrap().get("job1").unwrap();
        assert!(job.get("steps").is_none(), "empty steps are not emitted");
    }

    #[test]
    fn test_assemble_steps_follow_list_order_and_lead_with_name() {
        let blocks = vec![
            ci_trigger(),
            ubuntu_job("Build").with_job_ref("build"),
            Block::step("Compile")
                .with_job_ref("build")
                .with_config(config(json!({ "run": "cargo build" }))),
            checkout_step().with_job_ref("build"),
        ];
        let doc = assemble(&blocks);
        let steps = doc.jobs().unwrap()["build"].get("steps").unwrap();
        let steps = steps.as_sequence().unwrap();

        assert_eq!(steps.len(), 2);
        let first = steps[0].as_mapping().unwrap();
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "run"]);
        assert_eq!(first["name"], ConfigValue::from("Compile"));
        assert_eq!(steps[1].get("uses"), Some(&ConfigValue::from("actions/checkout@v4")));
    }

    #[test]
    fn test_assemble_later_job_with_same_id_wins() {
        let blocks = vec![
            ubuntu_job("First").with_job_ref("build"),
            Block::job("Second")
                .with_job_ref("build")
                .with_config(config(json!({ "runs-on": "macos-latest" }))),
        ];
        let doc = assemble(&blocks);
        let jobs = doc.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs["build"].get("runs-on"),
            Some(&ConfigValue::from("macos-latest"))
        );
    }

    #[test]
    fn test_assemble_derives_job_key_from_name() {
        let blocks = vec![ubuntu_job("  Build & Test  ")];
        let doc = assemble(&blocks);
        assert!(doc.jobs().unwrap().contains_key("build--test"));
    }

    #[test]
    fn test_assemble_drops_steps_key_from_job_config() {
        let job = Block::job("Build")
            .with_job_ref("build")
            .with_config(config(json!({ "runs-on": "x", "steps": [{ "run": "stale" }] })));
        let doc = assemble(&[job]);
        assert!(doc.jobs().unwrap()["build"].get("steps").is_none());
    }

    #[test]
    fn test_normalize_job_id() {
        assert_eq!(normalize_job_id("Build"), "build");
        assert_eq!(normalize_job_id("Unit   Tests"), "unit-tests");
        assert_eq!(normalize_job_id("  deploy_prod  "), "deploy_prod");
        assert_eq!(normalize_job_id("Release v1.2"), "release-v12");
        assert_eq!(normalize_job_id("!!!"), "job");
        assert_eq!(normalize_job_id(""), "job");
    }

    #[test]
    fn test_serialize_github_style_document() {
        let blocks = vec![
            ci_trigger(),
            ubuntu_job("Build").with_job_ref("job1"),
            checkout_step().with_job_ref("job1"),
            Block::step("Test")
                .with_job_ref("job1")
                .with_config(config(json!({
                    "name": "Test",
                    "run": "cargo test --all",
                    "with": { "toolchain": "stable" }
                }))),
        ];
        let expected = "\
name: CI
on:
  push:
    branches:
      - main
jobs:
  job1:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout
        uses: actions/checkout@v4
      - name: Test
        run: cargo test --all
        with:
          toolchain: stable
";
        assert_eq!(assemble(&blocks).to_yaml(), expected);
    }

    #[test]
    fn test_serialize_custom_indent() {
        let value = ConfigValue::from(json!({ "a": { "b": [1, 2] } }));
        let options = SerializerOptions {
            indent: 4,
            ..SerializerOptions::default()
        };
        assert_eq!(serialize_with(&value, &options), "a:\n    b:\n        - 1\n        - 2\n");
    }

    #[test]
    fn test_serialize_quotes_ambiguous_strings() {
        let value = ConfigValue::from(json!({
            "plain": "hello world",
            "bool": "true",
            "number": "42",
            "empty": "",
            "colon": "key: value",
            "comment": "# note",
            "padded": " x ",
            "quote": "say \"hi\""
        }));
        let text = serialize(&value);
        assert!(text.contains("plain: hello world\n"));
        assert!(text.contains("bool: \"true\"\n"));
        assert!(text.contains("number: \"42\"\n"));
        assert!(text.contains("empty: \"\"\n"));
        assert!(text.contains("colon: \"key: value\"\n"));
        assert!(text.contains("comment: \"# note\"\n"));
        assert!(text.contains("padded: \" x \"\n"));

        // Whatever the quoting, the text reads back as the same value.
        assert_eq!(parse_document(&text).unwrap(), Some(value));
    }

    #[test]
    fn test_serialize_scalars() {
        let value = ConfigValue::from(json!({
            "count": 3,
            "ratio": 1.5,
            "enabled": false,
            "missing": null,
            "empty-map": {},
            "empty-list": []
        }));
        assert_eq!(
            serialize(&value),
            "count: 3\nratio: 1.5\nenabled: false\nmissing: null\nempty-map: {}\nempty-list: []\n"
        );
    }

    #[test]
    fn test_serialize_large_whole_numbers_read_back() {
        let value = ConfigValue::from(json!({ "big": 1e20, "negative": -3e18, "limit": 1e15 }));
        let text = serialize(&value);
        assert_eq!(text, "big: 1e20\nnegative: -3e18\nlimit: 1e15\n");
        assert_eq!(parse_document(&text).unwrap(), Some(value));
    }

    #[test]
    fn test_serialize_multiline_strings_as_literal_blocks() {
        let step = ConfigValue::from(json!({
            "steps": [{ "name": "Build", "run": "cargo build\ncargo test\n" }]
        }));
        let expected = "\
steps:
  - name: Build
    run: |
      cargo build
      cargo test
";
        let text = serialize(&step);
        assert_eq!(text, expected);
        assert_eq!(parse_document(&text).unwrap(), Some(step));

        let no_trailing = ConfigValue::from(json!({ "script": "echo a\necho b" }));
        let text = serialize(&no_trailing);
        assert_eq!(text, "script: |-\n  echo a\n  echo b\n");
        assert_eq!(parse_document(&text).unwrap(), Some(no_trailing));
    }

    #[test]
    fn test_serialize_is_idempotent_through_parse() {
        let value = ConfigValue::from(json!({
            "name": "Nightly",
            "on": { "schedule": [{ "cron": "0 3 * * *" }] },
            "env": { "MODE": "yes", "LEVEL": "3", "PATH": "/usr/bin:/bin" },
            "jobs": {
                "report": {
                    "runs-on": "ubuntu-latest",
                    "steps": [
                        { "name": "Run", "run": "make report\nmake upload\n" },
                        { "name": "Matrix", "with": { "versions": [["a", "b"], []] } }
                    ]
                }
            }
        }));
        let first = serialize(&value);
        let reparsed = parse_document(&first).unwrap().expect("rendered text has content");
        assert_eq!(reparsed, value);
        assert_eq!(serialize(&reparsed), first);
    }

    #[test]
    fn test_serialize_empty_values_render_comment() {
        assert_eq!(serialize(&ConfigValue::mapping()), format!("{}\n", EMPTY_CONFIG_COMMENT));
        assert_eq!(serialize(&ConfigValue::Null), format!("{}\n", EMPTY_CONFIG_COMMENT));

        let options = SerializerOptions {
            empty_comment: "# nothing here".to_string(),
            ..SerializerOptions::default()
        };
        assert_eq!(serialize_with(&ConfigValue::mapping(), &options), "# nothing here\n");
    }

    #[test]
    fn test_render_document_and_block_views() {
        let options = SerializerOptions::default();
        assert_eq!(
            render_document(&[], &options, EMPTY_DOCUMENT_COMMENT),
            format!("{}\n", EMPTY_DOCUMENT_COMMENT)
        );

        assert_eq!(
            render_block(&Block::job("Empty"), &options),
            format!("{}\n", EMPTY_CONFIG_COMMENT)
        );
        assert_eq!(
            render_block(&ubuntu_job("Build"), &options),
            "runs-on: ubuntu-latest\n"
        );
    }
}
