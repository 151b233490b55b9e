//! Common test utilities for building blocks and stores.
use pipeblocks::prelude::*;
use serde_json::json;

/// Converts a JSON object literal into a configuration mapping, keeping key order.
#[allow(dead_code)]
pub fn config(value: serde_json::Value) -> ConfigMap {
    ConfigValue::from(value)
        .into_mapping()
        .expect("fixture config must be a JSON object")
}

/// `name: CI`, triggered on pushes to `main`.
#[allow(dead_code)]
pub fn ci_trigger() -> Block {
    Block::trigger("CI").with_config(config(json!({
        "name": "CI",
        "on": { "push": { "branches": ["main"] } }
    })))
}

#[allow(dead_code)]
pub fn ubuntu_job(name: &str) -> Block {
    Block::job(name).with_config(config(json!({ "runs-on": "ubuntu-latest" })))
}

#[allow(dead_code)]
pub fn checkout_step() -> Block {
    Block::step("Checkout").with_config(config(json!({
        "name": "Checkout",
        "uses": "actions/checkout@v4"
    })))
}

#[allow(dead_code)]
pub fn run_step(name: &str, command: &str) -> Block {
    Block::step(name).with_config(config(json!({ "name": name, "run": command })))
}

/// Node ids of the fixture built by [`create_pipeline`].
#[allow(dead_code)]
pub struct Pipeline {
    pub store: NodeStore,
    pub trigger: NodeId,
    pub build: NodeId,
    pub test: NodeId,
    pub build_steps: Vec<NodeId>,
    pub test_steps: Vec<NodeId>,
}

/// A trigger, a `build` job with two steps and a `test` job with one step.
///
/// Steps are added interleaved so collection order and job order differ.
#[allow(dead_code)]
pub fn create_pipeline() -> Pipeline {
    let mut store = NodeStore::new();
    let trigger = add(&mut store, BlockKind::Trigger, ci_trigger(), None);
    let build = add(&mut store, BlockKind::Job, ubuntu_job("Build"), None);
    let checkout = add(&mut store, BlockKind::Step, checkout_step(), Some(build));
    let test = add(&mut store, BlockKind::Job, ubuntu_job("Test"), None);
    let unit = add(
        &mut store,
        BlockKind::Step,
        run_step("Unit tests", "cargo test"),
        Some(test),
    );
    let compile = add(
        &mut store,
        BlockKind::Step,
        run_step("Compile", "cargo build --release"),
        Some(build),
    );

    Pipeline {
        store,
        trigger,
        build,
        test,
        build_steps: vec![checkout, compile],
        test_steps: vec![unit],
    }
}

#[allow(dead_code)]
pub fn add(store: &mut NodeStore, kind: BlockKind, block: Block, parent: Option<NodeId>) -> NodeId {
    store
        .add_node(kind, block, parent)
        .expect("fixture node should be accepted")
        .id
}

/// Asserts `order` is exactly `0..n` in every collection.
#[allow(dead_code)]
pub fn assert_dense_order(store: &NodeStore) {
    for kind in BlockKind::ALL {
        let orders: Vec<usize> = store.collection(kind).iter().map(|n| n.order).collect();
        let expected: Vec<usize> = (0..orders.len()).collect();
        assert_eq!(orders, expected, "{} collection order is not dense", kind);
    }
}
