// tests/property/scheduler.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use sqldag::artifacts::{ArtifactStore, ArtifactValue};
use sqldag::dag::NodeState;
use sqldag::engine::{CoreRuntime, ExecutionState, RunOptions, DEFAULT_MAX_ATTEMPTS};
use sqldag::exec::{NodeExecutor, RequestContext};
use sqldag::plan::Plan;
use sqldag_test_utils::builders::{NodeSpecBuilder, PlanBuilder};
use sqldag_test_utils::fakes::{FakeReasoner, FakeSqlEngine};

/// Random plans of analyzer nodes.
///
/// Node `i` may depend on earlier nodes through edges and through artifact
/// requirements (`out_j` is produced by node `j`). With `allow_back_edges`
/// the edge targets are unrestricted, so cycles appear.
fn plan_strategy(max_nodes: usize, allow_back_edges: bool) -> impl Strategy<Value = Plan> {
    (1..=max_nodes).prop_flat_map(move |n| {
        let edges = proptest::collection::vec((0..n, 0..n), 0..(2 * n));
        let requires = proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..3), n);

        (edges, requires).prop_map(move |(raw_edges, raw_requires)| {
            let mut builder = PlanBuilder::new();
            for (i, reqs) in raw_requires.into_iter().enumerate() {
                let mut node = NodeSpecBuilder::analyzer(&format!("n{i}")).produces(&format!("out_{i}"));
                let deps: BTreeSet<usize> = reqs
                    .into_iter()
                    .filter(|_| i > 0)
                    .map(|r| r % i)
                    .collect();
                for dep in deps {
                    node = node.requires(&format!("out_{dep}"));
                }
                builder = builder.node(node);
            }

            let mut seen = HashSet::new();
            for (a, b) in raw_edges {
                let (src, dst) = if allow_back_edges {
                    (a, b)
                } else if a < b {
                    (a, b)
                } else if b < a {
                    (b, a)
                } else {
                    continue;
                };
                if src != dst && seen.insert((src, dst)) {
                    builder = builder.edge(&format!("n{src}"), &format!("n{dst}"));
                }
            }

            builder.build()
        })
    })
}

fn failing_reasoner(plan: &Plan, failing: &[usize]) -> FakeReasoner {
    let mut reasoner = FakeReasoner::new();
    for idx in failing {
        if *idx < plan.nodes().len() {
            reasoner = reasoner.failing(&format!("n{idx}"));
        }
    }
    reasoner
}

proptest! {
    #[test]
    fn attempts_add_up_and_respect_the_cap(
        plan in plan_strategy(30, true),
        failing in proptest::collection::vec(0..30usize, 0..5),
        cap in 1..=DEFAULT_MAX_ATTEMPTS,
    ) {
        let reasoner = failing_reasoner(&plan, &failing);
        let state = ExecutionState::new(plan, RequestContext::default());
        let core = CoreRuntime::new(
            state,
            NodeExecutor::new(reasoner, FakeSqlEngine::new()),
            RunOptions { max_attempts: cap },
        );
        let (state, _executor) = core.run_to_completion();

        prop_assert!(state.total_attempts() <= cap);
        prop_assert_eq!(state.total_attempts(), state.node_status().total_attempts());
        for node in state.plan().nodes() {
            let status = state.node_status().get(&node.id);
            prop_assert!(status.attempts <= 1);
            prop_assert_ne!(status.state, NodeState::Running);
        }
    }

    #[test]
    fn no_node_runs_before_its_predecessors_and_inputs(
        plan in plan_strategy(12, false),
        failing in proptest::collection::vec(0..12usize, 0..3),
    ) {
        let reasoner = failing_reasoner(&plan, &failing);
        let calls = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let reasoner = reasoner.with_calls(calls.clone());

        let state = ExecutionState::new(plan.clone(), RequestContext::default());
        let core = CoreRuntime::new(
            state,
            NodeExecutor::new(reasoner, FakeSqlEngine::new()),
            RunOptions { max_attempts: 1000 },
        );
        let (state, _executor) = core.run_to_completion();

        let order = calls.lock().unwrap().clone();
        for (pos, id) in order.iter().enumerate() {
            let earlier: HashSet<&String> = order[..pos].iter().collect();
            for pred in plan.graph().predecessors_of(id) {
                prop_assert!(earlier.contains(pred));
                prop_assert_eq!(state.state_of(pred), NodeState::Succeeded);
            }
            let node = plan.node(id).unwrap();
            for req in &node.requires {
                prop_assert!(state.artifacts().contains(req));
            }
        }
    }

    #[test]
    fn failures_only_block_their_downstream(
        plan in plan_strategy(12, false),
        failing in proptest::collection::vec(0..12usize, 0..3),
    ) {
        let reasoner = failing_reasoner(&plan, &failing);
        let state = ExecutionState::new(plan.clone(), RequestContext::default());
        let core = CoreRuntime::new(
            state,
            NodeExecutor::new(reasoner, FakeSqlEngine::new()),
            RunOptions { max_attempts: 1000 },
        );
        let (state, _executor) = core.run_to_completion();

        // A node is blocked if a failed node reaches it through an edge or
        // through an artifact only that failed node would have produced.
        let failed: Vec<String> = state.node_status().ids_in_state(NodeState::Failed);
        let mut blocked: HashSet<String> = HashSet::new();
        let mut frontier = failed.clone();
        while let Some(id) = frontier.pop() {
            let produced = format!("out_{}", &id[1..]);
            for node in plan.nodes() {
                let via_edge = plan.graph().predecessors_of(&node.id).contains(&id);
                let via_artifact = node.requires.contains(&produced);
                if (via_edge || via_artifact) && blocked.insert(node.id.clone()) {
                    frontier.push(node.id.clone());
                }
            }
        }

        for node in plan.nodes() {
            let node_state = state.state_of(&node.id);
            if failed.contains(&node.id) {
                continue;
            }
            if blocked.contains(&node.id) {
                prop_assert_eq!(node_state, NodeState::Pending);
            } else {
                prop_assert_eq!(node_state, NodeState::Succeeded);
            }
        }
        prop_assert_eq!(state.issues().is_empty(), failed.is_empty());
    }

    #[test]
    fn merging_the_same_artifacts_twice_is_idempotent(
        names in proptest::collection::vec("[a-z]{1,6}", 0..8),
        values in proptest::collection::vec(any::<i64>(), 8),
    ) {
        let produced: std::collections::BTreeMap<String, ArtifactValue> = names
            .iter()
            .zip(values.iter())
            .map(|(n, v)| (n.clone(), ArtifactValue::from(serde_json::json!(v))))
            .collect();

        let mut once = ArtifactStore::new();
        once.merge(&produced);
        let mut twice = once.clone();
        twice.merge(&produced);

        prop_assert_eq!(once, twice);
    }
}
