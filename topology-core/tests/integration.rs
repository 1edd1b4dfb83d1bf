//! Integration Tests for the Topology Engine
//!
//! These tests drive the public API end to end: build a graph from
//! descriptors, query it, and dispose it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use rstest::rstest;

use topology_core::graph::{GraphOptions, OrderingPolicy, TopologyGraph};
use topology_core::registry::{ChannelKind, NodeDescriptor, NodeId, NodeMetadata, NodeRegistry};
use topology_core::route::{RouteConfig, RouteState};
use topology_core::TopologyError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn id(raw: &str) -> NodeId {
    NodeId::new(raw).unwrap()
}

fn strs(ids: &[NodeId]) -> Vec<&str> {
    ids.iter().map(NodeId::as_str).collect()
}

fn build(spec: &[(&str, &[&str])], options: GraphOptions) -> TopologyGraph {
    init_tracing();
    TopologyGraph::build(
        spec.iter()
            .map(|(id, deps)| NodeDescriptor::parse(id, deps).unwrap()),
        options,
    )
    .unwrap()
}

/// Test the basic three-stage pipeline.
#[test]
fn pipeline_orders_dependencies_first() {
    let graph = build(
        &[("ingest", &[]), ("normalize", &["ingest"]), ("emit", &["normalize"])],
        GraphOptions::default(),
    );

    assert!(graph.is_acyclic().unwrap());
    assert_eq!(strs(&graph.order_ids().unwrap()), vec!["ingest", "normalize", "emit"]);
    assert_eq!(strs(&graph.get_path(&id("emit")).unwrap()), vec!["emit", "normalize", "ingest"]);
    assert_eq!(strs(&graph.dependents_of(&id("ingest")).unwrap()), vec!["normalize"]);
}

/// Test that a two-node cycle is reported but still ordered.
#[test]
fn mutual_dependency_is_cyclic() {
    let graph = build(&[("a", &["b"]), ("b", &["a"])], GraphOptions::default());

    assert!(!graph.is_acyclic().unwrap());
    let cycle = graph.find_cycle().unwrap().unwrap();
    assert_eq!(cycle.first(), cycle.last());

    let order = graph.order().unwrap();
    assert_eq!(order.ordered.len(), 2);
    assert!(order.matrix.is_empty());
}

/// Test nodes with no edges.
#[test]
fn detached_nodes_are_appended() {
    let graph = build(&[("x", &[]), ("y", &[])], GraphOptions::default());

    assert!(graph.is_acyclic().unwrap());
    assert_eq!(strs(&graph.detached().unwrap()), vec!["x", "y"]);
    assert_eq!(strs(&graph.order_ids().unwrap()), vec!["x", "y"]);
    assert_eq!(strs(&graph.get_path(&id("x")).unwrap()), vec!["x"]);
}

#[test]
fn empty_graph() {
    let graph = build(&[], GraphOptions::default());

    assert!(graph.is_empty().unwrap());
    assert!(graph.is_acyclic().unwrap());
    assert!(graph.order_ids().unwrap().is_empty());
    assert!(graph.snapshot().unwrap().is_empty());
}

#[rstest]
#[case::prerequisites_first(OrderingPolicy::PrerequisitesFirst, &["b", "a"])]
#[case::dependents_first(OrderingPolicy::DependentsFirst, &["a", "b"])]
fn ordering_policy_decides_direction(#[case] policy: OrderingPolicy, #[case] expected: &[&str]) {
    let graph = build(
        &[("a", &["b"]), ("b", &[])],
        GraphOptions::default().with_ordering(policy),
    );
    assert_eq!(strs(&graph.order_ids().unwrap()), expected);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn get_path_is_capped(#[case] max_depth: usize) {
    let chain: Vec<(String, Vec<String>)> = (0..10)
        .map(|i| {
            let deps = if i == 0 { vec![] } else { vec![format!("n{}", i - 1)] };
            (format!("n{i}"), deps)
        })
        .collect();
    let descriptors = chain.iter().map(|(node, deps)| {
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        NodeDescriptor::parse(node, &deps).unwrap()
    });
    let graph =
        TopologyGraph::build(descriptors, GraphOptions::default().with_max_depth(max_depth)).unwrap();

    assert_eq!(graph.get_path(&id("n9")).unwrap().len(), max_depth);
}

#[test]
fn unknown_path_start_is_empty() {
    let graph = build(&[("a", &[])], GraphOptions::default());
    assert!(graph.get_path(&id("ghost")).unwrap().is_empty());
}

#[test]
fn dangling_reference_is_kept_or_rejected() {
    let graph = build(&[("a", &["ghost"])], GraphOptions::default());
    let dangling = graph.dangling().unwrap();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].dependency.as_str(), "ghost");
    assert_eq!(strs(&graph.dependencies_of(&id("a")).unwrap()), vec!["ghost"]);
    assert!(graph.edges().unwrap().is_empty());

    let strict = TopologyGraph::build(
        vec![NodeDescriptor::parse("a", &["ghost"]).unwrap()],
        GraphOptions::default().with_strict(true),
    );
    assert!(matches!(strict, Err(TopologyError::UnknownDependency { .. })));
}

#[test]
fn duplicate_ids_fail_the_build() {
    let result = TopologyGraph::build(
        vec![
            NodeDescriptor::parse("a", &[]).unwrap(),
            NodeDescriptor::parse("a", &["b"]).unwrap(),
        ],
        GraphOptions::default(),
    );
    assert!(matches!(result, Err(TopologyError::DuplicateNode { .. })));
}

#[test]
fn graph_from_registry_and_json() {
    let json = r#"[
        {"id": "ingest", "metadata": {"concurrency": 2, "channels": ["metrics"]}},
        {"id": "normalize", "dependencyIds": ["ingest"]},
        {"id": "emit", "dependency_ids": ["normalize"]}
    ]"#;
    let mut registry = NodeRegistry::new();
    registry.extend(NodeDescriptor::list_from_json(json).unwrap()).unwrap();
    assert_eq!(registry.collect_by_dependency(&id("ingest")).len(), 1);

    let options = GraphOptions::from_json(r#"{"max_depth": 4}"#).unwrap();
    let graph = TopologyGraph::from_registry(&registry, options).unwrap();

    assert_eq!(graph.options().unwrap().max_depth, 4);
    assert_eq!(strs(&graph.order_ids().unwrap()), vec!["ingest", "normalize", "emit"]);
}

#[test]
fn routes_follow_channels_downstream() {
    init_tracing();
    let metrics = ChannelKind::new("metrics").unwrap();
    let graph = TopologyGraph::build(
        vec![
            NodeDescriptor::new(id("ingest")).with_metadata(
                NodeMetadata::default()
                    .with_channel(metrics.clone())
                    .with_concurrency(1),
            ),
            NodeDescriptor::new(id("normalize"))
                .depends_on(id("ingest"))
                .with_metadata(NodeMetadata::default().with_channel(metrics.clone())),
            NodeDescriptor::new(id("emit")).depends_on(id("normalize")),
        ],
        GraphOptions::default(),
    )
    .unwrap();

    let records = graph.select(&RouteConfig::for_kind(metrics.clone())).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].route_id.as_str(), "ingest:metrics");
    assert_eq!(strs(&records[0].node_ids), vec!["ingest", "normalize", "emit"]);
    assert_eq!(records[0].state, RouteState::Active);
    assert_eq!(records[1].state, RouteState::Pending);

    let summary = graph.trace(&metrics, 2).unwrap();
    assert_eq!(summary.route_count, 2);
    assert_eq!(summary.active_kinds, vec![metrics]);
    assert_eq!(summary.labels, vec!["ingest -> normalize", "normalize -> emit"]);
}

#[test]
fn snapshots_are_stable_and_detached() {
    let graph = build(&[("a", &[]), ("b", &["a"])], GraphOptions::default());

    let first = graph.snapshot().unwrap();
    let second = graph.snapshot().unwrap();
    assert_eq!(first, second);

    graph.dispose();
    // Snapshots outlive the graph they were taken from.
    assert!(first.contains(&id("b")));
    assert_eq!(first.len(), 2);
}

#[test]
fn summary_reports_size_and_trace() {
    let graph = build(&[("a", &[]), ("b", &["a"])], GraphOptions::default());
    let summary = graph.summarize().unwrap();

    assert!(summary.acyclic);
    assert_eq!(summary.size, 2);
    assert_eq!(summary.trace[1].id.as_str(), "b");
    assert_eq!(summary.trace[1].index, 1);
}

#[test]
fn dispose_closes_every_query() {
    let graph = build(&[("a", &[])], GraphOptions::default());
    graph.dispose();
    graph.dispose();

    assert!(graph.is_disposed());
    assert!(matches!(graph.nodes(), Err(TopologyError::GraphClosed)));
    assert!(matches!(graph.is_acyclic(), Err(TopologyError::GraphClosed)));
    assert!(matches!(graph.select(&RouteConfig::any()), Err(TopologyError::GraphClosed)));
    assert!(matches!(graph.summarize(), Err(TopologyError::GraphClosed)));
}

#[test]
fn shared_graph_disposed_from_another_thread() {
    let graph = Arc::new(build(&[("a", &[]), ("b", &["a"])], GraphOptions::default()));

    let remote = Arc::clone(&graph);
    std::thread::spawn(move || remote.dispose()).join().unwrap();

    assert!(graph.order().unwrap_err().is_closed());
}

#[tokio::test]
async fn close_releases_owned_resources() {
    let released = Arc::new(AtomicUsize::new(0));
    let graph = build(&[("a", &[])], GraphOptions::default());

    let sync_counter = Arc::clone(&released);
    graph
        .own(move || {
            sync_counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let async_counter = Arc::clone(&released);
    graph
        .own_async(move || async move {
            async_counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    graph.close().await;
    graph.close().await;
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

/// Random acyclic specs: node `i` may only depend on nodes with a lower index.
fn acyclic_spec() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..24).prop_flat_map(|size| {
        (0..size)
            .map(|i| proptest::collection::vec(0..i.max(1), 0..(i + 1).min(3)))
            .collect::<Vec<_>>()
    })
}

fn graph_from_spec(spec: &[Vec<usize>], options: GraphOptions) -> TopologyGraph {
    let descriptors = spec.iter().enumerate().map(|(i, deps)| {
        let mut descriptor = NodeDescriptor::new(id(&format!("n{i}")));
        for &dep in deps {
            if dep < i {
                descriptor = descriptor.depends_on(id(&format!("n{dep}")));
            }
        }
        descriptor
    });
    TopologyGraph::build(descriptors, options).unwrap()
}

proptest! {
    #[test]
    fn order_is_a_permutation(spec in acyclic_spec()) {
        let graph = graph_from_spec(&spec, GraphOptions::default());
        let order = graph.order_ids().unwrap();

        prop_assert_eq!(order.len(), spec.len());
        let distinct: HashSet<&NodeId> = order.iter().collect();
        prop_assert_eq!(distinct.len(), spec.len());
    }

    #[test]
    fn acyclic_order_respects_every_edge(spec in acyclic_spec()) {
        let graph = graph_from_spec(&spec, GraphOptions::default());
        prop_assert!(graph.is_acyclic().unwrap());

        let order = graph.order().unwrap();
        for edge in graph.edges().unwrap() {
            prop_assert!(order.position(&edge.from) < order.position(&edge.to));
        }
    }

    #[test]
    fn paths_never_exceed_max_depth(spec in acyclic_spec(), max_depth in 1usize..6) {
        let graph = graph_from_spec(&spec, GraphOptions::default().with_max_depth(max_depth));
        for node in graph.nodes().unwrap() {
            prop_assert!(graph.get_path(&node).unwrap().len() <= max_depth);
        }
    }
}
