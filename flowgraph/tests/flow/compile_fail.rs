//! Graph build failure cases: unknown endpoints, no entry, ambiguous routes.

use flowgraph::{Branches, FlowGraph, GraphBuildError, END, START};

use crate::common::set;

#[tokio::test]
async fn compile_fails_when_edge_targets_unknown_node() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_edge(START, "first");
    graph.add_edge("first", "missing");

    match graph.compile() {
        Err(GraphBuildError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        _ => panic!("expected NodeNotFound"),
    }
}

#[tokio::test]
async fn compile_fails_when_branch_targets_unknown_node() {
    let mut graph = FlowGraph::new();
    graph.add_node("intent", set("label", "x"));
    graph.add_edge(START, "intent");
    graph.add_conditional_edge(
        "intent",
        |s| s.text_or("label", ""),
        Branches::new().on("x", "missing"),
    );

    match graph.compile() {
        Err(GraphBuildError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        _ => panic!("expected NodeNotFound"),
    }
}

#[tokio::test]
async fn compile_fails_without_start_edge() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_edge("first", END);

    match graph.compile() {
        Err(GraphBuildError::MissingStart) => {}
        _ => panic!("expected MissingStart"),
    }
}

#[tokio::test]
async fn compile_fails_with_two_start_edges() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_node("second", set("b", "2"));
    graph.add_edge(START, "first");
    graph.add_edge(START, "second");
    graph.add_edge("first", END);
    graph.add_edge("second", END);

    match graph.compile() {
        Err(GraphBuildError::MissingStart) => {}
        _ => panic!("expected MissingStart"),
    }
}

#[tokio::test]
async fn compile_fails_on_duplicate_edge_from_one_source() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_node("second", set("b", "2"));
    graph.add_edge(START, "first");
    graph.add_edge("first", "second");
    graph.add_edge("first", END);
    graph.add_edge("second", END);

    match graph.compile() {
        Err(GraphBuildError::DuplicateEdge(id)) => assert_eq!(id, "first"),
        _ => panic!("expected DuplicateEdge"),
    }
}

#[tokio::test]
async fn compile_fails_when_source_has_edge_and_conditional() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_node("second", set("b", "2"));
    graph.add_edge(START, "first");
    graph.add_edge("first", "second");
    graph.add_conditional_edge(
        "first",
        |s| s.text_or("a", ""),
        Branches::new().on("1", "second"),
    );
    graph.add_edge("second", END);

    match graph.compile() {
        Err(GraphBuildError::ConflictingRoutes(id)) => assert_eq!(id, "first"),
        _ => panic!("expected ConflictingRoutes"),
    }
}

#[tokio::test]
async fn compile_fails_on_conditional_edge_without_branches() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_edge(START, "first");
    graph.add_conditional_edge("first", |s| s.text_or("a", ""), Branches::new());

    match graph.compile() {
        Err(GraphBuildError::EmptyBranches(id)) => assert_eq!(id, "first"),
        _ => panic!("expected EmptyBranches"),
    }
}

#[tokio::test]
async fn branch_target_may_be_end() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "done"));
    graph.add_edge(START, "first");
    graph.add_conditional_edge(
        "first",
        |s| s.text_or("a", ""),
        Branches::new().on("done", END),
    );

    assert!(graph.compile().is_ok());
}
