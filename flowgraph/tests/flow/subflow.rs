//! Nested child flows: input slices in, output slices back, child failures
//! abort the parent node.

use std::sync::Arc;

use flowgraph::{
    AnswerNode, CompiledFlow, FlowError, FlowGraph, NodeError, SessionState, StateUpdate,
    SubFlowNode, END, START,
};

/// Child flow: expand task_content into a created_task confirmation.
fn todo_child() -> CompiledFlow {
    let mut graph = FlowGraph::new();
    graph.add_node(
        "expand",
        Arc::new(AnswerNode::new("已创建：{task_content}", "created_task")),
    );
    graph.add_edge(START, "expand");
    graph.add_edge("expand", END);
    graph.compile().expect("child compiles")
}

/// Parent flow: one sub-flow node between START and END.
fn parent_flow(child: CompiledFlow) -> CompiledFlow {
    let node = SubFlowNode::new(child, "todo")
        .with_inputs(["task_content"])
        .with_outputs(["created_task"]);
    let mut graph = FlowGraph::new();
    graph.add_node("call_todo", Arc::new(node));
    graph.add_edge(START, "call_todo");
    graph.add_edge("call_todo", END);
    graph.compile().expect("parent compiles")
}

#[tokio::test]
async fn child_result_merges_into_parent_only() {
    let flow = parent_flow(todo_child());

    let mut state = SessionState::new();
    state.apply(
        StateUpdate::new()
            .with("task_content", "buy milk")
            .with("chat_reply", "你好"),
    );
    let out = flow.invoke(state, None).await.unwrap();

    assert_eq!(out.text_or("created_task", ""), "已创建：buy milk");
    assert_eq!(out.text_or("chat_reply", ""), "你好", "unrelated keys untouched");
    assert_eq!(out.len(), 3, "task_content, chat_reply, created_task and nothing else");
}

#[tokio::test]
async fn child_failure_aborts_parent_at_subflow_node() {
    let mut graph = FlowGraph::new();
    graph.add_node("stuck", Arc::new(AnswerNode::new("x", "y")));
    graph.add_edge(START, "stuck");
    let dead_end_child = graph.compile().expect("child compiles");

    let flow = parent_flow(dead_end_child);
    let err = flow.invoke(SessionState::new(), None).await.unwrap_err();
    match err {
        FlowError::NodeExecution { node, source, .. } => {
            assert_eq!(node, "call_todo");
            assert!(matches!(source, NodeError::SubFlow(_)));
        }
        other => panic!("expected NodeExecution, got {:?}", other),
    }
}

/// Two invocations of the same parent flow run their children on derived
/// session ids and never bleed state into each other.
#[tokio::test]
async fn concurrent_invocations_keep_children_isolated() {
    let flow = parent_flow(todo_child());

    let mut first = SessionState::new();
    first.apply(StateUpdate::new().with("task_content", "买牛奶"));
    let mut second = SessionState::new();
    second.apply(StateUpdate::new().with("task_content", "交水电费"));

    let (a, b) = tokio::join!(flow.invoke(first, None), flow.invoke(second, None));
    assert_eq!(a.unwrap().text_or("created_task", ""), "已创建：买牛奶");
    assert_eq!(b.unwrap().text_or("created_task", ""), "已创建：交水电费");
}
