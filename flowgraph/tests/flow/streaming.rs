//! Stream modes: forwarded message chunks, post-merge snapshots, update
//! echoes, and mid-stream provider failure.

use std::sync::Arc;

use flowgraph::{
    FlowGraph, LlmNode, MockLlm, SessionState, StateUpdate, StreamEvent, StreamMode, END, START,
};
use tokio_stream::StreamExt;

use crate::common::set;

fn streaming_chat(llm: Arc<MockLlm>) -> flowgraph::CompiledFlow {
    let mut graph = FlowGraph::new();
    graph.add_node(
        "chat",
        Arc::new(LlmNode::new(llm, "{input}", "chat_reply").streaming()),
    );
    graph.add_edge(START, "chat");
    graph.add_edge("chat", END);
    graph.compile().expect("flow compiles")
}

fn input(text: &str) -> SessionState {
    let mut state = SessionState::new();
    state.apply(StateUpdate::new().with("input", text));
    state
}

/// Chunks arrive as Messages events while the node runs; the post-merge
/// Values snapshot carries the aggregated text and comes last.
#[tokio::test]
async fn message_chunks_precede_merged_snapshot() {
    let llm = Arc::new(MockLlm::new("你好世界").with_chunk_size(2));
    let flow = streaming_chat(llm);

    let events: Vec<_> = flow
        .stream(input("hi"), None, [StreamMode::Messages, StreamMode::Values])
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    match &events[0] {
        StreamEvent::Messages { node_id, content } => {
            assert_eq!(node_id, "chat");
            assert_eq!(content, "你好");
        }
        other => panic!("events[0] should be Messages, got {:?}", other),
    }
    match &events[1] {
        StreamEvent::Messages { content, .. } => assert_eq!(content, "世界"),
        other => panic!("events[1] should be Messages, got {:?}", other),
    }
    match &events[2] {
        StreamEvent::Values(state) => assert_eq!(state.text_or("chat_reply", ""), "你好世界"),
        other => panic!("events[2] should be Values, got {:?}", other),
    }
}

/// Without the Messages mode no chunks are forwarded, even for a streaming
/// node.
#[tokio::test]
async fn chunks_require_messages_mode() {
    let llm = Arc::new(MockLlm::new("你好世界").with_chunk_size(1));
    let flow = streaming_chat(llm);

    let events: Vec<_> = flow
        .stream(input("hi"), None, [StreamMode::Values])
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StreamEvent::Values(_)));
}

/// A provider error mid-stream substitutes the fallback for the whole
/// output; the run still completes and later nodes still execute.
#[tokio::test]
async fn midstream_failure_substitutes_fallback_and_continues() {
    let llm = Arc::new(
        MockLlm::new("你好世界")
            .with_chunk_size(1)
            .failing_stream_after(1, "connection reset"),
    );
    let mut graph = FlowGraph::new();
    graph.add_node(
        "chat",
        Arc::new(
            LlmNode::new(llm, "{input}", "chat_reply")
                .streaming()
                .with_fallback("服务繁忙，请稍后再试"),
        ),
    );
    graph.add_node("after", set("ran_after", "yes"));
    graph.add_edge(START, "chat");
    graph.add_edge("chat", "after");
    graph.add_edge("after", END);
    let flow = graph.compile().expect("flow compiles");

    let events: Vec<_> = flow
        .stream(input("hi"), None, [StreamMode::Messages, StreamMode::Values])
        .collect()
        .await;

    // One chunk got through before the failure, then snapshots for both
    // nodes with the fallback merged.
    match &events[0] {
        StreamEvent::Messages { content, .. } => assert_eq!(content, "你"),
        other => panic!("events[0] should be Messages, got {:?}", other),
    }
    let last = events.last().expect("stream not empty");
    match last {
        StreamEvent::Values(state) => {
            assert_eq!(state.text_or("chat_reply", ""), "服务繁忙，请稍后再试");
            assert_eq!(state.text_or("ran_after", ""), "yes");
        }
        other => panic!("last event should be Values, got {:?}", other),
    }
    assert_eq!(events.len(), 3, "one chunk + two node snapshots");
}

/// Updates events name the producing node and carry exactly its update.
#[tokio::test]
async fn updates_events_echo_node_updates() {
    let mut graph = FlowGraph::new();
    graph.add_node("first", set("a", "1"));
    graph.add_edge(START, "first");
    graph.add_edge("first", END);
    let flow = graph.compile().expect("flow compiles");

    let events: Vec<_> = flow
        .stream(SessionState::new(), None, [StreamMode::Updates])
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        StreamEvent::Updates { node_id, update } => {
            assert_eq!(node_id, "first");
            assert_eq!(update.len(), 1);
            assert_eq!(
                update.get("a").and_then(|v| v.as_text()),
                Some("1")
            );
        }
        other => panic!("expected Updates, got {:?}", other),
    }
}
