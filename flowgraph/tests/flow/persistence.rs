//! Session save and resume: named runs persist terminal state, failed and
//! anonymous runs never do, and saved history survives the serializer.

use std::sync::Arc;

use async_trait::async_trait;
use flowgraph::{
    ChatMessage, ExecutionContext, FlowGraph, MemorySaver, MergeStrategy, NodeAction, NodeError,
    RunConfig, SessionSaver, SessionState, StateUpdate, StateValue, StreamMode, END, START,
};
use tokio_stream::StreamExt;

use crate::common::failing;

/// One conversational turn: append the user message and an echoed reply to
/// history, expose the reply.
struct TurnNode;

#[async_trait]
impl NodeAction for TurnNode {
    async fn apply(
        &self,
        state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let input = state.text_or("input", "");
        let reply = format!("你说：{input}");
        Ok(StateUpdate::new()
            .with("history", ChatMessage::user(input))
            .with("history", ChatMessage::assistant(reply.clone()))
            .with("chat_reply", reply))
    }
}

fn turn_flow(saver: Arc<MemorySaver>) -> flowgraph::CompiledFlow {
    let mut graph = FlowGraph::new();
    graph.add_node("turn", Arc::new(TurnNode));
    graph.add_edge(START, "turn");
    graph.add_edge("turn", END);
    graph.bind("history", MergeStrategy::Append);
    graph.compile_with_saver(saver).expect("flow compiles")
}

fn history_len(state: &SessionState) -> usize {
    state
        .get("history")
        .and_then(StateValue::as_list)
        .map(<[StateValue]>::len)
        .unwrap_or(0)
}

#[tokio::test]
async fn named_session_resumes_across_invokes() {
    let saver = Arc::new(MemorySaver::new());
    let flow = turn_flow(saver.clone());

    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("input", "你好"));
    let out = flow
        .invoke(state, Some(RunConfig::for_session("alice")))
        .await
        .unwrap();
    assert_eq!(history_len(&out), 2);

    // Next turn starts from the saved snapshot.
    let mut resumed = saver.load("alice").await.unwrap().expect("session saved");
    assert_eq!(history_len(&resumed), 2);
    assert_eq!(
        resumed.strategy_for("history"),
        MergeStrategy::Append,
        "binding survives the round trip"
    );
    match resumed.get("history").and_then(StateValue::as_list) {
        Some(items) => match &items[0] {
            StateValue::Message(ChatMessage::User(content)) => assert_eq!(content, "你好"),
            other => panic!("expected a user message, got {:?}", other),
        },
        None => panic!("history missing after load"),
    }

    resumed.apply(StateUpdate::new().with("input", "再见"));
    let out = flow
        .invoke(resumed, Some(RunConfig::for_session("alice")))
        .await
        .unwrap();
    assert_eq!(history_len(&out), 4);

    let reloaded = saver.load("alice").await.unwrap().expect("session saved");
    assert_eq!(history_len(&reloaded), 4);
    assert_eq!(saver.session_count(), 1);
}

#[tokio::test]
async fn failed_runs_are_never_saved() {
    let saver = Arc::new(MemorySaver::new());
    let mut graph = FlowGraph::new();
    graph.add_node("boom", failing());
    graph.add_edge(START, "boom");
    graph.add_edge("boom", END);
    let flow = graph.compile_with_saver(saver.clone()).expect("flow compiles");

    let result = flow
        .invoke(SessionState::new(), Some(RunConfig::for_session("bob")))
        .await;
    assert!(result.is_err());
    assert!(saver.load("bob").await.unwrap().is_none());
    assert_eq!(saver.session_count(), 0);
}

#[tokio::test]
async fn anonymous_runs_are_never_saved() {
    let saver = Arc::new(MemorySaver::new());
    let flow = turn_flow(saver.clone());

    let mut state = SessionState::new();
    state.apply(StateUpdate::new().with("input", "你好"));
    flow.invoke(state, None).await.unwrap();
    assert_eq!(saver.session_count(), 0);
}

#[tokio::test]
async fn sessions_stay_isolated() {
    let saver = Arc::new(MemorySaver::new());
    let flow = turn_flow(saver.clone());

    for (session, text) in [("alice", "你好"), ("carol", "天气如何")] {
        let mut state = flow.initial_state();
        state.apply(StateUpdate::new().with("input", text));
        flow.invoke(state, Some(RunConfig::for_session(session)))
            .await
            .unwrap();
    }

    let alice = saver.load("alice").await.unwrap().unwrap();
    let carol = saver.load("carol").await.unwrap().unwrap();
    assert_eq!(alice.text_or("chat_reply", ""), "你说：你好");
    assert_eq!(carol.text_or("chat_reply", ""), "你说：天气如何");
}

#[tokio::test]
async fn streamed_named_run_saves_terminal_state() {
    let saver = Arc::new(MemorySaver::new());
    let flow = turn_flow(saver.clone());

    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("input", "你好"));
    let events: Vec<_> = flow
        .stream(state, Some(RunConfig::for_session("dave")), [StreamMode::Values])
        .collect()
        .await;
    assert!(!events.is_empty());

    let saved = saver.load("dave").await.unwrap().expect("session saved");
    assert_eq!(history_len(&saved), 2);
}
