//! Multi-turn session: a named run saves its terminal state, the next turn
//! loads it and keeps appending to the conversation history.
//!
//! Run: `cargo run -p flowgraph-examples --example persistence`

use std::sync::Arc;

use async_trait::async_trait;
use flowgraph::{
    ChatMessage, ExecutionContext, FlowGraph, LlmNode, MemorySaver, MergeStrategy, MockLlm,
    NodeAction, NodeError, RunConfig, SessionSaver, SessionState, StateUpdate, StateValue, END,
    START,
};
use tracing::info;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Appends the turn's user message and model reply to the history key.
struct HistoryNode;

#[async_trait]
impl NodeAction for HistoryNode {
    async fn apply(
        &self,
        state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        Ok(StateUpdate::new()
            .with("history", ChatMessage::user(state.text_or("input", "")))
            .with("history", ChatMessage::assistant(state.text_or("chat_reply", ""))))
    }
}

fn print_history(state: &SessionState) {
    for item in state.get("history").and_then(StateValue::as_list).unwrap_or(&[]) {
        if let StateValue::Message(message) = item {
            let role = match message {
                ChatMessage::System(_) => "system",
                ChatMessage::User(_) => "user",
                ChatMessage::Assistant(_) => "assistant",
            };
            println!("  [{role}] {}", message.content());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let llm = Arc::new(
        MockLlm::new("你好！有什么可以帮你？").on("天气", "晴天，适合出门散步。"),
    );
    let saver = Arc::new(MemorySaver::new());

    let mut graph = FlowGraph::new();
    graph.add_node("chat", Arc::new(LlmNode::new(llm, "{input}", "chat_reply")));
    graph.add_node("remember", Arc::new(HistoryNode));
    graph.add_edge(START, "chat");
    graph.add_edge("chat", "remember");
    graph.add_edge("remember", END);
    graph.bind("history", MergeStrategy::Append);
    let flow = graph.compile_with_saver(saver.clone())?;

    let session = RunConfig::for_session("demo");

    // Turn one starts fresh.
    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("input", "你好"));
    info!(session = "demo", turn = 1, "running turn");
    flow.invoke(state, Some(session.clone())).await?;

    // Turn two resumes from the saved snapshot.
    info!(session = "demo", turn = 2, "resuming from saved state");
    let mut resumed = saver
        .load("demo")
        .await?
        .ok_or("session should have been saved")?;
    resumed.apply(StateUpdate::new().with("input", "今天天气怎么样"));
    flow.invoke(resumed, Some(session)).await?;

    let saved = saver.load("demo").await?.ok_or("session missing")?;
    println!("会话 demo 的完整历史：");
    print_history(&saved);
    Ok(())
}
