//! Live model output: chunks print as they arrive; the state merge happens
//! only once the stream is exhausted.
//!
//! Run: `cargo run -p flowgraph-examples --example streaming`

use std::io::{self, Write};
use std::sync::Arc;

use flowgraph::{
    FlowGraph, LlmNode, MockLlm, StateUpdate, StreamEvent, StreamMode, END, START,
};
use tokio_stream::StreamExt;
use tracing::info;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let llm = Arc::new(
        MockLlm::new("今天晴转多云，最高二十六度，适合户外活动。").with_chunk_size(4),
    );

    let mut graph = FlowGraph::new();
    graph.add_node(
        "chat",
        Arc::new(LlmNode::new(llm, "{input}", "chat_reply").streaming()),
    );
    graph.add_edge(START, "chat");
    graph.add_edge("chat", END);
    let flow = graph.compile()?;

    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("input", "今天天气怎么样"));

    info!("streaming model output");
    let mut stream = flow.stream(state, None, [StreamMode::Messages, StreamMode::Values]);
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Messages { content, .. } => {
                print!("{content}");
                io::stdout().flush()?;
            }
            StreamEvent::Values(state) => {
                println!();
                println!("合并后的状态: chat_reply = {}", state.text_or("chat_reply", ""));
            }
            StreamEvent::Updates { .. } => {}
        }
    }
    Ok(())
}
