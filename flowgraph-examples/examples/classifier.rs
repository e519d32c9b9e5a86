//! Label extraction: fenced JSON, bare JSON and plain-text classifier
//! replies all resolve to a branch.
//!
//! Run: `cargo run -p flowgraph-examples --example classifier`

use std::sync::Arc;

use flowgraph::{
    AnswerNode, Branches, ClassifierNode, FlowGraph, MockLlm, StateUpdate, END, START,
};
use tracing::info;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    // Each rule answers in a different raw shape; the extraction chain
    // normalizes all of them to a bare label.
    let llm = Arc::new(
        MockLlm::new("其它")
            .on("牛奶", "```json\n{\"category_name\": \"创建待办\"}\n```")
            .on("哪些", "{\"category_name\": \"查询待办\"}"),
    );

    let mut graph = FlowGraph::new();
    graph.add_node(
        "intent",
        Arc::new(ClassifierNode::new(
            llm,
            "{input}",
            ["创建待办", "查询待办", "其它"],
            "intent",
        )),
    );
    graph.add_node("create", Arc::new(AnswerNode::new("创建分支", "branch")));
    graph.add_node("query", Arc::new(AnswerNode::new("查询分支", "branch")));
    graph.add_node("chat", Arc::new(AnswerNode::new("闲聊分支", "branch")));
    graph.add_edge(START, "intent");
    graph.add_conditional_edge(
        "intent",
        |s| s.text_or("intent", ""),
        Branches::new()
            .on("创建待办", "create")
            .on("查询待办", "query")
            .otherwise("chat"),
    );
    graph.add_edge("create", END);
    graph.add_edge("query", END);
    graph.add_edge("chat", END);
    let flow = graph.compile()?;

    for input in ["帮我记一下买牛奶", "我有哪些待办", "今天天气怎么样"] {
        let mut state = flow.initial_state();
        state.apply(StateUpdate::new().with("input", input));
        info!(%input, "classifying");
        let out = flow.invoke(state, None).await?;
        println!(
            "{input} -> 标签 {} ({})",
            out.text_or("intent", "?"),
            out.text_or("branch", "?")
        );
    }
    Ok(())
}
