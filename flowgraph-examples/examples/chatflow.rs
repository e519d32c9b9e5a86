//! Intent-routed assistant: classify the input, answer chat questions
//! directly, hand todo requests to a nested sub-flow.
//!
//! Run: `cargo run -p flowgraph-examples --example chatflow -- "帮我记一下买牛奶"`

use std::sync::Arc;

use flowgraph::{
    AnswerNode, AssignerNode, Branches, ClassifierNode, CompiledFlow, FlowGraph, GraphBuildError,
    LlmNode, MockLlm, StateUpdate, SubFlowNode, END, START,
};
use tracing::info;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Child flow: treat the whole input as the task and confirm creation.
fn todo_child() -> Result<CompiledFlow, GraphBuildError> {
    let mut graph = FlowGraph::new();
    graph.add_node(
        "extract",
        Arc::new(AssignerNode::overwrite("input", "task_content")),
    );
    graph.add_node(
        "expand",
        Arc::new(AnswerNode::new("已创建待办：{task_content}", "created_task")),
    );
    graph.add_edge(START, "extract");
    graph.add_edge("extract", "expand");
    graph.add_edge("expand", END);
    graph.compile()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "今天天气怎么样".to_string());

    // Scripted clients standing in for a live provider.
    let intent_llm = Arc::new(
        MockLlm::new("其它").on("记一下", "```json\n{\"category_name\": \"创建待办\"}\n```"),
    );
    let chat_llm =
        Arc::new(MockLlm::new("你好！有什么可以帮你？").on("天气", "晴天，适合出门散步。"));

    let mut graph = FlowGraph::new();
    graph.add_node(
        "intent",
        Arc::new(ClassifierNode::new(
            intent_llm,
            "{input}",
            ["创建待办", "查询待办", "其它"],
            "intent",
        )),
    );
    graph.add_node("chat", Arc::new(LlmNode::new(chat_llm, "{input}", "chat_reply")));
    graph.add_node(
        "call_todo",
        Arc::new(
            SubFlowNode::new(todo_child()?, "todo")
                .with_inputs(["input"])
                .with_outputs(["created_task"]),
        ),
    );
    graph.add_node("reply", Arc::new(AnswerNode::new("{chat_reply}", "final_answer")));
    graph.add_edge(START, "intent");
    graph.add_conditional_edge(
        "intent",
        |s| s.text_or("intent", ""),
        Branches::new().on("创建待办", "call_todo").otherwise("chat"),
    );
    graph.add_edge("chat", "reply");
    graph.add_edge("call_todo", "reply");
    graph.add_edge("reply", END);
    let flow = graph.compile()?;

    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("input", input.clone()));
    info!(%input, "starting chatflow run");
    let out = flow.invoke(state, None).await?;
    info!(intent = %out.text_or("intent", "?"), "run finished");

    println!("输入: {input}");
    println!("意图: {}", out.text_or("intent", "?"));
    if out.contains("created_task") {
        println!("待办: {}", out.text_or("created_task", ""));
    } else {
        println!("回复: {}", out.text_or("final_answer", ""));
    }
    Ok(())
}
