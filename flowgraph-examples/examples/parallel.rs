//! Fan-out: two branch workers call their model concurrently and a
//! collector fans back in once both results land.
//!
//! Run: `cargo run -p flowgraph-examples --example parallel`

use std::sync::Arc;
use std::time::{Duration, Instant};

use flowgraph::{
    AnswerNode, Branches, BranchWorkerNode, CollectorNode, DispatcherNode, FlowGraph,
    JoinTracker, MockLlm, StateUpdate, END, START,
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

    // 300ms each; the run finishing near 300ms shows the calls overlapped.
    let poem_llm = Arc::new(MockLlm::new("秋风起兮白云飞").with_delay(Duration::from_millis(300)));
    let couplet_llm = Arc::new(MockLlm::new("草木黄落兮雁南归").with_delay(Duration::from_millis(300)));

    let tracker = Arc::new(JoinTracker::new());
    let collector = Arc::new(CollectorNode::new(
        ["poem", "couplet"],
        tracker.clone(),
    ));

    let mut graph = FlowGraph::new();
    graph.add_node(
        "dispatch",
        Arc::new(DispatcherNode::new(["poem_status", "couplet_status"])),
    );
    graph.add_node(
        "poet",
        Arc::new(BranchWorkerNode::new(
            poem_llm,
            "写一句关于{topic}的诗",
            "poem_status",
            "poem",
            tracker.clone(),
        )),
    );
    graph.add_node(
        "couplet_writer",
        Arc::new(BranchWorkerNode::new(
            couplet_llm,
            "写一句关于{topic}的对联",
            "couplet_status",
            "couplet",
            tracker,
        )),
    );
    graph.add_node("collect", collector.clone());
    graph.add_node(
        "merge",
        Arc::new(AnswerNode::new("{poem}\n{couplet}", "combined")),
    );
    graph.add_edge(START, "dispatch");
    graph.add_edge("dispatch", "poet");
    graph.add_edge("poet", "couplet_writer");
    graph.add_edge("couplet_writer", "collect");
    graph.add_conditional_edge(
        "collect",
        move |s| {
            if collector.is_complete(s) {
                "done".to_string()
            } else {
                "retry".to_string()
            }
        },
        Branches::new().on("done", "merge").on("retry", "dispatch"),
    );
    graph.add_edge("merge", END);
    let flow = graph.compile()?;

    let mut state = flow.initial_state();
    state.apply(StateUpdate::new().with("topic", "秋天"));

    let begin = Instant::now();
    info!("dispatching both branch workers");
    let out = flow.invoke(state, None).await?;
    info!(elapsed = ?begin.elapsed(), "fan-in complete");
    println!("合并结果:\n{}", out.text_or("combined", ""));
    println!(
        "两次 300ms 调用共耗时 {:?}（收集轮次 {}）",
        begin.elapsed(),
        out.int_or("collect_round", 0)
    );
    Ok(())
}
