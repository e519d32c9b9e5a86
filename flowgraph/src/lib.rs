//! # Flowgraph
//!
//! A graph-based workflow engine for LLM pipelines. Describe a pipeline as
//! a directed graph of typed nodes over one shared session state, compile
//! it, then invoke or stream it.
//!
//! ## Design Principles
//!
//! - **One shared state**: each run owns a [`SessionState`]; nodes read it
//!   and return partial [`StateUpdate`]s, merged per key under Replace or
//!   Append bindings. Nodes never write state directly.
//! - **One step per node**: a node action does one unit of work. Routing
//!   (unconditional edges, predicate branches) happens between steps,
//!   against the post-merge state.
//! - **Graphs compile**: structural mistakes (dangling edges, missing
//!   entry, duplicate routes) are [`GraphBuildError`]s at build time;
//!   whatever can only surface at runtime aborts with a [`FlowError`]
//!   carrying the state accumulated so far.
//! - **Providers fail soft**: nodes calling a model substitute a labeled
//!   fallback on failure or timeout, so one misbehaving provider degrades
//!   a reply instead of killing the run.
//!
//! ## Main Modules
//!
//! - [`graph`]: build and run flows. [`FlowGraph`], [`CompiledFlow`],
//!   `START`/`END` sentinels, conditional edges.
//! - [`node`]: built-in actions. [`LlmNode`], [`ClassifierNode`],
//!   [`AnswerNode`], [`AssignerNode`], the fan-out group
//!   ([`DispatcherNode`] / [`BranchWorkerNode`] / [`CollectorNode`]), and
//!   [`SubFlowNode`] for nesting.
//! - [`state`]: [`SessionState`], [`StateValue`], [`MergeStrategy`].
//! - [`llm`]: the [`LlmClient`] trait and [`MockLlm`] for tests.
//! - [`session`]: run config, state serialization, and session savers.
//! - [`stream`]: event modes for [`CompiledFlow::stream`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use flowgraph::{AnswerNode, FlowGraph, LlmNode, MockLlm, StateUpdate, END, START};
//!
//! #[tokio::main]
//! async fn main() {
//!     let llm = Arc::new(MockLlm::new("晴天，适合散步。"));
//!
//!     let mut graph = FlowGraph::new();
//!     graph.add_node("chat", Arc::new(LlmNode::new(llm, "{input}", "chat_reply")));
//!     graph.add_node("answer", Arc::new(AnswerNode::new("{chat_reply}", "final_answer")));
//!     graph.add_edge(START, "chat");
//!     graph.add_edge("chat", "answer");
//!     graph.add_edge("answer", END);
//!     let flow = graph.compile().unwrap();
//!
//!     let mut state = flow.initial_state();
//!     state.apply(StateUpdate::new().with("input", "今天天气怎么样"));
//!     let out = flow.invoke(state, None).await.unwrap();
//!     println!("{}", out.text_or("final_answer", ""));
//! }
//! ```
//!
//! Conditional routing, fan-out across parallel workers, nested sub-flows,
//! session persistence and streaming are covered by the examples in
//! `flowgraph-examples`.

pub mod error;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod node;
pub mod session;
pub mod state;
pub mod stream;
pub mod template;

pub use error::{FlowError, NodeError};
pub use extract::{extract_label, strip_code_fences, LABEL_FIELD};
pub use graph::{
    Branches, CompiledFlow, ConditionalEdge, ExecutionContext, FlowGraph, GraphBuildError,
    RoutePredicate, DEFAULT_STEP_LIMIT, END, START,
};
pub use llm::{LlmClient, LlmError, MockLlm, TextStream};
pub use node::{
    AnswerNode, AssignerNode, BranchWorkerNode, ClassifierNode, CollectorNode, DispatcherNode,
    JoinTracker, LlmNode, NodeAction, SubFlowNode, DEFAULT_FALLBACK_LABEL, DEFAULT_LLM_TIMEOUT,
    DEFAULT_MAX_ROUNDS, DEFAULT_POLL_DELAY, STATUS_ASSIGNED, STATUS_COMPLETED,
};
pub use session::{
    JsonSerializer, MemorySaver, PersistError, RunConfig, SessionSaver, StateSerializer,
};
pub use state::{ChatMessage, MergeStrategy, SessionState, StateUpdate, StateValue};
pub use stream::{StreamEvent, StreamMode};
pub use template::render;
