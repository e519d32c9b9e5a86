//! Flow graph: nodes + routed edges, compile and invoke.
//!
//! Build a [`FlowGraph`] with nodes, unconditional and conditional edges,
//! and key bindings; compile it into a [`CompiledFlow`] and run with
//! `invoke`, `invoke_from`, or `stream`.

mod build_error;
mod compiled;
mod context;
mod edges;
mod flow_graph;

pub use build_error::GraphBuildError;
pub use compiled::CompiledFlow;
pub use context::ExecutionContext;
pub use edges::{Branches, ConditionalEdge, RoutePredicate};
pub use flow_graph::{FlowGraph, DEFAULT_STEP_LIMIT, END, START};
