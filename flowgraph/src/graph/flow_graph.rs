//! Flow graph builder: nodes + routed edges (from → to).
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` and
//! `add_conditional_edge(from, predicate, branches)` using `START` and
//! `END` for entry/exit, declare merge strategies with `bind`, then
//! `compile` (or `compile_with_saver`) into a [`CompiledFlow`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::graph::build_error::GraphBuildError;
use crate::graph::compiled::CompiledFlow;
use crate::graph::edges::{Branches, ConditionalEdge};
use crate::node::NodeAction;
use crate::session::SessionSaver;
use crate::state::{MergeStrategy, SessionState};

/// Sentinel for graph entry: use as `from` in `add_edge(START, first_node)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to` in `add_edge(last_node, END)` or as
/// a branch target.
pub const END: &str = "__end__";

/// Step ceiling compiled in unless overridden via `with_step_limit`.
pub const DEFAULT_STEP_LIMIT: usize = 64;

/// Mutable flow definition: nodes, routes, key bindings.
///
/// Cycles are permitted (a dispatcher/collector loop needs one); the step
/// ceiling bounds them at run time. A source node carries either one
/// unconditional edge or one conditional edge, never both.
///
/// **Interaction**: Accepts `Arc<dyn NodeAction>`; produces [`CompiledFlow`].
#[derive(Default)]
pub struct FlowGraph {
    nodes: HashMap<String, Arc<dyn NodeAction>>,
    edges: Vec<(String, String)>,
    conditional: Vec<(String, ConditionalEdge)>,
    bindings: HashMap<String, MergeStrategy>,
    step_limit: Option<usize>,
}

impl FlowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; replaces any node already registered under `id`.
    pub fn add_node(&mut self, id: impl Into<String>, action: Arc<dyn NodeAction>) -> &mut Self {
        self.nodes.insert(id.into(), action);
        self
    }

    /// Adds an unconditional edge from `from` to `to`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. All other ids
    /// must be registered via `add_node` before `compile()`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Adds a conditional edge: after `from` runs, `predicate` reads the
    /// post-merge state and yields a label resolved through `branches`.
    pub fn add_conditional_edge(
        &mut self,
        from: impl Into<String>,
        predicate: impl Fn(&SessionState) -> String + Send + Sync + 'static,
        branches: Branches,
    ) -> &mut Self {
        self.conditional
            .push((from.into(), ConditionalEdge::new(predicate, branches)));
        self
    }

    /// Declares the merge strategy for a state key. Seeded into the session
    /// state at invoke; first declaration wins.
    pub fn bind(&mut self, key: impl Into<String>, strategy: MergeStrategy) -> &mut Self {
        self.bindings.entry(key.into()).or_insert(strategy);
        self
    }

    /// Overrides the step ceiling (default [`DEFAULT_STEP_LIMIT`]).
    pub fn with_step_limit(&mut self, limit: usize) -> &mut Self {
        self.step_limit = Some(limit);
        self
    }

    /// Validates the declared structure and builds the executable flow.
    pub fn compile(self) -> Result<CompiledFlow, GraphBuildError> {
        self.compile_internal(None)
    }

    /// Compiles with a session saver: when an invoke's config names a
    /// session, the terminal state is saved after a successful run.
    pub fn compile_with_saver(
        self,
        saver: Arc<dyn SessionSaver>,
    ) -> Result<CompiledFlow, GraphBuildError> {
        self.compile_internal(Some(saver))
    }

    fn compile_internal(
        self,
        saver: Option<Arc<dyn SessionSaver>>,
    ) -> Result<CompiledFlow, GraphBuildError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(GraphBuildError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(GraphBuildError::NodeNotFound(to.clone()));
            }
        }
        for (from, edge) in &self.conditional {
            if !self.nodes.contains_key(from) {
                return Err(GraphBuildError::NodeNotFound(from.clone()));
            }
            if edge.branches.is_empty() {
                return Err(GraphBuildError::EmptyBranches(from.clone()));
            }
            for target in edge.branches.targets() {
                if target != END && !self.nodes.contains_key(target) {
                    return Err(GraphBuildError::NodeNotFound(target.to_string()));
                }
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let entry = match (start_edges.next(), start_edges.next()) {
            (Some(entry), None) => entry,
            _ => return Err(GraphBuildError::MissingStart),
        };

        let mut edge_sources = HashSet::new();
        for (from, _) in &self.edges {
            if from != START && !edge_sources.insert(from.clone()) {
                return Err(GraphBuildError::DuplicateEdge(from.clone()));
            }
        }
        let mut conditional_sources = HashSet::new();
        for (from, _) in &self.conditional {
            if !conditional_sources.insert(from.clone()) {
                return Err(GraphBuildError::DuplicateEdge(from.clone()));
            }
            if edge_sources.contains(from) {
                return Err(GraphBuildError::ConflictingRoutes(from.clone()));
            }
        }

        let edges: HashMap<String, String> = self
            .edges
            .into_iter()
            .filter(|(f, _)| f != START)
            .collect();
        let conditional: HashMap<String, ConditionalEdge> = self.conditional.into_iter().collect();

        Ok(CompiledFlow {
            nodes: self.nodes,
            edges,
            conditional,
            entry,
            bindings: self.bindings,
            step_limit: self.step_limit.unwrap_or(DEFAULT_STEP_LIMIT),
            saver,
        })
    }
}
