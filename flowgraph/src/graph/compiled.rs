//! Compiled flow: immutable structure, supports invoke and stream.
//!
//! Built by `FlowGraph::compile` or `compile_with_saver`. Holds nodes,
//! routes, key bindings and the step ceiling. Shared read-only across
//! sessions: `Clone` is cheap (nodes behind `Arc`), and every invoke runs
//! on its own `SessionState`. When a saver is set and the config names a
//! session, the terminal state is saved after a successful run; failed
//! runs are never saved.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::FlowError;
use crate::node::NodeAction;
use crate::session::{RunConfig, SessionSaver};
use crate::state::{MergeStrategy, SessionState};
use crate::stream::{StreamEvent, StreamMode};

use super::context::{ExecutionContext, StreamSink};
use super::edges::ConditionalEdge;
use super::flow_graph::END;

/// Executable flow graph.
///
/// Runs from the `START` edge's target (or an explicit entry via
/// [`invoke_from`](Self::invoke_from)); after each node, the merged state
/// routes through the node's unconditional or conditional edge until `END`.
#[derive(Clone)]
pub struct CompiledFlow {
    pub(super) nodes: HashMap<String, Arc<dyn NodeAction>>,
    pub(super) edges: HashMap<String, String>,
    pub(super) conditional: HashMap<String, ConditionalEdge>,
    pub(super) entry: String,
    pub(super) bindings: HashMap<String, MergeStrategy>,
    pub(super) step_limit: usize,
    pub(super) saver: Option<Arc<dyn SessionSaver>>,
}

impl CompiledFlow {
    /// Shared run loop used by invoke and stream: steps through nodes,
    /// merges updates, routes, until `END` or failure.
    async fn run_loop_inner(
        &self,
        state: &mut SessionState,
        ctx: &mut ExecutionContext,
        persist: bool,
        mut current: String,
        sink: Option<&StreamSink>,
    ) -> Result<(), FlowError> {
        loop {
            if current == END {
                ctx.finish();
                if persist {
                    if let Some(saver) = &self.saver {
                        if let Err(error) = saver.save(ctx.session_id(), state).await {
                            warn!(
                                session = %ctx.session_id(),
                                %error,
                                "failed to save session state"
                            );
                        }
                    }
                }
                return Ok(());
            }

            if ctx.step() >= self.step_limit {
                return Err(FlowError::StepLimit {
                    limit: self.step_limit,
                    node: current,
                    state: Box::new(state.clone()),
                });
            }
            ctx.advance(&current);

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| FlowError::Configuration {
                    node: current.clone(),
                    message: "unknown node id".into(),
                })?;
            debug!(session = %ctx.session_id(), node = %current, step = ctx.step(), "node step");

            let update = match node.apply(state, ctx).await {
                Ok(update) => update,
                Err(source) => {
                    return Err(FlowError::NodeExecution {
                        node: current,
                        source,
                        state: Box::new(state.clone()),
                    });
                }
            };

            let echo = sink
                .filter(|s| s.modes.contains(&StreamMode::Updates))
                .map(|_| update.clone());
            state.apply(update);

            if let Some(sink) = sink {
                if sink.modes.contains(&StreamMode::Values) {
                    let _ = sink.tx.send(StreamEvent::Values(state.clone())).await;
                }
                if let Some(update) = echo {
                    let _ = sink
                        .tx
                        .send(StreamEvent::Updates {
                            node_id: current.clone(),
                            update,
                        })
                        .await;
                }
            }

            current = self.next_node(&current, state)?;
        }
    }

    /// Resolves the route out of `current` against the post-merge state.
    fn next_node(&self, current: &str, state: &SessionState) -> Result<String, FlowError> {
        if let Some(target) = self.edges.get(current) {
            debug!(from = %current, to = %target, "route");
            return Ok(target.clone());
        }
        if let Some(edge) = self.conditional.get(current) {
            let label = (edge.predicate)(state);
            if let Some(target) = edge.branches.target_for(&label) {
                debug!(from = %current, label = %label, to = %target, "route");
                return Ok(target.to_string());
            }
            if let Some(default) = edge.branches.default_target() {
                debug!(from = %current, label = %label, to = %default, "route (default branch)");
                return Ok(default.to_string());
            }
            return Err(FlowError::Configuration {
                node: current.to_string(),
                message: format!("label {label:?} has no branch and no default"),
            });
        }
        Err(FlowError::Configuration {
            node: current.to_string(),
            message: "no outgoing route".into(),
        })
    }

    /// Runs the flow from the `START` edge's target to `END`.
    ///
    /// The state's declared bindings are seeded first; each node's update
    /// merges under them. Returns the terminal state, or the error with
    /// whatever state had accumulated.
    pub async fn invoke(
        &self,
        state: SessionState,
        config: Option<RunConfig>,
    ) -> Result<SessionState, FlowError> {
        self.invoke_at(state, self.entry.clone(), config).await
    }

    /// Runs the flow from an explicit entry node instead of the `START`
    /// edge's target. An unknown id is a `Configuration` error.
    pub async fn invoke_from(
        &self,
        state: SessionState,
        start: impl Into<String>,
        config: Option<RunConfig>,
    ) -> Result<SessionState, FlowError> {
        self.invoke_at(state, start.into(), config).await
    }

    async fn invoke_at(
        &self,
        mut state: SessionState,
        start: String,
        config: Option<RunConfig>,
    ) -> Result<SessionState, FlowError> {
        state.seed_bindings(&self.bindings);
        let named = config.as_ref().and_then(|c| c.session_id.clone());
        let persist = named.is_some();
        let session_id = named.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut ctx = ExecutionContext::new(&session_id, None);

        info!(session = %session_id, entry = %start, "flow started");
        match self
            .run_loop_inner(&mut state, &mut ctx, persist, start, None)
            .await
        {
            Ok(()) => {
                info!(session = %session_id, steps = ctx.step(), "flow finished");
                Ok(state)
            }
            Err(error) => {
                error!(session = %session_id, node = %error.node_id(), %error, "flow aborted");
                Err(error)
            }
        }
    }

    /// Streams the run, emitting events per selected mode via a
    /// channel-backed stream. The stream ends when the run finishes or
    /// aborts; failures are logged, not surfaced as events.
    pub fn stream(
        &self,
        state: SessionState,
        config: Option<RunConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let flow = self.clone();
        let modes: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let mut state = state;
            state.seed_bindings(&flow.bindings);
            let named = config.as_ref().and_then(|c| c.session_id.clone());
            let persist = named.is_some();
            let session_id = named.unwrap_or_else(|| Uuid::new_v4().to_string());
            let sink = StreamSink { tx, modes };
            let mut ctx = ExecutionContext::new(&session_id, sink.chunk_tx());

            info!(session = %session_id, entry = %flow.entry, "flow started (streaming)");
            let entry = flow.entry.clone();
            if let Err(error) = flow
                .run_loop_inner(&mut state, &mut ctx, persist, entry, Some(&sink))
                .await
            {
                error!(session = %session_id, node = %error.node_id(), %error, "flow aborted");
            }
        });

        ReceiverStream::new(rx)
    }

    /// Fresh state pre-seeded with the graph's declared bindings.
    pub fn initial_state(&self) -> SessionState {
        let mut state = SessionState::new();
        state.seed_bindings(&self.bindings);
        state
    }

    /// The `START` edge's target.
    pub fn entry(&self) -> &str {
        &self.entry
    }
}
