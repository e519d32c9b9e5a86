//! Fan-out/fan-in: dispatcher, branch workers, collector.
//!
//! The loop: a [`DispatcherNode`] marks N branch status keys `"assigned"`;
//! each [`BranchWorkerNode`] spawns its provider call as a background task
//! on its first assigned visit and merges the result on a later pass; a
//! [`CollectorNode`] routes back to the dispatcher until every expected
//! result key is present, then its conditional edge leaves the loop.
//! Sibling provider calls run concurrently while state merges stay
//! serialized through the executor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::graph::ExecutionContext;
use crate::llm::LlmClient;
use crate::state::{SessionState, StateUpdate};
use crate::template::render;

use super::llm_node::DEFAULT_LLM_TIMEOUT;
use super::NodeAction;

/// Status value the dispatcher writes to an unset branch key.
pub const STATUS_ASSIGNED: &str = "assigned";

/// Status value a worker writes once its result is merged.
pub const STATUS_COMPLETED: &str = "completed";

/// Collector visits before giving up on missing keys.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Ceiling for one collector wait. Sized so the round budget outlasts the
/// default provider timeout.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

/// Per-session count of outstanding branch tasks, with completion wakeup.
///
/// Workers increment when they spawn and decrement when the spawned call
/// resolves; the collector waits on the count instead of sleeping blind.
/// Share one tracker (behind `Arc`) between the workers and the collector
/// of a fan-out group.
#[derive(Default)]
pub struct JoinTracker {
    outstanding: DashMap<String, usize>,
    notify: Notify,
}

impl JoinTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn task_started(&self, session_id: &str) {
        *self
            .outstanding
            .entry(session_id.to_string())
            .or_insert(0) += 1;
    }

    pub(crate) fn task_finished(&self, session_id: &str) {
        if let Some(mut count) = self.outstanding.get_mut(session_id) {
            *count = count.saturating_sub(1);
        }
        self.outstanding.remove_if(session_id, |_, count| *count == 0);
        self.notify.notify_waiters();
    }

    fn pending(&self, session_id: &str) -> usize {
        self.outstanding.get(session_id).map(|c| *c).unwrap_or(0)
    }

    /// Waits until the session has no outstanding task, up to `ceiling`.
    ///
    /// Returns early on the completion wakeup; hitting the ceiling is not
    /// an error (the collector burns a round and re-checks).
    pub(crate) async fn wait_idle(&self, session_id: &str, ceiling: Duration) {
        let deadline = tokio::time::Instant::now() + ceiling;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before the check so a completion between check and
            // await still wakes us.
            notified.as_mut().enable();
            if self.pending(session_id) == 0 {
                return;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return;
            }
        }
    }
}

/// Idempotent fan-out initiator.
///
/// Marks each branch status key `"assigned"` when unset. Keys already
/// `"assigned"` or `"completed"` are untouched, so loop revisits never
/// reset a branch.
pub struct DispatcherNode {
    status_keys: Vec<String>,
}

impl DispatcherNode {
    /// Creates a dispatcher over the branch status keys.
    pub fn new(status_keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            status_keys: status_keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl NodeAction for DispatcherNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let mut update = StateUpdate::new();
        for key in &self.status_keys {
            if !state.contains(key) {
                update.set(key.clone(), STATUS_ASSIGNED);
            }
        }
        if !update.is_empty() {
            debug!(node = %ctx.node_id(), branches = update.len(), "assigned branches");
        }
        Ok(update)
    }
}

/// One branch of a fan-out group.
///
/// Acts only while its status key reads `"assigned"`. The first such visit
/// renders the prompt and spawns the provider call as a background task
/// registered under the session id, so sibling workers' calls overlap. A
/// later visit whose task has finished merges the result key and flips the
/// status to `"completed"`; any other visit is an empty update. The
/// spawned call resolves to the fallback text on failure or timeout, so
/// the result key always eventually appears.
pub struct BranchWorkerNode {
    llm: Arc<dyn LlmClient>,
    prompt: String,
    status_key: String,
    result_key: String,
    tracker: Arc<JoinTracker>,
    tasks: DashMap<String, JoinHandle<String>>,
    timeout: Duration,
    fallback: Option<String>,
}

impl BranchWorkerNode {
    /// Creates a worker answering `prompt` into `result_key`, gated by
    /// `status_key`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompt: impl Into<String>,
        status_key: impl Into<String>,
        result_key: impl Into<String>,
        tracker: Arc<JoinTracker>,
    ) -> Self {
        Self {
            llm,
            prompt: prompt.into(),
            status_key: status_key.into(),
            result_key: result_key.into(),
            tracker,
            tasks: DashMap::new(),
            timeout: DEFAULT_LLM_TIMEOUT,
            fallback: None,
        }
    }

    /// Overrides the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the fallback text substituted on provider failure.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    fn fallback_text(&self) -> String {
        self.fallback
            .clone()
            .unwrap_or_else(|| format!("[{} unavailable]", self.result_key))
    }

    fn spawn_call(&self, session_id: String, prompt: String, node_id: &str) {
        let llm = self.llm.clone();
        let tracker = self.tracker.clone();
        let fallback = self.fallback_text();
        let ceiling = self.timeout;
        let node = node_id.to_string();
        let session = session_id.clone();
        debug!(node = %node, session = %session, "spawning branch call");

        self.tracker.task_started(&session_id);
        let handle = tokio::spawn(async move {
            let text = match timeout(ceiling, llm.complete(&prompt)).await {
                Ok(Ok(text)) => text,
                Ok(Err(error)) => {
                    warn!(node = %node, %error, "branch call failed, substituting fallback");
                    fallback
                }
                Err(_) => {
                    warn!(
                        node = %node,
                        seconds = ceiling.as_secs(),
                        "branch call timed out, substituting fallback"
                    );
                    fallback
                }
            };
            tracker.task_finished(&session);
            text
        });
        self.tasks.insert(session_id, handle);
    }
}

#[async_trait]
impl NodeAction for BranchWorkerNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        if state.text_or(&self.status_key, "") != STATUS_ASSIGNED {
            return Ok(StateUpdate::new());
        }

        let session_id = ctx.session_id().to_string();
        let finished = self.tasks.get(&session_id).map(|task| task.is_finished());
        match finished {
            None => {
                let prompt = render(&self.prompt, state);
                self.spawn_call(session_id, prompt, ctx.node_id());
                Ok(StateUpdate::new())
            }
            Some(false) => Ok(StateUpdate::new()),
            Some(true) => {
                let Some((_, task)) = self.tasks.remove(&session_id) else {
                    return Ok(StateUpdate::new());
                };
                let text = match task.await {
                    Ok(text) => text,
                    Err(join_error) => {
                        warn!(
                            node = %ctx.node_id(),
                            %join_error,
                            "branch task panicked, substituting fallback"
                        );
                        self.fallback_text()
                    }
                };
                Ok(StateUpdate::new()
                    .with(self.result_key.clone(), text)
                    .with(self.status_key.clone(), STATUS_COMPLETED))
            }
        }
    }
}

/// Fan-in barrier.
///
/// Fast path: with every expected result key present it writes the round
/// counter and lets its conditional edge leave the loop. Otherwise waits for the
/// tracker to drain (poll delay as ceiling) and routes back through the
/// dispatcher for the harvest pass. The round budget bounds the loop:
/// exhausting it with keys still missing is fatal.
pub struct CollectorNode {
    expected: Vec<String>,
    tracker: Arc<JoinTracker>,
    round_key: String,
    max_rounds: usize,
    poll_delay: Duration,
}

impl CollectorNode {
    /// Creates a collector waiting on the expected result keys.
    pub fn new(
        expected: impl IntoIterator<Item = impl Into<String>>,
        tracker: Arc<JoinTracker>,
    ) -> Self {
        Self {
            expected: expected.into_iter().map(Into::into).collect(),
            tracker,
            round_key: "collect_round".into(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    /// Overrides the state key holding the round counter.
    pub fn with_round_key(mut self, key: impl Into<String>) -> Self {
        self.round_key = key.into();
        self
    }

    /// Overrides the round budget.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Overrides the per-round wait ceiling.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    /// True when every expected key is present. The natural predicate for
    /// the collector's conditional edge.
    pub fn is_complete(&self, state: &SessionState) -> bool {
        self.expected.iter().all(|key| state.contains(key))
    }
}

#[async_trait]
impl NodeAction for CollectorNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let missing: Vec<String> = self
            .expected
            .iter()
            .filter(|key| !state.contains(key.as_str()))
            .cloned()
            .collect();
        let round = state.int_or(&self.round_key, 0) + 1;

        if missing.is_empty() {
            debug!(node = %ctx.node_id(), round, "fan-in complete");
            return Ok(StateUpdate::new().with(self.round_key.clone(), round));
        }
        if round > i64::try_from(self.max_rounds).unwrap_or(i64::MAX) {
            return Err(NodeError::JoinIncomplete {
                rounds: self.max_rounds,
                missing,
            });
        }

        debug!(node = %ctx.node_id(), round, ?missing, "fan-in waiting");
        self.tracker
            .wait_idle(ctx.session_id(), self.poll_delay)
            .await;
        Ok(StateUpdate::new().with(self.round_key.clone(), round))
    }
}
