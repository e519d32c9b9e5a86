//! Execution context: the run loop's cursor, handed to nodes per step.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::stream::{StreamEvent, StreamMode};

/// Bookkeeping for one traversal: session id, current node, step counter,
/// termination flag.
///
/// Owned and advanced by the executor; nodes receive it by reference. The
/// optional chunk sender lets streaming nodes forward model output while
/// they run; it is wired only when the run was started via
/// [`stream`](crate::graph::CompiledFlow::stream) with
/// [`StreamMode::Messages`] enabled.
#[derive(Clone)]
pub struct ExecutionContext {
    session_id: String,
    node_id: String,
    step: usize,
    finished: bool,
    chunk_tx: Option<mpsc::Sender<StreamEvent>>,
}

impl ExecutionContext {
    pub(crate) fn new(
        session_id: impl Into<String>,
        chunk_tx: Option<mpsc::Sender<StreamEvent>>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            node_id: String::new(),
            step: 0,
            finished: false,
            chunk_tx,
        }
    }

    /// Moves the cursor to the next node, counting the step.
    pub(crate) fn advance(&mut self, node_id: &str) {
        self.node_id = node_id.to_string();
        self.step += 1;
    }

    /// Marks the traversal terminated.
    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Id of the session this traversal belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Id of the node currently executing.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Number of node steps taken so far, this one included.
    pub fn step(&self) -> usize {
        self.step
    }

    /// True once routing has reached `END`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Forwards one chunk of model output to the run's stream.
    ///
    /// A no-op when nobody listens (plain `invoke`, or `Messages` mode not
    /// selected), so nodes stream unconditionally.
    pub async fn forward_chunk(&self, content: impl Into<String>) {
        if let Some(tx) = &self.chunk_tx {
            let _ = tx
                .send(StreamEvent::Messages {
                    node_id: self.node_id.clone(),
                    content: content.into(),
                })
                .await;
        }
    }
}

/// Channel plus selected modes for one streamed run.
pub(crate) struct StreamSink {
    pub(crate) tx: mpsc::Sender<StreamEvent>,
    pub(crate) modes: HashSet<StreamMode>,
}

impl StreamSink {
    /// Chunk sender for node contexts, when `Messages` mode is selected.
    pub(crate) fn chunk_tx(&self) -> Option<mpsc::Sender<StreamEvent>> {
        self.modes
            .contains(&StreamMode::Messages)
            .then(|| self.tx.clone())
    }
}
