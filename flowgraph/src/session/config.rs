//! Invoke config: names the session a run belongs to.

/// Config for a single invoke.
///
/// Naming a session makes the run durable: when the flow was compiled with
/// a saver, the terminal state is stored under that id after a successful
/// run, and later turns can load it to continue. Runs without a session id
/// execute under a generated one and are never saved.
///
/// **Interaction**: Passed to `CompiledFlow::invoke(state, config)` /
/// `stream`; keys `SessionSaver::save` / `load`.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Session this run belongs to.
    pub session_id: Option<String>,
}

impl RunConfig {
    /// Config naming `session_id`.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }
}
