//! Session persistence: run config, state serialization, savers.
//!
//! A session is one conversation across any number of runs. Naming one in
//! [`RunConfig`] keys both the worker-task registry during a run and the
//! terminal-state snapshot a [`SessionSaver`] keeps between runs.

mod config;
mod saver;
mod serializer;

pub use config::RunConfig;
pub use saver::{MemorySaver, PersistError, SessionSaver};
pub use serializer::{JsonSerializer, StateSerializer};
