//! Per-turn workflow: state, retry handling, and the graph executor.

pub mod executor;
pub mod retry;
pub mod state;

pub use executor::{GraphExecutor, TurnOutcome};
pub use retry::{backoff_delay, with_retry};
pub use state::{MessageRole, Route, TaskType, TurnMessage, WorkflowState};
