#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::map_unwrap_or,
    clippy::manual_let_else,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unused_self
)]

pub mod agent;
pub mod collab;
pub mod config;
pub mod error;
pub mod memory;
pub mod observability;
pub mod providers;
pub mod routing;
pub mod sessions;
pub mod tools;
pub mod workflow;

pub use agent::{Orchestrator, SessionInsights, TurnResponse};
pub use config::Config;
pub use error::OrchestratorError;
