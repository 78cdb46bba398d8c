//! Transient per-turn workflow state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::sessions::ConversationContext;

/// Execution node selected by the router. Closed set; the executor dispatches
/// on this enum rather than on dynamic node tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    ToolExec,
    Collaborate,
    Analyze,
    Respond,
}

impl Route {
    /// Wire string reported to callers as `route_taken`.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::ToolExec => "tool_exec",
            Route::Collaborate => "collaborate",
            Route::Analyze => "analyze",
            Route::Respond => "respond",
        }
    }
}

/// Collaboration flavor chosen by the router for open-ended queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Research,
    Analysis,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Research => "research",
            TaskType::Analysis => "analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// One message accumulated during a turn.
#[derive(Debug, Clone)]
pub struct TurnMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Per-turn state threaded through the graph. Holds a snapshot of the
/// session context; the store's copy is only touched by the commit at turn
/// end.
pub struct WorkflowState {
    pub query: String,
    pub messages: Vec<TurnMessage>,
    pub context: ConversationContext,
    pub route: Option<Route>,
    pub final_response: Option<String>,
    pub current_task_type: Option<TaskType>,
    pub task_metadata: HashMap<String, String>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    pub degraded: bool,
}

impl WorkflowState {
    pub fn new(query: &str, context: ConversationContext, max_retries: u32) -> Self {
        Self {
            query: query.to_string(),
            messages: vec![TurnMessage {
                role: MessageRole::User,
                content: query.to_string(),
            }],
            context,
            route: None,
            final_response: None,
            current_task_type: None,
            task_metadata: HashMap::new(),
            retry_count: 0,
            max_retries,
            last_error: None,
            degraded: false,
        }
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(TurnMessage {
            role: MessageRole::Assistant,
            content: content.into(),
        });
    }

    pub fn push_tool(&mut self, content: impl Into<String>) {
        self.messages.push(TurnMessage {
            role: MessageRole::Tool,
            content: content.into(),
        });
    }

    /// Whether a capability already produced a result this turn.
    pub fn has_tool_result(&self) -> bool {
        self.messages.iter().any(|m| m.role == MessageRole::Tool)
    }

    /// Whether a failed external call is pending resolution.
    pub fn retry_pending(&self) -> bool {
        self.last_error.is_some()
    }

    /// The newest non-user message, if any. This is what RESPOND surfaces.
    pub fn last_result_message(&self) -> Option<&TurnMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role != MessageRole::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WorkflowState {
        WorkflowState::new("hello", ConversationContext::new("s1", None), 3)
    }

    #[test]
    fn new_state_starts_with_user_message() {
        let state = state();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, MessageRole::User);
        assert_eq!(state.retry_count, 0);
        assert!(state.route.is_none());
        assert!(!state.degraded);
    }

    #[test]
    fn last_result_message_skips_user_entries() {
        let mut state = state();
        assert!(state.last_result_message().is_none());
        state.push_tool("tool output");
        state.push_assistant("summary");
        assert_eq!(state.last_result_message().unwrap().content, "summary");
    }

    #[test]
    fn tool_result_detection() {
        let mut state = state();
        assert!(!state.has_tool_result());
        state.push_assistant("not a tool");
        assert!(!state.has_tool_result());
        state.push_tool("result");
        assert!(state.has_tool_result());
    }

    #[test]
    fn route_wire_strings() {
        assert_eq!(Route::ToolExec.as_str(), "tool_exec");
        assert_eq!(Route::Collaborate.as_str(), "collaborate");
        assert_eq!(Route::Analyze.as_str(), "analyze");
        assert_eq!(Route::Respond.as_str(), "respond");
    }
}
