//! Bounded graph executor for a single turn.
//!
//! Runs the ROUTE loop until a response exists or the pass budget runs out.
//! Every external call goes through the shared retry handler; once the
//! budget is spent the turn degrades instead of erroring, so a turn always
//! ends in a response.

use std::sync::Arc;
use std::time::Duration;

use crate::collab::Coordinator;
use crate::config::{Config, RoutingConfig, WorkflowConfig};
use crate::error::OrchestratorError;
use crate::providers::CompletionClient;
use crate::routing;
use crate::sessions::ConversationContext;
use crate::tools::ToolRegistry;
use crate::workflow::retry;
use crate::workflow::{Route, TaskType, WorkflowState};

/// What a finished turn hands back to the session layer.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub query: String,
    pub final_response: String,
    pub route_taken: Route,
    pub task_type: Option<TaskType>,
    pub degraded: bool,
}

pub struct GraphExecutor {
    client: Arc<dyn CompletionClient>,
    tools: Arc<ToolRegistry>,
    coordinator: Arc<Coordinator>,
    routing: RoutingConfig,
    workflow: WorkflowConfig,
    call_timeout: Duration,
}

impl GraphExecutor {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        tools: Arc<ToolRegistry>,
        coordinator: Arc<Coordinator>,
        config: &Config,
    ) -> Self {
        Self {
            client,
            tools,
            coordinator,
            routing: config.routing.clone(),
            workflow: config.workflow.clone(),
            call_timeout: Duration::from_secs(config.provider.call_timeout_secs),
        }
    }

    /// Execute one turn against a snapshot of the session context. Never
    /// fails: exhausted budgets and upstream outages degrade the response.
    pub async fn run_turn(&self, query: &str, context: &ConversationContext) -> TurnOutcome {
        let mut state = WorkflowState::new(query, context.clone(), self.workflow.max_retries);
        let route_budget = self.workflow.max_retries + self.workflow.route_slack;
        let mut route_taken = Route::Respond;
        let mut passes = 0u32;

        loop {
            passes += 1;
            if passes > route_budget {
                tracing::warn!(passes, "routing budget exhausted, forcing degraded response");
                state.degraded = true;
                state.push_assistant(
                    "I could not complete this request within the allowed number of steps.",
                );
                break;
            }

            let decision = routing::decide(&state, &self.routing);
            state.route = Some(decision.route);
            if let Some(task_type) = decision.task_type {
                state.current_task_type = Some(task_type);
            }
            tracing::debug!(pass = passes, route = decision.route.as_str(), "route decided");

            match decision.route {
                Route::ToolExec => {
                    let Some(tool) = decision.tool else {
                        state.degraded = true;
                        break;
                    };
                    route_taken = Route::ToolExec;
                    state.task_metadata.insert("tool".into(), tool.clone());
                    if self.execute_tool(&mut state, &tool).await {
                        // result accumulated; the next pass resolves to RESPOND
                        continue;
                    }
                    break;
                }
                Route::Collaborate | Route::Analyze => {
                    route_taken = decision.route;
                    self.execute_collaboration(&mut state).await;
                    break;
                }
                Route::Respond => {
                    if state.last_result_message().is_none() && !state.degraded {
                        self.execute_direct_reply(&mut state).await;
                    }
                    break;
                }
            }
        }

        let final_response = final_response(&state);
        state.final_response = Some(final_response.clone());
        tracing::info!(
            route = route_taken.as_str(),
            degraded = state.degraded,
            retries = state.retry_count,
            "turn finished"
        );
        TurnOutcome {
            query: state.query,
            final_response,
            route_taken,
            task_type: state.current_task_type,
            degraded: state.degraded,
        }
    }

    /// Returns true when the tool produced a result. On failure the turn is
    /// marked degraded and an explanation is accumulated instead.
    async fn execute_tool(&self, state: &mut WorkflowState, tool: &str) -> bool {
        let params = serde_json::json!({ "query": state.query });
        let timeout = self.call_timeout;
        let tools = &self.tools;
        let result = retry::with_retry(state, &self.workflow, "tool_exec", || async {
            match tokio::time::timeout(timeout, tools.invoke(tool, &params)).await {
                Ok(result) => result,
                Err(_) => Err(OrchestratorError::Timeout {
                    operation: format!("tool {tool}"),
                    seconds: timeout.as_secs(),
                }),
            }
        })
        .await;

        match result {
            Ok(output) => {
                state.last_error = None;
                state.push_tool(output);
                true
            }
            Err(err) => {
                tracing::warn!(tool, reason = err.reason_code(), "tool execution gave up");
                state.degraded = true;
                state.push_assistant(format!(
                    "I could not run the {tool} capability right now ({err})."
                ));
                false
            }
        }
    }

    async fn execute_collaboration(&self, state: &mut WorkflowState) {
        let task_type = state.current_task_type.unwrap_or(TaskType::Research);
        let query = state.query.clone();
        let context = state.context.clone();
        let coordinator = &self.coordinator;
        let result = retry::with_retry(state, &self.workflow, "collaborate", || {
            coordinator.coordinate(&query, &context, task_type)
        })
        .await;

        match result {
            Ok(outcome) => {
                if outcome.degraded {
                    state.degraded = true;
                }
                state.push_assistant(outcome.text);
            }
            Err(err) => {
                tracing::warn!(
                    reason = err.reason_code(),
                    "collaboration failed, falling back to a direct reply"
                );
                state.degraded = true;
                let prompt =
                    format!("Answer the user's request as well as you can in one reply: {query}");
                if let Ok(Ok(text)) =
                    tokio::time::timeout(self.call_timeout, self.client.complete(&prompt)).await
                {
                    state.push_assistant(text);
                }
            }
        }
    }

    async fn execute_direct_reply(&self, state: &mut WorkflowState) {
        let query = state.query.clone();
        let topics = state.context.recent_topics.join(", ");
        let prompt = if topics.is_empty() {
            format!("Reply conversationally and helpfully to: {query}")
        } else {
            format!("Reply conversationally and helpfully to (recent topics: {topics}): {query}")
        };
        let timeout = self.call_timeout;
        let client = &self.client;
        let result = retry::with_retry(state, &self.workflow, "respond", || async {
            match tokio::time::timeout(timeout, client.complete(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(OrchestratorError::Timeout {
                    operation: "direct reply".into(),
                    seconds: timeout.as_secs(),
                }),
            }
        })
        .await;

        match result {
            Ok(text) => state.push_assistant(text),
            Err(err) => {
                tracing::warn!(reason = err.reason_code(), "direct reply gave up");
                state.degraded = true;
            }
        }
    }
}

/// RESPOND is deterministic over accumulated state and cannot fail: the
/// newest tool or assistant message verbatim, else a generic fallback.
fn final_response(state: &WorkflowState) -> String {
    state.last_result_message().map_or_else(
        || "I was not able to produce a full answer this time. Please try again.".to_string(),
        |msg| msg.content.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FlakyCompletion, ScriptedCompletion};
    use crate::tools::default_tools;

    fn executor(client: Arc<dyn CompletionClient>) -> GraphExecutor {
        let config = Config::default();
        let tools = Arc::new(default_tools(client.clone()));
        let coordinator = Arc::new(Coordinator::new(client.clone(), config.collab.clone()));
        GraphExecutor::new(client, tools, coordinator, &config)
    }

    fn context() -> ConversationContext {
        ConversationContext::new("s1", None)
    }

    #[tokio::test]
    async fn tool_query_returns_raw_tool_result() {
        let executor = executor(Arc::new(ScriptedCompletion::new()));
        let outcome = executor.run_turn("show me the system info", &context()).await;
        assert_eq!(outcome.route_taken, Route::ToolExec);
        assert!(!outcome.degraded);
        assert!(outcome.final_response.contains("os:"));
        assert!(outcome.final_response.contains("arch:"));
    }

    #[tokio::test]
    async fn research_query_takes_collaboration_path() {
        let executor = executor(Arc::new(ScriptedCompletion::new()));
        let outcome = executor
            .run_turn("investigate current trends in ai agents", &context())
            .await;
        assert_eq!(outcome.route_taken, Route::Collaborate);
        assert_eq!(outcome.task_type, Some(TaskType::Research));
        assert!(!outcome.degraded);
        assert!(outcome.final_response.contains("Key findings:"));
    }

    #[tokio::test]
    async fn plain_chat_takes_direct_reply() {
        let client = Arc::new(ScriptedCompletion::new());
        let executor = executor(client.clone());
        let outcome = executor.run_turn("good morning", &context()).await;
        assert_eq!(outcome.route_taken, Route::Respond);
        assert!(!outcome.degraded);
        assert!(outcome.final_response.contains("[scripted]"));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_backend_degrades_instead_of_erroring() {
        let executor = executor(Arc::new(FlakyCompletion::always_failing()));
        let outcome = executor
            .run_turn("investigate current trends in ai agents", &context())
            .await;
        assert!(outcome.degraded);
        assert!(!outcome.final_response.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_direct_reply_uses_generic_fallback() {
        let executor = executor(Arc::new(FlakyCompletion::always_failing()));
        let outcome = executor.run_turn("good morning", &context()).await;
        assert!(outcome.degraded);
        assert!(outcome.final_response.contains("try again"));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_tool_degrades_with_explanation() {
        let executor = executor(Arc::new(FlakyCompletion::always_failing()));
        let outcome = executor
            .run_turn("summarize website https://example.com", &context())
            .await;
        assert_eq!(outcome.route_taken, Route::ToolExec);
        assert!(outcome.degraded);
        assert!(outcome.final_response.contains("website_summarize"));
    }

    #[tokio::test]
    async fn transient_failures_recover_within_budget() {
        let executor = executor(Arc::new(FlakyCompletion::new(1)));
        let outcome = executor.run_turn("good morning", &context()).await;
        // FlakyCompletion fails once; the retry handler absorbs it
        assert!(!outcome.degraded);
        assert!(outcome.final_response.contains("[flaky]"));
    }
}
