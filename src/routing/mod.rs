//! Deterministic routing over per-turn state.
//!
//! The router is a pure function of the query, the accumulated turn state,
//! and the routing configuration. No I/O, no randomness, no clock reads:
//! calling [`decide`] twice on identical inputs yields identical decisions.
//!
//! Priority order:
//! 1. A configured tool-intent phrase matches, no failed call is pending,
//!    and no tool has produced a result yet this turn.
//! 2. The query is open-ended (research or analysis keywords, unusually
//!    long, or multi-part) and routes to a collaboration flavor.
//! 3. Everything else responds directly from existing context.

use crate::config::RoutingConfig;
use crate::workflow::{Route, TaskType, WorkflowState};

/// Outcome of one routing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub route: Route,
    /// Set only for [`Route::ToolExec`].
    pub tool: Option<String>,
    /// Set only for the collaboration routes.
    pub task_type: Option<TaskType>,
}

impl RouteDecision {
    fn respond() -> Self {
        Self {
            route: Route::Respond,
            tool: None,
            task_type: None,
        }
    }
}

/// Select the next node for the current pass.
pub fn decide(state: &WorkflowState, config: &RoutingConfig) -> RouteDecision {
    let query = state.query.to_lowercase();

    // Rule 1: explicit tool intent. Skipped once a tool already ran this
    // turn (its result goes to RESPOND) or a failed call is unresolved.
    if !state.retry_pending() && !state.has_tool_result() {
        if let Some(tool) = match_tool_intent(&query, config) {
            return RouteDecision {
                route: Route::ToolExec,
                tool: Some(tool.to_string()),
                task_type: None,
            };
        }
    }

    // Rule 2: open-ended queries go to a collaboration flavor.
    let research_hits = keyword_hits(&query, &config.research_keywords);
    let analysis_hits = keyword_hits(&query, &config.analysis_keywords);
    let question_marks = query.matches('?').count();
    let open_ended = research_hits + analysis_hits > 0
        || query.chars().count() > config.long_query_chars
        || question_marks >= config.multi_part_questions;
    if open_ended {
        let task_type = if analysis_hits > research_hits {
            TaskType::Analysis
        } else {
            TaskType::Research
        };
        let route = match task_type {
            TaskType::Analysis => Route::Analyze,
            TaskType::Research => Route::Collaborate,
        };
        return RouteDecision {
            route,
            tool: None,
            task_type: Some(task_type),
        };
    }

    // Rule 3: direct response.
    RouteDecision::respond()
}

/// First configured rule whose phrase list matches, in configuration order.
fn match_tool_intent<'a>(query: &str, config: &'a RoutingConfig) -> Option<&'a str> {
    config
        .tool_intents
        .iter()
        .find(|rule| rule.phrases.iter().any(|p| query.contains(p.as_str())))
        .map(|rule| rule.tool.as_str())
}

fn keyword_hits(query: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|k| query.contains(k.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::ConversationContext;

    fn state(query: &str) -> WorkflowState {
        WorkflowState::new(query, ConversationContext::new("s1", None), 3)
    }

    fn config() -> RoutingConfig {
        RoutingConfig::default()
    }

    #[test]
    fn tool_intent_wins_over_keywords() {
        let decision = decide(&state("show me system info about this research box"), &config());
        assert_eq!(decision.route, Route::ToolExec);
        assert_eq!(decision.tool.as_deref(), Some("system_info"));
    }

    #[test]
    fn tool_intent_skipped_after_tool_result() {
        let mut state = state("what is the system info");
        state.push_tool("os: linux");
        let decision = decide(&state, &config());
        assert_eq!(decision.route, Route::Respond);
    }

    #[test]
    fn tool_intent_skipped_while_retry_pending() {
        let mut state = state("what is the system info");
        state.last_error = Some("upstream unavailable".into());
        let decision = decide(&state, &config());
        assert_eq!(decision.route, Route::Respond);
    }

    #[test]
    fn research_keywords_route_to_collaborate() {
        let decision = decide(&state("investigate the history of container runtimes"), &config());
        assert_eq!(decision.route, Route::Collaborate);
        assert_eq!(decision.task_type, Some(TaskType::Research));
    }

    #[test]
    fn analysis_keywords_route_to_analyze() {
        let decision = decide(
            &state("give me an analysis of these deployment patterns"),
            &config(),
        );
        assert_eq!(decision.route, Route::Analyze);
        assert_eq!(decision.task_type, Some(TaskType::Analysis));
    }

    #[test]
    fn long_query_is_open_ended() {
        let long = "tell me about this topic ".repeat(12);
        let decision = decide(&state(&long), &config());
        assert_eq!(decision.route, Route::Collaborate);
    }

    #[test]
    fn multi_part_question_is_open_ended() {
        let decision = decide(
            &state("what changed last year? and what should we do next?"),
            &config(),
        );
        assert_eq!(decision.route, Route::Collaborate);
    }

    #[test]
    fn plain_chat_responds_directly() {
        let decision = decide(&state("good morning"), &config());
        assert_eq!(decision.route, Route::Respond);
        assert!(decision.tool.is_none());
        assert!(decision.task_type.is_none());
    }

    #[test]
    fn decision_is_deterministic() {
        let state = state("investigate rust async runtimes");
        let config = config();
        let first = decide(&state, &config);
        for _ in 0..10 {
            assert_eq!(decide(&state, &config), first);
        }
    }

    #[test]
    fn intent_match_is_case_insensitive() {
        let decision = decide(&state("SYSTEM INFO please"), &config());
        assert_eq!(decision.route, Route::ToolExec);
    }
}
