//! Session memory: extraction and the single end-of-turn commit.
//!
//! All durable effects of a turn go through one `update_context` call, so a
//! turn either lands completely or not at all. A failed commit is logged and
//! dropped; memory is best effort and never fails a turn that already has a
//! response.

use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::sessions::SessionStore;
use crate::workflow::{Route, TaskType, TurnOutcome};

pub struct MemoryManager {
    store: Arc<dyn SessionStore>,
    memory_cap: usize,
    history_cap: usize,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &WorkflowConfig) -> Self {
        Self {
            store,
            memory_cap: config.memory_cap,
            history_cap: config.history_cap,
        }
    }

    /// Commit everything a finished turn learned in a single mutation.
    pub async fn commit_turn(&self, session_id: &str, outcome: &TurnOutcome) {
        let query = outcome.query.clone();
        let response = outcome.final_response.clone();
        let route = outcome.route_taken.as_str().to_string();
        let topic = extract_topic(&outcome.query);
        let insight = extract_insight(outcome);
        let preferences = extract_preferences(&outcome.query);
        let memory_cap = self.memory_cap;
        let history_cap = self.history_cap;

        let result = self
            .store
            .update_context(
                session_id,
                Box::new(move |context| {
                    context.push_history(&query, &response, &route, history_cap);
                    if let Some(topic) = topic {
                        context.record_topic(&topic, memory_cap);
                    }
                    if let Some(insight) = insight {
                        context.record_insight(&insight, memory_cap);
                    }
                    for (key, value) in preferences {
                        context.preferences.insert(key, value);
                    }
                }),
            )
            .await;

        if let Err(err) = result {
            tracing::warn!(session_id, error = %err, "memory commit failed, dropping turn memory");
        }
    }
}

/// Condense a query into a topic line: collapsed whitespace, capped length.
fn extract_topic(query: &str) -> Option<String> {
    let cleaned = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.chars().take(80).collect())
}

/// Collaboration turns leave an insight describing what was worked through.
fn extract_insight(outcome: &TurnOutcome) -> Option<String> {
    if !matches!(outcome.route_taken, Route::Collaborate | Route::Analyze) {
        return None;
    }
    let topic = extract_topic(&outcome.query)?;
    let label = match outcome.task_type {
        Some(TaskType::Analysis) => "Analyzed",
        _ => "Researched",
    };
    Some(format!("{label}: {topic}"))
}

/// Mine explicit self-descriptions out of the query.
fn extract_preferences(query: &str) -> Vec<(String, String)> {
    let lowered = query.to_lowercase();
    let mut preferences = Vec::new();
    for (phrase, key) in [
        ("my name is ", "name"),
        ("call me ", "name"),
        ("i prefer ", "likes"),
        ("i like ", "likes"),
    ] {
        if let Some(pos) = lowered.find(phrase) {
            // index back into the original to keep the value's casing;
            // lowercasing may shift byte offsets for non-ASCII input
            let Some(rest) = query.get(pos + phrase.len()..) else {
                continue;
            };
            let value: String = rest
                .split(['.', ',', '!', '?', '\n'])
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if !value.is_empty() {
                preferences.push((key.to_string(), value));
            }
        }
    }
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::create_session_store;

    fn outcome(query: &str, route: Route, task_type: Option<TaskType>) -> TurnOutcome {
        TurnOutcome {
            query: query.to_string(),
            final_response: "a response".to_string(),
            route_taken: route,
            task_type,
            degraded: false,
        }
    }

    fn manager(store: Arc<dyn SessionStore>) -> MemoryManager {
        MemoryManager::new(store, &WorkflowConfig::default())
    }

    #[test]
    fn topic_is_collapsed_and_capped() {
        assert_eq!(
            extract_topic("  research   ai\nagents  ").as_deref(),
            Some("research ai agents")
        );
        assert_eq!(extract_topic("   "), None);
        let long = "x".repeat(200);
        assert_eq!(extract_topic(&long).unwrap().chars().count(), 80);
    }

    #[test]
    fn insight_only_for_collaboration_routes() {
        assert!(extract_insight(&outcome("q", Route::ToolExec, None)).is_none());
        assert!(extract_insight(&outcome("q", Route::Respond, None)).is_none());
        assert_eq!(
            extract_insight(&outcome("q", Route::Collaborate, Some(TaskType::Research))).as_deref(),
            Some("Researched: q")
        );
        assert_eq!(
            extract_insight(&outcome("q", Route::Analyze, Some(TaskType::Analysis))).as_deref(),
            Some("Analyzed: q")
        );
    }

    #[test]
    fn preferences_are_mined_from_phrases() {
        let prefs = extract_preferences("My name is Ada. I prefer short answers");
        assert!(prefs.contains(&("name".to_string(), "Ada".to_string())));
        assert!(prefs.contains(&("likes".to_string(), "short answers".to_string())));
        assert!(extract_preferences("nothing personal here").is_empty());
    }

    #[tokio::test]
    async fn commit_lands_history_topic_and_insight_together() {
        let store = create_session_store();
        store.create_with_id("s1", None).await.unwrap();
        let manager = manager(store.clone());
        manager
            .commit_turn(
                "s1",
                &outcome(
                    "investigate ai agents",
                    Route::Collaborate,
                    Some(TaskType::Research),
                ),
            )
            .await;
        let context = store.get_context("s1").await.unwrap();
        assert_eq!(context.history.len(), 1);
        assert_eq!(context.history[0].route, "collaborate");
        assert_eq!(context.recent_topics, vec!["investigate ai agents"]);
        assert_eq!(context.insights, vec!["Researched: investigate ai agents"]);
    }

    #[tokio::test]
    async fn commit_to_missing_session_is_swallowed() {
        let store = create_session_store();
        let manager = manager(store.clone());
        // no session created; the commit must not panic or create one
        manager
            .commit_turn("ghost", &outcome("hello", Route::Respond, None))
            .await;
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn repeated_topics_stay_deduplicated() {
        let store = create_session_store();
        store.create_with_id("s1", None).await.unwrap();
        let manager = manager(store.clone());
        for _ in 0..3 {
            manager
                .commit_turn("s1", &outcome("investigate ai agents", Route::Collaborate, None))
                .await;
        }
        let context = store.get_context("s1").await.unwrap();
        assert_eq!(context.recent_topics.len(), 1);
        assert_eq!(context.history.len(), 3);
    }
}
