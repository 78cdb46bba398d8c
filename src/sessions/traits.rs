//! Session storage traits and types for per-session conversation state.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OrchestratorError;

/// One completed query/response exchange recorded in session history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryTurn {
    /// Strictly increasing per session, preserved across pruning.
    pub index: u64,
    pub query: String,
    pub response: String,
    pub route: String,
    pub timestamp: DateTime<Utc>,
}

/// Durable per-session memory. Owned by the session store; the executor works
/// on a cloned snapshot and commits through one `update_context` mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationContext {
    pub session_id: String,
    pub user_id: Option<String>,
    pub preferences: HashMap<String, String>,
    pub history: Vec<HistoryTurn>,
    /// Bounded FIFO set: no duplicates, oldest evicted at capacity.
    pub recent_topics: Vec<String>,
    /// Bounded FIFO list, oldest evicted at capacity.
    pub insights: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(session_id: &str, user_id: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.to_string(),
            user_id: user_id.map(ToString::to_string),
            preferences: HashMap::new(),
            history: Vec::new(),
            recent_topics: Vec::new(),
            insights: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a topic, keeping at most `cap` entries. A re-mentioned topic
    /// moves to the newest position instead of duplicating.
    pub fn record_topic(&mut self, topic: &str, cap: usize) {
        let topic = topic.trim();
        if topic.is_empty() || cap == 0 {
            return;
        }
        self.recent_topics.retain(|t| t != topic);
        self.recent_topics.push(topic.to_string());
        while self.recent_topics.len() > cap {
            self.recent_topics.remove(0);
        }
    }

    /// Record an insight, evicting the oldest past `cap`.
    pub fn record_insight(&mut self, insight: &str, cap: usize) {
        let insight = insight.trim();
        if insight.is_empty() || cap == 0 {
            return;
        }
        self.insights.push(insight.to_string());
        while self.insights.len() > cap {
            self.insights.remove(0);
        }
    }

    /// Append a history turn with the next strictly-increasing index, pruning
    /// the oldest entries past `cap`. Indices survive pruning.
    pub fn push_history(
        &mut self,
        query: &str,
        response: &str,
        route: &str,
        cap: usize,
    ) {
        let index = self.history.last().map_or(0, |t| t.index + 1);
        self.history.push(HistoryTurn {
            index,
            query: query.to_string(),
            response: response.to_string(),
            route: route.to_string(),
            timestamp: Utc::now(),
        });
        if cap > 0 {
            while self.history.len() > cap {
                self.history.remove(0);
            }
        }
    }
}

/// A mutation applied atomically under the per-session writer lock.
pub type ContextMutation = Box<dyn FnOnce(&mut ConversationContext) + Send>;

/// Exclusive owner of [`ConversationContext`] documents.
///
/// Mutations for one session are queued, never interleaved; `turn_lock`
/// hands out the FIFO-fair lock that serializes whole turns in arrival order.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session with a generated id. Returns the new session id.
    async fn create_session(
        &self,
        user_id: Option<&str>,
    ) -> Result<String, OrchestratorError>;

    /// Create a session with an explicit id. Fails with `DuplicateSession`
    /// on collision.
    async fn create_with_id(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<(), OrchestratorError>;

    /// Snapshot of an existing session's context.
    async fn get_context(
        &self,
        session_id: &str,
    ) -> Result<ConversationContext, OrchestratorError>;

    /// Snapshot of the session's context, creating the session if unknown.
    async fn get_or_create(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<ConversationContext, OrchestratorError>;

    /// Apply one mutation atomically and return the updated context.
    async fn update_context(
        &self,
        session_id: &str,
        mutation: ContextMutation,
    ) -> Result<ConversationContext, OrchestratorError>;

    /// Lossless document export of a session.
    async fn export_session(
        &self,
        session_id: &str,
    ) -> Result<serde_json::Value, OrchestratorError>;

    /// Import a previously exported document. Fails with `DuplicateSession`
    /// if the embedded id already exists.
    async fn import_session(
        &self,
        document: serde_json::Value,
    ) -> Result<String, OrchestratorError>;

    /// Remove sessions idle longer than `max_age`. Sessions with an in-flight
    /// turn are never evicted. Returns the number removed.
    async fn cleanup(&self, max_age: Duration) -> Result<usize, OrchestratorError>;

    /// Per-session turn serialization handle (FIFO-fair).
    async fn turn_lock(
        &self,
        session_id: &str,
    ) -> Result<Arc<tokio::sync::Mutex<()>>, OrchestratorError>;

    /// Number of live sessions.
    async fn count(&self) -> usize;

    /// The name of this session store implementation.
    fn name(&self) -> &str;
}
