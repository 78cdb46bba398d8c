//! Orchestrator facade: the single entry point a host embeds.
//!
//! Owns the session store, tool registry, collaboration coordinator, and
//! graph executor, and serializes turns per session through the store's
//! FIFO-fair turn lock. Concurrent submissions against one session run in
//! arrival order; different sessions never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::collab::Coordinator;
use crate::config::Config;
use crate::error::OrchestratorError;
use crate::memory::MemoryManager;
use crate::providers::{create_completion_client, CompletionClient};
use crate::sessions::{create_session_store, SessionStore};
use crate::tools::default_tools;
use crate::workflow::GraphExecutor;

/// Caller-facing result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub response_text: String,
    pub session_id: String,
    pub route_taken: String,
    pub degraded: bool,
}

/// What a session remembers, for host-side display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInsights {
    pub topics: Vec<String>,
    pub insights: Vec<String>,
    pub preferences: HashMap<String, String>,
}

pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    executor: GraphExecutor,
    memory: MemoryManager,
}

impl Orchestrator {
    /// Build a production orchestrator from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = create_completion_client(&config.provider)?;
        Ok(Self::with_components(config, client, create_session_store()))
    }

    /// Build with an explicit backend and store. This is the seam tests and
    /// embedding hosts use to swap components.
    pub fn with_components(
        config: Config,
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let tools = Arc::new(default_tools(client.clone()));
        let coordinator = Arc::new(Coordinator::new(client.clone(), config.collab.clone()));
        let executor = GraphExecutor::new(client, tools, coordinator, &config);
        let memory = MemoryManager::new(store.clone(), &config.workflow);
        Self {
            store,
            executor,
            memory,
        }
    }

    /// Run one turn to completion. The session is created lazily on first
    /// use; the turn holds the session's turn lock from routing through the
    /// memory commit.
    pub async fn submit_turn(
        &self,
        session_id: &str,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<TurnResponse, OrchestratorError> {
        if session_id.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "session id must not be blank".into(),
            ));
        }
        if query.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "query must not be blank".into(),
            ));
        }

        self.store.get_or_create(session_id, user_id).await?;
        let lock = self.store.turn_lock(session_id).await?;
        let _turn = lock.lock().await;

        // re-read under the lock so this turn sees the previous turn's commit
        let context = self.store.get_context(session_id).await?;
        tracing::info!(session_id, "turn started");
        let outcome = self.executor.run_turn(query, &context).await;
        self.memory.commit_turn(session_id, &outcome).await;

        Ok(TurnResponse {
            response_text: outcome.final_response,
            session_id: session_id.to_string(),
            route_taken: outcome.route_taken.as_str().to_string(),
            degraded: outcome.degraded,
        })
    }

    /// Create a session up front and return its generated id.
    pub async fn create_session(
        &self,
        user_id: Option<&str>,
    ) -> Result<String, OrchestratorError> {
        self.store.create_session(user_id).await
    }

    /// Accumulated memory for a session.
    pub async fn get_insights(
        &self,
        session_id: &str,
    ) -> Result<SessionInsights, OrchestratorError> {
        let context = self.store.get_context(session_id).await?;
        Ok(SessionInsights {
            topics: context.recent_topics,
            insights: context.insights,
            preferences: context.preferences,
        })
    }

    /// Lossless export of a session document.
    pub async fn export_session(
        &self,
        session_id: &str,
    ) -> Result<serde_json::Value, OrchestratorError> {
        self.store.export_session(session_id).await
    }

    /// Import a previously exported session document. Returns the id.
    pub async fn import_session(
        &self,
        document: serde_json::Value,
    ) -> Result<String, OrchestratorError> {
        self.store.import_session(document).await
    }

    /// Evict sessions idle longer than `max_age`. In-flight sessions stay.
    pub async fn cleanup_sessions(&self, max_age: Duration) -> Result<usize, OrchestratorError> {
        self.store.cleanup(max_age).await
    }

    pub async fn session_count(&self) -> usize {
        self.store.count().await
    }
}
