//! In-memory session store implementation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::traits::{ContextMutation, ConversationContext, SessionStore};
use crate::error::OrchestratorError;

/// Storage cell for one session: the context document plus the turn lock
/// that serializes whole turns for this session in arrival order.
struct SessionSlot {
    context: Mutex<ConversationContext>,
    turn_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SessionSlot {
    fn new(context: ConversationContext) -> Arc<Self> {
        Arc::new(Self {
            context: Mutex::new(context),
            turn_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }
}

/// An in-memory session store backed by a mutex-protected hash map.
pub struct InMemorySessionStore {
    slots: Mutex<HashMap<String, Arc<SessionSlot>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, session_id: &str) -> Result<Arc<SessionSlot>, OrchestratorError> {
        self.slots
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))
    }

    fn insert_slot(
        &self,
        context: ConversationContext,
    ) -> Result<(), OrchestratorError> {
        let mut slots = self.slots.lock();
        if slots.contains_key(&context.session_id) {
            return Err(OrchestratorError::DuplicateSession(context.session_id));
        }
        slots.insert(context.session_id.clone(), SessionSlot::new(context));
        Ok(())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        user_id: Option<&str>,
    ) -> Result<String, OrchestratorError> {
        let session_id = Uuid::new_v4().to_string();
        self.insert_slot(ConversationContext::new(&session_id, user_id))?;
        tracing::debug!(session_id = %session_id, "session created");
        Ok(session_id)
    }

    async fn create_with_id(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<(), OrchestratorError> {
        self.insert_slot(ConversationContext::new(session_id, user_id))
    }

    async fn get_context(
        &self,
        session_id: &str,
    ) -> Result<ConversationContext, OrchestratorError> {
        let slot = self.slot(session_id)?;
        let context = slot.context.lock().clone();
        Ok(context)
    }

    async fn get_or_create(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<ConversationContext, OrchestratorError> {
        {
            let mut slots = self.slots.lock();
            if !slots.contains_key(session_id) {
                let context = ConversationContext::new(session_id, user_id);
                slots.insert(session_id.to_string(), SessionSlot::new(context));
            }
        }
        self.get_context(session_id).await
    }

    async fn update_context(
        &self,
        session_id: &str,
        mutation: ContextMutation,
    ) -> Result<ConversationContext, OrchestratorError> {
        let slot = self.slot(session_id)?;
        let mut context = slot.context.lock();
        mutation(&mut context);
        context.updated_at = Utc::now();
        Ok(context.clone())
    }

    async fn export_session(
        &self,
        session_id: &str,
    ) -> Result<serde_json::Value, OrchestratorError> {
        let context = self.get_context(session_id).await?;
        serde_json::to_value(&context)
            .map_err(|e| OrchestratorError::InvalidRequest(format!("export failed: {e}")))
    }

    async fn import_session(
        &self,
        document: serde_json::Value,
    ) -> Result<String, OrchestratorError> {
        let context: ConversationContext = serde_json::from_value(document)
            .map_err(|e| OrchestratorError::InvalidRequest(format!("malformed document: {e}")))?;
        if context.session_id.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "document has empty session_id".to_string(),
            ));
        }
        let session_id = context.session_id.clone();
        self.insert_slot(context)?;
        Ok(session_id)
    }

    async fn cleanup(&self, max_age: Duration) -> Result<usize, OrchestratorError> {
        let cutoff = Utc::now() - max_age;
        let mut removed = 0usize;
        let mut slots = self.slots.lock();
        slots.retain(|session_id, slot| {
            // A held turn lock means an in-flight turn; never evict those.
            let Ok(_guard) = slot.turn_lock.try_lock() else {
                return true;
            };
            let idle = slot.context.lock().updated_at < cutoff;
            if idle {
                tracing::debug!(session_id = %session_id, "session evicted by cleanup");
                removed += 1;
            }
            !idle
        });
        Ok(removed)
    }

    async fn turn_lock(
        &self,
        session_id: &str,
    ) -> Result<Arc<tokio::sync::Mutex<()>>, OrchestratorError> {
        Ok(self.slot(session_id)?.turn_lock.clone())
    }

    async fn count(&self) -> usize {
        self.slots.lock().len()
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}
