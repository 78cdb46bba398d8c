//! Session storage abstraction.
//!
//! The store is the exclusive owner of [`ConversationContext`] documents;
//! everything else borrows snapshots and commits mutations through it.

pub mod in_memory;
pub mod traits;

pub use in_memory::InMemorySessionStore;
pub use traits::{ContextMutation, ConversationContext, HistoryTurn, SessionStore};

use std::sync::Arc;

/// Create the default session store.
pub fn create_session_store() -> Arc<dyn SessionStore> {
    Arc::new(InMemorySessionStore::new())
}
