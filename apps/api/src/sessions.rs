//! Session plumbing shared by the guided and customization flows.
//!
//! Every session owns an `InFlight` flag: at most one model call may be
//! outstanding per session, and a second attempt is rejected, never queued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A request is already in progress for this session")]
    Busy,

    #[error("Choose a situation before sending messages")]
    NotStarted,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("At least {required} conversation turns are needed to generate a resume (have {actual})")]
    TranscriptTooShort { required: usize, actual: usize },

    #[error("{0}")]
    Validation(String),
}

/// Per-session "request in flight" flag.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    /// Claims the flag, or fails with `SessionError::Busy` if it is already held.
    pub fn acquire(&self) -> Result<RequestGuard<'_>, SessionError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(RequestGuard(&self.0))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the in-flight flag on drop, including when the request future is cancelled.
#[must_use = "the in-flight flag is released as soon as the guard is dropped"]
pub struct RequestGuard<'a>(&'a AtomicBool);

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-memory map of live sessions. Nothing here outlives the process.
pub struct SessionRegistry<S> {
    sessions: RwLock<HashMap<Uuid, Arc<S>>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl<S> SessionRegistry<S> {
    pub async fn insert(&self, id: Uuid, session: Arc<S>) {
        self.sessions.write().await.insert(id, session);
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<S>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_rejects_second_acquire() {
        let flag = InFlight::default();
        let guard = flag.acquire().unwrap();
        assert!(flag.is_set());
        assert_eq!(flag.acquire().err(), Some(SessionError::Busy));
        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.acquire().is_ok());
    }

    #[tokio::test]
    async fn test_registry_insert_get_remove() {
        let registry: SessionRegistry<String> = SessionRegistry::default();
        let id = Uuid::new_v4();
        registry.insert(id, Arc::new("s".to_string())).await;
        assert_eq!(registry.get(id).await.as_deref(), Some(&"s".to_string()));
        assert_eq!(registry.len().await, 1);
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
    }
}
