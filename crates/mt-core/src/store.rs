//! Session store contract and an in-memory implementation.

use thiserror::Error;

use crate::session::Session;
use crate::types::SessionId;

/// Durable collection of sessions.
///
/// The store owns persistence only. Callers mutate a [`Session`] through its
/// own methods and then hand it back with [`SessionStore::update`].
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn insert(&mut self, session: &Session) -> Result<(), Self::Error>;

    /// Persists the current state of an existing session.
    fn update(&mut self, session: &Session) -> Result<(), Self::Error>;

    /// All sessions in insertion order.
    fn sessions(&self) -> Result<Vec<Session>, Self::Error>;

    fn get(&self, id: &SessionId) -> Result<Option<Session>, Self::Error> {
        Ok(self.sessions()?.into_iter().find(|s| s.id() == id))
    }

    /// Running sessions in insertion order.
    fn active_sessions(&self) -> Result<Vec<Session>, Self::Error> {
        Ok(self
            .sessions()?
            .into_iter()
            .filter(Session::is_active)
            .collect())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("session {0} already exists")]
    Duplicate(SessionId),
    #[error("session {0} not found")]
    NotFound(SessionId),
}

/// A store backed by a `Vec`, for tests and ephemeral use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Vec<Session>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemoryStore {
    type Error = MemoryStoreError;

    fn insert(&mut self, session: &Session) -> Result<(), Self::Error> {
        if self.sessions.iter().any(|s| s.id() == session.id()) {
            return Err(MemoryStoreError::Duplicate(session.id().clone()));
        }
        self.sessions.push(session.clone());
        Ok(())
    }

    fn update(&mut self, session: &Session) -> Result<(), Self::Error> {
        let slot = self
            .sessions
            .iter_mut()
            .find(|s| s.id() == session.id())
            .ok_or_else(|| MemoryStoreError::NotFound(session.id().clone()))?;
        *slot = session.clone();
        Ok(())
    }

    fn sessions(&self) -> Result<Vec<Session>, Self::Error> {
        Ok(self.sessions.clone())
    }
}
