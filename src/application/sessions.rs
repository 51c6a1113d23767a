use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::config::SessionConfig;

use super::{AppError, ExpenseService};

pub type SessionId = Uuid;

/// Keeps one independent [`ExpenseService`] per session.
///
/// Nothing is shared between sessions; mutation goes through `&mut`, so each
/// session has a single writer.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: HashMap<SessionId, ExpenseService>,
}

impl SessionRegistry {
    /// New sessions are created from `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Start a session with an empty ledger.
    pub fn open(&mut self) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions.insert(id, ExpenseService::new(&self.config));
        info!(session = %id, "session opened");
        id
    }

    pub fn get(&self, id: SessionId) -> Result<&ExpenseService, AppError> {
        self.sessions.get(&id).ok_or(AppError::SessionNotFound(id))
    }

    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut ExpenseService, AppError> {
        self.sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))
    }

    /// End a session, dropping its ledger.
    pub fn close(&mut self, id: SessionId) -> Result<ExpenseService, AppError> {
        let service = self
            .sessions
            .remove(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        info!(session = %id, records = service.records().len(), "session closed");
        Ok(service)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
