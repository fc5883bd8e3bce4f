//! Session registry.
//!
//! One `LedgerEngine` per session token, so concurrent users of the HTTP
//! shell never share state. Lifecycle per token:
//!
//! `Unauthenticated → Unlocked → Locked`, and logout discards the engine.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::engine::{LedgerEngine, ScoringPolicy};
use crate::types::LedgerError;

/// Where a session token sits in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Unauthenticated,
    Unlocked,
    Locked,
}

pub struct SessionRegistry {
    authenticator: Arc<dyn Authenticator>,
    policy: ScoringPolicy,
    sessions: HashMap<Uuid, LedgerEngine>,
}

impl SessionRegistry {
    pub fn new(authenticator: Arc<dyn Authenticator>, policy: ScoringPolicy) -> Self {
        Self {
            authenticator,
            policy,
            sessions: HashMap::new(),
        }
    }

    /// Verify the credential and open a fresh session.
    pub fn login(&mut self, credential: &str, institution_name: &str) -> Result<Uuid, LedgerError> {
        if !self.authenticator.verify(credential) {
            warn!(institution = institution_name, "Login rejected: invalid license key");
            return Err(LedgerError::InvalidCredential);
        }
        let token = Uuid::new_v4();
        self.sessions
            .insert(token, LedgerEngine::new(institution_name, self.policy.clone()));
        info!(%token, institution = institution_name, "Session opened");
        Ok(token)
    }

    /// Drop the session and all its state. Returns false for unknown tokens.
    pub fn logout(&mut self, token: &Uuid) -> bool {
        let removed = self.sessions.remove(token).is_some();
        if removed {
            info!(%token, "Session closed");
        }
        removed
    }

    pub fn phase(&self, token: &Uuid) -> SessionPhase {
        match self.sessions.get(token) {
            None => SessionPhase::Unauthenticated,
            Some(e) if e.is_locked() => SessionPhase::Locked,
            Some(_) => SessionPhase::Unlocked,
        }
    }

    pub fn get(&self, token: &Uuid) -> Result<&LedgerEngine, LedgerError> {
        self.sessions.get(token).ok_or(LedgerError::Unauthenticated)
    }

    pub fn get_mut(&mut self, token: &Uuid) -> Result<&mut LedgerEngine, LedgerError> {
        self.sessions.get_mut(token).ok_or(LedgerError::Unauthenticated)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
