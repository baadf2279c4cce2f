//! Session identity for the storefront.
//!
//! Sessions are explicit handles resolved through an injected
//! [`SessionRegistry`], never ambient state. Token issuance and storage
//! live elsewhere; a session is just an opaque id plus whoever signed in
//! on it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StorefrontError;

const DEFAULT_SIGN_IN_PATH: &str = "/signin";

/// Opaque session identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionId(Uuid);

impl SessionId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One browser session, anonymous until a customer signs in on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub customer_id: Option<Uuid>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.customer_id.is_some()
    }
}

/// In-memory registry of live sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Session>,
    sign_in_path: String,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_sign_in_path(DEFAULT_SIGN_IN_PATH)
    }

    pub fn with_sign_in_path(path: impl Into<String>) -> Self {
        Self {
            sessions: DashMap::new(),
            sign_in_path: path.into(),
        }
    }

    /// Starts a new anonymous session.
    pub fn start_session(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Session {
                id,
                customer_id: None,
                email: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Attaches a signed-in customer to an existing session. Unknown session
    /// ids are treated as freshly started sessions.
    pub fn sign_in(&self, id: SessionId, customer_id: Uuid, email: impl Into<String>) {
        let email = email.into();
        self.sessions
            .entry(id)
            .and_modify(|s| {
                s.customer_id = Some(customer_id);
                s.email = Some(email.clone());
            })
            .or_insert_with(|| Session {
                id,
                customer_id: Some(customer_id),
                email: Some(email),
                created_at: Utc::now(),
            });
    }

    /// Drops the customer identity, keeping the session itself.
    pub fn sign_out(&self, id: SessionId) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.customer_id = None;
            session.email = None;
        }
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.get(&id).map(|s| s.value().clone())
    }

    /// Resolves a session that is signed in, or returns the redirect error
    /// the UI uses to bounce the user to the sign-in page.
    pub fn require_authenticated(&self, id: SessionId) -> Result<Session, StorefrontError> {
        match self.get(id) {
            Some(session) if session.is_authenticated() => Ok(session),
            _ => Err(StorefrontError::Unauthenticated {
                redirect_to: self.sign_in_path.clone(),
            }),
        }
    }
}
