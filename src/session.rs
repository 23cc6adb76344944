//! Session lifecycle management.
//!
//! The controller owns every session transition: login, logout, startup
//! restore, and the cross-cutting reaction to an expired credential. All
//! call sites that can observe [`ApiError::AuthExpired`] funnel into
//! [`SessionController::handle_auth_expired`] rather than handling it ad hoc,
//! so "please sign in" notices and navigation happen in exactly one place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::CredentialStore;

/// Role assigned by the backend to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reviewer,
    /// Ordinary user; also the fallback for role strings this client
    /// does not recognize.
    #[serde(other)]
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Profile returned by the backend on login or token validation.
///
/// The two backends disagree on which profile fields exist beyond the
/// basics, so everything unrecognized is retained in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An established session: a bearer token plus the profile it belongs to.
///
/// A session exists only when both halves are present; guests have no
/// session at all, which keeps the token/user/role invariant structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }
}

/// Current authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Guest,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Host-application callbacks for session events.
///
/// The core never navigates or renders; the hosting app subscribes here
/// to show the sign-in notice and route to its login entry point.
pub trait SessionHooks: Send + Sync {
    /// The current credential was rejected by the backend. The store and
    /// in-memory session have already been cleared when this fires.
    fn auth_expired(&self);

    /// A session was established (login or bridge handoff).
    fn session_established(&self, _session: &Session) {}
}

/// No-op hooks for hosts that poll state instead of subscribing.
pub struct NoopHooks;

impl SessionHooks for NoopHooks {
    fn auth_expired(&self) {}
}

/// Owns the session cell and every transition on it.
pub struct SessionController {
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    hooks: Arc<dyn SessionHooks>,
}

impl SessionController {
    pub fn new(store: Arc<dyn CredentialStore>, hooks: Arc<dyn SessionHooks>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::Guest),
            hooks,
        }
    }

    /// Restore a persisted session at process start.
    ///
    /// Trust-on-read: the stored token is not re-validated against the
    /// backend here. If it has since expired server-side, the first real
    /// call returns AuthExpired and demotes the state.
    pub async fn init(&self) -> Result<()> {
        match self.store.get()? {
            Some(session) => {
                info!(role = ?session.role(), "Restored persisted session");
                *self.state.write().await = SessionState::Authenticated(session);
            }
            None => {
                debug!("No persisted session, starting as guest");
            }
        }
        Ok(())
    }

    /// Enter the authenticated state and persist the session.
    pub async fn login(&self, session: Session) -> Result<()> {
        self.store.put(&session)?;
        info!(role = ?session.role(), "Session established");
        self.hooks.session_established(&session);
        *self.state.write().await = SessionState::Authenticated(session);
        Ok(())
    }

    /// Explicit logout: clear durable storage and reset to guest.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear()?;
        *self.state.write().await = SessionState::Guest;
        info!("Logged out");
        Ok(())
    }

    /// Central reaction to an expired credential.
    ///
    /// Clears storage and state, then notifies the host so it can show a
    /// sign-in notice and navigate to its login entry point. Storage
    /// failures here are logged rather than propagated: the in-memory
    /// demotion must happen regardless.
    pub async fn handle_auth_expired(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear credential store on auth expiry: {}", e);
        }
        let mut state = self.state.write().await;
        if state.is_authenticated() {
            *state = SessionState::Guest;
            drop(state);
            warn!("Session expired, demoted to guest");
            self.hooks.auth_expired();
        }
    }

    /// Current state snapshot.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Current session, if authenticated.
    pub async fn session(&self) -> Option<Session> {
        match &*self.state.read().await {
            SessionState::Authenticated(s) => Some(s.clone()),
            SessionState::Guest => None,
        }
    }

    /// Current role, if authenticated.
    pub async fn role(&self) -> Option<Role> {
        self.session().await.map(|s| s.role())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }
}
