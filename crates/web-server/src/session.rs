use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use core_types::User;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// The signed-in user as handlers see it. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug)]
struct Session {
    user: SessionUser,
    expires_at: Instant,
}

/// In-process session tokens. A token is an opaque random UUID.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Starts a session for `user` and returns its token.
    pub fn create(&self, user: &User) -> Uuid {
        let token = Uuid::new_v4();
        let session = Session {
            user: SessionUser::from(user),
            expires_at: Instant::now() + self.ttl,
        };
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.expires_at > Instant::now());
        sessions.insert(token, session);
        token
    }

    /// The user behind `token`, if the session exists and has not expired.
    pub fn get(&self, token: &Uuid) -> Option<SessionUser> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(token)
            .filter(|s| s.expires_at > Instant::now())
            .map(|s| s.user.clone())
    }

    /// Ends a session. Returns whether it existed.
    pub fn revoke(&self, token: &Uuid) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(token).is_some()
    }
}

/// Reads `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// Middleware guarding the dashboard routes.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = bearer_token(request.headers())
        .and_then(|token| state.sessions.get(&token))
        .ok_or_else(|| AppError::Unauthorized("Sign in to continue.".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
