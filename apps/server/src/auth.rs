use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::main_lib::AppState;

pub const DEMO_USERNAME: &str = "nexus_admin";
pub const DEMO_PASSWORD: &str = "nexus2024";
pub const SESSION_COOKIE: &str = "nexus_session";

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    InvalidCredentials,
    Internal(String),
}

#[derive(Serialize)]
struct UnauthorizedBody {
    message: &'static str,
}

#[derive(Serialize)]
struct AuthFailureBody {
    success: bool,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(UnauthorizedBody {
                    message: "Unauthorized",
                }),
            )
                .into_response(),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(AuthFailureBody {
                    success: false,
                    message: "Invalid credentials".to_string(),
                }),
            )
                .into_response(),
            AuthError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthFailureBody {
                    success: false,
                    message: msg,
                }),
            )
                .into_response(),
        }
    }
}

/// The user attached to an authenticated session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub login_time: DateTime<Utc>,
}

/// Source of identities. Swap the implementation to use a real identity
/// provider; sessions and cookies stay the same.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// The user for a matching credential pair, `None` otherwise.
    async fn verify(&self, username: &str, password: &str) -> Option<SessionUser>;
}

/// One fixed account.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn demo() -> Self {
        Self::new(DEMO_USERNAME, DEMO_PASSWORD)
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Option<SessionUser> {
        if username != self.username || password != self.password {
            return None;
        }
        Some(SessionUser {
            id: "1".to_string(),
            username: self.username.clone(),
            email: "admin@nexus.local".to_string(),
            first_name: "Nexus".to_string(),
            last_name: "Admin".to_string(),
            login_time: Utc::now(),
        })
    }
}

struct Session {
    user: SessionUser,
    expires_at: Instant,
}

/// Server-side sessions keyed by the id stored in the session cookie.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            warn!("Session store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user` and return its id.
    pub fn create(&self, user: SessionUser) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            user,
            expires_at: Instant::now() + self.ttl,
        };
        self.lock_sessions().insert(id.clone(), session);
        id
    }

    /// The user of a live session. Expired sessions are dropped.
    pub fn get(&self, id: &str) -> Option<SessionUser> {
        let mut sessions = self.lock_sessions();
        let session = sessions.get(id)?;
        if Instant::now() >= session.expires_at {
            sessions.remove(id);
            return None;
        }
        Some(session.user.clone())
    }

    /// End a session. Returns whether it existed; fails on a poisoned lock.
    pub fn remove(&self, id: &str) -> Result<bool, AuthError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AuthError::Internal("Could not log out".to_string()))?;
        Ok(sessions.remove(id).is_some())
    }

    /// Drop every expired session, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|_, session| now < session.expires_at);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_sessions().is_empty()
    }
}

pub fn session_cookie(id: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Duration::ZERO, secure)
}

/// Session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[derive(Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AuthError> {
    // A malformed body is just another credential mismatch.
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let Some(user) = state.credentials.verify(&username, &password).await else {
        info!("Rejected login attempt for '{}'", username);
        return Err(AuthError::InvalidCredentials);
    };

    let session_id = state.sessions.create(user.clone());
    let cookie = session_cookie(&session_id, state.sessions.ttl(), state.secure_cookies);
    info!("User '{}' logged in", user.username);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            user,
        }),
    )
        .into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    if let Some(id) = session_id_from_headers(&headers) {
        if state.sessions.remove(&id)? {
            debug!("Session ended");
        }
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response())
}

pub async fn current_user(Extension(user): Extension<SessionUser>) -> Json<SessionUser> {
    Json(user)
}

pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let session_id = session_id_from_headers(request.headers()).ok_or(AuthError::Unauthorized)?;
    let user = state
        .sessions
        .get(&session_id)
        .ok_or(AuthError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
