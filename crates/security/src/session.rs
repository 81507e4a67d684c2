//! Bearer sessions.
//!
//! Tokens are random UUIDs held in process memory. Each maps to the
//! username and role it was issued for and expires after a fixed TTL.
//! The registry is capped; issuing past the cap evicts the oldest session.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Who a bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: String,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    /// Issue a new token for `username`.
    pub async fn issue(&self, username: &str, role: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        let session = Session {
            username: username.to_string(),
            role: role.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.issued_at)
                .map(|(t, _)| t.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                debug!("Session cap reached, evicted oldest token");
            }
        }

        sessions.insert(token.clone(), session);
        token
    }

    /// Look up a token. Expired sessions are dropped and report `None`.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(s) if s.expires_at > Instant::now() => return Some(s.clone()),
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(token);
        None
    }

    /// End a session. Returns `false` if the token was unknown.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// End every session held by `username` (after account deletion or rename).
    pub async fn revoke_user(&self, username: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.username != username);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
