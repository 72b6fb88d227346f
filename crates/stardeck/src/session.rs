//! In-memory session registry.
//!
//! Process-wide keyed state with an explicit lifecycle: a session is created
//! at login, looked up per request, and removed at logout or expiry. The
//! registry is injected as a capability wherever a token lookup is needed;
//! it is never global state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Default session lifetime (24 hours, matching the session cookie).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// One authenticated user's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential attached to every outbound remote call.
    pub access_token: String,
    pub login: String,
    pub avatar_url: String,
}

struct Entry {
    session: Session,
    expires_at: Instant,
}

/// TTL-expiring map from session ID to [`Session`].
pub struct SessionRegistry {
    ttl: Duration,
    inner: RwLock<HashMap<String, Entry>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store a session and return its generated ID.
    pub async fn insert(&self, session: Session) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let entry = Entry {
            session,
            expires_at: Instant::now() + self.ttl,
        };
        self.inner.write().await.insert(id.clone(), entry);
        id
    }

    /// Look up a session, treating an expired entry as absent.
    pub async fn get(&self, id: &str) -> Option<Session> {
        {
            let guard = self.inner.read().await;
            match guard.get(id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.session.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: upgrade to a write lock and drop the entry.
        self.inner.write().await.remove(id);
        None
    }

    /// Remove a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Number of live (possibly expired but unswept) sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
