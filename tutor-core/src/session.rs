//! Session state and the process-wide session store.
//!
//! The store map is guarded by one `RwLock`; each session sits behind its own
//! `Mutex`, so a slow turn only blocks later turns of the same session.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::model::{Step, StepSequence};

/// Result of moving the cursor forward by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Step to deliver on this turn.
    Step(Step),
    /// All steps delivered; the summary is due.
    Exhausted,
}

/// One in-progress conversation. `0 <= cursor <= steps.len()`.
#[derive(Debug)]
pub struct Session {
    id: String,
    steps: StepSequence,
    cursor: usize,
}

impl Session {
    /// New session with a random v4 id and `cursor = 0`.
    pub fn new(steps: StepSequence) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            steps,
            cursor: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Hints of the most recently delivered step.
    pub fn previous_hints(&self) -> Option<&[String]> {
        let last = self.cursor.checked_sub(1)?;
        self.steps.get(last).map(|s| s.hints.as_slice())
    }

    /// Whether the next [`Session::advance`] reaches the end of the sequence.
    pub fn next_exhausts(&self) -> bool {
        self.cursor + 1 >= self.steps.len()
    }

    /// Increments the cursor (saturating at the sequence length).
    pub fn advance(&mut self) -> Advance {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
        match self.cursor.checked_sub(1).and_then(|i| self.steps.get(i)) {
            Some(step) if self.cursor < self.steps.len() => Advance::Step(step.clone()),
            _ => Advance::Exhausted,
        }
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    handle: SessionHandle,
    /// Microseconds since the store epoch of the last `create`/`get` hit.
    last_seen: AtomicU64,
}

/// Process-wide mapping from session id to session.
///
/// With an idle TTL, a session not looked up for `ttl` is dropped: lazily on
/// `get`, and in a sweep on every `create`.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Option<Duration>,
    epoch: Instant,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: None,
            epoch: Instant::now(),
        }
    }
}

impl SessionStore {
    /// Store without expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose sessions expire after `ttl` without a lookup.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn is_expired(&self, entry: &Entry, now: u64) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        let idle = now.saturating_sub(entry.last_seen.load(Ordering::Relaxed));
        Duration::from_micros(idle) >= ttl
    }

    /// Handle for `id`, `None` if unknown or expired.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let now = self.now();
        {
            let sessions = self.sessions.read().await;
            let entry = sessions.get(id)?;
            if !self.is_expired(entry, now) {
                entry.last_seen.store(now, Ordering::Relaxed);
                return Some(entry.handle.clone());
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(id).is_some_and(|e| self.is_expired(e, now)) {
            sessions.remove(id);
            debug!(session_id = %id, "session expired");
        }
        None
    }

    /// Stores `session` and returns its id.
    pub async fn create(&self, session: Session) -> String {
        let id = session.id().to_string();
        let now = self.now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, e| !self.is_expired(e, now));
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "expired sessions swept");
        }

        sessions.insert(
            id.clone(),
            Entry {
                handle: Arc::new(Mutex::new(session)),
                last_seen: AtomicU64::new(now),
            },
        );
        debug!(session_id = %id, "session created");
        id
    }

    /// Advances a session the caller has already locked.
    pub fn advance(&self, session: &mut Session) -> Advance {
        let step = session.advance();
        debug!(session_id = %session.id(), cursor = session.cursor(), "session advanced");
        step
    }

    /// Removes `id`. Returns whether it was present.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            debug!(session_id = %id, "session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
