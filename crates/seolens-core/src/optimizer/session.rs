//! Registry of running optimization sessions

use super::stats::OptimizerStats;
use crate::error::SessionError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    /// Final analysis is running; the entry is about to be removed
    Completed,
    Error,
}

/// Snapshot of one session as seen through the registry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub cycles_performed: u32,
    pub current_score: Option<u8>,
}

#[derive(Debug)]
struct SessionEntry {
    status: SessionStatus,
    token: CancellationToken,
    /// Tells apart successive sessions registered under the same id
    generation: u64,
}

/// Shared by every loop that should be cancellable through the same handle
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
    next_generation: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session_id` and hand back the token the loop watches
    pub fn create(&self, session_id: &str) -> Result<CancellationToken, SessionError> {
        self.insert(session_id).map(|(token, _)| token)
    }

    /// Register `session_id` for the lifetime of the returned lease
    pub(super) fn lease<'a>(
        &'a self,
        session_id: &str,
        stats: &'a OptimizerStats,
    ) -> Result<SessionLease<'a>, SessionError> {
        let (token, generation) = self.insert(session_id)?;
        Ok(SessionLease {
            registry: self,
            stats,
            session_id: session_id.to_string(),
            generation,
            token,
            released: false,
        })
    }

    fn insert(&self, session_id: &str) -> Result<(CancellationToken, u64), SessionError> {
        match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyExists(session_id.to_string())),
            Entry::Vacant(slot) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let token = CancellationToken::new();
                slot.insert(SessionEntry {
                    status: SessionStatus {
                        session_id: session_id.to_string(),
                        state: SessionState::Active,
                        started_at: Utc::now(),
                        cycles_performed: 0,
                        current_score: None,
                    },
                    token: token.clone(),
                    generation,
                });
                debug!(session_id, generation, "session registered");
                Ok((token, generation))
            }
        }
    }

    pub fn get(&self, session_id: &str) -> Option<SessionStatus> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.status.clone())
    }

    /// Cancel and forget the session. Returns `false` for unknown ids.
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, entry)) => {
                entry.token.cancel();
                debug!(session_id, "session cancelled");
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, session_id: &str) -> Option<SessionStatus> {
        self.sessions
            .remove(session_id)
            .map(|(_, entry)| entry.status)
    }

    /// Remove the entry only if it is still the one registered as `generation`
    fn remove_generation(&self, session_id: &str, generation: u64) -> Option<SessionStatus> {
        self.sessions
            .remove_if(session_id, |_, entry| entry.generation == generation)
            .map(|(_, entry)| entry.status)
    }

    /// Mutate the stored status in place; `false` if the session is gone
    pub fn update<F>(&self, session_id: &str, update: F) -> bool
    where
        F: FnOnce(&mut SessionStatus),
    {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                update(&mut entry.status);
                true
            }
            None => false,
        }
    }

    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A session's registry entry, held by the running loop.
///
/// Dropping an unreleased lease (a panic unwinding through the loop, or a
/// caller dropping the session future) removes the entry and counts the
/// session as cancelled, so the id can be reused.
pub(super) struct SessionLease<'a> {
    registry: &'a SessionRegistry,
    stats: &'a OptimizerStats,
    session_id: String,
    generation: u64,
    token: CancellationToken,
    released: bool,
}

impl SessionLease<'_> {
    pub(super) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Remove the entry on a normal finish
    pub(super) fn release(mut self) {
        self.released = true;
        self.registry
            .remove_generation(&self.session_id, self.generation);
    }
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.registry
            .remove_generation(&self.session_id, self.generation);
        self.token.cancel();
        self.stats.record_cancelled();
        warn!(session_id = %self.session_id, "session abandoned before it finished");
    }
}
