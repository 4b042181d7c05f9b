//! Process-wide registry of per-connection sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use holdbook_auth::Session;
use holdbook_core::SessionId;

/// Sessions keyed by id, expiring after an idle period.
///
/// An expired session is indistinguishable from an unknown one; callers start
/// a fresh session (which is also how a locked gate is reset).
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Register a fresh `Unauthenticated(0)` session.
    ///
    /// Idle-expired sessions are dropped first, so abandoned sessions are
    /// reclaimed even if their ids are never presented again.
    pub fn create(&self, now: DateTime<Utc>) -> SessionId {
        let purged = self.purge_expired(now);
        if purged > 0 {
            debug!(purged, "expired sessions dropped");
        }
        let session = Session::new(SessionId::new(), now);
        let id = session.id();
        if let Ok(mut map) = self.sessions.write() {
            map.insert(id, session);
        }
        debug!(session_id = %id, "session created");
        id
    }

    /// Run `f` against a live session, refreshing its idle timer.
    ///
    /// Returns `None` (and drops the session) if it is unknown or idle-expired.
    pub fn with_session<R>(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut map = self.sessions.write().ok()?;
        let expired = match map.get(&id) {
            Some(session) => self.is_expired(session, now),
            None => return None,
        };
        if expired {
            map.remove(&id);
            debug!(session_id = %id, "session expired");
            return None;
        }
        let session = map.get_mut(&id)?;
        session.touch(now);
        Some(f(session))
    }

    /// Snapshot of a live session.
    pub fn get(&self, id: SessionId, now: DateTime<Utc>) -> Option<Session> {
        self.with_session(id, now, |session| session.clone())
    }

    /// Drop all idle-expired sessions; returns how many were dropped.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut map) = self.sessions.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, session| !self.is_expired(session, now));
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_seen() > self.idle_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use holdbook_auth::GateState;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_sessions_start_unauthenticated() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let id = registry.create(t0());
        let session = registry.get(id, t0()).unwrap();
        assert_eq!(session.state(), &GateState::Unauthenticated { attempts: 0 });
    }

    #[test]
    fn activity_keeps_a_session_alive() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let id = registry.create(t0());
        assert!(registry.get(id, t0() + Duration::minutes(20)).is_some());
        assert!(registry.get(id, t0() + Duration::minutes(45)).is_some());
    }

    #[test]
    fn idle_sessions_expire() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let id = registry.create(t0());
        assert!(registry.get(id, t0() + Duration::minutes(31)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn purge_drops_only_idle_sessions() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let stale = registry.create(t0());
        let fresh = registry.create(t0() + Duration::minutes(20));

        assert_eq!(registry.purge_expired(t0() + Duration::minutes(40)), 1);
        assert!(registry.get(stale, t0() + Duration::minutes(40)).is_none());
        assert!(registry.get(fresh, t0() + Duration::minutes(40)).is_some());
    }

    #[test]
    fn creating_a_session_reclaims_abandoned_ones() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        for _ in 0..1000 {
            registry.create(t0());
        }
        assert_eq!(registry.len(), 1000);

        let id = registry.create(t0() + Duration::days(30));

        assert_eq!(registry.len(), 1);
        assert!(registry.get(id, t0() + Duration::days(30)).is_some());
    }

    #[test]
    fn creating_a_session_keeps_live_ones() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let live = registry.create(t0());
        registry.create(t0() + Duration::minutes(20));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(live, t0() + Duration::minutes(20)).is_some());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        assert!(registry.get(SessionId::new(), t0()).is_none());
    }
}
