//! The pairing registry.
//!
//! Tracks outstanding pairing codes, their expiry, and the configuration a
//! wizard bound to them. Per-code life cycle:
//!
//! ```text
//! waiting ──(submit)──> paired ──(ttl after pairing)──> expired
//!    │
//!    └──(ttl after creation, never paired)────────────> expired
//! ```
//!
//! Expired sessions are purged lazily on the next `create_code` or `poll`
//! call; minimal deployments get correct expiry without a scheduler.
//! Callers thread `now_ms` explicitly, which keeps every transition
//! deterministic under test.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::code::PairingCode;

/// Default pairing window: 10 minutes.
pub const DEFAULT_PAIRING_TTL_MS: i64 = 600_000;

/// The configuration a wizard binds to a code. The webhook URL is how a
/// device learns where its server lives; nothing else in the protocol
/// carries an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundConfig {
    pub webhook_url: String,
    /// Free-form dashboard configuration, opaque to this crate.
    pub config: serde_json::Value,
}

impl BoundConfig {
    /// The opaque device credential implied by the webhook URL: its last
    /// path segment. Both sides of the protocol derive it the same way, so
    /// the server can partition its cache per device without a separate
    /// credential exchange.
    pub fn device_token(&self) -> &str {
        self.webhook_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.webhook_url)
    }
}

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Waiting,
    Paired,
    Expired,
}

/// One live pairing session. Exactly one session exists per live code.
#[derive(Debug, Clone)]
pub struct PairingSession {
    pub code: PairingCode,
    pub created_at_ms: i64,
    pub status: SessionStatus,
    pub bound: Option<BoundConfig>,
    pub paired_at_ms: Option<i64>,
}

impl PairingSession {
    /// When this session stops being live: TTL from creation while
    /// waiting, TTL from pairing once paired (the delivery window).
    fn expires_at_ms(&self, ttl_ms: i64) -> i64 {
        match self.paired_at_ms {
            Some(paired_at) => paired_at + ttl_ms,
            None => self.created_at_ms + ttl_ms,
        }
    }

    fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms >= self.expires_at_ms(ttl_ms)
    }
}

/// Result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Code exists, wizard has not submitted yet.
    Waiting,
    /// Configuration is bound; here it is.
    Paired(BoundConfig),
    /// Unknown or expired code.
    NotFound,
}

/// Result of a wizard submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Configuration accepted and bound.
    Configured,
    /// The code was already bound; the stored config is untouched.
    AlreadyPaired,
    /// Unknown or expired code.
    NotFound,
}

/// Registry of outstanding pairing sessions.
///
/// Thread-safe: code creation and submission hold one lock, so concurrent
/// `create_code` calls cannot mint duplicate codes and concurrent wizard
/// submissions race to exactly one `Configured`.
pub struct PairingRegistry {
    sessions: Mutex<HashMap<PairingCode, PairingSession>>,
    ttl_ms: i64,
}

impl PairingRegistry {
    /// Create a registry with the given pairing window.
    pub fn new(ttl_ms: i64) -> Self {
        assert!(ttl_ms > 0, "pairing TTL must be positive");
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// Mint a fresh code, guaranteed not to collide with any live session.
    pub fn create_code(&self, now_ms: i64) -> PairingCode {
        let mut sessions = self.sessions.lock().unwrap();
        Self::purge_expired(&mut sessions, now_ms, self.ttl_ms);

        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = PairingCode::generate(&mut rng);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(
            code.clone(),
            PairingSession {
                code: code.clone(),
                created_at_ms: now_ms,
                status: SessionStatus::Waiting,
                bound: None,
                paired_at_ms: None,
            },
        );
        tracing::info!(code = %code, "pairing code created");
        code
    }

    /// Device-side poll: is my code bound yet?
    pub fn poll(&self, code: &PairingCode, now_ms: i64) -> PollOutcome {
        let mut sessions = self.sessions.lock().unwrap();
        Self::purge_expired(&mut sessions, now_ms, self.ttl_ms);

        match sessions.get(code) {
            None => PollOutcome::NotFound,
            Some(session) => match (&session.status, &session.bound) {
                (SessionStatus::Paired, Some(config)) => PollOutcome::Paired(config.clone()),
                _ => PollOutcome::Waiting,
            },
        }
    }

    /// Wizard-side submission: bind configuration to a waiting code.
    ///
    /// Single-use for writing: once paired, later submissions return
    /// `AlreadyPaired` and do not alter the bound config.
    pub fn submit(&self, code: &PairingCode, config: BoundConfig, now_ms: i64) -> SubmitOutcome {
        let mut sessions = self.sessions.lock().unwrap();

        let Some(session) = sessions.get_mut(code) else {
            return SubmitOutcome::NotFound;
        };
        if session.is_expired(now_ms, self.ttl_ms) {
            sessions.remove(code);
            return SubmitOutcome::NotFound;
        }
        if session.status == SessionStatus::Paired {
            return SubmitOutcome::AlreadyPaired;
        }

        session.status = SessionStatus::Paired;
        session.bound = Some(config);
        session.paired_at_ms = Some(now_ms);
        tracing::info!(code = %code, "pairing code bound");
        SubmitOutcome::Configured
    }

    /// Number of live (non-purged) sessions. Mostly for tests and metrics.
    pub fn live_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn purge_expired(
        sessions: &mut HashMap<PairingCode, PairingSession>,
        now_ms: i64,
        ttl_ms: i64,
    ) {
        sessions.retain(|code, session| {
            let keep = !session.is_expired(now_ms, ttl_ms);
            if !keep {
                tracing::debug!(code = %code, "pairing session expired");
            }
            keep
        });
    }
}

impl Default for PairingRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PAIRING_TTL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> BoundConfig {
        BoundConfig {
            webhook_url: url.to_string(),
            config: serde_json::json!({"layout": "v11"}),
        }
    }

    #[test]
    fn test_create_then_poll_waiting() {
        let registry = PairingRegistry::default();
        let code = registry.create_code(1_000);
        assert_eq!(registry.poll(&code, 2_000), PollOutcome::Waiting);
    }

    #[test]
    fn test_submit_then_poll_paired() {
        let registry = PairingRegistry::default();
        let code = registry.create_code(1_000);

        let outcome = registry.submit(&code, config("https://example.net/api/device/1"), 5_000);
        assert_eq!(outcome, SubmitOutcome::Configured);

        match registry.poll(&code, 6_000) {
            PollOutcome::Paired(bound) => {
                assert_eq!(bound.webhook_url, "https://example.net/api/device/1");
            }
            other => panic!("expected paired, got {other:?}"),
        }
    }

    #[test]
    fn test_second_submit_is_rejected_and_harmless() {
        let registry = PairingRegistry::default();
        let code = registry.create_code(0);

        registry.submit(&code, config("https://first.example"), 1);
        let second = registry.submit(&code, config("https://late.example"), 2);
        assert_eq!(second, SubmitOutcome::AlreadyPaired);

        // Bound config is the first submission, untouched.
        match registry.poll(&code, 3) {
            PollOutcome::Paired(bound) => assert_eq!(bound.webhook_url, "https://first.example"),
            other => panic!("expected paired, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_code_not_found() {
        let registry = PairingRegistry::default();
        let code = PairingCode::parse("A7X9K2").unwrap();
        assert_eq!(registry.poll(&code, 0), PollOutcome::NotFound);
        assert_eq!(
            registry.submit(&code, config("https://x.example"), 0),
            SubmitOutcome::NotFound
        );
    }

    #[test]
    fn test_waiting_code_expires_after_ttl() {
        let registry = PairingRegistry::new(10_000);
        let code = registry.create_code(0);

        assert_eq!(registry.poll(&code, 9_999), PollOutcome::Waiting);
        assert_eq!(registry.poll(&code, 10_000), PollOutcome::NotFound);
        // And a late wizard submission finds nothing.
        assert_eq!(
            registry.submit(&code, config("https://x.example"), 10_001),
            SubmitOutcome::NotFound
        );
    }

    #[test]
    fn test_paired_code_expires_ttl_after_pairing() {
        let registry = PairingRegistry::new(10_000);
        let code = registry.create_code(0);
        // Pair near the end of the creation window.
        registry.submit(&code, config("https://x.example"), 9_000);

        // Delivery window extends from pairing time.
        assert!(matches!(
            registry.poll(&code, 18_999),
            PollOutcome::Paired(_)
        ));
        assert_eq!(registry.poll(&code, 19_000), PollOutcome::NotFound);
    }

    #[test]
    fn test_expired_sessions_are_purged_lazily() {
        let registry = PairingRegistry::new(10_000);
        registry.create_code(0);
        registry.create_code(0);
        assert_eq!(registry.live_sessions(), 2);

        registry.create_code(20_000);
        assert_eq!(registry.live_sessions(), 1);
    }

    #[test]
    fn test_device_token_is_webhook_tail() {
        let bound = config("https://server.example/api/device/tok-42");
        assert_eq!(bound.device_token(), "tok-42");

        let trailing = config("https://server.example/api/device/tok-42/");
        assert_eq!(trailing.device_token(), "tok-42");
    }

    #[test]
    fn test_created_codes_do_not_collide_with_live_codes() {
        let registry = PairingRegistry::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let code = registry.create_code(0);
            assert!(seen.insert(code.as_str().to_string()), "duplicate live code");
        }
    }

    #[test]
    fn test_concurrent_submissions_bind_exactly_once() {
        use std::sync::Arc;

        let registry = Arc::new(PairingRegistry::default());
        let code = registry.create_code(0);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let code = code.clone();
                std::thread::spawn(move || {
                    registry.submit(&code, config(&format!("https://w{i}.example")), 1)
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let configured = outcomes
            .iter()
            .filter(|o| **o == SubmitOutcome::Configured)
            .count();
        assert_eq!(configured, 1);
    }
}
