//! The Server: dispatcher, pairing registry, and device bookkeeping behind
//! one API.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use epdash_core::DashboardSnapshot;
use epdash_pair::{
    BoundConfig, PairingCode, PairingRegistry, PollResponse, SubmitOutcome, SubmitRequest,
    SubmitResponse, DEFAULT_PAIRING_TTL_MS,
};
use epdash_store::{ZoneCache, DEFAULT_PARTITION_CAPACITY};
use epdash_sync::{SyncDispatcher, ZoneReply, ZoneRequest, ZoneResolver, ZoneTable};

use crate::error::{Result, ServerError};

/// Produces the dashboard snapshot a dispatch renders from.
///
/// This is the seam to the external transit/weather/commute logic: the
/// server consumes whatever the producer returns as an opaque, immutable
/// value per request.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self) -> DashboardSnapshot;
}

/// A snapshot source backed by a shared, settable value. Doubles as the
/// short-lived upstream cache in small deployments and as the test producer.
pub struct SharedSnapshot {
    inner: RwLock<DashboardSnapshot>,
}

impl SharedSnapshot {
    pub fn new(snapshot: DashboardSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Replace the current snapshot.
    pub fn set(&self, snapshot: DashboardSnapshot) {
        *self.inner.write().unwrap() = snapshot;
    }
}

#[async_trait]
impl SnapshotSource for SharedSnapshot {
    async fn snapshot(&self) -> DashboardSnapshot {
        self.inner.read().unwrap().clone()
    }
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn snapshot(&self) -> DashboardSnapshot {
        (**self).snapshot().await
    }
}

/// Server construction parameters.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bound on concurrently tracked device partitions.
    pub cache_capacity: usize,
    /// Pairing window in milliseconds.
    pub pairing_ttl_ms: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_PARTITION_CAPACITY,
            pairing_ttl_ms: DEFAULT_PAIRING_TTL_MS,
        }
    }
}

/// The unified server.
///
/// Safe to share behind an `Arc` across concurrent request handlers: the
/// dispatcher and registry carry their own per-key atomicity.
pub struct Server<Src> {
    dispatcher: SyncDispatcher,
    registry: PairingRegistry,
    source: Src,
    /// Device tokens with delivered configuration, keyed by the token the
    /// device presents on zone fetches.
    devices: RwLock<HashMap<String, serde_json::Value>>,
}

impl<Src: SnapshotSource> Server<Src> {
    /// Create a server over the given snapshot producer.
    pub fn new(source: Src, config: ServerConfig) -> Self {
        let dispatcher = SyncDispatcher::new(
            ZoneResolver::new(ZoneTable::standard()),
            Arc::new(ZoneCache::new(config.cache_capacity)),
        );
        Self {
            dispatcher,
            registry: PairingRegistry::new(config.pairing_ttl_ms),
            source,
            devices: RwLock::new(HashMap::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Zone fetch
    // ─────────────────────────────────────────────────────────────────────

    /// Handle one zone fetch.
    ///
    /// A request carrying a token the server has no configuration for gets
    /// `ConfigurationMissing` - the device shows its setup screen instead
    /// of mistaking the condition for a network outage. Anonymous requests
    /// are served from the shared cache partition.
    pub async fn fetch_zone(&self, request: &ZoneRequest) -> Result<ZoneReply> {
        if let Some(token) = request.device_token.as_deref() {
            if !self.devices.read().unwrap().contains_key(token) {
                tracing::info!(token, "zone fetch from unconfigured device");
                return Err(ServerError::ConfigurationMissing);
            }
        }

        let snapshot = self.source.snapshot().await;
        let outcome = self.dispatcher.dispatch(request, &snapshot)?;
        Ok(outcome.into_reply())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pairing
    // ─────────────────────────────────────────────────────────────────────

    /// Mint a pairing code for a device entering pairing mode.
    pub fn create_pairing_code(&self, now_ms: i64) -> PairingCode {
        self.registry.create_code(now_ms)
    }

    /// Device-side poll. Malformed codes answer `not_found` - a client
    /// error on the wire, never a 5xx.
    pub fn poll_pairing(&self, code: &str, now_ms: i64) -> PollResponse {
        match PairingCode::parse(code) {
            Ok(code) => self.registry.poll(&code, now_ms).into(),
            Err(_) => PollResponse::NotFound,
        }
    }

    /// Wizard-side submission: bind configuration to a waiting code and
    /// register the device it implies.
    pub fn submit_config(
        &self,
        code: &str,
        request: SubmitRequest,
        now_ms: i64,
    ) -> SubmitResponse {
        let Ok(code) = PairingCode::parse(code) else {
            return SubmitResponse::NotFound;
        };

        let bound = BoundConfig::from(request);
        let token = bound.device_token().to_string();
        let config = bound.config.clone();

        let outcome = self.registry.submit(&code, bound, now_ms);
        if outcome == SubmitOutcome::Configured {
            self.devices.write().unwrap().insert(token, config);
        }
        outcome.into()
    }

    /// Forget a device's configuration (admin reset). Its next identified
    /// fetch gets `ConfigurationMissing` and the device re-pairs.
    pub fn revoke_device(&self, token: &str) {
        self.devices.write().unwrap().remove(token);
        tracing::info!(token, "device configuration revoked");
    }

    /// Whether a token currently has delivered configuration.
    pub fn is_configured(&self, token: &str) -> bool {
        self.devices.read().unwrap().contains_key(token)
    }

    /// The dispatcher (integration tests reach the cache through it).
    pub fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }
}
