//! The sync dispatcher: one zone request in, "unchanged" or fresh bytes out.
//!
//! This is the single exchange the whole protocol is built around. The
//! transport stays stateless: repeated identical requests are idempotent
//! and cheap, and a request carrying the force flag bypasses change
//! detection for recovery after a known desync.

use std::sync::Arc;

use bytes::Bytes;

use epdash_core::{codec, DashboardSnapshot, Fingerprint, ZoneId, ZoneRect};
use epdash_store::{DeviceKey, ZoneCache};

use crate::error::Result;
use crate::messages::{ZoneReply, ZoneRequest};
use crate::resolver::ZoneResolver;

/// Outcome of a dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The device already holds this content.
    Unchanged { fingerprint: Fingerprint },
    /// Fresh bytes the device must draw.
    Fresh {
        bytes: Bytes,
        fingerprint: Fingerprint,
        rect: ZoneRect,
    },
}

impl DispatchOutcome {
    /// Map to the wire reply.
    pub fn into_reply(self) -> ZoneReply {
        match self {
            DispatchOutcome::Unchanged { fingerprint } => ZoneReply::NotModified { fingerprint },
            DispatchOutcome::Fresh {
                bytes,
                fingerprint,
                rect,
            } => ZoneReply::Payload {
                fingerprint,
                rect,
                bytes,
            },
        }
    }
}

/// Server-side request handler for zone fetches.
///
/// Safe to share across request handlers: resolution is pure and the cache
/// does its read-modify-write atomically per device partition.
pub struct SyncDispatcher {
    resolver: ZoneResolver,
    cache: Arc<ZoneCache>,
}

impl SyncDispatcher {
    pub fn new(resolver: ZoneResolver, cache: Arc<ZoneCache>) -> Self {
        Self { resolver, cache }
    }

    /// The cache this dispatcher consults.
    pub fn cache(&self) -> &Arc<ZoneCache> {
        &self.cache
    }

    /// The resolver (and through it, the zone table).
    pub fn resolver(&self) -> &ZoneResolver {
        &self.resolver
    }

    /// Handle one zone request against the given snapshot.
    ///
    /// Resolve, encode, fingerprint, then consult the cache: if the device
    /// partition already holds this fingerprint (and the request is not
    /// forced), no bytes travel. Otherwise the new fingerprint is committed
    /// and the bytes returned.
    pub fn dispatch(
        &self,
        request: &ZoneRequest,
        snapshot: &DashboardSnapshot,
    ) -> Result<DispatchOutcome> {
        let device = DeviceKey::from_token(request.device_token.as_deref());
        let rendered = self.resolver.resolve(&request.zone, snapshot)?;

        let encoded = codec::encode(&rendered.raster);
        let fingerprint = Fingerprint::of(&encoded);

        let send =
            self.cache
                .should_send_and_commit(&device, &request.zone, fingerprint, request.force);

        if send {
            tracing::debug!(
                device = %device,
                zone = %request.zone,
                fingerprint = %fingerprint,
                bytes = encoded.len(),
                forced = request.force,
                "dispatch: sending fresh zone"
            );
            Ok(DispatchOutcome::Fresh {
                bytes: Bytes::from(encoded),
                fingerprint,
                rect: rendered.rect,
            })
        } else {
            tracing::debug!(device = %device, zone = %request.zone, fingerprint = %fingerprint, "dispatch: unchanged");
            Ok(DispatchOutcome::Unchanged { fingerprint })
        }
    }

    /// Convenience: dispatch a bare (zone, token, force) triple.
    pub fn dispatch_zone(
        &self,
        token: Option<&str>,
        zone: &ZoneId,
        snapshot: &DashboardSnapshot,
        force: bool,
    ) -> Result<DispatchOutcome> {
        let request = ZoneRequest {
            zone: zone.clone(),
            device_token: token.map(String::from),
            force,
        };
        self.dispatch(&request, snapshot)
    }
}

impl Default for SyncDispatcher {
    fn default() -> Self {
        Self::new(ZoneResolver::default(), Arc::new(ZoneCache::default()))
    }
}
