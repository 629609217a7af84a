//! Test fixtures and helpers.
//!
//! Common setup code for protocol tests: a ready-made dispatcher/registry
//! pair and snapshot builders with realistic commute content.

use std::sync::Arc;

use epdash_core::{DashboardSnapshot, JourneyLeg, LegKind, WeatherView, ZoneId};
use epdash_pair::{PairingRegistry, DEFAULT_PAIRING_TTL_MS};
use epdash_store::ZoneCache;
use epdash_sync::{DispatchOutcome, Result, SyncDispatcher, ZoneResolver, ZoneTable};

/// Build one journey leg.
pub fn leg(kind: LegKind, label: &str, departs_in_min: Option<u16>, duration_min: u16) -> JourneyLeg {
    JourneyLeg {
        kind,
        label: label.to_string(),
        departs_in_min,
        duration_min,
    }
}

/// A realistic morning-commute snapshot: walk, train, coffee window, with
/// weather and a status line. Every standard zone resolves against it.
pub fn commute_snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        generated_at_ms: 1_736_000_000_000,
        hour: 8,
        minute: 15,
        weather: Some(WeatherView {
            temp_c: 21,
            summary: "CLEAR".into(),
        }),
        legs: vec![
            leg(LegKind::Walk, "TO STATION", None, 7),
            leg(LegKind::Train, "CRAIGIEBURN", Some(4), 22),
            leg(LegKind::Tram, "ROUTE 19", Some(9), 14),
            leg(LegKind::Coffee, "", None, 6),
        ],
        status: Some("ON TIME".into()),
    }
}

/// A server-side fixture: dispatcher over the standard table plus a
/// pairing registry, with the snapshot held as mutable state.
pub struct TestFixture {
    pub dispatcher: SyncDispatcher,
    pub registry: PairingRegistry,
    pub snapshot: DashboardSnapshot,
}

impl TestFixture {
    /// Standard layout, default cache bound, commute snapshot.
    pub fn new() -> Self {
        Self::with_cache_capacity(epdash_store::DEFAULT_PARTITION_CAPACITY)
    }

    /// Same, with an explicit cache bound for eviction tests.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            dispatcher: SyncDispatcher::new(
                ZoneResolver::new(ZoneTable::standard()),
                Arc::new(ZoneCache::new(capacity)),
            ),
            registry: PairingRegistry::new(DEFAULT_PAIRING_TTL_MS),
            snapshot: commute_snapshot(),
        }
    }

    /// Dispatch a zone against the fixture's current snapshot.
    pub fn dispatch(
        &self,
        zone: &str,
        token: Option<&str>,
        force: bool,
    ) -> Result<DispatchOutcome> {
        self.dispatcher
            .dispatch_zone(token, &ZoneId::new(zone), &self.snapshot, force)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A full in-process server over the commute snapshot, for tests that
/// need the unified facade (pairing + device bookkeeping) rather than the
/// bare dispatcher.
pub fn test_server() -> epdash::Server<epdash::SharedSnapshot> {
    epdash::Server::new(
        epdash::SharedSnapshot::new(commute_snapshot()),
        epdash::ServerConfig::default(),
    )
}
