//! The bounded zone cache.
//!
//! Maps (device key, zone id) to the fingerprint last sent to that device.
//! This is the component that keeps repeated fetches cheap: if the
//! fingerprint of freshly rendered content matches what a device already
//! has, the dispatcher answers "unchanged" without re-transmitting bytes.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use epdash_core::{Fingerprint, ZoneId};

use crate::device_key::DeviceKey;

/// Default partition bound: a small deployment tracks a handful of devices.
pub const DEFAULT_PARTITION_CAPACITY: usize = 10;

/// One cached zone entry within a device partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCacheEntry {
    /// Fingerprint of the bytes last sent for this zone.
    pub fingerprint: Fingerprint,
    /// Logical commit tick when the entry was last updated. Monotonic per
    /// cache, not wall time.
    pub rendered_at_tick: u64,
}

struct Partition {
    zones: HashMap<ZoneId, ZoneCacheEntry>,
}

struct CacheInner {
    partitions: HashMap<DeviceKey, Partition>,
    /// Partition creation order, front = oldest. Drives eviction.
    creation_order: VecDeque<DeviceKey>,
    tick: u64,
}

/// Bounded per-device fingerprint cache.
///
/// Thread-safe; the read-modify-write used by the dispatcher
/// ([`ZoneCache::should_send_and_commit`]) holds the write lock for its full
/// duration, which gives the per-device-key atomicity the protocol requires.
/// Cross-device calls share the same lock but never observe each other's
/// partial updates.
pub struct ZoneCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
}

impl ZoneCache {
    /// Create a cache bounded to `capacity` device partitions.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be nonzero");
        Self {
            inner: RwLock::new(CacheInner {
                partitions: HashMap::new(),
                creation_order: VecDeque::new(),
                tick: 0,
            }),
            capacity,
        }
    }

    /// The fingerprint last committed for (device, zone), if any.
    pub fn lookup(&self, device: &DeviceKey, zone: &ZoneId) -> Option<Fingerprint> {
        let inner = self.inner.read().unwrap();
        inner
            .partitions
            .get(device)
            .and_then(|p| p.zones.get(zone))
            .map(|entry| entry.fingerprint)
    }

    /// Whether `fingerprint` would need to be sent, without committing.
    /// True when forced, when no prior entry exists, or when the stored
    /// fingerprint differs.
    pub fn should_send(
        &self,
        device: &DeviceKey,
        zone: &ZoneId,
        fingerprint: &Fingerprint,
        force: bool,
    ) -> bool {
        if force {
            return true;
        }
        match self.lookup(device, zone) {
            Some(stored) => stored != *fingerprint,
            None => true,
        }
    }

    /// Record `fingerprint` as the content last sent for (device, zone).
    pub fn commit(&self, device: &DeviceKey, zone: &ZoneId, fingerprint: Fingerprint) {
        let mut inner = self.inner.write().unwrap();
        inner.commit(device, zone, fingerprint, self.capacity);
    }

    /// The dispatcher's decision step: lookup and commit under one lock.
    ///
    /// Returns true when the bytes must be sent (and the new fingerprint has
    /// been committed); false when the device already has this content. A
    /// forced call always commits and returns true.
    pub fn should_send_and_commit(
        &self,
        device: &DeviceKey,
        zone: &ZoneId,
        fingerprint: Fingerprint,
        force: bool,
    ) -> bool {
        let mut inner = self.inner.write().unwrap();

        let unchanged = inner
            .partitions
            .get(device)
            .and_then(|p| p.zones.get(zone))
            .map(|entry| entry.fingerprint == fingerprint)
            .unwrap_or(false);

        if unchanged && !force {
            return false;
        }

        inner.commit(device, zone, fingerprint, self.capacity);
        true
    }

    /// Number of live device partitions.
    pub fn partition_count(&self) -> usize {
        self.inner.read().unwrap().partitions.len()
    }

    /// Whether a device currently has a partition.
    pub fn tracks_device(&self, device: &DeviceKey) -> bool {
        self.inner.read().unwrap().partitions.contains_key(device)
    }
}

impl Default for ZoneCache {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_CAPACITY)
    }
}

impl CacheInner {
    fn commit(
        &mut self,
        device: &DeviceKey,
        zone: &ZoneId,
        fingerprint: Fingerprint,
        capacity: usize,
    ) {
        self.tick += 1;
        let tick = self.tick;

        if !self.partitions.contains_key(device) {
            if self.partitions.len() >= capacity {
                if let Some(oldest) = self.creation_order.pop_front() {
                    self.partitions.remove(&oldest);
                    tracing::debug!(evicted = %oldest, "zone cache partition evicted");
                }
            }
            self.partitions.insert(
                device.clone(),
                Partition {
                    zones: HashMap::new(),
                },
            );
            self.creation_order.push_back(device.clone());
        }

        let partition = self
            .partitions
            .get_mut(device)
            .expect("partition inserted above");
        partition.zones.insert(
            zone.clone(),
            ZoneCacheEntry {
                fingerprint,
                rendered_at_tick: tick,
            },
        );
        tracing::debug!(device = %device, zone = %zone, fingerprint = %fingerprint, "zone fingerprint committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(byte: u8) -> Fingerprint {
        Fingerprint::from_bytes([byte; 32])
    }

    fn key(name: &str) -> DeviceKey {
        DeviceKey::from_token(Some(name))
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = ZoneCache::new(4);
        let device = key("alpha");
        let zone = ZoneId::new("header");

        assert!(cache.lookup(&device, &zone).is_none());
        assert!(cache.should_send(&device, &zone, &fp(1), false));

        cache.commit(&device, &zone, fp(1));
        assert_eq!(cache.lookup(&device, &zone), Some(fp(1)));
        assert!(!cache.should_send(&device, &zone, &fp(1), false));
        assert!(cache.should_send(&device, &zone, &fp(2), false));
    }

    #[test]
    fn test_force_always_sends() {
        let cache = ZoneCache::new(4);
        let device = key("alpha");
        let zone = ZoneId::new("header");

        cache.commit(&device, &zone, fp(1));
        assert!(cache.should_send(&device, &zone, &fp(1), true));
        assert!(cache.should_send_and_commit(&device, &zone, fp(1), true));
    }

    #[test]
    fn test_should_send_and_commit_is_idempotent_per_content() {
        let cache = ZoneCache::new(4);
        let device = key("alpha");
        let zone = ZoneId::new("legs");

        assert!(cache.should_send_and_commit(&device, &zone, fp(7), false));
        assert!(!cache.should_send_and_commit(&device, &zone, fp(7), false));
        assert!(cache.should_send_and_commit(&device, &zone, fp(8), false));
        assert!(!cache.should_send_and_commit(&device, &zone, fp(8), false));
    }

    #[test]
    fn test_partitions_are_independent() {
        let cache = ZoneCache::new(4);
        let zone = ZoneId::new("header");

        cache.commit(&key("alpha"), &zone, fp(1));
        cache.commit(&key("beta"), &zone, fp(2));

        assert_eq!(cache.lookup(&key("alpha"), &zone), Some(fp(1)));
        assert_eq!(cache.lookup(&key("beta"), &zone), Some(fp(2)));
    }

    #[test]
    fn test_eviction_drops_least_recently_created() {
        let cache = ZoneCache::new(2);
        let zone = ZoneId::new("header");

        cache.commit(&key("first"), &zone, fp(1));
        cache.commit(&key("second"), &zone, fp(2));
        // Re-committing to an existing partition must not refresh its
        // creation position.
        cache.commit(&key("first"), &zone, fp(3));

        cache.commit(&key("third"), &zone, fp(4));
        assert_eq!(cache.partition_count(), 2);
        assert!(!cache.tracks_device(&key("first")));
        assert!(cache.tracks_device(&key("second")));
        assert!(cache.tracks_device(&key("third")));
    }

    #[test]
    fn test_evicted_device_starts_cold() {
        let cache = ZoneCache::new(1);
        let zone = ZoneId::new("footer");

        cache.commit(&key("alpha"), &zone, fp(1));
        cache.commit(&key("beta"), &zone, fp(2));

        // Alpha was evicted; its next dispatch re-sends.
        assert!(cache.should_send(&key("alpha"), &zone, &fp(1), false));
    }

    #[test]
    fn test_ticks_increase_per_commit() {
        let cache = ZoneCache::new(2);
        let device = key("alpha");

        cache.commit(&device, &ZoneId::new("a"), fp(1));
        cache.commit(&device, &ZoneId::new("b"), fp(2));

        let inner = cache.inner.read().unwrap();
        let partition = inner.partitions.get(&device).unwrap();
        let ta = partition.zones.get(&ZoneId::new("a")).unwrap().rendered_at_tick;
        let tb = partition.zones.get(&ZoneId::new("b")).unwrap().rendered_at_tick;
        assert!(tb > ta);
    }
}
