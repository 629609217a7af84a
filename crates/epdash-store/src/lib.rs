//! # Epdash Store
//!
//! Server-side content cache and the blob state-store abstraction.
//!
//! ## Overview
//!
//! Two independent concerns live here:
//!
//! - [`ZoneCache`] - the bounded per-device fingerprint cache that decides
//!   whether a zone's content must be re-sent. Owned exclusively by the sync
//!   dispatcher; exposes only lookup/commit, never raw map access.
//! - [`StateStore`] - a get/set/delete blob interface standing in for
//!   whatever durable key-value storage a deployment has. The device state
//!   machine persists its state record through it.
//!
//! ## Design Notes
//!
//! - **Bounded partitions**: the cache holds at most K device partitions;
//!   inserting beyond K evicts the least-recently-created partition.
//!   Insertion order is sufficient at this cardinality - eviction only has
//!   to prevent unbounded growth.
//! - **Per-key atomicity**: `should_send_and_commit` performs the
//!   lookup-then-commit read-modify-write under a single lock, so concurrent
//!   dispatches for the same device cannot interleave.
//! - **No cross-device invalidation**: partitions and their zone maps are
//!   independent.

pub mod blob;
pub mod cache;
pub mod device_key;
pub mod error;

pub use blob::{FileStateStore, MemoryStateStore, StateStore};
pub use cache::{ZoneCache, ZoneCacheEntry, DEFAULT_PARTITION_CAPACITY};
pub use device_key::DeviceKey;
pub use error::{Result, StoreError};
