//! # Epdash
//!
//! The unified server surface for the epdash protocol: zone synchronization
//! for low-power e-ink dashboards plus the pairing flow that provisions
//! them.
//!
//! ## Overview
//!
//! A [`Server`] owns the three server-side subsystems and exposes the whole
//! wire contract as plain methods:
//!
//! - **Zone fetch**: [`Server::fetch_zone`] - resolve, rasterize,
//!   fingerprint, and answer "unchanged" or fresh bitmap bytes.
//! - **Pairing**: [`Server::create_pairing_code`], [`Server::poll_pairing`],
//!   [`Server::submit_config`] - the code flow binding a device to its
//!   configuration.
//!
//! The snapshot itself comes from an external producer behind
//! [`SnapshotSource`]; this crate never computes transit or weather data.
//!
//! ## Loopback
//!
//! [`loopback`] wires a [`Server`] directly into the device state machine's
//! endpoint traits, so the full protocol - provisioning, fetch, render,
//! idle, error backoff - runs end to end in one process. The integration
//! tests drive it that way.
//!
//! ## Re-exports
//!
//! The component crates are re-exported for convenience:
//!
//! - `epdash::core` - rasters, codec, fingerprints
//! - `epdash::store` - zone cache and state store
//! - `epdash::sync` - resolver, dispatcher, wire types
//! - `epdash::pair` - pairing registry and codes
//! - `epdash::device` - the device state machine

pub mod error;
pub mod loopback;
pub mod server;

// Re-export component crates
pub use epdash_core as core;
pub use epdash_device as device;
pub use epdash_pair as pair;
pub use epdash_store as store;
pub use epdash_sync as sync;

// Re-export main types for convenience
pub use error::{Result, ServerError};
pub use loopback::{LoopbackEndpoint, PanelEvent, VirtualPanel};
pub use server::{Server, ServerConfig, SharedSnapshot, SnapshotSource};

// Re-export commonly used wire and core types
pub use epdash_core::{DashboardSnapshot, Fingerprint, Raster, ZoneId, ZoneRect};
pub use epdash_pair::{PairingCode, PollResponse, SubmitRequest, SubmitResponse};
pub use epdash_sync::{ZoneReply, ZoneRequest};
