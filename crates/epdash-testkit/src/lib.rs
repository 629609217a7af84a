//! # Epdash Testkit
//!
//! Testing utilities for the epdash protocol.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: hand-assembled wire bytes the codec must produce
//!   bit-for-bit, for cross-implementation verification
//! - **Generators**: proptest strategies for rasters and snapshots
//! - **Fixtures**: helpers for setting up server-side test scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use epdash_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let encoded = epdash_core::codec::encode(&(vector.build)());
//!     assert_eq!(hex::encode(&encoded), vector.expected_hex, "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use epdash_testkit::generators::arb_raster;
//!
//! proptest! {
//!     #[test]
//!     fn round_trip(raster in arb_raster()) {
//!         let decoded = epdash_core::codec::decode(&epdash_core::codec::encode(&raster)).unwrap();
//!         prop_assert_eq!(decoded, raster);
//!     }
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```rust
//! use epdash_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let outcome = fixture.dispatch("header", Some("dev-a"), false).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{commute_snapshot, leg, test_server, TestFixture};
pub use generators::{arb_orientation, arb_raster, arb_snapshot};
pub use vectors::{all_vectors, GoldenVector};
