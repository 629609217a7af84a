//! # Epdash Core
//!
//! Pure primitives for the epdash zone protocol: rasters, the bitmap wire
//! codec, content fingerprints, and the dashboard snapshot model.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over pixel data and value objects.
//!
//! ## Key Types
//!
//! - [`Raster`] - A 1-bit monochrome pixel grid with an orientation flag
//! - [`Fingerprint`] - Content-address of an encoded zone bitmap (Blake3 hash)
//! - [`ZoneId`] / [`ZoneRect`] - Zone naming and geometry
//! - [`DashboardSnapshot`] - The opaque server-produced view model
//!
//! ## Wire Format
//!
//! Zone content travels as a restricted 1-bit BMP container. See [`codec`].

pub mod codec;
pub mod error;
pub mod fingerprint;
pub mod geometry;
pub mod raster;
pub mod snapshot;

pub use codec::{decode, encode, PIXEL_DATA_OFFSET};
pub use error::CodecError;
pub use fingerprint::Fingerprint;
pub use geometry::{ZoneId, ZoneRect, CANVAS_H, CANVAS_W};
pub use raster::{Orientation, Raster};
pub use snapshot::{DashboardSnapshot, JourneyLeg, LegKind, WeatherView};
