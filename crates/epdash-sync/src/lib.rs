//! # Epdash Sync
//!
//! The server side of the zone protocol: resolving a requested zone id
//! against the current dashboard snapshot, rasterizing it, and deciding
//! whether the result must travel to the device at all.
//!
//! ## Key Properties
//!
//! - **Idempotent**: repeated identical requests are cheap; the second
//!   dispatch of unchanged content answers "unchanged" without bytes.
//! - **Degrading, not failing**: composite zone ids requested by firmware
//!   never error; they fall back subzone-by-subzone and finally to a blank
//!   raster sized to the zone's rectangle.
//! - **Stateless transport**: everything a reply needs (fingerprint, zone
//!   rectangle, bytes) is carried in the reply itself.
//!
//! ## Request Flow
//!
//! ```text
//! ZoneRequest ──> resolve (table + snapshot) ──> encode ──> fingerprint
//!                                                              │
//!                     ZoneReply::NotModified <── cache hit ────┤
//!                     ZoneReply::Payload     <── cache miss ───┘
//! ```

pub mod dispatcher;
pub mod error;
pub mod glyphs;
pub mod messages;
pub mod render;
pub mod resolver;
pub mod table;

pub use dispatcher::{DispatchOutcome, SyncDispatcher};
pub use error::{Result, SyncError};
pub use messages::{limits, ZoneFetchError, ZoneReply, ZoneRequest};
pub use resolver::{RenderedZone, ZoneResolver};
pub use table::{CompositeZone, PrimitiveKind, PrimitiveZone, ZoneTable, DIVIDER_ZONE_ID};
