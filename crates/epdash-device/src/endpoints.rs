//! Endpoint contracts: everything the state machine touches that could
//! block.
//!
//! The machine sees the server only through [`ZoneEndpoint`] and
//! [`PairingEndpoint`], whose vocabulary is exactly the wire types - it
//! cannot reach into server internals. Implementations do not need to
//! enforce deadlines themselves: the machine wraps every call in its own
//! timeout, and a timed-out call is treated as a failure.

use async_trait::async_trait;
use std::time::Duration;

use epdash_core::{Raster, ZoneRect};
use epdash_pair::{PairingCode, PollResponse};
use epdash_sync::{ZoneFetchError, ZoneReply, ZoneRequest};

use crate::error::Result;

/// The network interface: one bounded connect attempt at a time.
#[async_trait]
pub trait NetworkLink: Send + Sync {
    /// Try to bring the link up. Idempotent when already connected.
    async fn connect(&self) -> Result<()>;
}

/// The zone fetch side of the server.
#[async_trait]
pub trait ZoneEndpoint: Send + Sync {
    /// Fetch one zone. `Err(ZoneFetchError::ConfigurationMissing)` is the
    /// server saying this device has no bound configuration yet.
    async fn fetch_zone(&self, request: &ZoneRequest) -> std::result::Result<ZoneReply, ZoneFetchError>;
}

/// The pairing side of the server.
#[async_trait]
pub trait PairingEndpoint: Send + Sync {
    /// Ask the server to mint a pairing code for this device.
    async fn create_code(&self) -> Result<PairingCode>;

    /// Poll a code's status.
    async fn poll(&self, code: &PairingCode) -> Result<PollResponse>;
}

/// The static screens the device can show outside normal rendering. Kept
/// distinct so a user can tell a configuration problem from a network
/// outage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticScreen {
    /// Power-on splash.
    Boot,
    /// Connecting to the network.
    Connecting,
    /// Pairing instructions with the code to type into the wizard.
    Pairing { code: PairingCode },
    /// Pairing completed; dashboard loading.
    Paired,
    /// Connection error with the retry countdown.
    ConnectionError { retry_in: Duration },
    /// Server has no configuration for this device; setup instructions.
    SetupRequired,
}

/// The display: draws decoded rasters at offsets and flushes refreshes.
#[async_trait]
pub trait DisplayPanel: Send + Sync {
    /// Draw a decoded raster with its top-left corner at the rectangle's
    /// origin. Does not flush.
    async fn draw_zone(&self, rect: ZoneRect, raster: &Raster) -> Result<()>;

    /// Flush drawn zones with a partial (no-flash) refresh.
    async fn refresh_partial(&self) -> Result<()>;

    /// Flush the whole panel with a full refresh, clearing ghosting.
    async fn refresh_full(&self) -> Result<()>;

    /// Replace the panel content with a static screen (full refresh).
    async fn show_screen(&self, screen: StaticScreen) -> Result<()>;
}
