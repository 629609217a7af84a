//! In-process loopback: the device endpoint traits wired straight into a
//! [`Server`].
//!
//! No sockets, no HTTP - the device state machine runs against the real
//! dispatcher and registry in one process. Integration tests exercise the
//! whole protocol this way, and the virtual panel stands in for display
//! hardware by blitting decoded zones onto an actual canvas raster.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use epdash_core::{Raster, ZoneRect, CANVAS_H, CANVAS_W};
use epdash_device::{DeviceError, DisplayPanel, NetworkLink, PairingEndpoint, StaticScreen, ZoneEndpoint};
use epdash_pair::{PairingCode, PollResponse};
use epdash_sync::{SyncError, ZoneFetchError, ZoneReply, ZoneRequest};

use crate::error::ServerError;
use crate::server::{Server, SnapshotSource};

/// A device-side endpoint speaking directly to an in-process server.
///
/// Clones share the server and the test clock, so one instance can serve
/// as the machine's zone endpoint and another as its pairing endpoint.
pub struct LoopbackEndpoint<Src> {
    server: Arc<Server<Src>>,
    now_ms: Arc<AtomicI64>,
}

impl<Src> Clone for LoopbackEndpoint<Src> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
            now_ms: Arc::clone(&self.now_ms),
        }
    }
}

impl<Src: SnapshotSource> LoopbackEndpoint<Src> {
    pub fn new(server: Arc<Server<Src>>) -> Self {
        Self {
            server,
            now_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// The clock the pairing calls are stamped with. Registry expiry runs
    /// off this, so tests can age sessions deterministically.
    pub fn set_now(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    fn now(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<Src: SnapshotSource> NetworkLink for LoopbackEndpoint<Src> {
    async fn connect(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

#[async_trait]
impl<Src: SnapshotSource> ZoneEndpoint for LoopbackEndpoint<Src> {
    async fn fetch_zone(&self, request: &ZoneRequest) -> Result<ZoneReply, ZoneFetchError> {
        match self.server.fetch_zone(request).await {
            Ok(reply) => Ok(reply),
            Err(ServerError::ConfigurationMissing) => Err(ZoneFetchError::ConfigurationMissing),
            Err(ServerError::Sync(SyncError::UnknownZone(id))) => {
                Err(ZoneFetchError::UnknownZone(id.to_string()))
            }
            Err(ServerError::Sync(e)) => Err(ZoneFetchError::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl<Src: SnapshotSource> PairingEndpoint for LoopbackEndpoint<Src> {
    async fn create_code(&self) -> Result<PairingCode, DeviceError> {
        Ok(self.server.create_pairing_code(self.now()))
    }

    async fn poll(&self, code: &PairingCode) -> Result<PollResponse, DeviceError> {
        Ok(self.server.poll_pairing(code.as_str(), self.now()))
    }
}

/// What the virtual panel was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Draw(ZoneRect),
    RefreshPartial,
    RefreshFull,
    Screen(String),
}

/// A stand-in display: a full-canvas raster plus an operation log.
pub struct VirtualPanel {
    canvas: Mutex<Raster>,
    events: Mutex<Vec<PanelEvent>>,
}

impl VirtualPanel {
    pub fn new() -> Self {
        Self {
            canvas: Mutex::new(Raster::blank(CANVAS_W, CANVAS_H)),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the canvas pixels.
    pub fn canvas(&self) -> Raster {
        self.canvas.lock().unwrap().clone()
    }

    /// The operations performed so far.
    pub fn events(&self) -> Vec<PanelEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Last static screen shown, if any.
    pub fn last_screen(&self) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                PanelEvent::Screen(s) => Some(s),
                _ => None,
            })
    }

    fn push(&self, event: PanelEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Default for VirtualPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayPanel for VirtualPanel {
    async fn draw_zone(&self, rect: ZoneRect, raster: &Raster) -> Result<(), DeviceError> {
        let mut canvas = self.canvas.lock().unwrap();
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                if let Some(white) = raster.pixel(x, y) {
                    canvas.set_pixel(rect.x + x as i32, rect.y + y as i32, white);
                }
            }
        }
        drop(canvas);
        self.push(PanelEvent::Draw(rect));
        Ok(())
    }

    async fn refresh_partial(&self) -> Result<(), DeviceError> {
        self.push(PanelEvent::RefreshPartial);
        Ok(())
    }

    async fn refresh_full(&self) -> Result<(), DeviceError> {
        self.push(PanelEvent::RefreshFull);
        Ok(())
    }

    async fn show_screen(&self, screen: StaticScreen) -> Result<(), DeviceError> {
        self.push(PanelEvent::Screen(format!("{screen:?}")));
        Ok(())
    }
}
