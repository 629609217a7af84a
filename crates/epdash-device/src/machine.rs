//! The device control loop.
//!
//! A perpetual single-threaded state machine. Each [`DeviceMachine::step`]
//! call handles exactly one state, transitions, persists the state record,
//! and tells the caller how long to sleep before the next step. Every
//! endpoint call runs under the configured timeout; a timed-out call is a
//! failure, and failures route to the `Error` state with exponential
//! backoff rather than escaping the loop.

use std::future::Future;
use std::time::Duration;

use epdash_core::{codec, Raster, ZoneRect};
use epdash_pair::{BoundConfig, PairingCode, PollResponse};
use epdash_store::StateStore;
use epdash_sync::messages::limits;
use epdash_sync::{ZoneFetchError, ZoneReply, ZoneRequest};

use crate::config::DeviceConfig;
use crate::endpoints::{DisplayPanel, NetworkLink, PairingEndpoint, StaticScreen, ZoneEndpoint};
use crate::error::{DeviceError, Result};
use crate::state::{DeviceState, PersistedState, BOUND_CONFIG_KEY, STATE_KEY};

/// What one step did: the state the machine is now in, and how long the
/// driving loop should sleep before stepping again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub state: DeviceState,
    pub sleep: Duration,
}

/// A zone fetched this cycle, waiting to be drawn.
struct PendingZone {
    rect: ZoneRect,
    raster: Raster,
}

/// The device state machine.
///
/// Generic over its endpoint contracts so hosts, tests, and the in-process
/// loopback all drive the same control logic.
pub struct DeviceMachine<L, Z, P, D, S> {
    config: DeviceConfig,
    link: L,
    zones: Z,
    pairing: P,
    display: D,
    store: S,

    persisted: PersistedState,
    bound: Option<BoundConfig>,

    connect_failures: u32,
    pairing_code: Option<PairingCode>,
    pairing_started_ms: Option<i64>,
    last_full_refresh_ms: Option<i64>,
    initial_draw_done: bool,
    pending: Vec<PendingZone>,
    pending_full: bool,
}

impl<L, Z, P, D, S> DeviceMachine<L, Z, P, D, S>
where
    L: NetworkLink,
    Z: ZoneEndpoint,
    P: PairingEndpoint,
    D: DisplayPanel,
    S: StateStore,
{
    /// Boot: read the persisted record once, then start from `Init`.
    ///
    /// A missing record means a fresh device. An unknown schema version is
    /// surfaced as an error - the caller decides whether to wipe, because
    /// silently defaulting would replay provisioning.
    pub async fn boot(
        config: DeviceConfig,
        link: L,
        zones: Z,
        pairing: P,
        display: D,
        store: S,
    ) -> Result<Self> {
        let mut persisted = match store.get(STATE_KEY).await? {
            Some(bytes) => PersistedState::decode(&bytes)?,
            None => PersistedState::fresh(),
        };
        // A power cycle always re-enters through Init; counters carry over
        // so the refresh cadence resumes instead of restarting.
        persisted.state = DeviceState::Init;

        let bound = match store.get(BOUND_CONFIG_KEY).await? {
            Some(bytes) => match serde_json::from_slice::<BoundConfig>(&bytes) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(error = %e, "stored bound config unreadable, re-pairing");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            config,
            link,
            zones,
            pairing,
            display,
            store,
            persisted,
            bound,
            connect_failures: 0,
            pairing_code: None,
            pairing_started_ms: None,
            last_full_refresh_ms: None,
            initial_draw_done: false,
            pending: Vec::new(),
            pending_full: false,
        })
    }

    /// Current state.
    pub fn state(&self) -> DeviceState {
        self.persisted.state
    }

    /// Consecutive failure count.
    pub fn error_count(&self) -> u32 {
        self.persisted.error_count
    }

    /// Partial renders since the last full redraw.
    pub fn refresh_count(&self) -> u32 {
        self.persisted.refresh_count
    }

    /// The bound server configuration, once paired.
    pub fn bound_config(&self) -> Option<&BoundConfig> {
        self.bound.as_ref()
    }

    /// The display endpoint (tests inspect recorded draws through this).
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Drive the loop forever against the wall clock.
    pub async fn run(&mut self) {
        loop {
            let outcome = self.step(now_millis()).await;
            if !outcome.sleep.is_zero() {
                tokio::time::sleep(outcome.sleep).await;
            }
        }
    }

    /// Execute the active state's bounded unit of work.
    pub async fn step(&mut self, now_ms: i64) -> StepOutcome {
        let before = self.persisted.clone();

        let (state, sleep) = match self.persisted.state {
            DeviceState::Init => self.step_init().await,
            DeviceState::WifiConnect => self.step_connect().await,
            DeviceState::Fetch => self.step_fetch(now_ms).await,
            DeviceState::Render => self.step_render(now_ms).await,
            DeviceState::Idle => self.step_idle(),
            DeviceState::Error => self.step_error().await,
            DeviceState::PairingMode => self.step_pairing(now_ms).await,
            DeviceState::SetupRequired => self.step_setup_required().await,
        };

        tracing::debug!(from = ?before.state, to = ?state, sleep_ms = sleep.as_millis() as u64, "device transition");
        self.persisted.state = state;
        if self.persisted != before {
            self.persist().await;
        }

        StepOutcome { state, sleep }
    }

    async fn step_init(&mut self) -> (DeviceState, Duration) {
        // Boot screen failures are not worth an error cycle before we even
        // have a network.
        if let Err(e) = self.bounded(self.display.show_screen(StaticScreen::Boot)).await {
            tracing::warn!(error = %e, "boot screen failed");
        }
        (DeviceState::WifiConnect, Duration::ZERO)
    }

    async fn step_connect(&mut self) -> (DeviceState, Duration) {
        if let Err(e) = self.bounded(self.link.connect()).await {
            self.connect_failures += 1;
            tracing::warn!(error = %e, attempt = self.connect_failures, "connect failed");

            if self.connect_failures >= self.config.connect_attempts {
                self.connect_failures = 0;
                self.persisted.error_count = self.persisted.error_count.saturating_add(1);
                return (DeviceState::Error, Duration::ZERO);
            }
            return (DeviceState::WifiConnect, self.config.connect_retry);
        }

        self.connect_failures = 0;
        if self.bound.is_some() {
            (DeviceState::Fetch, Duration::ZERO)
        } else {
            // Network is up but nothing binds us to a server yet.
            (DeviceState::PairingMode, Duration::ZERO)
        }
    }

    async fn step_fetch(&mut self, now_ms: i64) -> (DeviceState, Duration) {
        let needs_full = self.needs_full(now_ms);
        let token = self.device_token();

        let zone_ids = self.config.zones.clone();
        let mut pending = Vec::new();
        let mut successes = 0usize;

        for zone in &zone_ids {
            let request = ZoneRequest {
                zone: zone.clone(),
                device_token: token.clone(),
                force: needs_full,
            };

            match self.bounded(self.zones.fetch_zone(&request)).await {
                Ok(ZoneReply::NotModified { .. }) => {
                    successes += 1;
                }
                Ok(ZoneReply::Payload { bytes, rect, .. }) => {
                    if bytes.len() > limits::MAX_ZONE_BYTES {
                        tracing::warn!(zone = %zone, len = bytes.len(), "zone payload over limit, skipped");
                        continue;
                    }
                    match codec::decode(&bytes) {
                        Ok(raster) => {
                            pending.push(PendingZone { rect, raster });
                            successes += 1;
                        }
                        Err(e) => {
                            // One malformed zone degrades that zone only.
                            tracing::warn!(zone = %zone, error = %e, "zone payload malformed, skipped");
                        }
                    }
                }
                Err(DeviceError::Fetch(ZoneFetchError::ConfigurationMissing)) => {
                    tracing::info!("server reports configuration missing");
                    return (DeviceState::SetupRequired, Duration::ZERO);
                }
                Err(e) => {
                    tracing::warn!(zone = %zone, error = %e, "zone fetch failed");
                }
            }
        }

        if successes == 0 {
            self.persisted.error_count = self.persisted.error_count.saturating_add(1);
            return (DeviceState::Error, Duration::ZERO);
        }

        self.persisted.error_count = 0;
        self.persisted.last_success_ms = Some(now_ms);
        self.pending = pending;
        self.pending_full = needs_full;

        if self.pending.is_empty() {
            // Everything unchanged: nothing to draw this cycle.
            (DeviceState::Idle, Duration::ZERO)
        } else {
            (DeviceState::Render, Duration::ZERO)
        }
    }

    async fn step_render(&mut self, now_ms: i64) -> (DeviceState, Duration) {
        let pending = std::mem::take(&mut self.pending);

        for zone in &pending {
            if let Err(e) = self.bounded(self.display.draw_zone(zone.rect, &zone.raster)).await {
                tracing::warn!(error = %e, "draw failed");
                self.persisted.error_count = self.persisted.error_count.saturating_add(1);
                return (DeviceState::Error, Duration::ZERO);
            }
        }

        let flush = if self.pending_full {
            self.bounded(self.display.refresh_full()).await
        } else {
            self.bounded(self.display.refresh_partial()).await
        };
        if let Err(e) = flush {
            tracing::warn!(error = %e, "refresh failed");
            self.persisted.error_count = self.persisted.error_count.saturating_add(1);
            return (DeviceState::Error, Duration::ZERO);
        }

        if self.pending_full {
            self.persisted.refresh_count = 0;
            self.last_full_refresh_ms = Some(now_ms);
            self.initial_draw_done = true;
        } else {
            self.persisted.refresh_count = self.persisted.refresh_count.saturating_add(1);
        }

        (DeviceState::Idle, Duration::ZERO)
    }

    fn step_idle(&mut self) -> (DeviceState, Duration) {
        (DeviceState::WifiConnect, self.config.refresh_interval)
    }

    async fn step_error(&mut self) -> (DeviceState, Duration) {
        let retry_in = self.config.backoff_delay(self.persisted.error_count);
        if let Err(e) = self
            .bounded(
                self.display
                    .show_screen(StaticScreen::ConnectionError { retry_in }),
            )
            .await
        {
            tracing::warn!(error = %e, "error screen failed");
        }
        (DeviceState::WifiConnect, retry_in)
    }

    async fn step_setup_required(&mut self) -> (DeviceState, Duration) {
        if let Err(e) = self
            .bounded(self.display.show_screen(StaticScreen::SetupRequired))
            .await
        {
            tracing::warn!(error = %e, "setup screen failed");
        }

        // The server disowned our binding; drop it so the next connected
        // visit re-enters pairing.
        if self.bound.take().is_some() {
            if let Err(e) = self.store.delete(BOUND_CONFIG_KEY).await {
                tracing::warn!(error = %e, "could not clear bound config");
            }
        }

        (DeviceState::WifiConnect, self.config.setup_cooldown)
    }

    async fn step_pairing(&mut self, now_ms: i64) -> (DeviceState, Duration) {
        let Some(code) = self.pairing_code.clone() else {
            return self.start_pairing_session(now_ms).await;
        };

        // Window lapsed: drop the dead code and go back through the
        // connect state; re-entering pairing mints a fresh code.
        let started = self.pairing_started_ms.unwrap_or(now_ms);
        if now_ms - started >= self.config.pairing_window.as_millis() as i64 {
            tracing::info!(code = %code, "pairing window lapsed");
            self.pairing_code = None;
            self.pairing_started_ms = None;
            return (DeviceState::WifiConnect, Duration::ZERO);
        }

        match self.bounded(self.pairing.poll(&code)).await {
            Ok(PollResponse::Paired {
                webhook_url,
                config,
            }) => {
                let bound = BoundConfig {
                    webhook_url,
                    config,
                };
                match serde_json::to_vec(&bound) {
                    Ok(bytes) => {
                        if let Err(e) = self.store.set(BOUND_CONFIG_KEY, &bytes).await {
                            tracing::warn!(error = %e, "could not persist bound config");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "bound config unserializable"),
                }
                self.bound = Some(bound);
                self.pairing_code = None;
                self.pairing_started_ms = None;

                // Fresh binding: next render is a full redraw.
                self.persisted.refresh_count = 0;
                self.initial_draw_done = false;

                if let Err(e) = self.bounded(self.display.show_screen(StaticScreen::Paired)).await {
                    tracing::warn!(error = %e, "paired screen failed");
                }
                tracing::info!("device paired");
                (DeviceState::WifiConnect, Duration::ZERO)
            }
            Ok(PollResponse::Waiting) => {
                (DeviceState::PairingMode, self.config.pairing_poll_interval)
            }
            Ok(PollResponse::NotFound) => {
                // The server already purged this code; start over.
                self.pairing_code = None;
                (DeviceState::PairingMode, Duration::ZERO)
            }
            Err(e) => {
                tracing::warn!(error = %e, "pairing poll failed");
                self.persisted.error_count = self.persisted.error_count.saturating_add(1);
                (DeviceState::Error, Duration::ZERO)
            }
        }
    }

    async fn start_pairing_session(&mut self, now_ms: i64) -> (DeviceState, Duration) {
        match self.bounded(self.pairing.create_code()).await {
            Ok(code) => {
                if let Err(e) = self
                    .bounded(
                        self.display
                            .show_screen(StaticScreen::Pairing { code: code.clone() }),
                    )
                    .await
                {
                    tracing::warn!(error = %e, "pairing screen failed");
                }
                tracing::info!(code = %code, "pairing session started");
                self.pairing_code = Some(code);
                self.pairing_started_ms = Some(now_ms);
                (DeviceState::PairingMode, self.config.pairing_poll_interval)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not obtain pairing code");
                self.persisted.error_count = self.persisted.error_count.saturating_add(1);
                (DeviceState::Error, Duration::ZERO)
            }
        }
    }

    /// Whether this cycle must redraw the whole panel.
    fn needs_full(&self, now_ms: i64) -> bool {
        if !self.initial_draw_done {
            return true;
        }
        if self.persisted.refresh_count >= self.config.max_partial_before_full {
            return true;
        }
        match self.last_full_refresh_ms {
            Some(t) => now_ms - t >= self.config.full_refresh_interval.as_millis() as i64,
            None => true,
        }
    }

    /// The opaque credential sent with zone requests.
    fn device_token(&self) -> Option<String> {
        self.bound.as_ref().map(|b| b.device_token().to_string())
    }

    /// Run a fallible endpoint future under the operation timeout.
    async fn bounded<T, E, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        DeviceError: From<E>,
    {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DeviceError::from(e)),
            Err(_) => Err(DeviceError::Timeout(self.config.op_timeout)),
        }
    }

    /// Write the state record; a store failure must not take down the loop.
    async fn persist(&self) {
        if let Err(e) = self.store.set(STATE_KEY, &self.persisted.encode()).await {
            tracing::warn!(error = %e, "state persist failed");
        }
    }
}

/// Current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
