//! End-to-end protocol scenarios.
//!
//! The device state machine runs against a real in-process server through
//! the loopback endpoints: provisioning, zone sync, idle cadence, and the
//! failure branches, with the virtual panel standing in for the display.

use std::sync::Arc;

use anyhow::Result;

use epdash::core::{codec, DashboardSnapshot, JourneyLeg, LegKind, WeatherView};
use epdash::device::{DeviceConfig, DeviceMachine, DeviceState};
use epdash::store::{DeviceKey, MemoryStateStore};
use epdash::{
    LoopbackEndpoint, PanelEvent, Server, ServerConfig, SharedSnapshot, SubmitRequest,
    SubmitResponse, VirtualPanel, ZoneReply, ZoneRequest, ZoneRect,
};

type TestServer = Server<Arc<SharedSnapshot>>;
type TestMachine = DeviceMachine<
    LoopbackEndpoint<Arc<SharedSnapshot>>,
    LoopbackEndpoint<Arc<SharedSnapshot>>,
    LoopbackEndpoint<Arc<SharedSnapshot>>,
    VirtualPanel,
    Arc<MemoryStateStore>,
>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sample_snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        generated_at_ms: 1_736_000_000_000,
        hour: 8,
        minute: 15,
        weather: Some(WeatherView {
            temp_c: 21,
            summary: "CLEAR".into(),
        }),
        legs: vec![
            JourneyLeg {
                kind: LegKind::Walk,
                label: "TO STATION".into(),
                departs_in_min: None,
                duration_min: 7,
            },
            JourneyLeg {
                kind: LegKind::Train,
                label: "CRAIGIEBURN".into(),
                departs_in_min: Some(4),
                duration_min: 22,
            },
            JourneyLeg {
                kind: LegKind::Coffee,
                label: String::new(),
                departs_in_min: None,
                duration_min: 6,
            },
        ],
        status: Some("ON TIME".into()),
    }
}

struct Harness {
    snapshot: Arc<SharedSnapshot>,
    server: Arc<TestServer>,
    endpoint: LoopbackEndpoint<Arc<SharedSnapshot>>,
    store: Arc<MemoryStateStore>,
}

impl Harness {
    fn new() -> Self {
        let snapshot = Arc::new(SharedSnapshot::new(sample_snapshot()));
        let server = Arc::new(Server::new(Arc::clone(&snapshot), ServerConfig::default()));
        let endpoint = LoopbackEndpoint::new(Arc::clone(&server));
        Self {
            snapshot,
            server,
            endpoint,
            store: Arc::new(MemoryStateStore::new()),
        }
    }

    async fn boot_machine(&self) -> Result<TestMachine> {
        let machine = DeviceMachine::boot(
            DeviceConfig::default(),
            self.endpoint.clone(),
            self.endpoint.clone(),
            self.endpoint.clone(),
            VirtualPanel::new(),
            Arc::clone(&self.store),
        )
        .await?;
        Ok(machine)
    }

    /// The code currently shown on the pairing screen.
    fn displayed_code(machine: &TestMachine) -> String {
        let screen = machine
            .display()
            .last_screen()
            .expect("a screen should have been shown");
        let start = screen
            .find("PairingCode(")
            .expect("pairing screen should carry the code")
            + "PairingCode(".len();
        screen[start..start + 6].to_string()
    }
}

#[tokio::test]
async fn test_cold_boot_provisions_then_renders() -> Result<()> {
    init_tracing();
    let harness = Harness::new();
    let mut machine = harness.boot_machine().await?;

    // Init -> WifiConnect -> PairingMode (connected, nothing bound).
    assert_eq!(machine.step(0).await.state, DeviceState::WifiConnect);
    assert_eq!(machine.step(0).await.state, DeviceState::PairingMode);

    // The device mints a code and shows it.
    machine.step(0).await;
    let code = Harness::displayed_code(&machine);

    // Still waiting before the wizard runs.
    assert_eq!(machine.step(1_000).await.state, DeviceState::PairingMode);

    // The wizard posts configuration for that code.
    let response = harness.server.submit_config(
        &code,
        SubmitRequest {
            webhook_url: "https://dash.example/api/device/tok-e2e".into(),
            config: serde_json::json!({"layout": "v11"}),
        },
        2_000,
    );
    assert_eq!(response, SubmitResponse::Configured);

    // Next poll binds the device and hands control back to the connect
    // state; the device identifies as tok-e2e from here on.
    assert_eq!(machine.step(3_000).await.state, DeviceState::WifiConnect);
    assert_eq!(
        machine.bound_config().unwrap().webhook_url,
        "https://dash.example/api/device/tok-e2e"
    );
    assert!(harness.server.is_configured("tok-e2e"));

    // First cycle: fetch, full render, idle.
    assert_eq!(machine.step(4_000).await.state, DeviceState::Fetch);
    assert_eq!(machine.step(4_000).await.state, DeviceState::Render);
    assert_eq!(machine.step(4_000).await.state, DeviceState::Idle);

    let events = machine.display().events();
    assert!(events.iter().any(|e| matches!(e, PanelEvent::Draw(_))));
    assert!(events.contains(&PanelEvent::RefreshFull));
    assert!(!machine.display().canvas().is_all_white());

    // The server now tracks this device's partition.
    assert!(harness
        .server
        .dispatcher()
        .cache()
        .tracks_device(&DeviceKey::from_token(Some("tok-e2e"))));
    Ok(())
}

#[tokio::test]
async fn test_unchanged_snapshot_sends_no_bytes_twice() -> Result<()> {
    init_tracing();
    let harness = Harness::new();

    // Zone "header" (0,0,800,94) twice from an unchanged snapshot, then a
    // third time with the force flag.
    let request = ZoneRequest::new("header");
    let first = harness.server.fetch_zone(&request).await?;
    let second = harness.server.fetch_zone(&request).await?;

    let ZoneReply::Payload { rect, .. } = &first else {
        panic!("first fetch must carry bytes");
    };
    assert_eq!(*rect, ZoneRect::new(0, 0, 800, 94));
    assert!(matches!(second, ZoneReply::NotModified { .. }));
    assert_eq!(first.fingerprint(), second.fingerprint());

    let forced = harness.server.fetch_zone(&request.clone().forced()).await?;
    let ZoneReply::Payload { bytes, rect, .. } = forced else {
        panic!("forced fetch must carry bytes");
    };
    assert_eq!(rect, ZoneRect::new(0, 0, 800, 94));
    let raster = codec::decode(&bytes)?;
    assert_eq!((raster.width(), raster.height()), (800, 94));
    Ok(())
}

#[tokio::test]
async fn test_steady_state_cycle_idles_without_redraw() -> Result<()> {
    init_tracing();
    let harness = Harness::new();
    let mut machine = provisioned_machine(&harness).await?;

    run_cycle(&mut machine, 10_000).await;
    let draws_after_first = draw_count(&machine);

    // Second cycle with an unchanged snapshot: everything NotModified, so
    // the machine goes straight to Idle and nothing new is drawn.
    let final_state = run_cycle(&mut machine, 40_000).await;
    assert_eq!(final_state, DeviceState::Idle);
    assert_eq!(draw_count(&machine), draws_after_first);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_change_triggers_partial_redraw() -> Result<()> {
    init_tracing();
    let harness = Harness::new();
    let mut machine = provisioned_machine(&harness).await?;
    run_cycle(&mut machine, 10_000).await;

    // The clock ticks over; the header zone's content changes.
    let mut changed = sample_snapshot();
    changed.minute = 16;
    harness.snapshot.set(changed);

    let final_state = run_cycle(&mut machine, 40_000).await;
    assert_eq!(final_state, DeviceState::Idle);
    assert!(machine.display().events().contains(&PanelEvent::RefreshPartial));
    assert_eq!(machine.refresh_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_revoked_configuration_forces_re_pairing() -> Result<()> {
    init_tracing();
    let harness = Harness::new();
    let mut machine = provisioned_machine(&harness).await?;
    run_cycle(&mut machine, 10_000).await;

    harness.server.revoke_device("tok-e2e");

    // Next cycle: the fetch gets ConfigurationMissing and the machine
    // shows its setup screen instead of an error screen.
    machine.step(40_000).await; // Idle -> WifiConnect
    machine.step(40_000).await; // -> Fetch
    assert_eq!(machine.step(40_000).await.state, DeviceState::SetupRequired);
    assert_eq!(machine.step(40_000).await.state, DeviceState::WifiConnect);
    assert!(machine
        .display()
        .last_screen()
        .unwrap()
        .contains("SetupRequired"));
    assert!(machine.bound_config().is_none());

    // And with the binding gone, the device re-enters pairing.
    assert_eq!(machine.step(41_000).await.state, DeviceState::PairingMode);
    Ok(())
}

#[tokio::test]
async fn test_server_side_code_expiry_regenerates() -> Result<()> {
    init_tracing();
    let harness = Harness::new();
    let mut machine = harness.boot_machine().await?;

    machine.step(0).await; // Init
    machine.step(0).await; // -> PairingMode
    machine.step(0).await; // code minted at registry time 0
    let first_code = Harness::displayed_code(&machine);

    // Age the registry past the pairing TTL; the session purges lazily.
    harness.endpoint.set_now(700_000);
    // Poll finds nothing server-side; the device drops its code and the
    // next step mints a fresh session.
    assert_eq!(machine.step(10_000).await.state, DeviceState::PairingMode);
    machine.step(11_000).await;
    let second_code = Harness::displayed_code(&machine);
    assert_eq!(second_code.len(), 6);
    assert_ne!(first_code, second_code);
    Ok(())
}

// ── helpers ─────────────────────────────────────────────────────────────

/// Boot a machine and walk it through pairing as device `tok-e2e`.
async fn provisioned_machine(harness: &Harness) -> Result<TestMachine> {
    let mut machine = harness.boot_machine().await?;
    machine.step(0).await;
    machine.step(0).await;
    machine.step(0).await;
    let code = Harness::displayed_code(&machine);
    harness.server.submit_config(
        &code,
        SubmitRequest {
            webhook_url: "https://dash.example/api/device/tok-e2e".into(),
            config: serde_json::json!({}),
        },
        1_000,
    );
    machine.step(2_000).await;
    assert_eq!(machine.state(), DeviceState::WifiConnect);
    Ok(machine)
}

/// Drive one refresh cycle (connect through idle) and return the state the
/// machine settles in.
async fn run_cycle(machine: &mut TestMachine, now_ms: i64) -> DeviceState {
    let mut state = machine.step(now_ms).await.state;
    for _ in 0..4 {
        if state == DeviceState::Idle
            || state == DeviceState::Error
            || state == DeviceState::SetupRequired
        {
            break;
        }
        state = machine.step(now_ms).await.state;
    }
    state
}

fn draw_count(machine: &TestMachine) -> usize {
    machine
        .display()
        .events()
        .iter()
        .filter(|e| matches!(e, PanelEvent::Draw(_)))
        .count()
}
