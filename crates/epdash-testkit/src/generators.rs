//! Proptest strategies for protocol types.

use proptest::prelude::*;

use epdash_core::{
    DashboardSnapshot, JourneyLeg, LegKind, Orientation, Raster, WeatherView,
};

/// Either wire row order.
pub fn arb_orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::TopDown), Just(Orientation::BottomUp)]
}

/// Rasters up to 64x32 with arbitrary pixel content and orientation.
/// Widths deliberately cross byte boundaries to exercise row padding.
pub fn arb_raster() -> impl Strategy<Value = Raster> {
    (1u32..=64, 1u32..=32, arb_orientation())
        .prop_flat_map(|(width, height, orientation)| {
            let stride = ((width as usize) + 7) / 8;
            let len = stride * height as usize;
            (
                Just(width),
                Just(height),
                Just(orientation),
                proptest::collection::vec(any::<u8>(), len),
            )
        })
        .prop_map(|(width, height, orientation, rows)| {
            // from_packed_rows normalizes the pad bits, so any byte soup is
            // a valid raster.
            Raster::from_packed_rows(width, height, orientation, rows)
                .expect("length computed from dimensions")
        })
}

fn arb_leg_kind() -> impl Strategy<Value = LegKind> {
    prop_oneof![
        Just(LegKind::Walk),
        Just(LegKind::Train),
        Just(LegKind::Tram),
        Just(LegKind::Bus),
        Just(LegKind::Coffee),
    ]
}

fn arb_leg() -> impl Strategy<Value = JourneyLeg> {
    (
        arb_leg_kind(),
        "[A-Z0-9 ]{0,12}",
        proptest::option::of(0u16..120),
        1u16..90,
    )
        .prop_map(|(kind, label, departs_in_min, duration_min)| JourneyLeg {
            kind,
            label,
            departs_in_min,
            duration_min,
        })
}

/// Snapshots with 0-6 legs, optional weather, optional status.
pub fn arb_snapshot() -> impl Strategy<Value = DashboardSnapshot> {
    (
        0u8..24,
        0u8..60,
        proptest::option::of((-20i16..45, "[A-Z]{3,8}")),
        proptest::collection::vec(arb_leg(), 0..6),
        proptest::option::of("[A-Z ]{0,16}"),
    )
        .prop_map(|(hour, minute, weather, legs, status)| DashboardSnapshot {
            generated_at_ms: 1_736_000_000_000,
            hour,
            minute,
            weather: weather.map(|(temp_c, summary)| WeatherView { temp_c, summary }),
            legs,
            status,
        })
}
