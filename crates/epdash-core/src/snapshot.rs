//! The dashboard snapshot: the server-computed view model.
//!
//! A snapshot is produced by external collaborators (transit and weather
//! retrieval, commute timing) and consumed opaquely here: it carries every
//! field any zone could need, is immutable for the duration of one dispatch
//! call, and is discarded afterwards.

use serde::{Deserialize, Serialize};

/// Journey leg mode. A closed enumeration: rendering matches exhaustively
/// on this, so adding a mode is a compile-time-checked change rather than a
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegKind {
    Walk,
    Train,
    Tram,
    Bus,
    Coffee,
}

impl LegKind {
    /// Short upper-case label used in rendered zone titles.
    pub fn label(&self) -> &'static str {
        match self {
            LegKind::Walk => "WALK",
            LegKind::Train => "TRAIN",
            LegKind::Tram => "TRAM",
            LegKind::Bus => "BUS",
            LegKind::Coffee => "COFFEE",
        }
    }
}

/// One leg of the commute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyLeg {
    pub kind: LegKind,
    /// Route or destination text ("CRAIGIEBURN", "ROUTE 19", ...).
    pub label: String,
    /// Minutes until departure; `None` for untimed legs (walk, coffee).
    pub departs_in_min: Option<u16>,
    /// Leg duration in minutes.
    pub duration_min: u16,
}

/// Current weather, when the upstream producer had it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherView {
    pub temp_c: i16,
    /// Short condition text ("CLEAR", "RAIN").
    pub summary: String,
}

/// Everything needed to render any zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// When the producer assembled this snapshot (Unix ms).
    pub generated_at_ms: i64,
    /// Local wall-clock hour (0-23) and minute, for the header clock.
    pub hour: u8,
    pub minute: u8,
    pub weather: Option<WeatherView>,
    /// Commute legs in travel order.
    pub legs: Vec<JourneyLeg>,
    /// Footer status line, if any.
    pub status: Option<String>,
}

impl DashboardSnapshot {
    /// An empty snapshot: clock at midnight, nothing else. Every zone still
    /// resolves against it (to its blank fallback where needed).
    pub fn empty(generated_at_ms: i64) -> Self {
        Self {
            generated_at_ms,
            hour: 0,
            minute: 0,
            weather: None,
            legs: Vec::new(),
            status: None,
        }
    }

    /// Legs of one mode, in declared order.
    pub fn legs_of_kind(&self, kind: LegKind) -> impl Iterator<Item = &JourneyLeg> {
        self.legs.iter().filter(move |leg| leg.kind == kind)
    }
}
