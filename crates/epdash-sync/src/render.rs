//! Zone rasterization.
//!
//! Pure functions from (snapshot, target dimensions) to pixels. A renderer
//! returns `None` when the snapshot has nothing for it - that is the signal
//! composite resolution uses to fall through to the next subzone. Layout
//! constants here are part of the external display design, not of the
//! protocol's decision logic; what the protocol tests is *whether* a zone
//! resolves and that rendering is deterministic.

use epdash_core::{DashboardSnapshot, JourneyLeg, LegKind, Raster};

use crate::glyphs::{draw_text, text_width, GLYPH_H};
use crate::table::PrimitiveKind;

const MARGIN: i32 = 6;
const TITLE_SCALE: u32 = 2;
const BODY_SCALE: u32 = 4;

/// Render a primitive zone at the given dimensions. `None` means the zone
/// has no content under this snapshot.
pub fn render_primitive(
    kind: PrimitiveKind,
    w: u32,
    h: u32,
    snapshot: &DashboardSnapshot,
) -> Option<Raster> {
    match kind {
        PrimitiveKind::Clock => Some(render_clock(w, h, snapshot)),
        PrimitiveKind::Weather => render_weather(w, h, snapshot),
        PrimitiveKind::JourneySummary => render_journey_summary(w, h, snapshot),
        PrimitiveKind::Trains => render_board(LegKind::Train, w, h, snapshot),
        PrimitiveKind::Trams => render_board(LegKind::Tram, w, h, snapshot),
        PrimitiveKind::Coffee => render_board(LegKind::Coffee, w, h, snapshot),
        PrimitiveKind::Status => render_status(w, h, snapshot),
    }
}

/// Header clock. Always resolvable: a snapshot always carries a time.
fn render_clock(w: u32, h: u32, snapshot: &DashboardSnapshot) -> Raster {
    let mut raster = Raster::blank(w, h);
    let text = format!("{:02}:{:02}", snapshot.hour, snapshot.minute);

    // Largest integral scale that fits, centered.
    let scale = fit_scale(&text, w, h);
    let x = (w.saturating_sub(text_width(&text, scale))) as i32 / 2;
    let y = (h.saturating_sub(GLYPH_H * scale)) as i32 / 2;
    draw_text(&mut raster, x, y, scale, &text);
    raster
}

fn render_weather(w: u32, h: u32, snapshot: &DashboardSnapshot) -> Option<Raster> {
    let weather = snapshot.weather.as_ref()?;
    let mut raster = Raster::blank(w, h);

    draw_text(&mut raster, MARGIN, MARGIN, TITLE_SCALE, &weather.summary);
    let temp = format!("{}C", weather.temp_c);
    draw_text(
        &mut raster,
        MARGIN,
        MARGIN + (GLYPH_H * TITLE_SCALE) as i32 + 8,
        3,
        &temp,
    );
    Some(raster)
}

/// One-line summary of the whole commute: "WALK 7MIN - TRAIN 4MIN - ...".
fn render_journey_summary(w: u32, h: u32, snapshot: &DashboardSnapshot) -> Option<Raster> {
    if snapshot.legs.is_empty() {
        return None;
    }
    let line = snapshot
        .legs
        .iter()
        .map(summary_fragment)
        .collect::<Vec<_>>()
        .join(" - ");

    let mut raster = Raster::blank(w, h);
    let scale = fit_scale(&line, w, h);
    let y = (h.saturating_sub(GLYPH_H * scale)) as i32 / 2;
    draw_text(&mut raster, MARGIN, y, scale, &line);
    Some(raster)
}

/// A departure board for one mode: the first matching leg, as a card.
fn render_board(kind: LegKind, w: u32, h: u32, snapshot: &DashboardSnapshot) -> Option<Raster> {
    let leg = snapshot.legs_of_kind(kind).next()?;
    Some(leg_card(leg, w, h))
}

fn render_status(w: u32, h: u32, snapshot: &DashboardSnapshot) -> Option<Raster> {
    let status = snapshot.status.as_deref()?;
    let mut raster = Raster::blank(w, h);
    let scale = fit_scale(status, w, h);
    let y = (h.saturating_sub(GLYPH_H * scale)) as i32 / 2;
    draw_text(&mut raster, MARGIN, y, scale, status);
    Some(raster)
}

/// Render one leg as a card. Exhaustive over [`LegKind`]: adding a mode
/// fails compilation here until its card exists.
pub fn leg_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    match leg.kind {
        LegKind::Walk => walk_card(leg, w, h),
        LegKind::Train => train_card(leg, w, h),
        LegKind::Tram => tram_card(leg, w, h),
        LegKind::Bus => bus_card(leg, w, h),
        LegKind::Coffee => coffee_card(leg, w, h),
    }
}

/// Walk legs are untimed: duration only, no frame.
fn walk_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    let mut raster = Raster::blank(w, h);
    let title = format!("WALK {}", leg.label);
    draw_text(&mut raster, MARGIN, MARGIN, TITLE_SCALE, &title);
    let body = format!("{} MIN", leg.duration_min);
    draw_text(&mut raster, MARGIN, body_y(), BODY_SCALE, &body);
    raster
}

/// Train legs: double frame, departure countdown.
fn train_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    let mut raster = framed_card(w, h, 2);
    let title = format!("TRAIN {}", leg.label);
    draw_text(&mut raster, MARGIN + 4, MARGIN + 4, TITLE_SCALE, &title);
    draw_text(&mut raster, MARGIN + 4, body_y() + 4, BODY_SCALE, &departure_text(leg));
    raster
}

/// Tram legs: single frame, departure countdown.
fn tram_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    let mut raster = framed_card(w, h, 1);
    let title = format!("TRAM {}", leg.label);
    draw_text(&mut raster, MARGIN + 3, MARGIN + 3, TITLE_SCALE, &title);
    draw_text(&mut raster, MARGIN + 3, body_y() + 3, BODY_SCALE, &departure_text(leg));
    raster
}

/// Bus legs: single frame, route label leads.
fn bus_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    let mut raster = framed_card(w, h, 1);
    let title = format!("BUS {}", leg.label);
    draw_text(&mut raster, MARGIN + 3, MARGIN + 3, TITLE_SCALE, &title);
    draw_text(&mut raster, MARGIN + 3, body_y() + 3, BODY_SCALE, &departure_text(leg));
    raster
}

/// Coffee legs: the window, no frame.
fn coffee_card(leg: &JourneyLeg, w: u32, h: u32) -> Raster {
    let mut raster = Raster::blank(w, h);
    draw_text(&mut raster, MARGIN, MARGIN, TITLE_SCALE, "COFFEE");
    let body = format!("{} MIN WINDOW", leg.duration_min);
    draw_text(&mut raster, MARGIN, body_y(), TITLE_SCALE, &body);
    raster
}

/// Compact per-leg text for the journey summary line. Exhaustive over
/// [`LegKind`] like [`leg_card`].
fn summary_fragment(leg: &JourneyLeg) -> String {
    match leg.kind {
        LegKind::Walk => format!("WALK {}MIN", leg.duration_min),
        LegKind::Train => timed_fragment("TRAIN", leg),
        LegKind::Tram => timed_fragment("TRAM", leg),
        LegKind::Bus => timed_fragment("BUS", leg),
        LegKind::Coffee => format!("COFFEE {}MIN", leg.duration_min),
    }
}

fn timed_fragment(mode: &str, leg: &JourneyLeg) -> String {
    match leg.departs_in_min {
        Some(d) => format!("{} {}MIN", mode, d),
        None => format!("{} {}MIN", mode, leg.duration_min),
    }
}

fn departure_text(leg: &JourneyLeg) -> String {
    match leg.departs_in_min {
        Some(d) => format!("{} MIN", d),
        None => format!("{} MIN", leg.duration_min),
    }
}

fn framed_card(w: u32, h: u32, border: u32) -> Raster {
    let mut raster = Raster::blank(w, h);
    for i in 0..border as i32 {
        let inset = i * 2;
        let bw = w.saturating_sub(inset as u32 * 2);
        let bh = h.saturating_sub(inset as u32 * 2);
        if bw < 2 || bh < 2 {
            break;
        }
        raster.fill_rect(inset, inset, bw, 1, false);
        raster.fill_rect(inset, inset + bh as i32 - 1, bw, 1, false);
        raster.fill_rect(inset, inset, 1, bh, false);
        raster.fill_rect(inset + bw as i32 - 1, inset, 1, bh, false);
    }
    raster
}

fn body_y() -> i32 {
    MARGIN + (GLYPH_H * TITLE_SCALE) as i32 + 8
}

/// Largest integral scale at which `text` fits the box with margins, at
/// least 1.
fn fit_scale(text: &str, w: u32, h: u32) -> u32 {
    let unit_w = text_width(text, 1).max(1);
    let avail_w = w.saturating_sub(2 * MARGIN as u32);
    let avail_h = h.saturating_sub(2 * MARGIN as u32);
    (avail_w / unit_w).min(avail_h / GLYPH_H).max(1)
}
