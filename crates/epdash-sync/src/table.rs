//! The zone table: the fixed layout registry.
//!
//! Primitive zones are the fine rectangles the renderer knows how to fill.
//! Composite zones are the coarse ids older firmware requests; each one
//! aggregates an ordered list of primitive ids and resolves to the first of
//! them that produces content. Rectangles are immutable per id.

use epdash_core::{ZoneId, ZoneRect};

/// The reserved composite id that always renders the canonical divider
/// raster, regardless of snapshot.
pub const DIVIDER_ZONE_ID: &str = "divider";

/// What a primitive zone shows. Rendering matches exhaustively on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Header clock (HH:MM).
    Clock,
    /// Current conditions and temperature.
    Weather,
    /// One-line journey summary across all legs.
    JourneySummary,
    /// Next train leg.
    Trains,
    /// Next tram leg.
    Trams,
    /// Coffee window.
    Coffee,
    /// Footer status bar.
    Status,
}

/// A primitive zone: a rectangle the renderer fills directly.
#[derive(Debug, Clone)]
pub struct PrimitiveZone {
    pub id: ZoneId,
    pub rect: ZoneRect,
    pub kind: PrimitiveKind,
}

/// A composite zone: a coarse id resolving to one of several primitives.
#[derive(Debug, Clone)]
pub struct CompositeZone {
    pub id: ZoneId,
    pub rect: ZoneRect,
    /// Primitive ids in resolution priority order. First renderable wins;
    /// the order here is part of the protocol contract.
    pub subzones: Vec<ZoneId>,
}

/// A lookup result.
#[derive(Debug, Clone, Copy)]
pub enum ZoneDef<'a> {
    Primitive(&'a PrimitiveZone),
    Composite(&'a CompositeZone),
}

impl ZoneDef<'_> {
    /// The zone's own rectangle.
    pub fn rect(&self) -> ZoneRect {
        match self {
            ZoneDef::Primitive(p) => p.rect,
            ZoneDef::Composite(c) => c.rect,
        }
    }
}

/// The layout registry for one dashboard design.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    primitives: Vec<PrimitiveZone>,
    composites: Vec<CompositeZone>,
}

impl ZoneTable {
    /// Build a table from explicit zone lists. Callers are expected to keep
    /// ids unique; the standard table below is the shipped layout.
    pub fn new(primitives: Vec<PrimitiveZone>, composites: Vec<CompositeZone>) -> Self {
        Self {
            primitives,
            composites,
        }
    }

    /// The shipped 800x480 dashboard layout.
    ///
    /// Fine rectangles are the renderer's native grid; coarse rectangles
    /// are the bands firmware addresses. Both sets are fixed per design
    /// revision and never change at runtime.
    pub fn standard() -> Self {
        let primitives = vec![
            PrimitiveZone {
                id: ZoneId::new("time"),
                rect: ZoneRect::new(20, 45, 180, 70),
                kind: PrimitiveKind::Clock,
            },
            PrimitiveZone {
                id: ZoneId::new("weather"),
                rect: ZoneRect::new(620, 10, 160, 95),
                kind: PrimitiveKind::Weather,
            },
            PrimitiveZone {
                id: ZoneId::new("journey"),
                rect: ZoneRect::new(20, 96, 760, 28),
                kind: PrimitiveKind::JourneySummary,
            },
            PrimitiveZone {
                id: ZoneId::new("trains"),
                rect: ZoneRect::new(20, 155, 370, 150),
                kind: PrimitiveKind::Trains,
            },
            PrimitiveZone {
                id: ZoneId::new("trams"),
                rect: ZoneRect::new(410, 155, 370, 150),
                kind: PrimitiveKind::Trams,
            },
            PrimitiveZone {
                id: ZoneId::new("coffee"),
                rect: ZoneRect::new(20, 315, 760, 65),
                kind: PrimitiveKind::Coffee,
            },
            PrimitiveZone {
                id: ZoneId::new("status"),
                rect: ZoneRect::new(0, 445, 800, 35),
                kind: PrimitiveKind::Status,
            },
        ];

        let composites = vec![
            CompositeZone {
                id: ZoneId::new("header"),
                rect: ZoneRect::new(0, 0, 800, 94),
                subzones: vec![ZoneId::new("time"), ZoneId::new("weather")],
            },
            CompositeZone {
                id: ZoneId::new(DIVIDER_ZONE_ID),
                rect: ZoneRect::new(0, 94, 800, 2),
                subzones: vec![],
            },
            CompositeZone {
                id: ZoneId::new("summary"),
                rect: ZoneRect::new(0, 96, 800, 28),
                subzones: vec![ZoneId::new("journey"), ZoneId::new("coffee")],
            },
            CompositeZone {
                id: ZoneId::new("legs"),
                rect: ZoneRect::new(0, 132, 800, 316),
                subzones: vec![ZoneId::new("trains"), ZoneId::new("trams")],
            },
            CompositeZone {
                id: ZoneId::new("footer"),
                rect: ZoneRect::new(0, 448, 800, 32),
                subzones: vec![ZoneId::new("status")],
            },
        ];

        Self::new(primitives, composites)
    }

    /// Look up a zone id. Primitives shadow composites on id collision,
    /// which the shipped layout never has.
    pub fn lookup(&self, id: &ZoneId) -> Option<ZoneDef<'_>> {
        if let Some(p) = self.primitives.iter().find(|p| &p.id == id) {
            return Some(ZoneDef::Primitive(p));
        }
        self.composites
            .iter()
            .find(|c| &c.id == id)
            .map(ZoneDef::Composite)
    }

    /// Look up a primitive zone by id.
    pub fn primitive(&self, id: &ZoneId) -> Option<&PrimitiveZone> {
        self.primitives.iter().find(|p| &p.id == id)
    }

    /// The zone's rectangle, primitive or composite.
    pub fn rect_of(&self, id: &ZoneId) -> Option<ZoneRect> {
        self.lookup(id).map(|def| def.rect())
    }

    /// The coarse zone set a device fetches each cycle, in draw order.
    pub fn device_zone_list(&self) -> Vec<ZoneId> {
        self.composites.iter().map(|c| c.id.clone()).collect()
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::standard()
    }
}
