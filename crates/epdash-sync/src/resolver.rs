//! Zone resolution.
//!
//! Maps a requested zone id to rendered content. The policy here is the
//! protocol's load-bearing decision logic:
//!
//! - a primitive id renders directly, or degrades to blank if the snapshot
//!   has nothing for it;
//! - a composite id takes the *first* subzone (declared order) that renders
//!   content, drawn at the composite's own rectangle;
//! - the reserved divider id always yields the canonical divider raster;
//! - a composite with no renderable subzone yields the canonical blank
//!   raster at its own dimensions.
//!
//! Coarse firmware requests therefore never fail - they degrade visually
//! while the display layout stays intact. Only an id missing from the table
//! is an error.

use epdash_core::{DashboardSnapshot, Raster, ZoneId, ZoneRect};

use crate::error::{Result, SyncError};
use crate::render::render_primitive;
use crate::table::{CompositeZone, ZoneDef, ZoneTable, DIVIDER_ZONE_ID};

/// A resolved zone: pixels plus the rectangle they belong to.
#[derive(Debug, Clone)]
pub struct RenderedZone {
    pub rect: ZoneRect,
    pub raster: Raster,
}

/// Resolves zone ids against a layout table.
pub struct ZoneResolver {
    table: ZoneTable,
}

impl ZoneResolver {
    pub fn new(table: ZoneTable) -> Self {
        Self { table }
    }

    /// The layout table this resolver serves.
    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Resolve a zone id under the given snapshot.
    pub fn resolve(&self, zone: &ZoneId, snapshot: &DashboardSnapshot) -> Result<RenderedZone> {
        let def = self
            .table
            .lookup(zone)
            .ok_or_else(|| SyncError::UnknownZone(zone.clone()))?;

        match def {
            ZoneDef::Primitive(p) => {
                let raster = render_primitive(p.kind, p.rect.w, p.rect.h, snapshot)
                    .unwrap_or_else(|| Raster::blank(p.rect.w, p.rect.h));
                Ok(RenderedZone {
                    rect: p.rect,
                    raster,
                })
            }
            ZoneDef::Composite(c) => Ok(self.resolve_composite(c, snapshot)),
        }
    }

    fn resolve_composite(&self, composite: &CompositeZone, snapshot: &DashboardSnapshot) -> RenderedZone {
        let rect = composite.rect;

        if composite.id.as_str() == DIVIDER_ZONE_ID {
            return RenderedZone {
                rect,
                raster: Raster::divider(rect.w, rect.h),
            };
        }

        for sub_id in &composite.subzones {
            let Some(sub) = self.table.primitive(sub_id) else {
                // A dangling subzone reference is a table defect; skip it
                // rather than blanking a zone that later entries could fill.
                tracing::warn!(composite = %composite.id, subzone = %sub_id, "composite references unknown primitive");
                continue;
            };
            if let Some(raster) = render_primitive(sub.kind, rect.w, rect.h, snapshot) {
                tracing::debug!(composite = %composite.id, subzone = %sub_id, "composite resolved");
                return RenderedZone { rect, raster };
            }
        }

        tracing::debug!(composite = %composite.id, "composite degraded to blank");
        RenderedZone {
            rect,
            raster: Raster::blank(rect.w, rect.h),
        }
    }
}

impl Default for ZoneResolver {
    fn default() -> Self {
        Self::new(ZoneTable::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epdash_core::{JourneyLeg, LegKind};

    fn snapshot_with_tram_only() -> DashboardSnapshot {
        let mut s = DashboardSnapshot::empty(0);
        s.legs.push(JourneyLeg {
            kind: LegKind::Tram,
            label: "ROUTE 19".into(),
            departs_in_min: Some(3),
            duration_min: 14,
        });
        s
    }

    #[test]
    fn test_unknown_zone_errors() {
        let resolver = ZoneResolver::default();
        let err = resolver
            .resolve(&ZoneId::new("bogus"), &DashboardSnapshot::empty(0))
            .unwrap_err();
        assert!(matches!(err, SyncError::UnknownZone(_)));
    }

    #[test]
    fn test_primitive_resolves_at_own_rect() {
        let resolver = ZoneResolver::default();
        let zone = resolver
            .resolve(&ZoneId::new("time"), &DashboardSnapshot::empty(0))
            .unwrap();
        assert_eq!(zone.rect, ZoneRect::new(20, 45, 180, 70));
        assert_eq!(zone.raster.width(), 180);
        assert!(!zone.raster.is_all_white());
    }

    #[test]
    fn test_unresolvable_primitive_degrades_to_blank() {
        let resolver = ZoneResolver::default();
        let zone = resolver
            .resolve(&ZoneId::new("weather"), &DashboardSnapshot::empty(0))
            .unwrap();
        assert!(zone.raster.is_all_white());
        assert_eq!(zone.rect, ZoneRect::new(620, 10, 160, 95));
    }

    #[test]
    fn test_divider_ignores_snapshot() {
        let resolver = ZoneResolver::default();
        let a = resolver
            .resolve(&ZoneId::new("divider"), &DashboardSnapshot::empty(0))
            .unwrap();
        let b = resolver
            .resolve(&ZoneId::new("divider"), &snapshot_with_tram_only())
            .unwrap();
        assert_eq!(a.raster, b.raster);
        assert_eq!(a.raster, Raster::divider(800, 2));
    }

    #[test]
    fn test_composite_takes_first_renderable_subzone() {
        let resolver = ZoneResolver::default();
        // legs = [trains, trams]; only a tram leg exists, so trams wins.
        let via_composite = resolver
            .resolve(&ZoneId::new("legs"), &snapshot_with_tram_only())
            .unwrap();
        assert_eq!(via_composite.rect, ZoneRect::new(0, 132, 800, 316));
        assert!(!via_composite.raster.is_all_white());
        // Rendered at the composite's dimensions, not the subzone's.
        assert_eq!(via_composite.raster.width(), 800);
        assert_eq!(via_composite.raster.height(), 316);
    }

    #[test]
    fn test_composite_prefers_earlier_subzone() {
        let resolver = ZoneResolver::default();
        let mut s = snapshot_with_tram_only();
        s.legs.insert(
            0,
            JourneyLeg {
                kind: LegKind::Train,
                label: "CRAIGIEBURN".into(),
                departs_in_min: Some(4),
                duration_min: 22,
            },
        );

        let with_train = resolver.resolve(&ZoneId::new("legs"), &s).unwrap();
        let tram_only = resolver
            .resolve(&ZoneId::new("legs"), &snapshot_with_tram_only())
            .unwrap();
        // Train board and tram board draw differently, so preferring the
        // first subzone is observable.
        assert_ne!(with_train.raster, tram_only.raster);
    }

    #[test]
    fn test_all_unresolvable_composite_is_canonical_blank() {
        let resolver = ZoneResolver::default();
        let zone = resolver
            .resolve(&ZoneId::new("legs"), &DashboardSnapshot::empty(0))
            .unwrap();
        assert_eq!(zone.raster, Raster::blank(800, 316));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = ZoneResolver::default();
        let s = snapshot_with_tram_only();
        let a = resolver.resolve(&ZoneId::new("legs"), &s).unwrap();
        let b = resolver.resolve(&ZoneId::new("legs"), &s).unwrap();
        assert_eq!(a.raster, b.raster);
    }
}
