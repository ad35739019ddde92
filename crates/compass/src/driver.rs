//! Per-frame orchestration: heading, membership sync, refresh and overflow.

use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::{
    catalog::{IconCatalog, Row},
    config::{Config, DisplaySettings},
    error::Result,
    geometry::{Vec3, bearing_from_north, format_distance, strip_offset_px},
    heading::HeadingTracker,
    overflow::{OverflowCandidate, OverflowResolver},
    poi::{PoiId, PoiSource},
    render::{FrameSnapshot, SlotSnapshot},
    slots::{BandSurface, ElevationIndicator, IconSurface, SlotId, SlotPool},
};

/// Per-frame input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Forward direction of the orientation reference (camera)
    pub reference_forward: Vec3,
    /// Position of the tracked viewer (player)
    pub tracked_position: Vec3,
}

/// Why a visible POI was not given a slot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    NotRegistered,
    NoKinds,
    NoRow,
    NoArt,
    NoFreeSlot,
}

/// What one `tick` did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub heading_emitted: bool,
    pub synced: bool,
    pub bound: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Left the display radius; their slots went back to the pool
    pub deactivated: usize,
    /// No longer registered with the source
    pub evicted: usize,
    pub positions_pushed: usize,
    pub displaced: usize,
    pub restored: usize,
}

impl FrameReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }
}

/// Owns the pool, tracker and resolver and drives them once per frame
#[derive(Debug)]
pub struct CompassDriver<Q, S, B> {
    settings: DisplaySettings,
    source: Q,
    catalog: IconCatalog,
    pool: SlotPool<S>,
    band: B,
    tracker: HeadingTracker,
    resolver: OverflowResolver,
    /// Viewer position at the last membership sync
    last_sync: Option<Vec3>,
    frame: u64,
}

impl<Q, S, B> CompassDriver<Q, S, B>
where
    Q: PoiSource,
    S: IconSurface,
    B: BandSurface,
{
    pub fn new(
        settings: DisplaySettings,
        source: Q,
        catalog: IconCatalog,
        pool: SlotPool<S>,
        band: B,
    ) -> Self {
        let resolver = OverflowResolver::new(settings.min_icon_spacing, settings.overflow_y_offset);
        Self {
            settings,
            source,
            catalog,
            pool,
            band,
            tracker: HeadingTracker::new(),
            resolver,
            last_sync: None,
            frame: 0,
        }
    }

    /// Validate `config` and build a driver, creating slot surfaces with `make`
    pub fn from_config<F>(config: &Config, source: Q, band: B, make: F) -> Result<Self>
    where
        F: FnMut(Row, usize) -> S,
    {
        config.validate()?;
        let catalog = config.catalog()?;
        let pool = config.pool.build_pool(make);
        Ok(Self::new(config.display.clone(), source, catalog, pool, band))
    }

    pub fn tick(&mut self, input: &FrameInput) -> FrameReport {
        let mut report = FrameReport::default();

        let update = self.tracker.update(
            input.reference_forward,
            self.settings.north,
            self.settings.north_texture_offset,
            self.settings.always_point_north,
        );
        if update.emitted {
            self.band.set_offset(update.offset);
            report.heading_emitted = true;
        }

        let position = input.tracked_position;
        if self.needs_sync(position) {
            self.sync(position, &mut report);
            self.last_sync = Some(position);
            report.synced = true;
        }

        self.refresh(position, &mut report);
        self.resolve_overflow(&mut report);

        self.frame += 1;
        report
    }

    /// Force a membership sync on the next tick
    pub fn request_sync(&mut self) {
        self.last_sync = None;
    }

    fn needs_sync(&self, position: Vec3) -> bool {
        match self.last_sync {
            None => true,
            Some(last) => {
                let threshold = self.settings.position_change_threshold;
                (position - last).length_squared() >= threshold * threshold
            }
        }
    }

    fn sync(&mut self, position: Vec3, report: &mut FrameReport) {
        let visible = self
            .source
            .visible_pois(position, self.settings.max_display_distance);
        debug!("Sync at {:?}: {} visible", position, visible.len());

        // free slots first so POIs coming into range can take them this sync
        let in_range: HashSet<PoiId> = visible.iter().copied().collect();
        for (_, poi) in self.pool.bound_slots() {
            if !self.source.is_registered(poi) {
                report.evicted += 1;
            } else if !in_range.contains(&poi) {
                report.deactivated += 1;
            } else {
                continue;
            }
            if self.evict(poi) {
                report.restored += 1;
            }
        }

        for &poi in &visible {
            match self.pool.binding(poi) {
                Some(slot) => self.pool.set_active(slot, true),
                None => {
                    if let Err(reason) = self.bind_new(poi) {
                        report.skip(reason);
                    } else {
                        report.bound += 1;
                    }
                }
            }
        }
    }

    fn bind_new(&mut self, poi: PoiId) -> std::result::Result<SlotId, SkipReason> {
        let Some(kinds) = self
            .source
            .poi(poi)
            .filter(|_| self.source.is_registered(poi))
            .map(|p| p.kinds)
        else {
            warn!("{} is visible but no longer registered", poi);
            return Err(SkipReason::NotRegistered);
        };
        let Some(primary) = kinds.primary() else {
            warn!("{} has no kinds, not shown", poi);
            return Err(SkipReason::NoKinds);
        };
        let Some(row) = self.catalog.row_for(kinds) else {
            warn!("No row mapping for {} ({}), not shown", poi, kinds);
            return Err(SkipReason::NoRow);
        };
        let arts = self.catalog.art_sequence(kinds);
        let Some(&(_, art)) = arts.first().filter(|(kind, _)| *kind == primary) else {
            warn!("No icon art for {} (primary kind of {}), not shown", primary, poi);
            return Err(SkipReason::NoArt);
        };
        let Some(slot) = self.pool.acquire(row) else {
            warn!("No free {} slot for {}, not shown", row, poi);
            return Err(SkipReason::NoFreeSlot);
        };
        let Some(slot) = self.pool.bind(poi, slot) else {
            warn!("Slot {:?} refused {}", slot, poi);
            return Err(SkipReason::NoFreeSlot);
        };

        self.pool.set_main_art(slot, Some(art));
        if arts.len() < kinds.len() {
            warn!("Missing icon art for some secondary kinds of {} ({})", poi, kinds);
        }
        for &(kind, art) in &arts[1..] {
            if self.pool.assign_secondary(slot, kind, art).is_none() {
                debug!("No free sub-icon for {} on {}, dropped", kind, poi);
            }
        }
        self.pool.set_active(slot, true);
        debug!("Bound {} to {:?}", poi, slot);
        Ok(slot)
    }

    /// Release the POI's slot back to the pool and drop its displacement.
    /// Returns true if the slot was displaced and got its y back.
    fn evict(&mut self, poi: PoiId) -> bool {
        let Some(slot) = self.pool.release(poi) else {
            return false;
        };
        debug!("Released {} from {:?}", poi, slot);
        match self.resolver.discard(slot) {
            Some(y) => {
                trace!("Restored {:?} to y={}", slot, y);
                self.pool.set_vertical_offset(slot, y);
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self, position: Vec3, report: &mut FrameReport) {
        let heading = self.tracker.heading();
        let mut gone = Vec::new();

        for (slot, id) in self.pool.bound_slots() {
            if !self.pool.is_active(slot) {
                continue;
            }
            let Some(poi) = self.source.poi(id) else {
                gone.push(id);
                continue;
            };

            let bearing = bearing_from_north(self.settings.north, position, poi.position);
            let x = strip_offset_px(
                bearing,
                heading,
                self.settings.band_width,
                self.settings.uv_width_fraction,
            );
            let distance = (poi.position - position).length();
            let text = format_distance(distance, self.settings.distance_decimals);
            let elevation = ElevationIndicator::from_delta(
                poi.base_position.y - position.y,
                self.settings.elevation_threshold,
            );

            if self
                .pool
                .set_position(slot, x, self.settings.icon_position_threshold)
            {
                report.positions_pushed += 1;
            }
            if let Some(surface) = self.pool.surface_mut(slot) {
                surface.set_text(&text);
                surface.set_elevation(elevation);
            }
        }

        for id in gone {
            warn!("{} vanished from the source, evicting", id);
            if self.evict(id) {
                report.restored += 1;
            }
            report.evicted += 1;
        }
    }

    fn resolve_overflow(&mut self, report: &mut FrameReport) {
        for row in Row::iter().filter(|r| r.supports_overflow()) {
            let candidates: Vec<OverflowCandidate> = self
                .pool
                .active_slots(row)
                .into_iter()
                .filter_map(|slot| {
                    Some(OverflowCandidate {
                        slot,
                        x: self.pool.applied_x(slot).unwrap_or(f32::NAN),
                        half_width: self.pool.half_width(slot),
                        y: self.pool.vertical_offset(slot)?,
                    })
                })
                .collect();

            for m in self.resolver.resolve(&candidates) {
                self.pool.set_vertical_offset(m.slot, m.y);
                if m.displaced {
                    report.displaced += 1;
                } else {
                    report.restored += 1;
                }
            }
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            heading: self.tracker.heading(),
            band_offset: self.tracker.last_offset(),
            bound: self.pool.bound_count(),
            slots: self
                .pool
                .views()
                .into_iter()
                .map(|view| {
                    let original_y = self.resolver.original_y(view.id);
                    SlotSnapshot::from_view(view, original_y)
                })
                .collect(),
        }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn source(&self) -> &Q {
        &self.source
    }

    /// Mutable access for registering, moving and removing POIs between frames
    pub fn source_mut(&mut self) -> &mut Q {
        &mut self.source
    }

    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &SlotPool<S> {
        &self.pool
    }

    pub fn band(&self) -> &B {
        &self.band
    }

    pub fn tracker(&self) -> &HeadingTracker {
        &self.tracker
    }

    pub fn resolver(&self) -> &OverflowResolver {
        &self.resolver
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::RowMapping,
        poi::{PoiKind, PoiKinds, PoiRegistry},
        render::{MemoryBand, MemorySurface},
    };

    type Driver = CompassDriver<PoiRegistry, MemorySurface, MemoryBand>;

    fn driver(config: &Config) -> Driver {
        Driver::from_config(config, PoiRegistry::new(), MemoryBand::new(), |_, _| {
            MemorySurface::from_settings(&config.pool)
        })
        .unwrap()
    }

    fn at_bearing(deg: f32, distance: f32, y: f32) -> Vec3 {
        let r = deg.to_radians();
        Vec3::new(r.sin() * distance, y, r.cos() * distance)
    }

    fn facing_north() -> FrameInput {
        FrameInput {
            reference_forward: Vec3::FORWARD,
            tracked_position: Vec3::ZERO,
        }
    }

    #[test]
    fn test_poi_out_of_range_then_in_range() {
        let config = Config::default();
        let mut d = driver(&config);
        let poi = d.source_mut().register(
            at_bearing(0.0, 150.0, 0.0),
            at_bearing(0.0, 150.0, 0.0),
            PoiKind::Vendor.into(),
        );

        let report = d.tick(&facing_north());
        assert!(report.synced);
        assert_eq!(report.bound, 0);
        assert!(d.pool().binding(poi).is_none());

        let near = at_bearing(0.0, 50.0, 0.0);
        d.source_mut().move_to(poi, near, near);
        // the viewer did not move, so nothing rescans
        assert!(!d.tick(&facing_north()).synced);
        assert!(d.pool().binding(poi).is_none());

        d.request_sync();
        let report = d.tick(&facing_north());
        assert_eq!(report.bound, 1);
        let slot = d.pool().binding(poi).unwrap();
        assert_eq!(slot.row, Row::Below);
        let surface = d.pool().surface(slot).unwrap();
        assert!(surface.active);
        assert_eq!(surface.main_image.as_deref(), Some("icons/vendor.png"));
        assert_eq!(surface.text, "50m");
    }

    #[test]
    fn test_composite_kinds_fill_sub_icons() {
        let config = Config::default();
        let mut d = driver(&config);
        let kinds: PoiKinds = [PoiKind::Landmark, PoiKind::QuestGiver, PoiKind::Vendor]
            .into_iter()
            .collect();
        let p = at_bearing(90.0, 20.0, 0.0);
        let poi = d.source_mut().register(p, p, kinds);
        d.tick(&facing_north());

        let slot = d.pool().binding(poi).unwrap();
        assert_eq!(slot.row, Row::Above);
        let surface = d.pool().surface(slot).unwrap();
        assert_eq!(surface.main_image.as_deref(), Some("icons/quest_giver.png"));
        assert_eq!(
            d.pool().secondary_kinds(slot),
            vec![Some(PoiKind::Vendor), Some(PoiKind::Landmark), None]
        );
        assert!(surface.secondaries[0].active);
        assert!(surface.secondaries[1].active);
        assert!(!surface.secondaries[2].active);
    }

    #[test]
    fn test_heading_write_is_gated() {
        let config = Config::default();
        let mut d = driver(&config);
        assert!(d.tick(&facing_north()).heading_emitted);
        assert!(!d.tick(&facing_north()).heading_emitted);
        assert_eq!(d.band().writes, 1);
        assert_eq!(d.band().offset, Some(0.0));

        let east = FrameInput {
            reference_forward: Vec3::new(1.0, 0.0, 0.0),
            tracked_position: Vec3::ZERO,
        };
        assert!(d.tick(&east).heading_emitted);
        assert!((d.band().offset.unwrap() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_small_turns_do_not_move_icons() {
        let config = Config::default();
        let mut d = driver(&config);
        let p = at_bearing(30.0, 40.0, 0.0);
        let poi = d.source_mut().register(p, p, PoiKind::Resource.into());
        assert_eq!(d.tick(&facing_north()).positions_pushed, 1);
        let slot = d.pool().binding(poi).unwrap();

        // 0.1 degrees is about 0.28px on a 1024px turn
        let input = FrameInput {
            reference_forward: at_bearing(0.1, 1.0, 0.0),
            tracked_position: Vec3::ZERO,
        };
        let report = d.tick(&input);
        assert_eq!(report.positions_pushed, 0);
        assert_eq!(d.pool().surface(slot).unwrap().position_writes, 1);

        let input = FrameInput {
            reference_forward: at_bearing(5.0, 1.0, 0.0),
            tracked_position: Vec3::ZERO,
        };
        assert_eq!(d.tick(&input).positions_pushed, 1);
        assert_eq!(d.pool().surface(slot).unwrap().position_writes, 2);
    }

    #[test]
    fn test_elevation_uses_base_position() {
        let config = Config::default();
        let mut d = driver(&config);
        let high = d.source_mut().register(
            at_bearing(10.0, 30.0, 20.0),
            at_bearing(10.0, 30.0, 10.0),
            PoiKind::Landmark.into(),
        );
        // tall object standing on the ground
        let tall = d.source_mut().register(
            at_bearing(200.0, 30.0, 8.0),
            at_bearing(200.0, 30.0, 0.0),
            PoiKind::QuestGiver.into(),
        );
        d.tick(&facing_north());

        let elevation = |poi| {
            let slot = d.pool().binding(poi).unwrap();
            d.pool().surface(slot).unwrap().elevation
        };
        assert_eq!(elevation(high), ElevationIndicator::Up);
        assert_eq!(elevation(tall), ElevationIndicator::Hidden);
    }

    #[test]
    fn test_no_free_slot_is_reported() {
        let mut config = Config::default();
        config.pool.below_slots = 1;
        let mut d = driver(&config);
        for deg in [0.0, 120.0] {
            let p = at_bearing(deg, 10.0, 0.0);
            d.source_mut().register(p, p, PoiKind::Vendor.into());
        }
        let report = d.tick(&facing_north());
        assert_eq!(report.bound, 1);
        assert_eq!(report.skipped_for(SkipReason::NoFreeSlot), 1);
        assert_eq!(d.pool().bound_count(), 1);
    }

    #[test]
    fn test_unmapped_and_artless_kinds_skipped() {
        let mut config = Config::default();
        config.rows = vec![RowMapping {
            kinds: PoiKind::Vendor.into(),
            row: Row::Below,
        }];
        config.art.remove("Vendor");
        let mut d = driver(&config);
        let p = at_bearing(0.0, 10.0, 0.0);
        d.source_mut().register(p, p, PoiKind::Player.into());
        d.source_mut().register(p, p, PoiKind::Vendor.into());
        d.source_mut().register(p, p, PoiKinds::empty());

        let report = d.tick(&facing_north());
        assert_eq!(report.bound, 0);
        assert_eq!(report.skipped_for(SkipReason::NoRow), 1);
        assert_eq!(report.skipped_for(SkipReason::NoArt), 1);
        assert_eq!(report.skipped_for(SkipReason::NoKinds), 1);
        assert_eq!(report.skipped_total(), 3);
    }

    #[test]
    fn test_out_of_range_poi_frees_its_slot() {
        let mut config = Config::default();
        config.pool.below_slots = 1;
        let mut d = driver(&config);
        let near = Vec3::new(0.0, 0.0, 50.0);
        let far = Vec3::new(0.0, 0.0, 500.0);
        let a = d.source_mut().register(near, near, PoiKind::Vendor.into());
        let b = d.source_mut().register(far, far, PoiKind::Vendor.into());
        d.tick(&facing_north());
        let slot = d.pool().binding(a).unwrap();
        assert!(d.pool().binding(b).is_none());

        let walked = FrameInput {
            reference_forward: Vec3::FORWARD,
            tracked_position: Vec3::new(0.0, 0.0, 480.0),
        };
        let report = d.tick(&walked);
        assert!(report.synced);
        assert_eq!(report.deactivated, 1);
        assert_eq!(report.bound, 1);
        assert_eq!(report.skipped_for(SkipReason::NoFreeSlot), 0);
        assert!(d.pool().binding(a).is_none());
        assert_eq!(d.pool().binding(b), Some(slot));
        assert!(d.pool().surface(slot).unwrap().active);
        assert!(d.pool().is_consistent());

        // walking back swaps them again
        let report = d.tick(&facing_north());
        assert_eq!((report.deactivated, report.bound), (1, 1));
        assert_eq!(d.pool().binding(a), Some(slot));
    }

    #[test]
    fn test_out_of_range_displaced_icon_gets_its_y_back() {
        let config = Config::default();
        let mut d = driver(&config);
        let a = at_bearing(11.0, 90.0, 0.0);
        let b = at_bearing(10.0, 30.0, 0.0);
        d.source_mut().register(a, a, PoiKind::Vendor.into());
        let right = d.source_mut().register(b, b, PoiKind::Resource.into());
        d.tick(&facing_north());
        let slot = d.pool().binding(right).unwrap();
        assert_eq!(
            d.pool().vertical_offset(slot),
            Some(config.display.overflow_y_offset)
        );

        // step south: the far POI leaves the radius, the near one stays
        let back = FrameInput {
            reference_forward: Vec3::FORWARD,
            tracked_position: Vec3::new(0.0, 0.0, -20.0),
        };
        let report = d.tick(&back);
        assert_eq!(report.deactivated, 1);
        assert_eq!(report.restored, 1);
        assert_eq!(d.pool().vertical_offset(slot), Some(0.0));
        assert_eq!(d.resolver().displaced_count(), 0);
    }

    #[test]
    fn test_unregistered_poi_is_evicted() {
        let config = Config::default();
        let mut d = driver(&config);
        let p = at_bearing(45.0, 10.0, 0.0);
        let poi = d.source_mut().register(p, p, PoiKind::Vendor.into());
        d.tick(&facing_north());
        let slot = d.pool().binding(poi).unwrap();

        d.source_mut().unregister(poi);
        let report = d.tick(&facing_north());
        assert!(!report.synced);
        assert_eq!(report.evicted, 1);
        assert!(d.pool().binding(poi).is_none());
        assert!(!d.pool().is_assigned(slot));
        let surface = d.pool().surface(slot).unwrap();
        assert!(surface.main_image.is_none());
        assert!(surface.text.is_empty());
        assert!(d.pool().is_consistent());
    }

    #[test]
    fn test_colliding_icons_displace_and_restore() {
        let config = Config::default();
        let mut d = driver(&config);
        let a = at_bearing(10.0, 30.0, 0.0);
        let b = at_bearing(11.0, 30.0, 0.0);
        let left = d.source_mut().register(b, b, PoiKind::Vendor.into());
        let right = d.source_mut().register(a, a, PoiKind::Resource.into());

        let report = d.tick(&facing_north());
        assert_eq!(report.displaced, 1);
        let left_slot = d.pool().binding(left).unwrap();
        let right_slot = d.pool().binding(right).unwrap();
        assert!(d.pool().applied_x(left_slot).unwrap() < d.pool().applied_x(right_slot).unwrap());
        assert_eq!(d.pool().vertical_offset(left_slot), Some(0.0));
        assert_eq!(
            d.pool().vertical_offset(right_slot),
            Some(config.display.overflow_y_offset)
        );
        assert!(d.resolver().is_displaced(right_slot));

        // steady state: no further moves
        let report = d.tick(&facing_north());
        assert_eq!((report.displaced, report.restored), (0, 0));

        let snapshot = d.snapshot();
        let view = snapshot.slots.iter().find(|s| s.id == right_slot).unwrap();
        assert_eq!(view.original_y, Some(0.0));

        d.source_mut().unregister(left);
        let report = d.tick(&facing_north());
        assert_eq!(report.evicted, 1);
        assert_eq!(report.restored, 1);
        assert_eq!(d.pool().vertical_offset(right_slot), Some(0.0));
        assert_eq!(d.resolver().displaced_count(), 0);
    }

    #[test]
    fn test_above_row_never_displaced() {
        let config = Config::default();
        let mut d = driver(&config);
        for deg in [10.0, 10.5] {
            let p = at_bearing(deg, 30.0, 0.0);
            d.source_mut().register(p, p, PoiKind::QuestGiver.into());
        }
        let report = d.tick(&facing_north());
        assert_eq!(report.bound, 2);
        assert_eq!(report.displaced, 0);
    }
}
