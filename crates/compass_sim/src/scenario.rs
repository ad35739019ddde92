//! Scripted scene: a ring of POIs around a viewer that walks and turns.

use compass::{
    CompassDriver, Config, FrameInput, FrameReport, MemoryBand, MemorySurface, PoiId, PoiKind,
    PoiKinds, PoiRegistry, Vec3, KIND_ORDER,
};
use log::info;

use crate::error::Result;

pub type SimDriver = CompassDriver<PoiRegistry, MemorySurface, MemoryBand>;

const RING_SIZE: usize = 16;
/// Viewer turn rate in degrees per second
const TURN_RATE: f32 = 24.0;
/// Radius of the viewer's walking circle
const WALK_RADIUS: f32 = 12.0;
/// Walking angular speed in radians per second
const WALK_RATE: f32 = 0.15;

fn place(bearing_deg: f32, distance: f32, y: f32) -> Vec3 {
    let r = bearing_deg.to_radians();
    Vec3::new(r.sin() * distance, y, r.cos() * distance)
}

pub struct Scene {
    driver: SimDriver,
    fps: f32,
    vanishing: PoiId,
    vanish_frame: u64,
}

impl Scene {
    /// Build the scene; `vanish_frame` is when one POI gets unregistered
    pub fn new(config: &Config, fps: f32, vanish_frame: u64) -> Result<Self> {
        let mut registry = PoiRegistry::new();

        // registered first so it always wins a slot
        let vanishing = registry.register(
            place(200.0, 20.0, 0.0),
            place(200.0, 20.0, 0.0),
            [PoiKind::QuestGiver, PoiKind::Vendor].into_iter().collect(),
        );

        for i in 0..RING_SIZE {
            let bearing = i as f32 * (360.0 / RING_SIZE as f32);
            let distance = 30.0 + (i % 4) as f32 * 20.0;
            // every third POI sits on a hill
            let ground = if i % 3 == 0 { 8.0 } else { 0.0 };
            let mut kinds = PoiKinds::from(KIND_ORDER[i % KIND_ORDER.len()]);
            if i % 5 == 4 {
                kinds.insert(PoiKind::Landmark);
            }
            registry.register(
                place(bearing, distance, ground + 2.0),
                place(bearing, distance, ground),
                kinds,
            );
        }

        // close enough in bearing to collide on the lower row
        registry.register(
            place(100.0, 25.0, 0.0),
            place(100.0, 25.0, 0.0),
            PoiKind::Vendor.into(),
        );
        registry.register(
            place(101.5, 40.0, 0.0),
            place(101.5, 40.0, 0.0),
            PoiKind::Resource.into(),
        );

        let driver = CompassDriver::from_config(config, registry, MemoryBand::new(), |_, _| {
            MemorySurface::from_settings(&config.pool)
        })?;

        Ok(Self {
            driver,
            fps,
            vanishing,
            vanish_frame,
        })
    }

    /// Viewer pose at `frame`
    pub fn input_at(&self, frame: u64) -> FrameInput {
        let t = frame as f32 / self.fps;
        let walk = t * WALK_RATE;
        let turn = (t * TURN_RATE).to_radians();
        FrameInput {
            reference_forward: Vec3::new(turn.sin(), 0.0, turn.cos()),
            tracked_position: Vec3::new(walk.cos() * WALK_RADIUS, 0.0, walk.sin() * WALK_RADIUS),
        }
    }

    pub fn step(&mut self, frame: u64) -> FrameReport {
        if frame == self.vanish_frame
            && self.driver.source_mut().unregister(self.vanishing).is_some()
        {
            info!("Frame {frame}: unregistered {}", self.vanishing);
        }
        let input = self.input_at(frame);
        self.driver.tick(&input)
    }

    pub fn driver(&self) -> &SimDriver {
        &self.driver
    }

    pub fn vanishing(&self) -> PoiId {
        self.vanishing
    }
}
