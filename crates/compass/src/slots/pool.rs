//! Fixed-capacity icon slots, one ordered list per row, and the POI binding table.

use serde::Serialize;
use std::collections::HashMap;

use super::surface::{ElevationIndicator, IconSurface};
use crate::catalog::{IconArt, Row};
use crate::poi::{PoiId, PoiKind};

/// Slot address: row plus position in that row's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId {
    pub row: Row,
    pub index: usize,
}

impl SlotId {
    pub fn new(row: Row, index: usize) -> Self {
        Self { row, index }
    }
}

#[derive(Debug)]
struct Slot<S> {
    surface: S,
    bound: Option<PoiId>,
    active: bool,
    /// Last x pushed to the surface
    applied_x: Option<f32>,
    /// Kind occupying each secondary sub-element
    secondary: Vec<Option<PoiKind>>,
}

impl<S: IconSurface> Slot<S> {
    fn new(surface: S) -> Self {
        let n = surface.secondary_count();
        Self {
            surface,
            bound: None,
            active: false,
            applied_x: None,
            secondary: vec![None; n],
        }
    }
}

/// Read-only summary of one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub id: SlotId,
    pub poi: Option<PoiId>,
    pub active: bool,
    pub x: Option<f32>,
    pub y: f32,
    pub secondary: Vec<Option<PoiKind>>,
}

#[derive(Debug)]
pub struct SlotPool<S> {
    above: Vec<Slot<S>>,
    below: Vec<Slot<S>>,
    bindings: HashMap<PoiId, SlotId>,
}

impl<S: IconSurface> SlotPool<S> {
    pub fn new(above: Vec<S>, below: Vec<S>) -> Self {
        Self {
            above: above.into_iter().map(Slot::new).collect(),
            below: below.into_iter().map(Slot::new).collect(),
            bindings: HashMap::new(),
        }
    }

    fn row(&self, row: Row) -> &[Slot<S>] {
        match row {
            Row::Above => &self.above,
            Row::Below => &self.below,
        }
    }

    fn slot(&self, id: SlotId) -> Option<&Slot<S>> {
        self.row(id.row).get(id.index)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<S>> {
        match id.row {
            Row::Above => self.above.get_mut(id.index),
            Row::Below => self.below.get_mut(id.index),
        }
    }

    pub fn capacity(&self, row: Row) -> usize {
        self.row(row).len()
    }

    /// First unassigned slot of `row` in list order
    pub fn acquire(&self, row: Row) -> Option<SlotId> {
        self.row(row)
            .iter()
            .position(|s| s.bound.is_none())
            .map(|index| SlotId::new(row, index))
    }

    pub fn is_assigned(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(|s| s.bound.is_some())
    }

    /// Bind `poi` to `id`.
    ///
    /// Binding an already bound POI is a no-op that returns its existing slot.
    /// Returns `None` if `id` does not exist or belongs to another POI.
    pub fn bind(&mut self, poi: PoiId, id: SlotId) -> Option<SlotId> {
        if let Some(&existing) = self.bindings.get(&poi) {
            return Some(existing);
        }
        let slot = self.slot_mut(id)?;
        if slot.bound.is_some() {
            return None;
        }
        slot.bound = Some(poi);
        self.bindings.insert(poi, id);
        Some(id)
    }

    pub fn binding(&self, poi: PoiId) -> Option<SlotId> {
        self.bindings.get(&poi).copied()
    }

    pub fn bound_poi(&self, id: SlotId) -> Option<PoiId> {
        self.slot(id).and_then(|s| s.bound)
    }

    /// Bound slots in pool order (Above row first)
    pub fn bound_slots(&self) -> Vec<(SlotId, PoiId)> {
        [Row::Above, Row::Below]
            .into_iter()
            .flat_map(|row| {
                self.row(row)
                    .iter()
                    .enumerate()
                    .filter_map(move |(i, s)| s.bound.map(|p| (SlotId::new(row, i), p)))
            })
            .collect()
    }

    /// Active, bound slots of one row in pool order
    pub fn active_slots(&self, row: Row) -> Vec<SlotId> {
        self.row(row)
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active && s.bound.is_some())
            .map(|(i, _)| SlotId::new(row, i))
            .collect()
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Unbind `poi` and blank its slot. Returns the freed slot.
    ///
    /// The vertical offset is left as is. A caller that runs an
    /// `OverflowResolver` must discard the slot's record and write the
    /// original y back, as `CompassDriver` does.
    pub fn release(&mut self, poi: PoiId) -> Option<SlotId> {
        let id = self.bindings.remove(&poi)?;
        if let Some(slot) = self.slot_mut(id) {
            slot.bound = None;
            slot.active = false;
            slot.applied_x = None;
            slot.surface.set_active(false);
            slot.surface.set_main_art(None);
            slot.surface.set_text("");
            slot.surface.set_elevation(ElevationIndicator::Hidden);
            for (i, kind) in slot.secondary.iter_mut().enumerate() {
                *kind = None;
                slot.surface.set_secondary_art(i, None);
                slot.surface.set_secondary_active(i, false);
            }
        }
        Some(id)
    }

    pub fn set_main_art(&mut self, id: SlotId, art: Option<&IconArt>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.surface.set_main_art(art);
        }
    }

    /// Put `art` for secondary `kind` into a sub-element of the slot.
    ///
    /// A kind that already has a sub-element is updated in place. Otherwise the
    /// first free sub-element is taken. With none free the icon is dropped and
    /// `None` is returned.
    pub fn assign_secondary(&mut self, id: SlotId, kind: PoiKind, art: &IconArt) -> Option<usize> {
        let slot = self.slot_mut(id)?;
        let index = match slot.secondary.iter().position(|k| *k == Some(kind)) {
            Some(i) => i,
            None => {
                let free = slot.secondary.iter().position(Option::is_none)?;
                slot.secondary[free] = Some(kind);
                free
            }
        };
        slot.surface.set_secondary_art(index, Some(art));
        if slot.active {
            slot.surface.set_secondary_active(index, true);
        }
        Some(index)
    }

    pub fn secondary_kinds(&self, id: SlotId) -> Vec<Option<PoiKind>> {
        self.slot(id).map(|s| s.secondary.clone()).unwrap_or_default()
    }

    /// Show or hide the slot together with its assigned sub-elements
    pub fn set_active(&mut self, id: SlotId, active: bool) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.active == active {
            return;
        }
        slot.active = active;
        slot.surface.set_active(active);
        for (i, kind) in slot.secondary.iter().enumerate() {
            if kind.is_some() {
                slot.surface.set_secondary_active(i, active);
            }
        }
    }

    pub fn is_active(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(|s| s.active)
    }

    /// Push `x` only when it moved more than `threshold` since the last push
    pub fn set_position(&mut self, id: SlotId, x: f32, threshold: f32) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if !x.is_finite() {
            return false;
        }
        let changed = match slot.applied_x {
            Some(prev) => (x - prev).abs() > threshold,
            None => true,
        };
        if changed {
            slot.applied_x = Some(x);
            slot.surface.set_position(x);
        }
        changed
    }

    pub fn applied_x(&self, id: SlotId) -> Option<f32> {
        self.slot(id).and_then(|s| s.applied_x)
    }

    pub fn vertical_offset(&self, id: SlotId) -> Option<f32> {
        self.slot(id).map(|s| s.surface.vertical_offset())
    }

    pub fn set_vertical_offset(&mut self, id: SlotId, y: f32) {
        if let Some(slot) = self.slot_mut(id) {
            slot.surface.set_vertical_offset(y);
        }
    }

    pub fn half_width(&self, id: SlotId) -> Option<f32> {
        self.slot(id).and_then(|s| s.surface.half_width())
    }

    pub fn surface(&self, id: SlotId) -> Option<&S> {
        self.slot(id).map(|s| &s.surface)
    }

    pub fn surface_mut(&mut self, id: SlotId) -> Option<&mut S> {
        self.slot_mut(id).map(|s| &mut s.surface)
    }

    pub fn views(&self) -> Vec<SlotView> {
        [Row::Above, Row::Below]
            .into_iter()
            .flat_map(|row| {
                self.row(row).iter().enumerate().map(move |(i, s)| SlotView {
                    id: SlotId::new(row, i),
                    poi: s.bound,
                    active: s.active,
                    x: s.applied_x,
                    y: s.surface.vertical_offset(),
                    secondary: s.secondary.clone(),
                })
            })
            .collect()
    }

    /// Binding table and slot back-references agree one-to-one
    pub fn is_consistent(&self) -> bool {
        let mut seen = 0;
        for row in [Row::Above, Row::Below] {
            for (i, slot) in self.row(row).iter().enumerate() {
                if let Some(poi) = slot.bound {
                    seen += 1;
                    if self.bindings.get(&poi) != Some(&SlotId::new(row, i)) {
                        return false;
                    }
                } else if slot.secondary.iter().any(Option::is_some) {
                    return false;
                }
            }
        }
        seen == self.bindings.len()
    }
}
