//! Vertical displacement of colliding icons within one row.
//!
//! Adjacent icons (sorted by x) closer than their half-widths plus the minimum
//! spacing push the right-hand icon by `y_offset`. The pre-displacement y is
//! remembered and restored exactly once the collision clears. The rule is
//! pairwise: in a chain of three or more, a displaced icon may still overlap
//! a third one.

use itertools::Itertools;
use log::trace;
use std::collections::{HashMap, HashSet};

use crate::slots::SlotId;

/// Geometry of one active slot as seen by the resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowCandidate {
    pub slot: SlotId,
    pub x: f32,
    pub half_width: Option<f32>,
    pub y: f32,
}

impl OverflowCandidate {
    fn usable_half_width(&self) -> Option<f32> {
        self.half_width
            .filter(|w| w.is_finite() && *w >= 0.0)
            .filter(|_| self.x.is_finite())
    }
}

/// A vertical offset to apply to a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowMove {
    pub slot: SlotId,
    pub y: f32,
    pub displaced: bool,
}

#[derive(Debug, Clone)]
pub struct OverflowResolver {
    min_spacing: f32,
    y_offset: f32,
    /// Displaced slot -> y before displacement
    records: HashMap<SlotId, f32>,
}

impl OverflowResolver {
    pub fn new(min_spacing: f32, y_offset: f32) -> Self {
        Self {
            min_spacing,
            y_offset,
            records: HashMap::new(),
        }
    }

    pub fn is_displaced(&self, slot: SlotId) -> bool {
        self.records.contains_key(&slot)
    }

    pub fn original_y(&self, slot: SlotId) -> Option<f32> {
        self.records.get(&slot).copied()
    }

    pub fn displaced_count(&self) -> usize {
        self.records.len()
    }

    /// Drop the record for a slot that is being released; returns its original y
    pub fn discard(&mut self, slot: SlotId) -> Option<f32> {
        self.records.remove(&slot)
    }

    /// One resolution pass over the active slots of a row, given in pool order.
    ///
    /// Returns the y changes to apply.
    pub fn resolve(&mut self, candidates: &[OverflowCandidate]) -> Vec<OverflowMove> {
        if candidates.len() < 2 {
            return self.restore_all();
        }

        let mut sorted: Vec<&OverflowCandidate> = candidates.iter().collect();
        // stable: equal x keeps pool order
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut marked: HashSet<SlotId> = HashSet::new();
        for (left, right) in sorted.iter().tuple_windows() {
            let (Some(lw), Some(rw)) = (left.usable_half_width(), right.usable_half_width())
            else {
                continue;
            };
            let required = lw + rw + self.min_spacing;
            let gap = right.x - left.x;
            if gap < required {
                marked.insert(right.slot);
            }
        }

        let mut moves = Vec::new();
        for c in candidates {
            match (marked.contains(&c.slot), self.records.get(&c.slot).copied()) {
                (true, None) => {
                    self.records.insert(c.slot, c.y);
                    trace!("displacing {:?} from y={}", c.slot, c.y);
                    moves.push(OverflowMove {
                        slot: c.slot,
                        y: c.y + self.y_offset,
                        displaced: true,
                    });
                }
                (false, Some(original)) => {
                    self.records.remove(&c.slot);
                    trace!("restoring {:?} to y={}", c.slot, original);
                    moves.push(OverflowMove {
                        slot: c.slot,
                        y: original,
                        displaced: false,
                    });
                }
                _ => {}
            }
        }
        moves
    }

    fn restore_all(&mut self) -> Vec<OverflowMove> {
        let mut moves: Vec<OverflowMove> = self
            .records
            .drain()
            .map(|(slot, y)| OverflowMove {
                slot,
                y,
                displaced: false,
            })
            .collect();
        moves.sort_by_key(|m| m.slot);
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Row;

    const Y_OFFSET: f32 = -24.0;

    fn slot(i: usize) -> SlotId {
        SlotId::new(Row::Below, i)
    }

    fn cand(i: usize, x: f32, half: f32) -> OverflowCandidate {
        OverflowCandidate {
            slot: slot(i),
            x,
            half_width: Some(half),
            y: 0.0,
        }
    }

    /// Apply moves to the candidates like the driver would
    fn apply(cands: &mut [OverflowCandidate], moves: &[OverflowMove]) {
        for m in moves {
            if let Some(c) = cands.iter_mut().find(|c| c.slot == m.slot) {
                c.y = m.y;
            }
        }
    }

    #[test]
    fn test_well_spaced_icons_stay() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let cands = [cand(0, 0.0, 20.0), cand(1, 90.0, 20.0), cand(2, 200.0, 20.0)];
        assert!(r.resolve(&cands).is_empty());
        assert_eq!(r.displaced_count(), 0);
    }

    #[test]
    fn test_right_icon_of_close_pair_is_displaced() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let cands = [cand(0, 100.0, 20.0), cand(1, 110.0, 20.0)];
        let moves = r.resolve(&cands);
        assert_eq!(
            moves,
            vec![OverflowMove {
                slot: slot(1),
                y: Y_OFFSET,
                displaced: true
            }]
        );
        assert!(r.is_displaced(slot(1)));
        assert!(!r.is_displaced(slot(0)));
        assert_eq!(r.original_y(slot(1)), Some(0.0));
    }

    #[test]
    fn test_order_follows_x_not_pool() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        // pool order puts the right-hand icon first
        let cands = [cand(0, 110.0, 20.0), cand(1, 100.0, 20.0)];
        let moves = r.resolve(&cands);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].slot, slot(0));
    }

    #[test]
    fn test_exact_tie_keeps_pool_order() {
        let mut r = OverflowResolver::new(0.0, Y_OFFSET);
        let cands = [cand(3, 50.0, 10.0), cand(1, 50.0, 10.0)];
        let moves = r.resolve(&cands);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].slot, slot(1));
    }

    #[test]
    fn test_no_double_displacement() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let mut cands = [cand(0, 100.0, 20.0), cand(1, 110.0, 20.0)];
        let moves = r.resolve(&cands);
        apply(&mut cands, &moves);
        // still colliding: nothing new happens
        assert!(r.resolve(&cands).is_empty());
        assert_eq!(cands[1].y, Y_OFFSET);
        assert_eq!(r.original_y(slot(1)), Some(0.0));
    }

    #[test]
    fn test_restore_when_collision_clears() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let mut cands = [cand(0, 100.0, 20.0), cand(1, 110.0, 20.0)];
        cands[1].y = 7.5;
        let moves = r.resolve(&cands);
        apply(&mut cands, &moves);
        assert_eq!(cands[1].y, 7.5 + Y_OFFSET);

        cands[1].x = 300.0;
        let moves = r.resolve(&cands);
        apply(&mut cands, &moves);
        assert_eq!(cands[1].y, 7.5);
        assert_eq!(r.displaced_count(), 0);
    }

    #[test]
    fn test_dropping_below_two_restores_everything() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let mut cands = vec![cand(0, 100.0, 20.0), cand(1, 110.0, 20.0), cand(2, 120.0, 20.0)];
        let moves = r.resolve(&cands);
        apply(&mut cands, &moves);
        assert_eq!(r.displaced_count(), 2);

        let moves = r.resolve(&cands[..1]);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.y == 0.0 && !m.displaced));
        assert_eq!(r.displaced_count(), 0);

        // idempotent
        assert!(r.resolve(&[]).is_empty());
    }

    #[test]
    fn test_chain_only_displaces_right_members() {
        let mut r = OverflowResolver::new(10.0, Y_OFFSET);
        let cands = [cand(0, 0.0, 10.0), cand(1, 15.0, 10.0), cand(2, 30.0, 10.0)];
        let moves = r.resolve(&cands);
        let displaced: Vec<_> = moves.iter().map(|m| m.slot).collect();
        assert_eq!(displaced, vec![slot(1), slot(2)]);
    }

    #[test]
    fn test_degenerate_geometry_skips_pair_only() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        let mut broken = cand(1, 105.0, 20.0);
        broken.half_width = None;
        let cands = [cand(0, 100.0, 20.0), broken, cand(2, 110.0, 20.0)];
        // pairs (0,1) and (1,2) involve the broken slot and are skipped
        assert!(r.resolve(&cands).is_empty());

        let mut nan = cand(1, f32::NAN, 20.0);
        nan.y = 0.0;
        let cands = [cand(0, 100.0, 20.0), cand(2, 110.0, 20.0), nan];
        let moves = r.resolve(&cands);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].slot, slot(2));
    }

    #[test]
    fn test_discard_forgets_record() {
        let mut r = OverflowResolver::new(50.0, Y_OFFSET);
        r.resolve(&[cand(0, 100.0, 20.0), cand(1, 110.0, 20.0)]);
        assert_eq!(r.discard(slot(1)), Some(0.0));
        assert_eq!(r.discard(slot(1)), None);
        assert!(!r.is_displaced(slot(1)));
    }
}
