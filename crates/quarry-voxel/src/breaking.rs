//! Attrition-based block destruction.
//!
//! Each hit adds the tool's multiplier to the damage stored for that cell;
//! the cell breaks once damage reaches its hardness. Progress on a cell that
//! has not been hit for [`DEFAULT_RESET_WINDOW`] seconds is dropped.

use glam::IVec3;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::grid::WorldGrid;
use crate::registry::BlockId;

/// Seconds without a hit before progress is discarded.
pub const DEFAULT_RESET_WINDOW: f32 = 2.0;

/// Accumulated damage against one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakProgress {
    /// Block type the progress was accumulated against.
    pub block: BlockId,
    pub max_hardness: f32,
    pub current_damage: f32,
    pub time_since_last_hit: f32,
}

impl BreakProgress {
    fn fresh(block: BlockId, max_hardness: f32) -> Self {
        Self {
            block,
            max_hardness,
            current_damage: 0.0,
            time_since_last_hit: 0.0,
        }
    }

    /// Completion in `[0, 1]`, for crack overlays.
    pub fn fraction(&self) -> f32 {
        if self.max_hardness <= 0.0 {
            1.0
        } else {
            (self.current_damage / self.max_hardness).clamp(0.0, 1.0)
        }
    }
}

/// Position-keyed store of in-progress destruction.
#[derive(Clone, Debug)]
pub struct BreakTracker {
    entries: FxHashMap<IVec3, BreakProgress>,
    reset_window: f32,
}

impl BreakTracker {
    pub fn new(reset_window: f32) -> Self {
        Self {
            entries: FxHashMap::default(),
            reset_window,
        }
    }

    pub fn reset_window(&self) -> f32 {
        self.reset_window
    }

    /// Applies one hit with `multiplier` to the cell at `pos`.
    ///
    /// Returns `true` when the cell should be removed now; its progress entry
    /// is discarded in that case. Hits on non-solid cells do nothing. The
    /// tracker never writes to the grid; removal is the caller's job.
    pub fn hit(&mut self, grid: &WorldGrid, pos: IVec3, multiplier: f32) -> bool {
        let block = grid.get_block(pos);
        let def = grid.catalog().get(block);
        if !def.solid {
            return false;
        }

        if multiplier >= def.hardness {
            self.entries.remove(&pos);
            return true;
        }

        let progress = self
            .entries
            .entry(pos)
            .and_modify(|p| {
                if p.block != block {
                    *p = BreakProgress::fresh(block, def.hardness);
                }
            })
            .or_insert_with(|| BreakProgress::fresh(block, def.hardness));

        progress.current_damage += multiplier;
        progress.time_since_last_hit = 0.0;
        trace!(
            "Hit {} for {} ({}/{})",
            pos, multiplier, progress.current_damage, progress.max_hardness
        );

        if progress.current_damage >= progress.max_hardness {
            self.entries.remove(&pos);
            true
        } else {
            false
        }
    }

    /// Ages every entry by `dt` and drops those idle for at least the reset
    /// window. Call once per update. Returns the number of entries dropped.
    pub fn advance(&mut self, dt: f32) -> usize {
        let before = self.entries.len();
        let window = self.reset_window;
        self.entries.retain(|_, p| {
            p.time_since_last_hit += dt;
            p.time_since_last_hit < window
        });
        before - self.entries.len()
    }

    /// Progress for `pos`, ignored if the cell no longer holds the block it
    /// was accumulated against.
    pub fn progress(&self, grid: &WorldGrid, pos: IVec3) -> Option<&BreakProgress> {
        self.entries
            .get(&pos)
            .filter(|p| p.block == grid.get_block(pos))
    }

    /// Drops the entry for `pos`, if any.
    pub fn forget(&mut self, pos: IVec3) {
        self.entries.remove(&pos);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BreakTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_WINDOW)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BlockCatalog, BlockTypeDef, MiningCategory};
    use std::sync::Arc;

    struct Fixture {
        grid: WorldGrid,
        soft: BlockId,
        firm: BlockId,
    }

    fn fixture() -> Fixture {
        let mut catalog = BlockCatalog::new();
        let soft = catalog
            .register(BlockTypeDef::solid("soft", 3.0, MiningCategory::Granular))
            .unwrap();
        let firm = catalog
            .register(BlockTypeDef::solid("firm", 5.0, MiningCategory::Compact))
            .unwrap();
        let grid = WorldGrid::new(IVec3::splat(8), 4, Arc::new(catalog)).unwrap();
        Fixture { grid, soft, firm }
    }

    #[test]
    fn test_three_hits_break_hardness_three() {
        let mut f = fixture();
        let pos = IVec3::new(1, 1, 1);
        f.grid.set_block(pos, f.soft);

        let mut tracker = BreakTracker::default();
        assert!(!tracker.hit(&f.grid, pos, 1.0));
        assert!(!tracker.hit(&f.grid, pos, 1.0));
        assert!(tracker.hit(&f.grid, pos, 1.0));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_single_strong_hit_breaks_without_residue() {
        let mut f = fixture();
        let pos = IVec3::new(2, 1, 1);
        f.grid.set_block(pos, f.soft);

        let mut tracker = BreakTracker::default();
        assert!(!tracker.hit(&f.grid, pos, 1.0));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.hit(&f.grid, pos, 3.0));
        assert!(tracker.progress(&f.grid, pos).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_non_solid_never_accumulates() {
        let f = fixture();
        let mut tracker = BreakTracker::default();
        assert!(!tracker.hit(&f.grid, IVec3::new(3, 3, 3), 100.0));
        assert!(!tracker.hit(&f.grid, IVec3::new(-5, 0, 0), 1.0));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_idle_progress_resets() {
        let mut f = fixture();
        let pos = IVec3::new(1, 2, 3);
        f.grid.set_block(pos, f.firm);

        let mut tracker = BreakTracker::default();
        assert!(!tracker.hit(&f.grid, pos, 1.0));
        assert_eq!(tracker.advance(1.0), 0);
        assert_eq!(tracker.progress(&f.grid, pos).unwrap().time_since_last_hit, 1.0);
        assert_eq!(tracker.advance(1.5), 1);
        assert!(tracker.progress(&f.grid, pos).is_none());

        assert!(!tracker.hit(&f.grid, pos, 1.0));
        let progress = tracker.progress(&f.grid, pos).unwrap();
        assert_eq!(progress.current_damage, 1.0);
        assert!((progress.fraction() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_hit_resets_idle_timer() {
        let mut f = fixture();
        let pos = IVec3::new(1, 1, 2);
        f.grid.set_block(pos, f.firm);

        let mut tracker = BreakTracker::new(2.0);
        tracker.hit(&f.grid, pos, 1.0);
        tracker.advance(1.5);
        tracker.hit(&f.grid, pos, 1.0);
        tracker.advance(1.5);
        assert_eq!(tracker.progress(&f.grid, pos).unwrap().current_damage, 2.0);
    }

    #[test]
    fn test_replaced_block_starts_fresh() {
        let mut f = fixture();
        let pos = IVec3::new(0, 0, 0);
        f.grid.set_block(pos, f.firm);

        let mut tracker = BreakTracker::default();
        tracker.hit(&f.grid, pos, 2.0);
        tracker.hit(&f.grid, pos, 2.0);

        f.grid.set_block(pos, f.soft);
        assert!(tracker.progress(&f.grid, pos).is_none());
        assert!(!tracker.hit(&f.grid, pos, 2.0));
        assert_eq!(tracker.progress(&f.grid, pos).unwrap().current_damage, 2.0);
        assert_eq!(tracker.progress(&f.grid, pos).unwrap().max_hardness, 3.0);
    }
}
