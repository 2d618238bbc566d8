//! Position-keyed auxiliary state for cells that need more than an ID byte.
//!
//! Entries are back-references by coordinate: the grid stays the single
//! source of truth for what occupies a cell. Every accessor first checks that
//! the cell still holds the owning block type and treats a mismatch as
//! "absent", discarding the stale entry where it has mutable access.

use glam::IVec3;
use rustc_hash::FxHashMap;

use crate::grid::WorldGrid;
use crate::registry::BlockId;

/// Map from cell position to state `S`, valid only while the cell holds `owner`.
#[derive(Clone, Debug)]
pub struct CellStateStore<S> {
    owner: BlockId,
    entries: FxHashMap<IVec3, S>,
}

impl<S> CellStateStore<S> {
    /// Creates an empty store for cells of type `owner`.
    pub fn new(owner: BlockId) -> Self {
        Self {
            owner,
            entries: FxHashMap::default(),
        }
    }

    /// Block type whose cells carry this state.
    pub fn owner(&self) -> BlockId {
        self.owner
    }

    fn owns(&self, grid: &WorldGrid, pos: IVec3) -> bool {
        grid.get_block(pos) == self.owner
    }

    /// State at `pos`, or `None` if absent or stale.
    pub fn get(&self, grid: &WorldGrid, pos: IVec3) -> Option<&S> {
        if !self.owns(grid, pos) {
            return None;
        }
        self.entries.get(&pos)
    }

    /// Mutable state at `pos`. A stale entry is dropped and `None` returned.
    pub fn get_mut(&mut self, grid: &WorldGrid, pos: IVec3) -> Option<&mut S> {
        if !self.owns(grid, pos) {
            self.entries.remove(&pos);
            return None;
        }
        self.entries.get_mut(&pos)
    }

    /// State at `pos`, created with `S::default()` on first request.
    ///
    /// Returns `None` (and discards any stale entry) if the cell does not
    /// hold the owning block type.
    pub fn get_or_create(&mut self, grid: &WorldGrid, pos: IVec3) -> Option<&mut S>
    where
        S: Default,
    {
        if !self.owns(grid, pos) {
            self.entries.remove(&pos);
            return None;
        }
        Some(self.entries.entry(pos).or_default())
    }

    /// Stores `state` at `pos` if the cell holds the owning type.
    /// Returns `false` and stores nothing otherwise.
    pub fn insert(&mut self, grid: &WorldGrid, pos: IVec3, state: S) -> bool {
        if !self.owns(grid, pos) {
            return false;
        }
        self.entries.insert(pos, state);
        true
    }

    /// Removes and returns the entry at `pos`, stale or not.
    pub fn remove(&mut self, pos: IVec3) -> Option<S> {
        self.entries.remove(&pos)
    }

    /// Drops every entry whose cell no longer holds the owning type.
    /// Returns how many were dropped.
    pub fn prune(&mut self, grid: &WorldGrid) -> usize {
        let before = self.entries.len();
        let owner = self.owner;
        self.entries.retain(|pos, _| grid.get_block(*pos) == owner);
        before - self.entries.len()
    }

    /// Prunes stale entries, then calls `f` on every remaining one.
    pub fn for_each_valid(&mut self, grid: &WorldGrid, mut f: impl FnMut(IVec3, &mut S)) {
        self.prune(grid);
        for (pos, state) in self.entries.iter_mut() {
            f(*pos, state);
        }
    }

    /// Number of stored entries, including any not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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

    #[derive(Debug, Default, PartialEq)]
    struct Counter(u32);

    fn setup() -> (WorldGrid, BlockId, BlockId) {
        let mut catalog = BlockCatalog::new();
        let stone = catalog
            .register(BlockTypeDef::solid("stone", 6.0, MiningCategory::Compact))
            .unwrap();
        let furnace = catalog
            .register(BlockTypeDef::solid("furnace", 10.0, MiningCategory::Compact))
            .unwrap();
        let grid = WorldGrid::new(IVec3::splat(8), 4, Arc::new(catalog)).unwrap();
        (grid, stone, furnace)
    }

    #[test]
    fn test_created_lazily_for_owner_cells_only() {
        let (mut grid, stone, furnace) = setup();
        let a = IVec3::new(1, 1, 1);
        let b = IVec3::new(2, 1, 1);
        grid.set_block(a, furnace);
        grid.set_block(b, stone);

        let mut store: CellStateStore<Counter> = CellStateStore::new(furnace);
        assert!(store.get(&grid, a).is_none());
        store.get_or_create(&grid, a).unwrap().0 += 1;
        assert_eq!(store.get(&grid, a), Some(&Counter(1)));

        assert!(store.get_or_create(&grid, b).is_none());
        assert!(!store.insert(&grid, b, Counter(5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_entry_treated_as_absent() {
        let (mut grid, stone, furnace) = setup();
        let pos = IVec3::new(3, 3, 3);
        grid.set_block(pos, furnace);

        let mut store: CellStateStore<Counter> = CellStateStore::new(furnace);
        store.insert(&grid, pos, Counter(7));

        grid.set_block(pos, stone);
        assert!(store.get(&grid, pos).is_none());
        assert_eq!(store.len(), 1);
        assert!(store.get_mut(&grid, pos).is_none());
        assert!(store.is_empty());

        // A new furnace at the same spot starts from scratch.
        grid.set_block(pos, furnace);
        assert_eq!(store.get_or_create(&grid, pos), Some(&mut Counter(0)));
    }

    #[test]
    fn test_prune_and_for_each_valid() {
        let (mut grid, _, furnace) = setup();
        let keep = IVec3::new(0, 0, 0);
        let lose = IVec3::new(5, 5, 5);
        grid.set_block(keep, furnace);
        grid.set_block(lose, furnace);

        let mut store: CellStateStore<Counter> = CellStateStore::new(furnace);
        store.insert(&grid, keep, Counter(0));
        store.insert(&grid, lose, Counter(0));
        grid.set_block(lose, BlockId::AIR);

        let mut visited = Vec::new();
        store.for_each_valid(&grid, |pos, state| {
            state.0 += 1;
            visited.push(pos);
        });
        assert_eq!(visited, vec![keep]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove(keep), Some(Counter(1)));
        assert_eq!(store.prune(&grid), 0);
    }
}
