//! Cubic chunk storage with a dirty flag and a version counter.
//!
//! A [`Chunk`] is the unit of regeneration: every write sets its dirty flag,
//! and the host clears it after rebuilding the chunk's derived mesh and
//! physics shape. Local coordinates outside `[0, side)` read as Air and are
//! ignored on write.

use glam::IVec3;

use crate::registry::BlockId;

/// Integer address of a chunk within the world grid (in chunks, not cells).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the address offset by `(dx, dy, dz)` chunks.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// World-space cell coordinate of this chunk's minimum corner.
    pub fn origin(self, side: i32) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * side
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A cubic sub-grid of `side³` block IDs.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    side: usize,
    /// Flat storage, `x + z * side + y * side * side`.
    blocks: Vec<BlockId>,
    dirty: bool,
    /// Incremented on every write.
    version: u64,
}

impl Chunk {
    /// Creates an all-Air chunk. New chunks start clean.
    pub fn new(coord: ChunkCoord, side: usize) -> Self {
        Self {
            coord,
            side,
            blocks: vec![BlockId::AIR; side * side * side],
            dirty: false,
            version: 0,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Side length in cells.
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        (x < self.side && y < self.side && z < self.side)
            .then(|| x + z * self.side + y * self.side * self.side)
    }

    /// Returns the block at local `(x, y, z)`, or Air when out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.index(x, y, z)
            .map_or(BlockId::AIR, |i| self.blocks[i])
    }

    /// Writes a block at local `(x, y, z)` and returns the previous ID.
    ///
    /// Marks the chunk dirty even when the ID is unchanged. Returns `None`
    /// (and changes nothing) when the coordinate is out of range.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) -> Option<BlockId> {
        let i = self.index(x, y, z)?;
        let previous = std::mem::replace(&mut self.blocks[i], block);
        self.dirty = true;
        self.version += 1;
        Some(previous)
    }

    /// Overwrites every cell with `block`.
    pub fn fill(&mut self, block: BlockId) {
        self.blocks.fill(block);
        self.dirty = true;
        self.version += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Current version. Starts at 0 and increases on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Read-only snapshot of the flat block array.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Number of cells that are not Air.
    pub fn non_air_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STONE: BlockId = BlockId(1);

    #[test]
    fn test_new_chunk_is_clean_air() {
        let chunk = Chunk::new(ChunkCoord::default(), 8);
        assert_eq!(chunk.blocks().len(), 512);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.version(), 0);
        assert_eq!(chunk.non_air_count(), 0);
    }

    #[test]
    fn test_set_then_get() {
        let mut chunk = Chunk::new(ChunkCoord::default(), 8);
        assert_eq!(chunk.set(1, 2, 3, STONE), Some(BlockId::AIR));
        assert_eq!(chunk.get(1, 2, 3), STONE);
        assert_eq!(chunk.get(3, 2, 1), BlockId::AIR);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.version(), 1);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut chunk = Chunk::new(ChunkCoord::default(), 8);
        assert_eq!(chunk.set(8, 0, 0, STONE), None);
        assert_eq!(chunk.get(8, 0, 0), BlockId::AIR);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.version(), 0);
    }

    #[test]
    fn test_same_id_write_still_dirties() {
        let mut chunk = Chunk::new(ChunkCoord::default(), 4);
        chunk.set(0, 0, 0, STONE);
        chunk.clear_dirty();
        chunk.set(0, 0, 0, STONE);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.version(), 2);
    }

    #[test]
    fn test_fill_counts() {
        let mut chunk = Chunk::new(ChunkCoord::default(), 4);
        chunk.fill(STONE);
        assert_eq!(chunk.non_air_count(), 64);
        chunk.set(0, 0, 0, BlockId::AIR);
        assert_eq!(chunk.non_air_count(), 63);
    }

    #[test]
    fn test_coord_offset_and_origin() {
        let c = ChunkCoord::new(1, 0, 2);
        assert_eq!(c.offset(-1, 1, 0), ChunkCoord::new(0, 1, 2));
        assert_eq!(c.origin(16), IVec3::new(16, 0, 32));
    }
}
