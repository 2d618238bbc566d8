//! Chunked world grid: routes world-cell reads and writes to the owning chunk
//! and keeps dirty flags consistent across chunk seams.

use std::sync::Arc;

use glam::IVec3;
use thiserror::Error;

use crate::chunk::{Chunk, ChunkCoord};
use crate::registry::{BlockCatalog, BlockId, BlockTypeDef};

/// Errors returned when constructing a [`WorldGrid`].
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    /// One or more world extents is not positive.
    #[error("world dimensions must be positive, got {0}x{1}x{2}")]
    InvalidDimensions(i32, i32, i32),
    /// Chunk side length is not positive.
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(i32),
}

/// Consumer of dirty chunks during [`WorldGrid::rebuild_dirty`].
///
/// Implementors rebuild whatever derived representation they keep for a
/// chunk (mesh, collision shape) from the block snapshot.
pub trait ChunkRegenerator {
    fn regenerate(&mut self, coord: ChunkCoord, blocks: &[BlockId], catalog: &BlockCatalog);
}

impl<F> ChunkRegenerator for F
where
    F: FnMut(ChunkCoord, &[BlockId], &BlockCatalog),
{
    fn regenerate(&mut self, coord: ChunkCoord, blocks: &[BlockId], catalog: &BlockCatalog) {
        self(coord, blocks, catalog)
    }
}

/// A bounded 3D volume of cells stored as a dense array of cubic chunks.
///
/// Every chunk exists for the lifetime of the grid, empty or not. Cells
/// outside `[0, size)` read as Air and ignore writes.
#[derive(Clone, Debug)]
pub struct WorldGrid {
    size: IVec3,
    chunk_size: i32,
    chunk_counts: IVec3,
    chunks: Vec<Chunk>,
    catalog: Arc<BlockCatalog>,
}

impl WorldGrid {
    /// Allocates an all-Air world of `size` cells split into `chunk_size`³ chunks.
    ///
    /// Extents that are not a multiple of `chunk_size` round the chunk count up;
    /// the overhanging part of the last chunk on each axis is never addressable.
    pub fn new(size: IVec3, chunk_size: i32, catalog: Arc<BlockCatalog>) -> Result<Self, GridError> {
        if size.min_element() <= 0 {
            return Err(GridError::InvalidDimensions(size.x, size.y, size.z));
        }
        if chunk_size <= 0 {
            return Err(GridError::InvalidChunkSize(chunk_size));
        }

        chunk_size
            .checked_mul(chunk_size)
            .and_then(|area| area.checked_mul(chunk_size))
            .ok_or(GridError::InvalidChunkSize(chunk_size))?;

        let invalid = || GridError::InvalidDimensions(size.x, size.y, size.z);
        let count = |extent: i32| extent.checked_add(chunk_size - 1).map(|n| n / chunk_size);
        let chunk_counts = match (count(size.x), count(size.y), count(size.z)) {
            (Some(x), Some(y), Some(z)) => IVec3::new(x, y, z),
            _ => return Err(invalid()),
        };
        let total = chunk_counts
            .x
            .checked_mul(chunk_counts.y)
            .and_then(|n| n.checked_mul(chunk_counts.z))
            .ok_or_else(invalid)?;

        let mut chunks = Vec::with_capacity(total as usize);
        for cy in 0..chunk_counts.y {
            for cz in 0..chunk_counts.z {
                for cx in 0..chunk_counts.x {
                    chunks.push(Chunk::new(ChunkCoord::new(cx, cy, cz), chunk_size as usize));
                }
            }
        }

        tracing::info!(
            "Allocated world grid {}x{}x{} ({} chunks of side {})",
            size.x,
            size.y,
            size.z,
            chunks.len(),
            chunk_size
        );

        Ok(Self {
            size,
            chunk_size,
            chunk_counts,
            chunks,
            catalog,
        })
    }

    /// World extents in cells.
    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Number of chunks along each axis.
    pub fn chunk_counts(&self) -> IVec3 {
        self.chunk_counts
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    pub fn catalog_handle(&self) -> Arc<BlockCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Returns `true` if `pos` lies inside the world volume.
    pub fn in_bounds(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.size).all()
    }

    fn chunk_index(&self, coord: ChunkCoord) -> Option<usize> {
        let c = IVec3::new(coord.x, coord.y, coord.z);
        if !(c.cmpge(IVec3::ZERO).all() && c.cmplt(self.chunk_counts).all()) {
            return None;
        }
        let counts = self.chunk_counts;
        Some((c.x + c.z * counts.x + c.y * counts.x * counts.z) as usize)
    }

    /// Splits an in-bounds world position into `(chunk coord, local offset)`.
    fn locate(&self, pos: IVec3) -> Option<(ChunkCoord, IVec3)> {
        if !self.in_bounds(pos) {
            return None;
        }
        let c = pos / self.chunk_size;
        Some((ChunkCoord::new(c.x, c.y, c.z), pos - c * self.chunk_size))
    }

    /// Returns the block at `pos`, or Air when out of bounds.
    pub fn get_block(&self, pos: IVec3) -> BlockId {
        let Some((coord, local)) = self.locate(pos) else {
            return BlockId::AIR;
        };
        self.chunk_index(coord).map_or(BlockId::AIR, |i| {
            self.chunks[i].get(local.x as usize, local.y as usize, local.z as usize)
        })
    }

    /// Descriptor of the block at `pos`.
    pub fn block_type(&self, pos: IVec3) -> &BlockTypeDef {
        self.catalog.get(self.get_block(pos))
    }

    /// Returns `true` if the block at `pos` is solid. Out of bounds is never solid.
    pub fn is_solid(&self, pos: IVec3) -> bool {
        self.catalog.is_solid(self.get_block(pos))
    }

    /// Writes `block` at `pos` and returns the previous ID.
    ///
    /// The owning chunk is marked dirty. When the cell sits on one of the
    /// chunk's six faces, the chunk across that face is marked dirty too (if
    /// it exists). Out-of-bounds writes change nothing and return `None`.
    pub fn set_block(&mut self, pos: IVec3, block: BlockId) -> Option<BlockId> {
        let (coord, local) = self.locate(pos)?;
        let index = self.chunk_index(coord)?;
        let previous =
            self.chunks[index].set(local.x as usize, local.y as usize, local.z as usize, block)?;

        let last = self.chunk_size - 1;
        for (axis, l) in local.to_array().into_iter().enumerate() {
            let mut step = [0; 3];
            if l == 0 {
                step[axis] = -1;
            } else if l == last {
                step[axis] = 1;
            } else {
                continue;
            }
            self.mark_chunk_dirty(coord.offset(step[0], step[1], step[2]));
            // A chunk of side 1 touches both neighbours on every axis.
            if l == 0 && l == last {
                step[axis] = 1;
                self.mark_chunk_dirty(coord.offset(step[0], step[1], step[2]));
            }
        }

        Some(previous)
    }

    /// Returns the chunk at `coord`, if it exists.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunk_index(coord).map(|i| &self.chunks[i])
    }

    /// Iterates all chunks in storage order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Flags a chunk for regeneration. Returns `false` if no such chunk exists.
    pub fn mark_chunk_dirty(&mut self, coord: ChunkCoord) -> bool {
        match self.chunk_index(coord) {
            Some(i) => {
                self.chunks[i].mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Coordinates of every chunk whose dirty flag is set.
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        self.chunks
            .iter()
            .filter(|c| c.is_dirty())
            .map(Chunk::coord)
            .collect()
    }

    /// Clears every dirty flag without regenerating anything.
    pub fn clear_all_dirty(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear_dirty();
        }
    }

    /// Hands every dirty chunk to `regenerator` once and clears its flag.
    ///
    /// Returns the number of chunks regenerated; a second call with no
    /// intervening writes returns 0.
    pub fn rebuild_dirty<R>(&mut self, regenerator: &mut R) -> usize
    where
        R: ChunkRegenerator + ?Sized,
    {
        let catalog = &self.catalog;
        let mut rebuilt = 0;
        for chunk in self.chunks.iter_mut().filter(|c| c.is_dirty()) {
            regenerator.regenerate(chunk.coord(), chunk.blocks(), catalog);
            chunk.clear_dirty();
            rebuilt += 1;
        }
        if rebuilt > 0 {
            tracing::debug!("Regenerated {} dirty chunks", rebuilt);
        }
        rebuilt
    }

    /// Highest solid cell in column `(x, z)`, or `None` if the column is empty
    /// or out of bounds.
    pub fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        (0..self.size.y)
            .rev()
            .find(|&y| self.is_solid(IVec3::new(x, y, z)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
