//! Per-update driver tying the world store's parts together.
//!
//! The host calls [`Sandbox::update`] once per frame, applies input through
//! [`Sandbox::break_target`] and [`Sandbox::place_block`], then calls
//! [`Sandbox::rebuild_dirty`] after all mutations for that frame.

use std::sync::Arc;

use glam::{IVec3, Vec3};
use quarry_config::Config;
use quarry_voxel::{
    BlockCatalog, BlockHit, BlockId, BoundedTickScheduler, BreakTracker, CatalogError,
    CellStateStore, ChunkRegenerator, FurnaceState, FurnaceStatus, GridError, IntervalTimer,
    SchedulerSettings, SmeltingError, SmeltingTable, StandardBlocks, Tool, WorldGrid,
    pick_first_solid,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::events::{BlockEvent, BlockEventBuffer};
use crate::items::register_standard_smelting;
use crate::terrain::{TerrainStats, generate_layers};

/// Errors that prevent a [`Sandbox`] from being built.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("block catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("world grid: {0}")]
    Grid(#[from] GridError),
    #[error("smelting table: {0}")]
    Smelting(#[from] SmeltingError),
}

/// Result of one break attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreakOutcome {
    /// Nothing solid within reach.
    Missed,
    /// The cell took damage and now shows `progress` in `[0, 1]`.
    Damaged { cell: IVec3, progress: f32 },
    /// The cell held `block` and is now empty.
    Broken { cell: IVec3, block: BlockId },
}

/// What one [`Sandbox::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Break progress entries dropped for inactivity.
    pub expired_progress: usize,
    /// `Some(changed)` if the block-behaviour pass ran.
    pub block_ticks: Option<usize>,
    /// `Some(moved)` if the gravity pass ran.
    pub gravity_moves: Option<usize>,
    /// `Some(produced)` if furnaces were advanced.
    pub furnace_outputs: Option<usize>,
}

/// The mutable world plus the per-update systems that act on it.
pub struct Sandbox {
    grid: WorldGrid,
    blocks: StandardBlocks,
    tracker: BreakTracker,
    scheduler: BoundedTickScheduler,
    furnaces: CellStateStore<FurnaceState>,
    smelting: SmeltingTable,
    furnace_timer: IntervalTimer,
    events: BlockEventBuffer,
    reach: f32,
}

impl Sandbox {
    /// Builds an empty world from configuration.
    pub fn new(config: &Config) -> Result<Self, WorldError> {
        let (catalog, blocks) = BlockCatalog::standard()?;

        let world = &config.world;
        let size = IVec3::new(to_i32(world.size_x), to_i32(world.size_y), to_i32(world.size_z));
        let grid = WorldGrid::new(size, to_i32(world.chunk_size), Arc::new(catalog))?;

        let mut smelting = SmeltingTable::new(config.furnace.melt_time, config.furnace.phase_duration)?;
        register_standard_smelting(&mut smelting)?;

        let ticks = &config.ticks;
        let scheduler = BoundedTickScheduler::new(SchedulerSettings {
            block_tick_interval: ticks.block_tick_interval,
            block_tick_radius: to_i32(ticks.block_tick_radius),
            gravity_interval: ticks.gravity_interval,
            gravity_radius: to_i32(ticks.gravity_radius),
        });

        info!(
            "Sandbox ready: {} block types, reach {}",
            grid.catalog().len(),
            config.breaking.reach
        );

        Ok(Self {
            grid,
            blocks,
            tracker: BreakTracker::new(config.breaking.reset_window),
            scheduler,
            furnaces: CellStateStore::new(blocks.furnace),
            smelting,
            furnace_timer: IntervalTimer::new(config.furnace.update_interval),
            events: BlockEventBuffer::new(),
            reach: config.breaking.reach,
        })
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// Direct grid access for hosts that edit the world outside break/place.
    pub fn grid_mut(&mut self) -> &mut WorldGrid {
        &mut self.grid
    }

    pub fn blocks(&self) -> &StandardBlocks {
        &self.blocks
    }

    pub fn tracker(&self) -> &BreakTracker {
        &self.tracker
    }

    pub fn smelting(&self) -> &SmeltingTable {
        &self.smelting
    }

    pub fn events(&self) -> &BlockEventBuffer {
        &self.events
    }

    /// Fills the world with layered terrain.
    pub fn generate_terrain(&mut self, seed: u64) -> TerrainStats {
        generate_layers(&mut self.grid, &self.blocks, seed)
    }

    /// First solid cell along the ray, within reach.
    pub fn pick(&self, origin: Vec3, direction: Vec3) -> Option<BlockHit> {
        pick_first_solid(&self.grid, origin, direction, self.reach)
    }

    /// Hits whatever solid cell the ray points at with `tool`.
    pub fn break_target(&mut self, origin: Vec3, direction: Vec3, tool: Tool) -> BreakOutcome {
        match self.pick(origin, direction) {
            Some(hit) => self.break_at(hit.cell, tool),
            None => BreakOutcome::Missed,
        }
    }

    /// Hits the cell at `cell` with `tool`. A broken cell is cleared through
    /// the grid's write path and any furnace state there is discarded.
    pub fn break_at(&mut self, cell: IVec3, tool: Tool) -> BreakOutcome {
        let def = self.grid.block_type(cell);
        if !def.solid {
            return BreakOutcome::Missed;
        }
        let multiplier = tool.mining_speed(def.mining_category);

        if !self.tracker.hit(&self.grid, cell, multiplier) {
            let progress = self
                .tracker
                .progress(&self.grid, cell)
                .map_or(0.0, |p| p.fraction());
            return BreakOutcome::Damaged { cell, progress };
        }

        let block = self.grid.get_block(cell);
        self.grid.set_block(cell, BlockId::AIR);
        self.furnaces.remove(cell);
        self.events.send(BlockEvent::Broken { cell, block });
        debug!("Broke {:?} at {}", block, cell);
        BreakOutcome::Broken { cell, block }
    }

    /// Places `block` against the face of the cell the ray points at.
    ///
    /// Returns the filled cell, or `None` when nothing is in reach, the ray
    /// starts inside a solid cell, or the target cell is occupied or outside
    /// the world.
    pub fn place_block(&mut self, origin: Vec3, direction: Vec3, block: BlockId) -> Option<IVec3> {
        if block.is_air() {
            return None;
        }
        let hit = self.pick(origin, direction)?;
        if hit.face_normal == IVec3::ZERO {
            return None;
        }

        let cell = hit.adjacent();
        if !self.grid.in_bounds(cell) || !self.grid.get_block(cell).is_air() {
            return None;
        }
        self.grid.set_block(cell, block);
        self.events.send(BlockEvent::Placed { cell, block });
        Some(cell)
    }

    /// Runs one update of `dt` seconds around the reference point `center`.
    ///
    /// Order: event swap, break-progress decay, block-behaviour pass, gravity
    /// pass, furnaces. The passes only run when their intervals have elapsed.
    pub fn update(&mut self, dt: f32, center: Vec3) -> UpdateReport {
        self.events.swap();

        let expired_progress = self.tracker.advance(dt);
        let ticks = self
            .scheduler
            .update(dt, center.floor().as_ivec3(), &mut self.grid);

        let furnace_outputs = self.furnace_timer.advance(dt).map(|elapsed| {
            let table = &self.smelting;
            let mut produced = 0;
            self.furnaces.for_each_valid(&self.grid, |_, furnace| {
                if furnace.advance(elapsed, table) {
                    produced += 1;
                }
            });
            produced
        });

        UpdateReport {
            expired_progress,
            block_ticks: ticks.block_ticks,
            gravity_moves: ticks.gravity_moves,
            furnace_outputs,
        }
    }

    /// Regenerates every dirty chunk. Call once per update, after all mutations.
    pub fn rebuild_dirty<R>(&mut self, regenerator: &mut R) -> usize
    where
        R: ChunkRegenerator + ?Sized,
    {
        self.grid.rebuild_dirty(regenerator)
    }

    /// Furnace state at `pos`, if the cell is a furnace that has state.
    pub fn furnace(&self, pos: IVec3) -> Option<&FurnaceState> {
        self.furnaces.get(&self.grid, pos)
    }

    /// Furnace state at `pos`, created on first access. `None` if the cell
    /// is not a furnace.
    pub fn furnace_mut(&mut self, pos: IVec3) -> Option<&mut FurnaceState> {
        self.furnaces.get_or_create(&self.grid, pos)
    }

    /// Status of the furnace at `pos`; a furnace without state is idle.
    pub fn furnace_status(&self, pos: IVec3) -> Option<FurnaceStatus> {
        if self.grid.get_block(pos) != self.blocks.furnace {
            return None;
        }
        Some(
            self.furnace(pos)
                .map_or(FurnaceStatus::Idle, |f| f.status(&self.smelting)),
        )
    }

    /// Centre column, three cells above its highest solid block.
    pub fn recommended_spawn(&self) -> Vec3 {
        let size = self.grid.size();
        let (cx, cz) = (size.x / 2, size.z / 2);
        let top = self.grid.top_solid_y(cx, cz).unwrap_or(0);
        Vec3::new(cx as f32 + 0.5, top as f32 + 3.0, cz as f32 + 0.5)
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
