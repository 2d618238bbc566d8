//! Chunked voxel world storage with block catalog, dirty-chunk regeneration,
//! ray picking, bounded periodic ticks, break progress and per-cell process state.

pub mod blocks;
pub mod breaking;
pub mod cell_state;
pub mod chunk;
pub mod grid;
pub mod items;
pub mod raycast;
pub mod registry;
pub mod scheduler;
pub mod smelting;

pub use blocks::StandardBlocks;
pub use breaking::{BreakProgress, BreakTracker, DEFAULT_RESET_WINDOW};
pub use cell_state::CellStateStore;
pub use chunk::{Chunk, ChunkCoord};
pub use grid::{ChunkRegenerator, GridError, WorldGrid};
pub use items::{ItemId, ItemStack, MAX_STACK_SIZE, Tool};
pub use raycast::{BlockHit, SolidQuery, pick_first_solid};
pub use registry::{
    BlockCatalog, BlockId, BlockTypeDef, CatalogError, MAX_BLOCK_TYPES, MiningCategory,
    TickBehavior,
};
pub use scheduler::{
    BoundedTickScheduler, IntervalTimer, SchedulerSettings, TickRegion, TickReport, gravity_pass,
    run_block_ticks, schedule_tick,
};
pub use smelting::{FurnaceState, FurnaceStatus, SmeltingError, SmeltingTable};
