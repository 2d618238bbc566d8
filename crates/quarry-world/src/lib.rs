//! World driver for the quarry voxel sandbox: break/place handling, periodic
//! ticks, furnaces and terrain generation on top of `quarry-voxel`.

pub mod events;
pub mod items;
pub mod sandbox;
pub mod terrain;

pub use events::{BlockEvent, BlockEventBuffer};
pub use sandbox::{BreakOutcome, Sandbox, UpdateReport, WorldError};
pub use terrain::{Biome, TerrainParams, TerrainStats, generate_layers, generate_layers_with};
