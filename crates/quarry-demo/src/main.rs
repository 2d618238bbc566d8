//! Headless quarry world simulation.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p quarry-demo -- --updates 1200 --seed 7`.

use clap::Parser;
use glam::{IVec3, Vec3};
use quarry_config::{CliArgs, Config, default_config_dir};
use quarry_voxel::{BlockCatalog, BlockId, ChunkCoord, ChunkRegenerator, ItemStack, Tool};
use quarry_world::items::{CHARCOAL, METAL_ORE};
use quarry_world::{BlockEvent, BreakOutcome, Sandbox};
use tracing::{error, info, warn};

/// Simulated frame time.
const DT: f32 = 1.0 / 60.0;

/// Stand-in for mesh and collider rebuilding: counts the solid faces that
/// border an empty cell inside each regenerated chunk.
#[derive(Default)]
struct FaceCounter {
    chunks: usize,
    faces: usize,
}

impl ChunkRegenerator for FaceCounter {
    fn regenerate(&mut self, _coord: ChunkCoord, blocks: &[BlockId], catalog: &BlockCatalog) {
        let side = (blocks.len() as f64).cbrt().round() as i32;
        let solid = |p: IVec3| {
            if p.cmplt(IVec3::ZERO).any() || p.cmpge(IVec3::splat(side)).any() {
                return false;
            }
            let i = (p.x + p.z * side + p.y * side * side) as usize;
            catalog.is_solid(blocks[i])
        };

        const NEIGHBORS: [IVec3; 6] = [
            IVec3::X,
            IVec3::NEG_X,
            IVec3::Y,
            IVec3::NEG_Y,
            IVec3::Z,
            IVec3::NEG_Z,
        ];

        for y in 0..side {
            for z in 0..side {
                for x in 0..side {
                    let p = IVec3::new(x, y, z);
                    if solid(p) {
                        self.faces += NEIGHBORS.iter().filter(|&&n| !solid(p + n)).count();
                    }
                }
            }
        }
        self.chunks += 1;
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(default_config_dir);

    let mut config = match config_dir.as_deref() {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().map(|d| d.join("logs"));
    quarry_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let mut sandbox = match Sandbox::new(&config) {
        Ok(sandbox) => sandbox,
        Err(e) => {
            error!("Cannot build world: {e}");
            std::process::exit(1);
        }
    };

    let terrain = sandbox.generate_terrain(config.world.seed);
    info!(
        "Biomes: {} desert, {} hot, {} temperate columns",
        terrain.desert_columns, terrain.hot_columns, terrain.temperate_columns
    );

    let mut regenerator = FaceCounter::default();
    sandbox.rebuild_dirty(&mut regenerator);
    info!(
        "Initial build: {} chunks, {} exposed faces",
        regenerator.chunks, regenerator.faces
    );

    let spawn = sandbox.recommended_spawn();
    info!("Spawn at {spawn}");

    dig(&mut sandbox, spawn);
    drop_sand(&mut sandbox, spawn);
    let furnace = build_furnace(&mut sandbox, spawn);

    for event in sandbox.events().read() {
        match event {
            BlockEvent::Broken { cell, block } => info!("Event: {block:?} removed at {cell}"),
            BlockEvent::Placed { cell, block } => info!("Event: {block:?} placed at {cell}"),
        }
    }

    simulate(&mut sandbox, spawn, args.updates, &mut regenerator);

    if let Some(pos) = furnace {
        match sandbox.furnace(pos) {
            Some(state) => info!(
                "Furnace at {pos}: input {:?}, fuel {:?}, output {:?}, phase {}",
                state.input,
                state.fuel,
                state.output,
                state.phase(sandbox.smelting())
            ),
            None => warn!("Furnace at {pos} lost its state"),
        }
    }
}

/// Digs straight down from the spawn point until the first block breaks.
fn dig(sandbox: &mut Sandbox, eye: Vec3) {
    for hit in 1..=64 {
        match sandbox.break_target(eye, Vec3::NEG_Y, Tool::StonePickaxe) {
            BreakOutcome::Missed => {
                warn!("Nothing within reach below {eye}");
                return;
            }
            BreakOutcome::Damaged { cell, progress } => {
                info!("Hit {cell}: {:.0}%", progress * 100.0);
            }
            BreakOutcome::Broken { cell, block } => {
                let name = &sandbox.grid().catalog().get(block).name;
                info!("Broke {name} at {cell} after {hit} hits");
                return;
            }
        }
    }
}

/// Places sand in the air two cells beside the spawn point so the gravity
/// pass has something to do.
fn drop_sand(sandbox: &mut Sandbox, eye: Vec3) {
    let column = eye.floor().as_ivec3() + IVec3::new(2, 0, 0);
    let sand = sandbox.blocks().sand;
    if sandbox.grid().get_block(column).is_air() {
        sandbox.grid_mut().set_block(column, sand);
        info!("Dropped sand at {column}");
    }
}

/// Places a furnace next to the spawn column and loads it with ore and fuel.
fn build_furnace(sandbox: &mut Sandbox, eye: Vec3) -> Option<IVec3> {
    let furnace = sandbox.blocks().furnace;
    let look = Vec3::new(0.0, -1.0, 1.0);
    let Some(pos) = sandbox.place_block(eye, look, furnace) else {
        warn!("No room to place a furnace near {eye}");
        return None;
    };

    let table = sandbox.smelting().clone();
    let state = sandbox.furnace_mut(pos)?;
    let loaded = state.insert_input(ItemStack::new(METAL_ORE, 3), &table)
        && state.insert_fuel(ItemStack::new(CHARCOAL, 2), &table);
    info!("Placed furnace at {pos} (loaded: {loaded})");
    Some(pos)
}

fn simulate(sandbox: &mut Sandbox, center: Vec3, updates: u32, regenerator: &mut FaceCounter) {
    let mut fallen = 0;
    let mut smelted = 0;
    let mut transformed = 0;
    let chunks_before = regenerator.chunks;

    for _ in 0..updates {
        let report = sandbox.update(DT, center);
        fallen += report.gravity_moves.unwrap_or(0);
        smelted += report.furnace_outputs.unwrap_or(0);
        transformed += report.block_ticks.unwrap_or(0);
        sandbox.rebuild_dirty(regenerator);
    }

    info!(
        "{} updates: {} falls, {} block transforms, {} smelts, {} chunk rebuilds",
        updates,
        fallen,
        transformed,
        smelted,
        regenerator.chunks - chunks_before
    );
}
