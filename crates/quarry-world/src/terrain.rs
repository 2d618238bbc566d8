//! Layered terrain generation: noise heightmap, three biomes, ore and trees.
//!
//! Every block is written through [`WorldGrid::set_block`], so each chunk the
//! generator touches is left dirty and the first `rebuild_dirty` builds it.

use glam::IVec3;
use noise::{NoiseFn, Perlin};
use quarry_voxel::{BlockId, StandardBlocks, WorldGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tunables for [`generate_layers`].
#[derive(Clone, Debug)]
pub struct TerrainParams {
    /// Mean surface height as a fraction of world height.
    pub base_height_ratio: f32,
    /// Peak deviation of the surface from the base height, in cells.
    pub amplitude: f64,
    /// Frequency of the height noise.
    pub height_frequency: f64,
    /// Frequency of the biome noise. Low values give large biomes.
    pub biome_frequency: f64,
    /// Biome noise below this is desert.
    pub desert_below: f64,
    /// Biome noise above this is hot.
    pub hot_above: f64,
    /// Chance per surface column of growing a tree.
    pub tree_chance: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height_ratio: 0.42,
            amplitude: 8.0,
            height_frequency: 0.02,
            biome_frequency: 0.01,
            desert_below: -0.3,
            hot_above: 0.3,
            tree_chance: 0.005,
        }
    }
}

/// Surface climate of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Biome {
    /// Sand with patches of soul sand over bedrock.
    Desert,
    /// Hot crust over ore-rich stone; bare trunks.
    Hot,
    /// Grass over dirt over stone; leafy trees.
    Temperate,
}

/// Summary of one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    pub columns: usize,
    pub blocks_placed: usize,
    pub desert_columns: usize,
    pub hot_columns: usize,
    pub temperate_columns: usize,
    pub trees: usize,
}

/// Generates terrain with default [`TerrainParams`].
pub fn generate_layers(grid: &mut WorldGrid, blocks: &StandardBlocks, seed: u64) -> TerrainStats {
    generate_layers_with(grid, blocks, seed, &TerrainParams::default())
}

/// Fills every column of `grid` from layer 0 up to a noise-driven surface.
///
/// The result depends only on the grid size, `seed` and `params`.
pub fn generate_layers_with(
    grid: &mut WorldGrid,
    blocks: &StandardBlocks,
    seed: u64,
    params: &TerrainParams,
) -> TerrainStats {
    let height_noise = Perlin::new(seed as u32);
    let biome_noise = Perlin::new(seed.wrapping_add(0x5EED_B10E) as u32);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let size = grid.size();
    let base_height = (size.y as f32 * params.base_height_ratio) as i32;
    let mut stats = TerrainStats::default();

    for x in 0..size.x {
        for z in 0..size.z {
            let (fx, fz) = (x as f64, z as f64);

            let b = biome_noise.get([fx * params.biome_frequency, fz * params.biome_frequency]);
            let biome = if b < params.desert_below {
                Biome::Desert
            } else if b > params.hot_above {
                Biome::Hot
            } else {
                Biome::Temperate
            };

            let n = height_noise.get([fx * params.height_frequency, fz * params.height_frequency]);
            let height = (base_height + (n * params.amplitude) as i32)
                .max(3)
                .min(size.y - 2);

            for y in 0..=height {
                let block = column_block(biome, y, height, base_height, blocks, &mut rng);
                if grid.set_block(IVec3::new(x, y, z), block).is_some() {
                    stats.blocks_placed += 1;
                }
            }

            stats.columns += 1;
            match biome {
                Biome::Desert => stats.desert_columns += 1,
                Biome::Hot => stats.hot_columns += 1,
                Biome::Temperate => stats.temperate_columns += 1,
            }

            let root = IVec3::new(x, height + 1, z);
            if biome != Biome::Desert
                && grid.get_block(root).is_air()
                && rng.random::<f64>() < params.tree_chance
            {
                let leafy = biome == Biome::Temperate;
                stats.blocks_placed += grow_tree(grid, blocks, root, leafy, &mut rng);
                stats.trees += 1;
            }
        }
    }

    tracing::info!(
        "Generated terrain (seed {}): {} columns, {} blocks, {} trees",
        seed,
        stats.columns,
        stats.blocks_placed,
        stats.trees
    );
    stats
}

fn column_block(
    biome: Biome,
    y: i32,
    height: i32,
    base_height: i32,
    blocks: &StandardBlocks,
    rng: &mut ChaCha8Rng,
) -> BlockId {
    match biome {
        Biome::Hot => {
            if y >= height - 2 {
                blocks.hot_block
            } else if rng.random::<f32>() < 0.2 {
                blocks.metal_ore
            } else {
                blocks.stone
            }
        }
        Biome::Desert => {
            if y > height - 5 {
                if y >= height - 2 && rng.random::<f32>() < 0.05 {
                    blocks.soul_sand
                } else {
                    blocks.sand
                }
            } else {
                blocks.bedrock
            }
        }
        Biome::Temperate => {
            if y == height {
                blocks.grass
            } else if y > height - 3 {
                blocks.dirt
            } else if y < base_height - 4 && rng.random::<f32>() < 0.015 {
                blocks.metal_ore
            } else {
                blocks.stone
            }
        }
    }
}

/// Grows a trunk of 4 to 6 wood blocks at `root`, with a leaf crown when
/// `leafy`. Only empty cells receive leaves. Returns blocks placed.
fn grow_tree(
    grid: &mut WorldGrid,
    blocks: &StandardBlocks,
    root: IVec3,
    leafy: bool,
    rng: &mut ChaCha8Rng,
) -> usize {
    let trunk_height = rng.random_range(4..=6);
    let mut placed = 0;

    for i in 0..trunk_height {
        if grid.set_block(root + IVec3::Y * i, blocks.wood).is_some() {
            placed += 1;
        }
    }

    if leafy {
        let top = root + IVec3::Y * trunk_height;
        for lx in -2..=2_i32 {
            for lz in -2..=2_i32 {
                for ly in -1..=2_i32 {
                    if lx.abs() + lz.abs() + ly.abs() > 3 {
                        continue;
                    }
                    let pos = top + IVec3::new(lx, ly, lz);
                    if grid.in_bounds(pos)
                        && grid.get_block(pos).is_air()
                        && grid.set_block(pos, blocks.leaves).is_some()
                    {
                        placed += 1;
                    }
                }
            }
        }
    }

    placed
}
