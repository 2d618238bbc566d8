//! The standard block set registered at startup.

use crate::registry::{BlockCatalog, BlockId, BlockTypeDef, CatalogError, MiningCategory, TickBehavior};

/// IDs of the standard block types, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardBlocks {
    pub stone: BlockId,
    pub grass: BlockId,
    pub dirt: BlockId,
    pub sand: BlockId,
    pub metal_ore: BlockId,
    pub wood: BlockId,
    pub soul_sand: BlockId,
    pub plank: BlockId,
    pub hot_block: BlockId,
    pub furnace: BlockId,
    pub leaves: BlockId,
    pub bedrock: BlockId,
}

impl BlockCatalog {
    /// Builds a catalog holding the standard block set.
    ///
    /// Grass is registered before dirt so the dirt tick behaviour can name
    /// its surface variant by ID.
    pub fn standard() -> Result<(BlockCatalog, StandardBlocks), CatalogError> {
        use MiningCategory::{Compact, Granular, Natural};

        let mut catalog = BlockCatalog::new();

        let stone = catalog.register(BlockTypeDef::solid("stone", 6.0, Compact))?;
        let grass = catalog.register(BlockTypeDef::solid("grass", 3.0, Granular))?;
        let dirt = catalog.register(BlockTypeDef {
            tick: TickBehavior::Uncover { surface: grass },
            ..BlockTypeDef::solid("dirt", 3.0, Granular)
        })?;
        let sand = catalog.register(BlockTypeDef {
            affected_by_gravity: true,
            ..BlockTypeDef::solid("sand", 3.0, Granular)
        })?;
        let metal_ore = catalog.register(BlockTypeDef::solid("metal_ore", 16.0, Compact))?;
        let wood = catalog.register(BlockTypeDef::solid("wood", 4.0, Natural))?;
        let soul_sand = catalog.register(BlockTypeDef {
            speed_multiplier: 0.5,
            ..BlockTypeDef::solid("soul_sand", 3.0, Granular)
        })?;
        let plank = catalog.register(BlockTypeDef::solid("plank", 4.0, Natural))?;
        let hot_block = catalog.register(BlockTypeDef {
            does_damage: true,
            damage_amount: 2,
            ..BlockTypeDef::solid("hot_block", 3.0, Compact)
        })?;
        let furnace = catalog.register(BlockTypeDef::solid("furnace", 10.0, Compact))?;
        let leaves = catalog.register(BlockTypeDef::solid("leaves", 1.0, Natural))?;
        let bedrock = catalog.register(BlockTypeDef::solid(
            "bedrock",
            f32::INFINITY,
            MiningCategory::Default,
        ))?;

        let blocks = StandardBlocks {
            stone,
            grass,
            dirt,
            sand,
            metal_ore,
            wood,
            soul_sand,
            plank,
            hot_block,
            furnace,
            leaves,
            bedrock,
        };
        Ok((catalog, blocks))
    }
}
