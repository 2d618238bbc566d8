//! Standard item identifiers and the default smelting recipes.

use quarry_voxel::{BlockId, ItemId, SmeltingError, SmeltingTable, StandardBlocks};

pub const METAL_ORE: ItemId = ItemId(1);
pub const METAL_BAR: ItemId = ItemId(2);
pub const WOOD: ItemId = ItemId(3);
pub const CHARCOAL: ItemId = ItemId(4);
pub const STICK: ItemId = ItemId(5);

/// Registers ore → bar and wood → charcoal, plus the standard fuels
/// (charcoal 2.0, wood 1.5, stick 0.5 smelts per unit).
pub fn register_standard_smelting(table: &mut SmeltingTable) -> Result<(), SmeltingError> {
    table.register_recipe(METAL_ORE, METAL_BAR)?;
    table.register_recipe(WOOD, CHARCOAL)?;
    table.register_fuel(CHARCOAL, 2.0)?;
    table.register_fuel(WOOD, 1.5)?;
    table.register_fuel(STICK, 0.5)?;
    Ok(())
}

/// Item dropped by a broken block, for the blocks that have a smeltable or
/// burnable counterpart.
pub fn item_for_block(blocks: &StandardBlocks, block: BlockId) -> Option<ItemId> {
    if block == blocks.metal_ore {
        Some(METAL_ORE)
    } else if block == blocks.wood {
        Some(WOOD)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_voxel::BlockCatalog;

    #[test]
    fn test_standard_smelting() {
        let mut table = SmeltingTable::new(8.0, 2.0).unwrap();
        register_standard_smelting(&mut table).unwrap();
        assert_eq!(table.output_for(METAL_ORE), Some(METAL_BAR));
        assert_eq!(table.output_for(WOOD), Some(CHARCOAL));
        assert_eq!(table.output_for(STICK), None);
        assert_eq!(table.fuel_value(CHARCOAL), 2.0);
        assert_eq!(table.fuel_value(WOOD), 1.5);
        assert_eq!(table.fuel_value(STICK), 0.5);
        assert!(!table.is_fuel(METAL_BAR));

        assert!(register_standard_smelting(&mut table).is_err());
    }

    #[test]
    fn test_item_for_block() {
        let (_, blocks) = BlockCatalog::standard().unwrap();
        assert_eq!(item_for_block(&blocks, blocks.metal_ore), Some(METAL_ORE));
        assert_eq!(item_for_block(&blocks, blocks.wood), Some(WOOD));
        assert_eq!(item_for_block(&blocks, blocks.stone), None);
    }
}
