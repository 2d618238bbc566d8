//! Smelting recipes and the three-slot furnace process.
//!
//! A furnace holds an input, a fuel and an output slot. While input is
//! present and fuel is burning, progress accrues; at `melt_time` one input
//! unit becomes one output unit. If the output slot cannot take the result
//! the furnace holds at full progress until it can.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::items::{ItemId, ItemStack};

/// Errors raised while building a [`SmeltingTable`].
#[derive(Debug, Error, PartialEq)]
pub enum SmeltingError {
    #[error("fuel value for {0:?} must be positive and finite, got {1}")]
    InvalidFuelValue(ItemId, f32),
    #[error("a recipe for {0:?} is already registered")]
    DuplicateRecipe(ItemId),
    #[error("melt time and phase duration must be positive, got {0} and {1}")]
    InvalidTiming(f32, f32),
}

/// Recipes, fuel values and timing shared by all furnaces.
#[derive(Clone, Debug)]
pub struct SmeltingTable {
    recipes: FxHashMap<ItemId, ItemId>,
    /// Complete smelts powered by one unit of each fuel.
    fuels: FxHashMap<ItemId, f32>,
    melt_time: f32,
    phase_duration: f32,
}

impl SmeltingTable {
    /// An empty table. `melt_time` is seconds per smelt, `phase_duration`
    /// seconds per presentation phase.
    pub fn new(melt_time: f32, phase_duration: f32) -> Result<Self, SmeltingError> {
        if !(melt_time > 0.0 && phase_duration > 0.0) {
            return Err(SmeltingError::InvalidTiming(melt_time, phase_duration));
        }
        Ok(Self {
            recipes: FxHashMap::default(),
            fuels: FxHashMap::default(),
            melt_time,
            phase_duration,
        })
    }

    pub fn register_recipe(&mut self, input: ItemId, output: ItemId) -> Result<(), SmeltingError> {
        if self.recipes.contains_key(&input) {
            return Err(SmeltingError::DuplicateRecipe(input));
        }
        self.recipes.insert(input, output);
        Ok(())
    }

    /// Registers (or replaces) the fuel value of `item`.
    pub fn register_fuel(&mut self, item: ItemId, value: f32) -> Result<(), SmeltingError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(SmeltingError::InvalidFuelValue(item, value));
        }
        self.fuels.insert(item, value);
        Ok(())
    }

    pub fn output_for(&self, input: ItemId) -> Option<ItemId> {
        self.recipes.get(&input).copied()
    }

    /// Fuel value of `item`, 0 if it does not burn.
    pub fn fuel_value(&self, item: ItemId) -> f32 {
        self.fuels.get(&item).copied().unwrap_or(0.0)
    }

    pub fn is_fuel(&self, item: ItemId) -> bool {
        self.fuel_value(item) > 0.0
    }

    pub fn melt_time(&self) -> f32 {
        self.melt_time
    }

    pub fn phase_duration(&self) -> f32 {
        self.phase_duration
    }
}

/// Externally visible furnace state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FurnaceStatus {
    /// No input, or input with nothing to burn.
    Idle,
    /// Input present and fuel available; progress accrues.
    Heating,
    /// Progress complete but the output slot cannot take the result.
    Blocked,
}

/// Slots and progress of one furnace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FurnaceState {
    pub input: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
    pub output: Option<ItemStack>,
    /// Seconds of heating applied to the current input unit.
    pub progress: f32,
    /// Remaining burn, in complete smelts.
    pub fuel_remaining: f32,
}

impl FurnaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `stack` into the input slot. Rejected unless a recipe exists and
    /// the slot is empty or can absorb the whole stack.
    pub fn insert_input(&mut self, stack: ItemStack, table: &SmeltingTable) -> bool {
        if stack.is_empty() || table.output_for(stack.item).is_none() {
            return false;
        }
        put(&mut self.input, stack)
    }

    /// Puts `stack` into the fuel slot. Rejected unless the item burns and
    /// the slot is empty or can absorb the whole stack.
    pub fn insert_fuel(&mut self, stack: ItemStack, table: &SmeltingTable) -> bool {
        if stack.is_empty() || !table.is_fuel(stack.item) {
            return false;
        }
        put(&mut self.fuel, stack)
    }

    /// Empties the input slot. Progress on the removed unit is lost.
    pub fn take_input(&mut self) -> Option<ItemStack> {
        self.progress = 0.0;
        self.input.take()
    }

    pub fn take_fuel(&mut self) -> Option<ItemStack> {
        self.fuel.take()
    }

    pub fn take_output(&mut self) -> Option<ItemStack> {
        self.output.take()
    }

    pub fn status(&self, table: &SmeltingTable) -> FurnaceStatus {
        if self.input.is_none() {
            FurnaceStatus::Idle
        } else if self.progress >= table.melt_time() {
            FurnaceStatus::Blocked
        } else if self.fuel_remaining > 0.0 || self.fuel.is_some() {
            FurnaceStatus::Heating
        } else {
            FurnaceStatus::Idle
        }
    }

    /// Presentation phase in `0..=4`, derived from progress only.
    pub fn phase(&self, table: &SmeltingTable) -> u8 {
        ((self.progress / table.phase_duration()) as u8).min(4)
    }

    /// Advances the process by `dt` seconds. Returns `true` when a unit of
    /// output was produced.
    pub fn advance(&mut self, dt: f32, table: &SmeltingTable) -> bool {
        let Some(output_item) = self.input.and_then(|s| table.output_for(s.item)) else {
            self.progress = 0.0;
            return false;
        };

        if self.progress >= table.melt_time() {
            return self.complete(output_item);
        }

        if self.fuel_remaining <= 0.0 && !self.draw_fuel(table) {
            return false;
        }

        self.progress += dt;
        self.fuel_remaining = (self.fuel_remaining - dt / table.melt_time()).max(0.0);

        if self.progress >= table.melt_time() {
            self.progress = table.melt_time();
            return self.complete(output_item);
        }
        false
    }

    /// Burns one unit from the fuel slot. Returns `false` if the slot is empty.
    fn draw_fuel(&mut self, table: &SmeltingTable) -> bool {
        let Some(stack) = self.fuel.as_mut() else {
            return false;
        };
        let Some(unit) = stack.split_one() else {
            self.fuel = None;
            return false;
        };
        if stack.is_empty() {
            self.fuel = None;
        }
        self.fuel_remaining += table.fuel_value(unit.item);
        true
    }

    /// Moves one result into the output slot and consumes one input unit.
    /// Leaves everything untouched when the output slot cannot take it.
    fn complete(&mut self, output_item: ItemId) -> bool {
        if !put(&mut self.output, ItemStack::one(output_item)) {
            return false;
        }
        if let Some(input) = self.input.as_mut() {
            input.split_one();
            if input.is_empty() {
                self.input = None;
            }
        }
        self.progress = 0.0;
        true
    }
}

fn put(slot: &mut Option<ItemStack>, stack: ItemStack) -> bool {
    match slot {
        None => {
            *slot = Some(stack);
            true
        }
        Some(existing) => existing.merge(stack),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::MAX_STACK_SIZE;

    const ORE: ItemId = ItemId(1);
    const BAR: ItemId = ItemId(2);
    const COAL: ItemId = ItemId(3);
    const STICK: ItemId = ItemId(4);
    const DIRT: ItemId = ItemId(5);

    fn table() -> SmeltingTable {
        let mut table = SmeltingTable::new(8.0, 2.0).unwrap();
        table.register_recipe(ORE, BAR).unwrap();
        table.register_fuel(COAL, 2.0).unwrap();
        table.register_fuel(STICK, 0.5).unwrap();
        table
    }

    fn run(furnace: &mut FurnaceState, table: &SmeltingTable, seconds: f32) -> usize {
        let steps = (seconds / 0.5).round() as usize;
        (0..steps).filter(|_| furnace.advance(0.5, table)).count()
    }

    #[test]
    fn test_table_validation() {
        let mut table = table();
        assert_eq!(
            table.register_recipe(ORE, COAL),
            Err(SmeltingError::DuplicateRecipe(ORE))
        );
        assert!(table.register_fuel(DIRT, 0.0).is_err());
        assert!(table.register_fuel(DIRT, f32::NAN).is_err());
        assert!(SmeltingTable::new(0.0, 2.0).is_err());
        assert_eq!(table.fuel_value(DIRT), 0.0);
    }

    #[test]
    fn test_slots_reject_unregistered_items() {
        let table = table();
        let mut furnace = FurnaceState::new();
        assert!(!furnace.insert_input(ItemStack::one(DIRT), &table));
        assert!(!furnace.insert_fuel(ItemStack::one(ORE), &table));
        assert!(furnace.insert_input(ItemStack::new(ORE, 3), &table));
        assert!(furnace.insert_input(ItemStack::new(ORE, 2), &table));
        assert_eq!(furnace.input, Some(ItemStack::new(ORE, 5)));
        assert!(furnace.insert_fuel(ItemStack::one(COAL), &table));
        assert!(!furnace.insert_fuel(ItemStack::one(STICK), &table));
    }

    #[test]
    fn test_one_smelt_moves_one_unit() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::new(ORE, 2), &table);
        furnace.insert_fuel(ItemStack::one(COAL), &table);
        assert_eq!(furnace.status(&table), FurnaceStatus::Heating);

        let produced = run(&mut furnace, &table, 8.0);
        assert_eq!(produced, 1);
        assert_eq!(furnace.output, Some(ItemStack::one(BAR)));
        assert_eq!(furnace.input, Some(ItemStack::one(ORE)));
        assert_eq!(furnace.progress, 0.0);
        assert!(furnace.fuel.is_none());
        assert!((furnace.fuel_remaining - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_input_without_fuel_is_idle() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::one(ORE), &table);
        assert_eq!(furnace.status(&table), FurnaceStatus::Idle);
        assert!(!furnace.advance(1.0, &table));
        assert_eq!(furnace.progress, 0.0);
    }

    #[test]
    fn test_fuel_runs_out_mid_smelt() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::one(ORE), &table);
        furnace.insert_fuel(ItemStack::one(STICK), &table);

        assert_eq!(run(&mut furnace, &table, 6.0), 0);
        assert!((furnace.progress - 4.0).abs() < 0.2);
        assert_eq!(furnace.fuel_remaining, 0.0);
        assert_eq!(furnace.status(&table), FurnaceStatus::Idle);

        furnace.insert_fuel(ItemStack::one(STICK), &table);
        assert_eq!(run(&mut furnace, &table, 4.5), 1);
        assert!(furnace.input.is_none());
        assert_eq!(furnace.status(&table), FurnaceStatus::Idle);
    }

    #[test]
    fn test_blocked_output_holds_then_resumes() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::new(ORE, 2), &table);
        furnace.insert_fuel(ItemStack::new(COAL, 4), &table);
        furnace.output = Some(ItemStack::new(BAR, MAX_STACK_SIZE));

        assert_eq!(run(&mut furnace, &table, 9.0), 0);
        assert_eq!(furnace.status(&table), FurnaceStatus::Blocked);
        assert_eq!(furnace.progress, 8.0);
        assert_eq!(furnace.phase(&table), 4);
        assert_eq!(furnace.input, Some(ItemStack::new(ORE, 2)));

        assert_eq!(furnace.take_output(), Some(ItemStack::new(BAR, MAX_STACK_SIZE)));
        assert!(furnace.advance(0.1, &table));
        assert_eq!(furnace.output, Some(ItemStack::one(BAR)));
        assert_eq!(furnace.input, Some(ItemStack::one(ORE)));
        assert_eq!(furnace.status(&table), FurnaceStatus::Heating);
    }

    #[test]
    fn test_incompatible_output_blocks() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::one(ORE), &table);
        furnace.insert_fuel(ItemStack::one(COAL), &table);
        furnace.output = Some(ItemStack::one(DIRT));

        run(&mut furnace, &table, 8.5);
        assert_eq!(furnace.status(&table), FurnaceStatus::Blocked);
    }

    #[test]
    fn test_phase_tracks_progress() {
        let table = table();
        let mut furnace = FurnaceState::new();
        assert_eq!(furnace.phase(&table), 0);
        furnace.progress = 3.9;
        assert_eq!(furnace.phase(&table), 1);
        furnace.progress = 6.0;
        assert_eq!(furnace.phase(&table), 3);
    }

    #[test]
    fn test_taking_input_resets_progress() {
        let table = table();
        let mut furnace = FurnaceState::new();
        furnace.insert_input(ItemStack::one(ORE), &table);
        furnace.insert_fuel(ItemStack::one(COAL), &table);
        run(&mut furnace, &table, 3.0);
        assert!(furnace.progress > 0.0);
        assert_eq!(furnace.take_input(), Some(ItemStack::one(ORE)));
        assert_eq!(furnace.progress, 0.0);
        assert_eq!(furnace.status(&table), FurnaceStatus::Idle);
    }
}
