//! Item identifiers, stacks, and mining tools.

use serde::{Deserialize, Serialize};

use crate::registry::MiningCategory;

/// Most items a single stack can hold.
pub const MAX_STACK_SIZE: u32 = 64;

/// Opaque item identifier. The host decides what each value means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u16);

/// A count of one item type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

impl ItemStack {
    /// A stack of `count` items, capped at [`MAX_STACK_SIZE`].
    pub fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            count: count.min(MAX_STACK_SIZE),
        }
    }

    pub fn one(item: ItemId) -> Self {
        Self::new(item, 1)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= MAX_STACK_SIZE
    }

    /// How many more items fit.
    pub fn room(&self) -> u32 {
        MAX_STACK_SIZE.saturating_sub(self.count)
    }

    /// True if all of `other` fits into this stack.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item == other.item && other.count <= self.room()
    }

    /// Moves all of `other` into this stack. Nothing moves unless it all fits.
    pub fn merge(&mut self, other: ItemStack) -> bool {
        if !self.can_merge(&other) {
            return false;
        }
        self.count += other.count;
        true
    }

    /// Takes one item off the stack.
    pub fn split_one(&mut self) -> Option<ItemStack> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(ItemStack::one(self.item))
    }
}

/// Implement held while hitting blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Hand,
    WoodPickaxe,
    StonePickaxe,
    WoodAxe,
}

impl Tool {
    /// Damage dealt per hit against a block of `category`.
    pub fn mining_speed(self, category: MiningCategory) -> f32 {
        use MiningCategory::{Compact, Granular};

        match (self, category) {
            (Tool::Hand, _) => 1.0,
            (Tool::WoodPickaxe, Granular) => 1.0,
            (Tool::WoodPickaxe, Compact) => 1.5,
            (Tool::WoodPickaxe, _) => 1.25,
            (Tool::StonePickaxe, Granular) => 1.25,
            (Tool::StonePickaxe, Compact) => 2.0,
            (Tool::StonePickaxe, _) => 1.5,
            (Tool::WoodAxe, Granular) => 1.25,
            (Tool::WoodAxe, Compact) => 1.0,
            (Tool::WoodAxe, _) => 1.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORE: ItemId = ItemId(3);
    const BAR: ItemId = ItemId(4);

    #[test]
    fn test_stack_capped_at_max() {
        let stack = ItemStack::new(ORE, 100);
        assert_eq!(stack.count, MAX_STACK_SIZE);
        assert!(stack.is_full());
        assert_eq!(stack.room(), 0);
    }

    #[test]
    fn test_merge_same_item() {
        let mut stack = ItemStack::new(BAR, 10);
        assert!(stack.merge(ItemStack::new(BAR, 5)));
        assert_eq!(stack.count, 15);
        assert!(!stack.is_full());
    }

    #[test]
    fn test_merge_rejects_other_item_or_overflow() {
        let mut stack = ItemStack::new(BAR, 60);
        assert!(!stack.merge(ItemStack::one(ORE)));
        assert!(!stack.merge(ItemStack::new(BAR, 5)));
        assert_eq!(stack.count, 60);
        assert!(stack.merge(ItemStack::new(BAR, 4)));
        assert!(stack.is_full());
    }

    #[test]
    fn test_split_one() {
        let mut stack = ItemStack::new(ORE, 2);
        assert_eq!(stack.split_one(), Some(ItemStack::one(ORE)));
        assert_eq!(stack.split_one(), Some(ItemStack::one(ORE)));
        assert!(stack.is_empty());
        assert_eq!(stack.split_one(), None);
    }

    #[test]
    fn test_tool_speeds() {
        use MiningCategory::*;
        assert_eq!(Tool::Hand.mining_speed(Compact), 1.0);
        assert_eq!(Tool::WoodPickaxe.mining_speed(Compact), 1.5);
        assert_eq!(Tool::WoodPickaxe.mining_speed(Natural), 1.25);
        assert_eq!(Tool::StonePickaxe.mining_speed(Granular), 1.25);
        assert_eq!(Tool::StonePickaxe.mining_speed(Compact), 2.0);
        assert_eq!(Tool::WoodAxe.mining_speed(Natural), 1.75);
        assert_eq!(Tool::WoodAxe.mining_speed(Default), 1.75);
        assert_eq!(Tool::WoodAxe.mining_speed(Compact), 1.0);
    }
}
