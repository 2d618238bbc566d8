//! Block type catalog: maps compact [`BlockId`] values to immutable [`BlockTypeDef`] descriptors.
//!
//! The catalog is built once during startup and then shared read-only. Air is
//! always ID 0 so that freshly allocated chunk storage represents empty space.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Maximum number of block types, including Air (byte-sized IDs).
pub const MAX_BLOCK_TYPES: usize = 256;

/// Compact identifier stored inside every cell (1 byte).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u8);

impl BlockId {
    /// The reserved empty cell.
    pub const AIR: BlockId = BlockId(0);

    /// Returns `true` for the reserved empty ID.
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Material class used to pick a tool's mining speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MiningCategory {
    /// No tool affinity.
    #[default]
    Default,
    /// Loose material (dirt, sand, grass).
    Granular,
    /// Dense material (stone, ore, furnace).
    Compact,
    /// Organic material (wood, planks, leaves).
    Natural,
}

/// Periodic behaviour run by the bounded tick scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickBehavior {
    /// Never ticks.
    #[default]
    Inert,
    /// Rewrites the cell to `surface` once the cell above is no longer solid.
    Uncover {
        /// Block the cell turns into when exposed.
        surface: BlockId,
    },
}

/// Full descriptor for a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// Human-readable name (e.g. "stone", "sand").
    pub name: String,
    /// Whether entities and rays collide with this block.
    pub solid: bool,
    /// Damage a cell must accumulate before it breaks.
    pub hardness: f32,
    /// Tool affinity class.
    pub mining_category: MiningCategory,
    /// Falls into a non-solid cell below during gravity passes.
    pub affected_by_gravity: bool,
    /// Movement speed multiplier for entities standing on this block.
    pub speed_multiplier: f32,
    /// Whether contact hurts entities.
    pub does_damage: bool,
    /// Health removed per contact when `does_damage` is set.
    pub damage_amount: i32,
    /// Periodic behaviour.
    pub tick: TickBehavior,
}

impl BlockTypeDef {
    /// The reserved empty descriptor.
    pub fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            hardness: 0.0,
            mining_category: MiningCategory::Default,
            affected_by_gravity: false,
            speed_multiplier: 1.0,
            does_damage: false,
            damage_amount: 0,
            tick: TickBehavior::Inert,
        }
    }

    /// A plain solid block with default movement, no damage and no ticking.
    pub fn solid(name: impl Into<String>, hardness: f32, mining_category: MiningCategory) -> Self {
        Self {
            name: name.into(),
            solid: true,
            hardness,
            mining_category,
            affected_by_gravity: false,
            speed_multiplier: 1.0,
            does_damage: false,
            damage_amount: 0,
            tick: TickBehavior::Inert,
        }
    }

    /// Returns `true` if the scheduler should run this type's tick behaviour.
    pub fn tickable(&self) -> bool {
        self.tick != TickBehavior::Inert
    }
}

/// Errors that can occur during block type registration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A type with the same name has already been registered.
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
    /// All byte-sized slots have been consumed.
    #[error("block catalog is full (max {MAX_BLOCK_TYPES} types)")]
    CatalogFull,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Dense registry where `index == BlockId.0`, with reverse lookup by name.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    types: Vec<BlockTypeDef>,
    name_to_id: FxHashMap<String, BlockId>,
}

impl BlockCatalog {
    /// Creates a catalog with Air pre-registered as ID 0.
    pub fn new() -> Self {
        let mut name_to_id = FxHashMap::default();
        name_to_id.insert("air".to_string(), BlockId::AIR);

        Self {
            types: vec![BlockTypeDef::air()],
            name_to_id,
        }
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is Air).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateName`] if the name is taken, or
    /// [`CatalogError::CatalogFull`] once all 256 IDs are in use. Either is a
    /// startup configuration error; the host should abort initialisation.
    pub fn register(&mut self, def: BlockTypeDef) -> Result<BlockId, CatalogError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(CatalogError::DuplicateName(def.name));
        }
        if self.types.len() >= MAX_BLOCK_TYPES {
            return Err(CatalogError::CatalogFull);
        }

        let id = BlockId(self.types.len() as u8);
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the descriptor for `id`.
    ///
    /// Unregistered IDs resolve to the Air descriptor, so stray bytes in
    /// storage read as empty space rather than failing.
    pub fn get(&self, id: BlockId) -> &BlockTypeDef {
        self.types.get(id.0 as usize).unwrap_or(&self.types[0])
    }

    /// Returns the ID for a named block type, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Shorthand for `get(id).solid`.
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).solid
    }

    /// Returns the total number of registered types (including Air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only Air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    /// Iterates over `(id, descriptor)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockTypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, def)| (BlockId(i as u8), def))
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
