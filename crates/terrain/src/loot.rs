//! Chest loot tables.
//!
//! Tables are defined in JSON as pools of weighted entries; rolling a table
//! produces item stacks, which can then be scattered across a fixed-size
//! inventory one item at a time.

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// Number of slots in a single chest inventory (3 rows × 9 columns).
pub const CHEST_SLOT_COUNT: usize = 27;

/// Loot table definition or validation error.
#[derive(Debug, Error)]
pub enum LootError {
    #[error("malformed loot table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid range: min {min} > max {max}")]
    InvalidRange { min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RangeDef {
    min: u32,
    max: u32,
}

impl RangeDef {
    fn validate(&self) -> Result<(), LootError> {
        if self.min > self.max {
            return Err(LootError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn roll(&self, rng: &mut impl Rng) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
struct EntryDef {
    item: String,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    amount: Option<RangeDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct PoolDef {
    rolls: RangeDef,
    entries: Vec<EntryDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct LootTableDef {
    pools: Vec<PoolDef>,
}

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
}

/// Fixed-size slot container to receive loot.
#[derive(Debug, Clone)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots[index].as_ref()
    }

    /// Total item count across all slots.
    pub fn item_count(&self) -> u32 {
        self.slots
            .iter()
            .flatten()
            .map(|stack| stack.count)
            .sum()
    }
}

/// Parsed chest loot table.
#[derive(Debug, Clone)]
pub struct LootTable {
    pools: Vec<PoolDef>,
}

impl LootTable {
    /// Parse and validate a loot table from its JSON definition.
    pub fn from_json(json: &str) -> Result<Self, LootError> {
        let def: LootTableDef = serde_json::from_str(json)?;
        for pool in &def.pools {
            pool.rolls.validate()?;
            for entry in &pool.entries {
                if let Some(amount) = &entry.amount {
                    amount.validate()?;
                }
            }
        }
        Ok(Self { pools: def.pools })
    }

    /// Roll every pool, producing the stacks of one loot sampling.
    pub fn roll(&self, rng: &mut impl Rng) -> Vec<ItemStack> {
        let mut stacks = Vec::new();
        for pool in &self.pools {
            let total_weight: u32 = pool.entries.iter().map(|e| e.weight).sum();
            if total_weight == 0 {
                continue;
            }
            let rolls = pool.rolls.roll(rng);
            for _ in 0..rolls {
                let mut pick = rng.gen_range(0..total_weight);
                for entry in &pool.entries {
                    if pick < entry.weight {
                        let count = match &entry.amount {
                            Some(amount) => amount.roll(rng),
                            None => 1,
                        };
                        if count > 0 {
                            stacks.push(ItemStack {
                                item: entry.item.clone(),
                                count,
                            });
                        }
                        break;
                    }
                    pick -= entry.weight;
                }
            }
        }
        stacks
    }

    /// Roll the table and scatter the result across the inventory.
    ///
    /// Each stack is placed one item at a time into random slots, merging into
    /// slots already holding the same item, with at most 10 placement attempts
    /// per stack; items that find no slot within the attempt budget are
    /// dropped.
    pub fn fill_inventory(&self, inventory: &mut Inventory, rng: &mut impl Rng) {
        for stack in self.roll(rng) {
            let mut remaining = stack.count;
            let mut attempts = 0;
            while remaining > 0 && attempts < 10 {
                let slot = rng.gen_range(0..inventory.slots.len());
                match &mut inventory.slots[slot] {
                    empty @ None => {
                        *empty = Some(ItemStack {
                            item: stack.item.clone(),
                            count: 1,
                        });
                        remaining -= 1;
                    }
                    Some(existing) if existing.item == stack.item => {
                        existing.count += 1;
                        remaining -= 1;
                    }
                    _ => {}
                }
                attempts += 1;
            }
        }
    }
}
