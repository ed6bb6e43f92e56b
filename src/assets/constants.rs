//! Per-region game constants.
//!
//! The upstream constants table is a free-form JSON object per region; the
//! few values the shipped decoders consume get typed accessors, the rest
//! stay reachable through [`GameConstants::get`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Constants record for one region.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct GameConstants {
    values: HashMap<String, Value>,
}

impl GameConstants {
    /// Build a constants record from raw key-value pairs.
    pub fn from_values(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    /// Raw access to a constant by its upstream key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// A constant interpreted as an unsigned integer.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.values.get(key)?.as_u64()?.try_into().ok()
    }

    /// Base value subtracted from inventory operation codes.
    pub fn inventory_operation_base_value(&self) -> Option<u32> {
        self.get_u32("InventoryOperationBaseValue")
    }
}
