//! Region-scoped opcode index.
//!
//! The upstream tables publish one entry per region, each with per-category
//! lists of `{name, opcode}` pairs. The index flattens the server-zone and
//! client-zone lists of the active region into a single `opcode → name` map,
//! rebuilt on region change.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Deployment region selecting opcode and constants tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Region {
    Global,
    Chinese,
    Korean,
}

impl Region {
    /// The region's key in the upstream tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Global => "Global",
            Region::Chinese => "CN",
            Region::Korean => "KR",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{name, opcode}` pair from the upstream lists.
#[derive(Debug, Clone, Deserialize)]
pub struct OpcodeEntry {
    pub name: String,
    pub opcode: u16,
}

/// The per-category lists for one region.
///
/// Only the zone-traffic categories are consumed; the lobby and chat
/// categories present upstream are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpcodeLists {
    #[serde(rename = "ServerZoneIpcType", default)]
    pub server_zone: Vec<OpcodeEntry>,
    #[serde(rename = "ClientZoneIpcType", default)]
    pub client_zone: Vec<OpcodeEntry>,
}

/// One region's entry in the upstream opcode table.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionOpcodes {
    pub region: String,
    pub lists: OpcodeLists,
}

/// Flat `opcode → name` map for one region.
///
/// Lookup of an unknown opcode yields the literal name `unknown`. Names are
/// interned as `Arc<str>` once at build time so per-packet lookup never
/// allocates.
pub struct OpcodeTable {
    region: Region,
    names: HashMap<u16, Arc<str>>,
    unknown: Arc<str>,
}

impl OpcodeTable {
    /// Build the flat map for `region` by merging its server-zone and
    /// client-zone lists. Collisions take the later entry; the lists are
    /// disjoint in practice.
    pub fn build(region: Region, tables: &[RegionOpcodes]) -> Self {
        let mut names = HashMap::new();
        if let Some(entry) = tables.iter().find(|t| t.region == region.as_str()) {
            for op in entry
                .lists
                .server_zone
                .iter()
                .chain(entry.lists.client_zone.iter())
            {
                names.insert(op.opcode, Arc::from(lower_first(&op.name)));
            }
        }
        Self {
            region,
            names,
            unknown: Arc::from("unknown"),
        }
    }

    /// An empty table that resolves every opcode to `unknown`.
    pub fn empty(region: Region) -> Self {
        Self {
            region,
            names: HashMap::new(),
            unknown: Arc::from("unknown"),
        }
    }

    /// The region this table was built for.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Resolve an opcode to its message name.
    pub fn name_for(&self, opcode: u16) -> Arc<str> {
        self.names
            .get(&opcode)
            .cloned()
            .unwrap_or_else(|| self.unknown.clone())
    }

    /// The literal `unknown` name, for segments with no resolvable opcode.
    pub fn unknown_name(&self) -> Arc<str> {
        self.unknown.clone()
    }

    /// Number of known opcodes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table holds no opcodes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Lower the first character: `NpcSpawn` → `npcSpawn`.
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
