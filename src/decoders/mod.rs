//! Message decoders keyed by opcode name.
//!
//! The registry is a static table from message name to a pure decode
//! function. Each decoder performs sequential reads from a [`BufferReader`]
//! positioned at the start of an IPC body and returns a typed record;
//! fixed-length arrays are read by repeating primitive reads. Decoders never
//! allocate buffers of their own.
//!
//! A name missing from the table simply means the body is not decoded; the
//! `message` event still carries the name and the raw bytes.

mod actor;
mod zone;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use crate::assets::GameConstants;
use crate::protocol::BufferReader;

pub use actor::{
    ActorCast, ActorControl, ActorControlSelf, ActorControlTarget, ActorMove, ActorSetPos,
    EffectResult, EffectResultEntry, NpcSpawn, PlayerSetup, PlayerSpawn, PlayerStats, StatusEffect,
    StatusEffectList, UpdateClassInfo, UpdateHpMpTp, NUM_STATUS_EFFECTS,
};
pub use zone::{InitZone, InventoryModify};

/// Number of bytes in an appearance blob.
pub const APPEARANCE_BYTES: usize = 26;

/// Failure raised by a decoder; reported on the `error` stream while the
/// segment and packet are still emitted with the raw body.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The region constants record lacks a value the decoder needs.
    #[error("missing game constant {0}")]
    MissingConstant(&'static str),

    /// A field held a value outside its wire contract.
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: u64 },
}

/// A decoded IPC message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum IpcMessage {
    NpcSpawn(NpcSpawn),
    PlayerSpawn(PlayerSpawn),
    PlayerSetup(PlayerSetup),
    PlayerStats(PlayerStats),
    UpdateHpMpTp(UpdateHpMpTp),
    UpdateClassInfo(UpdateClassInfo),
    StatusEffectList(StatusEffectList),
    ActorControl(ActorControl),
    ActorControlSelf(ActorControlSelf),
    ActorControlTarget(ActorControlTarget),
    ActorCast(ActorCast),
    ActorMove(ActorMove),
    ActorSetPos(ActorSetPos),
    EffectResult(EffectResult),
    InitZone(InitZone),
    InventoryModify(InventoryModify),
}

/// Signature shared by every decoder.
pub type DecoderFn = fn(&mut BufferReader, &GameConstants) -> Result<IpcMessage, DecodeError>;

/// The static name → decoder table.
pub fn registry() -> &'static HashMap<&'static str, DecoderFn> {
    static REGISTRY: OnceLock<HashMap<&'static str, DecoderFn>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut table: HashMap<&'static str, DecoderFn> = HashMap::new();
        table.insert("npcSpawn", actor::npc_spawn);
        table.insert("playerSpawn", actor::player_spawn);
        table.insert("playerSetup", actor::player_setup);
        table.insert("playerStats", actor::player_stats);
        table.insert("updateHpMpTp", actor::update_hp_mp_tp);
        table.insert("updateClassInfo", actor::update_class_info);
        table.insert("statusEffectList", actor::status_effect_list);
        table.insert("actorControl", actor::actor_control);
        table.insert("actorControlSelf", actor::actor_control_self);
        table.insert("actorControlTarget", actor::actor_control_target);
        table.insert("actorCast", actor::actor_cast);
        table.insert("actorMove", actor::actor_move);
        table.insert("actorSetPos", actor::actor_set_pos);
        table.insert("effectResult", actor::effect_result);
        table.insert("initZone", zone::init_zone);
        table.insert("inventoryModifyHandler", zone::inventory_modify);
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_static_and_complete() {
        let table = registry();
        assert_eq!(table.len(), 16);
        assert!(table.contains_key("npcSpawn"));
        assert!(table.contains_key("inventoryModifyHandler"));
        assert!(!table.contains_key("unknown"));
        // Two calls observe the same table.
        assert!(std::ptr::eq(registry(), table));
    }

    #[test]
    fn test_missing_entry_means_no_decode() {
        assert!(registry().get("examineSearchInfo").is_none());
    }
}
