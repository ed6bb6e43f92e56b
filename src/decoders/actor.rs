//! Decoders for actor-centric messages: spawns, vitals, status effects,
//! control channels, casts, and movement.

use serde::Serialize;

use super::{DecodeError, IpcMessage, APPEARANCE_BYTES};
use crate::assets::GameConstants;
use crate::protocol::{BufferReader, Position3};

/// Length of the status effect array carried by spawn and list messages.
pub const NUM_STATUS_EFFECTS: usize = 30;

/// One entry of a status effect array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub effect_id: u16,
    pub param: u16,
    pub duration: f32,
    pub source_actor_id: u32,
}

fn read_effects(r: &mut BufferReader) -> Vec<StatusEffect> {
    (0..NUM_STATUS_EFFECTS)
        .map(|_| StatusEffect {
            effect_id: r.read_u16(),
            param: r.read_u16(),
            duration: r.read_f32(),
            source_actor_id: r.read_u32(),
        })
        .collect()
}

/// An NPC entering the spawn range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcSpawn {
    pub gimmick_id: u32,
    pub online_status: u8,
    pub gm_rank: u8,
    pub aggression_mode: u8,
    pub enemy_type: u8,
    pub owner_id: u32,
    pub b_npc_base: u32,
    pub b_npc_name: u32,
    pub level_id: u32,
    pub hp_max: u32,
    pub hp_cur: u32,
    pub display_flags: u32,
    pub fate_id: u16,
    pub mp_cur: u16,
    pub mp_max: u16,
    pub model_chara: u16,
    pub rotation: u16,
    pub active_minion: u16,
    pub spawn_index: u8,
    pub state: u8,
    pub persistent_emote: u8,
    pub model_type: u8,
    pub subtype: u8,
    pub voice: u8,
    pub level: u8,
    pub class_job: u8,
    pub mount_id: u16,
    pub effects: Vec<StatusEffect>,
    pub pos: Position3,
    pub models: Vec<u32>,
    pub look: Vec<u8>,
    pub name: String,
    pub fc_tag: String,
}

pub fn npc_spawn(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::NpcSpawn(NpcSpawn {
        gimmick_id: r.read_u32(),
        online_status: r.read_u8(),
        gm_rank: r.read_u8(),
        aggression_mode: r.read_u8(),
        enemy_type: r.read_u8(),
        owner_id: r.read_u32(),
        b_npc_base: r.read_u32(),
        b_npc_name: r.read_u32(),
        level_id: r.read_u32(),
        hp_max: r.read_u32(),
        hp_cur: r.read_u32(),
        display_flags: r.read_u32(),
        fate_id: r.read_u16(),
        mp_cur: r.read_u16(),
        mp_max: r.read_u16(),
        model_chara: r.read_u16(),
        rotation: r.read_u16(),
        active_minion: r.read_u16(),
        spawn_index: r.read_u8(),
        state: r.read_u8(),
        persistent_emote: r.read_u8(),
        model_type: r.read_u8(),
        subtype: r.read_u8(),
        voice: r.read_u8(),
        level: r.read_u8(),
        class_job: r.read_u8(),
        mount_id: r.read_u16(),
        effects: read_effects(r),
        pos: r.read_position3(),
        models: (0..10).map(|_| r.read_u32()).collect(),
        look: r.read_bytes(APPEARANCE_BYTES),
        name: r.read_string(),
        fc_tag: r.read_string(),
    }))
}

/// A player character entering the spawn range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSpawn {
    pub title: u16,
    pub u1b: u16,
    pub current_world_id: u16,
    pub home_world_id: u16,
    pub gm_rank: u8,
    pub online_status: u8,
    pub pose: u8,
    pub target_id: u64,
    pub b_npc_base: u32,
    pub b_npc_name: u32,
    pub hp_max: u32,
    pub hp_cur: u32,
    pub display_flags: u32,
    pub fate_id: u16,
    pub mp_cur: u16,
    pub mp_max: u16,
    pub model_chara: u16,
    pub rotation: u16,
    pub active_minion: u16,
    pub spawn_index: u8,
    pub state: u8,
    pub persistent_emote: u8,
    pub model_type: u8,
    pub subtype: u8,
    pub voice: u8,
    pub level: u8,
    pub class_job: u8,
    pub mount_id: u16,
    pub effects: Vec<StatusEffect>,
    pub pos: Position3,
    pub models: Vec<u32>,
    pub look: Vec<u8>,
    pub name: String,
    pub fc_tag: String,
}

pub fn player_spawn(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::PlayerSpawn(PlayerSpawn {
        title: r.read_u16(),
        u1b: r.read_u16(),
        current_world_id: r.read_u16(),
        home_world_id: r.read_u16(),
        gm_rank: r.read_u8(),
        online_status: r.read_u8(),
        pose: r.read_u8(),
        target_id: {
            r.skip(1);
            r.read_u64()
        },
        b_npc_base: r.read_u32(),
        b_npc_name: r.read_u32(),
        hp_max: r.read_u32(),
        hp_cur: r.read_u32(),
        display_flags: r.read_u32(),
        fate_id: r.read_u16(),
        mp_cur: r.read_u16(),
        mp_max: r.read_u16(),
        model_chara: r.read_u16(),
        rotation: r.read_u16(),
        active_minion: r.read_u16(),
        spawn_index: r.read_u8(),
        state: r.read_u8(),
        persistent_emote: r.read_u8(),
        model_type: r.read_u8(),
        subtype: r.read_u8(),
        voice: r.read_u8(),
        level: r.read_u8(),
        class_job: r.read_u8(),
        mount_id: r.read_u16(),
        effects: read_effects(r),
        pos: r.read_position3(),
        models: (0..10).map(|_| r.read_u32()).collect(),
        look: r.read_bytes(APPEARANCE_BYTES),
        name: r.read_string(),
        fc_tag: r.read_string(),
    }))
}

/// Initial character state sent once after login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSetup {
    pub content_id: u64,
    pub character_id: u32,
    pub rested_exp: u32,
    pub companion_current_exp: u32,
    pub max_level: u8,
    pub expansion: u8,
    pub race: u8,
    pub tribe: u8,
    pub gender: u8,
    pub current_job: u8,
    pub current_class: u8,
    pub name: String,
}

pub fn player_setup(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::PlayerSetup(PlayerSetup {
        content_id: r.read_u64(),
        character_id: {
            r.skip(8);
            r.read_u32()
        },
        rested_exp: r.read_u32(),
        companion_current_exp: r.read_u32(),
        max_level: {
            r.skip(4);
            r.read_u8()
        },
        expansion: r.read_u8(),
        race: {
            r.skip(1);
            r.read_u8()
        },
        tribe: r.read_u8(),
        gender: r.read_u8(),
        current_job: r.read_u8(),
        current_class: r.read_u8(),
        name: {
            r.skip(16);
            r.read_string()
        },
    }))
}

/// Periodic stat block for the local player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub strength: u32,
    pub dexterity: u32,
    pub vitality: u32,
    pub intelligence: u32,
    pub mind: u32,
    pub piety: u32,
    pub hp: u32,
    pub mp: u32,
    pub tp: u32,
    pub gp: u32,
    pub cp: u32,
    pub tenacity: u32,
    pub attack_power: u32,
    pub defense: u32,
    pub direct_hit: u32,
    pub magic_defense: u32,
    pub critical_hit: u32,
    pub attack_magic_potency: u32,
    pub healing_magic_potency: u32,
    pub determination: u32,
    pub skill_speed: u32,
    pub spell_speed: u32,
}

pub fn player_stats(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::PlayerStats(PlayerStats {
        strength: r.read_u32(),
        dexterity: r.read_u32(),
        vitality: r.read_u32(),
        intelligence: r.read_u32(),
        mind: r.read_u32(),
        piety: r.read_u32(),
        hp: r.read_u32(),
        mp: r.read_u32(),
        tp: r.read_u32(),
        gp: r.read_u32(),
        cp: r.read_u32(),
        tenacity: r.read_u32(),
        attack_power: r.read_u32(),
        defense: r.read_u32(),
        direct_hit: r.read_u32(),
        magic_defense: r.read_u32(),
        critical_hit: r.read_u32(),
        attack_magic_potency: r.read_u32(),
        healing_magic_potency: r.read_u32(),
        determination: r.read_u32(),
        skill_speed: r.read_u32(),
        spell_speed: r.read_u32(),
    }))
}

/// Vitals tick for a single actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHpMpTp {
    pub hp: u32,
    pub mp: u16,
    pub tp: u16,
}

pub fn update_hp_mp_tp(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::UpdateHpMpTp(UpdateHpMpTp {
        hp: r.read_u32(),
        mp: r.read_u16(),
        tp: r.read_u16(),
    }))
}

/// Class/job switch or level change for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassInfo {
    pub class_id: u8,
    pub level1: u8,
    pub level: u16,
    pub next_level_index: u32,
    pub current_exp: u32,
    pub rested_exp: u32,
}

pub fn update_class_info(
    r: &mut BufferReader,
    _c: &GameConstants,
) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::UpdateClassInfo(UpdateClassInfo {
        class_id: r.read_u8(),
        level1: r.read_u8(),
        level: r.read_u16(),
        next_level_index: r.read_u32(),
        current_exp: r.read_u32(),
        rested_exp: r.read_u32(),
    }))
}

/// Full status effect refresh for one actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffectList {
    pub class_id: u8,
    pub level1: u8,
    pub level: u16,
    pub hp_cur: u32,
    pub hp_max: u32,
    pub mp_cur: u16,
    pub mp_max: u16,
    pub shield_percentage: u16,
    pub effects: Vec<StatusEffect>,
}

pub fn status_effect_list(
    r: &mut BufferReader,
    _c: &GameConstants,
) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::StatusEffectList(StatusEffectList {
        class_id: r.read_u8(),
        level1: r.read_u8(),
        level: r.read_u16(),
        hp_cur: r.read_u32(),
        hp_max: r.read_u32(),
        mp_cur: r.read_u16(),
        mp_max: r.read_u16(),
        shield_percentage: r.read_u16(),
        effects: {
            r.skip(2);
            read_effects(r)
        },
    }))
}

/// Generic actor control channel (category plus four parameters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorControl {
    pub category: u16,
    pub param1: u32,
    pub param2: u32,
    pub param3: u32,
    pub param4: u32,
}

pub fn actor_control(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorControl(ActorControl {
        category: {
            let category = r.read_u16();
            r.skip(2);
            category
        },
        param1: r.read_u32(),
        param2: r.read_u32(),
        param3: r.read_u32(),
        param4: r.read_u32(),
    }))
}

/// Actor control addressed to the local player (six parameters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorControlSelf {
    pub category: u16,
    pub param1: u32,
    pub param2: u32,
    pub param3: u32,
    pub param4: u32,
    pub param5: u32,
    pub param6: u32,
}

pub fn actor_control_self(
    r: &mut BufferReader,
    _c: &GameConstants,
) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorControlSelf(ActorControlSelf {
        category: {
            let category = r.read_u16();
            r.skip(2);
            category
        },
        param1: r.read_u32(),
        param2: r.read_u32(),
        param3: r.read_u32(),
        param4: r.read_u32(),
        param5: r.read_u32(),
        param6: r.read_u32(),
    }))
}

/// Actor control carrying an explicit target id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorControlTarget {
    pub category: u16,
    pub param1: u32,
    pub param2: u32,
    pub param3: u32,
    pub param4: u32,
    pub target_id: u64,
}

pub fn actor_control_target(
    r: &mut BufferReader,
    _c: &GameConstants,
) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorControlTarget(ActorControlTarget {
        category: {
            let category = r.read_u16();
            r.skip(2);
            category
        },
        param1: r.read_u32(),
        param2: r.read_u32(),
        param3: r.read_u32(),
        param4: r.read_u32(),
        target_id: {
            r.skip(4);
            r.read_u64()
        },
    }))
}

/// An actor starting a cast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorCast {
    pub action_id: u16,
    pub skill_type: u8,
    pub cast_time: f32,
    pub target_id: u32,
    pub rotation: f32,
    pub pos: Position3,
}

pub fn actor_cast(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorCast(ActorCast {
        action_id: r.read_u16(),
        skill_type: {
            let skill_type = r.read_u8();
            r.skip(1);
            skill_type
        },
        cast_time: {
            r.skip(4);
            r.read_f32()
        },
        target_id: r.read_u32(),
        rotation: r.read_f32(),
        pos: {
            r.skip(4);
            r.read_position3()
        },
    }))
}

/// Quantized actor movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorMove {
    pub head_rotation: u8,
    pub rotation: u8,
    pub anim_type: u8,
    pub anim_state: u8,
    pub anim_speed: u8,
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

pub fn actor_move(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorMove(ActorMove {
        head_rotation: r.read_u8(),
        rotation: r.read_u8(),
        anim_type: r.read_u8(),
        anim_state: r.read_u8(),
        anim_speed: r.read_u8(),
        x: {
            r.skip(1);
            r.read_u16()
        },
        y: r.read_u16(),
        z: r.read_u16(),
    }))
}

/// Authoritative actor reposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSetPos {
    pub rotation: u16,
    pub wait_for_load: u8,
    pub pos: Position3,
}

pub fn actor_set_pos(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::ActorSetPos(ActorSetPos {
        rotation: r.read_u16(),
        wait_for_load: {
            let wait = r.read_u8();
            r.skip(1);
            wait
        },
        pos: {
            r.skip(4);
            r.read_position3()
        },
    }))
}

/// One applied-effect entry of an [`EffectResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectResultEntry {
    pub effect_index: u8,
    pub effect_id: u16,
    pub duration: f32,
    pub source_actor_id: u32,
}

/// Outcome of an action landing on an actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectResult {
    pub global_sequence: u32,
    pub actor_id: u32,
    pub hp_cur: u32,
    pub hp_max: u32,
    pub mp_cur: u16,
    pub shield_percentage: u8,
    pub entry_count: u8,
    pub entries: Vec<EffectResultEntry>,
}

pub fn effect_result(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    let global_sequence = r.read_u32();
    let actor_id = r.read_u32();
    let hp_cur = r.read_u32();
    let hp_max = r.read_u32();
    let mp_cur = r.read_u16();
    r.skip(1);
    let shield_percentage = r.read_u8();
    let entry_count = r.read_u8();
    r.skip(3);
    // Four slots on the wire; entry_count says how many are live.
    let mut entries = Vec::with_capacity(4);
    for slot in 0..4u8 {
        let entry = EffectResultEntry {
            effect_index: {
                let index = r.read_u8();
                r.skip(1);
                index
            },
            effect_id: r.read_u16(),
            duration: {
                r.skip(4);
                r.read_f32()
            },
            source_actor_id: r.read_u32(),
        };
        if slot < entry_count.min(4) {
            entries.push(entry);
        }
    }
    Ok(IpcMessage::EffectResult(EffectResult {
        global_sequence,
        actor_id,
        hp_cur,
        hp_max,
        mp_cur,
        shield_percentage,
        entry_count,
        entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GameConstants;

    #[test]
    fn test_npc_spawn_zero_padded_body() {
        let body = vec![0u8; 64];
        let mut reader = BufferReader::new(&body);
        let constants = GameConstants::default();
        let IpcMessage::NpcSpawn(spawn) = npc_spawn(&mut reader, &constants).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(spawn.gimmick_id, 0);
        assert_eq!(spawn.effects.len(), NUM_STATUS_EFFECTS);
        assert_eq!(spawn.models.len(), 10);
        assert_eq!(spawn.look.len(), APPEARANCE_BYTES);
        assert!(spawn.name.is_empty());
        // Short body: the reader zero-filled past the end.
        assert!(reader.is_truncated());
    }

    #[test]
    fn test_npc_spawn_reads_leading_fields_in_order() {
        let mut body = vec![0u8; 512];
        body[0..4].copy_from_slice(&0x0000_1234u32.to_le_bytes()); // gimmick_id
        body[4] = 5; // online_status
        body[8..12].copy_from_slice(&0x0AAA_0001u32.to_le_bytes()); // owner_id
        let mut reader = BufferReader::new(&body);
        let IpcMessage::NpcSpawn(spawn) =
            npc_spawn(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(spawn.gimmick_id, 0x1234);
        assert_eq!(spawn.online_status, 5);
        assert_eq!(spawn.owner_id, 0x0AAA_0001);
        assert!(!reader.is_truncated());
    }

    #[test]
    fn test_update_hp_mp_tp() {
        let mut body = Vec::new();
        body.extend_from_slice(&75_000u32.to_le_bytes());
        body.extend_from_slice(&9_800u16.to_le_bytes());
        body.extend_from_slice(&1_000u16.to_le_bytes());
        let mut reader = BufferReader::new(&body);
        let IpcMessage::UpdateHpMpTp(vitals) =
            update_hp_mp_tp(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(vitals.hp, 75_000);
        assert_eq!(vitals.mp, 9_800);
        assert_eq!(vitals.tp, 1_000);
    }

    #[test]
    fn test_actor_control_category_and_params() {
        let mut body = Vec::new();
        body.extend_from_slice(&0x0006u16.to_le_bytes()); // category
        body.extend_from_slice(&[0, 0]); // padding
        for p in [1u32, 2, 3, 4] {
            body.extend_from_slice(&p.to_le_bytes());
        }
        let mut reader = BufferReader::new(&body);
        let IpcMessage::ActorControl(ctrl) =
            actor_control(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(ctrl.category, 6);
        assert_eq!((ctrl.param1, ctrl.param2, ctrl.param3, ctrl.param4), (1, 2, 3, 4));
    }

    #[test]
    fn test_status_effect_list_effect_array() {
        // First effect entry starts after the 18-byte prefix + 2 pad bytes.
        let mut body = vec![0u8; 20];
        body.extend_from_slice(&50u16.to_le_bytes()); // effect_id
        body.extend_from_slice(&1u16.to_le_bytes()); // param
        body.extend_from_slice(&30.0f32.to_le_bytes()); // duration
        body.extend_from_slice(&0xE000_0000u32.to_le_bytes()); // source
        let mut reader = BufferReader::new(&body);
        let IpcMessage::StatusEffectList(list) =
            status_effect_list(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(list.effects.len(), NUM_STATUS_EFFECTS);
        assert_eq!(list.effects[0].effect_id, 50);
        assert_eq!(list.effects[0].duration, 30.0);
        assert_eq!(list.effects[0].source_actor_id, 0xE000_0000);
    }

    #[test]
    fn test_effect_result_entry_count_caps_entries() {
        let mut body = vec![0u8; 96];
        body[19] = 2; // entry_count
        let mut reader = BufferReader::new(&body);
        let IpcMessage::EffectResult(result) =
            effect_result(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(result.entry_count, 2);
        assert_eq!(result.entries.len(), 2);
    }
}
