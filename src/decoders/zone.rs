//! Decoders for zone and inventory traffic.

use serde::Serialize;

use super::{DecodeError, IpcMessage};
use crate::assets::GameConstants;
use crate::protocol::BufferReader;

/// Zone transition announcement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitZone {
    pub server_id: u16,
    pub zone_id: u16,
    pub content_finder_condition_id: u16,
    pub layer_set_id: u32,
    pub layout_id: u32,
    pub weather_id: u8,
    pub festival_id: u16,
}

pub fn init_zone(r: &mut BufferReader, _c: &GameConstants) -> Result<IpcMessage, DecodeError> {
    Ok(IpcMessage::InitZone(InitZone {
        server_id: r.read_u16(),
        zone_id: r.read_u16(),
        content_finder_condition_id: r.read_u16(),
        layer_set_id: {
            r.skip(2);
            r.read_u32()
        },
        layout_id: r.read_u32(),
        weather_id: r.read_u8(),
        festival_id: {
            r.skip(1);
            r.read_u16()
        },
    }))
}

/// Client-side inventory mutation request.
///
/// The operation code on the wire is offset by a per-region base value
/// published in the constants table; the decoder normalizes it back to the
/// stable action number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryModify {
    pub sequence: u32,
    pub action: u32,
    pub from_container: u16,
    pub from_slot: u16,
    pub to_container: u16,
    pub to_slot: u16,
    pub quantity: u32,
}

pub fn inventory_modify(
    r: &mut BufferReader,
    constants: &GameConstants,
) -> Result<IpcMessage, DecodeError> {
    let base = constants
        .inventory_operation_base_value()
        .ok_or(DecodeError::MissingConstant("InventoryOperationBaseValue"))?;
    let sequence = r.read_u32();
    let op_code = r.read_u32();
    Ok(IpcMessage::InventoryModify(InventoryModify {
        sequence,
        action: op_code.wrapping_sub(base),
        from_container: {
            r.skip(4);
            r.read_u16()
        },
        from_slot: {
            r.skip(2);
            r.read_u16()
        },
        to_container: {
            r.skip(6);
            r.read_u16()
        },
        to_slot: {
            r.skip(2);
            r.read_u16()
        },
        quantity: {
            r.skip(2);
            r.read_u32()
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::json;

    #[test]
    fn test_init_zone() {
        let mut body = Vec::new();
        body.extend_from_slice(&52u16.to_le_bytes()); // server_id
        body.extend_from_slice(&129u16.to_le_bytes()); // zone_id
        body.extend_from_slice(&0u16.to_le_bytes()); // cfc id
        let mut reader = BufferReader::new(&body);
        let IpcMessage::InitZone(zone) =
            init_zone(&mut reader, &GameConstants::default()).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(zone.server_id, 52);
        assert_eq!(zone.zone_id, 129);
    }

    #[test]
    fn test_inventory_modify_normalizes_action() {
        let constants = GameConstants::from_values(HashMap::from([(
            "InventoryOperationBaseValue".to_string(),
            json!(0x0135),
        )]));
        let mut body = Vec::new();
        body.extend_from_slice(&7u32.to_le_bytes()); // sequence
        body.extend_from_slice(&(0x0135u32 + 2).to_le_bytes()); // op code
        let mut reader = BufferReader::new(&body);
        let IpcMessage::InventoryModify(op) = inventory_modify(&mut reader, &constants).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(op.sequence, 7);
        assert_eq!(op.action, 2);
    }

    #[test]
    fn test_inventory_modify_requires_base_value() {
        let mut reader = BufferReader::new(&[0u8; 32]);
        let err = inventory_modify(&mut reader, &GameConstants::default()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingConstant(_)));
    }
}
