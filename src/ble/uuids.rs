//! BLE Service and Characteristic UUIDs.
//!
//! All Yeelight Blue endpoints share the Bluetooth base UUID with a
//! 16-bit `FFFx` short form.

use uuid::Uuid;

/// Yeelight Blue control service UUID.
pub const LIGHT_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_fff0_0000_1000_8000_00805f9b34fb);

/// Color and brightness control (write, 18 bytes).
pub const CONTROL_UUID: Uuid = Uuid::from_u128(0x0000_fff1_0000_1000_8000_00805f9b34fb);
/// Delayed on/off (write, 8 bytes).
pub const DELAY_UUID: Uuid = Uuid::from_u128(0x0000_fff2_0000_1000_8000_00805f9b34fb);
/// Delay status query (write, 2 bytes).
pub const DELAY_QUERY_UUID: Uuid = Uuid::from_u128(0x0000_fff3_0000_1000_8000_00805f9b34fb);
/// Delay status answer (notify).
pub const DELAY_NOTIFY_UUID: Uuid = Uuid::from_u128(0x0000_fff4_0000_1000_8000_00805f9b34fb);
/// Control status query (write, 1 byte).
pub const QUERY_UUID: Uuid = Uuid::from_u128(0x0000_fff5_0000_1000_8000_00805f9b34fb);
/// Control status answer (notify).
pub const NOTIFY_UUID: Uuid = Uuid::from_u128(0x0000_fff6_0000_1000_8000_00805f9b34fb);
/// Color flow programming (write, 20 bytes).
pub const COLOR_FLOW_UUID: Uuid = Uuid::from_u128(0x0000_fff7_0000_1000_8000_00805f9b34fb);
/// Device name (write).
pub const NAME_UUID: Uuid = Uuid::from_u128(0x0000_fff8_0000_1000_8000_00805f9b34fb);
/// Device name answer (notify).
pub const NAME_NOTIFY_UUID: Uuid = Uuid::from_u128(0x0000_fff9_0000_1000_8000_00805f9b34fb);
/// Color change effect (write, 2 bytes).
pub const COLOR_EFFECT_UUID: Uuid = Uuid::from_u128(0x0000_fffc_0000_1000_8000_00805f9b34fb);

/// Characteristics the lamp pushes notifications on.
pub const NOTIFY_CHARACTERISTICS: [Uuid; 3] = [DELAY_NOTIFY_UUID, NOTIFY_UUID, NAME_NOTIFY_UUID];

/// Human-readable name of a light characteristic, for logging.
pub fn characteristic_name(uuid: &Uuid) -> Option<&'static str> {
    let name = match *uuid {
        CONTROL_UUID => "CONTROL",
        DELAY_UUID => "DELAY",
        DELAY_QUERY_UUID => "DELAY_QUERY",
        DELAY_NOTIFY_UUID => "DELAY_NOTIFY",
        QUERY_UUID => "QUERY",
        NOTIFY_UUID => "NOTIFY",
        COLOR_FLOW_UUID => "COLOR_FLOW",
        NAME_UUID => "NAME",
        NAME_NOTIFY_UUID => "NAME_NOTIFY",
        COLOR_EFFECT_UUID => "COLOR_EFFECT",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        assert_eq!(
            LIGHT_SERVICE_UUID.to_string(),
            "0000fff0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            COLOR_EFFECT_UUID.to_string(),
            "0000fffc-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_characteristic_name() {
        assert_eq!(characteristic_name(&CONTROL_UUID), Some("CONTROL"));
        assert_eq!(characteristic_name(&NOTIFY_UUID), Some("NOTIFY"));
        assert_eq!(characteristic_name(&LIGHT_SERVICE_UUID), None);
    }
}
