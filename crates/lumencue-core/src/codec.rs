//! Wall-light controller wire protocol
//!
//! Each command is a single 9-byte UDP datagram:
//!
//! ```text
//! [opcode=4][zone][unit][flags=14][hue][saturation][value][fadeHigh][fadeLow]
//! ```
//!
//! Opcode 4 sets a unit to an HSV color; flags 14 selects all three HSV
//! components. Fade is a device-side linear transition in tenths of a second.

/// Length of an encoded command
pub const COMMAND_LEN: usize = 9;

/// Set-unit-HSV opcode
pub const OPCODE_SET_HSV: u8 = 4;

/// Flags selecting hue, saturation and value
pub const FLAGS_HSV: u8 = 14;

/// Highest saturation the controller firmware handles correctly
pub const MAX_SATURATION: u8 = 254;

/// One wall-light command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallLightCommand {
    /// Zone address
    pub zone: u8,
    /// Unit address within the zone, 0 addresses the whole zone
    pub unit: u8,
    /// Hue
    pub hue: u8,
    /// Saturation, clamped to [`MAX_SATURATION`] on encode
    pub saturation: u8,
    /// Value (brightness)
    pub value: u8,
    /// Fade time in tenths of a second
    pub fade: u16,
}

impl WallLightCommand {
    /// Encode into the 9-byte wire format
    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        // Firmware misbehaves on a saturation of 255
        let saturation = self.saturation.min(MAX_SATURATION);
        let fade_low = self.fade & 0xFF;
        let fade_high = (self.fade - fade_low) >> 8;

        [
            OPCODE_SET_HSV,
            self.zone,
            self.unit,
            FLAGS_HSV,
            self.hue,
            saturation,
            self.value,
            fade_high as u8,
            fade_low as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let cmd = WallLightCommand {
            zone: 101,
            unit: 107,
            hue: 64,
            saturation: 200,
            value: 254,
            fade: 0,
        };
        assert_eq!(cmd.encode(), [4, 101, 107, 14, 64, 200, 254, 0, 0]);
    }

    #[test]
    fn test_saturation_clamped() {
        let cmd = WallLightCommand {
            zone: 200,
            unit: 201,
            hue: 10,
            saturation: 255,
            value: 254,
            fade: 0,
        };
        assert_eq!(cmd.encode()[5], 254);
    }

    #[test]
    fn test_fade_split() {
        let cmd = WallLightCommand {
            zone: 200,
            unit: 0,
            hue: 0,
            saturation: 0,
            value: 0,
            fade: 0x1234,
        };
        let bytes = cmd.encode();
        assert_eq!(bytes[7], 0x12);
        assert_eq!(bytes[8], 0x34);
    }
}
