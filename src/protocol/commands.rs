//! # TM Series Lifecycle Commands
//!
//! This module implements the fixed command subset the filter sends around
//! the graphics data: device selection and reset, sheet and sensor setup,
//! motion units, drawer kick, buzzer and paper cut.
//!
//! ## Command Model
//!
//! Every command is a [`Command`] value. The byte layout lives in exactly one
//! place ([`Command::to_bytes`]), so header fields can be tested without a
//! sink or a job behind them.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//! - `u32` value 0x12345678 is sent as bytes `[0x78, 0x56, 0x34, 0x12]`

use crate::printer::config::{BuzzerMode, DrawerMode};

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics, motion units and the cutter.
pub const GS: u8 = 0x1D;

/// DLE (Data Link Escape) - Real-time command prefix
///
/// `DLE EOT`, `DLE ENQ` and `DLE DC4` are executed by the printer as soon as
/// they are received, even in the middle of a graphics payload.
pub const DLE: u8 = 0x10;

/// Drawer/buzzer pulse ON time, in 2ms units.
pub const PULSE_ON: u8 = 50;

/// Drawer/buzzer pulse OFF time, in 2ms units.
pub const PULSE_OFF: u8 = 200;

// ============================================================================
// COMMANDS
// ============================================================================

/// A single lifecycle command.
///
/// Each variant encodes to a fixed byte sequence (plus its parameters):
///
/// | Variant | Bytes |
/// |---------|-------|
/// | `Reset` | `ESC = 1 ESC @` |
/// | `SelectPrintSheet` | `ESC c 0 2` |
/// | `SelectConfigSheet` | `ESC c 1 2` |
/// | `DisableNearEndSensor` | `ESC c 3 0` |
/// | `BaseMotionUnits` | `GS P x y` |
/// | `DrawerKick` | `ESC p m 50 200` |
/// | `InternalBuzzer` | `ESC p 1 50 200` |
/// | `ExternalBuzzer` | `ESC ( A 5 0 97 100 1 50 200` |
/// | `FeedAndCut` | `ESC J 0 GS V 66 0` |
/// | `AbsolutePosition` | `ESC $ nL nH` |
/// | `PrintGraphics` | `GS ( L 2 0 48 50` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select the printer as the active device, then initialize it.
    Reset,
    /// Paper roll used for printing: receipt (`ESC c 0`).
    SelectPrintSheet,
    /// Paper roll used for setup output: receipt (`ESC c 1`).
    SelectConfigSheet,
    /// Do not stop printing on the paper near-end sensor (`ESC c 3`).
    DisableNearEndSensor,
    /// Horizontal and vertical motion units (`GS P`).
    BaseMotionUnits { horizontal: u8, vertical: u8 },
    /// Pulse a drawer kick-out connector pin (`ESC p`).
    DrawerKick { pin: u8 },
    /// Sound the buzzer wired to connector pin 5 (`ESC p 1`).
    InternalBuzzer,
    /// Sound an external buzzer (`ESC ( A`).
    ExternalBuzzer,
    /// Feed zero lines, then feed to the cutter and full-cut.
    FeedAndCut,
    /// Absolute print position in motion units (`ESC $`).
    AbsolutePosition { position: u16 },
    /// Print the graphics data in the print buffer (`GS ( L` fn 50).
    PrintGraphics,
}

impl Command {
    /// Encode the command as protocol bytes.
    ///
    /// ## Example
    ///
    /// ```
    /// use tmfilter::protocol::commands::Command;
    ///
    /// assert_eq!(Command::Reset.to_bytes(), vec![0x1B, b'=', 0x01, 0x1B, b'@']);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            Command::Reset => vec![ESC, b'=', 0x01, ESC, b'@'],
            Command::SelectPrintSheet => vec![ESC, b'c', b'0', 0x02],
            Command::SelectConfigSheet => vec![ESC, b'c', b'1', 0x02],
            Command::DisableNearEndSensor => vec![ESC, b'c', b'3', 0x00],
            Command::BaseMotionUnits {
                horizontal,
                vertical,
            } => vec![GS, b'P', horizontal, vertical],
            Command::DrawerKick { pin } => vec![ESC, b'p', pin, PULSE_ON, PULSE_OFF],
            Command::InternalBuzzer => vec![ESC, b'p', 1, PULSE_ON, PULSE_OFF],
            Command::ExternalBuzzer => {
                vec![ESC, b'(', b'A', 5, 0, 97, 100, 1, PULSE_ON, PULSE_OFF]
            }
            Command::FeedAndCut => vec![ESC, b'J', 0, GS, b'V', 66, 0],
            Command::AbsolutePosition { position } => {
                let [nl, nh] = u16_le(position);
                vec![ESC, b'$', nl, nh]
            }
            Command::PrintGraphics => vec![GS, b'(', b'L', 2, 0, 48, 50],
        }
    }

    /// Drawer kick for the configured drawer, if any.
    ///
    /// Drawer 1 is wired to connector pin 2 (`m = 0`), drawer 2 to pin 5
    /// (`m = 1`).
    pub fn drawer_kick(mode: DrawerMode) -> Option<Self> {
        match mode {
            DrawerMode::None => None,
            DrawerMode::Drawer1 => Some(Command::DrawerKick { pin: 0 }),
            DrawerMode::Drawer2 => Some(Command::DrawerKick { pin: 1 }),
        }
    }

    /// Buzzer pulse for the configured buzzer, if any.
    pub fn buzzer(mode: BuzzerMode) -> Option<Self> {
        match mode {
            BuzzerMode::None => None,
            BuzzerMode::Internal => Some(Command::InternalBuzzer),
            BuzzerMode::External => Some(Command::ExternalBuzzer),
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ## Example
///
/// ```
/// use tmfilter::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(576), [0x40, 0x02]); // 576 = 0x0240
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Encode a u32 value as little-endian bytes.
#[inline]
pub const fn u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reset() {
        assert_eq!(Command::Reset.to_bytes(), vec![0x1B, 0x3D, 0x01, 0x1B, 0x40]);
    }

    #[test]
    fn test_sheet_and_sensor() {
        assert_eq!(
            Command::SelectPrintSheet.to_bytes(),
            vec![0x1B, 0x63, 0x30, 0x02]
        );
        assert_eq!(
            Command::SelectConfigSheet.to_bytes(),
            vec![0x1B, 0x63, 0x31, 0x02]
        );
        assert_eq!(
            Command::DisableNearEndSensor.to_bytes(),
            vec![0x1B, 0x63, 0x33, 0x00]
        );
    }

    #[test]
    fn test_base_motion_units() {
        let cmd = Command::BaseMotionUnits {
            horizontal: 180,
            vertical: 180,
        };
        assert_eq!(cmd.to_bytes(), vec![0x1D, 0x50, 180, 180]);
    }

    #[test]
    fn test_drawer_kick_pins() {
        assert_eq!(Command::drawer_kick(DrawerMode::None), None);
        assert_eq!(
            Command::drawer_kick(DrawerMode::Drawer1).map(|c| c.to_bytes()),
            Some(vec![0x1B, 0x70, 0, 50, 200])
        );
        assert_eq!(
            Command::drawer_kick(DrawerMode::Drawer2).map(|c| c.to_bytes()),
            Some(vec![0x1B, 0x70, 1, 50, 200])
        );
    }

    #[test]
    fn test_buzzers() {
        assert_eq!(Command::buzzer(BuzzerMode::None), None);
        assert_eq!(
            Command::buzzer(BuzzerMode::Internal).map(|c| c.to_bytes()),
            Some(vec![0x1B, 0x70, 1, 50, 200])
        );
        assert_eq!(
            Command::buzzer(BuzzerMode::External).map(|c| c.to_bytes()),
            Some(vec![0x1B, 0x28, 0x41, 5, 0, 97, 100, 1, 50, 200])
        );
    }

    #[test]
    fn test_feed_and_cut() {
        assert_eq!(
            Command::FeedAndCut.to_bytes(),
            vec![0x1B, 0x4A, 0x00, 0x1D, 0x56, 0x42, 0x00]
        );
    }

    #[test]
    fn test_absolute_position() {
        assert_eq!(
            Command::AbsolutePosition { position: 0 }.to_bytes(),
            vec![0x1B, 0x24, 0, 0]
        );
        assert_eq!(
            Command::AbsolutePosition { position: 300 }.to_bytes(),
            vec![0x1B, 0x24, 0x2C, 0x01]
        );
    }

    #[test]
    fn test_print_graphics() {
        assert_eq!(
            Command::PrintGraphics.to_bytes(),
            vec![0x1D, 0x28, 0x4C, 2, 0, 48, 50]
        );
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
    }

    #[test]
    fn test_u32_le() {
        assert_eq!(u32_le(11), [11, 0, 0, 0]);
        assert_eq!(u32_le(0x0102_0304), [0x04, 0x03, 0x02, 0x01]);
    }
}
