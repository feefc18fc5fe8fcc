//! # Graphics Data Sanitizer
//!
//! The printer watches its input for real-time commands even inside a
//! graphics payload. Pixel bytes that happen to spell one of these would be
//! executed instead of printed:
//!
//! | Pair | Command | Rewritten first byte |
//! |------|---------|----------------------|
//! | `10 04` | DLE EOT (status) | `30` |
//! | `10 05` | DLE ENQ (recovery) | `30` |
//! | `10 14` | DLE DC4 (pulse/cancel) | `30` |
//! | `1B 3D` | ESC = (select device) | `3B` |
//!
//! The rewrite flips dots in the affected byte. It is applied one pass,
//! left to right, looking one byte ahead; the printer does not undo it.

use crate::protocol::commands::{DLE, ESC};

/// Second bytes that turn a DLE into a real-time command.
const DLE_COMMANDS: [u8; 3] = [0x04, 0x05, 0x14];

const DLE_REPLACEMENT: u8 = 0x30;
const ESC_REPLACEMENT: u8 = 0x3B;

/// Rewrite command-like byte pairs in `data` in place.
///
/// ## Example
///
/// ```
/// use tmfilter::page::sanitize::sanitize;
///
/// let mut data = [0x10, 0x04, 0x1B, 0x3D, 0x10, 0x10];
/// sanitize(&mut data);
/// assert_eq!(data, [0x30, 0x04, 0x3B, 0x3D, 0x10, 0x10]);
/// ```
pub fn sanitize(data: &mut [u8]) {
    for i in 0..data.len().saturating_sub(1) {
        let next = data[i + 1];
        match data[i] {
            DLE if DLE_COMMANDS.contains(&next) => data[i] = DLE_REPLACEMENT,
            ESC if next == b'=' => data[i] = ESC_REPLACEMENT,
            _ => {}
        }
    }
}
