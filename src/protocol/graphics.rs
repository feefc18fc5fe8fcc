//! # Graphics Band Commands
//!
//! This module implements the raster graphics commands used to print one
//! band of a page.
//!
//! ## Band Framing
//!
//! Every band goes out as four pieces, in this order:
//!
//! ```text
//! ESC $ 0 0                     absolute print position: left margin
//! GS 8 L p1 p2 p3 p4 ...        graphics data header (17 bytes)
//! d1 ... dk                     raster rows, k = stride × rows
//! GS ( L 2 0 48 50              print the buffered graphics
//! ```
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{Command, GS, u16_le, u32_le};

/// Bytes of the `GS 8 L` header that follow the 4-byte length field.
///
/// These are counted in the length field itself:
/// `m fn a bx by c xL xH yL yH`.
pub const HEADER_TAIL_LEN: u32 = 10;

/// Total size of an encoded [`GraphicsHeader`].
pub const HEADER_LEN: usize = 17;

/// # Store Raster Graphics Data (GS 8 L p1 p2 p3 p4 m fn a bx by c xL xH yL yH d1...dk)
///
/// Stores one band of raster graphics in the print buffer.
///
/// ## Parameters
///
/// | Field | Value | Meaning |
/// |-------|-------|---------|
/// | `p1..p4` | k + 10 | payload length, little-endian |
/// | `m` | 48 | fixed |
/// | `fn` | 112 | store raster graphics |
/// | `a` | 48 | monochrome |
/// | `bx`, `by` | 1, 1 | no scaling |
/// | `c` | 49 | color 1 |
/// | `xL xH` | width | dots, little-endian |
/// | `yL yH` | rows | dots, little-endian |
///
/// ## Example
///
/// ```
/// use tmfilter::protocol::graphics::GraphicsHeader;
///
/// let header = GraphicsHeader::new(8, 1, 1);
/// let bytes = header.to_bytes();
/// assert_eq!(&bytes[0..3], b"\x1d8L");
/// assert_eq!(&bytes[3..7], &[11, 0, 0, 0]); // 1 data byte + 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsHeader {
    /// Band width in dots.
    pub width: u16,
    /// Band height in rows.
    pub rows: u16,
    /// Data bytes that follow the header (stride × rows).
    pub data_len: u32,
}

impl GraphicsHeader {
    pub fn new(width: u16, rows: u16, stride: usize) -> Self {
        Self {
            width,
            rows,
            data_len: (stride * rows as usize) as u32,
        }
    }

    /// Value of the `p1..p4` length field.
    #[inline]
    pub fn payload_len(&self) -> u32 {
        self.data_len + HEADER_TAIL_LEN
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [p1, p2, p3, p4] = u32_le(self.payload_len());
        let [xl, xh] = u16_le(self.width);
        let [yl, yh] = u16_le(self.rows);
        [
            GS, b'8', b'L', p1, p2, p3, p4, 48, 112, 48, 1, 1, 49, xl, xh, yl, yh,
        ]
    }
}

/// Build the complete command stream for one band.
///
/// `data` must hold exactly `rows` rows of `ceil(width / 8)` bytes.
pub fn band(width: u16, rows: u16, data: &[u8]) -> Vec<u8> {
    let stride = width.div_ceil(8) as usize;
    debug_assert!(
        data.len() == stride * rows as usize,
        "Band data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        stride * rows as usize,
        stride,
        rows,
        data.len()
    );

    let header = GraphicsHeader::new(width, rows, stride);
    let position = Command::AbsolutePosition { position: 0 }.to_bytes();
    let print = Command::PrintGraphics.to_bytes();

    let mut cmd = Vec::with_capacity(position.len() + HEADER_LEN + data.len() + print.len());
    cmd.extend(position);
    cmd.extend(header.to_bytes());
    cmd.extend_from_slice(data);
    cmd.extend(print);
    cmd
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_layout() {
        let header = GraphicsHeader::new(576, 256, 72);
        let bytes = header.to_bytes();

        assert_eq!(bytes[0], 0x1D); // GS
        assert_eq!(bytes[1], b'8');
        assert_eq!(bytes[2], b'L');
        // 72 * 256 + 10 = 18442 = 0x480A
        assert_eq!(&bytes[3..7], &[0x0A, 0x48, 0x00, 0x00]);
        assert_eq!(&bytes[7..13], &[48, 112, 48, 1, 1, 49]);
        assert_eq!(&bytes[13..15], &[0x40, 0x02]); // 576
        assert_eq!(&bytes[15..17], &[0x00, 0x01]); // 256
    }

    #[test]
    fn test_single_pixel_payload_len() {
        let header = GraphicsHeader::new(8, 1, 1);
        assert_eq!(header.payload_len(), 11);
        assert_eq!(&header.to_bytes()[3..7], &[11, 0, 0, 0]);
    }

    #[test]
    fn test_band_framing() {
        let data = vec![0xAA; 2 * 3];
        let cmd = band(16, 3, &data);

        assert_eq!(&cmd[0..4], &[0x1B, 0x24, 0, 0]);
        assert_eq!(&cmd[4..21], &GraphicsHeader::new(16, 3, 2).to_bytes());
        assert_eq!(&cmd[21..27], &data[..]);
        assert_eq!(&cmd[27..], &[0x1D, 0x28, 0x4C, 2, 0, 48, 50]);
    }

    #[test]
    fn test_band_width_rounding() {
        // 9 dots need 2 bytes per row
        let data = vec![0xFF; 2 * 4];
        let cmd = band(9, 4, &data);

        let header = &cmd[4..21];
        assert_eq!(&header[3..7], &[18, 0, 0, 0]); // 8 + 10
        assert_eq!(&header[13..15], &[9, 0]);
        assert_eq!(cmd.len(), 4 + 17 + 8 + 7);
    }
}
