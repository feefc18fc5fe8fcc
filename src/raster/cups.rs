//! # Spooler Raster Stream Reader
//!
//! Reads the raster stream format produced by the host spooler's
//! rasterizing filters.
//!
//! ## Stream Layout
//!
//! ```text
//! sync word (4 bytes)
//! page header (1796 bytes)   ┐
//! row data                   ┘ repeated for every page
//! ```
//!
//! The sync word selects the version and the byte order of the header
//! fields:
//!
//! | Sync | Byte order | Rows |
//! |------|------------|------|
//! | `RaSt` `RaS3` | big-endian | raw |
//! | `tSaR` `3SaR` | little-endian | raw |
//! | `RaS2` | big-endian | run-length |
//! | `2SaR` | little-endian | run-length |
//!
//! ## Run-Length Rows
//!
//! Each encoded line starts with a repeat byte (the line is used
//! `repeat + 1` times), followed by runs until the line is full:
//!
//! - `n < 128`: the next pixel is repeated `n + 1` times
//! - `n > 128`: `257 - n` literal pixels follow
//! - `n == 128`: the rest of the line is blank

use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::warn;

use super::{PageHeader, RasterError, RasterSource};

/// Size of a page header on the wire.
pub const HEADER_LEN: usize = 1796;

const OFFSET_RESOLUTION: usize = 276;
const OFFSET_NUM_COPIES: usize = 340;
const OFFSET_WIDTH: usize = 372;
const OFFSET_HEIGHT: usize = 376;
const OFFSET_BITS_PER_COLOR: usize = 384;
const OFFSET_BITS_PER_PIXEL: usize = 388;
const OFFSET_BYTES_PER_LINE: usize = 392;
const OFFSET_COLOR_SPACE: usize = 400;

pub const CSPACE_W: u32 = 0;
pub const CSPACE_RGB: u32 = 1;
pub const CSPACE_RGBA: u32 = 2;
pub const CSPACE_K: u32 = 3;
pub const CSPACE_RGBW: u32 = 17;
pub const CSPACE_SW: u32 = 18;
pub const CSPACE_SRGB: u32 = 19;
pub const CSPACE_ADOBE_RGB: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Big,
    Little,
}

/// Reader for the spooler raster stream.
///
/// ## Example
///
/// ```no_run
/// use std::io::{self, BufReader};
/// use tmfilter::raster::{CupsRasterReader, RasterSource};
///
/// let mut reader = CupsRasterReader::open(BufReader::new(io::stdin()))?;
/// while let Some(header) = reader.next_page()? {
///     let mut row = vec![0u8; header.bytes_per_line as usize];
///     for _ in 0..header.height {
///         reader.read_row(&mut row)?;
///     }
/// }
/// # Ok::<(), tmfilter::raster::RasterError>(())
/// ```
#[derive(Debug)]
pub struct CupsRasterReader<R> {
    inner: R,
    endian: Endian,
    compressed: bool,
    header: Option<PageHeader>,
    rows_left: u32,
    /// Decoded run-length line and how many more times it is used.
    line: Vec<u8>,
    line_repeats: u32,
    pixel: Vec<u8>,
}

impl<R: Read> CupsRasterReader<R> {
    /// Read the sync word and prepare to read pages.
    ///
    /// # Errors
    ///
    /// [`RasterError::Empty`] if the stream has no data,
    /// [`RasterError::BadSync`] if it is not a raster stream.
    pub fn open(mut inner: R) -> Result<Self, RasterError> {
        let mut sync = [0u8; 4];
        match read_full(&mut inner, &mut sync)? {
            0 => return Err(RasterError::Empty),
            4 => {}
            _ => return Err(RasterError::BadSync(sync)),
        }

        let (endian, compressed) = match &sync {
            b"RaSt" | b"RaS3" => (Endian::Big, false),
            b"tSaR" | b"3SaR" => (Endian::Little, false),
            b"RaS2" => (Endian::Big, true),
            b"2SaR" => (Endian::Little, true),
            _ => return Err(RasterError::BadSync(sync)),
        };

        Ok(Self {
            inner,
            endian,
            compressed,
            header: None,
            rows_left: 0,
            line: Vec::new(),
            line_repeats: 0,
            pixel: Vec::new(),
        })
    }

    /// Whether rows are run-length encoded.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    fn field(&self, buf: &[u8], offset: usize) -> u32 {
        let bytes = &buf[offset..offset + 4];
        match self.endian {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        }
    }

    fn parse_header(&self, buf: &[u8]) -> PageHeader {
        PageHeader {
            width: self.field(buf, OFFSET_WIDTH),
            height: self.field(buf, OFFSET_HEIGHT),
            bytes_per_line: self.field(buf, OFFSET_BYTES_PER_LINE),
            bits_per_color: self.field(buf, OFFSET_BITS_PER_COLOR),
            bits_per_pixel: self.field(buf, OFFSET_BITS_PER_PIXEL),
            color_space: self.field(buf, OFFSET_COLOR_SPACE),
            num_copies: self.field(buf, OFFSET_NUM_COPIES),
            resolution: [
                self.field(buf, OFFSET_RESOLUTION),
                self.field(buf, OFFSET_RESOLUTION + 4),
            ],
        }
    }

    /// Drain rows the caller did not read from the current page.
    fn skip_rest_of_page(&mut self) -> Result<(), RasterError> {
        let Some(header) = self.header else {
            return Ok(());
        };
        let mut scratch = vec![0u8; header.bytes_per_line as usize];
        while self.rows_left > 0 {
            if self.read_row(&mut scratch)? < scratch.len() {
                break;
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, RasterError> {
        let mut byte = [0u8; 1];
        Ok((read_full(&mut self.inner, &mut byte)? == 1).then_some(byte[0]))
    }

    /// Decode one run-length line into `self.line`; returns bytes decoded.
    fn decode_line(&mut self, blank: u8) -> Result<usize, RasterError> {
        let len = self.line.len();
        let bpp = self.pixel.len();
        let mut filled = 0;

        while filled < len {
            let Some(count) = self.read_byte()? else {
                return Ok(filled);
            };
            let count = count as usize;

            if count == 128 {
                self.line[filled..].fill(blank);
                filled = len;
            } else if count > 128 {
                let n = ((257 - count) * bpp).min(len - filled);
                let got = read_full(&mut self.inner, &mut self.line[filled..filled + n])?;
                filled += got;
                if got < n {
                    return Ok(filled);
                }
            } else {
                if read_full(&mut self.inner, &mut self.pixel)? < bpp {
                    return Ok(filled);
                }
                let n = ((count + 1) * bpp).min(len - filled);
                for chunk in self.line[filled..filled + n].chunks_mut(bpp) {
                    chunk.copy_from_slice(&self.pixel[..chunk.len()]);
                }
                filled += n;
            }
        }

        Ok(filled)
    }
}

impl<R: Read> RasterSource for CupsRasterReader<R> {
    fn next_page(&mut self) -> Result<Option<PageHeader>, RasterError> {
        self.skip_rest_of_page()?;
        self.header = None;

        let mut buf = vec![0u8; HEADER_LEN];
        let n = read_full(&mut self.inner, &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_LEN {
            warn!("truncated raster page header ({} of {} bytes)", n, HEADER_LEN);
            return Ok(None);
        }

        let header = self.parse_header(&buf);
        let bytes_per_pixel = header.bits_per_pixel.div_ceil(8);
        if header.width == 0
            || header.height == 0
            || header.bytes_per_line == 0
            || bytes_per_pixel == 0
            || header.bytes_per_line % bytes_per_pixel != 0
        {
            warn!("invalid raster page header: {:?}", header);
            return Ok(None);
        }

        self.rows_left = header.height;
        self.line = vec![0u8; header.bytes_per_line as usize];
        self.line_repeats = 0;
        self.pixel = vec![0u8; bytes_per_pixel as usize];
        self.header = Some(header);
        Ok(Some(header))
    }

    fn read_row(&mut self, row: &mut [u8]) -> Result<usize, RasterError> {
        let Some(header) = self.header else {
            return Ok(0);
        };
        if self.rows_left == 0 {
            return Ok(0);
        }

        if !self.compressed {
            let n = read_full(&mut self.inner, row)?;
            if n == row.len() {
                self.rows_left -= 1;
            }
            return Ok(n);
        }

        if self.line_repeats > 0 {
            self.line_repeats -= 1;
        } else {
            let Some(repeat) = self.read_byte()? else {
                return Ok(0);
            };
            let filled = self.decode_line(blank_byte(header.color_space))?;
            if filled < self.line.len() {
                return Ok(filled.min(row.len()));
            }
            self.line_repeats = repeat as u32;
        }

        let n = row.len().min(self.line.len());
        row[..n].copy_from_slice(&self.line[..n]);
        self.rows_left -= 1;
        Ok(n)
    }
}

/// Byte value of a blank (unprinted) pixel run in `color_space`.
fn blank_byte(color_space: u32) -> u8 {
    match color_space {
        CSPACE_W | CSPACE_RGB | CSPACE_RGBA | CSPACE_RGBW | CSPACE_SW | CSPACE_SRGB
        | CSPACE_ADOBE_RGB => 0xFF,
        _ => 0x00,
    }
}

/// Read until `buf` is full or the stream ends; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

// ============================================================================
// TESTS
// ============================================================================
