//! # Raster Input
//!
//! The page stream the host spooler hands the filter: a sequence of page
//! headers, each followed by exactly `height` rows of `bytes_per_line`
//! bytes.
//!
//! - [`RasterSource`]: the interface the job reads pages through
//! - [`cups`]: reader for the spooler's raster stream format

pub mod cups;

use std::io;

use thiserror::Error;

pub use cups::CupsRasterReader;

/// Errors from the raster stream itself.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("empty raster stream")]
    Empty,

    #[error("unknown raster sync word {0:02x?}")]
    BadSync([u8; 4]),

    #[error("raster stream I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Page header fields the filter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageHeader {
    /// Width in pixels.
    pub width: u32,
    /// Height in rows.
    pub height: u32,
    /// Row stride in bytes.
    pub bytes_per_line: u32,
    pub bits_per_color: u32,
    pub bits_per_pixel: u32,
    pub color_space: u32,
    /// Informational only.
    pub num_copies: u32,
    /// Dots per inch, horizontal and vertical.
    pub resolution: [u32; 2],
}

impl PageHeader {
    /// Header for a 1-bit page with a tightly packed stride.
    pub fn monochrome(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes_per_line: width.div_ceil(8),
            bits_per_color: 1,
            bits_per_pixel: 1,
            color_space: cups::CSPACE_K,
            num_copies: 1,
            resolution: [180, 180],
        }
    }

    /// Bytes one row occupies in the page buffer.
    #[inline]
    pub fn packed_stride(&self) -> usize {
        self.width.div_ceil(8) as usize
    }
}

/// A stream of raster pages.
pub trait RasterSource {
    /// Read the next page header. `Ok(None)` ends the page loop.
    fn next_page(&mut self) -> Result<Option<PageHeader>, RasterError>;

    /// Read the next row of the current page into `row`.
    ///
    /// Returns the number of bytes delivered; fewer than `row.len()` means
    /// the stream ran out.
    fn read_row(&mut self, row: &mut [u8]) -> Result<usize, RasterError>;
}

impl<T: RasterSource + ?Sized> RasterSource for Box<T> {
    fn next_page(&mut self) -> Result<Option<PageHeader>, RasterError> {
        (**self).next_page()
    }

    fn read_row(&mut self, row: &mut [u8]) -> Result<usize, RasterError> {
        (**self).read_row(row)
    }
}
