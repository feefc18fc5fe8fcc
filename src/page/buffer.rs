//! Page buffer: one page of packed 1-bit rows.

use std::ops::Range;

use crate::error::FilterError;
use crate::raster::PageHeader;

/// Pixel data for one page.
///
/// Row `y` occupies bytes `[y * stride, (y + 1) * stride)`. Bit 7 of the
/// first byte is the leftmost pixel; a set bit is a printed dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBuffer {
    data: Vec<u8>,
    width: u32,
    height: usize,
    stride: usize,
}

impl PageBuffer {
    /// Allocate a zeroed buffer for `width` × `height` pixels.
    ///
    /// # Errors
    ///
    /// [`FilterError::PageAlloc`] if the size overflows or the allocation fails.
    pub fn new(width: u32, height: u32) -> Result<Self, FilterError> {
        let stride = width.div_ceil(8) as usize;
        let height = height as usize;
        let size = stride
            .checked_mul(height)
            .ok_or(FilterError::PageAlloc(usize::MAX))?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| FilterError::PageAlloc(size))?;
        data.resize(size, 0);

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Buffer sized for the page described by `header`.
    pub fn for_header(header: &PageHeader) -> Result<Self, FilterError> {
        Self::new(header.width, header.height)
    }

    /// Whether this buffer can hold the page described by `header` as-is.
    pub fn fits(&self, header: &PageHeader) -> bool {
        self.width == header.width && self.height == header.height as usize
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..(y + 1) * self.stride]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.stride..(y + 1) * self.stride]
    }

    /// Contiguous bytes of the rows in `rows`.
    pub fn rows(&self, rows: Range<usize>) -> &[u8] {
        &self.data[rows.start * self.stride..rows.end * self.stride]
    }

    pub fn rows_mut(&mut self, rows: Range<usize>) -> &mut [u8] {
        &mut self.data[rows.start * self.stride..rows.end * self.stride]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
