//! # Page Pipeline
//!
//! Turns one raster page into graphics bands:
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │ prepare  │ ► │  read    │ ► │ margins  │ ► │ sanitize │ ► │  bands   │
//! │ (buffer) │   │ (rows)   │   │          │   │          │   │ (sink)   │
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! The page buffer is kept between pages and only reallocated when the page
//! size changes.
//!
//! ## Modules
//!
//! - [`buffer`]: Packed 1-bit page storage
//! - [`margin`]: First/last printed row detection
//! - [`sanitize`]: Command-pair rewriting
//! - [`band`]: Band slicing and output

pub mod band;
pub mod buffer;
pub mod margin;
pub mod sanitize;

use std::io::Write;
use std::ops::Range;

use log::debug;

pub use buffer::PageBuffer;

use crate::cancel::CancelFlag;
use crate::error::FilterError;
use crate::raster::{PageHeader, RasterSource};
use crate::transport::OutputSink;

/// What was sent for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Rows sent; `None` for a blank page.
    pub printed_rows: Option<Range<usize>>,
    pub bands: usize,
}

/// Owns the page buffer and row scratch space across a job.
#[derive(Debug, Default)]
pub struct PagePipeline {
    buffer: Option<PageBuffer>,
    row: Vec<u8>,
}

impl PagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the page format and make the buffer ready for it.
    ///
    /// # Errors
    ///
    /// [`FilterError::BitsPerPixel`] for anything but 1-bit pixels,
    /// [`FilterError::UnsupportedGeometry`] for a stride that is not
    /// `ceil(width / 8)` or a width the band header cannot carry,
    /// [`FilterError::PageAlloc`] if the buffer cannot be allocated.
    pub fn prepare(&mut self, header: &PageHeader) -> Result<(), FilterError> {
        validate(header)?;

        if self.buffer.as_ref().is_some_and(|b| b.fits(header)) {
            return Ok(());
        }
        // Drop the old page before allocating the new one
        self.buffer = None;
        self.buffer = Some(PageBuffer::for_header(header)?);
        debug!("allocated page buffer {}x{}", header.width, header.height);
        Ok(())
    }

    /// Copy the page's rows from `source` into the buffer.
    ///
    /// # Errors
    ///
    /// [`FilterError::NoPageBuffer`] if [`prepare`](Self::prepare) has not
    /// run,
    /// [`FilterError::Canceled`] if cancellation is observed before a row,
    /// [`FilterError::ReadRasterPixels`] on a short row,
    /// [`FilterError::ReadRasterIo`] on a stream error.
    pub fn read_raster<S: RasterSource + ?Sized>(
        &mut self,
        source: &mut S,
        cancel: &CancelFlag,
    ) -> Result<(), FilterError> {
        let page = self.buffer.as_mut().ok_or(FilterError::NoPageBuffer)?;
        let stride = page.stride();

        if self.row.len() != stride {
            self.row.clear();
            self.row
                .try_reserve_exact(stride)
                .map_err(|_| FilterError::ReadRasterAlloc(stride))?;
            self.row.resize(stride, 0);
        }

        for y in 0..page.height() {
            if cancel.is_canceled() {
                return Err(FilterError::Canceled);
            }

            let read = source
                .read_row(&mut self.row)
                .map_err(|source| FilterError::ReadRasterIo { row: y, source })?;
            if read < stride {
                return Err(FilterError::ReadRasterPixels {
                    row: y,
                    read,
                    expected: stride,
                });
            }

            page.row_mut(y).copy_from_slice(&self.row);
        }

        Ok(())
    }

    /// Trim blank margins, sanitize and send the page as bands.
    ///
    /// A blank page sends nothing.
    ///
    /// # Errors
    ///
    /// [`FilterError::NoPageBuffer`] if [`prepare`](Self::prepare) has not
    /// run, otherwise see [`band::write_bands`].
    pub fn write_raster<W: Write>(
        &mut self,
        band_rows: usize,
        sink: &mut OutputSink<W>,
        cancel: &CancelFlag,
    ) -> Result<PageSummary, FilterError> {
        let page = self.buffer.as_mut().ok_or(FilterError::NoPageBuffer)?;

        let Some(rows) = margin::printable_rows(page) else {
            debug!("blank page, nothing to print");
            return Ok(PageSummary::default());
        };
        debug!("printable rows {}..{}", rows.start, rows.end);

        sanitize::sanitize(page.rows_mut(rows.clone()));
        let bands = band::write_bands(page, rows.clone(), band_rows, sink, cancel)?;
        debug!("sent {} bands", bands);

        Ok(PageSummary {
            printed_rows: Some(rows),
            bands,
        })
    }

    /// The current page buffer, if one is allocated.
    pub fn buffer(&self) -> Option<&PageBuffer> {
        self.buffer.as_ref()
    }

    /// Free the page buffer.
    pub fn release(&mut self) {
        self.buffer = None;
        self.row = Vec::new();
    }
}

fn validate(header: &PageHeader) -> Result<(), FilterError> {
    if header.bits_per_pixel != 1 {
        return Err(FilterError::BitsPerPixel(header.bits_per_pixel));
    }
    if header.bytes_per_line as usize != header.packed_stride() {
        return Err(FilterError::UnsupportedGeometry(format!(
            "{} bytes per line for {} dots",
            header.bytes_per_line, header.width
        )));
    }
    if header.width > u16::MAX as u32 {
        return Err(FilterError::UnsupportedGeometry(format!(
            "width {} exceeds 65535 dots",
            header.width
        )));
    }
    Ok(())
}
