//! # Banding
//!
//! Splits a page's printable rows into graphics bands no taller than the
//! configured limit and sends them.
//!
//! ## Slicing
//!
//! ```text
//! rows first..last, limit 256:
//!
//! first      first+256   first+512       last
//!   ├──────────┼───────────┼───────────────┤
//!   │  full    │   full    │  final (≤256) │
//! ```
//!
//! Full bands are sent while more than one full band remains; the rest goes
//! out as one final band, which can itself be a full 256 rows.

use std::io::Write;
use std::ops::Range;

use log::debug;

use super::buffer::PageBuffer;
use crate::cancel::CancelFlag;
use crate::error::FilterError;
use crate::protocol::graphics;
use crate::transport::OutputSink;

/// One slice of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub rows: Range<usize>,
    /// The remainder slice that closes the page.
    pub is_final: bool,
}

impl Band {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Slice `rows` into bands of at most `band_rows` rows.
pub fn plan(rows: Range<usize>, band_rows: usize) -> Vec<Band> {
    let band_rows = band_rows.max(1);
    let mut bands = Vec::with_capacity(rows.len().div_ceil(band_rows));
    let mut start = rows.start;

    while start + band_rows < rows.end {
        bands.push(Band {
            rows: start..start + band_rows,
            is_final: false,
        });
        start += band_rows;
    }
    if start < rows.end {
        bands.push(Band {
            rows: start..rows.end,
            is_final: true,
        });
    }

    bands
}

/// Send `rows` of `page` as graphics bands.
///
/// The cancellation flag is checked after every full band; once set, no
/// further bands are sent.
///
/// # Errors
///
/// [`FilterError::WriteRasterBand`] / [`FilterError::WriteRasterFinal`] on
/// a failed write, [`FilterError::Canceled`] when cancellation is observed.
pub fn write_bands<W: Write>(
    page: &PageBuffer,
    rows: Range<usize>,
    band_rows: usize,
    sink: &mut OutputSink<W>,
    cancel: &CancelFlag,
) -> Result<usize, FilterError> {
    let width = u16::try_from(page.width()).map_err(|_| {
        FilterError::UnsupportedGeometry(format!("width {} exceeds 65535 dots", page.width()))
    })?;

    let bands = plan(rows, band_rows);
    for band in &bands {
        let cmd = graphics::band(width, band.len() as u16, page.rows(band.rows.clone()));
        let row = band.rows.start;
        sink.send(&cmd).map_err(|source| {
            if band.is_final {
                FilterError::WriteRasterFinal { row, source }
            } else {
                FilterError::WriteRasterBand { row, source }
            }
        })?;

        if !band.is_final && cancel.is_canceled() {
            debug!("canceled after band at row {}", row);
            return Err(FilterError::Canceled);
        }
    }

    Ok(bands.len())
}
