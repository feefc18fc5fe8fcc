//! # Error Types
//!
//! This module defines the error type returned by every phase of the
//! filter. Each variant maps to a fixed numeric code; the host spooler's
//! logs key off these codes, so they never change.
//!
//! | Range | Phase |
//! |-------|-------|
//! | 1xxx | Initialization |
//! | 20xx | Page format |
//! | 21xx | Start of job |
//! | 22xx | End of job |
//! | 31xx | Start of page |
//! | 32xx | End of page |
//! | 33xx | Raster read |
//! | 34xx | Raster write |
//! | 4xxx | Configuration |

use std::io;

use thiserror::Error;

use crate::raster::RasterError;

/// Exit status for a completed job.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status when a termination request was honoured.
pub const EXIT_CANCELED: u8 = 2;

/// Main error type for filter operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// A termination request was observed. Not a failure.
    #[error("job canceled")]
    Canceled,

    // ===== Initialization =====
    #[error("invalid arguments: {0}")]
    InitArgs(String),

    #[error("failed to open raster file {path}")]
    InitOpenRasterFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open raster stream")]
    InitRasterStream(#[source] RasterError),

    #[error("failed to install SIGTERM handler")]
    InitSignal(#[source] io::Error),

    // ===== Page format =====
    #[error("unsupported bits per pixel: {0}")]
    BitsPerPixel(u32),

    #[error("failed to allocate page buffer of {0} bytes")]
    PageAlloc(usize),

    #[error("unsupported page geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("no page buffer prepared for this page")]
    NoPageBuffer,

    // ===== Start of job =====
    #[error("failed to reset device")]
    StartJobSetDevice(#[source] io::Error),

    #[error("failed to select print sheet")]
    StartJobSetPrintSheet(#[source] io::Error),

    #[error("failed to select config sheet")]
    StartJobSetConfigSheet(#[source] io::Error),

    #[error("failed to disable near-end sensor")]
    StartJobSetNearEnd(#[source] io::Error),

    #[error("failed to set base motion units")]
    StartJobSetMotionUnit(#[source] io::Error),

    #[error("failed to open drawer")]
    StartJobOpenDrawer(#[source] io::Error),

    #[error("failed to sound buzzer")]
    StartJobSoundBuzzer(#[source] io::Error),

    #[error("failed to send start-job override file")]
    StartJobUserFile(#[source] io::Error),

    // ===== End of job =====
    #[error("failed to send end-job override file")]
    EndJobUserFile(#[source] io::Error),

    #[error("failed to cut paper at end of job")]
    EndJobCut(#[source] io::Error),

    // ===== Pages =====
    #[error("failed to send start-page override file")]
    StartPageUserFile(#[source] io::Error),

    #[error("failed to send end-page override file")]
    EndPageUserFile(#[source] io::Error),

    #[error("failed to cut paper at end of page")]
    EndPageCut(#[source] io::Error),

    #[error("failed to allocate row buffer of {0} bytes")]
    ReadRasterAlloc(usize),

    #[error("failed to read row {row}: got {read} of {expected} bytes")]
    ReadRasterPixels {
        row: usize,
        read: usize,
        expected: usize,
    },

    #[error("failed to read row {row}")]
    ReadRasterIo {
        row: usize,
        #[source]
        source: RasterError,
    },

    #[error("failed to write band at row {row}")]
    WriteRasterBand {
        row: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write final band at row {row}")]
    WriteRasterFinal {
        row: usize,
        #[source]
        source: io::Error,
    },

    // ===== Configuration =====
    #[error("failed to read printer description {path}")]
    ConfigOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("conflicting options: {0}")]
    ConfigConflict(String),

    #[error("{key} not found")]
    ConfigNotFound { key: &'static str, code: u16 },

    #[error("{key} value {value:?} out of range")]
    ConfigOutOfRange {
        key: &'static str,
        value: String,
        code: u16,
    },
}

impl FilterError {
    /// Numeric result code for this error.
    pub fn code(&self) -> u16 {
        match self {
            Self::Canceled => 2,
            Self::InitArgs(_) => 1001,
            Self::InitOpenRasterFile { .. } => 1002,
            Self::InitRasterStream(_) => 1003,
            Self::InitSignal(_) => 1104,
            Self::BitsPerPixel(_) => 2001,
            Self::PageAlloc(_) | Self::NoPageBuffer => 2002,
            Self::UnsupportedGeometry(_) => 2003,
            Self::StartJobSetDevice(_) => 2101,
            Self::StartJobSetPrintSheet(_) => 2102,
            Self::StartJobSetConfigSheet(_) => 2103,
            Self::StartJobSetNearEnd(_) => 2104,
            Self::StartJobSetMotionUnit(_) => 2105,
            Self::StartJobOpenDrawer(_) => 2106,
            Self::StartJobSoundBuzzer(_) => 2107,
            Self::StartJobUserFile(_) => 2108,
            Self::EndJobUserFile(_) => 2201,
            Self::EndJobCut(_) => 2202,
            Self::StartPageUserFile(_) => 3102,
            Self::EndPageUserFile(_) => 3201,
            Self::EndPageCut(_) => 3202,
            Self::ReadRasterAlloc(_) => 3301,
            Self::ReadRasterPixels { .. } | Self::ReadRasterIo { .. } => 3302,
            Self::WriteRasterBand { .. } => 3403,
            Self::WriteRasterFinal { .. } => 3404,
            Self::ConfigOpen { .. } => 4001,
            Self::ConfigConflict(_) => 4002,
            Self::ConfigNotFound { code, .. } | Self::ConfigOutOfRange { code, .. } => *code,
        }
    }

    /// Process exit status for this outcome.
    ///
    /// The four-digit code does not fit an exit byte, so the status is the
    /// code's phase prefix (`code / 100`). Cancellation keeps its own status.
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Canceled => EXIT_CANCELED,
            other => (other.code() / 100) as u8,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
