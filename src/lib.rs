//! # tmfilter - Raster Filter for TM Series Receipt Printers
//!
//! tmfilter sits between a print spooler and an Epson TM-T88V class
//! receipt printer. It reads the spooler's 1-bit raster pages and writes
//! the printer's command stream:
//!
//! - **Job control**: device reset, sheet and sensor setup, drawer kick,
//!   buzzer, paper cut
//! - **Graphics**: blank-margin trimming, command-safe pixel data, banded
//!   graphics output
//! - **Overrides**: operator command files injected at job and page
//!   boundaries
//! - **Cancellation**: `SIGTERM` stops the job at the next row or band
//!
//! ## Quick Start
//!
//! ```
//! use tmfilter::protocol::{commands::Command, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(Command::Reset.to_bytes());
//! data.extend(graphics::band(8, 1, &[0x80]));
//! data.extend(Command::FeedAndCut.to_bytes());
//! assert_eq!(data.len(), 5 + 4 + 17 + 1 + 7 + 7);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`job`] | Job state machine |
//! | [`page`] | Page buffer, margins, sanitizing, banding |
//! | [`protocol`] | TM series command encoders |
//! | [`raster`] | Spooler raster stream reader |
//! | [`printer`] | Per-job configuration |
//! | [`overrides`] | Operator override files |
//! | [`transport`] | Output stream |
//! | [`cancel`] | `SIGTERM` flag |
//! | [`cups_log`] | Spooler log backend |
//! | [`error`] | Error types and result codes |

pub mod cancel;
pub mod cups_log;
pub mod error;
pub mod job;
pub mod overrides;
pub mod page;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod transport;

// Re-exports for convenience
pub use error::FilterError;
pub use job::Job;
pub use printer::Configuration;
