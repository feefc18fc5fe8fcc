//! # TM Series Protocol Implementation
//!
//! This module provides the command builders for the Epson TM receipt
//! printer command set the filter targets.
//!
//! ## Module Structure
//!
//! - [`commands`]: Lifecycle commands (reset, sheet, motion units, drawer, buzzer, cut)
//! - [`graphics`]: Graphics band header and framing
//!
//! ## Usage Example
//!
//! ```
//! use tmfilter::protocol::{commands::Command, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(Command::Reset.to_bytes());
//!
//! // One 8-dot wide row with the leftmost dot set
//! data.extend(graphics::band(8, 1, &[0x80]));
//!
//! data.extend(Command::FeedAndCut.to_bytes());
//! ```

pub mod commands;
pub mod graphics;
