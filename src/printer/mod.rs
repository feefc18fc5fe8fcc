//! # Printer Module
//!
//! Per-job printer configuration.
//!
//! ## Modules
//!
//! - [`config`]: The configuration record and its option enums
//! - [`options`]: Resolving the record from the description file and job options

pub mod config;
pub mod options;

pub use config::{BuzzerMode, Configuration, CutPolicy, DrawerMode, PaperReduction};
pub use options::PrinterDescription;
