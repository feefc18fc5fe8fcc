//! # Printer Configuration
//!
//! The per-job configuration record. It is built once by
//! [`options`](super::options) before the job starts and never mutated.
//!
//! ## Usage
//!
//! ```
//! use tmfilter::printer::{Configuration, CutPolicy};
//!
//! let config = Configuration {
//!     cut: CutPolicy::PerPage,
//!     ..Configuration::new("TM-T88V")
//! };
//! assert_eq!(config.max_band_rows, 256);
//! ```

/// Maximum rows per graphics band.
pub const MAX_BAND_ROWS: usize = 256;

/// Default motion unit (dots per inch) for TM-T88V class printers.
pub const DEFAULT_MOTION_UNIT: u8 = 180;

/// Top/bottom blank skipping requested for the queue.
///
/// Consumed by the host when it decides how much blank margin the raster
/// carries; the filter itself always trims to the non-blank rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperReduction {
    #[default]
    Off,
    Top,
    Bottom,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuzzerMode {
    #[default]
    None,
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerMode {
    #[default]
    None,
    Drawer1,
    Drawer2,
}

/// When the paper is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutPolicy {
    #[default]
    None,
    PerJob,
    PerPage,
}

/// # Job Configuration
///
/// - **printer_name**: queue name, used to locate override files
/// - **motion units**: `GS P` parameters, 1-255
/// - **max_band_rows**: band height limit, always [`MAX_BAND_ROWS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub printer_name: String,
    pub horizontal_motion_unit: u8,
    pub vertical_motion_unit: u8,
    pub paper_reduction: PaperReduction,
    pub buzzer: BuzzerMode,
    pub drawer: DrawerMode,
    pub cut: CutPolicy,
    pub max_band_rows: usize,
}

impl Configuration {
    /// Configuration with every optional feature off.
    pub fn new(printer_name: impl Into<String>) -> Self {
        Self {
            printer_name: printer_name.into(),
            horizontal_motion_unit: DEFAULT_MOTION_UNIT,
            vertical_motion_unit: DEFAULT_MOTION_UNIT,
            paper_reduction: PaperReduction::default(),
            buzzer: BuzzerMode::default(),
            drawer: DrawerMode::default(),
            cut: CutPolicy::default(),
            max_band_rows: MAX_BAND_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = Configuration::new("tm");
        assert_eq!(config.printer_name, "tm");
        assert_eq!(config.horizontal_motion_unit, 180);
        assert_eq!(config.vertical_motion_unit, 180);
        assert_eq!(config.cut, CutPolicy::None);
        assert_eq!(config.buzzer, BuzzerMode::None);
        assert_eq!(config.drawer, DrawerMode::None);
        assert_eq!(config.max_band_rows, MAX_BAND_ROWS);
    }
}
