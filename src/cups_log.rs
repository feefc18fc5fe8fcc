//! # Spooler Log Backend
//!
//! The spooler reads a filter's standard error line by line and files each
//! line by its prefix:
//!
//! | Level | Prefix |
//! |-------|--------|
//! | error | `ERROR:` |
//! | warn | `WARNING:` |
//! | info | `INFO:` |
//! | debug | `DEBUG:` |
//! | trace | `DEBUG2:` |
//!
//! [`CupsLogger`] is a `log` backend producing those lines. [`page`] writes
//! the page accounting line, which is a protocol message rather than a log
//! record and is written regardless of level.

use std::io::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Line prefix the spooler expects for `level`.
pub fn prefix(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "DEBUG2",
    }
}

/// Writes log records to stderr in the spooler's message format.
#[derive(Debug)]
pub struct CupsLogger {
    level: LevelFilter,
}

impl CupsLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if another logger was already installed.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_max_level(level);
        log::set_boxed_logger(Box::new(Self::new(level)))
    }

    /// Write one record as a single line to `out`.
    ///
    /// Embedded newlines are flattened so a record cannot spoof a second
    /// prefixed line.
    pub fn write_record<O: Write>(&self, out: &mut O, record: &Record<'_>) -> io::Result<()> {
        let message = record.args().to_string().replace(['\r', '\n'], " ");
        writeln!(out, "{}: {}", prefix(record.level()), message)
    }
}

impl Log for CupsLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let stderr = io::stderr();
        let _ = self.write_record(&mut stderr.lock(), record);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Report that page `number` has started, with its copy count.
pub fn page(number: usize, copies: u32) {
    let _ = writeln!(io::stderr().lock(), "PAGE: {} {}", number, copies);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(logger: &CupsLogger, level: Level, msg: &str) -> String {
        let mut out = Vec::new();
        logger
            .write_record(
                &mut out,
                &Record::builder().level(level).args(format_args!("{msg}")).build(),
            )
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prefixes() {
        let logger = CupsLogger::new(LevelFilter::Trace);
        assert_eq!(render(&logger, Level::Error, "boom"), "ERROR: boom\n");
        assert_eq!(render(&logger, Level::Warn, "low"), "WARNING: low\n");
        assert_eq!(render(&logger, Level::Info, "ok"), "INFO: ok\n");
        assert_eq!(render(&logger, Level::Debug, "d"), "DEBUG: d\n");
        assert_eq!(render(&logger, Level::Trace, "t"), "DEBUG2: t\n");
    }

    #[test]
    fn test_multiline_message_stays_on_one_line() {
        let logger = CupsLogger::new(LevelFilter::Info);
        assert_eq!(
            render(&logger, Level::Info, "a\nERROR: b"),
            "INFO: a ERROR: b\n"
        );
    }

    #[test]
    fn test_level_filter() {
        let logger = CupsLogger::new(LevelFilter::Info);
        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&warn));
    }
}
