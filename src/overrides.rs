//! # User Override Files
//!
//! Operators can drop raw command files next to the filter to be sent
//! verbatim at four points of every job:
//!
//! ```text
//! <base>/<printer>_StartJob.prn    after the job setup commands
//! <base>/<printer>_StartPage.prn   before each page's raster
//! <base>/<printer>_EndPage.prn     after each page's raster, before the page cut
//! <base>/<printer>_EndJob.prn      before the job cut
//! ```
//!
//! A missing file is skipped silently.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::transport::OutputSink;

/// Base directory searched for override files.
#[cfg(target_os = "macos")]
pub const DEFAULT_OVERRIDE_DIR: &str = "/Library/Caches/Epson/TerminalPrinter";

/// Base directory searched for override files.
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_OVERRIDE_DIR: &str = "/var/lib/tmx-cups";

/// Override files are forwarded in chunks of this size.
const CHUNK_SIZE: usize = 1024;

/// Lifecycle point an override file is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    StartJob,
    EndJob,
    StartPage,
    EndPage,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::StartJob => "StartJob",
            Hook::EndJob => "EndJob",
            Hook::StartPage => "StartPage",
            Hook::EndPage => "EndPage",
        }
    }
}

/// Locates and forwards override files for one printer.
#[derive(Debug, Clone)]
pub struct OverrideInjector {
    base_dir: PathBuf,
    printer_name: String,
}

impl OverrideInjector {
    pub fn new(base_dir: impl Into<PathBuf>, printer_name: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            printer_name: printer_name.into(),
        }
    }

    /// Path of the override file for `hook`.
    pub fn path(&self, hook: Hook) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}.prn", self.printer_name, hook.name()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Forward the override file for `hook` to `sink`.
    ///
    /// Returns `Ok(false)` when no such file exists.
    ///
    /// # Errors
    ///
    /// Any error opening (other than not-found), reading, or forwarding.
    pub fn inject<W: Write>(&self, hook: Hook, sink: &mut OutputSink<W>) -> io::Result<bool> {
        let path = self.path(hook);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        let mut chunk = [0u8; CHUNK_SIZE];
        let mut total = 0usize;
        loop {
            let n = match file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            sink.send(&chunk[..n])?;
            total += n;
        }

        debug!("sent {} ({} bytes)", path.display(), total);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_path_layout() {
        let injector = OverrideInjector::new("/var/lib/tmx-cups", "TM-T88V");
        assert_eq!(
            injector.path(Hook::StartJob),
            PathBuf::from("/var/lib/tmx-cups/TM-T88V_StartJob.prn")
        );
        assert_eq!(
            injector.path(Hook::EndPage),
            PathBuf::from("/var/lib/tmx-cups/TM-T88V_EndPage.prn")
        );
    }

    #[test]
    fn test_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let injector = OverrideInjector::new(dir.path(), "tm");
        let mut sink = OutputSink::new(Vec::new());

        assert!(!injector.inject(Hook::EndJob, &mut sink).unwrap());
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_file_forwarded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        // Larger than one chunk, with bytes that must pass through untouched
        let contents: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();
        fs::write(dir.path().join("tm_StartPage.prn"), &contents).unwrap();

        let injector = OverrideInjector::new(dir.path(), "tm");
        let mut sink = OutputSink::new(Vec::new());
        assert!(injector.inject(Hook::StartPage, &mut sink).unwrap());
        assert_eq!(sink.into_inner(), contents);
    }

    #[test]
    fn test_unreadable_entry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as a file
        fs::create_dir(dir.path().join("tm_EndJob.prn")).unwrap();

        let injector = OverrideInjector::new(dir.path(), "tm");
        let mut sink = OutputSink::new(Vec::new());
        assert!(injector.inject(Hook::EndJob, &mut sink).is_err());
    }
}
