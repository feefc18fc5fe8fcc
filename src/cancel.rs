//! # Cooperative Cancellation
//!
//! The spooler asks a filter to stop by sending `SIGTERM`. The handler only
//! sets a flag; the job checks it at page, row and band boundaries and
//! unwinds from there. Once set, the flag stays set.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::SIGTERM;

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag on `SIGTERM`.
    ///
    /// The registered handler performs a single atomic store.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the handler cannot be installed.
    pub fn register_sigterm(&self) -> io::Result<()> {
        signal_hook::flag::register(SIGTERM, Arc::clone(&self.0))?;
        Ok(())
    }

    /// Request cancellation from this process.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
