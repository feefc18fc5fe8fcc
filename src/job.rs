//! # Job State Machine
//!
//! Drives one print job from setup to teardown:
//!
//! ```text
//! Init ─► StartJob ─► ┌─► StartPage ─► ReadRaster ─► WriteRaster ─► EndPage ─┐
//!                     └──────────────────────────────────────────────────────┘
//!                                          │ no more pages / error
//!                                          ▼
//!                                       EndJob ─► Terminated
//! ```
//!
//! `EndJob` runs after every outcome. A failure anywhere before it is the
//! error reported; a failure inside `EndJob` only surfaces when nothing
//! failed earlier. Bytes already sent are never retracted.
//!
//! ## Example
//!
//! ```
//! use tmfilter::cancel::CancelFlag;
//! use tmfilter::job::Job;
//! use tmfilter::overrides::OverrideInjector;
//! use tmfilter::printer::Configuration;
//! use tmfilter::raster::{PageHeader, RasterError, RasterSource};
//!
//! struct NoPages;
//!
//! impl RasterSource for NoPages {
//!     fn next_page(&mut self) -> Result<Option<PageHeader>, RasterError> {
//!         Ok(None)
//!     }
//!     fn read_row(&mut self, _row: &mut [u8]) -> Result<usize, RasterError> {
//!         Ok(0)
//!     }
//! }
//!
//! let config = Configuration::new("tm");
//! let overrides = OverrideInjector::new("/nonexistent", "tm");
//! let mut job = Job::new(&config, NoPages, Vec::new(), overrides, CancelFlag::new());
//!
//! assert_eq!(job.run()?, 0);
//! assert!(job.into_output().starts_with(&[0x1B, b'=', 0x01, 0x1B, b'@']));
//! # Ok::<(), tmfilter::FilterError>(())
//! ```

use std::io::Write;

use log::{debug, warn};

use crate::cancel::CancelFlag;
use crate::cups_log;
use crate::error::FilterError;
use crate::overrides::{Hook, OverrideInjector};
use crate::page::PagePipeline;
use crate::printer::{Configuration, CutPolicy};
use crate::protocol::commands::Command;
use crate::raster::RasterSource;
use crate::transport::OutputSink;

/// Where the job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Init,
    StartJob,
    StartPage,
    ReadRaster,
    WriteRaster,
    EndPage,
    EndJob,
    Terminated,
}

/// A single print job over a raster source and an output stream.
pub struct Job<'a, S, W: Write> {
    config: &'a Configuration,
    raster: S,
    sink: OutputSink<W>,
    overrides: OverrideInjector,
    cancel: CancelFlag,
    pages: PagePipeline,
    state: JobState,
    pages_started: usize,
}

impl<'a, S: RasterSource, W: Write> Job<'a, S, W> {
    pub fn new(
        config: &'a Configuration,
        raster: S,
        output: W,
        overrides: OverrideInjector,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            config,
            raster,
            sink: OutputSink::new(output),
            overrides,
            cancel,
            pages: PagePipeline::new(),
            state: JobState::Init,
            pages_started: 0,
        }
    }

    /// Run the job to completion.
    ///
    /// Returns the number of pages processed.
    ///
    /// # Errors
    ///
    /// The first failure of the job, or [`FilterError::Canceled`] if a
    /// termination request was honoured.
    pub fn run(&mut self) -> Result<usize, FilterError> {
        debug!("job configuration: {:?}", self.config);

        let result = self.start_job().and_then(|()| self.page_loop());
        let end = self.end_job();
        self.teardown();

        match (result, end) {
            (Err(e), end) => {
                if let Err(end_err) = end {
                    debug!("end of job after failure: {}", end_err);
                }
                Err(e)
            }
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(self.pages_started),
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Pages started so far.
    pub fn pages(&self) -> usize {
        self.pages_started
    }

    /// Bytes accepted by the output stream so far.
    pub fn bytes_sent(&self) -> u64 {
        self.sink.bytes_sent()
    }

    /// Consume the job and return the output stream.
    pub fn into_output(self) -> W {
        self.sink.into_inner()
    }

    fn start_job(&mut self) -> Result<(), FilterError> {
        self.state = JobState::StartJob;
        if self.cancel.is_canceled() {
            return Err(FilterError::Canceled);
        }

        self.send(Command::Reset, FilterError::StartJobSetDevice)?;
        self.send(Command::SelectPrintSheet, FilterError::StartJobSetPrintSheet)?;
        self.send(Command::SelectConfigSheet, FilterError::StartJobSetConfigSheet)?;
        self.send(Command::DisableNearEndSensor, FilterError::StartJobSetNearEnd)?;
        self.send(
            Command::BaseMotionUnits {
                horizontal: self.config.horizontal_motion_unit,
                vertical: self.config.vertical_motion_unit,
            },
            FilterError::StartJobSetMotionUnit,
        )?;
        if let Some(cmd) = Command::drawer_kick(self.config.drawer) {
            self.send(cmd, FilterError::StartJobOpenDrawer)?;
        }
        if let Some(cmd) = Command::buzzer(self.config.buzzer) {
            self.send(cmd, FilterError::StartJobSoundBuzzer)?;
        }

        self.overrides
            .inject(Hook::StartJob, &mut self.sink)
            .map_err(FilterError::StartJobUserFile)?;
        Ok(())
    }

    fn page_loop(&mut self) -> Result<(), FilterError> {
        loop {
            let header = match self.raster.next_page() {
                Ok(Some(header)) => header,
                Ok(None) => return Ok(()),
                Err(e) => {
                    // The stream opened fine; a broken header ends the job like EOF
                    warn!("raster stream ended: {}", e);
                    return Ok(());
                }
            };

            self.pages_started += 1;
            cups_log::page(self.pages_started, header.num_copies);
            debug!(
                "page {}: {}x{} at {}x{} dpi, {} bpp, {} bytes per line",
                self.pages_started,
                header.width,
                header.height,
                header.resolution[0],
                header.resolution[1],
                header.bits_per_pixel,
                header.bytes_per_line
            );

            self.pages.prepare(&header)?;

            self.state = JobState::StartPage;
            self.overrides
                .inject(Hook::StartPage, &mut self.sink)
                .map_err(FilterError::StartPageUserFile)?;

            self.state = JobState::ReadRaster;
            self.pages.read_raster(&mut self.raster, &self.cancel)?;

            self.state = JobState::WriteRaster;
            self.pages
                .write_raster(self.config.max_band_rows, &mut self.sink, &self.cancel)?;

            self.end_page()?;
        }
    }

    fn end_page(&mut self) -> Result<(), FilterError> {
        self.state = JobState::EndPage;
        if self.cancel.is_canceled() {
            return Err(FilterError::Canceled);
        }

        self.overrides
            .inject(Hook::EndPage, &mut self.sink)
            .map_err(FilterError::EndPageUserFile)?;
        if self.config.cut == CutPolicy::PerPage {
            self.send(Command::FeedAndCut, FilterError::EndPageCut)?;
        }
        Ok(())
    }

    fn end_job(&mut self) -> Result<(), FilterError> {
        self.state = JobState::EndJob;
        if self.cancel.is_canceled() {
            return Err(FilterError::Canceled);
        }

        self.overrides
            .inject(Hook::EndJob, &mut self.sink)
            .map_err(FilterError::EndJobUserFile)?;
        if self.config.cut == CutPolicy::PerJob {
            self.send(Command::FeedAndCut, FilterError::EndJobCut)?;
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.pages.release();
        if let Err(e) = self.sink.flush() {
            warn!("failed to flush output: {}", e);
        }
        self.state = JobState::Terminated;
    }

    fn send(
        &mut self,
        cmd: Command,
        err: fn(std::io::Error) -> FilterError,
    ) -> Result<(), FilterError> {
        self.sink.send(&cmd.to_bytes()).map_err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{BuzzerMode, DrawerMode};
    use crate::raster::{PageHeader, RasterError};
    use pretty_assertions::assert_eq;

    /// Pages held in memory.
    struct Pages {
        pages: Vec<(PageHeader, Vec<u8>)>,
        current: Option<(Vec<u8>, usize)>,
    }

    impl Pages {
        fn new(pages: Vec<(PageHeader, Vec<u8>)>) -> Self {
            Self {
                pages,
                current: None,
            }
        }
    }

    impl RasterSource for Pages {
        fn next_page(&mut self) -> Result<Option<PageHeader>, RasterError> {
            if self.pages.is_empty() {
                return Ok(None);
            }
            let (header, data) = self.pages.remove(0);
            self.current = Some((data, 0));
            Ok(Some(header))
        }

        fn read_row(&mut self, row: &mut [u8]) -> Result<usize, RasterError> {
            let Some((data, pos)) = self.current.as_mut() else {
                return Ok(0);
            };
            let n = row.len().min(data.len() - *pos);
            row[..n].copy_from_slice(&data[*pos..*pos + n]);
            *pos += n;
            Ok(n)
        }
    }

    fn no_overrides() -> OverrideInjector {
        OverrideInjector::new("/nonexistent/tmfilter-test", "tm")
    }

    fn setup_bytes(config: &Configuration) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(Command::Reset.to_bytes());
        out.extend(Command::SelectPrintSheet.to_bytes());
        out.extend(Command::SelectConfigSheet.to_bytes());
        out.extend(Command::DisableNearEndSensor.to_bytes());
        out.extend(
            Command::BaseMotionUnits {
                horizontal: config.horizontal_motion_unit,
                vertical: config.vertical_motion_unit,
            }
            .to_bytes(),
        );
        out
    }

    #[test]
    fn test_empty_job_emits_setup_only() {
        let config = Configuration::new("tm");
        let mut job = Job::new(
            &config,
            Pages::new(vec![]),
            Vec::new(),
            no_overrides(),
            CancelFlag::new(),
        );

        assert_eq!(job.run().unwrap(), 0);
        assert_eq!(job.state(), JobState::Terminated);
        assert_eq!(job.into_output(), setup_bytes(&config));
    }

    #[test]
    fn test_drawer_then_buzzer_then_job_cut() {
        let config = Configuration {
            drawer: DrawerMode::Drawer2,
            buzzer: BuzzerMode::External,
            cut: CutPolicy::PerJob,
            ..Configuration::new("tm")
        };
        let mut job = Job::new(
            &config,
            Pages::new(vec![]),
            Vec::new(),
            no_overrides(),
            CancelFlag::new(),
        );
        job.run().unwrap();

        let mut expected = setup_bytes(&config);
        expected.extend(Command::DrawerKick { pin: 1 }.to_bytes());
        expected.extend(Command::ExternalBuzzer.to_bytes());
        expected.extend(Command::FeedAndCut.to_bytes());
        assert_eq!(job.into_output(), expected);
    }

    #[test]
    fn test_canceled_before_start_sends_nothing() {
        let config = Configuration {
            cut: CutPolicy::PerJob,
            ..Configuration::new("tm")
        };
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut job = Job::new(
            &config,
            Pages::new(vec![(PageHeader::monochrome(8, 1), vec![0xFF])]),
            Vec::new(),
            no_overrides(),
            cancel,
        );

        assert!(job.run().unwrap_err().is_canceled());
        assert_eq!(job.pages(), 0);
        assert!(job.into_output().is_empty());
    }

    #[test]
    fn test_page_failure_still_ends_job() {
        let config = Configuration {
            cut: CutPolicy::PerJob,
            ..Configuration::new("tm")
        };
        let mut header = PageHeader::monochrome(8, 1);
        header.bits_per_pixel = 8;
        header.bytes_per_line = 8;
        let mut job = Job::new(
            &config,
            Pages::new(vec![(header, vec![0; 8])]),
            Vec::new(),
            no_overrides(),
            CancelFlag::new(),
        );

        assert_eq!(job.run().unwrap_err().code(), 2001);
        let out = job.into_output();
        assert!(out.ends_with(&Command::FeedAndCut.to_bytes()));
    }

    #[test]
    fn test_page_cut_after_each_page() {
        let config = Configuration {
            cut: CutPolicy::PerPage,
            ..Configuration::new("tm")
        };
        let pages = vec![
            (PageHeader::monochrome(8, 1), vec![0x00]),
            (PageHeader::monochrome(8, 1), vec![0x00]),
        ];
        let mut job = Job::new(
            &config,
            Pages::new(pages),
            Vec::new(),
            no_overrides(),
            CancelFlag::new(),
        );
        assert_eq!(job.run().unwrap(), 2);

        let mut expected = setup_bytes(&config);
        expected.extend(Command::FeedAndCut.to_bytes());
        expected.extend(Command::FeedAndCut.to_bytes());
        assert_eq!(job.into_output(), expected);
    }
}
