//! # rastertotmt88v
//!
//! Spooler filter for TM-T88V class receipt printers.
//!
//! ## Usage
//!
//! The spooler runs the filter with the queue name as `argv[0]`:
//!
//! ```bash
//! # Raster on stdin
//! PPD=/etc/cups/ppd/tm.ppd rastertotmt88v 42 alice "receipt" 1 "TmxPaperCut=CutPerJob" < job.ras
//!
//! # Raster from a file
//! PPD=/etc/cups/ppd/tm.ppd rastertotmt88v 42 alice "receipt" 1 "" job.ras
//! ```
//!
//! Printer commands go to stdout; log lines go to stderr. The exit status is
//! 0 on success, 2 when canceled, and the error code's phase (`code / 100`)
//! otherwise.

use std::error::Error;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error, info};

use tmfilter::{
    FilterError, Job,
    cancel::CancelFlag,
    cups_log::CupsLogger,
    error::EXIT_SUCCESS,
    overrides::{DEFAULT_OVERRIDE_DIR, OverrideInjector},
    printer::PrinterDescription,
    raster::CupsRasterReader,
};

/// Raster filter for TM-T88V receipt printers
///
/// Arguments are taken exactly as the spooler passes them: no flags, and
/// values starting with `-` are ordinary values.
#[derive(Parser, Debug)]
#[command(name = "rastertotmt88v")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// job user title copies options [file]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    args: Vec<OsString>,
}

/// Spooler-provided settings, read from the environment only.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Settings {
    /// Printer description file
    #[arg(long, env = "PPD", hide = true)]
    ppd: Option<PathBuf>,

    /// Directory searched for override files
    #[arg(long, env = "TMX_OVERRIDE_DIR", default_value = DEFAULT_OVERRIDE_DIR, hide = true)]
    override_dir: PathBuf,

    /// Most verbose log level written to stderr
    #[arg(long, env = "TMX_LOG_LEVEL", default_value = "debug", hide = true)]
    log_level: LevelFilter,
}

/// The spooler's positional arguments.
#[derive(Debug)]
struct Invocation {
    job_id: String,
    user: String,
    title: String,
    copies: u32,
    options: String,
    /// Raster file; stdin when absent.
    file: Option<PathBuf>,
}

impl TryFrom<Vec<OsString>> for Invocation {
    type Error = FilterError;

    fn try_from(args: Vec<OsString>) -> Result<Self, FilterError> {
        if !(5..=6).contains(&args.len()) {
            return Err(FilterError::InitArgs(format!(
                "expected 5 or 6 arguments, got {}",
                args.len()
            )));
        }

        let mut args = args.into_iter();
        let mut text = || {
            args.next()
                .map(|arg| arg.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let job_id = text();
        let user = text();
        let title = text();
        let copies = text();
        let copies = copies
            .trim()
            .parse()
            .map_err(|_| FilterError::InitArgs(format!("invalid copy count {:?}", copies)))?;
        let options = text();

        Ok(Self {
            job_id,
            user,
            title,
            copies,
            options,
            file: args.next().map(PathBuf::from),
        })
    }
}

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let printer_name = program(&argv);

    let settings = match Settings::try_parse_from(std::iter::empty::<OsString>()) {
        Ok(settings) => settings,
        Err(e) => return usage_error(FilterError::InitArgs(first_line(&e)), &printer_name),
    };
    let _ = CupsLogger::init(settings.log_level);

    let invocation = Cli::try_parse_from(&argv)
        .map_err(|e| FilterError::InitArgs(first_line(&e)))
        .and_then(|cli| Invocation::try_from(cli.args));
    let invocation = match invocation {
        Ok(invocation) => invocation,
        Err(e) => return usage_error(e, &printer_name),
    };

    match run(&invocation, &settings, &printer_name) {
        Ok(pages) => {
            info!("printed {} pages", pages);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            report(&e);
            ExitCode::from(e.exit_status())
        }
    }
}

fn usage_error(err: FilterError, printer_name: &str) -> ExitCode {
    // No-op when the logger is already installed
    let _ = CupsLogger::init(LevelFilter::Info);
    report(&err);
    eprintln!("Usage: {} job user title copies options [file]", printer_name);
    ExitCode::from(err.exit_status())
}

fn first_line(err: &clap::Error) -> String {
    err.to_string().lines().next().unwrap_or_default().to_string()
}

fn run(
    invocation: &Invocation,
    settings: &Settings,
    printer_name: &str,
) -> Result<usize, FilterError> {
    let cancel = CancelFlag::new();
    cancel.register_sigterm().map_err(FilterError::InitSignal)?;

    let input: Box<dyn Read> = match &invocation.file {
        Some(path) => {
            let file = File::open(path).map_err(|source| FilterError::InitOpenRasterFile {
                path: path.display().to_string(),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    let raster = CupsRasterReader::open(input).map_err(FilterError::InitRasterStream)?;

    let ppd = settings.ppd.as_deref().ok_or_else(|| FilterError::ConfigOpen {
        path: "$PPD".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "PPD is not set"),
    })?;
    let config = PrinterDescription::load(ppd)?.resolve(printer_name, &invocation.options)?;

    info!(
        "job {} for {} ({:?}), {} copies, printer {}",
        invocation.job_id,
        invocation.user,
        invocation.title,
        invocation.copies,
        printer_name
    );

    let overrides = OverrideInjector::new(&settings.override_dir, printer_name);
    let stdout = io::stdout();
    let mut job = Job::new(&config, raster, stdout.lock(), overrides, cancel);
    job.run()
}

/// Queue name the spooler passed as `argv[0]`.
fn program(args: &[OsString]) -> String {
    args.first()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rastertotmt88v".to_string())
}

fn report(err: &FilterError) {
    if err.is_canceled() {
        info!("job canceled");
        return;
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    error!("Error Code={} {}", err.code(), message);
}
