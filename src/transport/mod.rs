//! # Printer Transport Layer
//!
//! The filter never talks to the device directly: the spooler's backend
//! reads the filter's standard output and forwards it to the printer.
//!
//! - [`sink`]: retrying writer over the output stream

pub mod sink;

pub use sink::OutputSink;
