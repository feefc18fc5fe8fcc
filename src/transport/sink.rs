//! # Output Sink
//!
//! Sends command bytes to the printer's output stream (standard output
//! under the spooler).
//!
//! ## Short Writes
//!
//! A single `write` may accept fewer bytes than offered. The sink resumes
//! from the byte offset already written until the whole buffer is out. A
//! write that accepts nothing, or fails with anything but an interrupt, ends
//! the send with an error.

use std::io::{self, Write};

/// Retrying writer over the printer stream.
///
/// ## Example
///
/// ```
/// use tmfilter::transport::OutputSink;
/// use tmfilter::protocol::commands::Command;
///
/// let mut sink = OutputSink::new(Vec::new());
/// sink.send(&Command::Reset.to_bytes())?;
/// assert_eq!(sink.bytes_sent(), 5);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct OutputSink<W> {
    inner: W,
    bytes_sent: u64,
}

impl<W: Write> OutputSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_sent: 0,
        }
    }

    /// Write all of `data`.
    ///
    /// # Errors
    ///
    /// The first unrecoverable error from the underlying stream, or
    /// [`io::ErrorKind::WriteZero`] if it stops accepting bytes. Bytes
    /// written before the error stay written.
    pub fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < data.len() {
            match self.inner.write(&data[written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("stream accepted {} of {} bytes", written, data.len()),
                    ));
                }
                Ok(n) => {
                    written += n;
                    self.bytes_sent += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Total bytes accepted by the stream so far.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Accepts at most `max` bytes per call and fails once with `Interrupted`.
    struct Trickle {
        out: Vec<u8>,
        max: usize,
        interrupted: bool,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(self.max);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts `limit` bytes, then fails.
    struct Broken {
        limit: usize,
        out: Vec<u8>,
        kind: Option<io::ErrorKind>,
    }

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.out.len();
            if room == 0 {
                return match self.kind {
                    Some(kind) => Err(kind.into()),
                    None => Ok(0),
                };
            }
            let n = buf.len().min(room);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_writes_resume() {
        let data: Vec<u8> = (0..100).collect();
        let mut sink = OutputSink::new(Trickle {
            out: Vec::new(),
            max: 7,
            interrupted: false,
        });

        sink.send(&data).unwrap();
        assert_eq!(sink.bytes_sent(), 100);
        assert_eq!(sink.into_inner().out, data);
    }

    #[test]
    fn test_hard_error_fails_send() {
        let mut sink = OutputSink::new(Broken {
            limit: 3,
            out: Vec::new(),
            kind: Some(io::ErrorKind::BrokenPipe),
        });

        let err = sink.send(&[1, 2, 3, 4, 5]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.bytes_sent(), 3);
        assert_eq!(sink.get_ref().out, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_write_fails_send() {
        let mut sink = OutputSink::new(Broken {
            limit: 0,
            out: Vec::new(),
            kind: None,
        });
        let err = sink.send(&[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn test_empty_send_is_noop() {
        let mut sink = OutputSink::new(Vec::new());
        sink.send(&[]).unwrap();
        assert_eq!(sink.bytes_sent(), 0);
    }
}
