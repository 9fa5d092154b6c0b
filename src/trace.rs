//! Replaceable line-output sink used by the reporter and the dump writer.
//!
//! Grounded in `mp_trc.c`'s `mptrc_set_fn`: callers may redirect where the
//! reporter and dumper write their output by installing a closure; by
//! default both write to stdout.

use std::io::{self, Write};

use parking_lot::Mutex;

/// A line-output function: given a destination and a fully formatted line
/// (no trailing newline), write it and return `Ok(())`, or an I/O error.
pub type SinkFn = dyn Fn(&mut dyn Write, &str) -> io::Result<()> + Send + Sync;

/// The process-wide trace sink, swappable via [`install`].
pub struct TraceSink {
    sink: Mutex<Box<SinkFn>>,
}

impl TraceSink {
    pub fn new() -> Self {
        TraceSink {
            sink: Mutex::new(Box::new(default_sink)),
        }
    }

    /// Replaces the sink function.
    pub fn install(&self, f: impl Fn(&mut dyn Write, &str) -> io::Result<()> + Send + Sync + 'static) {
        *self.sink.lock() = Box::new(f);
    }

    /// Writes one line through the current sink to `destination`.
    pub fn write_line(&self, destination: &mut dyn Write, line: &str) -> io::Result<()> {
        (self.sink.lock())(destination, line)
    }
}

impl Default for TraceSink {
    fn default() -> Self {
        Self::new()
    }
}

fn default_sink(destination: &mut dyn Write, line: &str) -> io::Result<()> {
    writeln!(destination, "{line}")
}
