//! Human-readable statistics table: one row per initialized pool plus a
//! totals row.
//!
//! Grounded in `mp_rep.c`'s `mpprn()`/`mpstat_t`/`mpsz2rnd()`: fixed column
//! widths, a `b/Kb/Mb/Gb/Tb/Pb` size ladder with one decimal, and `====`/`----`
//! bars framing the table.

use std::io::{self, Write};

use crate::registry::Registry;
use crate::trace::TraceSink;

const BAR: &str = "====================================================================";
const RULE: &str = "--------------------------------------------------------------------";

/// Renders the byte count `bytes` in the largest unit among b/Kb/Mb/Gb/Tb/Pb
/// in which the value is less than 1000, with one decimal place.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["b", "Kb", "Mb", "Gb", "Tb", "Pb"];
    let mut value = bytes as f64;
    let mut unit = UNITS[0];
    for &candidate in &UNITS[1..] {
        if value < 1000.0 {
            break;
        }
        value /= 1024.0;
        unit = candidate;
    }
    format!("{value:.1}{unit}")
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn push_row(out: &mut String, mpid: &str, descr: &str, blocks: usize, size: usize, used: usize) {
    let free = size.saturating_sub(used);
    let used_pct = percentage(used, size);
    let free_pct = percentage(free, size);
    out.push_str(&format!(
        "{mpid:>4} {descr:<15.15} {blocks:>7} {:>10} {:>10} {used_pct:>6.1}% {:>10} {free_pct:>6.1}%\n",
        format_size(size as u64),
        format_size(used as u64),
        format_size(free as u64),
    ));
}

/// Builds the full report as a single string, one line per `\n`.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    out.push_str(BAR);
    out.push('\n');
    out.push_str("MPID Descr           Blocks       Size       Used       %       Free       %\n");
    out.push_str(RULE);
    out.push('\n');

    let mut total_blocks = 0usize;
    let mut total_size = 0usize;
    let mut total_used = 0usize;

    registry.for_each_initialized(|handle, pool| {
        let blocks = pool.blocks().len();
        let size = pool.total_capacity();
        let used = pool.total_used();
        total_blocks += blocks;
        total_size += size;
        total_used += used;
        push_row(&mut out, &handle.to_string(), pool.label(), blocks, size, used);
    });

    out.push_str(RULE);
    out.push('\n');
    push_row(&mut out, "", "Total", total_blocks, total_size, total_used);
    out.push_str(BAR);
    out.push('\n');
    out
}

/// Writes the report to `destination` through `sink`, one line at a time.
///
/// A display failure from `sink` sets the calling thread's error indicator
/// to [`ErrorKind::Disp`][crate::error::ErrorKind::Disp] in addition to
/// being returned.
pub fn write_report(registry: &Registry, sink: &TraceSink, destination: &mut dyn Write) -> io::Result<()> {
    for line in render(registry).lines() {
        if let Err(err) = sink.write_line(destination, line) {
            crate::error::set_last_error(crate::error::ErrorKind::Disp);
            return Err(err);
        }
    }
    Ok(())
}
