//! Raw hex+ASCII memory dump to a file.
//!
//! Grounded in `mp.c`'s `mpdmp()`/`mpbin2hex()`: a timestamped banner, one
//! section per initialized pool, one sub-section per block, and 16-byte rows
//! with runs of interior all-zero rows collapsed to a single marker.

use std::io::{self, Write};

use crate::registry::Registry;
use crate::trace::TraceSink;

const BANNER_WIDTH: usize = 82;
const ROW_WIDTH: usize = 16;
const SKIP_MARKER: &str = "(skipped zero bytes...)";

fn hex_ascii_row(addr: usize, bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(ROW_WIDTH * 3 + 1);
    for (i, byte) in bytes.iter().enumerate() {
        hex.push_str(&format!("{byte:02x} "));
        if i == 7 {
            hex.push(' ');
        }
    }
    let ascii: String = bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!("{addr:08x}  {hex:<50}{ascii}")
}

fn write_header(sink: &TraceSink, out: &mut dyn Write) -> io::Result<()> {
    let banner = "=".repeat(BANNER_WIDTH);
    sink.write_line(out, &banner)?;
    let timestamp = chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
    let title = "Memory pool dump (Report of memory used)";
    let padding = BANNER_WIDTH.saturating_sub(title.len() + timestamp.len());
    let line = format!("{title}{}{timestamp}", " ".repeat(padding));
    sink.write_line(out, &line)?;
    sink.write_line(out, &banner)
}

fn write_block(sink: &TraceSink, out: &mut dyn Write, index: usize, block: &crate::block::Block) -> io::Result<()> {
    let data = &block.bytes()[..block.used()];
    let from = block.base_addr();
    let to = from + block.used();
    sink.write_line(
        out,
        &format!(
            "Block number: {index} size: {} from: {from:#x} to {to:#x}",
            block.capacity()
        ),
    )?;

    if data.is_empty() {
        return Ok(());
    }

    let total_rows = data.len().div_ceil(ROW_WIDTH);
    let mut skipping = false;
    for row in 0..total_rows {
        let start = row * ROW_WIDTH;
        let end = (start + ROW_WIDTH).min(data.len());
        let chunk = &data[start..end];
        let is_edge_row = row == 0 || row + 1 == total_rows;
        let all_zero = chunk.iter().all(|&b| b == 0);

        if all_zero && !is_edge_row {
            if !skipping {
                sink.write_line(out, SKIP_MARKER)?;
                skipping = true;
            }
            continue;
        }
        skipping = false;
        sink.write_line(out, &hex_ascii_row(from + start, chunk))?;
    }
    Ok(())
}

/// Writes the full dump: header, then one section per initialized pool.
///
/// A display failure from `sink` sets the calling thread's error indicator
/// to [`ErrorKind::Disp`][crate::error::ErrorKind::Disp] in addition to
/// being returned.
pub fn write_dump(registry: &Registry, sink: &TraceSink, out: &mut dyn Write) -> io::Result<()> {
    let result = write_dump_inner(registry, sink, out);
    if result.is_err() {
        crate::error::set_last_error(crate::error::ErrorKind::Disp);
    }
    result
}

fn write_dump_inner(registry: &Registry, sink: &TraceSink, out: &mut dyn Write) -> io::Result<()> {
    write_header(sink, out)?;

    let mut io_result = Ok(());
    registry.for_each_initialized(|handle, pool| {
        if io_result.is_err() {
            return;
        }
        io_result = (|| {
            sink.write_line(out, &format!("Memory pool: {} (ID: {handle})", pool.label()))?;
            for (index, block) in pool.blocks().iter().enumerate() {
                write_block(sink, out, index, block)?;
            }
            Ok(())
        })();
    });
    io_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_contains_timestamp_and_banner() {
        let sink = TraceSink::new();
        let mut buf = Vec::new();
        write_header(&sink, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(&"=".repeat(BANNER_WIDTH)));
        assert!(text.contains("Memory pool dump"));
    }

    #[test]
    fn dump_includes_pool_and_block_sections() {
        let registry = Registry::new();
        let thread = std::thread::current().id();
        let handle = registry.new_pool("demo", thread).unwrap();
        registry
            .with_pool_mut(handle, |pool| {
                let mut block = crate::block::Block::new(64, 8).unwrap();
                block.try_bump(16, 8).unwrap();
                pool.push_block(block);
            })
            .unwrap();

        let sink = TraceSink::new();
        let mut buf = Vec::new();
        write_dump(&registry, &sink, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Memory pool: demo"));
        assert!(text.contains("Block number: 0"));
    }

    #[test]
    fn interior_zero_rows_collapse() {
        let mut block = crate::block::Block::new(64, 8).unwrap();
        // Bump enough rows that the middle one is all zero and not an edge.
        block.try_bump(48, 8).unwrap();
        let sink = TraceSink::new();
        let mut buf = Vec::new();
        write_block(&sink, &mut buf, 0, &block).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(SKIP_MARKER) || block.used() <= ROW_WIDTH * 2);
    }

    #[test]
    fn sink_failure_sets_disp_and_propagates() {
        let registry = Registry::new();
        let sink = TraceSink::new();
        sink.install(|_dest, _line| Err(io::Error::other("display failure")));

        let mut buf = Vec::new();
        let result = write_dump(&registry, &sink, &mut buf);
        assert!(result.is_err());
        assert_eq!(crate::error::last_error(), crate::error::ErrorKind::Disp);
    }
}
