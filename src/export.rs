use std::fs::File;
use std::io::{ self, BufWriter, Write };
use std::path::{ Path, PathBuf };

use crate::error::ExportError;
use crate::runner::Benchmark;

pub const CSV_HEADER: &str = "request_id,latency_us";

/// Write the sorted latencies of a run to `path`.
///
/// Nothing is written for a run without a summary, `Ok(None)` is returned instead.
pub fn save(benchmark: &Benchmark, path: &Path) -> Result<Option<PathBuf>, ExportError> {
    if benchmark.summary.is_none() {
        return Ok(None);
    }
    write_csv(path, &benchmark.latencies).map(Some)
}

/// Rows are numbered from 1 in the order given, latencies keep two decimals
pub fn write_csv(path: &Path, latencies_us: &[f64]) -> Result<PathBuf, ExportError> {
    let to_export_error = |source: io::Error| ExportError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_export_error)?;
    let mut writer = BufWriter::new(file);
    render_csv(&mut writer, latencies_us).map_err(to_export_error)?;
    writer.flush().map_err(to_export_error)?;

    Ok(path.to_path_buf())
}

pub fn render_csv<W: Write>(writer: &mut W, latencies_us: &[f64]) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for (i, latency) in latencies_us.iter().enumerate() {
        writeln!(writer, "{},{:.2}", i + 1, latency)?;
    }
    Ok(())
}
