//! JSON report export

use crate::error::{HeaderSecError, Result};
use crate::models::{JsonSink, ScanResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serializes one target's result as an indented JSON object
pub fn to_json(result: &ScanResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Serializes all results as one indented JSON array
pub fn to_json_array(results: &[ScanResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// File name for the target at `index`: the first target keeps `path`,
/// later ones get `_<index + 1>` before the extension
pub fn per_target_path(path: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{}.{}", index + 1, ext.to_string_lossy()),
        None => format!("{stem}_{}", index + 1),
    };
    path.with_file_name(name)
}

/// Writes a finished document to stdout or to a file
pub fn write_output(sink: &JsonSink, content: &str) -> Result<()> {
    match sink {
        JsonSink::Stdout => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}")?;
            stdout.flush()?;
        }
        JsonSink::File(path) => {
            std::fs::write(path, content).map_err(|source| HeaderSecError::JsonWriteError {
                path: path.display().to_string(),
                source,
            })?;
            info!("JSON report saved to {}", path.display());
        }
    }
    Ok(())
}

/// Exports one target's result, suffixing the file name for every target after the first
pub fn export_target(sink: &JsonSink, index: usize, result: &ScanResult) -> Result<()> {
    let json = to_json(result)?;
    match sink {
        JsonSink::Stdout => write_output(sink, &json),
        JsonSink::File(path) => write_output(&JsonSink::File(per_target_path(path, index)), &json),
    }
}

/// Exports every result as a single JSON array
pub fn export_all(sink: &JsonSink, results: &[ScanResult]) -> Result<()> {
    let json = to_json_array(results)?;
    write_output(sink, &json)
}
