//! Writing the generated header.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::core::ordered_set::OrderedSet;

/// Marker placed in the banner of every generated header.
pub const GENERATED_MARKER: &str = "Generated by probeconf";

#[derive(Debug, Error)]
#[error("failed to write `{}`: {source}", path.display())]
pub struct FlushError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Render the header text: banner, feature lines, then result lines, each
/// followed by a blank line.
pub fn render_header(features: &OrderedSet, results: &OrderedSet, generated_at: DateTime<Local>) -> String {
    let mut out = format!(
        "/* {} {} on {}. Do not edit. */\n\n",
        GENERATED_MARKER,
        env!("CARGO_PKG_VERSION"),
        generated_at.format("%Y-%m-%d %H:%M:%S %z")
    );
    for line in features.values().chain(results.values()) {
        out.push_str(line);
        out.push_str("\n\n");
    }
    out
}

/// Write the header to `path`, replacing any existing content.
pub fn write_header(path: &Path, features: &OrderedSet, results: &OrderedSet) -> Result<(), FlushError> {
    let contents = render_header(features, results, Local::now());
    let to_err = |source| FlushError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(to_err)?;
    writer.flush().map_err(to_err)?;

    tracing::debug!(
        "wrote {} ({} features, {} results)",
        path.display(),
        features.len(),
        results.len()
    );
    Ok(())
}
