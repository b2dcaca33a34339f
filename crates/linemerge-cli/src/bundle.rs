//! ZIP packaging of simplified outputs.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack `(name, bytes)` entries into an in-memory deflated archive.
pub fn zip_entries(entries: &[(String, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("adding {name} to archive"))?;
        writer
            .write_all(bytes)
            .with_context(|| format!("compressing {name}"))?;
    }

    let cursor = writer.finish().context("finalizing archive")?;
    Ok(cursor.into_inner())
}
