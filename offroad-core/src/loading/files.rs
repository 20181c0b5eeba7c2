use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use geojson::JsonValue;
use serde::Serialize;

use crate::{EdgeCollection, Error};

/// Reads any JSON document.
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be opened and
/// [`Error::MalformedInput`] if it is not valid JSON.
pub fn read_json(path: &Path) -> Result<JsonValue, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::MalformedInput(format!("{}: {e}", path.display())))
}

/// Reads a `FeatureCollection` of edges.
///
/// # Errors
///
/// See [`read_json`] and [`EdgeCollection::from_json_value`].
pub fn read_collection(path: &Path) -> Result<EdgeCollection, Error> {
    EdgeCollection::from_json_value(read_json(path)?).map_err(|e| match e {
        Error::MalformedInput(msg) => Error::MalformedInput(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Writes a GeoJSON object as indented JSON.
///
/// # Errors
///
/// Returns [`Error::IoError`] when the file cannot be written.
pub fn write_geojson<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to create file '{}': {}", path.display(), e),
        )
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| Error::GeoJsonError(e.to_string()))?;
    writer.flush()?;
    Ok(())
}
