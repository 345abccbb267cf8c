use glob::{glob, Pattern};
use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ManifestError, Result};
use crate::types::{get_video_extensions_set, ManifestEntry};

const JSON_INDENT: &[u8] = b"    ";

/// Whether the path's extension is a known video extension, ignoring case
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_video_extensions_set().contains(&ext.to_lowercase()))
}

/// List the video files directly inside `directory`, sorted by path
pub fn find_video_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.exists() {
        return Err(ManifestError::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(ManifestError::NotADirectory(directory.to_path_buf()));
    }

    let pattern = Path::new(&Pattern::escape(&directory.to_string_lossy())).join("*");
    let mut video_files: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file() && is_video_file(path))
        .collect();
    video_files.sort();
    debug!("{} video files in {}", video_files.len(), directory.display());
    Ok(video_files)
}

/// Serialize `value` as JSON indented by four spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write `value` to `path`; the file is only touched once serialization succeeded
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let buffer = to_pretty_json(value)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&buffer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> Result<()> {
    write_json(path, entries)
}

/// Read a manifest as typed entries
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Read a manifest as raw JSON values, keeping unknown fields and their order
pub fn read_manifest_values(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Array(entries) => Ok(entries),
        other => Err(ManifestError::InvalidManifest(format!(
            "{} holds a JSON {} instead of an array",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
