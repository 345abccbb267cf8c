//! Relabeling of an existing manifest without re-resolving its videos.

use log::info;
use serde_json::Value;
use std::path::Path;

use crate::error::Result;
use crate::io::{read_manifest_values, write_json};

/// Replace `label` on every object entry that has one. Everything else,
/// including entries without a label, is left as it was.
pub fn rewrite_labels(mut entries: Vec<Value>, new_label: &str) -> Vec<Value> {
    for entry in entries.iter_mut() {
        if let Some(label) = entry.as_object_mut().and_then(|o| o.get_mut("label")) {
            *label = Value::String(new_label.to_string());
        }
    }
    entries
}

/// Rewrite the labels of the manifest at `path` in place and return its entry count
pub fn relabel_manifest_file(path: &Path, new_label: &str) -> Result<usize> {
    info!("Found existing {}, changing labels to: {}", path.display(), new_label);
    let entries = rewrite_labels(read_manifest_values(path)?, new_label);
    write_json(path, &entries)?;
    info!("Updated {} entries with new label: {}", entries.len(), new_label);
    info!("JSON file updated: {}", path.display());
    Ok(entries.len())
}
