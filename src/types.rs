use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

// Supported video formats
pub const VIDEO_FORMATS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp",
];

pub const DEFAULT_DIR_LABEL: &str = "cam_motion.steadiness_and_movement.moving_camera";
pub const DEFAULT_DATASET_LABEL: &str = "cam_motion.dolly_zoom_movement.has_dolly_in_zoom_out";
pub const DEFAULT_OUTPUT: &str = "input.json";

// Precomputed HashSet of video extensions for fast lookup
pub static VIDEO_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the video extensions set
pub fn get_video_extensions_set() -> &'static HashSet<String> {
    VIDEO_EXTENSIONS_SET.get_or_init(|| VIDEO_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// One `{video, label}` item of a manifest.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub video: String,
    pub label: String,
}

impl ManifestEntry {
    pub fn new(video: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            label: label.into(),
        }
    }
}

/// A dataset record: field name to value, in source order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// How a dataset column's values are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// Decoded video objects
    Video,
    /// Plain values: strings, numbers, mappings
    #[default]
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Column list of a split, when the source can describe it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Options for building a manifest from dataset records.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Dataset identifier used to build hub URLs for bare file names
    pub dataset_id: Option<String>,
    pub video_field: String,
    pub label_field: Option<String>,
    /// Cap on records iterated; `Some(0)` is no cap
    pub max_items: Option<usize>,
    pub default_label: String,
    /// Replaces every per-record label when set and non-empty
    pub override_label: Option<String>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            dataset_id: None,
            video_field: "video".to_string(),
            label_field: None,
            max_items: None,
            default_label: DEFAULT_DATASET_LABEL.to_string(),
            override_label: None,
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_items_seen: usize,
    pub successful_entries: usize,
    pub skipped_items: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_total(&mut self) {
        self.total_items_seen += 1;
    }

    pub fn increment_successful(&mut self) {
        self.successful_entries += 1;
    }

    pub fn increment_skipped(&mut self) {
        self.skipped_items += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total items processed: {}", self.total_items_seen);
        log::info!("Entries extracted: {}", self.successful_entries);
        if self.skipped_items > 0 {
            log::warn!("Skipped items: {}", self.skipped_items);
        }
    }
}
