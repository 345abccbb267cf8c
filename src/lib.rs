//! Video manifest converters
//!
//! This library builds `{video, label}` JSON manifests either from a directory
//! of video files or from the records of a Hugging Face dataset, and relabels
//! existing manifests.

pub mod config;
pub mod dataset;
pub mod error;
pub mod hub;
pub mod io;
pub mod manifest;
pub mod relabel;
pub mod resolver;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{DatasetArgs, DirArgs};
pub use dataset::{load_dataset, select_split, LoadRequest, LoadedDataset, RecordStream, Split};
pub use error::{ManifestError, Result};
pub use io::{find_video_files, read_manifest, write_manifest};
pub use manifest::{build_from_files, build_from_records, label_distribution};
pub use relabel::{relabel_manifest_file, rewrite_labels};
pub use resolver::{resolve, VideoReference};
pub use types::{DatasetOptions, ManifestEntry, ProcessingStats};
