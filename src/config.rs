use clap::Parser;
use std::path::PathBuf;

use crate::dataset::LoadRequest;
use crate::types::{DatasetOptions, DEFAULT_DATASET_LABEL, DEFAULT_DIR_LABEL, DEFAULT_OUTPUT};

pub const TOKEN_ENV: &str = "HF_TOKEN";
pub const DATASETS_SERVER_ENV: &str = "HF_DATASETS_SERVER";

/// Command-line arguments for converting a directory of videos to a JSON input file.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Convert directory of videos to JSON input file", long_about = None)]
pub struct DirArgs {
    /// Directory containing video files
    pub video_dir: PathBuf,

    /// Output JSON file
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Label to assign to all videos
    #[arg(short = 'l', long = "label", default_value = DEFAULT_DIR_LABEL)]
    pub label: String,

    /// Use paths relative to the current directory instead of the scanned paths
    #[arg(long = "relative-paths")]
    pub relative_paths: bool,
}

/// Command-line arguments for converting a Hugging Face dataset to a JSON input file.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Convert Hugging Face dataset to JSON input file", long_about = None)]
pub struct DatasetArgs {
    /// Hugging Face dataset name or local path (also accepted as -database)
    #[arg(long = "database")]
    pub database: Option<String>,

    /// Output JSON file
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Default label if no label column is specified (also accepted as -label)
    #[arg(long = "label", default_value = DEFAULT_DATASET_LABEL)]
    pub label: String,

    /// Override label for all videos; relabels the output file in place when it exists
    #[arg(long = "change_label")]
    pub change_label: Option<String>,

    /// Name of the video column in the dataset
    #[arg(long = "video-column", default_value = "video")]
    pub video_column: String,

    /// Name of the label column in the dataset
    #[arg(long = "label-column")]
    pub label_column: Option<String>,

    /// Dataset split to use
    #[arg(long = "split", default_value = "train")]
    pub split: String,

    /// Dataset subset/config name
    #[arg(long = "subset")]
    pub subset: Option<String>,

    /// Use streaming mode for large datasets (streaming is always on)
    #[arg(long = "streaming")]
    pub streaming: bool,

    /// Maximum number of items to process (0 means no limit)
    #[arg(long = "max-items")]
    pub max_items: Option<usize>,
}

// Single-dash long options kept for existing scripts
const LEGACY_FLAGS: &[(&str, &str)] = &[("-database", "--database"), ("-label", "--label")];

/// Rewrite `-database` / `-label` (and their `=value` forms) to the double-dash spelling
pub fn normalize_legacy_flags<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            for (legacy, canonical) in LEGACY_FLAGS {
                if arg == *legacy {
                    return canonical.to_string();
                }
                if let Some(value) = arg.strip_prefix(&format!("{legacy}=")) {
                    return format!("{canonical}={value}");
                }
            }
            arg
        })
        .collect()
}

impl DatasetArgs {
    /// Parse the process arguments, accepting the single-dash legacy flags
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_legacy_flags(std::env::args()))
    }

    pub fn to_build_options(&self) -> DatasetOptions {
        DatasetOptions {
            dataset_id: self.database.clone(),
            video_field: self.video_column.clone(),
            label_field: self.label_column.clone(),
            max_items: self.max_items,
            default_label: self.label.clone(),
            override_label: self.change_label.clone(),
        }
    }

    /// Load request for `dataset`. Records are always streamed so videos
    /// resolve to their remote location instead of being downloaded.
    pub fn to_load_request(&self, dataset: &str) -> LoadRequest {
        let mut request = LoadRequest::new(dataset);
        request.subset = self.subset.clone();
        if let Ok(server_url) = std::env::var(DATASETS_SERVER_ENV) {
            request.server_url = server_url;
        }
        request.token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        request
    }
}
