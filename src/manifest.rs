//! Manifest building from directory listings and dataset records.

use log::{error, info, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::dataset::Split;
use crate::error::{ManifestError, Result};
use crate::resolver::resolve_value;
use crate::types::{ColumnKind, DatasetOptions, ManifestEntry, ProcessingStats, Record};
use crate::utils::{create_progress_bar, create_spinner, relative_to_cwd, value_to_string};

const PROGRESS_LOG_INTERVAL: usize = 10;

/// One entry per file, all sharing `label`, in the order given
pub fn build_from_files(video_files: &[PathBuf], label: &str) -> Vec<ManifestEntry> {
    video_files
        .iter()
        .map(|path| ManifestEntry::new(path.to_string_lossy(), label))
        .collect()
}

/// Rewrite every path relative to the current working directory
pub fn relativize_paths(video_files: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    video_files.iter().map(|p| relative_to_cwd(p)).collect()
}

/// Label and reference settings after checking them against the split's schema.
struct ResolvedFields<'a> {
    video_field: &'a str,
    video_kind: ColumnKind,
    label_field: Option<&'a str>,
    override_label: Option<&'a str>,
}

fn resolve_fields<'a>(split: &mut Split, options: &'a DatasetOptions) -> Result<ResolvedFields<'a>> {
    let mut label_field = options.label_field.as_deref();
    let mut video_kind = ColumnKind::Value;

    if let Some(schema) = split.schema()? {
        if !schema.contains(&options.video_field) {
            return Err(ManifestError::ColumnNotFound {
                column: options.video_field.clone(),
                available: schema.column_names(),
            });
        }
        video_kind = schema.kind_of(&options.video_field).unwrap_or_default();

        if let Some(column) = label_field.filter(|c| !schema.contains(c)) {
            warn!(
                "Label column '{}' not found. Available columns: {:?}",
                column,
                schema.column_names()
            );
            label_field = None;
        }
    }

    Ok(ResolvedFields {
        video_field: &options.video_field,
        video_kind,
        label_field,
        override_label: options.override_label.as_deref().filter(|l| !l.is_empty()),
    })
}

fn process_record(
    record: &Record,
    index: usize,
    fields: &ResolvedFields,
    options: &DatasetOptions,
) -> Result<ManifestEntry> {
    let video_data = record
        .get(fields.video_field)
        .ok_or_else(|| ManifestError::MissingField {
            field: fields.video_field.to_string(),
        })?;
    let video = resolve_value(video_data, fields.video_kind, options.dataset_id.as_deref(), index);

    let label = match (fields.override_label, fields.label_field.and_then(|f| record.get(f))) {
        (Some(label), _) => label.to_string(),
        (None, Some(value)) => value_to_string(value),
        (None, None) => options.default_label.clone(),
    };

    Ok(ManifestEntry { video, label })
}

/// Convert the records of one split into manifest entries, in iteration order.
///
/// Records missing the video field are logged and skipped. Errors from the
/// record stream itself and schema mismatches on the video column abort the
/// pass.
pub fn build_from_records(
    mut split: Split,
    options: &DatasetOptions,
) -> Result<(Vec<ManifestEntry>, ProcessingStats)> {
    let fields = resolve_fields(&mut split, options)?;
    let max_items = options.max_items.filter(|&m| m > 0);

    match split.num_rows() {
        Some(len) => info!("Processing {} items from dataset...", len),
        None => info!("Processing streaming dataset..."),
    }
    if let Some(label) = fields.override_label {
        info!("Using override label for all videos: {}", label);
    }

    let pb = match split.num_rows() {
        Some(len) => create_progress_bar(max_items.map_or(len, |m| m.min(len)) as u64, "Items"),
        None => create_spinner("Items"),
    };

    let mut results = Vec::new();
    let mut stats = ProcessingStats::new();
    for index in 0.. {
        if max_items.is_some_and(|m| index >= m) {
            info!("Reached maximum items limit: {}", index);
            break;
        }
        let Some(record) = split.next() else {
            break;
        };
        let record = record?;
        stats.increment_total();

        match process_record(&record, index, &fields, options) {
            Ok(entry) => {
                results.push(entry);
                stats.increment_successful();
            }
            Err(e) => {
                error!("Error processing item {}: {}", index, e);
                stats.increment_skipped();
            }
        }

        pb.inc(1);
        if (index + 1) % PROGRESS_LOG_INTERVAL == 0 {
            info!("Processed {} items...", index + 1);
        }
    }
    pb.finish_and_clear();

    Ok((results, stats))
}

/// Count entries per label, sorted by label
pub fn label_distribution(entries: &[ManifestEntry]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.label.as_str()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemorySplit;
    use crate::types::{Column, Schema};
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().map(|v| v.as_object().unwrap().clone()).collect()
    }

    fn split(values: Vec<Value>, schema: Option<Schema>) -> Split {
        Box::new(MemorySplit::new(records(values), schema))
    }

    fn schema(columns: &[(&str, ColumnKind)]) -> Schema {
        Schema::new(
            columns
                .iter()
                .map(|(name, kind)| Column {
                    name: name.to_string(),
                    kind: *kind,
                })
                .collect(),
        )
    }

    #[test]
    fn test_build_from_files_uses_one_label() {
        let files = vec![PathBuf::from("v/a.mp4"), PathBuf::from("v/b.MOV")];
        let entries = build_from_files(&files, "static");
        assert_eq!(
            entries,
            vec![ManifestEntry::new("v/a.mp4", "static"), ManifestEntry::new("v/b.MOV", "static")]
        );
    }

    #[test]
    fn test_max_items_keeps_order() {
        let values = (0..10).map(|i| json!({"video": format!("https://h/{i}.mp4")})).collect();
        let options = DatasetOptions {
            max_items: Some(3),
            ..Default::default()
        };
        let (entries, stats) = build_from_records(split(values, None), &options).unwrap();
        let videos: Vec<_> = entries.iter().map(|e| e.video.as_str()).collect();
        assert_eq!(videos, vec!["https://h/0.mp4", "https://h/1.mp4", "https://h/2.mp4"]);
        assert_eq!(stats.total_items_seen, 3);
    }

    #[test]
    fn test_zero_max_items_means_no_cap() {
        let values = (0..4).map(|i| json!({"video": format!("{i}.mp4")})).collect();
        let options = DatasetOptions {
            max_items: Some(0),
            ..Default::default()
        };
        let (entries, _) = build_from_records(split(values, None), &options).unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_missing_video_field_is_skipped() {
        let values = vec![
            json!({"video": "a.mp4"}),
            json!({"clip": "b.mp4"}),
            json!({"video": "c.mp4"}),
        ];
        let (entries, stats) = build_from_records(split(values, None), &DatasetOptions::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].video, "c.mp4");
        assert_eq!(stats.skipped_items, 1);
        assert_eq!(stats.total_items_seen, 3);
    }

    #[test]
    fn test_placeholder_uses_record_index() {
        let values = vec![json!({"clip": "x"}), json!({"video": null})];
        let (entries, _) = build_from_records(split(values, None), &DatasetOptions::default()).unwrap();
        assert_eq!(entries, vec![ManifestEntry::new("video_1.mp4", DatasetOptions::default().default_label)]);
    }

    #[test]
    fn test_label_precedence() {
        let values = vec![json!({"video": "a.mp4", "motion": "pan"}), json!({"video": "b.mp4", "motion": 3}), json!({"video": "c.mp4"})];

        let options = DatasetOptions {
            label_field: Some("motion".into()),
            default_label: "fallback".into(),
            ..Default::default()
        };
        let (entries, _) = build_from_records(split(values.clone(), None), &options).unwrap();
        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["pan", "3", "fallback"]);

        let options = DatasetOptions {
            override_label: Some("forced".into()),
            ..options
        };
        let (entries, _) = build_from_records(split(values, None), &options).unwrap();
        assert!(entries.iter().all(|e| e.label == "forced"));
    }

    #[test]
    fn test_dataset_id_builds_hub_urls() {
        let values = vec![json!({"video": "clip9.mp4"})];
        let options = DatasetOptions {
            dataset_id: Some("alice/myset".into()),
            ..Default::default()
        };
        let (entries, _) = build_from_records(split(values, None), &options).unwrap();
        assert_eq!(
            entries[0].video,
            "https://huggingface.co/datasets/alice/myset/resolve/main/clip9.mp4"
        );
    }

    #[test]
    fn test_missing_video_column_fails_fast() {
        let data = split(
            vec![json!({"clip": "a.mp4"})],
            Some(schema(&[("clip", ColumnKind::Value)])),
        );
        match build_from_records(data, &DatasetOptions::default()) {
            Err(ManifestError::ColumnNotFound { column, available }) => {
                assert_eq!(column, "video");
                assert_eq!(available, vec!["clip"]);
            }
            _ => panic!("expected ColumnNotFound"),
        }
    }

    #[test]
    fn test_missing_label_column_is_dropped() {
        let data = split(
            vec![json!({"video": "a.mp4", "motion": "pan"})],
            Some(schema(&[("video", ColumnKind::Value)])),
        );
        let options = DatasetOptions {
            label_field: Some("motion".into()),
            default_label: "fallback".into(),
            ..Default::default()
        };
        let (entries, _) = build_from_records(data, &options).unwrap();
        assert_eq!(entries[0].label, "fallback");
    }

    #[test]
    fn test_video_column_kind_drives_resolution() {
        let data = split(
            vec![json!({"video": {"_hf_encoded": {"path": "hf://datasets/alice/myset@abcd123/clip7.mp4"}}})],
            Some(schema(&[("video", ColumnKind::Video)])),
        );
        let (entries, _) = build_from_records(data, &DatasetOptions::default()).unwrap();
        assert_eq!(
            entries[0].video,
            "https://huggingface.co/datasets/alice/myset/resolve/main/clip7.mp4"
        );
    }

    #[test]
    fn test_label_distribution() {
        let entries = vec![
            ManifestEntry::new("a", "pan"),
            ManifestEntry::new("b", "tilt"),
            ManifestEntry::new("c", "pan"),
        ];
        let counts: Vec<_> = label_distribution(&entries).into_iter().collect();
        assert_eq!(counts, vec![("pan", 2), ("tilt", 1)]);
    }
}
