use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use video2json::dataset::{load_local, MemorySplit};
use video2json::io::read_manifest_values;
use video2json::types::Record;
use video2json::{
    build_from_files, build_from_records, find_video_files, read_manifest, relabel_manifest_file,
    select_split, write_manifest, DatasetOptions, ManifestEntry, ManifestError,
};

fn touch(path: &Path) {
    File::create(path).unwrap().write_all(b"").unwrap();
}

fn record(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

#[test]
fn test_find_video_files_filters_and_sorts() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    for name in ["b.mp4", "a.MOV", "c.webm", "notes.txt", "clip.mp4.part", "d.3GP"] {
        touch(&dir.join(name));
    }
    fs::create_dir(dir.join("nested.mp4")).unwrap();
    touch(&dir.join("nested.mp4").join("inner.mp4"));

    let files = find_video_files(dir).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.MOV", "b.mp4", "c.webm", "d.3GP"]);
    assert!(files.iter().all(|p| p.starts_with(dir)));

    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
}

#[test]
fn test_find_video_files_errors() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing");
    assert!(matches!(
        find_video_files(&missing),
        Err(ManifestError::DirectoryNotFound(_))
    ));

    let file = temp_dir.path().join("a.mp4");
    touch(&file);
    assert!(matches!(
        find_video_files(&file),
        Err(ManifestError::NotADirectory(_))
    ));
}

#[test]
fn test_find_video_files_with_glob_characters_in_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("clips [2024]");
    fs::create_dir(&dir).unwrap();
    touch(&dir.join("a.mp4"));

    let files = find_video_files(&dir).unwrap();
    assert_eq!(files, vec![dir.join("a.mp4")]);
}

#[test]
fn test_write_and_read_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("input.json");
    let files = vec![PathBuf::from("videos/a.mp4"), PathBuf::from("videos/b.mp4")];
    let entries = build_from_files(&files, "static");

    write_manifest(&output, &entries).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("[\n    {\n        \"video\": \"videos/a.mp4\",\n        \"label\": \"static\""));
    assert_eq!(read_manifest(&output).unwrap(), entries);
}

#[test]
fn test_relabel_preserves_videos() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("input.json");
    let entries: Vec<_> = (0..5)
        .map(|i| ManifestEntry::new(format!("https://h/{i}.mp4"), format!("label{i}")))
        .collect();
    write_manifest(&output, &entries).unwrap();

    assert_eq!(relabel_manifest_file(&output, "X").unwrap(), 5);

    let relabeled = read_manifest(&output).unwrap();
    assert_eq!(relabeled.len(), 5);
    for (before, after) in entries.iter().zip(&relabeled) {
        assert_eq!(after.video, before.video);
        assert_eq!(after.label, "X");
    }
}

#[test]
fn test_relabel_leaves_unlabeled_entries() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("input.json");
    fs::write(&output, r#"[{"video": "a.mp4"}, {"video": "b.mp4", "label": "old"}]"#).unwrap();

    relabel_manifest_file(&output, "new").unwrap();

    let values = read_manifest_values(&output).unwrap();
    assert_eq!(values[0], json!({"video": "a.mp4"}));
    assert_eq!(values[1], json!({"video": "b.mp4", "label": "new"}));
}

#[test]
fn test_build_from_records_tolerates_bad_items() {
    let records = vec![
        record(json!({"video": "https://cdn.example.com/0.mp4"})),
        record(json!({"frames": 12})),
        record(json!({"video": "https://cdn.example.com/2.mp4"})),
        record(json!({"frames": 3})),
        record(json!({"video": "https://cdn.example.com/4.mp4"})),
    ];
    let split = Box::new(MemorySplit::new(records, None));
    let (entries, stats) = build_from_records(split, &DatasetOptions::default()).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(stats.skipped_items, 2);
    assert_eq!(entries[2].video, "https://cdn.example.com/4.mp4");
}

#[test]
fn test_local_dataset_split_selection() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("train.jsonl"), "{\"video\": \"a.mp4\", \"motion\": \"pan\"}\n").unwrap();
    fs::write(root.join("validation.jsonl"), "{\"video\": \"b.mp4\", \"motion\": \"tilt\"}\n").unwrap();

    let dataset = load_local(root, None, true).unwrap();
    match select_split(dataset, "test") {
        Err(ManifestError::SplitNotFound { available, .. }) => {
            assert_eq!(available, vec!["train", "validation"]);
        }
        _ => panic!("expected SplitNotFound"),
    }

    let dataset = load_local(root, None, true).unwrap();
    let split = select_split(dataset, "validation").unwrap();
    let options = DatasetOptions {
        label_field: Some("motion".into()),
        ..Default::default()
    };
    let (entries, _) = build_from_records(split, &options).unwrap();
    assert_eq!(entries, vec![ManifestEntry::new("b.mp4", "tilt")]);
}
