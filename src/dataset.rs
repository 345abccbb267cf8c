//! Dataset sources: local JSON / JSON Lines datasets and hub datasets.

use jwalk::WalkDir;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{ManifestError, Result};
use crate::hub::{self, HubClient, DEFAULT_CONFIG, DEFAULT_DATASETS_SERVER};
use crate::types::{Column, ColumnKind, Record, Schema};

pub const DATASET_INFO_FILE: &str = "dataset_info.json";
const LOCAL_DATA_DIR: &str = "data";

/// A stream of records from one split.
pub trait RecordStream: Iterator<Item = Result<Record>> {
    /// Columns of the split, when the source can describe them. May fetch.
    fn schema(&mut self) -> Result<Option<Schema>>;

    /// Number of records, when known without iterating.
    fn num_rows(&self) -> Option<usize>;
}

pub type Split = Box<dyn RecordStream>;

/// What a dataset load yields: one unnamed split or several named ones.
pub enum LoadedDataset {
    Single(Split),
    Splits(BTreeMap<String, Split>),
}

impl LoadedDataset {
    pub fn split_names(&self) -> Vec<String> {
        match self {
            LoadedDataset::Single(_) => Vec::new(),
            LoadedDataset::Splits(splits) => splits.keys().cloned().collect(),
        }
    }
}

/// Pick the split to convert. Single-split sources ignore the name.
pub fn select_split(dataset: LoadedDataset, split: &str) -> Result<Split> {
    match dataset {
        LoadedDataset::Single(data) => Ok(data),
        LoadedDataset::Splits(mut splits) => match splits.remove(split) {
            Some(data) => Ok(data),
            None => Err(ManifestError::SplitNotFound {
                split: split.to_string(),
                available: splits.into_keys().collect(),
            }),
        },
    }
}

/// Parameters of a dataset load.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Local path or hub dataset id
    pub dataset: String,
    /// Config (subset) name
    pub subset: Option<String>,
    /// Yield records lazily instead of loading them all up front
    pub streaming: bool,
    /// Base URL of the dataset rows API
    pub server_url: String,
    pub token: Option<String>,
}

impl LoadRequest {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            subset: None,
            streaming: true,
            server_url: DEFAULT_DATASETS_SERVER.to_string(),
            token: None,
        }
    }
}

/// Load a dataset from a local path when one exists, otherwise from the hub.
pub fn load_dataset(request: &LoadRequest) -> Result<LoadedDataset> {
    let path = Path::new(&request.dataset);
    if path.exists() {
        info!("Loading local dataset: {}", path.display());
        return load_local(path, request.subset.as_deref(), request.streaming);
    }
    info!("Loading hub dataset: {}", request.dataset);
    let client = HubClient::new(&request.server_url, request.token.clone())?;
    hub::load_hub_dataset(client, &request.dataset, request.subset.as_deref(), request.streaming)
}

/// Load a `.json` / `.jsonl` file or a directory of them.
pub fn load_local(path: &Path, subset: Option<&str>, streaming: bool) -> Result<LoadedDataset> {
    if path.is_file() {
        if let Some(subset) = subset {
            warn!("Ignoring subset '{}' for single-file dataset {}", subset, path.display());
        }
        return Ok(LoadedDataset::Single(open_files(vec![path.to_path_buf()], None, streaming)?));
    }

    let root = match subset {
        Some(subset) => {
            let dir = path.join(subset);
            if !dir.is_dir() {
                return Err(ManifestError::ConfigNotFound {
                    config: subset.to_string(),
                    available: list_subdirectories(path)?,
                });
            }
            dir
        }
        None => choose_local_config(path)?,
    };

    let schema = read_dataset_info(&root)?;
    let mut grouped: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in find_data_files(&root) {
        grouped.entry(split_name_of(&file)).or_default().push(file);
    }

    let mut splits = BTreeMap::new();
    for (name, mut files) in grouped {
        files.sort();
        debug!("Split '{}' has {} data file(s)", name, files.len());
        splits.insert(name, open_files(files, schema.clone(), streaming)?);
    }
    Ok(LoadedDataset::Splits(splits))
}

/// Subdirectories holding data files are configs. `data/` is the plain
/// layout of a single-config dataset and never counts as one.
fn choose_local_config(path: &Path) -> Result<PathBuf> {
    let mut configs = Vec::new();
    for name in list_subdirectories(path)? {
        if name != LOCAL_DATA_DIR && !find_data_files(&path.join(&name)).is_empty() {
            configs.push(name);
        }
    }

    if configs.is_empty() {
        return Ok(path.to_path_buf());
    }
    if configs.len() == 1 {
        info!("Using config '{}'", configs[0]);
        return Ok(path.join(&configs[0]));
    }
    if configs.iter().any(|c| c == DEFAULT_CONFIG) {
        return Ok(path.join(DEFAULT_CONFIG));
    }
    Err(ManifestError::ConfigRequired { available: configs })
}

fn list_subdirectories(path: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// All `.json` / `.jsonl` data files under `root`, excluding dataset metadata
fn find_data_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.file_name().is_some_and(|n| n != DATASET_INFO_FILE))
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonl"))
        })
        .collect()
}

/// `train-00000-of-00002.jsonl` and `train.jsonl` both belong to split `train`
fn split_name_of(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.split('-').next().unwrap_or_default().to_string()
}

/// Read column names and kinds from `dataset_info.json`, if present
pub fn read_dataset_info(root: &Path) -> Result<Option<Schema>> {
    let info_path = root.join(DATASET_INFO_FILE);
    if !info_path.is_file() {
        return Ok(None);
    }
    let info: Value = serde_json::from_reader(BufReader::new(File::open(&info_path)?))?;
    let Some(features) = info.get("features").and_then(Value::as_object) else {
        warn!("{} has no features object; schema unknown", info_path.display());
        return Ok(None);
    };
    let columns = features
        .iter()
        .map(|(name, feature)| Column {
            name: name.clone(),
            kind: feature_kind(feature),
        })
        .collect();
    Ok(Some(Schema::new(columns)))
}

/// Column kind of a feature description such as `{"_type": "Video"}`
pub fn feature_kind(feature: &Value) -> ColumnKind {
    match feature.get("_type").and_then(Value::as_str) {
        Some("Video") => ColumnKind::Video,
        _ => ColumnKind::Value,
    }
}

fn open_files(files: Vec<PathBuf>, schema: Option<Schema>, streaming: bool) -> Result<Split> {
    let stream = FileRecords::new(files, schema.clone());
    if streaming {
        return Ok(Box::new(stream));
    }
    let records = stream.collect::<Result<Vec<_>>>()?;
    Ok(Box::new(MemorySplit::new(records, schema)))
}

fn record_from_value(value: Value, origin: &Path) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(ManifestError::InvalidRecord(format!(
            "expected an object in {}, got {}",
            origin.display(),
            other
        ))),
    }
}

/// Records read lazily from a sequence of `.jsonl` / `.json` files.
pub struct FileRecords {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<FileCursor>,
    schema: Option<Schema>,
}

enum FileCursor {
    Lines { path: PathBuf, lines: Lines<BufReader<File>> },
    Array { path: PathBuf, values: std::vec::IntoIter<Value> },
}

impl FileRecords {
    pub fn new(files: Vec<PathBuf>, schema: Option<Schema>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            schema,
        }
    }

    fn open(path: PathBuf) -> Result<FileCursor> {
        let is_jsonl = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
        let reader = BufReader::new(File::open(&path)?);
        if is_jsonl {
            return Ok(FileCursor::Lines {
                path,
                lines: reader.lines(),
            });
        }
        match serde_json::from_reader(reader)? {
            Value::Array(values) => Ok(FileCursor::Array {
                path,
                values: values.into_iter(),
            }),
            _ => Err(ManifestError::InvalidRecord(format!(
                "{} must hold a JSON array of records",
                path.display()
            ))),
        }
    }
}

impl Iterator for FileRecords {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.current.as_mut() {
                Some(FileCursor::Lines { path, lines }) => match lines.next() {
                    Some(Ok(line)) if line.trim().is_empty() => continue,
                    Some(Ok(line)) => {
                        let parsed = serde_json::from_str(&line)
                            .map_err(ManifestError::from)
                            .and_then(|value| record_from_value(value, path));
                        return Some(parsed);
                    }
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.current = None,
                },
                Some(FileCursor::Array { path, values }) => match values.next() {
                    Some(value) => return Some(record_from_value(value, path)),
                    None => self.current = None,
                },
                None => {
                    let path = self.files.next()?;
                    match Self::open(path) {
                        Ok(cursor) => self.current = Some(cursor),
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }
    }
}

impl RecordStream for FileRecords {
    fn schema(&mut self) -> Result<Option<Schema>> {
        Ok(self.schema.clone())
    }

    fn num_rows(&self) -> Option<usize> {
        None
    }
}

/// A fully materialized split.
pub struct MemorySplit {
    records: std::vec::IntoIter<Record>,
    len: usize,
    schema: Option<Schema>,
}

impl MemorySplit {
    pub fn new(records: Vec<Record>, schema: Option<Schema>) -> Self {
        Self {
            len: records.len(),
            records: records.into_iter(),
            schema,
        }
    }
}

impl Iterator for MemorySplit {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(Ok)
    }
}

impl RecordStream for MemorySplit {
    fn schema(&mut self) -> Result<Option<Schema>> {
        Ok(self.schema.clone())
    }

    fn num_rows(&self) -> Option<usize> {
        Some(self.len)
    }
}
