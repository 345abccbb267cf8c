//! Resolution of raw video references into canonical URLs or file names.
//!
//! A dataset cell can hold a URL, a decoded video object or a plain mapping.
//! [`VideoReference::classify`] sorts a JSON value into one of the known
//! shapes and [`resolve`] turns that shape into a single non-empty string.

use log::warn;
use serde_json::{Map, Value};

use crate::types::ColumnKind;
use crate::utils::{basename, is_url, value_to_string};

pub const HUB_URL: &str = "https://huggingface.co";
pub const HF_SCHEME: &str = "hf://";

// Keys probed on a plain mapping, in priority order
const MAPPING_KEYS: &[&str] = &["url", "src", "path", "filename", "name"];

/// Where a decoded video object's container says the file lives.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerHandle {
    /// The `container` value as found on the object
    pub container: Value,
    /// `_c.file.name` on the object, if present
    pub inner_file_name: Option<String>,
}

/// Direct path-like attributes of a decoded video object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoAttributes {
    pub path: Option<String>,
    pub filename: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub src: Option<Value>,
}

impl VideoAttributes {
    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let text = |key: &str| match object.get(key) {
            None | Some(Value::Null) => None,
            Some(v) => Some(value_to_string(v)),
        };
        let attrs = Self {
            path: text("path"),
            filename: text("filename"),
            name: text("name"),
            url: text("url"),
            src: object.get("src").filter(|v| !v.is_null()).cloned(),
        };
        (attrs != Self::default()).then_some(attrs)
    }
}

/// The recognized shapes of a raw video reference, tried in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoReference {
    /// An `http(s)://` string
    Url(String),
    /// A decoded object carrying an encoded location record (`_hf_encoded.path`)
    Encoded { path: String },
    /// A decoded object wrapping an opened container
    Container(ContainerHandle),
    /// A decoded object with `path`, `filename`, `name`, `url` or `src`
    Attributes(VideoAttributes),
    /// Any other string
    Text(String),
    /// A plain key/value mapping
    Mapping(Map<String, Value>),
    /// Anything else, already stringified
    Other(String),
    /// Nothing usable (`null`)
    Missing,
}

impl VideoReference {
    /// Classify a raw cell value. `kind` says whether objects in this column are
    /// decoded video objects or plain mappings.
    pub fn classify(value: &Value, kind: ColumnKind) -> Self {
        match value {
            Value::String(s) if is_url(s) => VideoReference::Url(s.clone()),
            Value::String(s) => VideoReference::Text(s.clone()),
            Value::Null => VideoReference::Missing,
            Value::Object(object) => match kind {
                ColumnKind::Video => Self::classify_video_object(object),
                ColumnKind::Value => VideoReference::Mapping(object.clone()),
            },
            other => VideoReference::Other(other.to_string()),
        }
    }

    fn classify_video_object(object: &Map<String, Value>) -> Self {
        if let Some(Value::Object(encoded)) = object.get("_hf_encoded") {
            let path = encoded
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return VideoReference::Encoded { path };
        }

        if let Some(container) = object.get("container") {
            let inner_file_name = object
                .get("_c")
                .and_then(|c| c.get("file"))
                .and_then(|f| f.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return VideoReference::Container(ContainerHandle {
                container: container.clone(),
                inner_file_name,
            });
        }

        match VideoAttributes::from_object(object) {
            Some(attrs) => VideoReference::Attributes(attrs),
            None => VideoReference::Other(Value::Object(object.clone()).to_string()),
        }
    }
}

/// Outcome of one variant's resolution step.
enum Resolved {
    /// A full URL, returned as is
    Url(String),
    /// A file name still to be combined with the dataset id
    File(String),
    Nothing,
}

/// Build the hub download URL for a file inside a dataset repository.
pub fn hub_resolve_url(dataset_path: &str, filename: &str) -> String {
    format!("{HUB_URL}/datasets/{dataset_path}/resolve/main/{filename}")
}

fn placeholder(index: usize) -> String {
    format!("video_{index}.mp4")
}

/// Resolve a video reference into a URL or file name. Never fails and never
/// returns an empty string.
pub fn resolve(reference: &VideoReference, dataset_id: Option<&str>, index: usize) -> String {
    let filename = match resolve_variant(reference, index) {
        Resolved::Url(url) => return url,
        Resolved::File(name) if !name.is_empty() => Some(name),
        _ => None,
    };

    match (filename, dataset_id.filter(|d| !d.is_empty())) {
        (Some(name), Some(dataset)) if !is_sentinel(&name) => hub_resolve_url(dataset, &name),
        (Some(name), _) => name,
        (None, _) => placeholder(index),
    }
}

/// Classify a raw value and resolve it in one step.
pub fn resolve_value(value: &Value, kind: ColumnKind, dataset_id: Option<&str>, index: usize) -> String {
    resolve(&VideoReference::classify(value, kind), dataset_id, index)
}

fn is_sentinel(name: &str) -> bool {
    name == "None" || name.to_lowercase().contains("<none>")
}

fn resolve_variant(reference: &VideoReference, index: usize) -> Resolved {
    match reference {
        VideoReference::Url(url) => Resolved::Url(url.clone()),
        VideoReference::Encoded { path } => resolve_encoded(path),
        VideoReference::Container(handle) => resolve_container(handle, index),
        VideoReference::Attributes(attrs) => resolve_attributes(attrs),
        VideoReference::Text(text) => resolve_text(text),
        VideoReference::Mapping(map) => resolve_mapping(map),
        VideoReference::Other(text) => Resolved::File(basename(text).to_string()),
        VideoReference::Missing => Resolved::Nothing,
    }
}

/// `hf://datasets/<owner>/<name>@<rev>/<file>` becomes a hub resolve URL;
/// other non-empty paths contribute their basename.
fn resolve_encoded(path: &str) -> Resolved {
    let Some(rest) = path.strip_prefix(HF_SCHEME) else {
        return if path.is_empty() {
            Resolved::Nothing
        } else {
            Resolved::File(basename(path).to_string())
        };
    };

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() < 3 {
        return Resolved::Nothing;
    }
    let filename = parts[parts.len() - 1];
    let dataset_path = parts[1..parts.len() - 1].join("/");
    let dataset_path = dataset_path.split('@').next().unwrap_or_default();
    Resolved::Url(hub_resolve_url(dataset_path, filename))
}

fn resolve_container(handle: &ContainerHandle, index: usize) -> Resolved {
    let name_of = |v: &Value| v.get("name").and_then(Value::as_str).map(str::to_string);

    if let Some(name) = name_of(&handle.container) {
        return Resolved::File(basename(&name).to_string());
    }
    if let Some(name) = &handle.inner_file_name {
        return Resolved::File(basename(name).to_string());
    }

    let Value::Object(container) = &handle.container else {
        warn!(
            "Could not extract filename from video container: expected an object, got {}",
            handle.container
        );
        return Resolved::File(placeholder(index));
    };

    if let Some(metadata) = container.get("metadata").and_then(Value::as_object) {
        return match metadata.get("filename") {
            Some(filename) => Resolved::File(value_to_string(filename)),
            None => Resolved::Nothing,
        };
    }
    if let Some(file) = container.get("file") {
        return match name_of(file) {
            Some(name) => Resolved::File(basename(&name).to_string()),
            None => Resolved::File(value_to_string(file)),
        };
    }
    Resolved::Nothing
}

fn resolve_attributes(attrs: &VideoAttributes) -> Resolved {
    if let Some(path) = &attrs.path {
        return Resolved::File(basename(path).to_string());
    }
    if let Some(filename) = attrs.filename.as_ref().or(attrs.name.as_ref()) {
        return Resolved::File(filename.clone());
    }
    if let Some(url) = &attrs.url {
        return Resolved::Url(url.clone());
    }
    match &attrs.src {
        Some(Value::String(src)) if is_url(src) => Resolved::Url(src.clone()),
        Some(src) => Resolved::File(basename(&value_to_string(src)).to_string()),
        None => Resolved::Nothing,
    }
}

fn resolve_text(text: &str) -> Resolved {
    if text.starts_with('/') {
        Resolved::File(basename(text).to_string())
    } else {
        Resolved::File(text.to_string())
    }
}

fn resolve_mapping(map: &Map<String, Value>) -> Resolved {
    MAPPING_KEYS
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::String(value)) if is_url(value) => Some(Resolved::Url(value.clone())),
            Some(Value::String(value)) => Some(Resolved::File(basename(value).to_string())),
            _ => None,
        })
        .unwrap_or(Resolved::Nothing)
}
