use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Whether the string is an `http://` or `https://` URL
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Everything after the last `/`, or the whole string when there is none
pub fn basename(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

/// Render a JSON value as label or file-name text: strings verbatim, the rest as JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for passes whose length is unknown up front
pub fn create_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] {{pos}} items",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

/// Lexically normalize a path: drop `.` and fold `..` into the preceding segment
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if ends_in_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `base`, both taken as absolute when joined onto `base`
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let target = normalize(&base.join(path));
    let base = normalize(base);

    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Express `path` relative to the current working directory
pub fn relative_to_cwd(path: &Path) -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(relative_path(path, &cwd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/data/clips/a.mp4"), "a.mp4");
        assert_eq!(basename("a.mp4"), "a.mp4");
        assert_eq!(basename("dir/"), "");
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.mp4"));
        assert!(is_url("http://example.com/a.mp4"));
        assert!(!is_url("ftp://example.com/a.mp4"));
        assert!(!is_url("clip.mp4"));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("pan_left")), "pan_left");
        assert_eq!(value_to_string(&json!(3)), "3");
        assert_eq!(value_to_string(&json!(true)), "true");
    }

    #[test]
    fn test_relative_path() {
        let base = Path::new("/home/user/work");
        assert_eq!(
            relative_path(Path::new("/home/user/work/videos/a.mp4"), base),
            PathBuf::from("videos/a.mp4")
        );
        assert_eq!(
            relative_path(Path::new("/home/user/other/a.mp4"), base),
            PathBuf::from("../other/a.mp4")
        );
        assert_eq!(
            relative_path(Path::new("./videos/../clips/b.mp4"), base),
            PathBuf::from("clips/b.mp4")
        );
    }
}
