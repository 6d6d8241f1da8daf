use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;

pub const DATA_DIR_NAME: &str = "aemu";

pub fn data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local/share").join(DATA_DIR_NAME)
    } else {
        PathBuf::from("/tmp").join(DATA_DIR_NAME)
    }
}

pub fn state_dir() -> PathBuf {
    data_dir().join("state")
}

pub fn state_file_path(file_name: &str) -> PathBuf {
    state_dir().join(file_name)
}

pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let rest = path.strip_prefix("~/").unwrap_or("");
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Splits a `PATH`-style list, dropping empty segments.
pub fn split_path_list(value: &str) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub fn default_export_path(prefix: &str) -> PathBuf {
    let ts = now_millis();
    state_dir().join(format!("{prefix}-{ts}.json"))
}

pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn write_json_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let value = Sample {
            name: "emu".into(),
            count: 2,
        };

        write_json_atomic(&path, &value).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        let parsed: Sample = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed, value);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn split_path_list_skips_empty_entries() {
        let joined = std::env::join_paths(["/a/b", "", "/c"]).unwrap();
        let paths = split_path_list(joined.to_str().unwrap());
        assert_eq!(paths, vec![PathBuf::from("/a/b"), PathBuf::from("/c")]);
    }

    #[test]
    fn expand_user_leaves_plain_paths_alone() {
        assert_eq!(expand_user("/opt/android"), PathBuf::from("/opt/android"));
        assert_eq!(expand_user("rel/dir"), PathBuf::from("rel/dir"));
    }

    #[test]
    fn export_path_lives_under_state_dir() {
        let path = default_export_path("emulators");
        assert!(path.starts_with(state_dir()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("emulators-"));
        assert!(name.ends_with(".json"));
    }
}
