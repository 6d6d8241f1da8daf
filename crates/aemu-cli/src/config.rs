use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

const CLI_CONFIG_FILE: &str = "cli-config.json";
pub(crate) const ENV_DISCOVERY_DIRS: &str = "AEMU_DISCOVERY_DIRS";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Directories scanned for pid files in addition to the standard ones.
    pub(crate) extra_dirs: Vec<String>,
    pub(crate) json: bool,
    /// Set from `AEMU_DISCOVERY_DIRS`; replaces `extra_dirs` for scanning but
    /// is never written back to the file.
    #[serde(skip)]
    env_dirs: Option<Vec<String>>,
}

impl CliConfig {
    pub(crate) fn load() -> Self {
        Self::load_from(&cli_config_path(), std::env::var(ENV_DISCOVERY_DIRS).ok())
    }

    fn load_from(path: &Path, env_dirs: Option<String>) -> Self {
        let mut cfg = match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<CliConfig>(&data) {
                Ok(file_cfg) => file_cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}", path.display());
                    CliConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}", path.display());
                }
                CliConfig::default()
            }
        };
        cfg.env_dirs = env_dirs.map(|dirs| {
            aemu_util::split_path_list(&dirs)
                .into_iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect()
        });
        cfg
    }

    /// Directories to scan: the environment override if set, else the file's.
    pub(crate) fn effective_dirs(&self) -> &[String] {
        self.env_dirs.as_deref().unwrap_or(self.extra_dirs.as_slice())
    }

    pub(crate) fn extra_dir_paths(&self) -> Vec<PathBuf> {
        self.effective_dirs()
            .iter()
            .map(|dir| dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(aemu_util::expand_user)
            .collect()
    }

    /// Returns false when the directory was already configured.
    pub(crate) fn add_dir(&mut self, dir: &str) -> bool {
        let dir = dir.trim();
        if dir.is_empty() || self.extra_dirs.iter().any(|existing| existing == dir) {
            return false;
        }
        self.extra_dirs.push(dir.to_string());
        true
    }

    pub(crate) fn remove_dir(&mut self, dir: &str) -> bool {
        let before = self.extra_dirs.len();
        self.extra_dirs.retain(|existing| existing != dir.trim());
        self.extra_dirs.len() != before
    }

    pub(crate) fn save(&self) -> io::Result<()> {
        self.save_to(&cli_config_path())
    }

    fn save_to(&self, path: &Path) -> io::Result<()> {
        aemu_util::write_json_atomic(path, self)
    }
}

pub(crate) fn cli_config_path() -> PathBuf {
    aemu_util::state_file_path(CLI_CONFIG_FILE)
}
