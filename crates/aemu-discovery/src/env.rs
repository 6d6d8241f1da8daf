use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

/// Host platform as far as discovery directory conventions are concerned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    Windows,
    #[default]
    Linux,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }
}

/// Source of the ambient values directory resolution depends on.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
    fn platform(&self) -> Platform;
    fn uid(&self) -> Option<u32>;
    fn path_exists(&self, path: &Path) -> bool;
}

/// Reads the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn platform(&self) -> Platform {
        Platform::current()
    }

    #[cfg(unix)]
    fn uid(&self) -> Option<u32> {
        Some(unsafe { libc::getuid() })
    }

    #[cfg(not(unix))]
    fn uid(&self) -> Option<u32> {
        None
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory environment, mostly for tests.
#[derive(Clone, Debug, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
    platform: Platform,
    uid: Option<u32>,
    existing: HashSet<PathBuf>,
}

impl MapEnvironment {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn with_var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_existing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn uid(&self) -> Option<u32> {
        self.uid
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}
