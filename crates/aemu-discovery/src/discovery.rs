use std::{
    collections::{hash_map, BTreeSet, HashMap},
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use tracing::debug;

use crate::{
    description::{EmulatorDescription, PROP_AVD_NAME, PROP_GRPC_PORT, PROP_PID},
    dirs::discovery_directories,
    env::{Environment, ProcessEnvironment},
    error::{DiscoveryError, Result},
    ini::parse_ini_file,
};

static PID_FILE: OnceLock<Regex> = OnceLock::new();

fn pid_file_regex() -> &'static Regex {
    PID_FILE.get_or_init(|| Regex::new(r"^pid_(\d+)\.ini$").expect("pid file pattern"))
}

/// Returns the pid captured from a `pid_<N>.ini` file name.
pub fn match_pid_file(file_name: &str) -> Option<&str> {
    pid_file_regex()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Finds running emulators by reading the pid files they leave behind.
///
/// The directory list is fixed at construction. Every call to
/// [`discover`](Self::discover) rebuilds the result from scratch and only
/// swaps it in once the whole scan succeeded, so readers always see one
/// complete snapshot.
#[derive(Debug)]
pub struct EmulatorDiscovery {
    directories: Vec<PathBuf>,
    emulators: HashMap<String, EmulatorDescription>,
}

impl EmulatorDiscovery {
    /// Scans the directories derived from the process environment.
    pub fn new() -> Result<Self> {
        Self::with_environment(&ProcessEnvironment)
    }

    pub fn with_environment(env: &dyn Environment) -> Result<Self> {
        Self::with_directories(discovery_directories(env))
    }

    pub fn with_directories(directories: Vec<PathBuf>) -> Result<Self> {
        let mut discovery = Self {
            directories,
            emulators: HashMap::new(),
        };
        discovery.discover()?;
        Ok(discovery)
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Rescans every discovery directory and replaces the current result.
    pub fn discover(&mut self) -> Result<()> {
        let mut found = HashMap::new();
        for dir in &self.directories {
            scan_directory(dir, &mut found)?;
        }
        debug!("Discovered {} emulator(s)", found.len());
        self.emulators = found;
        Ok(())
    }

    pub fn available(&self) -> usize {
        self.emulators.len()
    }

    pub fn emulators(&self) -> Emulators<'_> {
        Emulators {
            inner: &self.emulators,
        }
    }

    /// First emulator whose `prop` equals `value` exactly.
    pub fn find_emulator(&self, prop: &str, value: &str) -> Option<&EmulatorDescription> {
        self.emulators
            .values()
            .find(|emu| emu.get(prop) == Some(value))
    }

    pub fn find_by_pid(&self, pid: impl Display) -> Option<&EmulatorDescription> {
        self.find_emulator(PROP_PID, &pid.to_string())
    }

    pub fn find_by_name(&self, avd_name: &str) -> Option<&EmulatorDescription> {
        self.find_emulator(PROP_AVD_NAME, avd_name)
    }

    pub fn find_by_grpc_port(&self, port: u16) -> Option<&EmulatorDescription> {
        self.find_emulator(PROP_GRPC_PORT, &port.to_string())
    }

    /// Some discovered emulator. Which one is unspecified when several run.
    pub fn first(&self) -> Result<&EmulatorDescription> {
        self.emulators
            .values()
            .next()
            .ok_or(DiscoveryError::NoEmulators)
    }
}

fn scan_directory(dir: &Path, found: &mut HashMap<String, EmulatorDescription>) -> Result<()> {
    debug!("Discovering emulators in {}", dir.display());
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(DiscoveryError::io(dir, err)),
    };

    for entry in entries {
        let entry = entry.map_err(|err| DiscoveryError::io(dir, err))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(pid) = match_pid_file(file_name) else {
            continue;
        };
        if entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        debug!("Found {}", path.display());
        let properties = parse_ini_file(&path).map_err(|err| DiscoveryError::io(&path, err))?;
        if properties.is_empty() {
            debug!("Skipping {}: no properties", path.display());
            continue;
        }
        if let hash_map::Entry::Vacant(slot) = found.entry(pid.to_string()) {
            slot.insert(EmulatorDescription::new(pid, properties));
        }
    }
    Ok(())
}

/// Read-only view over the current discovery result.
#[derive(Clone, Copy, Debug)]
pub struct Emulators<'a> {
    inner: &'a HashMap<String, EmulatorDescription>,
}

impl<'a> Emulators<'a> {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_pid(&self, pid: &str) -> bool {
        self.inner.contains_key(pid)
    }

    pub fn get(&self, pid: &str) -> Option<&'a EmulatorDescription> {
        self.inner.get(pid)
    }

    pub fn pids(&self) -> BTreeSet<&'a str> {
        self.inner.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> hash_map::Values<'a, String, EmulatorDescription> {
        self.inner.values()
    }
}

impl<'a> IntoIterator for Emulators<'a> {
    type Item = &'a EmulatorDescription;
    type IntoIter = hash_map::Values<'a, String, EmulatorDescription>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_names() {
        assert_eq!(match_pid_file("pid_123.ini"), Some("123"));
        assert_eq!(match_pid_file("pid_0.ini"), Some("0"));
        assert_eq!(match_pid_file("notpid.ini"), None);
        assert_eq!(match_pid_file("pid_abc.ini"), None);
        assert_eq!(match_pid_file("pid_.ini"), None);
        assert_eq!(match_pid_file("pid_12xini"), None);
        assert_eq!(match_pid_file("pid_12.ini.lock"), None);
        assert_eq!(match_pid_file("xpid_12.ini"), None);
    }

    #[test]
    fn empty_directory_set_has_nothing() {
        let discovery = EmulatorDiscovery::with_directories(Vec::new()).unwrap();
        assert_eq!(discovery.available(), 0);
        assert!(discovery.emulators().is_empty());
        assert!(matches!(
            discovery.first(),
            Err(DiscoveryError::NoEmulators)
        ));
    }

    #[test]
    fn missing_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let discovery =
            EmulatorDiscovery::with_directories(vec![dir.path().join("avd/running")]).unwrap();
        assert_eq!(discovery.available(), 0);
    }

    #[test]
    fn first_pid_wins_across_directories() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("pid_5.ini"), "avd.name=first\n").unwrap();
        fs::write(b.path().join("pid_5.ini"), "avd.name=second\n").unwrap();

        let discovery = EmulatorDiscovery::with_directories(vec![
            a.path().to_path_buf(),
            b.path().to_path_buf(),
        ])
        .unwrap();
        assert_eq!(discovery.available(), 1);
        assert_eq!(discovery.first().unwrap().name(), Some("first"));
    }
}
