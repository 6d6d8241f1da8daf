//! Discovery of locally running Android emulators.
//!
//! A running emulator drops a `pid_<N>.ini` file into `avd/running` below one
//! of several per-user directories. [`EmulatorDiscovery`] scans those
//! directories and parses each file into an [`EmulatorDescription`].

pub mod description;
pub mod dirs;
pub mod discovery;
pub mod env;
pub mod error;
pub mod ini;

pub use description::EmulatorDescription;
pub use dirs::discovery_directories;
pub use discovery::{match_pid_file, EmulatorDiscovery, Emulators};
pub use env::{Environment, MapEnvironment, Platform, ProcessEnvironment};
pub use error::{DiscoveryError, Result};
pub use ini::{parse_ini_file, parse_ini_str};

/// Returns a discovered emulator. Handy when only one is expected to run.
pub fn get_default_emulator() -> Result<EmulatorDescription> {
    default_emulator_in(&ProcessEnvironment)
}

pub fn default_emulator_in(env: &dyn Environment) -> Result<EmulatorDescription> {
    EmulatorDiscovery::with_environment(env)?.first().cloned()
}
