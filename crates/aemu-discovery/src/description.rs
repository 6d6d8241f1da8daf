use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};

use serde::Serialize;

pub const PROP_PID: &str = "pid";
pub const PROP_AVD_NAME: &str = "avd.name";
pub const PROP_AVD_DIR: &str = "avd.dir";
pub const PROP_AVD_ID: &str = "avd.id";
pub const PROP_CONSOLE_PORT: &str = "port.serial";
pub const PROP_ADB_PORT: &str = "port.adb";
pub const PROP_GRPC_PORT: &str = "grpc.port";
pub const PROP_GRPC_TOKEN: &str = "grpc.token";
pub const PROP_CMDLINE: &str = "cmdline";

/// One running emulator, as described by its `pid_<N>.ini` file.
///
/// Two descriptions are equal when they refer to the same process id,
/// regardless of their properties.
#[derive(Clone, Debug, Serialize)]
pub struct EmulatorDescription {
    pid: String,
    properties: BTreeMap<String, String>,
}

impl EmulatorDescription {
    pub fn new(pid: impl Into<String>, properties: BTreeMap<String, String>) -> Self {
        Self {
            pid: pid.into(),
            properties,
        }
    }

    /// Process id taken from the discovery file name.
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// Looks up a property. `pid` falls back to the file name pid when the
    /// file itself does not carry one.
    pub fn get(&self, prop: &str) -> Option<&str> {
        match self.properties.get(prop) {
            Some(value) => Some(value.as_str()),
            None if prop == PROP_PID => Some(self.pid.as_str()),
            None => None,
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn name(&self) -> Option<&str> {
        self.get(PROP_AVD_NAME)
    }

    pub fn avd_dir(&self) -> Option<&str> {
        self.get(PROP_AVD_DIR)
    }

    pub fn avd_id(&self) -> Option<&str> {
        self.get(PROP_AVD_ID)
    }

    pub fn cmdline(&self) -> Option<&str> {
        self.get(PROP_CMDLINE)
    }

    pub fn console_port(&self) -> Option<u16> {
        self.port(PROP_CONSOLE_PORT)
    }

    pub fn adb_port(&self) -> Option<u16> {
        self.port(PROP_ADB_PORT)
    }

    pub fn grpc_port(&self) -> Option<u16> {
        self.port(PROP_GRPC_PORT)
    }

    pub fn grpc_token(&self) -> Option<&str> {
        self.get(PROP_GRPC_TOKEN).filter(|token| !token.is_empty())
    }

    /// adb serial (`emulator-<console port>`).
    pub fn serial(&self) -> Option<String> {
        self.console_port().map(|port| format!("emulator-{port}"))
    }

    fn port(&self, prop: &str) -> Option<u16> {
        self.get(prop)?.trim().parse().ok()
    }
}

impl PartialEq for EmulatorDescription {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for EmulatorDescription {}

impl Hash for EmulatorDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}
