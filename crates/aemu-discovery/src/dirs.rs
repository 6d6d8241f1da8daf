use std::path::PathBuf;

use crate::env::{Environment, Platform};

pub const ANDROID_SUBDIR: &str = ".android";

pub const ENV_EMULATOR_HOME: &str = "ANDROID_EMULATOR_HOME";
pub const ENV_SDK_HOME: &str = "ANDROID_SDK_HOME";
pub const ENV_AVD_HOME: &str = "ANDROID_AVD_HOME";
pub const ENV_HOME: &str = "HOME";
pub const ENV_LOCALAPPDATA: &str = "LOCALAPPDATA";
pub const ENV_XDG_RUNTIME_DIR: &str = "XDG_RUNTIME_DIR";

/// Every emulator writes its pid file into `<base>/avd/running`.
pub fn running_dir(base: impl Into<PathBuf>) -> PathBuf {
    base.into().join("avd").join("running")
}

/// Emulator user directories, in lookup order.
pub fn user_directories(env: &dyn Environment) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = env.var(ENV_EMULATOR_HOME) {
        paths.push(PathBuf::from(home));
    }
    if let Some(sdk_home) = env.var(ENV_SDK_HOME) {
        paths.push(PathBuf::from(sdk_home).join(ANDROID_SUBDIR));
    }
    if let Some(avd_home) = env.var(ENV_AVD_HOME) {
        paths.push(PathBuf::from(avd_home));
    }
    if let Some(home) = env.var(ENV_HOME) {
        paths.push(PathBuf::from(home).join(ANDROID_SUBDIR));
    }
    paths
}

/// Per-user temporary/runtime directory of the host, if one can be resolved.
pub fn platform_directory(env: &dyn Environment) -> Option<PathBuf> {
    match env.platform() {
        Platform::Windows => env
            .var(ENV_LOCALAPPDATA)
            .map(|local| PathBuf::from(local).join("Temp")),
        Platform::Linux => {
            if let Some(runtime) = env.var(ENV_XDG_RUNTIME_DIR) {
                let runtime = PathBuf::from(runtime);
                if env.path_exists(&runtime) {
                    return Some(runtime);
                }
            }
            env.uid()
                .map(|uid| PathBuf::from("/run/user").join(uid.to_string()))
        }
        Platform::MacOs => env.var(ENV_HOME).map(|home| {
            PathBuf::from(home)
                .join("Library")
                .join("Caches")
                .join("TemporaryItems")
        }),
        Platform::Other => None,
    }
}

/// Candidate discovery directories. Duplicates are kept.
pub fn discovery_directories(env: &dyn Environment) -> Vec<PathBuf> {
    user_directories(env)
        .into_iter()
        .chain(platform_directory(env))
        .map(running_dir)
        .collect()
}
