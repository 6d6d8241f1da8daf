mod config;

use std::path::{Path, PathBuf};

use aemu_discovery::{
    discovery_directories, EmulatorDescription, EmulatorDiscovery, ProcessEnvironment,
};
use clap::{ArgAction, Parser, Subcommand};
use config::CliConfig;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "aemu-cli", version, about = "Find running Android emulators")]
struct Cli {
    /// Additional directory to scan for pid files (repeatable)
    #[arg(long = "dir", global = true)]
    dirs: Vec<PathBuf>,
    /// Print JSON instead of tab-separated text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show the directories that are scanned
    Dirs,
    /// List every discovered emulator
    List,
    /// Find an emulator whose property equals a value
    Find { prop: String, value: String },
    /// Find an emulator by process id
    Pid { pid: u32 },
    /// Print one discovered emulator, failing if none runs
    First,
    /// Write all discovered emulators to a JSON file
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Inspect or change the stored CLI configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the effective configuration
    Show,
    /// Scan an additional directory on every run
    AddDir { path: String },
    /// Stop scanning a previously added directory
    RemoveDir { path: String },
    /// Default to JSON output
    SetJson {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Serialize)]
struct DirectoryStatus {
    path: String,
    exists: bool,
}

#[derive(Serialize)]
struct ExportFile<'a> {
    exported_at_unix_millis: i64,
    directories: Vec<String>,
    emulators: Vec<&'a EmulatorDescription>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    aemu_util::init_tracing()?;
    let cli = Cli::parse();
    let mut cfg = CliConfig::load();
    let json = cli.json || cfg.json;

    match cli.cmd {
        Cmd::Config { cmd } => match cmd {
            ConfigCmd::Show => {
                println!("path={}", config::cli_config_path().display());
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
            ConfigCmd::AddDir { path } => {
                if cfg.add_dir(&path) {
                    cfg.save()?;
                }
                println!("extra_dirs={}", cfg.extra_dirs.join(","));
            }
            ConfigCmd::RemoveDir { path } => {
                if cfg.remove_dir(&path) {
                    cfg.save()?;
                }
                println!("extra_dirs={}", cfg.extra_dirs.join(","));
            }
            ConfigCmd::SetJson { enabled } => {
                cfg.json = enabled;
                cfg.save()?;
                println!("json={enabled}");
            }
        },

        Cmd::Dirs => {
            let statuses: Vec<DirectoryStatus> = scan_directories(&cfg, &cli.dirs)
                .iter()
                .map(|path| DirectoryStatus {
                    path: path.display().to_string(),
                    exists: path.is_dir(),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                for status in statuses {
                    let state = if status.exists { "exists" } else { "missing" };
                    println!("{}\t{}", status.path, state);
                }
            }
        }

        Cmd::List => {
            let discovery = discover(&cfg, &cli.dirs)?;
            print_emulators(&sorted_emulators(&discovery), json)?;
        }

        Cmd::Find { prop, value } => {
            let discovery = discover(&cfg, &cli.dirs)?;
            match discovery.find_emulator(&prop, &value) {
                Some(emu) => print_emulators(&[emu], json)?,
                None => return Err(format!("no emulator with {prop}={value}").into()),
            }
        }

        Cmd::Pid { pid } => {
            let discovery = discover(&cfg, &cli.dirs)?;
            match discovery.find_by_pid(pid) {
                Some(emu) => print_emulators(&[emu], json)?,
                None => return Err(format!("no emulator with pid {pid}").into()),
            }
        }

        Cmd::First => {
            let discovery = discover(&cfg, &cli.dirs)?;
            print_emulators(&[discovery.first()?], json)?;
        }

        Cmd::Export { out } => {
            let discovery = discover(&cfg, &cli.dirs)?;
            let path = out.unwrap_or_else(|| aemu_util::default_export_path("emulators"));
            write_export(&path, &discovery)?;
            println!("exported={}", path.display());
        }
    }

    Ok(())
}

fn scan_directories(cfg: &CliConfig, extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = discovery_directories(&ProcessEnvironment);
    dirs.extend(cfg.extra_dir_paths());
    dirs.extend(extra.iter().cloned());
    dirs
}

fn discover(
    cfg: &CliConfig,
    extra: &[PathBuf],
) -> Result<EmulatorDiscovery, Box<dyn std::error::Error>> {
    let discovery = EmulatorDiscovery::with_directories(scan_directories(cfg, extra))?;
    info!(
        "Found {} emulator(s) in {} director(ies)",
        discovery.available(),
        discovery.directories().len()
    );
    Ok(discovery)
}

/// Pids are numeric, so order by value rather than by string.
fn sorted_emulators(discovery: &EmulatorDiscovery) -> Vec<&EmulatorDescription> {
    let mut emulators: Vec<&EmulatorDescription> = discovery.emulators().iter().collect();
    emulators.sort_by_key(|emu| {
        (
            emu.pid().parse::<u64>().unwrap_or(u64::MAX),
            emu.pid().to_string(),
        )
    });
    emulators
}

fn emulator_line(emu: &EmulatorDescription) -> String {
    let grpc = emu
        .grpc_port()
        .map(|port| port.to_string())
        .unwrap_or_else(|| "-".into());
    format!(
        "{}\t{}\t{}\tgrpc={}",
        emu.pid(),
        emu.name().unwrap_or("-"),
        emu.serial().unwrap_or_else(|| "-".into()),
        grpc
    )
}

fn print_emulators(
    emulators: &[&EmulatorDescription],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(emulators)?);
    } else {
        for emu in emulators {
            println!("{}", emulator_line(emu));
        }
    }
    Ok(())
}

fn write_export(path: &Path, discovery: &EmulatorDiscovery) -> std::io::Result<()> {
    let export = ExportFile {
        exported_at_unix_millis: aemu_util::now_millis(),
        directories: discovery
            .directories()
            .iter()
            .map(|dir| dir.display().to_string())
            .collect(),
        emulators: sorted_emulators(discovery),
    };
    aemu_util::write_json_atomic(path, &export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn discovery_with(files: &[(&str, &str)]) -> (tempfile::TempDir, EmulatorDiscovery) {
        let dir = tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        let discovery =
            EmulatorDiscovery::with_directories(vec![dir.path().to_path_buf()]).unwrap();
        (dir, discovery)
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aemu-cli", "list", "--json", "--dir", "/a", "--dir", "/b",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(matches!(cli.cmd, Cmd::List));
    }

    #[test]
    fn parses_find_and_set_json() {
        let cli = Cli::try_parse_from(["aemu-cli", "find", "avd.name", "Pixel_7"]).unwrap();
        match cli.cmd {
            Cmd::Find { prop, value } => {
                assert_eq!(prop, "avd.name");
                assert_eq!(value, "Pixel_7");
            }
            _ => panic!("expected find"),
        }

        let cli = Cli::try_parse_from(["aemu-cli", "config", "set-json", "false"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Cmd::Config {
                cmd: ConfigCmd::SetJson { enabled: false }
            }
        ));
        assert!(Cli::try_parse_from(["aemu-cli", "pid", "abc"]).is_err());
    }

    #[test]
    fn emulators_sort_numerically() {
        let (_dir, discovery) = discovery_with(&[
            ("pid_100.ini", "a=1\n"),
            ("pid_20.ini", "a=1\n"),
            ("pid_3.ini", "a=1\n"),
        ]);
        let pids: Vec<&str> = sorted_emulators(&discovery)
            .into_iter()
            .map(EmulatorDescription::pid)
            .collect();
        assert_eq!(pids, vec!["3", "20", "100"]);
    }

    #[test]
    fn line_shows_known_fields_or_dashes() {
        let (_dir, discovery) = discovery_with(&[(
            "pid_42.ini",
            "avd.name=Pixel_7\nport.serial=5554\ngrpc.port=8554\n",
        )]);
        let emu = discovery.find_by_pid(42).unwrap();
        assert_eq!(emulator_line(emu), "42\tPixel_7\temulator-5554\tgrpc=8554");

        let (_dir, discovery) = discovery_with(&[("pid_7.ini", "foo=bar\n")]);
        let emu = discovery.find_by_pid(7).unwrap();
        assert_eq!(emulator_line(emu), "7\t-\t-\tgrpc=-");
    }

    #[test]
    fn export_writes_all_emulators() {
        let (dir, discovery) = discovery_with(&[
            ("pid_1.ini", "avd.name=one\n"),
            ("pid_2.ini", "avd.name=two\n"),
        ]);
        let out = dir.path().join("export/emulators.json");
        write_export(&out, &discovery).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let emulators = value["emulators"].as_array().unwrap();
        assert_eq!(emulators.len(), 2);
        assert_eq!(emulators[0]["pid"], "1");
        assert_eq!(emulators[1]["properties"]["avd.name"], "two");
        assert_eq!(value["directories"].as_array().unwrap().len(), 1);
    }
}
