//! Integration tests for the deskutil binaries.
//!
//! Each test runs a compiled binary against a temporary data home and checks
//! its exit status and filesystem effects.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Create a temporary environment with an empty bin dir for PATH.
struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn data_home(&self) -> PathBuf {
        self.path().join("data")
    }

    fn registry(&self) -> PathBuf {
        self.data_home().join("firefoxpwa").join("config.json")
    }

    /// Put a stub launcher binary on PATH.
    fn install_launcher_stub(&self) {
        use std::os::unix::fs::PermissionsExt;

        let stub = self.path().join("bin").join("firefoxpwa");
        fs::write(&stub, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn template(&self) -> PathBuf {
        let template = self.path().join("template");
        fs::create_dir_all(&template).unwrap();
        fs::write(template.join("prefs.js"), "").unwrap();
        template
    }

    fn run(&self, binary: &str, args: &[&str]) -> Output {
        Command::new(binary)
            .args(args)
            .env("XDG_DATA_HOME", self.data_home())
            .env("PATH", self.path().join("bin"))
            .env("HOME", self.path())
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn {}: {}", binary, e))
    }
}

fn read_registry(env: &TestEnv) -> Value {
    serde_json::from_str(&fs::read_to_string(env.registry()).unwrap()).unwrap()
}

const PWAMAKER: &str = env!("CARGO_BIN_EXE_pwamaker");
const DELWA: &str = env!("CARGO_BIN_EXE_delwa");
const ZEROPLAY: &str = env!("CARGO_BIN_EXE_zeroplay-manager");
const REFIND: &str = env!("CARGO_BIN_EXE_refind-entries");

#[test]
fn test_pwamaker_requires_launcher() {
    let env = TestEnv::new();
    let output = env.run(PWAMAKER, &["--name", "Example", "--url", "http://example.com"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!env.registry().exists());
}

#[test]
fn test_deploy_update_and_delete() {
    let env = TestEnv::new();
    env.install_launcher_stub();
    let template = env.template();
    let template = template.to_str().unwrap();

    let deploy = |url: &str| {
        env.run(
            PWAMAKER,
            &[
                "--name",
                "Example",
                "--url",
                url,
                "--template",
                template,
                "--no-resolve",
            ],
        )
    };

    assert!(deploy("http://example.com").status.success());
    let first = read_registry(&env);
    let sites = first["sites"].as_object().unwrap();
    assert_eq!(sites.len(), 1);
    let site_id = sites.keys().next().unwrap().clone();

    assert!(deploy("http://example.org").status.success());
    let second = read_registry(&env);
    assert_eq!(second["sites"].as_object().unwrap().len(), 1);
    assert_eq!(
        second["sites"][&site_id]["manifest"]["start_url"],
        "http://example.org"
    );

    let entry = env
        .data_home()
        .join("applications")
        .join("example-fpwa.desktop");
    assert!(entry.is_file());

    let output = env.run(DELWA, &["Example"]);
    assert!(output.status.success());
    assert!(!entry.exists());
    assert!(read_registry(&env)["sites"].as_object().unwrap().is_empty());
}

#[test]
fn test_delwa_unknown_name_exits_nonzero() {
    let env = TestEnv::new();
    let registry = env.registry();
    fs::create_dir_all(registry.parent().unwrap()).unwrap();
    fs::write(&registry, "{\"profiles\":{},\"sites\":{}}").unwrap();

    let output = env.run(DELWA, &["Nothing"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        fs::read_to_string(&registry).unwrap(),
        "{\"profiles\":{},\"sites\":{}}"
    );
}

#[test]
fn test_zeroplay_scan() {
    let env = TestEnv::new();
    let game = env.path().join("Games").join("GC").join("Melee");
    fs::create_dir_all(&game).unwrap();
    fs::write(game.join("melee.iso"), b"iso").unwrap();

    let library = env.path().join("Games");
    let output = env.run(ZEROPLAY, &["scan", library.to_str().unwrap()]);
    assert!(output.status.success());

    let config: Value =
        serde_json::from_str(&fs::read_to_string(game.join("config.json")).unwrap()).unwrap();
    assert_eq!(config["meta_game_title"], "Melee");
    assert_eq!(config["meta_platform"], "GC");
    assert!(game.join("Saves").is_dir());
}

#[test]
fn test_zeroplay_scan_missing_library() {
    let env = TestEnv::new();
    let output = env.run(ZEROPLAY, &["scan"]);
    assert!(output.status.success());
}

#[test]
fn test_refind_entries_without_generations() {
    let env = TestEnv::new();
    let profiles = env.path().join("profiles");
    let esp = env.path().join("boot");
    let output = env.run(
        REFIND,
        &[
            "--profile-dir",
            profiles.to_str().unwrap(),
            "--esp",
            esp.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(!esp.join("EFI/refind/zenos-entries.conf").exists());
}
