#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Probe output for a pure translation by (3, 4, 0).
pub const MAPPED_POINTS: &str = "Coordinates in Destination volume (in mm)\n\
3 4 0\n\
4 4 0\n\
3 5 0\n\
3 4 1\n";

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub bin: PathBuf,
    pub data: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let data = tmp.path().join("data");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&data).expect("create data dir");

        let bin = make_fake_fsl(tmp.path());
        let cfg_dir = home.join(".config/qitxfm");
        fs::create_dir_all(&cfg_dir).expect("create config dir");
        fs::write(
            cfg_dir.join("config.toml"),
            format!("[tools]\nfsl_bin = {:?}\n", bin.to_str().expect("bin path utf8")),
        )
        .expect("write config");

        Self {
            _tmp: tmp,
            home,
            bin,
            data,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("qitxfm");
        cmd.env("HOME", &self.home).env("RUST_LOG", "warn");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Creates an empty file under the data dir and returns its path as a string.
    pub fn touch(&self, name: &str) -> String {
        let p = self.data.join(name);
        fs::write(&p, "").expect("touch input");
        p.to_str().expect("data path utf8").to_string()
    }

    pub fn data_path(&self, name: &str) -> String {
        self.data.join(name).to_str().expect("data path utf8").to_string()
    }

    pub fn audit_lines(&self) -> Vec<Value> {
        let raw = fs::read_to_string(self.home.join(".config/qitxfm/audit.jsonl"))
            .unwrap_or_default();
        raw.lines()
            .map(|l| serde_json::from_str(l).expect("audit line is json"))
            .collect()
    }
}

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
}

fn make_fake_fsl(base: &Path) -> PathBuf {
    let bin = base.join("fsl/bin");
    fs::create_dir_all(&bin).expect("create fake fsl bin");

    write_script(&bin, "img2imgcoord", &format!("cat <<'OUT'\n{MAPPED_POINTS}OUT\n"));
    write_script(
        &bin,
        "fslsplit",
        "touch \"${2}0000.nii.gz\" \"${2}0001.nii.gz\" \"${2}0002.nii.gz\"\n",
    );
    write_script(
        &bin,
        "flirt",
        "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-omat\" ]; then printf '1 0 0 0\\n' > \"$2\"; fi\n  shift\ndone\n",
    );
    bin
}
