use crate::domain::models::{CheckItem, Config, DoctorReport};
use crate::services::tools::resolve_program;
use std::path::{Path, PathBuf};

fn tool_check(bin_dir: Option<&Path>, name: &str, program: &str) -> CheckItem {
    CheckItem {
        name: name.to_string(),
        status: if resolve_program(bin_dir, program).is_some() {
            "ok"
        } else {
            "missing"
        }
        .to_string(),
    }
}

pub fn doctor(config: &Config, config_path: Option<&Path>) -> DoctorReport {
    let tools = &config.tools;
    let bin_dir = tools.fsl_bin.as_deref().map(Path::new);

    let mut checks = vec![
        CheckItem {
            name: "config_file".to_string(),
            status: match config_path {
                Some(p) if p.exists() => "ok",
                _ => "default",
            }
            .to_string(),
        },
        CheckItem {
            name: "fsl_bin".to_string(),
            status: match bin_dir {
                Some(d) if d.is_dir() => "ok",
                Some(_) => "missing",
                None => "not_provided",
            }
            .to_string(),
        },
        CheckItem {
            name: "probe_coords".to_string(),
            status: match &tools.probe_coords {
                Some(p) if PathBuf::from(p).is_file() => "ok",
                Some(_) => "missing",
                None => "generated",
            }
            .to_string(),
        },
    ];
    checks.push(tool_check(bin_dir, "img2imgcoord", &tools.img2imgcoord));
    checks.push(tool_check(bin_dir, "flirt", &tools.flirt));
    checks.push(tool_check(bin_dir, "fslsplit", &tools.fslsplit));

    let overall = if checks
        .iter()
        .all(|c| matches!(c.status.as_str(), "ok" | "default" | "not_provided" | "generated"))
    {
        "ok"
    } else {
        "needs_attention"
    }
    .to_string();

    DoctorReport { overall, checks }
}
