use crate::domain::constants::{APP_CONFIG_DIR, AUDIT_FILE_NAME, CONFIG_FILE_NAME};
use crate::domain::models::Config;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub fn audit(action: &str, data: serde_json::Value) {
    let path = match app_dir() {
        Ok(dir) => dir.join(AUDIT_FILE_NAME),
        Err(_) => return,
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": unix_secs(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    if let Err(e) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()))
    {
        tracing::debug!("audit log not written to {}: {}", path.display(), e);
    }
}

pub fn unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn file_digest(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

fn app_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(APP_CONFIG_DIR))
}

pub fn config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Loads the TOML config. A missing default file yields defaults; a missing
/// explicitly requested file is an error.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match config_path(explicit) {
        Ok(p) => p,
        Err(_) => return Ok(Config::default()),
    };
    if !path.exists() {
        if explicit.is_some() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{file_digest, load_config};

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[tools]\nfsl_bin = \"/opt/fsl/bin\"\n\n[workspace]\nkeep_failed = true\n",
        )
        .unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.tools.fsl_bin.as_deref(), Some("/opt/fsl/bin"));
        assert_eq!(cfg.tools.img2imgcoord, "img2imgcoord");
        assert_eq!(cfg.tools.flirt, "flirt");
        assert!(cfg.workspace.keep_failed);
        assert!(cfg.workspace.backup_existing);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[workspace]\nbackup_existing = \"sometimes\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn digest_is_sha256_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.xfm");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_digest(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
