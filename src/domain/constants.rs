/// Config and audit files live under `$HOME/<APP_CONFIG_DIR>`.
pub const APP_CONFIG_DIR: &str = ".config/qitxfm";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const AUDIT_FILE_NAME: &str = "audit.jsonl";

pub const PROBE_FILE_NAME: &str = "coords.txt";

pub const DEFAULT_IMG2IMGCOORD: &str = "img2imgcoord";
pub const DEFAULT_FLIRT: &str = "flirt";
pub const DEFAULT_FSLSPLIT: &str = "fslsplit";

pub const DEFAULT_FLIRT_COST: &str = "mutualinfo";
pub const DEFAULT_FLIRT_DOF: u32 = 6;

/// Prefix of the per-channel volumes written by `fslsplit`.
pub const CHANNEL_PREFIX: &str = "channel.";
