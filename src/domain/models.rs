use crate::domain::constants::{DEFAULT_FLIRT, DEFAULT_FSLSPLIT, DEFAULT_IMG2IMGCOORD};
use serde::{Deserialize, Serialize};

fn default_img2imgcoord() -> String {
    DEFAULT_IMG2IMGCOORD.to_string()
}

fn default_flirt() -> String {
    DEFAULT_FLIRT.to_string()
}

fn default_fslsplit() -> String {
    DEFAULT_FSLSPLIT.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ToolsConfig {
    /// Directory holding the FSL programs; `PATH` is searched when unset.
    #[serde(default)]
    pub fsl_bin: Option<String>,
    #[serde(default = "default_img2imgcoord")]
    pub img2imgcoord: String,
    #[serde(default = "default_flirt")]
    pub flirt: String,
    #[serde(default = "default_fslsplit")]
    pub fslsplit: String,
    /// Existing probe coordinates file; generated per run when unset.
    #[serde(default)]
    pub probe_coords: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            fsl_bin: None,
            img2imgcoord: default_img2imgcoord(),
            flirt: default_flirt(),
            fslsplit: default_fslsplit(),
            probe_coords: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_true")]
    pub backup_existing: bool,
    #[serde(default)]
    pub keep_failed: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            backup_existing: true,
            keep_failed: false,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct MotionRecord {
    pub angle: f64,
    pub tranm: f64,
    pub tranx: f64,
    pub trany: f64,
    pub tranz: f64,
}

/// One row of `all.csv`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChannelMotion {
    pub index: usize,
    pub angle: f64,
    pub tranm: f64,
    pub tranx: f64,
    pub trany: f64,
    pub tranz: f64,
}

/// One row of the `mean.csv`, `max.csv` and `sum.csv` summaries.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatRow {
    pub name: String,
    pub value: f64,
}

#[derive(Serialize)]
pub struct MotionReport {
    pub output: String,
    pub channels: usize,
    pub motion: Vec<ChannelMotion>,
    pub mean: Vec<StatRow>,
    pub max: Vec<StatRow>,
    pub sum: Vec<StatRow>,
    pub backup: Option<String>,
}

#[derive(Serialize)]
pub struct XfmReport {
    pub output: String,
    pub rows: usize,
    pub matrix: [[f64; 4]; 4],
    pub sha256: String,
}

#[derive(Serialize)]
pub struct ApplyReport {
    pub input: [f64; 3],
    pub output: [f64; 3],
}

#[derive(Serialize)]
pub struct BvecsReport {
    pub output: String,
    pub format: String,
    pub directions: usize,
}

#[derive(Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct DoctorReport {
    pub overall: String,
    pub checks: Vec<CheckItem>,
}
