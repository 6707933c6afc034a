//! Probe points handed to `img2imgcoord` and parsing of what comes back.

use crate::domain::constants::PROBE_FILE_NAME;
use crate::domain::models::ToolsConfig;
use crate::error::XfmError;
use crate::services::workspace::require_inputs;
use std::path::{Path, PathBuf};

/// Origin followed by the x, y and z unit offsets.
pub const PROBE_POINTS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub fn probe_text() -> String {
    PROBE_POINTS
        .iter()
        .map(|p| format!("{} {} {}\n", p[0], p[1], p[2]))
        .collect()
}

pub fn write_probe_file(dir: &Path) -> anyhow::Result<PathBuf> {
    let path = dir.join(PROBE_FILE_NAME);
    std::fs::write(&path, probe_text())?;
    Ok(path)
}

/// The configured probe file if there is one, else a fresh one in `dir`.
pub fn resolve_probe_file(config: &ToolsConfig, dir: &Path) -> anyhow::Result<PathBuf> {
    match &config.probe_coords {
        Some(p) => {
            let path = PathBuf::from(p);
            require_inputs(&[path.as_path()])?;
            Ok(path)
        }
        None => write_probe_file(dir),
    }
}

/// Reads the mapped probe points from tool output: one header line followed
/// by four lines of three coordinates. Anything after the fourth point is
/// ignored.
pub fn parse_mapped_points(stdout: &str) -> Result<Vec<[f64; 3]>, XfmError> {
    let lines: Vec<&str> = stdout.lines().collect();
    if lines.len() < 1 + PROBE_POINTS.len() {
        return Err(XfmError::parse(
            lines.len() + 1,
            format!(
                "expected a header and {} coordinate lines, got {} lines",
                PROBE_POINTS.len(),
                lines.len()
            ),
        ));
    }

    let mut points = Vec::with_capacity(PROBE_POINTS.len());
    for (idx, line) in lines.iter().enumerate().skip(1).take(PROBE_POINTS.len()) {
        let line_no = idx + 1;
        let values = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| XfmError::parse(line_no, format!("not a coordinate: {tok}")))
            })
            .collect::<Result<Vec<f64>, XfmError>>()?;
        let point: [f64; 3] = values.as_slice().try_into().map_err(|_| {
            XfmError::parse(
                line_no,
                format!("expected 3 coordinates, got {}", values.len()),
            )
        })?;
        points.push(point);
    }
    Ok(points)
}
