//! World-coordinate affine transforms recovered from probe point images.
//!
//! An external registration tool is interrogated with the origin and the
//! three unit-axis offsets; the mapped positions give the translation
//! (image of the origin) and the columns of the linear part (mapped unit
//! displacements). The reconstruction is exact for affine mappings.

use crate::domain::models::MotionRecord;
use crate::error::XfmError;
use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};
use std::path::Path;

/// Number of rows written to a matrix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// All four rows, including the `0 0 0 1` row.
    Full,
    /// Only the three rows carrying the linear part and translation.
    Compact,
}

impl RowLayout {
    pub fn from_rows(rows: u8) -> Self {
        if rows == 3 {
            RowLayout::Compact
        } else {
            RowLayout::Full
        }
    }

    pub fn rows(self) -> usize {
        match self {
            RowLayout::Full => 4,
            RowLayout::Compact => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    m: Matrix4<f64>,
}

impl Affine {
    pub fn from_parts(linear: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut m = Matrix4::identity();
        for r in 0..3 {
            for c in 0..3 {
                m[(r, c)] = linear[(r, c)];
            }
            m[(r, 3)] = translation[r];
        }
        Self { m }
    }

    /// Rebuilds the transform from the images of the origin and the x, y, z
    /// unit offsets, in that order. Points past the fourth are ignored.
    pub fn from_probe_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self, XfmError> {
        if points.len() < 4 {
            return Err(XfmError::Input(format!(
                "expected 4 probe points, got {}",
                points.len()
            )));
        }

        let mut mapped = [Vector3::zeros(); 4];
        for (i, p) in points.iter().take(4).enumerate() {
            let coords = p.as_ref();
            if coords.len() != 3 {
                return Err(XfmError::Input(format!(
                    "probe point {} has {} coordinates, expected 3",
                    i,
                    coords.len()
                )));
            }
            mapped[i] = Vector3::new(coords[0], coords[1], coords[2]);
        }

        let origin = mapped[0];
        let linear = Matrix3::from_columns(&[
            mapped[1] - origin,
            mapped[2] - origin,
            mapped[3] - origin,
        ]);
        Ok(Self::from_parts(&linear, &origin))
    }

    #[cfg(test)]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    pub fn linear(&self) -> Matrix3<f64> {
        self.m.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.m.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn apply(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self.linear() * Vector3::from(point) + self.translation();
        [p.x, p.y, p.z]
    }

    pub fn rows(&self) -> [[f64; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.m[(r, c)];
            }
        }
        out
    }

    pub fn to_text(&self, layout: RowLayout) -> String {
        let mut out = String::new();
        for row in self.rows().iter().take(layout.rows()) {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }

    /// Parses three or four rows of four numbers. A fourth row, when present,
    /// must be the homogeneous `0 0 0 1`.
    pub fn parse_text(text: &str) -> Result<Self, XfmError> {
        let mut rows: Vec<[f64; 4]> = Vec::new();
        let mut last_line = 0;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if rows.len() == 4 {
                return Err(XfmError::parse(line_no, "more than 4 matrix rows"));
            }
            let values = trimmed
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>()
                        .map_err(|_| XfmError::parse(line_no, format!("not a number: {tok}")))
                })
                .collect::<Result<Vec<f64>, XfmError>>()?;
            let row: [f64; 4] = values.as_slice().try_into().map_err(|_| {
                XfmError::parse(line_no, format!("expected 4 values, got {}", values.len()))
            })?;
            rows.push(row);
            last_line = line_no;
        }

        if rows.len() < 3 {
            return Err(XfmError::parse(
                last_line + 1,
                format!("expected 3 or 4 matrix rows, got {}", rows.len()),
            ));
        }
        if let Some(bottom) = rows.get(3) {
            if *bottom != [0.0, 0.0, 0.0, 1.0] {
                return Err(XfmError::parse(last_line, "bottom row must be 0 0 0 1"));
            }
        }

        let mut m = Matrix4::identity();
        for (r, row) in rows.iter().take(3).enumerate() {
            for (c, v) in row.iter().enumerate() {
                m[(r, c)] = *v;
            }
        }
        Ok(Self { m })
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(XfmError::MissingInput(path.to_path_buf()).into());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::parse_text(&raw)?)
    }

    pub fn write(&self, path: &Path, layout: RowLayout) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_text(layout))?;
        Ok(())
    }

    /// Rigid motion magnitudes: rotation angle of the nearest proper rotation
    /// (degrees) and translation size. Reflections and collapsed linear parts
    /// have no such rotation and are rejected.
    pub fn motion(&self) -> Result<MotionRecord, XfmError> {
        let linear = self.linear();
        let det = linear.determinant();
        if !det.is_finite() || det <= 0.0 {
            return Err(XfmError::Input(format!(
                "linear part is not orientation preserving (determinant {det})"
            )));
        }
        let svd = linear.svd(true, true);
        let (u, v_t) = match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => (u, v_t),
            _ => return Err(XfmError::Input("could not decompose linear part".to_string())),
        };
        let rotation = Rotation3::from_matrix_unchecked(u * v_t);
        let t = self.translation();
        Ok(MotionRecord {
            angle: rotation.angle().to_degrees().abs(),
            tranm: t.norm(),
            tranx: t.x.abs(),
            trany: t.y.abs(),
            tranz: t.z.abs(),
        })
    }
}
