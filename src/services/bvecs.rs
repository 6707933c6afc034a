//! Gradient direction tables from Camino and FSL into `x,y,z` CSV.

use crate::error::XfmError;
use std::path::Path;

fn number(tok: &str, line: usize) -> Result<f64, XfmError> {
    tok.trim()
        .parse::<f64>()
        .map_err(|_| XfmError::parse(line, format!("not a number: {}", tok.trim())))
}

/// Camino layout: a count `n` on the first line, then `3n` values one per
/// line, x, y, z for each direction in turn.
pub fn parse_camino(text: &str) -> Result<Vec<[f64; 3]>, XfmError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let header = lines
        .first()
        .ok_or_else(|| XfmError::parse(1, "empty gradient file"))?;
    let count: usize = header
        .parse()
        .map_err(|_| XfmError::parse(1, format!("expected a direction count, got {header}")))?;
    let needed = count
        .checked_mul(3)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| XfmError::parse(1, format!("direction count out of range: {count}")))?;
    if lines.len() < needed {
        return Err(XfmError::parse(
            lines.len() + 1,
            format!("expected {} values, got {}", needed - 1, lines.len() - 1),
        ));
    }

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let base = 3 * i + 1;
        out.push([
            number(lines[base], base + 1)?,
            number(lines[base + 1], base + 2)?,
            number(lines[base + 2], base + 3)?,
        ]);
    }
    Ok(out)
}

/// FSL layout: three rows (x, y, z) with one column per direction.
pub fn parse_fsl(text: &str) -> Result<Vec<[f64; 3]>, XfmError> {
    let rows: Vec<(usize, Vec<&str>)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, toks)| !toks.is_empty())
        .collect();
    if rows.len() < 3 {
        return Err(XfmError::parse(
            rows.last().map(|(l, _)| l + 1).unwrap_or(1),
            format!("expected 3 rows, got {}", rows.len()),
        ));
    }

    let count = rows[0].1.len();
    for (line, toks) in rows.iter().take(3) {
        if toks.len() != count {
            return Err(XfmError::parse(
                *line,
                format!("expected {} columns, got {}", count, toks.len()),
            ));
        }
    }

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push([
            number(rows[0].1[i], rows[0].0)?,
            number(rows[1].1[i], rows[1].0)?,
            number(rows[2].1[i], rows[2].0)?,
        ]);
    }
    Ok(out)
}

pub fn write_csv(path: &Path, dirs: &[[f64; 3]]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for d in dirs {
        writer.write_record(d.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
