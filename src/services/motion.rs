//! Channel-to-channel motion estimation for multi-channel (DWI) volumes.
//!
//! Each channel is registered to its predecessor with FLIRT, the FSL matrix
//! is turned into a world-coordinate affine by probing `img2imgcoord`, and
//! rotation/translation magnitudes are tabulated.

use crate::affine::{Affine, RowLayout};
use crate::domain::constants::CHANNEL_PREFIX;
use crate::domain::models::{ChannelMotion, MotionRecord, StatRow, ToolsConfig};
use crate::error::XfmError;
use crate::probe::parse_mapped_points;
use crate::services::tools::{self, run_steps, Step, ToolRunner};
use crate::services::workspace::Workspace;
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct MotionOptions {
    pub cost: String,
    pub dof: u32,
}

#[derive(Debug)]
pub struct MotionTables {
    pub channels: usize,
    pub motion: Vec<ChannelMotion>,
    pub mean: Vec<StatRow>,
    pub max: Vec<StatRow>,
    pub sum: Vec<StatRow>,
}

#[derive(Default)]
struct OnlineStats {
    count: usize,
    sum: f64,
    max: Option<f64>,
}

impl OnlineStats {
    fn update(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

const FIELDS: [&str; 5] = ["angle", "tranm", "tranx", "trany", "tranz"];

fn fields(r: &MotionRecord) -> [f64; 5] {
    [r.angle, r.tranm, r.tranx, r.trany, r.tranz]
}

/// Summarizes per-channel records into mean, max and sum tables.
pub fn summarize(records: &[MotionRecord]) -> (Vec<StatRow>, Vec<StatRow>, Vec<StatRow>) {
    let mut stats: [OnlineStats; 5] = Default::default();
    for r in records {
        for (s, v) in stats.iter_mut().zip(fields(r)) {
            s.update(v);
        }
    }
    let table = |f: &dyn Fn(&OnlineStats) -> f64| -> Vec<StatRow> {
        FIELDS
            .iter()
            .zip(stats.iter())
            .map(|(name, s)| StatRow {
                name: name.to_string(),
                value: f(s),
            })
            .collect()
    };
    (
        table(&|s| s.mean()),
        table(&|s| s.max.unwrap_or(0.0)),
        table(&|s| s.sum),
    )
}

const CHANNEL_EXTENSIONS: [&str; 3] = [".nii", ".nii.gz", ".hdr"];

/// Volumes written by `fslsplit` for `prefix`, in channel order. Analyze and
/// NIfTI pairs are listed by their `.hdr` half.
pub fn list_channels(dir: &Path, prefix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| {
                    let n = n.to_string_lossy();
                    n.starts_with(prefix) && CHANNEL_EXTENSIONS.iter().any(|ext| n.ends_with(ext))
                })
                .unwrap_or(false)
        })
        .collect();
    out.sort();
    Ok(out)
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Runs the registration loop inside `ws`, leaving `xfm/channel.<i>.xfm`,
/// `all.csv`, `mean.csv`, `max.csv` and `sum.csv` behind.
pub fn estimate_motion(
    runner: &dyn ToolRunner,
    config: &ToolsConfig,
    probe: &Path,
    input: &Path,
    ws: &Workspace,
    opts: &MotionOptions,
) -> anyhow::Result<MotionTables> {
    let split_dir = ws.mkdir("split")?;
    let xfm_dir = ws.mkdir("xfm")?;

    run_steps(
        runner,
        &[Step::new(
            "splitting channels",
            tools::fslsplit(config, input, &split_dir.join(CHANNEL_PREFIX)),
        )],
    )?;

    let channels = list_channels(&split_dir, CHANNEL_PREFIX)?;
    if channels.len() < 2 {
        return Err(XfmError::Input(format!(
            "motion estimation needs at least 2 channels, found {} ({} files in {})",
            channels.len(),
            CHANNEL_EXTENSIONS.join("/"),
            split_dir.display()
        ))
        .into());
    }

    let mut motion = Vec::with_capacity(channels.len() - 1);
    let mut records = Vec::with_capacity(channels.len() - 1);
    for idx in 1..channels.len() {
        let invol = &channels[idx];
        let refvol = &channels[idx - 1];
        let fslxfm = split_dir.join(format!("channel.{idx}.fsl"));

        tracing::info!("registering channel {}", idx);
        runner.run(&tools::flirt(
            config, invol, refvol, &opts.cost, opts.dof, &fslxfm,
        ))?;

        let out = runner.capture(&tools::img2imgcoord(config, probe, invol, refvol, &fslxfm))?;
        let mat = Affine::from_probe_points(&parse_mapped_points(&out)?)?;
        mat.write(&xfm_dir.join(format!("channel.{idx}.xfm")), RowLayout::Compact)?;

        let r = mat
            .motion()
            .with_context(|| format!("estimating motion of channel {idx}"))?;
        motion.push(ChannelMotion {
            index: idx,
            angle: r.angle,
            tranm: r.tranm,
            tranx: r.tranx,
            trany: r.trany,
            tranz: r.tranz,
        });
        records.push(r);
    }

    let (mean, max, sum) = summarize(&records);
    write_csv(&ws.join("all.csv"), &motion)?;
    write_csv(&ws.join("mean.csv"), &mean)?;
    write_csv(&ws.join("max.csv"), &max)?;
    write_csv(&ws.join("sum.csv"), &sum)?;

    tracing::info!("cleaning up");
    std::fs::remove_dir_all(&split_dir)?;

    Ok(MotionTables {
        channels: channels.len(),
        motion,
        mean,
        max,
        sum,
    })
}

#[cfg(test)]
mod tests {
    use super::{estimate_motion, list_channels, summarize, MotionOptions};
    use crate::domain::models::{MotionRecord, ToolsConfig};
    use crate::error::XfmError;
    use crate::services::tools::testing::ScriptedRunner;
    use crate::services::workspace::Workspace;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn rec(angle: f64, tx: f64) -> MotionRecord {
        MotionRecord {
            angle,
            tranm: tx,
            tranx: tx,
            trany: 0.0,
            tranz: 0.0,
        }
    }

    #[test]
    fn summary_tables() {
        let (mean, max, sum) = summarize(&[rec(1.0, 2.0), rec(3.0, 0.5)]);
        assert_eq!(mean[0].name, "angle");
        assert_relative_eq!(mean[0].value, 2.0);
        assert_relative_eq!(max[1].value, 2.0);
        assert_relative_eq!(sum[2].value, 2.5);
        assert_eq!(sum.len(), 5);
    }

    #[test]
    fn channels_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["channel.0002.nii.gz", "channel.0000.nii.gz", "channel.0001.nii", "notes.txt"] {
            std::fs::write(dir.path().join(n), "").unwrap();
        }
        let names: Vec<String> = list_channels(dir.path(), "channel.")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["channel.0000.nii.gz", "channel.0001.nii", "channel.0002.nii.gz"]
        );
    }

    #[test]
    fn nifti_pairs_are_listed_by_header() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["channel.0001.img", "channel.0001.hdr", "channel.0000.hdr", "channel.0000.img"] {
            std::fs::write(dir.path().join(n), "").unwrap();
        }
        let names: Vec<String> = list_channels(dir.path(), "channel.")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["channel.0000.hdr", "channel.0001.hdr"]);
    }

    const SHIFT_X: &str = "Coordinates in Destination volume (in mm)\n\
                           2 0 0\n3 0 0\n2 1 0\n2 0 1\n";

    /// fslsplit writes `channels` volumes; every registration shifts by 2mm in x.
    fn scripted(channels: usize) -> ScriptedRunner {
        scripted_with(channels, SHIFT_X)
    }

    fn scripted_with(channels: usize, mapped: &'static str) -> ScriptedRunner {
        ScriptedRunner::new(move |call| {
            match call.program.as_str() {
                "fslsplit" => {
                    let base = PathBuf::from(&call.args[1]);
                    for i in 0..channels {
                        let mut name = base.as_os_str().to_owned();
                        name.push(format!("{i:04}.nii.gz"));
                        std::fs::write(PathBuf::from(name), "").unwrap();
                    }
                    Ok(String::new())
                }
                "flirt" => Ok(String::new()),
                "img2imgcoord" => Ok(mapped.to_string()),
                other => panic!("unexpected program {other}"),
            }
        })
    }

    #[test]
    fn registers_each_channel_to_its_predecessor() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("dwi.nii.gz");
        std::fs::write(&input, "").unwrap();
        let probe = root.path().join("coords.txt");
        let ws = Workspace::create(&root.path().join("motion")).unwrap();
        let runner = scripted(3);
        let opts = MotionOptions {
            cost: "mutualinfo".to_string(),
            dof: 6,
        };

        let tables =
            estimate_motion(&runner, &ToolsConfig::default(), &probe, &input, &ws, &opts).unwrap();

        assert_eq!(tables.channels, 3);
        assert_eq!(tables.motion.len(), 2);
        assert_eq!(tables.motion[0].index, 1);
        assert_relative_eq!(tables.motion[1].tranx, 2.0);
        assert_relative_eq!(tables.motion[1].angle, 0.0, epsilon = 1e-6);
        assert_relative_eq!(tables.sum[1].value, 4.0);
        assert_eq!(
            runner.programs(),
            vec!["fslsplit", "flirt", "img2imgcoord", "flirt", "img2imgcoord"]
        );

        let flirt = &runner.calls.borrow()[3];
        let joined = flirt.args.join(" ");
        assert!(joined.contains("channel.0002.nii.gz"));
        assert!(joined.contains("-ref"));

        assert!(ws.join("xfm/channel.2.xfm").exists());
        assert!(!ws.join("split").exists());
        let all = std::fs::read_to_string(ws.join("all.csv")).unwrap();
        assert!(all.starts_with("index,angle,tranm,tranx,trany,tranz\n"));
        assert_eq!(all.lines().count(), 3);
        let mean = std::fs::read_to_string(ws.join("mean.csv")).unwrap();
        assert!(mean.starts_with("name,value\nangle,"));
    }

    #[test]
    fn single_channel_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("dwi.nii.gz");
        let ws = Workspace::create(&root.path().join("motion")).unwrap();
        let runner = scripted(1);
        let opts = MotionOptions {
            cost: "mutualinfo".to_string(),
            dof: 6,
        };
        let err = estimate_motion(
            &runner,
            &ToolsConfig::default(),
            &root.path().join("coords.txt"),
            &input,
            &ws,
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<XfmError>(), Some(XfmError::Input(_))));
    }

    #[test]
    fn mirrored_channel_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("dwi.nii.gz");
        let ws = Workspace::create(&root.path().join("motion")).unwrap();
        // x axis flipped
        let runner = scripted_with(
            2,
            "Coordinates in Destination volume (in mm)\n0 0 0\n-1 0 0\n0 1 0\n0 0 1\n",
        );
        let opts = MotionOptions {
            cost: "mutualinfo".to_string(),
            dof: 6,
        };
        let err = estimate_motion(
            &runner,
            &ToolsConfig::default(),
            &root.path().join("coords.txt"),
            &input,
            &ws,
            &opts,
        )
        .unwrap_err();
        assert!(err.to_string().contains("channel 1"));
        assert!(matches!(err.downcast_ref::<XfmError>(), Some(XfmError::Input(_))));
    }
}
