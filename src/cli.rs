use crate::domain::constants::{DEFAULT_FLIRT_COST, DEFAULT_FLIRT_DOF};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "qitxfm",
    version,
    about = "Coordinate-transform bookkeeping for FSL and friends"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Config file (default $HOME/.config/qitxfm/config.toml)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an FSL FLIRT matrix into a world-coordinate affine.
    XfmFsl {
        src: PathBuf,
        dest: PathBuf,
        xfm: PathBuf,
        out: PathBuf,
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(3..=4))]
        rows: u8,
    },
    /// Derive an affine from captured img2imgcoord output.
    XfmPoints {
        points: PathBuf,
        out: PathBuf,
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(3..=4))]
        rows: u8,
    },
    /// Map a point through a matrix file.
    XfmApply {
        matrix: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Estimate channel-to-channel motion in a multi-channel volume.
    Motion {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_FLIRT_COST)]
        cost: String,
        #[arg(long, default_value_t = DEFAULT_FLIRT_DOF)]
        dof: u32,
    },
    /// Convert a gradient direction table to x,y,z CSV.
    Bvecs {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        format: BvecsFormat,
    },
    /// Print the probe coordinates handed to img2imgcoord.
    Probe,
    /// Check that the configured external tools can be found.
    Doctor,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BvecsFormat {
    Camino,
    Fsl,
}
