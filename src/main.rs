use clap::Parser;

mod affine;
mod cli;
mod commands;
mod domain;
mod error;
mod probe;
mod services;

pub use affine::{Affine, RowLayout};
pub use cli::{BvecsFormat, Cli, Commands};
pub use commands::{handle_admin_commands, handle_convert_commands, handle_pipeline_commands};
pub use domain::models::{ApplyReport, BvecsReport, Config, MotionReport, XfmReport};
pub use probe::{parse_mapped_points, resolve_probe_file, PROBE_POINTS};
pub use services::bvecs::{parse_camino, parse_fsl, write_csv as write_bvecs_csv};
pub use services::doctor::doctor;
pub use services::motion::{estimate_motion, MotionOptions};
pub use services::output::{print_report, print_rows};
pub use services::storage::{audit, config_path, file_digest, load_config};
pub use services::tools::{img2imgcoord, SystemRunner, ToolRunner};
pub use services::workspace::{require_inputs, Workspace};
pub use std::path::Path;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    if handle_convert_commands(&cli, &config)? {
        return Ok(());
    }
    if handle_pipeline_commands(&cli, &config)? {
        return Ok(());
    }
    handle_admin_commands(&cli, &config)?;

    Ok(())
}
