use crate::*;

pub fn handle_pipeline_commands(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let Commands::Motion {
        input,
        output,
        cost,
        dof,
    } = &cli.command
    else {
        return Ok(false);
    };

    require_inputs(&[input.as_path()])?;
    tracing::info!("started");

    let mut ws = Workspace::create(output)?;
    if config.workspace.keep_failed {
        ws.keep();
    }
    let probe = resolve_probe_file(&config.tools, &ws.mkdir("split")?)?;
    let runner = SystemRunner::new(&config.tools);
    let opts = MotionOptions {
        cost: cost.clone(),
        dof: *dof,
    };
    let tables = estimate_motion(&runner, &config.tools, &probe, input, &ws, &opts)?;
    let backup = ws.finalize(config.workspace.backup_existing)?;

    audit(
        "motion",
        serde_json::json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "channels": tables.channels,
        }),
    );
    tracing::info!("finished");

    let report = MotionReport {
        output: output.display().to_string(),
        channels: tables.channels,
        motion: tables.motion,
        mean: tables.mean,
        max: tables.max,
        sum: tables.sum,
        backup: backup.map(|b| b.display().to_string()),
    };
    print_report(cli.json, true, report, |r| {
        let mut lines = vec![format!(
            "estimated motion across {} channels in {}",
            r.channels, r.output
        )];
        for s in &r.mean {
            lines.push(format!("mean {}\t{}", s.name, s.value));
        }
        if let Some(b) = &r.backup {
            lines.push(format!("previous output moved to {}", b));
        }
        lines.join("\n")
    })?;
    Ok(true)
}
