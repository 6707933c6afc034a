use crate::*;

fn emit_matrix(
    cli: &Cli,
    action: &str,
    mat: &Affine,
    out: &Path,
    layout: RowLayout,
) -> anyhow::Result<()> {
    tracing::info!("writing world coordinate transform");
    mat.write(out, layout)?;
    let sha256 = file_digest(out)?;
    audit(
        action,
        serde_json::json!({"output": out.display().to_string(), "sha256": sha256}),
    );
    let report = XfmReport {
        output: out.display().to_string(),
        rows: layout.rows(),
        matrix: mat.rows(),
        sha256,
    };
    print_report(cli.json, true, report, |_| {
        mat.to_text(layout).trim_end().to_string()
    })
}

pub fn handle_convert_commands(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::XfmFsl {
            src,
            dest,
            xfm,
            out,
            rows,
        } => {
            require_inputs(&[src.as_path(), dest.as_path(), xfm.as_path()])?;
            tracing::info!("started");
            let mut ws = Workspace::create(out)?;
            if config.workspace.keep_failed {
                ws.keep();
            }
            let probe = resolve_probe_file(&config.tools, ws.path())?;
            let runner = SystemRunner::new(&config.tools);

            tracing::info!("mapping image coordinates");
            let stdout = runner.capture(&img2imgcoord(&config.tools, &probe, src, dest, xfm))?;
            tracing::info!("parsing transformed coordinates");
            let points = parse_mapped_points(&stdout)?;
            tracing::info!("computing world coordinate transform");
            let mat = Affine::from_probe_points(&points)?;

            emit_matrix(cli, "xfm_fsl", &mat, out, RowLayout::from_rows(*rows))?;
            ws.discard()?;
            tracing::info!("finished");
        }
        Commands::XfmPoints { points, out, rows } => {
            require_inputs(&[points.as_path()])?;
            let raw = std::fs::read_to_string(points)?;
            let mapped = parse_mapped_points(&raw)?;
            let mat = Affine::from_probe_points(&mapped)?;
            emit_matrix(cli, "xfm_points", &mat, out, RowLayout::from_rows(*rows))?;
        }
        Commands::XfmApply { matrix, x, y, z } => {
            let mat = Affine::read(matrix)?;
            let input = [*x, *y, *z];
            let report = ApplyReport {
                input,
                output: mat.apply(input),
            };
            print_report(cli.json, true, report, |r| {
                format!("{} {} {}", r.output[0], r.output[1], r.output[2])
            })?;
        }
        Commands::Bvecs {
            input,
            output,
            format,
        } => {
            require_inputs(&[input.as_path()])?;
            let raw = std::fs::read_to_string(input)?;
            let dirs = match format {
                BvecsFormat::Camino => parse_camino(&raw)?,
                BvecsFormat::Fsl => parse_fsl(&raw)?,
            };
            write_bvecs_csv(output, &dirs)?;
            audit(
                "bvecs",
                serde_json::json!({"output": output.display().to_string(), "directions": dirs.len()}),
            );
            let report = BvecsReport {
                output: output.display().to_string(),
                format: format!("{:?}", format).to_lowercase(),
                directions: dirs.len(),
            };
            print_report(cli.json, true, report, |r| {
                format!("wrote {} directions to {}", r.directions, r.output)
            })?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}
