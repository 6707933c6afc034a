use crate::*;

pub fn handle_admin_commands(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Probe => {
            print_rows(cli.json, &PROBE_POINTS, |p| {
                format!("{} {} {}", p[0], p[1], p[2])
            })?;
        }
        Commands::Doctor => {
            let path = config_path(cli.config.as_deref()).ok();
            let report = doctor(config, path.as_deref());
            let ok = report.overall == "ok";
            print_report(cli.json, ok, report, |r| {
                let mut lines = vec![format!("doctor: {}", r.overall)];
                for c in &r.checks {
                    lines.push(format!("{}\t{}", c.name, c.status));
                }
                lines.join("\n")
            })?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}
