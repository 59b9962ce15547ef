use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use strata::cli::{Cli, Command};
use strata::{Pipeline, PipelineError, RunOptions, load_config_from_path};

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config_from_path(&cli.config)?;
    let pipeline = Pipeline::from_config(&cfg)?;
    let defaults = RunOptions::from_config(&cfg);

    match cli.command {
        Command::Tiles => {
            let tiles = pipeline.tiles()?;
            let p = pipeline.params();
            println!(
                "grid {}x{}, tile size {}, halo {}: {} tiles",
                p.bounds.width(),
                p.bounds.depth(),
                p.tile_size,
                p.halo,
                tiles.len()
            );
            for t in &tiles {
                println!(
                    "{}\t{},{}..{},{}",
                    t.coord.dir_name(),
                    t.bounds.x0,
                    t.bounds.z0,
                    t.bounds.x1,
                    t.bounds.z1
                );
            }
        }
        Command::Build(args) => {
            let opts = args.apply(defaults);
            match pipeline.run(opts) {
                Ok(summary) => {
                    let m = &summary.merge.meta;
                    info!(
                        "world {} written: {} regions, spawn {:?}",
                        m.name,
                        m.regions.len(),
                        m.spawn
                    );
                }
                Err(PipelineError::Incomplete { failed, missing }) => {
                    for (c, why) in &failed {
                        eprintln!("failed  {}  {why}", c.dir_name());
                    }
                    for c in &missing {
                        eprintln!("missing {}", c.dir_name());
                    }
                    return Err(PipelineError::Incomplete { failed, missing }.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Merge { merge } => {
            let mode = merge.map(Into::into).unwrap_or(defaults.merge);
            let report = pipeline.merge(mode)?;
            info!(
                "world {} written: {} regions, {} skipped",
                report.meta.name,
                report.welded.len(),
                report.skipped.len()
            );
        }
    }
    Ok(())
}
