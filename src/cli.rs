use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::{BuildMode, MergeMode, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Build block worlds from elevation and land-cover rasters")]
pub struct Cli {
    /// Build config (TOML)
    #[arg(long, short, global = true, default_value = "strata.toml")]
    pub config: PathBuf,

    /// More logging; repeat for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every tile, then merge them into the world
    Build(ExecArgs),
    /// Print the tile partition without building anything
    Tiles,
    /// Merge existing tile artifacts into the world
    Merge {
        /// Merge strategy (overrides merge.strategy)
        #[arg(long, value_enum)]
        merge: Option<MergeArg>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ExecArgs {
    /// Build tiles one at a time on the main thread
    #[arg(long)]
    pub single: bool,

    /// Worker threads (0 = all cores; overrides build.workers)
    #[arg(long, conflicts_with = "single")]
    pub workers: Option<usize>,

    /// Merge strategy (overrides merge.strategy)
    #[arg(long, value_enum)]
    pub merge: Option<MergeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MergeArg {
    Fast,
    Safe,
}

impl From<MergeArg> for MergeMode {
    fn from(m: MergeArg) -> Self {
        match m {
            MergeArg::Fast => MergeMode::Fast,
            MergeArg::Safe => MergeMode::Safe,
        }
    }
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

impl ExecArgs {
    /// Applies command-line overrides on top of the config's choices.
    pub fn apply(&self, mut opts: RunOptions) -> RunOptions {
        if self.single {
            opts.build = BuildMode::Single;
        } else if let Some(workers) = self.workers {
            opts.build = BuildMode::Parallel { workers };
        }
        if let Some(m) = self.merge {
            opts.merge = m.into();
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunOptions {
        RunOptions {
            build: BuildMode::Parallel { workers: 0 },
            merge: MergeMode::Safe,
        }
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["strata", "build", "--workers", "3", "--merge", "fast"]);
        let Command::Build(args) = &cli.command else {
            panic!("expected build");
        };
        let opts = args.apply(base());
        assert_eq!(opts.build, BuildMode::Parallel { workers: 3 });
        assert_eq!(opts.merge, MergeMode::Fast);
        assert_eq!(cli.config, PathBuf::from("strata.toml"));
    }

    #[test]
    fn single_and_quiet() {
        let cli = Cli::parse_from(["strata", "-q", "build", "--single", "-c", "x.toml"]);
        let Command::Build(args) = &cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.apply(base()).build, BuildMode::Single);
        assert_eq!(cli.log_level(), LevelFilter::Warn);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn single_conflicts_with_workers() {
        assert!(Cli::try_parse_from(["strata", "build", "--single", "--workers", "2"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["strata", "-vv", "tiles"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        assert!(matches!(cli.command, Command::Tiles));
    }
}
