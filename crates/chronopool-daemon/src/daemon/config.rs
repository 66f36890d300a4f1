use core::time::Duration;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chronopool::{
    DEFAULT_FILENAME, DEFAULT_MAX_ID, DEFAULT_MIN_ID, DEFAULT_POOL_SIZE, PoolConfig,
};
use clap::{Args, Parser, Subcommand};

/// Runtime configuration for the `chronopool` binary.
///
/// Every pool option is also read from an environment variable (and from a
/// `.env` file, loaded before parsing), so the same settings apply to all
/// subcommands of one deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chronopool",
    version,
    about = "Generate, inspect and serve a time-bucketed identifier pool"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path of the persisted pool, one identifier per line.
    ///
    /// Environment variable: `POOL_FILE`
    #[arg(long, global = true, env = "POOL_FILE", default_value = DEFAULT_FILENAME)]
    pub pool_file: PathBuf,

    /// Length of one allocation cycle, in seconds.
    ///
    /// Must be an exact multiple of `unit_secs`.
    ///
    /// Environment variable: `CYCLE_SECS`
    #[arg(long, global = true, env = "CYCLE_SECS", default_value_t = 3_600)]
    pub cycle_secs: u64,

    /// Length of one time bucket, in seconds. Each bucket maps to exactly one
    /// identifier.
    ///
    /// Environment variable: `UNIT_SECS`
    #[arg(long, global = true, env = "UNIT_SECS", default_value_t = 1)]
    pub unit_secs: u64,

    /// Number of identifiers in a freshly generated pool.
    ///
    /// Environment variable: `POOL_SIZE`
    #[arg(long, global = true, env = "POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// Inclusive lower bound of generated identifiers. Must be positive.
    ///
    /// Environment variable: `MIN_ID`
    #[arg(long, global = true, env = "MIN_ID", default_value_t = DEFAULT_MIN_ID)]
    pub min_id: u64,

    /// Exclusive upper bound of generated identifiers.
    ///
    /// Environment variable: `MAX_ID`
    #[arg(long, global = true, env = "MAX_ID", default_value_t = DEFAULT_MAX_ID)]
    pub max_id: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a fresh shuffled pool, overwriting the pool file.
    Generate,
    /// Print the pool size and the current cycle's boundaries.
    Inspect,
    /// Serve identifiers to demo workers and roll over at every cycle
    /// boundary until interrupted.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of worker tasks claiming identifiers concurrently.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 1)]
    pub num_workers: usize,

    /// Delay between two claims of one worker, in milliseconds.
    ///
    /// Environment variable: `CLAIM_INTERVAL_MS`
    #[arg(long, env = "CLAIM_INTERVAL_MS", default_value_t = 1_000)]
    pub claim_interval_ms: u64,

    /// Generate a fresh pool when the retained identifiers can no longer fill
    /// a cycle, instead of stopping.
    ///
    /// Environment variable: `AUTO_REGENERATE`
    #[arg(long, env = "AUTO_REGENERATE", default_value_t = false)]
    pub auto_regenerate: bool,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub pool: PoolConfig,
    pub pool_file: PathBuf,
    pub units_per_cycle: usize,
}

impl TryFrom<&CliArgs> for DaemonConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        if args.min_id == 0 {
            bail!("MIN_ID must be greater than 0 (0 is the no-identifier sentinel)");
        }

        if args.min_id >= args.max_id {
            bail!(
                "MIN_ID ({}) must be lower than MAX_ID ({})",
                args.min_id,
                args.max_id
            );
        }

        let span = args.max_id - args.min_id;
        if args.pool_size as u64 > span {
            bail!(
                "POOL_SIZE ({}) exceeds the {} identifiers in [MIN_ID, MAX_ID)",
                args.pool_size,
                span
            );
        }

        let pool = PoolConfig::default()
            .with_cycle(Duration::from_secs(args.cycle_secs))
            .with_unit(Duration::from_secs(args.unit_secs))
            .with_count(args.pool_size)
            .with_id_range(args.min_id, args.max_id);

        let units_per_cycle = pool
            .validate()
            .context("CYCLE_SECS must be a non-zero multiple of UNIT_SECS")?;

        if args.pool_size < units_per_cycle {
            bail!(
                "POOL_SIZE ({}) cannot fill one cycle of {} units",
                args.pool_size,
                units_per_cycle
            );
        }

        Ok(Self {
            pool,
            pool_file: args.pool_file.clone(),
            units_per_cycle,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub num_workers: usize,
    pub claim_interval: Duration,
    pub auto_regenerate: bool,
}

impl TryFrom<&RunArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: &RunArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.claim_interval_ms == 0 {
            bail!("CLAIM_INTERVAL_MS must be greater than 0");
        }

        Ok(Self {
            num_workers: args.num_workers,
            claim_interval: Duration::from_millis(args.claim_interval_ms),
            auto_regenerate: args.auto_regenerate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_describe_an_hour_of_seconds() {
        let args = parse(&["chronopool", "inspect"]);
        let config = DaemonConfig::try_from(&args).unwrap();
        assert_eq!(config.units_per_cycle, 3_600);
        assert_eq!(config.pool, PoolConfig::default());
        assert_eq!(config.pool_file, PathBuf::from(DEFAULT_FILENAME));
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let args = parse(&[
            "chronopool",
            "run",
            "--num-workers",
            "4",
            "--cycle-secs",
            "60",
            "--pool-size",
            "100",
            "--pool-file",
            "/tmp/pool.txt",
        ]);
        let config = DaemonConfig::try_from(&args).unwrap();
        assert_eq!(config.units_per_cycle, 60);
        assert_eq!(config.pool_file, PathBuf::from("/tmp/pool.txt"));

        let Command::Run(run) = &args.command else {
            panic!("expected run, got {:?}", args.command);
        };
        let run = RunConfig::try_from(run).unwrap();
        assert_eq!(run.num_workers, 4);
        assert_eq!(run.claim_interval, Duration::from_secs(1));
        assert!(!run.auto_regenerate);
    }

    #[test]
    fn rejects_uneven_cycle() {
        let args = parse(&["chronopool", "inspect", "--cycle-secs", "10", "--unit-secs", "3"]);
        assert!(DaemonConfig::try_from(&args).is_err());
    }

    #[test]
    fn rejects_sentinel_and_empty_ranges() {
        let zero = parse(&["chronopool", "generate", "--min-id", "0"]);
        assert!(DaemonConfig::try_from(&zero).is_err());

        let empty = parse(&["chronopool", "generate", "--min-id", "5", "--max-id", "5"]);
        assert!(DaemonConfig::try_from(&empty).is_err());
    }

    #[test]
    fn rejects_pool_larger_than_range_or_smaller_than_cycle() {
        let too_big = parse(&[
            "chronopool",
            "generate",
            "--min-id",
            "10",
            "--max-id",
            "20",
            "--pool-size",
            "11",
        ]);
        assert!(DaemonConfig::try_from(&too_big).is_err());

        let too_small = parse(&["chronopool", "generate", "--pool-size", "3599"]);
        assert!(DaemonConfig::try_from(&too_small).is_err());
    }

    #[test]
    fn rejects_idle_workers() {
        let args = parse(&["chronopool", "run", "--num-workers", "0"]);
        let Command::Run(run) = &args.command else {
            panic!("expected run");
        };
        assert!(RunConfig::try_from(run).is_err());
    }
}
