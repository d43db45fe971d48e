//! `dispatch` command line: load driver and ride files, resolve the run
//! configuration, assign, and print the result as JSON.

pub mod logger;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dispatch_core::matching::PenaltyCurve;
use dispatch_core::metrics::AssignmentResult;
use dispatch_core::params::{AssignmentConfig, ConfigOverrides};
use dispatch_core::records::{load_drivers, load_rides};
use dispatch_core::routing::{build_route_backend, RouteBackendKind};
use dispatch_core::scheduler::Scheduler;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Straight-line travel at a fixed average speed (offline)
    Haversine,
    /// Precomputed legs from --route-table
    Table,
    /// OSRM HTTP server at --osrm-endpoint
    Osrm,
}

#[derive(Debug, Parser)]
#[command(
    name = "dispatch",
    about = "Assign scheduled rides to drivers by lowest incremental cost",
    long_about = "Greedy single-pass assignment of scheduled rides to a driver fleet.\n\
                  Configuration layers defaults, DISPATCH_* environment variables and\n\
                  the flags below, in that order."
)]
pub struct Cli {
    /// JSON array of driver records
    #[arg(long, env = "DISPATCH_DRIVERS")]
    pub drivers: PathBuf,
    /// JSON array of ride records
    #[arg(long, env = "DISPATCH_RIDES")]
    pub rides: PathBuf,
    /// Write the result to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Routing backend
    #[arg(long, value_enum, default_value_t = Backend::Haversine, env = "DISPATCH_BACKEND")]
    pub backend: Backend,
    /// Route table JSON (required with --backend table)
    #[arg(long, env = "DISPATCH_ROUTE_TABLE")]
    pub route_table: Option<PathBuf>,
    #[arg(long, env = "DISPATCH_OSRM_ENDPOINT", default_value = "http://localhost:5000")]
    pub osrm_endpoint: String,

    /// Treat pairs farther apart than --max-air-distance-km as unreachable
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub air_distance_filter: Option<bool>,
    #[arg(long)]
    pub max_air_distance_km: Option<f64>,
    /// Add a load penalty to driver selection and report ride-count statistics
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub fairness: Option<bool>,
    #[arg(long)]
    pub fairness_weight: Option<f64>,
    /// linear or quadratic
    #[arg(long)]
    pub penalty_curve: Option<PenaltyCurve>,
    /// Driver cost per hour of empty and service time
    #[arg(long)]
    pub hourly_rate: Option<f64>,
    /// Deadline for one routing lookup
    #[arg(long)]
    pub lookup_timeout_ms: Option<u64>,
    #[arg(long)]
    pub max_concurrent_evaluations: Option<usize>,
}

impl Cli {
    /// Flags that were given. `--fairness=false` turns an environment setting off.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            use_air_distance_filter: self.air_distance_filter,
            max_air_distance_km: self.max_air_distance_km,
            fairness_mode: self.fairness,
            fairness_weight: self.fairness_weight,
            penalty_curve: self.penalty_curve,
            hourly_rate: self.hourly_rate,
            lookup_timeout_ms: self.lookup_timeout_ms,
            max_concurrent_evaluations: self.max_concurrent_evaluations,
        }
    }

    pub fn backend_kind(&self) -> Result<RouteBackendKind> {
        match self.backend {
            Backend::Haversine => Ok(RouteBackendKind::Haversine),
            Backend::Table => {
                let Some(path) = &self.route_table else {
                    bail!("--backend table needs --route-table");
                };
                Ok(RouteBackendKind::Table { path: path.clone() })
            }
            Backend::Osrm => osrm_kind(&self.osrm_endpoint),
        }
    }
}

#[cfg(feature = "osrm")]
fn osrm_kind(endpoint: &str) -> Result<RouteBackendKind> {
    Ok(RouteBackendKind::Osrm {
        endpoint: endpoint.to_string(),
    })
}

#[cfg(not(feature = "osrm"))]
fn osrm_kind(_endpoint: &str) -> Result<RouteBackendKind> {
    bail!("this build of dispatch was compiled without the `osrm` feature")
}

/// Resolve configuration, load inputs, build the backend and run the assignment.
pub async fn run(cli: &Cli) -> Result<AssignmentResult> {
    let config = AssignmentConfig::resolve(&cli.overrides()).context("invalid configuration")?;
    let drivers = load_drivers(&cli.drivers)
        .with_context(|| format!("loading drivers from {}", cli.drivers.display()))?;
    let rides = load_rides(&cli.rides)
        .with_context(|| format!("loading rides from {}", cli.rides.display()))?;
    let backend =
        build_route_backend(&cli.backend_kind()?).context("setting up the routing backend")?;
    info!(backend = ?cli.backend, ?config, "configuration resolved");

    let result = Scheduler::new(backend, &config)
        .assign(&drivers, &rides)
        .await?;
    Ok(result)
}

/// Serialize `result` to `output`, or to stdout when no path is given.
pub fn write_result(result: &AssignmentResult, output: Option<&Path>, compact: bool) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            write_json(BufWriter::new(file), result, compact)
                .with_context(|| format!("writing result to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), result, compact).context("writing result to stdout"),
    }
}

fn write_json<W: Write>(mut writer: W, result: &AssignmentResult, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(&mut writer, result)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, result)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dispatch", "--drivers", "d.json", "--rides", "r.json"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn unset_flags_leave_overrides_empty() {
        assert_eq!(parse(&[]).overrides(), ConfigOverrides::default());
    }

    #[test]
    fn flags_map_to_overrides() {
        let cli = parse(&[
            "--air-distance-filter",
            "--max-air-distance-km",
            "12.5",
            "--fairness",
            "--penalty-curve",
            "linear",
            "--fairness-weight",
            "3",
            "--hourly-rate",
            "42",
            "--lookup-timeout-ms",
            "750",
            "--max-concurrent-evaluations",
            "2",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.use_air_distance_filter, Some(true));
        assert_eq!(overrides.max_air_distance_km, Some(12.5));
        assert_eq!(overrides.fairness_mode, Some(true));
        assert_eq!(overrides.penalty_curve, Some(PenaltyCurve::Linear));
        assert_eq!(overrides.fairness_weight, Some(3.0));
        assert_eq!(overrides.hourly_rate, Some(42.0));
        assert_eq!(overrides.lookup_timeout_ms, Some(750));
        assert_eq!(overrides.max_concurrent_evaluations, Some(2));
    }

    #[test]
    fn explicit_false_switches_override_the_environment() {
        let cli = parse(&["--fairness=false", "--air-distance-filter=false"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.fairness_mode, Some(false));
        assert_eq!(overrides.use_air_distance_filter, Some(false));

        let env = |key: &str| match key {
            "DISPATCH_FAIRNESS_MODE" | "DISPATCH_USE_AIR_DISTANCE_FILTER" => Some("true".to_string()),
            _ => None,
        };
        let from_env = AssignmentConfig::from_lookup(env).expect("env config");
        assert!(from_env.fairness_mode);
        assert!(from_env.use_air_distance_filter);

        let config = from_env.with_overrides(&overrides);
        assert!(!config.fairness_mode);
        assert!(!config.use_air_distance_filter);
    }

    #[test]
    fn unknown_penalty_curve_is_rejected() {
        let argv = [
            "dispatch",
            "--drivers",
            "d.json",
            "--rides",
            "r.json",
            "--penalty-curve",
            "cubic",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn table_backend_requires_a_path() {
        let cli = parse(&["--backend", "table"]);
        assert!(cli.backend_kind().is_err());

        let cli = parse(&["--backend", "table", "--route-table", "legs.json"]);
        assert_eq!(
            cli.backend_kind().expect("kind"),
            RouteBackendKind::Table {
                path: PathBuf::from("legs.json")
            }
        );
    }

    #[test]
    fn haversine_is_the_default_backend() {
        assert_eq!(parse(&[]).backend_kind().expect("kind"), RouteBackendKind::Haversine);
    }
}
