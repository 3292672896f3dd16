use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use freightlink_lib::{
    build_network, load_facilities, BoundingRegion, GeometryPolicy, NetworkOptions, RefineOptions,
    RoadNetwork, RoutableNetwork, TransportMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Logistics connectivity network utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the minimum-cost connectivity network over facility records.
    Build(BuildArgs),
    /// List supported transport modes and their feature-tag filters.
    Modes,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// GeoJSON file with facility features.
    #[arg(long)]
    facilities: PathBuf,

    /// Optional GeoJSON road network used to refine edge distances.
    #[arg(long)]
    network: Option<PathBuf>,

    /// Query region as west,south,east,north degrees (echoed into the result).
    #[arg(long)]
    bbox: Option<BoundingRegion>,

    /// Transport category mode: road-freight, air, sea or rail.
    #[arg(long)]
    mode: Option<TransportMode>,

    /// Drop records with unusable geometry instead of failing.
    #[arg(long)]
    skip_invalid: bool,

    /// Worker cap for per-edge refinement queries.
    #[arg(long)]
    parallelism: Option<usize>,

    /// Write the JSON result to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Modes => handle_modes(),
    }
}

fn handle_build(args: BuildArgs) -> Result<()> {
    let records = load_facilities(&args.facilities).with_context(|| {
        format!(
            "failed to load facilities from {}",
            args.facilities.display()
        )
    })?;

    let network = match &args.network {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read road network from {}", path.display()))?;
            Some(
                RoadNetwork::from_geojson(&raw)
                    .with_context(|| format!("failed to parse road network {}", path.display()))?,
            )
        }
        None => None,
    };

    let options = NetworkOptions {
        geometry_policy: if args.skip_invalid {
            GeometryPolicy::Skip
        } else {
            GeometryPolicy::Strict
        },
        refine: RefineOptions {
            parallelism: args.parallelism,
        },
        mode: args.mode,
        region: args.bbox,
    };

    let provider = network.as_ref().map(|road| road as &dyn RoutableNetwork);
    let result =
        build_network(&records, provider, &options).context("failed to build the network")?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match args.output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write result to {}", path.display()))?;
            println!("Result written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_modes() -> Result<()> {
    for mode in TransportMode::ALL {
        let filters = mode
            .feature_tags()
            .iter()
            .map(|(key, values)| {
                if values.is_empty() {
                    (*key).to_string()
                } else {
                    format!("{key}={}", values.join("|"))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("{mode}: {filters}");
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
