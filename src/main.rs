#![allow(dead_code)]

use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use log::{error, info, LevelFilter};

use config::SimulationConfig;
use generator::generate_to_directory;
use sink::OutputFormat;

mod clock;
mod config;
mod error;
mod fleet;
mod generator;
mod random;
mod route;
mod sink;
mod snapshot;
mod step;
#[cfg(test)]
mod test;
mod vehicle;

#[derive(Parser, Debug)]
#[command(
    version,
    author,
    about = "Generates synthetic telemetry for a fleet of buses, trains and trams"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    #[command(about = "Simulate the fleet and write one partitioned batch per step")]
    Generate(GenerateArgs),

    #[command(about = "Print the effective configuration as JSON")]
    ShowConfig(ConfigArgs),

    #[command(about = "List the configured routes")]
    Routes(ConfigArgs),
}

#[derive(Args, Clone, Debug)]
struct ConfigArgs {
    #[arg(
        short = 'c',
        long,
        help = "A JSON configuration file. Missing keys fall back to the built-in defaults."
    )]
    config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct GenerateArgs {
    #[clap(flatten)]
    config_args: ConfigArgs,

    #[arg(
        short = 'o',
        long,
        help = "The directory to write the batches to. Defaults to the configured output directory."
    )]
    output_dir: Option<PathBuf>,

    #[arg(short = 'n', long, default_value_t = 10, help = "The number of steps to simulate.")]
    steps: u64,

    #[arg(long, help = "Overrides the configured random seed.")]
    seed: Option<u64>,

    #[arg(long, help = "Overrides the configured fleet size.")]
    vehicles: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn load_config(args: &ConfigArgs) -> SimulationConfig {
    let Some(path) = &args.config else {
        return SimulationConfig::default();
    };
    SimulationConfig::from_file(path).unwrap_or_else(|it| {
        error!("Could not load config:\n{:#?}", it);
        exit(1);
    })
}

fn main_generate(args: &GenerateArgs) {
    let mut config = load_config(&args.config_args);
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(vehicles) = args.vehicles {
        config.fleet_size = vehicles;
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());

    let (steps, location) = generate_to_directory(config, output_dir, args.steps, args.format)
        .unwrap_or_else(|it| {
            error!("Generation failed:\n{:#?}", it);
            exit(1);
        });

    info!("Successfully generated {} steps of transit vehicle data", steps);
    info!("Output directory: {}", location.display());
}

fn main_show_config(args: &ConfigArgs) {
    let config = load_config(args);
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(it) => {
            error!("Could not serialize config:\n{:#?}", it);
            exit(1);
        }
    }
}

fn main_routes(args: &ConfigArgs) {
    let config = load_config(args);
    for (id, route) in &config.routes {
        println!(
            "{:>4}  {:<20} {:<6} {}",
            id,
            route.name,
            route.vehicle_type,
            route.stops.iter().join(" -> ")
        );
    }
}

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_env("LOG")
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => main_generate(&args),
        Commands::ShowConfig(args) => main_show_config(&args),
        Commands::Routes(args) => main_routes(&args),
    }
}
