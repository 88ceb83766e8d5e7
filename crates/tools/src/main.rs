use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formats::{ViewerConfig, load_dataset_file};
use gpu::DriverSettings;
use tools::{SimulateOptions, inspect_dataset, simulate};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline tools for the case-count globe viewer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print per-day marker counts for a dataset CSV
    Inspect {
        csv: PathBuf,
    },

    /// Run the frame loop headless and print one JSON line per frame
    Simulate {
        csv: PathBuf,

        /// Viewer config JSON; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 600)]
        frames: u64,

        /// Fixed time step in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// Turn auto-rotation on
        #[arg(long)]
        animate: bool,

        /// Rotation speed in degrees per second, as typed in the viewer
        #[arg(long)]
        velocity: Option<String>,
    },

    /// Print the default viewer config
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Inspect { csv } => {
            let rows = load_dataset_file(&csv)?;
            let summary = inspect_dataset(&rows);
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        }
        Command::Simulate {
            csv,
            config,
            frames,
            dt,
            animate,
            velocity,
        } => {
            let config = match config {
                Some(path) => ViewerConfig::from_json(&fs::read_to_string(&path)?)?,
                None => ViewerConfig::default(),
            };
            let mut settings = DriverSettings::from_config(&config)?;
            if animate {
                settings.initial.set_animate(true);
            }
            if let Some(velocity) = velocity {
                settings.initial.set_velocity(velocity);
            }

            let rows = load_dataset_file(&csv)?;
            info!(rows = rows.len(), path = %csv.display(), "dataset loaded");
            let options = SimulateOptions {
                frames,
                dt_s: dt,
                ..SimulateOptions::default()
            };
            for line in simulate(rows, settings, &options)? {
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
        }
        Command::Config => {
            writeln!(out, "{}", ViewerConfig::default().to_json_pretty()?)?;
        }
    }
    Ok(())
}
