//! Command-line parsing for the climate simulation.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Season;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "climsim", version, about = "Emission / deforestation / temperature year-stepping simulation")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Step through the simulation interactively (Space = next year, q = quit).
    Play(CommonArgs),
    /// Run the simulation headless for a fixed number of years.
    Simulate(SimulateArgs),
    /// Fit the model to the historical data and print diagnostics.
    Fit(FitArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Directory holding `temperature/` and `other_data/`.
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Months feeding the yearly temperature median.
    #[arg(long, value_enum, default_value_t = Season::LateSummer)]
    pub season: Season,

    /// Use a seeded synthetic historical dataset instead of the CSVs.
    #[arg(long)]
    pub demo: bool,

    /// Seed for the simulation (and demo data); OS entropy when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of years to simulate after the base year.
    #[arg(short = 'n', long, default_value_t = 30)]
    pub years: u32,

    /// Export the simulated history to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Render ASCII plots of the three series.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Overlay historical data and fitted curves as ASCII plots.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the fitted model (parameters + fit quality) to JSON.
    #[arg(long = "export-params", value_name = "JSON")]
    pub export_params: Option<PathBuf>,
}
