//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - calibrates the model from historical data
//! - runs the interactive or headless simulation
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing::Level;

use crate::cli::{Command, CommonArgs, FitArgs, SimulateArgs};
use crate::domain::{CurveShape, Quantity, SimConfig};
use crate::error::AppError;
use crate::sim::YearStepper;

pub mod pipeline;

/// Entry point for the `climsim` binary.
pub fn run() -> Result<(), AppError> {
    // We want `climsim` and `climsim --demo` to behave like `climsim play ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Play(args) => handle_play(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Fit(args) => handle_fit(args),
    }
}

fn handle_play(args: CommonArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(&args);
    let calibration = pipeline::calibrate(&config)?;
    let mut stepper = YearStepper::from_seed(calibration.model, config.constants.clone(), config.seed)?;

    let header = format!(
        "data: {} | season: {} | emission rmse {:.2} | deforestation rmse {:.0}",
        if config.demo { "demo" } else { "csv" },
        pipeline::season_name(config.season),
        calibration.emission.quality.rmse,
        calibration.deforestation.quality.rmse,
    );
    crate::tui::run(&mut stepper, &header)?;

    println!("Thanks for playing!");
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(&args.common);
    let calibration = pipeline::calibrate(&config)?;
    let mut stepper = YearStepper::from_seed(calibration.model, config.constants.clone(), config.seed)?;

    println!("{}", crate::report::format_step(&stepper.current()));
    for _ in 0..args.years {
        let step = stepper.advance_year()?;
        println!("{}", crate::report::format_step(&step));
    }

    let history = stepper.history();
    println!();
    print!("{}", crate::report::format_run_summary(&history));

    if args.plot {
        println!();
        print!("{}", crate::plot::render_history_plots(&history, args.width, args.height));
    }
    if let Some(path) = &args.export {
        crate::io::write_history_csv(path, &history)?;
    }

    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = sim_config_from_args(&args.common);
    let calibration = pipeline::calibrate(&config)?;

    println!(
        "{}",
        crate::report::format_calibration(&calibration, config.season, config.demo)
    );

    if args.plot {
        let emission = crate::plot::render_fit_plot(
            Quantity::Emission,
            &calibration.emission_series,
            Some((CurveShape::Logarithmic, &calibration.model.emission)),
            args.width,
            args.height,
        );
        let deforestation = crate::plot::render_fit_plot(
            Quantity::Deforestation,
            &calibration.deforestation_rest,
            Some((CurveShape::Hyperbolic, &calibration.model.deforestation)),
            args.width,
            args.height,
        );
        let trend = crate::plot::render_fit_plot(
            Quantity::Temperature,
            &calibration.national_temperature,
            None,
            args.width,
            args.height,
        );
        println!("{emission}");
        println!("{deforestation}");
        println!("National temperature trend");
        println!("{trend}");

        for (province, series) in &calibration.provincial_temperature {
            let plot = crate::plot::render_fit_plot(Quantity::Temperature, series, None, args.width, args.height);
            println!("{province}");
            println!("{plot}");
        }
    }

    if let Some(path) = &args.export_params {
        let file = crate::io::ModelFile::from_calibration(&calibration, config.season, config.demo);
        crate::io::write_model_json(path, &file)?;
    }

    Ok(())
}

pub fn sim_config_from_args(args: &CommonArgs) -> SimConfig {
    SimConfig {
        data_dir: args.data_dir.clone(),
        season: args.season,
        demo: args.demo,
        seed: args.seed,
        ..SimConfig::default()
    }
}

/// Install the stderr log subscriber; verbosity comes from `-v` only.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed (e.g. by an embedding test harness).
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Rewrite argv so `climsim` defaults to `climsim play`.
///
/// Rules:
/// - `climsim`                     -> `climsim play`
/// - `climsim --demo ...`          -> `climsim play --demo ...`
/// - `climsim -v fit ...`          -> unchanged (global flags may precede a subcommand)
/// - `climsim --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Leading global verbosity flags don't decide the subcommand.
    let first = argv
        .iter()
        .skip(1)
        .position(|arg| !is_verbose_flag(arg))
        .map(|i| i + 1);
    let Some(idx) = first else {
        argv.push("play".to_string());
        return argv;
    };
    let arg = argv[idx].as_str();

    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg, "play" | "simulate" | "fit");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "play flags".
    if arg.starts_with('-') {
        argv.insert(idx, "play".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

/// `-v`, `-vv`, ... or `--verbose`.
fn is_verbose_flag(arg: &str) -> bool {
    if arg == "--verbose" {
        return true;
    }
    arg.strip_prefix('-')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b == b'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_command_defaults_to_play() {
        assert_eq!(rewrite_args(args(&["climsim"])), args(&["climsim", "play"]));
        assert_eq!(
            rewrite_args(args(&["climsim", "--demo"])),
            args(&["climsim", "play", "--demo"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(args(&["climsim", "fit", "--plot"])),
            args(&["climsim", "fit", "--plot"])
        );
        assert_eq!(rewrite_args(args(&["climsim", "--help"])), args(&["climsim", "--help"]));
        assert_eq!(
            rewrite_args(args(&["climsim", "-v", "fit", "--demo"])),
            args(&["climsim", "-v", "fit", "--demo"])
        );
        assert_eq!(
            rewrite_args(args(&["climsim", "-vv", "--verbose", "simulate"])),
            args(&["climsim", "-vv", "--verbose", "simulate"])
        );
    }

    #[test]
    fn verbose_flags_before_play_flags() {
        assert_eq!(rewrite_args(args(&["climsim", "-v"])), args(&["climsim", "-v", "play"]));
        assert_eq!(
            rewrite_args(args(&["climsim", "-vv", "--demo"])),
            args(&["climsim", "-vv", "play", "--demo"])
        );
    }

    #[test]
    fn global_verbose_parses_before_subcommand() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(args(&["climsim", "-v", "fit", "--demo"]))).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Fit(ref fit) if fit.common.demo));

        let cli = crate::cli::Cli::try_parse_from(rewrite_args(args(&["climsim", "-vv"]))).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Play(_)));
    }
}
