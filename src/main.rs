//! The command line interface for the model.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use transcap::commands::run_with_options;
use transcap::log;
use transcap::solver::SolveOptions;

#[derive(Parser)]
#[command(version, about)]
/// The command line interface for the model.
struct Cli {
    #[command(subcommand)]
    /// The available commands.
    command: Commands,
}

#[derive(Subcommand)]
/// The available commands.
enum Commands {
    /// Formulate and solve a case.
    Run {
        /// Path to the TOML case document.
        case_file: PathBuf,
        /// Name of the case, used for the output folder.
        #[arg(long)]
        case_name: Option<String>,
        /// Directory to write results to.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Wall-clock limit for the solve in seconds.
        #[arg(long)]
        time_limit: Option<f64>,
        /// Relative gap tolerance at which the solve may stop.
        #[arg(long)]
        gap: Option<f64>,
    },
}

fn main() -> ExitCode {
    human_panic::setup_panic!();

    if let Err(err) = log::init() {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            case_file,
            case_name,
            output_dir,
            time_limit,
            gap,
        } => {
            let options = SolveOptions {
                time_limit,
                gap_tolerance: gap,
                verbose: false,
            };
            ExitCode::from(run_with_options(
                &case_file,
                case_name.as_deref(),
                output_dir.as_ref(),
                &options,
            ))
        }
    }
}
