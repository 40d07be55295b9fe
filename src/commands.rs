//! The command surface for the program.
//!
//! `run` loads a case document, formulates the optimization problem, solves it and writes the
//! results. Exit codes are documented per error kind: 0 for a found solution, 2 for a
//! validation failure, 3 for a formulation error, 4 for infeasibility/unboundedness, 5 for a
//! solver-engine error and 1 for anything else.
use crate::error::exit_code_for;
use crate::formulation::formulate;
use crate::input::read_case;
use crate::output::{create_output_directory, get_output_dir, write_results};
use crate::solver::SolveOptions;
use anyhow::{Context, Result};
use log::{error, info};
use std::path::{Path, PathBuf};

/// Run a case end to end, writing results under the output directory.
///
/// # Arguments
///
/// * `case_path` - Path to the TOML case document
/// * `case_name` - Name of the case, used for the output folder; defaults to the file stem
/// * `output_dir` - Where to write results; defaults to `transcap_results/<case_name>`
/// * `options` - Solve limits
pub fn handle_run_command(
    case_path: &Path,
    case_name: Option<&str>,
    output_dir: Option<&Path>,
    options: &SolveOptions,
) -> Result<()> {
    let case_name = match case_name {
        Some(name) => name.to_string(),
        None => case_path
            .file_stem()
            .context("Invalid case file path")?
            .to_string_lossy()
            .into_owned(),
    };

    let catalog = read_case(case_path).context("Failed to load case")?;
    info!("Case {case_name} loaded successfully");

    let model = formulate(&catalog).context("Failed to formulate model")?;
    let solved = model.solve(options)?;

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_output_dir(&case_name),
    };
    create_output_directory(&output_dir).context("Failed to create output directory")?;
    write_results(&output_dir, &solved).context("Failed to write results")?;
    info!("Results written to {}", output_dir.display());

    Ok(())
}

/// Run a case and map the outcome to the documented exit code.
pub fn run(case_path: &Path, case_name: &str) -> u8 {
    run_with_options(
        case_path,
        Some(case_name),
        None,
        &SolveOptions::default(),
    )
}

/// Like [`run`], with explicit output directory and solve options.
pub fn run_with_options(
    case_path: &Path,
    case_name: Option<&str>,
    output_dir: Option<&PathBuf>,
    options: &SolveOptions,
) -> u8 {
    match handle_run_command(
        case_path,
        case_name,
        output_dir.map(PathBuf::as_path),
        options,
    ) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:#}");
            exit_code_for(&err)
        }
    }
}
