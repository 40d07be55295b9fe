//! The module responsible for writing solved results to disk.
//!
//! Each variable family is written to its own CSV file, keyed by the same index tuples the
//! formulation used, so that input → formulate → solve → export is index-tuple-addressable.
use crate::formulation::SolvedModel;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which case-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "transcap_results";

/// The output file name for flows
const FLOWS_FILE_NAME: &str = "flows.csv";

/// The output file name for fleet stock
const STOCK_FILE_NAME: &str = "vehicle_stock.csv";

/// The output file name for new purchases
const PURCHASES_FILE_NAME: &str = "vehicle_purchases.csv";

/// The output file name for mode infrastructure expansion
const MODE_INFR_FILE_NAME: &str = "mode_infrastructure.csv";

/// The output file name for fueling infrastructure expansion
const FUELING_INFR_FILE_NAME: &str = "fueling_infrastructure.csv";

/// The output file name for fueling energy demand
const FUELING_DEMAND_FILE_NAME: &str = "fueling_demand.csv";

/// Represents a row in the flows CSV file
#[derive(Serialize)]
struct FlowRow {
    product: u32,
    odpair: u32,
    path: u32,
    tech_vehicle: u32,
    year: u32,
    flow: f64,
}

/// Represents a row in the vehicle stock CSV file
#[derive(Serialize)]
struct StockRow {
    tech_vehicle: u32,
    vintage: u32,
    year: u32,
    stock: f64,
}

/// Represents a row in the vehicle purchases CSV file
#[derive(Serialize)]
struct PurchaseRow {
    tech_vehicle: u32,
    year: u32,
    purchases: f64,
}

/// Represents a row in the mode infrastructure CSV file
#[derive(Serialize)]
struct ModeInfrRow {
    element: String,
    mode: u32,
    year: u32,
    expansion: f64,
}

/// Represents a row in the fueling infrastructure CSV file
#[derive(Serialize)]
struct FuelingInfrRow {
    element: String,
    technology: u32,
    year: u32,
    expansion_kw: f64,
}

/// Represents a row in the fueling demand CSV file
#[derive(Serialize)]
struct FuelingDemandRow {
    element: String,
    technology: u32,
    year: u32,
    energy_kwh: f64,
}

/// The output directory for the given case name
pub fn get_output_dir(case_name: &str) -> PathBuf {
    [OUTPUT_DIRECTORY_ROOT, case_name].iter().collect()
}

/// Create the output directory if it does not exist yet.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }
    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Write all variable families of a solved model to CSV files in `output_dir`.
pub fn write_results(output_dir: &Path, solved: &SolvedModel) -> Result<()> {
    write_csv(
        &output_dir.join(FLOWS_FILE_NAME),
        solved.iter_flows().map(|(key, value)| FlowRow {
            product: key.product.0,
            odpair: key.odpair.0,
            path: key.path.0,
            tech_vehicle: key.tech_vehicle.0,
            year: key.year,
            flow: value,
        }),
    )?;

    write_csv(
        &output_dir.join(STOCK_FILE_NAME),
        solved.iter_stock().map(|(key, value)| StockRow {
            tech_vehicle: key.tech_vehicle.0,
            vintage: key.vintage,
            year: key.year,
            stock: value,
        }),
    )?;

    write_csv(
        &output_dir.join(PURCHASES_FILE_NAME),
        solved.iter_purchases().map(|(key, value)| PurchaseRow {
            tech_vehicle: key.tech_vehicle.0,
            year: key.year,
            purchases: value,
        }),
    )?;

    write_csv(
        &output_dir.join(MODE_INFR_FILE_NAME),
        solved.iter_mode_expansion().map(|(key, value)| ModeInfrRow {
            element: key.element.to_string(),
            mode: key.mode.0,
            year: key.year,
            expansion: value,
        }),
    )?;

    write_csv(
        &output_dir.join(FUELING_INFR_FILE_NAME),
        solved
            .iter_fueling_expansion()
            .map(|(key, value)| FuelingInfrRow {
                element: key.element.to_string(),
                technology: key.technology.0,
                year: key.year,
                expansion_kw: value,
            }),
    )?;

    write_csv(
        &output_dir.join(FUELING_DEMAND_FILE_NAME),
        solved
            .iter_fueling_demand()
            .map(|(key, value)| FuelingDemandRow {
                element: key.element.to_string(),
                technology: key.technology.0,
                year: key.year,
                energy_kwh: value,
            }),
    )?;

    Ok(())
}

/// Serialise rows to a CSV file.
fn write_csv<T: Serialize>(file_path: &Path, rows: impl Iterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
