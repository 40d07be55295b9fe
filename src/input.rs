//! Reading and validation of the case document.
//!
//! A case is a single TOML file exposing one top-level collection per entity type plus the
//! `[scenario]` scalars. Everything is checked here — unique IDs, dangling references, per-year
//! array lengths, path walk well-formedness, odpair connectivity — so the formulation engine
//! can rely on a fully resolved catalog.
use crate::catalog::{Catalog, Scenario};
use crate::demand::{Odpair, Product};
use crate::error::ModelError;
use crate::id::{HasId, into_id_map};
use crate::mode::Mode;
use crate::network::{Edge, Node, NodeId, Path, PathElement};
use crate::policy::{
    EmissionCapByMode, EmissionCapByYear, GeoRef, InitialFuelingInfr, InitialFuelingInfrId,
    InitialModeInfr, InitialModeInfrId, InitialVehicleStock, MarketShareConstraint,
    MarketShareConstraintId, MarketShareTarget, ShareConstraint, ShareConstraintId, ShareSense,
    ShareTarget, VehicleSubsidy,
};
use crate::region::{FinancialStatus, Regiontype};
use crate::vehicle::{Fuel, TechVehicle, Technology, Vehicletype};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::warn;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path as FilePath;

/// A share-bound record as written in the case document.
#[derive(Debug, Deserialize)]
struct ShareConstraintRaw {
    id: ShareConstraintId,
    target: String,
    target_id: u32,
    sense: String,
    share: f64,
    year: Option<u32>,
    #[serde(default)]
    financial_status: Vec<u32>,
    #[serde(default)]
    region_type: Vec<u32>,
}

/// A market-share record as written in the case document.
#[derive(Debug, Deserialize)]
struct MarketShareConstraintRaw {
    id: MarketShareConstraintId,
    target: String,
    target_id: u32,
    sense: String,
    share: f64,
    year: Option<u32>,
}

/// An initial mode-infrastructure record as written in the case document.
#[derive(Debug, Deserialize)]
struct InitialModeInfrRaw {
    id: InitialModeInfrId,
    mode: u32,
    element: PathElement,
    installed: f64,
}

/// An initial fueling-infrastructure record as written in the case document.
#[derive(Debug, Deserialize)]
struct InitialFuelingInfrRaw {
    id: InitialFuelingInfrId,
    technology: u32,
    element: PathElement,
    installed_kw: f64,
}

/// The contents of an entire case file.
#[derive(Debug, Deserialize)]
struct CaseFile {
    scenario: Scenario,
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
    paths: Vec<Path>,
    odpairs: Vec<Odpair>,
    products: Vec<Product>,
    modes: Vec<Mode>,
    vehicle_types: Vec<Vehicletype>,
    technologies: Vec<Technology>,
    fuels: Vec<Fuel>,
    tech_vehicles: Vec<TechVehicle>,
    region_types: Vec<Regiontype>,
    financial_statuses: Vec<FinancialStatus>,
    #[serde(default)]
    share_constraints: Vec<ShareConstraintRaw>,
    #[serde(default)]
    market_share_constraints: Vec<MarketShareConstraintRaw>,
    #[serde(default)]
    emission_caps_by_mode: Vec<EmissionCapByMode>,
    #[serde(default)]
    emission_caps_by_year: Vec<EmissionCapByYear>,
    #[serde(default)]
    subsidies: Vec<VehicleSubsidy>,
    #[serde(default)]
    initial_vehicle_stock: Vec<InitialVehicleStock>,
    #[serde(default)]
    initial_mode_infr: Vec<InitialModeInfrRaw>,
    #[serde(default)]
    initial_fueling_infr: Vec<InitialFuelingInfrRaw>,
}

/// A validation failure naming the offending key or entity.
fn validation_err(message: String) -> anyhow::Error {
    ModelError::Validation(message).into()
}

/// Read and validate a case file.
///
/// # Arguments
///
/// * `case_path` - Path to the TOML case document
///
/// # Returns
///
/// The validated entity catalog, or a validation error naming the offending key/ID.
pub fn read_case(case_path: &FilePath) -> Result<Catalog> {
    let text = fs::read_to_string(case_path)
        .with_context(|| format!("Could not read case file {}", case_path.display()))?;
    parse_case(&text).with_context(|| format!("Error reading {}", case_path.display()))
}

/// Parse and validate a case document from its TOML text.
fn parse_case(text: &str) -> Result<Catalog> {
    let case: CaseFile = toml::from_str(text).map_err(|err| validation_err(err.to_string()))?;
    let catalog = build_catalog(case)?;
    validate(&catalog)?;

    Ok(catalog)
}

/// Collect entities into an ID-keyed map, reporting duplicates as validation errors.
fn id_map<T: HasId>(name: &str, items: Vec<T>) -> Result<IndexMap<T::Id, T>> {
    into_id_map(name, items).map_err(|e| validation_err(e.to_string()))
}

/// Convert raw records and arrange all entities into the ID-keyed catalog arena.
fn build_catalog(case: CaseFile) -> Result<Catalog> {
    let share_constraints = case
        .share_constraints
        .into_iter()
        .map(convert_share_constraint)
        .collect::<Result<Vec<_>>>()?;
    let market_share_constraints = case
        .market_share_constraints
        .into_iter()
        .map(convert_market_share_constraint)
        .collect::<Result<Vec<_>>>()?;
    let initial_mode_infr = case
        .initial_mode_infr
        .into_iter()
        .map(|raw| InitialModeInfr {
            id: raw.id,
            mode: raw.mode.into(),
            element: raw.element.into(),
            installed: raw.installed,
        })
        .collect();
    let initial_fueling_infr = case
        .initial_fueling_infr
        .into_iter()
        .map(|raw| InitialFuelingInfr {
            id: raw.id,
            technology: raw.technology.into(),
            element: raw.element.into(),
            installed_kw: raw.installed_kw,
        })
        .collect();

    Ok(Catalog {
        scenario: case.scenario,
        nodes: id_map("node", case.nodes)?,
        edges: id_map("edge", case.edges)?,
        paths: id_map("path", case.paths)?,
        odpairs: id_map("odpair", case.odpairs)?,
        products: id_map("product", case.products)?,
        modes: id_map("mode", case.modes)?,
        vehicle_types: id_map("vehicle type", case.vehicle_types)?,
        technologies: id_map("technology", case.technologies)?,
        fuels: id_map("fuel", case.fuels)?,
        tech_vehicles: id_map("tech vehicle", case.tech_vehicles)?,
        region_types: id_map("region type", case.region_types)?,
        financial_statuses: id_map("financial status", case.financial_statuses)?,
        share_constraints,
        market_share_constraints,
        emission_caps_by_mode: case.emission_caps_by_mode,
        emission_caps_by_year: case.emission_caps_by_year,
        subsidies: case.subsidies,
        initial_vehicle_stock: case.initial_vehicle_stock,
        initial_mode_infr,
        initial_fueling_infr,
    })
}

fn convert_share_sense(id: impl Display, sense: &str) -> Result<ShareSense> {
    match sense {
        "min" => Ok(ShareSense::Min),
        "max" => Ok(ShareSense::Max),
        _ => Err(validation_err(format!(
            "Share constraint {id}: unknown sense {sense} (expected min or max)"
        ))),
    }
}

fn convert_share_constraint(raw: ShareConstraintRaw) -> Result<ShareConstraint> {
    let target = match raw.target.as_str() {
        "mode" => ShareTarget::Mode(raw.target_id.into()),
        "technology" => ShareTarget::Technology(raw.target_id.into()),
        "vehicle_type" => ShareTarget::Vehicletype(raw.target_id.into()),
        "tech_vehicle" => ShareTarget::TechVehicle(raw.target_id.into()),
        other => {
            return Err(validation_err(format!(
                "Share constraint {}: unknown target {other}",
                raw.id
            )));
        }
    };

    Ok(ShareConstraint {
        id: raw.id,
        target,
        sense: convert_share_sense(raw.id, &raw.sense)?,
        share: raw.share,
        year: raw.year,
        financial_status: raw.financial_status.into_iter().map(Into::into).collect(),
        region_type: raw.region_type.into_iter().map(Into::into).collect(),
    })
}

fn convert_market_share_constraint(raw: MarketShareConstraintRaw) -> Result<MarketShareConstraint> {
    let target = match raw.target.as_str() {
        "mode" => MarketShareTarget::Mode(raw.target_id.into()),
        "tech_vehicle" => MarketShareTarget::TechVehicle(raw.target_id.into()),
        other => {
            return Err(validation_err(format!(
                "Market share constraint {}: unknown target {other}",
                raw.id
            )));
        }
    };

    Ok(MarketShareConstraint {
        id: raw.id,
        target,
        sense: convert_share_sense(raw.id, &raw.sense)?,
        share: raw.share,
        year: raw.year,
    })
}

/// Check a per-year attribute array has one entry per horizon year.
fn check_per_year(what: &str, id: impl Display, len: usize, num_years: u32) -> Result<()> {
    if len != num_years as usize {
        Err(validation_err(format!(
            "{what} of {id} must have {num_years} entries (one per horizon year), found {len}"
        )))?;
    }
    Ok(())
}

/// Check every cross-reference and invariant of the catalog.
#[allow(clippy::too_many_lines)]
fn validate(catalog: &Catalog) -> Result<()> {
    let scenario = &catalog.scenario;
    let years = scenario.num_years;
    if years == 0 {
        Err(validation_err("num_years must be at least 1".into()))?;
    }
    if scenario.fueling_full_load_hours <= 0.0 {
        Err(validation_err("fueling_full_load_hours must be positive".into()))?;
    }

    for (name, empty) in [
        ("nodes", catalog.nodes.is_empty()),
        ("paths", catalog.paths.is_empty()),
        ("odpairs", catalog.odpairs.is_empty()),
        ("products", catalog.products.is_empty()),
        ("modes", catalog.modes.is_empty()),
        ("vehicle_types", catalog.vehicle_types.is_empty()),
        ("technologies", catalog.technologies.is_empty()),
        ("fuels", catalog.fuels.is_empty()),
        ("tech_vehicles", catalog.tech_vehicles.is_empty()),
        ("region_types", catalog.region_types.is_empty()),
        ("financial_statuses", catalog.financial_statuses.is_empty()),
    ] {
        if empty {
            Err(validation_err(format!("{name} must not be empty")))?;
        }
    }

    for node in catalog.nodes.values() {
        check_per_year("carbon_price", format!("node {}", node.id), node.carbon_price.len(), years)?;
    }

    for edge in catalog.edges.values() {
        for node in [edge.from, edge.to] {
            if !catalog.nodes.contains_key(&node) {
                Err(validation_err(format!(
                    "Edge {} references unknown node {node}",
                    edge.id
                )))?;
            }
        }
        check_per_year("carbon_price", format!("edge {}", edge.id), edge.carbon_price.len(), years)?;
    }

    for path in catalog.paths.values() {
        for element in &path.sequence {
            let known = match element {
                PathElement::Node(id) => catalog.nodes.contains_key(id),
                PathElement::Edge(id) => catalog.edges.contains_key(id),
            };
            if !known {
                Err(validation_err(format!(
                    "Path {} references unknown element {element}",
                    path.id
                )))?;
            }
        }
        path.check_walk(|edge_id| {
            let edge = &catalog.edges[&edge_id];
            Ok((edge.from, edge.to))
        })
        .map_err(|e| validation_err(e.to_string()))?;
    }

    for mode in catalog.modes.values() {
        check_per_year("waiting_time", format!("mode {}", mode.id), mode.waiting_time.len(), years)?;
        if !mode.quantify_by_vehicles {
            for (what, len) in [
                ("cost_per_ukm", mode.cost_per_ukm.len()),
                ("emission_factor", mode.emission_factor.len()),
                (
                    "infrastructure_expansion_cost",
                    mode.infrastructure_expansion_cost.len(),
                ),
                ("infrastructure_om_cost", mode.infrastructure_om_cost.len()),
            ] {
                check_per_year(what, format!("mode {}", mode.id), len, years)?;
            }
        }
    }

    for vehicle_type in catalog.vehicle_types.values() {
        if !catalog.modes.contains_key(&vehicle_type.mode) {
            Err(validation_err(format!(
                "Vehicle type {} references unknown mode {}",
                vehicle_type.id, vehicle_type.mode
            )))?;
        }
        if !catalog.products.contains_key(&vehicle_type.product) {
            Err(validation_err(format!(
                "Vehicle type {} references unknown product {}",
                vehicle_type.id, vehicle_type.product
            )))?;
        }
    }

    for technology in catalog.technologies.values() {
        if !catalog.fuels.contains_key(&technology.fuel) {
            Err(validation_err(format!(
                "Technology {} references unknown fuel {}",
                technology.id, technology.fuel
            )))?;
        }
    }

    for fuel in catalog.fuels.values() {
        for (what, len) in [
            ("cost_per_kwh", fuel.cost_per_kwh.len()),
            ("cost_per_kw", fuel.cost_per_kw.len()),
            (
                "fueling_infrastructure_om_cost",
                fuel.fueling_infrastructure_om_cost.len(),
            ),
        ] {
            check_per_year(what, format!("fuel {}", fuel.id), len, years)?;
        }
    }

    for tv in catalog.tech_vehicles.values() {
        if !catalog.vehicle_types.contains_key(&tv.vehicle_type) {
            Err(validation_err(format!(
                "Tech vehicle {} references unknown vehicle type {}",
                tv.id, tv.vehicle_type
            )))?;
        }
        if !catalog.technologies.contains_key(&tv.technology) {
            Err(validation_err(format!(
                "Tech vehicle {} references unknown technology {}",
                tv.id, tv.technology
            )))?;
        }
        for (what, len) in [
            ("capital_cost", tv.capital_cost.len()),
            ("maintenance_cost", tv.maintenance_cost.len()),
            ("spec_consumption", tv.spec_consumption.len()),
        ] {
            check_per_year(what, format!("tech vehicle {}", tv.id), len, years)?;
        }
        if tv.lifetime == 0 {
            Err(validation_err(format!(
                "Tech vehicle {} must have a lifetime of at least 1 year",
                tv.id
            )))?;
        }
        if catalog.is_fleet_sized(tv.id) && (tv.load_capacity <= 0.0 || tv.annual_range <= 0.0) {
            Err(validation_err(format!(
                "Tech vehicle {} must have positive load capacity and annual range",
                tv.id
            )))?;
        }
    }

    for region_type in catalog.region_types.values() {
        if region_type.speed <= 0.0 {
            Err(validation_err(format!(
                "Region type {} must have a positive speed",
                region_type.id
            )))?;
        }
        check_per_year("cost_var", format!("region type {}", region_type.id), region_type.cost_var.len(), years)?;
        check_per_year("cost_fix", format!("region type {}", region_type.id), region_type.cost_fix.len(), years)?;
    }

    validate_odpairs(catalog)?;
    validate_policies(catalog)?;

    Ok(())
}

/// Check odpair references, the walk-endpoint invariant and network connectivity.
fn validate_odpairs(catalog: &Catalog) -> Result<()> {
    // An undirected view of the network, for checking that demand can be routed at all
    let mut graph = UnGraph::<NodeId, ()>::new_undirected();
    let indices: HashMap<NodeId, NodeIndex> = catalog
        .nodes
        .keys()
        .map(|id| (*id, graph.add_node(*id)))
        .collect();
    for edge in catalog.edges.values() {
        graph.add_edge(indices[&edge.from], indices[&edge.to], ());
    }

    for odpair in catalog.odpairs.values() {
        for node in [odpair.origin, odpair.destination] {
            if !catalog.nodes.contains_key(&node) {
                Err(validation_err(format!(
                    "Odpair {} references unknown node {node}",
                    odpair.id
                )))?;
            }
        }
        if !catalog.products.contains_key(&odpair.product) {
            Err(validation_err(format!(
                "Odpair {} references unknown product {}",
                odpair.id, odpair.product
            )))?;
        }
        if !catalog.financial_statuses.contains_key(&odpair.financial_status) {
            Err(validation_err(format!(
                "Odpair {} references unknown financial status {}",
                odpair.id, odpair.financial_status
            )))?;
        }
        if !catalog.region_types.contains_key(&odpair.region_type) {
            Err(validation_err(format!(
                "Odpair {} references unknown region type {}",
                odpair.id, odpair.region_type
            )))?;
        }
        check_per_year(
            "demand",
            format!("odpair {}", odpair.id),
            odpair.demand.len(),
            catalog.scenario.num_years,
        )?;
        if odpair.demand.iter().any(|d| *d < 0.0) {
            Err(validation_err(format!(
                "Odpair {} has negative demand",
                odpair.id
            )))?;
        }

        if !has_path_connecting(
            &graph,
            indices[&odpair.origin],
            indices[&odpair.destination],
            None,
        ) {
            Err(validation_err(format!(
                "Origin {} and destination {} of odpair {} are not connected in the network",
                odpair.origin, odpair.destination, odpair.id
            )))?;
        }

        for path_id in &odpair.paths {
            let Some(path) = catalog.paths.get(path_id) else {
                Err(validation_err(format!(
                    "Odpair {} references unknown path {path_id}",
                    odpair.id
                )))?
            };
            if path.first_node() != Some(odpair.origin)
                || path.last_node() != Some(odpair.destination)
            {
                Err(validation_err(format!(
                    "Path {} endpoints do not match origin {} and destination {} of odpair {}",
                    path.id, odpair.origin, odpair.destination, odpair.id
                )))?;
            }
        }
    }

    Ok(())
}

/// Check the constraint-specification records.
fn validate_policies(catalog: &Catalog) -> Result<()> {
    let scenario = &catalog.scenario;
    let year_in_horizon =
        |year: u32| year >= scenario.base_year && year <= scenario.last_year();

    for constraint in &catalog.share_constraints {
        if !(0.0..=1.0).contains(&constraint.share) {
            Err(validation_err(format!(
                "Share constraint {} share must be between 0 and 1",
                constraint.id
            )))?;
        }
        let target_known = match constraint.target {
            ShareTarget::Mode(id) => catalog.modes.contains_key(&id),
            ShareTarget::Technology(id) => catalog.technologies.contains_key(&id),
            ShareTarget::Vehicletype(id) => catalog.vehicle_types.contains_key(&id),
            ShareTarget::TechVehicle(id) => catalog.tech_vehicles.contains_key(&id),
        };
        if !target_known {
            Err(validation_err(format!(
                "Share constraint {} references unknown {}",
                constraint.id, constraint.target
            )))?;
        }
        if let Some(year) = constraint.year {
            if !year_in_horizon(year) {
                Err(validation_err(format!(
                    "Share constraint {} year {year} is outside the horizon",
                    constraint.id
                )))?;
            }
        }
        for status in &constraint.financial_status {
            if !catalog.financial_statuses.contains_key(status) {
                Err(validation_err(format!(
                    "Share constraint {} references unknown financial status {status}",
                    constraint.id
                )))?;
            }
        }
        for region_type in &constraint.region_type {
            if !catalog.region_types.contains_key(region_type) {
                Err(validation_err(format!(
                    "Share constraint {} references unknown region type {region_type}",
                    constraint.id
                )))?;
            }
        }
    }

    for constraint in &catalog.market_share_constraints {
        if !(0.0..=1.0).contains(&constraint.share) {
            Err(validation_err(format!(
                "Market share constraint {} share must be between 0 and 1",
                constraint.id
            )))?;
        }
        let target_known = match constraint.target {
            MarketShareTarget::Mode(id) => catalog.modes.contains_key(&id),
            MarketShareTarget::TechVehicle(id) => catalog.tech_vehicles.contains_key(&id),
        };
        if !target_known {
            Err(validation_err(format!(
                "Market share constraint {} references unknown {}",
                constraint.id, constraint.target
            )))?;
        }
        if let Some(year) = constraint.year {
            if !year_in_horizon(year) {
                Err(validation_err(format!(
                    "Market share constraint {} year {year} is outside the horizon",
                    constraint.id
                )))?;
            }
        }
    }

    for cap in &catalog.emission_caps_by_mode {
        if !catalog.modes.contains_key(&cap.mode) {
            Err(validation_err(format!(
                "Emission cap {} references unknown mode {}",
                cap.id, cap.mode
            )))?;
        }
        if !year_in_horizon(cap.year) {
            Err(validation_err(format!(
                "Emission cap {} year {} is outside the horizon",
                cap.id, cap.year
            )))?;
        }
    }
    for cap in &catalog.emission_caps_by_year {
        if !year_in_horizon(cap.year) {
            Err(validation_err(format!(
                "Emission cap {} year {} is outside the horizon",
                cap.id, cap.year
            )))?;
        }
    }

    for subsidy in &catalog.subsidies {
        if !catalog.tech_vehicles.contains_key(&subsidy.tech_vehicle) {
            Err(validation_err(format!(
                "Subsidy {} references unknown tech vehicle {}",
                subsidy.id, subsidy.tech_vehicle
            )))?;
        }
    }

    for record in &catalog.initial_vehicle_stock {
        if !catalog.tech_vehicles.contains_key(&record.tech_vehicle) {
            Err(validation_err(format!(
                "Initial stock {} references unknown tech vehicle {}",
                record.id, record.tech_vehicle
            )))?;
        }
        if record.year_of_purchase >= scenario.base_year {
            Err(validation_err(format!(
                "Initial stock {} must pre-date the horizon (purchase year {})",
                record.id, record.year_of_purchase
            )))?;
        }
        if record.stock < 0.0 {
            Err(validation_err(format!(
                "Initial stock {} is negative",
                record.id
            )))?;
        }
        if !catalog.is_fleet_sized(record.tech_vehicle) {
            warn!(
                "Initial stock {} references tech vehicle {} of a levelized mode; ignored",
                record.id, record.tech_vehicle
            );
        }
    }

    for record in &catalog.initial_mode_infr {
        if !catalog.modes.contains_key(&record.mode) {
            Err(validation_err(format!(
                "Initial mode infrastructure {} references unknown mode {}",
                record.id, record.mode
            )))?;
        }
        check_element_known(catalog, record.element, "Initial mode infrastructure", record.id)?;
    }
    for record in &catalog.initial_fueling_infr {
        if !catalog.technologies.contains_key(&record.technology) {
            Err(validation_err(format!(
                "Initial fueling infrastructure {} references unknown technology {}",
                record.id, record.technology
            )))?;
        }
        check_element_known(catalog, record.element, "Initial fueling infrastructure", record.id)?;
    }

    Ok(())
}

fn check_element_known(
    catalog: &Catalog,
    element: GeoRef,
    what: &str,
    id: impl Display,
) -> Result<()> {
    let known = match element {
        GeoRef::Node(node) => catalog.nodes.contains_key(&node),
        GeoRef::Edge(edge) => catalog.edges.contains_key(&edge),
    };
    if !known {
        Err(validation_err(format!(
            "{what} {id} references unknown element {element}"
        )))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;

    /// A minimal valid case document: two nodes, one edge, one path, one odpair, one levelized
    /// mode over a two-year horizon.
    pub fn minimal_case() -> String {
        r#"
            [scenario]
            base_year = 2025
            num_years = 2
            discount_rate = 0.05

            [[nodes]]
            id = 1
            name = "north"
            carbon_price = [100.0, 100.0]

            [[nodes]]
            id = 2
            name = "south"
            carbon_price = [100.0, 100.0]

            [[edges]]
            id = 1
            name = "north-south"
            from = 1
            to = 2
            length = 150.0
            carbon_price = [100.0, 100.0]

            [[paths]]
            id = 1
            name = "direct"
            length = 150.0
            sequence = ["node:1", "edge:1", "node:2"]

            [[products]]
            id = 1
            name = "passenger"

            [[region_types]]
            id = 1
            name = "rural"
            speed = 80.0
            cost_var = [0.1, 0.1]
            cost_fix = [100.0, 100.0]

            [[financial_statuses]]
            id = 1
            name = "average"
            value_of_time = 8.0

            [[odpairs]]
            id = 1
            product = 1
            origin = 1
            destination = 2
            paths = [1]
            demand = [100.0, 100.0]
            financial_status = 1
            region_type = 1

            [[modes]]
            id = 1
            name = "rail"
            quantify_by_vehicles = false
            cost_per_ukm = [0.05, 0.05]
            emission_factor = [20.0, 20.0]
            infrastructure_expansion_cost = [1.0, 1.0]
            infrastructure_om_cost = [0.1, 0.1]
            waiting_time = [0.25, 0.25]

            [[vehicle_types]]
            id = 1
            name = "train"
            mode = 1
            product = 1

            [[fuels]]
            id = 1
            name = "electricity"
            emission_factor = 50.0
            cost_per_kwh = [0.2, 0.2]
            cost_per_kw = [500.0, 500.0]
            fueling_infrastructure_om_cost = [10.0, 10.0]

            [[technologies]]
            id = 1
            name = "electric"
            fuel = 1

            [[tech_vehicles]]
            id = 1
            name = "electric train"
            vehicle_type = 1
            technology = 1
            capital_cost = [1000000.0, 1000000.0]
            maintenance_cost = [10000.0, 10000.0]
            load_capacity = 300.0
            spec_consumption = [10.0, 10.0]
            lifetime = 30
            annual_range = 150000.0
            battery_capacity = 0.0
            peak_charging = 0.0
        "#
        .to_string()
    }

    #[test]
    fn test_parse_minimal_case() {
        let catalog = parse_case(&minimal_case()).unwrap();
        assert_eq!(catalog.nodes.len(), 2);
        assert_eq!(catalog.odpairs.len(), 1);
        assert_eq!(catalog.scenario.num_years, 2);
    }

    #[test]
    fn test_missing_top_level_key() {
        let text = minimal_case().replace("[[odpairs]]", "[[odpairs_zzz]]");
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_duplicate_id() {
        let text = minimal_case().replace(
            "[[nodes]]\n            id = 2",
            "[[nodes]]\n            id = 1",
        );
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
        assert!(err.to_string().contains("Duplicate node ID 1"));
    }

    #[test]
    fn test_dangling_reference() {
        let text = minimal_case().replace("fuel = 1", "fuel = 9");
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
        assert!(err.to_string().contains("unknown fuel 9"));
    }

    #[test]
    fn test_malformed_walk() {
        let text =
            minimal_case().replace(r#"["node:1", "edge:1", "node:2"]"#, r#"["node:1", "node:2"]"#);
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_path_endpoints_must_match_odpair() {
        let text = minimal_case().replace(
            r#"["node:1", "edge:1", "node:2"]"#,
            r#"["node:2", "edge:1", "node:1"]"#,
        );
        let err = parse_case(&text).unwrap_err();
        assert!(err.to_string().contains("endpoints do not match"));
    }

    #[test]
    fn test_wrong_per_year_array_length() {
        let text = minimal_case().replace("demand = [100.0, 100.0]", "demand = [100.0]");
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
        assert!(err.to_string().contains("demand of odpair 1"));
    }

    #[test]
    fn test_disconnected_odpair() {
        // Point the edge back at node 1: node 2 becomes unreachable
        let text = minimal_case().replace("to = 2", "to = 1").replace(
            r#"sequence = ["node:1", "edge:1", "node:2"]"#,
            r#"sequence = ["node:1", "edge:1", "node:1"]"#,
        );
        let err = parse_case(&text).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
        assert!(err.to_string().contains("not connected"));
    }

    #[test]
    fn test_share_constraint_is_parsed() {
        let text = format!(
            "{}\n{}",
            minimal_case(),
            r#"
            [[share_constraints]]
            id = 1
            target = "mode"
            target_id = 1
            sense = "max"
            share = 0.5
            "#
        );
        let catalog = parse_case(&text).unwrap();
        assert_eq!(catalog.share_constraints.len(), 1);
        assert_eq!(
            catalog.share_constraints[0].target,
            ShareTarget::Mode(crate::mode::ModeId(1))
        );
        assert_eq!(catalog.share_constraints[0].sense, ShareSense::Max);
    }

    #[test]
    fn test_share_constraint_bad_sense() {
        let text = format!(
            "{}\n{}",
            minimal_case(),
            r#"
            [[share_constraints]]
            id = 1
            target = "mode"
            target_id = 1
            sense = "atmost"
            share = 0.5
            "#
        );
        let err = parse_case(&text).unwrap_err();
        assert!(err.to_string().contains("unknown sense"));
    }

    #[test]
    fn test_initial_stock_must_predate_horizon() {
        let text = format!(
            "{}\n{}",
            minimal_case(),
            r#"
            [[initial_vehicle_stock]]
            id = 1
            tech_vehicle = 1
            year_of_purchase = 2025
            stock = 10.0
            "#
        );
        let err = parse_case(&text).unwrap_err();
        assert!(err.to_string().contains("must pre-date the horizon"));
    }
}
