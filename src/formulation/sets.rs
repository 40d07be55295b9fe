//! Derivation of the sparse index sets that scope decision variables and constraints.
//!
//! Each set is built in a single pass by a filtered join on matching foreign IDs; the full
//! Cartesian product of entity sets is never materialised. Iteration order over the produced
//! sets is stable between runs with identical input, so generated constraints are reproducible.
use crate::catalog::Catalog;
use crate::demand::{OdpairId, ProductId};
use crate::error::ModelError;
use crate::mode::ModeId;
use crate::network::{EdgeId, NodeId, PathElement, PathId};
use crate::policy::GeoRef;
use crate::vehicle::{TechVehicleId, TechnologyId};
use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use log::warn;

/// The combinatorial key tuples needed by variables and constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSets {
    /// `(odpair, path)` for every candidate path
    pub odpair_paths: Vec<(OdpairId, PathId)>,
    /// `(product, odpair, path)` for every product offered on every path of every odpair
    pub trips: Vec<(ProductId, OdpairId, PathId)>,
    /// Every trip expanded to its passed-through nodes
    pub trip_nodes: Vec<(ProductId, OdpairId, PathId, NodeId)>,
    /// Every trip expanded to its traversed edges
    pub trip_edges: Vec<(ProductId, OdpairId, PathId, EdgeId)>,
    /// Valid `(mode, techvehicle)` combinations, via the vehicle type's mode
    pub mode_tech_vehicles: Vec<(ModeId, TechVehicleId)>,
    /// Every trip paired with each tech vehicle eligible for its product
    pub trip_vehicles: Vec<(ProductId, OdpairId, PathId, TechVehicleId)>,
    /// Still-alive purchase-year cohorts per fleet-sized tech vehicle, ascending
    pub vintages: IndexMap<TechVehicleId, Vec<u32>>,
    /// Elements traversed by levelized-mode trips, paired with the mode
    pub mode_infra: Vec<(GeoRef, ModeId)>,
    /// Elements traversed by fleet-sized-mode trips, paired with the drivetrain technology
    pub fueling: Vec<(GeoRef, TechnologyId)>,
}

impl IndexSets {
    /// Derive all index sets from the catalog.
    ///
    /// # Errors
    ///
    /// A required join yielding zero members (an odpair with no path, a product no tech vehicle
    /// can carry, a mode with no tech vehicle) is a formulation error naming the offending
    /// entity; formulation never proceeds with an empty constraint.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let mode_tech_vehicles = build_mode_tech_vehicles(catalog)?;
        let (odpair_paths, trips, trip_vehicles) = build_trip_sets(catalog)?;
        let (trip_nodes, trip_edges) = expand_trip_elements(catalog, &trips);
        let vintages = build_vintages(catalog);
        let (mode_infra, fueling) = build_infrastructure_keys(catalog, &trip_vehicles);

        Ok(IndexSets {
            odpair_paths,
            trips,
            trip_nodes,
            trip_edges,
            mode_tech_vehicles,
            trip_vehicles,
            vintages,
            mode_infra,
            fueling,
        })
    }
}

/// Pair every mode with the tech vehicles whose vehicle type belongs to it.
fn build_mode_tech_vehicles(catalog: &Catalog) -> Result<Vec<(ModeId, TechVehicleId)>> {
    let mut pairs = Vec::new();
    for mode_id in catalog.modes.keys() {
        let start = pairs.len();
        for tv_id in catalog.tech_vehicles.keys() {
            if catalog.mode_of(*tv_id) == *mode_id {
                pairs.push((*mode_id, *tv_id));
            }
        }
        if pairs.len() == start {
            Err(ModelError::Formulation(format!(
                "Mode {mode_id} has no tech vehicle"
            )))?;
        }
    }

    Ok(pairs)
}

/// Build the path universe, the trip set and the trip-vehicle set in one pass over the odpairs.
#[allow(clippy::type_complexity)]
fn build_trip_sets(
    catalog: &Catalog,
) -> Result<(
    Vec<(OdpairId, PathId)>,
    Vec<(ProductId, OdpairId, PathId)>,
    Vec<(ProductId, OdpairId, PathId, TechVehicleId)>,
)> {
    let mut odpair_paths = Vec::new();
    let mut trips = Vec::new();
    let mut trip_vehicles = Vec::new();

    for odpair in catalog.odpairs.values() {
        if odpair.paths.is_empty() {
            Err(ModelError::Formulation(format!(
                "Odpair {} has no path",
                odpair.id
            )))?;
        }

        let vehicles: Vec<_> = catalog
            .tech_vehicles
            .keys()
            .copied()
            .filter(|tv| catalog.product_of(*tv) == odpair.product)
            .collect();
        if vehicles.is_empty() {
            Err(ModelError::Formulation(format!(
                "No tech vehicle is eligible for product {} of odpair {}",
                odpair.product, odpair.id
            )))?;
        }

        for path_id in &odpair.paths {
            odpair_paths.push((odpair.id, *path_id));
            trips.push((odpair.product, odpair.id, *path_id));
            for tv_id in &vehicles {
                trip_vehicles.push((odpair.product, odpair.id, *path_id, *tv_id));
            }
        }
    }

    Ok((odpair_paths, trips, trip_vehicles))
}

/// Expand each trip into its constituent passed-through nodes and traversed edges.
#[allow(clippy::type_complexity)]
fn expand_trip_elements(
    catalog: &Catalog,
    trips: &[(ProductId, OdpairId, PathId)],
) -> (
    Vec<(ProductId, OdpairId, PathId, NodeId)>,
    Vec<(ProductId, OdpairId, PathId, EdgeId)>,
) {
    let mut trip_nodes = Vec::new();
    let mut trip_edges = Vec::new();

    for (product, odpair, path_id) in trips {
        for element in &catalog.paths[path_id].sequence {
            match element {
                PathElement::Node(id) => trip_nodes.push((*product, *odpair, *path_id, *id)),
                PathElement::Edge(id) => trip_edges.push((*product, *odpair, *path_id, *id)),
            }
        }
    }

    (trip_nodes, trip_edges)
}

/// The still-alive purchase-year cohorts per fleet-sized tech vehicle.
///
/// Every horizon year is a vintage; pre-horizon vintages are included only where an initial
/// stock record makes the cohort nonzero. Cohorts already beyond their lifetime at the start of
/// the horizon are dropped with a warning.
fn build_vintages(catalog: &Catalog) -> IndexMap<TechVehicleId, Vec<u32>> {
    let base_year = catalog.scenario.base_year;
    let mut vintages = IndexMap::new();

    for (tv_id, tv) in &catalog.tech_vehicles {
        if !catalog.is_fleet_sized(*tv_id) {
            continue;
        }

        let mut cohorts = IndexSet::new();
        for record in catalog
            .initial_vehicle_stock
            .iter()
            .filter(|r| r.tech_vehicle == *tv_id && r.year_of_purchase < base_year)
        {
            if base_year - record.year_of_purchase >= tv.lifetime {
                warn!(
                    "Initial stock record {} for tech vehicle {tv_id} is beyond its lifetime; ignoring",
                    record.id
                );
                continue;
            }
            cohorts.insert(record.year_of_purchase);
        }
        cohorts.extend(catalog.scenario.years());

        let mut cohorts: Vec<_> = cohorts.into_iter().collect();
        cohorts.sort_unstable();
        vintages.insert(*tv_id, cohorts);
    }

    vintages
}

/// Collect the `(element, mode)` and `(element, technology)` key sets for infrastructure
/// sizing from the trips that actually traverse each element.
fn build_infrastructure_keys(
    catalog: &Catalog,
    trip_vehicles: &[(ProductId, OdpairId, PathId, TechVehicleId)],
) -> (Vec<(GeoRef, ModeId)>, Vec<(GeoRef, TechnologyId)>) {
    let mut mode_infra = IndexSet::new();
    let mut fueling = IndexSet::new();

    for (_, _, path_id, tv_id) in trip_vehicles {
        let mode = catalog.mode_of(*tv_id);
        let fleet_sized = catalog.modes[&mode].quantify_by_vehicles;
        let technology = catalog.tech_vehicles[tv_id].technology;

        for element in &catalog.paths[path_id].sequence {
            let element = GeoRef::from(*element);
            if fleet_sized {
                fueling.insert((element, technology));
            } else {
                mode_infra.insert((element, mode));
            }
        }
    }

    (
        mode_infra.into_iter().collect(),
        fueling.into_iter().collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{catalog, catalog_with_two_modes};
    use rstest::rstest;

    #[rstest]
    fn test_build_is_deterministic(catalog: Catalog) {
        let first = IndexSets::build(&catalog).unwrap();
        let second = IndexSets::build(&catalog).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_trip_sets(catalog: Catalog) {
        let sets = IndexSets::build(&catalog).unwrap();
        assert_eq!(sets.trips.len(), 1);
        assert_eq!(sets.odpair_paths.len(), 1);
        // One eligible tech vehicle for the single product
        assert_eq!(sets.trip_vehicles.len(), 1);
        // The single path passes through two nodes and one edge
        assert_eq!(sets.trip_nodes.len(), 2);
        assert_eq!(sets.trip_edges.len(), 1);
    }

    #[rstest]
    fn test_two_modes_yield_two_trip_vehicles(catalog_with_two_modes: Catalog) {
        let sets = IndexSets::build(&catalog_with_two_modes).unwrap();
        assert_eq!(sets.mode_tech_vehicles.len(), 2);
        assert_eq!(sets.trip_vehicles.len(), 2);
    }

    #[rstest]
    fn test_sets_reference_only_catalog_ids(catalog_with_two_modes: Catalog) {
        let catalog = catalog_with_two_modes;
        let sets = IndexSets::build(&catalog).unwrap();
        for (product, odpair, path) in &sets.trips {
            assert!(catalog.products.contains_key(product));
            assert!(catalog.odpairs.contains_key(odpair));
            assert!(catalog.paths.contains_key(path));
        }
        for (mode, tech_vehicle) in &sets.mode_tech_vehicles {
            assert!(catalog.modes.contains_key(mode));
            assert!(catalog.tech_vehicles.contains_key(tech_vehicle));
        }
        for (_, _, _, node) in &sets.trip_nodes {
            assert!(catalog.nodes.contains_key(node));
        }
        for (_, _, _, edge) in &sets.trip_edges {
            assert!(catalog.edges.contains_key(edge));
        }
    }

    #[rstest]
    fn test_odpair_without_path_is_rejected(mut catalog: Catalog) {
        catalog.odpairs.values_mut().next().unwrap().paths.clear();
        let err = IndexSets::build(&catalog).unwrap_err();
        assert!(err.to_string().contains("has no path"));
        assert_eq!(crate::error::exit_code_for(&err), 3);
    }

    #[rstest]
    fn test_vintages_only_for_fleet_sized(catalog: Catalog) {
        // The fixture's only mode is levelized, so no vintages are derived
        let sets = IndexSets::build(&catalog).unwrap();
        assert!(sets.vintages.is_empty());
        assert!(sets.fueling.is_empty());
        assert!(!sets.mode_infra.is_empty());
    }
}
