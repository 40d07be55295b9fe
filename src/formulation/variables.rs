//! Declaration of the decision variables over the derived index sets.
//!
//! Every variable is nonnegative continuous. Bounds come only from entity data: initial-stock
//! records fix the start-of-horizon value of the corresponding cohort variables. No variable is
//! created outside an index set that needs it.
use crate::catalog::Catalog;
use crate::demand::{OdpairId, ProductId};
use crate::formulation::sets::IndexSets;
use crate::mode::ModeId;
use crate::network::PathId;
use crate::policy::GeoRef;
use crate::solver::{ProblemBuilder, VarId};
use crate::vehicle::{TechVehicleId, TechnologyId};
use indexmap::IndexMap;

/// Key of a flow variable: demand routed on a path with a tech vehicle in a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// The transported product
    pub product: ProductId,
    /// The demand relation
    pub odpair: OdpairId,
    /// The path the flow is routed on
    pub path: PathId,
    /// The vehicle carrying the flow
    pub tech_vehicle: TechVehicleId,
    /// The horizon year
    pub year: u32,
}

/// Key of a fleet-stock variable: a purchase-year cohort observed in a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StockKey {
    /// The tech vehicle the cohort consists of
    pub tech_vehicle: TechVehicleId,
    /// The cohort's purchase year
    pub vintage: u32,
    /// The observed year (`vintage <= year < vintage + lifetime`)
    pub year: u32,
}

/// Key of a new-purchase variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PurchaseKey {
    /// The purchased tech vehicle
    pub tech_vehicle: TechVehicleId,
    /// The purchase year
    pub year: u32,
}

/// Key of a mode-infrastructure expansion variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeInfraKey {
    /// The element the capacity is installed at
    pub element: GeoRef,
    /// The mode the capacity serves
    pub mode: ModeId,
    /// The year the capacity is added
    pub year: u32,
}

/// Key of a fueling-infrastructure expansion variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuelingInfraKey {
    /// The element the capacity is installed at
    pub element: GeoRef,
    /// The technology the capacity fuels
    pub technology: TechnologyId,
    /// The year the capacity is added
    pub year: u32,
}

/// Key of a fueling-demand aggregation variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuelingDemandKey {
    /// The element the energy is drawn at
    pub element: GeoRef,
    /// The drawing technology
    pub technology: TechnologyId,
    /// The horizon year
    pub year: u32,
}

/// All decision variables, keyed by the parameter combination each corresponds to.
///
/// The entries of each map are ordered (insertion order follows the index sets), which keeps
/// constraint generation and result export reproducible.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    /// Flow variables
    pub flow: IndexMap<FlowKey, VarId>,
    /// Fleet-stock variables
    pub stock: IndexMap<StockKey, VarId>,
    /// New-purchase variables
    pub purchase: IndexMap<PurchaseKey, VarId>,
    /// Mode-infrastructure expansion variables
    pub mode_expansion: IndexMap<ModeInfraKey, VarId>,
    /// Fueling-infrastructure expansion variables
    pub fueling_expansion: IndexMap<FuelingInfraKey, VarId>,
    /// Fueling-demand aggregation variables
    pub fueling_demand: IndexMap<FuelingDemandKey, VarId>,
}

/// Declare one variable per index-set member.
pub fn define_variables(
    catalog: &Catalog,
    sets: &IndexSets,
    problem: &mut ProblemBuilder,
) -> VariableRegistry {
    let mut registry = VariableRegistry::default();
    let base_year = catalog.scenario.base_year;

    for (product, odpair, path, tech_vehicle) in &sets.trip_vehicles {
        for year in catalog.scenario.years() {
            let key = FlowKey {
                product: *product,
                odpair: *odpair,
                path: *path,
                tech_vehicle: *tech_vehicle,
                year,
            };
            let var = problem.declare_variable(0.0, f64::INFINITY);
            let existing = registry.flow.insert(key, var).is_some();
            assert!(!existing, "Duplicate flow variable");
        }
    }

    for (tech_vehicle, cohorts) in &sets.vintages {
        let lifetime = catalog.tech_vehicles[tech_vehicle].lifetime;
        for vintage in cohorts {
            for year in catalog.scenario.years() {
                if year < *vintage || year - vintage >= lifetime {
                    continue;
                }
                let key = StockKey {
                    tech_vehicle: *tech_vehicle,
                    vintage: *vintage,
                    year,
                };

                // Initial-stock records pin the start-of-horizon value of pre-horizon cohorts
                let var = if *vintage < base_year && year == base_year {
                    let initial = catalog.initial_stock(*tech_vehicle, *vintage);
                    problem.declare_variable(initial, initial)
                } else {
                    problem.declare_variable(0.0, f64::INFINITY)
                };
                registry.stock.insert(key, var);
            }
        }
    }

    for tech_vehicle in sets.vintages.keys() {
        for year in catalog.scenario.years() {
            let key = PurchaseKey {
                tech_vehicle: *tech_vehicle,
                year,
            };
            let var = problem.declare_variable(0.0, f64::INFINITY);
            registry.purchase.insert(key, var);
        }
    }

    for (element, mode) in &sets.mode_infra {
        for year in catalog.scenario.years() {
            let key = ModeInfraKey {
                element: *element,
                mode: *mode,
                year,
            };
            let var = problem.declare_variable(0.0, f64::INFINITY);
            registry.mode_expansion.insert(key, var);
        }
    }

    for (element, technology) in &sets.fueling {
        for year in catalog.scenario.years() {
            let expansion = FuelingInfraKey {
                element: *element,
                technology: *technology,
                year,
            };
            let var = problem.declare_variable(0.0, f64::INFINITY);
            registry.fueling_expansion.insert(expansion, var);
        }
    }

    for (element, technology) in &sets.fueling {
        for year in catalog.scenario.years() {
            let key = FuelingDemandKey {
                element: *element,
                technology: *technology,
                year,
            };
            let var = problem.declare_variable(0.0, f64::INFINITY);
            registry.fueling_demand.insert(key, var);
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{catalog, catalog_with_fleet_mode};
    use rstest::rstest;

    #[rstest]
    fn test_levelized_catalog_has_no_fleet_variables(catalog: Catalog) {
        let sets = IndexSets::build(&catalog).unwrap();
        let mut problem = ProblemBuilder::new();
        let registry = define_variables(&catalog, &sets, &mut problem);

        // 1 trip vehicle x 2 years
        assert_eq!(registry.flow.len(), 2);
        assert!(registry.stock.is_empty());
        assert!(registry.purchase.is_empty());
        assert!(registry.fueling_expansion.is_empty());
        // 3 traversed elements x 1 mode x 2 years
        assert_eq!(registry.mode_expansion.len(), 6);
        assert_eq!(problem.num_variables(), 8);
    }

    #[rstest]
    fn test_fleet_catalog_declares_stock_and_purchases(catalog_with_fleet_mode: Catalog) {
        let catalog = catalog_with_fleet_mode;
        let sets = IndexSets::build(&catalog).unwrap();
        let mut problem = ProblemBuilder::new();
        let registry = define_variables(&catalog, &sets, &mut problem);

        assert!(!registry.stock.is_empty());
        // One purchase variable per horizon year
        assert_eq!(registry.purchase.len(), 2);
        // Fueling infrastructure and demand at the 3 traversed elements over 2 years
        assert_eq!(registry.fueling_expansion.len(), 6);
        assert_eq!(registry.fueling_demand.len(), 6);
        assert!(registry.mode_expansion.is_empty());

        // Stock variables only exist while the cohort is alive
        for key in registry.stock.keys() {
            let lifetime = catalog.tech_vehicles[&key.tech_vehicle].lifetime;
            assert!(key.year >= key.vintage);
            assert!(key.year - key.vintage < lifetime);
        }
    }
}
