//! The constraint generators.
//!
//! Each family consumes the catalog, the relevant index sets and the variable registry, and
//! emits one row per tuple in its own derived key set. Families are generated in a fixed,
//! documented order — demand coverage, vehicle sizing, aging/turnover, shares, market shares,
//! shift rate, mode infrastructure, fueling demand, fueling infrastructure, emissions, budgets —
//! so diagnostics can report which family introduced infeasibility. A family whose
//! configuration records are absent emits nothing.
use crate::catalog::Catalog;
use crate::demand::{Odpair, OdpairId};
use crate::error::ModelError;
use crate::formulation::costs;
use crate::formulation::variables::{
    FlowKey, FuelingDemandKey, ModeInfraKey, PurchaseKey, VariableRegistry,
};
use crate::mode::ModeId;
use crate::policy::{GeoRef, MarketShareTarget, ShareConstraint, ShareSense, ShareTarget};
use crate::region::FinancialStatusId;
use crate::solver::{ConstraintFamily, LinearExpr, ProblemBuilder, Relation, VarId};
use crate::vehicle::{TechVehicleId, TechnologyId};
use anyhow::Result;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

/// Generate all constraint families in the documented order.
pub fn build_constraints(
    catalog: &Catalog,
    vars: &VariableRegistry,
    problem: &mut ProblemBuilder,
) -> Result<()> {
    demand_coverage(catalog, vars, problem);
    vehicle_sizing(catalog, vars, problem);
    vehicle_aging(catalog, vars, problem);
    flow_shares(catalog, vars, problem)?;
    purchase_market_shares(catalog, vars, problem)?;
    mode_shift_limit(catalog, vars, problem);
    mode_infrastructure(catalog, vars, problem);
    fueling_demand(catalog, vars, problem);
    fueling_infrastructure(catalog, vars, problem);
    emission_caps(catalog, vars, problem);
    monetary_budgets(catalog, vars, problem);

    Ok(())
}

/// For each odpair and year, flow summed across paths and vehicles equals demand exactly.
///
/// A hard equality with no slack: full demand satisfaction is guaranteed by construction, at the
/// cost of possible infeasibility elsewhere.
fn demand_coverage(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let mut rows: IndexMap<(OdpairId, u32), LinearExpr> = IndexMap::new();
    for (key, var) in &vars.flow {
        rows.entry((key.odpair, key.year))
            .or_default()
            .add_term(*var, 1.0);
    }

    for ((odpair, year), expr) in rows {
        let demand = catalog.odpairs[&odpair].demand[catalog.scenario.year_index(year)];
        problem.add_constraint(
            ConstraintFamily::DemandCoverage,
            expr,
            Relation::Equal,
            demand,
        );
    }
}

/// Fleet stock in use must suffice to carry the assigned flow: vehicle-km implied by flow may
/// not exceed the annual range of the live stock.
fn vehicle_sizing(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let stock_by_vehicle_year = group_stock_by_vehicle_year(vars);

    let mut rows: IndexMap<(TechVehicleId, u32), LinearExpr> = IndexMap::new();
    for (key, var) in &vars.flow {
        let vkm = costs::vehicle_km_per_unit(catalog, key);
        if vkm == 0.0 {
            continue;
        }
        rows.entry((key.tech_vehicle, key.year))
            .or_default()
            .add_term(*var, vkm);
    }

    for ((tech_vehicle, year), mut expr) in rows {
        let annual_range = catalog.tech_vehicles[&tech_vehicle].annual_range;
        if let Some(stock_vars) = stock_by_vehicle_year.get(&(tech_vehicle, year)) {
            for var in stock_vars {
                expr.add_term(*var, -annual_range);
            }
        }
        problem.add_constraint(
            ConstraintFamily::VehicleSizing,
            expr,
            Relation::LessEqual,
            0.0,
        );
    }
}

/// Cohort decay: stock from a vintage is driven by the depreciation factor.
///
/// Horizon cohorts follow their purchase variable; pre-horizon cohorts decay from the fixed
/// start-of-horizon value.
fn vehicle_aging(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let base_year = catalog.scenario.base_year;

    for (key, var) in &vars.stock {
        let tv = &catalog.tech_vehicles[&key.tech_vehicle];

        if key.vintage >= base_year {
            let factor = tv.depreciation_factor(key.year, key.vintage);
            let purchase = vars.purchase[&PurchaseKey {
                tech_vehicle: key.tech_vehicle,
                year: key.vintage,
            }];
            let expr = [(*var, 1.0), (purchase, -factor)].into_iter().collect();
            problem.add_constraint(ConstraintFamily::VehicleAging, expr, Relation::Equal, 0.0);
        } else if key.year > base_year {
            // The base-year value is pinned by the variable's bounds
            let initial = catalog.initial_stock(key.tech_vehicle, key.vintage);
            let factor_now = tv.depreciation_factor(key.year, key.vintage);
            let factor_base = tv.depreciation_factor(base_year, key.vintage);
            let expr = [(*var, 1.0)].into_iter().collect();
            problem.add_constraint(
                ConstraintFamily::VehicleAging,
                expr,
                Relation::Equal,
                initial * factor_now / factor_base,
            );
        }
    }
}

/// Whether an odpair falls within a share constraint's scoping sets.
fn in_scope(constraint: &ShareConstraint, odpair: &Odpair) -> bool {
    (constraint.financial_status.is_empty()
        || constraint.financial_status.contains(&odpair.financial_status))
        && (constraint.region_type.is_empty()
            || constraint.region_type.contains(&odpair.region_type))
}

/// Flow share bounds: within the scoped odpairs, flow attributable to the constrained entity
/// must lie within the configured share of total scoped demand.
///
/// Totals are constants because demand coverage is an equality. These rows are a documented
/// potential source of infeasibility and are never relaxed here.
fn flow_shares(
    catalog: &Catalog,
    vars: &VariableRegistry,
    problem: &mut ProblemBuilder,
) -> Result<()> {
    for constraint in &catalog.share_constraints {
        let years: Vec<u32> = match constraint.year {
            Some(year) => vec![year],
            None => catalog.scenario.years().collect(),
        };

        let matches_target = |tech_vehicle: TechVehicleId| match constraint.target {
            ShareTarget::Mode(id) => catalog.mode_of(tech_vehicle) == id,
            ShareTarget::Technology(id) => {
                catalog.tech_vehicles[&tech_vehicle].technology == id
            }
            ShareTarget::Vehicletype(id) => {
                catalog.tech_vehicles[&tech_vehicle].vehicle_type == id
            }
            ShareTarget::TechVehicle(id) => tech_vehicle == id,
        };

        let mut expr = LinearExpr::new();
        for (key, var) in &vars.flow {
            if years.contains(&key.year)
                && matches_target(key.tech_vehicle)
                && in_scope(constraint, &catalog.odpairs[&key.odpair])
            {
                expr.add_term(*var, 1.0);
            }
        }
        if expr.is_empty() {
            Err(ModelError::Formulation(format!(
                "Share constraint {} ({} {}) matches no flow variable",
                constraint.id, constraint.sense, constraint.target
            )))?;
        }

        let total: f64 = years
            .iter()
            .map(|year| catalog.total_demand(*year, |odpair| in_scope(constraint, odpair)))
            .sum();
        let relation = match constraint.sense {
            ShareSense::Min => Relation::GreaterEqual,
            ShareSense::Max => Relation::LessEqual,
        };
        problem.add_constraint(
            ConstraintFamily::Share,
            expr,
            relation,
            constraint.share * total,
        );
    }

    Ok(())
}

/// Market share of new purchases: the share of newly purchased vehicles (not total stock)
/// attributable to the target must respect the bound in each covered year.
fn purchase_market_shares(
    catalog: &Catalog,
    vars: &VariableRegistry,
    problem: &mut ProblemBuilder,
) -> Result<()> {
    for constraint in &catalog.market_share_constraints {
        let years: Vec<u32> = match constraint.year {
            Some(year) => vec![year],
            None => catalog.scenario.years().collect(),
        };

        for year in years {
            let mut expr = LinearExpr::new();
            let mut any_target = false;
            for (key, var) in &vars.purchase {
                if key.year != year {
                    continue;
                }
                let in_target = match constraint.target {
                    MarketShareTarget::Mode(id) => catalog.mode_of(key.tech_vehicle) == id,
                    MarketShareTarget::TechVehicle(id) => key.tech_vehicle == id,
                };
                // target purchases minus share times all purchases
                let coefficient = if in_target {
                    any_target = true;
                    1.0 - constraint.share
                } else {
                    -constraint.share
                };
                expr.add_term(*var, coefficient);
            }
            if !any_target {
                Err(ModelError::Formulation(format!(
                    "Market share constraint {} ({}) matches no purchase variable",
                    constraint.id, constraint.target
                )))?;
            }

            let relation = match constraint.sense {
                ShareSense::Min => Relation::GreaterEqual,
                ShareSense::Max => Relation::LessEqual,
            };
            problem.add_constraint(ConstraintFamily::MarketShare, expr, relation, 0.0);
        }
    }

    Ok(())
}

/// Mode shift rate limit: the year-over-year change of every mode's flow share is bounded.
///
/// Shares are ratios of flow to the (constant) annual totals, so the bound is linearised by
/// cross-multiplying with the totals of the two years.
fn mode_shift_limit(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let Some(max_rate) = catalog.scenario.mode_shift_max_rate else {
        return;
    };

    let mut by_mode_year: IndexMap<(ModeId, u32), Vec<VarId>> = IndexMap::new();
    for (key, var) in &vars.flow {
        by_mode_year
            .entry((catalog.mode_of(key.tech_vehicle), key.year))
            .or_default()
            .push(*var);
    }

    for mode in catalog.modes.keys() {
        for (prev_year, year) in catalog.scenario.years().tuple_windows() {
            let total_prev = catalog.total_demand(prev_year, |_| true);
            let total = catalog.total_demand(year, |_| true);
            if total_prev <= 0.0 || total <= 0.0 {
                continue;
            }

            let mut expr = LinearExpr::new();
            for var in by_mode_year.get(&(*mode, year)).into_iter().flatten() {
                expr.add_term(*var, total_prev);
            }
            for var in by_mode_year.get(&(*mode, prev_year)).into_iter().flatten() {
                expr.add_term(*var, -total);
            }
            if expr.is_empty() {
                continue;
            }

            let bound = max_rate * total * total_prev;
            problem.add_range_constraint(ConstraintFamily::ModeShift, expr, -bound, bound);
        }
    }
}

/// Mode infrastructure sizing: installed capacity at each traversed element must cover the flow
/// routed through it, net of the initial baseline.
///
/// Applies to levelized modes; fleet-sized modes are covered by fueling infrastructure.
fn mode_infrastructure(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    // Cumulative expansions per (element, mode), in year order
    let mut expansions: IndexMap<(GeoRef, ModeId), Vec<(u32, VarId)>> = IndexMap::new();
    for (key, var) in &vars.mode_expansion {
        expansions
            .entry((key.element, key.mode))
            .or_default()
            .push((key.year, *var));
    }

    let mut usage: IndexMap<ModeInfraKey, LinearExpr> = IndexMap::new();
    for (key, var) in &vars.flow {
        let mode = catalog.mode_of(key.tech_vehicle);
        if catalog.modes[&mode].quantify_by_vehicles {
            continue;
        }
        for element in &catalog.paths[&key.path].sequence {
            usage
                .entry(ModeInfraKey {
                    element: GeoRef::from(*element),
                    mode,
                    year: key.year,
                })
                .or_default()
                .add_term(*var, 1.0);
        }
    }

    for (key, mut expr) in usage {
        for (year, var) in &expansions[&(key.element, key.mode)] {
            if *year <= key.year {
                expr.add_term(*var, -1.0);
            }
        }
        let initial: f64 = catalog
            .initial_mode_infr
            .iter()
            .filter(|r| r.element == key.element && r.mode == key.mode)
            .map(|r| r.installed)
            .sum();
        problem.add_constraint(
            ConstraintFamily::ModeInfrastructure,
            expr,
            Relation::LessEqual,
            initial,
        );
    }
}

/// Fueling demand aggregation: the energy drawn per element, technology and year equals the
/// energy the flows imply, with each path's draw split uniformly across its traversed elements.
fn fueling_demand(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let mut draw: IndexMap<FuelingDemandKey, LinearExpr> = IndexMap::new();
    for (key, var) in &vars.flow {
        let energy = costs::energy_per_unit(catalog, key);
        if energy == 0.0 {
            continue;
        }
        let path = &catalog.paths[&key.path];
        let per_element = energy / path.sequence.len() as f64;
        let technology = catalog.tech_vehicles[&key.tech_vehicle].technology;

        for element in &path.sequence {
            draw.entry(FuelingDemandKey {
                element: GeoRef::from(*element),
                technology,
                year: key.year,
            })
            .or_default()
            .add_term(*var, per_element);
        }
    }

    for (key, var) in &vars.fueling_demand {
        let mut expr = draw.swap_remove(key).unwrap_or_default();
        expr.add_term(*var, -1.0);
        problem.add_constraint(ConstraintFamily::FuelingDemand, expr, Relation::Equal, 0.0);
    }
}

/// Fueling infrastructure sizing: installed capacity (initial plus cumulative expansion),
/// converted to deliverable energy with the scenario's full-load hours, must cover the fueling
/// demand at each element.
fn fueling_infrastructure(
    catalog: &Catalog,
    vars: &VariableRegistry,
    problem: &mut ProblemBuilder,
) {
    let full_load_hours = catalog.scenario.fueling_full_load_hours;

    let mut expansions: IndexMap<(GeoRef, TechnologyId), Vec<(u32, VarId)>> = IndexMap::new();
    for (key, var) in &vars.fueling_expansion {
        expansions
            .entry((key.element, key.technology))
            .or_default()
            .push((key.year, *var));
    }

    for (key, demand_var) in &vars.fueling_demand {
        let mut expr = LinearExpr::new();
        expr.add_term(*demand_var, 1.0);
        for (year, var) in &expansions[&(key.element, key.technology)] {
            if *year <= key.year {
                expr.add_term(*var, -full_load_hours);
            }
        }

        let initial_kw: f64 = catalog
            .initial_fueling_infr
            .iter()
            .filter(|r| r.element == key.element && r.technology == key.technology)
            .map(|r| r.installed_kw)
            .sum();
        problem.add_constraint(
            ConstraintFamily::FuelingInfrastructure,
            expr,
            Relation::LessEqual,
            full_load_hours * initial_kw,
        );
    }
}

/// Emission caps: aggregate emissions per mode-year or system-year may not exceed the
/// configured cap.
fn emission_caps(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    for cap in &catalog.emission_caps_by_mode {
        let mut expr = LinearExpr::new();
        for (key, var) in &vars.flow {
            if key.year == cap.year && catalog.mode_of(key.tech_vehicle) == cap.mode {
                expr.add_term(*var, costs::emission_per_unit(catalog, key));
            }
        }
        if expr.is_empty() {
            debug!("Emission cap {} matches no flow; trivially satisfied", cap.id);
            continue;
        }
        problem.add_constraint(ConstraintFamily::Emissions, expr, Relation::LessEqual, cap.cap);
    }

    for cap in &catalog.emission_caps_by_year {
        let mut expr = LinearExpr::new();
        for (key, var) in &vars.flow {
            if key.year == cap.year {
                expr.add_term(*var, costs::emission_per_unit(catalog, key));
            }
        }
        if expr.is_empty() {
            debug!("Emission cap {} matches no flow; trivially satisfied", cap.id);
            continue;
        }
        problem.add_constraint(ConstraintFamily::Emissions, expr, Relation::LessEqual, cap.cap);
    }
}

/// Monetary budgets: per financial status and year, operational and purchase spending of the
/// scoped flows must respect the configured bounds.
fn monetary_budgets(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    for status in catalog.financial_statuses.values() {
        let has_operational =
            status.operational_budget_lb.is_some() || status.operational_budget_ub.is_some();
        let has_purchase =
            status.purchase_budget_lb.is_some() || status.purchase_budget_ub.is_some();
        if !has_operational && !has_purchase {
            continue;
        }

        for year in catalog.scenario.years() {
            if has_operational {
                let expr = spending_expr(catalog, vars, status.id, year, costs::operational_cost_per_unit);
                if !expr.is_empty() {
                    problem.add_range_constraint(
                        ConstraintFamily::Budget,
                        expr,
                        status.operational_budget_lb.unwrap_or(f64::NEG_INFINITY),
                        status.operational_budget_ub.unwrap_or(f64::INFINITY),
                    );
                }
            }
            if has_purchase {
                let expr = spending_expr(catalog, vars, status.id, year, costs::purchase_cost_per_unit);
                if !expr.is_empty() {
                    problem.add_range_constraint(
                        ConstraintFamily::Budget,
                        expr,
                        status.purchase_budget_lb.unwrap_or(f64::NEG_INFINITY),
                        status.purchase_budget_ub.unwrap_or(f64::INFINITY),
                    );
                }
            }
        }
    }
}

/// Sum a per-unit cost over the flows of one financial status in one year.
fn spending_expr(
    catalog: &Catalog,
    vars: &VariableRegistry,
    status: FinancialStatusId,
    year: u32,
    cost_per_unit: fn(&Catalog, &FlowKey) -> f64,
) -> LinearExpr {
    let mut expr = LinearExpr::new();
    for (key, var) in &vars.flow {
        if key.year != year || catalog.odpairs[&key.odpair].financial_status != status {
            continue;
        }
        let cost = cost_per_unit(catalog, key);
        if cost != 0.0 {
            expr.add_term(*var, cost);
        }
    }
    expr
}

/// Group live stock variables by tech vehicle and observed year.
fn group_stock_by_vehicle_year(
    vars: &VariableRegistry,
) -> IndexMap<(TechVehicleId, u32), Vec<VarId>> {
    let mut grouped: IndexMap<(TechVehicleId, u32), Vec<VarId>> = IndexMap::new();
    for (key, var) in &vars.stock {
        grouped
            .entry((key.tech_vehicle, key.year))
            .or_default()
            .push(*var);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{catalog, catalog_with_fleet_mode, catalog_with_two_modes};
    use crate::formulation::sets::IndexSets;
    use crate::formulation::variables::define_variables;
    use crate::policy::{ShareConstraintId, ShareTarget};
    use rstest::rstest;

    fn formulated(catalog: &Catalog) -> (VariableRegistry, ProblemBuilder) {
        let sets = IndexSets::build(catalog).unwrap();
        let mut problem = ProblemBuilder::new();
        let vars = define_variables(catalog, &sets, &mut problem);
        build_constraints(catalog, &vars, &mut problem).unwrap();
        (vars, problem)
    }

    #[rstest]
    fn test_demand_coverage_row_per_odpair_year(catalog: Catalog) {
        let (_, problem) = formulated(&catalog);
        // 1 odpair x 2 years
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::DemandCoverage),
            2
        );
    }

    #[rstest]
    fn test_no_fleet_families_for_levelized_catalog(catalog: Catalog) {
        let (_, problem) = formulated(&catalog);
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::VehicleSizing),
            0
        );
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::VehicleAging),
            0
        );
        // 3 elements x 2 years of mode infrastructure
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::ModeInfrastructure),
            6
        );
    }

    #[rstest]
    fn test_fleet_catalog_builds_sizing_aging_and_fueling(catalog_with_fleet_mode: Catalog) {
        let (vars, problem) = formulated(&catalog_with_fleet_mode);
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::VehicleSizing),
            2
        );
        // One aging row per stock variable from a horizon vintage
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::VehicleAging),
            vars.stock.len()
        );
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::FuelingDemand),
            vars.fueling_demand.len()
        );
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::FuelingInfrastructure),
            vars.fueling_demand.len()
        );
    }

    #[rstest]
    fn test_empty_config_families_are_noops(catalog: Catalog) {
        let (_, problem) = formulated(&catalog);
        for family in [
            ConstraintFamily::Share,
            ConstraintFamily::MarketShare,
            ConstraintFamily::ModeShift,
            ConstraintFamily::Emissions,
            ConstraintFamily::Budget,
        ] {
            assert_eq!(problem.num_constraints_in_family(family), 0);
        }
    }

    #[rstest]
    fn test_share_constraint_rows(catalog_with_two_modes: Catalog) {
        let mut catalog = catalog_with_two_modes;
        catalog.share_constraints.push(ShareConstraint {
            id: ShareConstraintId(1),
            target: ShareTarget::Mode(crate::mode::ModeId(1)),
            sense: ShareSense::Max,
            share: 0.5,
            year: None,
            financial_status: vec![],
            region_type: vec![],
        });

        let (_, problem) = formulated(&catalog);
        assert_eq!(problem.num_constraints_in_family(ConstraintFamily::Share), 1);
    }

    #[rstest]
    fn test_share_constraint_matching_nothing_is_an_error(catalog: Catalog) {
        let mut catalog = catalog;
        catalog.share_constraints.push(ShareConstraint {
            id: ShareConstraintId(9),
            target: ShareTarget::Mode(crate::mode::ModeId(99)),
            sense: ShareSense::Min,
            share: 0.5,
            year: None,
            financial_status: vec![],
            region_type: vec![],
        });

        let sets = IndexSets::build(&catalog).unwrap();
        let mut problem = ProblemBuilder::new();
        let vars = define_variables(&catalog, &sets, &mut problem);
        let err = build_constraints(&catalog, &vars, &mut problem).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 3);
    }

    #[rstest]
    fn test_mode_shift_rows(catalog_with_two_modes: Catalog) {
        let mut catalog = catalog_with_two_modes;
        catalog.scenario.mode_shift_max_rate = Some(0.1);
        let (_, problem) = formulated(&catalog);
        // 2 modes x 1 year transition
        assert_eq!(
            problem.num_constraints_in_family(ConstraintFamily::ModeShift),
            2
        );
    }
}
