//! Assembly of the discounted multi-year cost objective.
//!
//! The objective sums, per year and discounted at the scenario rate: net vehicle purchase cost,
//! maintenance on live stock, operational flow costs (fuel, region-type variable/fixed and
//! levelized per-km costs), generalized travel-time cost, carbon cost priced along each path,
//! and infrastructure expansion plus operation and maintenance.
use crate::catalog::Catalog;
use crate::formulation::costs;
use crate::formulation::variables::VariableRegistry;
use crate::solver::{LinearExpr, ProblemBuilder};

/// Set the objective coefficients for all declared variables.
pub fn build_objective(catalog: &Catalog, vars: &VariableRegistry, problem: &mut ProblemBuilder) {
    let scenario = &catalog.scenario;
    let mut expr = LinearExpr::new();

    for (key, var) in &vars.flow {
        let per_unit = costs::operational_cost_per_unit(catalog, key)
            + costs::time_cost_per_unit(catalog, key)
            + costs::carbon_cost_per_unit(catalog, key);
        expr.add_term(*var, scenario.discount_factor(key.year) * per_unit);
    }

    for (key, var) in &vars.purchase {
        let cost = catalog.net_capital_cost(key.tech_vehicle, key.year);
        expr.add_term(*var, scenario.discount_factor(key.year) * cost);
    }

    for (key, var) in &vars.stock {
        let tv = &catalog.tech_vehicles[&key.tech_vehicle];
        let maintenance = tv.maintenance_cost[scenario.year_index(key.year)];
        expr.add_term(*var, scenario.discount_factor(key.year) * maintenance);
    }

    // Capacity added in one year incurs its expansion cost once and O&M in every later year it
    // remains installed; O&M on initial infrastructure is a constant and is left out.
    for (key, var) in &vars.mode_expansion {
        let mode = &catalog.modes[&key.mode];
        let expansion =
            scenario.discount_factor(key.year) * mode.infrastructure_expansion_cost
                [scenario.year_index(key.year)];
        let om: f64 = scenario
            .years()
            .filter(|y| *y >= key.year)
            .map(|y| {
                scenario.discount_factor(y) * mode.infrastructure_om_cost[scenario.year_index(y)]
            })
            .sum();
        expr.add_term(*var, expansion + om);
    }

    for (key, var) in &vars.fueling_expansion {
        let fuel = &catalog.fuels[&catalog.technologies[&key.technology].fuel];
        let expansion = scenario.discount_factor(key.year)
            * fuel.cost_per_kw[scenario.year_index(key.year)];
        let om: f64 = scenario
            .years()
            .filter(|y| *y >= key.year)
            .map(|y| {
                scenario.discount_factor(y)
                    * fuel.fueling_infrastructure_om_cost[scenario.year_index(y)]
            })
            .sum();
        expr.add_term(*var, expansion + om);
    }

    problem.add_objective_terms(&expr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::catalog;
    use crate::formulation::sets::IndexSets;
    use crate::formulation::variables::define_variables;
    use crate::solver::{ConstraintFamily, Relation, SolveOptions, Sense};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    /// Fix the fixture's single-trip flow at the demand level and check the discounted
    /// objective against a hand calculation.
    #[rstest]
    fn test_objective_value_for_fixed_flow(catalog: Catalog) {
        let sets = IndexSets::build(&catalog).unwrap();
        let mut problem = ProblemBuilder::new();
        let vars = define_variables(&catalog, &sets, &mut problem);
        build_objective(&catalog, &vars, &mut problem);

        for (key, var) in &vars.flow {
            let demand =
                catalog.odpairs[&key.odpair].demand[catalog.scenario.year_index(key.year)];
            problem.add_constraint(
                ConstraintFamily::DemandCoverage,
                [(*var, 1.0)].into_iter().collect(),
                Relation::Equal,
                demand,
            );
        }

        let solution = problem
            .solve(Sense::Minimise, &SolveOptions::default())
            .unwrap();

        let expected: f64 = vars
            .flow
            .keys()
            .map(|key| {
                let demand =
                    catalog.odpairs[&key.odpair].demand[catalog.scenario.year_index(key.year)];
                let per_unit = costs::operational_cost_per_unit(&catalog, key)
                    + costs::time_cost_per_unit(&catalog, key)
                    + costs::carbon_cost_per_unit(&catalog, key);
                catalog.scenario.discount_factor(key.year) * per_unit * demand
            })
            .sum();
        assert_approx_eq!(f64, solution.objective_value(), expected, epsilon = 1e-4);
    }
}
