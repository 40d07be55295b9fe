//! The model-formulation engine.
//!
//! Translates the entity catalog into index sets, decision variables, constraints and the
//! discounted objective, then hands the assembled system to the solving engine. A single
//! deterministic build pass with no backtracking: building twice from the same catalog produces
//! identical index sets, variables and constraints.
use crate::catalog::Catalog;
use crate::formulation::sets::IndexSets;
use crate::formulation::variables::{
    FlowKey, FuelingDemandKey, FuelingInfraKey, ModeInfraKey, PurchaseKey, StockKey,
    VariableRegistry,
};
use crate::solver::{ProblemBuilder, Sense, Solution, SolveOptions};
use anyhow::{Context, Result};
use log::info;

pub mod constraints;
pub mod costs;
pub mod objective;
pub mod sets;
pub mod variables;

/// A fully assembled variable/constraint/objective system, ready to solve.
pub struct FormulatedModel {
    /// The derived index sets
    pub sets: IndexSets,
    /// The declared decision variables
    pub variables: VariableRegistry,
    /// The assembled problem
    pub problem: ProblemBuilder,
}

/// Build the full optimization problem from the catalog.
///
/// Sequences index-set derivation, variable declaration, constraint generation and objective
/// assembly. Fails with a formulation error if a required index-set join is empty.
pub fn formulate(catalog: &Catalog) -> Result<FormulatedModel> {
    info!(
        "Formulating model: {} odpairs, {} paths, {} modes, {} tech vehicles, {} years",
        catalog.odpairs.len(),
        catalog.paths.len(),
        catalog.modes.len(),
        catalog.tech_vehicles.len(),
        catalog.scenario.num_years
    );

    let sets = IndexSets::build(catalog).context("Failed to derive index sets")?;
    let mut problem = ProblemBuilder::new();
    let variables = variables::define_variables(catalog, &sets, &mut problem);
    constraints::build_constraints(catalog, &variables, &mut problem)
        .context("Failed to build constraints")?;
    objective::build_objective(catalog, &variables, &mut problem);

    info!(
        "Formulated {} variables and {} constraints",
        problem.num_variables(),
        problem.num_constraints()
    );

    Ok(FormulatedModel {
        sets,
        variables,
        problem,
    })
}

impl FormulatedModel {
    /// Hand the assembled system to the solving engine and minimise total discounted cost.
    ///
    /// Blocks until the engine returns, bounded by the time limit in `options`. Infeasibility,
    /// unboundedness and engine failures surface as structured errors; nothing is retried.
    pub fn solve(self, options: &SolveOptions) -> Result<SolvedModel> {
        let solution = self
            .problem
            .solve(Sense::Minimise, options)
            .context("Optimisation did not produce a solution")?;

        info!("Objective value: {:.4}", solution.objective_value());

        Ok(SolvedModel {
            variables: self.variables,
            solution,
        })
    }
}

/// A solved model: the variable registry zipped with the engine's values.
#[derive(Debug)]
pub struct SolvedModel {
    variables: VariableRegistry,
    solution: Solution,
}

impl SolvedModel {
    /// The objective value of the solution
    pub fn objective_value(&self) -> f64 {
        self.solution.objective_value()
    }

    /// Iterate over the solved flow values
    pub fn iter_flows(&self) -> impl Iterator<Item = (&FlowKey, f64)> {
        self.variables
            .flow
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Iterate over the solved fleet-stock values
    pub fn iter_stock(&self) -> impl Iterator<Item = (&StockKey, f64)> {
        self.variables
            .stock
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Iterate over the solved new-purchase values
    pub fn iter_purchases(&self) -> impl Iterator<Item = (&PurchaseKey, f64)> {
        self.variables
            .purchase
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Iterate over the solved mode-infrastructure expansions
    pub fn iter_mode_expansion(&self) -> impl Iterator<Item = (&ModeInfraKey, f64)> {
        self.variables
            .mode_expansion
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Iterate over the solved fueling-infrastructure expansions
    pub fn iter_fueling_expansion(&self) -> impl Iterator<Item = (&FuelingInfraKey, f64)> {
        self.variables
            .fueling_expansion
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Iterate over the solved fueling-demand values
    pub fn iter_fueling_demand(&self) -> impl Iterator<Item = (&FuelingDemandKey, f64)> {
        self.variables
            .fueling_demand
            .iter()
            .map(|(key, var)| (key, self.solution.get_value(*var)))
    }

    /// Total flow for one odpair in one year
    pub fn total_flow(&self, odpair: crate::demand::OdpairId, year: u32) -> f64 {
        self.iter_flows()
            .filter(|(key, _)| key.odpair == odpair && key.year == year)
            .map(|(_, value)| value)
            .sum()
    }
}
