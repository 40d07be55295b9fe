//! The interface to the external solving engine.
//!
//! The formulation layer is the sole producer of calls into this module: it declares variables,
//! adds constraint rows tagged with their family, sets the objective and finally hands the
//! problem to the HiGHS solver. Nothing here inspects the engine's internal algorithm.
use crate::error::ModelError;
use anyhow::Result;
pub use highs::Sense;
use highs::{HighsModelStatus, RowProblem};
use itertools::Itertools;

/// A decision variable in the problem.
///
/// This is a handle referring to a column of the problem, not the variable's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// The relation between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// expression == rhs
    Equal,
    /// expression <= rhs
    LessEqual,
    /// expression >= rhs
    GreaterEqual,
}

/// The constraint family a row belongs to.
///
/// Rows are tagged so that diagnostics can report which family introduced infeasibility. The
/// ordering of the variants matches the fixed order in which families are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ConstraintFamily {
    /// Flow across paths and vehicles must equal demand
    #[strum(to_string = "demand coverage")]
    DemandCoverage,
    /// Fleet stock must suffice for the assigned flow
    #[strum(to_string = "vehicle sizing")]
    VehicleSizing,
    /// Cohort decay and stock turnover
    #[strum(to_string = "vehicle aging")]
    VehicleAging,
    /// Flow share bounds
    #[strum(to_string = "share")]
    Share,
    /// New-purchase share bounds
    #[strum(to_string = "market share")]
    MarketShare,
    /// Year-over-year mode shift rate limit
    #[strum(to_string = "mode shift")]
    ModeShift,
    /// Mode infrastructure sizing
    #[strum(to_string = "mode infrastructure")]
    ModeInfrastructure,
    /// Fueling energy demand aggregation
    #[strum(to_string = "fueling demand")]
    FuelingDemand,
    /// Fueling infrastructure sizing
    #[strum(to_string = "fueling infrastructure")]
    FuelingInfrastructure,
    /// Emission caps
    #[strum(to_string = "emissions")]
    Emissions,
    /// Monetary budgets
    #[strum(to_string = "budget")]
    Budget,
}

impl ConstraintFamily {
    /// Whether this family is a documented potential source of infeasibility
    fn may_cause_infeasibility(self) -> bool {
        matches!(
            self,
            ConstraintFamily::Share
                | ConstraintFamily::MarketShare
                | ConstraintFamily::ModeShift
                | ConstraintFamily::Emissions
                | ConstraintFamily::Budget
        )
    }
}

/// A linear expression: a sum of coefficient-variable terms.
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    /// Create an empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term to the expression
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Whether the expression has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Bounds for a declared variable.
struct VariableDef {
    lower: f64,
    upper: f64,
}

/// One constraint row: family tag, bounds and terms.
struct Row {
    family: ConstraintFamily,
    lower: f64,
    upper: f64,
    terms: Vec<(VarId, f64)>,
}

/// Limits passed to the solving engine.
///
/// The optimise call may block for a long time; a time limit bounds it. On reaching a limit the
/// engine returns a status rather than crashing, and no retry happens here.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Wall-clock limit for the solve in seconds
    pub time_limit: Option<f64>,
    /// Relative gap tolerance at which the solve may stop
    pub gap_tolerance: Option<f64>,
    /// Dump engine output to the console
    pub verbose: bool,
}

/// An assembled variable/constraint/objective system, ready to be solved.
///
/// Variables are identified by [`VarId`] handles in declaration order, which is also the column
/// order of the problem handed to the engine, so results are reproducible between runs.
#[derive(Default)]
pub struct ProblemBuilder {
    variables: Vec<VariableDef>,
    objective: Vec<f64>,
    rows: Vec<Row>,
}

impl ProblemBuilder {
    /// Create an empty problem
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a nonnegative continuous variable with the given bounds.
    ///
    /// # Returns
    ///
    /// A handle referring to the new variable.
    pub fn declare_variable(&mut self, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef { lower, upper });
        self.objective.push(0.0);
        id
    }

    /// Add a constraint relating a linear expression to a right-hand side.
    pub fn add_constraint(
        &mut self,
        family: ConstraintFamily,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) {
        let (lower, upper) = match relation {
            Relation::Equal => (rhs, rhs),
            Relation::LessEqual => (f64::NEG_INFINITY, rhs),
            Relation::GreaterEqual => (rhs, f64::INFINITY),
        };
        self.rows.push(Row {
            family,
            lower,
            upper,
            terms: expr.terms,
        });
    }

    /// Add a constraint bounding a linear expression on both sides.
    pub fn add_range_constraint(
        &mut self,
        family: ConstraintFamily,
        expr: LinearExpr,
        lower: f64,
        upper: f64,
    ) {
        self.rows.push(Row {
            family,
            lower,
            upper,
            terms: expr.terms,
        });
    }

    /// Add the expression's coefficients to the objective.
    ///
    /// May be called repeatedly; coefficients for the same variable accumulate.
    pub fn add_objective_terms(&mut self, expr: &LinearExpr) {
        for (var, coefficient) in &expr.terms {
            self.objective[var.0] += coefficient;
        }
    }

    /// The number of declared variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The number of constraint rows
    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// The number of constraint rows belonging to `family`
    pub fn num_constraints_in_family(&self, family: ConstraintFamily) -> usize {
        self.rows.iter().filter(|r| r.family == family).count()
    }

    /// The distinct families with at least one row, in generation order
    pub fn families(&self) -> Vec<ConstraintFamily> {
        self.rows.iter().map(|r| r.family).unique().collect()
    }

    /// Hand the problem to the solving engine.
    ///
    /// # Arguments
    ///
    /// * `sense` - Whether to minimise or maximise the objective
    /// * `options` - Time limit and tolerance settings
    ///
    /// # Returns
    ///
    /// The solution if the engine found an optimum, or a structured error: infeasibility and
    /// unboundedness surface as [`ModelError::Infeasible`] naming the active constraint families
    /// documented as potential causes, anything else as [`ModelError::Solver`] verbatim.
    pub fn solve(self, sense: Sense, options: &SolveOptions) -> Result<Solution> {
        let mut problem = RowProblem::default();

        let columns: Vec<_> = self
            .variables
            .iter()
            .zip(&self.objective)
            .map(|(var, coefficient)| problem.add_column(*coefficient, var.lower..=var.upper))
            .collect();

        for row in &self.rows {
            problem.add_row(
                row.lower..=row.upper,
                row.terms.iter().map(|(var, coeff)| (columns[var.0], *coeff)),
            );
        }

        let mut model = problem.optimise(sense);
        model.set_option("output_flag", options.verbose);
        if let Some(time_limit) = options.time_limit {
            model.set_option("time_limit", time_limit);
        }
        if let Some(gap) = options.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                let objective_value = self
                    .objective
                    .iter()
                    .zip(&values)
                    .map(|(c, v)| c * v)
                    .sum();
                Ok(Solution {
                    values,
                    objective_value,
                })
            }
            status => {
                let status = format!("{status:?}");
                if status.contains("Infeasible") || status.contains("Unbounded") {
                    let families = self
                        .rows
                        .iter()
                        .map(|r| r.family)
                        .unique()
                        .filter(|f| f.may_cause_infeasibility())
                        .map(|f| f.to_string())
                        .join(", ");
                    let families = if families.is_empty() {
                        "none".to_string()
                    } else {
                        families
                    };
                    Err(ModelError::Infeasible { status, families })?
                } else {
                    Err(ModelError::Solver { status })?
                }
            }
        }
    }
}

/// The values the engine assigned to the variables.
#[derive(Debug)]
pub struct Solution {
    values: Vec<f64>,
    objective_value: f64,
}

impl Solution {
    /// The value of a variable in the solution
    pub fn get_value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    /// The objective value of the solution
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;
    use float_cmp::assert_approx_eq;

    /// maximise x + 2y subject to x + y <= 6, x <= 4, y <= 5
    #[test]
    fn test_solve_simple() {
        let mut builder = ProblemBuilder::new();
        let x = builder.declare_variable(0.0, 4.0);
        let y = builder.declare_variable(0.0, 5.0);
        builder.add_objective_terms(&[(x, 1.0), (y, 2.0)].into_iter().collect());
        builder.add_constraint(
            ConstraintFamily::DemandCoverage,
            [(x, 1.0), (y, 1.0)].into_iter().collect(),
            Relation::LessEqual,
            6.0,
        );

        let solution = builder
            .solve(Sense::Maximise, &SolveOptions::default())
            .unwrap();
        assert_approx_eq!(f64, solution.get_value(x), 1.0);
        assert_approx_eq!(f64, solution.get_value(y), 5.0);
        assert_approx_eq!(f64, solution.objective_value(), 11.0);
    }

    #[test]
    fn test_solve_infeasible_names_families() {
        let mut builder = ProblemBuilder::new();
        let x = builder.declare_variable(0.0, 1.0);
        builder.add_constraint(
            ConstraintFamily::Share,
            [(x, 1.0)].into_iter().collect(),
            Relation::GreaterEqual,
            2.0,
        );

        let err = builder
            .solve(Sense::Minimise, &SolveOptions::default())
            .unwrap_err();
        assert_eq!(exit_code_for(&err), 4);
        assert!(err.to_string().contains("share"));
    }

    #[test]
    fn test_equality_constraint() {
        let mut builder = ProblemBuilder::new();
        let x = builder.declare_variable(0.0, f64::INFINITY);
        builder.add_objective_terms(&[(x, 3.0)].into_iter().collect());
        builder.add_constraint(
            ConstraintFamily::DemandCoverage,
            [(x, 1.0)].into_iter().collect(),
            Relation::Equal,
            7.0,
        );

        let solution = builder
            .solve(Sense::Minimise, &SolveOptions::default())
            .unwrap();
        assert_approx_eq!(f64, solution.get_value(x), 7.0);
        assert_approx_eq!(f64, solution.objective_value(), 21.0);
    }
}
