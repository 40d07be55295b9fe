//! Region classifications and demographic groups.
use crate::id::{define_id_getter, define_id_type};
use serde::Deserialize;

define_id_type!(RegiontypeId);
define_id_type!(FinancialStatusId);

/// A classification of regions with similar transportation characteristics (e.g. urban vs.
/// rural).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Regiontype {
    /// Unique identifier
    pub id: RegiontypeId,
    /// Name of the region type
    pub name: String,
    /// Average speed in km/h
    pub speed: f64,
    /// Variable costs in €/vehicle-km for each horizon year
    pub cost_var: Vec<f64>,
    /// Fixed costs in €/vehicle/year for each horizon year
    pub cost_fix: Vec<f64>,
}
define_id_getter!(Regiontype, RegiontypeId);

/// A demographic group characterised by its budget for transportation-related expenses.
///
/// Budget bounds are aggregates for the whole group in €/year; a missing bound means
/// unconstrained.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinancialStatus {
    /// Unique identifier
    pub id: FinancialStatusId,
    /// Name of the financial status
    pub name: String,
    /// Value of time in €/h
    pub value_of_time: f64,
    /// Lower bound of the operational budget in €/year
    pub operational_budget_lb: Option<f64>,
    /// Upper bound of the operational budget in €/year
    pub operational_budget_ub: Option<f64>,
    /// Lower bound of the purchase budget in €/year
    pub purchase_budget_lb: Option<f64>,
    /// Upper bound of the purchase budget in €/year
    pub purchase_budget_ub: Option<f64>,
}
define_id_getter!(FinancialStatus, FinancialStatusId);
