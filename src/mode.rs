//! Transport modes.
use crate::id::{define_id_getter, define_id_type};
use serde::Deserialize;

define_id_type!(ModeId);

/// A transport mode.
///
/// Modes may differ by the infrastructure used (road vs. rail) or by the vehicle category (private
/// car vs. bus). A mode is either *fleet-sized* (`quantify_by_vehicles`), in which case vehicle
/// stock, purchases and fueling infrastructure are tracked explicitly, or *levelized*, in which
/// case transport is priced with the per-km cost and emission arrays and mode infrastructure is
/// sized instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mode {
    /// Unique identifier
    pub id: ModeId,
    /// Name of the mode
    pub name: String,
    /// Whether vehicle stock is sized for this mode
    pub quantify_by_vehicles: bool,
    /// Levelized cost per unit-km in €/ukm for each horizon year (levelized modes only)
    #[serde(default)]
    pub cost_per_ukm: Vec<f64>,
    /// Emission factor in gCO2/ukm for each horizon year (levelized modes only)
    #[serde(default)]
    pub emission_factor: Vec<f64>,
    /// Infrastructure expansion costs in €/(unit/year) for each horizon year (levelized modes
    /// only)
    #[serde(default)]
    pub infrastructure_expansion_cost: Vec<f64>,
    /// Infrastructure operation and maintenance costs in €/(unit/year)/year for each horizon year
    /// (levelized modes only)
    #[serde(default)]
    pub infrastructure_om_cost: Vec<f64>,
    /// Waiting time in h for each horizon year
    pub waiting_time: Vec<f64>,
}
define_id_getter!(Mode, ModeId);
