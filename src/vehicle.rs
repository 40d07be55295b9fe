//! Vehicle categories, drivetrain technologies, fuels and their combinations.
use crate::demand::ProductId;
use crate::id::{define_id_getter, define_id_type};
use crate::mode::ModeId;
use serde::Deserialize;

define_id_type!(VehicletypeId);
define_id_type!(TechnologyId);
define_id_type!(FuelId);
define_id_type!(TechVehicleId);

/// A category of vehicles used for transportation, e.g. small passenger cars, buses or
/// light-duty trucks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vehicletype {
    /// Unique identifier
    pub id: VehicletypeId,
    /// Name of the vehicle type
    pub name: String,
    /// Mode of transport the vehicle type is used for
    pub mode: ModeId,
    /// Product the vehicle type is used for
    pub product: ProductId,
}
define_id_getter!(Vehicletype, VehicletypeId);

/// A drivetrain technology used in a vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Technology {
    /// Unique identifier
    pub id: TechnologyId,
    /// Name of the technology
    pub name: String,
    /// Fuel used by the technology
    pub fuel: FuelId,
}
define_id_getter!(Technology, TechnologyId);

/// An energy carrier used for vehicle propulsion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fuel {
    /// Unique identifier
    pub id: FuelId,
    /// Name of the fuel
    pub name: String,
    /// Emission factor of the fuel in gCO2/kWh
    pub emission_factor: f64,
    /// Cost per kWh of the fuel in € for each horizon year
    pub cost_per_kwh: Vec<f64>,
    /// Cost per kW of fueling-infrastructure capacity in € for each horizon year
    pub cost_per_kw: Vec<f64>,
    /// Fueling infrastructure operation and maintenance costs in €/kW/year for each horizon year
    pub fueling_infrastructure_om_cost: Vec<f64>,
}
define_id_getter!(Fuel, FuelId);

/// A concrete vehicle type and technology combination.
///
/// This is the unit over which fleet stock, purchases and retirement are tracked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TechVehicle {
    /// Unique identifier
    pub id: TechVehicleId,
    /// Name of the combination
    pub name: String,
    /// The vehicle type
    pub vehicle_type: VehicletypeId,
    /// The drivetrain technology
    pub technology: TechnologyId,
    /// Capital cost in €/vehicle for each horizon year of purchase
    pub capital_cost: Vec<f64>,
    /// Maintenance cost in €/vehicle/year for each horizon year
    pub maintenance_cost: Vec<f64>,
    /// Load capacity in units/vehicle (passengers or tonnes)
    pub load_capacity: f64,
    /// Specific consumption in kWh/vehicle-km for each horizon year
    pub spec_consumption: Vec<f64>,
    /// Lifetime in years
    pub lifetime: u32,
    /// Annual range in vehicle-km/year
    pub annual_range: f64,
    /// Battery capacity in kWh
    pub battery_capacity: f64,
    /// Peak charging power in kW
    pub peak_charging: f64,
}
define_id_getter!(TechVehicle, TechVehicleId);

impl TechVehicle {
    /// The fraction of a vehicle cohort purchased in `vintage` still counted as active stock in
    /// `year`.
    ///
    /// Equals 1 in the purchase year, declines linearly with age and reaches 0 once the age
    /// equals or exceeds the lifetime.
    pub fn depreciation_factor(&self, year: u32, vintage: u32) -> f64 {
        assert!(year >= vintage, "Vehicle cannot age backwards");
        let age = year - vintage;
        if age >= self.lifetime {
            return 0.0;
        }

        1.0 - f64::from(age) / f64::from(self.lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn tech_vehicle(lifetime: u32) -> TechVehicle {
        TechVehicle {
            id: TechVehicleId(1),
            name: "bev".into(),
            vehicle_type: VehicletypeId(1),
            technology: TechnologyId(1),
            capital_cost: vec![30000.0],
            maintenance_cost: vec![1000.0],
            load_capacity: 1.5,
            spec_consumption: vec![0.2],
            lifetime,
            annual_range: 15000.0,
            battery_capacity: 60.0,
            peak_charging: 150.0,
        }
    }

    #[rstest]
    #[case(2020, 2020, 1.0)] // equals 1 at purchase
    #[case(2025, 2020, 0.5)]
    #[case(2030, 2020, 0.0)] // equals 0 at age == lifetime
    #[case(2035, 2020, 0.0)] // and beyond
    fn test_depreciation_factor_bounds(#[case] year: u32, #[case] vintage: u32, #[case] expected: f64) {
        let tv = tech_vehicle(10);
        assert_approx_eq!(f64, tv.depreciation_factor(year, vintage), expected);
    }

    #[test]
    fn test_depreciation_factor_monotone() {
        let tv = tech_vehicle(7);
        let factors: Vec<_> = (2020..2035)
            .map(|y| tv.depreciation_factor(y, 2020))
            .collect();
        assert!(factors.windows(2).all(|w| w[1] <= w[0]));
    }
}
