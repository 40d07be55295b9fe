//! The entity catalog: the read-only arena every formulation stage works from.
use crate::demand::{Odpair, OdpairId, Product, ProductId};
use crate::mode::{Mode, ModeId};
use crate::network::{Edge, EdgeId, Node, NodeId, Path, PathId};
use crate::policy::{
    EmissionCapByMode, EmissionCapByYear, InitialFuelingInfr, InitialModeInfr,
    InitialVehicleStock, MarketShareConstraint, ShareConstraint, VehicleSubsidy,
};
use crate::region::{FinancialStatus, FinancialStatusId, Regiontype, RegiontypeId};
use crate::vehicle::{
    Fuel, FuelId, TechVehicle, TechVehicleId, Technology, TechnologyId, Vehicletype,
    VehicletypeId,
};
use indexmap::IndexMap;

/// Scenario-wide scalars.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Scenario {
    /// First year of the optimization horizon
    pub base_year: u32,
    /// Number of years in the horizon
    pub num_years: u32,
    /// Annual discount rate applied to the objective
    pub discount_rate: f64,
    /// Maximum year-over-year change of any mode's flow share; the shift-rate constraint family
    /// is skipped when absent
    #[serde(default)]
    pub mode_shift_max_rate: Option<f64>,
    /// Full-load hours converting fueling energy demand (kWh/year) into required capacity (kW)
    #[serde(default = "default_full_load_hours")]
    pub fueling_full_load_hours: f64,
}

fn default_full_load_hours() -> f64 {
    8760.0
}

impl Scenario {
    /// Iterate over the horizon years in order
    pub fn years(&self) -> impl Iterator<Item = u32> + Clone {
        self.base_year..self.base_year + self.num_years
    }

    /// The last year of the horizon
    pub fn last_year(&self) -> u32 {
        self.base_year + self.num_years - 1
    }

    /// The position of `year` within the horizon, for indexing per-year attribute arrays
    pub fn year_index(&self, year: u32) -> usize {
        assert!(
            year >= self.base_year && year <= self.last_year(),
            "Year {year} outside horizon"
        );
        (year - self.base_year) as usize
    }

    /// Discount factor applied to costs incurred in `year`
    pub fn discount_factor(&self, year: u32) -> f64 {
        (1.0 + self.discount_rate).powi(-(self.year_index(year) as i32))
    }
}

/// All domain entities, loaded once per run and never mutated afterwards.
///
/// Each collection is keyed by the entity's integer ID and iterates in ascending ID order, so
/// every pass over the catalog is reproducible.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Scenario-wide scalars
    pub scenario: Scenario,
    /// Geographic regions
    pub nodes: IndexMap<NodeId, Node>,
    /// Connections between regions
    pub edges: IndexMap<EdgeId, Edge>,
    /// Candidate routes
    pub paths: IndexMap<PathId, Path>,
    /// Origin-destination demand relations
    pub odpairs: IndexMap<OdpairId, Odpair>,
    /// Transported goods and services
    pub products: IndexMap<ProductId, Product>,
    /// Transport modes
    pub modes: IndexMap<ModeId, Mode>,
    /// Vehicle categories
    pub vehicle_types: IndexMap<VehicletypeId, Vehicletype>,
    /// Drivetrain technologies
    pub technologies: IndexMap<TechnologyId, Technology>,
    /// Energy carriers
    pub fuels: IndexMap<FuelId, Fuel>,
    /// Vehicle type and technology combinations
    pub tech_vehicles: IndexMap<TechVehicleId, TechVehicle>,
    /// Region classifications
    pub region_types: IndexMap<RegiontypeId, Regiontype>,
    /// Demographic groups
    pub financial_statuses: IndexMap<FinancialStatusId, FinancialStatus>,
    /// Flow share bounds
    pub share_constraints: Vec<ShareConstraint>,
    /// New-purchase share bounds
    pub market_share_constraints: Vec<MarketShareConstraint>,
    /// Per-mode emission caps
    pub emission_caps_by_mode: Vec<EmissionCapByMode>,
    /// System-wide emission caps
    pub emission_caps_by_year: Vec<EmissionCapByYear>,
    /// Vehicle purchase subsidies
    pub subsidies: Vec<VehicleSubsidy>,
    /// Vehicle cohorts existing at the start of the horizon
    pub initial_vehicle_stock: Vec<InitialVehicleStock>,
    /// Mode infrastructure existing at the start of the horizon
    pub initial_mode_infr: Vec<InitialModeInfr>,
    /// Fueling infrastructure existing at the start of the horizon
    pub initial_fueling_infr: Vec<InitialFuelingInfr>,
}

impl Catalog {
    /// The mode a tech vehicle belongs to, via its vehicle type
    pub fn mode_of(&self, tech_vehicle: TechVehicleId) -> ModeId {
        let tv = &self.tech_vehicles[&tech_vehicle];
        self.vehicle_types[&tv.vehicle_type].mode
    }

    /// The product a tech vehicle carries, via its vehicle type
    pub fn product_of(&self, tech_vehicle: TechVehicleId) -> ProductId {
        let tv = &self.tech_vehicles[&tech_vehicle];
        self.vehicle_types[&tv.vehicle_type].product
    }

    /// The fuel a tech vehicle consumes, via its technology
    pub fn fuel_of(&self, tech_vehicle: TechVehicleId) -> &Fuel {
        let tv = &self.tech_vehicles[&tech_vehicle];
        &self.fuels[&self.technologies[&tv.technology].fuel]
    }

    /// Whether a tech vehicle belongs to a fleet-sized mode
    pub fn is_fleet_sized(&self, tech_vehicle: TechVehicleId) -> bool {
        self.modes[&self.mode_of(tech_vehicle)].quantify_by_vehicles
    }

    /// The net capital cost of purchasing one vehicle in `year`: capital cost minus any
    /// subsidies valid in that year
    pub fn net_capital_cost(&self, tech_vehicle: TechVehicleId, year: u32) -> f64 {
        let tv = &self.tech_vehicles[&tech_vehicle];
        let subsidy: f64 = self
            .subsidies
            .iter()
            .filter(|s| s.tech_vehicle == tech_vehicle && s.years.contains(&year))
            .map(|s| s.subsidy)
            .sum();

        tv.capital_cost[self.scenario.year_index(year)] - subsidy
    }

    /// The initial stock of the `(tech_vehicle, vintage)` cohort at the start of the horizon,
    /// summed over matching records
    pub fn initial_stock(&self, tech_vehicle: TechVehicleId, vintage: u32) -> f64 {
        self.initial_vehicle_stock
            .iter()
            .filter(|r| r.tech_vehicle == tech_vehicle && r.year_of_purchase == vintage)
            .map(|r| r.stock)
            .sum()
    }

    /// Total demand in `year` across the odpairs selected by `filter`
    pub fn total_demand<F>(&self, year: u32, mut filter: F) -> f64
    where
        F: FnMut(&Odpair) -> bool,
    {
        let idx = self.scenario.year_index(year);
        self.odpairs
            .values()
            .filter(|r| filter(r))
            .map(|r| r.demand[idx])
            .sum()
    }
}
