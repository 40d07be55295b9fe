//! Fixtures for tests
use crate::catalog::{Catalog, Scenario};
use crate::demand::{Odpair, OdpairId, Product, ProductId};
use crate::mode::{Mode, ModeId};
use crate::network::{Edge, EdgeId, Node, NodeId, Path, PathElement, PathId};
use crate::region::{FinancialStatus, FinancialStatusId, Regiontype, RegiontypeId};
use crate::vehicle::{
    Fuel, FuelId, TechVehicle, TechVehicleId, Technology, TechnologyId, Vehicletype,
    VehicletypeId,
};
use indexmap::indexmap;
use rstest::fixture;

/// A two-year scenario starting in 2025
#[fixture]
pub fn scenario() -> Scenario {
    Scenario {
        base_year: 2025,
        num_years: 2,
        discount_rate: 0.05,
        mode_shift_max_rate: None,
        fueling_full_load_hours: 8760.0,
    }
}

fn levelized_mode(id: u32, name: &str) -> Mode {
    Mode {
        id: ModeId(id),
        name: name.into(),
        quantify_by_vehicles: false,
        cost_per_ukm: vec![0.05, 0.05],
        emission_factor: vec![20.0, 20.0],
        infrastructure_expansion_cost: vec![1.0, 1.0],
        infrastructure_om_cost: vec![0.1, 0.1],
        waiting_time: vec![0.25, 0.25],
    }
}

fn tech_vehicle(id: u32, vehicle_type: u32) -> TechVehicle {
    TechVehicle {
        id: TechVehicleId(id),
        name: format!("vehicle {id}"),
        vehicle_type: VehicletypeId(vehicle_type),
        technology: TechnologyId(1),
        capital_cost: vec![30000.0, 30000.0],
        maintenance_cost: vec![1000.0, 1000.0],
        load_capacity: 1.5,
        spec_consumption: vec![0.2, 0.2],
        lifetime: 10,
        annual_range: 15000.0,
        battery_capacity: 60.0,
        peak_charging: 150.0,
    }
}

/// A catalog with two nodes, one edge, one path, one odpair with demand 100/year and a single
/// levelized mode.
#[fixture]
pub fn catalog(scenario: Scenario) -> Catalog {
    Catalog {
        scenario,
        nodes: indexmap! {
            NodeId(1) => Node {
                id: NodeId(1),
                name: "north".into(),
                carbon_price: vec![100.0, 100.0],
            },
            NodeId(2) => Node {
                id: NodeId(2),
                name: "south".into(),
                carbon_price: vec![100.0, 100.0],
            },
        },
        edges: indexmap! {
            EdgeId(1) => Edge {
                id: EdgeId(1),
                name: "north-south".into(),
                from: NodeId(1),
                to: NodeId(2),
                length: 150.0,
                carbon_price: vec![100.0, 100.0],
            },
        },
        paths: indexmap! {
            PathId(1) => Path {
                id: PathId(1),
                name: "direct".into(),
                length: 150.0,
                sequence: vec![
                    PathElement::Node(NodeId(1)),
                    PathElement::Edge(EdgeId(1)),
                    PathElement::Node(NodeId(2)),
                ],
            },
        },
        odpairs: indexmap! {
            OdpairId(1) => Odpair {
                id: OdpairId(1),
                product: ProductId(1),
                origin: NodeId(1),
                destination: NodeId(2),
                paths: vec![PathId(1)],
                demand: vec![100.0, 100.0],
                financial_status: FinancialStatusId(1),
                region_type: RegiontypeId(1),
            },
        },
        products: indexmap! {
            ProductId(1) => Product {
                id: ProductId(1),
                name: "passenger".into(),
            },
        },
        modes: indexmap! {
            ModeId(1) => levelized_mode(1, "rail"),
        },
        vehicle_types: indexmap! {
            VehicletypeId(1) => Vehicletype {
                id: VehicletypeId(1),
                name: "train".into(),
                mode: ModeId(1),
                product: ProductId(1),
            },
        },
        technologies: indexmap! {
            TechnologyId(1) => Technology {
                id: TechnologyId(1),
                name: "electric".into(),
                fuel: FuelId(1),
            },
        },
        fuels: indexmap! {
            FuelId(1) => Fuel {
                id: FuelId(1),
                name: "electricity".into(),
                emission_factor: 50.0,
                cost_per_kwh: vec![0.2, 0.2],
                cost_per_kw: vec![500.0, 500.0],
                fueling_infrastructure_om_cost: vec![10.0, 10.0],
            },
        },
        tech_vehicles: indexmap! {
            TechVehicleId(1) => tech_vehicle(1, 1),
        },
        region_types: indexmap! {
            RegiontypeId(1) => Regiontype {
                id: RegiontypeId(1),
                name: "rural".into(),
                speed: 80.0,
                cost_var: vec![0.1, 0.1],
                cost_fix: vec![100.0, 100.0],
            },
        },
        financial_statuses: indexmap! {
            FinancialStatusId(1) => FinancialStatus {
                id: FinancialStatusId(1),
                name: "average".into(),
                value_of_time: 8.0,
                operational_budget_lb: None,
                operational_budget_ub: None,
                purchase_budget_lb: None,
                purchase_budget_ub: None,
            },
        },
        share_constraints: vec![],
        market_share_constraints: vec![],
        emission_caps_by_mode: vec![],
        emission_caps_by_year: vec![],
        subsidies: vec![],
        initial_vehicle_stock: vec![],
        initial_mode_infr: vec![],
        initial_fueling_infr: vec![],
    }
}

/// The base catalog with its single mode fleet-sized instead of levelized.
#[fixture]
pub fn catalog_with_fleet_mode(catalog: Catalog) -> Catalog {
    let mut catalog = catalog;
    catalog.modes[&ModeId(1)].quantify_by_vehicles = true;
    catalog
}

/// The base catalog with a second, equally priced levelized mode serving the same product.
#[fixture]
pub fn catalog_with_two_modes(catalog: Catalog) -> Catalog {
    let mut catalog = catalog;
    catalog.modes.insert(ModeId(2), levelized_mode(2, "road"));
    catalog.vehicle_types.insert(
        VehicletypeId(2),
        Vehicletype {
            id: VehicletypeId(2),
            name: "coach".into(),
            mode: ModeId(2),
            product: ProductId(1),
        },
    );
    catalog
        .tech_vehicles
        .insert(TechVehicleId(2), tech_vehicle(2, 2));
    catalog
}
