//! End-to-end formulation and solve tests on small scenarios.
use float_cmp::assert_approx_eq;
use std::path::{Path, PathBuf};
use transcap::catalog::Catalog;
use transcap::demand::OdpairId;
use transcap::error::{ModelError, exit_code_for};
use transcap::formulation::{costs, formulate};
use transcap::formulation::variables::FlowKey;
use transcap::input::read_case;
use transcap::mode::{Mode, ModeId};
use transcap::policy::{
    EmissionCapByYear, EmissionCapId, ShareConstraint, ShareConstraintId, ShareSense, ShareTarget,
};
use transcap::solver::SolveOptions;
use transcap::vehicle::{TechVehicleId, Vehicletype, VehicletypeId};

/// Get the path to the simple demo case.
fn get_case_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("simple")
        .join("case.toml")
}

/// The simple demo case with infrastructure costs zeroed, so the objective is driven by flow
/// costs alone.
fn simple_catalog() -> Catalog {
    let mut catalog = read_case(&get_case_path()).unwrap();
    let mode = catalog.modes.values_mut().next().unwrap();
    mode.infrastructure_expansion_cost = vec![0.0, 0.0];
    mode.infrastructure_om_cost = vec![0.0, 0.0];
    catalog
}

/// Add a second levelized mode serving the same product, with the given per-km cost and
/// emission factor.
fn add_second_mode(catalog: &mut Catalog, cost_per_ukm: f64, emission_factor: f64) {
    let template = catalog.modes[&ModeId(1)].clone();
    catalog.modes.insert(
        ModeId(2),
        Mode {
            id: ModeId(2),
            name: "road".into(),
            cost_per_ukm: vec![cost_per_ukm, cost_per_ukm],
            emission_factor: vec![emission_factor, emission_factor],
            ..template
        },
    );
    let product = catalog.vehicle_types[&VehicletypeId(1)].product;
    catalog.vehicle_types.insert(
        VehicletypeId(2),
        Vehicletype {
            id: VehicletypeId(2),
            name: "coach".into(),
            mode: ModeId(2),
            product,
        },
    );
    let mut tv = catalog.tech_vehicles[&TechVehicleId(1)].clone();
    tv.id = TechVehicleId(2);
    tv.vehicle_type = VehicletypeId(2);
    catalog.tech_vehicles.insert(TechVehicleId(2), tv);
}

#[test]
fn test_round_trip_is_deterministic() {
    let catalog = simple_catalog();
    let first = formulate(&catalog).unwrap();
    let second = formulate(&catalog).unwrap();

    assert_eq!(first.sets, second.sets);
    assert_eq!(
        first.problem.num_variables(),
        second.problem.num_variables()
    );
    assert_eq!(
        first.problem.num_constraints(),
        second.problem.num_constraints()
    );
}

/// The single-odpair scenario: total flow equals demand in each year and the objective equals
/// the discounted per-unit cost times demand.
#[test]
fn test_simple_case_covers_demand_exactly() {
    let catalog = simple_catalog();
    let solved = formulate(&catalog)
        .unwrap()
        .solve(&SolveOptions::default())
        .unwrap();

    for year in catalog.scenario.years() {
        assert_approx_eq!(
            f64,
            solved.total_flow(OdpairId(1), year),
            100.0,
            epsilon = 1e-6
        );
    }

    let expected: f64 = catalog
        .scenario
        .years()
        .map(|year| {
            let key = FlowKey {
                product: catalog.odpairs[&OdpairId(1)].product,
                odpair: OdpairId(1),
                path: catalog.odpairs[&OdpairId(1)].paths[0],
                tech_vehicle: TechVehicleId(1),
                year,
            };
            let per_unit = costs::operational_cost_per_unit(&catalog, &key)
                + costs::time_cost_per_unit(&catalog, &key)
                + costs::carbon_cost_per_unit(&catalog, &key);
            catalog.scenario.discount_factor(year) * per_unit * 100.0
        })
        .sum();
    assert_approx_eq!(f64, solved.objective_value(), expected, epsilon = 1e-4);
}

/// A max-share cap of 0.5 on the cheaper of two modes forces an even split instead of routing
/// everything to the cheaper one.
#[test]
fn test_max_mode_share_splits_demand() {
    let mut catalog = simple_catalog();
    // Make the second mode slightly more expensive, then cap the first at half in each year
    add_second_mode(&mut catalog, 0.06, 20.0);
    for year in [2025, 2026] {
        catalog.share_constraints.push(ShareConstraint {
            id: ShareConstraintId(year - 2024),
            target: ShareTarget::Mode(ModeId(1)),
            sense: ShareSense::Max,
            share: 0.5,
            year: Some(year),
            financial_status: vec![],
            region_type: vec![],
        });
    }

    let solved = formulate(&catalog)
        .unwrap()
        .solve(&SolveOptions::default())
        .unwrap();

    for year in catalog.scenario.years() {
        let by_mode = |tech_vehicle: TechVehicleId| -> f64 {
            solved
                .iter_flows()
                .filter(|(key, _)| key.tech_vehicle == tech_vehicle && key.year == year)
                .map(|(_, value)| value)
                .sum()
        };
        assert_approx_eq!(f64, by_mode(TechVehicleId(1)), 50.0, epsilon = 1e-6);
        assert_approx_eq!(f64, by_mode(TechVehicleId(2)), 50.0, epsilon = 1e-6);
    }
}

/// An emission cap below the cheapest solution's emissions forces a shift towards the
/// lower-emission mode; the cap is never silently exceeded.
#[test]
fn test_emission_cap_forces_shift() {
    let mut catalog = simple_catalog();
    // The zero-emission alternative is more expensive
    add_second_mode(&mut catalog, 0.10, 0.0);
    // All demand on mode 1 would emit 100 * 150km * 20g/ukm = 0.3 t/year
    for year in [2025, 2026] {
        catalog.emission_caps_by_year.push(EmissionCapByYear {
            id: EmissionCapId(year - 2024),
            year,
            cap: 0.15,
        });
    }

    let solved = formulate(&catalog)
        .unwrap()
        .solve(&SolveOptions::default())
        .unwrap();

    for year in catalog.scenario.years() {
        let emissions: f64 = solved
            .iter_flows()
            .filter(|(key, _)| key.year == year)
            .map(|(key, value)| costs::emission_per_unit(&catalog, key) * value)
            .sum();
        assert!(emissions <= 0.15 + 1e-9);

        // Half the demand must move to the zero-emission mode
        let shifted: f64 = solved
            .iter_flows()
            .filter(|(key, _)| key.tech_vehicle == TechVehicleId(2) && key.year == year)
            .map(|(_, value)| value)
            .sum();
        assert_approx_eq!(f64, shifted, 50.0, epsilon = 1e-6);
    }
}

/// With no alternative mode, a cap below the only option's emissions makes the model
/// infeasible; the error names the active constraint families.
#[test]
fn test_emission_cap_without_alternative_is_infeasible() {
    let mut catalog = simple_catalog();
    catalog.emission_caps_by_year.push(EmissionCapByYear {
        id: EmissionCapId(1),
        year: 2025,
        cap: 0.1,
    });

    let err = formulate(&catalog)
        .unwrap()
        .solve(&SolveOptions::default())
        .unwrap_err();
    assert_eq!(exit_code_for(&err), 4);

    let root = err
        .chain()
        .filter_map(|e| e.downcast_ref::<ModelError>())
        .next()
        .unwrap();
    assert!(root.to_string().contains("emissions"));
}

/// A fleet-sized mode buys vehicles, links stock to purchases through the aging recurrence and
/// aggregates fueling demand.
#[test]
fn test_fleet_mode_sizes_vehicles_and_fueling() {
    let mut catalog = simple_catalog();
    catalog.modes[&ModeId(1)].quantify_by_vehicles = true;

    let solved = formulate(&catalog)
        .unwrap()
        .solve(&SolveOptions::default())
        .unwrap();

    for year in catalog.scenario.years() {
        assert_approx_eq!(
            f64,
            solved.total_flow(OdpairId(1), year),
            100.0,
            epsilon = 1e-6
        );

        // Live stock must cover the vehicle-km the flow implies
        let tv = &catalog.tech_vehicles[&TechVehicleId(1)];
        let vehicle_km = 100.0 * 150.0 / tv.load_capacity;
        let stock: f64 = solved
            .iter_stock()
            .filter(|(key, _)| key.year == year)
            .map(|(_, value)| value)
            .sum();
        assert!(stock * tv.annual_range >= vehicle_km - 1e-6);

        // The energy the flows draw shows up as fueling demand
        let energy: f64 = solved
            .iter_fueling_demand()
            .filter(|(key, _)| key.year == year)
            .map(|(_, value)| value)
            .sum();
        let spec = tv.spec_consumption[catalog.scenario.year_index(year)];
        assert_approx_eq!(f64, energy, vehicle_km * spec, epsilon = 1e-6);
    }

    // All stock must be non-negative and something must have been purchased
    assert!(solved.iter_stock().all(|(_, value)| value >= -1e-9));
    let purchased: f64 = solved.iter_purchases().map(|(_, value)| value).sum();
    assert!(purchased > 0.0);
}
