//! Per-unit coefficient calculations shared by the constraint builders and the objective.
//!
//! All functions return a coefficient per unit of flow (one transported passenger or tonne per
//! year) for a given flow-variable key; the formulation multiplies them into constraint rows and
//! objective terms.
use crate::catalog::Catalog;
use crate::formulation::variables::FlowKey;
use crate::network::{Path, PathElement};

/// Grams per tonne.
const GRAMS_PER_TONNE: f64 = 1e6;

/// Vehicle-km driven per unit of flow: path length over load capacity.
///
/// Zero for levelized modes, which are not sized by vehicles.
pub fn vehicle_km_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    if !catalog.is_fleet_sized(key.tech_vehicle) {
        return 0.0;
    }
    let tv = &catalog.tech_vehicles[&key.tech_vehicle];
    catalog.paths[&key.path].length / tv.load_capacity
}

/// Energy drawn per unit of flow in kWh: vehicle-km times specific consumption.
pub fn energy_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    let tv = &catalog.tech_vehicles[&key.tech_vehicle];
    let year_index = catalog.scenario.year_index(key.year);
    vehicle_km_per_unit(catalog, key) * tv.spec_consumption[year_index]
}

/// Emissions per unit of flow in tCO2.
///
/// Fleet-sized modes account through fuel consumption; levelized modes through the mode's
/// per-ukm emission factor.
pub fn emission_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    let year_index = catalog.scenario.year_index(key.year);
    let mode = &catalog.modes[&catalog.mode_of(key.tech_vehicle)];
    if mode.quantify_by_vehicles {
        let fuel = catalog.fuel_of(key.tech_vehicle);
        energy_per_unit(catalog, key) * fuel.emission_factor / GRAMS_PER_TONNE
    } else {
        catalog.paths[&key.path].length * mode.emission_factor[year_index] / GRAMS_PER_TONNE
    }
}

/// Operational spending per unit of flow in €: fuel energy, region-type variable and fixed
/// costs, and the levelized per-km cost for non-fleet modes.
///
/// Time and carbon costs are not monetary outlays and are excluded here; they enter the
/// objective separately.
pub fn operational_cost_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    let year_index = catalog.scenario.year_index(key.year);
    let mode = &catalog.modes[&catalog.mode_of(key.tech_vehicle)];
    let path = &catalog.paths[&key.path];

    if !mode.quantify_by_vehicles {
        return path.length * mode.cost_per_ukm[year_index];
    }

    let tv = &catalog.tech_vehicles[&key.tech_vehicle];
    let region_type = &catalog.region_types[&catalog.odpairs[&key.odpair].region_type];
    let vkm = vehicle_km_per_unit(catalog, key);
    let fuel_cost = energy_per_unit(catalog, key) * catalog.fuel_of(key.tech_vehicle).cost_per_kwh
        [year_index];
    let variable_cost = vkm * region_type.cost_var[year_index];
    // Fixed costs are charged on the vehicle-years the flow implies
    let fixed_cost = vkm / tv.annual_range * region_type.cost_fix[year_index];

    fuel_cost + variable_cost + fixed_cost
}

/// Generalized travel-time cost per unit of flow in €: value of time multiplied by driving and
/// waiting time.
pub fn time_cost_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    let year_index = catalog.scenario.year_index(key.year);
    let odpair = &catalog.odpairs[&key.odpair];
    let speed = catalog.region_types[&odpair.region_type].speed;
    let value_of_time = catalog.financial_statuses[&odpair.financial_status].value_of_time;
    let waiting = catalog.modes[&catalog.mode_of(key.tech_vehicle)].waiting_time[year_index];

    value_of_time * (catalog.paths[&key.path].length / speed + waiting)
}

/// The carbon price along a path in €/tCO2: the unweighted mean of the carbon prices of the
/// traversed nodes and edges.
///
/// Deliberately not length-weighted; this matches the established accounting rule and must be
/// preserved for objective-value compatibility.
pub fn emission_price_along_path(catalog: &Catalog, path: &Path, year: u32) -> f64 {
    let year_index = catalog.scenario.year_index(year);
    let prices = path.sequence.iter().map(|element| match element {
        PathElement::Node(id) => catalog.nodes[id].carbon_price[year_index],
        PathElement::Edge(id) => catalog.edges[id].carbon_price[year_index],
    });

    let (sum, count) = prices.fold((0.0, 0u32), |(sum, count), p| (sum + p, count + 1));
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}

/// Carbon cost per unit of flow in €: emissions priced at the path's carbon price.
pub fn carbon_cost_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    let path = &catalog.paths[&key.path];
    emission_per_unit(catalog, key) * emission_price_along_path(catalog, path, key.year)
}

/// Annualised purchase spending per unit of flow in €, used by the purchase budget: the fleet
/// the flow implies, priced at net capital cost spread over the lifetime.
pub fn purchase_cost_per_unit(catalog: &Catalog, key: &FlowKey) -> f64 {
    if !catalog.is_fleet_sized(key.tech_vehicle) {
        return 0.0;
    }
    let tv = &catalog.tech_vehicles[&key.tech_vehicle];
    let implied_vehicles = vehicle_km_per_unit(catalog, key) / tv.annual_range;

    implied_vehicles * catalog.net_capital_cost(key.tech_vehicle, key.year) / f64::from(tv.lifetime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{catalog, catalog_with_fleet_mode};
    use crate::network::PathId;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn first_flow_key(catalog: &Catalog) -> FlowKey {
        let odpair = catalog.odpairs.values().next().unwrap();
        FlowKey {
            product: odpair.product,
            odpair: odpair.id,
            path: odpair.paths[0],
            tech_vehicle: *catalog.tech_vehicles.keys().next().unwrap(),
            year: catalog.scenario.base_year,
        }
    }

    #[rstest]
    fn test_emission_price_is_unweighted_mean(mut catalog: Catalog) {
        // Node prices 10 and 30, edge price 50: mean is 30 regardless of lengths
        let mut nodes = catalog.nodes.values_mut();
        nodes.next().unwrap().carbon_price = vec![10.0, 10.0];
        nodes.next().unwrap().carbon_price = vec![30.0, 30.0];
        catalog.edges.values_mut().next().unwrap().carbon_price = vec![50.0, 50.0];

        let path = &catalog.paths[&PathId(1)];
        let price = emission_price_along_path(&catalog, path, catalog.scenario.base_year);
        assert_approx_eq!(f64, price, 30.0);
    }

    #[rstest]
    fn test_levelized_mode_costs(catalog: Catalog) {
        let key = first_flow_key(&catalog);
        // Levelized modes have no vehicle-km or energy accounting
        assert_approx_eq!(f64, vehicle_km_per_unit(&catalog, &key), 0.0);
        assert_approx_eq!(f64, energy_per_unit(&catalog, &key), 0.0);

        // Operational cost is the per-km levelized cost over the path length
        let mode = catalog.modes.values().next().unwrap();
        let expected = catalog.paths[&key.path].length * mode.cost_per_ukm[0];
        assert_approx_eq!(f64, operational_cost_per_unit(&catalog, &key), expected);
    }

    #[rstest]
    fn test_fleet_mode_energy_and_emissions(catalog_with_fleet_mode: Catalog) {
        let catalog = catalog_with_fleet_mode;
        let key = first_flow_key(&catalog);
        let tv = &catalog.tech_vehicles[&key.tech_vehicle];
        let path_length = catalog.paths[&key.path].length;

        let vkm = path_length / tv.load_capacity;
        assert_approx_eq!(f64, vehicle_km_per_unit(&catalog, &key), vkm);

        let energy = vkm * tv.spec_consumption[0];
        assert_approx_eq!(f64, energy_per_unit(&catalog, &key), energy);

        let fuel = catalog.fuel_of(key.tech_vehicle);
        assert_approx_eq!(
            f64,
            emission_per_unit(&catalog, &key),
            energy * fuel.emission_factor / 1e6
        );
    }
}
