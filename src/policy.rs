//! Policy and scenario configuration records: share bounds, emission caps, subsidies and
//! initial stock/infrastructure.
//!
//! These are configuration entities rather than physical objects. Every constraint family that
//! consumes them is a no-op when the corresponding collection is empty.
use crate::id::{define_id_getter, define_id_type};
use crate::mode::ModeId;
use crate::network::{EdgeId, NodeId};
use crate::region::{FinancialStatusId, RegiontypeId};
use crate::vehicle::{TechVehicleId, TechnologyId, VehicletypeId};
use serde::Serialize;
use std::fmt;

define_id_type!(ShareConstraintId);
define_id_type!(MarketShareConstraintId);
define_id_type!(EmissionCapId);
define_id_type!(VehicleSubsidyId);
define_id_type!(InitialVehicleStockId);
define_id_type!(InitialModeInfrId);
define_id_type!(InitialFuelingInfrId);

/// A node or an edge, for records that attach to either kind of geographic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeoRef {
    /// A geographic region
    Node(NodeId),
    /// Connecting infrastructure
    Edge(EdgeId),
}

impl fmt::Display for GeoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoRef::Node(id) => write!(f, "node:{id}"),
            GeoRef::Edge(id) => write!(f, "edge:{id}"),
        }
    }
}

impl Serialize for GeoRef {
    fn serialize<S>(&self, serialiser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialiser.collect_str(self)
    }
}

impl From<crate::network::PathElement> for GeoRef {
    fn from(element: crate::network::PathElement) -> Self {
        match element {
            crate::network::PathElement::Node(id) => GeoRef::Node(id),
            crate::network::PathElement::Edge(id) => GeoRef::Edge(id),
        }
    }
}

/// The entity a share constraint applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareTarget {
    /// All flow on a mode
    Mode(ModeId),
    /// All flow carried by vehicles with a drivetrain technology
    Technology(TechnologyId),
    /// All flow carried by a vehicle type
    Vehicletype(VehicletypeId),
    /// All flow carried by one vehicle type and technology combination
    TechVehicle(TechVehicleId),
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareTarget::Mode(id) => write!(f, "mode {id}"),
            ShareTarget::Technology(id) => write!(f, "technology {id}"),
            ShareTarget::Vehicletype(id) => write!(f, "vehicle type {id}"),
            ShareTarget::TechVehicle(id) => write!(f, "tech vehicle {id}"),
        }
    }
}

/// Whether a share bound is a floor or a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ShareSense {
    /// The share must be at least the given value
    Min,
    /// The share must be at most the given value
    Max,
}

/// A bound on the share of flow attributable to a mode, technology, vehicle type or tech
/// vehicle.
///
/// The share is measured against the total demand of the scoped origin-destination relations.
/// Empty scoping sets mean "all". A missing year makes the bound horizon-wide.
///
/// Active share bounds can make the model infeasible, particularly combined with a mode-shift
/// rate limit or with each other; they are never relaxed by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareConstraint {
    /// Unique identifier
    pub id: ShareConstraintId,
    /// The constrained entity
    pub target: ShareTarget,
    /// Floor or ceiling
    pub sense: ShareSense,
    /// The bound, between 0 and 1
    pub share: f64,
    /// Year the bound applies to, or `None` for the whole horizon
    pub year: Option<u32>,
    /// Financial statuses in scope (empty = all)
    pub financial_status: Vec<FinancialStatusId>,
    /// Region types in scope (empty = all)
    pub region_type: Vec<RegiontypeId>,
}
define_id_getter!(ShareConstraint, ShareConstraintId);

/// The entity a market-share constraint on new purchases applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketShareTarget {
    /// New purchases of all tech vehicles belonging to a mode
    Mode(ModeId),
    /// New purchases of one tech vehicle
    TechVehicle(TechVehicleId),
}

impl fmt::Display for MarketShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketShareTarget::Mode(id) => write!(f, "mode {id}"),
            MarketShareTarget::TechVehicle(id) => write!(f, "tech vehicle {id}"),
        }
    }
}

/// A bound on the share of newly purchased vehicles (not total stock) attributable to a tech
/// vehicle or mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketShareConstraint {
    /// Unique identifier
    pub id: MarketShareConstraintId,
    /// The constrained entity
    pub target: MarketShareTarget,
    /// Floor or ceiling
    pub sense: ShareSense,
    /// The bound, between 0 and 1
    pub share: f64,
    /// Year the bound applies to, or `None` for every horizon year
    pub year: Option<u32>,
}
define_id_getter!(MarketShareConstraint, MarketShareConstraintId);

/// An emission cap for one mode in one year, in tCO2/year.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct EmissionCapByMode {
    /// Unique identifier
    pub id: EmissionCapId,
    /// The capped mode
    pub mode: ModeId,
    /// The year the cap applies to
    pub year: u32,
    /// The cap in tCO2/year
    pub cap: f64,
}
define_id_getter!(EmissionCapByMode, EmissionCapId);

/// A system-wide emission cap for one year, in tCO2/year.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct EmissionCapByYear {
    /// Unique identifier
    pub id: EmissionCapId,
    /// The year the cap applies to
    pub year: u32,
    /// The cap in tCO2/year
    pub cap: f64,
}
define_id_getter!(EmissionCapByYear, EmissionCapId);

/// A purchase subsidy for a tech vehicle, valid in the listed years.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct VehicleSubsidy {
    /// Unique identifier
    pub id: VehicleSubsidyId,
    /// Name of the subsidy
    pub name: String,
    /// Years in which the subsidy is valid
    pub years: Vec<u32>,
    /// The subsidised tech vehicle
    pub tech_vehicle: TechVehicleId,
    /// Subsidy in €/vehicle
    pub subsidy: f64,
}
define_id_getter!(VehicleSubsidy, VehicleSubsidyId);

/// A vehicle cohort that exists at the start of the optimization horizon.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct InitialVehicleStock {
    /// Unique identifier
    pub id: InitialVehicleStockId,
    /// The tech vehicle the cohort consists of
    pub tech_vehicle: TechVehicleId,
    /// Year the cohort was purchased (may pre-date the horizon)
    pub year_of_purchase: u32,
    /// Number of vehicles in the cohort at the start of the horizon
    pub stock: f64,
}
define_id_getter!(InitialVehicleStock, InitialVehicleStockId);

/// Mode infrastructure that exists at the start of the optimization horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialModeInfr {
    /// Unique identifier
    pub id: InitialModeInfrId,
    /// The mode the infrastructure serves
    pub mode: ModeId,
    /// The element the infrastructure is located at
    pub element: GeoRef,
    /// Installed transport capacity in units/year
    pub installed: f64,
}
define_id_getter!(InitialModeInfr, InitialModeInfrId);

/// Fueling infrastructure that exists at the start of the optimization horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialFuelingInfr {
    /// Unique identifier
    pub id: InitialFuelingInfrId,
    /// The technology the infrastructure fuels
    pub technology: TechnologyId,
    /// The element the infrastructure is located at
    pub element: GeoRef,
    /// Installed capacity in kW
    pub installed_kw: f64,
}
define_id_getter!(InitialFuelingInfr, InitialFuelingInfrId);
