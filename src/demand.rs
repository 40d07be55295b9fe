//! Transport demand: products and origin-destination relations.
use crate::id::{define_id_getter, define_id_type};
use crate::network::{NodeId, PathId};
use crate::region::{FinancialStatusId, RegiontypeId};
use serde::Deserialize;

define_id_type!(ProductId);
define_id_type!(OdpairId);

/// A good or service that is being transported.
///
/// This may include passengers, or different types of products in freight transport. Products
/// differ in their transportation needs and therefore in the set of modes, vehicle types and
/// drivetrain technologies available to them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Name of the product
    pub name: String,
}
define_id_getter!(Product, ProductId);

/// An origin-destination travel-demand relation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Odpair {
    /// Unique identifier
    pub id: OdpairId,
    /// The transported product
    pub product: ProductId,
    /// Origin of the transport demand
    pub origin: NodeId,
    /// Destination of the transport demand
    pub destination: NodeId,
    /// Candidate paths between origin and destination (at least one)
    pub paths: Vec<PathId>,
    /// Demand volume in units/year (passengers or tonnes) for each horizon year
    pub demand: Vec<f64>,
    /// Demographic group the demand belongs to
    pub financial_status: FinancialStatusId,
    /// Classification of the region the relation lies in
    pub region_type: RegiontypeId,
}
define_id_getter!(Odpair, OdpairId);
