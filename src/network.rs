//! The transport network: regions, connecting infrastructure and routes.
use crate::id::{define_id_getter, define_id_type};
use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize, de};
use std::fmt;
use std::str::FromStr;

define_id_type!(NodeId);
define_id_type!(EdgeId);
define_id_type!(PathId);

/// A geographic region.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Name of the region
    pub name: String,
    /// Carbon price in €/tCO2 for each horizon year
    pub carbon_price: Vec<f64>,
}
define_id_getter!(Node, NodeId);

/// A connection between two nodes, representing connecting transport infrastructure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,
    /// Name of the connection
    pub name: String,
    /// The node the edge starts from
    pub from: NodeId,
    /// The node the edge ends at
    pub to: NodeId,
    /// Length of the connection in km
    pub length: f64,
    /// Carbon price in €/tCO2 for each horizon year
    pub carbon_price: Vec<f64>,
}
define_id_getter!(Edge, EdgeId);

/// One element of a path sequence: either a passed-through node or a traversed edge.
///
/// Serialised in the case document as `"node:N"` / `"edge:N"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// A passed-through node
    Node(NodeId),
    /// A traversed edge
    Edge(EdgeId),
}

impl FromStr for PathElement {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .split_once(':')
            .with_context(|| format!("Invalid path element: {s}"))?;
        let id: u32 = id
            .trim()
            .parse()
            .with_context(|| format!("Invalid path element ID: {s}"))?;
        match kind.trim() {
            "node" => Ok(PathElement::Node(NodeId(id))),
            "edge" => Ok(PathElement::Edge(EdgeId(id))),
            _ => bail!("Invalid path element kind (expected node or edge): {s}"),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Node(id) => write!(f, "node:{id}"),
            PathElement::Edge(id) => write!(f, "edge:{id}"),
        }
    }
}

impl<'de> Deserialize<'de> for PathElement {
    fn deserialize<D>(deserialiser: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserialiser)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for PathElement {
    fn serialize<S>(&self, serialiser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialiser.collect_str(self)
    }
}

/// A possible route between two nodes.
///
/// The sequence lists the nodes that are passed through and the edges that connect them, in
/// travel order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Path {
    /// Unique identifier
    pub id: PathId,
    /// Name of the path
    pub name: String,
    /// Total length of the path in km
    pub length: f64,
    /// Sequence of nodes and edges that are passed through
    pub sequence: Vec<PathElement>,
}
define_id_getter!(Path, PathId);

impl Path {
    /// The first node of the sequence, if the sequence starts with one
    pub fn first_node(&self) -> Option<NodeId> {
        match self.sequence.first() {
            Some(PathElement::Node(id)) => Some(*id),
            _ => None,
        }
    }

    /// The last node of the sequence, if the sequence ends with one
    pub fn last_node(&self) -> Option<NodeId> {
        match self.sequence.last() {
            Some(PathElement::Node(id)) => Some(*id),
            _ => None,
        }
    }

    /// Check that the sequence forms a contiguous walk.
    ///
    /// The sequence must alternate nodes and edges, start and end with a node, and every edge
    /// must connect its neighbouring nodes (in either orientation).
    ///
    /// # Arguments
    ///
    /// * `edge_endpoints` - Resolves an edge ID to its `(from, to)` node pair
    pub fn check_walk<F>(&self, mut edge_endpoints: F) -> Result<()>
    where
        F: FnMut(EdgeId) -> Result<(NodeId, NodeId)>,
    {
        ensure!(!self.sequence.is_empty(), "Path {} is empty", self.id);

        let mut prev_node = match self.sequence[0] {
            PathElement::Node(id) => id,
            PathElement::Edge(_) => bail!("Path {} must start with a node", self.id),
        };

        let mut elements = self.sequence[1..].iter();
        while let Some(element) = elements.next() {
            let PathElement::Edge(edge_id) = element else {
                bail!("Path {}: expected an edge after node {prev_node}", self.id);
            };
            let (from, to) = edge_endpoints(*edge_id)?;

            let Some(PathElement::Node(next_node)) = elements.next() else {
                bail!("Path {}: edge {edge_id} must be followed by a node", self.id);
            };

            let connects = (from == prev_node && to == *next_node)
                || (from == *next_node && to == prev_node);
            ensure!(
                connects,
                "Path {}: edge {edge_id} does not connect nodes {prev_node} and {next_node}",
                self.id
            );
            prev_node = *next_node;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn walk_path(sequence: Vec<PathElement>) -> Path {
        Path {
            id: PathId(1),
            name: "p".into(),
            length: 1.0,
            sequence,
        }
    }

    fn endpoints(edge: EdgeId) -> Result<(NodeId, NodeId)> {
        // Edge i connects node i and node i+1
        Ok((NodeId(edge.0), NodeId(edge.0 + 1)))
    }

    #[rstest]
    #[case("node:1", PathElement::Node(NodeId(1)))]
    #[case("edge:42", PathElement::Edge(EdgeId(42)))]
    #[case("node: 7", PathElement::Node(NodeId(7)))] // whitespace should be stripped
    fn test_path_element_from_str_valid(#[case] input: &str, #[case] expected: PathElement) {
        assert_eq!(input.parse::<PathElement>().unwrap(), expected);
    }

    #[rstest]
    #[case("node1")]
    #[case("vertex:1")]
    #[case("edge:x")]
    fn test_path_element_from_str_invalid(#[case] input: &str) {
        assert!(input.parse::<PathElement>().is_err());
    }

    #[test]
    fn test_check_walk_valid() {
        let path = walk_path(vec![
            PathElement::Node(NodeId(1)),
            PathElement::Edge(EdgeId(1)),
            PathElement::Node(NodeId(2)),
            PathElement::Edge(EdgeId(2)),
            PathElement::Node(NodeId(3)),
        ]);
        assert!(path.check_walk(endpoints).is_ok());
    }

    #[test]
    fn test_check_walk_reversed_edge() {
        // Traversing edge 1 from node 2 back to node 1 is a valid walk
        let path = walk_path(vec![
            PathElement::Node(NodeId(2)),
            PathElement::Edge(EdgeId(1)),
            PathElement::Node(NodeId(1)),
        ]);
        assert!(path.check_walk(endpoints).is_ok());
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![PathElement::Edge(EdgeId(1))])]
    #[case(vec![PathElement::Node(NodeId(1)), PathElement::Node(NodeId(2))])]
    #[case(vec![PathElement::Node(NodeId(1)), PathElement::Edge(EdgeId(1))])]
    #[case(vec![
        PathElement::Node(NodeId(1)),
        PathElement::Edge(EdgeId(2)),
        PathElement::Node(NodeId(2)),
    ])] // edge 2 does not touch node 1
    fn test_check_walk_invalid(#[case] sequence: Vec<PathElement>) {
        assert!(walk_path(sequence).check_walk(endpoints).is_err());
    }
}
