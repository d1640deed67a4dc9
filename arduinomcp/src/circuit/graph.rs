//! Connectivity graph over a circuit schema.
//!
//! Parts and nets become petgraph nodes, each pin connection an edge from
//! the part to the net. The graph answers the structural questions the
//! validation rules and the improvement advisor ask:
//! - Which nets touch a part, which parts sit on a net
//! - Parts with no connections at all
//! - Connections pointing at parts the schema never declares

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::schema::*;

/// Node type in the circuit graph
#[derive(Debug, Clone)]
pub enum CircuitNode {
    Part(Part),
    Net(Net),
}

impl CircuitNode {
    pub fn as_part(&self) -> Option<&Part> {
        match self {
            CircuitNode::Part(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_net(&self) -> Option<&Net> {
        match self {
            CircuitNode::Net(n) => Some(n),
            _ => None,
        }
    }
}

/// Edge type in the circuit graph - one pin attached to a net
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEdge {
    pub pin: String,
}

/// Graph view of a [`CircuitSchema`].
#[derive(Debug, Clone)]
pub struct Circuit {
    graph: DiGraph<CircuitNode, PinEdge>,

    /// part ref -> node index (first declaration wins)
    part_indices: HashMap<String, NodeIndex>,

    /// net name -> node index (first declaration wins)
    net_indices: HashMap<String, NodeIndex>,

    /// Connections whose part ref is not declared, in schema order
    dangling: Vec<(String, NetConnection)>,
}

impl Circuit {
    pub fn from_schema(schema: &CircuitSchema) -> Self {
        let mut circuit = Self {
            graph: DiGraph::new(),
            part_indices: HashMap::new(),
            net_indices: HashMap::new(),
            dangling: Vec::new(),
        };

        // Pass 1: parts
        for part in &schema.parts {
            let idx = circuit.graph.add_node(CircuitNode::Part(part.clone()));
            circuit.part_indices.entry(part.ref_des.clone()).or_insert(idx);
        }

        // Pass 2: nets and their pin edges
        for net in &schema.nets {
            let net_idx = circuit.graph.add_node(CircuitNode::Net(net.clone()));
            circuit.net_indices.entry(net.name.clone()).or_insert(net_idx);

            for conn in &net.connections {
                match circuit.part_indices.get(&conn.part_ref) {
                    Some(&part_idx) => {
                        circuit.graph.add_edge(
                            part_idx,
                            net_idx,
                            PinEdge {
                                pin: conn.pin.clone(),
                            },
                        );
                    }
                    None => circuit.dangling.push((net.name.clone(), conn.clone())),
                }
            }
        }

        circuit
    }

    pub fn part(&self, ref_des: &str) -> Option<&Part> {
        self.part_indices
            .get(ref_des)
            .and_then(|&idx| self.graph.node_weight(idx))
            .and_then(|n| n.as_part())
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.net_indices
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
            .and_then(|n| n.as_net())
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.graph.node_weights().filter_map(|n| n.as_part())
    }

    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.graph.node_weights().filter_map(|n| n.as_net())
    }

    /// Nets a part is attached to, deduplicated, in schema order.
    pub fn nets_for_part(&self, ref_des: &str) -> Vec<&Net> {
        let Some(&part_idx) = self.part_indices.get(ref_des) else {
            return Vec::new();
        };

        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(part_idx, Direction::Outgoing)
            .map(|edge| edge.target())
            .collect();
        targets.sort();
        targets.dedup();

        targets
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).and_then(|n| n.as_net()))
            .collect()
    }

    /// Parts attached to a net, deduplicated, in schema order.
    pub fn parts_on_net(&self, net_name: &str) -> Vec<&Part> {
        let Some(&net_idx) = self.net_indices.get(net_name) else {
            return Vec::new();
        };

        let mut sources: Vec<NodeIndex> = self
            .graph
            .edges_directed(net_idx, Direction::Incoming)
            .map(|edge| edge.source())
            .collect();
        sources.sort();
        sources.dedup();

        sources
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).and_then(|n| n.as_part()))
            .collect()
    }

    /// Parts that no net connection references.
    pub fn unconnected_parts(&self) -> Vec<&Part> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph[idx].as_part().is_some()
                    && self
                        .graph
                        .edges_directed(idx, Direction::Outgoing)
                        .next()
                        .is_none()
            })
            .filter_map(|idx| self.graph[idx].as_part())
            .collect()
    }

    /// `(net name, connection)` pairs whose part is not in the schema.
    pub fn dangling_connections(&self) -> &[(String, NetConnection)] {
        &self.dangling
    }

    pub fn stats(&self) -> CircuitStats {
        CircuitStats {
            part_count: self.parts().count(),
            net_count: self.nets().count(),
            connection_count: self.graph.edge_count(),
            power_net_count: self
                .nets()
                .filter(|n| crate::schematic::routing::NetKind::of(&n.name).is_supply())
                .count(),
        }
    }
}

/// Statistics about a circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub part_count: usize,
    pub net_count: usize,
    pub connection_count: usize,
    pub power_net_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_schema() -> CircuitSchema {
        let mut schema = CircuitSchema::new("test", PowerSpec::default());
        schema.parts = vec![
            Part::new("U1", "Arduino Uno R3"),
            Part::new("R1", "220 Ohm Resistor"),
            Part::new("J1", "Header"),
        ];
        schema.nets = vec![
            Net::new("VCC").with_connection("U1", "5V").with_connection("R1", "1"),
            Net::new("GND").with_connection("U1", "GND").with_connection("D9", "K"),
            Net::new("LED_STATUS")
                .with_connection("U1", "D13")
                .with_connection("R1", "2"),
        ];
        schema
    }

    #[test]
    fn test_circuit_creation() {
        let circuit = Circuit::from_schema(&create_test_schema());

        assert!(circuit.part("U1").is_some());
        assert!(circuit.part("D9").is_none());
        assert!(circuit.net("GND").is_some());
    }

    #[test]
    fn test_nets_for_part() {
        let circuit = Circuit::from_schema(&create_test_schema());

        let names: Vec<&str> = circuit
            .nets_for_part("U1")
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["VCC", "GND", "LED_STATUS"]);
    }

    #[test]
    fn test_parts_on_net() {
        let circuit = Circuit::from_schema(&create_test_schema());

        let refs: Vec<&str> = circuit
            .parts_on_net("VCC")
            .iter()
            .map(|p| p.ref_des.as_str())
            .collect();
        assert_eq!(refs, vec!["U1", "R1"]);
        assert!(circuit.parts_on_net("NOPE").is_empty());
    }

    #[test]
    fn test_unconnected_and_dangling() {
        let circuit = Circuit::from_schema(&create_test_schema());

        let unconnected: Vec<&str> = circuit
            .unconnected_parts()
            .iter()
            .map(|p| p.ref_des.as_str())
            .collect();
        assert_eq!(unconnected, vec!["J1"]);

        let dangling = circuit.dangling_connections();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].0, "GND");
        assert_eq!(dangling[0].1.part_ref, "D9");
    }

    #[test]
    fn test_circuit_stats() {
        let stats = Circuit::from_schema(&create_test_schema()).stats();

        assert_eq!(stats.part_count, 3);
        assert_eq!(stats.net_count, 3);
        assert_eq!(stats.connection_count, 5);
        assert_eq!(stats.power_net_count, 2);
    }
}
