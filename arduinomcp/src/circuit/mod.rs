//! Circuit Schema Module
//!
//! The normalized circuit description every tool produces or consumes,
//! the lenient resolution used on tool inputs, and a petgraph
//! connectivity view used by validation.

pub mod schema;
pub mod resolve;
pub mod graph;

pub use schema::*;
pub use resolve::{default_circuit_schema, parse_power_supply, resolve_circuit_schema, FallbackSpec};
pub use graph::{Circuit, CircuitStats};
