//! gf-net: exchange-network layer for greenflow.
//!
//! Provides:
//! - Physical domains (heat, water vapor, CO2) and typed port definitions
//! - Storage, boundary and flow-element registration by stable ID
//! - Incremental network builder with structural validation
//! - Immutable `Network` with compact port adjacency
//!
//! The network is pure topology: which storage and boundary ports exist
//! and which flow elements connect them. Potentials and flows live with
//! the orchestrator that owns the run, so the same network can back many
//! simulations.
//!
//! # Example
//!
//! ```
//! use gf_net::{Domain, NetworkBuilder};
//!
//! let mut builder = NetworkBuilder::new();
//! let air = builder.add_store("air", Domain::Heat);
//! let out = builder.add_boundary("outside", Domain::Heat);
//! builder.connect("vent", Domain::Heat, builder.store_port(air), builder.boundary_port(out)).unwrap();
//! let net = builder.build().unwrap();
//!
//! assert_eq!(net.stores().len(), 1);
//! assert_eq!(net.flows().len(), 1);
//! ```

pub mod builder;
pub mod domain;
pub mod error;
pub mod network;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use domain::{Domain, PortRole};
pub use error::NetError;
pub use network::{Boundary, FlowDef, Network, Port, PortOwner, Store};
