//! Core network data structures.

use gf_core::{BoundaryId, FlowId, PortId, StoreId};

use crate::domain::{Domain, PortRole};

/// The element a port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOwner {
    Store(StoreId),
    Boundary(BoundaryId),
}

/// A typed connection point.
///
/// Ports are plain value records: they carry no potential or flow
/// themselves. The orchestrator keeps `{potential, flow}` arrays
/// indexed by `PortId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub owner: PortOwner,
    pub domain: Domain,
    pub role: PortRole,
}

/// A storage element entry: one scalar state integrated over time.
///
/// The state itself (value, capacity, accumulated flow) lives with the
/// orchestrator; the network only records that the store exists and
/// which port it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub domain: Domain,
    pub port: PortId,
}

/// A boundary entry: a port whose potential is prescribed each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub id: BoundaryId,
    pub name: String,
    pub domain: Domain,
    pub port: PortId,
}

/// A flow element entry: joins two ports of the same domain.
///
/// Each tick its flux is accumulated with opposite signs onto `port_a`
/// and `port_b`, so interior flows cancel by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDef {
    pub id: FlowId,
    pub name: String,
    pub domain: Domain,
    pub port_a: PortId,
    pub port_b: PortId,
}

/// The network: a validated, immutable collection of stores, boundaries,
/// flow elements and ports.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) stores: Vec<Store>,
    pub(crate) boundaries: Vec<Boundary>,
    pub(crate) flows: Vec<FlowDef>,
    pub(crate) ports: Vec<Port>,

    /// Offsets for port->flow adjacency: port i's incident flows are in
    /// port_flows[port_flow_offsets[i]..port_flow_offsets[i+1]].
    pub(crate) port_flow_offsets: Vec<usize>,

    /// Flat list of flow IDs incident to ports (sorted for determinism).
    pub(crate) port_flows: Vec<FlowId>,
}

impl Network {
    /// Return all storage element entries.
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    /// Return all boundary entries.
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Return all flow element entries.
    pub fn flows(&self) -> &[FlowDef] {
        &self.flows
    }

    /// Return all ports.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Get a store by ID (returns None if ID out of bounds).
    pub fn store(&self, id: StoreId) -> Option<&Store> {
        self.stores.get(id.index() as usize)
    }

    /// Get a boundary by ID (returns None if ID out of bounds).
    pub fn boundary(&self, id: BoundaryId) -> Option<&Boundary> {
        self.boundaries.get(id.index() as usize)
    }

    /// Get a flow element by ID (returns None if ID out of bounds).
    pub fn flow(&self, id: FlowId) -> Option<&FlowDef> {
        self.flows.get(id.index() as usize)
    }

    /// Get a port by ID (returns None if ID out of bounds).
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.index() as usize)
    }

    /// Iterate over all flow IDs incident to a given port.
    pub fn port_flows(&self, port_id: PortId) -> &[FlowId] {
        let idx = port_id.index() as usize;
        if idx >= self.ports.len() {
            return &[];
        }
        let start = self.port_flow_offsets[idx];
        let end = self.port_flow_offsets[idx + 1];
        &self.port_flows[start..end]
    }

    /// Look up a store by name.
    pub fn store_by_name(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.name == name)
    }

    /// Look up a boundary by name.
    pub fn boundary_by_name(&self, name: &str) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::Id;

    #[test]
    fn port_role_distinction() {
        let p = Port {
            id: Id::from_index(0),
            owner: PortOwner::Store(Id::from_index(0)),
            domain: Domain::Heat,
            role: PortRole::Interior,
        };
        assert_eq!(p.role, PortRole::Interior);
        assert_ne!(PortRole::Interior, PortRole::Boundary);
    }
}
