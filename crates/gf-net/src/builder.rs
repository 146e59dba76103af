//! Incremental network builder.

use std::collections::HashMap;
use gf_core::{BoundaryId, FlowId, GfResult, PortId, StoreId};

use crate::domain::{Domain, PortRole};
use crate::network::{Boundary, FlowDef, Network, Port, PortOwner, Store};
use crate::validate;

/// Builder for constructing an exchange network incrementally.
///
/// Use `add_store`, `add_boundary` and `connect` to build up the
/// topology, then call `build()` to validate and freeze it into an
/// immutable `Network`. Connections are registered once at build time;
/// no component ever holds a live reference into another.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    stores: Vec<Store>,
    boundaries: Vec<Boundary>,
    flows: Vec<FlowDef>,
    ports: Vec<Port>,
    next_store_id: u32,
    next_boundary_id: u32,
    next_flow_id: u32,
    next_port_id: u32,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_port(&mut self, owner: PortOwner, domain: Domain, role: PortRole) -> PortId {
        let id = PortId::from_index(self.next_port_id);
        self.next_port_id += 1;
        self.ports.push(Port {
            id,
            owner,
            domain,
            role,
        });
        id
    }

    /// Add a storage element and return its ID.
    ///
    /// Automatically creates the store's interior port.
    pub fn add_store(&mut self, name: impl Into<String>, domain: Domain) -> StoreId {
        let id = StoreId::from_index(self.next_store_id);
        self.next_store_id += 1;
        let port = self.alloc_port(PortOwner::Store(id), domain, PortRole::Interior);
        self.stores.push(Store {
            id,
            name: name.into(),
            domain,
            port,
        });
        id
    }

    /// Add a boundary and return its ID.
    ///
    /// Automatically creates the boundary's port; its potential is
    /// prescribed by the orchestrator each tick.
    pub fn add_boundary(&mut self, name: impl Into<String>, domain: Domain) -> BoundaryId {
        let id = BoundaryId::from_index(self.next_boundary_id);
        self.next_boundary_id += 1;
        let port = self.alloc_port(PortOwner::Boundary(id), domain, PortRole::Boundary);
        self.boundaries.push(Boundary {
            id,
            name: name.into(),
            domain,
            port,
        });
        id
    }

    /// Port of a previously added store.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not returned by this builder's `add_store`.
    pub fn store_port(&self, id: StoreId) -> PortId {
        self.stores[id.index() as usize].port
    }

    /// Port of a previously added boundary.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not returned by this builder's `add_boundary`.
    pub fn boundary_port(&self, id: BoundaryId) -> PortId {
        self.boundaries[id.index() as usize].port
    }

    /// Register a flow element joining two ports.
    ///
    /// Registers the flux source for both ports without mutating either
    /// port's potential; the orchestrator accumulates the computed flux
    /// with opposite signs onto the two ports each tick. Both ports must
    /// exist and carry `domain` (checked again in `build()`).
    pub fn connect(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
        port_a: PortId,
        port_b: PortId,
    ) -> GfResult<FlowId> {
        // Early checks so misuse fails close to the call site
        for port in [port_a, port_b] {
            let Some(p) = self.ports.get(port.index() as usize) else {
                return Err(crate::NetError::InvalidPortRef {
                    flow: FlowId::from_index(self.next_flow_id),
                    port,
                }
                .into());
            };
            if p.domain != domain {
                return Err(crate::NetError::DomainMismatch {
                    flow: FlowId::from_index(self.next_flow_id),
                    expected: domain,
                    actual: p.domain,
                }
                .into());
            }
        }
        if port_a == port_b {
            return Err(crate::NetError::SelfConnection {
                flow: FlowId::from_index(self.next_flow_id),
            }
            .into());
        }

        let id = FlowId::from_index(self.next_flow_id);
        self.next_flow_id += 1;
        self.flows.push(FlowDef {
            id,
            name: name.into(),
            domain,
            port_a,
            port_b,
        });
        Ok(id)
    }

    /// Build and validate the network, returning an immutable `Network`.
    ///
    /// This performs validation and constructs compact adjacency lists.
    pub fn build(self) -> GfResult<Network> {
        validate::validate_structure(&self.stores, &self.boundaries, &self.flows, &self.ports)?;

        let (port_flow_offsets, port_flows) = Self::build_adjacency(&self.ports, &self.flows);

        Ok(Network {
            stores: self.stores,
            boundaries: self.boundaries,
            flows: self.flows,
            ports: self.ports,
            port_flow_offsets,
            port_flows,
        })
    }

    /// Build compact adjacency lists: for each port, collect incident flows.
    fn build_adjacency(ports: &[Port], flows: &[FlowDef]) -> (Vec<usize>, Vec<FlowId>) {
        let mut port_to_flows: HashMap<PortId, Vec<FlowId>> = HashMap::new();
        for flow in flows {
            port_to_flows.entry(flow.port_a).or_default().push(flow.id);
            port_to_flows.entry(flow.port_b).or_default().push(flow.id);
        }

        // Sort each port's flow list for determinism
        for list in port_to_flows.values_mut() {
            list.sort_by_key(|f| f.index());
        }

        let mut offsets = Vec::with_capacity(ports.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);

        for port in ports {
            if let Some(list) = port_to_flows.get(&port.id) {
                flat.extend_from_slice(list);
            }
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = NetworkBuilder::new();
        let air = builder.add_store("air", Domain::Heat);
        let cover = builder.add_store("cover", Domain::Heat);
        let f = builder
            .connect(
                "cnv_air_cover",
                Domain::Heat,
                builder.store_port(air),
                builder.store_port(cover),
            )
            .unwrap();

        assert_eq!(air.index(), 0);
        assert_eq!(cover.index(), 1);
        assert_eq!(f.index(), 0);
        assert_eq!(builder.stores.len(), 2);
        assert_eq!(builder.ports.len(), 2);
    }

    #[test]
    fn connect_rejects_domain_mismatch() {
        let mut builder = NetworkBuilder::new();
        let air = builder.add_store("air_t", Domain::Heat);
        let vp = builder.add_store("air_vp", Domain::Vapour);
        let err = builder.connect(
            "bad",
            Domain::Heat,
            builder.store_port(air),
            builder.store_port(vp),
        );
        assert!(err.is_err());
    }

    #[test]
    fn connect_rejects_self_connection() {
        let mut builder = NetworkBuilder::new();
        let air = builder.add_store("air", Domain::Heat);
        let p = builder.store_port(air);
        assert!(builder.connect("self", Domain::Heat, p, p).is_err());
    }

    #[test]
    fn build_adjacency_is_sorted() {
        let mut builder = NetworkBuilder::new();
        let air = builder.add_store("air", Domain::Heat);
        let cover = builder.add_store("cover", Domain::Heat);
        let floor = builder.add_store("floor", Domain::Heat);
        let air_p = builder.store_port(air);
        builder
            .connect("a", Domain::Heat, air_p, builder.store_port(cover))
            .unwrap();
        builder
            .connect("b", Domain::Heat, air_p, builder.store_port(floor))
            .unwrap();

        let net = builder.build().unwrap();
        let incident = net.port_flows(air_p);
        assert_eq!(incident.len(), 2);
        assert!(incident[0].index() < incident[1].index());
    }
}
