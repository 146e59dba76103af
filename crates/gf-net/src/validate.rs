//! Network validation logic.

use gf_core::GfResult;

use crate::domain::PortRole;
use crate::error::NetError;
use crate::network::{Boundary, FlowDef, Port, PortOwner, Store};

/// Validate the network structure: all references exist, domains are
/// consistent, ownership is coherent.
pub(crate) fn validate_structure(
    stores: &[Store],
    boundaries: &[Boundary],
    flows: &[FlowDef],
    ports: &[Port],
) -> GfResult<()> {
    // IDs must be contiguous and match their indices
    for (i, port) in ports.iter().enumerate() {
        if port.id.index() as usize != i {
            return Err(NetError::InconsistentIndex { what: "port" }.into());
        }
    }
    for (i, store) in stores.iter().enumerate() {
        if store.id.index() as usize != i {
            return Err(NetError::InconsistentIndex { what: "store" }.into());
        }
    }
    for (i, flow) in flows.iter().enumerate() {
        if flow.id.index() as usize != i {
            return Err(NetError::InconsistentIndex { what: "flow" }.into());
        }
    }

    // Every store/boundary must own the port it references
    for store in stores {
        let port = ports
            .get(store.port.index() as usize)
            .ok_or(NetError::OwnerMismatch { port: store.port })?;
        match port.owner {
            PortOwner::Store(id) if id == store.id => {}
            _ => return Err(NetError::OwnerMismatch { port: store.port }.into()),
        }
        if port.domain != store.domain || port.role != PortRole::Interior {
            return Err(NetError::OwnerMismatch { port: store.port }.into());
        }
    }
    for boundary in boundaries {
        let port = ports
            .get(boundary.port.index() as usize)
            .ok_or(NetError::OwnerMismatch {
                port: boundary.port,
            })?;
        match port.owner {
            PortOwner::Boundary(id) if id == boundary.id => {}
            _ => {
                return Err(NetError::OwnerMismatch {
                    port: boundary.port,
                }
                .into());
            }
        }
        if port.domain != boundary.domain || port.role != PortRole::Boundary {
            return Err(NetError::OwnerMismatch {
                port: boundary.port,
            }
            .into());
        }
    }

    // Every flow: valid distinct ports, matching domains, at least one
    // interior end (a boundary-to-boundary flow balances nothing)
    for flow in flows {
        let mut roles = [PortRole::Boundary; 2];
        for (slot, port_id) in [flow.port_a, flow.port_b].into_iter().enumerate() {
            let port =
                ports
                    .get(port_id.index() as usize)
                    .ok_or(NetError::InvalidPortRef {
                        flow: flow.id,
                        port: port_id,
                    })?;
            if port.domain != flow.domain {
                return Err(NetError::DomainMismatch {
                    flow: flow.id,
                    expected: flow.domain,
                    actual: port.domain,
                }
                .into());
            }
            roles[slot] = port.role;
        }
        if flow.port_a == flow.port_b {
            return Err(NetError::SelfConnection { flow: flow.id }.into());
        }
        if roles == [PortRole::Boundary, PortRole::Boundary] {
            return Err(NetError::BoundaryOnlyFlow { flow: flow.id }.into());
        }
    }

    Ok(())
}
