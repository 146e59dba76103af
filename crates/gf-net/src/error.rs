//! Network-specific error types.

use gf_core::{FlowId, GfError, PortId};

use crate::domain::Domain;

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// A flow element refers to a port that doesn't exist.
    InvalidPortRef { flow: FlowId, port: PortId },

    /// A flow element joins two ports of different domains.
    DomainMismatch {
        flow: FlowId,
        expected: Domain,
        actual: Domain,
    },

    /// A flow element connects a port to itself.
    SelfConnection { flow: FlowId },

    /// A flow element joins two boundary ports; nothing would be balanced.
    BoundaryOnlyFlow { flow: FlowId },

    /// A store or boundary references a port owned by something else.
    OwnerMismatch { port: PortId },

    /// Entry IDs are not contiguous with their vector indices.
    InconsistentIndex { what: &'static str },
}

impl std::fmt::Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::InvalidPortRef { flow, port } => {
                write!(f, "Flow {} refers to non-existent port {}", flow, port)
            }
            NetError::DomainMismatch {
                flow,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Flow {} is a {} element but touches a {} port",
                    flow,
                    expected.label(),
                    actual.label()
                )
            }
            NetError::SelfConnection { flow } => {
                write!(f, "Flow {} connects a port to itself", flow)
            }
            NetError::BoundaryOnlyFlow { flow } => {
                write!(f, "Flow {} connects two boundary ports", flow)
            }
            NetError::OwnerMismatch { port } => {
                write!(f, "Port {} is referenced by an element that does not own it", port)
            }
            NetError::InconsistentIndex { what } => {
                write!(f, "{} IDs are not contiguous with storage order", what)
            }
        }
    }
}

impl std::error::Error for NetError {}

impl From<NetError> for GfError {
    fn from(err: NetError) -> Self {
        GfError::Invariant {
            what: Box::leak(err.to_string().into_boxed_str()),
        }
    }
}
