//! Identity type for canvas nodes.
//!
//! Ids are handed out by the owning [`NodeGraphStore`](super::NodeGraphStore)
//! from its own counter, so two editor instances never share one. Ids are not
//! reused until that counter runs out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a node on one canvas.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// The id following this one; saturates at [`NodeId::INVALID`].
    #[inline]
    pub fn next(self) -> NodeId {
        NodeId(self.0.saturating_add(1))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert!(id.is_valid());
        assert_eq!(id.next(), NodeId(43));
        assert!(!NodeId::INVALID.is_valid());
    }

    #[test]
    fn test_next_saturates_at_invalid() {
        assert_eq!(NodeId(u32::MAX - 1).next(), NodeId::INVALID);
        assert_eq!(NodeId::INVALID.next(), NodeId::INVALID);
    }

    #[test]
    fn test_node_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&NodeId(7)).unwrap(), "7");
        let id: NodeId = serde_json::from_str("12").unwrap();
        assert_eq!(id, NodeId(12));
    }
}
