//! The editing canvas: node storage, viewport transform, placement and
//! pointer interaction.

pub mod geometry;
pub mod id;
pub mod node;
pub mod placement;
pub mod store;
pub mod viewport;

pub use geometry::{overlaps, overlaps_any};
pub use id::NodeId;
pub use node::CanvasNode;
pub use placement::{Placement, PlacementSolver};
pub use store::{ContextMenu, InteractionState, NodeGraphStore, PointerButton};
pub use viewport::ViewportController;
