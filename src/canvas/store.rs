//! Canvas node collection and the pointer interaction state machine.
//!
//! Pointer events arrive in screen space. The store converts them through its
//! [`ViewportController`] and decides whether a gesture is a pan, a node drag
//! or a context-menu click.

use egui::{Pos2, Rect, Vec2};

use super::id::NodeId;
use super::node::CanvasNode;
use super::placement::PlacementSolver;
use super::viewport::ViewportController;
use crate::config::CanvasSettings;
use crate::registry::{StageDefinition, StageGroup, StageRegistry};

/// Pointer buttons the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What the current pointer gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Panning the viewport; `last` is the previous cursor position.
    Panning { last: Pos2 },
    /// Dragging the node at `index`; `last` is the cursor position of the last
    /// committed move.
    DraggingNode { index: usize, last: Pos2 },
}

/// Press-to-release bookkeeping used to tell clicks from drags.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    button: PointerButton,
    start: Pos2,
    moved: bool,
}

/// An open "add stage" menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub screen: Pos2,
    pub world: Pos2,
}

pub struct NodeGraphStore {
    nodes: Vec<CanvasNode>,
    viewport: ViewportController,
    placement: PlacementSolver,
    state: InteractionState,
    gesture: Option<Gesture>,
    context_menu: Option<ContextMenu>,
    next_id: NodeId,
    drag_threshold: f32,
    default_size: Vec2,
}

impl Default for NodeGraphStore {
    fn default() -> Self {
        Self::new(&CanvasSettings::default())
    }
}

impl NodeGraphStore {
    pub fn new(settings: &CanvasSettings) -> Self {
        let mut settings = settings.clone();
        settings.sanitize();
        Self {
            nodes: Vec::new(),
            viewport: ViewportController::new(&settings),
            placement: PlacementSolver::new(&settings),
            state: InteractionState::Idle,
            gesture: None,
            context_menu: None,
            next_id: NodeId(1),
            drag_threshold: settings.drag_threshold,
            default_size: settings.default_node_size(),
        }
    }

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut CanvasNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    /// Size given to nodes the view has not measured yet.
    pub fn default_node_size(&self) -> Vec2 {
        self.default_size
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn context_menu(&self) -> Option<ContextMenu> {
        self.context_menu
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Open the insertion menu at a screen position.
    pub fn open_context_menu(&mut self, screen: Pos2) -> ContextMenu {
        let menu = ContextMenu {
            screen,
            world: self.viewport.screen_to_world(screen),
        };
        self.context_menu = Some(menu);
        menu
    }

    // ---- pointer input ----

    /// A button went down over empty canvas.
    pub fn pointer_down(&mut self, button: PointerButton, screen: Pos2) {
        self.context_menu = None;
        self.gesture = Some(Gesture {
            button,
            start: screen,
            moved: false,
        });
    }

    /// The primary button went down on the drag handle of the node at `index`.
    ///
    /// Returns false if there is no such node.
    pub fn press_drag_handle(&mut self, index: usize, screen: Pos2) -> bool {
        self.context_menu = None;
        if index >= self.nodes.len() {
            tracing::debug!("Drag handle press on missing node index {}", index);
            return false;
        }
        self.gesture = Some(Gesture {
            button: PointerButton::Primary,
            start: screen,
            moved: false,
        });
        self.state = InteractionState::DraggingNode {
            index,
            last: screen,
        };
        true
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        if let Some(gesture) = self.gesture.as_mut() {
            let delta = screen - gesture.start;
            if delta.x.abs() > self.drag_threshold || delta.y.abs() > self.drag_threshold {
                gesture.moved = true;
            }
        }

        match self.state {
            InteractionState::Idle => {
                let Some(gesture) = self.gesture else {
                    return;
                };
                let pans = matches!(gesture.button, PointerButton::Secondary | PointerButton::Middle);
                if pans && gesture.moved {
                    self.state = InteractionState::Panning {
                        last: gesture.start,
                    };
                    self.pan_to(screen);
                }
            }
            InteractionState::Panning { .. } => self.pan_to(screen),
            InteractionState::DraggingNode { index, last } => self.drag_to(index, last, screen),
        }
    }

    /// A button was released. Returns the context menu if this release opened one.
    pub fn pointer_up(&mut self, button: PointerButton, screen: Pos2) -> Option<ContextMenu> {
        let gesture = self.gesture.take();
        self.state = InteractionState::Idle;

        let is_click = gesture.is_some_and(|g| g.button == PointerButton::Secondary && !g.moved);
        if button == PointerButton::Secondary && is_click {
            Some(self.open_context_menu(screen))
        } else {
            None
        }
    }

    /// Zoom around the cursor.
    pub fn wheel(&mut self, scroll_y: f32, cursor: Pos2) {
        self.viewport.zoom_at(scroll_y, cursor);
    }

    fn pan_to(&mut self, screen: Pos2) {
        if let InteractionState::Panning { last } = self.state {
            self.viewport.pan_by(screen - last);
            self.state = InteractionState::Panning { last: screen };
        }
    }

    fn drag_to(&mut self, index: usize, last: Pos2, screen: Pos2) {
        let delta = self.viewport.screen_delta_to_world(screen - last);
        let Some(node) = self.nodes.get(index) else {
            self.state = InteractionState::Idle;
            return;
        };

        let proposed = node.rect_at(node.pos() + delta);
        let collides = self
            .nodes
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && super::geometry::overlaps(proposed, other.rect()));

        // On collision the reference point stays put, so the cursor offset keeps
        // accumulating until a clear position is reached.
        if collides {
            return;
        }

        if let Some(node) = self.nodes.get_mut(index) {
            node.set_pos(proposed.min);
        }
        self.state = InteractionState::DraggingNode {
            index,
            last: screen,
        };
    }

    // ---- node management ----

    /// Insert the stage chosen from the open context menu.
    ///
    /// Unknown or disabled kinds are logged and leave the canvas unchanged.
    pub fn insert_from_menu(&mut self, group: StageGroup, version: &str) -> Option<NodeId> {
        let Some(menu) = self.context_menu else {
            tracing::warn!("Stage insertion requested with no open menu");
            return None;
        };

        let definition = match StageRegistry::resolve(group, version) {
            Ok(definition) => definition,
            Err(e) => {
                tracing::warn!("Ignoring stage insertion: {}", e);
                return None;
            }
        };

        let id = self.insert_stage(definition, menu.world);
        self.context_menu = None;
        Some(id)
    }

    /// Place a new node for `definition` as close to `anchor` as space allows.
    pub fn insert_stage(&mut self, definition: &StageDefinition, anchor: Pos2) -> NodeId {
        let occupied: Vec<Rect> = self.nodes.iter().map(CanvasNode::rect).collect();
        let placement = self.placement.find(anchor, self.default_size, &occupied);

        let id = self.allocate_id();
        self.nodes.push(CanvasNode::new(
            id,
            definition,
            placement.position(),
            self.default_size,
        ));
        tracing::debug!(
            "Inserted {} node {} at {:?}{}",
            definition.group,
            id,
            placement.position(),
            if placement.is_degraded() { " (fallback)" } else { "" }
        );
        id
    }

    /// Append an existing node, e.g. from a saved canvas.
    ///
    /// Keeps the node's id unless it is invalid or already taken.
    pub fn push_node(&mut self, mut node: CanvasNode) -> NodeId {
        if !node.id.is_valid() || self.node(node.id).is_some() {
            node.id = self.allocate_id();
        } else if node.id >= self.next_id {
            self.next_id = node.id.next();
        }
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<CanvasNode> {
        let removed = self.index_of(id)?;

        if let InteractionState::DraggingNode { index, last } = self.state {
            if index == removed {
                self.state = InteractionState::Idle;
                self.gesture = None;
            } else if index > removed {
                self.state = InteractionState::DraggingNode {
                    index: index - 1,
                    last,
                };
            }
        }

        Some(self.nodes.remove(removed))
    }

    /// Record the size the view rendered a node at.
    pub fn set_node_size(&mut self, id: NodeId, size: Vec2) {
        if let Some(node) = self.node_mut(id) {
            node.width = size.x;
            node.height = size.y;
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.state = InteractionState::Idle;
        self.gesture = None;
        self.context_menu = None;
    }

    fn allocate_id(&mut self) -> NodeId {
        if self.next_id.is_valid() {
            let id = self.next_id;
            self.next_id = id.next();
            return id;
        }

        // The counter ran out (restored ids near the top of the range); fall
        // back to the lowest id not on the canvas.
        let mut used: Vec<u32> = self.nodes.iter().map(|n| n.id.0).collect();
        used.sort_unstable();
        let mut candidate = 1;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        tracing::debug!("Node id counter exhausted, reusing id {}", candidate);
        NodeId(candidate)
    }
}
