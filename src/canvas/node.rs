//! Nodes placed on the canvas.

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::registry::{StageDefinition, StageGroup, StageKind};
use crate::schema::FieldNode;

/// A stage instance on the canvas, in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub kind: StageKind,
    pub title: String,
    pub icon: String,
    pub group: StageGroup,
    /// Field tree inferred from the stage's sample, if one was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_tree: Option<Vec<FieldNode>>,
    /// Rendered size as last reported by the view.
    pub width: f32,
    pub height: f32,
}

impl CanvasNode {
    pub fn new(id: NodeId, definition: &StageDefinition, pos: Pos2, size: Vec2) -> Self {
        Self {
            id,
            x: pos.x,
            y: pos.y,
            kind: definition.kind,
            title: definition.title.to_string(),
            icon: definition.icon.to_string(),
            group: definition.group,
            field_tree: None,
            width: size.x,
            height: size.y,
        }
    }

    pub fn pos(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.pos(), self.size())
    }

    /// Rectangle this node would occupy at `pos`.
    pub fn rect_at(&self, pos: Pos2) -> Rect {
        Rect::from_min_size(pos, self.size())
    }

    pub fn set_pos(&mut self, pos: Pos2) {
        self.x = pos.x;
        self.y = pos.y;
    }
}
