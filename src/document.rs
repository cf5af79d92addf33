//! Saved canvas documents.
//!
//! A canvas document keeps what a pipeline configuration cannot: node
//! positions, field trees with their selection, and the stage settings of
//! every node, including nodes that would not make a complete pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::canvas::{CanvasNode, NodeId};
use crate::error::{DesignerError, Result};
use crate::stages::StageFragment;

/// Canvas file extension
pub const CANVAS_FILE_EXTENSION: &str = "etlcanvas";

/// Stage settings of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub node: NodeId,
    pub fragment: StageFragment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    /// Document format version
    #[serde(default = "default_document_version")]
    pub version: u32,

    /// Id the assembled pipeline is saved under
    #[serde(default)]
    pub pipeline_id: String,

    #[serde(default)]
    pub nodes: Vec<CanvasNode>,

    #[serde(default)]
    pub stages: Vec<StageEntry>,
}

fn default_document_version() -> u32 {
    1
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self {
            version: 1,
            pipeline_id: String::new(),
            nodes: Vec::new(),
            stages: Vec::new(),
        }
    }
}

impl CanvasDocument {
    pub fn fragment_for(&self, id: NodeId) -> Option<&StageFragment> {
        self.stages
            .iter()
            .find(|entry| entry.node == id)
            .map(|entry| &entry.fragment)
    }

    /// Load a canvas document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DesignerError::Config(format!("Failed to read canvas file {:?}: {}", path, e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            DesignerError::Config(format!("Failed to parse canvas file {:?}: {}", path, e))
        })
    }

    /// Save the document to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DesignerError::Config(format!("Failed to create canvas directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DesignerError::Config(format!("Failed to serialize canvas: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DesignerError::Config(format!("Failed to write canvas file {:?}: {}", path, e))
        })
    }
}
