//! Editor session: one canvas plus the stage components of its nodes.

use egui::{pos2, vec2, Pos2};
use std::collections::HashMap;

use crate::assembly::{assemble, PipelineConfig};
use crate::canvas::{CanvasNode, NodeGraphStore, NodeId};
use crate::config::CanvasSettings;
use crate::document::{CanvasDocument, StageEntry};
use crate::error::{DesignerError, Result, ResultExt};
use crate::registry::{StageDefinition, StageGroup, StageRegistry};
use crate::service::SampleSource;
use crate::stages::{StageComponent, StageFragment, StageNode};

/// World position of the first node laid out when restoring a pipeline.
const RESTORE_ORIGIN: Pos2 = pos2(40.0, 40.0);

/// Horizontal gap between restored nodes.
const RESTORE_GAP: f32 = 80.0;

pub struct EditorSession {
    store: NodeGraphStore,
    stages: HashMap<NodeId, StageNode>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&CanvasSettings::default())
    }
}

impl EditorSession {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            store: NodeGraphStore::new(settings),
            stages: HashMap::new(),
        }
    }

    pub fn store(&self) -> &NodeGraphStore {
        &self.store
    }

    /// Mutable canvas access for pointer input. Add and remove nodes through
    /// the session so stage components stay in step.
    pub fn store_mut(&mut self) -> &mut NodeGraphStore {
        &mut self.store
    }

    pub fn stage(&self, id: NodeId) -> Option<&StageNode> {
        self.stages.get(&id)
    }

    pub fn stage_mut(&mut self, id: NodeId) -> Option<&mut StageNode> {
        self.stages.get_mut(&id)
    }

    /// Node and stage component of `id`, borrowed together.
    pub fn parts_mut(&mut self, id: NodeId) -> Result<(&mut CanvasNode, &mut StageNode)> {
        let node = self
            .store
            .node_mut(id)
            .ok_or_else(|| DesignerError::ConfigurationUsage(format!("No node {}", id)))?;
        let stage = self.stages.get_mut(&id).ok_or_else(|| {
            DesignerError::ConfigurationUsage(format!("Node {} has no stage component", id))
        })?;
        Ok((node, stage))
    }

    /// Insert the stage picked from the open context menu.
    pub fn insert_from_menu(&mut self, group: StageGroup, version: &str) -> Option<NodeId> {
        let id = self.store.insert_from_menu(group, version)?;
        self.attach(id);
        Some(id)
    }

    /// Insert a stage near `anchor` without going through the menu.
    pub fn insert_stage(&mut self, definition: &StageDefinition, anchor: Pos2) -> NodeId {
        let id = self.store.insert_stage(definition, anchor);
        self.attach(id);
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<CanvasNode> {
        self.stages.remove(&id);
        self.store.remove_node(id)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.stages.clear();
    }

    fn attach(&mut self, id: NodeId) {
        let Some(node) = self.store.node(id) else {
            return;
        };
        match StageNode::for_kind(node.kind) {
            Some(stage) => {
                self.stages.insert(id, stage);
            }
            None => tracing::debug!("No stage component for {:?}", node.kind),
        }
    }

    /// Load the sample of an extract node and refresh downstream field trees.
    ///
    /// A failed fetch is recorded on the stage's loader, not returned.
    pub fn load_sample(&mut self, id: NodeId, source: &dyn SampleSource) -> Result<()> {
        let (node, stage) = self.parts_mut(id)?;
        let Some(extract) = stage.as_api_extract_mut() else {
            return Err(DesignerError::ConfigurationUsage(format!(
                "Node {} does not load samples",
                id
            )));
        };
        extract.load_sample(node, source);
        self.propagate_fields();
        Ok(())
    }

    /// Copy the selected fields of the extract stage into every transform
    /// stage, keeping rules that still apply.
    pub fn propagate_fields(&mut self) {
        let Some(upstream) = self
            .store
            .nodes()
            .iter()
            .rev()
            .filter(|n| n.group == StageGroup::Extract)
            .find_map(|n| n.field_tree.clone())
        else {
            return;
        };

        let transform_ids: Vec<NodeId> = self
            .store
            .nodes()
            .iter()
            .filter(|n| n.group == StageGroup::Transform)
            .map(|n| n.id)
            .collect();

        for id in transform_ids {
            if let (Some(node), Some(StageNode::RulesTransform(stage))) =
                (self.store.node_mut(id), self.stages.get(&id))
            {
                stage.sync_fields(node, &upstream);
            }
        }
    }

    /// Assemble the canvas into a pipeline configuration.
    pub fn build_config(&self, pipeline_id: &str) -> Result<PipelineConfig> {
        assemble(self.store.nodes(), |node| self.stages.get(&node.id), pipeline_id)
    }

    /// Replace the canvas with one node per section of `config`.
    pub fn load_config(&mut self, config: &PipelineConfig) -> Result<()> {
        self.clear();

        let sections = [
            (
                StageGroup::Extract,
                "restapi",
                StageFragment::Extract(config.extract_config.clone()),
            ),
            (
                StageGroup::Transform,
                "rules",
                StageFragment::Transform(config.transform_config.clone()),
            ),
            (
                StageGroup::Load,
                "database",
                StageFragment::Load(config.load_config.clone()),
            ),
        ];

        let spacing = self.store.default_node_size().x + RESTORE_GAP;
        for (i, (group, version, fragment)) in sections.into_iter().enumerate() {
            let definition = StageRegistry::resolve(group, version)?;
            let anchor = RESTORE_ORIGIN + vec2(spacing * i as f32, 0.0);
            let id = self.insert_stage(definition, anchor);
            let (node, stage) = self.parts_mut(id)?;
            stage
                .apply_config(node, fragment)
                .with_context(|| format!("Failed to restore {} stage", group))?;
        }

        tracing::info!("Restored pipeline '{}' onto the canvas", config.id);
        Ok(())
    }

    pub fn snapshot(&self, pipeline_id: &str) -> CanvasDocument {
        let nodes = self.store.nodes().to_vec();
        let stages = nodes
            .iter()
            .filter_map(|node| {
                let stage = self.stages.get(&node.id)?;
                Some(StageEntry {
                    node: node.id,
                    fragment: stage.config(node),
                })
            })
            .collect();

        CanvasDocument {
            pipeline_id: pipeline_id.to_string(),
            nodes,
            stages,
            ..Default::default()
        }
    }

    /// Replace the canvas with a saved document.
    pub fn restore(&mut self, document: &CanvasDocument) -> Result<()> {
        self.clear();

        for saved in &document.nodes {
            let id = self.store.push_node(saved.clone());
            self.attach(id);

            let Some(fragment) = document.fragment_for(saved.id) else {
                continue;
            };
            if let Ok((node, stage)) = self.parts_mut(id) {
                stage
                    .apply_config(node, fragment.clone())
                    .with_context(|| format!("Failed to restore node {}", saved.id))?;
            } else {
                tracing::warn!("Saved settings for node {} have no stage to apply to", saved.id);
            }
        }

        Ok(())
    }
}
