//! Folding stage fragments into one pipeline configuration.

use super::config::{ExtractConfig, LoadConfig, PipelineConfig, TransformConfig};
use crate::canvas::CanvasNode;
use crate::error::{DesignerError, Result};
use crate::registry::StageGroup;
use crate::stages::{StageComponent, StageFragment};

/// Sections collected so far. Each group keeps the last fragment it saw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDraft {
    pub extract: Option<ExtractConfig>,
    pub transform: Option<TransformConfig>,
    pub load: Option<LoadConfig>,
}

impl PipelineDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the fragment produced by `node`.
    ///
    /// A fragment whose group differs from the node's is skipped with a
    /// warning.
    pub fn accept(&mut self, node: &CanvasNode, fragment: StageFragment) {
        if fragment.group() != node.group {
            tracing::warn!(
                "Node {} ({}) produced a {} fragment, skipping",
                node.id,
                node.group,
                fragment.group()
            );
            return;
        }

        let replaced = match fragment {
            StageFragment::Extract(config) => self.extract.replace(config).is_some(),
            StageFragment::Transform(config) => self.transform.replace(config).is_some(),
            StageFragment::Load(config) => self.load.replace(config).is_some(),
        };
        if replaced {
            tracing::debug!("Node {} overrides an earlier {} section", node.id, node.group);
        }
    }

    /// Groups that have no section yet, in pipeline order.
    pub fn missing(&self) -> Vec<StageGroup> {
        let present = [
            self.extract.is_some(),
            self.transform.is_some(),
            self.load.is_some(),
        ];
        StageGroup::ALL
            .into_iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(group, _)| group)
            .collect()
    }

    /// Complete the draft under `id`, naming every absent section on failure.
    pub fn finish(self, id: impl Into<String>) -> Result<PipelineConfig> {
        match (self.extract, self.transform, self.load) {
            (Some(extract_config), Some(transform_config), Some(load_config)) => {
                Ok(PipelineConfig {
                    id: id.into(),
                    extract_config,
                    transform_config,
                    load_config,
                })
            }
            (extract, transform, load) => {
                let draft = PipelineDraft {
                    extract,
                    transform,
                    load,
                };
                Err(DesignerError::MissingStage(draft.missing()))
            }
        }
    }
}

/// Build a pipeline from canvas nodes in order.
///
/// `component` returns the stage component of a node, or `None` for nodes
/// that have none; those are skipped.
pub fn assemble<'a, C, F>(nodes: &'a [CanvasNode], mut component: F, id: &str) -> Result<PipelineConfig>
where
    C: StageComponent + 'a,
    F: FnMut(&'a CanvasNode) -> Option<&'a C>,
{
    let mut draft = PipelineDraft::new();
    for node in nodes {
        let Some(stage) = component(node) else {
            tracing::debug!("Node {} has no stage component", node.id);
            continue;
        };
        draft.accept(node, stage.config(node));
    }
    draft.finish(id)
}
