//! Stage components attached to canvas nodes.
//!
//! Every node kind that can contribute to a pipeline has a component here. A
//! component turns its node into a [`StageFragment`] and restores itself from
//! one. [`StageNode`] is the closed set of components; kinds without one (the
//! disabled file stages) simply have no `StageNode`.

pub mod api_extract;
pub mod database_load;
pub mod rules_transform;

pub use api_extract::ApiExtractStage;
pub use database_load::DatabaseLoadStage;
pub use rules_transform::RulesTransformStage;

use serde::{Deserialize, Serialize};

use crate::assembly::{ExtractConfig, LoadConfig, TransformConfig};
use crate::canvas::CanvasNode;
use crate::error::{DesignerError, Result};
use crate::registry::{StageGroup, StageKind};

/// The part of a pipeline configuration one stage supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group", content = "config", rename_all = "lowercase")]
pub enum StageFragment {
    Extract(ExtractConfig),
    Transform(TransformConfig),
    Load(LoadConfig),
}

impl StageFragment {
    pub fn group(&self) -> StageGroup {
        match self {
            StageFragment::Extract(_) => StageGroup::Extract,
            StageFragment::Transform(_) => StageGroup::Transform,
            StageFragment::Load(_) => StageGroup::Load,
        }
    }

    /// Error for a fragment handed to a stage of group `expected`.
    pub(crate) fn mismatch(&self, expected: StageGroup) -> DesignerError {
        DesignerError::FragmentMismatch {
            expected,
            actual: self.group(),
        }
    }
}

/// Configuration capability of a stage.
pub trait StageComponent {
    fn group(&self) -> StageGroup;

    /// The fragment this stage currently contributes. `node` carries the field
    /// tree the stage works on.
    fn config(&self, node: &CanvasNode) -> StageFragment;

    /// Restore from a saved fragment, rebuilding `node`'s field tree where the
    /// fragment describes one.
    fn apply_config(&mut self, node: &mut CanvasNode, fragment: StageFragment) -> Result<()>;
}

/// Enum dispatch over the built-in stage components.
#[derive(Debug)]
pub enum StageNode {
    ApiExtract(ApiExtractStage),
    RulesTransform(RulesTransformStage),
    DatabaseLoad(DatabaseLoadStage),
}

impl StageNode {
    /// Fresh component for `kind`, if that kind has one.
    pub fn for_kind(kind: StageKind) -> Option<StageNode> {
        match kind {
            StageKind::ApiExtract => Some(StageNode::ApiExtract(ApiExtractStage::new())),
            StageKind::RulesTransform => Some(StageNode::RulesTransform(RulesTransformStage)),
            StageKind::DatabaseLoad => Some(StageNode::DatabaseLoad(DatabaseLoadStage::new())),
            StageKind::FileExtract | StageKind::FileLoad => None,
        }
    }

    pub fn as_api_extract_mut(&mut self) -> Option<&mut ApiExtractStage> {
        match self {
            StageNode::ApiExtract(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn as_database_load_mut(&mut self) -> Option<&mut DatabaseLoadStage> {
        match self {
            StageNode::DatabaseLoad(stage) => Some(stage),
            _ => None,
        }
    }
}

impl StageComponent for StageNode {
    fn group(&self) -> StageGroup {
        match self {
            StageNode::ApiExtract(s) => s.group(),
            StageNode::RulesTransform(s) => s.group(),
            StageNode::DatabaseLoad(s) => s.group(),
        }
    }

    fn config(&self, node: &CanvasNode) -> StageFragment {
        match self {
            StageNode::ApiExtract(s) => s.config(node),
            StageNode::RulesTransform(s) => s.config(node),
            StageNode::DatabaseLoad(s) => s.config(node),
        }
    }

    fn apply_config(&mut self, node: &mut CanvasNode, fragment: StageFragment) -> Result<()> {
        match self {
            StageNode::ApiExtract(s) => s.apply_config(node, fragment),
            StageNode::RulesTransform(s) => s.apply_config(node, fragment),
            StageNode::DatabaseLoad(s) => s.apply_config(node, fragment),
        }
    }
}
