//! Stage registry for context-menu driven node creation.
//!
//! This module defines the closed set of stage kinds that can be placed on
//! the canvas, along with their display metadata and pipeline group.

use crate::error::{DesignerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline phase a stage node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageGroup {
    Extract,
    Transform,
    Load,
}

impl StageGroup {
    /// All groups in pipeline order.
    pub const ALL: [StageGroup; 3] = [StageGroup::Extract, StageGroup::Transform, StageGroup::Load];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageGroup::Extract => "extract",
            StageGroup::Transform => "transform",
            StageGroup::Load => "load",
        }
    }
}

impl fmt::Display for StageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of stage that can be instantiated on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Pulls records from a REST endpoint.
    ApiExtract,
    /// Reads records from an uploaded file.
    FileExtract,
    /// Applies per-field rename/filter rules.
    RulesTransform,
    /// Writes records into a relational database.
    DatabaseLoad,
    /// Writes records to a file.
    FileLoad,
}

/// Display metadata for one registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDefinition {
    pub kind: StageKind,
    /// Identifier used by the context menu, unique within a group.
    pub version: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub group: StageGroup,
    /// Disabled entries are listed in menus but cannot be placed.
    pub enabled: bool,
}

static DEFINITIONS: &[StageDefinition] = &[
    StageDefinition {
        kind: StageKind::ApiExtract,
        version: "restapi",
        title: "Extract from API",
        icon: "globe",
        group: StageGroup::Extract,
        enabled: true,
    },
    StageDefinition {
        kind: StageKind::FileExtract,
        version: "file",
        title: "Extract from File",
        icon: "file-alt",
        group: StageGroup::Extract,
        enabled: false,
    },
    StageDefinition {
        kind: StageKind::RulesTransform,
        version: "rules",
        title: "Transform Rules",
        icon: "cog",
        group: StageGroup::Transform,
        enabled: true,
    },
    StageDefinition {
        kind: StageKind::DatabaseLoad,
        version: "database",
        title: "Load to Database",
        icon: "database",
        group: StageGroup::Load,
        enabled: true,
    },
    StageDefinition {
        kind: StageKind::FileLoad,
        version: "file",
        title: "Load to File",
        icon: "file-alt",
        group: StageGroup::Load,
        enabled: false,
    },
];

impl StageKind {
    /// Registry entry for this kind.
    pub fn definition(&self) -> &'static StageDefinition {
        // Every variant has exactly one entry in DEFINITIONS.
        match self {
            StageKind::ApiExtract => &DEFINITIONS[0],
            StageKind::FileExtract => &DEFINITIONS[1],
            StageKind::RulesTransform => &DEFINITIONS[2],
            StageKind::DatabaseLoad => &DEFINITIONS[3],
            StageKind::FileLoad => &DEFINITIONS[4],
        }
    }

    pub fn group(&self) -> StageGroup {
        self.definition().group
    }

    pub fn display_name(&self) -> &'static str {
        self.definition().title
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Read-only catalog of placeable stages.
pub struct StageRegistry;

impl StageRegistry {
    /// Get all registry entries.
    pub fn all() -> &'static [StageDefinition] {
        DEFINITIONS
    }

    /// Entries of one group, in menu order.
    pub fn by_group(group: StageGroup) -> impl Iterator<Item = &'static StageDefinition> {
        DEFINITIONS.iter().filter(move |def| def.group == group)
    }

    /// Look up an entry by group and menu identifier.
    pub fn find(group: StageGroup, version: &str) -> Option<&'static StageDefinition> {
        DEFINITIONS
            .iter()
            .find(|def| def.group == group && def.version == version)
    }

    /// Resolve a menu choice to a placeable stage.
    ///
    /// Disabled entries resolve the same way as unknown ones.
    pub fn resolve(group: StageGroup, version: &str) -> Result<&'static StageDefinition> {
        match Self::find(group, version) {
            Some(def) if def.enabled => Ok(def),
            _ => Err(DesignerError::UnknownStageKind {
                group,
                kind: version.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_match_kinds() {
        for def in StageRegistry::all() {
            assert_eq!(def.kind.definition(), def);
        }
    }

    #[test]
    fn test_versions_unique_within_group() {
        for group in StageGroup::ALL {
            let versions: Vec<_> = StageRegistry::by_group(group).map(|d| d.version).collect();
            let mut deduped = versions.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(versions.len(), deduped.len(), "duplicate version in {group}");
        }
    }

    #[test]
    fn test_resolve_known_kind() {
        let def = StageRegistry::resolve(StageGroup::Transform, "rules").unwrap();
        assert_eq!(def.kind, StageKind::RulesTransform);
        assert_eq!(def.icon, "cog");
    }

    #[test]
    fn test_same_version_in_two_groups() {
        let extract = StageRegistry::find(StageGroup::Extract, "file").unwrap();
        let load = StageRegistry::find(StageGroup::Load, "file").unwrap();
        assert_eq!(extract.kind, StageKind::FileExtract);
        assert_eq!(load.kind, StageKind::FileLoad);
    }

    #[test]
    fn test_resolve_rejects_unknown_and_disabled() {
        assert!(matches!(
            StageRegistry::resolve(StageGroup::Extract, "ftp"),
            Err(DesignerError::UnknownStageKind { .. })
        ));
        assert!(matches!(
            StageRegistry::resolve(StageGroup::Load, "file"),
            Err(DesignerError::UnknownStageKind { group: StageGroup::Load, .. })
        ));
    }

    #[test]
    fn test_group_serde_lowercase() {
        let json = serde_json::to_string(&StageGroup::Transform).unwrap();
        assert_eq!(json, "\"transform\"");
    }
}
