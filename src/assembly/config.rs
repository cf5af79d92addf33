//! Wire types of a pipeline configuration document.
//!
//! Field names are PascalCase on the wire and the source/target kind
//! discriminators serialize under `$type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::rules::{FilterOperator, RuleKey};

/// A complete extract → transform → load pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub id: String,
    pub extract_config: ExtractConfig,
    pub transform_config: TransformConfig,
    pub load_config: LoadConfig,
}

/// Where a pipeline reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Api,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceInfo {
    #[serde(rename = "$type")]
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractConfig {
    pub source_info: SourceInfo,
    /// Dotted paths of the fields to keep from each record.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

/// A comparison applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterRule {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

/// Rename of a source field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappingRule {
    pub source_field: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_key: Option<RuleKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformConfig {
    #[serde(default)]
    pub mappings: Vec<MappingRule>,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

/// Supported load targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Mysql,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 1] = [DatabaseKind::Mysql];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "MySQL",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How rows are written into the target tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    #[default]
    Append,
    Truncate,
    InsertIgnore,
}

impl LoadMode {
    pub const ALL: [LoadMode; 3] = [LoadMode::Append, LoadMode::Truncate, LoadMode::InsertIgnore];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMode::Append => "append",
            LoadMode::Truncate => "truncate",
            LoadMode::InsertIgnore => "insert_ignore",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetInfo {
    #[serde(rename = "$type")]
    pub kind: DatabaseKind,
    pub connection_string: String,
    #[serde(default)]
    pub load_mode: LoadMode,
}

/// Fields written into one target table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableMapping {
    pub target_table: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadConfig {
    pub target_info: TargetInfo,
    #[serde(default)]
    pub tables: Vec<TableMapping>,
}
