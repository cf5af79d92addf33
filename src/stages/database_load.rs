//! Relational database load stage.

use super::{StageComponent, StageFragment};
use crate::assembly::{DatabaseKind, LoadConfig, LoadMode, TableMapping, TargetInfo};
use crate::canvas::CanvasNode;
use crate::error::{DesignerError, Result};
use crate::registry::StageGroup;
use crate::service::{DatabaseMetadata, PipelineService, Transport};

/// Writes records into tables of a database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseLoadStage {
    pub kind: DatabaseKind,
    pub connection_string: String,
    pub load_mode: LoadMode,
    pub tables: Vec<TableMapping>,
    validated: Option<bool>,
    metadata: Option<DatabaseMetadata>,
}

impl DatabaseLoadStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            target_info: TargetInfo {
                kind: self.kind,
                connection_string: self.connection_string.clone(),
                load_mode: self.load_mode,
            },
            tables: self.tables.clone(),
        }
    }

    /// Outcome of the last connection check, if one ran since the target
    /// last changed.
    pub fn validated(&self) -> Option<bool> {
        self.validated
    }

    pub fn metadata(&self) -> Option<&DatabaseMetadata> {
        self.metadata.as_ref()
    }

    /// Point the stage at another database, dropping cached checks.
    pub fn set_target(&mut self, kind: DatabaseKind, connection_string: impl Into<String>) {
        self.kind = kind;
        self.connection_string = connection_string.into();
        self.validated = None;
        self.metadata = None;
    }

    /// Add `field` to the mapping for `table`, creating the mapping if needed.
    pub fn map_field(&mut self, table: &str, field: impl Into<String>) {
        let field = field.into();
        let index = match self.tables.iter().position(|t| t.target_table == table) {
            Some(index) => index,
            None => {
                self.tables.push(TableMapping {
                    target_table: table.to_string(),
                    fields: Vec::new(),
                });
                self.tables.len() - 1
            }
        };
        let mapping = &mut self.tables[index];
        if !mapping.fields.contains(&field) {
            mapping.fields.push(field);
        }
    }

    pub fn remove_table(&mut self, table: &str) {
        self.tables.retain(|t| t.target_table != table);
    }

    /// Check the connection through the backend.
    pub fn validate<T: Transport>(&mut self, service: &PipelineService<T>) -> Result<bool> {
        if self.connection_string.trim().is_empty() {
            return Err(DesignerError::ConfigurationUsage(
                "Connection string is empty".to_string(),
            ));
        }
        let valid = service.validate_load(&self.load_config())?;
        if !valid {
            tracing::warn!("Load target rejected by backend ({})", self.kind);
        }
        self.validated = Some(valid);
        Ok(valid)
    }

    /// Fetch table metadata through the backend.
    pub fn refresh_metadata<T: Transport>(
        &mut self,
        service: &PipelineService<T>,
    ) -> Result<&DatabaseMetadata> {
        let metadata = service.load_metadata(&self.load_config())?;
        tracing::debug!("Loaded metadata for {} tables", metadata.tables.len());
        Ok(self.metadata.insert(metadata))
    }

    /// Mapped tables that the last metadata fetch did not report.
    pub fn unknown_tables(&self) -> Vec<&str> {
        let Some(metadata) = self.metadata.as_ref() else {
            return Vec::new();
        };
        self.tables
            .iter()
            .filter(|t| metadata.table(&t.target_table).is_none())
            .map(|t| t.target_table.as_str())
            .collect()
    }
}

impl StageComponent for DatabaseLoadStage {
    fn group(&self) -> StageGroup {
        StageGroup::Load
    }

    fn config(&self, _node: &CanvasNode) -> StageFragment {
        StageFragment::Load(self.load_config())
    }

    fn apply_config(&mut self, _node: &mut CanvasNode, fragment: StageFragment) -> Result<()> {
        let StageFragment::Load(config) = fragment else {
            return Err(fragment.mismatch(StageGroup::Load));
        };
        self.set_target(config.target_info.kind, config.target_info.connection_string);
        self.load_mode = config.target_info.load_mode;
        self.tables = config.tables;
        Ok(())
    }
}
