//! Rule-based transform stage.
//!
//! Rules live on the node's field tree. `change_name` rules become mappings;
//! comparison rules become filters.

use serde_json::Value;

use super::{StageComponent, StageFragment};
use crate::assembly::{FilterRule, MappingRule, TransformConfig};
use crate::canvas::CanvasNode;
use crate::error::{DesignerError, Result};
use crate::registry::StageGroup;
use crate::schema::field::{ensure_path, find_path_mut, walk};
use crate::schema::rules::is_allowed;
use crate::schema::{filter_selected, DataType, FieldNode, RuleKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RulesTransformStage;

impl RulesTransformStage {
    /// Attach `key` to the field at `path` with its default value.
    pub fn add_rule(&self, node: &mut CanvasNode, path: &str, key: RuleKey) -> Result<()> {
        let field = node
            .field_tree
            .as_deref_mut()
            .and_then(|tree| find_path_mut(tree, path))
            .ok_or_else(|| {
                DesignerError::ConfigurationUsage(format!("No field '{}' on node {}", path, node.id))
            })?;

        if !is_allowed(key, field.data_type) {
            return Err(DesignerError::ConfigurationUsage(format!(
                "Rule '{}' does not apply to {} field '{}'",
                key, field.data_type, path
            )));
        }

        let value = key
            .default_value(&field.name)
            .map(Value::String)
            .unwrap_or(Value::Null);
        field.set_rule(key, value);
        Ok(())
    }

    /// Replace `node`'s tree with the selected part of `upstream`, keeping
    /// rules already attached at matching paths.
    pub fn sync_fields(&self, node: &mut CanvasNode, upstream: &[FieldNode]) {
        let mut tree = filter_selected(upstream);
        clear_rules(&mut tree);
        if let Some(previous) = node.field_tree.as_deref() {
            walk(previous, &mut |path, old| {
                if let (Some(rules), Some(target)) = (old.rules.as_ref(), find_path_mut(&mut tree, path)) {
                    for key in rules {
                        if let Some(value) = old.rule_value(*key) {
                            target.set_rule(*key, value.clone());
                        }
                    }
                }
            });
        }
        node.field_tree = Some(tree);
    }
}

fn clear_rules(tree: &mut [FieldNode]) {
    for node in tree {
        node.rules = None;
        node.rule_values = None;
        if let Some(children) = node.children.as_mut() {
            clear_rules(children);
        }
    }
}

fn value_as_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl StageComponent for RulesTransformStage {
    fn group(&self) -> StageGroup {
        StageGroup::Transform
    }

    fn config(&self, node: &CanvasNode) -> StageFragment {
        let mut config = TransformConfig::default();
        let Some(tree) = node.field_tree.as_deref() else {
            return StageFragment::Transform(config);
        };

        let filtered = filter_selected(tree);
        walk(&filtered, &mut |path, field| {
            let Some(rules) = field.rules.as_ref() else {
                return;
            };
            for key in rules {
                if !is_allowed(*key, field.data_type) {
                    tracing::warn!("Skipping rule '{}' on {} field '{}'", key, field.data_type, path);
                    continue;
                }
                let value = field.rule_value(*key).cloned().unwrap_or(Value::Null);
                match key.as_filter() {
                    None => match value_as_name(&value) {
                        Some(target) => config.mappings.push(MappingRule {
                            source_field: path.to_string(),
                            target_field: target,
                            rule_key: Some(*key),
                        }),
                        None => tracing::debug!("Empty rename on '{}' ignored", path),
                    },
                    Some(operator) => config.filters.push(FilterRule {
                        field: path.to_string(),
                        operator,
                        value,
                    }),
                }
            }
        });

        StageFragment::Transform(config)
    }

    fn apply_config(&mut self, node: &mut CanvasNode, fragment: StageFragment) -> Result<()> {
        let StageFragment::Transform(config) = fragment else {
            return Err(fragment.mismatch(StageGroup::Transform));
        };

        let tree = node.field_tree.get_or_insert_with(Vec::new);
        for mapping in config.mappings {
            let key = mapping.rule_key.unwrap_or(RuleKey::ChangeName);
            let field = ensure_path(tree, &mapping.source_field);
            field.selected = true;
            field.set_rule(key, Value::String(mapping.target_field));
        }
        for filter in config.filters {
            let key = RuleKey::from(filter.operator);
            let field = ensure_path(tree, &filter.field);
            field.selected = true;
            admit_rule(field, key, &filter.value, &filter.field);
            field.set_rule(key, filter.value);
        }
        Ok(())
    }
}

/// Retype a leaf rebuilt from a saved path so that `key` applies to it.
///
/// Paths carry no type, so restored leaves start out as strings. A leaf is
/// retyped only if every rule it already carries still applies afterwards.
fn admit_rule(field: &mut FieldNode, key: RuleKey, value: &Value, path: &str) {
    if is_allowed(key, field.data_type) {
        return;
    }
    let data_type = match (key, value) {
        (RuleKey::GreaterThan | RuleKey::LessThan, _) => DataType::Number,
        (RuleKey::Equals, Value::Bool(_)) => DataType::Boolean,
        (RuleKey::Equals, Value::Number(_)) => DataType::Number,
        _ => DataType::String,
    };
    let keeps_rules = field
        .rules
        .iter()
        .flatten()
        .all(|existing| is_allowed(*existing, data_type));
    if field.is_leaf() && keeps_rules {
        tracing::debug!("Treating '{}' as {} for its '{}' rule", path, data_type, key);
        field.data_type = data_type;
    } else {
        tracing::warn!(
            "Rule '{}' does not apply to {} field '{}' and will not be emitted",
            key,
            field.data_type,
            path
        );
    }
}
