//! Per-field rule catalog.
//!
//! Rules are attached to fields of a transform stage's tree. `change_name`
//! applies to every type and becomes a mapping; the rest are type-specific
//! comparisons that become filters.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::field::DataType;

/// Identifier of a rule that can be attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    ChangeName,
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Comparison applied by a filter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

/// How the editor collects a rule's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Select(&'static [&'static str]),
}

/// Placeholder in a default value that expands to the field's own name.
pub const FIELD_NAME_PLACEHOLDER: &str = "$fieldName";

/// Rules available on fields of every type.
pub const GLOBAL_RULES: &[RuleKey] = &[RuleKey::ChangeName];

impl RuleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKey::ChangeName => "change_name",
            RuleKey::Equals => "equals",
            RuleKey::Contains => "contains",
            RuleKey::GreaterThan => "greater_than",
            RuleKey::LessThan => "less_than",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleKey::ChangeName => "Change Name",
            RuleKey::Equals => "Equals",
            RuleKey::Contains => "Contains",
            RuleKey::GreaterThan => "Greater Than",
            RuleKey::LessThan => "Less Than",
        }
    }

    /// Input control for this rule on a field of `data_type`.
    pub fn input_kind(&self, data_type: DataType) -> InputKind {
        match (self, data_type) {
            (RuleKey::ChangeName, _) | (RuleKey::Contains, _) => InputKind::Text,
            (RuleKey::Equals, DataType::Number) => InputKind::Number,
            (RuleKey::Equals, DataType::Boolean) => InputKind::Select(&["true", "false"]),
            (RuleKey::Equals, _) => InputKind::Text,
            (RuleKey::GreaterThan, _) | (RuleKey::LessThan, _) => InputKind::Number,
        }
    }

    /// Default value template; may contain [`FIELD_NAME_PLACEHOLDER`].
    pub fn default_template(&self) -> Option<&'static str> {
        match self {
            RuleKey::ChangeName => Some(FIELD_NAME_PLACEHOLDER),
            _ => None,
        }
    }

    /// Initial value for a newly attached rule on `field_name`.
    pub fn default_value(&self, field_name: &str) -> Option<String> {
        self.default_template()
            .map(|template| template.replace(FIELD_NAME_PLACEHOLDER, field_name))
    }

    /// The filter this rule produces, if it is a comparison rule.
    pub fn as_filter(&self) -> Option<FilterOperator> {
        match self {
            RuleKey::ChangeName => None,
            RuleKey::Equals => Some(FilterOperator::Equals),
            RuleKey::Contains => Some(FilterOperator::Contains),
            RuleKey::GreaterThan => Some(FilterOperator::GreaterThan),
            RuleKey::LessThan => Some(FilterOperator::LessThan),
        }
    }
}

impl From<FilterOperator> for RuleKey {
    fn from(op: FilterOperator) -> Self {
        match op {
            FilterOperator::Equals => RuleKey::Equals,
            FilterOperator::Contains => RuleKey::Contains,
            FilterOperator::GreaterThan => RuleKey::GreaterThan,
            FilterOperator::LessThan => RuleKey::LessThan,
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific rules for `data_type`.
pub fn type_rules(data_type: DataType) -> &'static [RuleKey] {
    match data_type {
        DataType::String => &[RuleKey::Equals, RuleKey::Contains],
        DataType::Number => &[RuleKey::Equals, RuleKey::GreaterThan, RuleKey::LessThan],
        DataType::Boolean => &[RuleKey::Equals],
        DataType::List | DataType::Object | DataType::Null => &[],
    }
}

/// Every rule a field of `data_type` may carry, global rules first.
pub fn available_rules(data_type: DataType) -> impl Iterator<Item = RuleKey> {
    GLOBAL_RULES
        .iter()
        .chain(type_rules(data_type))
        .copied()
}

/// Whether `key` may be attached to a field of `data_type`.
pub fn is_allowed(key: RuleKey, data_type: DataType) -> bool {
    available_rules(data_type).any(|k| k == key)
}
