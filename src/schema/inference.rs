//! Type inference over sample JSON payloads.
//!
//! Arrays are represented by their first element only; later elements are
//! never inspected, so heterogeneous arrays report whatever shape element 0
//! has.

use serde_json::{Map, Value};

use super::field::{DataType, FieldNode};

/// Result of inferring a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum InferredSchema {
    /// Object input (or an array whose first element is an object).
    Fields(Vec<FieldNode>),
    /// Primitive input collapses to a single typed leaf.
    Leaf(DataType),
}

impl InferredSchema {
    /// The field list, empty for a primitive sample.
    pub fn into_fields(self) -> Vec<FieldNode> {
        match self {
            InferredSchema::Fields(fields) => fields,
            InferredSchema::Leaf(_) => Vec::new(),
        }
    }
}

/// Infer the shape of `value`.
pub fn infer_schema(value: &Value) -> InferredSchema {
    match value {
        Value::Array(items) => match items.first() {
            None => InferredSchema::Fields(Vec::new()),
            Some(first) => infer_schema(first),
        },
        Value::Object(map) => InferredSchema::Fields(infer_object(map)),
        primitive => InferredSchema::Leaf(primitive_type(primitive)),
    }
}

/// Infer a field tree, treating primitive samples as having no fields.
pub fn build_field_tree(value: &Value) -> Vec<FieldNode> {
    infer_schema(value).into_fields()
}

fn infer_object(map: &Map<String, Value>) -> Vec<FieldNode> {
    map.iter().map(|(key, value)| infer_field(key, value)).collect()
}

fn infer_field(name: &str, value: &Value) -> FieldNode {
    match value {
        Value::Object(map) => FieldNode::branch(name, DataType::Object, infer_object(map)),
        Value::Array(items) => {
            let children = items.first().map(build_field_tree).unwrap_or_default();
            FieldNode::branch(name, DataType::List, children)
        }
        primitive => FieldNode::leaf(name, primitive_type(primitive)),
    }
}

fn primitive_type(value: &Value) -> DataType {
    match value {
        Value::String(_) => DataType::String,
        Value::Number(_) => DataType::Number,
        Value::Bool(_) => DataType::Boolean,
        Value::Null => DataType::Null,
        // Containers never reach here; report them as text if they do.
        Value::Array(_) | Value::Object(_) => DataType::String,
    }
}

/// Replace every primitive with its type name and keep only the first element
/// of each array.
///
/// This is the human-readable structure preview shown next to the tree.
pub fn simplify_structure(value: &Value) -> Value {
    match value {
        Value::Array(items) => match items.first() {
            None => Value::Array(Vec::new()),
            Some(first) => Value::Array(vec![simplify_structure(first)]),
        },
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), simplify_structure(value)))
                .collect(),
        ),
        Value::Null => Value::String("null".to_string()),
        Value::Bool(_) => Value::String("bool".to_string()),
        Value::Number(_) => Value::String("number".to_string()),
        Value::String(_) => Value::String("string".to_string()),
    }
}
