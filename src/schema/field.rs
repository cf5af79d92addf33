//! Field tree types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::rules::RuleKey;

/// Inferred type of a field in a sample document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Null,
    Object,
    List,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Null => "null",
            DataType::Object => "object",
            DataType::List => "list",
        }
    }

    /// Whether fields of this type carry nested children.
    pub fn is_container(&self) -> bool {
        matches!(self, DataType::Object | DataType::List)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a field tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub name: String,
    pub selected: bool,
    pub data_type: DataType,
    /// Rules attached to this field, in the order the user added them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleKey>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_values: Option<BTreeMap<RuleKey, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldNode>>,
}

impl FieldNode {
    /// A selected field without children or rules.
    pub fn leaf(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            selected: true,
            data_type,
            rules: None,
            rule_values: None,
            children: None,
        }
    }

    /// A selected container field.
    pub fn branch(name: impl Into<String>, data_type: DataType, children: Vec<FieldNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(name, data_type)
        }
    }

    pub fn children(&self) -> &[FieldNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Attach a rule, replacing any previous value for the same key.
    pub fn set_rule(&mut self, key: RuleKey, value: Value) {
        let rules = self.rules.get_or_insert_with(Vec::new);
        if !rules.contains(&key) {
            rules.push(key);
        }
        self.rule_values
            .get_or_insert_with(BTreeMap::new)
            .insert(key, value);
    }

    /// Detach a rule and its value.
    pub fn remove_rule(&mut self, key: RuleKey) {
        if let Some(rules) = self.rules.as_mut() {
            rules.retain(|r| *r != key);
        }
        if let Some(values) = self.rule_values.as_mut() {
            values.remove(&key);
        }
    }

    /// Value stored for `key`, if the rule is attached.
    pub fn rule_value(&self, key: RuleKey) -> Option<&Value> {
        self.rule_values.as_ref()?.get(&key)
    }

    /// Set the selection flag on this node and every descendant.
    pub fn select_all(&mut self, selected: bool) {
        self.selected = selected;
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.select_all(selected);
            }
        }
    }
}

/// Visit every node with its dotted path, parents before children.
pub fn walk<'a>(tree: &'a [FieldNode], f: &mut impl FnMut(&str, &'a FieldNode)) {
    fn go<'a>(prefix: &str, nodes: &'a [FieldNode], f: &mut impl FnMut(&str, &'a FieldNode)) {
        for node in nodes {
            let path = join_path(prefix, &node.name);
            f(&path, node);
            go(&path, node.children(), f);
        }
    }
    go("", tree, f);
}

/// Dotted paths of every leaf in `tree`.
pub fn leaf_paths(tree: &[FieldNode]) -> Vec<String> {
    let mut paths = Vec::new();
    walk(tree, &mut |path, node| {
        if node.is_leaf() {
            paths.push(path.to_string());
        }
    });
    paths
}

/// Find a node by dotted path.
pub fn find_path_mut<'a>(tree: &'a mut [FieldNode], path: &str) -> Option<&'a mut FieldNode> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let node = tree.iter_mut().find(|n| n.name == head)?;
    match rest {
        None => Some(node),
        Some(rest) => find_path_mut(node.children.as_deref_mut()?, rest),
    }
}

/// Insert (or reuse) the nodes along `path`, returning the last one.
///
/// Created intermediate nodes are `object` branches; a created final node is a
/// `string` leaf. Used when rebuilding a tree from a saved configuration,
/// where only paths survive.
pub fn ensure_path<'a>(tree: &'a mut Vec<FieldNode>, path: &str) -> &'a mut FieldNode {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let index = match tree.iter().position(|n| n.name == head) {
        Some(index) => index,
        None => {
            let node = match rest {
                Some(_) => FieldNode::branch(head, DataType::Object, Vec::new()),
                None => FieldNode::leaf(head, DataType::String),
            };
            tree.push(node);
            tree.len() - 1
        }
    };
    let node = &mut tree[index];
    match rest {
        None => node,
        Some(rest) => {
            if !node.data_type.is_container() {
                node.data_type = DataType::Object;
            }
            ensure_path(node.children.get_or_insert_with(Vec::new), rest)
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
