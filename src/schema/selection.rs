//! Pruning of a field tree down to the user's selection.

use std::collections::BTreeMap;

use super::field::FieldNode;

/// Keep selected fields and the ancestors needed to reach them.
///
/// Rule metadata survives only on selected nodes; ancestors kept purely for
/// structure carry none. Filtering an already-filtered tree returns it
/// unchanged.
pub fn filter_selected(tree: &[FieldNode]) -> Vec<FieldNode> {
    tree.iter().filter_map(filter_node).collect()
}

fn filter_node(node: &FieldNode) -> Option<FieldNode> {
    let children = filter_selected(node.children());

    if !node.selected && children.is_empty() {
        return None;
    }

    let (rules, rule_values) = if node.selected {
        (
            Some(node.rules.clone().unwrap_or_default()),
            Some(node.rule_values.clone().unwrap_or_else(BTreeMap::new)),
        )
    } else {
        (None, None)
    };

    Some(FieldNode {
        name: node.name.clone(),
        selected: node.selected,
        data_type: node.data_type,
        rules,
        rule_values,
        children: (!children.is_empty()).then_some(children),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::DataType;
    use crate::schema::rules::RuleKey;
    use proptest::prelude::*;
    use serde_json::json;

    fn tree() -> Vec<FieldNode> {
        let mut title = FieldNode::leaf("title", DataType::String);
        title.set_rule(RuleKey::Contains, json!("star"));

        let mut adult = FieldNode::leaf("adult", DataType::Boolean);
        adult.selected = false;

        let mut results = FieldNode::branch("results", DataType::List, vec![title, adult]);
        results.selected = false;
        results.set_rule(RuleKey::ChangeName, json!("movies"));

        let mut page = FieldNode::leaf("page", DataType::Number);
        page.selected = false;

        vec![page, results, FieldNode::leaf("total_pages", DataType::Number)]
    }

    #[test]
    fn test_prunes_unselected_leaves() {
        let filtered = filter_selected(&tree());
        let names: Vec<_> = filtered.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["results", "total_pages"]);
        assert_eq!(filtered[0].children().len(), 1);
        assert_eq!(filtered[0].children()[0].name, "title");
    }

    #[test]
    fn test_unselected_ancestor_drops_rules() {
        let filtered = filter_selected(&tree());
        let results = &filtered[0];
        assert!(!results.selected);
        assert_eq!(results.rules, None);
        assert_eq!(results.rule_values, None);

        let title = &results.children()[0];
        assert_eq!(title.rules, Some(vec![RuleKey::Contains]));
        assert_eq!(title.rule_value(RuleKey::Contains), Some(&json!("star")));
    }

    #[test]
    fn test_selected_node_gets_empty_rule_containers() {
        let filtered = filter_selected(&tree());
        let total_pages = &filtered[1];
        assert_eq!(total_pages.rules, Some(Vec::new()));
        assert_eq!(total_pages.rule_values, Some(BTreeMap::new()));
        assert_eq!(total_pages.children, None);
    }

    #[test]
    fn test_empty_children_become_absent() {
        let input = vec![FieldNode::branch("items", DataType::List, Vec::new())];
        let filtered = filter_selected(&input);
        assert_eq!(filtered[0].children, None);
    }

    #[test]
    fn test_idempotent() {
        let once = filter_selected(&tree());
        assert_eq!(filter_selected(&once), once);
    }

    fn arb_tree() -> impl Strategy<Value = Vec<FieldNode>> {
        let leaf = (any::<bool>(), any::<bool>()).prop_map(|(selected, with_rule)| {
            let mut node = FieldNode::leaf("leaf", DataType::String);
            node.selected = selected;
            if with_rule {
                node.set_rule(RuleKey::Equals, json!("v"));
            }
            node
        });
        let node = leaf.prop_recursive(4, 32, 4, |inner| {
            (any::<bool>(), prop::collection::vec(inner, 0..4)).prop_map(|(selected, children)| {
                let mut node = FieldNode::branch("branch", DataType::Object, children);
                node.selected = selected;
                node
            })
        });
        prop::collection::vec(node, 0..5)
    }

    proptest! {
        #[test]
        fn test_filter_is_idempotent(input in arb_tree()) {
            let once = filter_selected(&input);
            prop_assert_eq!(filter_selected(&once), once);
        }

        #[test]
        fn test_every_kept_leaf_is_selected(input in arb_tree()) {
            let filtered = filter_selected(&input);
            crate::schema::field::walk(&filtered, &mut |path, node| {
                if node.is_leaf() {
                    assert!(node.selected, "unselected leaf kept at {}", path);
                }
            });
        }
    }
}
