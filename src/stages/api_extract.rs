//! REST API extract stage.

use serde_json::Value;

use super::{StageComponent, StageFragment};
use crate::assembly::{ExtractConfig, FilterRule, SourceInfo, SourceKind};
use crate::canvas::CanvasNode;
use crate::error::{DesignerError, Result};
use crate::registry::StageGroup;
use crate::schema::field::{ensure_path, find_path_mut, leaf_paths};
use crate::schema::{filter_selected, FormatLoader, TriggerOutcome};
use crate::service::{format_headers, HeaderRow, SampleRequest, SampleSource};

/// Pulls records from an HTTP endpoint.
#[derive(Debug, Default)]
pub struct ApiExtractStage {
    pub url: String,
    headers: Vec<HeaderRow>,
    pub filters: Vec<FilterRule>,
    loader: FormatLoader,
}

impl ApiExtractStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[HeaderRow] {
        &self.headers
    }

    /// Append a blank header row.
    pub fn add_header(&mut self) {
        self.headers.push(HeaderRow::default());
    }

    pub fn remove_header(&mut self, index: usize) -> Option<HeaderRow> {
        (index < self.headers.len()).then(|| self.headers.remove(index))
    }

    /// Whether a row other than `except` already uses `key`.
    pub fn is_header_key_taken(&self, key: &str, except: Option<usize>) -> bool {
        self.headers
            .iter()
            .enumerate()
            .any(|(i, row)| Some(i) != except && !key.is_empty() && row.key == key)
    }

    /// Replace the row at `index`. A key may appear on one row only.
    pub fn set_header(&mut self, index: usize, row: HeaderRow) -> Result<()> {
        if index >= self.headers.len() {
            return Err(DesignerError::ConfigurationUsage(format!(
                "No header row at index {}",
                index
            )));
        }
        if self.is_header_key_taken(&row.key, Some(index)) {
            return Err(DesignerError::ConfigurationUsage(format!(
                "Header '{}' is already set",
                row.key
            )));
        }
        self.headers[index] = row;
        Ok(())
    }

    /// Append a filled-in header row.
    pub fn push_header(&mut self, row: HeaderRow) -> Result<()> {
        self.add_header();
        let index = self.headers.len() - 1;
        self.set_header(index, row).inspect_err(|_| {
            self.headers.pop();
        })
    }

    pub fn sample_request(&self) -> SampleRequest {
        SampleRequest::new(self.url.clone()).with_headers(self.headers.clone())
    }

    pub fn loader(&self) -> &FormatLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut FormatLoader {
        &mut self.loader
    }

    /// Ask the loader to (re)load the sample for the current URL and headers.
    pub fn trigger_load(&mut self) -> TriggerOutcome {
        let request = self.sample_request();
        self.loader.trigger(request)
    }

    /// Hand a fetch outcome to the loader and copy the new tree onto `node`.
    pub fn finish_load(&mut self, node: &mut CanvasNode, outcome: Result<Value>) {
        self.loader.complete(outcome);
        node.field_tree = self.loader.field_tree().map(<[_]>::to_vec);
    }

    /// Fetch the sample synchronously, skipping the view transition.
    ///
    /// Failures are recorded on the loader; see [`FormatLoader::error`].
    pub fn load_sample(&mut self, node: &mut CanvasNode, source: &dyn SampleSource) {
        let request = match self.trigger_load() {
            TriggerOutcome::Fetch(request) => request,
            TriggerOutcome::AwaitTransition => match self.loader.on_transition_complete() {
                Some(request) => request,
                None => return,
            },
            TriggerOutcome::Ignored => return,
        };
        tracing::debug!("Loading sample for node {} from {}", node.id, request.url);
        let outcome = source.fetch_sample(&request);
        self.finish_load(node, outcome);
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            kind: SourceKind::Api,
            url: self.url.clone(),
            headers: format_headers(&self.headers),
        }
    }
}

impl StageComponent for ApiExtractStage {
    fn group(&self) -> StageGroup {
        StageGroup::Extract
    }

    fn config(&self, node: &CanvasNode) -> StageFragment {
        let fields = node
            .field_tree
            .as_deref()
            .map(|tree| leaf_paths(&filter_selected(tree)))
            .unwrap_or_default();

        StageFragment::Extract(ExtractConfig {
            source_info: self.source_info(),
            fields,
            filters: self.filters.clone(),
        })
    }

    fn apply_config(&mut self, node: &mut CanvasNode, fragment: StageFragment) -> Result<()> {
        let StageFragment::Extract(config) = fragment else {
            return Err(fragment.mismatch(StageGroup::Extract));
        };

        self.url = config.source_info.url;
        self.headers = config
            .source_info
            .headers
            .into_iter()
            .map(|(key, value)| HeaderRow::new(key, value))
            .collect();
        self.filters = config.filters;

        match node.field_tree.as_mut() {
            Some(tree) if leaf_paths(&filter_selected(tree)) == config.fields => {}
            Some(tree) => {
                for field in tree.iter_mut() {
                    field.select_all(false);
                }
                for path in &config.fields {
                    match find_path_mut(tree, path) {
                        Some(field) => field.selected = true,
                        None => ensure_path(tree, path).selected = true,
                    }
                }
            }
            None => {
                let mut tree = Vec::new();
                for path in &config.fields {
                    ensure_path(&mut tree, path);
                }
                node.field_tree = Some(tree);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::TransformConfig;
    use crate::canvas::NodeId;
    use crate::registry::StageRegistry;
    use crate::schema::FieldNode;
    use egui::{pos2, vec2};
    use serde_json::json;

    struct FixedSample(Value);

    impl SampleSource for FixedSample {
        fn fetch_sample(&self, _request: &SampleRequest) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct FailingSample;

    impl SampleSource for FailingSample {
        fn fetch_sample(&self, _request: &SampleRequest) -> Result<Value> {
            Err(DesignerError::SchemaValidation("expected a JSON object or array".into()))
        }
    }

    fn node() -> CanvasNode {
        let def = StageRegistry::find(StageGroup::Extract, "restapi").unwrap();
        CanvasNode::new(NodeId(1), def, pos2(0.0, 0.0), vec2(120.0, 60.0))
    }

    #[test]
    fn test_duplicate_header_key_rejected() {
        let mut stage = ApiExtractStage::new();
        stage.push_header(HeaderRow::new("Authorization", "Bearer").with_extra("k")).unwrap();
        assert!(stage.push_header(HeaderRow::new("Authorization", "Basic")).is_err());
        assert_eq!(stage.headers().len(), 1);

        stage.add_header();
        stage.add_header();
        assert!(stage.set_header(1, HeaderRow::new("accept", "application/json")).is_ok());
        assert!(stage.set_header(1, HeaderRow::new("accept", "text/plain")).is_ok());
        assert!(stage.set_header(2, HeaderRow::new("accept", "x")).is_err());
    }

    #[test]
    fn test_load_sample_sets_node_tree() {
        let mut stage = ApiExtractStage::new();
        stage.url = "https://api.example.com/movies".to_string();
        let mut node = node();

        stage.load_sample(&mut node, &FixedSample(json!({"page": 1, "results": [{"id": 2}]})));
        assert_eq!(node.field_tree.as_ref().unwrap().len(), 2);
        assert!(stage.loader().is_content_visible());

        // A reload goes through the transition and replaces the tree.
        stage.load_sample(&mut node, &FixedSample(json!([{"title": "x"}])));
        assert_eq!(
            node.field_tree,
            Some(vec![FieldNode::leaf("title", crate::schema::DataType::String)])
        );
        assert_eq!(stage.loader().render_key(), 2);
    }

    #[test]
    fn test_failed_load_clears_tree() {
        let mut stage = ApiExtractStage::new();
        let mut node = node();
        stage.load_sample(&mut node, &FixedSample(json!({"a": 1})));
        stage.load_sample(&mut node, &FailingSample);
        assert!(node.field_tree.is_none());
        assert!(stage.loader().error().unwrap().starts_with("Invalid JSON structure"));
    }

    #[test]
    fn test_config_lists_selected_leaf_paths() {
        let mut stage = ApiExtractStage::new();
        stage.url = "https://api.example.com/movies".to_string();
        stage.push_header(HeaderRow::new("Authorization", "Bearer").with_extra("k")).unwrap();
        let mut node = node();
        stage.load_sample(
            &mut node,
            &FixedSample(json!({"page": 1, "results": [{"id": 2, "title": "x"}]})),
        );
        let tree = node.field_tree.as_mut().unwrap();
        tree[0].selected = false;
        find_path_mut(tree, "results.id").unwrap().selected = false;

        let StageFragment::Extract(config) = stage.config(&node) else {
            panic!("extract stage produced another fragment");
        };
        assert_eq!(config.fields, vec!["results.title"]);
        assert_eq!(config.source_info.url, "https://api.example.com/movies");
        assert_eq!(config.source_info.headers["Authorization"], "Bearer k");
    }

    #[test]
    fn test_apply_config_rebuilds_tree() {
        let mut stage = ApiExtractStage::new();
        let mut node = node();
        let config = ExtractConfig {
            source_info: SourceInfo {
                kind: SourceKind::Api,
                url: "https://x".to_string(),
                headers: [("accept".to_string(), "application/json".to_string())].into(),
            },
            fields: vec!["results.title".to_string(), "total".to_string()],
            filters: Vec::new(),
        };

        stage
            .apply_config(&mut node, StageFragment::Extract(config.clone()))
            .unwrap();
        assert_eq!(stage.url, "https://x");
        assert_eq!(stage.headers()[0].key, "accept");
        assert_eq!(stage.config(&node), StageFragment::Extract(config));
    }

    #[test]
    fn test_apply_config_reselects_existing_tree() {
        let mut stage = ApiExtractStage::new();
        let mut node = node();
        stage.load_sample(&mut node, &FixedSample(json!({"a": 1, "b": 2})));
        let config = ExtractConfig {
            fields: vec!["b".to_string()],
            ..Default::default()
        };
        stage.apply_config(&mut node, StageFragment::Extract(config)).unwrap();
        let tree = node.field_tree.as_ref().unwrap();
        assert!(!tree[0].selected);
        assert!(tree[1].selected);
    }

    #[test]
    fn test_apply_config_rejects_other_groups() {
        let mut stage = ApiExtractStage::new();
        let err = stage
            .apply_config(&mut node(), StageFragment::Transform(TransformConfig::default()))
            .unwrap_err();
        assert!(matches!(err, DesignerError::FragmentMismatch { .. }));
    }
}
