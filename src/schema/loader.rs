//! Sample loading state for an extract stage's field tree.
//!
//! The loader never performs I/O itself: [`FormatLoader::trigger`] tells the
//! caller whether to fetch now or wait for the hide transition, and the caller
//! hands the fetch outcome back through [`FormatLoader::complete`].
//!
//! ```text
//! Empty ──trigger──► Loading ──complete──► Shown
//!                       ▲                    │ trigger
//!                       └─transition done─ TransitioningOut
//! ```
//!
//! An in-flight fetch is not cancelled. If the caller issues a second fetch
//! before the first settles, whichever completes last wins.

use serde_json::Value;

use super::field::FieldNode;
use super::inference::{build_field_tree, simplify_structure};
use crate::error::Result;
use crate::service::SampleRequest;

/// Where the loader is in its show/hide/fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing has been loaded yet.
    Empty,
    /// A fetch is outstanding.
    Loading,
    /// The content section shows a tree or an error.
    Shown,
    /// The content section is animating out before a reload.
    TransitioningOut,
}

/// What the caller should do after [`FormatLoader::trigger`].
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Start fetching this request now.
    Fetch(SampleRequest),
    /// Hide the content; call [`FormatLoader::on_transition_complete`] once the
    /// hide transition has finished.
    AwaitTransition,
    /// A fetch is already outstanding.
    Ignored,
}

#[derive(Debug)]
pub struct FormatLoader {
    phase: LoadPhase,
    pending: Option<SampleRequest>,
    structure: Option<Value>,
    field_tree: Option<Vec<FieldNode>>,
    error: Option<String>,
    render_key: u64,
}

impl Default for FormatLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatLoader {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Empty,
            pending: None,
            structure: None,
            field_tree: None,
            error: None,
            render_key: 0,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Whether the content section should currently be visible.
    pub fn is_content_visible(&self) -> bool {
        self.phase == LoadPhase::Shown
    }

    /// Request a (re)load of the sample.
    pub fn trigger(&mut self, request: SampleRequest) -> TriggerOutcome {
        match self.phase {
            LoadPhase::Loading => {
                tracing::debug!("Format load already in flight, ignoring trigger");
                TriggerOutcome::Ignored
            }
            LoadPhase::Empty => {
                self.begin_fetch();
                TriggerOutcome::Fetch(request)
            }
            LoadPhase::Shown | LoadPhase::TransitioningOut => {
                self.phase = LoadPhase::TransitioningOut;
                self.pending = Some(request);
                TriggerOutcome::AwaitTransition
            }
        }
    }

    /// Signal that the hide transition finished.
    ///
    /// Returns the request to fetch, if one was waiting.
    pub fn on_transition_complete(&mut self) -> Option<SampleRequest> {
        if self.phase != LoadPhase::TransitioningOut {
            return None;
        }
        let request = self.pending.take()?;
        self.begin_fetch();
        Some(request)
    }

    /// Record the outcome of a fetch and show the result.
    pub fn complete(&mut self, outcome: Result<Value>) {
        if self.phase != LoadPhase::Loading {
            tracing::warn!("Format response arrived in phase {:?}, applying anyway", self.phase);
        }

        match outcome {
            Ok(sample) => {
                self.structure = Some(simplify_structure(&sample));
                self.field_tree = Some(build_field_tree(&sample));
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Failed to load format: {}", e);
                self.structure = None;
                self.field_tree = None;
                self.error = Some(e.user_message());
            }
        }

        self.phase = LoadPhase::Shown;
        self.render_key += 1;
    }

    fn begin_fetch(&mut self) {
        self.phase = LoadPhase::Loading;
        self.error = None;
    }

    pub fn field_tree(&self) -> Option<&[FieldNode]> {
        self.field_tree.as_deref()
    }

    pub fn field_tree_mut(&mut self) -> Option<&mut Vec<FieldNode>> {
        self.field_tree.as_mut()
    }

    /// Pretty-printed structure preview of the last sample.
    pub fn structure_text(&self) -> Option<String> {
        self.structure
            .as_ref()
            .and_then(|s| serde_json::to_string_pretty(s).ok())
    }

    /// Human-readable message of the last failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped every time new content is shown, so views can re-key.
    pub fn render_key(&self) -> u64 {
        self.render_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignerError;
    use serde_json::json;

    fn request(url: &str) -> SampleRequest {
        SampleRequest::new(url)
    }

    #[test]
    fn test_first_load_fetches_immediately() {
        let mut loader = FormatLoader::new();
        assert_eq!(
            loader.trigger(request("https://a")),
            TriggerOutcome::Fetch(request("https://a"))
        );
        assert!(loader.is_loading());

        loader.complete(Ok(json!({"id": 1})));
        assert_eq!(loader.phase(), LoadPhase::Shown);
        assert_eq!(loader.field_tree().unwrap().len(), 1);
        assert_eq!(loader.render_key(), 1);
        assert!(loader.structure_text().unwrap().contains("\"number\""));
    }

    #[test]
    fn test_duplicate_trigger_ignored_while_loading() {
        let mut loader = FormatLoader::new();
        loader.trigger(request("https://a"));
        assert_eq!(loader.trigger(request("https://b")), TriggerOutcome::Ignored);
    }

    #[test]
    fn test_reload_waits_for_transition() {
        let mut loader = FormatLoader::new();
        loader.trigger(request("https://a"));
        loader.complete(Ok(json!({"id": 1})));

        assert_eq!(loader.trigger(request("https://b")), TriggerOutcome::AwaitTransition);
        assert_eq!(loader.phase(), LoadPhase::TransitioningOut);
        assert!(!loader.is_content_visible());

        // A newer trigger during the transition replaces the pending request.
        loader.trigger(request("https://c"));
        assert_eq!(loader.on_transition_complete(), Some(request("https://c")));
        assert!(loader.is_loading());
        assert_eq!(loader.on_transition_complete(), None);

        loader.complete(Ok(json!({"a": true, "b": null})));
        assert!(loader.is_content_visible());
        assert_eq!(loader.field_tree().unwrap().len(), 2);
        assert_eq!(loader.render_key(), 2);
    }

    #[test]
    fn test_transition_complete_without_pending_is_noop() {
        let mut loader = FormatLoader::new();
        assert_eq!(loader.on_transition_complete(), None);
        assert_eq!(loader.phase(), LoadPhase::Empty);
    }

    #[test]
    fn test_error_resets_tree_and_shows_message() {
        let mut loader = FormatLoader::new();
        loader.trigger(request("https://a"));
        loader.complete(Ok(json!({"id": 1})));
        loader.trigger(request("https://a"));
        loader.on_transition_complete();

        loader.complete(Err(DesignerError::SchemaValidation(
            "expected a JSON object or array".to_string(),
        )));
        assert_eq!(loader.phase(), LoadPhase::Shown);
        assert!(loader.field_tree().is_none());
        assert!(loader.structure_text().is_none());
        assert_eq!(
            loader.error(),
            Some("Invalid JSON structure: expected a JSON object or array")
        );
    }
}
