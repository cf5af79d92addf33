//! Error handling for the ETL designer
//!
//! This module defines the error taxonomy shared by the canvas, schema and
//! service layers, plus a Result alias for use throughout the crate.

use crate::registry::StageGroup;
use crate::service::TransportError;
use thiserror::Error;

/// Main error type for designer operations
#[derive(Error, Debug)]
pub enum DesignerError {
    /// Network or HTTP failure, including `{success: false}` replies
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A fetched sample payload was not a JSON object or array
    #[error("Invalid JSON structure: {0}")]
    SchemaValidation(String),

    /// The assembler could not find one or more of the required sections
    #[error("Missing pipeline stage: {}", format_groups(.0))]
    MissingStage(Vec<StageGroup>),

    /// A context-menu choice did not resolve against the stage registry
    #[error("Unknown stage kind '{kind}' in group {group}")]
    UnknownStageKind { group: StageGroup, kind: String },

    /// A request was issued with neither a URL nor an endpoint
    #[error("Configuration usage error: {0}")]
    ConfigurationUsage(String),

    /// A fragment handed to a stage component belongs to another group
    #[error("Stage {expected} cannot accept a {actual} configuration")]
    FragmentMismatch {
        expected: StageGroup,
        actual: StageGroup,
    },

    /// Errors related to settings loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DesignerError>,
    },
}

fn format_groups(groups: &[StageGroup]) -> String {
    groups
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DesignerError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DesignerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Message suitable for inline display next to the control that
    /// triggered the failing operation.
    ///
    /// Transport failures prefer the server's `status_message` field when the
    /// response body is JSON.
    pub fn user_message(&self) -> String {
        match self {
            DesignerError::Transport(err) => err.user_message(),
            DesignerError::WithContext { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for designer operations
pub type Result<T> = std::result::Result<T, DesignerError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Method;

    #[test]
    fn test_missing_stage_names_groups() {
        let err = DesignerError::MissingStage(vec![StageGroup::Transform]);
        assert_eq!(err.to_string(), "Missing pipeline stage: transform");

        let err = DesignerError::MissingStage(vec![StageGroup::Extract, StageGroup::Load]);
        assert_eq!(err.to_string(), "Missing pipeline stage: extract, load");
    }

    #[test]
    fn test_error_with_context() {
        let err = DesignerError::Config("bad scale".to_string());
        let with_ctx = err.with_context("Failed to load settings");
        assert!(with_ctx.to_string().contains("Failed to load settings"));
        assert!(with_ctx.to_string().contains("bad scale"));
    }

    #[test]
    fn test_user_message_prefers_status_message() {
        let transport = TransportError {
            message: "HTTP 401".to_string(),
            status: 401,
            method: Method::Get,
            url: "https://api.example.com/movies".to_string(),
            response_body: r#"{"status_code":7,"status_message":"Invalid API key"}"#.to_string(),
            request_body: None,
            timed_out: false,
        };
        let err = DesignerError::from(transport).with_context("Loading format");
        assert_eq!(err.user_message(), "Invalid API key");
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err = DesignerError::SchemaValidation("expected object or array".to_string());
        assert_eq!(
            err.user_message(),
            "Invalid JSON structure: expected object or array"
        );
    }
}
