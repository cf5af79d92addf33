//! # etl-designer: ETL pipeline designer core
//!
//! The editing core behind a visual extract → transform → load pipeline
//! designer. Users drop stage nodes on a pannable, zoomable canvas, infer a
//! field tree from a sample payload, select fields and attach rules, and
//! assemble the result into a pipeline configuration for a backend.
//!
//! ## Architecture
//!
//! - **Canvas**: node storage, viewport transform, collision-free placement and
//!   the pointer interaction state machine ([`canvas`])
//! - **Registry**: the closed catalogue of stage kinds ([`registry`])
//! - **Schema**: field tree inference, rules and selection ([`schema`])
//! - **Stages**: per-kind configuration components ([`stages`])
//! - **Assembly**: pipeline documents and their assembly ([`assembly`])
//! - **Services**: HTTP clients for the pipeline and extract backends ([`service`])
//!
//! ## Configuration
//!
//! Settings are stored as TOML in the platform config directory under
//! `dev.etl-designer`; see [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use etl_designer::{EditorSession, registry::StageGroup};
//! use egui::pos2;
//!
//! let mut session = EditorSession::default();
//! session.store_mut().open_context_menu(pos2(100.0, 80.0));
//! let extract = session.insert_from_menu(StageGroup::Extract, "restapi");
//! // ... configure stages, load a sample ...
//! let pipeline = session.build_config("movies")?;
//! ```

pub mod assembly;
pub mod canvas;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod registry;
pub mod schema;
pub mod service;
pub mod stages;

// Re-export commonly used types
pub use assembly::PipelineConfig;
pub use canvas::{NodeGraphStore, NodeId, ViewportController};
pub use config::DesignerSettings;
pub use document::CanvasDocument;
pub use editor::EditorSession;
pub use error::{DesignerError, Result};
pub use registry::{StageGroup, StageKind, StageRegistry};
pub use schema::{build_field_tree, filter_selected, FieldNode};
pub use stages::{StageComponent, StageFragment, StageNode};
