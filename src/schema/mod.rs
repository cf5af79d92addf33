//! Schema inference and field selection.
//!
//! A sample payload fetched from the extract source is turned into a field
//! tree ([`inference`]), the user ticks the fields that matter and attaches
//! rules ([`rules`]), and the tree is pruned to that selection
//! ([`selection`]) before it feeds stage configuration.

pub mod field;
pub mod inference;
pub mod loader;
pub mod rules;
pub mod selection;

pub use field::{DataType, FieldNode};
pub use inference::{build_field_tree, infer_schema, simplify_structure, InferredSchema};
pub use loader::{FormatLoader, LoadPhase, TriggerOutcome};
pub use rules::{FilterOperator, RuleKey};
pub use selection::filter_selected;
