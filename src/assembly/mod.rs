//! Pipeline configuration documents and their assembly from the canvas.

pub mod assembler;
pub mod config;

pub use assembler::{assemble, PipelineDraft};
pub use config::{
    DatabaseKind, ExtractConfig, FilterRule, LoadConfig, LoadMode, MappingRule, PipelineConfig,
    SourceInfo, SourceKind, TableMapping, TargetInfo, TransformConfig,
};
