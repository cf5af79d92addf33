//! Backend collaborators.
//!
//! Everything here talks HTTP through [`ServiceClient`], which in turn sends
//! through a [`Transport`]. [`HttpTransport`] is the production transport.

pub mod client;
pub mod http;
pub mod pipeline;
pub mod sample;

pub use client::{
    HttpRequest, HttpResponse, Method, RequestConfig, ResponseBody, ServiceClient, Transport,
    TransportError, TransportFailure,
};
pub use http::HttpTransport;
pub use pipeline::{DatabaseColumn, DatabaseMetadata, DatabaseTable, ExtractService, PipelineService};
pub use sample::{ensure_structured, format_headers, HeaderRow, SampleRequest, SampleSource, SchemaFetcher};
