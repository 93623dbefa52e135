//! Shared configuration types for the heroes loader.

mod base;
mod connection;
mod loader;
mod pipeline;
mod source;

pub use base::ValidationError;
pub use connection::{PgConnectionConfig, TlsConfig};
pub use loader::LoaderConfig;
pub use pipeline::{BatchConfig, PipelineConfig, RangeConfig, WindowConfig};
pub use source::SourceApiConfig;
