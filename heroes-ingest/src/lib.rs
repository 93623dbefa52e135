pub mod concurrency;
pub mod destination;
pub mod error;
pub mod macros;
pub mod pipeline;
pub mod producer;
pub mod source;
pub mod types;
