//! Configuration loading and shared configuration types for the heroes loader.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{LoadConfigError, load_config};
