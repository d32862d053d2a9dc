pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::TypesenseClient;
pub use config::{LocalStorage, Settings};
pub use core::{engine::ImportEngine, pipeline::BulkImportPipeline};
pub use utils::error::{AdminError, Result};
