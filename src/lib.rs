pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod stats;
pub mod traversal;
pub mod types;

pub use config::{InspectConfig, RasterConfig};
pub use error::{InspectError, Result};
pub use pipeline::{InspectionResult, Pipeline};
