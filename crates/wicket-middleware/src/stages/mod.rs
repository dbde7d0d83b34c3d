//! Pipeline stages.

pub mod access_log;
pub mod tracing;

pub use access_log::AccessLogStage;
pub use tracing::TracingStage;
