//! # Journal Export Library
//!
//! Keeps a scheduled ledger journal export moving forward using nothing but
//! the manifest objects the export job writes to S3:
//! - Detects an export that is still running and leaves it alone
//! - Quarantines the markers of exports the job service no longer knows
//! - Submits the next export for exactly the range not yet requested
//! - Archives consumed manifests into a dated layout
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use journal_export_lib::{ExportConfig, ExportProcessor, QldbJobService, S3ObjectStore};
//! use aws_config::BehaviorVersion;
//! use aws_sdk_qldb::Client as QldbClient;
//! use aws_sdk_s3::Client as S3Client;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
//!     let store = Arc::new(S3ObjectStore::new(Arc::new(S3Client::new(&aws_config))));
//!     let jobs = Arc::new(QldbJobService::new(Arc::new(QldbClient::new(&aws_config))));
//!
//!     let processor = ExportProcessor::new(store, jobs, ExportConfig::from_env()?);
//!     let outcome = processor.run().await?;
//!
//!     println!("{}", outcome.status_message());
//!     Ok(())
//! }
//! ```

// Include the modules from the modules directory
#[path = "../modules/mod.rs"]
pub mod modules;

// Re-export everything from modules for easy access
pub use modules::*;

// Re-export commonly used external types for convenience
pub use aws_sdk_qldb::Client as QldbClient;
pub use aws_sdk_s3::Client as S3Client;

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library information
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
