//! Storage abstractions for the exported document.
//!
//! A run produces exactly one file:
//!
//! ```text
//! {output.dir}/
//! └── uae_education_data.json
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FullDataResponse;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for document storage backends.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Persist the full document, all-or-nothing. Returns where it landed.
    async fn write_document(&self, document: &FullDataResponse) -> Result<PathBuf>;

    /// Load a previously written document, if there is one.
    async fn load_document(&self) -> Result<Option<FullDataResponse>>;
}
