pub mod provider;
pub mod local;
pub mod config;
pub mod blob;
pub mod error;

/// Re-export key types
pub use provider::StorageProvider;
pub use local::LocalStorageProvider;
pub use config::{ConfigData, ConfigFormat, HostConfig};
pub use blob::{BlobStore, InMemoryBlobStore, LocalBlobStore};

// Test module declaration
#[cfg(test)]
mod tests;
