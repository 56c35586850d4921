pub mod error;
pub mod error_code;
pub mod interceptor;
pub mod record;
pub mod stage_error;
pub mod storage;

// Re-export key public types/traits for easier use by the binary and plugins
pub use error::{Error, Result};
pub use error_code::{ErrorCode, ErrorCodeDef, ErrorMessage, MessageCatalog};
pub use interceptor::{
    ConfigIssue, HostContext, Interceptor, InterceptorChain, InterceptorContext, InterceptorDefinition,
    InterceptorRegistry,
};
pub use record::Record;
pub use stage_error::{Param, StageError};
pub use storage::{BlobStore, HostConfig, StorageProvider};
