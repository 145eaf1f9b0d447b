//! Backend Error Handling
//!
//! - `types` - the `BackendError` enum and its status/message mapping
//! - `conversion` - `IntoResponse` and the JSON error body

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::{not_found_fallback, ErrorBody};
pub use types::BackendError;
