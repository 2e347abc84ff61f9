//! rshell_core: Core utilities for the rshell engine.
//!
//! Provides case-insensitive name handling, the collections built on it,
//! and the tagged value type stored in scopes.

pub mod collections;
pub mod name;
pub mod value;

// Re-export commonly used types
pub use collections::CaseInsensitiveMap;
pub use name::{fold_name, names_equal, starts_with_ignore_case};
pub use value::Value;
