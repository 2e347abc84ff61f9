//! rshell_params: Parameter metadata and parameter-name resolution.
//!
//! Commands declare parameters, grouped into named parameter sets. The
//! compiler merges a command's own parameters with the shared common
//! groups into a `MergedParameterTable`, assigns each parameter set a bit,
//! and the resolver maps typed tokens like `-fo` to a single parameter.

pub mod common;
mod compiler;
mod descriptor;
mod error;
mod merged;
mod parameter_sets;
mod resolver;

pub use compiler::{CommandDeclaration, CommandMetadata, SharedCommandMetadata};
pub use descriptor::{BinderCategory, ParameterDescriptor, ParameterSetMetadata, ALL_PARAMETER_SETS};
pub use error::{BindingError, BindingResult, MetadataError, MetadataResult};
pub use merged::{MergedParameter, MergedParameterTable, ParameterId};
pub use parameter_sets::{flag_for_index, ParameterSetRegistry, ALL_SETS_MASK, MAX_PARAMETER_SETS};
pub use resolver::InvocationInfo;
