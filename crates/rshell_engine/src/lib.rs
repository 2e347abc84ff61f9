//! rshell_engine: Execution contexts over scopes and compiled commands.
//!
//! An `ExecutionContext` owns a scope chain and the drive providers it
//! notifies, and resolves parameters against commands compiled from
//! definition files into a shareable `CommandRegistry`.

mod context;
mod error;
mod loader;
mod registry;

pub use context::ExecutionContext;
pub use error::{EngineError, EngineResult};
pub use loader::declaration_from_definition;
pub use registry::CommandRegistry;
