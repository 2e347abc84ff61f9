//! rshell_scope: Lexical scopes and the scope chain.
//!
//! A `ScopeChain` owns a tree of scopes rooted at Global, a pointer to the
//! current scope, and the variables and drives registered in each scope.
//! It resolves scope identifiers (`global`, `script`, `2`, ...) and
//! scope-qualified variable paths, and removes scopes while giving drive
//! providers a chance to react.

mod chain;
mod drive;
mod error;
mod scope;
mod variable;

pub use chain::{Ancestors, ScopeChain};
pub use drive::{DriveInfo, DriveProvider, ProviderContext, ProviderError, ProviderRegistry, StopSignal};
pub use error::{ScopeError, ScopeResult, VariableError, VariableResult};
pub use scope::{ScopeId, ScopeNode};
pub use variable::{ScopeQualifier, Variable, VariableOptions, VariablePath};
