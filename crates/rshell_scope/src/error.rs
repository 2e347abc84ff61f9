//! Error types for scope navigation, scope removal and variable access.

use crate::drive::StopSignal;
use crate::scope::ScopeId;
use rshell_diagnostics::{messages, ErrorMessage, Reportable};
use thiserror::Error;

/// Result type for scope chain operations
pub type ScopeResult<T> = Result<T, ScopeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope identifier is neither a reserved word nor an integer.
    #[error("scope identifier '{value}' is not a number or a reserved scope name")]
    InvalidScopeIdFormat { value: String },

    /// The scope identifier is an integer, but negative or too large to represent.
    #[error("scope number '{value}' is out of range")]
    ScopeIdOutOfRange { value: String },

    /// Walking the requested number of parent links ran past the global scope.
    #[error("scope number {requested} exceeds the number of active scopes")]
    ScopeDepthExceeded { requested: usize },

    /// Creating another nested scope would exceed the configured limit.
    #[error("scope nesting limit of {limit} reached")]
    ScopeNestingTooDeep { limit: usize },

    #[error("the global scope cannot be removed")]
    CannotRemoveGlobal,

    /// Nested scopes must be removed before their parent.
    #[error("scope {id} still has nested scopes")]
    ScopeHasChildren { id: ScopeId },

    /// The scope was removed or never belonged to this chain.
    #[error("scope {id} is not active")]
    ScopeNotFound { id: ScopeId },

    #[error("drive '{name}' already exists in this scope")]
    DriveAlreadyExists { name: String },

    #[error("drive '{name}' not found")]
    DriveNotFound { name: String },

    /// A provider callback asked the enclosing execution to stop.
    #[error("operation stopped: {0}")]
    Stopped(StopSignal),
}

impl Reportable for ScopeError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            ScopeError::InvalidScopeIdFormat { .. } => &messages::SCOPE_ID_FORMAT,
            ScopeError::ScopeIdOutOfRange { .. } => &messages::SCOPE_ID_OUT_OF_RANGE,
            ScopeError::ScopeDepthExceeded { .. } => &messages::SCOPE_DEPTH_EXCEEDED,
            ScopeError::ScopeNestingTooDeep { .. } => &messages::SCOPE_NESTING_TOO_DEEP,
            ScopeError::CannotRemoveGlobal => &messages::GLOBAL_SCOPE_CANNOT_BE_REMOVED,
            ScopeError::ScopeHasChildren { .. } => &messages::SCOPE_HAS_CHILDREN,
            ScopeError::ScopeNotFound { .. } => &messages::SCOPE_NOT_FOUND,
            ScopeError::DriveAlreadyExists { .. } => &messages::DRIVE_ALREADY_EXISTS,
            ScopeError::DriveNotFound { .. } => &messages::DRIVE_NOT_FOUND,
            ScopeError::Stopped(_) => &messages::OPERATION_STOPPED,
        }
    }

    fn message_args(&self) -> Vec<String> {
        match self {
            ScopeError::InvalidScopeIdFormat { value } | ScopeError::ScopeIdOutOfRange { value } => {
                vec![value.clone()]
            }
            ScopeError::ScopeDepthExceeded { requested } => vec![requested.to_string()],
            ScopeError::ScopeNestingTooDeep { limit } => vec![limit.to_string()],
            ScopeError::CannotRemoveGlobal => Vec::new(),
            ScopeError::ScopeNotFound { id } | ScopeError::ScopeHasChildren { id } => vec![id.to_string()],
            ScopeError::DriveAlreadyExists { name } | ScopeError::DriveNotFound { name } => vec![name.clone()],
            ScopeError::Stopped(signal) => vec![signal.to_string()],
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            ScopeError::InvalidScopeIdFormat { value } | ScopeError::ScopeIdOutOfRange { value } => Some(value),
            ScopeError::DriveAlreadyExists { name } | ScopeError::DriveNotFound { name } => Some(name),
            _ => None,
        }
    }
}

/// Result type for variable operations
pub type VariableResult<T> = Result<T, VariableError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    #[error("variable '{name}' not found")]
    NotFound { name: String },

    #[error("variable '{name}' is read-only or constant")]
    NotWritable { name: String },

    #[error("variable '{name}' is read-only or constant and cannot be removed")]
    NotRemovable { name: String },

    #[error("variable '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("existing variable '{name}' cannot be made constant")]
    CannotBeMadeConstant { name: String },

    #[error("invalid variable path '{path}'")]
    InvalidPath { path: String },

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl Reportable for VariableError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            VariableError::NotFound { .. } => &messages::VARIABLE_NOT_FOUND,
            VariableError::NotWritable { .. } => &messages::VARIABLE_NOT_WRITABLE,
            VariableError::NotRemovable { .. } => &messages::VARIABLE_NOT_REMOVABLE,
            VariableError::AlreadyExists { .. } => &messages::VARIABLE_ALREADY_EXISTS,
            VariableError::CannotBeMadeConstant { .. } => &messages::VARIABLE_CANNOT_BE_MADE_CONSTANT,
            VariableError::InvalidPath { .. } => &messages::INVALID_VARIABLE_PATH,
            VariableError::Scope(inner) => inner.message(),
        }
    }

    fn message_args(&self) -> Vec<String> {
        match self {
            VariableError::NotFound { name }
            | VariableError::NotWritable { name }
            | VariableError::NotRemovable { name }
            | VariableError::AlreadyExists { name }
            | VariableError::CannotBeMadeConstant { name } => vec![name.clone()],
            VariableError::InvalidPath { path } => vec![path.clone()],
            VariableError::Scope(inner) => inner.message_args(),
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            VariableError::NotFound { name }
            | VariableError::NotWritable { name }
            | VariableError::NotRemovable { name }
            | VariableError::AlreadyExists { name }
            | VariableError::CannotBeMadeConstant { name } => Some(name),
            VariableError::InvalidPath { path } => Some(path),
            VariableError::Scope(inner) => inner.target(),
        }
    }
}
