//! Error types for metadata compilation and parameter resolution.

use rshell_diagnostics::{messages, ErrorMessage, ErrorRecord, Reportable};
use thiserror::Error;

/// Result type for metadata compilation
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Defects in a command's declared parameter metadata. These surface when
/// the command is loaded, never while it is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("parameter name '{name}' already exists")]
    ParameterNameAlreadyExists { name: String },

    /// A new canonical name is already an alias of `owner`.
    #[error("parameter '{name}' conflicts with an alias of parameter '{owner}'")]
    ParameterNameConflictsWithAlias { name: String, owner: String },

    /// An alias of `parameter` is already an alias of `owner`.
    #[error("alias '{alias}' of parameter '{parameter}' is already an alias of parameter '{owner}'")]
    AliasAlreadyExists { alias: String, parameter: String, owner: String },

    /// An alias of `parameter` is already a canonical parameter name.
    #[error("alias '{alias}' of parameter '{parameter}' conflicts with the parameter named '{alias}'")]
    AliasConflictsWithParameter { alias: String, parameter: String },

    #[error("cannot add parameter set '{name}': at most {limit} parameter sets are supported")]
    TooManyParameterSets { name: String, limit: usize },

    #[error("parameter name is empty")]
    EmptyParameterName,
}

impl Reportable for MetadataError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            MetadataError::ParameterNameAlreadyExists { .. } => &messages::PARAMETER_NAME_ALREADY_EXISTS,
            MetadataError::ParameterNameConflictsWithAlias { .. } => &messages::PARAMETER_NAME_CONFLICTS_WITH_ALIAS,
            MetadataError::AliasAlreadyExists { .. } => &messages::ALIAS_DECLARED_MULTIPLE_TIMES,
            MetadataError::AliasConflictsWithParameter { .. } => &messages::ALIAS_CONFLICTS_WITH_PARAMETER,
            MetadataError::TooManyParameterSets { .. } => &messages::TOO_MANY_PARAMETER_SETS,
            MetadataError::EmptyParameterName => &messages::EMPTY_PARAMETER_NAME_IN_METADATA,
        }
    }

    fn message_args(&self) -> Vec<String> {
        match self {
            MetadataError::ParameterNameAlreadyExists { name } => vec![name.clone()],
            MetadataError::ParameterNameConflictsWithAlias { name, owner } => vec![name.clone(), owner.clone()],
            MetadataError::AliasAlreadyExists { alias, .. } => vec![alias.clone()],
            MetadataError::AliasConflictsWithParameter { alias, parameter } => vec![alias.clone(), parameter.clone()],
            MetadataError::TooManyParameterSets { name, limit } => vec![limit.to_string(), name.clone()],
            MetadataError::EmptyParameterName => Vec::new(),
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            MetadataError::ParameterNameAlreadyExists { name }
            | MetadataError::ParameterNameConflictsWithAlias { name, .. }
            | MetadataError::TooManyParameterSets { name, .. } => Some(name),
            MetadataError::AliasAlreadyExists { alias, .. } | MetadataError::AliasConflictsWithParameter { alias, .. } => {
                Some(alias)
            }
            MetadataError::EmptyParameterName => None,
        }
    }
}

/// Result type for parameter resolution
pub type BindingResult<T> = Result<T, BindingError>;

/// Failures resolving a typed parameter name. These are user input
/// mistakes and are reported with the command being invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("parameter name cannot be empty")]
    EmptyParameterName,

    /// `candidates` holds each matching parameter name prefixed with a dash.
    #[error("parameter name '{name}' is ambiguous. Possible matches include: {}", .candidates.join(" "))]
    AmbiguousParameter {
        name: String,
        candidates: Vec<String>,
        command: String,
    },

    #[error("a parameter cannot be found that matches parameter name '{name}'")]
    ParameterNotFound { name: String, command: String },
}

impl BindingError {
    /// The command being invoked, when known.
    pub fn command(&self) -> Option<&str> {
        match self {
            BindingError::EmptyParameterName => None,
            BindingError::AmbiguousParameter { command, .. } | BindingError::ParameterNotFound { command, .. } => {
                Some(command.as_str()).filter(|c| !c.is_empty())
            }
        }
    }
}

impl Reportable for BindingError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            BindingError::EmptyParameterName => &messages::PARAMETER_NAME_EMPTY,
            BindingError::AmbiguousParameter { .. } => &messages::AMBIGUOUS_PARAMETER,
            BindingError::ParameterNotFound { .. } => &messages::NAMED_PARAMETER_NOT_FOUND,
        }
    }

    fn message_args(&self) -> Vec<String> {
        match self {
            BindingError::EmptyParameterName => Vec::new(),
            BindingError::AmbiguousParameter { name, candidates, .. } => {
                let list: String = candidates.iter().map(|c| format!(" {}", c)).collect();
                vec![name.clone(), list]
            }
            BindingError::ParameterNotFound { name, .. } => vec![name.clone()],
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            BindingError::EmptyParameterName => None,
            BindingError::AmbiguousParameter { name, .. } | BindingError::ParameterNotFound { name, .. } => Some(name),
        }
    }

    fn to_record(&self) -> ErrorRecord {
        let args = self.message_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut record = ErrorRecord::new(self.message(), &args);
        if let Some(target) = self.target() {
            record = record.with_target(target);
        }
        if let Some(command) = self.command() {
            record = record.with_command(command);
        }
        record
    }
}
