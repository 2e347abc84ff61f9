//! Engine errors.

use rshell_diagnostics::{messages, ErrorMessage, ErrorRecord, Reportable};
use rshell_options::ConfigError;
use rshell_params::{BindingError, MetadataError};
use rshell_scope::{ScopeError, VariableError};
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command definition failed to compile.
    #[error("command '{command}': {source}")]
    Metadata {
        command: String,
        #[source]
        source: MetadataError,
    },

    #[error("a command named '{name}' is already registered")]
    DuplicateCommand { name: String },

    #[error("the term '{name}' is not recognized as the name of a command")]
    CommandNotFound { name: String },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Variable(#[from] VariableError),
}

impl EngineError {
    fn inner(&self) -> Option<&dyn Reportable> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Metadata { source, .. } => Some(source),
            EngineError::Binding(e) => Some(e),
            EngineError::Scope(e) => Some(e),
            EngineError::Variable(e) => Some(e),
            EngineError::DuplicateCommand { .. } | EngineError::CommandNotFound { .. } => None,
        }
    }
}

impl Reportable for EngineError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            EngineError::DuplicateCommand { .. } => &messages::COMMAND_ALREADY_EXISTS,
            EngineError::CommandNotFound { .. } => &messages::COMMAND_NOT_FOUND,
            other => match other.inner() {
                Some(inner) => inner.message(),
                None => &messages::COMMAND_NOT_FOUND,
            },
        }
    }

    fn message_args(&self) -> Vec<String> {
        match self {
            EngineError::DuplicateCommand { name } | EngineError::CommandNotFound { name } => vec![name.clone()],
            other => other.inner().map(|inner| inner.message_args()).unwrap_or_default(),
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            EngineError::DuplicateCommand { name } | EngineError::CommandNotFound { name } => Some(name),
            other => other.inner().and_then(|inner| inner.target()),
        }
    }

    fn to_record(&self) -> ErrorRecord {
        match self {
            EngineError::Metadata { command, source } => source.to_record().with_command(command),
            EngineError::Binding(e) => e.to_record(),
            _ => {
                let args = self.message_args();
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let record = ErrorRecord::new(self.message(), &args);
                match self.target() {
                    Some(target) => record.with_target(target),
                    None => record,
                }
            }
        }
    }
}
