//! rshell_diagnostics: Error identifiers and error-record infrastructure.
//!
//! Every failure raised by the engine core carries a stable string error
//! identifier, an error category, and the structured arguments needed to
//! render a message. This crate owns the catalog of identifiers and message
//! templates; rendering for end users is left to outer layers, which can
//! substitute their own (localized) templates keyed by identifier.

use std::fmt;

/// Error category, used by outer layers to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Broken command metadata. A defect in the command definition.
    MetadataError,
    /// Bad user input: unknown or ambiguous names, malformed scope ids.
    InvalidArgument,
    /// A value outside the accepted range.
    InvalidRange,
    /// The operation is not valid in the current state.
    InvalidOperation,
    /// The operation is never permitted on its target.
    PermissionDenied,
    /// A named item does not exist.
    ObjectNotFound,
    /// A named item already exists.
    ResourceExists,
    /// An enclosing execution asked the operation to stop.
    OperationStopped,
    /// Configuration could not be read or parsed.
    ReadError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCategory::MetadataError => "MetadataError",
            ErrorCategory::InvalidArgument => "InvalidArgument",
            ErrorCategory::InvalidRange => "InvalidRange",
            ErrorCategory::InvalidOperation => "InvalidOperation",
            ErrorCategory::PermissionDenied => "PermissionDenied",
            ErrorCategory::ObjectNotFound => "ObjectNotFound",
            ErrorCategory::ResourceExists => "ResourceExists",
            ErrorCategory::OperationStopped => "OperationStopped",
            ErrorCategory::ReadError => "ReadError",
        };
        write!(f, "{}", text)
    }
}

/// A message template with its stable identifier and category.
/// Templates may contain `{0}`, `{1}`, etc. placeholders.
#[derive(Debug, Clone)]
pub struct ErrorMessage {
    /// The stable error identifier (e.g. `AmbiguousParameter`).
    pub id: &'static str,
    /// The category of this error.
    pub category: ErrorCategory,
    /// The message template string.
    pub message: &'static str,
}

/// A realized error with its identifier, category and resolved text.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// The stable error identifier.
    pub id: &'static str,
    /// The category.
    pub category: ErrorCategory,
    /// The rendered message.
    pub message_text: String,
    /// The name of the item the error is about, if any.
    pub target: Option<String>,
    /// The command being compiled or invoked, if known.
    pub command: Option<String>,
}

impl ErrorRecord {
    pub fn new(message: &ErrorMessage, args: &[&str]) -> Self {
        Self {
            id: message.id,
            category: message.category,
            message_text: format_message(message.message, args),
            target: None,
            command: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Whether this record describes a broken command definition rather
    /// than a user input mistake.
    pub fn is_developer_error(&self) -> bool {
        self.category == ErrorCategory::MetadataError
    }

    /// The fully qualified identifier, `Id,Command` when a command is known.
    pub fn fully_qualified_id(&self) -> String {
        match &self.command {
            Some(command) => format!("{},{}", self.id, command),
            None => self.id.to_string(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref command) = self.command {
            write!(f, "{}: ", command)?;
        }
        write!(f, "{} ({}): {}", self.category, self.id, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Implemented by every error enum in the engine so callers can obtain the
/// stable identifier and a structured record without matching on variants.
pub trait Reportable: std::error::Error {
    /// The catalog entry for this error.
    fn message(&self) -> &'static ErrorMessage;

    /// Arguments substituted into the catalog template.
    fn message_args(&self) -> Vec<String>;

    /// The name of the item the error is about, if any.
    fn target(&self) -> Option<&str> {
        None
    }

    fn error_id(&self) -> &'static str {
        self.message().id
    }

    fn category(&self) -> ErrorCategory {
        self.message().category
    }

    fn to_record(&self) -> ErrorRecord {
        let args = self.message_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let record = ErrorRecord::new(self.message(), &args);
        match self.target() {
            Some(target) => record.with_target(target),
            None => record,
        }
    }
}

// ============================================================================
// Error catalog
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! msg {
        ($id:ident, $category:ident, $text:expr) => {
            ErrorMessage { id: stringify!($id), category: ErrorCategory::$category, message: $text }
        };
    }

    // ========================================================================
    // Metadata compilation
    // ========================================================================
    pub const PARAMETER_NAME_ALREADY_EXISTS: ErrorMessage = msg!(ParameterNameAlreadyExistsForCommand, MetadataError, "The command defines more than one parameter named '{0}'.");
    pub const PARAMETER_NAME_CONFLICTS_WITH_ALIAS: ErrorMessage = msg!(ParameterNameConflictsWithAlias, MetadataError, "The parameter '{0}' conflicts with an alias of the parameter '{1}'.");
    pub const ALIAS_DECLARED_MULTIPLE_TIMES: ErrorMessage = msg!(AliasDeclaredMultipleTimes, MetadataError, "The alias '{0}' is declared for more than one parameter.");
    pub const ALIAS_CONFLICTS_WITH_PARAMETER: ErrorMessage = msg!(ParameterNameConflictsWithAlias, MetadataError, "The alias '{0}' of the parameter '{1}' conflicts with the parameter named '{0}'.");
    pub const TOO_MANY_PARAMETER_SETS: ErrorMessage = msg!(TooManyParameterSets, MetadataError, "The command declares more than {0} parameter sets; '{1}' cannot be added.");
    pub const EMPTY_PARAMETER_NAME_IN_METADATA: ErrorMessage = msg!(EmptyParameterName, MetadataError, "A parameter of the command has an empty name.");

    // ========================================================================
    // Parameter resolution
    // ========================================================================
    pub const AMBIGUOUS_PARAMETER: ErrorMessage = msg!(AmbiguousParameter, InvalidArgument, "Parameter cannot be processed because the parameter name '{0}' is ambiguous. Possible matches include:{1}.");
    pub const NAMED_PARAMETER_NOT_FOUND: ErrorMessage = msg!(NamedParameterNotFound, InvalidArgument, "A parameter cannot be found that matches parameter name '{0}'.");
    pub const PARAMETER_NAME_EMPTY: ErrorMessage = msg!(ArgumentNullOrEmpty, InvalidArgument, "The parameter name cannot be empty.");

    // ========================================================================
    // Scopes
    // ========================================================================
    pub const SCOPE_ID_FORMAT: ErrorMessage = msg!(InvalidScopeIdFormat, InvalidArgument, "The scope '{0}' could not be found. A scope must be 'global', 'local', 'private', 'script' or a non-negative integer.");
    pub const SCOPE_ID_OUT_OF_RANGE: ErrorMessage = msg!(ArgumentOutOfRange, InvalidRange, "The scope number '{0}' is out of range. A scope number must be a non-negative 32-bit integer.");
    pub const SCOPE_DEPTH_EXCEEDED: ErrorMessage = msg!(ArgumentOutOfRange, InvalidRange, "The scope number '{0}' exceeds the number of active scopes.");
    pub const SCOPE_NESTING_TOO_DEEP: ErrorMessage = msg!(ScopeNestingTooDeep, InvalidOperation, "The scope depth limit of {0} has been reached.");
    pub const GLOBAL_SCOPE_CANNOT_BE_REMOVED: ErrorMessage = msg!(GlobalScopeCannotRemove, PermissionDenied, "The global scope cannot be removed.");
    pub const SCOPE_HAS_CHILDREN: ErrorMessage = msg!(ScopeHasChildren, InvalidOperation, "The scope '{0}' cannot be removed while it has nested scopes.");
    pub const SCOPE_NOT_FOUND: ErrorMessage = msg!(ScopeNotFound, ObjectNotFound, "The scope '{0}' is no longer active.");
    pub const OPERATION_STOPPED: ErrorMessage = msg!(OperationStopped, OperationStopped, "The operation was stopped: {0}.");

    // ========================================================================
    // Drives
    // ========================================================================
    pub const DRIVE_ALREADY_EXISTS: ErrorMessage = msg!(DriveAlreadyExists, ResourceExists, "A drive with the name '{0}' already exists.");
    pub const DRIVE_NOT_FOUND: ErrorMessage = msg!(DriveNotFound, ObjectNotFound, "Cannot find drive. A drive with the name '{0}' does not exist.");

    // ========================================================================
    // Variables
    // ========================================================================
    pub const VARIABLE_NOT_FOUND: ErrorMessage = msg!(VariableNotFound, ObjectNotFound, "The variable '{0}' cannot be retrieved because it has not been set.");
    pub const VARIABLE_NOT_WRITABLE: ErrorMessage = msg!(VariableNotWritable, InvalidOperation, "Cannot overwrite variable {0} because it is read-only or constant.");
    pub const VARIABLE_NOT_REMOVABLE: ErrorMessage = msg!(VariableNotRemovable, InvalidOperation, "Cannot remove variable {0} because it is constant or read-only.");
    pub const VARIABLE_ALREADY_EXISTS: ErrorMessage = msg!(VariableAlreadyExists, ResourceExists, "A variable with name '{0}' already exists.");
    pub const VARIABLE_CANNOT_BE_MADE_CONSTANT: ErrorMessage = msg!(VariableCannotBeMadeConstant, InvalidOperation, "Existing variable {0} cannot be made constant. Variables can be made constant only at creation time.");
    pub const INVALID_VARIABLE_PATH: ErrorMessage = msg!(InvalidVariablePath, InvalidArgument, "The variable path '{0}' is not valid.");

    // ========================================================================
    // Commands and configuration
    // ========================================================================
    pub const COMMAND_NOT_FOUND: ErrorMessage = msg!(CommandNotFoundException, ObjectNotFound, "The term '{0}' is not recognized as the name of a command.");
    pub const COMMAND_ALREADY_EXISTS: ErrorMessage = msg!(CommandAlreadyExists, ResourceExists, "A command named '{0}' is already registered.");
    pub const CONFIG_READ_FAILED: ErrorMessage = msg!(ConfigReadFailed, ReadError, "Cannot read '{0}': {1}");
    pub const CONFIG_PARSE_FAILED: ErrorMessage = msg!(ConfigParseFailed, ReadError, "Cannot parse '{0}': {1}");
    pub const CONFIG_INVALID: ErrorMessage = msg!(ConfigInvalid, InvalidArgument, "Invalid configuration in '{0}': {1}");
}
