//! rshell_options: rshell.json and command definition files.
//!
//! Parses the engine configuration and the JSON files that declare
//! commands and their parameters.

use indexmap::IndexMap;
use rshell_diagnostics::{messages, ErrorMessage, Reportable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Engine configuration, matching the rshell.json schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineOptions {
    /// Command definition files to load at startup.
    #[serde(default)]
    pub command_files: Vec<PathBuf>,
    /// Whether commands get the common parameters (Verbose, ErrorAction, ...).
    #[serde(default = "default_true")]
    pub common_parameters: bool,
    /// Maximum scope nesting depth. Unlimited when absent.
    pub max_scope_depth: Option<usize>,
    /// Log filter directive used when no environment filter is set.
    pub log_filter: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            command_files: Vec::new(),
            common_parameters: true,
            max_scope_depth: None,
            log_filter: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_type() -> String {
    "Object".to_string()
}

/// A file of command definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinitionFile {
    pub commands: Vec<CommandDefinition>,
}

/// One command and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinition {
    pub name: String,
    pub default_parameter_set: Option<String>,
    #[serde(default)]
    pub supports_should_process: bool,
    #[serde(default)]
    pub supports_transactions: bool,
    #[serde(default)]
    pub supports_paging: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub dynamic_parameters: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Set name to membership. Order is kept so set bits are assigned in
    /// declaration order.
    #[serde(default)]
    pub parameter_sets: IndexMap<String, ParameterSetDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterSetDefinition {
    pub mandatory: bool,
    pub position: Option<u32>,
    pub value_from_pipeline: bool,
    pub value_from_pipeline_by_property_name: bool,
    pub value_from_remaining_arguments: bool,
    pub help_message: Option<String>,
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures loading configuration. `origin` names the file, or
/// `<string>` for in-memory content.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{origin}': {source}")]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration in '{origin}': {reason}")]
    Invalid { origin: String, reason: String },
}

impl ConfigError {
    pub fn origin(&self) -> &str {
        match self {
            ConfigError::Read { origin, .. } | ConfigError::Parse { origin, .. } | ConfigError::Invalid { origin, .. } => {
                origin
            }
        }
    }
}

impl Reportable for ConfigError {
    fn message(&self) -> &'static ErrorMessage {
        match self {
            ConfigError::Read { .. } => &messages::CONFIG_READ_FAILED,
            ConfigError::Parse { .. } => &messages::CONFIG_PARSE_FAILED,
            ConfigError::Invalid { .. } => &messages::CONFIG_INVALID,
        }
    }

    fn message_args(&self) -> Vec<String> {
        let detail = match self {
            ConfigError::Read { source, .. } => source.to_string(),
            ConfigError::Parse { source, .. } => source.to_string(),
            ConfigError::Invalid { reason, .. } => reason.clone(),
        };
        vec![self.origin().to_string(), detail]
    }

    fn target(&self) -> Option<&str> {
        Some(self.origin())
    }
}

const STRING_ORIGIN: &str = "<string>";

fn read(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        origin: path.display().to_string(),
        source,
    })
}

fn invalid(origin: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        origin: origin.to_string(),
        reason: reason.into(),
    }
}

fn parse_engine_options_from(content: &str, origin: &str) -> ConfigResult<EngineOptions> {
    let options: EngineOptions = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    if options.max_scope_depth == Some(0) {
        return Err(invalid(origin, "maxScopeDepth must be at least 1"));
    }
    Ok(options)
}

/// Parse rshell.json content.
pub fn parse_engine_options(content: &str) -> ConfigResult<EngineOptions> {
    parse_engine_options_from(content, STRING_ORIGIN)
}

/// Parse an rshell.json file. Relative command file paths are taken
/// relative to the directory holding the file.
pub fn parse_engine_options_file(path: &Path) -> ConfigResult<EngineOptions> {
    let content = read(path)?;
    let mut options = parse_engine_options_from(&content, &path.display().to_string())?;
    if let Some(base) = path.parent() {
        for file in &mut options.command_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }
    Ok(options)
}

fn parse_command_definitions_from(content: &str, origin: &str) -> ConfigResult<CommandDefinitionFile> {
    let file: CommandDefinitionFile = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    for command in &file.commands {
        validate_command(command, origin)?;
    }
    Ok(file)
}

fn validate_command(command: &CommandDefinition, origin: &str) -> ConfigResult<()> {
    if command.name.trim().is_empty() {
        return Err(invalid(origin, "a command has an empty name"));
    }
    let parameters = command.parameters.iter().chain(&command.dynamic_parameters);
    for parameter in parameters {
        if parameter.name.trim().is_empty() {
            return Err(invalid(origin, format!("command '{}' has a parameter with an empty name", command.name)));
        }
        if parameter.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(invalid(
                origin,
                format!("parameter '{}' of command '{}' has an empty alias", parameter.name, command.name),
            ));
        }
        if parameter.parameter_sets.keys().any(|s| s.trim().is_empty()) {
            return Err(invalid(
                origin,
                format!("parameter '{}' of command '{}' names an empty parameter set", parameter.name, command.name),
            ));
        }
    }
    Ok(())
}

/// Parse command definition content.
pub fn parse_command_definitions(content: &str) -> ConfigResult<CommandDefinitionFile> {
    parse_command_definitions_from(content, STRING_ORIGIN)
}

/// Parse a command definition file.
pub fn parse_command_definition_file(path: &Path) -> ConfigResult<CommandDefinitionFile> {
    let content = read(path)?;
    parse_command_definitions_from(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_options_defaults() {
        let options = parse_engine_options("{}").unwrap();
        assert_eq!(options, EngineOptions::default());
        assert!(options.common_parameters);
    }

    #[test]
    fn test_engine_options_camel_case() {
        let options = parse_engine_options(
            r#"{ "commandFiles": ["cmds.json"], "commonParameters": false, "maxScopeDepth": 100, "logFilter": "debug" }"#,
        )
        .unwrap();
        assert_eq!(options.command_files, vec![PathBuf::from("cmds.json")]);
        assert!(!options.common_parameters);
        assert_eq!(options.max_scope_depth, Some(100));
        assert_eq!(options.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = parse_engine_options(r#"{ "commandFile": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = parse_engine_options(r#"{ "maxScopeDepth": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.error_id(), "ConfigInvalid");
    }

    #[test]
    fn test_parameter_sets_keep_order() {
        let file = parse_command_definitions(
            r#"{ "commands": [ { "name": "Get-Thing", "parameters": [
                { "name": "Id", "type": "Int32", "parameterSets": { "ById": { "mandatory": true }, "Alpha": {} } },
                { "name": "Tag" }
            ] } ] }"#,
        )
        .unwrap();
        let id = &file.commands[0].parameters[0];
        let sets: Vec<&str> = id.parameter_sets.keys().map(String::as_str).collect();
        assert_eq!(sets, vec!["ById", "Alpha"]);
        assert!(id.parameter_sets["ById"].mandatory);
        assert_eq!(file.commands[0].parameters[1].type_name, "Object");
    }

    #[test]
    fn test_empty_parameter_name_rejected() {
        let err = parse_command_definitions(r#"{ "commands": [ { "name": "X", "parameters": [ { "name": " " } ] } ] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("empty name"));
        assert_eq!(err.origin(), "<string>");
    }
}
