//! The execution context.
//!
//! One context owns one scope chain. Compiled commands live in a
//! `CommandRegistry` that several contexts may share.

use crate::error::{EngineError, EngineResult};
use crate::registry::CommandRegistry;
use rshell_core::Value;
use rshell_options::{parse_command_definition_file, CommandDefinition, EngineOptions};
use rshell_params::{BindingError, MergedParameter, SharedCommandMetadata};
use rshell_scope::{ProviderRegistry, ScopeChain, ScopeId, VariableOptions, VariablePath};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ExecutionContext {
    options: EngineOptions,
    scopes: ScopeChain<Value>,
    providers: ProviderRegistry,
    commands: Arc<CommandRegistry>,
}

impl ExecutionContext {
    /// Create a context with a fresh scope chain and an empty command
    /// registry. Command files named in the options are not loaded; see
    /// `from_options`.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_registry(options, Arc::new(CommandRegistry::new()))
    }

    /// Create a context over an existing, possibly shared, registry.
    pub fn with_registry(options: EngineOptions, commands: Arc<CommandRegistry>) -> Self {
        let scopes = match options.max_scope_depth {
            Some(limit) => ScopeChain::with_max_depth(limit),
            None => ScopeChain::new(),
        };
        Self {
            options,
            scopes,
            providers: ProviderRegistry::new(),
            commands,
        }
    }

    /// Create a context and load every command file the options name.
    pub fn from_options(options: EngineOptions) -> EngineResult<Self> {
        let files = options.command_files.clone();
        let context = Self::new(options);
        for file in &files {
            context.load_command_file(file)?;
        }
        Ok(context)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn scopes(&self) -> &ScopeChain<Value> {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeChain<Value> {
        &mut self.scopes
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Load, compile and register every command in a definition file.
    /// Returns the names registered.
    pub fn load_command_file(&self, path: &Path) -> EngineResult<Vec<String>> {
        let file = parse_command_definition_file(path)?;
        let compiled = self
            .commands
            .register_all(&file.commands, self.options.common_parameters)?;
        info!(path = %path.display(), commands = compiled.len(), "Loaded command file");
        Ok(compiled.iter().map(|m| m.name().to_string()).collect())
    }

    pub fn register_command(&self, definition: &CommandDefinition) -> EngineResult<SharedCommandMetadata> {
        let mut compiled = self
            .commands
            .register_all(std::slice::from_ref(definition), self.options.common_parameters)?;
        compiled.pop().ok_or_else(|| EngineError::CommandNotFound {
            name: definition.name.clone(),
        })
    }

    pub fn command(&self, name: &str) -> EngineResult<SharedCommandMetadata> {
        self.commands
            .get(name)
            .ok_or_else(|| EngineError::CommandNotFound { name: name.to_string() })
    }

    /// Resolve a typed parameter token for a command. A token matching
    /// nothing is an error.
    pub fn resolve_parameter(&self, command: &str, token: &str, exact_match: bool) -> EngineResult<MergedParameter> {
        let metadata = self.command(command)?;
        let found = metadata.resolve(token, exact_match, true)?;
        debug!(command = metadata.name(), token, found = found.map(|p| p.name()), "Resolved parameter");
        found.cloned().ok_or_else(|| {
            EngineError::Binding(BindingError::ParameterNotFound {
                name: token.trim_start_matches('-').to_string(),
                command: metadata.name().to_string(),
            })
        })
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Create a child of the current scope and make it current.
    pub fn enter_scope(&mut self, is_script_scope: bool) -> EngineResult<ScopeId> {
        let id = self.scopes.new_scope(is_script_scope)?;
        self.scopes.set_current_scope(id);
        Ok(id)
    }

    /// Remove the current scope, returning the scope that became current.
    pub fn exit_scope(&mut self) -> EngineResult<ScopeId> {
        let current = self.scopes.current();
        self.scopes.remove_scope(current, &self.providers)?;
        Ok(self.scopes.current())
    }

    /// Resolve a scope identifier (`global`, `script`, `1`, ...).
    pub fn scope_by_id(&self, id: &str) -> EngineResult<ScopeId> {
        Ok(self.scopes.scope_by_id(id)?)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub fn set_variable(&mut self, path: &str, value: Value) -> EngineResult<()> {
        let path = VariablePath::parse(path)?;
        Ok(self.scopes.set_variable(&path, value)?)
    }

    pub fn new_variable(&mut self, path: &str, value: Value, options: VariableOptions, force: bool) -> EngineResult<()> {
        let path = VariablePath::parse(path)?;
        Ok(self.scopes.new_variable(&path, value, options, force)?)
    }

    pub fn get_value(&self, path: &str) -> EngineResult<&Value> {
        let path = VariablePath::parse(path)?;
        Ok(self.scopes.get_value(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rshell_scope::ScopeError;

    #[test]
    fn test_enter_and_exit() {
        let mut context = ExecutionContext::new(EngineOptions::default());
        let global = context.scopes().global();
        let first = context.enter_scope(true).unwrap();
        let second = context.enter_scope(false).unwrap();
        assert_eq!(context.scopes().current(), second);
        assert_eq!(context.scope_by_id("script").unwrap(), first);

        assert_eq!(context.exit_scope().unwrap(), first);
        assert_eq!(context.exit_scope().unwrap(), global);
        let err = context.exit_scope().unwrap_err();
        assert!(matches!(err, EngineError::Scope(ScopeError::CannotRemoveGlobal)));
    }

    #[test]
    fn test_max_scope_depth_from_options() {
        let options = EngineOptions {
            max_scope_depth: Some(1),
            ..EngineOptions::default()
        };
        let mut context = ExecutionContext::new(options);
        context.enter_scope(false).unwrap();
        let err = context.enter_scope(false).unwrap_err();
        assert!(matches!(err, EngineError::Scope(ScopeError::ScopeNestingTooDeep { limit: 1 })));
    }

    #[test]
    fn test_variables_through_context() {
        let mut context = ExecutionContext::new(EngineOptions::default());
        context.set_variable("x", Value::Int(1)).unwrap();
        context.enter_scope(false).unwrap();
        context.set_variable("local:x", Value::Int(2)).unwrap();
        assert_eq!(context.get_value("$x").unwrap(), &Value::Int(2));
        assert_eq!(context.get_value("global:x").unwrap(), &Value::Int(1));
    }
}
