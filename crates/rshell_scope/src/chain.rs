//! The scope chain: an arena of scopes rooted at Global plus the
//! current-scope pointer.
//!
//! Scope ids are handed out in creation order, so a parent's id is always
//! lower than its children's. Parent walks therefore always terminate.

use crate::drive::{DriveInfo, ProviderContext, ProviderError, ProviderRegistry};
use crate::error::{ScopeError, ScopeResult, VariableError, VariableResult};
use crate::scope::{ScopeId, ScopeNode};
use crate::variable::{ScopeQualifier, Variable, VariableOptions, VariablePath};
use std::num::IntErrorKind;
use tracing::{debug, trace, warn};

/// Manages the tree of lexical scopes owned by one execution context.
#[derive(Debug)]
pub struct ScopeChain<V> {
    /// Scope arena, indexed by `ScopeId`. Removed scopes leave `None`.
    scopes: Vec<Option<ScopeNode<V>>>,
    /// The scope new variables and child scopes attach to.
    current: ScopeId,
    /// Optional guard on nesting depth.
    max_depth: Option<usize>,
}

impl<V> ScopeChain<V> {
    /// Create a chain holding only the global scope, which is also current.
    pub fn new() -> Self {
        Self {
            scopes: vec![Some(ScopeNode::global())],
            current: ScopeId::GLOBAL,
            max_depth: None,
        }
    }

    /// Create a chain that refuses to nest scopes deeper than `limit`.
    pub fn with_max_depth(limit: usize) -> Self {
        Self {
            max_depth: Some(limit),
            ..Self::new()
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Point the chain at another live scope.
    ///
    /// The target must be reachable from Global through parent links.
    pub fn set_current_scope(&mut self, scope: ScopeId) {
        debug_assert!(
            self.is_reachable_from_global(scope),
            "scope {} is not reachable from the global scope",
            scope
        );
        self.current = scope;
    }

    pub fn scope(&self, id: ScopeId) -> ScopeResult<&ScopeNode<V>> {
        self.scopes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(ScopeError::ScopeNotFound { id })
    }

    fn scope_mut(&mut self, id: ScopeId) -> ScopeResult<&mut ScopeNode<V>> {
        self.scopes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(ScopeError::ScopeNotFound { id })
    }

    pub fn current_scope(&self) -> ScopeResult<&ScopeNode<V>> {
        self.scope(self.current)
    }

    pub fn is_live(&self, id: ScopeId) -> bool {
        self.scope(id).is_ok()
    }

    pub fn live_scope_count(&self) -> usize {
        self.scopes.iter().filter(|s| s.is_some()).count()
    }

    /// Iterate from `start` outward to Global, `start` included.
    pub fn ancestors(&self, start: ScopeId) -> Ancestors<'_, V> {
        Ancestors {
            chain: self,
            next: Some(start),
        }
    }

    /// Children always have higher ids than their parent.
    fn has_live_children(&self, id: ScopeId) -> bool {
        self.scopes
            .iter()
            .skip(id.index() + 1)
            .flatten()
            .any(|node| node.parent == Some(id))
    }

    pub fn is_reachable_from_global(&self, id: ScopeId) -> bool {
        self.is_live(id) && self.ancestors(id).last().is_some_and(|s| s.is_global())
    }

    // ========================================================================
    // Scope lookup
    // ========================================================================

    /// Resolve a scope identifier: `global`, `local`, `private`, `script`,
    /// or a non-negative relative depth. Empty means the current scope.
    pub fn scope_by_id(&self, id: &str) -> ScopeResult<ScopeId> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(self.current);
        }
        if let Some(qualifier) = ScopeQualifier::parse(id) {
            return self.scope_for_qualifier(qualifier);
        }
        let depth = parse_scope_number(id)?;
        self.scope_at_depth(depth)
    }

    /// Walk `depth` parent links from the current scope.
    pub fn scope_at_depth(&self, depth: usize) -> ScopeResult<ScopeId> {
        let mut node = self.current_scope()?;
        for _ in 0..depth {
            let parent = node.parent.ok_or(ScopeError::ScopeDepthExceeded { requested: depth })?;
            node = self.scope(parent)?;
        }
        Ok(node.id)
    }

    pub fn scope_for_qualifier(&self, qualifier: ScopeQualifier) -> ScopeResult<ScopeId> {
        match qualifier {
            ScopeQualifier::Global => Ok(ScopeId::GLOBAL),
            ScopeQualifier::Local | ScopeQualifier::Private => Ok(self.current),
            ScopeQualifier::Script => Ok(self.current_scope()?.script_scope),
        }
    }

    // ========================================================================
    // Scope removal
    // ========================================================================

    /// Remove a scope, giving each drive's provider a chance to react.
    ///
    /// Only leaf scopes can be removed. Ordinary provider failures are
    /// ignored. A stop signal aborts before anything is detached, leaving
    /// the scope live.
    pub fn remove_scope(&mut self, scope: ScopeId, providers: &ProviderRegistry) -> ScopeResult<()> {
        if scope == ScopeId::GLOBAL {
            return Err(ScopeError::CannotRemoveGlobal);
        }

        let node = self.scope(scope)?;
        if self.has_live_children(scope) {
            return Err(ScopeError::ScopeHasChildren { id: scope });
        }
        let context = ProviderContext { scope, force: false };
        for drive in node.drives.values() {
            let Some(provider) = providers.get(&drive.provider) else {
                debug!(drive = %drive.name, provider = %drive.provider, "No provider registered for drive");
                continue;
            };
            match provider.can_remove_drive(drive, &context) {
                Ok(allowed) => trace!(drive = %drive.name, allowed, "Provider notified of drive removal"),
                Err(ProviderError::Stop(signal)) => {
                    debug!(scope = %scope, drive = %drive.name, %signal, "Scope removal stopped by provider");
                    return Err(ScopeError::Stopped(signal));
                }
                Err(ProviderError::Failed(reason)) => {
                    warn!(drive = %drive.name, provider = %drive.provider, %reason, "Ignoring provider failure during scope removal");
                }
            }
        }

        let node = self.scope_mut(scope)?;
        node.drives.clear();
        let parent = node.parent.take();

        if self.current == scope {
            self.current = parent.unwrap_or(ScopeId::GLOBAL);
        }
        self.scopes[scope.index()] = None;
        debug!(scope = %scope, current = %self.current, "Removed scope");
        Ok(())
    }

    // ========================================================================
    // Drives
    // ========================================================================

    pub fn new_drive(&mut self, scope: ScopeId, drive: DriveInfo) -> ScopeResult<()> {
        let node = self.scope_mut(scope)?;
        if node.drives.contains_key(&drive.name) {
            return Err(ScopeError::DriveAlreadyExists { name: drive.name });
        }
        let name = drive.name.clone();
        node.drives.insert(&name, drive);
        Ok(())
    }

    /// Find a drive from the current scope outward.
    pub fn get_drive(&self, name: &str) -> ScopeResult<&DriveInfo> {
        self.ancestors(self.current)
            .find_map(|node| node.drive(name))
            .ok_or_else(|| ScopeError::DriveNotFound { name: name.to_string() })
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Look a variable up. Qualified paths consult only the named scope;
    /// unqualified paths search outward from the current scope. Private
    /// variables are only visible from the scope that defines them.
    pub fn get_variable(&self, path: &VariablePath) -> Option<&Variable<V>> {
        self.find_variable(path).ok().map(|(_, var)| var)
    }

    pub fn get_value(&self, path: &VariablePath) -> VariableResult<&V> {
        self.find_variable(path).map(|(_, var)| &var.value)
    }

    fn find_variable(&self, path: &VariablePath) -> VariableResult<(ScopeId, &Variable<V>)> {
        let not_found = || VariableError::NotFound { name: path.name.clone() };
        match path.qualifier {
            Some(qualifier) => {
                let id = self.scope_for_qualifier(qualifier)?;
                self.scope(id)?
                    .variable(&path.name)
                    .filter(|var| id == self.current || !var.is_private())
                    .map(|var| (id, var))
                    .ok_or_else(not_found)
            }
            None => self
                .ancestors(self.current)
                .find_map(|node| {
                    node.variable(&path.name)
                        .filter(|var| node.id == self.current || !var.is_private())
                        .map(|var| (node.id, var))
                })
                .ok_or_else(not_found),
        }
    }

    /// Every variable visible from the current scope, innermost first,
    /// with shadowed names omitted.
    pub fn visible_variables(&self) -> Vec<&Variable<V>> {
        let mut seen = rshell_core::CaseInsensitiveMap::new();
        for node in self.ancestors(self.current) {
            for var in node.variables() {
                if (node.id == self.current || !var.is_private()) && !seen.contains_key(&var.name) {
                    seen.insert(&var.name, var);
                }
            }
        }
        seen.values().copied().collect()
    }

    fn target_scope(&self, path: &VariablePath) -> ScopeResult<ScopeId> {
        match path.qualifier {
            Some(qualifier) => self.scope_for_qualifier(qualifier),
            None => Ok(self.current),
        }
    }

    /// Assign a variable in the scope the path names (the current scope
    /// when unqualified), creating it there if needed.
    pub fn set_variable(&mut self, path: &VariablePath, value: V) -> VariableResult<()> {
        let target = self.target_scope(path)?;
        let node = self.scope_mut(target)?;
        match node.variables.get_mut(&path.name) {
            Some(var) if !var.is_writable() => Err(VariableError::NotWritable { name: var.name.clone() }),
            Some(var) => {
                var.value = value;
                Ok(())
            }
            None => {
                let options = if path.qualifier == Some(ScopeQualifier::Private) {
                    VariableOptions::PRIVATE
                } else {
                    VariableOptions::NONE
                };
                node.variables
                    .insert(&path.name, Variable::with_options(path.name.clone(), value, options));
                Ok(())
            }
        }
    }

    /// Create a variable with options. An existing variable is replaced only
    /// with `force`, and never when it is constant.
    pub fn new_variable(
        &mut self,
        path: &VariablePath,
        value: V,
        options: VariableOptions,
        force: bool,
    ) -> VariableResult<()> {
        let mut options = options;
        if path.qualifier == Some(ScopeQualifier::Private) {
            options |= VariableOptions::PRIVATE;
        }
        let target = self.target_scope(path)?;
        let node = self.scope_mut(target)?;
        if let Some(existing) = node.variables.get(&path.name) {
            let name = existing.name.clone();
            if !force {
                return Err(VariableError::AlreadyExists { name });
            }
            if existing.options.contains(VariableOptions::CONSTANT) {
                return Err(VariableError::NotWritable { name });
            }
            if options.contains(VariableOptions::CONSTANT) {
                return Err(VariableError::CannotBeMadeConstant { name });
            }
        }
        node.variables
            .insert(&path.name, Variable::with_options(path.name.clone(), value, options));
        Ok(())
    }

    /// Remove a variable. Unqualified paths remove the innermost visible
    /// definition. Constants are never removed; read-only variables need `force`.
    pub fn remove_variable(&mut self, path: &VariablePath, force: bool) -> VariableResult<Variable<V>> {
        let (target, var) = self.find_variable(path)?;
        if var.options.contains(VariableOptions::CONSTANT)
            || (var.options.contains(VariableOptions::READ_ONLY) && !force)
        {
            return Err(VariableError::NotRemovable { name: var.name.clone() });
        }
        self.scope_mut(target)?
            .variables
            .remove(&path.name)
            .ok_or_else(|| VariableError::NotFound { name: path.name.clone() })
    }
}

impl<V: Clone> ScopeChain<V> {
    /// Create a child of the current scope. The new scope does not become
    /// current; callers push it with `set_current_scope`.
    pub fn new_scope(&mut self, is_script_scope: bool) -> ScopeResult<ScopeId> {
        let parent = self.scope(self.current)?;
        if let Some(limit) = self.max_depth {
            if parent.depth >= limit {
                return Err(ScopeError::ScopeNestingTooDeep { limit });
            }
        }

        let id = ScopeId(self.scopes.len() as u32);
        let mut node = ScopeNode::child(id, parent, is_script_scope);
        for var in parent.variables().filter(|v| v.options.contains(VariableOptions::ALL_SCOPE)) {
            node.variables.insert(&var.name, var.clone());
        }
        debug!(scope = %id, parent = %parent.id, depth = node.depth, script = is_script_scope, "New scope");
        self.scopes.push(Some(node));
        Ok(id)
    }
}

impl<V> Default for ScopeChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a scope and its ancestors, innermost first.
pub struct Ancestors<'a, V> {
    chain: &'a ScopeChain<V>,
    next: Option<ScopeId>,
}

impl<'a, V> Iterator for Ancestors<'a, V> {
    type Item = &'a ScopeNode<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.chain.scope(self.next?).ok()?;
        self.next = node.parent;
        Some(node)
    }
}

/// Parse a numeric scope identifier, separating text that is not an
/// integer at all from integers that are negative or overflow.
fn parse_scope_number(text: &str) -> ScopeResult<usize> {
    match text.parse::<i32>() {
        Ok(n) if n >= 0 => Ok(n as usize),
        Ok(_) => Err(ScopeError::ScopeIdOutOfRange { value: text.to_string() }),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(ScopeError::ScopeIdOutOfRange { value: text.to_string() })
            }
            _ => Err(ScopeError::InvalidScopeIdFormat { value: text.to_string() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope_number() {
        assert_eq!(parse_scope_number("0"), Ok(0));
        assert_eq!(parse_scope_number("17"), Ok(17));
        assert!(matches!(parse_scope_number("-1"), Err(ScopeError::ScopeIdOutOfRange { .. })));
        assert!(matches!(parse_scope_number("4294967296"), Err(ScopeError::ScopeIdOutOfRange { .. })));
        assert!(matches!(parse_scope_number("-99999999999"), Err(ScopeError::ScopeIdOutOfRange { .. })));
        assert!(matches!(parse_scope_number("abc"), Err(ScopeError::InvalidScopeIdFormat { .. })));
        assert!(matches!(parse_scope_number("1.5"), Err(ScopeError::InvalidScopeIdFormat { .. })));
    }

    #[test]
    fn test_ids_increase_away_from_global() {
        let mut chain: ScopeChain<i32> = ScopeChain::new();
        let a = chain.new_scope(false).unwrap();
        chain.set_current_scope(a);
        let b = chain.new_scope(false).unwrap();
        assert!(ScopeId::GLOBAL < a && a < b);
        assert_eq!(chain.scope(b).unwrap().depth(), 2);
    }
}
