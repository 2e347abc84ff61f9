//! Resolution of typed parameter names.
//!
//! A token such as `-fo` is matched against canonical names and then
//! aliases as a case-insensitive prefix. Ambiguity between a command's own
//! parameters and the shared common groups is settled in favour of the
//! command's own parameters when an exact match was requested.

use crate::error::{BindingError, BindingResult};
use crate::merged::{MergedParameter, MergedParameterTable, ParameterId};
use rshell_core::{names_equal, starts_with_ignore_case};
use tracing::trace;

/// The invocation a token is being resolved for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationInfo {
    pub command_name: String,
    /// Position of the token on the command line, when known.
    pub position: Option<usize>,
}

impl InvocationInfo {
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            position: None,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl MergedParameterTable {
    /// Find the single parameter a typed name refers to.
    ///
    /// Returns `Ok(None)` when nothing matches and `throw_if_not_found` is
    /// false.
    pub fn get_matching_parameter(
        &self,
        name: &str,
        throw_if_not_found: bool,
        exact_match: bool,
        invocation: &InvocationInfo,
    ) -> BindingResult<Option<&MergedParameter>> {
        if name.is_empty() {
            return Err(BindingError::EmptyParameterName);
        }
        let typed = name.strip_prefix('-').unwrap_or(name);

        let mut candidates: Vec<ParameterId> = Vec::new();

        for (canonical, &id) in self.data.bindable.iter() {
            if !starts_with_ignore_case(canonical, typed) {
                continue;
            }
            if exact_match && names_equal(canonical, typed) {
                trace!(token = name, parameter = canonical, "exact canonical match");
                return Ok(self.parameter(id));
            }
            candidates.push(id);
        }

        for (alias, &id) in self.data.aliased.iter() {
            if !starts_with_ignore_case(alias, typed) {
                continue;
            }
            if exact_match && names_equal(alias, typed) {
                trace!(token = name, alias, "exact alias match");
                return Ok(self.parameter(id));
            }
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }

        trace!(token = name, candidates = candidates.len(), "prefix scan finished");

        if candidates.len() > 1 {
            let preferred: Vec<ParameterId> = candidates
                .iter()
                .copied()
                .filter(|&id| self.parameter(id).is_some_and(|p| p.category.is_command_specific()))
                .collect();

            if exact_match && preferred.len() == 1 {
                return Ok(self.parameter(preferred[0]));
            }

            let names = candidates
                .iter()
                .filter_map(|&id| self.parameter(id))
                .map(|p| format!("-{}", p.parameter.name))
                .collect();
            return Err(BindingError::AmbiguousParameter {
                name: typed.to_string(),
                candidates: names,
                command: invocation.command_name.clone(),
            });
        }

        match candidates.first() {
            Some(&id) => Ok(self.parameter(id)),
            None if throw_if_not_found => Err(BindingError::ParameterNotFound {
                name: typed.to_string(),
                command: invocation.command_name.clone(),
            }),
            None => Ok(None),
        }
    }
}
