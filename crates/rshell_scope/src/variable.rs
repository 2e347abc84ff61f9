//! Variables and scope-qualified variable paths.

use crate::error::{VariableError, VariableResult};
use rshell_core::names_equal;

bitflags::bitflags! {
    /// Options attached to a variable at creation time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableOptions: u32 {
        const NONE      = 0;
        /// Cannot be assigned; may be removed or replaced with force.
        const READ_ONLY = 1 << 0;
        /// Cannot be assigned, replaced or removed.
        const CONSTANT  = 1 << 1;
        /// Visible only in the scope that defines it.
        const PRIVATE   = 1 << 2;
        /// Copied into every child scope created after it.
        const ALL_SCOPE = 1 << 3;

        const UNWRITABLE = Self::READ_ONLY.bits() | Self::CONSTANT.bits();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable<V> {
    pub name: String,
    pub value: V,
    pub options: VariableOptions,
    pub description: Option<String>,
}

impl<V> Variable<V> {
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
            options: VariableOptions::NONE,
            description: None,
        }
    }

    pub fn with_options(name: impl Into<String>, value: V, options: VariableOptions) -> Self {
        Self {
            name: name.into(),
            value,
            options,
            description: None,
        }
    }

    pub fn is_writable(&self) -> bool {
        !self.options.intersects(VariableOptions::UNWRITABLE)
    }

    pub fn is_private(&self) -> bool {
        self.options.contains(VariableOptions::PRIVATE)
    }
}

/// A reserved scope name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeQualifier {
    Global,
    Local,
    Private,
    Script,
}

impl ScopeQualifier {
    /// Recognize a reserved scope name, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        const NAMES: [(&str, ScopeQualifier); 4] = [
            ("global", ScopeQualifier::Global),
            ("local", ScopeQualifier::Local),
            ("private", ScopeQualifier::Private),
            ("script", ScopeQualifier::Script),
        ];
        NAMES
            .iter()
            .find(|(name, _)| names_equal(name, text))
            .map(|(_, q)| *q)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeQualifier::Global => "global",
            ScopeQualifier::Local => "local",
            ScopeQualifier::Private => "private",
            ScopeQualifier::Script => "script",
        }
    }
}

/// A variable name with an optional scope qualifier: `x`, `$global:x`,
/// `script:counter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePath {
    pub qualifier: Option<ScopeQualifier>,
    pub name: String,
}

impl VariablePath {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: ScopeQualifier, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier),
            name: name.into(),
        }
    }

    /// Parse a path, accepting an optional leading `$`.
    ///
    /// Only the reserved scope names are accepted as qualifiers; provider
    /// qualifiers such as `env:` are rejected.
    pub fn parse(text: &str) -> VariableResult<Self> {
        let invalid = || VariableError::InvalidPath { path: text.to_string() };
        let body = text.strip_prefix('$').unwrap_or(text);
        let path = match body.split_once(':') {
            Some((prefix, name)) => {
                let qualifier = ScopeQualifier::parse(prefix).ok_or_else(invalid)?;
                Self::qualified(qualifier, name)
            }
            None => Self::unqualified(body),
        };
        if path.name.is_empty() {
            return Err(invalid());
        }
        Ok(path)
    }
}

impl std::fmt::Display for VariablePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{}:{}", q.as_str(), self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
