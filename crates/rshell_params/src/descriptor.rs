//! Declared parameter metadata.

use rshell_core::CaseInsensitiveMap;
use std::fmt;

/// The pseudo parameter-set name meaning "every parameter set".
pub const ALL_PARAMETER_SETS: &str = "__AllParameterSets";

/// Where a parameter was declared. Used to break ties when a typed name
/// matches several parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinderCategory {
    /// Parameters the command itself declares.
    DeclaredFormal,
    /// Parameters the command produces at invocation time.
    Dynamic,
    /// Verbose, ErrorAction and the rest of the common parameters.
    Common,
    /// WhatIf and Confirm.
    ShouldProcess,
    /// UseTransaction.
    Transactions,
    /// First, Skip and IncludeTotalCount.
    Paging,
}

impl BinderCategory {
    /// Whether the parameter belongs to the command rather than to one of
    /// the cross-cutting groups every command shares.
    pub fn is_command_specific(self) -> bool {
        matches!(self, BinderCategory::DeclaredFormal | BinderCategory::Dynamic)
    }
}

impl fmt::Display for BinderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinderCategory::DeclaredFormal => "declared",
            BinderCategory::Dynamic => "dynamic",
            BinderCategory::Common => "common",
            BinderCategory::ShouldProcess => "should-process",
            BinderCategory::Transactions => "transactions",
            BinderCategory::Paging => "paging",
        };
        write!(f, "{}", text)
    }
}

/// How a parameter participates in one parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSetMetadata {
    pub mandatory: bool,
    pub position: Option<u32>,
    pub value_from_pipeline: bool,
    pub value_from_pipeline_by_property_name: bool,
    pub value_from_remaining_arguments: bool,
    pub help_message: Option<String>,
    pub(crate) parameter_set_flag: u32,
    pub(crate) is_in_all_sets: bool,
}

impl ParameterSetMetadata {
    pub fn mandatory() -> Self {
        Self {
            mandatory: true,
            ..Self::default()
        }
    }

    pub fn at_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn from_pipeline(mut self) -> Self {
        self.value_from_pipeline = true;
        self
    }

    /// The bit assigned to this set, zero before mapping or for all-sets entries.
    pub fn parameter_set_flag(&self) -> u32 {
        self.parameter_set_flag
    }

    pub fn is_in_all_sets(&self) -> bool {
        self.is_in_all_sets
    }
}

/// Metadata for one declared parameter.
///
/// A descriptor with no parameter-set entries is treated as belonging to
/// every set.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    pub type_name: String,
    pub aliases: Vec<String>,
    pub parameter_sets: CaseInsensitiveMap<ParameterSetMetadata>,
    pub(crate) is_in_all_sets: bool,
    pub(crate) parameter_set_flags: u32,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            aliases: Vec::new(),
            parameter_sets: CaseInsensitiveMap::new(),
            is_in_all_sets: false,
            parameter_set_flags: 0,
        }
    }

    /// A switch parameter in all sets, as the common parameter groups declare.
    pub fn switch(name: &str) -> Self {
        Self::new(name, "SwitchParameter").in_all_sets(ParameterSetMetadata::default())
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn in_set(mut self, set_name: &str, metadata: ParameterSetMetadata) -> Self {
        self.parameter_sets.insert(set_name, metadata);
        self
    }

    pub fn in_all_sets(self, metadata: ParameterSetMetadata) -> Self {
        self.in_set(ALL_PARAMETER_SETS, metadata)
    }

    /// Whether the parameter is a member of every set. Valid after the
    /// owning table has generated its parameter-set mapping.
    pub fn is_in_all_sets(&self) -> bool {
        self.is_in_all_sets
    }

    /// The union of the bits of the explicitly named sets the parameter
    /// belongs to. Valid after mapping.
    pub fn parameter_set_flags(&self) -> u32 {
        self.parameter_set_flags
    }

    pub fn is_switch(&self) -> bool {
        self.type_name.eq_ignore_ascii_case("SwitchParameter") || self.type_name.eq_ignore_ascii_case("switch")
    }
}
