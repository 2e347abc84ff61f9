//! Metadata compilation.
//!
//! Turns a command's declaration into its merged parameter table: declared
//! parameters first, then dynamic ones, then the shared groups the command
//! opts into, followed by parameter-set mapping.

use crate::common;
use crate::descriptor::{BinderCategory, ParameterDescriptor};
use crate::error::{BindingResult, MetadataResult};
use crate::merged::{MergedParameter, MergedParameterTable};
use crate::parameter_sets::ALL_SETS_MASK;
use crate::resolver::InvocationInfo;
use std::sync::Arc;
use tracing::debug;

/// What a command declares about its parameters.
#[derive(Debug, Clone)]
pub struct CommandDeclaration {
    pub name: String,
    pub default_parameter_set: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub dynamic_parameters: Vec<ParameterDescriptor>,
    pub include_common_parameters: bool,
    pub supports_should_process: bool,
    pub supports_transactions: bool,
    pub supports_paging: bool,
}

impl CommandDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_parameter_set: None,
            parameters: Vec::new(),
            dynamic_parameters: Vec::new(),
            include_common_parameters: true,
            supports_should_process: false,
            supports_transactions: false,
            supports_paging: false,
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_default_set(mut self, name: impl Into<String>) -> Self {
        self.default_parameter_set = Some(name.into());
        self
    }

    /// The categories this declaration merges, in merge order.
    fn categories(&self) -> Vec<BinderCategory> {
        let mut categories = vec![BinderCategory::DeclaredFormal];
        if !self.dynamic_parameters.is_empty() {
            categories.push(BinderCategory::Dynamic);
        }
        if self.include_common_parameters {
            categories.push(BinderCategory::Common);
        }
        if self.supports_should_process {
            categories.push(BinderCategory::ShouldProcess);
        }
        if self.supports_transactions {
            categories.push(BinderCategory::Transactions);
        }
        if self.supports_paging {
            categories.push(BinderCategory::Paging);
        }
        categories
    }

    fn parameters_for(&self, category: BinderCategory) -> Vec<ParameterDescriptor> {
        match category {
            BinderCategory::DeclaredFormal => self.parameters.clone(),
            BinderCategory::Dynamic => self.dynamic_parameters.clone(),
            other => common::parameters_for(other),
        }
    }

    fn build_table(&self) -> MetadataResult<(MergedParameterTable, u32)> {
        let mut table = MergedParameterTable::new();
        for category in self.categories() {
            table.add_metadata_for_binder(self.parameters_for(category), category)?;
        }
        let default_flag = table.generate_parameter_set_mapping(self.default_parameter_set.as_deref())?;
        Ok((table, default_flag))
    }
}

/// Compiled parameter metadata for one command.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    declaration: CommandDeclaration,
    table: MergedParameterTable,
    default_set_flag: u32,
}

/// Compiled metadata shared between execution contexts.
pub type SharedCommandMetadata = Arc<CommandMetadata>;

impl CommandMetadata {
    pub fn compile(declaration: &CommandDeclaration) -> MetadataResult<Self> {
        let (table, default_set_flag) = declaration.build_table()?;
        debug!(
            command = %declaration.name,
            parameters = table.len(),
            sets = table.registry().len(),
            "compiled command metadata"
        );
        Ok(Self {
            declaration: declaration.clone(),
            table,
            default_set_flag,
        })
    }

    /// Rebuild the table with a new set of dynamic parameters, replacing the
    /// contents of the existing table. On error nothing changes.
    pub fn recompute_dynamic(&mut self, dynamic_parameters: Vec<ParameterDescriptor>) -> MetadataResult<()> {
        let mut declaration = self.declaration.clone();
        declaration.dynamic_parameters = dynamic_parameters;
        let (fresh, default_set_flag) = declaration.build_table()?;

        let frozen = self.table.is_read_only();
        if frozen {
            self.table.reset_read_only();
        }
        self.table.replace_metadata(fresh);
        if frozen {
            self.table.make_read_only();
        }

        self.declaration = declaration;
        self.default_set_flag = default_set_flag;
        debug!(
            command = %self.declaration.name,
            dynamic = self.declaration.dynamic_parameters.len(),
            "recomputed dynamic parameters"
        );
        Ok(())
    }

    /// Freeze the table and wrap the metadata for sharing.
    pub fn freeze(mut self) -> SharedCommandMetadata {
        self.table.make_read_only();
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    pub fn table(&self) -> &MergedParameterTable {
        &self.table
    }

    pub fn default_parameter_set(&self) -> Option<&str> {
        self.declaration.default_parameter_set.as_deref()
    }

    /// The default set's mask, or 0 when the command has no default set.
    pub fn default_set_flag(&self) -> u32 {
        self.default_set_flag
    }

    pub fn parameter_set_names(&self) -> &[String] {
        self.table.registry().names()
    }

    /// The mask of a named set. Unknown names have none.
    pub fn parameter_set_flag(&self, name: &str) -> Option<u32> {
        self.table.registry().flag_of(name)
    }

    /// The parameters that must be bound when `mask` is the active set.
    pub fn mandatory_parameters(&self, mask: u32) -> Vec<&MergedParameter> {
        self.table
            .parameters_in_parameter_set(mask)
            .into_iter()
            .filter(|p| {
                p.parameter.parameter_sets.values().any(|set| {
                    set.mandatory && (set.is_in_all_sets() || mask == ALL_SETS_MASK || set.parameter_set_flag() & mask != 0)
                })
            })
            .collect()
    }

    pub fn resolve(&self, token: &str, exact_match: bool, throw_if_not_found: bool) -> BindingResult<Option<&MergedParameter>> {
        let invocation = InvocationInfo::new(self.name());
        self.table
            .get_matching_parameter(token, throw_if_not_found, exact_match, &invocation)
    }
}

#[allow(dead_code)]
fn assert_shareable() {
    fn is_send_sync<T: Send + Sync>() {}
    is_send_sync::<SharedCommandMetadata>();
    is_send_sync::<MergedParameterTable>();
}
