//! Parameters every command shares.
//!
//! These make up the cross-cutting binder categories. All of them belong to
//! every parameter set, so they never contribute set bits.

use crate::descriptor::{BinderCategory, ParameterDescriptor, ParameterSetMetadata};

fn in_all_sets(name: &str, type_name: &str, alias: Option<&str>) -> ParameterDescriptor {
    let descriptor = ParameterDescriptor::new(name, type_name).in_all_sets(ParameterSetMetadata::default());
    match alias {
        Some(alias) => descriptor.with_alias(alias),
        None => descriptor,
    }
}

/// Verbose, Debug, the preference actions and the capture variables.
pub fn common_parameters() -> Vec<ParameterDescriptor> {
    vec![
        in_all_sets("Verbose", "SwitchParameter", Some("vb")),
        in_all_sets("Debug", "SwitchParameter", Some("db")),
        in_all_sets("ErrorAction", "ActionPreference", Some("ea")),
        in_all_sets("WarningAction", "ActionPreference", Some("wa")),
        in_all_sets("InformationAction", "ActionPreference", Some("infa")),
        in_all_sets("ProgressAction", "ActionPreference", Some("proga")),
        in_all_sets("ErrorVariable", "String", Some("ev")),
        in_all_sets("WarningVariable", "String", Some("wv")),
        in_all_sets("InformationVariable", "String", Some("iv")),
        in_all_sets("OutVariable", "String", Some("ov")),
        in_all_sets("OutBuffer", "Int32", Some("ob")),
        in_all_sets("PipelineVariable", "String", Some("pv")),
    ]
}

pub fn should_process_parameters() -> Vec<ParameterDescriptor> {
    vec![
        in_all_sets("WhatIf", "SwitchParameter", Some("wi")),
        in_all_sets("Confirm", "SwitchParameter", Some("cf")),
    ]
}

pub fn transaction_parameters() -> Vec<ParameterDescriptor> {
    vec![in_all_sets("UseTransaction", "SwitchParameter", Some("usetx"))]
}

pub fn paging_parameters() -> Vec<ParameterDescriptor> {
    vec![
        in_all_sets("IncludeTotalCount", "SwitchParameter", None),
        in_all_sets("Skip", "UInt64", None),
        in_all_sets("First", "UInt64", None),
    ]
}

/// The built-in parameters of a cross-cutting category. Command-specific
/// categories have none.
pub fn parameters_for(category: BinderCategory) -> Vec<ParameterDescriptor> {
    match category {
        BinderCategory::Common => common_parameters(),
        BinderCategory::ShouldProcess => should_process_parameters(),
        BinderCategory::Transactions => transaction_parameters(),
        BinderCategory::Paging => paging_parameters(),
        BinderCategory::DeclaredFormal | BinderCategory::Dynamic => Vec::new(),
    }
}
