//! Parameter metadata integration tests.
//!
//! Covers merging binder categories, parameter-set mapping, name
//! resolution and the compiled-metadata lifecycle.

use rshell_diagnostics::{ErrorCategory, Reportable};
use rshell_params::*;
use std::sync::Arc;
use std::thread;

/// Helper: a table with the given parameters merged as declared formals.
fn declared(parameters: Vec<ParameterDescriptor>) -> MergedParameterTable {
    let mut table = MergedParameterTable::new();
    table
        .add_metadata_for_binder(parameters, BinderCategory::DeclaredFormal)
        .unwrap();
    table
}

fn in_sets(name: &str, sets: &[&str]) -> ParameterDescriptor {
    sets.iter().fold(ParameterDescriptor::new(name, "Object"), |p, set| {
        p.in_set(set, ParameterSetMetadata::default())
    })
}

fn names<'a>(parameters: &[&'a MergedParameter]) -> Vec<&'a str> {
    parameters.iter().map(|p| p.name()).collect()
}

fn info() -> InvocationInfo {
    InvocationInfo::new("Test-Command")
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_duplicate_canonical_name_across_categories() {
    let mut table = declared(vec![ParameterDescriptor::new("Path", "String")]);
    let err = table
        .add_metadata_for_binder(vec![ParameterDescriptor::new("Path", "String")], BinderCategory::Dynamic)
        .unwrap_err();
    assert_eq!(err, MetadataError::ParameterNameAlreadyExists { name: "Path".into() });
    assert_eq!(err.error_id(), "ParameterNameAlreadyExistsForCommand");
    assert_eq!(err.category(), ErrorCategory::MetadataError);
    assert!(err.to_record().message_text.contains("Path"));
}

#[test]
fn test_alias_colliding_with_canonical_name() {
    let mut table = declared(vec![ParameterDescriptor::switch("Force")]);
    let err = table
        .add_metadata_for_binder(
            vec![ParameterDescriptor::switch("Verbose").with_alias("Force")],
            BinderCategory::Common,
        )
        .unwrap_err();
    assert_eq!(
        err,
        MetadataError::AliasConflictsWithParameter {
            alias: "Force".into(),
            parameter: "Verbose".into(),
        }
    );
    assert_eq!(err.target(), Some("Force"));
    assert!(table.get("Verbose").is_none());
}

#[test]
fn test_canonical_name_colliding_with_alias() {
    let mut table = declared(vec![ParameterDescriptor::new("LiteralPath", "String").with_alias("LP")]);
    let err = table
        .add_metadata_for_binder(vec![ParameterDescriptor::new("lp", "String")], BinderCategory::Dynamic)
        .unwrap_err();
    assert_eq!(
        err,
        MetadataError::ParameterNameConflictsWithAlias {
            name: "lp".into(),
            owner: "LiteralPath".into(),
        }
    );
}

#[test]
fn test_alias_declared_twice_across_categories() {
    let mut table = declared(vec![ParameterDescriptor::new("Name", "String").with_alias("n")]);
    let err = table
        .add_metadata_for_binder(
            vec![ParameterDescriptor::new("Number", "Int32").with_alias("N")],
            BinderCategory::Dynamic,
        )
        .unwrap_err();
    assert!(matches!(err, MetadataError::AliasAlreadyExists { ref owner, .. } if owner == "Name"));
}

#[test]
fn test_canonical_and_alias_keys_disjoint_after_merges() {
    let mut declaration = CommandDeclaration::new("Copy-Item")
        .with_parameter(ParameterDescriptor::new("Path", "String").with_alias("PSPath"))
        .with_parameter(ParameterDescriptor::new("Destination", "String").with_alias("Target"));
    declaration.supports_should_process = true;
    declaration.supports_transactions = true;
    declaration.supports_paging = true;
    let metadata = CommandMetadata::compile(&declaration).unwrap();
    let table = metadata.table();

    for (alias, _) in table.aliased_parameters() {
        assert!(table.get(alias).is_none(), "alias {} is also a canonical name", alias);
    }
    for (name, _) in table.bindable_parameters() {
        assert!(table.get_by_alias(name).is_none(), "name {} is also an alias", name);
    }
}

// ============================================================================
// Parameter-set mapping
// ============================================================================

#[test]
fn test_set_membership_queries() {
    let mut table = declared(vec![in_sets("X", &["A", "B"]), in_sets("Y", &["A"])]);
    let a = table.generate_parameter_set_mapping(Some("A")).unwrap();
    let b = table.registry().flag_of("B").unwrap();

    assert_eq!(a, 0b01);
    assert_eq!(names(&table.parameters_in_parameter_set(a)), vec!["X", "Y"]);
    assert_eq!(names(&table.parameters_in_parameter_set(b)), vec!["X"]);
}

#[test]
fn test_all_sets_parameters_contribute_no_bits() {
    let mut table = declared(vec![
        in_sets("X", &["A"]),
        ParameterDescriptor::switch("Force"),
        in_sets("Mixed", &[ALL_PARAMETER_SETS]),
    ]);
    table.generate_parameter_set_mapping(None).unwrap();

    let force = table.get("Force").unwrap();
    assert!(force.parameter.is_in_all_sets());
    assert_eq!(force.parameter.parameter_set_flags(), 0);
    let entry = force.parameter.parameter_sets.get(ALL_PARAMETER_SETS).unwrap();
    assert!(entry.is_in_all_sets());
    assert_eq!(entry.parameter_set_flag(), 0);
    assert_eq!(table.registry().len(), 1);

    for mask in [0, 0b1, 0b10, 1 << 31, ALL_SETS_MASK] {
        let found = names(&table.parameters_in_parameter_set(mask));
        assert!(found.contains(&"Force"), "mask {:#x}", mask);
        assert!(found.contains(&"Mixed"), "mask {:#x}", mask);
    }
}

#[test]
fn test_set_name_round_trip() {
    let sets = ["ByName", "ByPath", "ByLiteralPath", "ById", "ByInputObject"];
    let mut table = declared(vec![in_sets("P", &sets)]);
    table.generate_parameter_set_mapping(Some("ById")).unwrap();

    for set in sets {
        let flag = table.registry().flag_of(set).unwrap();
        assert_eq!(flag.count_ones(), 1);
        assert_eq!(table.parameter_set_name(flag), set);
    }
    assert_eq!(table.parameter_set_name(0), "ById");
    assert_eq!(table.parameter_set_name(ALL_SETS_MASK), "ById");
    assert_eq!(table.parameter_set_name(0b11), "");
    assert_eq!(table.parameter_set_name(1 << 20), "");
}

#[test]
fn test_no_default_set_names_all_sets_marker() {
    let mut table = declared(vec![in_sets("P", &["Only"])]);
    assert_eq!(table.generate_parameter_set_mapping(None).unwrap(), 0);
    assert_eq!(table.parameter_set_name(0), ALL_PARAMETER_SETS);
}

#[test]
fn test_registry_idempotent_and_monotonic() {
    let mut registry = ParameterSetRegistry::new();
    let mut last_count = 0;
    for name in ["A", "b", "a", "B", "C", "c", "A"] {
        let index = registry.add_parameter_set(name).unwrap();
        assert_eq!(registry.add_parameter_set(name).unwrap(), index);
        assert!(registry.len() >= last_count);
        last_count = registry.len();
    }
    assert_eq!(registry.names(), ["A", "b", "C"]);
}

#[test]
fn test_thirty_two_sets_fit_thirty_three_do_not() {
    let sets: Vec<String> = (0..MAX_PARAMETER_SETS).map(|i| format!("Set{:02}", i)).collect();
    let set_refs: Vec<&str> = sets.iter().map(String::as_str).collect();
    let mut table = declared(vec![in_sets("P", &set_refs)]);
    table.generate_parameter_set_mapping(None).unwrap();
    assert_eq!(table.registry().len(), 32);
    assert_eq!(table.get("P").unwrap().parameter.parameter_set_flags(), ALL_SETS_MASK);
    assert_eq!(table.parameter_set_name(1 << 31), "Set31");

    let mut table = declared(vec![in_sets("P", &set_refs), in_sets("Q", &["Set32"])]);
    let err = table.generate_parameter_set_mapping(None).unwrap_err();
    assert_eq!(
        err,
        MetadataError::TooManyParameterSets {
            name: "Set32".into(),
            limit: 32,
        }
    );
    // The failed mapping left no partial bits behind.
    assert_eq!(table.get("P").unwrap().parameter.parameter_set_flags(), 0);
    assert!(table.registry().is_empty());
}

// ============================================================================
// Name resolution
// ============================================================================

#[test]
fn test_ambiguous_prefix_lists_candidates() {
    let table = declared(vec![
        ParameterDescriptor::switch("Force"),
        ParameterDescriptor::new("Format", "String"),
    ]);
    let err = table.get_matching_parameter("-Fo", true, false, &info()).unwrap_err();
    match &err {
        BindingError::AmbiguousParameter { name, candidates, command } => {
            assert_eq!(name, "Fo");
            assert_eq!(candidates, &vec!["-Force".to_string(), "-Format".to_string()]);
            assert_eq!(command, "Test-Command");
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    assert!(err.to_string().contains("-Force -Format"));
    let record = err.to_record();
    assert_eq!(record.command.as_deref(), Some("Test-Command"));
    assert!(record.message_text.contains("-Force"));
}

#[test]
fn test_exact_match_short_circuits_category_preference() {
    let mut table = declared(vec![ParameterDescriptor::switch("ForceOption")]);
    table
        .add_metadata_for_binder(vec![ParameterDescriptor::switch("Force")], BinderCategory::Common)
        .unwrap();

    let found = table.get_matching_parameter("-Force", true, true, &info()).unwrap().unwrap();
    assert_eq!(found.name(), "Force");
    assert_eq!(found.category, BinderCategory::Common);

    // Without exact matching the same token is ambiguous.
    let err = table.get_matching_parameter("-Force", true, false, &info()).unwrap_err();
    assert!(matches!(err, BindingError::AmbiguousParameter { .. }));
}

#[test]
fn test_command_parameter_preferred_over_common_on_exact_request() {
    let mut table = declared(vec![ParameterDescriptor::new("OutFile", "String")]);
    table
        .add_metadata_for_binder(common::common_parameters(), BinderCategory::Common)
        .unwrap();

    // "Out" prefixes OutFile, OutVariable and OutBuffer.
    let found = table.get_matching_parameter("-Out", true, true, &info()).unwrap().unwrap();
    assert_eq!(found.name(), "OutFile");

    let err = table.get_matching_parameter("-Out", true, false, &info()).unwrap_err();
    match err {
        BindingError::AmbiguousParameter { candidates, .. } => {
            assert_eq!(candidates, vec!["-OutFile", "-OutVariable", "-OutBuffer"]);
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_two_command_parameters_stay_ambiguous() {
    let mut table = declared(vec![
        ParameterDescriptor::new("InputObject", "Object"),
        ParameterDescriptor::new("Include", "String[]"),
    ]);
    table
        .add_metadata_for_binder(common::common_parameters(), BinderCategory::Common)
        .unwrap();
    let err = table.get_matching_parameter("-In", true, true, &info()).unwrap_err();
    match err {
        BindingError::AmbiguousParameter { candidates, .. } => {
            assert_eq!(candidates, vec!["-InputObject", "-Include", "-InformationAction", "-InformationVariable"]);
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_alias_exact_match() {
    let mut table = declared(vec![ParameterDescriptor::new("Value", "Object")]);
    table
        .add_metadata_for_binder(common::common_parameters(), BinderCategory::Common)
        .unwrap();
    // "ev" is exactly the ErrorVariable alias.
    let found = table.get_matching_parameter("-EV", true, true, &info()).unwrap().unwrap();
    assert_eq!(found.name(), "ErrorVariable");
}

#[test]
fn test_only_leading_dash_is_stripped() {
    let table = declared(vec![ParameterDescriptor::new("Path", "String")]);
    assert!(table.get_matching_parameter("--Path", false, false, &info()).unwrap().is_none());
    assert!(table.get_matching_parameter("Path", false, true, &info()).unwrap().is_some());
}

#[test]
fn test_exact_names_are_never_duplicated() {
    // Collision checks make two parameters with the same exact name
    // impossible, so an exact request can never see two exact hits.
    let mut table = declared(vec![ParameterDescriptor::new("Name", "String")]);
    assert!(table
        .add_metadata_for_binder(vec![ParameterDescriptor::new("NAME", "String")], BinderCategory::Dynamic)
        .is_err());
    let exact: Vec<_> = table
        .bindable_parameters()
        .chain(table.aliased_parameters())
        .filter(|(key, _)| key.eq_ignore_ascii_case("name"))
        .collect();
    assert_eq!(exact.len(), 1);
}

// ============================================================================
// Compiled metadata lifecycle
// ============================================================================

#[test]
fn test_frozen_metadata_shared_across_threads() {
    let declaration = CommandDeclaration::new("Get-Content")
        .with_parameter(ParameterDescriptor::new("Path", "String[]").in_set("Path", ParameterSetMetadata::mandatory()))
        .with_parameter(ParameterDescriptor::new("Tail", "Int32").with_alias("Last"));
    let shared: SharedCommandMetadata = CommandMetadata::compile(&declaration).unwrap().freeze();
    assert!(shared.table().is_read_only());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let metadata = Arc::clone(&shared);
            thread::spawn(move || {
                metadata
                    .resolve("-last", true, true)
                    .ok()
                    .flatten()
                    .map(|p| p.name().to_string())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("Tail"));
    }
}

#[test]
fn test_replace_metadata_swaps_contents() {
    let mut table = declared(vec![ParameterDescriptor::new("Old", "String")]);
    let replacement = declared(vec![
        ParameterDescriptor::new("New", "String").with_alias("N"),
        ParameterDescriptor::new("Other", "String"),
    ]);
    table.replace_metadata(replacement.clone());
    assert!(table.get("Old").is_none());
    assert_eq!(table.get_by_alias("n").unwrap().name(), "New");
    assert!(table.shares_contents_with(&replacement));
}
