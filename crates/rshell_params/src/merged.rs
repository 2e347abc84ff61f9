//! The merged parameter table.
//!
//! A command's bindable parameters come from several independently compiled
//! binder categories (the command's own parameters, dynamic parameters, and
//! the shared common groups). The table merges them into one namespace of
//! canonical names and aliases, rejecting any collision between the two.

use crate::descriptor::{BinderCategory, ParameterDescriptor, ALL_PARAMETER_SETS};
use crate::error::{MetadataError, MetadataResult};
use crate::parameter_sets::{flag_for_index, ParameterSetRegistry};
use rshell_core::{names_equal, CaseInsensitiveMap};
use std::sync::Arc;
use tracing::debug;

/// Index of a parameter in its table. Stable for the lifetime of the table
/// contents; `replace_metadata` invalidates previously handed out ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(pub u32);

impl ParameterId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A descriptor together with the binder category that declared it.
#[derive(Debug, Clone)]
pub struct MergedParameter {
    pub parameter: ParameterDescriptor,
    pub category: BinderCategory,
}

impl MergedParameter {
    pub fn name(&self) -> &str {
        &self.parameter.name
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TableData {
    pub(crate) parameters: Vec<MergedParameter>,
    pub(crate) bindable: CaseInsensitiveMap<ParameterId>,
    pub(crate) aliased: CaseInsensitiveMap<ParameterId>,
    pub(crate) registry: ParameterSetRegistry,
}

impl TableData {
    fn owner_name(&self, id: ParameterId) -> String {
        self.parameters
            .get(id.index())
            .map(|p| p.parameter.name.clone())
            .unwrap_or_default()
    }
}

/// All bindable parameters of one command.
///
/// Contents live behind an `Arc`. A read-only table can be cloned cheaply
/// and shared across threads; a writable table copies its contents on the
/// first mutation if they are still shared.
#[derive(Debug, Clone, Default)]
pub struct MergedParameterTable {
    pub(crate) data: Arc<TableData>,
    read_only: bool,
}

impl MergedParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the parameters of one binder category into the table.
    ///
    /// Every name and alias is checked against the table and against the
    /// rest of the batch before anything is inserted, so on error the table
    /// is left exactly as it was. Callers still treat any error as fatal for
    /// the command being compiled.
    pub fn add_metadata_for_binder<I>(&mut self, parameters: I, category: BinderCategory) -> MetadataResult<Vec<ParameterId>>
    where
        I: IntoIterator<Item = ParameterDescriptor>,
    {
        debug_assert!(!self.read_only, "add_metadata_for_binder on a read-only table");
        let parameters: Vec<ParameterDescriptor> = parameters.into_iter().collect();

        // name -> owning parameter name, for the batch being added
        let mut staged_names: CaseInsensitiveMap<String> = CaseInsensitiveMap::new();
        let mut staged_aliases: CaseInsensitiveMap<String> = CaseInsensitiveMap::new();

        for parameter in &parameters {
            let name = parameter.name.as_str();
            if name.is_empty() {
                return Err(MetadataError::EmptyParameterName);
            }
            if self.data.bindable.contains_key(name) || staged_names.contains_key(name) {
                return Err(MetadataError::ParameterNameAlreadyExists { name: name.to_string() });
            }
            if let Some(owner) = self.alias_owner(name, &staged_aliases) {
                return Err(MetadataError::ParameterNameConflictsWithAlias {
                    name: name.to_string(),
                    owner,
                });
            }
            staged_names.insert(name, name.to_string());

            for alias in &parameter.aliases {
                if let Some(owner) = self.alias_owner(alias, &staged_aliases) {
                    return Err(MetadataError::AliasAlreadyExists {
                        alias: alias.clone(),
                        parameter: name.to_string(),
                        owner,
                    });
                }
                if self.data.bindable.contains_key(alias) || staged_names.contains_key(alias) {
                    return Err(MetadataError::AliasConflictsWithParameter {
                        alias: alias.clone(),
                        parameter: name.to_string(),
                    });
                }
                staged_aliases.insert(alias, name.to_string());
            }
        }

        let data = Arc::make_mut(&mut self.data);
        let mut added = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let id = ParameterId(data.parameters.len() as u32);
            data.bindable.insert(&parameter.name, id);
            for alias in &parameter.aliases {
                data.aliased.insert(alias, id);
            }
            data.parameters.push(MergedParameter { parameter, category });
            added.push(id);
        }

        debug!(category = %category, added = added.len(), total = data.parameters.len(), "merged binder metadata");
        Ok(added)
    }

    fn alias_owner(&self, alias: &str, staged: &CaseInsensitiveMap<String>) -> Option<String> {
        if let Some(&id) = self.data.aliased.get(alias) {
            return Some(self.data.owner_name(id));
        }
        staged.get(alias).cloned()
    }

    /// Assign a bit to every parameter-set name the merged parameters
    /// declare and compute each parameter's membership mask.
    ///
    /// The default set, when given, is registered first so it gets the
    /// lowest bit. Returns the default set's mask, or 0 without one. The
    /// previous mapping is discarded. On error the table is unchanged.
    pub fn generate_parameter_set_mapping(&mut self, default_set: Option<&str>) -> MetadataResult<u32> {
        debug_assert!(!self.read_only, "generate_parameter_set_mapping on a read-only table");
        let default_set = default_set.filter(|name| !name.is_empty() && !names_equal(name, ALL_PARAMETER_SETS));

        let mut registry = ParameterSetRegistry::new();
        registry.reset(default_set);
        let default_flag = match default_set {
            Some(name) => flag_for_index(registry.add_parameter_set(name)?),
            None => 0,
        };

        struct Computed {
            flags: u32,
            in_all_sets: bool,
            per_set: Vec<(u32, bool)>,
        }

        let mut computed = Vec::with_capacity(self.data.parameters.len());
        for merged in &self.data.parameters {
            let sets = &merged.parameter.parameter_sets;
            let mut entry = Computed {
                flags: 0,
                in_all_sets: sets.is_empty(),
                per_set: Vec::with_capacity(sets.len()),
            };
            for (set_name, _) in sets.iter() {
                if names_equal(set_name, ALL_PARAMETER_SETS) {
                    entry.in_all_sets = true;
                    entry.per_set.push((0, true));
                } else {
                    let flag = flag_for_index(registry.add_parameter_set(set_name)?);
                    entry.flags |= flag;
                    entry.per_set.push((flag, false));
                }
            }
            computed.push(entry);
        }

        let data = Arc::make_mut(&mut self.data);
        for (merged, entry) in data.parameters.iter_mut().zip(computed) {
            merged.parameter.parameter_set_flags = entry.flags;
            merged.parameter.is_in_all_sets = entry.in_all_sets;
            for ((_, metadata), (flag, in_all)) in merged.parameter.parameter_sets.iter_mut().zip(entry.per_set) {
                metadata.parameter_set_flag = flag;
                metadata.is_in_all_sets = in_all;
            }
        }
        data.registry = registry;

        debug!(
            sets = data.registry.len(),
            default_set = ?default_set,
            default_flag,
            "generated parameter set mapping"
        );
        Ok(default_flag)
    }

    pub fn parameter_set_name(&self, mask: u32) -> String {
        self.data.registry.parameter_set_name(mask)
    }

    /// Every parameter whose mask intersects `mask`, plus every parameter in
    /// all sets, in merge order.
    pub fn parameters_in_parameter_set(&self, mask: u32) -> Vec<&MergedParameter> {
        self.data
            .parameters
            .iter()
            .filter(|p| p.parameter.is_in_all_sets || p.parameter.parameter_set_flags & mask != 0)
            .collect()
    }

    /// Substitute the whole contents of the table with those of `other`.
    ///
    /// Only valid on writable tables. Ids handed out before the call refer
    /// to the old contents.
    pub fn replace_metadata(&mut self, other: MergedParameterTable) {
        debug_assert!(!self.read_only, "replace_metadata on a read-only table");
        debug_assert!(!other.read_only, "replace_metadata from a read-only table");
        self.data = other.data;
        debug!(parameters = self.data.parameters.len(), "replaced parameter metadata");
    }

    /// Freeze the table. Clones of a frozen table share its contents.
    pub fn make_read_only(&mut self) {
        self.read_only = true;
    }

    /// Thaw the table. The contents are copied on the next mutation if
    /// another clone still shares them.
    pub fn reset_read_only(&mut self) {
        self.read_only = false;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Look up a parameter by canonical name.
    pub fn get(&self, name: &str) -> Option<&MergedParameter> {
        self.data.bindable.get(name).and_then(|&id| self.parameter(id))
    }

    /// Look up a parameter by one of its aliases.
    pub fn get_by_alias(&self, alias: &str) -> Option<&MergedParameter> {
        self.data.aliased.get(alias).and_then(|&id| self.parameter(id))
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&MergedParameter> {
        self.data.parameters.get(id.index())
    }

    /// Canonical names in merge order.
    pub fn bindable_parameters(&self) -> impl Iterator<Item = (&str, &MergedParameter)> {
        self.data
            .bindable
            .iter()
            .filter_map(move |(name, &id)| self.parameter(id).map(|p| (name, p)))
    }

    /// Aliases in merge order, with the parameter each one names.
    pub fn aliased_parameters(&self) -> impl Iterator<Item = (&str, &MergedParameter)> {
        self.data
            .aliased
            .iter()
            .filter_map(move |(alias, &id)| self.parameter(id).map(|p| (alias, p)))
    }

    pub fn parameters(&self) -> &[MergedParameter] {
        &self.data.parameters
    }

    pub fn registry(&self) -> &ParameterSetRegistry {
        &self.data.registry
    }

    pub fn len(&self) -> usize {
        self.data.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.parameters.is_empty()
    }

    /// Whether two tables share the same contents.
    pub fn shares_contents_with(&self, other: &MergedParameterTable) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParameterSetMetadata;

    fn param(name: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(name, "String")
    }

    #[test]
    fn test_failed_merge_leaves_table_unchanged() {
        let mut table = MergedParameterTable::new();
        table
            .add_metadata_for_binder(vec![param("Path")], BinderCategory::DeclaredFormal)
            .unwrap();

        let err = table
            .add_metadata_for_binder(
                vec![param("Filter").with_alias("f"), param("path")],
                BinderCategory::Dynamic,
            )
            .unwrap_err();
        assert_eq!(err, MetadataError::ParameterNameAlreadyExists { name: "path".into() });
        assert_eq!(table.len(), 1);
        assert!(table.get("Filter").is_none());
        assert!(table.get_by_alias("f").is_none());
    }

    #[test]
    fn test_collisions_within_one_batch() {
        let mut table = MergedParameterTable::new();
        let err = table
            .add_metadata_for_binder(
                vec![param("Name").with_alias("n"), param("Number").with_alias("N")],
                BinderCategory::DeclaredFormal,
            )
            .unwrap_err();
        assert_eq!(
            err,
            MetadataError::AliasAlreadyExists {
                alias: "N".into(),
                parameter: "Number".into(),
                owner: "Name".into(),
            }
        );

        let err = table
            .add_metadata_for_binder(vec![param("Name").with_alias("Name")], BinderCategory::DeclaredFormal)
            .unwrap_err();
        assert!(matches!(err, MetadataError::AliasConflictsWithParameter { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut table = MergedParameterTable::new();
        let err = table
            .add_metadata_for_binder(vec![param("")], BinderCategory::DeclaredFormal)
            .unwrap_err();
        assert_eq!(err, MetadataError::EmptyParameterName);
    }

    #[test]
    fn test_descriptor_without_sets_is_in_all_sets() {
        let mut table = MergedParameterTable::new();
        table
            .add_metadata_for_binder(
                vec![param("Loose"), param("Bound").in_set("Only", ParameterSetMetadata::default())],
                BinderCategory::DeclaredFormal,
            )
            .unwrap();
        table.generate_parameter_set_mapping(None).unwrap();

        let loose = table.get("Loose").unwrap();
        assert!(loose.parameter.is_in_all_sets());
        assert_eq!(loose.parameter.parameter_set_flags(), 0);
        let names: Vec<&str> = table.parameters_in_parameter_set(0b1).iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Loose", "Bound"]);
    }

    #[test]
    fn test_remapping_discards_previous_bits() {
        let mut table = MergedParameterTable::new();
        table
            .add_metadata_for_binder(
                vec![param("A").in_set("First", ParameterSetMetadata::default()).in_set("Second", ParameterSetMetadata::default())],
                BinderCategory::DeclaredFormal,
            )
            .unwrap();
        assert_eq!(table.generate_parameter_set_mapping(None).unwrap(), 0);
        assert_eq!(table.parameter_set_name(0b01), "First");

        assert_eq!(table.generate_parameter_set_mapping(Some("Second")).unwrap(), 0b01);
        assert_eq!(table.parameter_set_name(0b01), "Second");
        assert_eq!(table.parameter_set_name(0b10), "First");
        assert_eq!(table.registry().len(), 2);
    }

    #[test]
    fn test_thawed_clone_copies_on_write() {
        let mut table = MergedParameterTable::new();
        table
            .add_metadata_for_binder(vec![param("Path")], BinderCategory::DeclaredFormal)
            .unwrap();
        table.make_read_only();
        let shared = table.clone();
        assert!(shared.shares_contents_with(&table));

        table.reset_read_only();
        table
            .add_metadata_for_binder(vec![param("Filter")], BinderCategory::Dynamic)
            .unwrap();
        assert!(!shared.shares_contents_with(&table));
        assert_eq!(shared.len(), 1);
        assert_eq!(table.len(), 2);
    }
}
