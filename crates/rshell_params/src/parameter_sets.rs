//! Parameter-set name to bit assignment.
//!
//! Each distinct parameter-set name a command declares gets one bit of a
//! `u32` mask, so set membership can be tested with a bitwise AND.

use crate::descriptor::ALL_PARAMETER_SETS;
use crate::error::{MetadataError, MetadataResult};
use rshell_core::names_equal;

/// The maximum number of distinct parameter sets one command may declare:
/// the width of the membership mask.
pub const MAX_PARAMETER_SETS: usize = u32::BITS as usize;

/// Mask value meaning "every parameter set".
pub const ALL_SETS_MASK: u32 = u32::MAX;

/// The ordered list of parameter-set names for one command. A name's index
/// is its bit position.
#[derive(Debug, Clone, Default)]
pub struct ParameterSetRegistry {
    names: Vec<String>,
    default_set: Option<String>,
}

impl ParameterSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set name, returning its index. Re-registering a name
    /// returns the existing index.
    pub fn add_parameter_set(&mut self, name: &str) -> MetadataResult<usize> {
        if let Some(index) = self.index_of(name) {
            return Ok(index);
        }
        if self.names.len() >= MAX_PARAMETER_SETS {
            return Err(MetadataError::TooManyParameterSets {
                name: name.to_string(),
                limit: MAX_PARAMETER_SETS,
            });
        }
        self.names.push(name.to_string());
        Ok(self.names.len() - 1)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| names_equal(n, name))
    }

    /// The single-bit mask for a registered set.
    pub fn flag_of(&self, name: &str) -> Option<u32> {
        self.index_of(name).map(flag_for_index)
    }

    /// The name of the set a mask denotes.
    ///
    /// The all-sets sentinel and zero mean the default set (or the all-sets
    /// marker when there is none). A mask with more than one bit, or a bit
    /// beyond the registered sets, yields an empty name.
    pub fn parameter_set_name(&self, mask: u32) -> String {
        if mask == ALL_SETS_MASK || mask == 0 {
            return self
                .default_set
                .clone()
                .unwrap_or_else(|| ALL_PARAMETER_SETS.to_string());
        }
        let index = mask.trailing_zeros() as usize;
        if mask != flag_for_index(index) {
            return String::new();
        }
        self.names.get(index).cloned().unwrap_or_default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn default_set(&self) -> Option<&str> {
        self.default_set.as_deref()
    }

    /// Forget every registered name and record a new default set. The
    /// default set is not registered here; callers register it first so it
    /// takes the lowest bit.
    pub fn reset(&mut self, default_set: Option<&str>) {
        self.names.clear();
        self.default_set = default_set.map(str::to_string);
    }
}

/// The single-bit mask for a set index.
#[inline]
pub fn flag_for_index(index: usize) -> u32 {
    1u32 << index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = ParameterSetRegistry::new();
        let a = registry.add_parameter_set("ByName").unwrap();
        let b = registry.add_parameter_set("ByPath").unwrap();
        assert_eq!(registry.add_parameter_set("ByName").unwrap(), a);
        assert_eq!(registry.add_parameter_set("BYNAME").unwrap(), a);
        assert_eq!((a, b), (0, 1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_thirty_second_set_succeeds_thirty_third_fails() {
        let mut registry = ParameterSetRegistry::new();
        for i in 0..31 {
            registry.add_parameter_set(&format!("Set{}", i)).unwrap();
        }
        assert_eq!(registry.add_parameter_set("Set31").unwrap(), 31);
        assert_eq!(registry.flag_of("Set31"), Some(1 << 31));

        let err = registry.add_parameter_set("Set32").unwrap_err();
        assert_eq!(err, MetadataError::TooManyParameterSets { name: "Set32".into(), limit: 32 });
        // Re-adding a known name still works at the ceiling.
        assert_eq!(registry.add_parameter_set("Set0").unwrap(), 0);
        assert_eq!(registry.len(), MAX_PARAMETER_SETS);
    }

    #[test]
    fn test_parameter_set_name() {
        let mut registry = ParameterSetRegistry::new();
        assert_eq!(registry.parameter_set_name(0), ALL_PARAMETER_SETS);
        assert_eq!(registry.parameter_set_name(ALL_SETS_MASK), ALL_PARAMETER_SETS);

        registry.reset(Some("ByPath"));
        registry.add_parameter_set("ByPath").unwrap();
        registry.add_parameter_set("ByName").unwrap();
        assert_eq!(registry.parameter_set_name(0), "ByPath");
        assert_eq!(registry.parameter_set_name(0b01), "ByPath");
        assert_eq!(registry.parameter_set_name(0b10), "ByName");
        assert_eq!(registry.parameter_set_name(0b11), "");
        assert_eq!(registry.parameter_set_name(0b100), "");
    }
}
