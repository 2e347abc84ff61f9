//! Registry of compiled commands.
//!
//! Compiled metadata is frozen before registration, so one registry can be
//! shared by several execution contexts on different threads.

use crate::error::{EngineError, EngineResult};
use crate::loader::declaration_from_definition;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use rshell_core::fold_name;
use rshell_options::CommandDefinition;
use rshell_params::{CommandMetadata, SharedCommandMetadata};
use rustc_hash::FxBuildHasher;
use tracing::debug;

/// Case-insensitive command name to compiled metadata.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: DashMap<String, SharedCommandMetadata, FxBuildHasher>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Register compiled metadata under its command name.
    pub fn register(&self, metadata: SharedCommandMetadata) -> EngineResult<()> {
        match self.commands.entry(fold_name(metadata.name()).into_owned()) {
            Entry::Occupied(_) => Err(EngineError::DuplicateCommand {
                name: metadata.name().to_string(),
            }),
            Entry::Vacant(slot) => {
                debug!(command = metadata.name(), parameters = metadata.table().len(), "Registered command");
                slot.insert(metadata);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedCommandMetadata> {
        self.commands.get(fold_name(name).as_ref()).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(fold_name(name).as_ref())
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.iter().map(|entry| entry.value().name().to_string()).collect();
        names.sort_by_key(|name| fold_name(name).into_owned());
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Compile and register a batch of definitions.
    ///
    /// Definitions compile in parallel. Nothing stays registered unless every
    /// definition compiles and no name is taken, either within the batch or
    /// by another command. A name claimed concurrently by another thread
    /// rolls back the entries this batch already inserted.
    pub fn register_all(&self, definitions: &[CommandDefinition], include_common_parameters: bool) -> EngineResult<Vec<SharedCommandMetadata>> {
        let compiled: Vec<SharedCommandMetadata> = definitions
            .par_iter()
            .map(|definition| {
                let declaration = declaration_from_definition(definition, include_common_parameters);
                CommandMetadata::compile(&declaration)
                    .map(CommandMetadata::freeze)
                    .map_err(|source| EngineError::Metadata {
                        command: definition.name.clone(),
                        source,
                    })
            })
            .collect::<EngineResult<_>>()?;

        let mut seen = rustc_hash::FxHashSet::default();
        for metadata in &compiled {
            if !seen.insert(fold_name(metadata.name()).into_owned()) {
                return Err(EngineError::DuplicateCommand {
                    name: metadata.name().to_string(),
                });
            }
        }

        for (index, metadata) in compiled.iter().enumerate() {
            if let Err(error) = self.register(SharedCommandMetadata::clone(metadata)) {
                self.unregister_batch(&compiled[..index]);
                return Err(error);
            }
        }
        Ok(compiled)
    }

    /// Remove entries inserted by a failed batch. Entries are only removed
    /// while they still hold this batch's metadata.
    fn unregister_batch(&self, inserted: &[SharedCommandMetadata]) {
        for metadata in inserted {
            let key = fold_name(metadata.name()).into_owned();
            self.commands
                .remove_if(&key, |_, registered| SharedCommandMetadata::ptr_eq(registered, metadata));
        }
        debug!(count = inserted.len(), "Rolled back partially registered batch");
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
