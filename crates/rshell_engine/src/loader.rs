//! Conversion of command definitions into declarations.

use rshell_options::{CommandDefinition, ParameterDefinition, ParameterSetDefinition};
use rshell_params::{CommandDeclaration, ParameterDescriptor, ParameterSetMetadata};

fn set_metadata(definition: &ParameterSetDefinition) -> ParameterSetMetadata {
    // Bit assignment fields are private to the params crate.
    let mut metadata = ParameterSetMetadata::default();
    metadata.mandatory = definition.mandatory;
    metadata.position = definition.position;
    metadata.value_from_pipeline = definition.value_from_pipeline;
    metadata.value_from_pipeline_by_property_name = definition.value_from_pipeline_by_property_name;
    metadata.value_from_remaining_arguments = definition.value_from_remaining_arguments;
    metadata.help_message = definition.help_message.clone();
    metadata
}

fn descriptor(definition: &ParameterDefinition) -> ParameterDescriptor {
    definition.parameter_sets.iter().fold(
        ParameterDescriptor::new(&definition.name, &definition.type_name).with_aliases(definition.aliases.iter().cloned()),
        |descriptor, (set_name, set)| descriptor.in_set(set_name, set_metadata(set)),
    )
}

/// Build the declaration a definition describes.
pub fn declaration_from_definition(definition: &CommandDefinition, include_common_parameters: bool) -> CommandDeclaration {
    CommandDeclaration {
        name: definition.name.clone(),
        default_parameter_set: definition.default_parameter_set.clone(),
        parameters: definition.parameters.iter().map(descriptor).collect(),
        dynamic_parameters: definition.dynamic_parameters.iter().map(descriptor).collect(),
        include_common_parameters,
        supports_should_process: definition.supports_should_process,
        supports_transactions: definition.supports_transactions,
        supports_paging: definition.supports_paging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rshell_options::parse_command_definitions;

    #[test]
    fn test_definition_to_declaration() {
        let file = parse_command_definitions(
            r#"{ "commands": [ {
                "name": "Set-Content",
                "defaultParameterSet": "Path",
                "supportsShouldProcess": true,
                "parameters": [
                    { "name": "Path", "type": "String[]", "parameterSets": { "Path": { "mandatory": true, "position": 0 } } },
                    { "name": "Value", "aliases": ["v"], "parameterSets": { "__AllParameterSets": { "valueFromPipeline": true } } }
                ]
            } ] }"#,
        )
        .unwrap();

        let declaration = declaration_from_definition(&file.commands[0], false);
        assert_eq!(declaration.name, "Set-Content");
        assert!(!declaration.include_common_parameters);
        assert!(declaration.supports_should_process);

        let path = &declaration.parameters[0];
        assert_eq!(path.type_name, "String[]");
        let meta = path.parameter_sets.get("Path").unwrap();
        assert!(meta.mandatory);
        assert_eq!(meta.position, Some(0));

        let value = &declaration.parameters[1];
        assert_eq!(value.aliases, vec!["v"]);
        assert!(value.parameter_sets.get("__AllParameterSets").unwrap().value_from_pipeline);
    }
}
