use super::*;
use crate::subgraphs::{DefinitionKind, DefinitionWalker, FieldWalker, SubgraphWalker, TypeReferences};
use indexmap::IndexSet;

pub(super) struct SupergraphStateBuilder<'a> {
    subgraphs: &'a Subgraphs,
    state: SupergraphState,
}

impl<'a> SupergraphStateBuilder<'a> {
    pub(super) fn new(subgraphs: &'a Subgraphs) -> Self {
        SupergraphStateBuilder {
            subgraphs,
            state: SupergraphState::default(),
        }
    }

    pub(super) fn add_subgraph(&mut self, subgraph: SubgraphWalker<'a>) -> Result<(), MergeError> {
        let _span = tracing::debug_span!("merge_subgraph", subgraph = subgraph.name()).entered();

        for definition in subgraph.definitions() {
            self.add_definition(definition)?;
        }

        Ok(())
    }

    fn add_definition(&mut self, definition: DefinitionWalker<'a>) -> Result<(), MergeError> {
        let subgraphs = self.subgraphs;
        let subgraph_id = definition.subgraph_id();

        match self.entry(definition)? {
            MergedDefinition::Object(object) => {
                object
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                object.interfaces.extend(definition.interfaces().map(|i| i.name_id()));
                object.by_graph.insert(subgraph_id, TypeInGraph::new(definition));

                for field in definition.fields() {
                    merge_output_field(subgraphs, &mut object.fields, field);
                }
            }
            MergedDefinition::Interface(interface) => {
                interface
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                interface.interfaces.extend(definition.interfaces().map(|i| i.name_id()));
                interface.by_graph.insert(subgraph_id, TypeInGraph::new(definition));

                for field in definition.fields() {
                    merge_output_field(subgraphs, &mut interface.fields, field);
                }
            }
            MergedDefinition::Union(union) => {
                union
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                union.by_graph.insert(subgraph_id, definition.id);

                for member in definition.union_members() {
                    union.members.entry(member.name_id()).or_default().insert(subgraph_id);
                }
            }
            MergedDefinition::Enum(r#enum) => {
                r#enum
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                r#enum.by_graph.insert(subgraph_id, definition.id);
                r#enum.referenced_by_input |= definition.references().contains(TypeReferences::INPUT);
                r#enum.referenced_by_output |= definition.references().contains(TypeReferences::OUTPUT);

                for value in definition.enum_values() {
                    let state = r#enum.values.entry(value.name).or_insert_with(|| EnumValueState {
                        name: value.name,
                        metadata: Metadata::default(),
                        by_graph: IndexSet::new(),
                    });

                    state
                        .metadata
                        .merge_site(subgraphs, &subgraphs[value.directives], value.description);
                    state.by_graph.insert(subgraph_id);
                }
            }
            MergedDefinition::Scalar(scalar) => {
                scalar
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                scalar.by_graph.insert(subgraph_id, definition.id);
            }
            MergedDefinition::InputObject(input_object) => {
                input_object
                    .metadata
                    .merge_site(subgraphs, definition.directives(), definition.description());
                input_object.by_graph.insert(subgraph_id, definition.id);

                for field in definition.fields() {
                    let record = field.record();
                    merge_input_value(
                        subgraphs,
                        &mut input_object.fields,
                        InputValueInGraph {
                            subgraph_id,
                            name: record.name,
                            r#type: record.r#type,
                            description: record.description,
                            directives: field.directives(),
                            default_value: record.default_value.as_ref(),
                        },
                    );
                }
            }
        }

        Ok(())
    }

    /// The merged definition with the same name, created if this is the first subgraph defining it.
    fn entry(&mut self, definition: DefinitionWalker<'a>) -> Result<&mut MergedDefinition, MergeError> {
        let name = definition.name_id();
        let subgraphs = self.subgraphs;

        let merged = self
            .state
            .definitions
            .entry(name)
            .or_insert_with(|| empty_definition(name, definition.kind()));

        if merged.kind() != definition.kind() {
            let first_subgraph = merged
                .subgraph_ids()
                .first()
                .map(|id| subgraphs.walk(*id).name().to_owned())
                .unwrap_or_default();

            return Err(MergeError::KindMismatch {
                type_name: definition.name().to_owned(),
                first_kind: merged.kind().describe(),
                first_subgraph,
                second_kind: definition.kind().describe(),
                second_subgraph: definition.subgraph().name().to_owned(),
            });
        }

        Ok(merged)
    }

    pub(super) fn finish(mut self) -> SupergraphState {
        self.collect_implementations();
        self.propagate_interface_object_fields();
        self.state
    }

    fn collect_implementations(&mut self) {
        let mut implementations = Vec::new();

        for (name, definition) in &self.state.definitions {
            let interfaces = match definition {
                MergedDefinition::Object(object) => &object.interfaces,
                MergedDefinition::Interface(interface) => &interface.interfaces,
                _ => continue,
            };

            implementations.extend(interfaces.iter().map(|interface| (*interface, *name)));
        }

        for (interface_name, implementer) in implementations {
            if let Some(MergedDefinition::Interface(interface)) = self.state.definitions.get_mut(&interface_name) {
                interface.implementations.insert(implementer);
            }
        }
    }

    /// Fields contributed by `@interfaceObject` definitions exist on every implementation in the
    /// supergraph, even though no subgraph defines them on the objects themselves.
    fn propagate_interface_object_fields(&mut self) {
        let mut additions = Vec::new();

        for definition in self.state.definitions.values() {
            let MergedDefinition::Interface(interface) = definition else {
                continue;
            };

            let interface_object_subgraphs: Vec<_> = interface.interface_object_subgraphs().collect();

            if interface_object_subgraphs.is_empty() {
                continue;
            }

            for field in interface.fields.values() {
                if !field.by_graph.keys().any(|id| interface_object_subgraphs.contains(id)) {
                    continue;
                }

                for implementation in &interface.implementations {
                    additions.push((*implementation, field.clone()));
                }
            }
        }

        for (implementation, mut field) in additions {
            let fields = match self.state.definitions.get_mut(&implementation) {
                Some(MergedDefinition::Object(object)) => &mut object.fields,
                _ => continue,
            };

            if fields.contains_key(&field.name) {
                continue;
            }

            field.by_graph.clear();
            field.from_interface_object = true;
            fields.insert(field.name, field);
        }
    }
}

fn empty_definition(name: StringId, kind: DefinitionKind) -> MergedDefinition {
    match kind {
        DefinitionKind::Object => MergedDefinition::Object(ObjectTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            interfaces: IndexSet::new(),
            fields: IndexMap::new(),
        }),
        DefinitionKind::Interface => MergedDefinition::Interface(InterfaceTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            interfaces: IndexSet::new(),
            fields: IndexMap::new(),
            implementations: IndexSet::new(),
        }),
        DefinitionKind::Union => MergedDefinition::Union(UnionTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            members: IndexMap::new(),
        }),
        DefinitionKind::Enum => MergedDefinition::Enum(EnumTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            values: IndexMap::new(),
            referenced_by_input: false,
            referenced_by_output: false,
        }),
        DefinitionKind::Scalar => MergedDefinition::Scalar(ScalarTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
        }),
        DefinitionKind::InputObject => MergedDefinition::InputObject(InputObjectTypeState {
            name,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            fields: IndexMap::new(),
        }),
    }
}

fn merge_output_field(subgraphs: &Subgraphs, fields: &mut IndexMap<StringId, FieldState>, field: FieldWalker<'_>) {
    let record = field.record();
    let subgraph_id = field.subgraph_id();
    let directives = field.directives();

    let state = fields
        .entry(record.name)
        .or_insert_with(|| FieldState::new(record.name, record.r#type));

    state.metadata.merge_site(subgraphs, directives, record.description);

    match state.r#type.compose_for_output(record.r#type) {
        Some(r#type) => state.r#type = r#type,
        None => state.type_mismatch = true,
    }

    for argument in field.arguments() {
        merge_input_value(
            subgraphs,
            &mut state.arguments,
            InputValueInGraph {
                subgraph_id,
                name: argument.name,
                r#type: argument.r#type,
                description: argument.description,
                directives: &subgraphs[argument.directives],
                default_value: argument.default_value.as_ref(),
            },
        );
    }

    state.by_graph.insert(
        subgraph_id,
        FieldInGraph {
            field_id: field.id,
            r#type: record.r#type,
            external: field.is_external(),
            shareable: field.is_shareable(),
            inaccessible: directives.inaccessible(),
            used_as_key: field.is_used_as_key(),
            used_in_field_set: field.is_used_in_field_set(),
            r#override: directives.r#override,
            requires: directives
                .requires
                .as_ref()
                .and_then(|requires| field_sets::prune_key_fields(Some(field.parent_definition()), &requires.selection_set)),
            provides: directives
                .provides
                .as_ref()
                .and_then(|provides| field_sets::prune_key_fields(field.type_definition(), &provides.selection_set)),
            list_size: directives.list_size.clone(),
        },
    );
}

struct InputValueInGraph<'a> {
    subgraph_id: crate::subgraphs::SubgraphId,
    name: StringId,
    r#type: crate::subgraphs::FieldType,
    description: Option<StringId>,
    directives: &'a crate::subgraphs::DirectiveSiteRecord,
    default_value: Option<&'a crate::subgraphs::Value>,
}

fn merge_input_value(
    subgraphs: &Subgraphs,
    input_values: &mut IndexMap<StringId, InputValueState>,
    input_value: InputValueInGraph<'_>,
) {
    let state = input_values
        .entry(input_value.name)
        .or_insert_with(|| InputValueState::new(input_value.name, input_value.r#type));

    state
        .metadata
        .merge_site(subgraphs, input_value.directives, input_value.description);

    match state.r#type.compose_for_input(input_value.r#type) {
        Some(r#type) => state.r#type = r#type,
        None => state.type_mismatch = true,
    }

    if state.default_value.is_none() {
        state.default_value = input_value.default_value.cloned();
    }

    state.by_graph.insert(input_value.subgraph_id, input_value.r#type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn subgraphs(sdls: &[(&str, &str)]) -> Subgraphs {
        let mut subgraphs = Subgraphs::default();
        for (name, sdl) in sdls {
            subgraphs.ingest_str(sdl, name, Some("http://example.com")).unwrap();
        }
        subgraphs
    }

    #[test]
    fn kind_mismatch() {
        let subgraphs = subgraphs(&[
            ("a", "type Query { node: Node } type Node { id: ID }"),
            ("b", "type Query { other: Node } interface Node { id: ID }"),
        ]);

        let error = SupergraphState::build(&subgraphs).err().unwrap();

        assert_eq!(
            error.to_string(),
            r#"Type "Node" has mismatched kind: it is defined as Object Type in subgraph "a" but Interface Type in subgraph "b""#
        );
    }

    #[test]
    fn auth_and_tags_accumulate() {
        let subgraphs = subgraphs(&[
            (
                "a",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.5", import: ["@key", "@shareable", "@requiresScopes", "@tag"])
                type Query { user: User @shareable }
                type User @key(fields: "id") @requiresScopes(scopes: [["read:user"]]) @tag(name: "public") { id: ID! }
                "#,
            ),
            (
                "b",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.5", import: ["@key", "@shareable", "@requiresScopes", "@tag"])
                type Query { user: User @shareable }
                type User @key(fields: "id") @requiresScopes(scopes: [["admin"], ["read:all"]]) @tag(name: "internal") { id: ID! name: String }
                "#,
            ),
        ]);

        let state = SupergraphState::build(&subgraphs).unwrap();
        let user = state.object(subgraphs.strings.lookup("User").unwrap()).unwrap();

        assert_eq!(
            user.metadata.auth.scopes,
            vec![vec!["admin", "read:user"], vec!["read:all", "read:user"]]
        );

        let tags: Vec<&str> = user.metadata.tags.iter().map(|tag| &subgraphs[*tag]).collect();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&"public") && tags.contains(&"internal"));

        assert_eq!(user.by_graph.len(), 2);
        let name = user.fields.get(&subgraphs.strings.lookup("name").unwrap()).unwrap();
        assert_eq!(name.by_graph.len(), 1);
    }

    #[test]
    fn output_types_pick_the_nullable_side() {
        let subgraphs = subgraphs(&[
            (
                "a",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@shareable"])
                type Query { name(filter: String): String! @shareable }
                "#,
            ),
            (
                "b",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@shareable"])
                type Query { name(filter: String!): String @shareable }
                "#,
            ),
        ]);

        let state = SupergraphState::build(&subgraphs).unwrap();
        let query = state.object(subgraphs.strings.lookup("Query").unwrap()).unwrap();
        let name = &query.fields[0];

        assert!(!name.type_mismatch);
        assert_eq!(name.r#type.display(&subgraphs), "String");

        let filter = &name.arguments[0];
        assert_eq!(filter.r#type.display(&subgraphs), "String!");
    }

    #[test]
    fn interface_object_fields_reach_implementations() {
        let subgraphs = subgraphs(&[
            (
                "a",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key"])
                type Query { media: [Media] }
                interface Media @key(fields: "id") { id: ID! }
                type Book implements Media @key(fields: "id") { id: ID! }
                "#,
            ),
            (
                "b",
                r#"
                extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@interfaceObject"])
                type Media @key(fields: "id") @interfaceObject { id: ID! reviews: [String] }
                "#,
            ),
        ]);

        let state = SupergraphState::build(&subgraphs).unwrap();
        let book = state.object(subgraphs.strings.lookup("Book").unwrap()).unwrap();
        let reviews = book.fields.get(&subgraphs.strings.lookup("reviews").unwrap()).unwrap();

        assert!(reviews.from_interface_object);
        assert!(reviews.by_graph.is_empty());

        let media = state.interface(subgraphs.strings.lookup("Media").unwrap()).unwrap();
        assert_eq!(media.implementations.len(), 1);
        assert_eq!(media.interface_object_subgraphs().count(), 1);
    }

    #[test]
    fn requires_drops_key_leaves() {
        let subgraphs = subgraphs(&[(
            "a",
            r#"
            extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@external", "@requires"])
            type Query { user: User }
            type User @key(fields: "id") {
                id: ID!
                name: String @external
                greeting: String @requires(fields: "id name")
            }
            "#,
        )]);

        let state = SupergraphState::build(&subgraphs).unwrap();
        let user = state.object(subgraphs.strings.lookup("User").unwrap()).unwrap();
        let greeting = user.fields.get(&subgraphs.strings.lookup("greeting").unwrap()).unwrap();
        let requires = greeting.by_graph[0].requires.as_deref().unwrap();

        assert_eq!(subgraphs.render_selection_set(requires), "name");
    }
}
