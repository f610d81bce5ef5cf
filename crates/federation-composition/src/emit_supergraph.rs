use crate::{
    subgraphs::{KeyId, RootOperation, SpecFeatures, StringId, SubgraphId, Subgraphs},
    supergraph::*,
    supergraph_model::*,
};

/// This can't fail. Everything that cannot be emitted was rejected by validation.
pub(crate) fn emit_supergraph(subgraphs: &Subgraphs, supergraph: &SupergraphState) -> SupergraphModel {
    let _span = tracing::debug_span!("emit_supergraph").entered();

    let mut ctx = Context {
        subgraphs,
        features: subgraphs
            .iter_subgraphs()
            .fold(SpecFeatures::empty(), |features, subgraph| features | subgraph.features()),
        override_labels: false,
    };

    let type_definitions: Vec<TypeDefinition> = supergraph
        .definitions
        .values()
        .map(|definition| ctx.emit_definition(definition))
        .collect();

    let root = |root: RootOperation| supergraph.root(subgraphs, root).map(|object| ctx.str(object.name));

    let root_operation_types = RootOperationTypes {
        query: root(RootOperation::Query),
        mutation: root(RootOperation::Mutation),
        subscription: root(RootOperation::Subscription),
    };

    let join_graphs = subgraphs
        .iter_subgraphs()
        .map(|subgraph| JoinGraph {
            name: subgraph.name().to_owned(),
            enum_value: subgraph.graph_enum_value().to_owned(),
            url: subgraph.url().map(str::to_owned),
        })
        .collect();

    tracing::debug!(types = type_definitions.len(), "emitted supergraph");

    SupergraphModel {
        links: ctx.links(),
        subgraphs: join_graphs,
        root_operation_types,
        type_definitions,
    }
}

struct Context<'a> {
    subgraphs: &'a Subgraphs,
    /// Feature specs the emitted directives come from.
    features: SpecFeatures,
    override_labels: bool,
}

impl Context<'_> {
    fn str(&self, id: StringId) -> String {
        self.subgraphs[id].to_owned()
    }

    fn graph(&self, subgraph_id: SubgraphId) -> DirectiveValue {
        DirectiveValue::EnumValue(self.subgraphs.walk(subgraph_id).graph_enum_value().to_owned())
    }

    fn links(&self) -> Vec<Link> {
        let link = |url: &str, purpose: Option<&str>, import: &[&str]| Link {
            url: url.to_owned(),
            purpose: purpose.map(str::to_owned),
            import: import.iter().map(|import| (*import).to_owned()).collect(),
        };

        let join_url = if self.override_labels {
            "https://specs.apollo.dev/join/v0.4"
        } else {
            "https://specs.apollo.dev/join/v0.3"
        };

        let mut links = vec![
            link("https://specs.apollo.dev/link/v1.0", None, &[]),
            link(join_url, Some("EXECUTION"), &[]),
        ];

        let features = [
            (SpecFeatures::TAG, "https://specs.apollo.dev/tag/v0.3", None, &[][..]),
            (
                SpecFeatures::INACCESSIBLE,
                "https://specs.apollo.dev/inaccessible/v0.2",
                Some("SECURITY"),
                &[],
            ),
            (
                SpecFeatures::AUTHENTICATED,
                "https://specs.apollo.dev/authenticated/v0.1",
                Some("SECURITY"),
                &[],
            ),
            (
                SpecFeatures::REQUIRES_SCOPES,
                "https://specs.apollo.dev/requiresScopes/v0.1",
                Some("SECURITY"),
                &[],
            ),
            (
                SpecFeatures::POLICY,
                "https://specs.apollo.dev/policy/v0.1",
                Some("SECURITY"),
                &[],
            ),
            (
                SpecFeatures::COST,
                "https://specs.apollo.dev/cost/v0.1",
                None,
                &["@cost", "@listSize"],
            ),
        ];

        for (feature, url, purpose, import) in features {
            if self.features.contains(feature) {
                links.push(link(url, purpose, import));
            }
        }

        links
    }

    fn emit_definition(&mut self, definition: &MergedDefinition) -> TypeDefinition {
        let metadata = definition.metadata();
        let mut directives = Vec::new();

        let kind = match definition {
            MergedDefinition::Object(object) => {
                for (subgraph_id, in_graph) in &object.by_graph {
                    self.join_types(*subgraph_id, in_graph, &mut directives);
                }
                self.join_implements(&object.by_graph, &mut directives);

                let subgraph_count = object.by_graph.len();
                TypeDefinitionKind::Object {
                    implements: object.interfaces.iter().map(|name| self.str(*name)).collect(),
                    fields: object
                        .fields
                        .values()
                        .map(|field| self.emit_field(field, subgraph_count))
                        .collect(),
                }
            }
            MergedDefinition::Interface(interface) => {
                for (subgraph_id, in_graph) in &interface.by_graph {
                    self.join_types(*subgraph_id, in_graph, &mut directives);
                }
                self.join_implements(&interface.by_graph, &mut directives);

                let subgraph_count = interface.by_graph.len();
                TypeDefinitionKind::Interface {
                    implements: interface.interfaces.iter().map(|name| self.str(*name)).collect(),
                    fields: interface
                        .fields
                        .values()
                        .map(|field| self.emit_field(field, subgraph_count))
                        .collect(),
                }
            }
            MergedDefinition::Union(union) => {
                for subgraph_id in union.by_graph.keys() {
                    directives.push(Directive::new("join__type").arg("graph", self.graph(*subgraph_id)));
                }

                for (member, subgraph_ids) in &union.members {
                    for subgraph_id in subgraph_ids {
                        directives.push(
                            Directive::new("join__unionMember")
                                .arg("graph", self.graph(*subgraph_id))
                                .arg("member", self.str(*member)),
                        );
                    }
                }

                TypeDefinitionKind::Union {
                    members: union.members.keys().map(|member| self.str(*member)).collect(),
                }
            }
            MergedDefinition::Enum(r#enum) => {
                for subgraph_id in r#enum.by_graph.keys() {
                    directives.push(Directive::new("join__type").arg("graph", self.graph(*subgraph_id)));
                }

                let values = r#enum
                    .values
                    .values()
                    .map(|value| {
                        let mut directives: Vec<Directive> = value
                            .by_graph
                            .iter()
                            .map(|subgraph_id| Directive::new("join__enumValue").arg("graph", self.graph(*subgraph_id)))
                            .collect();

                        directives.extend(self.metadata_directives(&value.metadata));

                        // Hidden from clients: some subgraph would not accept it as input.
                        if r#enum.is_value_inaccessible(value) && !value.metadata.inaccessible {
                            self.features |= SpecFeatures::INACCESSIBLE;
                            directives.push(Directive::new("inaccessible"));
                        }

                        EnumValueDefinition {
                            name: self.str(value.name),
                            description: value.metadata.description.map(|description| self.str(description)),
                            directives,
                        }
                    })
                    .collect();

                TypeDefinitionKind::Enum { values }
            }
            MergedDefinition::Scalar(scalar) => {
                for subgraph_id in scalar.by_graph.keys() {
                    directives.push(Directive::new("join__type").arg("graph", self.graph(*subgraph_id)));
                }

                TypeDefinitionKind::Scalar
            }
            MergedDefinition::InputObject(input_object) => {
                for subgraph_id in input_object.by_graph.keys() {
                    directives.push(Directive::new("join__type").arg("graph", self.graph(*subgraph_id)));
                }

                // Only the fields every subgraph accepts.
                let fields = input_object
                    .fields
                    .values()
                    .filter(|field| field.by_graph.len() == input_object.by_graph.len())
                    .map(|field| self.emit_input_value(field))
                    .collect();

                TypeDefinitionKind::InputObject { fields }
            }
        };

        directives.extend(self.metadata_directives(metadata));

        TypeDefinition {
            name: self.str(definition.name()),
            description: metadata.description.map(|description| self.str(description)),
            directives,
            kind,
        }
    }

    fn join_types(&self, subgraph_id: SubgraphId, in_graph: &TypeInGraph, directives: &mut Vec<Directive>) {
        let join_type = |key: Option<KeyId>| {
            let mut directive = Directive::new("join__type").arg("graph", self.graph(subgraph_id));

            if let Some(key) = key {
                directive = directive.arg("key", self.subgraphs.walk(key).fields_display());
            }

            if in_graph.is_extension {
                directive = directive.arg("extension", true);
            }

            if key.is_some_and(|key| !self.subgraphs.walk(key).is_resolvable()) {
                directive = directive.arg("resolvable", false);
            }

            if in_graph.is_interface_object {
                directive = directive.arg("isInterfaceObject", true);
            }

            directive
        };

        if in_graph.keys.is_empty() {
            directives.push(join_type(None));
        } else {
            directives.extend(in_graph.keys.iter().map(|key| join_type(Some(*key))));
        }
    }

    fn join_implements(
        &self,
        by_graph: &indexmap::IndexMap<SubgraphId, TypeInGraph>,
        directives: &mut Vec<Directive>,
    ) {
        for (subgraph_id, in_graph) in by_graph {
            for interface in &in_graph.interfaces {
                directives.push(
                    Directive::new("join__implements")
                        .arg("graph", self.graph(*subgraph_id))
                        .arg("interface", self.str(*interface)),
                );
            }
        }
    }

    fn emit_field(&mut self, field: &FieldState, parent_subgraph_count: usize) -> FieldDefinition {
        let mut directives = Vec::new();

        if field.by_graph.is_empty() {
            // Contributed by an `@interfaceObject`: no subgraph defines it on this type.
            directives.push(Directive::new("join__field"));
        } else if self.needs_join_field(field, parent_subgraph_count) {
            for (subgraph_id, in_graph) in &field.by_graph {
                directives.push(self.join_field(field, *subgraph_id, in_graph));
            }
        }

        directives.extend(self.metadata_directives(&field.metadata));

        if let Some(list_size) = field.merge_list_size(self.subgraphs).merged {
            self.features |= SpecFeatures::COST;
            directives.push(self.list_size(&list_size));
        }

        // Arguments every resolving subgraph accepts.
        let resolving: Vec<SubgraphId> = field
            .by_graph
            .iter()
            .filter(|(_, in_graph)| !in_graph.external)
            .map(|(subgraph_id, _)| *subgraph_id)
            .collect();

        let arguments = field
            .arguments
            .values()
            .filter(|argument| {
                resolving
                    .iter()
                    .all(|subgraph_id| argument.by_graph.contains_key(subgraph_id))
            })
            .map(|argument| self.emit_input_value(argument))
            .collect();

        FieldDefinition {
            name: self.str(field.name),
            description: field.metadata.description.map(|description| self.str(description)),
            arguments,
            r#type: field.r#type.display(self.subgraphs),
            directives,
        }
    }

    /// A field resolvable the same way in every subgraph of its parent type does not need one.
    fn needs_join_field(&self, field: &FieldState, parent_subgraph_count: usize) -> bool {
        field.by_graph.len() != parent_subgraph_count
            || field.by_graph.values().any(|in_graph| {
                in_graph.external
                    || in_graph.r#override.is_some()
                    || in_graph.requires.as_ref().is_some_and(|requires| !requires.is_empty())
                    || in_graph.provides.as_ref().is_some_and(|provides| !provides.is_empty())
                    || in_graph.r#type != field.r#type
            })
    }

    fn join_field(&mut self, field: &FieldState, subgraph_id: SubgraphId, in_graph: &FieldInGraph) -> Directive {
        let mut directive = Directive::new("join__field").arg("graph", self.graph(subgraph_id));

        if let Some(requires) = in_graph.requires.as_ref().filter(|requires| !requires.is_empty()) {
            directive = directive.arg("requires", self.subgraphs.render_selection_set(requires));
        }

        if let Some(provides) = in_graph.provides.as_ref().filter(|provides| !provides.is_empty()) {
            directive = directive.arg("provides", self.subgraphs.render_selection_set(provides));
        }

        if in_graph.r#type != field.r#type {
            directive = directive.arg("type", in_graph.r#type.display(self.subgraphs));
        }

        if in_graph.external {
            directive = directive.arg("external", true);
        }

        if let Some(r#override) = in_graph.r#override {
            directive = directive.arg("override", self.str(r#override.from));

            if let Some(label) = r#override.label {
                self.override_labels = true;
                directive = directive.arg("overrideLabel", self.str(label));
            }
        }

        directive
    }

    fn list_size(&self, list_size: &MergedListSize) -> Directive {
        let mut directive = Directive::new("listSize");

        if let Some(assumed_size) = list_size.assumed_size {
            directive = directive.arg("assumedSize", i64::from(assumed_size));
        }

        if !list_size.slicing_arguments.is_empty() {
            let slicing_arguments: Vec<String> = list_size
                .slicing_arguments
                .iter()
                .map(|argument| self.str(*argument))
                .collect();
            directive = directive.arg("slicingArguments", slicing_arguments);
        }

        if !list_size.sized_fields.is_empty() {
            let sized_fields: Vec<String> = list_size.sized_fields.iter().map(|field| self.str(*field)).collect();
            directive = directive.arg("sizedFields", sized_fields);
        }

        // `true` is the default, it is only printed when it differs.
        if !list_size.require_one_slicing_argument && !list_size.slicing_arguments.is_empty() {
            directive = directive.arg("requireOneSlicingArgument", false);
        }

        directive
    }

    fn emit_input_value(&mut self, input_value: &InputValueState) -> InputValueDefinition {
        InputValueDefinition {
            name: self.str(input_value.name),
            description: input_value.metadata.description.map(|description| self.str(description)),
            r#type: input_value.r#type.display(self.subgraphs),
            default_value: input_value
                .default_value
                .as_ref()
                .map(|value| value.display(self.subgraphs).to_string()),
            directives: self.metadata_directives(&input_value.metadata),
        }
    }

    fn metadata_directives(&mut self, metadata: &Metadata) -> Vec<Directive> {
        let mut directives = Vec::new();

        let mut tags: Vec<&str> = metadata.tags.iter().map(|tag| &self.subgraphs[*tag]).collect();
        tags.sort_unstable();

        for tag in tags {
            directives.push(Directive::new("tag").arg("name", tag));
        }

        if !metadata.tags.is_empty() {
            self.features |= SpecFeatures::TAG;
        }

        if metadata.inaccessible {
            self.features |= SpecFeatures::INACCESSIBLE;
            directives.push(Directive::new("inaccessible"));
        }

        let auth = &metadata.auth;

        if auth.authenticated {
            self.features |= SpecFeatures::AUTHENTICATED;
            directives.push(Directive::new("authenticated"));
        }

        if !auth.scopes.is_empty() {
            self.features |= SpecFeatures::REQUIRES_SCOPES;
            directives.push(Directive::new("requiresScopes").arg("scopes", auth.scopes.clone()));
        }

        if !auth.policies.is_empty() {
            self.features |= SpecFeatures::POLICY;
            directives.push(Directive::new("policy").arg("policies", auth.policies.clone()));
        }

        if let Some(weight) = metadata.cost {
            self.features |= SpecFeatures::COST;
            directives.push(Directive::new("cost").arg("weight", i64::from(weight)));
        }

        if let Some(deprecated) = metadata.deprecated {
            let mut directive = Directive::new("deprecated");
            if let Some(reason) = deprecated.reason {
                directive = directive.arg("reason", self.str(reason));
            }
            directives.push(directive);
        }

        directives
    }
}

#[cfg(test)]
mod tests {
    use crate::{compose, Subgraphs};

    const HEADER: &str = r#"extend schema @link(url: "https://specs.apollo.dev/federation/v2.7", import: ["@key", "@override"])"#;

    #[test]
    fn override_labels_switch_to_join_v04() {
        let mut subgraphs = Subgraphs::default();
        subgraphs
            .ingest_str(
                &format!(
                    r#"{HEADER}
                    type Query {{ products: [Product] }}
                    type Product @key(fields: "id") {{ id: ID! price: Int }}"#
                ),
                "a",
                None,
            )
            .unwrap();
        subgraphs
            .ingest_str(
                &format!(
                    r#"{HEADER}
                    type Product @key(fields: "id") {{ id: ID! price: Int @override(from: "a", label: "percent(10)") }}"#
                ),
                "b",
                None,
            )
            .unwrap();

        let supergraph = compose(&subgraphs).into_result().unwrap();
        let sdl = supergraph.supergraph_sdl();

        assert_eq!(supergraph.model().join_version(), Some("v0.4"));
        assert!(sdl.contains(
            r#"  price: Int @join__field(graph: A) @join__field(graph: B, override: "a", overrideLabel: "percent(10)")"#
        ));
        assert!(sdl.contains("  A @join__graph(name: \"a\", url: \"\")\n"));
    }
}
