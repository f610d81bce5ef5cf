use super::graph::*;
use crate::{
    subgraphs::{
        DefinitionKind, DefinitionWalker, KeyId, KeyWalker, RootOperation, Selection, StringId, SubgraphId, SubgraphWalker,
        Subgraphs,
    },
    supergraph::{MergedDefinition, SupergraphState},
};
use fixedbitset::FixedBitSet;
use std::collections::{BTreeSet, VecDeque};

/// The federated query graph: one node per composite type per subgraph, field moves inside a
/// subgraph, and key moves between subgraphs.
pub(crate) struct QueryGraph {
    pub(crate) graph: Graph,
    /// Every `@override` label.
    pub(crate) labels: BTreeSet<StringId>,
}

pub(crate) fn build_query_graph(subgraphs: &Subgraphs, supergraph: &SupergraphState) -> QueryGraph {
    let mut builder = QueryGraphBuilder {
        subgraphs,
        supergraph,
        graph: Graph::default(),
        expanded: FixedBitSet::new(),
        labels: BTreeSet::new(),
        provides: Vec::new(),
    };

    for subgraph in subgraphs.iter_subgraphs() {
        builder.add_from_roots(subgraph);
        builder.add_from_entities(subgraph);
        builder.add_unreachable_types(subgraph);
    }

    builder.join_subgraphs();
    builder.resolve_provides();

    tracing::debug!(
        nodes = builder.graph.node_count(),
        edges = builder.graph.edge_count(),
        "built query graph"
    );

    QueryGraph {
        graph: builder.graph,
        labels: builder.labels,
    }
}

struct QueryGraphBuilder<'a> {
    subgraphs: &'a Subgraphs,
    supergraph: &'a SupergraphState,
    graph: Graph,
    /// Nodes whose outgoing field and abstract edges were added.
    expanded: FixedBitSet,
    labels: BTreeSet<StringId>,
    /// Field edges with a `@provides`, handled once every subgraph is in the graph.
    provides: Vec<(EdgeId, SubgraphId, &'a [Selection])>,
}

impl<'a> QueryGraphBuilder<'a> {
    fn add_from_roots(&mut self, subgraph: SubgraphWalker<'a>) {
        let roots = RootOperation::ALL
            .into_iter()
            .filter_map(|root| subgraph.root_type(root))
            .collect();
        self.expand(roots);
    }

    /// Entities are reachable through `_entities`, whether or not a root field leads to them.
    fn add_from_entities(&mut self, subgraph: SubgraphWalker<'a>) {
        let entities = subgraph
            .definitions()
            .filter(|definition| definition.is_entity())
            .collect();
        self.expand(entities);
    }

    fn add_unreachable_types(&mut self, subgraph: SubgraphWalker<'a>) {
        let rest = subgraph
            .definitions()
            .filter(|definition| definition.kind().is_composite())
            .collect();
        self.expand(rest);
    }

    fn expand(&mut self, start: VecDeque<DefinitionWalker<'a>>) {
        let mut queue = start;

        while let Some(definition) = queue.pop_front() {
            let node = self
                .graph
                .node_for(definition.name_id(), NodeSource::Subgraph(definition.subgraph_id()));

            self.expanded.grow(self.graph.node_count());
            if self.expanded.put(usize::from(node)) {
                continue;
            }

            match definition.kind() {
                DefinitionKind::Object | DefinitionKind::Interface => {
                    self.add_field_edges(definition, node, &mut queue);
                }
                DefinitionKind::Union => {}
                _ => continue,
            }

            let possible_types: Vec<DefinitionWalker<'a>> = match definition.kind() {
                DefinitionKind::Interface => definition.implementers().collect(),
                DefinitionKind::Union => definition.union_members().collect(),
                _ => Vec::new(),
            };

            for possible_type in possible_types {
                let tail = self.graph.node_for(
                    possible_type.name_id(),
                    NodeSource::Subgraph(possible_type.subgraph_id()),
                );
                self.graph.add_edge(node, Move::Abstract, tail);
                queue.push_back(possible_type);
            }
        }
    }

    fn add_field_edges(
        &mut self,
        definition: DefinitionWalker<'a>,
        node: NodeId,
        queue: &mut VecDeque<DefinitionWalker<'a>>,
    ) {
        let subgraph_id = definition.subgraph_id();
        let subgraph_name = definition.subgraph().name_id();
        let supergraph = self.supergraph;
        let Some(fields) = supergraph.fields_of(definition.name_id()) else {
            return;
        };

        for field in fields.values() {
            let Some(in_graph) = field.by_graph.get(&subgraph_id) else {
                continue;
            };

            if in_graph.external && !in_graph.used_as_key {
                continue;
            }

            let overridden_by = field.overridden_by(subgraph_name).map(|(_, overriding)| overriding);

            let condition = match (in_graph.r#override, overridden_by) {
                (Some(r#override), _) => r#override.label.map(|label| OverrideCondition { label, active: true }),
                (None, Some(overriding)) => overriding
                    .r#override
                    .and_then(|r#override| r#override.label)
                    .map(|label| OverrideCondition { label, active: false }),
                (None, None) => None,
            };

            if let Some(condition) = condition {
                self.labels.insert(condition.label);
            }

            if let Some(tail_definition) = self
                .subgraphs
                .definition_by_name_id(in_graph.r#type.name, subgraph_id)
                .map(|id| self.subgraphs.walk(id))
                .filter(|tail| tail.kind().is_composite())
            {
                queue.push_back(tail_definition);
            }

            let tail = self
                .graph
                .node_for(in_graph.r#type.name, NodeSource::Subgraph(subgraph_id));

            let edge = self.graph.add_edge(
                node,
                Move::Field {
                    name: field.name,
                    condition,
                    provided: false,
                },
                tail,
            );

            if overridden_by.is_some() && condition.is_none() {
                self.graph.ignore_edge(edge);
            }

            if let Some(provides) = in_graph.provides.as_deref().filter(|provides| !provides.is_empty()) {
                self.provides.push((edge, subgraph_id, provides));
            }
        }
    }

    /// Add key moves between the subgraphs sharing an entity, and from object types to the
    /// `@interfaceObject` standing in for their interfaces.
    fn join_subgraphs(&mut self) {
        let subgraphs = self.subgraphs;
        let supergraph = self.supergraph;

        for definition in supergraph.definitions.values() {
            let (name, by_graph) = match definition {
                MergedDefinition::Object(object) => (object.name, &object.by_graph),
                MergedDefinition::Interface(interface) => (interface.name, &interface.by_graph),
                _ => continue,
            };

            for (target_subgraph, target) in by_graph {
                if target.keys.is_empty() {
                    continue;
                }

                let Some(target_node) = self.graph.find_node(name, NodeSource::Subgraph(*target_subgraph)) else {
                    continue;
                };

                for (source_subgraph, source) in by_graph {
                    if source_subgraph == target_subgraph {
                        continue;
                    }

                    let Some(source_node) = self.graph.find_node(name, NodeSource::Subgraph(*source_subgraph)) else {
                        continue;
                    };

                    let source_definition = subgraphs.walk(source.definition_id);
                    if let Some(key) = cheapest_providable_key(subgraphs, &target.keys, source_definition) {
                        self.graph.add_edge(source_node, Move::Entity { key: key.id }, target_node);
                    }
                }
            }

            let MergedDefinition::Interface(interface) = definition else {
                continue;
            };

            for interface_object_subgraph in interface.interface_object_subgraphs() {
                let Some(target_node) = self
                    .graph
                    .find_node(interface.name, NodeSource::Subgraph(interface_object_subgraph))
                else {
                    continue;
                };

                let keys = &interface.by_graph[&interface_object_subgraph].keys;

                for implementation in &interface.implementations {
                    let Some(object) = supergraph.object(*implementation) else {
                        continue;
                    };

                    for (source_subgraph, source) in &object.by_graph {
                        let Some(source_node) = self
                            .graph
                            .find_node(object.name, NodeSource::Subgraph(*source_subgraph))
                        else {
                            continue;
                        };

                        let source_definition = subgraphs.walk(source.definition_id);
                        if let Some(key) = cheapest_providable_key(subgraphs, keys, source_definition) {
                            self.graph
                                .add_edge(source_node, Move::InterfaceObject { key: key.id }, target_node);
                        }
                    }
                }
            }
        }
    }

    /// Fields reached through a field with `@provides` get their own copy of the field type's
    /// node, where the provided `@external` fields are resolvable.
    fn resolve_provides(&mut self) {
        for (edge, subgraph_id, provides) in std::mem::take(&mut self.provides) {
            let tail = self.graph.edge(edge).tail;
            let duplicate = self.graph.duplicate_node(tail);
            self.graph.set_edge_tail(edge, duplicate);
            self.provide_on(duplicate, subgraph_id, provides);
        }
    }

    fn provide_on(&mut self, node: NodeId, subgraph_id: SubgraphId, selection_set: &'a [Selection]) {
        let supergraph = self.supergraph;
        let type_name = self.graph.node(node).type_name;

        for selection in selection_set {
            match selection {
                Selection::Field(selection) => {
                    let existing = self
                        .graph
                        .outgoing_edges(node)
                        .find(|(_, edge)| matches!(edge.r#move, Move::Field { name, .. } if name == selection.field))
                        .map(|(id, _)| id);

                    let edge = match existing {
                        Some(edge) => edge,
                        None => {
                            let Some(in_graph) = supergraph
                                .fields_of(type_name)
                                .and_then(|fields| fields.get(&selection.field))
                                .and_then(|field| field.by_graph.get(&subgraph_id))
                            else {
                                continue;
                            };

                            let tail = self
                                .graph
                                .node_for(in_graph.r#type.name, NodeSource::Subgraph(subgraph_id));

                            self.graph.add_edge(
                                node,
                                Move::Field {
                                    name: selection.field,
                                    condition: None,
                                    provided: true,
                                },
                                tail,
                            )
                        }
                    };

                    if !selection.subselection.is_empty() {
                        let tail = self.graph.edge(edge).tail;
                        let duplicate = self.graph.duplicate_node(tail);
                        self.graph.set_edge_tail(edge, duplicate);
                        self.provide_on(duplicate, subgraph_id, &selection.subselection);
                    }
                }
                Selection::InlineFragment { on, subselection, .. } if *on == type_name => {
                    self.provide_on(node, subgraph_id, subselection);
                }
                Selection::InlineFragment { on, subselection, .. } => {
                    let possible_type = self
                        .graph
                        .outgoing_edges(node)
                        .find(|(_, edge)| {
                            edge.r#move == Move::Abstract && self.graph.node(edge.tail).type_name == *on
                        })
                        .map(|(id, _)| id);

                    if let Some(edge) = possible_type {
                        let tail = self.graph.edge(edge).tail;
                        let duplicate = self.graph.duplicate_node(tail);
                        self.graph.set_edge_tail(edge, duplicate);
                        self.provide_on(duplicate, subgraph_id, subselection);
                    }
                }
            }
        }
    }
}

/// The resolvable key with the fewest leaf fields that the source definition can fill in.
pub(crate) fn cheapest_providable_key<'a>(
    subgraphs: &'a Subgraphs,
    keys: &[KeyId],
    source: DefinitionWalker<'a>,
) -> Option<KeyWalker<'a>> {
    keys.iter()
        .map(|key| subgraphs.walk(*key))
        .filter(|key| key.is_resolvable())
        .filter(|key| can_provide(source, key.selection_set()))
        .min_by_key(|key| key.score())
}

/// Every field of the selection is available on the definition without a fetch to another
/// subgraph. Key fields count even when `@external`: they come with the entity representation.
pub(crate) fn can_provide(definition: DefinitionWalker<'_>, selection_set: &[Selection]) -> bool {
    selection_set.iter().all(|selection| match selection {
        Selection::Field(selection) => definition
            .field_by_name_id(selection.field)
            .is_some_and(|field| {
                (!field.is_external() || field.is_used_as_key())
                    && (selection.subselection.is_empty()
                        || field
                            .type_definition()
                            .is_some_and(|field_type| can_provide(field_type, &selection.subselection)))
            }),
        Selection::InlineFragment { on, subselection, .. } if *on == definition.name_id() => {
            can_provide(definition, subselection)
        }
        Selection::InlineFragment { on, subselection, .. } => definition
            .subgraphs
            .definition_by_name_id(*on, definition.subgraph_id())
            .is_some_and(|id| can_provide(definition.walk(id), subselection)),
    })
}
