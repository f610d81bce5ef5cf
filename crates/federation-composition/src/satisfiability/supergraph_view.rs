use super::graph::*;
use crate::{
    subgraphs::StringId,
    supergraph::{MergedDefinition, SupergraphState},
};
use fixedbitset::FixedBitSet;
use std::collections::{HashMap, VecDeque};

/// The API schema as a graph: the paths a client query can take.
pub(crate) struct SupergraphView {
    pub(crate) graph: Graph,
    reachability: HashMap<(StringId, StringId), bool>,
}

impl SupergraphView {
    /// Inaccessible types and fields are not part of the API schema, they are left out.
    pub(crate) fn new(supergraph: &SupergraphState) -> Self {
        let mut graph = Graph::default();

        let is_accessible = |name: &StringId| {
            !supergraph
                .definition(*name)
                .is_some_and(|definition| definition.metadata().inaccessible)
        };

        for definition in supergraph.definitions.values() {
            if definition.metadata().inaccessible {
                continue;
            }

            let (fields, possible_types): (Vec<_>, Vec<StringId>) = match definition {
                MergedDefinition::Object(object) => (object.fields.values().collect(), Vec::new()),
                MergedDefinition::Interface(interface) => (
                    interface.fields.values().collect(),
                    interface.implementations.iter().copied().filter(is_accessible).collect(),
                ),
                MergedDefinition::Union(union) => (
                    Vec::new(),
                    union.members.keys().copied().filter(is_accessible).collect(),
                ),
                _ => continue,
            };

            let head = graph.node_for(definition.name(), NodeSource::Supergraph);

            for field in fields {
                if field.metadata.inaccessible || !is_accessible(&field.r#type.name) {
                    continue;
                }

                let tail = graph.node_for(field.r#type.name, NodeSource::Supergraph);
                graph.add_edge(
                    head,
                    Move::Field {
                        name: field.name,
                        condition: None,
                        provided: false,
                    },
                    tail,
                );
            }

            for possible_type in possible_types {
                let tail = graph.node_for(possible_type, NodeSource::Supergraph);
                graph.add_edge(head, Move::Abstract, tail);
            }
        }

        SupergraphView {
            graph,
            reachability: HashMap::new(),
        }
    }

    /// Is there a path of fields and type conditions from one type to the other? Memoized per
    /// pair.
    pub(crate) fn can_reach_type_from_type(&mut self, from: StringId, to: StringId) -> bool {
        if let Some(reachable) = self.reachability.get(&(from, to)) {
            return *reachable;
        }

        let reachable = self.search(from, to);
        self.reachability.insert((from, to), reachable);
        reachable
    }

    fn search(&self, from: StringId, to: StringId) -> bool {
        if from == to {
            return true;
        }

        let Some(start) = self.graph.find_node(from, NodeSource::Supergraph) else {
            return false;
        };

        let mut visited = FixedBitSet::with_capacity(self.graph.node_count());
        let mut queue = VecDeque::from([start]);
        visited.insert(usize::from(start));

        while let Some(node) = queue.pop_front() {
            for (_, edge) in self.graph.outgoing_edges(node) {
                if self.graph.node(edge.tail).type_name == to {
                    return true;
                }

                if !visited.put(usize::from(edge.tail)) {
                    queue.push_back(edge.tail);
                }
            }
        }

        false
    }
}
