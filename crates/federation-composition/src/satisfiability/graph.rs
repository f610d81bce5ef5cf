use crate::subgraphs::{KeyId, StringId, SubgraphId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EdgeId(usize);

impl From<NodeId> for usize {
    fn from(id: NodeId) -> usize {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum NodeSource {
    Subgraph(SubgraphId),
    Supergraph,
}

impl NodeSource {
    pub(crate) fn subgraph_id(self) -> Option<SubgraphId> {
        match self {
            NodeSource::Subgraph(id) => Some(id),
            NodeSource::Supergraph => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) type_name: StringId,
    pub(crate) source: NodeSource,
}

/// A progressive override edge is only usable when its label is in the given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct OverrideCondition {
    pub(crate) label: StringId,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Move {
    /// Resolve a field of the head type. The tail is the field's named type.
    Field {
        name: StringId,
        condition: Option<OverrideCondition>,
        /// Only available because the parent field `@provides` it.
        provided: bool,
    },
    /// The same entity in another subgraph, fetched with a key.
    Entity { key: KeyId },
    /// The `@interfaceObject` standing in for an interface in another subgraph, fetched with the
    /// interface key.
    InterfaceObject { key: KeyId },
    /// A possible type of the abstract head type, in the same graph.
    Abstract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeState {
    Active,
    /// Soft deleted: other edges keep their positions.
    Ignored,
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) head: NodeId,
    pub(crate) tail: NodeId,
    pub(crate) r#move: Move,
    pub(crate) state: EdgeState,
}

/// Append-only node and edge storage. Ids stay valid for the lifetime of the graph.
#[derive(Default)]
pub(crate) struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    by_type: BTreeMap<(StringId, NodeSource), NodeId>,
}

impl Graph {
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The node of a type in a subgraph or in the supergraph, created on first use.
    pub(crate) fn node_for(&mut self, type_name: StringId, source: NodeSource) -> NodeId {
        if let Some(id) = self.by_type.get(&(type_name, source)) {
            return *id;
        }

        let id = self.push_node(Node { type_name, source });
        self.by_type.insert((type_name, source), id);
        id
    }

    pub(crate) fn find_node(&self, type_name: StringId, source: NodeSource) -> Option<NodeId> {
        self.by_type.get(&(type_name, source)).copied()
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        id
    }

    pub(crate) fn add_edge(&mut self, head: NodeId, r#move: Move, tail: NodeId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            head,
            tail,
            r#move,
            state: EdgeState::Active,
        });
        self.outgoing[head.0].push(id);
        id
    }

    pub(crate) fn ignore_edge(&mut self, edge: EdgeId) {
        self.edges[edge.0].state = EdgeState::Ignored;
    }

    pub(crate) fn set_edge_tail(&mut self, edge: EdgeId, tail: NodeId) {
        self.edges[edge.0].tail = tail;
    }

    /// A copy of the node with copies of its active outgoing edges. Edges added to the copy do
    /// not show up on the original.
    pub(crate) fn duplicate_node(&mut self, node: NodeId) -> NodeId {
        let duplicate = self.push_node(self.nodes[node.0].clone());

        let edges: Vec<(Move, NodeId)> = self
            .outgoing_edges(node)
            .map(|(_, edge)| (edge.r#move.clone(), edge.tail))
            .collect();

        for (r#move, tail) in edges {
            self.add_edge(duplicate, r#move, tail);
        }

        duplicate
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// Active edges leaving the node.
    pub(crate) fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.outgoing[node.0]
            .iter()
            .map(|id| (*id, &self.edges[id.0]))
            .filter(|(_, edge)| edge.state == EdgeState::Active)
    }

    /// Every edge leaving the node, ignored ones included.
    pub(crate) fn all_outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.outgoing[node.0].iter().map(|id| (*id, &self.edges[id.0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_keep_edges_and_diverge() {
        let mut graph = Graph::default();
        let user = StringId::from(0);
        let name = StringId::from(1);
        let string = StringId::from(2);
        let email = StringId::from(3);
        let source = NodeSource::Subgraph(SubgraphId::from(0));

        let user_node = graph.node_for(user, source);
        let string_node = graph.node_for(string, source);
        assert_eq!(graph.node_for(user, source), user_node);

        let field = Move::Field {
            name,
            condition: None,
            provided: false,
        };
        let name_edge = graph.add_edge(user_node, field, string_node);

        let duplicate = graph.duplicate_node(user_node);
        graph.add_edge(
            duplicate,
            Move::Field {
                name: email,
                condition: None,
                provided: true,
            },
            string_node,
        );

        assert_eq!(graph.outgoing_edges(user_node).count(), 1);
        assert_eq!(graph.outgoing_edges(duplicate).count(), 2);
        assert_eq!(graph.node(duplicate).type_name, user);
        assert_eq!(graph.find_node(user, source), Some(user_node));

        graph.ignore_edge(name_edge);
        assert_eq!(graph.outgoing_edges(user_node).count(), 0);
        assert_eq!(graph.all_outgoing_edges(user_node).count(), 1);
        assert_eq!(graph.outgoing_edges(duplicate).count(), 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }
}
