use super::{
    build::QueryGraph,
    graph::*,
    supergraph_view::SupergraphView,
};
use crate::{
    subgraphs::{RootOperation, Selection, StringId, SubgraphId, Subgraphs},
    supergraph::{MergedDefinition, SupergraphState, TypeInGraph},
};
use fixedbitset::FixedBitSet;
use indexmap::{IndexMap, IndexSet};
use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    fmt::Write as _,
};

/// Where a walk enters the supergraph.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entry {
    Root(RootOperation),
    /// An entity no root field leads to, fetched through `_entities`.
    Entity(StringId),
}

/// Errors of every walk, one per unresolvable field.
#[derive(Default)]
pub(crate) struct Report {
    failed: HashSet<(StringId, StringId)>,
    pub(crate) errors: Vec<String>,
}

struct State {
    /// Node in the supergraph view.
    node: NodeId,
    /// The subgraph nodes a query planner could be at.
    options: BTreeSet<NodeId>,
    /// Selections leading here, for the witness query.
    path: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequiresOutcome {
    Satisfied,
    Unsatisfiable,
    NoKeyToResume,
}

/// A depth first walk of the supergraph view, with one fixed set of active override labels.
pub(crate) struct Traversal<'a> {
    subgraphs: &'a Subgraphs,
    supergraph: &'a SupergraphState,
    query_graph: &'a QueryGraph,
    view: &'a SupergraphView,
    active_labels: BTreeSet<StringId>,
    visited: HashMap<NodeId, Vec<BTreeSet<NodeId>>>,
    requires_in_progress: Vec<(NodeId, StringId)>,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(
        subgraphs: &'a Subgraphs,
        supergraph: &'a SupergraphState,
        query_graph: &'a QueryGraph,
        view: &'a SupergraphView,
        active_labels: BTreeSet<StringId>,
    ) -> Self {
        Traversal {
            subgraphs,
            supergraph,
            query_graph,
            view,
            active_labels,
            visited: HashMap::new(),
            requires_in_progress: Vec::new(),
        }
    }

    pub(crate) fn walk(&mut self, entry: Entry, start: NodeId, options: BTreeSet<NodeId>, report: &mut Report) {
        let view = self.view;
        let initial_path = match entry {
            Entry::Root(_) => Vec::new(),
            Entry::Entity(type_name) => vec![
                "_entities(representations: $representations)".to_owned(),
                format!("... on {}", &self.subgraphs[type_name]),
            ],
        };

        let mut stack = vec![State {
            node: start,
            options,
            path: initial_path,
        }];

        while let Some(state) = stack.pop() {
            if !self.visit(&state) {
                continue;
            }

            let head_type = view.graph.node(state.node).type_name;

            for (_, edge) in view.graph.outgoing_edges(state.node) {
                let tail_type = view.graph.node(edge.tail).type_name;
                let tail_is_composite = self.is_composite(tail_type);

                match edge.r#move {
                    Move::Field { name, .. } => {
                        let next = self.advance_field(&state.options, name);

                        if next.is_empty() {
                            if report.failed.insert((head_type, name)) {
                                let error = self.describe_failure(entry, &state, head_type, name, tail_is_composite);
                                tracing::debug!(%error, "unsatisfiable field");
                                report.errors.push(error);
                            }
                            continue;
                        }

                        if tail_is_composite {
                            stack.push(State {
                                node: edge.tail,
                                options: next,
                                path: extend_path(&state.path, self.subgraphs[name].to_owned()),
                            });
                        }
                    }
                    Move::Abstract => {
                        let next = self.advance_to_type(&state.options, tail_type);

                        // Subgraphs that never return this type: the path does not exist at runtime.
                        if next.is_empty() {
                            continue;
                        }

                        stack.push(State {
                            node: edge.tail,
                            options: next,
                            path: extend_path(&state.path, format!("... on {}", &self.subgraphs[tail_type])),
                        });
                    }
                    Move::Entity { .. } | Move::InterfaceObject { .. } => {}
                }
            }
        }
    }

    /// Skip the state when the same node was already walked from a subset of its options: fewer
    /// options can only fail more.
    fn visit(&mut self, state: &State) -> bool {
        let previous = self.visited.entry(state.node).or_default();

        if previous.iter().any(|options| options.is_subset(&state.options)) {
            return false;
        }

        previous.push(state.options.clone());
        true
    }

    fn is_composite(&self, type_name: StringId) -> bool {
        self.supergraph
            .definition(type_name)
            .is_some_and(|definition| definition.kind().is_composite())
    }

    fn allows(&self, condition: Option<OverrideCondition>) -> bool {
        match condition {
            Some(condition) => self.active_labels.contains(&condition.label) == condition.active,
            None => true,
        }
    }

    /// The options, and every node reachable from them through key moves.
    fn with_key_moves(&self, options: &BTreeSet<NodeId>) -> Vec<NodeId> {
        let graph = &self.query_graph.graph;
        let mut visited = FixedBitSet::with_capacity(graph.node_count());
        let mut queue: VecDeque<NodeId> = options.iter().copied().collect();

        for option in options {
            visited.insert(usize::from(*option));
        }

        let mut reached = Vec::new();

        while let Some(node) = queue.pop_front() {
            reached.push(node);

            for (_, edge) in graph.outgoing_edges(node) {
                if matches!(edge.r#move, Move::Entity { .. } | Move::InterfaceObject { .. })
                    && !visited.put(usize::from(edge.tail))
                {
                    queue.push_back(edge.tail);
                }
            }
        }

        reached
    }

    fn advance_field(&mut self, options: &BTreeSet<NodeId>, field_name: StringId) -> BTreeSet<NodeId> {
        let query_graph = self.query_graph;
        let mut next = BTreeSet::new();

        for node in self.with_key_moves(options) {
            for (_, edge) in query_graph.graph.outgoing_edges(node) {
                let Move::Field {
                    name,
                    condition,
                    provided,
                } = edge.r#move
                else {
                    continue;
                };

                if name != field_name || !self.allows(condition) {
                    continue;
                }

                if !provided && self.check_requires(node, name) != RequiresOutcome::Satisfied {
                    continue;
                }

                next.insert(edge.tail);
            }
        }

        next
    }

    fn advance_to_type(&self, options: &BTreeSet<NodeId>, type_name: StringId) -> BTreeSet<NodeId> {
        let graph = &self.query_graph.graph;
        let mut next = BTreeSet::new();

        for node in self.with_key_moves(options) {
            if graph.node(node).type_name == type_name {
                next.insert(node);
                continue;
            }

            for (_, edge) in graph.outgoing_edges(node) {
                if edge.r#move == Move::Abstract && graph.node(edge.tail).type_name == type_name {
                    next.insert(edge.tail);
                }
            }
        }

        next
    }

    fn requires_of(&self, node: NodeId, field_name: StringId) -> Option<&'a [Selection]> {
        let supergraph = self.supergraph;
        let node = self.query_graph.graph.node(node);
        let subgraph_id = node.source.subgraph_id()?;

        supergraph
            .fields_of(node.type_name)?
            .get(&field_name)?
            .by_graph
            .get(&subgraph_id)?
            .requires
            .as_deref()
    }

    /// The required selection must be resolvable from the entity, and the requiring subgraph
    /// needs a key to be entered again with the result.
    fn check_requires(&mut self, node: NodeId, field_name: StringId) -> RequiresOutcome {
        let Some(requires) = self.requires_of(node, field_name).filter(|requires| !requires.is_empty()) else {
            return RequiresOutcome::Satisfied;
        };

        if self.requires_in_progress.contains(&(node, field_name)) {
            return RequiresOutcome::Unsatisfiable;
        }

        let query_node = self.query_graph.graph.node(node);
        let has_key_to_resume = query_node.source.subgraph_id().is_some_and(|subgraph_id| {
            type_in_graph(self.supergraph, query_node.type_name, subgraph_id).is_some_and(|in_graph| {
                in_graph
                    .keys
                    .iter()
                    .any(|key| self.subgraphs.walk(*key).is_resolvable())
            })
        });

        if !has_key_to_resume {
            return RequiresOutcome::NoKeyToResume;
        }

        self.requires_in_progress.push((node, field_name));
        let satisfied = self.can_satisfy_selection(BTreeSet::from([node]), requires);
        self.requires_in_progress.pop();

        if satisfied {
            RequiresOutcome::Satisfied
        } else {
            RequiresOutcome::Unsatisfiable
        }
    }

    fn can_satisfy_selection(&mut self, options: BTreeSet<NodeId>, selection_set: &[Selection]) -> bool {
        for selection in selection_set {
            match selection {
                Selection::Field(selection) => {
                    let next = self.advance_field(&options, selection.field);

                    if next.is_empty() {
                        return false;
                    }

                    if !selection.subselection.is_empty() && !self.can_satisfy_selection(next, &selection.subselection)
                    {
                        return false;
                    }
                }
                Selection::InlineFragment { on, subselection, .. } => {
                    let next = self.advance_to_type(&options, *on);

                    if !next.is_empty() && !self.can_satisfy_selection(next, subselection) {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn describe_failure(
        &mut self,
        entry: Entry,
        state: &State,
        head_type: StringId,
        field_name: StringId,
        field_is_composite: bool,
    ) -> String {
        let subgraphs = self.subgraphs;
        let graph = &self.query_graph.graph;
        let coordinate = format!("{}.{}", &subgraphs[head_type], &subgraphs[field_name]);
        let field = self
            .supergraph
            .fields_of(head_type)
            .and_then(|fields| fields.get(&field_name));

        let mut reasons: IndexMap<&str, IndexSet<String>> = IndexMap::new();

        for option in &state.options {
            let node = graph.node(*option);
            let Some(subgraph_id) = node.source.subgraph_id() else {
                continue;
            };

            let mut details = self.direct_failures(*option, field_name);

            for (other_subgraph, in_graph) in field.into_iter().flat_map(|field| &field.by_graph) {
                if *other_subgraph == subgraph_id || in_graph.external {
                    continue;
                }

                let reached = self
                    .with_key_moves(&BTreeSet::from([*option]))
                    .into_iter()
                    .find(|reached| graph.node(*reached).source == NodeSource::Subgraph(*other_subgraph));

                match reached {
                    Some(reached) => details.extend(self.direct_failures(reached, field_name)),
                    None => details.extend(self.key_move_failures(
                        node.type_name,
                        subgraph_id,
                        *other_subgraph,
                        &coordinate,
                    )),
                }
            }

            reasons
                .entry(subgraphs.walk(subgraph_id).name())
                .or_default()
                .extend(details);
        }

        let mut message = format!(
            "The following supergraph API query:\n{}\ncannot be satisfied by the subgraphs because:",
            render_witness(entry, &state.path, &subgraphs[field_name], field_is_composite)
        );

        for (subgraph_name, details) in reasons {
            match details.len() {
                0 => (),
                1 => {
                    let detail = details.iter().next().map(String::as_str).unwrap_or_default();
                    write!(message, "\n- from subgraph \"{subgraph_name}\": {detail}.").ok();
                }
                _ => {
                    write!(message, "\n- from subgraph \"{subgraph_name}\":").ok();
                    for detail in details {
                        write!(message, "\n  - {detail}.").ok();
                    }
                }
            }
        }

        message
    }

    /// Why the node itself cannot resolve the field.
    fn direct_failures(&mut self, node: NodeId, field_name: StringId) -> Vec<String> {
        let subgraphs = self.subgraphs;
        let graph = &self.query_graph.graph;
        let query_node = graph.node(node);
        let Some(subgraph_id) = query_node.source.subgraph_id() else {
            return Vec::new();
        };

        let type_name = &subgraphs[query_node.type_name];
        let coordinate = format!("{type_name}.{}", &subgraphs[field_name]);
        let field = self
            .supergraph
            .fields_of(query_node.type_name)
            .and_then(|fields| fields.get(&field_name));

        let Some(in_graph) = field.and_then(|field| field.by_graph.get(&subgraph_id)) else {
            return vec![format!("cannot find field \"{coordinate}\"")];
        };

        let edges: Vec<&Edge> = graph
            .all_outgoing_edges(node)
            .map(|(_, edge)| edge)
            .filter(|edge| matches!(edge.r#move, Move::Field { name, .. } if name == field_name))
            .collect();

        if edges.is_empty() && in_graph.external {
            return vec![format!(
                "field \"{coordinate}\" is not resolvable because marked @external"
            )];
        }

        let mut details = Vec::new();

        for edge in edges {
            let Move::Field { condition, .. } = edge.r#move else {
                continue;
            };

            if edge.state == EdgeState::Ignored {
                let overriding = field
                    .and_then(|field| field.overridden_by(subgraphs.walk(subgraph_id).name_id()))
                    .map(|(overriding, _)| subgraphs.walk(overriding).name())
                    .unwrap_or_default();

                details.push(format!(
                    "field \"{coordinate}\" is overridden by subgraph \"{overriding}\""
                ));
                continue;
            }

            if let Some(condition) = condition.filter(|condition| !self.allows(Some(*condition))) {
                let state = if condition.active { "active" } else { "inactive" };
                details.push(format!(
                    "field \"{coordinate}\" is only resolved by subgraph \"{}\" when the override label \"{}\" is {state}",
                    subgraphs.walk(subgraph_id).name(),
                    &subgraphs[condition.label],
                ));
                continue;
            }

            match self.check_requires(node, field_name) {
                RequiresOutcome::Satisfied => (),
                RequiresOutcome::Unsatisfiable => {
                    details.push(format!("cannot satisfy @requires conditions on field \"{coordinate}\""));
                }
                RequiresOutcome::NoKeyToResume => details.push(format!(
                    "@requires condition on field \"{coordinate}\" can be satisfied but missing usable key on \"{type_name}\" in subgraph \"{}\" to resume query",
                    subgraphs.walk(subgraph_id).name(),
                )),
            }
        }

        details
    }

    /// Why no key move leads from one subgraph to another.
    fn key_move_failures(
        &self,
        type_name: StringId,
        from: SubgraphId,
        to: SubgraphId,
        coordinate: &str,
    ) -> Vec<String> {
        let subgraphs = self.subgraphs;
        let Some(target) = type_in_graph(self.supergraph, type_name, to) else {
            return Vec::new();
        };

        let type_name = &subgraphs[type_name];
        let to = subgraphs.walk(to).name();

        if target.keys.is_empty() {
            return vec![format!(
                "cannot move to subgraph \"{to}\", which has field \"{coordinate}\", because type \"{type_name}\" has no @key defined in subgraph \"{to}\""
            )];
        }

        let resolvable_keys: Vec<_> = target
            .keys
            .iter()
            .map(|key| subgraphs.walk(*key))
            .filter(|key| key.is_resolvable())
            .collect();

        if resolvable_keys.is_empty() {
            return vec![format!(
                "cannot move to subgraph \"{to}\", which has field \"{coordinate}\", because none of the @key defined on type \"{type_name}\" in subgraph \"{to}\" are resolvable (they are all declared with their \"resolvable\" argument set to false)"
            )];
        }

        let from = subgraphs.walk(from).name();

        resolvable_keys
            .into_iter()
            .map(|key| {
                format!(
                    "cannot move to subgraph \"{to}\" using @key(fields: \"{}\") of \"{type_name}\", the key field(s) cannot be resolved from subgraph \"{from}\"",
                    key.fields_display()
                )
            })
            .collect()
    }
}

pub(crate) fn type_in_graph(
    supergraph: &SupergraphState,
    type_name: StringId,
    subgraph_id: SubgraphId,
) -> Option<&TypeInGraph> {
    match supergraph.definition(type_name)? {
        MergedDefinition::Object(object) => object.by_graph.get(&subgraph_id),
        MergedDefinition::Interface(interface) => interface.by_graph.get(&subgraph_id),
        _ => None,
    }
}

fn extend_path(path: &[String], step: String) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(step);
    path
}

/// The smallest operation reaching the field, in the indented style of printed queries.
fn render_witness(entry: Entry, path: &[String], field_name: &str, field_is_composite: bool) -> String {
    let opener = match entry {
        Entry::Root(RootOperation::Query) => "{",
        Entry::Root(RootOperation::Mutation) => "mutation {",
        Entry::Root(RootOperation::Subscription) => "subscription {",
        Entry::Entity(_) => "query($representations: [_Any!]!) {",
    };

    let mut out = format!("{opener}\n");

    for (depth, step) in path.iter().enumerate() {
        writeln!(out, "{}{step} {{", "  ".repeat(depth + 1)).ok();
    }

    let indent = "  ".repeat(path.len() + 1);
    if field_is_composite {
        writeln!(out, "{indent}{field_name} {{\n{indent}  ...\n{indent}}}").ok();
    } else {
        writeln!(out, "{indent}{field_name}").ok();
    }

    for depth in (0..path.len()).rev() {
        writeln!(out, "{}}}", "  ".repeat(depth + 1)).ok();
    }

    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_nests_the_path() {
        let witness = render_witness(
            Entry::Root(RootOperation::Query),
            &["me".to_owned(), "... on Admin".to_owned()],
            "permissions",
            true,
        );

        assert_eq!(
            witness,
            "{\n  me {\n    ... on Admin {\n      permissions {\n        ...\n      }\n    }\n  }\n}"
        );

        let witness = render_witness(Entry::Root(RootOperation::Mutation), &[], "ping", false);
        assert_eq!(witness, "mutation {\n  ping\n}");
    }
}
