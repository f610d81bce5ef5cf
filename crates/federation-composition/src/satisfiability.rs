//! Can every field of the API schema be resolved by some subgraph?
//!
//! The subgraphs are turned into one query graph: a node per composite type per subgraph, with
//! field moves inside a subgraph and key moves between them. The supergraph is walked from its
//! root types while tracking the set of subgraph nodes a query planner could be at. A field none
//! of them can take, even after jumping to another subgraph through a key, is an error.

mod build;
mod graph;
mod supergraph_view;
mod walk;

use self::{
    graph::{NodeId, NodeSource},
    supergraph_view::SupergraphView,
    walk::{Entry, Report, Traversal},
};
use crate::{
    diagnostics::{Diagnostics, ErrorCode},
    subgraphs::{RootOperation, Subgraphs},
    supergraph::{MergedDefinition, SupergraphState},
};
use std::collections::BTreeSet;

pub(crate) fn validate_satisfiability(subgraphs: &Subgraphs, supergraph: &SupergraphState, diagnostics: &mut Diagnostics) {
    let _span = tracing::debug_span!("satisfiability").entered();

    let query_graph = build::build_query_graph(subgraphs, supergraph);
    let mut view = SupergraphView::new(supergraph);
    let starts = entry_points(subgraphs, supergraph, &query_graph.graph, &mut view);

    // Each override label is walked both ways: all inactive, then one at a time active.
    let mut label_states = vec![BTreeSet::new()];
    label_states.extend(query_graph.labels.iter().map(|label| BTreeSet::from([*label])));

    let mut report = Report::default();

    for active_labels in label_states {
        let mut traversal = Traversal::new(subgraphs, supergraph, &query_graph, &view, active_labels);

        for (entry, node, options) in &starts {
            traversal.walk(*entry, *node, options.clone(), &mut report);
        }
    }

    for error in report.errors {
        diagnostics.push_fatal(ErrorCode::SatisfiabilityError, error);
    }
}

fn entry_points(
    subgraphs: &Subgraphs,
    supergraph: &SupergraphState,
    query_graph: &graph::Graph,
    view: &mut SupergraphView,
) -> Vec<(Entry, NodeId, BTreeSet<NodeId>)> {
    let mut starts = Vec::new();
    let mut roots = Vec::new();

    for root in RootOperation::ALL {
        let Some(object) = supergraph.root(subgraphs, root) else {
            continue;
        };

        let Some(node) = view.graph.find_node(object.name, NodeSource::Supergraph) else {
            continue;
        };

        let options = object
            .by_graph
            .keys()
            .filter_map(|subgraph_id| query_graph.find_node(object.name, NodeSource::Subgraph(*subgraph_id)))
            .collect();

        roots.push(object.name);
        starts.push((Entry::Root(root), node, options));
    }

    for definition in supergraph.definitions.values() {
        let MergedDefinition::Object(object) = definition else {
            continue;
        };

        if object.metadata.inaccessible
            || roots
                .iter()
                .any(|root| view.can_reach_type_from_type(*root, object.name))
        {
            continue;
        }

        let options: BTreeSet<NodeId> = object
            .by_graph
            .iter()
            .filter(|(_, in_graph)| {
                in_graph
                    .keys
                    .iter()
                    .any(|key| subgraphs.walk(*key).is_resolvable())
            })
            .filter_map(|(subgraph_id, _)| query_graph.find_node(object.name, NodeSource::Subgraph(*subgraph_id)))
            .collect();

        let Some(node) = view.graph.find_node(object.name, NodeSource::Supergraph) else {
            continue;
        };

        if !options.is_empty() {
            starts.push((Entry::Entity(object.name), node, options));
        }
    }

    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satisfiability_errors(sdls: &[(&str, &str)]) -> Vec<String> {
        let mut subgraphs = Subgraphs::default();
        for (name, sdl) in sdls {
            subgraphs.ingest_str(sdl, name, Some("http://example.com")).unwrap();
        }

        let supergraph = SupergraphState::build(&subgraphs).unwrap();
        let mut diagnostics = Diagnostics::default();
        validate_satisfiability(&subgraphs, &supergraph, &mut diagnostics);

        diagnostics.iter_errors().map(str::to_owned).collect()
    }

    const FED2: &str = r#"extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@shareable", "@external", "@requires", "@provides", "@override"])"#;

    #[test]
    fn entities_jump_between_subgraphs() {
        let accounts = format!(
            r#"{FED2}
            type Query {{ me: User }}
            type User @key(fields: "id") {{ id: ID! name: String }}"#
        );
        let reviews = format!(
            r#"{FED2}
            type User @key(fields: "id") {{ id: ID! reviews: [Review] }}
            type Review {{ body: String author: User }}"#
        );

        assert!(satisfiability_errors(&[("accounts", &accounts), ("reviews", &reviews)]).is_empty());
    }

    #[test]
    fn unresolvable_keys_block_the_jump() {
        let a = format!(
            r#"{FED2}
            type Query {{ a: A }}
            type A @key(fields: "id") {{ id: ID! x: Int }}"#
        );
        let b = format!(
            r#"{FED2}
            type A @key(fields: "id", resolvable: false) {{ id: ID! y: Int }}"#
        );

        let errors = satisfiability_errors(&[("a", &a), ("b", &b)]);

        pretty_assertions::assert_eq!(
            errors,
            vec![
                "The following supergraph API query:\n{\n  a {\n    y\n  }\n}\ncannot be satisfied by the subgraphs because:\n- from subgraph \"a\":\n  - cannot find field \"A.y\".\n  - cannot move to subgraph \"b\", which has field \"A.y\", because none of the @key defined on type \"A\" in subgraph \"b\" are resolvable (they are all declared with their \"resolvable\" argument set to false)."
                    .to_owned()
            ]
        );
    }

    #[test]
    fn requires_are_resolved_from_other_subgraphs() {
        let products = format!(
            r#"{FED2}
            type Query {{ products: [Product] }}
            type Product @key(fields: "id") {{ id: ID! weight: Int }}"#
        );
        let shipping = format!(
            r#"{FED2}
            type Product @key(fields: "id") {{
              id: ID!
              weight: Int @external
              shippingEstimate: Int @requires(fields: "weight")
            }}"#
        );

        assert!(satisfiability_errors(&[("products", &products), ("shipping", &shipping)]).is_empty());
    }

    #[test]
    fn provided_fields_are_only_reachable_through_the_providing_field() {
        let inventory = format!(
            r#"{FED2}
            type Query {{ topProducts: [Product] @provides(fields: "name") }}
            type Product {{ id: ID! name: String @external }}"#
        );
        let catalog = format!(
            r#"{FED2}
            type Query {{ product: Product @shareable }}
            type Product {{ id: ID! @shareable name: String @shareable }}"#
        );

        let errors = satisfiability_errors(&[("inventory", &inventory), ("catalog", &catalog)]);
        assert!(errors.is_empty(), "{errors:#?}");
    }

    #[test]
    fn errors_are_reported_once_per_field() {
        let a = format!(
            r#"{FED2}
            type Query {{ first: T second: T }}
            type T {{ id: ID! }}"#
        );
        let b = format!(
            r#"{FED2}
            type T {{ id: ID! @shareable extra: Int }}"#
        );

        let errors = satisfiability_errors(&[("a", &a), ("b", &b)]);
        assert_eq!(errors.len(), 1, "{errors:#?}");
        assert!(errors[0].contains("cannot find field \"T.extra\""));
        assert!(errors[0].contains("type \"T\" has no @key defined in subgraph \"b\""));
    }
}
