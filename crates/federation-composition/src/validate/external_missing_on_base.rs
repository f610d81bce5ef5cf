use super::*;
use crate::supergraph::TypeInGraph;
use indexmap::{IndexMap, IndexSet};

/// A field that is `@external` everywhere has no subgraph resolving it.
pub(super) struct ExternalMissingOnBase;

impl ValidationRule for ExternalMissingOnBase {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        check(ctx, object.name, &object.by_graph, &object.interfaces, field);
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        check(ctx, interface.name, &interface.by_graph, &interface.interfaces, field);
    }
}

fn check(
    ctx: &mut ValidationContext<'_>,
    parent: StringId,
    parent_by_graph: &IndexMap<SubgraphId, TypeInGraph>,
    interfaces: &IndexSet<StringId>,
    field: &FieldState,
) {
    if field.by_graph.is_empty() || !field.by_graph.values().all(|in_graph| in_graph.external) {
        return;
    }

    // Key stubs on extensions: `extend type User @key(fields: "id") { id: ID! @external }`.
    let is_key_stub = field.by_graph.iter().all(|(subgraph_id, in_graph)| {
        in_graph.used_as_key
            && parent_by_graph
                .get(subgraph_id)
                .is_some_and(|parent_in_graph| parent_in_graph.is_extension)
    });

    if is_key_stub || is_resolved_by_interface_object(ctx, interfaces, field) {
        return;
    }

    let subgraphs = human_readable_subgraphs(field.by_graph.keys().map(|id| ctx.subgraph_name(*id)));

    ctx.push_fatal(
        ErrorCode::ExternalMissingOnBase,
        format!(
            "Field \"{}\" is marked @external on all the subgraphs in which it is listed ({subgraphs}).",
            ctx.coordinate(parent, field.name)
        ),
    );
}

fn is_resolved_by_interface_object(ctx: &ValidationContext<'_>, interfaces: &IndexSet<StringId>, field: &FieldState) -> bool {
    interfaces
        .iter()
        .filter_map(|name| ctx.supergraph.interface(*name))
        .any(|interface| {
            let Some(interface_field) = interface.fields.get(&field.name) else {
                return false;
            };

            interface.interface_object_subgraphs().any(|subgraph_id| {
                interface_field
                    .by_graph
                    .get(&subgraph_id)
                    .is_some_and(|in_graph| !in_graph.external)
            })
        })
}
