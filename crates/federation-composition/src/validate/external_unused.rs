use super::*;

/// In federation v2 subgraphs, `@external` fields must be used by a key, a `@requires`, a
/// `@provides`, or be there to implement an interface.
pub(super) struct ExternalUnused;

impl ValidationRule for ExternalUnused {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        check(ctx, object.name, field);
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        check(ctx, interface.name, field);
    }
}

fn check(ctx: &mut ValidationContext<'_>, parent: StringId, field: &FieldState) {
    for (subgraph_id, in_graph) in &field.by_graph {
        if !in_graph.external || in_graph.used_as_key || in_graph.used_in_field_set {
            continue;
        }

        let subgraph = ctx.subgraphs.walk(*subgraph_id);

        if subgraph.federation_version().is_v1() {
            continue;
        }

        let implements_interface_field = ctx
            .subgraphs
            .walk(in_graph.field_id)
            .parent_definition()
            .interfaces()
            .any(|interface| interface.field_by_name_id(field.name).is_some());

        if implements_interface_field {
            continue;
        }

        ctx.push_fatal(
            ErrorCode::ExternalUnused,
            format!(
                "[{}] Field \"{}\" is marked @external but is not used in any federation directive (@key, @provides, @requires) or to satisfy an interface; the field declaration has no use and should be removed (or the field should not be @external).",
                subgraph.name(),
                ctx.coordinate(parent, field.name),
            ),
        );
    }
}
