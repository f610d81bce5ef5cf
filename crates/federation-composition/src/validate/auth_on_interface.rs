use super::*;

/// Auth directives belong on the object types and their fields.
pub(super) struct AuthOnInterface;

impl ValidationRule for AuthOnInterface {
    fn interface_type(&mut self, ctx: &mut ValidationContext<'_>, interface: &InterfaceTypeState) {
        for (subgraph_id, in_graph) in &interface.by_graph {
            let definition = ctx.subgraphs.walk(in_graph.definition_id);
            let kind = if in_graph.is_interface_object {
                "interface object"
            } else {
                "interface"
            };

            for directive in definition.directives().auth_directive_names() {
                ctx.push_fatal(
                    ErrorCode::AuthRequirementsAppliedOnInterface,
                    format!(
                        "[{}] Invalid use of {directive} on {kind} \"{}\": {directive} cannot be applied on interfaces, interface objects or their fields",
                        ctx.subgraph_name(*subgraph_id),
                        ctx.str(interface.name),
                    ),
                );
            }
        }
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        for (subgraph_id, in_graph) in &field.by_graph {
            let field_in_subgraph = ctx.subgraphs.walk(in_graph.field_id);

            for directive in field_in_subgraph.directives().auth_directive_names() {
                ctx.push_fatal(
                    ErrorCode::AuthRequirementsAppliedOnInterface,
                    format!(
                        "[{}] Invalid use of {directive} on field \"{}\": {directive} cannot be applied on interfaces, interface objects or their fields",
                        ctx.subgraph_name(*subgraph_id),
                        ctx.coordinate(interface.name, field.name),
                    ),
                );
            }
        }
    }
}
