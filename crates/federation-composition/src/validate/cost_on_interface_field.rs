use super::*;

pub(super) struct CostOnInterfaceField;

impl ValidationRule for CostOnInterfaceField {
    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        for (subgraph_id, in_graph) in &field.by_graph {
            let is_interface_object = interface
                .by_graph
                .get(subgraph_id)
                .is_some_and(|in_graph| in_graph.is_interface_object);

            if is_interface_object || ctx.subgraphs.walk(in_graph.field_id).directives().cost.is_none() {
                continue;
            }

            ctx.push_fatal(
                ErrorCode::CostAppliedToInterfaceField,
                format!(
                    "[{}] @cost cannot be applied to interface \"{}\"",
                    ctx.subgraph_name(*subgraph_id),
                    ctx.coordinate(interface.name, field.name),
                ),
            );
        }
    }
}
