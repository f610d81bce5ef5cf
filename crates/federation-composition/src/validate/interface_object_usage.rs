use super::*;

/// `@interfaceObject` needs an entity interface somewhere to resolve the concrete types, and the
/// subgraphs with that interface key must know every implementation.
pub(super) struct InterfaceObjectUsage;

impl ValidationRule for InterfaceObjectUsage {
    fn interface_type(&mut self, ctx: &mut ValidationContext<'_>, interface: &InterfaceTypeState) {
        let interface_name = ctx.str(interface.name);

        for (subgraph_id, in_graph) in &interface.by_graph {
            if in_graph.is_interface_object && in_graph.keys.is_empty() {
                ctx.push_fatal(
                    ErrorCode::InterfaceObjectUsageError,
                    format!(
                        "[{}] The @interfaceObject directive can only be applied to entity types but type \"{interface_name}\" has no @key in this subgraph.",
                        ctx.subgraph_name(*subgraph_id),
                    ),
                );
            }
        }

        let interface_objects: Vec<&str> = interface
            .interface_object_subgraphs()
            .map(|id| ctx.subgraph_name(id))
            .collect();

        if !interface_objects.is_empty() && interface.by_graph.values().all(|in_graph| in_graph.is_interface_object) {
            ctx.push_fatal(
                ErrorCode::InterfaceObjectUsageError,
                format!(
                    "Type \"{interface_name}\" is declared with @interfaceObject in all the subgraphs in which is is defined (it is defined in {} but should be defined as an interface in at least one subgraph)",
                    human_readable_subgraphs(interface_objects),
                ),
            );
        }

        for (subgraph_id, in_graph) in &interface.by_graph {
            if in_graph.is_interface_object {
                continue;
            }

            let definition = ctx.subgraphs.walk(in_graph.definition_id);

            let Some(key) = definition.resolvable_keys().next() else {
                continue;
            };

            let missing: Vec<&str> = interface
                .implementations
                .iter()
                .filter(|implementation| ctx.supergraph.object(**implementation).is_some())
                .filter(|implementation| {
                    ctx.subgraphs
                        .definition_by_name_id(**implementation, *subgraph_id)
                        .is_none()
                })
                .map(|implementation| ctx.str(*implementation))
                .collect();

            if missing.is_empty() {
                continue;
            }

            let subgraph_name = ctx.subgraph_name(*subgraph_id);
            let missing = missing.iter().map(|name| format!("\"{name}\"")).join(", ");

            ctx.push_fatal(
                ErrorCode::InterfaceKeyMissingImplementationType,
                format!(
                    "[{subgraph_name}] Interface type \"{interface_name}\" has a resolvable key (@key(fields: \"{}\")) in subgraph \"{subgraph_name}\" but that subgraph is missing some of the supergraph implementation types of \"{interface_name}\". Subgraph \"{subgraph_name}\" should define {missing} (and have them implement \"{interface_name}\").",
                    key.fields_display(),
                ),
            );
        }
    }
}
