use super::*;

/// An entity interface key must be a key of every implementation in the same subgraph, so that
/// the implementation can be resolved from the interface key.
pub(super) struct InterfaceKeyNotOnImplementation;

impl ValidationRule for InterfaceKeyNotOnImplementation {
    fn interface_type(&mut self, ctx: &mut ValidationContext<'_>, interface: &InterfaceTypeState) {
        for (subgraph_id, in_graph) in &interface.by_graph {
            if in_graph.is_interface_object {
                continue;
            }

            let definition = ctx.subgraphs.walk(in_graph.definition_id);

            for key in definition.resolvable_keys() {
                let fields = key.fields_display();

                for implementer in definition.implementers() {
                    if implementer.keys().any(|implementer_key| implementer_key.fields_display() == fields) {
                        continue;
                    }

                    ctx.push_fatal(
                        ErrorCode::InterfaceKeyNotOnImplementation,
                        format!(
                            "[{}] Key @key(fields: \"{fields}\") on interface type \"{}\" is missing on implementation type \"{}\".",
                            ctx.subgraph_name(*subgraph_id),
                            definition.name(),
                            implementer.name(),
                        ),
                    );
                }
            }
        }
    }
}
