use super::*;

/// A field resolved by more than one subgraph must be shareable in all of them.
pub(super) struct InvalidFieldSharing;

struct Resolver {
    subgraph_id: SubgraphId,
    shareable: bool,
}

impl ValidationRule for InvalidFieldSharing {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        let mut resolvers: Vec<Resolver> = field
            .by_graph
            .iter()
            .filter(|(subgraph_id, in_graph)| {
                !in_graph.external
                    && field
                        .overridden_by(ctx.subgraphs.walk(**subgraph_id).name_id())
                        .is_none()
            })
            .map(|(subgraph_id, in_graph)| Resolver {
                subgraph_id: *subgraph_id,
                shareable: in_graph.shareable || in_graph.used_as_key,
            })
            .collect();

        // Subgraphs only knowing the object through an `@interfaceObject` resolve the field too.
        for interface in object.interfaces.iter().filter_map(|name| ctx.supergraph.interface(*name)) {
            let Some(interface_field) = interface.fields.get(&field.name) else {
                continue;
            };

            for subgraph_id in interface.interface_object_subgraphs() {
                if resolvers.iter().any(|resolver| resolver.subgraph_id == subgraph_id) {
                    continue;
                }

                if let Some(in_graph) = interface_field.by_graph.get(&subgraph_id).filter(|f| !f.external) {
                    resolvers.push(Resolver {
                        subgraph_id,
                        shareable: in_graph.shareable || in_graph.used_as_key,
                    });
                }
            }
        }

        check(ctx, object.name, field, &resolvers);
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        let resolvers: Vec<Resolver> = interface
            .interface_object_subgraphs()
            .filter_map(|subgraph_id| {
                let in_graph = field.by_graph.get(&subgraph_id).filter(|f| !f.external)?;
                Some(Resolver {
                    subgraph_id,
                    shareable: in_graph.shareable || in_graph.used_as_key,
                })
            })
            .collect();

        check(ctx, interface.name, field, &resolvers);
    }
}

fn check(ctx: &mut ValidationContext<'_>, parent: StringId, field: &FieldState, resolvers: &[Resolver]) {
    if resolvers.len() < 2 {
        return;
    }

    let coordinate = ctx.coordinate(parent, field.name);
    let resolving_subgraphs = human_readable_subgraphs(resolvers.iter().map(|r| ctx.subgraph_name(r.subgraph_id)));

    if ctx.str(parent) == "Subscription" {
        ctx.push_fatal(
            ErrorCode::InvalidFieldSharing,
            format!(
                "Fields on root level subscription object cannot be marked as shareable: \"{coordinate}\" is resolved from {resolving_subgraphs}"
            ),
        );
        return;
    }

    let non_shareable: Vec<&str> = resolvers
        .iter()
        .filter(|resolver| !resolver.shareable)
        .map(|resolver| ctx.subgraph_name(resolver.subgraph_id))
        .collect();

    if non_shareable.is_empty() {
        return;
    }

    let defined_as = if non_shareable.len() == resolvers.len() {
        String::from("all of them")
    } else {
        human_readable_subgraphs(non_shareable)
    };

    ctx.push_fatal(
        ErrorCode::InvalidFieldSharing,
        format!(
            "Non-shareable field \"{coordinate}\" is resolved from multiple subgraphs: it is resolved from {resolving_subgraphs} and defined as non-shareable in {defined_as}"
        ),
    );
}
