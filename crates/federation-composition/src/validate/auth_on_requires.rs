use super::*;
use crate::{subgraphs::Selection, supergraph::AuthRequirements};

/// A field with `@requires` gets the required data on behalf of the client. It must itself ask for
/// at least the access the required fields ask for.
pub(super) struct AuthOnRequires;

impl ValidationRule for AuthOnRequires {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        for (subgraph_id, in_graph) in &field.by_graph {
            let field_in_subgraph = ctx.subgraphs.walk(in_graph.field_id);

            let Some(requires) = &field_in_subgraph.directives().requires else {
                continue;
            };

            let provisioned = AuthRequirements::from_site(ctx.subgraphs, field_in_subgraph.directives()).merged(
                &AuthRequirements::from_site(ctx.subgraphs, field_in_subgraph.parent_definition().directives()),
            );

            let Some(target) = find_unsatisfied(ctx, object.name, &requires.selection_set, &provisioned) else {
                continue;
            };

            ctx.push_fatal(
                ErrorCode::MissingTransitiveAuthRequirements,
                format!(
                    "[{}] Field \"{}\" does not specify necessary @authenticated, @requiresScopes and/or @policy auth requirements to access the transitive field \"{target}\" data from @requires selection set.",
                    ctx.subgraph_name(*subgraph_id),
                    ctx.coordinate(object.name, field.name),
                ),
            );
        }
    }
}

/// The first coordinate of the selection whose requirements are not met by `provisioned`.
fn find_unsatisfied(
    ctx: &ValidationContext<'_>,
    parent_type: StringId,
    selection_set: &[Selection],
    provisioned: &AuthRequirements,
) -> Option<String> {
    for selection in selection_set {
        match selection {
            Selection::Field(selection) => {
                if ctx.str(selection.field) == "__typename" {
                    continue;
                }

                let Some(target) = ctx
                    .supergraph
                    .fields_of(parent_type)
                    .and_then(|fields| fields.get(&selection.field))
                else {
                    continue;
                };

                let required = required_access(ctx, parent_type, target);

                if !provisioned.satisfies(&required) {
                    return Some(ctx.coordinate(parent_type, selection.field));
                }

                if !selection.subselection.is_empty() {
                    if let Some(found) = find_unsatisfied(ctx, target.r#type.name, &selection.subselection, provisioned) {
                        return Some(found);
                    }
                }
            }
            Selection::InlineFragment { on, subselection, .. } => {
                if let Some(definition) = ctx.supergraph.definition(*on) {
                    if !provisioned.satisfies(&definition.metadata().auth) {
                        return Some(ctx.str(*on).to_owned());
                    }
                }

                if let Some(found) = find_unsatisfied(ctx, *on, subselection, provisioned) {
                    return Some(found);
                }
            }
        }
    }

    None
}

/// The field's own requirements and its parent type's. A field of an interface contributed by an
/// `@interfaceObject` is resolved through the implementations, so theirs count too.
fn required_access(ctx: &ValidationContext<'_>, parent_type: StringId, field: &FieldState) -> AuthRequirements {
    let mut required = field.metadata.auth.clone();

    if let Some(parent) = ctx.supergraph.definition(parent_type) {
        required.merge(&parent.metadata().auth);
    }

    let Some(interface) = ctx.supergraph.interface(parent_type) else {
        return required;
    };

    if interface.interface_object_subgraphs().next().is_none() {
        return required;
    }

    for implementation in &interface.implementations {
        if let Some(definition) = ctx.supergraph.definition(*implementation) {
            required.merge(&definition.metadata().auth);
        }

        if let Some(implementation_field) = ctx
            .supergraph
            .fields_of(*implementation)
            .and_then(|fields| fields.get(&field.name))
        {
            required.merge(&implementation_field.metadata.auth);
        }
    }

    required
}
