use super::*;
use crate::subgraphs::{DefinitionKind, DefinitionWalker, FieldWalker, KeyWalker, Selection};

/// `@key`, `@requires` and `@provides` field sets must select existing fields, with the right
/// `@external` markers.
pub(super) struct FieldSetSelections;

impl ValidationRule for FieldSetSelections {
    fn object_type(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState) {
        for in_graph in object.by_graph.values() {
            let definition = ctx.subgraphs.walk(in_graph.definition_id);
            check_keys(ctx, definition);
        }
    }

    fn interface_type(&mut self, ctx: &mut ValidationContext<'_>, interface: &InterfaceTypeState) {
        for in_graph in interface.by_graph.values() {
            let definition = ctx.subgraphs.walk(in_graph.definition_id);
            check_keys(ctx, definition);
        }
    }

    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, _object: &ObjectTypeState, field: &FieldState) {
        check_field(ctx, field);
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        _interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        check_field(ctx, field);
    }
}

enum Problem<'a> {
    UnknownField { parent: &'a str, field: &'a str },
    UnknownType(&'a str),
}

impl std::fmt::Display for Problem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::UnknownField { parent, field } => write!(f, "Cannot query field \"{field}\" on type \"{parent}\""),
            Problem::UnknownType(name) => write!(f, "Unknown type \"{name}\""),
        }
    }
}

fn find_problem<'a>(definition: DefinitionWalker<'a>, selection_set: &'a [Selection]) -> Option<Problem<'a>> {
    let subgraphs = definition.subgraphs;

    for selection in selection_set {
        match selection {
            Selection::Field(selection) => {
                let name = &subgraphs[selection.field];

                if name == "__typename" {
                    continue;
                }

                let Some(field) = definition.field_by_name_id(selection.field) else {
                    return Some(Problem::UnknownField {
                        parent: definition.name(),
                        field: name,
                    });
                };

                if selection.subselection.is_empty() {
                    continue;
                }

                if let Some(problem) = field
                    .type_definition()
                    .and_then(|definition| find_problem(definition, &selection.subselection))
                {
                    return Some(problem);
                }
            }
            Selection::InlineFragment { on, subselection, .. } => {
                let Some(fragment_definition) = subgraphs
                    .definition_by_name_id(*on, definition.subgraph_id())
                    .map(|id| subgraphs.walk(id))
                else {
                    return Some(Problem::UnknownType(&subgraphs[*on]));
                };

                if let Some(problem) = find_problem(fragment_definition, subselection) {
                    return Some(problem);
                }
            }
        }
    }

    None
}

fn check_keys(ctx: &mut ValidationContext<'_>, definition: DefinitionWalker<'_>) {
    for key in definition.keys() {
        if let Some(problem) = find_problem(definition, key.selection_set()) {
            ctx.push_fatal(
                ErrorCode::KeyInvalidFields,
                format!(
                    "[{}] On type \"{}\", for @key(fields: \"{}\"): {problem} (the field should either be added to this subgraph or, if it should not be resolved by this subgraph, you need to add it to this subgraph with @external).",
                    definition.subgraph().name(),
                    definition.name(),
                    key.fields_display(),
                ),
            );
        }

        check_key_field_arguments(ctx, key);
    }
}

/// Key fields are fetched without arguments.
fn check_key_field_arguments(ctx: &mut ValidationContext<'_>, key: KeyWalker<'_>) {
    let definition = key.definition();

    for selection in key.selection_set() {
        let Selection::Field(selection) = selection else {
            continue;
        };

        let Some(field) = definition.field_by_name_id(selection.field) else {
            continue;
        };

        if !field.arguments().is_empty() {
            ctx.push_fatal(
                ErrorCode::KeyInvalidFields,
                format!(
                    "[{}] On type \"{}\", for @key(fields: \"{}\"): field \"{}\" cannot be included because it has arguments (fields with argument are not allowed in @key)",
                    definition.subgraph().name(),
                    definition.name(),
                    key.fields_display(),
                    field.coordinate(),
                ),
            );
        }
    }
}

fn check_field(ctx: &mut ValidationContext<'_>, field: &FieldState) {
    for in_graph in field.by_graph.values() {
        let field = ctx.subgraphs.walk(in_graph.field_id);

        if let Some(requires) = &field.directives().requires {
            check_requires(ctx, field, &requires.selection_set);
        }

        if let Some(provides) = &field.directives().provides {
            check_provides(ctx, field, &provides.selection_set);
        }
    }
}

fn check_requires(ctx: &mut ValidationContext<'_>, field: FieldWalker<'_>, selection_set: &[Selection]) {
    let parent = field.parent_definition();
    let subgraph_name = parent.subgraph().name();
    let fields = ctx.subgraphs.render_selection_set(selection_set);

    if let Some(problem) = find_problem(parent, selection_set) {
        ctx.push_fatal(
            ErrorCode::RequiresInvalidFields,
            format!(
                "[{subgraph_name}] On field \"{}\", for @requires(fields: \"{fields}\"): {problem} (if the field is defined in another subgraph, you need to add it to this subgraph with @external).",
                field.coordinate(),
            ),
        );
        return;
    }

    for selected in top_level_fields(parent, selection_set) {
        if selected.is_external() || selected.is_used_as_key() {
            continue;
        }

        ctx.push_fatal(
            ErrorCode::RequiresFieldsMissingExternal,
            format!(
                "[{subgraph_name}] On field \"{}\", for @requires(fields: \"{fields}\"): field \"{}\" should not be part of a @requires since it is already provided by this subgraph (it is not marked @external)",
                field.coordinate(),
                selected.coordinate(),
            ),
        );
    }
}

fn check_provides(ctx: &mut ValidationContext<'_>, field: FieldWalker<'_>, selection_set: &[Selection]) {
    let subgraph = field.parent_definition().subgraph();
    let fields = ctx.subgraphs.render_selection_set(selection_set);

    let target = field
        .type_definition()
        .filter(|definition| definition.kind().is_composite());

    let Some(target) = target else {
        ctx.push_fatal(
            ErrorCode::ProvidesOnNonObjectField,
            format!(
                "[{}] Invalid @provides directive on field \"{}\": field has type \"{}\" which is not a Composite Type",
                subgraph.name(),
                field.coordinate(),
                field.r#type().display(ctx.subgraphs),
            ),
        );
        return;
    };

    if let Some(problem) = find_problem(target, selection_set) {
        ctx.push_fatal(
            ErrorCode::ProvidesInvalidFields,
            format!(
                "[{}] On field \"{}\", for @provides(fields: \"{fields}\"): {problem} (if the field is defined in another subgraph, you need to add it to this subgraph with @external).",
                subgraph.name(),
                field.coordinate(),
            ),
        );
        return;
    }

    if subgraph.federation_version().is_v1() || target.kind() == DefinitionKind::Union {
        return;
    }

    for selected in top_level_fields(target, selection_set) {
        if selected.is_external() || selected.is_used_as_key() {
            continue;
        }

        ctx.push_fatal(
            ErrorCode::ProvidesFieldsMissingExternal,
            format!(
                "[{}] On field \"{}\", for @provides(fields: \"{fields}\"): field \"{}\" should not be part of a @provides since it is already provided by this subgraph (it is not marked @external)",
                subgraph.name(),
                field.coordinate(),
                selected.coordinate(),
            ),
        );
    }
}

fn top_level_fields<'a>(
    definition: DefinitionWalker<'a>,
    selection_set: &'a [Selection],
) -> impl Iterator<Item = FieldWalker<'a>> + 'a {
    selection_set.iter().filter_map(move |selection| match selection {
        Selection::Field(selection) => definition.field_by_name_id(selection.field),
        Selection::InlineFragment { .. } => None,
    })
}
