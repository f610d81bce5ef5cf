use super::*;

/// `@listSize` placement and arguments. Implementations of an interface field slice on the same
/// arguments as the interface field.
pub(super) struct ListSizeSlicingArguments;

impl ValidationRule for ListSizeSlicingArguments {
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
        check_implementations(ctx, interface, field);
    }
}

fn check_implementations(ctx: &mut ValidationContext<'_>, interface: &InterfaceTypeState, field: &FieldState) {
    let Some(expected) = slicing_arguments(ctx, field) else {
        return;
    };

    for implementation in &interface.implementations {
        let implementation_field = ctx
            .supergraph
            .object(*implementation)
            .and_then(|object| object.fields.get(&field.name))
            .or_else(|| {
                ctx.supergraph
                    .interface(*implementation)
                    .and_then(|interface| interface.fields.get(&field.name))
            });

        let Some(actual) = implementation_field.and_then(|field| slicing_arguments(ctx, field)) else {
            continue;
        };

        if same_arguments(&expected, &actual) {
            continue;
        }

        ctx.push_fatal(
            ErrorCode::ListSizeInvalidSlicingArgument,
            format!(
                "Slicing arguments [{}] of @listSize on \"{}\" do not match the slicing arguments [{}] of the interface field \"{}\"",
                quoted(ctx, &actual),
                ctx.coordinate(*implementation, field.name),
                quoted(ctx, &expected),
                ctx.coordinate(interface.name, field.name),
            ),
        );
    }
}

/// Merged slicing arguments, `None` without `@listSize` or without slicing arguments.
fn slicing_arguments(ctx: &ValidationContext<'_>, field: &FieldState) -> Option<Vec<StringId>> {
    field
        .merge_list_size(ctx.subgraphs)
        .merged
        .map(|list_size| list_size.slicing_arguments)
        .filter(|arguments| !arguments.is_empty())
}

fn same_arguments(left: &[StringId], right: &[StringId]) -> bool {
    left.len() == right.len() && left.iter().all(|argument| right.contains(argument))
}

fn quoted(ctx: &ValidationContext<'_>, arguments: &[StringId]) -> String {
    arguments.iter().map(|argument| format!("\"{}\"", ctx.str(*argument))).join(", ")
}

fn check(ctx: &mut ValidationContext<'_>, parent: StringId, field: &FieldState) {
    let coordinate = ctx.coordinate(parent, field.name);

    for (subgraph_id, in_graph) in &field.by_graph {
        let Some(list_size) = &in_graph.list_size else {
            continue;
        };

        let subgraph_name = ctx.subgraph_name(*subgraph_id);

        if !in_graph.r#type.wrapping.is_list() && list_size.sized_fields.is_empty() {
            ctx.push_fatal(
                ErrorCode::ListSizeAppliedToNonList,
                format!("[{subgraph_name}] \"{coordinate}\" is not a list"),
            );
        }

        let type_definition = ctx.subgraphs.walk(in_graph.field_id).type_definition();

        for sized_field in &list_size.sized_fields {
            let sized = type_definition.and_then(|definition| definition.field_by_name_id(*sized_field));

            let problem = match sized {
                None => "is not a field",
                Some(sized) if !sized.r#type().wrapping.is_list() => "is not a list",
                Some(_) => continue,
            };

            ctx.push_fatal(
                ErrorCode::ListSizeInvalidSizedField,
                format!(
                    "[{subgraph_name}] Sized field \"{}\" of @listSize on \"{coordinate}\" {problem} on type \"{}\"",
                    ctx.str(*sized_field),
                    ctx.str(in_graph.r#type.name),
                ),
            );
        }
    }

    for argument in field.merge_list_size(ctx.subgraphs).dropped_slicing_arguments {
        ctx.push_warning(
            ErrorCode::ListSizeInvalidSlicingArgument,
            format!(
                "Slicing argument \"{}\" of @listSize on \"{coordinate}\" is not an argument of the field in every subgraph defining it, it was removed",
                ctx.str(argument),
            ),
        );
    }
}
