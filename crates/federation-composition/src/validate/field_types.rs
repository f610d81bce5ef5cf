use super::*;
use crate::subgraphs::FieldType;
use indexmap::IndexMap;

/// Field and argument types must be compatible across subgraphs.
pub(super) struct FieldTypes;

impl ValidationRule for FieldTypes {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        check_field(ctx, object.name, field);
    }

    fn interface_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        interface: &InterfaceTypeState,
        field: &FieldState,
    ) {
        check_field(ctx, interface.name, field);
    }

    fn input_object_type_field(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        input_object: &InputObjectTypeState,
        field: &InputValueState,
    ) {
        if field.type_mismatch {
            let types = describe_types(ctx, field.by_graph.iter().map(|(id, r#type)| (*id, *r#type)));
            ctx.push_fatal(
                ErrorCode::FieldTypeMismatch,
                format!(
                    "Type of field \"{}\" is incompatible across subgraphs: {types}",
                    ctx.coordinate(input_object.name, field.name)
                ),
            );
        }
    }
}

fn check_field(ctx: &mut ValidationContext<'_>, parent: StringId, field: &FieldState) {
    let coordinate = ctx.coordinate(parent, field.name);

    if field.type_mismatch {
        let types = describe_types(ctx, field.by_graph.iter().map(|(id, in_graph)| (*id, in_graph.r#type)));
        ctx.push_fatal(
            ErrorCode::FieldTypeMismatch,
            format!("Type of field \"{coordinate}\" is incompatible across subgraphs: {types}"),
        );
    }

    for argument in field.arguments.values().filter(|argument| argument.type_mismatch) {
        let types = describe_types(ctx, argument.by_graph.iter().map(|(id, r#type)| (*id, *r#type)));
        ctx.push_fatal(
            ErrorCode::FieldArgumentTypeMismatch,
            format!(
                "Type of argument \"{coordinate}({}:)\" is incompatible across subgraphs: {types}",
                ctx.str(argument.name)
            ),
        );
    }
}

/// `it has type "Int" in subgraph "a" but type "String" in subgraphs "b" and "c"`
fn describe_types(ctx: &ValidationContext<'_>, types: impl Iterator<Item = (SubgraphId, FieldType)>) -> String {
    let mut by_type: IndexMap<String, Vec<&str>> = IndexMap::new();

    for (subgraph_id, r#type) in types {
        by_type
            .entry(r#type.display(ctx.subgraphs))
            .or_default()
            .push(ctx.subgraph_name(subgraph_id));
    }

    let mut groups = by_type
        .into_iter()
        .map(|(r#type, subgraphs)| format!("type \"{type}\" in {}", human_readable_subgraphs(subgraphs)));

    let first = groups.next().unwrap_or_default();
    let rest = groups.join(" and ");

    if rest.is_empty() {
        format!("it has {first}")
    } else {
        format!("it has {first} but {rest}")
    }
}
