use super::*;
use crate::subgraphs::{ArgumentRecord, FieldRecord, FieldUsage};

pub(super) fn ingest_fields(
    ctx: &mut Context<'_>,
    definition_id: DefinitionId,
    fields: ast::iter::Iter<'_, ast::FieldDefinition<'_>>,
    in_extension: bool,
) {
    let parent_name = ctx.subgraphs.walk(definition_id).name().to_owned();
    let is_query_root_type = parent_name == RootOperation::Query.type_name();

    for field in fields {
        let field_name = field.name();

        // The entity resolution machinery is not part of the composed schema.
        if is_query_root_type && matches!(field_name, "_entities" | "_service") {
            continue;
        }

        let type_name = ctx.root_type_matcher.canonical_name(field.ty().name());
        let r#type = ctx.subgraphs.intern_field_type(type_name, field.ty());
        let directives = ctx.subgraphs.new_directive_site();

        directives::ingest_directives(ctx, directives, field.directives(), || {
            format!("{parent_name}.{field_name}")
        });

        let arguments = ingest_field_arguments(ctx, &parent_name, field_name, field.arguments());

        let description = field
            .description()
            .map(|description| ctx.subgraphs.strings.intern(&description.to_cow()));

        let name = ctx.subgraphs.strings.intern(field_name);

        let pushed = ctx.subgraphs.push_field(FieldRecord {
            parent_definition_id: definition_id,
            name,
            r#type,
            description,
            directives,
            arguments,
            default_value: None,
            in_extension,
            usage: FieldUsage::empty(),
        });

        if pushed.is_err() {
            ctx.push_error(
                ErrorCode::InvalidGraphql,
                format!("Field \"{parent_name}.{field_name}\" is defined more than once."),
            );
        }
    }
}

pub(super) fn ingest_input_fields(
    ctx: &mut Context<'_>,
    definition_id: DefinitionId,
    fields: ast::iter::Iter<'_, ast::InputValueDefinition<'_>>,
    in_extension: bool,
) {
    let parent_name = ctx.subgraphs.walk(definition_id).name().to_owned();

    for field in fields {
        let field_name = field.name();
        let r#type = ctx.subgraphs.intern_field_type(field.ty().name(), field.ty());
        let directives = ctx.subgraphs.new_directive_site();

        directives::ingest_directives(ctx, directives, field.directives(), || {
            format!("{parent_name}.{field_name}")
        });

        let description = field
            .description()
            .map(|description| ctx.subgraphs.strings.intern(&description.to_cow()));

        let default_value = field
            .default_value()
            .map(|default| ast_value_to_subgraph_value(default, ctx.subgraphs));

        let name = ctx.subgraphs.strings.intern(field_name);

        let pushed = ctx.subgraphs.push_field(FieldRecord {
            parent_definition_id: definition_id,
            name,
            r#type,
            description,
            directives,
            arguments: Vec::new(),
            default_value,
            in_extension,
            usage: FieldUsage::empty(),
        });

        if pushed.is_err() {
            ctx.push_error(
                ErrorCode::InvalidGraphql,
                format!("Input field \"{parent_name}.{field_name}\" is defined more than once."),
            );
        }
    }
}

fn ingest_field_arguments(
    ctx: &mut Context<'_>,
    parent_name: &str,
    field_name: &str,
    arguments: ast::iter::Iter<'_, ast::InputValueDefinition<'_>>,
) -> Vec<ArgumentRecord> {
    let mut records = Vec::new();

    for argument in arguments {
        let argument_name = argument.name();
        let r#type = ctx.subgraphs.intern_field_type(argument.ty().name(), argument.ty());
        let directives = ctx.subgraphs.new_directive_site();

        directives::ingest_directives(ctx, directives, argument.directives(), || {
            format!("{parent_name}.{field_name}({argument_name}:)")
        });

        let description = argument
            .description()
            .map(|description| ctx.subgraphs.strings.intern(&description.to_cow()));

        let default_value = argument
            .default_value()
            .map(|default| ast_value_to_subgraph_value(default, ctx.subgraphs));

        records.push(ArgumentRecord {
            name: ctx.subgraphs.strings.intern(argument_name),
            r#type,
            description,
            directives,
            default_value,
        });
    }

    records
}
