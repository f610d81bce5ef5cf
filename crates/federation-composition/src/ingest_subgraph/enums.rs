use super::*;
use crate::subgraphs::EnumValueRecord;

pub(super) fn ingest_enum_values(ctx: &mut Context<'_>, definition_id: DefinitionId, enum_type: ast::EnumDefinition<'_>) {
    let enum_name = ctx.subgraphs.walk(definition_id).name().to_owned();

    for value in enum_type.values() {
        let value_name = value.value();
        let directives = ctx.subgraphs.new_directive_site();

        directives::ingest_directives(ctx, directives, value.directives(), || {
            format!("{enum_name}.{value_name}")
        });

        let description = value
            .description()
            .map(|description| ctx.subgraphs.strings.intern(&description.to_cow()));

        let record = EnumValueRecord {
            name: ctx.subgraphs.strings.intern(value_name),
            description,
            directives,
        };

        if !ctx.subgraphs.push_enum_value(definition_id, record) {
            ctx.push_error(
                ErrorCode::InvalidGraphql,
                format!("Enum value \"{enum_name}.{value_name}\" is defined more than once."),
            );
        }
    }
}
