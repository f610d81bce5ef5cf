//! Post-pass over a fully ingested subgraph: which fields its own field sets use, and where each
//! type is referenced from.

use super::*;
use crate::subgraphs::{FieldId, FieldUsage, Selection};

pub(super) fn mark_usages(ctx: &mut Context<'_>) {
    let subgraph_id = ctx.subgraph_id;
    let mut field_usages: Vec<(FieldId, FieldUsage)> = Vec::new();
    let mut references: Vec<(DefinitionId, TypeReferences)> = Vec::new();

    let subgraphs = &*ctx.subgraphs;

    for definition in subgraphs.walk(subgraph_id).definitions() {
        for key in definition.keys() {
            collect_selection_usages(definition, key.selection_set(), FieldUsage::USED_AS_KEY, &mut field_usages);
        }

        let reference = if definition.kind() == DefinitionKind::InputObject {
            TypeReferences::INPUT
        } else {
            TypeReferences::OUTPUT
        };

        for field in definition.fields() {
            let directives = field.directives();

            if let Some(requires) = &directives.requires {
                collect_selection_usages(
                    definition,
                    &requires.selection_set,
                    FieldUsage::USED_IN_REQUIRES,
                    &mut field_usages,
                );
            }

            if let (Some(provides), Some(target)) = (&directives.provides, field.type_definition()) {
                collect_selection_usages(
                    target,
                    &provides.selection_set,
                    FieldUsage::USED_IN_PROVIDES,
                    &mut field_usages,
                );
            }

            if let Some(target) = field.type_definition() {
                references.push((target.id, reference));
            }

            for argument in field.arguments() {
                if let Some(target) = subgraphs.definition_by_name_id(argument.r#type.name, subgraph_id) {
                    references.push((target, TypeReferences::INPUT));
                }
            }
        }
    }

    for (field_id, usage) in field_usages {
        ctx.subgraphs.mark_field_usage(field_id, usage);
    }

    for (definition_id, reference) in references {
        ctx.subgraphs.add_references(definition_id, reference);
    }
}

fn collect_selection_usages(
    definition: subgraphs::DefinitionWalker<'_>,
    selection_set: &[Selection],
    usage: FieldUsage,
    out: &mut Vec<(FieldId, FieldUsage)>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(selection) => {
                let Some(field) = definition.field_by_name_id(selection.field) else {
                    continue;
                };

                out.push((field.id, usage));

                if let (false, Some(target)) = (selection.subselection.is_empty(), field.type_definition()) {
                    collect_selection_usages(target, &selection.subselection, usage, out);
                }
            }
            Selection::InlineFragment { on, subselection, .. } => {
                let subgraphs = definition.subgraphs;
                let Some(target) = subgraphs.definition_by_name_id(*on, definition.subgraph_id()) else {
                    continue;
                };

                collect_selection_usages(subgraphs.walk(target), subselection, usage, out);
            }
        }
    }
}
