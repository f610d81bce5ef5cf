use super::*;
use crate::supergraph::EnumMergeStrategy;

/// Enums used both as input and output (or not at all) must have the same values everywhere.
pub(super) struct EnumValues;

impl ValidationRule for EnumValues {
    fn enum_type(&mut self, ctx: &mut ValidationContext<'_>, r#enum: &EnumTypeState) {
        if r#enum.merge_strategy() != EnumMergeStrategy::Consistency {
            return;
        }

        let usage = if r#enum.referenced_by_input {
            "is used as both input type and output type"
        } else {
            "is not used as the type of any field or argument"
        };

        for value in r#enum.values.values() {
            if r#enum.is_in_every_subgraph(value) {
                continue;
            }

            let (defining, missing): (Vec<&str>, Vec<&str>) = r#enum
                .by_graph
                .keys()
                .map(|id| (value.by_graph.contains(id), ctx.subgraph_name(*id)))
                .partition_map(|(defines, name)| {
                    if defines {
                        itertools::Either::Left(name)
                    } else {
                        itertools::Either::Right(name)
                    }
                });

            let enum_name = ctx.str(r#enum.name);
            let value_name = ctx.str(value.name);

            ctx.push_fatal(
                ErrorCode::EnumValueMismatch,
                format!(
                    "Enum type \"{enum_name}\" {usage}, but value \"{value_name}\" is not defined in all the subgraphs defining \"{enum_name}\": \"{value_name}\" is defined in {} but not in {}",
                    human_readable_subgraphs(defining),
                    human_readable_subgraphs(missing),
                ),
            );
        }
    }
}
