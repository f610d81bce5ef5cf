use crate::subgraphs::{DefinitionWalker, Selection};

/// Drop the top-level leaf selections that are also leaf key fields of `target` in its subgraph.
/// The gateway always fetches key fields, so selecting them again is redundant. `None` when
/// nothing is left.
pub(super) fn prune_key_fields(target: Option<DefinitionWalker<'_>>, selection_set: &[Selection]) -> Option<Vec<Selection>> {
    let key_leaves: Vec<_> = target
        .into_iter()
        .flat_map(|definition| definition.keys())
        .flat_map(|key| key.selection_set())
        .filter_map(|selection| match selection {
            Selection::Field(field) if field.subselection.is_empty() && field.arguments.is_empty() => Some(field.field),
            _ => None,
        })
        .collect();

    let pruned: Vec<Selection> = selection_set
        .iter()
        .filter(|selection| match selection {
            Selection::Field(field) => {
                !(field.subselection.is_empty() && field.arguments.is_empty() && key_leaves.contains(&field.field))
            }
            Selection::InlineFragment { .. } => true,
        })
        .cloned()
        .collect();

    (!pruned.is_empty()).then_some(pruned)
}
