use super::*;
use crate::subgraphs::{FieldId, FieldType, ListSize, OverrideDirective, Selection, SubgraphId, Value};

/// A field of a merged object or interface type.
#[derive(Debug, Clone)]
pub(crate) struct FieldState {
    pub(crate) name: StringId,
    /// The consensus type. Meaningless when `type_mismatch` is set.
    pub(crate) r#type: FieldType,
    pub(crate) metadata: Metadata,
    pub(crate) arguments: IndexMap<StringId, InputValueState>,
    pub(crate) by_graph: IndexMap<SubgraphId, FieldInGraph>,
    pub(crate) type_mismatch: bool,
    /// Copied onto an implementation from an interface defined with `@interfaceObject`.
    pub(crate) from_interface_object: bool,
}

/// What one subgraph says about a field.
#[derive(Debug, Clone)]
pub(crate) struct FieldInGraph {
    pub(crate) field_id: FieldId,
    pub(crate) r#type: FieldType,
    pub(crate) external: bool,
    pub(crate) shareable: bool,
    pub(crate) inaccessible: bool,
    pub(crate) used_as_key: bool,
    pub(crate) used_in_field_set: bool,
    pub(crate) r#override: Option<OverrideDirective>,
    /// `@requires` selection, without the leaf key fields of the parent type.
    pub(crate) requires: Option<Vec<Selection>>,
    /// `@provides` selection, without the leaf key fields of the field's type.
    pub(crate) provides: Option<Vec<Selection>>,
    pub(crate) list_size: Option<ListSize>,
}

impl FieldInGraph {
    pub(crate) fn has_progressive_override(&self) -> bool {
        self.r#override.is_some_and(|r#override| r#override.label.is_some())
    }
}

/// An argument or input object field.
#[derive(Debug, Clone)]
pub(crate) struct InputValueState {
    pub(crate) name: StringId,
    pub(crate) r#type: FieldType,
    pub(crate) default_value: Option<Value>,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, FieldType>,
    pub(crate) type_mismatch: bool,
}

/// `@listSize` once merged over every subgraph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MergedListSize {
    pub(crate) assumed_size: Option<u32>,
    pub(crate) slicing_arguments: Vec<StringId>,
    pub(crate) sized_fields: Vec<StringId>,
    pub(crate) require_one_slicing_argument: bool,
}

pub(crate) struct ListSizeMerge {
    /// `None` when the field has no `@listSize`, or when every slicing argument was dropped.
    pub(crate) merged: Option<MergedListSize>,
    /// Slicing arguments missing from the field in some subgraph.
    pub(crate) dropped_slicing_arguments: Vec<StringId>,
}

impl FieldState {
    pub(crate) fn new(name: StringId, r#type: FieldType) -> Self {
        FieldState {
            name,
            r#type,
            metadata: Metadata::default(),
            arguments: IndexMap::new(),
            by_graph: IndexMap::new(),
            type_mismatch: false,
            from_interface_object: false,
        }
    }

    /// The field definition in `subgraph_id` carrying an `@override(from:)` pointing at the
    /// subgraph named `subgraph_name`.
    pub(crate) fn overridden_by(&self, subgraph_name: StringId) -> Option<(SubgraphId, &FieldInGraph)> {
        self.by_graph
            .iter()
            .find(|(_, field)| field.r#override.is_some_and(|r#override| r#override.from == subgraph_name))
            .map(|(subgraph_id, field)| (*subgraph_id, field))
    }

    /// The subgraph can resolve the field: it defines it without `@external`, and no other
    /// subgraph takes it over with an unconditional `@override`.
    pub(crate) fn is_resolvable_in(&self, subgraphs: &Subgraphs, subgraph_id: SubgraphId) -> bool {
        let Some(field) = self.by_graph.get(&subgraph_id) else {
            return false;
        };

        if field.external {
            return false;
        }

        let subgraph_name = subgraphs.walk(subgraph_id).name_id();

        !matches!(self.overridden_by(subgraph_name), Some((_, overriding)) if !overriding.has_progressive_override())
    }

    pub(crate) fn merge_list_size(&self, subgraphs: &Subgraphs) -> ListSizeMerge {
        let directives: Vec<&ListSize> = self
            .by_graph
            .values()
            .filter_map(|field| field.list_size.as_ref())
            .collect();

        if directives.is_empty() {
            return ListSizeMerge {
                merged: None,
                dropped_slicing_arguments: Vec::new(),
            };
        }

        let assumed_size = directives.iter().filter_map(|list_size| list_size.assumed_size).max();
        let require_one_slicing_argument = directives
            .iter()
            .all(|list_size| list_size.require_one_slicing_argument);

        let mut sized_fields = Vec::new();
        let mut candidates = Vec::new();

        for list_size in &directives {
            for field in &list_size.sized_fields {
                if !sized_fields.contains(field) {
                    sized_fields.push(*field);
                }
            }

            for argument in &list_size.slicing_arguments {
                if !candidates.contains(argument) {
                    candidates.push(*argument);
                }
            }
        }

        let (slicing_arguments, dropped_slicing_arguments): (Vec<StringId>, Vec<StringId>) =
            candidates.iter().partition(|argument| {
                self.by_graph
                    .values()
                    .filter(|field| !field.external)
                    .all(|field| subgraphs.walk(field.field_id).argument_by_name_id(**argument).is_some())
            });

        if !candidates.is_empty() && slicing_arguments.is_empty() {
            return ListSizeMerge {
                merged: None,
                dropped_slicing_arguments,
            };
        }

        ListSizeMerge {
            merged: Some(MergedListSize {
                assumed_size,
                slicing_arguments,
                sized_fields,
                require_one_slicing_argument,
            }),
            dropped_slicing_arguments,
        }
    }
}

impl InputValueState {
    pub(crate) fn new(name: StringId, r#type: FieldType) -> Self {
        InputValueState {
            name,
            r#type,
            default_value: None,
            metadata: Metadata::default(),
            by_graph: IndexMap::new(),
            type_mismatch: false,
        }
    }
}
