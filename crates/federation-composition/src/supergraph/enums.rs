use super::*;
use crate::subgraphs::{DefinitionId, SubgraphId};
use indexmap::IndexSet;

#[derive(Debug, Clone)]
pub(crate) struct EnumTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, DefinitionId>,
    pub(crate) values: IndexMap<StringId, EnumValueState>,
    /// Used as the type of an argument or input field in some subgraph.
    pub(crate) referenced_by_input: bool,
    /// Used as the type of an output field in some subgraph.
    pub(crate) referenced_by_output: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumValueState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexSet<SubgraphId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumMergeStrategy {
    /// Input-only enums: clients may only send values every subgraph understands.
    Intersection,
    /// Output-only enums: clients must be ready for any value some subgraph returns.
    Union,
    /// Used as both input and output, or unused: every subgraph must define the same values.
    Consistency,
}

pub(crate) fn decide_on_enum_merge_strategy(referenced_by_input: bool, referenced_by_output: bool) -> EnumMergeStrategy {
    match (referenced_by_input, referenced_by_output) {
        (true, false) => EnumMergeStrategy::Intersection,
        (false, true) => EnumMergeStrategy::Union,
        _ => EnumMergeStrategy::Consistency,
    }
}

impl EnumTypeState {
    pub(crate) fn merge_strategy(&self) -> EnumMergeStrategy {
        decide_on_enum_merge_strategy(self.referenced_by_input, self.referenced_by_output)
    }

    pub(crate) fn is_in_every_subgraph(&self, value: &EnumValueState) -> bool {
        self.by_graph.keys().all(|subgraph_id| value.by_graph.contains(subgraph_id))
    }

    /// The value stays in the supergraph but is hidden from clients.
    pub(crate) fn is_value_inaccessible(&self, value: &EnumValueState) -> bool {
        value.metadata.inaccessible
            || (self.merge_strategy() == EnumMergeStrategy::Intersection && !self.is_in_every_subgraph(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_strategies() {
        assert_eq!(decide_on_enum_merge_strategy(true, false), EnumMergeStrategy::Intersection);
        assert_eq!(decide_on_enum_merge_strategy(false, true), EnumMergeStrategy::Union);
        assert_eq!(decide_on_enum_merge_strategy(true, true), EnumMergeStrategy::Consistency);
        assert_eq!(decide_on_enum_merge_strategy(false, false), EnumMergeStrategy::Consistency);
    }
}
