//! The merged view of all subgraphs. Each type and field keeps what every subgraph says about it
//! in `by_graph`, next to the consensus values the supergraph schema is emitted from.

mod builder;
mod enums;
mod field_sets;
mod fields;
mod scope_policies;
mod types;

pub use self::scope_policies::merge_scope_policies;
pub(crate) use self::{enums::*, fields::*, types::*};

use crate::subgraphs::{RootOperation, StringId, Subgraphs};
use indexmap::IndexMap;

#[derive(Default)]
pub(crate) struct SupergraphState {
    /// Types in the order the subgraphs first define them.
    pub(crate) definitions: IndexMap<StringId, MergedDefinition>,
}

/// Structural conflicts that make the merge itself impossible.
#[derive(Debug, thiserror::Error)]
pub(crate) enum MergeError {
    #[error(
        "Type \"{type_name}\" has mismatched kind: it is defined as {first_kind} in subgraph \"{first_subgraph}\" but {second_kind} in subgraph \"{second_subgraph}\""
    )]
    KindMismatch {
        type_name: String,
        first_kind: &'static str,
        first_subgraph: String,
        second_kind: &'static str,
        second_subgraph: String,
    },
}

impl SupergraphState {
    /// Fold every subgraph, in order, into one state.
    pub(crate) fn build(subgraphs: &Subgraphs) -> Result<SupergraphState, MergeError> {
        let mut builder = builder::SupergraphStateBuilder::new(subgraphs);

        for subgraph in subgraphs.iter_subgraphs() {
            builder.add_subgraph(subgraph)?;
        }

        let state = builder.finish();
        tracing::debug!(types = state.definitions.len(), "merged subgraphs");

        Ok(state)
    }

    pub(crate) fn definition(&self, name: StringId) -> Option<&MergedDefinition> {
        self.definitions.get(&name)
    }

    pub(crate) fn object(&self, name: StringId) -> Option<&ObjectTypeState> {
        match self.definitions.get(&name)? {
            MergedDefinition::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn interface(&self, name: StringId) -> Option<&InterfaceTypeState> {
        match self.definitions.get(&name)? {
            MergedDefinition::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub(crate) fn root(&self, subgraphs: &Subgraphs, root: RootOperation) -> Option<&ObjectTypeState> {
        self.object(subgraphs.strings.lookup(root.type_name())?)
    }

    /// Fields of an object or interface type.
    pub(crate) fn fields_of(&self, name: StringId) -> Option<&IndexMap<StringId, FieldState>> {
        match self.definitions.get(&name)? {
            MergedDefinition::Object(object) => Some(&object.fields),
            MergedDefinition::Interface(interface) => Some(&interface.fields),
            _ => None,
        }
    }
}
