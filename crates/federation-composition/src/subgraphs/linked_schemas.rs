//! Schemas linked with `@link`, and the definitions imported from them.

use super::*;
use std::collections::BTreeMap;

#[derive(Default)]
pub(crate) struct LinkedSchemas {
    schemas: Vec<LinkedSchemaRecord>,
    /// Keyed by the local name, without the `@` for directives.
    imports: BTreeMap<(SubgraphId, StringId), LinkedDefinitionRecord>,
}

pub(crate) struct LinkedSchemaRecord {
    pub(crate) subgraph_id: SubgraphId,
    pub(crate) url: StringId,
    pub(crate) spec: KnownSpec,
    /// Prefix of the qualified names, `federation` in `@federation__key`.
    pub(crate) namespace: Option<StringId>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkedDefinitionRecord {
    pub(crate) linked_schema_id: LinkedSchemaId,
    pub(crate) original_name: StringId,
    pub(crate) is_directive: bool,
}

/// The specs whose directives composition understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnownSpec {
    Federation,
    Link,
    Tag,
    Inaccessible,
    Authenticated,
    RequiresScopes,
    Policy,
    Cost,
    Other,
}

impl KnownSpec {
    pub(crate) fn from_name(name: &str) -> KnownSpec {
        match name {
            "federation" => KnownSpec::Federation,
            "link" => KnownSpec::Link,
            "tag" => KnownSpec::Tag,
            "inaccessible" => KnownSpec::Inaccessible,
            "authenticated" => KnownSpec::Authenticated,
            "requiresScopes" => KnownSpec::RequiresScopes,
            "policy" => KnownSpec::Policy,
            "cost" => KnownSpec::Cost,
            _ => KnownSpec::Other,
        }
    }
}

impl Subgraphs {
    pub(crate) fn push_linked_schema(&mut self, record: LinkedSchemaRecord) -> LinkedSchemaId {
        LinkedSchemaId::from(self.linked_schemas.schemas.push_return_idx(record))
    }

    pub(crate) fn push_linked_definition(
        &mut self,
        subgraph_id: SubgraphId,
        imported_as: StringId,
        record: LinkedDefinitionRecord,
    ) {
        self.linked_schemas.imports.insert((subgraph_id, imported_as), record);
    }

    pub(crate) fn linked_definition(&self, subgraph_id: SubgraphId, local_name: &str) -> Option<LinkedDefinitionRecord> {
        let name = self.strings.lookup(local_name)?;
        self.linked_schemas.imports.get(&(subgraph_id, name)).copied()
    }

    pub(crate) fn linked_schema_by_namespace(&self, subgraph_id: SubgraphId, namespace: &str) -> Option<LinkedSchemaId> {
        let namespace = self.strings.lookup(namespace)?;
        self.linked_schemas
            .schemas
            .iter()
            .position(|schema| schema.subgraph_id == subgraph_id && schema.namespace == Some(namespace))
            .map(LinkedSchemaId::from)
    }

    /// Types the subgraph imports from a spec it links, like `FieldSet` or `Scope`.
    pub(crate) fn is_imported_type(&self, subgraph_id: SubgraphId, name: &str) -> bool {
        self.linked_definition(subgraph_id, name)
            .is_some_and(|definition| !definition.is_directive)
    }
}

impl std::ops::Index<LinkedSchemaId> for Subgraphs {
    type Output = LinkedSchemaRecord;

    fn index(&self, index: LinkedSchemaId) -> &LinkedSchemaRecord {
        &self.linked_schemas.schemas[usize::from(index)]
    }
}
