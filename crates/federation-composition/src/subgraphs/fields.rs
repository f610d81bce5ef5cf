use super::*;
use std::collections::BTreeMap;

/// Fields of objects, interfaces and input objects in every subgraph.
#[derive(Default)]
pub(crate) struct Fields {
    records: Vec<FieldRecord>,
    by_parent: BTreeMap<(DefinitionId, StringId), FieldId>,
}

pub(crate) struct FieldRecord {
    pub(crate) parent_definition_id: DefinitionId,
    pub(crate) name: StringId,
    pub(crate) r#type: FieldType,
    pub(crate) description: Option<StringId>,
    pub(crate) directives: DirectiveSiteId,
    pub(crate) arguments: Vec<ArgumentRecord>,
    /// Input object fields only.
    pub(crate) default_value: Option<Value>,
    /// Declared in an `extend` block, or on a type with `@extends`.
    pub(crate) in_extension: bool,
    pub(crate) usage: FieldUsage,
}

pub(crate) struct ArgumentRecord {
    pub(crate) name: StringId,
    pub(crate) r#type: FieldType,
    pub(crate) description: Option<StringId>,
    pub(crate) directives: DirectiveSiteId,
    pub(crate) default_value: Option<Value>,
}

bitflags::bitflags! {
    /// How the subgraph itself uses a field in field sets.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct FieldUsage: u8 {
        const USED_AS_KEY = 1;
        const USED_IN_REQUIRES = 1 << 1;
        const USED_IN_PROVIDES = 1 << 2;
    }
}

impl Subgraphs {
    /// Returns the existing field as an error when the parent already has a field with that name.
    pub(crate) fn push_field(&mut self, record: FieldRecord) -> Result<FieldId, FieldId> {
        let key = (record.parent_definition_id, record.name);

        if let Some(existing) = self.fields.by_parent.get(&key) {
            return Err(*existing);
        }

        let id = FieldId::from(self.fields.records.push_return_idx(record));
        self.fields.by_parent.insert(key, id);
        Ok(id)
    }

    pub(crate) fn mark_field_usage(&mut self, field_id: FieldId, usage: FieldUsage) {
        self.fields.records[usize::from(field_id)].usage |= usage;
    }

    pub(crate) fn field_by_name_id(&self, parent: DefinitionId, name: StringId) -> Option<FieldId> {
        self.fields.by_parent.get(&(parent, name)).copied()
    }

    pub(crate) fn iter_fields_of(&self, parent: DefinitionId) -> impl Iterator<Item = FieldId> + '_ {
        self.fields
            .by_parent
            .range((parent, StringId::MIN)..=(parent, StringId::MAX))
            .map(|(_, id)| *id)
    }
}

impl std::ops::Index<FieldId> for Subgraphs {
    type Output = FieldRecord;

    fn index(&self, index: FieldId) -> &FieldRecord {
        &self.fields.records[usize::from(index)]
    }
}

pub(crate) type FieldWalker<'a> = Walker<'a, FieldId>;

impl<'a> FieldWalker<'a> {
    pub(crate) fn record(self) -> &'a FieldRecord {
        &self.subgraphs[self.id]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.subgraphs[self.record().name]
    }

    pub(crate) fn name_id(self) -> StringId {
        self.record().name
    }

    pub(crate) fn parent_definition(self) -> DefinitionWalker<'a> {
        self.walk(self.record().parent_definition_id)
    }

    pub(crate) fn subgraph_id(self) -> SubgraphId {
        self.parent_definition().subgraph_id()
    }

    pub(crate) fn r#type(self) -> FieldType {
        self.record().r#type
    }

    /// The definition of the field's named type in the same subgraph.
    pub(crate) fn type_definition(self) -> Option<DefinitionWalker<'a>> {
        self.subgraphs
            .definition_by_name_id(self.r#type().name, self.subgraph_id())
            .map(|id| self.walk(id))
    }

    pub(crate) fn directives(self) -> &'a DirectiveSiteRecord {
        &self.subgraphs[self.record().directives]
    }

    pub(crate) fn arguments(self) -> &'a [ArgumentRecord] {
        &self.record().arguments
    }

    pub(crate) fn argument_by_name_id(self, name: StringId) -> Option<&'a ArgumentRecord> {
        self.arguments().iter().find(|argument| argument.name == name)
    }

    /// `@external` on the field, or on its parent type in federation v2. Federation v1 only
    /// knows field-level `@external`.
    pub(crate) fn is_external(self) -> bool {
        let parent = self.parent_definition();

        self.directives().external()
            || (parent.directives().external() && !parent.subgraph().federation_version().is_v1())
    }

    /// `@shareable` on the field or its parent type. Federation v1 object fields declared outside
    /// of extensions are shareable by default.
    pub(crate) fn is_shareable(self) -> bool {
        let parent = self.parent_definition();

        self.directives().shareable()
            || parent.directives().shareable()
            || (parent.subgraph().federation_version().is_v1()
                && parent.kind() == DefinitionKind::Object
                && !self.record().in_extension)
    }

    pub(crate) fn is_used_as_key(self) -> bool {
        self.record().usage.contains(FieldUsage::USED_AS_KEY)
    }

    /// Used in a `@requires` or `@provides` of the subgraph.
    pub(crate) fn is_used_in_field_set(self) -> bool {
        self.record()
            .usage
            .intersects(FieldUsage::USED_IN_REQUIRES | FieldUsage::USED_IN_PROVIDES)
    }

    pub(crate) fn is_leaf(self) -> bool {
        match self.type_definition() {
            Some(definition) => !definition.kind().is_composite(),
            None => is_builtin_scalar(&self.subgraphs[self.r#type().name]),
        }
    }

    /// `Type.field`
    pub(crate) fn coordinate(self) -> String {
        format!("{}.{}", self.parent_definition().name(), self.name())
    }
}
