use super::*;
use std::collections::{BTreeMap, BTreeSet};

/// Type definitions of every subgraph, with union membership and interface implementations.
#[derive(Default)]
pub(crate) struct Definitions {
    records: Vec<DefinitionRecord>,
    by_name: BTreeMap<(SubgraphId, StringId), DefinitionId>,
    /// (union, member)
    union_members: BTreeSet<(DefinitionId, DefinitionId)>,
    /// (implementer, interface)
    interface_impls: BTreeSet<(DefinitionId, DefinitionId)>,
}

pub(crate) struct DefinitionRecord {
    pub(crate) subgraph_id: SubgraphId,
    pub(crate) name: StringId,
    pub(crate) kind: DefinitionKind,
    pub(crate) description: Option<StringId>,
    pub(crate) directives: DirectiveSiteId,
    /// Only ever defined through `extend` blocks or with `@extends`.
    pub(crate) is_extension: bool,
    pub(crate) references: TypeReferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionKind {
    Object,
    Interface,
    Union,
    InputObject,
    Scalar,
    Enum,
}

impl DefinitionKind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            DefinitionKind::Object => "Object Type",
            DefinitionKind::Interface => "Interface Type",
            DefinitionKind::Union => "Union Type",
            DefinitionKind::InputObject => "Input Object Type",
            DefinitionKind::Scalar => "Scalar Type",
            DefinitionKind::Enum => "Enum Type",
        }
    }

    pub(crate) fn is_composite(self) -> bool {
        matches!(
            self,
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union
        )
    }
}

bitflags::bitflags! {
    /// Where a type is used as the type of a field or argument in its subgraph.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct TypeReferences: u8 {
        const INPUT = 1;
        const OUTPUT = 1 << 1;
    }
}

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

pub(crate) fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

impl Subgraphs {
    pub(crate) fn push_definition(&mut self, record: DefinitionRecord) -> DefinitionId {
        let key = (record.subgraph_id, record.name);
        let id = DefinitionId::from(self.definitions.records.push_return_idx(record));
        self.definitions.by_name.insert(key, id);
        id
    }

    pub(crate) fn definition_by_name(&self, name: &str, subgraph_id: SubgraphId) -> Option<DefinitionId> {
        let name = self.strings.lookup(name)?;
        self.definition_by_name_id(name, subgraph_id)
    }

    pub(crate) fn definition_by_name_id(&self, name: StringId, subgraph_id: SubgraphId) -> Option<DefinitionId> {
        self.definitions.by_name.get(&(subgraph_id, name)).copied()
    }

    pub(crate) fn iter_definitions(&self) -> impl Iterator<Item = View<'_, DefinitionId, DefinitionRecord>> {
        self.definitions
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| View {
                id: DefinitionId::from(idx),
                record,
            })
    }

    pub(crate) fn push_union_member(&mut self, union_id: DefinitionId, member_id: DefinitionId) {
        self.definitions.union_members.insert((union_id, member_id));
    }

    pub(crate) fn push_interface_impl(&mut self, implementer_id: DefinitionId, interface_id: DefinitionId) {
        self.definitions.interface_impls.insert((implementer_id, interface_id));
    }

    pub(crate) fn add_references(&mut self, definition_id: DefinitionId, references: TypeReferences) {
        self[definition_id].references |= references;
    }
}

impl std::ops::Index<DefinitionId> for Subgraphs {
    type Output = DefinitionRecord;

    fn index(&self, index: DefinitionId) -> &DefinitionRecord {
        &self.definitions.records[usize::from(index)]
    }
}

impl std::ops::IndexMut<DefinitionId> for Subgraphs {
    fn index_mut(&mut self, index: DefinitionId) -> &mut DefinitionRecord {
        &mut self.definitions.records[usize::from(index)]
    }
}

pub(crate) type DefinitionWalker<'a> = Walker<'a, DefinitionId>;

impl<'a> DefinitionWalker<'a> {
    pub(crate) fn record(self) -> &'a DefinitionRecord {
        &self.subgraphs[self.id]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.subgraphs[self.record().name]
    }

    pub(crate) fn name_id(self) -> StringId {
        self.record().name
    }

    pub(crate) fn kind(self) -> DefinitionKind {
        self.record().kind
    }

    pub(crate) fn subgraph_id(self) -> SubgraphId {
        self.record().subgraph_id
    }

    pub(crate) fn subgraph(self) -> SubgraphWalker<'a> {
        self.walk(self.subgraph_id())
    }

    pub(crate) fn description(self) -> Option<StringId> {
        self.record().description
    }

    pub(crate) fn directives(self) -> &'a DirectiveSiteRecord {
        &self.subgraphs[self.record().directives]
    }

    pub(crate) fn is_extension(self) -> bool {
        self.record().is_extension
    }

    pub(crate) fn references(self) -> TypeReferences {
        self.record().references
    }

    /// An object type standing in for an interface with `@interfaceObject`.
    pub(crate) fn is_interface_object(self) -> bool {
        self.kind() == DefinitionKind::Interface && self.directives().interface_object()
    }

    pub(crate) fn is_entity(self) -> bool {
        self.keys().next().is_some()
    }

    pub(crate) fn fields(self) -> impl Iterator<Item = FieldWalker<'a>> + 'a {
        self.subgraphs.iter_fields_of(self.id).map(move |id| self.walk(id))
    }

    pub(crate) fn field_by_name(self, name: &str) -> Option<FieldWalker<'a>> {
        let name = self.subgraphs.strings.lookup(name)?;
        self.field_by_name_id(name)
    }

    pub(crate) fn field_by_name_id(self, name: StringId) -> Option<FieldWalker<'a>> {
        self.subgraphs.field_by_name_id(self.id, name).map(|id| self.walk(id))
    }

    pub(crate) fn keys(self) -> impl Iterator<Item = KeyWalker<'a>> + 'a {
        self.subgraphs.iter_keys_of(self.id).map(move |id| self.walk(id))
    }

    pub(crate) fn resolvable_keys(self) -> impl Iterator<Item = KeyWalker<'a>> + 'a {
        self.keys().filter(|key| key.is_resolvable())
    }

    pub(crate) fn union_members(self) -> impl Iterator<Item = DefinitionWalker<'a>> + 'a {
        let start = (self.id, DefinitionId::from(0));
        let end = (self.id, DefinitionId::from(usize::MAX));
        self.subgraphs
            .definitions
            .union_members
            .range(start..=end)
            .map(move |(_, member)| self.walk(*member))
    }

    /// The interfaces this object or interface declares it implements.
    pub(crate) fn interfaces(self) -> impl Iterator<Item = DefinitionWalker<'a>> + 'a {
        let start = (self.id, DefinitionId::from(0));
        let end = (self.id, DefinitionId::from(usize::MAX));
        self.subgraphs
            .definitions
            .interface_impls
            .range(start..=end)
            .map(move |(_, interface)| self.walk(*interface))
    }

    /// The objects and interfaces of the same subgraph declaring they implement this interface.
    pub(crate) fn implementers(self) -> impl Iterator<Item = DefinitionWalker<'a>> + 'a {
        self.subgraphs
            .definitions
            .interface_impls
            .iter()
            .filter(move |(_, interface)| *interface == self.id)
            .map(move |(implementer, _)| self.walk(*implementer))
    }

    pub(crate) fn enum_values(self) -> &'a [EnumValueRecord] {
        self.subgraphs.enum_values(self.id)
    }
}
