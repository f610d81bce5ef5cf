use super::*;
use crate::subgraphs::{
    DefinitionId, DefinitionKind, DefinitionWalker, Deprecated, DirectiveSiteRecord, KeyId, SubgraphId,
};
use indexmap::IndexSet;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub(crate) enum MergedDefinition {
    Object(ObjectTypeState),
    Interface(InterfaceTypeState),
    Union(UnionTypeState),
    Enum(EnumTypeState),
    Scalar(ScalarTypeState),
    InputObject(InputObjectTypeState),
}

impl MergedDefinition {
    pub(crate) fn kind(&self) -> DefinitionKind {
        match self {
            MergedDefinition::Object(_) => DefinitionKind::Object,
            MergedDefinition::Interface(_) => DefinitionKind::Interface,
            MergedDefinition::Union(_) => DefinitionKind::Union,
            MergedDefinition::Enum(_) => DefinitionKind::Enum,
            MergedDefinition::Scalar(_) => DefinitionKind::Scalar,
            MergedDefinition::InputObject(_) => DefinitionKind::InputObject,
        }
    }

    pub(crate) fn name(&self) -> StringId {
        match self {
            MergedDefinition::Object(object) => object.name,
            MergedDefinition::Interface(interface) => interface.name,
            MergedDefinition::Union(union) => union.name,
            MergedDefinition::Enum(r#enum) => r#enum.name,
            MergedDefinition::Scalar(scalar) => scalar.name,
            MergedDefinition::InputObject(input_object) => input_object.name,
        }
    }

    pub(crate) fn metadata(&self) -> &Metadata {
        match self {
            MergedDefinition::Object(object) => &object.metadata,
            MergedDefinition::Interface(interface) => &interface.metadata,
            MergedDefinition::Union(union) => &union.metadata,
            MergedDefinition::Enum(r#enum) => &r#enum.metadata,
            MergedDefinition::Scalar(scalar) => &scalar.metadata,
            MergedDefinition::InputObject(input_object) => &input_object.metadata,
        }
    }

    /// The subgraphs defining the type, in composition order.
    pub(crate) fn subgraph_ids(&self) -> Vec<SubgraphId> {
        match self {
            MergedDefinition::Object(object) => object.by_graph.keys().copied().collect(),
            MergedDefinition::Interface(interface) => interface.by_graph.keys().copied().collect(),
            MergedDefinition::Union(union) => union.by_graph.keys().copied().collect(),
            MergedDefinition::Enum(r#enum) => r#enum.by_graph.keys().copied().collect(),
            MergedDefinition::Scalar(scalar) => scalar.by_graph.keys().copied().collect(),
            MergedDefinition::InputObject(input_object) => input_object.by_graph.keys().copied().collect(),
        }
    }
}

/// Directive and description data shared by types, fields, arguments and enum values.
#[derive(Debug, Default, Clone)]
pub(crate) struct Metadata {
    /// The first non-empty description wins.
    pub(crate) description: Option<StringId>,
    pub(crate) tags: BTreeSet<StringId>,
    pub(crate) inaccessible: bool,
    pub(crate) auth: AuthRequirements,
    /// The highest weight wins.
    pub(crate) cost: Option<i32>,
    pub(crate) deprecated: Option<Deprecated>,
}

impl Metadata {
    pub(crate) fn merge_site(
        &mut self,
        subgraphs: &Subgraphs,
        site: &DirectiveSiteRecord,
        description: Option<StringId>,
    ) {
        if self.description.is_none() {
            self.description = description.filter(|description| !subgraphs[*description].is_empty());
        }

        self.tags.extend(site.tags.iter().copied());
        self.inaccessible |= site.inaccessible();
        self.auth.merge(&AuthRequirements::from_site(subgraphs, site));

        self.cost = match (self.cost, site.cost) {
            (Some(left), Some(right)) => Some(left.max(right)),
            (left, right) => left.or(right),
        };

        if self.deprecated.is_none() {
            self.deprecated = site.deprecated;
        }
    }
}

/// Access requirements. Scopes and policies are alternatives of groups that must all be granted.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct AuthRequirements {
    pub(crate) authenticated: bool,
    pub(crate) policies: Vec<Vec<String>>,
    pub(crate) scopes: Vec<Vec<String>>,
}

impl AuthRequirements {
    pub(crate) fn from_site(subgraphs: &Subgraphs, site: &DirectiveSiteRecord) -> Self {
        let resolve = |groups: &[Vec<StringId>]| -> Vec<Vec<String>> {
            let groups: Vec<Vec<&str>> = groups
                .iter()
                .map(|group| group.iter().map(|id| &subgraphs[*id]).collect())
                .collect();

            merge_scope_policies::<&str>(&groups, &[])
        };

        AuthRequirements {
            authenticated: site.authenticated(),
            policies: resolve(&site.policies),
            scopes: resolve(&site.requires_scopes),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.authenticated && self.policies.is_empty() && self.scopes.is_empty()
    }

    /// Require both `self` and `other`.
    pub(crate) fn merge(&mut self, other: &AuthRequirements) {
        self.authenticated |= other.authenticated;
        self.policies = merge_scope_policies(&self.policies, &other.policies);
        self.scopes = merge_scope_policies(&self.scopes, &other.scopes);
    }

    pub(crate) fn merged(&self, other: &AuthRequirements) -> AuthRequirements {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Whether a client granted access under `self` always meets `required`.
    pub(crate) fn satisfies(&self, required: &AuthRequirements) -> bool {
        (!required.authenticated || self.authenticated)
            && groups_imply(&self.policies, &required.policies)
            && groups_imply(&self.scopes, &required.scopes)
    }
}

/// Every alternative of `provided` contains some alternative of `required`.
fn groups_imply(provided: &[Vec<String>], required: &[Vec<String>]) -> bool {
    if required.is_empty() {
        return true;
    }

    !provided.is_empty()
        && provided.iter().all(|provided_group| {
            required
                .iter()
                .any(|required_group| required_group.iter().all(|item| provided_group.contains(item)))
        })
}

/// What one subgraph says about an object or interface type.
#[derive(Debug, Clone)]
pub(crate) struct TypeInGraph {
    pub(crate) definition_id: DefinitionId,
    pub(crate) keys: Vec<KeyId>,
    pub(crate) is_extension: bool,
    pub(crate) is_interface_object: bool,
    pub(crate) interfaces: Vec<StringId>,
}

impl TypeInGraph {
    pub(crate) fn new(definition: DefinitionWalker<'_>) -> Self {
        TypeInGraph {
            definition_id: definition.id,
            keys: definition.keys().map(|key| key.id).collect(),
            is_extension: definition.is_extension(),
            is_interface_object: definition.is_interface_object(),
            interfaces: definition.interfaces().map(|interface| interface.name_id()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ObjectTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, TypeInGraph>,
    pub(crate) interfaces: IndexSet<StringId>,
    pub(crate) fields: IndexMap<StringId, FieldState>,
}

#[derive(Debug, Clone)]
pub(crate) struct InterfaceTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, TypeInGraph>,
    pub(crate) interfaces: IndexSet<StringId>,
    pub(crate) fields: IndexMap<StringId, FieldState>,
    /// Objects and interfaces implementing this interface in any subgraph.
    pub(crate) implementations: IndexSet<StringId>,
}

impl InterfaceTypeState {
    pub(crate) fn interface_object_subgraphs(&self) -> impl Iterator<Item = SubgraphId> + '_ {
        self.by_graph
            .iter()
            .filter(|(_, in_graph)| in_graph.is_interface_object)
            .map(|(subgraph_id, _)| *subgraph_id)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UnionTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, DefinitionId>,
    /// Members, with the subgraphs declaring the membership.
    pub(crate) members: IndexMap<StringId, IndexSet<SubgraphId>>,
}

#[derive(Debug, Clone)]
pub(crate) struct ScalarTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, DefinitionId>,
}

#[derive(Debug, Clone)]
pub(crate) struct InputObjectTypeState {
    pub(crate) name: StringId,
    pub(crate) metadata: Metadata,
    pub(crate) by_graph: IndexMap<SubgraphId, DefinitionId>,
    pub(crate) fields: IndexMap<StringId, InputValueState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(authenticated: bool, scopes: &[&[&str]]) -> AuthRequirements {
        AuthRequirements {
            authenticated,
            policies: Vec::new(),
            scopes: scopes
                .iter()
                .map(|group| group.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn stronger_requirements_satisfy_weaker_ones() {
        let provided = auth(true, &[&["read", "write"]]);

        assert!(provided.satisfies(&auth(true, &[&["read"]])));
        assert!(provided.satisfies(&auth(false, &[])));
        assert!(provided.satisfies(&auth(false, &[&["admin"], &["write"]])));
        assert!(!provided.satisfies(&auth(false, &[&["admin"]])));
        assert!(!auth(false, &[&["read"]]).satisfies(&auth(true, &[])));
        assert!(!auth(true, &[]).satisfies(&auth(true, &[&["read"]])));
    }

    #[test]
    fn every_alternative_must_satisfy() {
        let provided = auth(false, &[&["read"], &["admin"]]);

        assert!(!provided.satisfies(&auth(false, &[&["read"]])));
        assert!(provided.satisfies(&auth(false, &[&["read"], &["admin"]])));
    }
}
