//! Federation rules checked on the merged state, before satisfiability. Each rule is a visitor
//! over the supergraph types and fields; every rule sees every entity and all violations are
//! reported.

mod auth_on_interface;
mod auth_on_requires;
mod cost_on_interface_field;
mod enum_values;
mod external_missing_on_base;
mod external_unused;
mod field_set_selections;
mod field_types;
mod implemented_by_inaccessible;
mod input_object_fields;
mod interface_keys;
mod interface_object_usage;
mod invalid_field_sharing;
mod list_size;
mod r#override;
mod query_root;

use crate::{
    diagnostics::{Diagnostics, ErrorCode},
    subgraphs::{StringId, SubgraphId, Subgraphs},
    supergraph::{
        EnumTypeState, FieldState, InputObjectTypeState, InputValueState, InterfaceTypeState, MergedDefinition,
        ObjectTypeState, SupergraphState, UnionTypeState,
    },
};
use itertools::Itertools;

pub(crate) struct ValidationContext<'a> {
    pub(crate) subgraphs: &'a Subgraphs,
    pub(crate) supergraph: &'a SupergraphState,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> ValidationContext<'a> {
    pub(crate) fn str(&self, id: StringId) -> &'a str {
        &self.subgraphs[id]
    }

    pub(crate) fn subgraph_name(&self, id: SubgraphId) -> &'a str {
        self.subgraphs.walk(id).name()
    }

    pub(crate) fn coordinate(&self, parent: StringId, field: StringId) -> String {
        format!("{}.{}", self.str(parent), self.str(field))
    }

    pub(crate) fn push_fatal(&mut self, code: ErrorCode, message: String) {
        self.diagnostics.push_fatal(code, message);
    }

    pub(crate) fn push_warning(&mut self, code: ErrorCode, message: String) {
        self.diagnostics.push_warning(code, message);
    }
}

/// `subgraph "a"`, `subgraphs "a" and "b"`, `subgraphs "a", "b" and "c"`.
pub(crate) fn human_readable_subgraphs<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<String> = names.into_iter().map(|name| format!("\"{name}\"")).collect();

    match names.as_slice() {
        [] => String::from("no subgraph"),
        [single] => format!("subgraph {single}"),
        [init @ .., last] => format!("subgraphs {} and {last}", init.iter().join(", ")),
    }
}

/// What a rule gets to see, one at a time.
#[derive(Clone, Copy)]
pub(crate) enum Entity<'a> {
    ObjectType(&'a ObjectTypeState),
    ObjectTypeField(&'a ObjectTypeState, &'a FieldState),
    InterfaceType(&'a InterfaceTypeState),
    InterfaceTypeField(&'a InterfaceTypeState, &'a FieldState),
    UnionType(&'a UnionTypeState),
    EnumType(&'a EnumTypeState),
    InputObjectType(&'a InputObjectTypeState),
    InputObjectTypeField(&'a InputObjectTypeState, &'a InputValueState),
}

pub(crate) trait ValidationRule {
    fn object_type(&mut self, _ctx: &mut ValidationContext<'_>, _object: &ObjectTypeState) {}

    fn object_type_field(&mut self, _ctx: &mut ValidationContext<'_>, _object: &ObjectTypeState, _field: &FieldState) {}

    fn interface_type(&mut self, _ctx: &mut ValidationContext<'_>, _interface: &InterfaceTypeState) {}

    fn interface_type_field(
        &mut self,
        _ctx: &mut ValidationContext<'_>,
        _interface: &InterfaceTypeState,
        _field: &FieldState,
    ) {
    }

    fn union_type(&mut self, _ctx: &mut ValidationContext<'_>, _union: &UnionTypeState) {}

    fn enum_type(&mut self, _ctx: &mut ValidationContext<'_>, _enum: &EnumTypeState) {}

    fn input_object_type(&mut self, _ctx: &mut ValidationContext<'_>, _input_object: &InputObjectTypeState) {}

    fn input_object_type_field(
        &mut self,
        _ctx: &mut ValidationContext<'_>,
        _input_object: &InputObjectTypeState,
        _field: &InputValueState,
    ) {
    }

    /// Called once every entity was visited.
    fn finish(&mut self, _ctx: &mut ValidationContext<'_>) {}
}

fn dispatch(rule: &mut dyn ValidationRule, ctx: &mut ValidationContext<'_>, entity: Entity<'_>) {
    match entity {
        Entity::ObjectType(object) => rule.object_type(ctx, object),
        Entity::ObjectTypeField(object, field) => rule.object_type_field(ctx, object, field),
        Entity::InterfaceType(interface) => rule.interface_type(ctx, interface),
        Entity::InterfaceTypeField(interface, field) => rule.interface_type_field(ctx, interface, field),
        Entity::UnionType(union) => rule.union_type(ctx, union),
        Entity::EnumType(r#enum) => rule.enum_type(ctx, r#enum),
        Entity::InputObjectType(input_object) => rule.input_object_type(ctx, input_object),
        Entity::InputObjectTypeField(input_object, field) => rule.input_object_type_field(ctx, input_object, field),
    }
}

fn entities(supergraph: &SupergraphState) -> impl Iterator<Item = Entity<'_>> + '_ {
    supergraph
        .definitions
        .values()
        .flat_map(|definition| -> Box<dyn Iterator<Item = Entity<'_>> + '_> {
            match definition {
                MergedDefinition::Object(object) => Box::new(
                    std::iter::once(Entity::ObjectType(object))
                        .chain(object.fields.values().map(move |field| Entity::ObjectTypeField(object, field))),
                ),
                MergedDefinition::Interface(interface) => Box::new(
                    std::iter::once(Entity::InterfaceType(interface)).chain(
                        interface
                            .fields
                            .values()
                            .map(move |field| Entity::InterfaceTypeField(interface, field)),
                    ),
                ),
                MergedDefinition::Union(union) => Box::new(std::iter::once(Entity::UnionType(union))),
                MergedDefinition::Enum(r#enum) => Box::new(std::iter::once(Entity::EnumType(r#enum))),
                MergedDefinition::Scalar(_) => Box::new(std::iter::empty()),
                MergedDefinition::InputObject(input_object) => Box::new(
                    std::iter::once(Entity::InputObjectType(input_object)).chain(
                        input_object
                            .fields
                            .values()
                            .map(move |field| Entity::InputObjectTypeField(input_object, field)),
                    ),
                ),
            }
        })
}

fn rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(query_root::QueryRoot::default()),
        Box::new(external_missing_on_base::ExternalMissingOnBase),
        Box::new(external_unused::ExternalUnused),
        Box::new(invalid_field_sharing::InvalidFieldSharing),
        Box::new(r#override::OverrideRules),
        Box::new(auth_on_requires::AuthOnRequires),
        Box::new(auth_on_interface::AuthOnInterface),
        Box::new(list_size::ListSizeSlicingArguments),
        Box::new(cost_on_interface_field::CostOnInterfaceField),
        Box::new(interface_keys::InterfaceKeyNotOnImplementation),
        Box::new(interface_object_usage::InterfaceObjectUsage),
        Box::new(field_types::FieldTypes),
        Box::new(implemented_by_inaccessible::ImplementedByInaccessible),
        Box::new(field_set_selections::FieldSetSelections),
        Box::new(enum_values::EnumValues),
        Box::new(input_object_fields::RequiredInputFieldMissingInSomeSubgraph),
    ]
}

/// Run every rule over every type and field of the merged state.
pub(crate) fn validate(subgraphs: &Subgraphs, supergraph: &SupergraphState, diagnostics: &mut Diagnostics) {
    let _span = tracing::debug_span!("validate").entered();

    let mut rules = rules();
    let mut ctx = ValidationContext {
        subgraphs,
        supergraph,
        diagnostics,
    };

    for entity in entities(supergraph) {
        for rule in &mut rules {
            dispatch(rule.as_mut(), &mut ctx, entity);
        }
    }

    for rule in &mut rules {
        rule.finish(&mut ctx);
    }

    tracing::debug!(rules = rules.len(), diagnostics = ctx.diagnostics.len(), "validation done");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subgraph_lists() {
        assert_eq!(human_readable_subgraphs(["a"]), r#"subgraph "a""#);
        assert_eq!(human_readable_subgraphs(["a", "b"]), r#"subgraphs "a" and "b""#);
        assert_eq!(human_readable_subgraphs(["a", "b", "c"]), r#"subgraphs "a", "b" and "c""#);
    }
}
