//! This is a separate module because we want to use only the public API of [Subgraphs] and avoid
//! mixing GraphQL parser logic and types with our internals.

mod directives;
mod enums;
mod fields;
mod schema_definitions;
mod usage;

use self::{
    directives::{match_directive_name, DirectiveNameMatch},
    schema_definitions::*,
};
use crate::{
    diagnostics::ErrorCode,
    subgraphs::{self, DefinitionId, DefinitionKind, DefinitionRecord, RootOperation, SubgraphId, TypeReferences},
    Subgraphs,
};
use cynic_parser::{type_system as ast, ConstValue};

/// _Service is a special type exposed by subgraphs. It should not be composed.
const SERVICE_TYPE_NAME: &str = "_Service";

/// _Entity is a special union type exposed by subgraphs. It should not be composed.
const ENTITY_UNION_NAME: &str = "_Entity";

/// Scalars and enums from the federation and link specs. They are never composed.
const MACHINERY_TYPE_NAMES: &[&str] = &[
    "_Any",
    "_FieldSet",
    "FieldSet",
    "link__Import",
    "link__Purpose",
    "federation__FieldSet",
    "federation__Scope",
    "federation__Policy",
    "federation__ContextFieldValue",
];

struct Context<'a> {
    document: &'a ast::TypeSystemDocument,
    subgraph_id: SubgraphId,
    subgraphs: &'a mut Subgraphs,
    root_type_matcher: RootTypeMatcher<'a>,
}

impl Context<'_> {
    fn push_error(&mut self, code: ErrorCode, message: String) {
        self.subgraphs.push_ingestion_diagnostic(self.subgraph_id, code, message);
    }
}

pub(crate) fn ingest_subgraph(document: &ast::TypeSystemDocument, name: &str, url: Option<&str>, subgraphs: &mut Subgraphs) {
    let _span = tracing::debug_span!("ingest_subgraph", subgraph = name).entered();

    if subgraphs.subgraph_by_name(name).is_some() {
        let subgraph_id = subgraphs.push_subgraph(name, url);
        subgraphs.push_ingestion_diagnostic(
            subgraph_id,
            ErrorCode::InvalidSubgraphName,
            format!("A subgraph named \"{name}\" was already ingested."),
        );
        return;
    }

    let subgraph_id = subgraphs.push_subgraph(name, url);

    let mut ctx = Context {
        document,
        subgraph_id,
        subgraphs,
        root_type_matcher: Default::default(),
    };

    ingest_schema_definitions(&mut ctx);
    ingest_top_level_definitions(&mut ctx);
    ingest_definition_bodies(&mut ctx);
    usage::mark_usages(&mut ctx);

    tracing::debug!(
        federation_version = %ctx.subgraphs.walk(subgraph_id).federation_version(),
        definitions = ctx.subgraphs.walk(subgraph_id).definitions().count(),
        "ingested subgraph"
    );
}

fn is_federation_machinery(ctx: &Context<'_>, type_definition: ast::TypeDefinition<'_>) -> bool {
    let name = type_definition.name();

    match type_definition {
        ast::TypeDefinition::Object(_) => name == SERVICE_TYPE_NAME,
        ast::TypeDefinition::Union(_) => name == ENTITY_UNION_NAME,
        ast::TypeDefinition::Scalar(_) | ast::TypeDefinition::Enum(_) => {
            MACHINERY_TYPE_NAMES.contains(&name) || ctx.subgraphs.is_imported_type(ctx.subgraph_id, name)
        }
        _ => false,
    }
}

fn definition_kind(ctx: &Context<'_>, type_definition: ast::TypeDefinition<'_>) -> DefinitionKind {
    match type_definition {
        ast::TypeDefinition::Object(_) => {
            let is_interface_object = type_definition
                .directives()
                .any(|directive| matches!(match_directive_name(ctx, directive.name()), DirectiveNameMatch::InterfaceObject));

            // `@interfaceObject` types are interfaces in the rest of the supergraph.
            if is_interface_object {
                DefinitionKind::Interface
            } else {
                DefinitionKind::Object
            }
        }
        ast::TypeDefinition::Interface(_) => DefinitionKind::Interface,
        ast::TypeDefinition::Union(_) => DefinitionKind::Union,
        ast::TypeDefinition::Enum(_) => DefinitionKind::Enum,
        ast::TypeDefinition::InputObject(_) => DefinitionKind::InputObject,
        ast::TypeDefinition::Scalar(_) => DefinitionKind::Scalar,
    }
}

fn ingest_top_level_definitions(ctx: &mut Context<'_>) {
    let document = ctx.document;
    let subgraph_id = ctx.subgraph_id;

    for definition in document.definitions() {
        let (type_definition, is_extension) = match definition {
            ast::Definition::Type(type_definition) => (type_definition, false),
            ast::Definition::TypeExtension(type_definition) => (type_definition, true),
            _ => continue,
        };

        if is_federation_machinery(ctx, type_definition) {
            continue;
        }

        let original_name = type_definition.name();
        let type_name = ctx.root_type_matcher.canonical_name(original_name);
        let kind = definition_kind(ctx, type_definition);

        let description = type_definition
            .description()
            .map(|description| ctx.subgraphs.strings.intern(&description.to_cow()));

        // Get or create: extensions before or after the definition land on the same record.
        let definition_id = match ctx.subgraphs.definition_by_name(type_name, subgraph_id) {
            Some(existing) if ctx.subgraphs[existing].kind == kind => {
                let record = &mut ctx.subgraphs[existing];
                record.is_extension &= is_extension;
                if record.description.is_none() {
                    record.description = description;
                }
                existing
            }
            Some(existing) => {
                let existing_kind = ctx.subgraphs[existing].kind;
                ctx.push_error(
                    ErrorCode::TypeKindMismatch,
                    format!(
                        "Type \"{type_name}\" is defined both as {} and as {}",
                        existing_kind.describe(),
                        kind.describe()
                    ),
                );
                continue;
            }
            None => {
                let name = ctx.subgraphs.strings.intern(type_name);
                let directives = ctx.subgraphs.new_directive_site();
                ctx.subgraphs.push_definition(DefinitionRecord {
                    subgraph_id,
                    name,
                    kind,
                    description,
                    directives,
                    is_extension,
                    references: TypeReferences::empty(),
                })
            }
        };

        if kind == DefinitionKind::Object {
            match ctx.root_type_matcher.match_name(original_name) {
                RootTypeMatch::Root(root) => ctx.subgraphs.set_root_type(subgraph_id, root, definition_id),
                RootTypeMatch::NotRootButHasDefaultRootName => {
                    ctx.push_error(
                        ErrorCode::RootTypeUsed,
                        format!("The {original_name} type has the default name for a root but is itself not a root. This is not valid in a federation context."),
                    );
                }
                RootTypeMatch::NotRoot => (),
            }
        }

        let directive_site_id = ctx.subgraphs[definition_id].directives;
        directives::ingest_directives(ctx, directive_site_id, type_definition.directives(), || type_name.to_owned());
        directives::ingest_keys(ctx, definition_id, type_definition.directives());

        if ctx.subgraphs[directive_site_id].extends() {
            ctx.subgraphs[definition_id].is_extension = true;
        }
    }
}

fn ingest_definition_bodies(ctx: &mut Context<'_>) {
    let document = ctx.document;
    let subgraph_id = ctx.subgraph_id;

    let type_definitions = document.definitions().filter_map(|def| match def {
        ast::Definition::Type(ty) => Some((ty, false)),
        ast::Definition::TypeExtension(ty) => Some((ty, true)),
        _ => None,
    });

    for (definition, is_extension_block) in type_definitions {
        if is_federation_machinery(ctx, definition) {
            continue;
        }

        let type_name = ctx.root_type_matcher.canonical_name(definition.name());
        let Some(definition_id) = ctx.subgraphs.definition_by_name(type_name, subgraph_id) else {
            // Kind mismatches were reported in the first pass.
            continue;
        };

        if ctx.subgraphs[definition_id].kind != definition_kind(ctx, definition) {
            continue;
        }

        let in_extension = is_extension_block || ctx.subgraphs[ctx.subgraphs[definition_id].directives].extends();

        match definition {
            ast::TypeDefinition::Union(union) => {
                for member in union.members() {
                    let member_name = ctx.root_type_matcher.canonical_name(member.name());
                    let Some(member_id) = ctx.subgraphs.definition_by_name(member_name, subgraph_id) else {
                        ctx.push_error(
                            ErrorCode::InvalidGraphql,
                            format!("Union member `{member_name}` of `{type_name}` is used but not defined in the subgraph."),
                        );
                        continue;
                    };
                    ctx.subgraphs.push_union_member(definition_id, member_id);
                }
            }
            ast::TypeDefinition::InputObject(input_object) => {
                fields::ingest_input_fields(ctx, definition_id, input_object.fields(), in_extension);
            }
            ast::TypeDefinition::Interface(interface) => {
                ingest_implemented_interfaces(ctx, definition_id, type_name, interface.implements_interfaces());
                fields::ingest_fields(ctx, definition_id, interface.fields(), in_extension);
            }
            ast::TypeDefinition::Object(object_type) => {
                ingest_implemented_interfaces(ctx, definition_id, type_name, object_type.implements_interfaces());
                fields::ingest_fields(ctx, definition_id, object_type.fields(), in_extension);
            }
            ast::TypeDefinition::Enum(enum_type) => enums::ingest_enum_values(ctx, definition_id, enum_type),
            ast::TypeDefinition::Scalar(_) => (),
        }
    }
}

fn ingest_implemented_interfaces<'a>(
    ctx: &mut Context<'_>,
    definition_id: DefinitionId,
    type_name: &str,
    interfaces: impl Iterator<Item = &'a str>,
) {
    for implemented_interface in interfaces {
        let Some(interface_id) = ctx.subgraphs.definition_by_name(implemented_interface, ctx.subgraph_id) else {
            ctx.push_error(
                ErrorCode::InvalidGraphql,
                format!("`{type_name}` implements `{implemented_interface}`, but `{implemented_interface}` is not defined in the subgraph."),
            );
            continue;
        };

        ctx.subgraphs.push_interface_impl(definition_id, interface_id);
    }
}

pub(crate) fn ast_value_to_subgraph_value(value: ConstValue<'_>, subgraphs: &mut Subgraphs) -> subgraphs::Value {
    match &value {
        ConstValue::Null(_) => subgraphs::Value::Null,
        ConstValue::Int(n) => subgraphs::Value::Int(n.as_i64()),
        ConstValue::Float(n) => subgraphs::Value::Float(n.as_f64()),
        ConstValue::String(s) => subgraphs::Value::String(subgraphs.strings.intern(s.as_str())),
        ConstValue::Boolean(b) => subgraphs::Value::Boolean(b.value()),
        ConstValue::Enum(e) => subgraphs::Value::Enum(subgraphs.strings.intern(e.name())),
        ConstValue::List(l) => {
            subgraphs::Value::List(l.items().map(|v| ast_value_to_subgraph_value(v, subgraphs)).collect())
        }
        ConstValue::Object(o) => subgraphs::Value::Object(
            o.fields()
                .map(|field| {
                    (
                        subgraphs.strings.intern(field.name()),
                        ast_value_to_subgraph_value(field.value(), subgraphs),
                    )
                })
                .collect(),
        ),
    }
}
