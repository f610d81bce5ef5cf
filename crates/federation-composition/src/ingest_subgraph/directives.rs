mod arguments;
mod match_name;

pub(super) use match_name::*;

use self::arguments::*;
use super::*;
use cynic_parser_deser::ConstDeserializer;
use crate::subgraphs::{
    Deprecated, DirectiveFlags, DirectiveSiteId, ListSize, OverrideDirective, SpecFeatures, StringId,
};

pub(super) fn ingest_directives(
    ctx: &mut Context<'_>,
    directive_site_id: DirectiveSiteId,
    directives_node: ast::iter::Iter<'_, ast::Directive<'_>>,
    location: impl Fn() -> String,
) {
    let subgraph_id = ctx.subgraph_id;

    for directive in directives_node {
        match match_directive_name(ctx, directive.name()) {
            DirectiveNameMatch::NoMatch | DirectiveNameMatch::Key => (),
            DirectiveNameMatch::Authenticated => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::AUTHENTICATED;
                ctx.subgraphs.add_features(subgraph_id, SpecFeatures::AUTHENTICATED);
            }
            DirectiveNameMatch::Cost => match directive.deserialize::<CostDirective>() {
                Ok(cost) => {
                    ctx.subgraphs[directive_site_id].cost = Some(cost.weight);
                    ctx.subgraphs.add_features(subgraph_id, SpecFeatures::COST);
                }
                Err(error) => ctx.push_error(
                    ErrorCode::DirectiveCostInvalidWeight,
                    format!("Invalid @cost directive at {}: {error}", location()),
                ),
            },
            DirectiveNameMatch::ListSize => match directive.deserialize::<ListSizeDirective<'_>>() {
                Ok(list_size) => {
                    let list_size = ListSize {
                        assumed_size: list_size.assumed_size,
                        slicing_arguments: intern_all(ctx, list_size.slicing_arguments),
                        sized_fields: intern_all(ctx, list_size.sized_fields),
                        require_one_slicing_argument: list_size.require_one_slicing_argument,
                    };

                    ctx.subgraphs[directive_site_id].list_size = Some(list_size);
                    ctx.subgraphs.add_features(subgraph_id, SpecFeatures::COST);
                }
                Err(error) => ctx.push_error(
                    ErrorCode::ListSizeInvalidAssumedSize,
                    format!("Invalid @listSize directive at {}: {error}", location()),
                ),
            },
            DirectiveNameMatch::Deprecated => match directive.deserialize::<DeprecatedDirective<'_>>() {
                Ok(deprecated) => {
                    let reason = deprecated.reason.map(|reason| ctx.subgraphs.strings.intern(reason));
                    ctx.subgraphs[directive_site_id].deprecated = Some(Deprecated { reason });
                }
                Err(error) => ctx.push_error(
                    ErrorCode::InvalidGraphql,
                    format!("Invalid @deprecated directive at {}: {error}", location()),
                ),
            },
            DirectiveNameMatch::Extends => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::EXTENDS;
            }
            DirectiveNameMatch::External => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::EXTERNAL;
            }
            DirectiveNameMatch::Inaccessible => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::INACCESSIBLE;
                ctx.subgraphs.add_features(subgraph_id, SpecFeatures::INACCESSIBLE);
            }
            DirectiveNameMatch::InterfaceObject => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::INTERFACE_OBJECT;
            }
            DirectiveNameMatch::Override => {
                let from = directive
                    .argument("from")
                    .and_then(|v| v.value().as_str())
                    .map(|s| ctx.subgraphs.strings.intern(s));

                let label = directive
                    .argument("label")
                    .and_then(|v| v.value().as_str())
                    .map(|s| ctx.subgraphs.strings.intern(s));

                let Some(from) = from else {
                    ctx.push_error(
                        ErrorCode::InvalidGraphql,
                        format!("Invalid @override directive at {}: the `from` argument is required.", location()),
                    );
                    continue;
                };

                ctx.subgraphs[directive_site_id].r#override = Some(OverrideDirective { from, label });
            }
            DirectiveNameMatch::Policy => {
                let policies = string_groups(ctx, directive, "policies");
                ctx.subgraphs[directive_site_id].policies.extend(policies);
                ctx.subgraphs.add_features(subgraph_id, SpecFeatures::POLICY);
            }
            DirectiveNameMatch::RequiresScopes => {
                let scopes = string_groups(ctx, directive, "scopes");
                ctx.subgraphs[directive_site_id].requires_scopes.extend(scopes);
                ctx.subgraphs.add_features(subgraph_id, SpecFeatures::REQUIRES_SCOPES);
            }
            DirectiveNameMatch::Provides => {
                let fields_arg = directive.argument("fields").and_then(|arg| arg.value().as_str());
                let Some(fields_arg) = fields_arg else {
                    ctx.push_error(
                        ErrorCode::ProvidesInvalidFieldsType,
                        format!("On field \"{}\", for @provides: the `fields` argument must be a string.", location()),
                    );
                    continue;
                };

                match ctx.subgraphs.field_set_from_str(fields_arg, "provides", "fields") {
                    Ok(field_set) => ctx.subgraphs[directive_site_id].provides = Some(field_set),
                    Err(err) => ctx.push_error(
                        ErrorCode::ProvidesInvalidFields,
                        format!("On field \"{}\", for @provides(fields: \"{fields_arg}\"): {err}", location()),
                    ),
                }
            }
            DirectiveNameMatch::Requires => {
                let fields_arg = directive.argument("fields").and_then(|arg| arg.value().as_str());
                let Some(fields_arg) = fields_arg else {
                    ctx.push_error(
                        ErrorCode::RequiresInvalidFieldsType,
                        format!("On field \"{}\", for @requires: the `fields` argument must be a string.", location()),
                    );
                    continue;
                };

                match ctx.subgraphs.field_set_from_str(fields_arg, "requires", "fields") {
                    Ok(field_set) => ctx.subgraphs[directive_site_id].requires = Some(field_set),
                    Err(err) => ctx.push_error(
                        ErrorCode::RequiresInvalidFields,
                        format!("On field \"{}\", for @requires(fields: \"{fields_arg}\"): {err}", location()),
                    ),
                }
            }
            DirectiveNameMatch::Shareable => {
                ctx.subgraphs[directive_site_id].flags |= DirectiveFlags::SHAREABLE;
            }
            DirectiveNameMatch::Tag => {
                let Some(name) = directive.argument("name").and_then(|argument| argument.value().as_str()) else {
                    continue;
                };

                let name = ctx.subgraphs.strings.intern(name);
                ctx.subgraphs[directive_site_id].tags.insert(name);
                ctx.subgraphs.add_features(subgraph_id, SpecFeatures::TAG);
            }
        }
    }
}

/// `[["a", "b"], ["c"]]` arguments of `@policy` and `@requiresScopes`.
fn string_groups(ctx: &mut Context<'_>, directive: ast::Directive<'_>, argument_name: &str) -> Vec<Vec<StringId>> {
    let groups = directive
        .argument(argument_name)
        .into_iter()
        .flat_map(|argument| argument.value().as_items())
        .flatten();

    let mut out = Vec::new();

    for group in groups {
        let group: Vec<StringId> = match group {
            ConstValue::List(items) => items
                .items()
                .filter_map(|item| item.as_str())
                .map(|item| ctx.subgraphs.strings.intern(item))
                .collect(),
            _ => continue,
        };

        if !out.contains(&group) {
            out.push(group);
        }
    }

    out
}

fn intern_all(ctx: &mut Context<'_>, strings: Vec<&str>) -> Vec<StringId> {
    strings
        .into_iter()
        .map(|string| ctx.subgraphs.strings.intern(string))
        .collect()
}

pub(super) fn ingest_keys(
    ctx: &mut Context<'_>,
    definition_id: DefinitionId,
    directives_node: ast::iter::Iter<'_, ast::Directive<'_>>,
) {
    for directive in directives_node {
        if match_directive_name(ctx, directive.name()) != DirectiveNameMatch::Key {
            continue;
        }

        let type_name = ctx.subgraphs.walk(definition_id).name().to_owned();

        let Some(fields_arg) = directive.argument("fields").and_then(|v| v.value().as_str()) else {
            ctx.push_error(
                ErrorCode::KeyInvalidFieldsType,
                format!("On type \"{type_name}\", for @key: the `fields` argument must be a string."),
            );
            continue;
        };

        let is_resolvable = directive
            .argument("resolvable")
            .and_then(|v| v.value().as_bool())
            .unwrap_or(true); // defaults to true

        match ctx.subgraphs.field_set_from_str(fields_arg, "key", "fields") {
            Ok(field_set) => {
                ctx.subgraphs.push_key(definition_id, field_set, is_resolvable);
            }
            Err(err) => ctx.push_error(
                ErrorCode::KeyInvalidFields,
                format!("On type \"{type_name}\", for @key(fields: \"{fields_arg}\"): {err}"),
            ),
        }
    }
}
