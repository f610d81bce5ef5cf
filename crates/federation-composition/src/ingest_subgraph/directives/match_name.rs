use super::*;
use crate::subgraphs::KnownSpec;

/// The directives composition understands, after resolving `@link` imports and namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::ingest_subgraph) enum DirectiveNameMatch {
    NoMatch,
    Authenticated,
    Cost,
    Deprecated,
    Extends,
    External,
    Inaccessible,
    InterfaceObject,
    Key,
    ListSize,
    Override,
    Policy,
    Provides,
    Requires,
    RequiresScopes,
    Shareable,
    Tag,
}

/// Resolve a directive name as written in the subgraph.
///
/// - `@link(import:)` entries win, with their `as` alias if any.
/// - `@namespace__name` resolves against the linked schema with that namespace.
/// - Federation v1 subgraphs have no `@link`: the federation directives are matched by name.
pub(in crate::ingest_subgraph) fn match_directive_name(ctx: &Context<'_>, name: &str) -> DirectiveNameMatch {
    if name == "deprecated" {
        return DirectiveNameMatch::Deprecated;
    }

    let subgraphs = &*ctx.subgraphs;

    if let Some(import) = subgraphs.linked_definition(ctx.subgraph_id, name) {
        if !import.is_directive {
            return DirectiveNameMatch::NoMatch;
        }

        let spec = subgraphs[import.linked_schema_id].spec;
        return match_in_spec(spec, &subgraphs[import.original_name]);
    }

    if let Some((namespace, directive_name)) = name.split_once("__") {
        if let Some(linked_schema_id) = subgraphs.linked_schema_by_namespace(ctx.subgraph_id, namespace) {
            return match_in_spec(subgraphs[linked_schema_id].spec, directive_name);
        }
    }

    if subgraphs.walk(ctx.subgraph_id).federation_version().is_v1() {
        return match_federation_name(name);
    }

    DirectiveNameMatch::NoMatch
}

fn match_in_spec(spec: KnownSpec, name: &str) -> DirectiveNameMatch {
    match (spec, name) {
        (KnownSpec::Federation, _) => match_federation_name(name),
        (KnownSpec::Tag, "tag") => DirectiveNameMatch::Tag,
        (KnownSpec::Inaccessible, "inaccessible") => DirectiveNameMatch::Inaccessible,
        (KnownSpec::Authenticated, "authenticated") => DirectiveNameMatch::Authenticated,
        (KnownSpec::RequiresScopes, "requiresScopes") => DirectiveNameMatch::RequiresScopes,
        (KnownSpec::Policy, "policy") => DirectiveNameMatch::Policy,
        (KnownSpec::Cost, "cost") => DirectiveNameMatch::Cost,
        (KnownSpec::Cost, "listSize") => DirectiveNameMatch::ListSize,
        _ => DirectiveNameMatch::NoMatch,
    }
}

fn match_federation_name(name: &str) -> DirectiveNameMatch {
    match name {
        "authenticated" => DirectiveNameMatch::Authenticated,
        "cost" => DirectiveNameMatch::Cost,
        "extends" => DirectiveNameMatch::Extends,
        "external" => DirectiveNameMatch::External,
        "inaccessible" => DirectiveNameMatch::Inaccessible,
        "interfaceObject" => DirectiveNameMatch::InterfaceObject,
        "key" => DirectiveNameMatch::Key,
        "listSize" => DirectiveNameMatch::ListSize,
        "override" => DirectiveNameMatch::Override,
        "policy" => DirectiveNameMatch::Policy,
        "provides" => DirectiveNameMatch::Provides,
        "requires" => DirectiveNameMatch::Requires,
        "requiresScopes" => DirectiveNameMatch::RequiresScopes,
        "shareable" => DirectiveNameMatch::Shareable,
        "tag" => DirectiveNameMatch::Tag,
        _ => DirectiveNameMatch::NoMatch,
    }
}
