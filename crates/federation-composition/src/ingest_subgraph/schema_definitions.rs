use super::*;
use crate::subgraphs::{FederationVersion, KnownSpec, LinkedDefinitionRecord, LinkedSchemaRecord};

/// Custom root type names from `schema { query: ... }`. Roots are renamed to `Query`, `Mutation`
/// and `Subscription` during ingestion.
#[derive(Default)]
pub(super) struct RootTypeMatcher<'a> {
    query: Option<&'a str>,
    mutation: Option<&'a str>,
    subscription: Option<&'a str>,
}

pub(super) enum RootTypeMatch {
    Root(RootOperation),
    NotRootButHasDefaultRootName,
    NotRoot,
}

impl<'a> RootTypeMatcher<'a> {
    fn custom_name(&self, root: RootOperation) -> Option<&'a str> {
        match root {
            RootOperation::Query => self.query,
            RootOperation::Mutation => self.mutation,
            RootOperation::Subscription => self.subscription,
        }
    }

    pub(super) fn match_name(&self, name: &str) -> RootTypeMatch {
        for root in RootOperation::ALL {
            match self.custom_name(root) {
                Some(custom) if custom == name => return RootTypeMatch::Root(root),
                Some(_) if name == root.type_name() => return RootTypeMatch::NotRootButHasDefaultRootName,
                None if name == root.type_name() => return RootTypeMatch::Root(root),
                _ => (),
            }
        }

        RootTypeMatch::NotRoot
    }

    /// The name the type is composed under.
    pub(super) fn canonical_name<'b>(&self, name: &'b str) -> &'b str {
        for root in RootOperation::ALL {
            if self.custom_name(root).is_some_and(|custom| custom == name) {
                return root.type_name();
            }
        }

        name
    }
}

pub(super) fn ingest_schema_definitions(ctx: &mut Context<'_>) {
    let document = ctx.document;

    for definition in document.definitions() {
        let schema = match definition {
            ast::Definition::Schema(schema) | ast::Definition::SchemaExtension(schema) => schema,
            _ => continue,
        };

        if let Some(query) = schema.query_type() {
            ctx.root_type_matcher.query = Some(query.named_type());
        }

        if let Some(mutation) = schema.mutation_type() {
            ctx.root_type_matcher.mutation = Some(mutation.named_type());
        }

        if let Some(subscription) = schema.subscription_type() {
            ctx.root_type_matcher.subscription = Some(subscription.named_type());
        }

        for directive in schema.directives() {
            if directive.name() == "link" {
                ingest_link_directive(ctx, directive);
            }
        }
    }
}

fn ingest_link_directive(ctx: &mut Context<'_>, directive: ast::Directive<'_>) {
    let Some(url) = directive.argument("url").and_then(|argument| argument.value().as_str()) else {
        ctx.push_error(
            ErrorCode::InvalidLinkDirectiveUsage,
            "Invalid @link directive: the `url` argument is required.".to_owned(),
        );
        return;
    };

    let Some((spec_name, version)) = parse_spec_url(url) else {
        ctx.push_error(
            ErrorCode::InvalidLinkDirectiveUsage,
            format!("Invalid @link directive: \"{url}\" is not a valid spec url."),
        );
        return;
    };

    let spec = KnownSpec::from_name(&spec_name);

    if spec == KnownSpec::Federation {
        match FederationVersion::from_link_version(&version) {
            Some(federation_version) => ctx.subgraphs.set_federation_version(ctx.subgraph_id, federation_version),
            None => {
                ctx.push_error(
                    ErrorCode::InvalidLinkDirectiveUsage,
                    format!("Invalid @link directive: unsupported federation version \"{version}\"."),
                );
                return;
            }
        }
    }

    let namespace = directive
        .argument("as")
        .and_then(|argument| argument.value().as_str())
        .unwrap_or(&spec_name)
        .trim_start_matches('@')
        .to_owned();

    tracing::trace!(url, namespace = namespace.as_str(), "linked schema");

    let url_id = ctx.subgraphs.strings.intern(url);
    let namespace_id = ctx.subgraphs.strings.intern(&namespace);

    let linked_schema_id = ctx.subgraphs.push_linked_schema(LinkedSchemaRecord {
        subgraph_id: ctx.subgraph_id,
        url: url_id,
        spec,
        namespace: Some(namespace_id),
    });

    let imports = directive
        .argument("import")
        .into_iter()
        .flat_map(|argument| argument.value().as_items())
        .flatten();

    for import in imports {
        let (name, alias) = match import {
            ConstValue::String(name) => (name.as_str(), None),
            ConstValue::Object(object) => {
                let string_field = |field_name: &str| {
                    object
                        .fields()
                        .find(|field| field.name() == field_name)
                        .and_then(|field| field.value().as_str())
                };

                let Some(name) = string_field("name") else {
                    ctx.push_error(
                        ErrorCode::InvalidLinkDirectiveUsage,
                        format!("Invalid @link import in \"{url}\": the `name` field is required."),
                    );
                    continue;
                };

                (name, string_field("as"))
            }
            _ => {
                ctx.push_error(
                    ErrorCode::InvalidLinkDirectiveUsage,
                    format!("Invalid @link import in \"{url}\": expected a string or an object."),
                );
                continue;
            }
        };

        let is_directive = name.starts_with('@');

        if let Some(alias) = alias {
            if alias.starts_with('@') != is_directive {
                let message = if is_directive {
                    format!("Invalid @link import renaming: directive \"{name}\" imported name should start with a '@' character, but got \"{alias}\".")
                } else {
                    format!("Invalid @link import renaming: type \"{name}\" imported name should not start with a '@' character, but got \"{alias}\".")
                };
                ctx.push_error(ErrorCode::LinkImportNameMismatch, message);
                continue;
            }
        }

        let local_name = alias.unwrap_or(name).trim_start_matches('@');
        let imported_as = ctx.subgraphs.strings.intern(local_name);
        let original_name = ctx.subgraphs.strings.intern(name.trim_start_matches('@'));

        ctx.subgraphs.push_linked_definition(
            ctx.subgraph_id,
            imported_as,
            LinkedDefinitionRecord {
                linked_schema_id,
                original_name,
                is_directive,
            },
        );
    }
}

/// `https://specs.apollo.dev/federation/v2.3` -> `("federation", "v2.3")`
fn parse_spec_url(url: &str) -> Option<(String, String)> {
    let url = url::Url::parse(url).ok()?;
    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty()).rev();
    let version = segments.next()?;
    let name = segments.next()?;

    if !version.starts_with('v') {
        return None;
    }

    Some((name.to_owned(), version.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_urls() {
        assert_eq!(
            parse_spec_url("https://specs.apollo.dev/federation/v2.3"),
            Some(("federation".to_owned(), "v2.3".to_owned()))
        );
        assert_eq!(
            parse_spec_url("https://specs.apollo.dev/requiresScopes/v0.1/"),
            Some(("requiresScopes".to_owned(), "v0.1".to_owned()))
        );
        assert_eq!(parse_spec_url("https://specs.apollo.dev/federation"), None);
        assert_eq!(parse_spec_url("not a url"), None);
    }

    #[test]
    fn custom_root_names() {
        let matcher = RootTypeMatcher {
            query: Some("RootQuery"),
            mutation: None,
            subscription: None,
        };

        assert_eq!(matcher.canonical_name("RootQuery"), "Query");
        assert_eq!(matcher.canonical_name("User"), "User");
        assert!(matches!(
            matcher.match_name("RootQuery"),
            RootTypeMatch::Root(RootOperation::Query)
        ));
        assert!(matches!(
            matcher.match_name("Query"),
            RootTypeMatch::NotRootButHasDefaultRootName
        ));
        assert!(matches!(
            matcher.match_name("Mutation"),
            RootTypeMatch::Root(RootOperation::Mutation)
        ));
    }
}
