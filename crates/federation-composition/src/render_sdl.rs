//! SDL printing of a [`SupergraphModel`]: the supergraph schema with its `join__` machinery, and
//! the API schema clients see.

use crate::supergraph_model::*;
use std::{
    collections::HashSet,
    fmt::{self, Display},
};

const INDENT: &str = "  ";

pub(crate) fn render_supergraph_sdl(model: &SupergraphModel) -> String {
    SupergraphSdl(model).to_string()
}

/// The API schema: no composition machinery, nothing `@inaccessible`, and no reference to a type
/// that was hidden.
pub(crate) fn render_public_sdl(model: &SupergraphModel) -> String {
    let printer = Printer {
        hidden_types: hidden_types(model),
        public: true,
    };

    PublicSdl { model, printer }.to_string()
}

/// Write a string literal with GraphQL escapes.
pub(crate) fn write_quoted<W: fmt::Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;

    for c in value.chars() {
        match c {
            '"' => out.write_str(r#"\""#)?,
            '\\' => out.write_str(r"\\")?,
            '\n' => out.write_str(r"\n")?,
            '\r' => out.write_str(r"\r")?,
            '\t' => out.write_str(r"\t")?,
            c if c.is_control() => write!(out, "\\u{:04X}", c as u32)?,
            c => out.write_char(c)?,
        }
    }

    out.write_char('"')
}

struct SupergraphSdl<'a>(&'a SupergraphModel);

impl Display for SupergraphSdl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        let printer = Printer {
            hidden_types: HashSet::new(),
            public: false,
        };

        write_schema_definition(model, f)?;
        write_machinery(model, f)?;

        for definition in &model.type_definitions {
            f.write_str("\n")?;
            printer.write_type_definition(definition, f)?;
        }

        Ok(())
    }
}

struct PublicSdl<'a> {
    model: &'a SupergraphModel,
    printer: Printer<'a>,
}

impl Display for PublicSdl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut definitions = self
            .model
            .type_definitions
            .iter()
            .filter(|definition| self.printer.is_type_visible(&definition.name))
            .peekable();

        while let Some(definition) = definitions.next() {
            self.printer.write_type_definition(definition, f)?;

            if definitions.peek().is_some() {
                f.write_str("\n")?;
            }
        }

        Ok(())
    }
}

fn write_schema_definition(model: &SupergraphModel, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("schema\n")?;

    for link in &model.links {
        f.write_str(INDENT)?;
        let mut directive = Directive::new("link").arg("url", link.url.as_str());

        if let Some(purpose) = &link.purpose {
            directive = directive.arg("for", DirectiveValue::EnumValue(purpose.clone()));
        }

        if !link.import.is_empty() {
            directive = directive.arg("import", link.import.clone());
        }

        write_directive(&directive, f)?;
        f.write_str("\n")?;
    }

    f.write_str("{\n")?;

    let roots = &model.root_operation_types;
    for (keyword, root) in [
        ("query", &roots.query),
        ("mutation", &roots.mutation),
        ("subscription", &roots.subscription),
    ] {
        if let Some(root) = root {
            writeln!(f, "{INDENT}{keyword}: {root}")?;
        }
    }

    f.write_str("}\n")
}

const JOIN_DEFINITIONS: &str = r#"directive @join__enumValue(graph: join__Graph!) repeatable on ENUM_VALUE

directive @join__graph(name: String!, url: String!) on ENUM_VALUE

directive @join__implements(graph: join__Graph!, interface: String!) repeatable on OBJECT | INTERFACE

directive @join__type(graph: join__Graph!, key: join__FieldSet, extension: Boolean! = false, resolvable: Boolean! = true, isInterfaceObject: Boolean! = false) repeatable on OBJECT | INTERFACE | UNION | ENUM | INPUT_OBJECT | SCALAR

directive @join__unionMember(graph: join__Graph!, member: String!) repeatable on UNION

directive @link(url: String, as: String, for: link__Purpose, import: [link__Import]) repeatable on SCHEMA
"#;

const JOIN_FIELD_V03: &str = "directive @join__field(graph: join__Graph, requires: join__FieldSet, provides: join__FieldSet, type: String, external: Boolean, override: String, usedOverridden: Boolean) repeatable on FIELD_DEFINITION | INPUT_FIELD_DEFINITION\n";

const JOIN_FIELD_V04: &str = "directive @join__field(graph: join__Graph, requires: join__FieldSet, provides: join__FieldSet, type: String, external: Boolean, override: String, usedOverridden: Boolean, overrideLabel: String) repeatable on FIELD_DEFINITION | INPUT_FIELD_DEFINITION\n";

/// Definitions and supporting scalars of the feature specs, by spec URL prefix.
const FEATURE_DEFINITIONS: &[(&str, &str)] = &[
    (
        "https://specs.apollo.dev/tag/",
        "directive @tag(name: String!) repeatable on FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION | SCHEMA\n",
    ),
    (
        "https://specs.apollo.dev/inaccessible/",
        "directive @inaccessible on FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION\n",
    ),
    (
        "https://specs.apollo.dev/authenticated/",
        "directive @authenticated on FIELD_DEFINITION | OBJECT | INTERFACE | SCALAR | ENUM\n",
    ),
    (
        "https://specs.apollo.dev/requiresScopes/",
        "directive @requiresScopes(scopes: [[requiresScopes__Scope!]!]!) on FIELD_DEFINITION | OBJECT | INTERFACE | SCALAR | ENUM\n\nscalar requiresScopes__Scope\n",
    ),
    (
        "https://specs.apollo.dev/policy/",
        "directive @policy(policies: [[policy__Policy!]!]!) on FIELD_DEFINITION | OBJECT | INTERFACE | SCALAR | ENUM\n\nscalar policy__Policy\n",
    ),
    (
        "https://specs.apollo.dev/cost/",
        "directive @cost(weight: Int!) on ARGUMENT_DEFINITION | ENUM | FIELD_DEFINITION | INPUT_FIELD_DEFINITION | OBJECT | SCALAR\n\ndirective @listSize(assumedSize: Int, slicingArguments: [String!], sizedFields: [String!], requireOneSlicingArgument: Boolean = true) on FIELD_DEFINITION\n",
    ),
];

fn write_machinery(model: &SupergraphModel, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\n")?;
    f.write_str(JOIN_DEFINITIONS)?;
    f.write_str("\n")?;

    f.write_str(match model.join_version() {
        Some("v0.4") => JOIN_FIELD_V04,
        _ => JOIN_FIELD_V03,
    })?;

    for (prefix, definitions) in FEATURE_DEFINITIONS {
        if model.links.iter().any(|link| link.url.starts_with(prefix)) {
            f.write_str("\n")?;
            f.write_str(definitions)?;
        }
    }

    f.write_str("\nenum join__Graph {\n")?;
    for subgraph in &model.subgraphs {
        f.write_str(INDENT)?;
        f.write_str(&subgraph.enum_value)?;
        f.write_str(" ")?;
        let directive = Directive::new("join__graph")
            .arg("name", subgraph.name.as_str())
            .arg("url", subgraph.url.as_deref().unwrap_or_default());
        write_directive(&directive, f)?;
        f.write_str("\n")?;
    }
    f.write_str("}\n")?;

    f.write_str("\nscalar join__FieldSet\n\nscalar link__Import\n\nenum link__Purpose {\n")?;
    writeln!(f, "{INDENT}SECURITY")?;
    writeln!(f, "{INDENT}EXECUTION")?;
    f.write_str("}\n")
}

/// The named type of a type reference: `[User!]!` is `User`.
fn named_type(r#type: &str) -> &str {
    r#type.trim_matches(|c| matches!(c, '[' | ']' | '!'))
}

/// Inaccessible types, and the types left without any visible field, member or value, until
/// nothing changes.
fn hidden_types(model: &SupergraphModel) -> HashSet<&str> {
    let mut hidden: HashSet<&str> = model
        .type_definitions
        .iter()
        .filter(|definition| definition.is_inaccessible())
        .map(|definition| definition.name.as_str())
        .collect();

    loop {
        let before = hidden.len();

        for definition in &model.type_definitions {
            if hidden.contains(definition.name.as_str()) {
                continue;
            }

            let empty = match &definition.kind {
                TypeDefinitionKind::Object { fields, .. } | TypeDefinitionKind::Interface { fields, .. } => fields
                    .iter()
                    .all(|field| field.is_inaccessible() || hidden.contains(named_type(&field.r#type))),
                TypeDefinitionKind::InputObject { fields } => fields
                    .iter()
                    .all(|field| field.is_inaccessible() || hidden.contains(named_type(&field.r#type))),
                TypeDefinitionKind::Union { members } => {
                    members.iter().all(|member| hidden.contains(member.as_str()))
                }
                TypeDefinitionKind::Enum { values } => values.iter().all(|value| value.is_inaccessible()),
                TypeDefinitionKind::Scalar => false,
            };

            if empty {
                hidden.insert(definition.name.as_str());
            }
        }

        if hidden.len() == before {
            return hidden;
        }
    }
}

struct Printer<'a> {
    hidden_types: HashSet<&'a str>,
    /// Print the API schema rather than the supergraph.
    public: bool,
}

impl Printer<'_> {
    fn is_type_visible(&self, name: &str) -> bool {
        !self.hidden_types.contains(name)
    }

    fn keeps_directive(&self, directive: &Directive) -> bool {
        !self.public || directive.name == "deprecated"
    }

    fn is_visible<T: HasDirectives>(&self, element: &T, r#type: &str) -> bool {
        !self.public || (!element.is_inaccessible() && self.is_type_visible(named_type(r#type)))
    }

    fn write_type_definition(&self, definition: &TypeDefinition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(definition.description.as_deref(), "", f)?;

        f.write_str(definition.kind.keyword())?;
        f.write_str(" ")?;
        f.write_str(&definition.name)?;

        if let TypeDefinitionKind::Object { implements, .. } | TypeDefinitionKind::Interface { implements, .. } =
            &definition.kind
        {
            let mut implements = implements.iter().filter(|name| self.is_type_visible(name)).peekable();

            if implements.peek().is_some() {
                f.write_str(" implements ")?;
                while let Some(interface) = implements.next() {
                    f.write_str(interface)?;
                    if implements.peek().is_some() {
                        f.write_str(" & ")?;
                    }
                }
            }
        }

        let mut multiline = false;
        for directive in definition.directives.iter().filter(|d| self.keeps_directive(d)) {
            f.write_str("\n")?;
            f.write_str(INDENT)?;
            write_directive(directive, f)?;
            multiline = true;
        }

        let opening = if multiline { "\n{\n" } else { " {\n" };

        match &definition.kind {
            TypeDefinitionKind::Object { fields, .. } | TypeDefinitionKind::Interface { fields, .. } => {
                f.write_str(opening)?;
                for field in fields.iter().filter(|field| self.is_visible(*field, &field.r#type)) {
                    self.write_field(field, f)?;
                }
                f.write_str("}\n")
            }
            TypeDefinitionKind::Union { members } => {
                f.write_str(if multiline { "\n =" } else { " =" })?;
                let mut members = members.iter().filter(|member| self.is_type_visible(member)).peekable();
                while let Some(member) = members.next() {
                    f.write_str(" ")?;
                    f.write_str(member)?;
                    if members.peek().is_some() {
                        f.write_str(" |")?;
                    }
                }
                f.write_str("\n")
            }
            TypeDefinitionKind::Enum { values } => {
                f.write_str(opening)?;
                for value in values
                    .iter()
                    .filter(|value| !self.public || !value.is_inaccessible())
                {
                    write_description(value.description.as_deref(), INDENT, f)?;
                    f.write_str(INDENT)?;
                    f.write_str(&value.name)?;
                    self.write_inline_directives(&value.directives, f)?;
                    f.write_str("\n")?;
                }
                f.write_str("}\n")
            }
            TypeDefinitionKind::Scalar => f.write_str("\n"),
            TypeDefinitionKind::InputObject { fields } => {
                f.write_str(opening)?;
                for field in fields.iter().filter(|field| self.is_visible(*field, &field.r#type)) {
                    write_description(field.description.as_deref(), INDENT, f)?;
                    f.write_str(INDENT)?;
                    self.write_input_value(field, f)?;
                    f.write_str("\n")?;
                }
                f.write_str("}\n")
            }
        }
    }

    fn write_field(&self, field: &FieldDefinition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_description(field.description.as_deref(), INDENT, f)?;
        f.write_str(INDENT)?;
        f.write_str(&field.name)?;

        let arguments: Vec<&InputValueDefinition> = field
            .arguments
            .iter()
            .filter(|argument| self.is_visible(*argument, &argument.r#type))
            .collect();

        if !arguments.is_empty() {
            let described = arguments.iter().any(|argument| argument.description.is_some());
            f.write_str("(")?;

            for (idx, argument) in arguments.iter().enumerate() {
                if described {
                    f.write_str("\n")?;
                    write_description(argument.description.as_deref(), "    ", f)?;
                    f.write_str("    ")?;
                } else if idx > 0 {
                    f.write_str(", ")?;
                }

                self.write_input_value(argument, f)?;
            }

            if described {
                f.write_str("\n")?;
                f.write_str(INDENT)?;
            }

            f.write_str(")")?;
        }

        f.write_str(": ")?;
        f.write_str(&field.r#type)?;
        self.write_inline_directives(&field.directives, f)?;
        f.write_str("\n")
    }

    fn write_input_value(&self, input_value: &InputValueDefinition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&input_value.name)?;
        f.write_str(": ")?;
        f.write_str(&input_value.r#type)?;

        if let Some(default_value) = &input_value.default_value {
            f.write_str(" = ")?;
            f.write_str(default_value)?;
        }

        self.write_inline_directives(&input_value.directives, f)
    }

    fn write_inline_directives(&self, directives: &[Directive], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in directives.iter().filter(|d| self.keeps_directive(d)) {
            f.write_str(" ")?;
            write_directive(directive, f)?;
        }

        Ok(())
    }
}

fn write_directive(directive: &Directive, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("@")?;
    f.write_str(&directive.name)?;

    if directive.arguments.is_empty() {
        return Ok(());
    }

    f.write_str("(")?;
    for (idx, (name, value)) in directive.arguments.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        f.write_str(name)?;
        f.write_str(": ")?;
        write_directive_value(value, f)?;
    }
    f.write_str(")")
}

fn write_directive_value(value: &DirectiveValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        DirectiveValue::String(s) => write_quoted(f, s),
        DirectiveValue::Int(n) => write!(f, "{n}"),
        DirectiveValue::Boolean(b) => write!(f, "{b}"),
        DirectiveValue::EnumValue(name) => f.write_str(name),
        DirectiveValue::List(items) => {
            f.write_str("[")?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write_directive_value(item, f)?;
            }
            f.write_str("]")
        }
    }
}

/// Single line descriptions are quoted, the others are block strings.
fn write_description(description: Option<&str>, indent: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };

    f.write_str(indent)?;

    if !description.contains('\n') {
        write_quoted(f, description)?;
        return f.write_str("\n");
    }

    f.write_str("\"\"\"\n")?;
    for line in description.lines() {
        if !line.is_empty() {
            f.write_str(indent)?;
        }
        f.write_str(&line.replace(r#"""""#, r#"\""""#))?;
        f.write_str("\n")?;
    }
    f.write_str(indent)?;
    f.write_str("\"\"\"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, r#type: &str, directives: Vec<Directive>) -> FieldDefinition {
        FieldDefinition {
            name: name.to_owned(),
            description: None,
            arguments: Vec::new(),
            r#type: r#type.to_owned(),
            directives,
        }
    }

    fn object(name: &str, directives: Vec<Directive>, fields: Vec<FieldDefinition>) -> TypeDefinition {
        TypeDefinition {
            name: name.to_owned(),
            description: None,
            directives,
            kind: TypeDefinitionKind::Object {
                implements: Vec::new(),
                fields,
            },
        }
    }

    #[test]
    fn quoting() {
        let mut out = String::new();
        write_quoted(&mut out, "say \"hi\"\n\\").unwrap();
        assert_eq!(out, r#""say \"hi\"\n\\""#);
    }

    #[test]
    fn public_sdl_hides_dangling_references() {
        let model = SupergraphModel {
            links: Vec::new(),
            subgraphs: Vec::new(),
            root_operation_types: RootOperationTypes {
                query: Some("Query".to_owned()),
                ..Default::default()
            },
            type_definitions: vec![
                object(
                    "Query",
                    vec![Directive::new("join__type").arg("graph", DirectiveValue::EnumValue("A".to_owned()))],
                    vec![
                        field("me", "User", Vec::new()),
                        field("secrets", "[Secret!]!", Vec::new()),
                    ],
                ),
                object(
                    "User",
                    Vec::new(),
                    vec![
                        field("id", "ID!", Vec::new()),
                        field("legacyId", "ID", vec![Directive::new("deprecated").arg("reason", "use id")]),
                    ],
                ),
                object(
                    "Secret",
                    Vec::new(),
                    vec![field("value", "String", vec![Directive::new("inaccessible")])],
                ),
            ],
        };

        insta::assert_snapshot!(render_public_sdl(&model), @r#"
        type Query {
          me: User
        }

        type User {
          id: ID!
          legacyId: ID @deprecated(reason: "use id")
        }
        "#);
    }
}
