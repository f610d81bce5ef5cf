use serde::Serialize;

/// The composed supergraph as plain data. Both SDL renderings and contracts are computed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupergraphModel {
    /// The `@link` directives of the schema definition.
    pub links: Vec<Link>,
    /// One `join__Graph` value per subgraph, in composition order.
    pub subgraphs: Vec<JoinGraph>,
    pub root_operation_types: RootOperationTypes,
    pub type_definitions: Vec<TypeDefinition>,
}

impl SupergraphModel {
    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.iter().find(|definition| definition.name == name)
    }

    /// The `join` spec version in use, e.g. `v0.3`.
    pub fn join_version(&self) -> Option<&str> {
        self.links
            .iter()
            .find_map(|link| link.url.strip_prefix("https://specs.apollo.dev/join/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
    /// `EXECUTION` or `SECURITY`.
    #[serde(rename = "for")]
    pub purpose: Option<String>,
    pub import: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinGraph {
    pub name: String,
    pub enum_value: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootOperationTypes {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    #[serde(flatten)]
    pub kind: TypeDefinitionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefinitionKind {
    Object {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Interface {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<EnumValueDefinition>,
    },
    Scalar,
    InputObject {
        fields: Vec<InputValueDefinition>,
    },
}

impl TypeDefinitionKind {
    /// The SDL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeDefinitionKind::Object { .. } => "type",
            TypeDefinitionKind::Interface { .. } => "interface",
            TypeDefinitionKind::Union { .. } => "union",
            TypeDefinitionKind::Enum { .. } => "enum",
            TypeDefinitionKind::Scalar => "scalar",
            TypeDefinitionKind::InputObject { .. } => "input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDefinition>,
    /// The type reference as written in SDL, e.g. `[User!]!`.
    pub r#type: String,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub r#type: String,
    /// Rendered as a GraphQL literal.
    pub default_value: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

/// A directive application, `join__` machinery included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, DirectiveValue)>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Directive {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<DirectiveValue>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub fn argument(&self, name: &str) -> Option<&DirectiveValue> {
        self.arguments
            .iter()
            .find(|(argument_name, _)| argument_name == name)
            .map(|(_, value)| value)
    }

    /// Composition machinery, not part of the API schema.
    pub fn is_join(&self) -> bool {
        self.name.starts_with("join__")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    String(String),
    Int(i64),
    Boolean(bool),
    /// Serialized as a bare string.
    EnumValue(String),
    List(Vec<DirectiveValue>),
}

impl From<&str> for DirectiveValue {
    fn from(value: &str) -> Self {
        DirectiveValue::String(value.to_owned())
    }
}

impl From<String> for DirectiveValue {
    fn from(value: String) -> Self {
        DirectiveValue::String(value)
    }
}

impl From<bool> for DirectiveValue {
    fn from(value: bool) -> Self {
        DirectiveValue::Boolean(value)
    }
}

impl From<i64> for DirectiveValue {
    fn from(value: i64) -> Self {
        DirectiveValue::Int(value)
    }
}

impl<T: Into<DirectiveValue>> From<Vec<T>> for DirectiveValue {
    fn from(values: Vec<T>) -> Self {
        DirectiveValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Shared by the elements that may carry `@tag` and `@inaccessible`.
pub(crate) trait HasDirectives {
    fn directives(&self) -> &[Directive];

    fn is_inaccessible(&self) -> bool {
        self.directives().iter().any(|directive| directive.name == "inaccessible")
    }

    fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.directives()
            .iter()
            .filter(|directive| directive.name == "tag")
            .filter_map(|directive| match directive.argument("name") {
                Some(DirectiveValue::String(name)) => Some(name.as_str()),
                _ => None,
            })
    }
}

macro_rules! impl_has_directives {
    ($($name:ident),*) => {
        $(
            impl HasDirectives for $name {
                fn directives(&self) -> &[Directive] {
                    &self.directives
                }
            }
        )*
    };
}

impl_has_directives!(TypeDefinition, FieldDefinition, InputValueDefinition, EnumValueDefinition);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_graphql_names() {
        let definition = TypeDefinition {
            name: "Color".to_owned(),
            description: None,
            directives: vec![Directive::new("join__type").arg("graph", DirectiveValue::EnumValue("A".to_owned()))],
            kind: TypeDefinitionKind::Enum {
                values: vec![EnumValueDefinition {
                    name: "RED".to_owned(),
                    description: None,
                    directives: vec![Directive::new("tag").arg("name", "public")],
                }],
            },
        };

        insta::assert_json_snapshot!(definition, @r#"
        {
          "name": "Color",
          "description": null,
          "directives": [
            {
              "name": "join__type",
              "arguments": [
                [
                  "graph",
                  "A"
                ]
              ]
            }
          ],
          "kind": "enum",
          "values": [
            {
              "name": "RED",
              "description": null,
              "directives": [
                {
                  "name": "tag",
                  "arguments": [
                    [
                      "name",
                      "public"
                    ]
                  ]
                }
              ]
            }
          ]
        }
        "#);
    }
}
