use crate::supergraph_model::*;
use serde::Deserialize;

const INACCESSIBLE_URL: &str = "https://specs.apollo.dev/inaccessible/v0.2";

/// Selects the part of a supergraph a contract exposes, by `@tag` name.
///
/// Elements tagged with an `exclude` tag are hidden. When `include` is not empty, only the
/// elements tagged with one of its tags stay visible: a type with an included tag keeps all of its
/// fields, otherwise only its included fields are kept, and a type left without visible fields
/// disappears. Hidden elements are marked `@inaccessible`, so applying a filter twice changes
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TagFilter {
    pub fn new(
        include: impl IntoIterator<Item = impl Into<String>>,
        exclude: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        TagFilter {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// A copy of the model with filtered out elements marked `@inaccessible`.
    pub fn apply(&self, model: &SupergraphModel) -> SupergraphModel {
        let _span = tracing::debug_span!("apply_tag_filter", include = ?self.include, exclude = ?self.exclude).entered();

        let mut model = model.clone();
        let mut hidden = 0;

        for definition in &mut model.type_definitions {
            hidden += self.filter_definition(definition);
        }

        if hidden > 0 && !model.links.iter().any(|link| link.url == INACCESSIBLE_URL) {
            model.links.push(Link {
                url: INACCESSIBLE_URL.to_owned(),
                purpose: Some("SECURITY".to_owned()),
                import: Vec::new(),
            });
        }

        tracing::debug!(hidden, "applied tag filter");

        model
    }

    fn is_excluded<T: HasDirectives>(&self, element: &T) -> bool {
        element.tags().any(|tag| self.exclude.iter().any(|excluded| excluded == tag))
    }

    fn is_included<T: HasDirectives>(&self, element: &T) -> bool {
        element.tags().any(|tag| self.include.iter().any(|included| included == tag))
    }

    /// Whether a child of a type survives the filter.
    fn keeps_child<T: HasDirectives>(&self, element: &T, parent_included: bool) -> bool {
        !element.is_inaccessible()
            && !self.is_excluded(element)
            && (self.include.is_empty() || parent_included || self.is_included(element))
    }

    /// Returns how many elements were newly hidden.
    fn filter_definition(&self, definition: &mut TypeDefinition) -> usize {
        let parent_included = self.is_included(&*definition);
        let mut hidden = 0;
        let mut kept_children = 0;

        let has_children = match &mut definition.kind {
            TypeDefinitionKind::Object { fields, .. } | TypeDefinitionKind::Interface { fields, .. } => {
                for field in fields.iter_mut() {
                    for argument in &mut field.arguments {
                        if self.is_excluded(&*argument) {
                            hidden += hide(&mut argument.directives);
                        }
                    }

                    if self.keeps_child(&*field, parent_included) {
                        kept_children += 1;
                    } else {
                        hidden += hide(&mut field.directives);
                    }
                }

                true
            }
            TypeDefinitionKind::InputObject { fields } => {
                for field in fields.iter_mut() {
                    if self.keeps_child(&*field, parent_included) {
                        kept_children += 1;
                    } else {
                        hidden += hide(&mut field.directives);
                    }
                }

                true
            }
            TypeDefinitionKind::Enum { values } => {
                for value in values.iter_mut() {
                    if self.keeps_child(&*value, parent_included) {
                        kept_children += 1;
                    } else {
                        hidden += hide(&mut value.directives);
                    }
                }

                true
            }
            TypeDefinitionKind::Union { .. } | TypeDefinitionKind::Scalar => false,
        };

        let emptied = has_children && kept_children == 0;

        if self.is_excluded(&*definition) || emptied {
            hidden += hide(&mut definition.directives);
        }

        hidden
    }
}

fn hide(directives: &mut Vec<Directive>) -> usize {
    if directives.iter().any(|directive| directive.name == "inaccessible") {
        return 0;
    }

    directives.push(Directive::new("inaccessible"));
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tags: &[&str]) -> Vec<Directive> {
        tags.iter().map(|tag| Directive::new("tag").arg("name", *tag)).collect()
    }

    fn field(name: &str, tags: &[&str]) -> FieldDefinition {
        FieldDefinition {
            name: name.to_owned(),
            description: None,
            arguments: Vec::new(),
            r#type: "String".to_owned(),
            directives: tagged(tags),
        }
    }

    fn object(name: &str, tags: &[&str], fields: Vec<FieldDefinition>) -> TypeDefinition {
        TypeDefinition {
            name: name.to_owned(),
            description: None,
            directives: tagged(tags),
            kind: TypeDefinitionKind::Object {
                implements: Vec::new(),
                fields,
            },
        }
    }

    fn model(type_definitions: Vec<TypeDefinition>) -> SupergraphModel {
        SupergraphModel {
            links: Vec::new(),
            subgraphs: Vec::new(),
            root_operation_types: RootOperationTypes {
                query: Some("Query".to_owned()),
                ..Default::default()
            },
            type_definitions,
        }
    }

    fn visible_fields(model: &SupergraphModel, type_name: &str) -> Vec<String> {
        let Some(definition) = model.type_definition(type_name) else {
            return Vec::new();
        };

        match &definition.kind {
            TypeDefinitionKind::Object { fields, .. } if !definition.is_inaccessible() => fields
                .iter()
                .filter(|field| !field.is_inaccessible())
                .map(|field| field.name.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn excluded_fields_are_hidden() {
        let model = model(vec![object(
            "Query",
            &[],
            vec![field("products", &["public"]), field("internal", &["private"])],
        )]);

        let filtered = TagFilter::new(Vec::<String>::new(), ["private"]).apply(&model);

        assert_eq!(visible_fields(&filtered, "Query"), ["products"]);
        assert_eq!(filtered.links[0].url, INACCESSIBLE_URL);
    }

    #[test]
    fn included_types_keep_their_fields() {
        let model = model(vec![
            object("Query", &[], vec![field("products", &["public"]), field("admin", &[])]),
            object("Product", &["public"], vec![field("id", &[]), field("cost", &["private"])]),
            object("Audit", &[], vec![field("id", &[])]),
        ]);

        let filtered = TagFilter::new(["public"], ["private"]).apply(&model);

        assert_eq!(visible_fields(&filtered, "Query"), ["products"]);
        assert_eq!(visible_fields(&filtered, "Product"), ["id"]);
        assert!(visible_fields(&filtered, "Audit").is_empty());
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let model = model(vec![
            object("Query", &[], vec![field("products", &["public"]), field("admin", &[])]),
            object("Product", &[], vec![field("id", &["private"])]),
        ]);
        let filter = TagFilter::new(["public"], ["private"]);

        let once = filter.apply(&model);
        let twice = filter.apply(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn loads_from_toml() {
        let filter: TagFilter = toml::from_str(r#"exclude = ["internal"]"#).unwrap();

        assert_eq!(filter, TagFilter::new(Vec::<String>::new(), ["internal"]));
    }
}
