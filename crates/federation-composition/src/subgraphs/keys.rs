use super::*;
use cynic_parser::ConstValue;
use std::collections::BTreeMap;

/// All the keys (`@key(...)`) in all the subgraphs in one container.
#[derive(Default)]
pub(crate) struct Keys {
    records: Vec<KeyRecord>,
    by_definition: BTreeMap<DefinitionId, Vec<KeyId>>,
}

pub(crate) struct KeyRecord {
    pub(crate) definition_id: DefinitionId,
    pub(crate) fields: FieldSet,
    pub(crate) resolvable: bool,
}

/// A parsed `fields` argument of `@key`, `@requires` or `@provides`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldSet {
    /// The argument as written in the subgraph.
    pub(crate) raw: StringId,
    pub(crate) selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Selection {
    Field(FieldSelection),
    InlineFragment {
        on: StringId,
        subselection: Vec<Selection>,
        has_directives: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldSelection {
    pub(crate) field: StringId,
    pub(crate) arguments: Vec<(StringId, Value)>,
    pub(crate) subselection: Vec<Selection>,
    pub(crate) has_directives: bool,
}

impl Subgraphs {
    pub(crate) fn push_key(&mut self, definition_id: DefinitionId, fields: FieldSet, resolvable: bool) -> KeyId {
        let id = KeyId::from(self.keys.records.push_return_idx(KeyRecord {
            definition_id,
            fields,
            resolvable,
        }));
        self.keys.by_definition.entry(definition_id).or_default().push(id);
        id
    }

    pub(crate) fn iter_keys_of(&self, definition_id: DefinitionId) -> impl Iterator<Item = KeyId> + '_ {
        self.keys.by_definition.get(&definition_id).into_iter().flatten().copied()
    }

    /// Parse a field set, e.g. `id organization { id }`.
    pub(crate) fn field_set_from_str(
        &mut self,
        fields: &str,
        directive_name: &str,
        argument_name: &str,
    ) -> Result<FieldSet, String> {
        let selection_set = self.selection_set_from_str(fields, directive_name, argument_name)?;

        Ok(FieldSet {
            raw: self.strings.intern(fields),
            selection_set,
        })
    }

    fn selection_set_from_str(
        &mut self,
        fields: &str,
        directive_name: &str,
        argument_name: &str,
    ) -> Result<Vec<Selection>, String> {
        use cynic_parser::executable as ast;
        let fields = format!("{{ {fields} }}");
        let parsed = cynic_parser::parse_executable_document(&fields).map_err(|err| {
            format!("could not parse the `{argument_name}` argument in `@{directive_name}` as a selection set: {err}")
        })?;

        let Some(operation) = parsed.operations().next() else {
            return Err(format!(
                "The `{argument_name}` argument in `@{directive_name}` must be a selection set"
            ));
        };

        fn build_selection_set(
            selections: ast::Iter<'_, ast::Selection<'_>>,
            subgraphs: &mut Subgraphs,
        ) -> Result<Vec<Selection>, String> {
            selections
                .map(|selection| match selection {
                    ast::Selection::Field(item) => {
                        let field = subgraphs.strings.intern(item.name());
                        let arguments = item
                            .arguments()
                            .map(|argument| {
                                let name = subgraphs.strings.intern(argument.name());
                                let value = crate::ingest_subgraph::ast_value_to_subgraph_value(
                                    ConstValue::try_from(argument.value()).map_err(|_| "variables are not allowed")?,
                                    subgraphs,
                                );

                                Ok((name, value))
                            })
                            .collect::<Result<Vec<_>, String>>()?;

                        let subselection = build_selection_set(item.selection_set(), subgraphs)?;
                        Ok(Selection::Field(FieldSelection {
                            field,
                            arguments,
                            subselection,
                            has_directives: item.directives().next().is_some(),
                        }))
                    }
                    ast::Selection::InlineFragment(fragment) => {
                        let subselection = build_selection_set(fragment.selection_set(), subgraphs)?;
                        let on = fragment
                            .type_condition()
                            .ok_or("inline fragments must have a type condition")?;

                        Ok(Selection::InlineFragment {
                            on: subgraphs.strings.intern(on),
                            subselection,
                            has_directives: fragment.directives().next().is_some(),
                        })
                    }
                    ast::Selection::FragmentSpread(_) => Err("fragment spreads are not allowed.".to_owned()),
                })
                .collect()
        }

        build_selection_set(operation.selection_set(), self)
            .map_err(|error| format!("the `{argument_name}` argument in `@{directive_name}` was invalid: {error}"))
    }

    /// Serialize a selection set back to the field set syntax, without the outer braces.
    pub(crate) fn render_selection_set(&self, selection_set: &[Selection]) -> String {
        let mut out = String::new();
        self.write_selection_set(selection_set, &mut out);
        out
    }

    fn write_selection_set(&self, selection_set: &[Selection], out: &mut String) {
        use std::fmt::Write as _;

        for (idx, selection) in selection_set.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }

            let subselection = match selection {
                Selection::Field(field) => {
                    out.push_str(&self[field.field]);

                    if !field.arguments.is_empty() {
                        out.push('(');
                        for (idx, (name, value)) in field.arguments.iter().enumerate() {
                            if idx > 0 {
                                out.push_str(", ");
                            }
                            write!(out, "{}: {}", &self[*name], value.display(self)).ok();
                        }
                        out.push(')');
                    }

                    &field.subselection
                }
                Selection::InlineFragment { on, subselection, .. } => {
                    out.push_str("... on ");
                    out.push_str(&self[*on]);
                    subselection
                }
            };

            if !subselection.is_empty() {
                out.push_str(" { ");
                self.write_selection_set(subselection, out);
                out.push_str(" }");
            }
        }
    }
}

impl std::ops::Index<KeyId> for Subgraphs {
    type Output = KeyRecord;

    fn index(&self, index: KeyId) -> &KeyRecord {
        &self.keys.records[usize::from(index)]
    }
}

pub(crate) type KeyWalker<'a> = Walker<'a, KeyId>;

impl<'a> KeyWalker<'a> {
    pub(crate) fn record(self) -> &'a KeyRecord {
        &self.subgraphs[self.id]
    }

    pub(crate) fn definition(self) -> DefinitionWalker<'a> {
        self.walk(self.record().definition_id)
    }

    pub(crate) fn is_resolvable(self) -> bool {
        self.record().resolvable
    }

    pub(crate) fn selection_set(self) -> &'a [Selection] {
        &self.record().fields.selection_set
    }

    /// The normalized field set, e.g. `id organization { id }`.
    pub(crate) fn fields_display(self) -> String {
        self.subgraphs.render_selection_set(self.selection_set())
    }

    /// Number of leaf fields: cheaper keys are preferred when jumping between subgraphs.
    pub(crate) fn score(self) -> usize {
        fn count(selection_set: &[Selection]) -> usize {
            selection_set
                .iter()
                .map(|selection| match selection {
                    Selection::Field(field) if field.subselection.is_empty() => 1,
                    Selection::Field(field) => count(&field.subselection),
                    Selection::InlineFragment { subselection, .. } => count(subselection),
                })
                .sum()
        }

        count(self.selection_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_sets_are_normalized() {
        let mut subgraphs = Subgraphs::default();
        let field_set = subgraphs
            .field_set_from_str(
                "id   organization{ id name }  ... on Admin { level(at: 3) }",
                "key",
                "fields",
            )
            .unwrap();

        assert_eq!(
            subgraphs.render_selection_set(&field_set.selection_set),
            "id organization { id name } ... on Admin { level(at: 3) }"
        );
        assert_eq!(&subgraphs[field_set.raw], "id   organization{ id name }  ... on Admin { level(at: 3) }");
    }

    #[test]
    fn fragment_spreads_are_rejected() {
        let mut subgraphs = Subgraphs::default();
        let error = subgraphs.field_set_from_str("id ...Rest", "requires", "fields").unwrap_err();

        assert!(error.contains("fragment spreads are not allowed"), "{error}");
    }
}
