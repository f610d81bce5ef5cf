use super::*;

/// `@override(from:, label:)` legality.
pub(super) struct OverrideRules;

impl ValidationRule for OverrideRules {
    fn object_type_field(&mut self, ctx: &mut ValidationContext<'_>, object: &ObjectTypeState, field: &FieldState) {
        for (subgraph_id, in_graph) in &field.by_graph {
            let Some(r#override) = in_graph.r#override else {
                continue;
            };

            let subgraph = ctx.subgraphs.walk(*subgraph_id);
            let coordinate = ctx.coordinate(object.name, field.name);

            if let Some(label) = r#override.label.map(|label| ctx.str(label)) {
                if !is_valid_label(label) {
                    ctx.push_fatal(
                        ErrorCode::OverrideLabelInvalid,
                        format!(
                            "Invalid @override label \"{label}\" on field \"{coordinate}\" on subgraph \"{}\": labels must start with a letter and after that may contain alphanumerics, underscores, minuses, colons, periods, or be of the form \"percent(x)\" where x is a float between 0-100 inclusive.",
                            subgraph.name(),
                        ),
                    );
                }
            }

            if r#override.from == subgraph.name_id() {
                ctx.push_fatal(
                    ErrorCode::OverrideFromSelfError,
                    format!(
                        "Source and destination subgraphs \"{}\" are the same for overridden field \"{coordinate}\"",
                        subgraph.name()
                    ),
                );
                continue;
            }

            if in_graph.external {
                ctx.push_fatal(
                    ErrorCode::OverrideCollisionWithAnotherDirective,
                    format!(
                        "@override cannot be used on field \"{coordinate}\" on subgraph \"{name}\" since \"{coordinate}\" on \"{name}\" is marked with directive \"@external\"",
                        name = subgraph.name(),
                    ),
                );
                continue;
            }

            let from = ctx.str(r#override.from);

            let Some(source_id) = ctx.subgraphs.subgraph_by_name(from) else {
                ctx.push_warning(
                    ErrorCode::FromSubgraphDoesNotExist,
                    format!(
                        "Source subgraph \"{from}\" for field \"{coordinate}\" on subgraph \"{}\" does not exist.",
                        subgraph.name()
                    ),
                );
                continue;
            };

            let Some(source) = field.by_graph.get(&source_id) else {
                continue;
            };

            if source.r#override.is_some() {
                ctx.push_fatal(
                    ErrorCode::OverrideSourceHasOverride,
                    format!(
                        "Field \"{coordinate}\" on subgraph \"{}\" is also marked with directive @override in subgraph \"{from}\". Only one @override directive is allowed per field.",
                        subgraph.name()
                    ),
                );
            }

            // Both sides of a progressive override must stay executable, a `@requires` on the
            // source would only hold on one of them.
            let source_has_requires = ctx.subgraphs.walk(source.field_id).directives().requires.is_some();

            if r#override.label.is_some() && source_has_requires {
                ctx.push_fatal(
                    ErrorCode::OverrideCollisionWithAnotherDirective,
                    format!(
                        "@override cannot be used on field \"{coordinate}\" on subgraph \"{}\" since \"{coordinate}\" on \"{from}\" is marked with directive \"@requires\"",
                        subgraph.name()
                    ),
                );
            }
        }
    }
}

/// `percent(x)` with `0 <= x <= 100`, or a name starting with a letter.
fn is_valid_label(label: &str) -> bool {
    if let Some(percent) = label.strip_prefix("percent(").and_then(|rest| rest.strip_suffix(')')) {
        return percent
            .parse::<f64>()
            .is_ok_and(|percent| (0.0..=100.0).contains(&percent));
    }

    let mut chars = label.chars();

    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert!(is_valid_label("percent(0)"));
        assert!(is_valid_label("percent(12.5)"));
        assert!(is_valid_label("percent(100)"));
        assert!(is_valid_label("new-billing:v2.beta"));

        assert!(!is_valid_label("percent(101)"));
        assert!(!is_valid_label("percent(-1)"));
        assert!(!is_valid_label("percent(abc)"));
        assert!(!is_valid_label("1flag"));
        assert!(!is_valid_label("flag!"));
        assert!(!is_valid_label(""));
    }
}
