use super::*;
use cynic_parser::type_system as ast;
use wrapping::{ListWrapping, Wrapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FieldType {
    pub(crate) name: StringId,
    pub(crate) wrapping: Wrapping,
}

impl Subgraphs {
    /// `name` is passed separately because root types are renamed during ingestion.
    pub(crate) fn intern_field_type(&mut self, name: &str, field_type: ast::Type<'_>) -> FieldType {
        use cynic_parser::common::WrappingType;

        let wrappers = field_type.wrappers().collect::<Vec<_>>();
        let mut wrappers = wrappers.into_iter().rev().peekable();

        let mut wrapping = if wrappers.next_if(|w| matches!(w, WrappingType::NonNull)).is_some() {
            Wrapping::default().non_null()
        } else {
            Wrapping::default()
        };

        while let Some(next) = wrappers.next() {
            debug_assert_eq!(next, WrappingType::List, "double non-null wrapping type not possible");

            wrapping = if wrappers.next_if(|w| matches!(w, WrappingType::NonNull)).is_some() {
                wrapping.list_non_null()
            } else {
                wrapping.list()
            }
        }

        FieldType {
            name: self.strings.intern(name),
            wrapping,
        }
    }
}

impl FieldType {
    /// Compose two types for input positions. The most required of the two is picked.
    pub(crate) fn compose_for_input(self, other: Self) -> Option<Self> {
        Some(if self.compose(other)? { other } else { self })
    }

    /// Compose two types for output positions. The less required of the two is picked.
    pub(crate) fn compose_for_output(self, other: Self) -> Option<Self> {
        Some(if self.compose(other)? { self } else { other })
    }

    /// Returns whether `other` is non-nullable at the outermost level, which is enough to pick
    /// between the two. `None` when the types differ by more than their outermost nullability.
    fn compose(self, other: Self) -> Option<bool> {
        if self == other {
            return Some(true);
        }

        if self.name != other.name {
            return None;
        }

        let mut self_wrappers = self.wrapping.list_wrappings();
        let mut other_wrappers = other.wrapping.list_wrappings();
        let mut zipped_wrappers = (&mut self_wrappers).zip(&mut other_wrappers).peekable();

        if zipped_wrappers.peek().is_some() && self.wrapping.inner_is_required() != other.wrapping.inner_is_required() {
            return None;
        }

        while let Some((self_wrapper, other_wrapper)) = zipped_wrappers.next() {
            if zipped_wrappers.peek().is_none() {
                // Outermost list: both sides must stop here.
                if self_wrappers.next().is_some() || other_wrappers.next().is_some() {
                    return None;
                }

                return Some(matches!(other_wrapper, ListWrapping::ListNonNull));
            }

            // Inner lists must agree, only the outermost one may differ.
            if self_wrapper != other_wrapper {
                return None;
            }
        }

        // No list on at least one side.
        if self.wrapping.is_list() || other.wrapping.is_list() {
            return None;
        }

        Some(other.wrapping.is_non_null())
    }

    pub(crate) fn display(self, subgraphs: &Subgraphs) -> String {
        self.wrapping.type_display(&subgraphs[self.name]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_type(name: StringId, build: impl FnOnce(Wrapping) -> Wrapping) -> FieldType {
        FieldType {
            name,
            wrapping: build(Wrapping::default()),
        }
    }

    #[test]
    fn display() {
        let mut subgraphs = Subgraphs::default();
        let user = subgraphs.strings.intern("User");

        let nested = field_type(user, |w| w.non_null().list().list_non_null());
        assert_eq!(nested.display(&subgraphs), "[[User!]]!");
        assert_eq!(field_type(user, |w| w).display(&subgraphs), "User");
    }

    #[test]
    fn output_picks_the_nullable_type() {
        let mut strings = Strings::default();
        let name = strings.intern("String");

        let nullable = field_type(name, |w| w);
        let required = field_type(name, |w| w.non_null());

        assert_eq!(nullable.compose_for_output(required), Some(nullable));
        assert_eq!(required.compose_for_output(nullable), Some(nullable));
        assert_eq!(nullable.compose_for_input(required), Some(required));
        assert_eq!(required.compose_for_input(nullable), Some(required));
    }

    #[test]
    fn inner_nullability_must_match() {
        let mut strings = Strings::default();
        let name = strings.intern("String");

        let inner_required = field_type(name, |w| w.non_null().list());
        let inner_nullable = field_type(name, |w| w.list());
        let outer_required = field_type(name, |w| w.list_non_null());

        assert_eq!(inner_required.compose_for_output(inner_nullable), None);
        assert_eq!(inner_nullable.compose_for_output(outer_required), Some(inner_nullable));
    }

    #[test]
    fn different_names_or_depths_do_not_compose() {
        let mut strings = Strings::default();
        let string = strings.intern("String");
        let int = strings.intern("Int");

        assert_eq!(field_type(string, |w| w).compose_for_output(field_type(int, |w| w)), None);
        assert_eq!(
            field_type(string, |w| w).compose_for_output(field_type(string, |w| w.list())),
            None
        );
    }
}
