use super::StringId;
use indexmap::IndexSet;

/// Interned names, descriptions and directive arguments of every subgraph.
#[derive(Default)]
pub(crate) struct Strings {
    strings: IndexSet<Box<str>>,
}

impl Strings {
    pub(crate) fn intern(&mut self, string: &str) -> StringId {
        if let Some(idx) = self.strings.get_index_of(string) {
            return StringId::from(idx);
        }

        let (idx, _) = self.strings.insert_full(Box::from(string));
        StringId::from(idx)
    }

    /// The id of `string`, if anything interned it.
    pub(crate) fn lookup(&self, string: &str) -> Option<StringId> {
        self.strings.get_index_of(string).map(StringId::from)
    }

    pub(crate) fn resolve(&self, id: StringId) -> &str {
        &self.strings[usize::from(id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut strings = Strings::default();
        let user = strings.intern("User");
        let id = strings.intern("id");

        assert_eq!(strings.intern("User"), user);
        assert_ne!(user, id);
        assert_eq!(strings.resolve(id), "id");
        assert_eq!(strings.lookup("User"), Some(user));
        assert_eq!(strings.lookup("Product"), None);
    }
}
