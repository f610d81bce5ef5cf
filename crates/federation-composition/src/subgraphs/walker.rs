use super::*;

/// An id paired with the arena, so related records can be reached by chaining methods.
#[derive(Clone, Copy)]
pub(crate) struct Walker<'a, Id> {
    pub(crate) id: Id,
    pub(crate) subgraphs: &'a Subgraphs,
}

impl<'a, Id> Walker<'a, Id> {
    pub(crate) fn walk<Other>(self, other: Other) -> Walker<'a, Other> {
        self.subgraphs.walk(other)
    }
}

impl Subgraphs {
    pub(crate) fn walk<Id>(&self, id: Id) -> Walker<'_, Id> {
        Walker { id, subgraphs: self }
    }
}
