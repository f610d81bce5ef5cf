use std::ops::Deref;

/// A record with its id.
pub(crate) struct View<'a, Id, Record> {
    pub(crate) id: Id,
    pub(crate) record: &'a Record,
}

impl<Id: Copy, Record> Clone for View<'_, Id, Record> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Id: Copy, Record> Copy for View<'_, Id, Record> {}

impl<Id, Record> Deref for View<'_, Id, Record> {
    type Target = Record;

    fn deref(&self) -> &Self::Target {
        self.record
    }
}
