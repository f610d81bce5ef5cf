use super::*;
use std::collections::BTreeMap;

#[derive(Default)]
pub(crate) struct EnumValues {
    by_enum: BTreeMap<DefinitionId, Vec<EnumValueRecord>>,
}

pub(crate) struct EnumValueRecord {
    pub(crate) name: StringId,
    pub(crate) description: Option<StringId>,
    pub(crate) directives: DirectiveSiteId,
}

impl Subgraphs {
    /// Returns false if the enum already had a value with that name.
    pub(crate) fn push_enum_value(&mut self, enum_id: DefinitionId, record: EnumValueRecord) -> bool {
        let values = self.enums.by_enum.entry(enum_id).or_default();

        if values.iter().any(|value| value.name == record.name) {
            return false;
        }

        values.push(record);
        true
    }

    pub(crate) fn enum_values(&self, enum_id: DefinitionId) -> &[EnumValueRecord] {
        self.enums.by_enum.get(&enum_id).map(Vec::as_slice).unwrap_or_default()
    }
}
