//! Arena of every subgraph being composed. Records are addressed by integer ids and interned
//! strings, the ingestion module fills them in and the rest of the crate only reads them.

mod definitions;
mod directives;
mod enums;
mod field_types;
mod fields;
mod keys;
mod linked_schemas;
mod strings;
mod value;
mod view;
mod walker;

pub(crate) use self::{
    definitions::*, directives::*, enums::*, field_types::*, fields::*, keys::*, linked_schemas::*, strings::*,
    value::*, view::*, walker::*,
};

use crate::{
    diagnostics::{Diagnostics, ErrorCode},
    VecExt,
};
use std::fmt;

/// A set of subgraphs to be composed.
#[derive(Default)]
pub struct Subgraphs {
    pub(crate) strings: Strings,
    subgraphs: Vec<SubgraphRecord>,
    definitions: Definitions,
    directives: Directives,
    enums: EnumValues,
    fields: Fields,
    keys: Keys,
    linked_schemas: LinkedSchemas,
    ingestion_diagnostics: Vec<IngestionDiagnostic>,
}

/// Failure to read a subgraph schema at all.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("[{subgraph}] the schema could not be parsed: {message}")]
    Parse { subgraph: String, message: String },
}

impl Subgraphs {
    /// Add a subgraph to compose.
    pub fn ingest(
        &mut self,
        document: &cynic_parser::type_system::TypeSystemDocument,
        name: &str,
        url: Option<&str>,
    ) {
        crate::ingest_subgraph::ingest_subgraph(document, name, url, self);
    }

    /// Parse `sdl` and add it as a subgraph.
    pub fn ingest_str(&mut self, sdl: &str, name: &str, url: Option<&str>) -> Result<(), IngestError> {
        let document = cynic_parser::parse_type_system_document(sdl).map_err(|err| IngestError::Parse {
            subgraph: name.to_owned(),
            message: err.to_string(),
        })?;

        self.ingest(&document, name, url);

        Ok(())
    }

    /// The number of ingested subgraphs.
    pub fn len(&self) -> usize {
        self.subgraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subgraphs.is_empty()
    }

    pub(crate) fn push_subgraph(&mut self, name: &str, url: Option<&str>) -> SubgraphId {
        let graph_enum_value = self.unique_graph_enum_value(name);

        let subgraph = SubgraphRecord {
            name: self.strings.intern(name),
            graph_enum_value: self.strings.intern(&graph_enum_value),
            url: url.map(|url| self.strings.intern(url)),
            federation_version: FederationVersion::V1,
            query_type: None,
            mutation_type: None,
            subscription_type: None,
            features: SpecFeatures::empty(),
        };

        SubgraphId::from(self.subgraphs.push_return_idx(subgraph))
    }

    /// Upper-cased name with non alphanumeric characters replaced, suffixed with `_1`, `_2`...
    /// when another subgraph already produced the same value.
    fn unique_graph_enum_value(&self, name: &str) -> String {
        let mut base: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
            base.insert(0, '_');
        }

        let is_taken = |candidate: &str| {
            self.subgraphs
                .iter()
                .any(|subgraph| &self[subgraph.graph_enum_value] == candidate)
        };

        if !is_taken(&base) {
            return base;
        }

        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !is_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub(crate) fn iter_subgraphs(&self) -> impl ExactSizeIterator<Item = SubgraphWalker<'_>> + '_ {
        (0..self.subgraphs.len()).map(|idx| self.walk(SubgraphId::from(idx)))
    }

    pub(crate) fn subgraph_by_name(&self, name: &str) -> Option<SubgraphId> {
        let name = self.strings.lookup(name)?;
        self.subgraphs
            .iter()
            .position(|subgraph| subgraph.name == name)
            .map(SubgraphId::from)
    }

    pub(crate) fn set_federation_version(&mut self, subgraph_id: SubgraphId, version: FederationVersion) {
        self.subgraphs[usize::from(subgraph_id)].federation_version = version;
    }

    pub(crate) fn set_root_type(&mut self, subgraph_id: SubgraphId, root: RootOperation, definition_id: DefinitionId) {
        let subgraph = &mut self.subgraphs[usize::from(subgraph_id)];
        match root {
            RootOperation::Query => subgraph.query_type = Some(definition_id),
            RootOperation::Mutation => subgraph.mutation_type = Some(definition_id),
            RootOperation::Subscription => subgraph.subscription_type = Some(definition_id),
        }
    }

    pub(crate) fn add_features(&mut self, subgraph_id: SubgraphId, features: SpecFeatures) {
        self.subgraphs[usize::from(subgraph_id)].features |= features;
    }

    pub(crate) fn push_ingestion_diagnostic(&mut self, subgraph_id: SubgraphId, code: ErrorCode, message: String) {
        self.ingestion_diagnostics.push(IngestionDiagnostic {
            subgraph_id,
            code,
            message,
            is_warning: false,
        });
    }

    pub(crate) fn push_ingestion_warning(&mut self, subgraph_id: SubgraphId, code: ErrorCode, message: String) {
        self.ingestion_diagnostics.push(IngestionDiagnostic {
            subgraph_id,
            code,
            message,
            is_warning: true,
        });
    }

    /// Copy the diagnostics collected while ingesting, prefixed with the subgraph name.
    pub(crate) fn emit_ingestion_diagnostics(&self, diagnostics: &mut Diagnostics) {
        for diagnostic in &self.ingestion_diagnostics {
            let subgraph_name = self.walk(diagnostic.subgraph_id).name();
            let message = format!("[{subgraph_name}] {}", diagnostic.message);

            if diagnostic.is_warning {
                diagnostics.push_warning(diagnostic.code, message);
            } else {
                diagnostics.push_fatal(diagnostic.code, message);
            }
        }
    }
}

struct IngestionDiagnostic {
    subgraph_id: SubgraphId,
    code: ErrorCode,
    message: String,
    is_warning: bool,
}

pub(crate) struct SubgraphRecord {
    pub(crate) name: StringId,
    /// The name of the subgraph in the `join__Graph` enum.
    pub(crate) graph_enum_value: StringId,
    pub(crate) url: Option<StringId>,
    pub(crate) federation_version: FederationVersion,
    pub(crate) query_type: Option<DefinitionId>,
    pub(crate) mutation_type: Option<DefinitionId>,
    pub(crate) subscription_type: Option<DefinitionId>,
    pub(crate) features: SpecFeatures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum FederationVersion {
    /// No federation `@link`.
    V1,
    V2 { minor: u16 },
}

impl FederationVersion {
    pub(crate) fn is_v1(self) -> bool {
        matches!(self, FederationVersion::V1)
    }

    /// From the version segment of a federation spec url, e.g. `v2.3`.
    pub(crate) fn from_link_version(version: &str) -> Option<Self> {
        let (major, minor) = version.strip_prefix('v')?.split_once('.')?;

        match (major, minor.parse::<u16>()) {
            ("1", Ok(_)) => Some(FederationVersion::V1),
            ("2", Ok(minor)) => Some(FederationVersion::V2 { minor }),
            _ => None,
        }
    }
}

impl fmt::Display for FederationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FederationVersion::V1 => f.write_str("v1.0"),
            FederationVersion::V2 { minor } => write!(f, "v2.{minor}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootOperation {
    Query,
    Mutation,
    Subscription,
}

impl RootOperation {
    pub(crate) const ALL: [RootOperation; 3] = [
        RootOperation::Query,
        RootOperation::Mutation,
        RootOperation::Subscription,
    ];

    pub(crate) fn type_name(self) -> &'static str {
        match self {
            RootOperation::Query => "Query",
            RootOperation::Mutation => "Mutation",
            RootOperation::Subscription => "Subscription",
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            RootOperation::Query => "query",
            RootOperation::Mutation => "mutation",
            RootOperation::Subscription => "subscription",
        }
    }
}

bitflags::bitflags! {
    /// Linked specs a subgraph actually applies directives from.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct SpecFeatures: u8 {
        const TAG = 1;
        const INACCESSIBLE = 1 << 1;
        const AUTHENTICATED = 1 << 2;
        const POLICY = 1 << 3;
        const REQUIRES_SCOPES = 1 << 4;
        const COST = 1 << 5;
    }
}

macro_rules! make_ids {
    ($($name:ident,)*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub(crate) struct $name(usize);

            impl From<usize> for $name {
                fn from(idx: usize) -> Self {
                    $name(idx)
                }
            }

            impl From<$name> for usize {
                fn from(id: $name) -> usize {
                    id.0
                }
            }
        )*
    };
}

make_ids! {
    SubgraphId,
    DefinitionId,
    DirectiveSiteId,
    FieldId,
    KeyId,
    LinkedSchemaId,
    StringId,
}

impl StringId {
    pub(crate) const MIN: StringId = StringId(0);
    pub(crate) const MAX: StringId = StringId(usize::MAX);
}

impl std::ops::Index<StringId> for Subgraphs {
    type Output = str;

    fn index(&self, index: StringId) -> &str {
        self.strings.resolve(index)
    }
}

impl std::ops::Index<SubgraphId> for Subgraphs {
    type Output = SubgraphRecord;

    fn index(&self, index: SubgraphId) -> &SubgraphRecord {
        &self.subgraphs[usize::from(index)]
    }
}

pub(crate) type SubgraphWalker<'a> = Walker<'a, SubgraphId>;

impl<'a> SubgraphWalker<'a> {
    pub(crate) fn record(self) -> &'a SubgraphRecord {
        &self.subgraphs[self.id]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.subgraphs[self.record().name]
    }

    pub(crate) fn name_id(self) -> StringId {
        self.record().name
    }

    pub(crate) fn graph_enum_value(self) -> &'a str {
        &self.subgraphs[self.record().graph_enum_value]
    }

    pub(crate) fn url(self) -> Option<&'a str> {
        self.record().url.map(|url| &self.subgraphs[url])
    }

    pub(crate) fn federation_version(self) -> FederationVersion {
        self.record().federation_version
    }

    pub(crate) fn features(self) -> SpecFeatures {
        self.record().features
    }

    pub(crate) fn root_type(self, root: RootOperation) -> Option<DefinitionWalker<'a>> {
        let record = self.record();
        match root {
            RootOperation::Query => record.query_type,
            RootOperation::Mutation => record.mutation_type,
            RootOperation::Subscription => record.subscription_type,
        }
        .map(|id| self.walk(id))
    }

    /// Type definitions of this subgraph, in declaration order.
    pub(crate) fn definitions(self) -> impl Iterator<Item = DefinitionWalker<'a>> + 'a {
        let subgraphs = self.subgraphs;
        let subgraph_id = self.id;
        subgraphs
            .iter_definitions()
            .filter(move |definition| definition.subgraph_id == subgraph_id)
            .map(move |definition| subgraphs.walk(definition.id))
    }

    pub(crate) fn definition_by_name(self, name: &str) -> Option<DefinitionWalker<'a>> {
        self.subgraphs
            .definition_by_name(name, self.id)
            .map(|id| self.walk(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_enum_values_are_unique() {
        let mut subgraphs = Subgraphs::default();
        let first = subgraphs.push_subgraph("accounts-api", None);
        let second = subgraphs.push_subgraph("ACCOUNTS_api", None);
        let third = subgraphs.push_subgraph("accounts.api", None);
        let fourth = subgraphs.push_subgraph("3d", None);

        assert_eq!(subgraphs.walk(first).graph_enum_value(), "ACCOUNTS_API");
        assert_eq!(subgraphs.walk(second).graph_enum_value(), "ACCOUNTS_API_1");
        assert_eq!(subgraphs.walk(third).graph_enum_value(), "ACCOUNTS_API_2");
        assert_eq!(subgraphs.walk(fourth).graph_enum_value(), "_3D");
    }

    #[test]
    fn federation_versions_from_link_urls() {
        assert_eq!(
            FederationVersion::from_link_version("v2.3"),
            Some(FederationVersion::V2 { minor: 3 })
        );
        assert_eq!(FederationVersion::from_link_version("v1.0"), Some(FederationVersion::V1));
        assert_eq!(FederationVersion::from_link_version("2.3"), None);
        assert_eq!(FederationVersion::from_link_version("v3.0"), None);
        assert_eq!(FederationVersion::V2 { minor: 7 }.to_string(), "v2.7");
    }
}
