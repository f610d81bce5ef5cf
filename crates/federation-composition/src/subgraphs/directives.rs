use super::*;
use std::collections::BTreeSet;

/// Directives applied on types, fields, arguments and enum values.
#[derive(Default)]
pub(crate) struct Directives {
    sites: Vec<DirectiveSiteRecord>,
}

bitflags::bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct DirectiveFlags: u8 {
        const EXTERNAL = 1;
        const SHAREABLE = 1 << 1;
        const INACCESSIBLE = 1 << 2;
        const AUTHENTICATED = 1 << 3;
        const INTERFACE_OBJECT = 1 << 4;
        const EXTENDS = 1 << 5;
    }
}

/// Everything the composition cares about on one directive site.
#[derive(Default)]
pub(crate) struct DirectiveSiteRecord {
    pub(crate) flags: DirectiveFlags,
    pub(crate) tags: BTreeSet<StringId>,
    /// `@policy(policies: [[...]])`: any of the groups, all of the policies in a group.
    pub(crate) policies: Vec<Vec<StringId>>,
    /// `@requiresScopes(scopes: [[...]])`, same shape as policies.
    pub(crate) requires_scopes: Vec<Vec<StringId>>,
    pub(crate) cost: Option<i32>,
    pub(crate) list_size: Option<ListSize>,
    pub(crate) r#override: Option<OverrideDirective>,
    pub(crate) requires: Option<FieldSet>,
    pub(crate) provides: Option<FieldSet>,
    pub(crate) deprecated: Option<Deprecated>,
}

impl DirectiveSiteRecord {
    pub(crate) fn external(&self) -> bool {
        self.flags.contains(DirectiveFlags::EXTERNAL)
    }

    pub(crate) fn shareable(&self) -> bool {
        self.flags.contains(DirectiveFlags::SHAREABLE)
    }

    pub(crate) fn inaccessible(&self) -> bool {
        self.flags.contains(DirectiveFlags::INACCESSIBLE)
    }

    pub(crate) fn authenticated(&self) -> bool {
        self.flags.contains(DirectiveFlags::AUTHENTICATED)
    }

    pub(crate) fn interface_object(&self) -> bool {
        self.flags.contains(DirectiveFlags::INTERFACE_OBJECT)
    }

    pub(crate) fn extends(&self) -> bool {
        self.flags.contains(DirectiveFlags::EXTENDS)
    }

    /// Names of the auth directives present on the site.
    pub(crate) fn auth_directive_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.authenticated() {
            names.push("@authenticated");
        }
        if !self.requires_scopes.is_empty() {
            names.push("@requiresScopes");
        }
        if !self.policies.is_empty() {
            names.push("@policy");
        }
        names
    }
}

/// `@listSize` cost analysis hints on a list field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListSize {
    pub(crate) assumed_size: Option<u32>,
    pub(crate) slicing_arguments: Vec<StringId>,
    pub(crate) sized_fields: Vec<StringId>,
    pub(crate) require_one_slicing_argument: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OverrideDirective {
    /// Name of the subgraph the field moves away from.
    pub(crate) from: StringId,
    /// Progressive override label, `percent(n)` or a feature flag name.
    pub(crate) label: Option<StringId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Deprecated {
    pub(crate) reason: Option<StringId>,
}

impl Subgraphs {
    pub(crate) fn new_directive_site(&mut self) -> DirectiveSiteId {
        DirectiveSiteId::from(self.directives.sites.push_return_idx(DirectiveSiteRecord::default()))
    }
}

impl std::ops::Index<DirectiveSiteId> for Subgraphs {
    type Output = DirectiveSiteRecord;

    fn index(&self, index: DirectiveSiteId) -> &DirectiveSiteRecord {
        &self.directives.sites[usize::from(index)]
    }
}

impl std::ops::IndexMut<DirectiveSiteId> for Subgraphs {
    fn index_mut(&mut self, index: DirectiveSiteId) -> &mut DirectiveSiteRecord {
        &mut self.directives.sites[usize::from(index)]
    }
}
