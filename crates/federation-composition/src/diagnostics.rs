use serde::Serialize;

/// Warnings and errors produced by composition.
#[derive(Default, Debug, Clone)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Is any of the diagnostics fatal, i.e. a hard error?
    pub fn any_fatal(&self) -> bool {
        self.0.iter().any(|diagnostic| diagnostic.is_fatal())
    }

    /// Is there any diagnostic warning or error
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over all diagnostics, in the order they were produced.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Iterate non-fatal diagnostics.
    pub fn iter_warnings(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|diagnostic| !diagnostic.is_fatal())
            .map(|diagnostic| diagnostic.message.as_str())
    }

    /// Iterate fatal diagnostics.
    pub fn iter_errors(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|diagnostic| diagnostic.is_fatal())
            .map(|diagnostic| diagnostic.message.as_str())
    }

    /// The error codes of the fatal diagnostics.
    pub fn error_codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.0
            .iter()
            .filter(|diagnostic| diagnostic.is_fatal())
            .map(|diagnostic| diagnostic.code)
    }

    /// The fatal diagnostics in the `{"errors": [{"message", "extensions": {"code"}}]}` shape.
    pub fn errors_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct Extensions {
            code: &'static str,
        }

        #[derive(Serialize)]
        struct Error<'a> {
            message: &'a str,
            extensions: Extensions,
        }

        let errors: Vec<Error<'_>> = self
            .0
            .iter()
            .filter(|diagnostic| diagnostic.is_fatal())
            .map(|diagnostic| Error {
                message: &diagnostic.message,
                extensions: Extensions {
                    code: diagnostic.code.into(),
                },
            })
            .collect();

        serde_json::json!({ "errors": errors })
    }

    pub(crate) fn push_fatal(&mut self, code: ErrorCode, message: String) {
        self.0.push(Diagnostic {
            message,
            code,
            severity: Severity::Error,
        });
    }

    pub(crate) fn push_warning(&mut self, code: ErrorCode, message: String) {
        self.0.push(Diagnostic {
            message,
            code,
            severity: Severity::Warning,
        });
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Turn every warning into an error.
    pub(crate) fn promote_warnings(&mut self) {
        for diagnostic in &mut self.0 {
            diagnostic.severity = Severity::Error;
        }
    }
}

/// A composition diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    message: String,
    code: ErrorCode,
    severity: Severity,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Should this diagnostic be interpreted as a composition failure?
    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Machine readable diagnostic codes. They render in `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    AuthRequirementsAppliedOnInterface,
    CostAppliedToInterfaceField,
    DirectiveCostInvalidWeight,
    EnumValueMismatch,
    ExternalMissingOnBase,
    ExternalUnused,
    FieldArgumentTypeMismatch,
    FieldTypeMismatch,
    FromSubgraphDoesNotExist,
    ImplementedByInaccessible,
    InterfaceKeyMissingImplementationType,
    InterfaceKeyNotOnImplementation,
    InterfaceObjectUsageError,
    InvalidFieldSharing,
    InvalidGraphql,
    InvalidLinkDirectiveUsage,
    InvalidSubgraphName,
    KeyInvalidFields,
    KeyInvalidFieldsType,
    LinkImportNameMismatch,
    ListSizeAppliedToNonList,
    ListSizeInvalidAssumedSize,
    ListSizeInvalidSizedField,
    ListSizeInvalidSlicingArgument,
    MissingTransitiveAuthRequirements,
    NoQueries,
    OverrideCollisionWithAnotherDirective,
    OverrideFromSelfError,
    OverrideLabelInvalid,
    OverrideSourceHasOverride,
    ProvidesFieldsMissingExternal,
    ProvidesInvalidFields,
    ProvidesInvalidFieldsType,
    ProvidesOnNonObjectField,
    RequiredInputFieldMissingInSomeSubgraph,
    RequiresFieldsMissingExternal,
    RequiresInvalidFields,
    RequiresInvalidFieldsType,
    RootTypeUsed,
    SatisfiabilityError,
    TypeKindMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_render_in_screaming_snake_case() {
        assert_eq!(
            <&'static str>::from(ErrorCode::AuthRequirementsAppliedOnInterface),
            "AUTH_REQUIREMENTS_APPLIED_ON_INTERFACE"
        );
        assert_eq!(ErrorCode::ExternalMissingOnBase.to_string(), "EXTERNAL_MISSING_ON_BASE");
        assert_eq!(ErrorCode::InvalidGraphql.to_string(), "INVALID_GRAPHQL");
    }

    #[test]
    fn json_output_only_lists_errors() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push_warning(ErrorCode::ExternalUnused, "unused".to_owned());
        diagnostics.push_fatal(ErrorCode::NoQueries, "No queries found in any subgraph".to_owned());

        insta::assert_json_snapshot!(diagnostics.errors_json(), @r#"
        {
          "errors": [
            {
              "message": "No queries found in any subgraph",
              "extensions": {
                "code": "NO_QUERIES"
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn promoted_warnings_are_fatal() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push_warning(ErrorCode::ExternalUnused, "unused".to_owned());
        assert!(!diagnostics.any_fatal());

        diagnostics.promote_warnings();
        assert!(diagnostics.any_fatal());
        assert_eq!(diagnostics.error_codes().collect::<Vec<_>>(), vec![ErrorCode::ExternalUnused]);
    }
}
