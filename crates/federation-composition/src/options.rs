use serde::Deserialize;

/// Knobs for a [`compose_with_options()`](crate::compose_with_options()) call.
///
/// Deserializable so embedding services can keep it in their own configuration files:
///
/// ```toml
/// run_satisfiability = true
/// warnings_are_fatal = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositionOptions {
    /// Prove that every field reachable from a root type can be resolved.
    pub run_satisfiability: bool,
    /// Fail composition on warnings too.
    pub warnings_are_fatal: bool,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        CompositionOptions {
            run_satisfiability: true,
            warnings_are_fatal: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let options: CompositionOptions = toml::from_str("warnings_are_fatal = true").unwrap();

        assert_eq!(
            options,
            CompositionOptions {
                run_satisfiability: true,
                warnings_are_fatal: true,
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CompositionOptions>("run_satisfaction = false").is_err());
    }
}
