use serde::{Deserialize, Serialize};

/// How a filtered collection reacts to a `Reset` of its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// A reset must leave the source empty. Anything else is rejected
    /// with `Error::Unsupported` and the collection detaches from its source.
    #[default]
    ClearOnly,

    /// Rebuild the translation table from the source after every reset,
    /// emitting `Clear` followed by one `Insert` per passing item.
    Rescan,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub reset_policy: ResetPolicy,

    /// Verify the translation table after every processed notification.
    pub check_invariants: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            reset_policy: ResetPolicy::default(),
            check_invariants: cfg!(debug_assertions),
        }
    }
}

impl FilterConfig {
    #[must_use]
    pub fn with_reset_policy(mut self, reset_policy: ResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }

    #[must_use]
    pub fn with_invariant_checks(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_json() {
        let config: FilterConfig =
            serde_json::from_str(r#"{ "reset_policy": "rescan" }"#).unwrap();
        assert_eq!(config.reset_policy, ResetPolicy::Rescan);
        assert_eq!(config.check_invariants, cfg!(debug_assertions));

        let config: FilterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn config_builders() {
        let config = FilterConfig::default()
            .with_reset_policy(ResetPolicy::Rescan)
            .with_invariant_checks(true);
        assert_eq!(config.reset_policy, ResetPolicy::Rescan);
        assert!(config.check_invariants);
    }
}
