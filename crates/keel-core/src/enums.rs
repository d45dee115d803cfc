//! Decision type, status, and author role enums for Keel.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and are closed sets: anything else is rejected at the validation boundary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// DecisionType
// ---------------------------------------------------------------------------

/// Category of a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Product,
    Process,
    /// A standing limitation surfaced proactively in context queries.
    Constraint,
    Learning,
}

impl DecisionType {
    pub const ALL: [Self; 4] = [
        Self::Product,
        Self::Process,
        Self::Constraint,
        Self::Learning,
    ];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Process => "process",
            Self::Constraint => "constraint",
            Self::Learning => "learning",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                CoreError::Other(anyhow::anyhow!(
                    "unknown decision type '{s}' (expected product, process, constraint, or learning)"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// DecisionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a decision.
///
/// ```text
/// active → superseded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Active,
    Superseded,
}

impl DecisionStatus {
    pub const ALL: [Self; 2] = [Self::Active, Self::Superseded];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Superseded],
            Self::Superseded => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Other(anyhow::anyhow!(
                    "unknown decision status '{s}' (expected active or superseded)"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// DecisionRole
// ---------------------------------------------------------------------------

/// Who made a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRole {
    Human,
    Agent,
}

impl DecisionRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for DecisionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(type_product, DecisionType, DecisionType::Product, "product");
    test_serde_roundtrip!(
        type_constraint,
        DecisionType,
        DecisionType::Constraint,
        "constraint"
    );
    test_serde_roundtrip!(
        status_superseded,
        DecisionStatus,
        DecisionStatus::Superseded,
        "superseded"
    );
    test_serde_roundtrip!(role_agent, DecisionRole, DecisionRole::Agent, "agent");

    #[test]
    fn as_str_matches_serde() {
        for kind in DecisionType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        for status in DecisionStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn from_str_accepts_known_values() {
        assert_eq!(
            "learning".parse::<DecisionType>().unwrap(),
            DecisionType::Learning
        );
        assert_eq!(
            "active".parse::<DecisionStatus>().unwrap(),
            DecisionStatus::Active
        );
    }

    #[test]
    fn from_str_rejects_unknown_values() {
        assert!("policy".parse::<DecisionType>().is_err());
        assert!("Active".parse::<DecisionStatus>().is_err());
    }

    #[test]
    fn status_transitions() {
        assert!(DecisionStatus::Active.can_transition_to(DecisionStatus::Superseded));
        assert!(!DecisionStatus::Superseded.can_transition_to(DecisionStatus::Active));
        assert!(!DecisionStatus::Superseded.can_transition_to(DecisionStatus::Superseded));
    }
}
