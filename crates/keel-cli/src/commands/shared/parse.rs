use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value using serde deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = serde_json::Value::String(normalized);
    serde_json::from_value(json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use keel_core::enums::{DecisionStatus, DecisionType};

    use super::parse_enum;

    #[test]
    fn parses_snake_case_enum() {
        let kind: DecisionType = parse_enum("constraint", "type").expect("type should parse");
        assert_eq!(kind, DecisionType::Constraint);
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        let status: DecisionStatus = parse_enum(" Superseded ", "status").expect("status should parse");
        assert_eq!(status, DecisionStatus::Superseded);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<DecisionStatus>("retired", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'retired'"));
    }
}
