//! Filter conversion to Qdrant `Filter`.
//!
//! Supports exact equality on scalar fields (`String`, integer `Number`, `Bool`).
//! Metadata fields live under the `metadata.` payload prefix.

use crate::record::RagFilter;
use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::debug;

fn field_condition(key: String, value: MatchValue) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key,
            r#match: Some(Match {
                match_value: Some(value),
            }),
            ..Default::default()
        })),
    }
}

/// Builds a `must` filter: `course_id == course_id` AND every metadata equality.
///
/// Unsupported value types (floats, arrays, objects, null) are skipped.
pub fn to_qdrant_filter(course_id: &str, extra: Option<&RagFilter>) -> Filter {
    let mut must = vec![field_condition(
        "course_id".into(),
        MatchValue::Keyword(course_id.to_string()),
    )];

    for (field, val) in extra.map(|f| f.equals.as_slice()).unwrap_or_default() {
        let m = match val {
            serde_json::Value::String(s) => MatchValue::Keyword(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => MatchValue::Integer(i),
                None => {
                    debug!(%field, "skipping non-integer number filter");
                    continue;
                }
            },
            serde_json::Value::Bool(b) => MatchValue::Boolean(*b),
            _ => {
                debug!(%field, "skipping unsupported filter value");
                continue;
            }
        };
        must.push(field_condition(format!("metadata.{field}"), m));
    }

    Filter {
        must,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(f: &Filter) -> Vec<String> {
        f.must
            .iter()
            .filter_map(|c| match &c.condition_one_of {
                Some(ConditionOneOf::Field(fc)) => Some(fc.key.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn course_scope_is_always_present() {
        let f = to_qdrant_filter("rust-101", None);
        assert_eq!(keys(&f), vec!["course_id".to_string()]);
        assert!(f.should.is_empty());
    }

    #[test]
    fn metadata_equalities_are_prefixed_and_unsupported_skipped() {
        let extra = RagFilter {
            equals: vec![
                ("kind".into(), json!("video")),
                ("week".into(), json!(3)),
                ("free".into(), json!(true)),
                ("score".into(), json!(0.5)),
                ("tags".into(), json!(["a"])),
            ],
        };
        let f = to_qdrant_filter("c", Some(&extra));
        assert_eq!(
            keys(&f),
            vec!["course_id", "metadata.kind", "metadata.week", "metadata.free"]
        );
    }
}
