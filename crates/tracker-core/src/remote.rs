//! Hub-side decision shape and its translation into local form.

use crate::decision::{Block, Decision, HUB_SOURCE};
use crate::vocab;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A decision as returned by `GET /api/decisions`.
///
/// Every field is optional and loosely typed: ids may arrive as numbers,
/// dates may be malformed, `verification` may be missing or not an object.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDecision {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub responsible: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub verification: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Option<Vec<String>>,
}

/// Decoded body of a listing call.
#[derive(Debug, Default)]
pub struct Listing {
    pub decisions: Vec<RemoteDecision>,
    /// Elements that could not be read as decisions.
    pub rejected: usize,
}

/// Accepts a bare array, `{"decisions": [...]}` or `{"data": [...]}`.
/// Returns `None` for any other shape.
pub fn parse_listing(body: &Value) -> Option<Listing> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("decisions").or_else(|| map.get("data")) {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let mut listing = Listing::default();
    for item in items {
        if !item.is_object() {
            listing.rejected += 1;
            continue;
        }
        match RemoteDecision::deserialize(item) {
            Ok(d) => listing.decisions.push(d),
            Err(_) => listing.rejected += 1,
        }
    }
    Some(listing)
}

impl RemoteDecision {
    /// Hub id, if the record carries a non-empty one.
    pub fn hub_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn verification_date(&self) -> Option<&str> {
        self.verification
            .as_ref()
            .and_then(|v| v.get("date"))
            .and_then(Value::as_str)
    }

    /// Local block for the hub domain; unknown or missing domains map to `open`.
    pub fn block(&self) -> Block {
        vocab::block_for_domain(self.domain.as_deref().unwrap_or(vocab::DEFAULT_DOMAIN))
    }

    /// Translate into a local decision carrying `local_id`.
    pub fn to_local(&self, local_id: String) -> Decision {
        let block = self.block();
        let status = vocab::status_from_hub(self.status.as_deref().unwrap_or("active"));

        Decision {
            id: local_id,
            hub_id: self.hub_id().map(str::to_string),
            block,
            decision: self.title().to_string(),
            responsible: self.responsible.clone().unwrap_or_default(),
            deadline: date_prefix(self.deadline.as_deref()),
            check_date: date_prefix(self.verification_date()),
            status,
            comment: self.content.clone().unwrap_or_default(),
            date_created: date_prefix(self.created_at.as_deref()),
            source: HUB_SOURCE.to_string(),
            tags: self.tags.clone(),
        }
    }
}

/// First ten characters of a date-ish string. Malformed input passes
/// through truncated rather than being rejected.
pub fn date_prefix(raw: Option<&str>) -> Option<String> {
    let prefix: String = raw?.trim().chars().take(10).collect();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_tags<'de, D>(de: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Status;
    use serde_json::json;

    #[test]
    fn listing_accepts_all_three_shapes() {
        let one = json!({"id": "a", "title": "A"});
        for body in [
            json!([one.clone()]),
            json!({"decisions": [one.clone()]}),
            json!({"data": [one.clone()]}),
        ] {
            let listing = parse_listing(&body).unwrap();
            assert_eq!(listing.decisions.len(), 1);
            assert_eq!(listing.decisions[0].hub_id(), Some("a"));
        }
    }

    #[test]
    fn listing_rejects_unknown_shapes() {
        assert!(parse_listing(&json!({"items": []})).is_none());
        assert!(parse_listing(&json!({"decisions": "nope"})).is_none());
        assert!(parse_listing(&json!("text")).is_none());
        assert!(parse_listing(&json!(42)).is_none());
    }

    #[test]
    fn listing_skips_non_object_elements() {
        let listing = parse_listing(&json!([{"id": "a"}, 7, "x", null])).unwrap();
        assert_eq!(listing.decisions.len(), 1);
        assert_eq!(listing.rejected, 3);
    }

    #[test]
    fn translates_archived_finance_decision() {
        let remote: RemoteDecision = serde_json::from_value(json!({
            "id": "x1",
            "title": "Foo",
            "domain": "finance",
            "status": "archived",
            "deadline": "2026-05-01T00:00:00Z"
        }))
        .unwrap();
        let local = remote.to_local("F-01".into());
        assert_eq!(local.block, Block::Finance);
        assert_eq!(local.status, Status::Done);
        assert_eq!(local.deadline.as_deref(), Some("2026-05-01"));
        assert_eq!(local.hub_id.as_deref(), Some("x1"));
        assert_eq!(local.source, HUB_SOURCE);
        assert!(local.is_hub_origin());
    }

    #[test]
    fn defaults_for_missing_fields() {
        let remote: RemoteDecision = serde_json::from_value(json!({
            "id": 17,
            "title": "Порог эскалации",
            "verification": "next week",
            "tags": ["a", 1, "b"],
            "responsible": null
        }))
        .unwrap();
        let local = remote.to_local("Q-01".into());
        assert_eq!(local.hub_id.as_deref(), Some("17"));
        assert_eq!(local.block, Block::Open);
        assert_eq!(local.status, Status::Active);
        assert_eq!(local.check_date, None);
        assert_eq!(local.responsible, "");
        assert_eq!(local.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn verification_date_is_truncated() {
        let remote: RemoteDecision = serde_json::from_value(json!({
            "verification": {"date": "2026-03-09T12:00:00.000Z"},
            "createdAt": "2026-02-18T08:15:00Z"
        }))
        .unwrap();
        let local = remote.to_local("Q-01".into());
        assert_eq!(local.check_date.as_deref(), Some("2026-03-09"));
        assert_eq!(local.date_created.as_deref(), Some("2026-02-18"));
    }

    #[test]
    fn date_prefix_tolerates_garbage() {
        assert_eq!(date_prefix(Some("soon")).as_deref(), Some("soon"));
        assert_eq!(date_prefix(Some("")), None);
        assert_eq!(date_prefix(None), None);
        assert_eq!(
            date_prefix(Some("до конца марта 2026")).as_deref(),
            Some("до конца м")
        );
    }
}
