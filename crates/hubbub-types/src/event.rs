//! Wire shapes of the remote event-search service.
//!
//! These types are consumed, not owned: every field of an [`EventRecord`]
//! is independently optional because the service makes no guarantees about
//! which fields a given event carries. Field names are camelCase on the
//! wire.

use serde::{Deserialize, Serialize};

/// One event as returned by the remote service.
/// Snake_case aliases keep the record parseable regardless of which wire
/// path (and naming convention) produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, alias = "start_date_time", skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    #[serde(default, alias = "is_free", skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Canonical result of an event search, regardless of which wire path
/// produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSearchResult {
    #[serde(default)]
    pub query: String,
    #[serde(default, alias = "results_count")]
    pub results_count: usize,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// The full event catalog, from `get_all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCatalog {
    #[serde(default, alias = "total_events")]
    pub total_events: usize,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Outcome of a health probe against the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHealth {
    Healthy,
    Unhealthy,
}

impl ServiceHealth {
    pub fn is_healthy(self) -> bool {
        matches!(self, ServiceHealth::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_record_all_fields_optional() {
        let record: EventRecord = serde_json::from_str("{}").unwrap();
        assert!(record.title.is_none());
        assert!(record.price.is_none());
        assert!(record.tags.is_none());
    }

    #[test]
    fn test_event_record_camel_case_wire_names() {
        let json = serde_json::json!({
            "title": "Jazz Night",
            "startDateTime": "2026-08-08T20:00:00Z",
            "isFree": false,
            "price": 25.0,
            "tags": ["jazz", "live-music"]
        });
        let record: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.title.as_deref(), Some("Jazz Night"));
        assert_eq!(record.start_date_time.as_deref(), Some("2026-08-08T20:00:00Z"));
        assert_eq!(record.is_free, Some(false));
        assert_eq!(record.price, Some(25.0));
        assert_eq!(record.tags.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_search_result_defaults() {
        let result: EventSearchResult =
            serde_json::from_str(r#"{"query": "music"}"#).unwrap();
        assert_eq!(result.query, "music");
        assert_eq!(result.results_count, 0);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_catalog_counts() {
        let json = serde_json::json!({
            "totalEvents": 2,
            "events": [{"title": "A"}, {"title": "B"}]
        });
        let catalog: EventCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(catalog.total_events, 2);
        assert_eq!(catalog.events.len(), 2);
    }
}
