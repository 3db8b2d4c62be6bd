//! Rendering of event results into prompt-ready text.
//!
//! Pure functions: no I/O, no async. At most [`MAX_RENDERED_EVENTS`]
//! events are rendered so a busy weekend cannot blow the prompt budget.
//! Optional fields render only when present; price is tri-state.

use hubbub_types::event::{EventCatalog, EventRecord, EventSearchResult};

/// Fixed sentinel for an empty (but successful) search.
///
/// Distinct from any error string: the orchestrator matches on this to
/// tell "nothing found" apart from "service broken".
pub const NO_EVENTS_FOUND: &str = "No events found matching your criteria.";

/// Cap on rendered events per result.
pub const MAX_RENDERED_EVENTS: usize = 10;

/// Render a search result as numbered entries.
pub fn format_events(result: &EventSearchResult) -> String {
    if result.events.is_empty() {
        return NO_EVENTS_FOUND.to_string();
    }

    let count = if result.results_count > 0 {
        result.results_count
    } else {
        result.events.len()
    };

    let mut out = format!("Found {count} events:\n");
    for (i, event) in result.events.iter().take(MAX_RENDERED_EVENTS).enumerate() {
        out.push('\n');
        push_event(&mut out, i + 1, event);
    }
    out.trim_end().to_string()
}

/// Render the full catalog with its total.
pub fn format_catalog(catalog: &EventCatalog) -> String {
    if catalog.events.is_empty() {
        return NO_EVENTS_FOUND.to_string();
    }

    let mut out = format!("{} events available:\n", catalog.total_events);
    for (i, event) in catalog.events.iter().take(MAX_RENDERED_EVENTS).enumerate() {
        out.push('\n');
        push_event(&mut out, i + 1, event);
    }
    out.trim_end().to_string()
}

fn push_event(out: &mut String, index: usize, event: &EventRecord) {
    let title = event.title.as_deref().unwrap_or("Untitled Event");
    out.push_str(&format!("{index}. **{title}**\n"));

    if let Some(location) = &event.location {
        out.push_str(&format!("   📍 {location}\n"));
    }
    if let Some(date) = &event.start_date_time {
        out.push_str(&format!("   📅 {date}\n"));
    }
    out.push_str(&format!("   💰 {}\n", render_price(event)));
    if let Some(category) = &event.category {
        out.push_str(&format!("   🏷️ {category}\n"));
    }
    if let Some(organizer) = &event.organizer {
        out.push_str(&format!("   👤 {organizer}\n"));
    }
    if let Some(tags) = &event.tags {
        if !tags.is_empty() {
            out.push_str(&format!("   🔖 {}\n", tags.join(", ")));
        }
    }
}

/// Tri-state price: "Free" | "$amount" | "TBA".
fn render_price(event: &EventRecord) -> String {
    if event.is_free == Some(true) {
        return "Free".to_string();
    }
    match event.price {
        Some(price) => format!("${price}"),
        None => "TBA".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str) -> EventRecord {
        EventRecord {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_result_renders_sentinel() {
        let result = EventSearchResult {
            query: "music".to_string(),
            results_count: 0,
            events: vec![],
        };
        assert_eq!(format_events(&result), NO_EVENTS_FOUND);
    }

    #[test]
    fn test_numbered_entries_with_count() {
        let result = EventSearchResult {
            query: "music".to_string(),
            results_count: 2,
            events: vec![event("Jazz Night"), event("Rock Fest")],
        };
        let text = format_events(&result);
        assert!(text.starts_with("Found 2 events:"));
        assert!(text.contains("1. **Jazz Night**"));
        assert!(text.contains("2. **Rock Fest**"));
    }

    #[test]
    fn test_count_falls_back_to_events_len() {
        let result = EventSearchResult {
            query: "q".to_string(),
            results_count: 0,
            events: vec![event("Solo Show")],
        };
        assert!(format_events(&result).starts_with("Found 1 events:"));
    }

    #[test]
    fn test_optional_fields_render_only_when_present() {
        let mut full = event("Jazz Night");
        full.location = Some("Blue Note".to_string());
        full.start_date_time = Some("2026-08-08T20:00:00Z".to_string());
        full.category = Some("Music".to_string());
        full.organizer = Some("City Arts".to_string());
        full.tags = Some(vec!["jazz".to_string(), "live".to_string()]);

        let result = EventSearchResult {
            query: "jazz".to_string(),
            results_count: 2,
            events: vec![full, event("Bare Event")],
        };
        let text = format_events(&result);
        assert!(text.contains("📍 Blue Note"));
        assert!(text.contains("🏷️ Music"));
        assert!(text.contains("👤 City Arts"));
        assert!(text.contains("🔖 jazz, live"));

        // The bare event renders title and price line only.
        let bare_block = text.split("2. **Bare Event**").nth(1).unwrap();
        assert!(!bare_block.contains("📍"));
        assert!(!bare_block.contains("🏷️"));
        assert!(bare_block.contains("💰 TBA"));
    }

    #[test]
    fn test_price_tri_state() {
        let mut free = event("Free Show");
        free.is_free = Some(true);
        free.price = Some(10.0); // is_free wins

        let mut priced = event("Paid Show");
        priced.price = Some(25.0);

        let tba = event("Mystery Show");

        let result = EventSearchResult {
            query: "q".to_string(),
            results_count: 3,
            events: vec![free, priced, tba],
        };
        let text = format_events(&result);
        assert!(text.contains("💰 Free"));
        assert!(text.contains("💰 $25"));
        assert!(text.contains("💰 TBA"));
    }

    #[test]
    fn test_untitled_event_fallback() {
        let result = EventSearchResult {
            query: "q".to_string(),
            results_count: 1,
            events: vec![EventRecord::default()],
        };
        assert!(format_events(&result).contains("**Untitled Event**"));
    }

    #[test]
    fn test_render_cap_at_ten_events() {
        let result = EventSearchResult {
            query: "q".to_string(),
            results_count: 15,
            events: (0..15).map(|i| event(&format!("E{i}"))).collect(),
        };
        let text = format_events(&result);
        assert!(text.contains("10. **E9**"));
        assert!(!text.contains("11. "));
        // The count still reports everything the service found.
        assert!(text.starts_with("Found 15 events:"));
    }

    #[test]
    fn test_format_catalog() {
        let catalog = EventCatalog {
            total_events: 2,
            events: vec![event("A"), event("B")],
        };
        let text = format_catalog(&catalog);
        assert!(text.starts_with("2 events available:"));
        assert!(text.contains("1. **A**"));

        assert_eq!(format_catalog(&EventCatalog::default()), NO_EVENTS_FOUND);
    }
}
