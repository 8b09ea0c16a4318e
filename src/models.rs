use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?").expect("valid amount regex")
});

/// A single event as reported by an extraction backend.
///
/// Field names on the wire are the human-readable column names the
/// extraction instruction asks for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    #[serde(rename = "Event Title")]
    pub title: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Price")]
    pub price: String,
}

impl EventRecord {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            date: date.into(),
            time: time.into(),
            price: price.into(),
        }
    }

    pub fn price_kind(&self) -> PriceKind {
        PriceKind::classify(&self.price)
    }

    pub fn is_free(&self) -> bool {
        matches!(self.price_kind(), PriceKind::Free)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Free,
    Amount { cents: i64 },
    Range { min_cents: i64, max_cents: i64 },
    Unrecognized,
}

impl PriceKind {
    pub fn classify(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("free") {
            return PriceKind::Free;
        }

        let amounts: Vec<i64> = AMOUNT_RE
            .captures_iter(trimmed)
            .filter_map(|caps| {
                let whole = caps.get(1)?.as_str().replace(',', "").parse::<i64>().ok()?;
                let fraction = match caps.get(2).map(|m| m.as_str()) {
                    Some(digits) if digits.len() == 1 => digits.parse::<i64>().ok()? * 10,
                    Some(digits) => digits.parse::<i64>().ok()?,
                    None => 0,
                };
                whole.checked_mul(100)?.checked_add(fraction)
            })
            .collect();

        match amounts.as_slice() {
            [cents] => PriceKind::Amount { cents: *cents },
            [a, b] => PriceKind::Range {
                min_cents: *a.min(b),
                max_cents: *a.max(b),
            },
            _ => PriceKind::Unrecognized,
        }
    }
}

/// Events discovered for one query, in discovery order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCollection {
    #[serde(default)]
    events: Vec<EventRecord>,
}

impl EventCollection {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.events.iter()
    }

    pub fn free_count(&self) -> usize {
        self.events.iter().filter(|event| event.is_free()).count()
    }

    /// Serializes to the `{ "events": [...] }` document backends return.
    pub fn to_wire_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"events\": []}".to_string())
    }
}

impl From<Vec<EventRecord>> for EventCollection {
    fn from(events: Vec<EventRecord>) -> Self {
        Self::new(events)
    }
}

/// A search query that is known to contain something other than whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::parse_response;
    use serde_json::Value;

    fn sample() -> EventCollection {
        EventCollection::new(vec![
            EventRecord::new(
                "Cutting-Edge Biotech Innovations",
                "San Francisco, CA",
                "October 15, 2025",
                "9:00 AM - 5:00 PM",
                "Free",
            ),
            EventRecord::new(
                "Next-Gen Tech Solutions Expo",
                "Austin, TX",
                "December 5-6, 2025",
                "9:00 AM - 6:00 PM",
                "$150.00 - $300.00",
            ),
        ])
    }

    #[test]
    fn classifies_prices() {
        assert_eq!(PriceKind::classify("Free"), PriceKind::Free);
        assert_eq!(PriceKind::classify("  free "), PriceKind::Free);
        assert_eq!(
            PriceKind::classify("$99.00"),
            PriceKind::Amount { cents: 9900 }
        );
        assert_eq!(
            PriceKind::classify("$150.00 - $300.00"),
            PriceKind::Range {
                min_cents: 15000,
                max_cents: 30000
            }
        );
        assert_eq!(
            PriceKind::classify("$1,250.5"),
            PriceKind::Amount { cents: 125050 }
        );
        assert_eq!(PriceKind::classify("Donation"), PriceKind::Unrecognized);
        assert_eq!(PriceKind::classify("$5 / $10 / $15"), PriceKind::Unrecognized);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value: Value = serde_json::from_str(&sample().to_wire_json()).expect("valid json");
        let first = &value["events"][0];
        assert_eq!(first["Event Title"], "Cutting-Edge Biotech Innovations");
        assert_eq!(first["Location"], "San Francisco, CA");
        assert_eq!(first["Date"], "October 15, 2025");
        assert_eq!(first["Time"], "9:00 AM - 5:00 PM");
        assert_eq!(first["Price"], "Free");
        assert_eq!(first.as_object().map(|o| o.len()), Some(5));
    }

    #[test]
    fn wire_json_round_trips() {
        let original = sample();
        let parsed = parse_response(&original.to_wire_json()).expect("parse wire json");
        assert_eq!(parsed, original);
        assert_eq!(
            parse_response(&EventCollection::default().to_wire_json()),
            Ok(EventCollection::default())
        );
    }

    #[test]
    fn counts_free_events() {
        assert_eq!(sample().free_count(), 1);
        assert_eq!(EventCollection::default().free_count(), 0);
    }

    #[test]
    fn query_rejects_blank_text() {
        assert!(Query::new("").is_none());
        assert!(Query::new("   \t").is_none());
        let query = Query::new("  San Francisco tech events ").expect("non-empty query");
        assert_eq!(query.as_str(), "San Francisco tech events");
        assert_eq!(query.to_string(), "San Francisco tech events");
    }
}
