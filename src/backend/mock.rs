use std::time::Duration;

use serde_json::json;
use tracing::info;

use super::ExtractionBackend;
use crate::models::{EventCollection, Query};
use crate::processor::{parse_response, ExtractionError};

const SIMULATED_LATENCY: Duration = Duration::from_secs(2);

/// Stand-in for a scraping agent: waits, then answers every query with the
/// same canned document.
pub struct FixedMockBackend {
    latency: Duration,
    body: String,
}

impl Default for FixedMockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedMockBackend {
    pub fn new() -> Self {
        Self {
            latency: SIMULATED_LATENCY,
            body: fixed_events_body(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replaces the canned response with an arbitrary body, well-formed or not.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

impl ExtractionBackend for FixedMockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn extract(
        &self,
        query: &Query,
        instruction: &str,
    ) -> Result<EventCollection, ExtractionError> {
        info!("Simulating a scrape for the query: '{query}'");
        info!("Using the following instruction for the AI agent:\n{instruction}");
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        parse_response(&self.body)
    }
}

fn fixed_events_body() -> String {
    json!({
        "events": [
            {
                "Event Title": "Cutting-Edge Biotech Innovations",
                "Location": "San Francisco, CA",
                "Date": "October 15, 2025",
                "Time": "9:00 AM - 5:00 PM",
                "Price": "Free"
            },
            {
                "Event Title": "Future of Agriculture Tech Summit",
                "Location": "Virtual Event",
                "Date": "November 2, 2025",
                "Time": "10:00 AM - 2:00 PM (CST)",
                "Price": "$99.00"
            },
            {
                "Event Title": "Local Tech Meetup & Networking",
                "Location": "New York, NY",
                "Date": "September 20, 2025",
                "Time": "7:00 PM - 9:00 PM",
                "Price": "Free"
            },
            {
                "Event Title": "Next-Gen Tech Solutions Expo",
                "Location": "Austin, TX",
                "Date": "December 5-6, 2025",
                "Time": "9:00 AM - 6:00 PM",
                "Price": "$150.00 - $300.00"
            }
        ]
    })
    .to_string()
}
