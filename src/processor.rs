use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::ExtractionBackend;
use crate::models::{EventCollection, EventRecord, Query};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Runs one query against an extraction backend. Holds no state between calls.
pub struct QueryProcessor {
    backend: Box<dyn ExtractionBackend>,
}

impl QueryProcessor {
    pub fn new(backend: Box<dyn ExtractionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn process(
        &self,
        query: &Query,
        instruction: &str,
    ) -> Result<EventCollection, ExtractionError> {
        info!(backend = self.backend.name(), query = %query, "processing query");
        let result = self.backend.extract(query, instruction);
        match &result {
            Ok(events) => info!(events = events.len(), "extraction finished"),
            Err(err) => warn!(error = %err, "extraction failed"),
        }
        result
    }
}

/// Parses a backend response document of the form `{ "events": [...] }`.
///
/// A missing or null `events` key yields an empty collection. Anything else
/// that does not match the record shape is reported as
/// [`ExtractionError::MalformedResponse`].
pub fn parse_response(body: &str) -> Result<EventCollection, ExtractionError> {
    let document: Value = serde_json::from_str(body)
        .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;

    let Value::Object(mut fields) = document else {
        return Err(ExtractionError::MalformedResponse(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let events = match fields.remove("events") {
        Some(Value::Null) | None => {
            warn!("response has no events key; treating it as an empty collection");
            return Ok(EventCollection::default());
        }
        Some(events) => events,
    };

    let records: Vec<EventRecord> = serde_json::from_value(events)
        .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;

    if let Some(index) = records
        .iter()
        .position(|record| record.title.trim().is_empty())
    {
        return Err(ExtractionError::MalformedResponse(format!(
            "event {index} has an empty title"
        )));
    }

    Ok(records.into())
}
