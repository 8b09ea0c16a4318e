pub mod http;
pub mod mock;

use crate::config::{AppConfig, BackendKind, ConfigError};
use crate::models::{EventCollection, Query};
use crate::processor::ExtractionError;

/// Something that turns a query plus an extraction instruction into events.
pub trait ExtractionBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, query: &Query, instruction: &str)
        -> Result<EventCollection, ExtractionError>;
}

pub fn backend_from_config(config: &AppConfig) -> Result<Box<dyn ExtractionBackend>, ConfigError> {
    match config.backend {
        BackendKind::Mock => Ok(Box::new(
            mock::FixedMockBackend::new().with_latency(config.latency()),
        )),
        BackendKind::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .ok_or(ConfigError::MissingEndpoint)?;
            Ok(Box::new(http::HttpBackend::new(endpoint, config.timeout())?))
        }
    }
}
