use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{SearchProvider, SearchRequest};
use crate::domain::{ResultPage, SearchMode, SearchResult};
use crate::error::ProviderError;
use crate::query::normalize_identifier;

/// Provider over a fixed entity list, used by the CLI and in tests.
#[derive(Debug)]
pub struct InMemoryProvider {
    entities: Vec<SearchResult>,
    latency: Option<Duration>,
    failure: Mutex<Option<ProviderError>>,
}

impl InMemoryProvider {
    pub fn new(entities: Vec<SearchResult>) -> Self {
        Self {
            entities,
            latency: None,
            failure: Mutex::new(None),
        }
    }

    /// Load entities from a JSON array or a JSON Lines file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read entity file: {}", path.display()))?;
        let entities = parse_entities(&content)
            .with_context(|| format!("Failed to parse entity file: {}", path.display()))?;
        tracing::debug!(count = entities.len(), path = %path.display(), "loaded entities");
        Ok(Self::new(entities))
    }

    /// Delay every response, e.g. to watch the loading state.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every following search fail with `error` until cleared.
    pub fn fail_with(&self, error: Option<ProviderError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn matches(entity: &SearchResult, request: &SearchRequest) -> bool {
        let query = &request.query;
        let hit = match query.mode {
            SearchMode::ExactIdentifierA | SearchMode::ExactIdentifierB => {
                normalize_identifier(&entity.id) == query.text
            }
            SearchMode::FreeText => entity
                .label
                .to_lowercase()
                .contains(&query.text.to_lowercase()),
        };

        hit && request.filters.iter().all(|(key, expected)| {
            entity.payload.get(key).is_some_and(|value| match value {
                serde_json::Value::String(s) => s == expected,
                other => other.to_string() == *expected,
            })
        })
    }

    fn run(&self, request: &SearchRequest) -> Result<ResultPage, ProviderError> {
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(error) = failure {
            return Err(error);
        }

        let matched: Vec<&SearchResult> = self
            .entities
            .iter()
            .filter(|entity| Self::matches(entity, request))
            .collect();
        let total = matched.len();
        let items = matched
            .into_iter()
            .take(request.max_results)
            .cloned()
            .collect();

        Ok(ResultPage {
            items,
            index: 1,
            size: request.max_results.max(1),
            total,
        })
    }
}

impl SearchProvider for InMemoryProvider {
    async fn search(&self, request: SearchRequest) -> Result<ResultPage, ProviderError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.run(&request)
    }
}

fn parse_entities(content: &str) -> Result<Vec<SearchResult>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid entity on line {}", i + 1))
        })
        .collect()
}
