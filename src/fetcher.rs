// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Remote entity fetcher
//!
//! [`EntitySource`] hands back raw JSON so the cache can hold responses
//! without knowing entity types; [`decode_page`] and [`decode_entity`] turn
//! them into typed values. [`SwapiClient`] is the HTTP implementation.

use crate::resource::{EntityKind, Resource};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://swapi.py4e.com/api";

/// Search and pagination parameters of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    /// Search term
    pub search: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
}

impl ListQuery {
    /// Query with blank search terms dropped
    #[must_use]
    pub fn new(search: Option<String>, page: Option<u32>) -> Self {
        Self {
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page,
        }
    }
}

/// One page of a list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Results across all pages
    pub count: u64,
    /// Cursor of the next page
    pub next: Option<String>,
    /// Cursor of the previous page
    pub previous: Option<String>,
    /// Entities on this page
    #[serde(default = "Vec::new")]
    pub results: Vec<R>,
}

/// Fetch failures, as shown to the user
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request was fine but the entity does not exist
    #[error("{kind}/{id} does not exist")]
    NotFound {
        /// Kind requested
        kind: EntityKind,
        /// ID requested
        id: String,
    },
    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code
        status: u16,
        /// Reason phrase
        message: String,
    },
    /// The server could not be reached
    #[error("could not reach {url}: {message}")]
    Transport {
        /// Request URL
        url: String,
        /// Cause
        message: String,
    },
    /// The body was not the expected JSON
    #[error("unexpected response for {kind}: {message}")]
    Decode {
        /// Kind requested
        kind: EntityKind,
        /// Cause
        message: String,
    },
    /// A newer request replaced this one before it completed
    #[error("request superseded by a newer one")]
    Superseded,
    /// Search requested on a kind that does not support it
    #[error("{0} cannot be searched")]
    NotSearchable(EntityKind),
}

impl ApiError {
    /// Worth retrying: transport failures, 5xx and 429
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// The entity does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Exponential backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Read-only access to the reference API
pub trait EntitySource {
    /// `GET <endpoint>/?search=&page=` as raw JSON
    fn fetch_list(&self, kind: EntityKind, query: &ListQuery) -> Result<Value, ApiError>;

    /// `GET <endpoint>/<id>/` as raw JSON
    fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Value, ApiError>;
}

impl<S: EntitySource + ?Sized> EntitySource for &S {
    fn fetch_list(&self, kind: EntityKind, query: &ListQuery) -> Result<Value, ApiError> {
        (**self).fetch_list(kind, query)
    }

    fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Value, ApiError> {
        (**self).fetch_one(kind, id)
    }
}

/// Decode a raw list response
pub fn decode_page<R: Resource>(raw: Value) -> Result<Page<R>, ApiError> {
    decode(R::KIND, raw)
}

/// Decode a raw detail response
pub fn decode_entity<R: Resource>(raw: Value) -> Result<R, ApiError> {
    decode(R::KIND, raw)
}

fn decode<T: DeserializeOwned>(kind: EntityKind, raw: Value) -> Result<T, ApiError> {
    serde_json::from_value(raw).map_err(|e| ApiError::Decode {
        kind,
        message: e.to_string(),
    })
}

// =============================================================================
// HTTP client
// =============================================================================

/// Blocking HTTP client for the reference API
#[derive(Debug, Clone)]
pub struct SwapiClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SwapiClient {
    /// Client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::Transport {
            url: base_url.clone(),
            message: format!("invalid base URL: {e}"),
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("holocron/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a list request
    pub fn list_url(&self, kind: EntityKind, query: &ListQuery) -> Result<Url, ApiError> {
        let mut url = self.parse(&format!("{}{}/", self.base_url, kind.endpoint()))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// URL of a detail request
    pub fn detail_url(&self, kind: EntityKind, id: &str) -> Result<Url, ApiError> {
        let mut url = self.parse(&format!("{}{}/", self.base_url, kind.endpoint()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport {
                url: self.base_url.clone(),
                message: "base URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    fn parse(&self, raw: &str) -> Result<Url, ApiError> {
        Url::parse(raw).map_err(|e| ApiError::Transport {
            url: raw.to_string(),
            message: e.to_string(),
        })
    }

    fn get_json(&self, url: &Url, kind: EntityKind, id: Option<&str>) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, kind, id) {
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!("GET {} failed ({}), retrying in {:?}", url, e, delay);
                    thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// One attempt; a 404 on a detail request (`id` set) is [`ApiError::NotFound`]
    fn get_once(&self, url: &Url, kind: EntityKind, id: Option<&str>) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| ApiError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ApiError::NotFound {
                    kind,
                    id: id.to_string(),
                });
            }
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        let body = response.text().map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            kind,
            message: format!("body is not JSON: {e}"),
        })
    }
}

impl EntitySource for SwapiClient {
    fn fetch_list(&self, kind: EntityKind, query: &ListQuery) -> Result<Value, ApiError> {
        let url = self.list_url(kind, query)?;
        self.get_json(&url, kind, None)
    }

    fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Value, ApiError> {
        let url = self.detail_url(kind, id)?;
        self.get_json(&url, kind, Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Character;
    use serde_json::json;

    fn client() -> SwapiClient {
        SwapiClient::new("https://swapi.py4e.com/api/", Duration::from_secs(5), RetryPolicy::none()).unwrap()
    }

    #[test]
    fn test_list_url() {
        let c = client();
        let url = c
            .list_url(EntityKind::Characters, &ListQuery::new(Some("sky walker".into()), Some(2)))
            .unwrap();
        assert_eq!(url.as_str(), "https://swapi.py4e.com/api/people/?search=sky+walker&page=2");

        let url = c.list_url(EntityKind::Films, &ListQuery::default()).unwrap();
        assert_eq!(url.as_str(), "https://swapi.py4e.com/api/films/");
    }

    #[test]
    fn test_detail_url() {
        let url = client().detail_url(EntityKind::Starships, "12").unwrap();
        assert_eq!(url.as_str(), "https://swapi.py4e.com/api/starships/12/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(SwapiClient::new("not a url", Duration::from_secs(1), RetryPolicy::none()).is_err());
    }

    #[test]
    fn test_blank_search_dropped() {
        assert_eq!(ListQuery::new(Some("   ".into()), None).search, None);
    }

    #[test]
    fn test_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(64), Duration::from_secs(30));
    }

    #[test]
    fn test_decode_error_is_not_retried() {
        let err = ApiError::Decode { kind: EntityKind::Films, message: "body is not JSON".into() };
        assert!(!err.is_retryable());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_retryable() {
        let status = |status| ApiError::Status { status, message: String::new() };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!ApiError::NotFound { kind: EntityKind::Films, id: "9".into() }.is_retryable());
    }

    #[test]
    fn test_decode_page() {
        let page: Page<Character> = decode_page(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"name": "Leia Organa", "url": "https://swapi.py4e.com/api/people/5/"}]
        }))
        .unwrap();
        assert_eq!(page.results[0].name, "Leia Organa");

        let err = decode_entity::<Character>(json!({"name": 3})).unwrap_err();
        assert!(matches!(err, ApiError::Decode { kind: EntityKind::Characters, .. }));
    }
}
