//! HTTP client for the Airtable REST API
//!
//! `GET {api_url}/{base_id}/{table}` with bearer authentication. Responses
//! are paged; the client keeps requesting with the returned `offset` until
//! the backend stops sending one.

use super::{Backend, BackendError, RawRecord, SelectQuery, Table};
use async_trait::async_trait;
use atelier_common::config::{AirtableConfig, BackendCredentials};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("atelier-site/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;

/// One page of a list response
#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// Airtable REST client
pub struct AirtableClient {
    http_client: reqwest::Client,
    api_url: String,
    base_id: String,
    api_key: String,
}

impl AirtableClient {
    pub fn new(
        credentials: BackendCredentials,
        settings: &AirtableConfig,
    ) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            base_id: credentials.base_id,
            api_key: credentials.api_key,
        })
    }

    fn table_url(&self, table: Table) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| BackendError::NotConfigured(format!("invalid api_url '{}': {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::NotConfigured(format!("api_url '{}' cannot be a base", self.api_url)))?
            .pop_if_empty()
            .push(&self.base_id)
            .push(table.name());
        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        params: &[(String, String)],
    ) -> Result<ListPage, BackendError> {
        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(BackendError::Unauthorized(status.as_u16()));
        }

        if status == 429 {
            return Err(BackendError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

/// Query-string parameters for `query`, excluding the page offset
pub fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("pageSize".to_string(), PAGE_SIZE.to_string())];

    for field in &query.fields {
        params.push(("fields[]".to_string(), field.to_string()));
    }

    for (i, sort) in query.sort.iter().enumerate() {
        params.push((format!("sort[{}][field]", i), sort.field.to_string()));
        params.push((format!("sort[{}][direction]", i), sort.direction.as_str().to_string()));
    }

    if let Some(filter) = &query.filter {
        params.push(("filterByFormula".to_string(), filter.to_formula()));
    }

    if let Some(max) = query.max_records {
        params.push(("maxRecords".to_string(), max.to_string()));
    }

    params
}

#[async_trait]
impl Backend for AirtableClient {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<RawRecord>, BackendError> {
        let url = self.table_url(table)?;
        let base_params = query_params(query);

        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut params = base_params.clone();
            if let Some(offset) = &offset {
                params.push(("offset".to_string(), offset.clone()));
            }

            tracing::debug!(table = %table, page = pages, "Querying backend");

            let page = self.fetch_page(&url, &params).await?;
            pages += 1;
            records.extend(page.records);

            match page.offset {
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    tracing::warn!(
                        table = %table,
                        offset = %next,
                        "Backend repeated a page offset, stopping"
                    );
                    break;
                }
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            table = %table,
            records = records.len(),
            pages = pages,
            "Backend query complete"
        );

        Ok(records)
    }
}
