//! In-memory backend for data layer tests
//!
//! Evaluates the structured filter, sort, field selection and record limit
//! of each query the way the hosted backend would, and records every query
//! it receives.

use async_trait::async_trait;
use atelier_site::airtable::{
    Backend, BackendError, Filter, RawRecord, SelectQuery, SortDirection, Table,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    tables: Mutex<HashMap<Table, Vec<RawRecord>>>,
    queries: Mutex<Vec<(Table, SelectQuery)>>,
    delay: Option<Duration>,
    failing: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, table: Table, records: Vec<RawRecord>) -> Self {
        self.set_records(table, records);
        self
    }

    /// Every query sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_records(&self, table: Table, records: Vec<RawRecord>) {
        self.tables.lock().unwrap().insert(table, records);
    }

    /// Make subsequent queries fail with a network error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(Table, SelectQuery)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<(Table, SelectQuery)> {
        self.queries.lock().unwrap().last().cloned()
    }
}

fn matches(filter: &Filter, record: &RawRecord) -> bool {
    match filter {
        Filter::FeaturedOnly => record.field("Featured") == Some(&Value::Bool(true)),
        Filter::RecordIds(ids) => ids.contains(&record.id),
    }
}

fn sort_key(record: &RawRecord, field: &str) -> String {
    record
        .field(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Backend for FakeBackend {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<RawRecord>, BackendError> {
        self.queries.lock().unwrap().push((table, query.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::NetworkError("connection refused".to_string()));
        }

        let mut records: Vec<RawRecord> = self
            .tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|r| query.filter.as_ref().map_or(true, |f| matches(f, r)))
            .collect();

        for sort in query.sort.iter().rev() {
            records.sort_by(|a, b| {
                let ordering = sort_key(a, sort.field).cmp(&sort_key(b, sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if !query.fields.is_empty() {
            for record in &mut records {
                record.fields.retain(|name, _| query.fields.iter().any(|f| *f == name.as_str()));
            }
        }

        if let Some(max) = query.max_records {
            records.truncate(max);
        }

        Ok(records)
    }
}
