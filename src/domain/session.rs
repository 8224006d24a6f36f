//! Analysis session state and the volatile saved-session store.
//!
//! An [`AnalysisSession`] is created when a user session starts and dropped
//! when it ends. It holds the most recent completed analysis and a
//! [`SessionStore`] of saved summaries. Nothing here outlives the process.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use uuid::Uuid;

use super::analysis::{AnalysisConfig, AnalysisResult};
use super::error::PortvisError;
use super::metrics::MetricsResult;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub timestamp: NaiveDateTime,
    pub label: String,
    pub config: AnalysisConfig,
    pub metrics: MetricsResult,
}

/// In-memory map from generated id to saved record.
///
/// Not a storage engine: no durability, no uniqueness beyond the id.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: HashMap<Uuid, SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(
        &mut self,
        label: &str,
        config: &AnalysisConfig,
        metrics: &MetricsResult,
        timestamp: NaiveDateTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.records.insert(
            id,
            SessionRecord {
                id,
                timestamp,
                label: label.to_string(),
                config: config.clone(),
                metrics: *metrics,
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&SessionRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by timestamp, then label.
    pub fn records(&self) -> Vec<&SessionRecord> {
        let mut records: Vec<&SessionRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.label.cmp(&b.label))
        });
        records
    }
}

#[derive(Debug)]
pub struct CompletedAnalysis {
    pub config: AnalysisConfig,
    pub result: AnalysisResult,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    last: Option<CompletedAnalysis>,
    store: SessionStore,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current analysis with a newly completed one.
    pub fn record_analysis(&mut self, config: AnalysisConfig, result: AnalysisResult) {
        self.last = Some(CompletedAnalysis { config, result });
    }

    pub fn last_analysis(&self) -> Option<&CompletedAnalysis> {
        self.last.as_ref()
    }

    pub fn has_results(&self) -> bool {
        self.last.is_some()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Saves the current analysis summary under `label`.
    pub fn save(&mut self, label: &str) -> Result<Uuid, PortvisError> {
        self.save_at(label, Local::now().naive_local())
    }

    pub fn save_at(&mut self, label: &str, timestamp: NaiveDateTime) -> Result<Uuid, PortvisError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(PortvisError::invalid("session label must not be empty"));
        }
        let last = self
            .last
            .as_ref()
            .ok_or_else(|| PortvisError::invalid("no completed analysis to save"))?;
        let id = self
            .store
            .save(label, &last.config, &last.result.metrics, timestamp);
        tracing::debug!(%id, label, "saved analysis session");
        Ok(id)
    }
}

/// `"Analysis for AAPL, MSFT (2024-05-01)"`.
pub fn default_label(tickers: &[String], date: NaiveDate) -> String {
    format!(
        "Analysis for {} ({})",
        tickers.join(", "),
        date.format("%Y-%m-%d")
    )
}
