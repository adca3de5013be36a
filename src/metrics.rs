//! Per-structure performance ledger for cross-backend comparison.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::query::QueryMetrics;
use crate::types::{QueryKind, StructureKind};

/// One recorded query execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSample {
    pub recorded_at: SystemTime,
    pub query: QueryKind,
    pub metrics: QueryMetrics,
}

/// On-demand aggregate over one structure's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub count: usize,
    pub mean_elapsed_millis: f64,
    pub last_result_count: usize,
}

/// Append-only history of query timings per structure type.
///
/// The ledger is the only state that survives structure rebuilds; it grows
/// for the session lifetime and is emptied only by [`ComparisonLedger::reset`].
/// Summaries are derived from the raw samples on demand, so the write path is
/// a plain append and repeated summarization cannot drift.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ComparisonLedger {
    histories: FxHashMap<StructureKind, Vec<LedgerSample>>,
}

impl ComparisonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample to the structure's history.
    pub fn record(&mut self, kind: StructureKind, query: QueryKind, metrics: QueryMetrics) {
        self.histories.entry(kind).or_default().push(LedgerSample {
            recorded_at: SystemTime::now(),
            query,
            metrics,
        });
    }

    /// Raw samples for a structure, in recording order.
    pub fn samples(&self, kind: StructureKind) -> &[LedgerSample] {
        self.histories.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Aggregate a structure's history; `None` when nothing was recorded.
    pub fn summarize(&self, kind: StructureKind) -> Option<LedgerSummary> {
        let samples = self.histories.get(&kind)?;
        if samples.is_empty() {
            return None;
        }
        let total: f64 = samples.iter().map(|s| s.metrics.elapsed_millis).sum();
        Some(LedgerSummary {
            count: samples.len(),
            mean_elapsed_millis: total / samples.len() as f64,
            last_result_count: samples.last().map(|s| s.metrics.result_count).unwrap_or(0),
        })
    }

    /// Structure with the lowest mean elapsed time, if anything was recorded.
    pub fn fastest(&self) -> Option<(StructureKind, LedgerSummary)> {
        StructureKind::ALL
            .iter()
            .filter_map(|kind| self.summarize(*kind).map(|s| (*kind, s)))
            .min_by(|a, b| {
                a.1.mean_elapsed_millis
                    .partial_cmp(&b.1.mean_elapsed_millis)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.histories.values().all(Vec::is_empty)
    }

    /// Drop all recorded history.
    pub fn reset(&mut self) {
        self.histories.clear();
    }
}

/// The data behind the export an external collaborator serializes: active
/// structure, dataset size, last query, and the summarized ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub structure: StructureKind,
    pub dataset_size: usize,
    pub last_query: Option<QueryKind>,
    pub summaries: FxHashMap<StructureKind, LedgerSummary>,
}

impl PerformanceReport {
    pub fn from_ledger(
        ledger: &ComparisonLedger,
        structure: StructureKind,
        dataset_size: usize,
        last_query: Option<QueryKind>,
    ) -> Self {
        let summaries = StructureKind::ALL
            .iter()
            .filter_map(|kind| ledger.summarize(*kind).map(|s| (*kind, s)))
            .collect();
        Self {
            structure,
            dataset_size,
            last_query,
            summaries,
        }
    }
}
