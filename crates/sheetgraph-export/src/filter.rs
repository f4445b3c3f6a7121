//! Record filtering
//!
//! Selects the records that may become graph nodes: non-folder measure sheets
//! that declare at least one reference and do not live in an excluded folder.

use sheetgraph_core::FilterConfig;
use std::fmt;
use crate::export::{Record, RecordId};

/// Why a record was left out of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Folders only structure the export
    Folder,

    /// Record declares no references
    NoReferences,

    /// Parent folder is on the denylist
    ExcludedParent(RecordId),

    /// Record is not a measure sheet
    WrongType(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::NoReferences => write!(f, "no references"),
            Self::ExcludedParent(id) => write!(f, "excluded parent {}", id),
            Self::WrongType(type_name) => write!(f, "type {}", type_name),
        }
    }
}

/// Result of checking one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Keep,
    Dropped(DropReason),
}

impl FilterOutcome {
    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Dropped-record counts, one per rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub folders: usize,
    pub no_references: usize,
    pub excluded_parent: usize,
    pub wrong_type: usize,
}

impl FilterStats {
    fn count(&mut self, reason: &DropReason) {
        match reason {
            DropReason::Folder => self.folders += 1,
            DropReason::NoReferences => self.no_references += 1,
            DropReason::ExcludedParent(_) => self.excluded_parent += 1,
            DropReason::WrongType(_) => self.wrong_type += 1,
        }
    }

    /// Total records dropped
    pub fn dropped(&self) -> usize {
        self.folders + self.no_references + self.excluded_parent + self.wrong_type
    }
}

/// Applies a [`FilterConfig`] to export records
#[derive(Debug, Clone, Copy)]
pub struct RecordFilter<'a> {
    config: &'a FilterConfig,
}

impl<'a> RecordFilter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self { config }
    }

    /// Check a single record; the first failing rule is reported
    pub fn classify(&self, record: &Record) -> FilterOutcome {
        if record.is_folder {
            return FilterOutcome::Dropped(DropReason::Folder);
        }

        if record.direct_references.is_empty() {
            return FilterOutcome::Dropped(DropReason::NoReferences);
        }

        if self.config.is_parent_excluded(record.parent_id) {
            return FilterOutcome::Dropped(DropReason::ExcludedParent(record.parent_id));
        }

        if record.type_name != self.config.measure_sheet_type {
            return FilterOutcome::Dropped(DropReason::WrongType(record.type_name.clone()));
        }

        FilterOutcome::Keep
    }

    /// Keep the eligible records, preserving export order
    pub fn apply<'r>(&self, records: &'r [Record]) -> Vec<&'r Record> {
        self.apply_counted(records).0
    }

    /// Like [`apply`](Self::apply), also counting why records were dropped
    pub fn apply_counted<'r>(&self, records: &'r [Record]) -> (Vec<&'r Record>, FilterStats) {
        let mut stats = FilterStats::default();
        let kept = records
            .iter()
            .filter(|record| match self.classify(record) {
                FilterOutcome::Keep => true,
                FilterOutcome::Dropped(reason) => {
                    tracing::debug!(id = record.id, %reason, "dropping record");
                    stats.count(&reason);
                    false
                }
            })
            .collect();
        (kept, stats)
    }
}
