//! Batch record cleaning.

use super::sanitizer::TextSanitizer;
use super::timestamp;
use crate::models::{CleanedRecord, NewsRecord};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::debug;

/// Titles must be strictly longer than this many characters.
pub const DEFAULT_MIN_TITLE_CHARS: usize = 5;

/// Content must be strictly longer than this many characters.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 20;

/// Counts of what happened to a batch during cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Records received.
    pub input: usize,
    /// Exact duplicates of an earlier record in the batch.
    pub duplicates: usize,
    /// Records without a title or content.
    pub missing_fields: usize,
    /// Records whose title or content sanitized down to nothing.
    pub empty_after_clean: usize,
    /// Records under the length thresholds.
    pub too_short: usize,
    /// Surviving records whose publish time was kept verbatim.
    pub unparsed_times: usize,
}

impl CleanReport {
    /// Total records dropped.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.duplicates + self.missing_fields + self.empty_after_clean + self.too_short
    }
}

/// Result of cleaning one batch.
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    /// Records that survived, in input order.
    pub records: Vec<CleanedRecord>,
    /// What was dropped and why.
    pub report: CleanReport,
}

/// Validates and normalizes a batch of candidate records.
///
/// Steps, in order: drop exact duplicates, drop records missing a title or
/// content, normalize `publish_time` (best effort), sanitize title and
/// content, drop records left empty, drop records at or under the length
/// thresholds, stamp `processed_at`. An empty result is not an error.
#[derive(Debug, Clone, Copy)]
pub struct RecordCleaner {
    min_title_chars: usize,
    min_content_chars: usize,
}

impl Default for RecordCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCleaner {
    /// Creates a cleaner with the default thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_title_chars: DEFAULT_MIN_TITLE_CHARS,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
        }
    }

    /// Overrides the length thresholds (both exclusive).
    #[must_use]
    pub const fn with_thresholds(mut self, min_title_chars: usize, min_content_chars: usize) -> Self {
        self.min_title_chars = min_title_chars;
        self.min_content_chars = min_content_chars;
        self
    }

    /// Cleans a batch, stamping survivors with the current time.
    #[must_use]
    pub fn clean(&self, candidates: Vec<NewsRecord>) -> CleanOutcome {
        self.clean_at(candidates, timestamp::now())
    }

    /// Cleans a batch, stamping survivors with `processed_at`.
    #[must_use]
    pub fn clean_at(&self, candidates: Vec<NewsRecord>, processed_at: NaiveDateTime) -> CleanOutcome {
        let mut report = CleanReport {
            input: candidates.len(),
            ..CleanReport::default()
        };
        let mut seen = HashSet::with_capacity(candidates.len());
        let mut records = Vec::with_capacity(candidates.len());

        for mut record in candidates {
            // Map keys serialize sorted, so equal records give equal text.
            let canonical = serde_json::to_string(&record).unwrap_or_default();
            if !seen.insert(canonical) {
                report.duplicates += 1;
                continue;
            }

            if is_blank(record.title.as_deref()) || is_blank(record.content.as_deref()) {
                report.missing_fields += 1;
                continue;
            }

            if let Some(raw) = record.publish_time.take() {
                let (value, parsed) = timestamp::normalize_timestamp(&raw);
                if !parsed && !value.is_empty() {
                    report.unparsed_times += 1;
                }
                record.publish_time = (!value.is_empty()).then_some(value);
            }

            let title = TextSanitizer::clean(record.title_str());
            let content = TextSanitizer::clean(record.content_str());
            if title.is_empty() || content.is_empty() {
                report.empty_after_clean += 1;
                continue;
            }

            if TextSanitizer::char_len(&title) <= self.min_title_chars
                || TextSanitizer::char_len(&content) <= self.min_content_chars
            {
                report.too_short += 1;
                continue;
            }

            record.title = Some(title);
            record.content = Some(content);
            records.push(CleanedRecord {
                record,
                processed_at,
            });
        }

        record_clean_metrics(&report, records.len());
        debug!(
            input = report.input,
            kept = records.len(),
            duplicates = report.duplicates,
            missing = report.missing_fields,
            empty = report.empty_after_clean,
            too_short = report.too_short,
            "cleaned batch"
        );

        CleanOutcome { records, report }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn record_clean_metrics(report: &CleanReport, kept: usize) {
    metrics::counter!("records_cleaned_total").increment(kept as u64);
    for (reason, count) in [
        ("duplicate", report.duplicates),
        ("missing_field", report.missing_fields),
        ("empty_after_clean", report.empty_after_clean),
        ("too_short", report.too_short),
    ] {
        if count > 0 {
            metrics::counter!("records_dropped_total", "reason" => reason).increment(count as u64);
        }
    }
}
