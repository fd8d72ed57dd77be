//! End-of-run accounting.

use super::unit::UnitOutcome;

/// One conversion that failed, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    /// Downloaded file the transcoder was given.
    pub file: String,
    /// Full error text, including the transcoder's captured stderr.
    pub error: String,
}

/// Counters and failure details reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Link matches on the page, duplicates included.
    pub links_found: usize,
    /// Links left after deduplication.
    pub unique_links: usize,
    /// Completed downloads.
    pub downloaded: usize,
    /// Successful conversions.
    pub converted: usize,
    /// Conversions that failed without stopping the run.
    pub failures: Vec<ConversionFailure>,
}

impl PipelineSummary {
    pub fn from_outcomes(
        links_found: usize,
        unique_links: usize,
        outcomes: &[UnitOutcome],
    ) -> Self {
        let mut failures = Vec::new();
        for outcome in outcomes {
            if let Err(err) = &outcome.convert.result {
                failures.push(ConversionFailure {
                    file: outcome.download.file_name.clone(),
                    error: err.to_string(),
                });
            }
        }
        Self {
            links_found,
            unique_links,
            downloaded: outcomes.len(),
            converted: outcomes.len() - failures.len(),
            failures,
        }
    }

    pub fn failed_conversions(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
