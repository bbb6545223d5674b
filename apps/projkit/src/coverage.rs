//! Coverage threshold reporting.
//!
//! Scans packages from a report, keeps those whose name starts with the
//! configured prefix, and collects every class whose LINE coverage is
//! strictly below the threshold. Findings keep document order.

use crate::error::Result;
use crate::models::report::Package;
use crate::models::{CoverageSummary, Finding};
use crate::report;
use std::path::Path;
use tracing::{debug, trace};

pub const DEFAULT_PREFIX: &str = "com/android/designcompose";
pub const DEFAULT_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
/// Package prefix and percentage threshold applied during a scan.
pub struct Filter {
    pub prefix: String,
    pub threshold: f64,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Line coverage in percent, or `None` when the class has no lines.
pub fn line_coverage(missed: u64, covered: u64) -> Option<f64> {
    // summed as floats so counters near u64::MAX cannot overflow
    let total = missed as f64 + covered as f64;
    if total == 0.0 {
        return None;
    }
    Some(covered as f64 / total * 100.0)
}

/// Strict comparison: a class exactly at the threshold is not reported.
pub fn is_below(percentage: f64, threshold: f64) -> bool {
    percentage < threshold
}

/// Scan a package sequence and collect findings.
///
/// The whole sequence is consumed before returning, so callers never print
/// a partial list when the document turns out to be malformed.
pub fn scan<I>(packages: I, filter: &Filter) -> Result<(Vec<Finding>, CoverageSummary)>
where
    I: IntoIterator<Item = Result<Package>>,
{
    let mut findings = Vec::new();
    let mut summary = CoverageSummary {
        prefix: filter.prefix.clone(),
        threshold: filter.threshold,
        ..CoverageSummary::default()
    };
    for package in packages {
        let package = package?;
        if !package.name.starts_with(&filter.prefix) {
            trace!(package = %package.name, "prefix mismatch, skipped");
            continue;
        }
        summary.packages += 1;
        for class in &package.classes {
            let Some(counter) = class.line_counter else {
                continue;
            };
            let Some(percentage) = line_coverage(counter.missed, counter.covered) else {
                continue;
            };
            summary.classes += 1;
            if is_below(percentage, filter.threshold) {
                findings.push(Finding {
                    package: package.name.clone(),
                    source_file: class.display_file().to_string(),
                    class: class.name.clone(),
                    percentage,
                    missed: counter.missed,
                    covered: counter.covered,
                });
            }
        }
    }
    summary.below = findings.len();
    debug!(
        packages = summary.packages,
        classes = summary.classes,
        below = summary.below,
        "coverage scan finished"
    );
    Ok((findings, summary))
}

/// Open the report at `path` and scan it.
pub fn run_coverage(path: &Path, filter: &Filter) -> Result<(Vec<Finding>, CoverageSummary)> {
    scan(report::open(path)?, filter)
}
