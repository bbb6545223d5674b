//! Shared data models for coverage findings and export results.

pub mod report;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A class whose line coverage fell below the threshold.
pub struct Finding {
    pub package: String,
    pub source_file: String,
    pub class: String,
    pub percentage: f64,
    pub missed: u64,
    pub covered: u64,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}: {:.2}%",
            self.package, self.source_file, self.percentage
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Aggregated coverage scan summary used by printers.
pub struct CoverageSummary {
    pub prefix: String,
    pub threshold: f64,
    /// Packages matching the prefix.
    pub packages: usize,
    /// Classes in matching packages with a defined percentage.
    pub classes: usize,
    pub below: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Outcome of a project export.
pub struct ExportResult {
    pub source: String,
    pub target: String,
    /// Files copied (or planned, on dry runs), relative to the project root.
    pub files: Vec<String>,
    /// Entries dropped by the exclusion rules, relative to the project root.
    pub excluded: Vec<String>,
    pub wrote: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(percentage: f64) -> Finding {
        Finding {
            package: "com/android/designcompose/x".into(),
            source_file: "File.kt".into(),
            class: "com/android/designcompose/x/File".into(),
            percentage,
            missed: 0,
            covered: 0,
        }
    }

    #[test]
    fn test_display_always_two_decimals() {
        assert_eq!(
            finding(45.0).to_string(),
            "com/android/designcompose/x/File.kt: 45.00%"
        );
        assert_eq!(
            finding(100.0 / 3.0).to_string(),
            "com/android/designcompose/x/File.kt: 33.33%"
        );
        assert_eq!(
            finding(0.0).to_string(),
            "com/android/designcompose/x/File.kt: 0.00%"
        );
    }
}
