//! Output rendering for the coverage and export commands.
//!
//! Supports `human` (default) and `json` outputs. Human coverage output keeps
//! stdout to exactly one line per finding; the summary goes to stderr. The
//! JSON form includes per-item fields and a top-level summary.

use crate::config::OutputMode;
use crate::models::{CoverageSummary, ExportResult, Finding};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::io::{self, Write};

/// Print coverage findings in the requested format.
pub fn print_coverage(
    findings: &[Finding],
    summary: &CoverageSummary,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let body = serde_json::to_string_pretty(&compose_coverage_json(findings, summary))?;
            writeln!(out, "{body}")?;
        }
        OutputMode::Human => {
            write_coverage_lines(&mut out, findings)?;
            let line = summary_line(summary);
            if utils::colors_enabled() {
                let line = if summary.below > 0 {
                    line.yellow().bold().to_string()
                } else {
                    line.green().bold().to_string()
                };
                eprintln!("{line}");
            } else {
                eprintln!("{line}");
            }
        }
    }
    out.flush()
}

/// One `<package>/<file>: <pct>%` line per finding.
pub fn write_coverage_lines<W: Write>(w: &mut W, findings: &[Finding]) -> io::Result<()> {
    for f in findings {
        writeln!(w, "{f}")?;
    }
    Ok(())
}

fn summary_line(summary: &CoverageSummary) -> String {
    format!(
        "— Summary — below={} classes={} packages={} threshold={}% prefix={}",
        summary.below, summary.classes, summary.packages, summary.threshold, summary.prefix
    )
}

/// Print an export result. Dry runs list every planned file.
pub fn print_export(res: &ExportResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let body = serde_json::to_string_pretty(&compose_export_json(res))?;
            writeln!(out, "{body}")?;
        }
        OutputMode::Human => {
            let color = utils::colors_enabled();
            if !res.wrote {
                for f in &res.files {
                    writeln!(out, "would copy: {f}")?;
                }
            }
            let verb = if res.wrote { "exported:" } else { "planned:" };
            let verb = if color {
                verb.green().bold().to_string()
            } else {
                verb.to_string()
            };
            writeln!(
                out,
                "{} {} files -> {} ({} excluded)",
                verb,
                res.files.len(),
                res.target,
                res.excluded.len()
            )?;
        }
    }
    out.flush()
}

/// Compose coverage JSON object (pure) for testing/snapshot purposes.
pub fn compose_coverage_json(findings: &[Finding], summary: &CoverageSummary) -> JsonVal {
    let items: Vec<_> = findings
        .iter()
        .map(|f| {
            json!({
                "file": format!("{}/{}", f.package, f.source_file),
                "package": f.package,
                "class": f.class,
                "percentage": two_decimals(f.percentage),
                "missed": f.missed,
                "covered": f.covered,
            })
        })
        .collect();
    json!({"results": items, "summary": summary})
}

/// Round the way the human `{:.2}` line does, so both outputs agree on ties.
fn two_decimals(p: f64) -> f64 {
    format!("{p:.2}").parse().unwrap_or(p)
}

/// Compose export JSON object (pure) for testing/snapshot purposes.
pub fn compose_export_json(res: &ExportResult) -> JsonVal {
    json!({
        "source": res.source,
        "target": res.target,
        "wrote": res.wrote,
        "files": res.files,
        "excluded": res.excluded,
        "summary": {
            "files": res.files.len(),
            "excluded": res.excluded.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(package: &str, file: &str, percentage: f64) -> Finding {
        Finding {
            package: package.into(),
            source_file: file.into(),
            class: format!("{package}/{}", file.trim_end_matches(".kt")),
            percentage,
            missed: 3,
            covered: 1,
        }
    }

    #[test]
    fn test_write_coverage_lines_exact_format() {
        let findings = vec![
            finding("com/android/designcompose/foo", "Bar.kt", 37.5),
            finding("com/android/designcompose/x", "File.kt", 45.0),
        ];
        let mut buf = Vec::new();
        write_coverage_lines(&mut buf, &findings).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "com/android/designcompose/foo/Bar.kt: 37.50%\ncom/android/designcompose/x/File.kt: 45.00%\n"
        );
    }

    #[test]
    fn test_write_coverage_lines_empty() {
        let mut buf = Vec::new();
        write_coverage_lines(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_compose_coverage_json_shape() {
        let findings = vec![finding("com/android/designcompose/x", "File.kt", 100.0 / 3.0)];
        let summary = CoverageSummary {
            prefix: "com/android/designcompose".into(),
            threshold: 50.0,
            packages: 1,
            classes: 4,
            below: 1,
        };
        let out = compose_coverage_json(&findings, &summary);
        assert_eq!(out["summary"]["below"], 1);
        assert_eq!(out["summary"]["classes"], 4);
        assert_eq!(out["results"][0]["file"], "com/android/designcompose/x/File.kt");
        assert_eq!(out["results"][0]["percentage"], 33.33);
    }

    #[test]
    fn test_json_percentage_matches_human_line_on_ties() {
        let f = finding("com/android/designcompose/x", "Tie.kt", 0.125);
        let out = compose_coverage_json(std::slice::from_ref(&f), &CoverageSummary::default());
        let shown = f.to_string();
        let pct = out["results"][0]["percentage"].as_f64().unwrap();
        assert_eq!(shown, format!("com/android/designcompose/x/Tie.kt: {pct:.2}%"));
        assert_eq!(pct, 0.12);
    }

    #[test]
    fn test_compose_export_json_shape() {
        let res = ExportResult {
            source: "proj".into(),
            target: "build".into(),
            files: vec!["src/Main.kt".into()],
            excluded: vec![".git".into(), "bin".into()],
            wrote: true,
        };
        let out = compose_export_json(&res);
        assert_eq!(out["summary"]["files"], 1);
        assert_eq!(out["summary"]["excluded"], 2);
        assert_eq!(out["files"][0], "src/Main.kt");
        assert_eq!(out["wrote"], true);
    }
}
