//! Configuration discovery and effective settings resolution.
//!
//! Projkit reads `projkit.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `coverage.report`: `build/reports/jacoco/jacocoTestReport/jacocoTestReport.xml`
//! - `coverage.prefix`: `com/android/designcompose`
//! - `coverage.threshold`: 50
//! - `coverage.check`: false
//! - `export.out`: `build`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::coverage::{Filter, DEFAULT_PREFIX, DEFAULT_THRESHOLD};
use crate::error::{Error, Result};
use crate::report::DEFAULT_REPORT_PATH;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_EXPORT_OUT: &str = "build";

const CONFIG_NAMES: [&str; 3] = ["projkit.toml", "projkit.yaml", "projkit.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `projkit.toml|yaml`.
#[serde(deny_unknown_fields)]
pub struct ProjkitConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub coverage: Option<CoverageCfg>,
    #[serde(default)]
    pub export: Option<ExportCfg>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Coverage section under `[coverage]`.
#[serde(deny_unknown_fields)]
pub struct CoverageCfg {
    pub report: Option<String>,
    pub prefix: Option<String>,
    pub threshold: Option<f64>,
    pub check: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Export section under `[export]`.
#[serde(deny_unknown_fields)]
pub struct ExportCfg {
    pub out: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "unknown output mode `{other}` (expected human|json)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved settings for `projkit coverage`.
pub struct CoverageEffective {
    pub repo_root: PathBuf,
    pub report: PathBuf,
    pub filter: Filter,
    pub output: OutputMode,
    pub check: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved settings for `projkit export`.
pub struct ExportEffective {
    pub out: PathBuf,
    pub output: OutputMode,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `projkit.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => return start.to_path_buf(),
        }
    }
}

/// Load `ProjkitConfig` from `projkit.toml` or `projkit.yaml|yml` if present.
///
/// A file that exists but does not parse is an error.
pub fn load_config(root: &Path) -> Result<Option<ProjkitConfig>> {
    let toml_path = root.join("projkit.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path)?;
        let cfg: ProjkitConfig = toml::from_str(&s)
            .map_err(|e| Error::Config(format!("{}: {e}", toml_path.display())))?;
        debug!(path = %toml_path.display(), "loaded config");
        return Ok(Some(cfg));
    }
    for yml in ["projkit.yaml", "projkit.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p)?;
            let cfg: ProjkitConfig = serde_yaml::from_str(&s)
                .map_err(|e| Error::Config(format!("{}: {e}", p.display())))?;
            debug!(path = %p.display(), "loaded config");
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

/// Resolve coverage settings from CLI flags, discovered config, and defaults.
///
/// A relative `report` from the config file is taken relative to the
/// repository root; a CLI path is used as given.
pub fn resolve_coverage(
    cli_repo_root: Option<&str>,
    cli_report: Option<&str>,
    cli_prefix: Option<&str>,
    cli_threshold: Option<f64>,
    cli_output: Option<&str>,
    cli_check: Option<bool>,
) -> Result<CoverageEffective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let cov = cfg.coverage.unwrap_or_default();

    let report = match (cli_report, cov.report) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => repo_root.join(p),
        (None, None) if cli_repo_root.is_some() => repo_root.join(DEFAULT_REPORT_PATH),
        (None, None) => PathBuf::from(DEFAULT_REPORT_PATH),
    };

    let prefix = cli_prefix
        .map(str::to_string)
        .or(cov.prefix)
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    let threshold = validate_threshold(cli_threshold.or(cov.threshold).unwrap_or(DEFAULT_THRESHOLD))?;
    let output = OutputMode::parse(cli_output.or(cfg.output.as_deref()).unwrap_or("human"))?;
    let check = cli_check.or(cov.check).unwrap_or(false);

    Ok(CoverageEffective {
        repo_root,
        report,
        filter: Filter { prefix, threshold },
        output,
        check,
    })
}

/// Resolve export settings. Config is looked up from the working directory.
pub fn resolve_export(cli_out: Option<&str>, cli_output: Option<&str>) -> Result<ExportEffective> {
    let repo_root = detect_repo_root(Path::new("."));
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let out = cli_out
        .map(PathBuf::from)
        .or_else(|| cfg.export.and_then(|e| e.out).map(|o| repo_root.join(o)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_OUT));
    let output = OutputMode::parse(cli_output.or(cfg.output.as_deref()).unwrap_or("human"))?;
    Ok(ExportEffective { out, output })
}

pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::Config(format!(
            "threshold must be between 0 and 100, got {threshold}"
        )))
    }
}
