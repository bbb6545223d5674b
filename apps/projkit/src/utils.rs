//! Supporting helpers: colored message prefixes, path display, logging setup.

use owo_colors::OwoColorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "PROJKIT_LOG";

/// Whether stderr/stdout decorations should use ANSI colors.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if colors_enabled() {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.yellow().bold().to_string())
}

/// Render a path with `/` separators regardless of platform.
pub fn slash_path(p: &Path) -> String {
    p.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path relative to the working directory when possible, for display only.
pub fn rel_to_wd(p: &Path) -> String {
    let shown = std::env::current_dir()
        .ok()
        .filter(|_| p.is_absolute())
        .and_then(|wd| pathdiff::diff_paths(p, wd))
        .unwrap_or_else(|| p.to_path_buf());
    shown.to_string_lossy().to_string()
}

/// Install the stderr `tracing` subscriber. Defaults to `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
