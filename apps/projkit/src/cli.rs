//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "projkit",
    version,
    about = "Project maintenance helpers: coverage gaps and standalone exports",
    long_about = "projkit — list under-covered source files from a JaCoCo XML report, and export a project directory without build artifacts or local files.\n\nConfiguration precedence: CLI > projkit.toml > defaults.",
    after_help = "Examples:\n  projkit coverage\n  projkit coverage --report app/build/reports/jacoco.xml --threshold 80\n  projkit export reference-apps/standalone-projects/tutorial -o build/tutorial",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current projkit version.")]
    Version,
    /// Report classes below a line-coverage threshold
    #[command(
        about = "List under-covered files",
        long_about = "Read a JaCoCo XML report and print `<package>/<file>: <pct>%` for every class in a matching package whose line coverage is strictly below the threshold.",
        after_help = "Examples:\n  projkit coverage\n  projkit coverage --prefix com/example --threshold 75 --check\n  projkit coverage --output json"
    )]
    Coverage {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(
            long,
            help = "Path to the JaCoCo XML report (default: build/reports/jacoco/jacocoTestReport/jacocoTestReport.xml)"
        )]
        report: Option<String>,
        #[arg(long, help = "Package name prefix to include (default: com/android/designcompose)")]
        prefix: Option<String>,
        #[arg(long, help = "Percentage threshold; classes strictly below are listed (default: 50)")]
        threshold: Option<f64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero when any class is below the threshold")]
        check: bool,
    },
    /// Export a standalone project
    #[command(
        about = "Export a project tree",
        long_about = "Copy a project directory into a new output directory through a temporary staging copy. Symlinks are dereferenced; hidden entries, `build`, `bin` and `local.properties` are dropped at every depth.",
        after_help = "Examples:\n  projkit export my-project\n  projkit export my-project -o dist/my-project --dry-run"
    )]
    Export {
        #[arg(help = "Project directory to export")]
        project_dir: PathBuf,
        #[arg(short, long, help = "Output directory; must not exist (default: build)")]
        out: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "List files that would be copied without writing")]
        dry_run: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
