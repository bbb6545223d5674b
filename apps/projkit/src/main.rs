//! Projkit CLI binary entry point.
//! Delegates to library modules for coverage/export and prints results.

use clap::Parser;
use projkit::cli::{Cli, Commands};
use projkit::error::{Error, Result};
use projkit::{config, coverage, export, output, utils};
use tracing::debug;

fn main() {
    utils::init_logging();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            if matches!(e, Error::ReportNotFound { .. }) {
                eprintln!(
                    "{} generate the report first (e.g. `./gradlew jacocoTestReport`) or pass --report",
                    utils::note_prefix()
                );
            }
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Coverage {
            repo_root,
            report,
            prefix,
            threshold,
            output,
            check,
        } => {
            let eff = config::resolve_coverage(
                repo_root.as_deref(),
                report.as_deref(),
                prefix.as_deref(),
                threshold,
                output.as_deref(),
                if check { Some(true) } else { None },
            )?;
            debug!(report = %utils::rel_to_wd(&eff.report), "resolved coverage settings");
            let (findings, summary) = coverage::run_coverage(&eff.report, &eff.filter)?;
            output::print_coverage(&findings, &summary, eff.output)?;
            // In check mode, exit non-zero when anything is under-covered
            if eff.check && !findings.is_empty() {
                return Ok(1);
            }
            Ok(0)
        }
        Commands::Export {
            project_dir,
            out,
            dry_run,
            output,
        } => {
            let eff = config::resolve_export(out.as_deref(), output.as_deref())?;
            debug!(out = %utils::rel_to_wd(&eff.out), "resolved export settings");
            let res = export::run_export(&project_dir, &eff.out, dry_run)?;
            output::print_export(&res, eff.output)?;
            Ok(0)
        }
    }
}
