//! Standalone project export.
//!
//! Copies a project tree into a fresh output directory, first into a
//! temporary staging directory and from there to the final location. Both
//! passes drop the same entries at every depth:
//! - hidden entries (name starts with `.`)
//! - `build`, `local.properties`, and `bin`
//!
//! Symlinks are dereferenced: linked files are copied as regular files and
//! linked directories are walked like ordinary ones.

use crate::error::{Error, Result};
use crate::models::ExportResult;
use crate::utils;
use rayon::prelude::*;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Entry names dropped in addition to hidden entries.
pub const EXCLUDED_NAMES: [&str; 3] = ["build", "local.properties", "bin"];

/// Whether an entry with this file name is left out of the export.
pub fn is_excluded(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || EXCLUDED_NAMES.contains(&&*name)
}

#[derive(Debug, Default)]
/// Relative paths collected by one walk of a source tree.
struct Plan {
    /// Parents always precede their children.
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
}

/// Export `project_dir` into `out`.
///
/// `out` must not exist yet. With `dry_run`, nothing is written and the
/// result lists the files that would be copied.
pub fn run_export(project_dir: &Path, out: &Path, dry_run: bool) -> Result<ExportResult> {
    let meta = fs::metadata(project_dir).map_err(|e| Error::copy(project_dir, e))?;
    if !meta.is_dir() {
        return Err(Error::copy(project_dir, io::Error::other("not a directory")));
    }
    if fs::symlink_metadata(out).is_ok() {
        return Err(Error::OutputExists(out.to_path_buf()));
    }

    let first = plan(project_dir)?;
    let mut result = ExportResult {
        source: project_dir.to_string_lossy().to_string(),
        target: out.to_string_lossy().to_string(),
        files: first.files.iter().map(|p| utils::slash_path(p)).collect(),
        excluded: first.excluded.iter().map(|p| utils::slash_path(p)).collect(),
        wrote: false,
    };
    if dry_run {
        debug!(files = result.files.len(), "dry run, nothing written");
        return Ok(result);
    }

    let staging = tempfile::Builder::new().prefix("projkit-export-").tempdir()?;
    let initial = staging.path().join("initial");
    copy_tree(project_dir, &initial, &first)?;

    let second = plan(&initial)?;
    copy_tree(&initial, out, &second)?;
    result.files = second.files.iter().map(|p| utils::slash_path(p)).collect();
    result.wrote = true;
    debug!(
        files = result.files.len(),
        excluded = result.excluded.len(),
        out = %out.display(),
        "export finished"
    );
    Ok(result)
}

fn plan(root: &Path) -> Result<Plan> {
    let mut plan = Plan::default();
    let mut ancestors = vec![canonical(root)?];
    walk(root, Path::new(""), &mut ancestors, &mut plan)?;
    Ok(plan)
}

fn walk(root: &Path, rel: &Path, ancestors: &mut Vec<PathBuf>, plan: &mut Plan) -> Result<()> {
    let dir = root.join(rel);
    let mut entries = fs::read_dir(&dir)
        .and_then(|rd| rd.collect::<io::Result<Vec<_>>>())
        .map_err(|e| Error::copy(&dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let rel_path = rel.join(&name);
        if is_excluded(&name) {
            trace!(path = %rel_path.display(), "excluded");
            plan.excluded.push(rel_path);
            continue;
        }
        let path = entry.path();
        // metadata() follows symlinks; a dangling link fails here
        let meta = fs::metadata(&path).map_err(|e| Error::copy(&path, e))?;
        if meta.is_dir() {
            let real = canonical(&path)?;
            if ancestors.contains(&real) {
                return Err(Error::copy(&path, io::Error::other("symlink cycle")));
            }
            plan.dirs.push(rel_path.clone());
            ancestors.push(real);
            walk(root, &rel_path, ancestors, plan)?;
            ancestors.pop();
        } else if meta.is_file() {
            plan.files.push(rel_path);
        } else {
            // fifos, sockets, and devices would block or fail mid-copy
            return Err(Error::copy(
                &path,
                io::Error::other("not a regular file or directory"),
            ));
        }
    }
    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| Error::copy(path, e))
}

/// Materialize a plan from `src` under `dst`. Directories are created in walk
/// order, then files are copied in parallel.
fn copy_tree(src: &Path, dst: &Path, plan: &Plan) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::copy(dst, e))?;
    for d in &plan.dirs {
        let target = dst.join(d);
        fs::create_dir(&target).map_err(|e| Error::copy(&target, e))?;
    }
    plan.files.par_iter().try_for_each(|f| {
        let from = src.join(f);
        let to = dst.join(f);
        trace!(from = %from.display(), to = %to.display(), "copy");
        fs::copy(&from, &to)
            .map(|_| ())
            .map_err(|e| Error::copy(&from, e))
    })
}
