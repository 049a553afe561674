use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};
use tempfile::TempDir;
use tracing::debug;

use crate::result::{bail, Result};

/// Names of the entries of a directory
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = dir
        .read_dir()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not read directory {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.into_diagnostic()?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Move a file, copying it when a simple rename is not possible
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_err() {
        debug!("Moving file failed, falling back to copying");
        std::fs::copy(from, to)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not move {} to {}", from.display(), to.display()))?;
        std::fs::remove_file(from).into_diagnostic()?;
    }
    Ok(())
}

/// Find a path in `dir` that does not exist yet for the file `stem.ext`.
///
/// Format for 1st file: `<stem>.<ext>`,
/// for 2nd file and up: `<stem> (<count>).<ext>`.
pub fn find_unused_name(dir: &Path, stem: &str, ext: &str) -> Result<PathBuf> {
    let mut output = dir.join(format!("{stem}.{ext}"));
    if !output.exists() {
        return Ok(output);
    }

    for n in 2u16.. {
        output.set_file_name(format!("{stem} ({n}).{ext}"));
        if !output.exists() {
            return Ok(output);
        }
    }

    bail("Code is broken or you have really REALLY too much files with the same name")
}

/// Create a scratch directory inside `dir`, removed when the handle is dropped
pub fn scratch_dir(dir: &Path, prefix: &str) -> Result<TempDir> {
    Ok(tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(dir)
        .into_diagnostic()
        .wrap_err("Could not create the scratch directory")?)
}

/// The paths that are still on disk
pub fn existing(paths: &[&Path]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| p.exists())
        .map(|p| p.to_path_buf())
        .collect()
}
