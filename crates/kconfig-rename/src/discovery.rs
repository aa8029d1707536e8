//! Source tree discovery.
//!
//! Walks a tree once, sorting files into Kconfig files and files that may
//! reference `CONFIG_` symbols, and finds which symbols a family defines.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// Lines that define a symbol: `config`, `menuconfig` or a named `choice`.
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:config|menuconfig|choice)[ \t]+([A-Za-z0-9_]+)[ \t]*\r?$")
        .expect("definition pattern is valid")
});

/// Files found under a root, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    /// Kconfig files.
    pub kconfig: Vec<PathBuf>,
    /// Files that may hold `CONFIG_` references.
    pub source: Vec<PathBuf>,
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Path of the file.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

impl FileFailure {
    pub(crate) fn from_error(path: &Path, err: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Result of looking up a symbol family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyScan {
    /// Defined family members, sorted.
    pub members: BTreeSet<String>,
    /// Kconfig files that could not be read.
    pub failures: Vec<FileFailure>,
}

/// Walk `root` and classify its files.
///
/// Symlinks are not followed, whether they point at files or directories,
/// so every file is visited once and only files inside the tree are seen.
/// Excluded directory names are skipped. Unreadable sub-directories and
/// entries are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::RootNotFound`] or [`Error::RootNotDirectory`] if `root`
/// is unusable, or [`Error::DirRead`] if the root itself cannot be listed.
pub fn discover(root: &Path, scan: &ScanConfig) -> Result<FileSet> {
    if !root.exists() {
        return Err(Error::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(Error::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }

    let mut files = FileSet::default();
    // The root must be listable, deeper failures only cost that subtree.
    let entries = list_dir(root)?;
    walk_entries(root, entries, scan, &mut files);

    files.kconfig.sort();
    files.source.sort();
    debug!(
        root = %root.display(),
        kconfig = files.kconfig.len(),
        source = files.source.len(),
        "Discovered files"
    );
    Ok(files)
}

fn list_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir).map_err(|source| Error::DirRead {
        path: dir.to_path_buf(),
        source,
    })
}

fn walk(dir: &Path, scan: &ScanConfig, out: &mut FileSet) {
    match list_dir(dir) {
        Ok(entries) => walk_entries(dir, entries, scan, out),
        Err(e) => warn!(error = %e, "Skipping directory"),
    }
}

fn walk_entries(dir: &Path, entries: fs::ReadDir, scan: &ScanConfig, out: &mut FileSet) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Could not read directory entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not stat entry");
                continue;
            }
        };

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if file_name.to_str().is_none() {
            debug!(path = %path.display(), "Name is not valid UTF-8, matching it lossily");
        }

        if file_type.is_symlink() {
            debug!(path = %path.display(), "Not following symlink");
        } else if file_type.is_dir() {
            if !scan.is_excluded_dir(&name) {
                walk(&path, scan, out);
            }
        } else if file_type.is_file() {
            if scan.is_kconfig_file(&name) {
                out.kconfig.push(path);
            } else if scan.is_source_file(&name) {
                out.source.push(path);
            }
        }
    }
}

/// Read a whole file, keeping its path on failure.
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a Kconfig file's bytes.
pub(crate) fn kconfig_text(path: &Path, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| Error::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Names defined in Kconfig text by `config`, `menuconfig` or `choice`.
pub fn defined_symbols(text: &str) -> impl Iterator<Item = &str> {
    DEFINITION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Find every defined member of `symbol`'s family across `kconfig_files`.
#[must_use]
pub fn find_family(symbol: &Symbol, kconfig_files: &[PathBuf], strict: bool) -> FamilyScan {
    find_family_with(symbol, kconfig_files, strict, read_file)
}

/// Like [`find_family`], reading each file through `read`.
pub(crate) fn find_family_with<F>(
    symbol: &Symbol,
    kconfig_files: &[PathBuf],
    strict: bool,
    mut read: F,
) -> FamilyScan
where
    F: FnMut(&Path) -> Result<Vec<u8>>,
{
    let mut scan = FamilyScan::default();

    for path in kconfig_files {
        let text = match read(path).and_then(|bytes| kconfig_text(path, bytes)) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Could not read Kconfig file");
                scan.failures.push(FileFailure::from_error(path, &err));
                continue;
            }
        };

        for name in defined_symbols(&text) {
            if symbol.is_family_member(name, strict) {
                scan.members.insert(name.to_string());
            }
        }
    }

    scan
}
