//! Rename orchestration.
//!
//! [`Renamer`] ties discovery, family lookup and the rewriters together and
//! records what happened in serializable reports. Failures on individual
//! files are logged and recorded; they never abort a pass.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::discovery::{self, FileFailure, FileSet};
use crate::error::{Error, Result};
use crate::mapping::{MappingFile, MappingIssue};
use crate::rewrite::{KconfigRewriter, SourceRewriter};
use crate::symbol::{Symbol, SymbolMap};

/// Kind of file a change was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A Kconfig file.
    Kconfig,
    /// A file with `CONFIG_` references.
    Source,
}

/// A file that was (or, in a dry run, would be) rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Path of the file.
    pub path: PathBuf,
    /// What kind of file it is.
    pub kind: FileKind,
    /// Number of references replaced.
    pub replacements: usize,
}

/// Outcome of renaming one symbol family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    /// The symbol that was renamed.
    pub old: Symbol,
    /// Its replacement.
    pub new: Symbol,
    /// Whether files were left untouched.
    pub dry_run: bool,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Every rename applied, sub-symbols included.
    pub mappings: SymbolMap,
    /// Number of Kconfig files examined.
    pub kconfig_files_scanned: usize,
    /// Number of source files examined.
    pub source_files_scanned: usize,
    /// Files that changed.
    pub changed: Vec<FileChange>,
    /// Files that could not be read or written.
    pub failures: Vec<FileFailure>,
}

impl RenameReport {
    fn new(old: Symbol, new: Symbol, dry_run: bool) -> Self {
        Self {
            old,
            new,
            dry_run,
            started_at: Utc::now(),
            mappings: SymbolMap::new(),
            kconfig_files_scanned: 0,
            source_files_scanned: 0,
            changed: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Number of changed files of the given kind.
    #[must_use]
    pub fn changed_count(&self, kind: FileKind) -> usize {
        self.changed.iter().filter(|c| c.kind == kind).count()
    }

    /// Total references replaced.
    #[must_use]
    pub fn total_replacements(&self) -> usize {
        self.changed.iter().map(|c| c.replacements).sum()
    }
}

/// Outcome of looking up a symbol family without changing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// The symbol looked up.
    pub symbol: Symbol,
    /// Defined family members.
    pub members: Vec<String>,
    /// Number of Kconfig files examined.
    pub kconfig_files_scanned: usize,
    /// Number of source files that would be examined by a rename.
    pub source_files_scanned: usize,
    /// Kconfig files that could not be read.
    pub failures: Vec<FileFailure>,
}

/// A mapping file entry that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    /// 1-based line number in the mapping file.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

/// Outcome of applying a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// The mapping file.
    pub mapping_file: PathBuf,
    /// One report per applied entry, in file order.
    pub renames: Vec<RenameReport>,
    /// Lines skipped while parsing.
    pub issues: Vec<MappingIssue>,
    /// Entries whose rename failed.
    pub errors: Vec<EntryFailure>,
}

/// File contents as a rename pass sees them.
///
/// A dry run stages rewritten files here instead of writing them, so later
/// entries of a batch see the renames of earlier ones. Real runs never
/// stage anything and always read from disk.
#[derive(Debug, Default)]
struct Staged {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl Staged {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.files.get(path) {
            Some(bytes) => Ok(bytes.clone()),
            None => discovery::read_file(path),
        }
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        discovery::kconfig_text(path, self.read(path)?)
    }
}

/// Renames Kconfig symbols across a source tree.
#[derive(Debug, Clone)]
pub struct Renamer {
    config: Config,
    dry_run: bool,
}

impl Renamer {
    /// Create a renamer with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Only report what would change.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Look up a symbol family without rewriting anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is invalid or the root is unusable.
    pub fn scan(&self, symbol: &str, root: &Path) -> Result<ScanReport> {
        let symbol = Symbol::parse(symbol)?;
        let files = discovery::discover(root, &self.config.scan)?;
        let family =
            discovery::find_family(&symbol, &files.kconfig, self.config.scan.strict_subsymbols);

        Ok(ScanReport {
            symbol,
            members: family.members.into_iter().collect(),
            kconfig_files_scanned: files.kconfig.len(),
            source_files_scanned: files.source.len(),
            failures: family.failures,
        })
    }

    /// Rename `old` and all its sub-symbols to use the `new` prefix.
    ///
    /// Finding nothing to rename is not an error: a warning is logged and
    /// the returned report has no mappings.
    ///
    /// # Errors
    ///
    /// Returns an error if either symbol is invalid or the root is unusable.
    pub fn rename_symbol(&self, old: &str, new: &str, root: &Path) -> Result<RenameReport> {
        self.rename_staged(old, new, root, &mut Staged::default())
    }

    fn rename_staged(
        &self,
        old: &str,
        new: &str,
        root: &Path,
        staged: &mut Staged,
    ) -> Result<RenameReport> {
        let old = Symbol::parse(old)?;
        let new = Symbol::parse(new)?;
        info!(%old, %new, dry_run = self.dry_run, "Renaming symbol");

        let mut files = discovery::discover(root, &self.config.scan)?;
        let mut report = RenameReport::new(old, new, self.dry_run);
        report.kconfig_files_scanned = files.kconfig.len();
        report.source_files_scanned = files.source.len();

        debug!(symbol = %report.old, "Finding sub-symbols");
        let family = discovery::find_family_with(
            &report.old,
            &files.kconfig,
            self.config.scan.strict_subsymbols,
            |path| staged.read(path),
        );
        // Unreadable Kconfig files are reported once, here.
        files
            .kconfig
            .retain(|path| !family.failures.iter().any(|f| &f.path == path));
        report.failures.extend(family.failures);
        report.mappings = SymbolMap::derive(
            &report.old,
            &report.new,
            &family.members,
            self.config.scan.strict_subsymbols,
        );

        if report.mappings.is_empty() {
            warn!(symbol = %report.old, "No symbols found to rename");
            return Ok(report);
        }

        info!(count = report.mappings.len(), "Found symbols to rename");
        for (from, to) in report.mappings.iter() {
            info!("  {from} -> {to}");
        }

        self.apply(&files, &mut report, staged);

        info!(
            kconfig = report.changed_count(FileKind::Kconfig),
            source = report.changed_count(FileKind::Source),
            replacements = report.total_replacements(),
            failures = report.failures.len(),
            "Symbol renaming complete"
        );
        Ok(report)
    }

    /// Apply every entry of a mapping file, in order.
    ///
    /// Malformed lines and entries that fail are recorded in the report;
    /// the remaining entries still run.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping file cannot be read.
    pub fn rename_from_mapping_file(&self, mapping_file: &Path, root: &Path) -> Result<BatchReport> {
        let mappings = MappingFile::load(mapping_file)?;
        info!(
            path = %mapping_file.display(),
            entries = mappings.entries.len(),
            skipped = mappings.issues.len(),
            "Loaded mapping file"
        );

        let mut batch = BatchReport {
            mapping_file: mapping_file.to_path_buf(),
            renames: Vec::with_capacity(mappings.entries.len()),
            issues: mappings.issues,
            errors: Vec::new(),
        };

        let mut staged = Staged::default();
        for entry in &mappings.entries {
            info!(line = entry.line, old = %entry.old, new = %entry.new, "Processing mapping");
            match self.rename_staged(entry.old.as_str(), entry.new.as_str(), root, &mut staged) {
                Ok(report) => batch.renames.push(report),
                Err(e) => {
                    error!(line = entry.line, error = %e, "Mapping failed");
                    batch.errors.push(EntryFailure {
                        line: entry.line,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(batch)
    }

    fn apply(&self, files: &FileSet, report: &mut RenameReport, staged: &mut Staged) {
        let kconfig = KconfigRewriter::new(&report.mappings);
        let mut changes = Vec::new();
        let mut failures = Vec::new();

        for path in &files.kconfig {
            let outcome = staged.read_text(path).and_then(|text| {
                let rewritten = kconfig.rewrite(&text);
                if rewritten.is_changed() {
                    self.persist(path, rewritten.content.into_bytes(), staged)?;
                }
                Ok(rewritten.replacements)
            });
            record(path, FileKind::Kconfig, outcome, &mut changes, &mut failures);
        }

        let source = SourceRewriter::new(&report.mappings);
        for path in &files.source {
            let outcome = staged.read(path).and_then(|bytes| match source.rewrite(&bytes) {
                Some(rewritten) => {
                    self.persist(path, rewritten.content, staged)?;
                    Ok(rewritten.replacements)
                }
                None => Ok(0),
            });
            record(path, FileKind::Source, outcome, &mut changes, &mut failures);
        }

        report.changed.extend(changes);
        report.failures.extend(failures);
    }

    fn persist(&self, path: &Path, content: Vec<u8>, staged: &mut Staged) -> Result<()> {
        if self.dry_run {
            debug!(path = %path.display(), "Dry run, staging instead of writing");
            staged.files.insert(path.to_path_buf(), content);
            return Ok(());
        }
        fs::write(path, content).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn record(
    path: &Path,
    kind: FileKind,
    outcome: Result<usize>,
    changes: &mut Vec<FileChange>,
    failures: &mut Vec<FileFailure>,
) {
    match outcome {
        Ok(0) => {}
        Ok(replacements) => {
            info!(path = %path.display(), replacements, "Updated file");
            changes.push(FileChange {
                path: path.to_path_buf(),
                kind,
                replacements,
            });
        }
        Err(e) => {
            error!(error = %e, "Could not update file");
            failures.push(FileFailure::from_error(path, &e));
        }
    }
}
