//! Mirrors a source package tree into a tree of reStructuredText stubs.
//!
//! Every non-excluded source module gets a page that asks Sphinx to
//! introspect it, and every non-excluded directory that directly holds at
//! least one module gets an `index.rst` referencing its modules and nested
//! packages. The output root always receives a title-only `index.rst`.

use crate::config::MirrorOptions;
use crate::error::Result;
use crate::scanner::{self, is_excluded, is_excluded_path, PackageScanner};
use crate::templates::{index_template, module_template};
use crate::writer::write_to_file;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const INDEX_FILE: &str = "index.rst";
const OUTPUT_EXTENSION: &str = "rst";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    ModulePage,
    PackageIndex,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::ModulePage => write!(f, "module"),
            DocumentKind::PackageIndex => write!(f, "index"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Write,
    /// An existing module page is left alone because overwriting is off.
    KeepExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub qualname: String,
    pub content: String,
    pub action: PlannedAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Cleaned { path: PathBuf },
    Wrote { kind: DocumentKind, path: PathBuf },
    KeptExisting { path: PathBuf },
    SkippedExcluded { path: PathBuf },
    SkippedEmptyPackage { path: PathBuf },
}

/// Receives progress narration from a [`TreeMirrorer`].
pub trait ProgressSink {
    fn record(&mut self, event: MirrorEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn record(&mut self, event: MirrorEvent) {
        match event {
            MirrorEvent::Cleaned { path } => log::info!("Removed {}", path.display()),
            MirrorEvent::Wrote { kind, path } => {
                log::info!("Writing {kind} documentation to {}", path.display())
            }
            MirrorEvent::KeptExisting { path } => {
                log::debug!("{} already exists, skipping it", path.display())
            }
            MirrorEvent::SkippedExcluded { path } => log::debug!("Skipping {}", path.display()),
            MirrorEvent::SkippedEmptyPackage { path } => log::debug!(
                "Skipping {} as it does not contain any modules",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn record(&mut self, _event: MirrorEvent) {}
}

impl ProgressSink for Vec<MirrorEvent> {
    fn record(&mut self, event: MirrorEvent) {
        self.push(event);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub modules_written: usize,
    pub indexes_written: usize,
    pub modules_kept: usize,
}

pub struct TreeMirrorer<S: ProgressSink = LogSink> {
    options: MirrorOptions,
    scanner: PackageScanner,
    sink: S,
}

impl TreeMirrorer<LogSink> {
    pub fn new(options: MirrorOptions) -> Self {
        Self::with_sink(options, LogSink)
    }
}

impl<S: ProgressSink> TreeMirrorer<S> {
    pub fn with_sink(options: MirrorOptions, sink: S) -> Self {
        let scanner = PackageScanner::new(options.source_extension.clone());
        Self {
            options,
            scanner,
            sink,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Cleans (if requested), then writes every planned document.
    pub fn mirror(&mut self) -> Result<MirrorReport> {
        self.options.validate()?;

        if self.options.clean {
            self.clean()?;
        }

        let plan = self.plan(false)?;
        self.apply(plan)
    }

    /// Removes the whole output root. Missing roots are not an error.
    pub fn clean(&mut self) -> Result<()> {
        let output_root = self.options.output_root.clone();
        if output_root.exists() {
            fs_extra::dir::remove(&output_root)?;
            self.sink.record(MirrorEvent::Cleaned { path: output_root });
        }
        Ok(())
    }

    /// Computes every output document without touching the output tree.
    ///
    /// `assume_clean` plans as if the output root had just been removed, so
    /// no existing module page is kept.
    pub fn plan(&mut self, assume_clean: bool) -> Result<Vec<PlannedDocument>> {
        self.options.validate()?;

        let root_name = scanner::root_name(&self.options.source_root)?;
        let source_root = fs::canonicalize(&self.options.source_root)?;
        let mut plan = Vec::new();

        let base_package_name = format!("{}{root_name}", self.options.name_prefix);
        plan.push(self.index_document(
            self.options.output_root.join(INDEX_FILE),
            base_package_name.clone(),
            &[],
        ));

        if is_excluded(&root_name) {
            self.sink.record(MirrorEvent::SkippedExcluded {
                path: self.options.source_root.clone(),
            });
            return Ok(plan);
        }

        let mut walker = WalkDir::new(&source_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let root = entry.path();
            if entry.depth() > 0 && is_excluded_path(root) {
                self.sink.record(MirrorEvent::SkippedExcluded {
                    path: root.to_path_buf(),
                });
                walker.skip_current_dir();
                continue;
            }

            let relative = scanner::relative_path(root, &source_root)?;
            self.plan_directory(&base_package_name, root, &relative, assume_clean, &mut plan)?;
        }

        Ok(plan)
    }

    fn plan_directory(
        &mut self,
        base_package_name: &str,
        root: &Path,
        relative: &Path,
        assume_clean: bool,
        plan: &mut Vec<PlannedDocument>,
    ) -> Result<()> {
        let base_package_qualname = scanner::package_qualname(base_package_name, relative)?;
        let output_dir = self.options.output_root.join(relative);

        let mut subdirs = Vec::new();
        let mut module_files = Vec::new();
        for path in scanner::sorted_entries(root)? {
            if path.is_dir() {
                subdirs.push(path);
            } else if path.is_file() {
                module_files.push(path);
            }
        }

        for dir in subdirs {
            if is_excluded_path(&dir) {
                self.sink.record(MirrorEvent::SkippedExcluded { path: dir });
                continue;
            }
            let dirname = scanner::file_name(&dir)?.to_string();

            let listing = self.scanner.list_package(&dir)?;
            if !listing.has_modules() {
                self.sink.record(MirrorEvent::SkippedEmptyPackage { path: dir });
                continue;
            }

            plan.push(self.index_document(
                output_dir.join(&dirname).join(INDEX_FILE),
                format!("{base_package_qualname}.{dirname}"),
                &listing.doc_references(),
            ));
        }

        for file in module_files {
            let Some(module) = self.scanner.module_name(&file)? else {
                continue;
            };

            let path = output_dir.join(format!("{module}.{OUTPUT_EXTENSION}"));
            let action = if !assume_clean && !self.options.overwrite && path.exists() {
                PlannedAction::KeepExisting
            } else {
                PlannedAction::Write
            };
            let qualname = format!("{base_package_qualname}.{module}");

            plan.push(PlannedDocument {
                content: module_template(&qualname),
                path,
                kind: DocumentKind::ModulePage,
                qualname,
                action,
            });
        }

        Ok(())
    }

    fn index_document(
        &self,
        path: PathBuf,
        qualname: String,
        references: &[String],
    ) -> PlannedDocument {
        PlannedDocument {
            content: index_template(&qualname, references, self.options.root_heading.as_ref()),
            path,
            kind: DocumentKind::PackageIndex,
            qualname,
            action: PlannedAction::Write,
        }
    }

    fn apply(&mut self, plan: Vec<PlannedDocument>) -> Result<MirrorReport> {
        let mut report = MirrorReport::default();

        for document in plan {
            match document.action {
                PlannedAction::KeepExisting => {
                    report.modules_kept += 1;
                    self.sink.record(MirrorEvent::KeptExisting {
                        path: document.path,
                    });
                }
                PlannedAction::Write => {
                    write_to_file(&document.content, &document.path)?;
                    match document.kind {
                        DocumentKind::ModulePage => report.modules_written += 1,
                        DocumentKind::PackageIndex => report.indexes_written += 1,
                    }
                    self.sink.record(MirrorEvent::Wrote {
                        kind: document.kind,
                        path: document.path,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Runs a full mirror with log narration.
pub fn mirror(options: MirrorOptions) -> Result<MirrorReport> {
    TreeMirrorer::new(options).mirror()
}
