//! End-to-end runs over one Odoo module: catalog in, source tree out.

use crate::propagate::{PropagationReport, Replacer};
use crate::rewrite::{CatalogRewriter, Mutation, MutationKind};
use crate::scan::ScanOptions;
use crate::util::with_suffix;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use viloc_catalog::{read_catalog, Catalog};
use viloc_core::{ReplacementJob, Result, VilocError};
use viloc_lang::LanguageClassifier;
use viloc_translate::{TranslationBackend, Translator};

#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub catalog: PathBuf,
    pub scan: ScanOptions,
    /// Copy the catalog to `<catalog><backup_suffix>` before writing it.
    pub backup: bool,
    pub propagate: bool,
    pub dry_run: bool,
    pub delay: Duration,
}

impl FormatOptions {
    pub fn for_catalog(catalog: PathBuf) -> Self {
        Self {
            catalog,
            scan: ScanOptions::default(),
            backup: false,
            propagate: true,
            dry_run: false,
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatSummary {
    pub catalog: PathBuf,
    pub entries: usize,
    pub swapped: usize,
    pub filled: usize,
    pub failed: usize,
    pub backup: Option<PathBuf>,
    pub written: bool,
    pub files_rewritten: usize,
    pub mutations: Vec<Mutation>,
    pub propagation: Vec<PropagationReport>,
}

#[derive(Debug, Clone)]
pub struct ReplaceOptions {
    pub catalog: PathBuf,
    pub skip_header_lines: usize,
    pub scan: ScanOptions,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaceSummary {
    pub catalog: PathBuf,
    pub entries: usize,
    pub jobs: usize,
    pub files_rewritten: usize,
    pub propagation: Vec<PropagationReport>,
}

fn ensure_catalog(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(VilocError::CatalogMissing(path.display().to_string()).into());
    }
    Ok(())
}

/// Propagate jobs in order over one shared candidate list.
fn propagate_jobs(
    module: &Path,
    scan: &ScanOptions,
    dry_run: bool,
    jobs: &[ReplacementJob],
) -> Vec<PropagationReport> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let replacer = Replacer::new(module, scan.clone()).dry_run(dry_run);
    let files = replacer.candidates();
    let total = jobs.len();
    jobs.iter()
        .enumerate()
        .map(|(i, job)| {
            tracing::info!(
                event = "propagate",
                step = %format!("[{}/{}]", i + 1, total),
                old = %job.old_text,
                new = %job.new_text
            );
            replacer.propagate_in(&files, job)
        })
        .collect()
}

fn rewritten_files(reports: &[PropagationReport]) -> usize {
    let mut files: Vec<&PathBuf> = reports.iter().flat_map(|r| r.rewritten.iter()).collect();
    files.sort();
    files.dedup();
    files.len()
}

/// Reconcile the catalog of `module`, save it and push every swapped msgid
/// through the module's source files.
pub fn run_format<C, B>(
    module: &Path,
    opts: &FormatOptions,
    classifier: &C,
    translator: &Translator<B>,
) -> Result<FormatSummary>
where
    C: LanguageClassifier + ?Sized,
    B: TranslationBackend,
{
    ensure_catalog(&opts.catalog)?;
    let mut catalog = Catalog::load(&opts.catalog)?;
    tracing::info!(
        event = "format_start",
        catalog = %opts.catalog.display(),
        entries = catalog.len(),
        dry_run = opts.dry_run
    );

    let outcome = CatalogRewriter::new(classifier, translator)
        .with_delay(opts.delay)
        .reconcile(catalog.entries_mut());

    let mut backup = None;
    let mut written = false;
    if !opts.dry_run && catalog.modified_count() > 0 {
        if opts.backup {
            let path = with_suffix(&opts.catalog, &opts.scan.backup_suffix);
            std::fs::copy(&opts.catalog, &path)?;
            tracing::info!(event = "backup", path = %path.display());
            backup = Some(path);
        }
        catalog.save(&opts.catalog)?;
        written = true;
    }

    let propagation = if opts.propagate {
        let scan = opts.scan.clone().excluding(&opts.catalog);
        propagate_jobs(module, &scan, opts.dry_run, &outcome.jobs())
    } else {
        Vec::new()
    };

    let summary = FormatSummary {
        catalog: opts.catalog.clone(),
        entries: outcome.entries,
        swapped: outcome.count(MutationKind::Swapped),
        filled: outcome.count(MutationKind::Filled),
        failed: outcome.failed,
        backup,
        written,
        files_rewritten: rewritten_files(&propagation),
        mutations: outcome.mutations,
        propagation,
    };
    tracing::info!(
        event = "format_done",
        swapped = summary.swapped,
        filled = summary.filled,
        failed = summary.failed,
        files = summary.files_rewritten
    );
    Ok(summary)
}

/// Apply every translated catalog entry back to the source files: each
/// `msgstr` found in the tree is replaced by its `msgid`.
pub fn run_replace(module: &Path, opts: &ReplaceOptions) -> Result<ReplaceSummary> {
    ensure_catalog(&opts.catalog)?;
    let entries = read_catalog(&opts.catalog, opts.skip_header_lines)?;
    let jobs: Vec<ReplacementJob> = entries
        .iter()
        .map(|e| ReplacementJob::new(&e.target_text, &e.source_text))
        .filter(|j| !j.is_noop())
        .collect();
    tracing::info!(
        event = "replace_start",
        catalog = %opts.catalog.display(),
        entries = entries.len(),
        jobs = jobs.len(),
        dry_run = opts.dry_run
    );

    let scan = opts.scan.clone().excluding(&opts.catalog);
    let propagation = propagate_jobs(module, &scan, opts.dry_run, &jobs);
    Ok(ReplaceSummary {
        catalog: opts.catalog.clone(),
        entries: entries.len(),
        jobs: jobs.len(),
        files_rewritten: rewritten_files(&propagation),
        propagation,
    })
}
