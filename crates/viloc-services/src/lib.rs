//! Orchestration layer used by the `viloc` binary.
//! Keeps the CLI free of walking, regex and catalog details.

pub mod mark;
pub mod pipeline;
pub mod propagate;
pub mod rewrite;
pub mod scan;
pub mod util;

pub use mark::{
    ensure_odoo_import, mark_markup_file, mark_name_fields, mark_tree, mark_validation_errors,
    MarkPass, MarkSummary,
};
pub use pipeline::{
    run_format, run_replace, FormatOptions, FormatSummary, ReplaceOptions, ReplaceSummary,
};
pub use propagate::{propagate, FileFailure, PropagationReport, RenameRules, Replacer};
pub use rewrite::{CatalogRewriter, Mutation, MutationKind, ReconcileOutcome};
pub use scan::{candidate_files, CandidateFile, ScanOptions};
pub use viloc_core::{CatalogEntry, Lang, ReplacementJob, Result};
