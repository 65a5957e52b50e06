//! Pushing a renamed literal through every eligible file of a module.

use crate::scan::{candidate_files, CandidateFile, ScanOptions};
use regex::{NoExpand, Regex};
use serde::Serialize;
use std::path::{Path, PathBuf};
use viloc_core::ReplacementJob;

/// Compiled patterns for one (old, new) rename.
#[derive(Debug, Clone)]
pub struct RenameRules {
    new: String,
    any_quoted: Regex,
    double_quoted: Regex,
    single_quoted: Regex,
    between_tags: Regex,
    bold: Regex,
}

type RuleFn = fn(&RenameRules, &str) -> String;

/// Applied in this order once a buffer is eligible. Every rule runs, even when
/// its own form is absent from the buffer.
const RULES: &[(&str, RuleFn)] = &[
    ("quotes", RenameRules::requote),
    ("tag", RenameRules::retag),
    ("bold", RenameRules::rebold),
];

impl RenameRules {
    pub fn new(old: &str, new: &str) -> Self {
        let esc = regex::escape(old);
        let build = |pattern: String| Regex::new(&pattern).expect("escaped pattern is valid");
        Self {
            new: new.to_string(),
            any_quoted: build(format!(r#"["']{esc}["']"#)),
            double_quoted: build(format!(r#""{esc}""#)),
            single_quoted: build(format!("'{esc}'")),
            between_tags: build(format!(">{esc}<")),
            bold: build(format!(r"<bold>\s*{esc}\s*</bold>")),
        }
    }

    /// The buffer mentions `old` quoted, between a closing and opening tag, or
    /// wrapped in `<bold>`.
    pub fn is_eligible(&self, text: &str) -> bool {
        self.any_quoted.is_match(text) || self.between_tags.is_match(text) || self.bold.is_match(text)
    }

    /// Quoted occurrences. A replacement containing `'` is always written
    /// double-quoted; otherwise each occurrence keeps its quote style.
    pub fn requote(&self, text: &str) -> String {
        let double = format!("\"{}\"", self.new);
        let out = self.double_quoted.replace_all(text, NoExpand(&double));
        let single = if self.new.contains('\'') {
            double.clone()
        } else {
            format!("'{}'", self.new)
        };
        self.single_quoted
            .replace_all(&out, NoExpand(&single))
            .into_owned()
    }

    /// `>old<` becomes `>new<`.
    pub fn retag(&self, text: &str) -> String {
        let repl = format!(">{}<", self.new);
        self.between_tags
            .replace_all(text, NoExpand(&repl))
            .into_owned()
    }

    /// `<bold> old </bold>` becomes `<bold>new</bold>`.
    pub fn rebold(&self, text: &str) -> String {
        let repl = format!("<bold>{}</bold>", self.new);
        self.bold.replace_all(text, NoExpand(&repl)).into_owned()
    }

    /// Run the whole rule table. `None` when the buffer is not eligible.
    pub fn apply(&self, text: &str) -> Option<String> {
        if !self.is_eligible(text) {
            return None;
        }
        let mut out = text.to_string();
        for (_name, rule) in RULES {
            out = rule(self, &out);
        }
        Some(out)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PropagationReport {
    pub old_text: String,
    pub new_text: String,
    pub scanned: usize,
    pub rewritten: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
}

/// Rewrites literals across the files of one module tree.
#[derive(Debug, Clone)]
pub struct Replacer {
    root: PathBuf,
    scan: ScanOptions,
    dry_run: bool,
}

impl Replacer {
    pub fn new(root: &Path, scan: ScanOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            scan,
            dry_run: false,
        }
    }

    /// Report what would change without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn candidates(&self) -> Vec<CandidateFile> {
        candidate_files(&self.root, &self.scan)
    }

    /// Walk the tree and apply one rename. Never fails: per-file problems are
    /// logged and listed in the report.
    pub fn propagate(&self, old_text: &str, new_text: &str) -> PropagationReport {
        let files = self.candidates();
        self.propagate_in(&files, &ReplacementJob::new(old_text, new_text))
    }

    /// Same as [`Replacer::propagate`] over an already collected file list.
    pub fn propagate_in(&self, files: &[CandidateFile], job: &ReplacementJob) -> PropagationReport {
        let mut report = PropagationReport {
            old_text: job.old_text.clone(),
            new_text: job.new_text.clone(),
            ..PropagationReport::default()
        };
        if job.is_noop() {
            return report;
        }
        let rules = RenameRules::new(&job.old_text, &job.new_text);

        for file in files {
            report.scanned += 1;
            match self.rewrite_file(&file.path, &rules) {
                Ok(true) => {
                    tracing::info!(
                        event = "replaced",
                        old = %job.old_text,
                        new = %job.new_text,
                        path = %file.path.display(),
                        dry_run = self.dry_run
                    );
                    report.rewritten.push(file.path.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(event = "replace_failed", path = %file.path.display(), error = %e);
                    report.failed.push(FileFailure {
                        path: file.path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// `Ok(true)` when the file content changed (and was written unless dry-run).
    fn rewrite_file(&self, path: &Path, rules: &RenameRules) -> std::io::Result<bool> {
        let content = std::fs::read_to_string(path)?;
        let Some(updated) = rules.apply(&content) else {
            return Ok(false);
        };
        if updated == content {
            return Ok(false);
        }
        if !self.dry_run {
            std::fs::write(path, updated)?;
        }
        Ok(true)
    }
}

/// One-shot convenience over [`Replacer`].
pub fn propagate(root: &Path, scan: &ScanOptions, old_text: &str, new_text: &str) -> PropagationReport {
    Replacer::new(root, scan.clone()).propagate(old_text, new_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn eligibility_needs_one_of_the_three_forms() {
        let r = RenameRules::new("Xác nhận", "Confirm");
        assert!(r.is_eligible("x = 'Xác nhận'"));
        assert!(r.is_eligible("<button>Xác nhận</button>"));
        assert!(r.is_eligible("<bold>\n  Xác nhận\n</bold>"));
        assert!(!r.is_eligible("# Xác nhận in a comment"));
        assert_eq!(r.apply("# Xác nhận in a comment"), None);
    }

    #[test]
    fn mixed_quotes_keep_their_style() {
        let r = RenameRules::new("Xác nhận", "Confirm");
        let out = r.apply("a = 'Xác nhận'\nb = \"Xác nhận\"\n").unwrap();
        assert_eq!(out, "a = 'Confirm'\nb = \"Confirm\"\n");
    }

    #[test]
    fn apostrophe_in_replacement_forces_double_quotes() {
        let r = RenameRules::new("Không được xóa", "Can't delete");
        let out = r.apply("raise UserError('Không được xóa')\nmsg = \"Không được xóa\"").unwrap();
        assert_eq!(out, "raise UserError(\"Can't delete\")\nmsg = \"Can't delete\"");
        assert!(!out.contains("'Can't delete'"));
    }

    #[test]
    fn markup_forms_are_rewritten() {
        let r = RenameRules::new("Lưu", "Save");
        assert_eq!(r.retag("<span>Lưu</span>"), "<span>Save</span>");
        assert_eq!(r.rebold("<bold>  Lưu \n</bold>"), "<bold>Save</bold>");
        // the tag form alone is enough to run the (no-op) quote rules too
        assert_eq!(r.apply("<p>Lưu</p>").unwrap(), "<p>Save</p>");
    }

    #[test]
    fn replacement_is_literal_and_old_text_is_escaped() {
        let r = RenameRules::new("Giá (VNĐ)", "Price $1");
        assert_eq!(r.apply("'Giá (VNĐ)'").unwrap(), "'Price $1'");
        assert_eq!(r.apply("'Giá VNĐ'"), None);
    }

    fn module_with_files() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("models")).unwrap();
        fs::create_dir_all(root.join("views")).unwrap();
        fs::create_dir_all(root.join("i18n")).unwrap();
        fs::write(
            root.join("models/van_ban.py"),
            "state = fields.Selection([('draft', 'Xác nhận')], string=\"Xác nhận\")\n",
        )
        .unwrap();
        fs::write(
            root.join("views/van_ban.xml"),
            "<button string=\"Xác nhận\"/>\n<span>Xác nhận</span>\n",
        )
        .unwrap();
        fs::write(root.join("views/untouched.xml"), "<span>Hủy</span>\n").unwrap();
        fs::write(
            root.join("i18n/vi_VN.po"),
            "#. module: m\nmsgid \"Xác nhận\"\nmsgstr \"\"\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn propagate_rewrites_tree_and_skips_catalog() {
        let dir = module_with_files();
        let root = dir.path();
        let scan = ScanOptions::default().excluding(&root.join("i18n/vi_VN.po"));

        let report = propagate(root, &scan, "Xác nhận", "Confirm");
        assert_eq!(report.rewritten.len(), 2);
        assert!(report.failed.is_empty());

        let py = fs::read_to_string(root.join("models/van_ban.py")).unwrap();
        assert_eq!(
            py,
            "state = fields.Selection([('draft', 'Confirm')], string=\"Confirm\")\n"
        );
        let xml = fs::read_to_string(root.join("views/van_ban.xml")).unwrap();
        assert_eq!(xml, "<button string=\"Confirm\"/>\n<span>Confirm</span>\n");
        let po = fs::read_to_string(root.join("i18n/vi_VN.po")).unwrap();
        assert!(po.contains("Xác nhận"));
    }

    #[test]
    fn propagate_is_idempotent() {
        let dir = module_with_files();
        let root = dir.path();
        let scan = ScanOptions::default();

        let first = propagate(root, &scan, "Xác nhận", "Confirm");
        assert!(!first.rewritten.is_empty());
        let snapshot = fs::read_to_string(root.join("views/van_ban.xml")).unwrap();

        let second = propagate(root, &scan, "Xác nhận", "Confirm");
        assert!(second.rewritten.is_empty());
        assert_eq!(fs::read_to_string(root.join("views/van_ban.xml")).unwrap(), snapshot);
    }

    #[test]
    fn unreadable_file_is_reported_and_walk_continues() {
        let dir = module_with_files();
        let root = dir.path();
        fs::write(root.join("models/binary.txt"), [0xff, 0xfe, 0x00, 0x27]).unwrap();

        let report = propagate(root, &ScanOptions::default(), "Xác nhận", "Confirm");
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("binary.txt"));
        assert!(report.rewritten.len() >= 2);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = module_with_files();
        let root = dir.path();
        let replacer = Replacer::new(root, ScanOptions::default()).dry_run(true);
        let report = replacer.propagate("Xác nhận", "Confirm");
        assert_eq!(report.rewritten.len(), 2);
        let py = fs::read_to_string(root.join("models/van_ban.py")).unwrap();
        assert!(py.contains("Xác nhận"));
    }
}
