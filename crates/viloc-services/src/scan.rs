use crate::util::{extension_of, is_hidden, normalized};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What makes a file worth looking at during propagation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lowercase, dot-less extensions.
    pub extensions: Vec<String>,
    /// Files never touched (the catalog itself).
    pub exclude: Vec<PathBuf>,
    /// Paths ending with this are treated as backups and skipped.
    pub backup_suffix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: ["py", "xml", "csv", "txt", "html", "js", "css"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            exclude: Vec::new(),
            backup_suffix: ".bak".to_string(),
        }
    }
}

impl ScanOptions {
    pub fn excluding(mut self, path: &Path) -> Self {
        self.exclude.push(path.to_path_buf());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub extension: String,
}

/// Every regular file under `root` eligible for rewriting, sorted by path.
/// Symlinks are not followed and hidden entries are skipped.
pub fn candidate_files(root: &Path, opts: &ScanOptions) -> Vec<CandidateFile> {
    let excluded: Vec<PathBuf> = opts.exclude.iter().map(|p| normalized(p)).collect();
    let mut out = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = extension_of(path) else {
            continue;
        };
        if !opts.extensions.iter().any(|e| *e == ext) {
            continue;
        }
        if !opts.backup_suffix.is_empty() && path.to_string_lossy().ends_with(&opts.backup_suffix)
        {
            continue;
        }
        if !excluded.is_empty() && excluded.contains(&normalized(path)) {
            continue;
        }
        out.push(CandidateFile {
            path: path.to_path_buf(),
            extension: ext,
        });
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(event = "candidates", root = %root.display(), files = out.len());
    out
}
