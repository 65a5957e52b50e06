use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::DirEntry;

/// Hidden below the walk root (`.git`, `.venv`, editor swap files...).
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.'))
}

/// `path` with `suffix` appended to its file name: `vi_VN.po` + `.bak` -> `vi_VN.po.bak`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Best-effort canonical form used to compare paths built from different roots.
pub fn normalized(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Lowercased extension without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
