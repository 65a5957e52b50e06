use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Extensions scanned when propagating a rename, without the leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "xml", "csv", "txt", "html", "js", "css"];
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "viloc.log";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VilocConfig {
    /// Catalog path relative to the module root.
    pub catalog: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub backup_suffix: Option<String>,
    pub log_dir: Option<String>,
    pub log_file: Option<String>,
    pub translate: Option<TranslateCfg>,
    pub format: Option<FormatCfg>,
    pub replace: Option<ReplaceCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateCfg {
    /// "google" or "glossary"
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub glossary: Option<String>,
    /// "charset", "detect" or "hybrid"
    pub classifier: Option<String>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatCfg {
    pub backup: Option<bool>,
    pub propagate: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceCfg {
    pub skip_header_lines: Option<usize>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl VilocConfig {
    pub fn catalog_path(&self, module: &Path) -> PathBuf {
        module.join(self.catalog.as_deref().unwrap_or(viloc_core::DEFAULT_CATALOG))
    }

    /// Allowed extensions, lowercased and without a leading dot.
    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(list) => list
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            None => DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn backup_suffix(&self) -> &str {
        self.backup_suffix.as_deref().unwrap_or(DEFAULT_BACKUP_SUFFIX)
    }

    pub fn log_path(&self) -> (PathBuf, String) {
        (
            PathBuf::from(self.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR)),
            self.log_file
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        )
    }

    pub fn translate(&self) -> TranslateCfg {
        self.translate.clone().unwrap_or_default()
    }

    pub fn format(&self) -> FormatCfg {
        self.format.clone().unwrap_or_default()
    }

    pub fn replace(&self) -> ReplaceCfg {
        self.replace.clone().unwrap_or_default()
    }
}

fn read_config_file(path: &Path) -> Result<Option<VilocConfig>, ConfigError> {
    let Ok(s) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    toml::from_str::<VilocConfig>(&s)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Search order: CWD/viloc.toml, $CONFIG_DIR/viloc/viloc.toml. Earlier files win
/// field by field.
pub fn load_config() -> Result<VilocConfig, ConfigError> {
    let cwd = std::env::current_dir().ok();
    let user = dirs::config_dir().map(|base| base.join("viloc"));
    load_config_from(cwd.as_deref(), user.as_deref())
}

pub fn load_config_from(
    cwd: Option<&Path>,
    user_dir: Option<&Path>,
) -> Result<VilocConfig, ConfigError> {
    let mut merged = VilocConfig::default();
    for dir in [cwd, user_dir].into_iter().flatten() {
        if let Some(cfg) = read_config_file(&dir.join("viloc.toml"))? {
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

fn merge(mut a: VilocConfig, b: VilocConfig) -> VilocConfig {
    if a.catalog.is_none() {
        a.catalog = b.catalog;
    }
    if a.extensions.is_none() {
        a.extensions = b.extensions;
    }
    if a.backup_suffix.is_none() {
        a.backup_suffix = b.backup_suffix;
    }
    if a.log_dir.is_none() {
        a.log_dir = b.log_dir;
    }
    if a.log_file.is_none() {
        a.log_file = b.log_file;
    }
    a.translate = merge_opt(a.translate, b.translate, merge_translate);
    a.format = merge_opt(a.format, b.format, merge_format);
    a.replace = merge_opt(a.replace, b.replace, merge_replace);
    a
}

fn merge_opt<T: Default>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (None, None) => None,
    }
}

fn merge_translate(mut a: TranslateCfg, b: TranslateCfg) -> TranslateCfg {
    if a.provider.is_none() {
        a.provider = b.provider;
    }
    if a.endpoint.is_none() {
        a.endpoint = b.endpoint;
    }
    if a.timeout_ms.is_none() {
        a.timeout_ms = b.timeout_ms;
    }
    if a.glossary.is_none() {
        a.glossary = b.glossary;
    }
    if a.classifier.is_none() {
        a.classifier = b.classifier;
    }
    if a.delay_ms.is_none() {
        a.delay_ms = b.delay_ms;
    }
    a
}
fn merge_format(mut a: FormatCfg, b: FormatCfg) -> FormatCfg {
    if a.backup.is_none() {
        a.backup = b.backup;
    }
    if a.propagate.is_none() {
        a.propagate = b.propagate;
    }
    a
}
fn merge_replace(mut a: ReplaceCfg, b: ReplaceCfg) -> ReplaceCfg {
    if a.skip_header_lines.is_none() {
        a.skip_header_lines = b.skip_header_lines;
    }
    a
}
