use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Default catalog location relative to the module root.
pub const DEFAULT_CATALOG: &str = "i18n/vi_VN.po";

/// Prefix of the line that opens a catalog entry.
pub const MODULE_MARKER_PREFIX: &str = "#. module:";

/// Prefix of the source-location line inside an entry.
pub const LOCATION_MARKER_PREFIX: &str = "#: model";

/// Natural languages the toolkit knows how to tell apart and translate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Vietnamese,
    English,
}

impl Lang {
    /// ISO 639-1 code, as expected by translation backends.
    pub fn code(self) -> &'static str {
        match self {
            Lang::Vietnamese => "vi",
            Lang::English => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One msgid/msgstr pair from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// The `#. module:` line, kept verbatim.
    pub module_marker: String,
    /// The `#: model...` line, kept verbatim (empty when absent).
    pub location_marker: String,
    /// msgid payload. Never empty for an entry returned by the readers.
    pub source_text: String,
    /// msgstr payload, possibly empty.
    pub target_text: String,
}

impl CatalogEntry {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_text: target_text.into(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.source_text.is_empty() && !self.target_text.is_empty()
    }
}

/// A rename to push through the module tree: every quoted/markup occurrence of
/// `old_text` becomes `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementJob {
    pub old_text: String,
    pub new_text: String,
}

impl ReplacementJob {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    /// A job that would not change anything (empty search text or identical texts).
    pub fn is_noop(&self) -> bool {
        self.old_text.is_empty() || self.old_text == self.new_text
    }
}

#[derive(Debug, Error)]
pub enum VilocError {
    #[error("catalog not found: {0}")]
    CatalogMissing(String),
}
