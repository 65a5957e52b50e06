//! Reading and writing module catalogs (`i18n/vi_VN.po`).
//!
//! Two views of the same file are offered:
//! - [`parse_entries`] returns the complete msgid/msgstr pairs only, the way
//!   the replace pass consumes them;
//! - [`Catalog`] keeps every raw line grouped in blocks so that the file can be
//!   written back untouched except for the entries that were edited.

use color_eyre::eyre::WrapErr;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use viloc_core::{CatalogEntry, Result, LOCATION_MARKER_PREFIX, MODULE_MARKER_PREFIX};

/// Extract the quoted payload of a `msgid "..."` / `msgstr "..."` line.
/// Returns an empty string for anything that does not match.
fn extract_message(line: &str) -> String {
    static MSG_RE: OnceLock<Regex> = OnceLock::new();
    let re = MSG_RE.get_or_init(|| Regex::new(r#"^msg(?:id|str) "(.*)""#).unwrap());
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Parse catalog lines into complete entries, skipping the first
/// `skip_header_lines` lines. Entries missing either text are dropped.
pub fn parse_entries<S: AsRef<str>>(lines: &[S], skip_header_lines: usize) -> Vec<CatalogEntry> {
    let mut out = Vec::new();
    let mut current = CatalogEntry::default();

    for raw in lines.iter().skip(skip_header_lines) {
        let line = raw.as_ref().trim();
        if line.starts_with(MODULE_MARKER_PREFIX) {
            let done = std::mem::replace(
                &mut current,
                CatalogEntry {
                    module_marker: line.to_string(),
                    ..CatalogEntry::default()
                },
            );
            if done.is_complete() {
                out.push(done);
            }
        } else if line.starts_with(LOCATION_MARKER_PREFIX) {
            current.location_marker = line.to_string();
        } else if line.starts_with("msgid ") {
            current.source_text = extract_message(line);
        } else if line.starts_with("msgstr ") {
            current.target_text = extract_message(line);
        }
    }

    if current.is_complete() {
        out.push(current);
    }
    out
}

/// Read a catalog file and return its complete entries.
pub fn read_catalog(path: &Path, skip_header_lines: usize) -> Result<Vec<CatalogEntry>> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading catalog {}", path.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    let entries = parse_entries(&lines, skip_header_lines);
    tracing::debug!(event = "catalog_read", path = %path.display(), entries = entries.len());
    Ok(entries)
}

/// Raw lines from one module marker up to (not including) the next one.
#[derive(Debug, Clone)]
struct Block {
    lines: Vec<String>,
    msgid_at: Option<usize>,
    msgstr_at: Option<usize>,
    original: CatalogEntry,
    entry: CatalogEntry,
}

impl Block {
    fn new(lines: Vec<String>) -> Self {
        let mut msgid_at = None;
        let mut msgstr_at = None;
        let mut entry = CatalogEntry::default();
        for (i, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.starts_with(MODULE_MARKER_PREFIX) && i == 0 {
                entry.module_marker = line.to_string();
            } else if line.starts_with(LOCATION_MARKER_PREFIX) {
                entry.location_marker = line.to_string();
            } else if line.starts_with("msgid ") {
                entry.source_text = extract_message(line);
                msgid_at = Some(i);
            } else if line.starts_with("msgstr ") {
                entry.target_text = extract_message(line);
                msgstr_at = Some(i);
            }
        }
        Self {
            lines,
            msgid_at,
            msgstr_at,
            original: entry.clone(),
            entry,
        }
    }

    /// Only blocks with both lines and a non-empty msgid carry an editable entry.
    /// This is what keeps the PO header (empty msgid) out of reach.
    fn is_editable(&self) -> bool {
        self.msgid_at.is_some() && self.msgstr_at.is_some() && !self.original.source_text.is_empty()
    }

    fn render_into(&self, out: &mut String) {
        for (i, line) in self.lines.iter().enumerate() {
            if Some(i) == self.msgid_at && self.entry.source_text != self.original.source_text {
                out.push_str(&format!("msgid \"{}\"", self.entry.source_text));
                out.push_str(line_ending(line));
            } else if Some(i) == self.msgstr_at
                && self.entry.target_text != self.original.target_text
            {
                out.push_str(&format!("msgstr \"{}\"", self.entry.target_text));
                out.push_str(line_ending(line));
            } else {
                out.push_str(line);
            }
        }
    }
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Whole-file view of a catalog that preserves the original layout.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    blocks: Vec<Block>,
}

impl Catalog {
    /// Split `text` into blocks at every module marker line. Lines keep their
    /// original endings so that [`Catalog::render`] reproduces the input.
    pub fn parse(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for line in text.split_inclusive('\n') {
            if line.trim_start().starts_with(MODULE_MARKER_PREFIX) && !current.is_empty() {
                blocks.push(Block::new(std::mem::take(&mut current)));
            }
            current.push(line.to_string());
        }
        if !current.is_empty() {
            blocks.push(Block::new(current));
        }
        Self { blocks }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading catalog {}", path.display()))?;
        let catalog = Self::parse(&text);
        tracing::debug!(
            event = "catalog_loaded",
            path = %path.display(),
            blocks = catalog.blocks.len(),
            entries = catalog.len()
        );
        Ok(catalog)
    }

    /// Number of editable entries (empty-target ones included).
    pub fn len(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_editable()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Editable entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.blocks
            .iter()
            .filter(|b| b.is_editable())
            .map(|b| &b.entry)
    }

    /// Mutable access to the editable entries in file order. Changes to the two
    /// text fields are picked up by [`Catalog::render`]; marker edits are not.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut CatalogEntry> {
        self.blocks
            .iter_mut()
            .filter(|b| b.is_editable())
            .map(|b| &mut b.entry)
    }

    /// Entries whose texts differ from what was parsed.
    pub fn modified_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_editable() && b.entry != b.original)
            .count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.render_into(&mut out);
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .wrap_err_with(|| format!("writing catalog {}", path.display()))?;
        Ok(())
    }
}
