//! Wrapping hard-coded literals of Odoo modules in `_()`.
//!
//! Every pass is a pure function over a text buffer returning the new buffer
//! and how many literals it wrapped. Literals already containing `_(` are left
//! alone, which makes every pass idempotent.

use crate::propagate::FileFailure;
use crate::util::{extension_of, is_hidden};
use regex::{Captures, Regex};
use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use viloc_core::{Lang, Result};
use viloc_lang::LanguageClassifier;
use walkdir::WalkDir;

const IMPORT_LINE: &str = "from odoo import _";

fn odoo_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^from odoo import (.*?)\r?$").unwrap())
}

fn lists_underscore(names: &str) -> bool {
    names
        .lines()
        .map(|l| l.split('#').next().unwrap_or_default())
        .flat_map(|l| l.split(','))
        .any(|n| n.trim() == "_")
}

/// One `from odoo import` statement. `names` spans the imported names, inside
/// the parentheses when the list is parenthesized.
struct OdooImport {
    line_start: usize,
    names: Range<usize>,
    parenthesized: bool,
}

fn odoo_imports(text: &str) -> Vec<OdooImport> {
    odoo_import_re()
        .captures_iter(text)
        .filter_map(|c| {
            let (line, list) = (c.get(0)?, c.get(1)?);
            let open = list.start() + (list.len() - list.as_str().trim_start().len());
            if !text[open..].starts_with('(') {
                return Some(OdooImport {
                    line_start: line.start(),
                    names: list.range(),
                    parenthesized: false,
                });
            }
            let close = closing_paren(text, open + 1).unwrap_or(text.len());
            Some(OdooImport {
                line_start: line.start(),
                names: open + 1..close,
                parenthesized: true,
            })
        })
        .collect()
}

/// Text to splice in so a parenthesized list starts with `_`, and where.
fn paren_insertion(text: &str, names: &Range<usize>) -> (usize, String) {
    let inner = &text[names.clone()];
    if inner.trim().is_empty() {
        return (names.start, "_".to_string());
    }
    let Some(nl) = inner.find('\n') else {
        return (names.start, "_, ".to_string());
    };
    let eol = if inner[..nl].ends_with('\r') { "\r\n" } else { "\n" };
    let at = names.start + nl + 1;
    let next = &text[at..names.end];
    let indent: String = next.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
    let indent = if indent.is_empty() || next.trim_start().starts_with(')') {
        "    ".to_string()
    } else {
        indent
    };
    (at, format!("{indent}_,{eol}"))
}

/// Make sure `from odoo import _` is available. No-op when some
/// `from odoo import` statement already lists `_`, parenthesized or not;
/// otherwise `_` is added to the first such statement, or a new import is
/// placed after the leading comment lines.
pub fn ensure_odoo_import(text: &str) -> (String, bool) {
    let imports = odoo_imports(text);
    if imports
        .iter()
        .any(|i| lists_underscore(&text[i.names.clone()]))
    {
        return (text.to_string(), false);
    }
    if let Some(first) = imports.first() {
        let mut out = String::with_capacity(text.len() + 8);
        if first.parenthesized {
            let (at, insert) = paren_insertion(text, &first.names);
            out.push_str(&text[..at]);
            out.push_str(&insert);
            out.push_str(&text[at..]);
        } else {
            let names = text[first.names.clone()].trim();
            out.push_str(&text[..first.line_start]);
            out.push_str(IMPORT_LINE);
            if !names.is_empty() {
                out.push_str(", ");
                out.push_str(names);
            }
            out.push_str(&text[first.names.end..]);
        }
        return (out, true);
    }

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if !line.starts_with('#') {
            break;
        }
        offset += line.len();
    }
    let mut out = String::with_capacity(text.len() + IMPORT_LINE.len() + 1);
    out.push_str(&text[..offset]);
    if offset > 0 && !text[..offset].ends_with('\n') {
        out.push('\n');
    }
    out.push_str(IMPORT_LINE);
    out.push('\n');
    out.push_str(&text[offset..]);
    (out, true)
}

fn is_wrapped(s: &str) -> bool {
    s.contains("_(") || s.contains("_lt(")
}

/// Byte index of the `)` closing the parenthesis opened right before `start`.
/// Parentheses inside string literals are ignored.
fn closing_paren(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `raise ValidationError(<msg>)` becomes `raise ValidationError(_(<msg>))`.
pub fn wrap_validation_errors(text: &str) -> (String, usize) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"raise\s+ValidationError\(").unwrap());

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut wrapped = 0;
    for m in re.find_iter(text) {
        if m.start() < last {
            continue;
        }
        let Some(close) = closing_paren(text, m.end()) else {
            continue;
        };
        let message = &text[m.end()..close];
        if message.trim().is_empty() || is_wrapped(message) {
            continue;
        }
        out.push_str(&text[last..m.end()]);
        out.push_str("_(");
        out.push_str(message);
        out.push(')');
        last = close;
        wrapped += 1;
    }
    out.push_str(&text[last..]);
    (out, wrapped)
}

/// `'name': 'Text'` (any quote combination) becomes `'name': _('Text')`.
pub fn wrap_name_fields(text: &str) -> (String, usize) {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    let res = RES.get_or_init(|| {
        [
            r"'name':\s*'([^']+)'",
            r#""name":\s*"([^"]+)""#,
            r#"'name':\s*"([^"]+)""#,
            r#""name":\s*'([^']+)'"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    let mut out = text.to_string();
    let mut wrapped = 0;
    for re in res {
        out = re
            .replace_all(&out, |c: &Captures| {
                wrapped += 1;
                let value = &c[1];
                if value.contains('\'') {
                    format!("'name': _(\"{value}\")")
                } else {
                    format!("'name': _('{value}')")
                }
            })
            .into_owned();
    }
    (out, wrapped)
}

fn escape_double(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// Wrap the Vietnamese static parts of `content`, leaving `{...}`
/// placeholders where they are.
fn wrap_static_parts<C: LanguageClassifier + ?Sized>(
    content: &str,
    classifier: &C,
    wrapped: &mut usize,
) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\{.*?\}").unwrap());

    let mut out = String::with_capacity(content.len() + 8);
    let mut last = 0;
    let mut push_static = |part: &str, out: &mut String| {
        if !part.trim().is_empty() && classifier.looks_like(part, Lang::Vietnamese) {
            *wrapped += 1;
            out.push_str(&format!("{{_(\"{}\")}}", escape_double(part)));
        } else {
            out.push_str(part);
        }
    };
    for m in re.find_iter(content) {
        push_static(&content[last..m.start()], &mut out);
        out.push_str(m.as_str());
        last = m.end();
    }
    push_static(&content[last..], &mut out);
    out
}

/// Text inside `<b>`, `<span>` and `<p class="text-danger">` that reads as
/// Vietnamese becomes `{_("...")}`.
pub fn wrap_markup_text<C: LanguageClassifier + ?Sized>(text: &str, classifier: &C) -> (String, usize) {
    static RES: OnceLock<Vec<(Regex, &'static str, &'static str)>> = OnceLock::new();
    let res = RES.get_or_init(|| {
        [
            (r"<b>(.*?)</b>", "<b>", "</b>"),
            (r"<span>(.*?)</span>", "<span>", "</span>"),
            (r#"<p class="text-danger">(.*?)</p>"#, r#"<p class="text-danger">"#, "</p>"),
        ]
        .into_iter()
        .map(|(p, open, close)| (Regex::new(p).unwrap(), open, close))
        .collect()
    });

    let mut out = text.to_string();
    let mut wrapped = 0;
    for (re, open, close) in res {
        out = re
            .replace_all(&out, |c: &Captures| {
                let inner = &c[1];
                if is_wrapped(inner) {
                    return c[0].to_string();
                }
                format!("{open}{}{close}", wrap_static_parts(inner, classifier, &mut wrapped))
            })
            .into_owned();
    }
    (out, wrapped)
}

/// `title=`/`message=` keyword arguments holding Vietnamese text become
/// `title=_("...")`.
pub fn wrap_notify_args<C: LanguageClassifier + ?Sized>(text: &str, classifier: &C) -> (String, usize) {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    let res = RES.get_or_init(|| {
        [
            r"\b(title|message)='([^'\n]*)'",
            r#"\b(title|message)="([^"\n]*)""#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    let mut out = text.to_string();
    let mut wrapped = 0;
    for re in res {
        out = re
            .replace_all(&out, |c: &Captures| {
                let value = &c[2];
                if is_wrapped(value) || !classifier.looks_like(value, Lang::Vietnamese) {
                    return c[0].to_string();
                }
                wrapped += 1;
                format!("{}=_(\"{}\")", &c[1], escape_double(value))
            })
            .into_owned();
    }
    (out, wrapped)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkSummary {
    pub scanned: usize,
    pub wrapped: usize,
    pub changed: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
}

/// Which files a tree-wide pass visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPass {
    ValidationErrors,
    NameFields,
}

impl MarkPass {
    fn accepts(self, path: &Path) -> bool {
        if extension_of(path).as_deref() != Some("py") {
            return false;
        }
        match self {
            MarkPass::ValidationErrors => true,
            MarkPass::NameFields => {
                path.file_name().and_then(|n| n.to_str()) != Some("__manifest__.py")
                    && !path.components().any(|c| c.as_os_str() == "i18n")
            }
        }
    }

    fn apply(self, text: &str) -> (String, usize) {
        match self {
            MarkPass::ValidationErrors => wrap_validation_errors(text),
            MarkPass::NameFields => wrap_name_fields(text),
        }
    }
}

fn mark_text(text: &str, pass: impl FnOnce(&str) -> (String, usize)) -> (String, usize) {
    let (out, wrapped) = pass(text);
    if wrapped == 0 {
        return (out, 0);
    }
    let (out, _) = ensure_odoo_import(&out);
    (out, wrapped)
}

/// Run a pass over every Python file under `root`. Files that fail to read
/// or write are logged and skipped.
pub fn mark_tree(root: &Path, pass: MarkPass, dry_run: bool) -> MarkSummary {
    let mut summary = MarkSummary::default();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !pass.accepts(path) {
            continue;
        }
        summary.scanned += 1;
        match mark_file_with(path, dry_run, |t| pass.apply(t)) {
            Ok(0) => {}
            Ok(n) => {
                tracing::info!(event = "marked", pass = ?pass, path = %path.display(), wrapped = n);
                summary.wrapped += n;
                summary.changed.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::error!(event = "mark_failed", path = %path.display(), error = %e);
                summary.failed.push(FileFailure {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }
    summary.changed.sort();
    summary
}

pub fn mark_validation_errors(root: &Path, dry_run: bool) -> MarkSummary {
    mark_tree(root, MarkPass::ValidationErrors, dry_run)
}

pub fn mark_name_fields(root: &Path, dry_run: bool) -> MarkSummary {
    mark_tree(root, MarkPass::NameFields, dry_run)
}

fn mark_file_with(
    path: &Path,
    dry_run: bool,
    pass: impl FnOnce(&str) -> (String, usize),
) -> std::io::Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let (out, wrapped) = mark_text(&content, pass);
    if wrapped > 0 && out != content && !dry_run {
        std::fs::write(path, out)?;
    }
    Ok(wrapped)
}

/// Wrap markup text and notification arguments in a single file.
pub fn mark_markup_file<C: LanguageClassifier + ?Sized>(
    path: &Path,
    classifier: &C,
    dry_run: bool,
) -> Result<usize> {
    let wrapped = mark_file_with(path, dry_run, |text| {
        let (text, a) = wrap_markup_text(text, classifier);
        let (text, b) = wrap_notify_args(&text, classifier);
        (text, a + b)
    })?;
    tracing::info!(event = "marked", pass = "markup", path = %path.display(), wrapped, dry_run);
    Ok(wrapped)
}
