//! Translation for catalog entries.
//!
//! A [`Translator`] wraps a [`TranslationBackend`] and keeps protected numeric
//! tokens (see [`tokens`]) intact across the round trip. Failures are plain
//! values: callers decide what an untranslated entry means for them.

pub mod tokens;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use viloc_core::Lang;

pub use tokens::{protected_tokens, restore_tokens, ProtectedToken};

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("unexpected backend response: {0}")]
    Malformed(String),
    #[error("backend returned an empty translation")]
    Empty,
    #[error("no glossary entry for {0:?}")]
    NotInGlossary(String),
    #[error("cannot load glossary {path}: {reason}")]
    Glossary { path: String, reason: String },
}

/// Something that can turn text from one language into another.
pub trait TranslationBackend {
    fn name(&self) -> &'static str;
    fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError>;
}

impl<B: TranslationBackend + ?Sized> TranslationBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
        (**self).translate(text, from, to)
    }
}

/// Public Google Translate web endpoint (`client=gtx`), one blocking request per call.
#[derive(Debug, Clone)]
pub struct GoogleBackend {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl GoogleBackend {
    pub fn new(endpoint: Option<&str>, timeout_ms: u64) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("viloc/cli")
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            client,
        })
    }
}

/// The endpoint answers with `[[["<translated>", "<source>", ...], ...], ...]`;
/// the translation is the concatenation of the first field of every segment.
fn join_segments(v: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslateError::Malformed(v.to_string()))?;
    let mut out = String::new();
    for seg in segments {
        if let Some(part) = seg.get(0).and_then(|p| p.as_str()) {
            out.push_str(part);
        }
    }
    Ok(out)
}

impl TranslationBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "google"
    }

    fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", from.code()),
                ("tl", to.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?;
        if !res.status().is_success() {
            return Err(TranslateError::Status(res.status().as_u16()));
        }
        let v: serde_json::Value = res.json()?;
        join_segments(&v)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    vi_en: HashMap<String, String>,
    #[serde(default)]
    en_vi: HashMap<String, String>,
}

/// Offline lookup table, one map per direction.
///
/// ```toml
/// [vi_en]
/// "Xác nhận" = "Confirm"
///
/// [en_vi]
/// "Cancel" = "Hủy"
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlossaryBackend {
    vi_en: HashMap<String, String>,
    en_vi: HashMap<String, String>,
}

impl GlossaryBackend {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let file: GlossaryFile = toml::from_str(s)?;
        Ok(Self {
            vi_en: file.vi_en,
            en_vi: file.en_vi,
        })
    }

    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let glossary_err = |reason: String| TranslateError::Glossary {
            path: path.display().to_string(),
            reason,
        };
        let s = std::fs::read_to_string(path).map_err(|e| glossary_err(e.to_string()))?;
        Self::from_toml_str(&s).map_err(|e| glossary_err(e.to_string()))
    }

    pub fn insert(&mut self, from: Lang, text: &str, translation: &str) {
        let map = match from {
            Lang::Vietnamese => &mut self.vi_en,
            Lang::English => &mut self.en_vi,
        };
        map.insert(text.to_string(), translation.to_string());
    }

    pub fn with(mut self, from: Lang, text: &str, translation: &str) -> Self {
        self.insert(from, text, translation);
        self
    }
}

impl TranslationBackend for GlossaryBackend {
    fn name(&self) -> &'static str {
        "glossary"
    }

    fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
        let map = match (from, to) {
            (Lang::Vietnamese, Lang::English) => &self.vi_en,
            (Lang::English, Lang::Vietnamese) => &self.en_vi,
            _ => return Ok(text.to_string()),
        };
        map.get(text)
            .cloned()
            .ok_or_else(|| TranslateError::NotInGlossary(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Glossary,
}

impl Provider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gtx" => Some(Self::Google),
            "glossary" | "offline" => Some(Self::Glossary),
            _ => None,
        }
    }
}

/// Translates whole strings while keeping protected tokens in place.
#[derive(Debug, Clone)]
pub struct Translator<B> {
    backend: B,
}

impl<B: TranslationBackend> Translator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
        let tokens = protected_tokens(text);
        let raw = self.backend.translate(text, from, to)?;
        if raw.trim().is_empty() {
            return Err(TranslateError::Empty);
        }
        let out = restore_tokens(&raw, &tokens);
        tracing::debug!(
            event = "translated",
            backend = self.backend.name(),
            from = %from,
            to = %to,
            tokens = tokens.len(),
            text = text,
            result = %out
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Echo(&'static str);

    impl TranslationBackend for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn translate(&self, _: &str, _: Lang, _: Lang) -> Result<String, TranslateError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn protected_token_survives_translation() {
        let t = Translator::new(Echo("Day 15/3. has been completed"));
        let out = t
            .translate("Ngày 15/3. đã hoàn thành", Lang::Vietnamese, Lang::English)
            .unwrap();
        assert_eq!(out, "Day 15/3. has been completed");
        assert!(out.contains("15/3."));
    }

    #[test]
    fn token_is_restored_when_backend_mangles_it() {
        let t = Translator::new(Echo("Day 15 / 3 is done"));
        let out = t
            .translate("Ngày 15/3. xong", Lang::Vietnamese, Lang::English)
            .unwrap();
        // word 1 of the translation is overwritten, whatever it was
        assert_eq!(out, "Day 15/3. / 3 is done");
    }

    #[test]
    fn empty_backend_answer_is_an_error() {
        let t = Translator::new(Echo("   "));
        let err = t.translate("Lưu", Lang::Vietnamese, Lang::English).unwrap_err();
        assert!(matches!(err, TranslateError::Empty));
    }

    #[test]
    fn glossary_lookups_by_direction() {
        let g = GlossaryBackend::default()
            .with(Lang::Vietnamese, "Xác nhận", "Confirm")
            .with(Lang::English, "Cancel", "Hủy");
        assert_eq!(g.translate("Xác nhận", Lang::Vietnamese, Lang::English).unwrap(), "Confirm");
        assert_eq!(g.translate("Cancel", Lang::English, Lang::Vietnamese).unwrap(), "Hủy");
        assert!(matches!(
            g.translate("Cancel", Lang::Vietnamese, Lang::English),
            Err(TranslateError::NotInGlossary(_))
        ));
    }

    #[test]
    fn glossary_loads_from_toml_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "[vi_en]\n\"Lưu\" = \"Save\"\n").unwrap();
        let g = GlossaryBackend::load(tmp.path()).unwrap();
        assert_eq!(g.translate("Lưu", Lang::Vietnamese, Lang::English).unwrap(), "Save");

        let missing = GlossaryBackend::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(TranslateError::Glossary { .. })));
    }

    #[test]
    fn google_response_segments_are_joined() {
        let v: serde_json::Value = serde_json::from_str(
            r#"[[["Document approved. ","Văn bản đã duyệt. ",null,null,10],["Send it.","Gửi đi.",null,null,10]],null,"vi"]"#,
        )
        .unwrap();
        assert_eq!(join_segments(&v).unwrap(), "Document approved. Send it.");
        assert!(join_segments(&serde_json::json!({"error": 1})).is_err());
    }

    #[test]
    fn provider_names() {
        assert_eq!(Provider::parse("Google"), Some(Provider::Google));
        assert_eq!(Provider::parse("offline"), Some(Provider::Glossary));
        assert_eq!(Provider::parse("deepl"), None);
    }
}
