//! Cheap "is this Vietnamese / English?" checks used to decide which way a
//! catalog entry needs translating and which literals deserve a `_()` wrapper.

use serde::Deserialize;
use std::sync::OnceLock;
use viloc_core::Lang;
use whatlang::Detector;

/// Lowercase Vietnamese letters carrying diacritics (plus `đ`).
const VIETNAMESE_CHARS: &str =
    "áàảãạăắằẳẵặâấầẩẫậéèẻẽẹêếềểễệíìỉĩịóòỏõọôốồổỗộơớờởỡợúùủũụưứừửữựýỳỷỹỵđ";

/// Shortest text (in alphabetic chars) the statistical detector is asked about.
const MIN_DETECT_CHARS: usize = 3;

/// Decides whether a text is written in a given language. Implementations never
/// fail: an inconclusive answer is `false`.
pub trait LanguageClassifier {
    fn looks_like(&self, text: &str, lang: Lang) -> bool;
}

/// `true` when the lowercased text contains at least one Vietnamese diacritic letter.
pub fn has_vietnamese_chars(text: &str) -> bool {
    text.chars()
        .flat_map(char::to_lowercase)
        .any(|c| VIETNAMESE_CHARS.contains(c))
}

/// `whatlang` restricted to the two languages a catalog is written in.
/// Short labels like "Cancel" score as Catalan or Latin over the full set.
fn detector() -> &'static Detector {
    static DETECTOR: OnceLock<Detector> = OnceLock::new();
    DETECTOR.get_or_init(|| {
        Detector::with_allowlist(vec![whatlang::Lang::Eng, whatlang::Lang::Vie])
    })
}

fn detection(text: &str) -> Option<whatlang::Info> {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if letters < MIN_DETECT_CHARS {
        return None;
    }
    detector().detect(text)
}

fn to_lang(info: &whatlang::Info) -> Option<Lang> {
    match info.lang() {
        whatlang::Lang::Vie => Some(Lang::Vietnamese),
        whatlang::Lang::Eng => Some(Lang::English),
        _ => None,
    }
}

/// Whether `text` reads as English or Vietnamese, per `whatlang`.
pub fn detect(text: &str) -> Option<Lang> {
    detection(text).as_ref().and_then(to_lang)
}

/// Like [`detect`], but `None` unless `whatlang` calls the result reliable.
pub fn detect_reliable(text: &str) -> Option<Lang> {
    detection(text)
        .filter(whatlang::Info::is_reliable)
        .as_ref()
        .and_then(to_lang)
}

/// Character-set membership. Knows nothing about English.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharsetClassifier;

impl LanguageClassifier for CharsetClassifier {
    fn looks_like(&self, text: &str, lang: Lang) -> bool {
        match lang {
            Lang::Vietnamese => has_vietnamese_chars(text),
            Lang::English => false,
        }
    }
}

/// Statistical detection only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectingClassifier;

impl LanguageClassifier for DetectingClassifier {
    fn looks_like(&self, text: &str, lang: Lang) -> bool {
        detect(text) == Some(lang)
    }
}

/// Vietnamese by diacritics first, then reliable detection; English by
/// detection only, and never for text carrying diacritics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridClassifier;

impl LanguageClassifier for HybridClassifier {
    fn looks_like(&self, text: &str, lang: Lang) -> bool {
        match lang {
            Lang::Vietnamese => {
                has_vietnamese_chars(text) || detect_reliable(text) == Some(lang)
            }
            Lang::English => !has_vietnamese_chars(text) && detect(text) == Some(lang),
        }
    }
}

/// Named strategy, as selected from configuration or the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Charset,
    Detect,
    #[default]
    Hybrid,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "charset" | "chars" => Some(Self::Charset),
            "detect" | "whatlang" => Some(Self::Detect),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub fn classifier(self) -> Box<dyn LanguageClassifier> {
        match self {
            Self::Charset => Box::new(CharsetClassifier),
            Self::Detect => Box::new(DetectingClassifier),
            Self::Hybrid => Box::new(HybridClassifier),
        }
    }
}

impl<C: LanguageClassifier + ?Sized> LanguageClassifier for Box<C> {
    fn looks_like(&self, text: &str, lang: Lang) -> bool {
        (**self).looks_like(text, lang)
    }
}

impl<C: LanguageClassifier + ?Sized> LanguageClassifier for &C {
    fn looks_like(&self, text: &str, lang: Lang) -> bool {
        (**self).looks_like(text, lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_spots_diacritics_in_any_case() {
        assert!(has_vietnamese_chars("Xác nhận"));
        assert!(has_vietnamese_chars("ĐÃ DUYỆT"));
        assert!(has_vietnamese_chars("đ"));
        assert!(!has_vietnamese_chars("Confirm"));
        assert!(!has_vietnamese_chars("Ngay 15/3"));
        assert!(!has_vietnamese_chars(""));
    }

    #[test]
    fn charset_classifier_never_claims_english() {
        let c = CharsetClassifier;
        assert!(c.looks_like("Hủy bỏ", Lang::Vietnamese));
        assert!(!c.looks_like("Cancel the current operation", Lang::English));
    }

    #[test]
    fn detection_degrades_to_false_on_short_or_empty_text() {
        let c = DetectingClassifier;
        assert!(!c.looks_like("", Lang::English));
        assert!(!c.looks_like("42", Lang::English));
        assert!(!c.looks_like("ok", Lang::English));
        assert_eq!(detect("   "), None);
    }

    #[test]
    fn hybrid_detects_a_plain_english_sentence() {
        let c = HybridClassifier;
        let text = "The document has been approved and sent to the director for review";
        assert!(c.looks_like(text, Lang::English));
        assert!(!c.looks_like(text, Lang::Vietnamese));
    }

    #[test]
    fn hybrid_never_calls_diacritic_text_english() {
        let c = HybridClassifier;
        assert!(!c.looks_like("Văn bản đã được phê duyệt", Lang::English));
        assert!(c.looks_like("Văn bản đã được phê duyệt", Lang::Vietnamese));
    }

    #[test]
    fn short_english_labels_are_english() {
        for label in ["Cancel", "Sale Order", "Confirm", "Print"] {
            assert_eq!(detect(label), Some(Lang::English), "{label}");
            assert!(HybridClassifier.looks_like(label, Lang::English), "{label}");
            assert!(!HybridClassifier.looks_like(label, Lang::Vietnamese), "{label}");
        }
        assert!(DetectingClassifier.looks_like("Cancel", Lang::English));
        assert!(Strategy::default().classifier().looks_like("Sale Order", Lang::English));
    }

    #[test]
    fn diacritic_text_detects_as_vietnamese() {
        assert_eq!(detect("Văn bản đến"), Some(Lang::Vietnamese));
        assert!(DetectingClassifier.looks_like("Văn bản đã được phê duyệt", Lang::Vietnamese));
        assert!(!DetectingClassifier.looks_like("Văn bản đã được phê duyệt", Lang::English));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(Strategy::parse("Charset"), Some(Strategy::Charset));
        assert_eq!(Strategy::parse("whatlang"), Some(Strategy::Detect));
        assert_eq!(Strategy::parse("nope"), None);
        assert!(Strategy::Charset.classifier().looks_like("Lưu", Lang::Vietnamese));
    }
}
