use regex::Regex;
use std::sync::OnceLock;

/// A numeric/positional fragment (`15/3.`, `4.`) that must come out of
/// translation exactly as it went in, with the index of the word holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedToken {
    pub word_index: usize,
    pub text: String,
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\d+/\d+\.|\d+\.").unwrap())
}

/// Byte offsets where whitespace-separated words start.
fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut prev_ws = true;
    for (i, c) in text.char_indices() {
        let ws = c.is_whitespace();
        if !ws && prev_ws {
            starts.push(i);
        }
        prev_ws = ws;
    }
    starts
}

/// Find protected tokens in `text`, in order of appearance.
pub fn protected_tokens(text: &str) -> Vec<ProtectedToken> {
    let starts = word_starts(text);
    token_re()
        .find_iter(text)
        .map(|m| ProtectedToken {
            // a match always begins on a digit, so at least one word starts at or before it
            word_index: starts.partition_point(|&s| s <= m.start()).saturating_sub(1),
            text: m.as_str().to_string(),
        })
        .collect()
}

/// Put each token back at its recorded word index in `translated`.
///
/// Positions are assumed to survive translation, which is only a heuristic:
/// when the backend reorders or merges words the token may land on an
/// unrelated word. Indexes past the end of the translation are skipped.
/// Whenever at least one token exists the words are re-joined with single spaces.
pub fn restore_tokens(translated: &str, tokens: &[ProtectedToken]) -> String {
    let mut out = translated.to_string();
    for token in tokens {
        let mut words: Vec<&str> = out.split_whitespace().collect();
        if let Some(slot) = words.get_mut(token.word_index) {
            *slot = token.text.as_str();
        }
        out = words.join(" ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dates_and_ordinals_with_word_positions() {
        let tokens = protected_tokens("Ngày 15/3. đã hoàn thành bước 2.");
        assert_eq!(
            tokens,
            vec![
                ProtectedToken { word_index: 1, text: "15/3.".into() },
                ProtectedToken { word_index: 6, text: "2.".into() },
            ]
        );
    }

    #[test]
    fn token_glued_to_a_word_uses_that_word_index() {
        let tokens = protected_tokens("Mục1. kiểm tra");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].word_index, 0);
        assert_eq!(tokens[0].text, "1.");
    }

    #[test]
    fn no_tokens_leaves_translation_untouched() {
        assert_eq!(restore_tokens("Hello   world", &[]), "Hello   world");
        assert!(protected_tokens("Không có số").is_empty());
    }

    #[test]
    fn restore_overwrites_by_index_and_skips_out_of_range() {
        let tokens = vec![
            ProtectedToken { word_index: 1, text: "15/3.".into() },
            ProtectedToken { word_index: 9, text: "4.".into() },
        ];
        assert_eq!(
            restore_tokens("Day 15/3 has  been completed", &tokens),
            "Day 15/3. has been completed"
        );
    }
}
