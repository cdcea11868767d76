use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Token substituted for words the embedding service does not know.
pub const UNKNOWN_TOKEN: &str = "unk";

/// Splits a label into comparable tokens.
///
/// Lowercases, strips diacritics (NFD decomposition with combining marks
/// dropped) and splits on whitespace.
///
/// # Examples
///
/// ```
/// use ontorec::embedding::tokenize;
///
/// assert_eq!(tokenize("Língua  Portuguesa"), vec!["lingua", "portuguesa"]);
/// assert!(tokenize("   ").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(tokenize("Ação CORAÇÃO"), vec!["acao", "coracao"]);
        assert_eq!(tokenize("Éléphant"), vec!["elephant"]);
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(tokenize("dog\tcat\nbird "), vec!["dog", "cat", "bird"]);
    }

    #[test]
    fn keeps_punctuation_inside_tokens() {
        assert_eq!(tokenize("has-part"), vec!["has-part"]);
    }
}
