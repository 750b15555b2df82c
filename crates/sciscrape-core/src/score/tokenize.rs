use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word pattern is valid"));

/// Tokens of a full document, page texts in page order.
///
/// Each page is trimmed and lower-cased, every run of non-word characters
/// collapses to one space, and the result is split on single spaces. A page
/// that begins or ends with punctuation therefore contributes an empty
/// token; those are kept unless `drop_empty` is set.
pub fn tokenize_pages<I, S>(pages: I, drop_empty: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();

    for page in pages {
        let lowered = page.as_ref().trim().to_lowercase();
        let cleaned = NON_WORD.replace_all(&lowered, " ");
        tokens.extend(
            cleaned
                .split(' ')
                .filter(|t| !drop_empty || !t.is_empty())
                .map(String::from),
        );
    }

    tokens
}

/// Tokens of a literal abstract: trimmed, lower-cased, split on single
/// spaces. Punctuation stays attached to its word.
pub fn tokenize_abstract(text: &str, drop_empty: bool) -> Vec<String> {
    text.trim()
        .to_lowercase()
        .split(' ')
        .filter(|t| !drop_empty || !t.is_empty())
        .map(String::from)
        .collect()
}
