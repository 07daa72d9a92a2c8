use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\b[a-z0-9]+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by",
            "for","from",
            "had","has","have","he","how",
            "in","is","it","its",
            "of","on",
            "that","the","they","this","to",
            "was","what","when","where","which","who","why","will","with",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into index terms: lowercase, take ASCII alphanumeric runs
/// bounded by word boundaries, drop stopwords. A run touching any other word
/// character (`_`, non-ASCII letters) is not a token.
///
/// The returned order is the document order; a term's position is its index
/// in this vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// The first term `text` normalizes to, if any. Single-term lookups use only
/// this term and ignore the rest of the input.
pub fn first_term(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .find(|token| !is_stopword(token))
        .map(str::to_string)
}

/// Normalize every input string and flatten the results into one term list.
pub fn tokenize_all<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    inputs.iter().flat_map(|s| tokenize(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The Quick BROWN fox");
        assert_eq!(t, vec!["quick", "brown", "fox"]);
    }

    #[test]
    fn punctuation_separates_tokens() {
        assert_eq!(tokenize("full-text, e.mail;x1"), vec!["full", "text", "e", "mail", "x1"]);
    }

    #[test]
    fn first_term_skips_stopwords() {
        assert_eq!(first_term("the inverted index").as_deref(), Some("inverted"));
        assert_eq!(first_term("is the"), None);
        assert_eq!(first_term(""), None);
    }

    #[test]
    fn underscore_and_accents_block_a_token() {
        assert_eq!(tokenize("snake_case index"), vec!["index"]);
        assert_eq!(first_term("snake_case index").as_deref(), Some("index"));
        assert_eq!(first_term("café"), None);
    }

    #[test]
    fn tokenize_all_flattens() {
        let t = tokenize_all(&["inverted index", "", "of", "Search"]);
        assert_eq!(t, vec!["inverted", "index", "search"]);
    }
}
