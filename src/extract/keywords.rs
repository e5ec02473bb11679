// src/extract/keywords.rs
//! Legal-domain keyword matching against a fixed embedded vocabulary.

use once_cell::sync::Lazy;

static VOCABULARY: Lazy<Vec<String>> = Lazy::new(|| {
    let raw = include_str!("../../legal_keywords.json");
    serde_json::from_str::<Vec<String>>(raw).expect("valid legal keyword vocabulary")
});

/// Case-insensitive substring match over the vocabulary. Returns the matched
/// vocabulary terms; uniqueness follows from vocabulary uniqueness.
pub fn match_keywords(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    VOCABULARY
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        let out = match_keywords("The AFFIDAVIT and the Court Order were served.");
        assert!(out.contains(&"affidavit".to_string()));
        assert!(out.contains(&"court order".to_string()));
    }

    #[test]
    fn multiword_terms_match_as_substrings() {
        let out = match_keywords("We argued the best interests of the child standard.");
        assert!(out.contains(&"best interests of the child".to_string()));
    }

    #[test]
    fn no_matches_on_unrelated_text() {
        assert!(match_keywords("grocery list: apples, bread").is_empty());
    }
}
