use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// English stop-words dropped during normalization. Checked against both the
/// surface token and its lemma so that repeated normalization is a no-op.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
        "just", "don", "should", "now",
    ]
    .into_iter()
    .collect()
});

/// Irregular noun forms that suffix rules cannot reach.
static IRREGULAR_LEMMAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("people", "person"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("vertices", "vertex"),
        ("analyses", "analysis"),
        ("hypotheses", "hypothesis"),
        ("theses", "thesis"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("data", "datum"),
    ]
    .into_iter()
    .collect()
});

/// Reduce a lowercase token to its dictionary base form.
///
/// Irregular forms are table-driven; everything else goes through ordered
/// plural-detachment rules. Every output is a fixed point of this function,
/// which is what makes [`TextNormalizer::normalize`] idempotent.
fn lemmatize(token: &str) -> String {
    if let Some(lemma) = IRREGULAR_LEMMAS.get(token) {
        return (*lemma).to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        if token.len() > 4 {
            return format!("{stem}y");
        }
    }

    for suffix in ["xes", "zes", "ches", "shes", "sses"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
        }
    }

    if token.len() > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }

    token.to_string()
}

/// Pure token-level cleaner for section body text.
///
/// Tokens are maximal alphanumeric runs (locale-agnostic, so punctuation and
/// symbols never survive), lowercased, stop-word filtered, lemmatized, and
/// rejoined with single spaces in their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let mut tokens = Vec::new();

        for raw in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let lower = raw.to_lowercase();
            if STOP_WORDS.contains(lower.as_str()) {
                continue;
            }

            let lemma = lemmatize(&lower);
            if STOP_WORDS.contains(lemma.as_str()) {
                continue;
            }

            tokens.push(lemma);
        }

        tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_and_punctuation_removed() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("The quick, brown fox jumps over the lazy dog!"),
            "quick brown fox jump lazy dog"
        );
    }

    #[test]
    fn test_stop_word_only_input_is_empty() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("the a an"), "");
    }

    #[test]
    fn test_order_preserved() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("gamma precedes delta"),
            "gamma precede delta"
        );
    }

    #[test]
    fn test_lemmatization_rules() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("graphs"), "graph");
        assert_eq!(lemmatize("analyses"), "analysis");
        assert_eq!(lemmatize("children"), "child");
        // Guarded endings stay intact.
        assert_eq!(lemmatize("corpus"), "corpus");
        assert_eq!(lemmatize("thesis"), "thesis");
        assert_eq!(lemmatize("class"), "class");
        assert_eq!(lemmatize("gas"), "gas");
    }

    #[test]
    fn test_lemmas_are_fixed_points() {
        for word in [
            "studies", "boxes", "churches", "classes", "graphs", "analyses", "children", "people",
            "matrices", "alpha",
        ] {
            let once = lemmatize(word);
            assert_eq!(lemmatize(&once), once, "lemma of {word} is not stable");
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = TextNormalizer::new();

        for input in [
            "The results of these studies were surprising, weren't they?",
            "alpha beta",
            "Sections 1, 2, and 3 cover the methods used by researchers.",
            "",
            "the a an",
        ] {
            let once = normalizer.normalize(input);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice, "normalize is not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_numbers_survive() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("in 1995 there were 42 cases"), "1995 42 case");
    }
}
