//! Key-term extraction from raw study text.
//!
//! Salient vocabulary feeds both prompt construction and fallback synthesis,
//! so extraction never fails outward: text with no usable tokens yields a
//! fixed placeholder sequence instead.

use std::collections::HashMap;

/// Maximum number of key terms returned.
const MAX_TERMS: usize = 10;

/// Substituted when the text yields no usable vocabulary.
pub const PLACEHOLDER_TERMS: [&str; 5] = ["term1", "term2", "term3", "term4", "term5"];

/// Common English words carrying no topical weight.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "s", "same", "she", "should", "so", "some", "such", "t", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Extract up to ten key terms, ranked by frequency with ties broken by
/// first occurrence. Tokens are lowercased; non-alphanumeric characters act
/// as separators, so every returned term is purely alphanumeric.
pub fn extract_key_terms(text: &str) -> Vec<String> {
    let mut stats: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0usize;

    for sentence in text.split(['.', '!', '?']) {
        for token in sentence.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let word = token.to_lowercase();
            if STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            let entry = stats.entry(word).or_insert((0, position));
            entry.0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = stats
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let terms: Vec<String> = ranked.into_iter().take(MAX_TERMS).map(|(w, _, _)| w).collect();
    if terms.is_empty() {
        PLACEHOLDER_TERMS.iter().map(|t| t.to_string()).collect()
    } else {
        terms
    }
}
