//! Text normalization: lower-cases, tokenizes, drops stopwords and non-alphabetic
//! tokens, and reduces each surviving token to its base form.
//!
//! `AnalysisEngine` holds an `Arc<dyn Normalizer>` so tests (or a future
//! model-backed lemmatizer) can be swapped in without touching the scorers.

use crate::analysis::stopwords::is_stop_word;

/// Capability: turns free text into base-form tokens.
pub trait Normalizer: Send + Sync {
    /// Normalized tokens in document order. Empty input yields an empty vec.
    fn tokens(&self, text: &str) -> Vec<String>;

    /// Space-joined form of [`Normalizer::tokens`].
    fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Rule-based English normalizer: stopword list plus a suffix lemmatizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishNormalizer;

impl Normalizer for EnglishNormalizer {
    fn tokens(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        split_words(&lowered)
            .filter(|token| token.chars().all(char::is_alphabetic))
            .filter(|token| !is_stop_word(token))
            .map(lemmatize)
            .filter(|lemma| !is_stop_word(lemma))
            .collect()
    }
}

/// Splits on whitespace, hyphens and slashes, then trims surrounding punctuation.
/// Tokens with inner punctuation ("node.js", "c++") survive here and are dropped
/// later by the alphabetic filter.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == '\u{2013}')
        .map(|chunk| chunk.trim_matches(|c: char| c.is_ascii_punctuation() && c != '+' && c != '#'))
        .filter(|token| !token.is_empty())
}

const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("best", "good"),
    ("better", "good"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("built", "build"),
    ("children", "child"),
    ("did", "do"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("feet", "foot"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("held", "hold"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("men", "man"),
    ("people", "person"),
    ("ran", "run"),
    ("saw", "see"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("taught", "teach"),
    ("thought", "think"),
    ("understood", "understand"),
    ("women", "woman"),
    ("won", "win"),
    ("wrote", "write"),
    ("written", "write"),
];

/// Stem endings that take a trailing "e" back after `-ing`/`-ed` removal.
const E_RESTORING_ENDINGS: &[&str] = &["at", "bl", "iz", "ag", "uc", "rv", "ov", "iv", "ur"];

/// Reduces a lower-case alphabetic token to its dictionary base form.
pub fn lemmatize(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
        return (*lemma).to_string();
    }
    if word.chars().count() <= 3 {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("ing") {
        if stem.len() >= 3 && has_vowel(stem) {
            return restore_stem(stem);
        }
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ed") {
        if stem.len() >= 3 && has_vowel(stem) {
            return restore_stem(stem);
        }
        return word.to_string();
    }
    if word.ends_with("sses")
        || word.ends_with("xes")
        || word.ends_with("ches")
        || word.ends_with("shes")
    {
        return word[..word.len() - 2].to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !(stem.ends_with('s') || stem.ends_with('u') || stem.ends_with('i')) {
            return stem.to_string();
        }
    }

    word.to_string()
}

fn restore_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let len = bytes.len();
    let last = bytes[len - 1];
    if last == bytes[len - 2] && is_consonant(last) && !matches!(last, b'l' | b's' | b'z') {
        return stem[..len - 1].to_string();
    }
    if E_RESTORING_ENDINGS.iter().any(|ending| stem.ends_with(ending)) || is_short_cvc(bytes) {
        return format!("{stem}e");
    }
    stem.to_string()
}

/// A three-letter consonant-vowel-consonant stem ("mak", "cod") lost its "e".
fn is_short_cvc(bytes: &[u8]) -> bool {
    bytes.len() == 3
        && is_consonant(bytes[0])
        && !is_consonant(bytes[1])
        && is_consonant(bytes[2])
        && !matches!(bytes[2], b'w' | b'x' | b'y')
}

fn is_consonant(byte: u8) -> bool {
    byte.is_ascii_alphabetic() && !matches!(byte, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(text: &str) -> bool {
    text.bytes().any(|b| matches!(b, b'a' | b'e' | b'i' | b'o' | b'u' | b'y'))
}
