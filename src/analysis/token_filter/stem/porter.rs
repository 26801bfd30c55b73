//! Porter stemming algorithm implementation.
//!
//! The stemmer applies a series of rewrite rules in five steps:
//! 1. Plurals and -ed/-ing suffixes
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! Input is lowercased first. Words containing non-ASCII characters are
//! returned unchanged, since the rules are defined over English letters.
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::token_filter::stem::Stemmer;
//! use tessera::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("watered"), "water");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

const STEP2_SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_SUFFIXES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Porter stemming algorithm implementation.
#[derive(Debug, Clone, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Check if the byte at `pos` is a vowel. `y` counts as a vowel when it
    /// follows a consonant.
    fn is_vowel(word: &[u8], pos: usize) -> bool {
        if pos >= word.len() {
            return false;
        }

        match word[pos] {
            b'a' | b'e' | b'i' | b'o' | b'u' => true,
            b'y' if pos > 0 => !Self::is_vowel(word, pos - 1),
            _ => false,
        }
    }

    /// Calculate the measure of a word (number of VC sequences).
    fn measure(word: &[u8]) -> usize {
        let mut m = 0;
        let n = word.len();
        let mut i = 0;

        while i < n && !Self::is_vowel(word, i) {
            i += 1;
        }

        while i < n {
            while i < n && Self::is_vowel(word, i) {
                i += 1;
            }

            if i >= n {
                break;
            }

            m += 1;

            while i < n && !Self::is_vowel(word, i) {
                i += 1;
            }
        }

        m
    }

    fn contains_vowel(word: &[u8]) -> bool {
        (0..word.len()).any(|i| Self::is_vowel(word, i))
    }

    fn ends_with_double_consonant(word: &[u8]) -> bool {
        let len = word.len();
        len >= 2 && word[len - 1] == word[len - 2] && !Self::is_vowel(word, len - 1)
    }

    /// Consonant-vowel-consonant ending where the last consonant is not
    /// w, x or y.
    fn ends_cvc(word: &[u8]) -> bool {
        let len = word.len();
        if len < 3 {
            return false;
        }

        !Self::is_vowel(word, len - 3)
            && Self::is_vowel(word, len - 2)
            && !Self::is_vowel(word, len - 1)
            && !matches!(word[len - 1], b'w' | b'x' | b'y')
    }

    /// Replace `old_suffix` with `new_suffix` when the remaining stem has a
    /// measure of at least `min_measure`.
    fn replace_suffix(word: &mut Vec<u8>, old_suffix: &str, new_suffix: &str, min_measure: usize) {
        let stem_len = word.len() - old_suffix.len();
        if Self::measure(&word[..stem_len]) >= min_measure {
            word.truncate(stem_len);
            word.extend_from_slice(new_suffix.as_bytes());
        }
    }

    fn step1a(word: &mut Vec<u8>) {
        if word.ends_with(b"sses") || word.ends_with(b"ies") {
            word.truncate(word.len() - 2);
        } else if word.ends_with(b"s") && !word.ends_with(b"ss") && word.len() > 1 {
            word.pop();
        }
    }

    fn step1b(word: &mut Vec<u8>) {
        let original_len = word.len();

        if word.ends_with(b"eed") {
            Self::replace_suffix(word, "eed", "ee", 1);
        } else if word.ends_with(b"ed") {
            if Self::contains_vowel(&word[..word.len() - 2]) {
                word.truncate(word.len() - 2);
            }
        } else if word.ends_with(b"ing") && Self::contains_vowel(&word[..word.len() - 3]) {
            word.truncate(word.len() - 3);
        }

        if word.len() == original_len {
            return;
        }

        if word.ends_with(b"at") || word.ends_with(b"bl") || word.ends_with(b"iz") {
            word.push(b'e');
        } else if Self::ends_with_double_consonant(word)
            && !matches!(word.last(), Some(b'l') | Some(b's') | Some(b'z'))
        {
            word.pop();
        } else if Self::measure(word) == 1 && Self::ends_cvc(word) {
            word.push(b'e');
        }
    }

    fn step2(word: &mut Vec<u8>) {
        if let Some((old_suffix, new_suffix)) = STEP2_SUFFIXES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix.as_bytes()))
        {
            Self::replace_suffix(word, old_suffix, new_suffix, 1);
        }
    }

    fn step3(word: &mut Vec<u8>) {
        if let Some((old_suffix, new_suffix)) = STEP3_SUFFIXES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix.as_bytes()))
        {
            Self::replace_suffix(word, old_suffix, new_suffix, 1);
        }
    }

    fn step4(word: &mut Vec<u8>) {
        for suffix in STEP4_SUFFIXES {
            if !word.ends_with(suffix.as_bytes()) {
                continue;
            }
            let stem = &word[..word.len() - suffix.len()];
            if Self::measure(stem) > 1
                && (*suffix != "ion" || stem.ends_with(b"s") || stem.ends_with(b"t"))
            {
                let stem_len = stem.len();
                word.truncate(stem_len);
                return;
            }
        }
    }

    fn step5(word: &mut Vec<u8>) {
        if word.ends_with(b"e") {
            let stem = &word[..word.len() - 1];
            let m = Self::measure(stem);
            if m > 1 || (m == 1 && !Self::ends_cvc(stem)) {
                word.pop();
            }
        }

        if word.ends_with(b"ll") && Self::measure(word) > 1 {
            word.pop();
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if !word.is_ascii() {
            return word.to_string();
        }

        let lowered = word.to_ascii_lowercase();
        if lowered.len() <= 2 {
            return lowered;
        }

        let mut bytes = lowered.into_bytes();
        Self::step1a(&mut bytes);
        Self::step1b(&mut bytes);
        Self::step2(&mut bytes);
        Self::step3(&mut bytes);
        Self::step4(&mut bytes);
        Self::step5(&mut bytes);

        // Every rule only removes or appends ASCII letters.
        String::from_utf8(bytes).unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}
