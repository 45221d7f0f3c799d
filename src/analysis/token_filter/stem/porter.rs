//! Porter stemming algorithm implementation.
//!
//! The stemmer applies the five rewrite steps of Porter (1980):
//! 1. Plurals, -ed/-ing suffixes and terminal y
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! Words containing anything but ASCII letters are returned lowercased but
//! otherwise unchanged (numbers, codes, non-Latin scripts).
//!
//! # Examples
//!
//! ```
//! use djmir::analysis::token_filter::stem::Stemmer;
//! use djmir::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("flies"), "fli");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

/// Porter stemming algorithm implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Check if the byte at `pos` acts as a vowel.
    fn is_vowel(word: &[u8], pos: usize) -> bool {
        match word[pos] {
            b'a' | b'e' | b'i' | b'o' | b'u' => true,
            b'y' => pos > 0 && !Self::is_vowel(word, pos - 1),
            _ => false,
        }
    }

    /// Calculate the measure of a word (number of VC sequences).
    fn measure(word: &[u8]) -> usize {
        let n = word.len();
        let mut m = 0;
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

    /// Consonant-vowel-consonant ending where the last consonant is not w, x or y.
    fn ends_cvc(word: &[u8]) -> bool {
        let len = word.len();
        len >= 3
            && !Self::is_vowel(word, len - 3)
            && Self::is_vowel(word, len - 2)
            && !Self::is_vowel(word, len - 1)
            && !matches!(word[len - 1], b'w' | b'x' | b'y')
    }

    /// Replace `old_suffix` with `new_suffix` when the remaining stem has measure > `min_measure`.
    fn replace_suffix(word: &mut Vec<u8>, old_suffix: &[u8], new_suffix: &[u8], min_measure: usize) {
        let stem_len = word.len() - old_suffix.len();
        if Self::measure(&word[..stem_len]) > min_measure {
            word.truncate(stem_len);
            word.extend_from_slice(new_suffix);
        }
    }

    fn step1a(word: &mut Vec<u8>) {
        if word.ends_with(b"sses") || word.ends_with(b"ies") {
            word.truncate(word.len() - 2);
        } else if word.ends_with(b"ss") {
        } else if word.ends_with(b"s") && word.len() > 1 {
            word.truncate(word.len() - 1);
        }
    }

    fn step1b(word: &mut Vec<u8>) {
        if word.ends_with(b"eed") {
            Self::replace_suffix(word, b"eed", b"ee", 0);
            return;
        }

        let suffix_len = if word.ends_with(b"ed") {
            2
        } else if word.ends_with(b"ing") {
            3
        } else {
            return;
        };

        let stem_len = word.len() - suffix_len;
        if !Self::contains_vowel(&word[..stem_len]) {
            return;
        }
        word.truncate(stem_len);

        if word.ends_with(b"at") || word.ends_with(b"bl") || word.ends_with(b"iz") {
            word.push(b'e');
        } else if Self::ends_with_double_consonant(word)
            && !matches!(word[word.len() - 1], b'l' | b's' | b'z')
        {
            word.truncate(word.len() - 1);
        } else if Self::measure(word) == 1 && Self::ends_cvc(word) {
            word.push(b'e');
        }
    }

    fn step1c(word: &mut [u8]) {
        let len = word.len();
        if len > 1 && word[len - 1] == b'y' && Self::contains_vowel(&word[..len - 1]) {
            word[len - 1] = b'i';
        }
    }

    fn step2(word: &mut Vec<u8>) {
        const SUFFIXES: &[(&[u8], &[u8])] = &[
            (b"ational", b"ate"),
            (b"tional", b"tion"),
            (b"enci", b"ence"),
            (b"anci", b"ance"),
            (b"izer", b"ize"),
            (b"abli", b"able"),
            (b"alli", b"al"),
            (b"entli", b"ent"),
            (b"eli", b"e"),
            (b"ousli", b"ous"),
            (b"ization", b"ize"),
            (b"ation", b"ate"),
            (b"ator", b"ate"),
            (b"alism", b"al"),
            (b"iveness", b"ive"),
            (b"fulness", b"ful"),
            (b"ousness", b"ous"),
            (b"aliti", b"al"),
            (b"iviti", b"ive"),
            (b"biliti", b"ble"),
        ];

        if let Some((old, new)) = SUFFIXES.iter().find(|(old, _)| word.ends_with(old)) {
            Self::replace_suffix(word, old, new, 0);
        }
    }

    fn step3(word: &mut Vec<u8>) {
        const SUFFIXES: &[(&[u8], &[u8])] = &[
            (b"icate", b"ic"),
            (b"ative", b""),
            (b"alize", b"al"),
            (b"iciti", b"ic"),
            (b"ical", b"ic"),
            (b"ful", b""),
            (b"ness", b""),
        ];

        if let Some((old, new)) = SUFFIXES.iter().find(|(old, _)| word.ends_with(old)) {
            Self::replace_suffix(word, old, new, 0);
        }
    }

    fn step4(word: &mut Vec<u8>) {
        const SUFFIXES: &[&[u8]] = &[
            b"al", b"ance", b"ence", b"er", b"ic", b"able", b"ible", b"ant", b"ement", b"ment",
            b"ent", b"ion", b"ou", b"ism", b"ate", b"iti", b"ous", b"ive", b"ize",
        ];

        // Longest matching suffix wins ("ement" before "ment" before "ent").
        let Some(suffix) = SUFFIXES
            .iter()
            .filter(|suffix| word.ends_with(suffix))
            .max_by_key(|suffix| suffix.len())
        else {
            return;
        };

        let stem = &word[..word.len() - suffix.len()];
        if Self::measure(stem) <= 1 {
            return;
        }
        if *suffix == b"ion" && !(stem.ends_with(b"s") || stem.ends_with(b"t")) {
            return;
        }
        let stem_len = stem.len();
        word.truncate(stem_len);
    }

    fn step5(word: &mut Vec<u8>) {
        if word.ends_with(b"e") {
            let stem = &word[..word.len() - 1];
            let m = Self::measure(stem);
            if m > 1 || (m == 1 && !Self::ends_cvc(stem)) {
                word.truncate(word.len() - 1);
            }
        }

        if word.ends_with(b"ll") && Self::measure(word) > 1 {
            word.truncate(word.len() - 1);
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let lowered = word.to_lowercase();
        if lowered.len() <= 2 || !lowered.bytes().all(|b| b.is_ascii_lowercase()) {
            return lowered;
        }

        let mut bytes = lowered.into_bytes();
        Self::step1a(&mut bytes);
        Self::step1b(&mut bytes);
        Self::step1c(&mut bytes);
        Self::step2(&mut bytes);
        Self::step3(&mut bytes);
        Self::step4(&mut bytes);
        Self::step5(&mut bytes);

        // Only ASCII letters were written above.
        String::from_utf8(bytes).unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porter_stemmer() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("flies"), "fli");
        assert_eq!(stemmer.stem("agreed"), "agre");
        assert_eq!(stemmer.stem("measuring"), "measur");
        assert_eq!(stemmer.stem("traditional"), "tradit");
        assert_eq!(stemmer.stem("happy"), "happi");
        assert_eq!(stemmer.stem("caresses"), "caress");
        assert_eq!(stemmer.stem("fever"), "fever");
    }

    #[test]
    fn test_porter_measure() {
        assert_eq!(PorterStemmer::measure(b"tree"), 0);
        assert_eq!(PorterStemmer::measure(b"trees"), 1);
        assert_eq!(PorterStemmer::measure(b"trouble"), 1);
        assert_eq!(PorterStemmer::measure(b"troubles"), 2);
    }

    #[test]
    fn test_non_ascii_and_numbers_untouched() {
        let stemmer = PorterStemmer::new();
        assert_eq!(stemmer.stem("H1N1"), "h1n1");
        assert_eq!(stemmer.stem("Fièvres"), "fièvres");
    }

    #[test]
    fn test_plural_and_singular_agree() {
        let stemmer = PorterStemmer::new();
        assert_eq!(stemmer.stem("headaches"), stemmer.stem("headache"));
    }
}
