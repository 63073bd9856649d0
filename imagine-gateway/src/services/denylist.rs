//! Prompt denylist.
//!
//! Words are matched case-insensitively as whole words. Word boundaries are
//! ASCII: letters, digits and `_` are word characters, anything else
//! (punctuation, whitespace, accented letters) separates words. Case folding
//! is ASCII-only for ASCII entries, so look-alikes such as `ſ` do not match `s`.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct Denylist {
    entries: Vec<(String, Regex)>,
}

impl Denylist {
    /// Compile one matcher per word, preserving list order.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = words
            .into_iter()
            .filter_map(|word| {
                let word = word.as_ref().trim();
                if word.is_empty() {
                    return None;
                }
                let pattern = matcher_pattern(word);
                match Regex::new(&pattern) {
                    Ok(re) => Some((word.to_string(), re)),
                    Err(e) => {
                        tracing::warn!(word = %word, error = %e, "Skipping unusable denylist entry");
                        None
                    }
                }
            })
            .collect();

        Self { entries }
    }

    /// First denylisted word, in list order, that appears in `prompt`.
    pub fn find(&self, prompt: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, re)| re.is_match(prompt))
            .map(|(word, _)| word.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matcher_pattern(word: &str) -> String {
    let escaped = regex::escape(word);
    if word.is_ascii() {
        format!(r"(?i-u:\b{}\b)", escaped)
    } else {
        format!(r"(?i)(?-u:\b){}(?-u:\b)", escaped)
    }
}
