use crate::reference::ReferenceData;

#[derive(Debug)]
pub struct NameNormalizer<'a> {
    uppercase_names: &'a [String],
    connector_words: &'a [String],
}

impl<'a> NameNormalizer<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self {
            uppercase_names: &reference.uppercase_names,
            connector_words: &reference.connector_words,
        }
    }

    /// True for a name written entirely in capitals that is not an allow-listed
    /// all-uppercase name.
    pub fn needs_case_correction(&self, name: &str) -> bool {
        let trimmed = name.trim();
        if self.uppercase_names.iter().any(|allowed| allowed == trimmed) {
            return false;
        }

        let mut has_cased = false;
        for ch in trimmed.chars() {
            if ch.is_lowercase() {
                return false;
            }
            has_cased |= ch.is_uppercase();
        }
        has_cased
    }

    pub fn to_title_case(&self, name: &str) -> String {
        name.split_whitespace()
            .enumerate()
            .map(|(position, word)| {
                let lower = word.to_lowercase();
                if position > 0 && self.connector_words.iter().any(|stop| *stop == lower) {
                    lower
                } else {
                    capitalise(&lower)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn normalize(&self, name: &str) -> String {
        if self.needs_case_correction(name) {
            self.to_title_case(name)
        } else {
            name.trim().to_string()
        }
    }
}

/// Uppercases the first letter of the word and of each hyphen- or bracket-separated part.
fn capitalise(word: &str) -> String {
    let mut output = String::with_capacity(word.len());
    let mut at_start = true;
    for ch in word.chars() {
        if at_start && ch.is_alphabetic() {
            output.extend(ch.to_uppercase());
            at_start = false;
        } else {
            output.push(ch);
            if matches!(ch, '-' | '(') {
                at_start = true;
            }
        }
    }
    output
}
