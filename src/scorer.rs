use crate::word_list::{normalize_word, WordList};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;

/// Contribution of one word list entry to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordMatch {
    pub weight: u32,
    pub count: u32,
    pub subtotal: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub total: u32,
    pub matches: BTreeMap<String, WordMatch>,
}

/// Word list with its boundary patterns built once, ready to score many messages.
#[derive(Debug, Clone, Default)]
pub struct CompiledWordList {
    entries: Vec<CompiledEntry>,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    word: String,
    weight: u32,
    pattern: Regex,
}

impl CompiledWordList {
    /// Entries whose pattern fails to build are skipped with a warning.
    pub fn compile(words: &WordList) -> Self {
        let mut entries: Vec<CompiledEntry> = words
            .iter()
            .filter_map(|(word, weight)| {
                boundary_pattern(word).map(|pattern| CompiledEntry {
                    word: word.to_string(),
                    weight,
                    pattern,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.word.cmp(&b.word));
        log::debug!("Compiled {} word list patterns", entries.len());
        Self { entries }
    }

    pub fn weight(&self, word: &str) -> Option<u32> {
        let word = normalize_word(word);
        self.entries
            .binary_search_by(|entry| entry.word.as_str().cmp(&word))
            .ok()
            .map(|index| self.entries[index].weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&WordList> for CompiledWordList {
    fn from(words: &WordList) -> Self {
        Self::compile(words)
    }
}

/// Case-insensitive `\b<word>\b`. List content is always escaped, so
/// phrases only get boundaries at their outer edges.
fn boundary_pattern(word: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
        .case_insensitive(true)
        .build()
        .map_err(|e| log::warn!("Skipping word list entry '{word}': {e}"))
        .ok()
}

pub struct SpamScorer;

impl SpamScorer {
    /// Sums `weight * occurrences` over every word list entry found in `message`.
    pub fn score(message: &str, words: &CompiledWordList) -> ScoreResult {
        let mut result = ScoreResult::default();

        for entry in &words.entries {
            let count = entry.pattern.find_iter(message).count() as u32;
            if count == 0 {
                continue;
            }

            let subtotal = count.saturating_mul(entry.weight);
            result.total = result.total.saturating_add(subtotal);
            result.matches.insert(
                entry.word.clone(),
                WordMatch {
                    weight: entry.weight,
                    count,
                    subtotal,
                },
            );
        }

        result
    }
}
