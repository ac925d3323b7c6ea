use crate::config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists shipped with the crate. The digit before the extension is the weight.
const BUILTIN_LISTS: &[(&str, &str)] = &[
    ("adult_5.txt", include_str!("../lists/adult_5.txt")),
    ("finance_2.txt", include_str!("../lists/finance_2.txt")),
    ("generic_1.txt", include_str!("../lists/generic_1.txt")),
    ("marketing_3.txt", include_str!("../lists/marketing_3.txt")),
    ("pharma_4.txt", include_str!("../lists/pharma_4.txt")),
];

const LIST_EXTENSION: &str = "txt";

/// Merged mapping of normalized word or phrase to weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordList {
    entries: HashMap<String, u32>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or overwrites) an entry. Blank words are ignored, zero weights become 1.
    pub fn insert(&mut self, word: &str, weight: u32) {
        let word = normalize_word(word);
        if word.is_empty() {
            return;
        }
        self.entries.insert(word, weight.max(1));
    }

    /// Adds every line of a list file's content with the same weight.
    pub fn insert_lines(&mut self, content: &str, weight: u32) {
        for line in content.lines() {
            self.insert(line, weight);
        }
    }

    /// Merges `other` into `self`; entries of `other` win on collision.
    pub fn merge(&mut self, other: WordList) {
        self.entries.extend(other.entries);
    }

    pub fn weight(&self, word: &str) -> Option<u32> {
        self.entries.get(&normalize_word(word)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(word, weight)| (word.as_str(), *weight))
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for WordList {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut list = WordList::new();
        for (word, weight) in iter {
            list.insert(word.as_ref(), weight);
        }
        list
    }
}

pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Weight encoded in a list identifier: the character right before the extension.
/// `marketing_3.txt` weighs 3; a zero or a non-digit falls back to 1.
pub fn weight_from_identifier(identifier: &str) -> u32 {
    Path::new(identifier)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.chars().last())
        .and_then(|c| c.to_digit(10))
        .filter(|weight| *weight > 0)
        .unwrap_or(1)
}

/// Builds the merged word list from built-in lists, custom paths and inline config.
#[derive(Debug, Clone, Default)]
pub struct WordListStore;

impl WordListStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, config: &Config) -> WordList {
        let mut words = WordList::new();

        if config.use_word_lists {
            words.merge(Self::builtin_lists());
        }

        for path in &config.word_list_paths {
            words.merge(Self::load_path(path));
        }

        words.merge(Self::inline_words(config));

        log::debug!(
            "Loaded {} spam words ({} custom paths, {} inline weights)",
            words.len(),
            config.word_list_paths.len(),
            config.spam_words.len()
        );
        words
    }

    pub fn builtin_lists() -> WordList {
        let mut words = WordList::new();
        for (identifier, content) in BUILTIN_LISTS {
            words.insert_lines(content, weight_from_identifier(identifier));
        }
        words
    }

    fn inline_words(config: &Config) -> WordList {
        let mut words = WordList::new();
        // Ascending weights, so a repeated word ends up with its highest weight
        for (weight, entries) in &config.spam_words {
            for word in entries {
                words.insert(word, *weight);
            }
        }
        words
    }

    /// Loads a single list file or every list file in a directory.
    /// Missing or unreadable sources are skipped.
    pub fn load_path(path: &Path) -> WordList {
        if path.is_file() {
            Self::load_file(path).unwrap_or_default()
        } else if path.is_dir() {
            let mut words = WordList::new();
            for file in Self::list_files(path) {
                if let Some(list) = Self::load_file(&file) {
                    words.merge(list);
                }
            }
            words
        } else {
            log::warn!("Word list path not found, skipping: {}", path.display());
            WordList::new()
        }
    }

    fn load_file(path: &Path) -> Option<WordList> {
        let identifier = path.file_name()?.to_string_lossy();
        let weight = weight_from_identifier(&identifier);
        match fs::read_to_string(path) {
            Ok(content) => {
                let mut words = WordList::new();
                words.insert_lines(&content, weight);
                Some(words)
            }
            Err(e) => {
                log::warn!("Failed to read word list {}: {}", path.display(), e);
                None
            }
        }
    }

    fn list_files(dir: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read word list directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == LIST_EXTENSION)
            })
            .collect();

        // Later files override earlier ones, so the order has to be stable
        files.sort();
        files
    }
}
