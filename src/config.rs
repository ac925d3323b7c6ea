use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Settings for one guard instance. Every bound, pattern and list is optional;
/// leaving one out disables the corresponding check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Master switch. When false every submission is accepted untouched.
    pub enabled: bool,
    pub min_addresses: usize,
    pub address_threshold: usize,
    pub spam_threshold: u32,

    pub use_word_lists: bool,
    pub word_list_paths: Vec<PathBuf>,
    pub word_list_cache: bool,
    /// Inline word lists keyed by weight. Merged after every file source, in
    /// ascending weight order: a word listed under two weights keeps the higher one.
    pub spam_words: BTreeMap<u32, Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_words: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
    pub custom_validator_failure: ValidatorFailurePolicy,

    pub silent_reject: bool,
    /// Form fields concatenated (in this order) into the checked message.
    pub fields: Vec<String>,
    /// Fallback rejection texts keyed by reason, used when no translation exists.
    pub messages: HashMap<String, String>,

    pub debug: bool,
    pub debug_log_file: PathBuf,
    pub log_fields: bool,
}

/// What to do when an injected custom validator returns an error instead of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorFailurePolicy {
    /// Treat the failure as a `custom-validation-failed` rejection.
    #[default]
    Reject,
    /// Surface the failure to the caller as a `GuardError`.
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            min_addresses: 1,
            address_threshold: 2,
            spam_threshold: 8,
            use_word_lists: true,
            word_list_paths: Vec::new(),
            word_list_cache: true,
            spam_words: BTreeMap::new(),
            regex_match: None,
            min_length: None,
            max_length: None,
            min_words: None,
            max_words: None,
            custom_validator_failure: ValidatorFailurePolicy::Reject,
            silent_reject: false,
            fields: vec!["message".to_string()],
            messages: HashMap::new(),
            debug: false,
            debug_log_file: default_debug_log_file(),
            log_fields: false,
        }
    }
}

fn default_debug_log_file() -> PathBuf {
    PathBuf::from("logs").join("spam-words.log")
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    /// Fallback text configured for a reason key, ignoring empty entries.
    pub fn fallback_message(&self, key: &str) -> Option<&str> {
        self.messages
            .get(key)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }
}
