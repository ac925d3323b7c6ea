use crate::classifier::Reason;
use crate::config::{Config, ValidatorFailurePolicy};
use crate::error::{BoxError, GuardError};
use crate::message::Message;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied check run after the built-in structural checks.
/// `Ok(true)` accepts, `Ok(false)` rejects.
pub trait CustomValidator: Send + Sync {
    fn validate(&self, message: &Message) -> Result<bool, BoxError>;
}

impl<F> CustomValidator for F
where
    F: Fn(&Message) -> Result<bool, BoxError> + Send + Sync,
{
    fn validate(&self, message: &Message) -> Result<bool, BoxError> {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Bounds {
    fn new(name: &'static str, min: Option<usize>, max: Option<usize>) -> Result<Self, GuardError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(GuardError::InvalidBounds { name, min, max });
            }
        }
        Ok(Self { min, max })
    }

    fn check(&self, value: usize, below: Reason, above: Reason) -> Option<Reason> {
        if self.min.is_some_and(|min| value < min) {
            return Some(below);
        }
        if self.max.is_some_and(|max| value > max) {
            return Some(above);
        }
        None
    }
}

/// Pattern, length, word count and custom checks, run in that order.
#[derive(Clone, Default)]
pub struct StructuralValidators {
    pattern: Option<Regex>,
    length: Bounds,
    words: Bounds,
    custom: Option<Arc<dyn CustomValidator>>,
    failure_policy: ValidatorFailurePolicy,
}

impl fmt::Debug for StructuralValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidators")
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("length", &self.length)
            .field("words", &self.words)
            .field("custom", &self.custom.is_some())
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl StructuralValidators {
    /// Compiles the configured pattern and checks the bounds. A malformed
    /// pattern is a configuration error rather than a per-message outcome.
    pub fn from_config(config: &Config) -> Result<Self, GuardError> {
        let pattern = match config.regex_match.as_deref().filter(|p| !p.is_empty()) {
            Some(pattern) => Some(compile_whole_match(pattern)?),
            None => None,
        };

        Ok(Self {
            pattern,
            length: Bounds::new("length", config.min_length, config.max_length)?,
            words: Bounds::new("words", config.min_words, config.max_words)?,
            custom: None,
            failure_policy: config.custom_validator_failure,
        })
    }

    pub fn set_custom_validator(&mut self, validator: Arc<dyn CustomValidator>) {
        self.custom = Some(validator);
    }

    /// Returns the first failing check, if any.
    pub fn check(&self, message: &Message) -> Result<Option<Reason>, GuardError> {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(message.text()) {
                return Ok(Some(Reason::RegexMismatch));
            }
        }

        if let Some(reason) = self
            .length
            .check(message.length(), Reason::TooShort, Reason::TooLong)
        {
            return Ok(Some(reason));
        }

        if let Some(reason) =
            self.words
                .check(message.word_count(), Reason::TooFewWords, Reason::TooManyWords)
        {
            return Ok(Some(reason));
        }

        if let Some(custom) = &self.custom {
            return match custom.validate(message) {
                Ok(true) => Ok(None),
                Ok(false) => Ok(Some(Reason::CustomValidationFailed)),
                Err(e) => match self.failure_policy {
                    ValidatorFailurePolicy::Reject => {
                        log::warn!("Custom validator failed, rejecting message: {e}");
                        Ok(Some(Reason::CustomValidationFailed))
                    }
                    ValidatorFailurePolicy::Error => Err(GuardError::CustomValidator(e)),
                },
            };
        }

        Ok(None)
    }
}

/// The whole message has to match, so the pattern is anchored on both ends.
fn compile_whole_match(pattern: &str) -> Result<Regex, GuardError> {
    let invalid = |source| GuardError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    };
    // Validate the pattern on its own first so errors point at the user's text
    Regex::new(pattern).map_err(invalid)?;
    Regex::new(&format!(r"\A(?:{pattern})\z")).map_err(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validators(config: Config) -> StructuralValidators {
        StructuralValidators::from_config(&config).unwrap()
    }

    fn check(validators: &StructuralValidators, text: &str) -> Option<Reason> {
        validators.check(&Message::new(text)).unwrap()
    }

    #[test]
    fn test_nothing_configured_passes() {
        assert_eq!(check(&validators(Config::default()), "x"), None);
    }

    #[test]
    fn test_pattern_must_match_whole_message() {
        let v = validators(Config {
            regex_match: Some(r"[a-zA-Z0-9\s:/.\-]+".to_string()),
            ..Config::default()
        });
        assert_eq!(check(&v, "This is a valid message with http://example.com"), None);
        assert_eq!(
            check(&v, "Invalid message with special chars: äöü!@#$%"),
            Some(Reason::RegexMismatch)
        );
    }

    #[test]
    fn test_empty_pattern_is_disabled() {
        let v = validators(Config {
            regex_match: Some(String::new()),
            ..Config::default()
        });
        assert_eq!(check(&v, "anything !!"), None);
    }

    #[test]
    fn test_malformed_pattern_is_a_config_error() {
        let result = StructuralValidators::from_config(&Config {
            regex_match: Some("([a-z".to_string()),
            ..Config::default()
        });
        assert!(matches!(result, Err(GuardError::InvalidPattern { .. })));
    }

    #[test]
    fn test_length_bounds_count_characters() {
        let v = validators(Config {
            min_length: Some(5),
            max_length: Some(6),
            ..Config::default()
        });
        assert_eq!(check(&v, "Küß"), Some(Reason::TooShort));
        assert_eq!(check(&v, "Grüße!"), None);
        assert_eq!(check(&v, "Grüße!!"), Some(Reason::TooLong));
    }

    #[test]
    fn test_word_bounds() {
        let v = validators(Config {
            min_words: Some(3),
            max_words: Some(5),
            ..Config::default()
        });
        assert_eq!(check(&v, "Too few"), Some(Reason::TooFewWords));
        assert_eq!(check(&v, "just   enough\nwords here"), None);
        assert_eq!(check(&v, "one two three four five six"), Some(Reason::TooManyWords));
    }

    #[test]
    fn test_inverted_bounds_rejected_at_construction() {
        let result = StructuralValidators::from_config(&Config {
            min_words: Some(10),
            max_words: Some(2),
            ..Config::default()
        });
        assert!(matches!(
            result,
            Err(GuardError::InvalidBounds { name: "words", .. })
        ));
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        let v = validators(Config {
            regex_match: Some("[a-z]+".to_string()),
            min_length: Some(50),
            min_words: Some(10),
            ..Config::default()
        });
        assert_eq!(check(&v, "SHORT"), Some(Reason::RegexMismatch));
        assert_eq!(check(&v, "short"), Some(Reason::TooShort));
    }

    #[test]
    fn test_custom_validator_verdicts() {
        let mut v = validators(Config::default());
        v.set_custom_validator(Arc::new(|message: &Message| -> Result<bool, BoxError> {
            Ok(!message.text().contains("forbidden"))
        }));
        assert_eq!(check(&v, "all good"), None);
        assert_eq!(
            check(&v, "a forbidden word"),
            Some(Reason::CustomValidationFailed)
        );
    }

    #[test]
    fn test_custom_validator_runs_last() {
        let mut v = validators(Config {
            max_length: Some(3),
            ..Config::default()
        });
        v.set_custom_validator(Arc::new(|_: &Message| -> Result<bool, BoxError> {
            panic!("custom validator should not run")
        }));
        assert_eq!(check(&v, "too long"), Some(Reason::TooLong));
    }

    #[test]
    fn test_custom_validator_failure_policy() {
        let failing = |_: &Message| -> Result<bool, BoxError> { Err("backend down".into()) };

        let mut reject = validators(Config::default());
        reject.set_custom_validator(Arc::new(failing));
        assert_eq!(check(&reject, "hello"), Some(Reason::CustomValidationFailed));

        let mut error = validators(Config {
            custom_validator_failure: ValidatorFailurePolicy::Error,
            ..Config::default()
        });
        error.set_custom_validator(Arc::new(failing));
        let result = error.check(&Message::new("hello"));
        assert!(matches!(result, Err(GuardError::CustomValidator(_))));
    }
}
