use crate::cache::WordListCache;
use crate::classifier::{classify, total_score, Decision, Reason, Thresholds};
use crate::config::Config;
use crate::error::GuardError;
use crate::i18n::{resolve_message, Translator};
use crate::logger::{DiagnosticLogger, DiagnosticRecord, Observation, Status};
use crate::message::{Message, Submission};
use crate::scorer::{ScoreResult, SpamScorer};
use crate::validators::{CustomValidator, StructuralValidators};
use std::sync::Arc;

/// Outcome of checking one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub decision: Decision,
    /// Text for the submitter; only set when the message was not accepted.
    pub message: Option<String>,
    pub address_count: Option<usize>,
    pub score: Option<ScoreResult>,
}

impl Verdict {
    fn accept(address_count: Option<usize>, score: Option<ScoreResult>) -> Self {
        Self {
            decision: Decision::Accept,
            message: None,
            address_count,
            score,
        }
    }

    pub fn is_accept(&self) -> bool {
        self.decision.is_accept()
    }

    pub fn reason(&self) -> Option<Reason> {
        self.decision.reason()
    }
}

/// Spam check for free-text form submissions.
///
/// The configuration is fixed at construction; the word list cache handle can be
/// shared between guards so that they reuse the same merged lists.
pub struct SpamGuard {
    config: Config,
    thresholds: Thresholds,
    validators: StructuralValidators,
    word_lists: WordListCache,
    translator: Option<Arc<dyn Translator>>,
    logger: Option<DiagnosticLogger>,
}

impl SpamGuard {
    pub fn new(config: Config) -> Result<Self, GuardError> {
        let validators = StructuralValidators::from_config(&config)?;
        let logger = config
            .debug
            .then(|| DiagnosticLogger::new(config.debug_log_file.clone()));

        Ok(Self {
            thresholds: Thresholds::from(&config),
            validators,
            word_lists: WordListCache::default(),
            translator: None,
            logger,
            config,
        })
    }

    pub fn with_word_list_cache(mut self, cache: WordListCache) -> Self {
        self.word_lists = cache;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_custom_validator(mut self, validator: Arc<dyn CustomValidator>) -> Self {
        self.validators.set_custom_validator(validator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn check(&self, submission: &Submission) -> Result<Verdict, GuardError> {
        let message = Message::from_submission(submission, &self.config.fields);

        if !self.config.enabled {
            log::debug!("Spam guard disabled, accepting submission");
            return Ok(Verdict::accept(None, None));
        }

        if let Some(reason) = self.validators.check(&message)? {
            log::debug!("Structural check failed: {reason}");
            self.observe(submission, &message, Some(reason), None, None);
            return Ok(self.reject(Decision::Reject(reason), None, None));
        }

        let address_count = message.address_count();
        if address_count < self.thresholds.min_addresses {
            log::debug!(
                "{} addresses below minimum of {}, skipping word scoring",
                address_count,
                self.thresholds.min_addresses
            );
            self.observe(submission, &message, None, Some(address_count), None);
            return Ok(Verdict::accept(Some(address_count), None));
        }

        let words = self.word_lists.get(&self.config);
        let score = SpamScorer::score(message.text(), &words);
        let decision = classify(address_count, score.total, &self.thresholds);
        log::debug!(
            "Classified submission: addresses={}, spam_score={}, decision={:?}",
            address_count,
            score.total,
            decision
        );

        self.observe(
            submission,
            &message,
            decision.reason(),
            Some(address_count),
            Some(&score),
        );

        if decision.is_accept() {
            Ok(Verdict::accept(Some(address_count), Some(score)))
        } else {
            Ok(self.reject(decision, Some(address_count), Some(score)))
        }
    }

    fn reject(
        &self,
        decision: Decision,
        address_count: Option<usize>,
        score: Option<ScoreResult>,
    ) -> Verdict {
        let message = decision
            .reason()
            .map(|reason| resolve_message(reason, &self.config, self.translator.as_deref()));
        Verdict {
            decision,
            message,
            address_count,
            score,
        }
    }

    fn observe(
        &self,
        submission: &Submission,
        message: &Message,
        reason: Option<Reason>,
        address_count: Option<usize>,
        score: Option<&ScoreResult>,
    ) {
        let Some(logger) = &self.logger else {
            return;
        };

        let status = if reason.is_some() {
            Status::Rejected
        } else {
            Status::Passed
        };
        let total = match (address_count, score) {
            (Some(count), Some(score)) => Some(total_score(count, score.total)),
            _ => None,
        };

        let mut record = DiagnosticRecord::new(Observation {
            status,
            reason,
            message,
            address_count,
            score,
            total_score: total,
            thresholds: self.thresholds,
        });
        if self.config.log_fields {
            record = record.with_fields(submission);
        }
        logger.record(&record, submission.client_ip.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::ValidatorFailurePolicy;
    use crate::error::BoxError;
    use crate::i18n::Catalog;
    use std::collections::BTreeMap;
    use std::fs;

    fn inline_words() -> BTreeMap<u32, Vec<String>> {
        let mut words = BTreeMap::new();
        words.insert(1, vec!["promotion".to_string(), "free".to_string()]);
        words.insert(6, vec!["seo".to_string(), "marketing".to_string()]);
        words
    }

    fn test_config() -> Config {
        Config {
            use_word_lists: false,
            spam_words: inline_words(),
            ..Config::default()
        }
    }

    fn check(config: Config, text: &str) -> Verdict {
        SpamGuard::new(config)
            .unwrap()
            .check(&Submission::with_message(text))
            .unwrap()
    }

    #[test]
    fn test_address_only_acceptance() {
        let verdict = check(
            test_config(),
            "Promotion free mail@example.com https://www.example.com",
        );
        assert!(verdict.is_accept());
        assert_eq!(verdict.address_count, Some(2));
        assert_eq!(verdict.score.unwrap().total, 2);
        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_spam_rejection() {
        let verdict = check(test_config(), "Seo seo www.example.com");
        assert_eq!(verdict.decision, Decision::Reject(Reason::Rejected));
        assert_eq!(verdict.address_count, Some(1));
        assert_eq!(verdict.score.as_ref().unwrap().total, 12);
        assert_eq!(verdict.message.as_deref(), Some("Message rejected as spam."));
    }

    #[test]
    fn test_seo_promotion_stays_below_threshold() {
        // 1 address + 6 + 1 = 8, not above 8
        assert!(check(test_config(), "Seo promotion www.example.com").is_accept());
    }

    #[test]
    fn test_no_addresses_skips_scoring() {
        let verdict = check(test_config(), "Seo seo seo seo promotion free marketing");
        assert!(verdict.is_accept());
        assert_eq!(verdict.address_count, Some(0));
        assert!(verdict.score.is_none());
    }

    #[test]
    fn test_soft_reject_boundary() {
        let verdict = check(
            test_config(),
            "https://example.com, test@example.com, www.google.com",
        );
        assert_eq!(verdict.decision, Decision::SoftReject(Reason::SoftReject));
        assert_eq!(verdict.address_count, Some(3));
        assert_eq!(
            verdict.message.as_deref(),
            Some("Too many links or emails in the message body, please send an email instead.")
        );
    }

    #[test]
    fn test_too_many_addresses_rejects_outright() {
        let config = Config {
            spam_threshold: 100,
            ..test_config()
        };
        let verdict = check(
            config,
            "a@b.cd e@f.gh i@j.kl http://one.example www.two.example",
        );
        assert_eq!(verdict.address_count, Some(5));
        assert_eq!(verdict.decision, Decision::Reject(Reason::Rejected));
    }

    #[test]
    fn test_inline_weights_beat_builtin_lists() {
        let config = Config {
            use_word_lists: true,
            ..test_config()
        };
        // the builtin marketing list weighs seo at 3
        let verdict = check(config, "seo seo www.example.com");
        let score = verdict.score.unwrap();
        assert_eq!(score.matches["seo"].weight, 6);
        assert_eq!(verdict.decision, Decision::Reject(Reason::Rejected));
    }

    #[test]
    fn test_custom_words_below_and_above_threshold() {
        let mut words = BTreeMap::new();
        words.insert(7, vec!["cryptocurrency".to_string()]);
        let config = Config {
            use_word_lists: false,
            spam_words: words,
            ..Config::default()
        };
        let single = "Check out my amazing cryptocurrency investment opportunity http://example.com";
        assert!(check(config.clone(), single).is_accept());

        let double = "Amazing cryptocurrency and cryptocurrency technology http://example.com";
        assert!(!check(config, double).is_accept());
    }

    #[test]
    fn test_disabled_guard_accepts_everything() {
        let config = Config {
            enabled: false,
            min_length: Some(1000),
            ..test_config()
        };
        let verdict = check(config, "Seo seo seo www.a.com www.b.com www.c.com www.d.com www.e.com");
        assert_eq!(verdict, Verdict::accept(None, None));
    }

    #[test]
    fn test_structural_rejection_short_circuits_scoring() {
        let config = Config {
            max_words: Some(10),
            ..test_config()
        };
        let verdict = check(
            config,
            "This is a very long message with many many many many many many words http://example.com",
        );
        assert_eq!(verdict.decision, Decision::Reject(Reason::TooManyWords));
        assert!(verdict.score.is_none());
        assert!(verdict.address_count.is_none());
    }

    #[test]
    fn test_combined_validations_pass() {
        let config = Config {
            min_length: Some(20),
            max_length: Some(200),
            min_words: Some(5),
            max_words: Some(50),
            ..test_config()
        };
        let verdict = check(
            config,
            "This is a valid message with proper length and word count http://example.com",
        );
        assert!(verdict.is_accept());
    }

    #[test]
    fn test_silent_reject() {
        let config = Config {
            silent_reject: true,
            min_length: Some(3),
            ..test_config()
        };
        assert_eq!(
            check(config.clone(), "Seo seo www.example.com").message.as_deref(),
            Some(" ")
        );
        assert_eq!(check(config, "Hi").message.as_deref(), Some(" "));
    }

    #[test]
    fn test_translator_used_for_rejections() {
        let guard = SpamGuard::new(test_config())
            .unwrap()
            .with_translator(Arc::new(Catalog::builtin("de").unwrap()));
        let verdict = guard
            .check(&Submission::with_message("Seo seo www.example.com"))
            .unwrap();
        assert_eq!(verdict.message.as_deref(), Some("Nachricht als Spam abgelehnt."));
    }

    #[test]
    fn test_custom_validator_injection() {
        let guard = SpamGuard::new(test_config())
            .unwrap()
            .with_custom_validator(Arc::new(|message: &Message| -> Result<bool, BoxError> {
                Ok(message.text().starts_with("Dear"))
            }));

        let accepted = guard.check(&Submission::with_message("Dear team, hello")).unwrap();
        assert!(accepted.is_accept());

        let rejected = guard.check(&Submission::with_message("hello")).unwrap();
        assert_eq!(
            rejected.decision,
            Decision::Reject(Reason::CustomValidationFailed)
        );
        assert_eq!(
            rejected.message.as_deref(),
            Some("Message failed custom validation.")
        );
    }

    #[test]
    fn test_custom_validator_error_policy_propagates() {
        let config = Config {
            custom_validator_failure: ValidatorFailurePolicy::Error,
            ..test_config()
        };
        let guard = SpamGuard::new(config)
            .unwrap()
            .with_custom_validator(Arc::new(|_: &Message| -> Result<bool, BoxError> {
                Err("lookup timed out".into())
            }));
        let result = guard.check(&Submission::with_message("hello"));
        assert!(matches!(result, Err(GuardError::CustomValidator(_))));
    }

    #[test]
    fn test_malformed_pattern_fails_construction() {
        let config = Config {
            regex_match: Some("(unclosed".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            SpamGuard::new(config),
            Err(GuardError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_multiple_fields_are_checked_together() {
        let config = Config {
            fields: vec!["message".to_string(), "website".to_string()],
            ..test_config()
        };
        let submission = Submission::with_message("Seo seo").field("website", "www.example.com");
        let verdict = SpamGuard::new(config).unwrap().check(&submission).unwrap();
        assert_eq!(verdict.address_count, Some(1));
        assert_eq!(verdict.decision, Decision::Reject(Reason::Rejected));
    }

    #[test]
    fn test_shared_cache_between_guards() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom_9.txt");
        fs::write(&file, "widget\n").unwrap();
        let config = Config {
            use_word_lists: false,
            word_list_paths: vec![file.clone()],
            ..Config::default()
        };

        let backend = Arc::new(MemoryCache::new());
        let first = SpamGuard::new(config.clone())
            .unwrap()
            .with_word_list_cache(WordListCache::new(backend.clone()));
        assert!(!first
            .check(&Submission::with_message("widget www.example.com"))
            .unwrap()
            .is_accept());

        // the second guard sees the cached list, not the edited file
        fs::write(&file, "gadget\n").unwrap();
        let second = SpamGuard::new(config)
            .unwrap()
            .with_word_list_cache(WordListCache::new(backend.clone()));
        let verdict = second
            .check(&Submission::with_message("gadget www.example.com"))
            .unwrap();
        assert!(verdict.is_accept());
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_debug_log_written_for_each_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("spam.log");
        let config = Config {
            debug: true,
            debug_log_file: log_file.clone(),
            log_fields: true,
            min_length: Some(5),
            ..test_config()
        };
        let guard = SpamGuard::new(config).unwrap();

        let spam = Submission::with_message("Seo seo www.example.com")
            .field("password", "hunter2")
            .client_ip("203.0.113.55");
        guard.check(&spam).unwrap();
        guard.check(&Submission::with_message("Hi")).unwrap();
        guard
            .check(&Submission::with_message("Hello there, nice site"))
            .unwrap();

        let content = fs::read_to_string(&log_file).unwrap();
        assert_eq!(content.matches("] IP: ").count(), 3);
        assert!(content.contains("IP: 203.0.113.0\n"));
        assert!(content.contains(r#""reason": "spam_score""#));
        assert!(content.contains(r#""reason": "too-short""#));
        assert!(content.contains(r#""status": "passed""#));
        assert!(!content.contains("hunter2"));
    }

    #[test]
    fn test_more_spam_words_never_lower_the_outcome() {
        let guard = SpamGuard::new(test_config()).unwrap();
        let mut text = String::from("www.example.com");
        let mut was_rejected = false;
        for _ in 0..4 {
            text.push_str(" marketing");
            let rejected = !guard.check(&Submission::with_message(text.as_str())).unwrap().is_accept();
            assert!(rejected || !was_rejected);
            was_rejected = rejected;
        }
        assert!(was_rejected);
    }

    #[test]
    fn test_guard_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpamGuard>();
    }

    #[test]
    fn test_repeated_checks_are_identical() {
        let guard = SpamGuard::new(test_config()).unwrap();
        let submission = Submission::with_message("Promotion free mail@example.com https://www.example.com");
        assert_eq!(
            guard.check(&submission).unwrap(),
            guard.check(&submission).unwrap()
        );
    }
}
