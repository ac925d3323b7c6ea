use crate::classifier::Reason;
use crate::config::Config;
use std::collections::HashMap;

pub const KEY_PREFIX: &str = "spam-words";

/// Source of localized strings supplied by the hosting application.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> Option<String>;
}

impl Translator for HashMap<String, String> {
    fn translate(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Translation table shipped with the crate.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Catalog for a language code, or `None` when no catalog ships for it.
    pub fn builtin(language: &str) -> Option<Self> {
        let table: &[(Reason, &str)] = match language.to_lowercase().as_str() {
            "en" | "english" => &[
                (Reason::Rejected, "Message rejected as spam."),
                (
                    Reason::SoftReject,
                    "Too many links or emails in the message body, please send an email instead.",
                ),
                (Reason::TooShort, "Message is too short."),
                (Reason::TooLong, "Message is too long."),
                (Reason::TooFewWords, "Message contains too few words."),
                (Reason::TooManyWords, "Message contains too many words."),
                (Reason::RegexMismatch, "Message does not match the required pattern."),
                (Reason::CustomValidationFailed, "Message failed custom validation."),
            ],
            "de" | "german" => &[
                (Reason::Rejected, "Nachricht als Spam abgelehnt."),
                (
                    Reason::SoftReject,
                    "Zu viele Links oder E-Mails in der Nachricht, bitte sende stattdessen eine E-Mail.",
                ),
                (Reason::TooShort, "Die Nachricht ist zu kurz."),
                (Reason::TooLong, "Die Nachricht ist zu lang."),
                (Reason::TooFewWords, "Die Nachricht enthält zu wenige Wörter."),
                (Reason::TooManyWords, "Die Nachricht enthält zu viele Wörter."),
                (
                    Reason::RegexMismatch,
                    "Die Nachricht entspricht nicht dem erforderlichen Muster.",
                ),
                (
                    Reason::CustomValidationFailed,
                    "Die Nachricht erfüllt die Anforderungen nicht.",
                ),
            ],
            _ => {
                log::warn!("No built-in translations for language: {language}");
                return None;
            }
        };

        let entries = table
            .iter()
            .map(|(reason, text)| (message_key(*reason), text.to_string()))
            .collect();
        Some(Self { entries })
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// `spam-words.msg.<reason>`
pub fn message_key(reason: Reason) -> String {
    format!("{KEY_PREFIX}.msg.{}", reason.key())
}

/// `spam-words.<reason>`, kept for translations written before the `msg.` namespace.
pub fn legacy_key(reason: Reason) -> String {
    format!("{KEY_PREFIX}.{}", reason.key())
}

pub fn default_message(reason: Reason) -> &'static str {
    match reason {
        Reason::Rejected => "Message rejected as spam.",
        Reason::SoftReject => {
            "Too many links or emails in the message body, please send an email instead."
        }
        Reason::RegexMismatch => "Message does not match the required pattern.",
        Reason::TooShort => "Message is too short.",
        Reason::TooLong => "Message is too long.",
        Reason::TooFewWords => "Message contains too few words.",
        Reason::TooManyWords => "Message contains too many words.",
        Reason::CustomValidationFailed => "Message failed custom validation.",
    }
}

/// Text shown to the submitter for a rejection reason.
///
/// Lookup order: silent reject, translation, legacy translation key, configured
/// fallback, built-in English default. Empty strings count as missing.
pub fn resolve_message(reason: Reason, config: &Config, translator: Option<&dyn Translator>) -> String {
    if config.silent_reject {
        return " ".to_string();
    }

    if let Some(translator) = translator {
        for key in [message_key(reason), legacy_key(reason)] {
            if let Some(message) = translator.translate(&key).filter(|m| !m.is_empty()) {
                return message;
            }
        }
    }

    config
        .fallback_message(reason.key())
        .unwrap_or_else(|| default_message(reason))
        .to_string()
}
