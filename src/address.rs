use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\w+@\w+\.\w+").unwrap();
    static ref LINK_REGEX: Regex =
        Regex::new(r"(?i)\b(?:https?://[^\s<>]*|www\.\w+\.\w+)").unwrap();
}

/// Email-like and link-like substrings found in a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressCount {
    pub emails: usize,
    pub links: usize,
}

impl AddressCount {
    /// Both counts summed. A string matching both patterns is counted twice.
    pub fn total(&self) -> usize {
        self.emails + self.links
    }
}

pub struct AddressCounter;

impl AddressCounter {
    pub fn count(message: &str) -> AddressCount {
        AddressCount {
            emails: EMAIL_REGEX.find_iter(message).count(),
            links: LINK_REGEX.find_iter(message).count(),
        }
    }
}
