use crate::address::{AddressCount, AddressCounter};
use std::cell::OnceCell;
use std::collections::BTreeMap;

/// Form fields as submitted, plus the caller's address when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub fields: BTreeMap<String, String>,
    pub client_ip: Option<String>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(text: impl Into<String>) -> Self {
        Self::new().field("message", text)
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }
}

/// The text under test. Derived attributes are computed on first use.
#[derive(Debug, Clone)]
pub struct Message {
    text: String,
    checked_fields: Vec<String>,
    length: OnceCell<usize>,
    word_count: OnceCell<usize>,
    addresses: OnceCell<AddressCount>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked_fields: Vec::new(),
            length: OnceCell::new(),
            word_count: OnceCell::new(),
            addresses: OnceCell::new(),
        }
    }

    /// Joins the configured fields, in configured order, with newlines.
    /// Missing and empty fields are skipped.
    pub fn from_submission(submission: &Submission, field_names: &[String]) -> Self {
        let mut parts = Vec::new();
        let mut checked_fields = Vec::new();
        for name in field_names {
            if let Some(value) = submission.fields.get(name).filter(|v| !v.is_empty()) {
                parts.push(value.as_str());
                checked_fields.push(name.clone());
            }
        }

        let mut message = Self::new(parts.join("\n"));
        message.checked_fields = checked_fields;
        message
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn checked_fields(&self) -> &[String] {
        &self.checked_fields
    }

    /// Length in characters.
    pub fn length(&self) -> usize {
        *self.length.get_or_init(|| self.text.chars().count())
    }

    /// Number of whitespace-delimited words.
    pub fn word_count(&self) -> usize {
        *self
            .word_count
            .get_or_init(|| self.text.split_whitespace().count())
    }

    pub fn addresses(&self) -> AddressCount {
        *self
            .addresses
            .get_or_init(|| AddressCounter::count(&self.text))
    }

    pub fn address_count(&self) -> usize {
        self.addresses().total()
    }
}
