use crate::anonymize::{anonymize_ip, redact_fields};
use crate::classifier::{Reason, Thresholds};
use crate::message::{Message, Submission};
use crate::scorer::{ScoreResult, WordMatch};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Rejected,
}

/// Body of one diagnostic log block. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub status: Status,
    pub reason: Option<String>,
    pub checked_fields: Vec<String>,
    pub message_length: usize,
    pub word_count: usize,
    pub address_count: Option<usize>,
    pub spam_score: Option<u32>,
    pub total_score: Option<u32>,
    pub min_addresses: usize,
    pub address_threshold: usize,
    pub spam_threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_words: Option<BTreeMap<String, WordMatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Inputs for [`DiagnosticRecord::new`]; the parts of a classification that are known so far.
pub struct Observation<'a> {
    pub status: Status,
    pub reason: Option<Reason>,
    pub message: &'a Message,
    pub address_count: Option<usize>,
    pub score: Option<&'a ScoreResult>,
    pub total_score: Option<u32>,
    pub thresholds: Thresholds,
}

impl DiagnosticRecord {
    pub fn new(observation: Observation<'_>) -> Self {
        Self {
            status: observation.status,
            reason: observation.reason.map(|reason| log_reason(reason).to_string()),
            checked_fields: observation.message.checked_fields().to_vec(),
            message_length: observation.message.length(),
            word_count: observation.message.word_count(),
            address_count: observation.address_count,
            spam_score: observation.score.map(|score| score.total),
            total_score: observation.total_score,
            min_addresses: observation.thresholds.min_addresses,
            address_threshold: observation.thresholds.address_threshold,
            spam_threshold: observation.thresholds.spam_threshold,
            matched_words: observation.score.map(|score| score.matches.clone()),
            fields: None,
        }
    }

    pub fn with_fields(mut self, submission: &Submission) -> Self {
        self.fields = Some(redact_fields(&submission.fields));
        self
    }
}

/// Spam outcomes are logged by the signal that caused them.
fn log_reason(reason: Reason) -> &'static str {
    match reason {
        Reason::Rejected => "spam_score",
        Reason::SoftReject => "address_count",
        other => other.key(),
    }
}

/// Append-only debug log. Failures to write are reported through `log` and
/// never reach the caller.
#[derive(Debug)]
pub struct DiagnosticLogger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DiagnosticLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, record: &DiagnosticRecord, client_ip: Option<&str>) {
        let entry = match format_entry(record, client_ip) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to serialize diagnostic record: {e}");
                return;
            }
        };

        // One write per block keeps concurrent records from interleaving
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.append(entry.as_bytes()) {
            log::warn!(
                "Failed to write diagnostic log {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn append(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)
    }
}

pub fn format_entry(record: &DiagnosticRecord, client_ip: Option<&str>) -> serde_json::Result<String> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let ip = anonymize_ip(client_ip.unwrap_or("unknown"));
    let body = serde_json::to_string_pretty(record)?;
    Ok(format!("[{timestamp}] IP: {ip}\n{body}\n\n"))
}
