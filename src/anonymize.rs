use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Field names containing any of these are never written to the log.
const SENSITIVE_FIELD_MARKERS: &[&str] = &["password", "passwd", "token", "captcha", "csrf", "secret"];

/// Logged field values are cut to this many characters.
pub const MAX_FIELD_LENGTH: usize = 200;

/// Masks the host part of an IP address.
///
/// IPv4 loses its last octet (`203.0.113.55` → `203.0.113.0`). IPv6 keeps its
/// first four groups as written (`2001:db8:85a3:0000:…` → `2001:db8:85a3:0000::`);
/// compressed forms are expanded first. Anything that does not parse as an
/// address is returned unchanged.
pub fn anonymize_ip(ip: &str) -> String {
    let trimmed = ip.trim();
    if let Ok(v4) = trimmed.parse::<Ipv4Addr>() {
        let [a, b, c, _] = v4.octets();
        return Ipv4Addr::new(a, b, c, 0).to_string();
    }
    if let Ok(v6) = trimmed.parse::<Ipv6Addr>() {
        if !trimmed.contains("::") {
            let groups: Vec<&str> = trimmed.split(':').take(4).collect();
            return format!("{}::", groups.join(":"));
        }
        let s = v6.segments();
        return format!("{:x}:{:x}:{:x}:{:x}::", s[0], s[1], s[2], s[3]);
    }
    ip.to_string()
}

pub fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_lowercase();
    SENSITIVE_FIELD_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

/// Copy of the submitted fields that is safe to log.
pub fn redact_fields(fields: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter(|(name, _)| !is_sensitive_field(name))
        .map(|(name, value)| (name.clone(), truncate(value, MAX_FIELD_LENGTH)))
        .collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
