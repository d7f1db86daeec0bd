// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config.ini` / `config_<unit>.ini` validation rules (spec §4.7, §6).
//!
//! Parsing is a small hand-rolled strict scanner (`parse_strict`), not
//! an off-the-shelf INI crate: spec §6 requires duplicate sections and
//! duplicate options within a section to *reject* the update, which is
//! not how general-purpose INI parsers behave (most silently let the
//! last occurrence win). The scanner only needs to recognize
//! `[section]` headers and `key = value` lines, so a few dozen lines
//! over `str::lines` fully covers the grammar this format actually
//! has. This module also encodes the cluster's additional contract:
//! required sections/fields, the `http(s)://` address rejection, and
//! Unicode dash normalization.

use thiserror::Error;

const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("cluster.topology", "leader_hostname"),
    ("cluster.topology", "leader_address"),
];
const REQUIRED_SECTIONS: &[&str] = &["mqtt"];
const ADDRESS_LIKE_FIELDS: &[(&str, &str)] = &[
    ("cluster.topology", "leader_address"),
    ("mqtt", "broker_address"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required field(s): {0}")]
    MissingFields(String),
    #[error("Duplicate section or option in INI: {0}")]
    Duplicate(String),
    #[error("Addresses may not be URLs (found {field} = {value})")]
    UrlAddress { field: String, value: String },
    #[error("Malformed INI: {0}")]
    Malformed(String),
}

/// Replace Unicode en dash (U+2013) and em dash (U+2014) with an ASCII
/// hyphen-minus. Users routinely paste these from word processors into
/// hostnames/addresses.
pub fn normalize_dashes(input: &str) -> String {
    input.replace('\u{2013}', "-").replace('\u{2014}', "-")
}

/// Validate (and normalize) a proposed `config.ini`/`config_<unit>.ini`
/// body. Returns the normalized text on success.
pub fn validate_config_ini(raw: &str) -> Result<String, ConfigError> {
    let normalized = normalize_dashes(raw);
    let sections = parse_strict(&normalized)?;

    let mut missing = Vec::new();
    for (section, key) in REQUIRED_FIELDS {
        let present = sections
            .get(*section)
            .map(|kv| kv.iter().any(|(k, v)| k == key && !v.trim().is_empty()))
            .unwrap_or(false);
        if !present {
            missing.push(format!("{section}.{key}"));
        }
    }
    for section in REQUIRED_SECTIONS {
        if !sections.contains_key(*section) {
            missing.push((*section).to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ConfigError::MissingFields(missing.join(", ")));
    }

    for (section, key) in ADDRESS_LIKE_FIELDS {
        if let Some(value) = sections.get(*section).and_then(|kv| kv.iter().find(|(k, _)| k == key)) {
            let v = value.1.trim();
            if v.starts_with("http://") || v.starts_with("https://") {
                return Err(ConfigError::UrlAddress {
                    field: format!("{section}.{key}"),
                    value: v.to_string(),
                });
            }
        }
    }

    Ok(normalized)
}

/// A minimal strict INI parser: rejects duplicate sections and
/// duplicate options within a section (spec §6: "duplicate
/// sections/options reject the update").
fn parse_strict(text: &str) -> Result<indexmap::IndexMap<String, Vec<(String, String)>>, ConfigError> {
    let mut sections: indexmap::IndexMap<String, Vec<(String, String)>> = indexmap::IndexMap::new();
    let mut current: Option<String> = None;

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                return Err(ConfigError::Malformed(format!("line {}: bad section header", lineno + 1)));
            };
            if sections.contains_key(name) {
                return Err(ConfigError::Duplicate(format!("section [{name}]")));
            }
            sections.insert(name.to_string(), Vec::new());
            current = Some(name.to_string());
            continue;
        }
        let Some(section) = current.as_ref() else {
            return Err(ConfigError::Malformed(format!("line {}: option outside any section", lineno + 1)));
        };
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Malformed(format!("line {}: expected key = value", lineno + 1)));
        };
        let key = key.trim().to_string();
        let value = value.trim().to_string();
        let entries = sections.entry(section.clone()).or_default();
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(ConfigError::Duplicate(format!("[{section}] {key}")));
        }
        entries.push((key, value));
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
[cluster.topology]
leader_hostname = leader
leader_address = 192.168.1.5

[mqtt]
broker_address = 192.168.1.5
";

    #[test]
    fn accepts_a_config_with_all_required_sections() {
        assert!(validate_config_ini(VALID).is_ok());
    }

    #[test]
    fn rejects_missing_mqtt_section() {
        let missing_mqtt = "[cluster.topology]\nleader_hostname = leader\nleader_address = 1.2.3.4\n";
        let err = validate_config_ini(missing_mqtt).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFields(ref f) if f.contains("mqtt")));
    }

    #[test]
    fn rejects_duplicate_sections() {
        let dup = format!("{VALID}\n[mqtt]\nbroker_address = 1.2.3.4\n");
        assert!(matches!(validate_config_ini(&dup), Err(ConfigError::Duplicate(_))));
    }

    #[test]
    fn rejects_duplicate_keys_within_a_section() {
        let dup = "[cluster.topology]\nleader_hostname = a\nleader_hostname = b\nleader_address = 1\n\n[mqtt]\nbroker_address=1\n";
        assert!(matches!(validate_config_ini(dup), Err(ConfigError::Duplicate(_))));
    }

    #[test]
    fn rejects_http_url_as_an_address() {
        let bad = VALID.replace("192.168.1.5\n\n[mqtt]", "http://192.168.1.5\n\n[mqtt]");
        assert!(matches!(validate_config_ini(&bad), Err(ConfigError::UrlAddress { .. })));
    }

    #[test]
    fn normalizes_en_and_em_dashes_to_hyphen_minus() {
        let with_en_dash = VALID.replace("192.168.1.5", "192\u{2013}168\u{2013}1\u{2013}5_host");
        let normalized = validate_config_ini(&with_en_dash).unwrap();
        assert!(!normalized.contains('\u{2013}'));
        assert!(normalized.contains("192-168-1-5_host"));
    }
}
