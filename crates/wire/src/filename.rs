// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Portable-filename predicate used for experiment-profile filenames
//! (spec §6).

/// ASCII letters, digits, `._-`, single interior spaces; no leading `.`
/// or `-`; not `.`/`..`; at most 255 bytes.
pub fn is_portable_filename(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name == "." || name == ".." {
        return false;
    }
    if name.starts_with('.') || name.starts_with('-') {
        return false;
    }
    let bytes = name.as_bytes();
    let mut prev_space = false;
    for (i, &b) in bytes.iter().enumerate() {
        let ok = b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b' ');
        if !ok {
            return false;
        }
        if b == b' ' {
            if prev_space || i == 0 || i == bytes.len() - 1 {
                return false;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    true
}

/// An experiment-profile filename: a portable filename ending in
/// `.yaml` or `.yml`.
pub fn is_profile_filename(name: &str) -> bool {
    is_portable_filename(name) && (name.ends_with(".yaml") || name.ends_with(".yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(is_portable_filename("my-profile.yaml"));
        assert!(is_portable_filename("My Profile v2.yaml"));
    }

    #[test]
    fn rejects_leading_dot_or_dash() {
        assert!(!is_portable_filename(".hidden.yaml"));
        assert!(!is_portable_filename("-flag.yaml"));
    }

    #[test]
    fn rejects_dot_and_dotdot() {
        assert!(!is_portable_filename("."));
        assert!(!is_portable_filename(".."));
    }

    #[test]
    fn rejects_double_or_trailing_spaces() {
        assert!(!is_portable_filename("a  b.yaml"));
        assert!(!is_portable_filename("trailing .yaml".trim_end_matches(".yaml")));
    }

    #[test]
    fn rejects_oversized_names() {
        let name = format!("{}.yaml", "a".repeat(255));
        assert!(!is_portable_filename(&name));
    }

    #[test]
    fn profile_filename_requires_yaml_extension() {
        assert!(is_profile_filename("growth.yaml"));
        assert!(is_profile_filename("growth.yml"));
        assert!(!is_profile_filename("growth.json"));
    }
}
