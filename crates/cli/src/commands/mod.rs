// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pios`/`pio` command implementations (spec §6 CLI surface).

pub mod pio;
pub mod pios;

/// Joins a trailing `-- --flag value ...` tail back into one string
/// for `rc_shell::tokenize`, since clap hands it to us pre-split.
pub fn rejoin_trailing(tail: &[String]) -> String {
    tail.iter()
        .map(|t| if t.contains(' ') { format!("\"{t}\"") } else { t.clone() })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    use std::io::Write;
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
