// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a tokenized CLI tail into the `{args, options, env,
//! config_overrides}` shape of a run-job payload (spec §6, §4.10).
//! Targeting flags (`--units`, `--experiments`) and CLI-level switches
//! (`--json`, `-y`) are parsed by the `pios`/`pio` binaries' own
//! `clap` struct, not here — this module only handles the job's own
//! free-form flags.

use crate::token::Token;
use indexmap::IndexMap;
use serde_json::Value;
use std::iter::Peekable;
use std::slice::Iter;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub options: IndexMap<String, Value>,
    pub env: IndexMap<String, String>,
    pub config_overrides: Vec<(String, String, String)>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("--env requires a KEY=VALUE argument")]
    MissingEnvValue,
    #[error("--env argument {0:?} is not KEY=VALUE")]
    MalformedEnv(String),
    #[error("--config requires a section.key=value argument")]
    MissingConfigValue,
    #[error("--config argument {0:?} is not section.key=value")]
    MalformedConfig(String),
}

/// Parse an already-tokenized CLI tail.
pub fn parse_invocation(tokens: &[Token]) -> Result<Invocation, InvocationError> {
    let mut inv = Invocation::default();
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => inv.args.push(w.clone()),
            Token::Flag { name, value: Some(v) } if name == "env" => {
                insert_env(&mut inv, v)?;
            }
            Token::Flag { name, value: None } if name == "env" => {
                let v = next_word(&mut iter).ok_or(InvocationError::MissingEnvValue)?;
                insert_env(&mut inv, &v)?;
            }
            Token::Flag { name, value: Some(v) } if name == "config" => {
                insert_config_override(&mut inv, v)?;
            }
            Token::Flag { name, value: None } if name == "config" => {
                let v = next_word(&mut iter).ok_or(InvocationError::MissingConfigValue)?;
                insert_config_override(&mut inv, &v)?;
            }
            Token::Flag { name, value: Some(v) } => {
                inv.options.insert(name.clone(), parse_scalar(v));
            }
            Token::Flag { name, value: None } => {
                // A trailing bare word becomes this flag's value unless
                // the next token is itself a flag, in which case this
                // one is a boolean switch.
                if let Some(Token::Word(w)) = iter.next_if(|t| matches!(t, Token::Word(_))) {
                    inv.options.insert(name.clone(), parse_scalar(w));
                } else {
                    inv.options.insert(name.clone(), Value::Bool(true));
                }
            }
        }
    }
    Ok(inv)
}

fn next_word(iter: &mut Peekable<Iter<Token>>) -> Option<String> {
    match iter.next()? {
        Token::Word(w) => Some(w.clone()),
        Token::Flag { name, value: None } => Some(format!("--{name}")),
        Token::Flag { name, value: Some(v) } => Some(format!("--{name}={v}")),
    }
}

fn insert_env(inv: &mut Invocation, raw: &str) -> Result<(), InvocationError> {
    let (k, v) = raw.split_once('=').ok_or_else(|| InvocationError::MalformedEnv(raw.to_string()))?;
    inv.env.insert(k.to_string(), v.to_string());
    Ok(())
}

fn insert_config_override(inv: &mut Invocation, raw: &str) -> Result<(), InvocationError> {
    let (path, value) = raw.split_once('=').ok_or_else(|| InvocationError::MalformedConfig(raw.to_string()))?;
    let (section, key) = path.split_once('.').ok_or_else(|| InvocationError::MalformedConfig(raw.to_string()))?;
    inv.config_overrides.push((section.to_string(), key.to_string(), value.to_string()));
    Ok(())
}

/// Best-effort scalar coercion for option values: booleans and
/// integers parse as such so `RunJobPayload::options_as_flags` renders
/// them sensibly; everything else stays a string.
fn parse_scalar(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn parse(s: &str) -> Invocation {
        parse_invocation(&tokenize(s).unwrap()).unwrap()
    }

    #[test]
    fn bare_words_become_positional_args() {
        let inv = parse("foo bar");
        assert_eq!(inv.args, vec!["foo", "bar"]);
    }

    #[test]
    fn flag_followed_by_word_becomes_an_option() {
        let inv = parse("--target-rpm 10");
        assert_eq!(inv.options.get("target-rpm"), Some(&Value::from(10)));
    }

    #[test]
    fn flag_at_end_is_a_boolean_switch() {
        let inv = parse("--skip-first-run");
        assert_eq!(inv.options.get("skip-first-run"), Some(&Value::Bool(true)));
    }

    #[test]
    fn inline_equals_value_is_parsed_too() {
        let inv = parse("--target-rpm=10.5");
        assert_eq!(inv.options.get("target-rpm"), Some(&Value::from(10.5)));
    }

    #[test]
    fn env_flag_populates_the_env_map() {
        let inv = parse("--env EXPERIMENT=exp1 --env FOO=bar");
        assert_eq!(inv.env.get("EXPERIMENT").map(String::as_str), Some("exp1"));
        assert_eq!(inv.env.get("FOO").map(String::as_str), Some("bar"));
    }

    #[test]
    fn malformed_env_is_an_error() {
        let err = parse_invocation(&tokenize("--env nope").unwrap()).unwrap_err();
        assert_eq!(err, InvocationError::MalformedEnv("nope".to_string()));
    }

    #[test]
    fn config_flag_populates_config_overrides() {
        let inv = parse("--config stirring.target_rpm=10");
        assert_eq!(inv.config_overrides, vec![("stirring".to_string(), "target_rpm".to_string(), "10".to_string())]);
    }

    #[test]
    fn preserves_insertion_order_of_options() {
        let inv = parse("--b 1 --a 2");
        let keys: Vec<&String> = inv.options.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
