// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommands and their execution against an open settings store.

use std::collections::BTreeSet;
use std::io::Write;

use clap::{Subcommand, ValueEnum};
use prefkit_core::{PrefKind, PrefValue, PrefsError};
use prefkit_store::SettingsStore;
use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Prefs(#[from] PrefsError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Value kind as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    String,
    StringSet,
    Int,
    Bool,
}

impl From<KindArg> for PrefKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::String => PrefKind::String,
            KindArg::StringSet => PrefKind::StringSet,
            KindArg::Int => PrefKind::Int,
            KindArg::Bool => PrefKind::Bool,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the value stored under a key
    Get {
        key: String,
        /// Read through the typed accessor for this kind (fails on mismatch)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Value(s) to print when the key is unset; requires --kind
        #[arg(long, requires = "kind", allow_negative_numbers = true)]
        default: Vec<String>,
    },
    /// Store a value under a key
    Set {
        key: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        /// The value; string sets take any number of members
        #[arg(allow_negative_numbers = true)]
        values: Vec<String>,
    },
    /// Delete a key (no error if it is absent)
    Remove { key: String },
    /// Delete every key
    Clear,
    /// List all entries
    List {
        /// Emit the entries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute `command` against `store`, writing human-readable output to `out`.
pub fn run(store: &SettingsStore, command: Command, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::Get { key, kind, default } => match kind {
            None => match store.get(&key)? {
                Some(value) => writeln!(out, "{value}")?,
                None => tracing::info!(%key, "key is not set"),
            },
            Some(kind) => {
                let value = typed_get(store, &key, kind.into(), &default)?;
                writeln!(out, "{value}")?;
            }
        },
        Command::Set { key, kind, values } => {
            let value = parse_value(kind.into(), &values)?;
            store.save(&key, value)?;
        }
        Command::Remove { key } => store.remove(&key)?,
        Command::Clear => store.clear()?,
        Command::List { json } => {
            let entries = store.snapshot()?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else {
                for (key, value) in &entries {
                    writeln!(out, "{key} ({}) = {value}", value.kind())?;
                }
            }
        }
    }
    Ok(())
}

/// Read `key` through the accessor for `kind`, defaulting to `default`
/// (or the kind's zero value when no default was given).
fn typed_get(
    store: &SettingsStore,
    key: &str,
    kind: PrefKind,
    default: &[String],
) -> Result<PrefValue, CliError> {
    let default = if default.is_empty() {
        zero_value(kind)
    } else {
        parse_value(kind, default)?
    };

    Ok(match default {
        PrefValue::String(d) => PrefValue::String(store.get_string(key, &d)?),
        PrefValue::StringSet(d) => PrefValue::StringSet(store.get_string_set(key, d)?),
        PrefValue::Int(d) => PrefValue::Int(store.get_int(key, d)?),
        PrefValue::Bool(d) => PrefValue::Bool(store.get_bool(key, d)?),
    })
}

fn zero_value(kind: PrefKind) -> PrefValue {
    match kind {
        PrefKind::String => PrefValue::String(String::new()),
        PrefKind::StringSet => PrefValue::StringSet(BTreeSet::new()),
        PrefKind::Int => PrefValue::Int(0),
        PrefKind::Bool => PrefValue::Bool(false),
    }
}

/// Parse command-line words into a value of `kind`.
pub fn parse_value(kind: PrefKind, words: &[String]) -> Result<PrefValue, CliError> {
    match kind {
        PrefKind::StringSet => Ok(PrefValue::StringSet(words.iter().cloned().collect())),
        PrefKind::String => Ok(PrefValue::String(single_word(kind, words)?.clone())),
        PrefKind::Int => {
            let word = single_word(kind, words)?;
            word.parse::<i32>()
                .map(PrefValue::Int)
                .map_err(|e| CliError::InvalidValue(format!("{word:?} is not an int: {e}")))
        }
        PrefKind::Bool => match single_word(kind, words)?.as_str() {
            "true" => Ok(PrefValue::Bool(true)),
            "false" => Ok(PrefValue::Bool(false)),
            other => Err(CliError::InvalidValue(format!(
                "{other:?} is not a bool (use true or false)"
            ))),
        },
    }
}

fn single_word(kind: PrefKind, words: &[String]) -> Result<&String, CliError> {
    match words {
        [word] => Ok(word),
        _ => Err(CliError::InvalidValue(format!(
            "a {kind} takes exactly one value, got {}",
            words.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run_to_string(store: &SettingsStore, command: Command) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(store, command, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn parse_scalar_values() {
        assert_eq!(
            parse_value(PrefKind::Int, &words(&["-3"])).unwrap(),
            PrefValue::Int(-3)
        );
        assert_eq!(
            parse_value(PrefKind::Bool, &words(&["true"])).unwrap(),
            PrefValue::Bool(true)
        );
        assert!(parse_value(PrefKind::Bool, &words(&["yes"])).is_err());
        assert!(parse_value(PrefKind::Int, &words(&["1.5"])).is_err());
        assert!(parse_value(PrefKind::String, &words(&["a", "b"])).is_err());
        assert!(parse_value(PrefKind::String, &[]).is_err());
    }

    #[test]
    fn parse_string_set_accepts_any_arity() {
        assert_eq!(
            parse_value(PrefKind::StringSet, &[]).unwrap(),
            PrefValue::StringSet(BTreeSet::new())
        );
        let value = parse_value(PrefKind::StringSet, &words(&["b", "a", "b"])).unwrap();
        assert_eq!(value.to_string(), "{a, b}");
    }

    #[test]
    fn set_then_get_typed() {
        let store = SettingsStore::in_memory();
        run_to_string(
            &store,
            Command::Set {
                key: "retries".into(),
                kind: KindArg::Int,
                values: words(&["3"]),
            },
        )
        .unwrap();

        let out = run_to_string(
            &store,
            Command::Get {
                key: "retries".into(),
                kind: Some(KindArg::Int),
                default: vec![],
            },
        )
        .unwrap();
        assert_eq!(out, "3\n");
    }

    #[test]
    fn get_unset_uses_default() {
        let store = SettingsStore::in_memory();
        let out = run_to_string(
            &store,
            Command::Get {
                key: "theme".into(),
                kind: Some(KindArg::String),
                default: words(&["light"]),
            },
        )
        .unwrap();
        assert_eq!(out, "light\n");

        let untyped = run_to_string(
            &store,
            Command::Get {
                key: "theme".into(),
                kind: None,
                default: vec![],
            },
        )
        .unwrap();
        assert!(untyped.is_empty());
    }

    #[test]
    fn typed_get_of_wrong_kind_fails() {
        let store = SettingsStore::in_memory();
        store.save_bool("flag", true).unwrap();
        let err = run_to_string(
            &store,
            Command::Get {
                key: "flag".into(),
                kind: Some(KindArg::String),
                default: words(&["x"]),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Prefs(PrefsError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn list_plain_and_json() {
        let store = SettingsStore::in_memory();
        store.save_int("b", 2).unwrap();
        store.save_string_set("a", ["y", "x"]).unwrap();

        let plain = run_to_string(&store, Command::List { json: false }).unwrap();
        assert_eq!(plain, "a (string_set) = {x, y}\nb (int) = 2\n");

        let json = run_to_string(&store, Command::List { json: true }).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["b"]["kind"], "int");
        assert_eq!(parsed["b"]["value"], 2);
        assert_eq!(parsed["a"]["value"], serde_json::json!(["x", "y"]));
    }

    #[test]
    fn remove_and_clear() {
        let store = SettingsStore::in_memory();
        store.save_int("a", 1).unwrap();
        store.save_int("b", 2).unwrap();

        run_to_string(&store, Command::Remove { key: "a".into() }).unwrap();
        run_to_string(&store, Command::Remove { key: "a".into() }).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["b"]);

        run_to_string(&store, Command::Clear).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
