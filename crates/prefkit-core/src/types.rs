// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for stored preference values.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four kinds of value a settings store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefKind {
    String,
    StringSet,
    Int,
    Bool,
}

impl PrefKind {
    /// Stable name used in storage rows and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefKind::String => "string",
            PrefKind::StringSet => "string_set",
            PrefKind::Int => "int",
            PrefKind::Bool => "bool",
        }
    }
}

impl fmt::Display for PrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrefKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(PrefKind::String),
            "string_set" => Ok(PrefKind::StringSet),
            "int" => Ok(PrefKind::Int),
            "bool" => Ok(PrefKind::Bool),
            other => Err(format!("unknown preference kind: {other}")),
        }
    }
}

/// A stored preference value, tagged with its kind.
///
/// String sets have membership semantics only; `BTreeSet` is used so that
/// persisted and printed forms are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    String(String),
    StringSet(BTreeSet<String>),
    Int(i32),
    Bool(bool),
}

impl PrefValue {
    pub fn kind(&self) -> PrefKind {
        match self {
            PrefValue::String(_) => PrefKind::String,
            PrefValue::StringSet(_) => PrefKind::StringSet,
            PrefValue::Int(_) => PrefKind::Int,
            PrefValue::Bool(_) => PrefKind::Bool,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::String(s) => f.write_str(s),
            PrefValue::StringSet(set) => {
                let items: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            PrefValue::Int(n) => write!(f, "{n}"),
            PrefValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_owned())
    }
}

impl From<BTreeSet<String>> for PrefValue {
    fn from(value: BTreeSet<String>) -> Self {
        PrefValue::StringSet(value)
    }
}

impl From<i32> for PrefValue {
    fn from(value: i32) -> Self {
        PrefValue::Int(value)
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}
