// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversions between camelCase, kebab-case and snake_case identifiers.
//!
//! Runs of capital letters are treated as one word until the next lowercase
//! letter, at which point the last capital starts a new word:
//!
//! | camelCase        | kebab-case         |
//! |------------------|--------------------|
//! | `MAC`            | `mac`              |
//! | `remoteURL`      | `remote-url`       |
//! | `remoteURLID`    | `remote-urlid`     |
//! | `remoteURLId`    | `remote-url-id`    |
//! | `randomSQLText`  | `random-sql-text`  |
//! | `ONETestString`  | `one-test-string`  |
//! | `ONEtestString`  | `on-etest-string`  |
//! | `oneTestSTRING`  | `one-test-string`  |
//!
//! Only the letter case decides: in `remoteURLId` the `I` is followed by a
//! lowercase letter, so it opens a new word and the result is
//! `remote-url-id`, not `remote-urlid`.
//!
//! The `ONEtestString` row is a known quirk of the rule. Existing
//! configuration files depend on this exact table, so it is kept as is.

/// A separator-based naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    /// `words-joined-by-hyphens`
    Kebab,
    /// `words_joined_by_underscores`
    Snake,
}

impl NamingConvention {
    /// The character that joins words in this convention.
    pub const fn separator(self) -> char {
        match self {
            NamingConvention::Kebab => '-',
            NamingConvention::Snake => '_',
        }
    }

    /// Converts a camelCase identifier into this convention.
    pub fn from_camel(self, name: &str) -> String {
        camel_to_separated(name, self.separator())
    }

    /// Converts an identifier in this convention back into camelCase.
    pub fn to_camel(self, name: &str) -> String {
        separated_to_camel(name, self.separator())
    }
}

/// `remoteURLText` -> `remote-url-text`
pub fn to_kebab(name: &str) -> String {
    NamingConvention::Kebab.from_camel(name)
}

/// `remoteURLText` -> `remote_url_text`
pub fn to_snake(name: &str) -> String {
    NamingConvention::Snake.from_camel(name)
}

/// `command-timeout` -> `commandTimeout`
pub fn from_kebab(name: &str) -> String {
    NamingConvention::Kebab.to_camel(name)
}

/// `command_timeout` -> `commandTimeout`
pub fn from_snake(name: &str) -> String {
    NamingConvention::Snake.to_camel(name)
}

/// Splits a camelCase identifier into lowercase words joined by `separator`.
///
/// Blank input yields an empty string.
pub fn camel_to_separated(name: &str, separator: char) -> String {
    if name.trim().is_empty() {
        return String::new();
    }

    let mut out: Vec<char> = Vec::with_capacity(name.len() + 4);
    let mut in_upper_run = false;
    for (i, c) in name.chars().enumerate() {
        if c.is_alphabetic() {
            if c.is_uppercase() {
                if !in_upper_run {
                    in_upper_run = true;
                    if i > 0 {
                        out.push(separator);
                    }
                }
            } else if in_upper_run {
                // The last capital of the run belongs to the word that starts here.
                let len = out.len();
                if len >= 2 && out[len - 2] != separator {
                    out.insert(len - 1, separator);
                }
                in_upper_run = false;
            }
        }
        out.push(c);
    }

    out.into_iter().collect::<String>().to_lowercase()
}

/// Joins `separator`-delimited words into a camelCase identifier.
///
/// The input is lowercased and stripped of leading and trailing separators
/// first. Blank input yields an empty string.
pub fn separated_to_camel(name: &str, separator: char) -> String {
    if name.trim().is_empty() {
        return String::new();
    }

    let lowered = name.to_lowercase();
    let trimmed = lowered.trim_matches(separator);

    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        if c == separator {
            // Trailing separators are gone, so a character always follows.
            if let Some(next) = chars.next() {
                out.extend(next.to_uppercase());
            }
            continue;
        }
        out.push(c);
    }
    out
}
