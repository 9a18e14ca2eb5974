//! Command-line ingestion into a parameter tree.
//!
//! Two modes, mirroring how tool front-ends consume raw process arguments:
//!
//! - [`parse_command_line`](ParamTree::parse_command_line) — every token
//!   with a leading dash becomes a key; an immediately following non-flag
//!   token is its value. Stray tokens collect into a `misc` list.
//! - [`parse_command_line_classified`](ParamTree::parse_command_line_classified)
//!   — flags are classified by [`FlagRules`] into value-less flags,
//!   one-value options, and multi-value options, each renamed to a target
//!   key; unrecognized flags and stray tokens collect into configurable
//!   list entries.
//!
//! The first token is the program name and is skipped in both modes.
//!
//! # Examples
//!
//! ```
//! use param_tree_core::ParamTree;
//!
//! let mut tree = ParamTree::new();
//! tree.parse_command_line(
//!     ["exe", "-a", "av", "-b", "bv", "-c", "cv", "rv1", "rv2"],
//!     "test4",
//! );
//!
//! assert_eq!(*tree.get_value("test4:-a").unwrap(), "av");
//! assert_eq!(*tree.get_value("test4:-b").unwrap(), "bv");
//! assert_eq!(*tree.get_value("test4:-c").unwrap(), "cv");
//! assert_eq!(
//!     tree.get_value("test4:misc").unwrap().as_str_list().unwrap(),
//!     ["rv1", "rv2"]
//! );
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::tree::{ParamTree, join_paths};
use crate::value::Value;

/// Classification table for
/// [`parse_command_line_classified`](ParamTree::parse_command_line_classified).
///
/// Each map takes a flag spelling (e.g. `-out`) to the target key the parsed
/// value is stored under. Flags may be renamed freely; target keys may
/// contain colons to address nested sections.
///
/// # Examples
///
/// ```
/// use param_tree_core::{FlagRules, ParamTree};
///
/// let rules = FlagRules::new()
///     .one_value("-o", "out")
///     .no_value("-q", "quiet")
///     .multiple("-in", "inputs");
///
/// let mut tree = ParamTree::new();
/// tree.parse_command_line_classified(
///     ["exe", "-q", "-in", "a.raw", "b.raw", "-o", "out.txt"],
///     &rules,
/// );
///
/// assert_eq!(*tree.get_value("quiet").unwrap(), "true");
/// assert_eq!(*tree.get_value("out").unwrap(), "out.txt");
/// assert_eq!(
///     tree.get_value("inputs").unwrap().as_str_list().unwrap(),
///     ["a.raw", "b.raw"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FlagRules {
    /// Flags consuming exactly one following token.
    pub with_one_value: HashMap<String, String>,
    /// Flags consuming no token; stored as the string marker `"true"`.
    pub without_value: HashMap<String, String>,
    /// Flags consuming every following token up to the next recognized flag.
    pub with_multiple_values: HashMap<String, String>,
    /// Key of the list entry collecting stray tokens.
    pub misc_key: String,
    /// Key of the list entry collecting unrecognized flags and their tokens.
    pub unknown_key: String,
}

impl Default for FlagRules {
    fn default() -> Self {
        Self {
            with_one_value: HashMap::new(),
            without_value: HashMap::new(),
            with_multiple_values: HashMap::new(),
            misc_key: "misc".to_string(),
            unknown_key: "unknown".to_string(),
        }
    }
}

impl FlagRules {
    /// Creates an empty table with the default `misc`/`unknown` keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flag consuming one value.
    pub fn one_value(mut self, flag: &str, key: &str) -> Self {
        self.with_one_value
            .insert(flag.to_string(), key.to_string());
        self
    }

    /// Registers a value-less flag.
    pub fn no_value(mut self, flag: &str, key: &str) -> Self {
        self.without_value.insert(flag.to_string(), key.to_string());
        self
    }

    /// Registers a flag consuming multiple values.
    pub fn multiple(mut self, flag: &str, key: &str) -> Self {
        self.with_multiple_values
            .insert(flag.to_string(), key.to_string());
        self
    }

    /// Renames the stray-token list entry.
    pub fn misc(mut self, key: &str) -> Self {
        self.misc_key = key.to_string();
        self
    }

    /// Renames the unrecognized-flag list entry.
    pub fn unknown(mut self, key: &str) -> Self {
        self.unknown_key = key.to_string();
        self
    }

    fn recognizes(&self, token: &str) -> bool {
        self.with_one_value.contains_key(token)
            || self.without_value.contains_key(token)
            || self.with_multiple_values.contains_key(token)
    }
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

impl ParamTree {
    /// Ingests raw process arguments in single-flag mode.
    ///
    /// The first token (the program name) is skipped. Every `-`-prefixed
    /// token becomes a key under `prefix`; a directly following non-flag
    /// token is stored as its String value, otherwise the value is the
    /// empty String. Tokens not belonging to any flag are appended to the
    /// `misc` StringList entry under `prefix`.
    pub fn parse_command_line<I, S>(&mut self, args: I, prefix: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut misc = Vec::new();

        let mut i = 1;
        while i < args.len() {
            let token = &args[i];
            if is_flag(token) {
                let key = join_paths(prefix, token);
                if i + 1 < args.len() && !is_flag(&args[i + 1]) {
                    self.set_value(&key, args[i + 1].as_str(), "");
                    i += 2;
                } else {
                    self.set_value(&key, "", "");
                    i += 1;
                }
            } else {
                misc.push(token.clone());
                i += 1;
            }
        }

        if !misc.is_empty() {
            self.append_str_list(&join_paths(prefix, "misc"), misc);
        }
    }

    /// Ingests raw process arguments with flags classified by `rules`.
    ///
    /// The first token (the program name) is skipped. Value-less flags are
    /// stored as `"true"`; one-value flags consume the next token unless it
    /// is a recognized flag; multi-value flags consume every following
    /// token up to the next recognized flag into a StringList. An
    /// unrecognized `-`-prefixed token and the non-flag tokens under it are
    /// appended to the `unknown_key` list; any other stray token is
    /// appended to the `misc_key` list.
    pub fn parse_command_line_classified<I, S>(&mut self, args: I, rules: &FlagRules)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut misc = Vec::new();
        let mut unknown = Vec::new();

        let mut i = 1;
        while i < args.len() {
            let token = &args[i];
            if let Some(key) = rules.without_value.get(token) {
                self.set_value(key, "true", "");
                i += 1;
            } else if let Some(key) = rules.with_one_value.get(token) {
                if i + 1 < args.len() && !rules.recognizes(&args[i + 1]) {
                    self.set_value(key, args[i + 1].as_str(), "");
                    i += 2;
                } else {
                    self.set_value(key, "", "");
                    i += 1;
                }
            } else if let Some(key) = rules.with_multiple_values.get(token) {
                let mut values = Vec::new();
                i += 1;
                while i < args.len() && !rules.recognizes(&args[i]) {
                    values.push(args[i].clone());
                    i += 1;
                }
                self.set_value(key, values, "");
            } else if is_flag(token) {
                debug!(flag = %token, "unrecognized command line flag");
                unknown.push(token.clone());
                i += 1;
                while i < args.len() && !rules.recognizes(&args[i]) && !is_flag(&args[i]) {
                    unknown.push(args[i].clone());
                    i += 1;
                }
            } else {
                misc.push(token.clone());
                i += 1;
            }
        }

        if !misc.is_empty() {
            self.append_str_list(&rules.misc_key, misc);
        }
        if !unknown.is_empty() {
            self.append_str_list(&rules.unknown_key, unknown);
        }
    }

    /// Appends to an existing StringList entry, or creates it.
    fn append_str_list(&mut self, path: &str, items: Vec<String>) {
        match self.entry_mut(path) {
            Ok(entry) => match &mut entry.value {
                Value::StrList(list) => list.extend(items),
                other => *other = Value::StrList(items),
            },
            Err(_) => self.set_value(path, items, ""),
        }
    }
}
