//! Checking a parameter tree against its defaults.
//!
//! [`check_defaults`](ParamTree::check_defaults) compares every leaf of a
//! tree against a defaults tree, catching unknown parameters, type changes,
//! and restriction violations before they cause downstream issues. Warnings
//! are accumulated and returned — never thrown — and the check never aborts
//! early, so one bad entry does not hide the rest.
//!
//! # Examples
//!
//! ```
//! use param_tree_core::{DefaultsWarning, ParamTree};
//!
//! let mut defaults = ParamTree::new();
//! defaults.set_value("threads", 1i64, "");
//!
//! let mut tree = ParamTree::new();
//! tree.set_value("threads", 4i64, "");
//! assert!(tree.check_defaults("mytool", &defaults, "").is_empty());
//!
//! tree.set_value("typo", 1i64, "");
//! let warnings = tree.check_defaults("mytool", &defaults, "");
//! assert!(matches!(warnings[0], DefaultsWarning::UnknownParameter { .. }));
//! ```

use thiserror::Error;
use tracing::warn;

use crate::tree::{ParamTree, join_paths};
use crate::value::ValueKind;

/// A finding from [`check_defaults`](ParamTree::check_defaults).
///
/// Each variant describes one mismatch between a tree and its defaults. The
/// `Display` impl provides the human-readable message an external sink
/// would report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefaultsWarning {
    /// The tree holds a leaf the defaults do not know about.
    #[error("{tool}: unknown parameter '{path}'")]
    UnknownParameter {
        /// Tool the tree belongs to.
        tool: String,
        /// Path of the unknown leaf.
        path: String,
    },
    /// A leaf's value kind differs from its default's kind.
    #[error("{tool}: parameter '{path}' has wrong type {found}, expected {expected}")]
    WrongType {
        /// Tool the tree belongs to.
        tool: String,
        /// Path of the mismatched leaf.
        path: String,
        /// Kind found in the tree.
        found: ValueKind,
        /// Kind the defaults prescribe.
        expected: ValueKind,
    },
    /// A leaf's value violates the restriction its default carries.
    #[error("{tool}: invalid value for parameter '{path}': {reason}")]
    InvalidValue {
        /// Tool the tree belongs to.
        tool: String,
        /// Path of the invalid leaf.
        path: String,
        /// Restriction violation, rendered.
        reason: String,
    },
}

impl ParamTree {
    /// Checks every leaf of this tree against `defaults` under `prefix`.
    ///
    /// Emits [`DefaultsWarning::UnknownParameter`] for leaves without a
    /// default, [`DefaultsWarning::WrongType`] for kind mismatches, and
    /// [`DefaultsWarning::InvalidValue`] when a default's restriction
    /// rejects this tree's value. Neither tree is mutated; every finding is
    /// also logged through [`tracing`].
    pub fn check_defaults(
        &self,
        tool_name: &str,
        defaults: &ParamTree,
        prefix: &str,
    ) -> Vec<DefaultsWarning> {
        let mut warnings = Vec::new();
        for visited in self.iter() {
            let target = join_paths(prefix, &visited.path);
            let default = match defaults.get_entry(&target) {
                Ok(default) => default,
                Err(_) => {
                    warnings.push(DefaultsWarning::UnknownParameter {
                        tool: tool_name.to_string(),
                        path: visited.path.clone(),
                    });
                    continue;
                }
            };

            let found = visited.entry.value.kind();
            let expected = default.value.kind();
            if found != expected {
                warnings.push(DefaultsWarning::WrongType {
                    tool: tool_name.to_string(),
                    path: visited.path.clone(),
                    found,
                    expected,
                });
                continue;
            }

            if let Some(restriction) = &default.restriction {
                if let Err(reason) = restriction.check(&visited.entry.value) {
                    warnings.push(DefaultsWarning::InvalidValue {
                        tool: tool_name.to_string(),
                        path: visited.path.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }
        for warning in &warnings {
            warn!(tool = tool_name, "{warning}");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ParamTree {
        let mut tree = ParamTree::new();
        tree.set_value("threads", 1i64, "Thread count");
        tree.set_min_int("threads", 1).unwrap();
        tree.set_value("io:format", "mzML", "Output format");
        tree.set_valid_strings("io:format", &["mzML", "mzXML"]).unwrap();
        tree
    }

    #[test]
    fn test_clean_tree_produces_no_warnings() {
        let mut tree = ParamTree::new();
        tree.set_value("threads", 8i64, "");
        tree.set_value("io:format", "mzXML", "");

        assert!(tree.check_defaults("tool", &defaults(), "").is_empty());
    }

    #[test]
    fn test_unknown_parameter_is_reported() {
        let mut tree = ParamTree::new();
        tree.set_value("no_such", 1i64, "");

        let warnings = tree.check_defaults("tool", &defaults(), "");
        assert_eq!(
            warnings,
            vec![DefaultsWarning::UnknownParameter {
                tool: "tool".to_string(),
                path: "no_such".to_string(),
            }]
        );
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut tree = ParamTree::new();
        tree.set_value("threads", "eight", "");

        let warnings = tree.check_defaults("tool", &defaults(), "");
        assert_eq!(
            warnings,
            vec![DefaultsWarning::WrongType {
                tool: "tool".to_string(),
                path: "threads".to_string(),
                found: ValueKind::Str,
                expected: ValueKind::Int,
            }]
        );
    }

    #[test]
    fn test_restriction_violation_is_reported_with_reason() {
        let mut tree = ParamTree::new();
        tree.set_value("threads", 0i64, "");

        let warnings = tree.check_defaults("tool", &defaults(), "");
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            DefaultsWarning::InvalidValue { path, reason, .. } => {
                assert_eq!(path, "threads");
                assert!(reason.contains("below the minimum 1"));
            }
            other => panic!("unexpected warning: {other:?}"),
        }
    }

    #[test]
    fn test_check_accumulates_and_never_aborts() {
        let mut tree = ParamTree::new();
        tree.set_value("threads", 0i64, "");
        tree.set_value("io:format", 3i64, "");
        tree.set_value("unknown", 1i64, "");

        let warnings = tree.check_defaults("tool", &defaults(), "");
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn test_prefix_shifts_defaults_lookup() {
        let mut defaults = ParamTree::new();
        defaults.set_value("sub:key", 1i64, "");

        let mut tree = ParamTree::new();
        tree.set_value("key", 2i64, "");

        assert!(tree.check_defaults("tool", &defaults, "sub").is_empty());
        assert_eq!(tree.check_defaults("tool", &defaults, "").len(), 1);
    }

    #[test]
    fn test_check_defaults_does_not_mutate() {
        let mut tree = ParamTree::new();
        tree.set_value("unknown", 1i64, "");
        let before = tree.clone();

        let _ = tree.check_defaults("tool", &defaults(), "");
        assert_eq!(tree, before);
    }
}
