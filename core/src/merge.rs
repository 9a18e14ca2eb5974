//! Set algebra across two parameter trees.
//!
//! Three ways to combine trees, each with precise side effects:
//!
//! - [`merge`](ParamTree::merge) — add every leaf unique to the other tree,
//!   never touching existing leaves.
//! - [`set_defaults`](ParamTree::set_defaults) — the same, under a path
//!   prefix; used to seed a tool's parameter tree from its defaults.
//! - [`update`](ParamTree::update) — three-way reconciliation used when a
//!   defaults tree evolves: starting from `self` (the new defaults), adopt
//!   the old tree's values where paths and kinds still agree, drop obsolete
//!   leaves, and keep new ones — with a [`ReservedPaths`] policy table
//!   exempting paths (version markers and the like) from reconciliation.
//!
//! All three are deterministic: the final state is a pure function of the
//! two input trees, independent of insertion order.
//!
//! # Example
//!
//! ```
//! use param_tree_core::ParamTree;
//!
//! // New defaults: old_type evolved from a string to an int.
//! let mut defaults = ParamTree::new();
//! defaults.set_value("old_type", 3i64, "");
//!
//! let mut stale = ParamTree::new();
//! stale.set_value("old_type", "a string", "");
//! stale.set_value("gone", 1i64, "");
//!
//! let report = defaults.update(&stale);
//! // Kind mismatch: the new default wins. Obsolete leaf: dropped.
//! assert_eq!(*defaults.get_value("old_type").unwrap(), 3i64);
//! assert!(!defaults.exists("gone"));
//! assert_eq!(report.kind_mismatches, 1);
//! assert_eq!(report.dropped, 1);
//! ```

use regex::Regex;
use tracing::{debug, warn};

use crate::tree::{ParamTree, join_paths};

/// Policy table of path patterns exempt from [`update`](ParamTree::update)
/// reconciliation.
///
/// Patterns are globs matched against full colon-paths: `*` matches any
/// sequence of characters (crossing segment boundaries), `?` matches a
/// single character. The default table reserves `version` and `type`
/// markers at any depth.
///
/// # Examples
///
/// ```
/// use param_tree_core::ReservedPaths;
///
/// let reserved = ReservedPaths::default();
/// assert!(reserved.is_reserved("version"));
/// assert!(reserved.is_reserved("tool:algorithm:version"));
/// assert!(!reserved.is_reserved("tool:threads"));
///
/// let custom = ReservedPaths::new(["io:*"]);
/// assert!(custom.is_reserved("io:tmp_dir"));
/// ```
#[derive(Debug, Clone)]
pub struct ReservedPaths {
    patterns: Vec<Regex>,
    sources: Vec<String>,
}

impl ReservedPaths {
    /// Compiles a set of glob patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        let mut sources = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            compiled.push(compile_glob(pattern));
            sources.push(pattern.to_string());
        }
        Self {
            patterns: compiled,
            sources,
        }
    }

    /// Whether the path matches any reserved pattern.
    pub fn is_reserved(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// The glob patterns this table was built from.
    pub fn patterns(&self) -> &[String] {
        &self.sources
    }
}

impl Default for ReservedPaths {
    fn default() -> Self {
        Self::new(["version", "*:version", "type", "*:type"])
    }
}

fn compile_glob(glob: &str) -> Regex {
    let mut source = String::from("^");
    for ch in glob.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source).expect("escaped glob compiles to a valid regex")
}

/// Outcome counters of one [`update`](ParamTree::update) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Leaves whose value and description were adopted from the old tree.
    pub adopted: usize,
    /// Reserved paths kept from the base tree.
    pub kept_reserved: usize,
    /// Leaves kept from the base tree because the value kind changed.
    pub kind_mismatches: usize,
    /// Old-tree leaves dropped as obsolete.
    pub dropped: usize,
}

impl ParamTree {
    /// Adds every leaf of `other` that is absent in this tree, with its
    /// description, tags, and restriction; leaves present in both are left
    /// untouched. Section descriptions are copied for sections absent here.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut a = ParamTree::new();
    /// a.set_value("shared", 1i64, "mine");
    ///
    /// let mut b = ParamTree::new();
    /// b.set_value("shared", 99i64, "theirs");
    /// b.set_value("extra", 2i64, "");
    ///
    /// a.merge(&b);
    /// assert_eq!(*a.get_value("shared").unwrap(), 1i64);
    /// assert_eq!(a.get_description("shared").unwrap(), "mine");
    /// assert_eq!(*a.get_value("extra").unwrap(), 2i64);
    /// ```
    pub fn merge(&mut self, other: &ParamTree) {
        self.absorb_missing(other, "");
    }

    /// Copies every leaf of `defaults` absent in this tree — value,
    /// description, and restriction — under `prefix`. Existing leaves are
    /// untouched; section descriptions are copied for newly created
    /// sections.
    pub fn set_defaults(&mut self, defaults: &ParamTree, prefix: &str) {
        self.absorb_missing(defaults, prefix);
    }

    fn absorb_missing(&mut self, other: &ParamTree, prefix: &str) {
        let sections_before = self.section_paths();
        for visited in other.iter() {
            let target = join_paths(prefix, &visited.path);
            if !self.exists(&target) {
                debug!(path = %target, "adding missing leaf");
                self.set_entry(&target, visited.entry.clone());
            }
        }
        for (path, description) in other.section_descriptions() {
            let target = join_paths(prefix, &path);
            if !sections_before.contains(&target) && self.has_section(&target) {
                let _ = self.set_section_description(&target, &description);
            }
        }
    }

    /// Reconciles this tree (the new defaults) with `old` using the default
    /// [`ReservedPaths`] table.
    pub fn update(&mut self, old: &ParamTree) -> UpdateReport {
        self.update_with(old, &ReservedPaths::default())
    }

    /// Reconciles this tree (the new defaults) with `old`.
    ///
    /// For every leaf of `old`: reserved paths keep this tree's value;
    /// paths present in both trees with the same value kind adopt `old`'s
    /// value and description; paths whose kind differs are treated as
    /// evolved and keep this tree's value; paths unique to `old` are
    /// dropped as obsolete. Leaves unique to this tree are kept unchanged.
    pub fn update_with(&mut self, old: &ParamTree, reserved: &ReservedPaths) -> UpdateReport {
        let mut report = UpdateReport::default();
        for visited in old.iter() {
            let path = visited.path.as_str();
            if reserved.is_reserved(path) {
                debug!(path, "update: reserved path kept from base");
                report.kept_reserved += 1;
                continue;
            }
            match self.entry_mut(path) {
                Ok(entry) => {
                    if entry.value.kind() == visited.entry.value.kind() {
                        entry.value = visited.entry.value.clone();
                        entry.description = visited.entry.description.clone();
                        report.adopted += 1;
                    } else {
                        warn!(
                            path,
                            base_kind = %entry.value.kind(),
                            old_kind = %visited.entry.value.kind(),
                            "update: value kind changed, keeping base value"
                        );
                        report.kind_mismatches += 1;
                    }
                }
                Err(_) => {
                    debug!(path, "update: dropping obsolete leaf");
                    report.dropped += 1;
                }
            }
        }
        report
    }
}
