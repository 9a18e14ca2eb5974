//! Path-addressed facade over an owned parameter tree.
//!
//! [`ParamTree`] owns a root [`Node`] and resolves colon-delimited paths
//! ("section:subsection:key") to entries and sections. Write operations
//! create missing path segments; read operations fail with
//! [`ParamError::NotFound`] when a segment is absent.
//!
//! # Example
//!
//! ```
//! use param_tree_core::ParamTree;
//!
//! let mut tree = ParamTree::new();
//! tree.set_value("test:float", 17.4, "floatdesc");
//!
//! let value = tree.get_value("test:float").unwrap();
//! assert_eq!(f64::try_from(value), Ok(17.4));
//! assert_eq!(tree.get_description("test:float").unwrap(), "floatdesc");
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParamError, Result};
use crate::iter::ParamIter;
use crate::types::{Entry, Node, Restriction};
use crate::value::{Value, ValueKind};

/// Splits a path into its non-empty segments, tolerating a trailing colon.
pub(crate) fn path_segments(path: &str) -> Vec<&str> {
    path.split(':').filter(|s| !s.is_empty()).collect()
}

/// Joins a prefix and a path, normalizing a trailing colon on the prefix.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches(':');
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}:{path}")
    }
}

/// Typed, hierarchical, self-validating parameter tree.
///
/// The tree exclusively owns its root node and entire subtree. Copies are
/// deep and independent; equality is structural and insertion-order
/// independent at every level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamTree {
    root: Node,
}

impl ParamTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the root node, for encoders that walk the raw structure.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of entries in the whole tree.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Whether the tree holds no entries and no sections.
    pub fn is_empty(&self) -> bool {
        self.root.entries.is_empty() && self.root.nodes.is_empty()
    }

    /// Iterates all entries in pre-order with section trace information.
    pub fn iter(&self) -> ParamIter<'_> {
        ParamIter::new(&self.root)
    }

    /// Iterates the subtree rooted at `path`; paths in the yielded items are
    /// relative to that section.
    pub fn iter_at(&self, path: &str) -> Result<ParamIter<'_>> {
        let segments = path_segments(path);
        let node = self
            .root
            .descend(&segments)
            .ok_or_else(|| ParamError::NotFound(path.to_string()))?;
        Ok(ParamIter::new(node))
    }

    /// Sets the entry at `path`, creating missing sections.
    ///
    /// Overwriting an existing entry replaces its value, description, and
    /// tags, but keeps any attached restriction.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut tree = ParamTree::new();
    /// tree.set_value("io:threads", 4i64, "Worker thread count");
    /// assert!(tree.exists("io:threads"));
    /// assert!(tree.has_section("io"));
    /// ```
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>, description: &str) {
        self.set_value_tagged(path, value, description, &[]);
    }

    /// Like [`set_value`](Self::set_value), with an initial tag set.
    pub fn set_value_tagged(
        &mut self,
        path: &str,
        value: impl Into<Value>,
        description: &str,
        tags: &[&str],
    ) {
        let segments = path_segments(path);
        let Some((name, sections)) = segments.split_last() else {
            debug_assert!(false, "set_value called with an empty path");
            return;
        };
        let node = self.root.descend_or_create(sections);
        let tags: BTreeSet<String> = tags.iter().map(|t| t.to_string()).collect();
        match node.find_entry_mut(name) {
            Some(entry) => {
                entry.value = value.into();
                entry.description = description.to_string();
                entry.tags = tags;
            }
            None => {
                let mut entry = Entry::new(name, value, description);
                entry.tags = tags;
                node.entries.push(entry);
            }
        }
    }

    /// Replaces or creates the entry at `path` wholesale, restriction
    /// included.
    pub(crate) fn set_entry(&mut self, path: &str, mut entry: Entry) {
        let segments = path_segments(path);
        let Some((name, sections)) = segments.split_last() else {
            debug_assert!(false, "set_entry called with an empty path");
            return;
        };
        entry.name = name.to_string();
        let node = self.root.descend_or_create(sections);
        match node.find_entry_mut(name) {
            Some(existing) => *existing = entry,
            None => node.entries.push(entry),
        }
    }

    fn entry(&self, path: &str) -> Result<&Entry> {
        let segments = path_segments(path);
        let not_found = || ParamError::NotFound(path.to_string());
        let (name, sections) = segments.split_last().ok_or_else(not_found)?;
        self.root
            .descend(sections)
            .and_then(|node| node.find_entry(name))
            .ok_or_else(not_found)
    }

    pub(crate) fn entry_mut(&mut self, path: &str) -> Result<&mut Entry> {
        let segments = path_segments(path);
        let not_found = || ParamError::NotFound(path.to_string());
        let (name, sections) = segments.split_last().ok_or_else(not_found)?;
        self.root
            .descend_mut(sections)
            .and_then(|node| node.find_entry_mut(name))
            .ok_or_else(not_found)
    }

    /// Returns the entry at `path`.
    pub fn get_entry(&self, path: &str) -> Result<&Entry> {
        self.entry(path)
    }

    /// Returns the value at `path`.
    pub fn get_value(&self, path: &str) -> Result<&Value> {
        self.entry(path).map(|e| &e.value)
    }

    /// Returns the description of the entry at `path`.
    pub fn get_description(&self, path: &str) -> Result<&str> {
        self.entry(path).map(|e| e.description.as_str())
    }

    /// Returns the tag set of the entry at `path`.
    pub fn get_tags(&self, path: &str) -> Result<&BTreeSet<String>> {
        self.entry(path).map(|e| &e.tags)
    }

    /// Whether an entry exists at `path`. Tolerates a trailing colon.
    pub fn exists(&self, path: &str) -> bool {
        self.entry(path).is_ok()
    }

    /// Whether a section exists at `path`. Tolerates a trailing colon.
    pub fn has_section(&self, path: &str) -> bool {
        self.root.descend(&path_segments(path)).is_some()
    }

    /// Sets the description of the section at `path`.
    pub fn set_section_description(&mut self, path: &str, description: &str) -> Result<()> {
        let node = self
            .root
            .descend_mut(&path_segments(path))
            .ok_or_else(|| ParamError::NotFound(path.to_string()))?;
        node.description = description.to_string();
        Ok(())
    }

    /// Returns the description of the section at `path`.
    pub fn get_section_description(&self, path: &str) -> Result<&str> {
        self.root
            .descend(&path_segments(path))
            .map(|node| node.description.as_str())
            .ok_or_else(|| ParamError::NotFound(path.to_string()))
    }

    /// Adds a tag to the entry at `path`. Idempotent.
    pub fn add_tag(&mut self, path: &str, tag: &str) -> Result<()> {
        self.entry_mut(path)?.tags.insert(tag.to_string());
        Ok(())
    }

    /// Adds several tags to the entry at `path`. Idempotent.
    pub fn add_tags(&mut self, path: &str, tags: &[&str]) -> Result<()> {
        let entry = self.entry_mut(path)?;
        entry.tags.extend(tags.iter().map(|t| t.to_string()));
        Ok(())
    }

    /// Whether the entry at `path` carries the tag.
    pub fn has_tag(&self, path: &str, tag: &str) -> Result<bool> {
        Ok(self.entry(path)?.tags.contains(tag))
    }

    /// Removes every tag from the entry at `path`.
    pub fn clear_tags(&mut self, path: &str) -> Result<()> {
        self.entry_mut(path)?.tags.clear();
        Ok(())
    }

    /// Sets the minimum bound for an int-kind entry.
    ///
    /// Fails with [`ParamError::RestrictionKindMismatch`] when the entry's
    /// value is not of the int family.
    pub fn set_min_int(&mut self, path: &str, min: i64) -> Result<()> {
        let entry = self.kind_checked_entry(path, &[ValueKind::Int, ValueKind::IntList])?;
        match &mut entry.restriction {
            Some(Restriction::IntRange { min: slot, .. }) => *slot = Some(min),
            other => {
                *other = Some(Restriction::IntRange {
                    min: Some(min),
                    max: None,
                })
            }
        }
        Ok(())
    }

    /// Sets the maximum bound for an int-kind entry.
    pub fn set_max_int(&mut self, path: &str, max: i64) -> Result<()> {
        let entry = self.kind_checked_entry(path, &[ValueKind::Int, ValueKind::IntList])?;
        match &mut entry.restriction {
            Some(Restriction::IntRange { max: slot, .. }) => *slot = Some(max),
            other => {
                *other = Some(Restriction::IntRange {
                    min: None,
                    max: Some(max),
                })
            }
        }
        Ok(())
    }

    /// Sets the minimum bound for a double-kind entry.
    pub fn set_min_float(&mut self, path: &str, min: f64) -> Result<()> {
        let entry = self.kind_checked_entry(path, &[ValueKind::Double, ValueKind::DoubleList])?;
        match &mut entry.restriction {
            Some(Restriction::FloatRange { min: slot, .. }) => *slot = Some(min),
            other => {
                *other = Some(Restriction::FloatRange {
                    min: Some(min),
                    max: None,
                })
            }
        }
        Ok(())
    }

    /// Sets the maximum bound for a double-kind entry.
    pub fn set_max_float(&mut self, path: &str, max: f64) -> Result<()> {
        let entry = self.kind_checked_entry(path, &[ValueKind::Double, ValueKind::DoubleList])?;
        match &mut entry.restriction {
            Some(Restriction::FloatRange { max: slot, .. }) => *slot = Some(max),
            other => {
                *other = Some(Restriction::FloatRange {
                    min: None,
                    max: Some(max),
                })
            }
        }
        Ok(())
    }

    /// Sets the allowed-string set for a string-kind entry.
    pub fn set_valid_strings(&mut self, path: &str, allowed: &[&str]) -> Result<()> {
        let entry = self.kind_checked_entry(path, &[ValueKind::Str, ValueKind::StrList])?;
        entry.restriction = Some(Restriction::ValidStrings(
            allowed.iter().map(|s| s.to_string()).collect(),
        ));
        Ok(())
    }

    fn kind_checked_entry(&mut self, path: &str, kinds: &[ValueKind]) -> Result<&mut Entry> {
        let entry = self.entry_mut(path)?;
        let kind = entry.value.kind();
        if !kinds.contains(&kind) {
            return Err(ParamError::RestrictionKindMismatch {
                path: path.to_string(),
                kind,
            });
        }
        Ok(entry)
    }

    /// Removes the entry at `path`, or the whole section when `path` ends
    /// with the section delimiter.
    ///
    /// A bare path targets exactly one leaf and never a same-named section;
    /// empty ancestors are left in place. A trailing-colon path removes the
    /// section subtree and prunes ancestors it leaves empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut tree = ParamTree::new();
    /// tree.set_value("a:b", 1i64, "");
    /// tree.set_value("a:c:d", 2i64, "");
    ///
    /// tree.remove("a:b");
    /// assert!(!tree.exists("a:b"));
    /// assert!(tree.has_section("a"));
    ///
    /// tree.remove("a:c:");
    /// assert!(!tree.has_section("a:c"));
    /// ```
    pub fn remove(&mut self, path: &str) {
        let segments = path_segments(path);
        if segments.is_empty() {
            return;
        }
        if path.ends_with(':') {
            remove_subtree(&mut self.root, &segments);
        } else if let Some((name, sections)) = segments.split_last() {
            if let Some(node) = self.root.descend_mut(sections) {
                node.entries.retain(|e| e.name != *name);
            }
        }
    }

    /// Removes every entry and section whose path starts with `prefix`,
    /// treating the prefix as a segment boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut tree = ParamTree::new();
    /// tree.set_value("test:a", 1i64, "");
    /// tree.set_value("test2:b", 2i64, "");
    ///
    /// tree.remove_all("test");
    /// assert!(!tree.has_section("test"));
    /// assert!(tree.exists("test2:b"));
    /// ```
    pub fn remove_all(&mut self, prefix: &str) {
        let segments = path_segments(prefix);
        if segments.is_empty() {
            self.root = Node::default();
            return;
        }
        remove_prefix(&mut self.root, &segments);
    }

    /// Returns a new tree with the subtree rooted at `prefix`.
    ///
    /// With `keep_prefix`, the result keeps the full section chain
    /// (including its descriptions); otherwise the section's contents are
    /// hoisted to the result's root and `prefix` disappears from paths.
    /// An absent section yields an empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut tree = ParamTree::new();
    /// tree.set_value("alg:scoring:weight", 0.5, "");
    ///
    /// let stripped = tree.copy_subtree("alg:scoring", false);
    /// assert!(stripped.exists("weight"));
    ///
    /// let kept = tree.copy_subtree("alg:scoring", true);
    /// assert!(kept.exists("alg:scoring:weight"));
    /// ```
    pub fn copy_subtree(&self, prefix: &str, keep_prefix: bool) -> ParamTree {
        let segments = path_segments(prefix);
        if segments.is_empty() {
            return self.clone();
        }

        let mut result = ParamTree::new();
        let mut chain: Vec<&Node> = Vec::new();
        let mut cursor = &self.root;
        for segment in &segments {
            match cursor.find_node(segment) {
                Some(child) => {
                    chain.push(child);
                    cursor = child;
                }
                None => return result,
            }
        }
        let Some(source) = chain.last().copied() else {
            return result;
        };

        if keep_prefix {
            let mut node = source.clone();
            for parent in chain.iter().rev().skip(1) {
                let mut wrapper = Node::new(&parent.name, &parent.description);
                wrapper.nodes.push(node);
                node = wrapper;
            }
            result.root.nodes.push(node);
        } else {
            result.root.entries = source.entries.clone();
            result.root.nodes = source.nodes.clone();
        }
        result
    }

    /// Deep-copies `other`'s entries and section descriptions into this tree
    /// under `prefix`, overwriting existing entries at the resulting paths.
    pub fn insert(&mut self, prefix: &str, other: &ParamTree) {
        for visited in other.iter() {
            let target = join_paths(prefix, &visited.path);
            self.set_entry(&target, visited.entry.clone());
        }
        copy_section_descriptions(self, prefix, &other.root);
    }

    /// Paths of every section in the tree.
    pub(crate) fn section_paths(&self) -> std::collections::HashSet<String> {
        let mut paths = std::collections::HashSet::new();
        collect_section_paths(&self.root, "", &mut paths);
        paths
    }

    /// (path, description) for every section with a non-empty description.
    pub(crate) fn section_descriptions(&self) -> Vec<(String, String)> {
        let mut described = Vec::new();
        collect_section_descriptions(&self.root, "", &mut described);
        described
    }
}

fn collect_section_paths(node: &Node, prefix: &str, paths: &mut std::collections::HashSet<String>) {
    for child in &node.nodes {
        let path = join_paths(prefix, &child.name);
        collect_section_paths(child, &path, paths);
        paths.insert(path);
    }
}

fn collect_section_descriptions(node: &Node, prefix: &str, described: &mut Vec<(String, String)>) {
    for child in &node.nodes {
        let path = join_paths(prefix, &child.name);
        if !child.description.is_empty() {
            described.push((path.clone(), child.description.clone()));
        }
        collect_section_descriptions(child, &path, described);
    }
}

fn remove_subtree(node: &mut Node, segments: &[&str]) -> bool {
    if segments.len() == 1 {
        let before = node.nodes.len();
        node.nodes.retain(|n| n.name != segments[0]);
        return node.nodes.len() != before;
    }
    let (removed, child_empty) = match node.find_node_mut(segments[0]) {
        Some(child) => {
            let removed = remove_subtree(child, &segments[1..]);
            (removed, child.entries.is_empty() && child.nodes.is_empty())
        }
        None => return false,
    };
    if removed && child_empty {
        node.nodes.retain(|n| n.name != segments[0]);
        debug!(section = segments[0], "pruned empty ancestor section");
    }
    removed
}

fn remove_prefix(node: &mut Node, segments: &[&str]) -> bool {
    if segments.len() == 1 {
        let name = segments[0];
        let entries_before = node.entries.len();
        node.entries.retain(|e| e.name != name);
        let nodes_before = node.nodes.len();
        node.nodes.retain(|n| n.name != name);
        return node.entries.len() != entries_before || node.nodes.len() != nodes_before;
    }
    let (removed, child_empty) = match node.find_node_mut(segments[0]) {
        Some(child) => {
            let removed = remove_prefix(child, &segments[1..]);
            (removed, child.entries.is_empty() && child.nodes.is_empty())
        }
        None => return false,
    };
    if removed && child_empty {
        node.nodes.retain(|n| n.name != segments[0]);
    }
    removed
}

fn copy_section_descriptions(tree: &mut ParamTree, prefix: &str, node: &Node) {
    for child in &node.nodes {
        let path = join_paths(prefix, &child.name);
        if !child.description.is_empty() && tree.has_section(&path) {
            let _ = tree.set_section_description(&path, &child.description);
        }
        copy_section_descriptions(tree, &path, child);
    }
}
