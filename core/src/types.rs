//! Structural types of the parameter tree.
//!
//! This module defines the building blocks the tree facade operates on:
//!
//! - [`Entry`] — a named leaf holding one [`Value`] plus description, tags,
//!   and an optional [`Restriction`].
//! - [`Node`] — a named interior element owning ordered child entries and
//!   child nodes.
//! - [`ToolInfo`] — the metadata record that accompanies a tree when it is
//!   handed to an external encoder.
//!
//! The types derive [`serde`] traits and round-trip through JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Value, ValueKind};

/// Validity constraint attached to an [`Entry`].
///
/// At most one restriction is attached per entry, matched to the value's
/// kind: integer bounds for int-kind values, float bounds for double-kind
/// values, an allowed-string set for string-kind values. List-kind values
/// are checked element-wise.
///
/// # Examples
///
/// ```
/// use param_tree_core::{Restriction, Value};
///
/// let range = Restriction::IntRange { min: Some(0), max: Some(10) };
/// assert!(range.check(&Value::from(5i64)).is_ok());
/// assert!(range.check(&Value::from(11i64)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Restriction {
    /// Inclusive bounds on an integer value.
    IntRange {
        /// Lower bound, if any.
        min: Option<i64>,
        /// Upper bound, if any.
        max: Option<i64>,
    },
    /// Inclusive bounds on a double value.
    FloatRange {
        /// Lower bound, if any.
        min: Option<f64>,
        /// Upper bound, if any.
        max: Option<f64>,
    },
    /// Closed set of allowed string contents.
    ValidStrings(Vec<String>),
}

/// Reason an entry's value violates its restriction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestrictionError {
    /// Value falls below the attached minimum.
    #[error("value {value} is below the minimum {min}")]
    BelowMin {
        /// Rendered offending value.
        value: String,
        /// Rendered bound.
        min: String,
    },
    /// Value exceeds the attached maximum.
    #[error("value {value} is above the maximum {max}")]
    AboveMax {
        /// Rendered offending value.
        value: String,
        /// Rendered bound.
        max: String,
    },
    /// String content is not in the allowed set.
    #[error("value '{value}' is not one of the allowed strings [{allowed}]")]
    NotAllowed {
        /// Offending string.
        value: String,
        /// Comma-joined allowed contents.
        allowed: String,
    },
    /// Restriction kind does not match the value kind.
    #[error("restriction cannot apply to a {kind} value")]
    KindMismatch {
        /// Kind of the checked value.
        kind: ValueKind,
    },
}

impl Restriction {
    /// Checks a value against this restriction.
    ///
    /// Empty values pass every restriction. A restriction paired with a
    /// value of an incompatible kind (possible after an entry was
    /// overwritten with a different kind) reports
    /// [`RestrictionError::KindMismatch`].
    pub fn check(&self, value: &Value) -> Result<(), RestrictionError> {
        if value.is_empty() {
            return Ok(());
        }
        match (self, value) {
            (Self::IntRange { min, max }, Value::Int(i)) => check_int(*i, *min, *max),
            (Self::IntRange { min, max }, Value::IntList(list)) => list
                .iter()
                .try_for_each(|i| check_int(*i, *min, *max)),
            (Self::FloatRange { min, max }, Value::Double(d)) => check_float(*d, *min, *max),
            (Self::FloatRange { min, max }, Value::DoubleList(list)) => list
                .iter()
                .try_for_each(|d| check_float(*d, *min, *max)),
            (Self::ValidStrings(allowed), Value::Str(s)) => check_string(s, allowed),
            (Self::ValidStrings(allowed), Value::StrList(list)) => list
                .iter()
                .try_for_each(|s| check_string(s, allowed)),
            (_, other) => Err(RestrictionError::KindMismatch { kind: other.kind() }),
        }
    }

    /// Whether this restriction can apply to values of the given kind.
    pub fn applies_to(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (Self::IntRange { .. }, ValueKind::Int | ValueKind::IntList)
                | (Self::FloatRange { .. }, ValueKind::Double | ValueKind::DoubleList)
                | (Self::ValidStrings(_), ValueKind::Str | ValueKind::StrList)
        )
    }
}

fn check_int(value: i64, min: Option<i64>, max: Option<i64>) -> Result<(), RestrictionError> {
    match (min, max) {
        (Some(min), _) if value < min => Err(RestrictionError::BelowMin {
            value: value.to_string(),
            min: min.to_string(),
        }),
        (_, Some(max)) if value > max => Err(RestrictionError::AboveMax {
            value: value.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_float(value: f64, min: Option<f64>, max: Option<f64>) -> Result<(), RestrictionError> {
    match (min, max) {
        (Some(min), _) if value < min => Err(RestrictionError::BelowMin {
            value: value.to_string(),
            min: min.to_string(),
        }),
        (_, Some(max)) if value > max => Err(RestrictionError::AboveMax {
            value: value.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_string(value: &str, allowed: &[String]) -> Result<(), RestrictionError> {
    if allowed.iter().any(|a| a == value) {
        Ok(())
    } else {
        Err(RestrictionError::NotAllowed {
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

/// A named leaf: one typed value plus its metadata.
///
/// Entries are created on first assignment to a path and overwritten in
/// place on re-assignment; the attached restriction survives overwrites and
/// must be re-applied if the value kind changes incompatibly.
///
/// Equality compares name, value, description, and tags (as a set);
/// restrictions are metadata and do not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Leaf name (the last path segment).
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The typed payload.
    pub value: Value,
    /// Tag set; addition is idempotent.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Optional validity constraint, matched to the value kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<Restriction>,
}

impl Entry {
    /// Creates an entry with no tags and no restriction.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::Entry;
    ///
    /// let entry = Entry::new("threads", 4i64, "Number of worker threads");
    /// assert_eq!(entry.name, "threads");
    /// assert_eq!(entry.value, 4i64);
    /// ```
    pub fn new(name: &str, value: impl Into<Value>, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            value: value.into(),
            tags: BTreeSet::new(),
            restriction: None,
        }
    }

    /// Evaluates the attached restriction against the current value.
    ///
    /// Entries without a restriction are always valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::{Entry, Restriction};
    ///
    /// let mut entry = Entry::new("level", 3i64, "");
    /// entry.restriction = Some(Restriction::IntRange { min: Some(0), max: Some(2) });
    /// let reason = entry.is_valid().unwrap_err().to_string();
    /// assert!(reason.contains("above the maximum 2"));
    /// ```
    pub fn is_valid(&self) -> Result<(), RestrictionError> {
        match &self.restriction {
            Some(restriction) => restriction.check(&self.value),
            None => Ok(()),
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.description == other.description
            && self.tags == other.tags
    }
}

/// A named interior tree element.
///
/// A node exclusively owns its child entries and child nodes, both kept in
/// insertion order with sibling-unique names. Equality is order-independent
/// at every level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    /// Section name (empty for a tree root).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Section description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Direct child entries, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
    /// Direct child nodes, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Creates an empty node.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            entries: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Finds a direct child entry by name.
    pub fn find_entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Finds a direct child entry by name, mutably.
    pub fn find_entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    /// Finds a direct child node by name.
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Finds a direct child node by name, mutably.
    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Walks child nodes along the given segments.
    pub fn descend(&self, segments: &[&str]) -> Option<&Node> {
        let mut node = self;
        for segment in segments {
            node = node.find_node(segment)?;
        }
        Some(node)
    }

    /// Walks child nodes along the given segments, mutably.
    pub fn descend_mut(&mut self, segments: &[&str]) -> Option<&mut Node> {
        let mut node = self;
        for segment in segments {
            node = node.find_node_mut(segment)?;
        }
        Some(node)
    }

    /// Walks child nodes along the given segments, creating missing ones.
    pub(crate) fn descend_or_create(&mut self, segments: &[&str]) -> &mut Node {
        let mut node = self;
        for segment in segments {
            let idx = match node.nodes.iter().position(|n| n.name == *segment) {
                Some(idx) => idx,
                None => {
                    node.nodes.push(Node::new(segment, ""));
                    node.nodes.len() - 1
                }
            };
            node = &mut node.nodes[idx];
        }
        node
    }

    /// Counts all entries reachable in this node's subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::ParamTree;
    ///
    /// let mut tree = ParamTree::new();
    /// tree.set_value("a", 1i64, "");
    /// tree.set_value("section:b", 2i64, "");
    /// assert_eq!(tree.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.entries.len() + self.nodes.iter().map(Node::size).sum::<usize>()
    }
}

impl PartialEq for Node {
    /// Order-independent structural equality: multiset comparison of sibling
    /// entries and sibling nodes, recursing into child nodes.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.entries.len() == other.entries.len()
            && self.nodes.len() == other.nodes.len()
            && self
                .entries
                .iter()
                .all(|e| other.find_entry(&e.name).is_some_and(|o| e == o))
            && self
                .nodes
                .iter()
                .all(|n| other.find_node(&n.name).is_some_and(|o| n == o))
    }
}

/// Metadata record accompanying a tree handed to an external encoder.
///
/// Not part of the tree itself; encoders combine it with a traversal of the
/// tree to produce a complete tool description.
///
/// # Examples
///
/// ```
/// use param_tree_core::ToolInfo;
///
/// let mut info = ToolInfo::new("peak-picker", "2.1.0");
/// info.category = Some("signal processing".into());
/// info.citations.push("doi:10.1000/example".into());
/// assert_eq!(info.name, "peak-picker");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Tool version string.
    pub version: String,
    /// Documentation URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docurl: Option<String>,
    /// Tool category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    /// Citation identifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}

impl ToolInfo {
    /// Creates a record with the required fields.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }
}
