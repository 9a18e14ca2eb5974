//! Pre-order traversal with section boundary tracking.
//!
//! [`ParamIter`] walks a node's subtree depth-first, visiting a section's
//! direct entries before descending into its child sections (in stored
//! order). Each yielded [`VisitedEntry`] carries the full colon-path of the
//! entry and the [`TraceEvent`]s — sections opened and closed — that
//! occurred since the previous position, so encoders can emit open/close
//! markup without re-deriving nesting from path strings.
//!
//! The traversal is driven by an explicit stack of frames rather than
//! recursion; the iterator borrows the tree, so structural mutation during
//! iteration is rejected at compile time.
//!
//! # Example
//!
//! ```
//! use param_tree_core::{ParamTree, TraceAction};
//!
//! let mut tree = ParamTree::new();
//! tree.set_value("a", 1i64, "");
//! tree.set_value("r:s:b", 2i64, "");
//!
//! let mut iter = tree.iter();
//! let first = iter.next().unwrap();
//! assert_eq!(first.path, "a");
//! assert!(first.trace.is_empty());
//!
//! let second = iter.next().unwrap();
//! assert_eq!(second.path, "r:s:b");
//! let opened: Vec<&str> = second
//!     .trace
//!     .iter()
//!     .filter(|t| t.action == TraceAction::Opened)
//!     .map(|t| t.name.as_str())
//!     .collect();
//! assert_eq!(opened, ["r", "s"]);
//!
//! assert!(iter.next().is_none());
//! // Sections still open at the last entry close after exhaustion.
//! assert_eq!(iter.closing_trace().len(), 2);
//! ```

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::types::{Entry, Node};

/// Whether a section boundary was entered or left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceAction {
    /// The traversal descended into the section.
    Opened,
    /// The traversal left the section.
    Closed,
}

/// One section boundary crossed between two iterator positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Section name.
    pub name: String,
    /// Section description.
    pub description: String,
    /// Boundary direction.
    pub action: TraceAction,
}

/// An entry visited during traversal.
#[derive(Debug)]
pub struct VisitedEntry<'a> {
    /// The visited entry.
    pub entry: &'a Entry,
    /// Fully qualified colon-path from the traversal root to the entry.
    pub path: String,
    /// Section boundaries crossed since the previous position.
    pub trace: Vec<TraceEvent>,
}

struct Frame<'a> {
    node: &'a Node,
    entry_idx: usize,
    node_idx: usize,
}

/// Forward-only pre-order cursor over a subtree's entries.
///
/// Created by [`ParamTree::iter`](crate::ParamTree::iter) or
/// [`ParamTree::iter_at`](crate::ParamTree::iter_at). The iterator is fused:
/// after the last entry it keeps returning `None`.
pub struct ParamIter<'a> {
    /// Traversal stack; index 0 is the traversal root, whose name is not
    /// part of yielded paths.
    stack: Vec<Frame<'a>>,
    /// Boundary events accumulated since the last yielded entry.
    pending: Vec<TraceEvent>,
}

impl<'a> ParamIter<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self {
            stack: vec![Frame {
                node: root,
                entry_idx: 0,
                node_idx: 0,
            }],
            pending: Vec::new(),
        }
    }

    /// Sections closed after the final entry.
    ///
    /// Meaningful once the iterator has returned `None`: the sections that
    /// were still open at the last entry produce their
    /// [`Closed`](TraceAction::Closed) events here.
    pub fn closing_trace(&self) -> &[TraceEvent] {
        &self.pending
    }

    fn current_path(&self, entry_name: &str) -> String {
        let mut path = String::new();
        for frame in self.stack.iter().skip(1) {
            path.push_str(&frame.node.name);
            path.push(':');
        }
        path.push_str(entry_name);
        path
    }
}

impl<'a> Iterator for ParamIter<'a> {
    type Item = VisitedEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.len().checked_sub(1)?;
            let node = self.stack[top].node;
            let entry_idx = self.stack[top].entry_idx;
            let node_idx = self.stack[top].node_idx;

            if entry_idx < node.entries.len() {
                self.stack[top].entry_idx += 1;
                let entry = &node.entries[entry_idx];
                return Some(VisitedEntry {
                    entry,
                    path: self.current_path(&entry.name),
                    trace: std::mem::take(&mut self.pending),
                });
            }
            if node_idx < node.nodes.len() {
                self.stack[top].node_idx += 1;
                let child = &node.nodes[node_idx];
                self.pending.push(TraceEvent {
                    name: child.name.clone(),
                    description: child.description.clone(),
                    action: TraceAction::Opened,
                });
                self.stack.push(Frame {
                    node: child,
                    entry_idx: 0,
                    node_idx: 0,
                });
                continue;
            }
            if self.stack.len() == 1 {
                // Traversal root exhausted; no Closed event for the root.
                self.stack.pop();
                return None;
            }
            let popped = self.stack.pop();
            debug_assert!(popped.is_some(), "traversal stack underflow");
            if let Some(frame) = popped {
                self.pending.push(TraceEvent {
                    name: frame.node.name.clone(),
                    description: frame.node.description.clone(),
                    action: TraceAction::Closed,
                });
            }
        }
    }
}

impl FusedIterator for ParamIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ParamTree;

    fn event(trace: &[TraceEvent], idx: usize) -> (&str, TraceAction) {
        (trace[idx].name.as_str(), trace[idx].action)
    }

    #[test]
    fn test_preorder_visits_entries_before_child_sections() {
        let mut tree = ParamTree::new();
        tree.set_value("r:s:b", 1i64, "");
        tree.set_value("r:s:c", 2i64, "");
        tree.set_value("t:d", 3i64, "");
        tree.set_value("a", 4i64, "");

        let order: Vec<String> = tree.iter().map(|v| v.path).collect();
        assert_eq!(order, ["a", "r:s:b", "r:s:c", "t:d"]);
    }

    #[test]
    fn test_trace_fires_exactly_at_section_transitions() {
        let mut tree = ParamTree::new();
        tree.set_value("a", 1i64, "");
        tree.set_value("r:s:b", 2i64, "");
        tree.set_value("r:s:c", 3i64, "");
        tree.set_value("t:d", 4i64, "");

        let mut iter = tree.iter();

        let a = iter.next().unwrap();
        assert!(a.trace.is_empty());

        let b = iter.next().unwrap();
        assert_eq!(b.trace.len(), 2);
        assert_eq!(event(&b.trace, 0), ("r", TraceAction::Opened));
        assert_eq!(event(&b.trace, 1), ("s", TraceAction::Opened));

        let c = iter.next().unwrap();
        assert!(c.trace.is_empty());

        let d = iter.next().unwrap();
        assert_eq!(d.trace.len(), 3);
        assert_eq!(event(&d.trace, 0), ("s", TraceAction::Closed));
        assert_eq!(event(&d.trace, 1), ("r", TraceAction::Closed));
        assert_eq!(event(&d.trace, 2), ("t", TraceAction::Opened));

        assert!(iter.next().is_none());
        let closing = iter.closing_trace();
        assert_eq!(closing.len(), 1);
        assert_eq!(event(closing, 0), ("t", TraceAction::Closed));
    }

    #[test]
    fn test_trace_carries_section_descriptions() {
        let mut tree = ParamTree::new();
        tree.set_value("sec:k", 1i64, "");
        tree.set_section_description("sec", "About sec").unwrap();

        let first = tree.iter().next().unwrap();
        assert_eq!(first.trace[0].description, "About sec");
    }

    #[test]
    fn test_iterator_is_fused() {
        let tree = ParamTree::new();
        let mut iter = tree.iter();
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_subtree_iteration_yields_relative_paths() {
        let mut tree = ParamTree::new();
        tree.set_value("outer:inner:k", 1i64, "");
        tree.set_value("outer:other", 2i64, "");

        let paths: Vec<String> = tree.iter_at("outer").unwrap().map(|v| v.path).collect();
        assert_eq!(paths, ["other", "inner:k"]);

        assert!(tree.iter_at("absent").is_err());
    }

    #[test]
    fn test_empty_sections_produce_no_entries_but_balanced_traces() {
        let mut tree = ParamTree::new();
        tree.set_value("a:b", 1i64, "");
        tree.remove("a:b");

        // "a" still exists as an empty section after a plain leaf removal.
        let mut iter = tree.iter();
        assert!(iter.next().is_none());
        // The empty section was opened and closed between start and end.
        let closing = iter.closing_trace();
        assert_eq!(closing.len(), 2);
        assert_eq!(event(closing, 0), ("a", TraceAction::Opened));
        assert_eq!(event(closing, 1), ("a", TraceAction::Closed));
    }
}
