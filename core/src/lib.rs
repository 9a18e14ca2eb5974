//! Typed, hierarchical, self-validating parameter trees.
//!
//! This crate models a tool's configurable parameters as an owned tree
//! addressed by colon-delimited paths:
//!
//! - [`Value`] — the polymorphic scalar/list payload every leaf holds
//!   (empty, int, double, string, and homogeneous lists), with strict
//!   conversion and comparison semantics.
//! - [`Entry`] — a named leaf: one [`Value`] plus description, tags, and an
//!   optional [`Restriction`].
//! - [`Node`] — an interior section owning ordered child entries and
//!   sections.
//! - [`ParamTree`] — the path-addressed facade: lookup, insertion, removal,
//!   structural equality, set algebra ([`merge`](ParamTree::merge),
//!   [`update`](ParamTree::update), [`set_defaults`](ParamTree::set_defaults)),
//!   defaults checking, and command-line ingestion.
//! - [`ParamIter`] — pre-order traversal with section open/close
//!   [`TraceEvent`]s, the interface external encoders flatten the tree
//!   through.
//!
//! The tree is a single-threaded, in-process data structure: no I/O, no
//! locking, every operation bounded by tree size. Serialization of the data
//! model goes through [`serde`]; rendering to any specific tool-description
//! format is left to external encoders walking the iterator.
//!
//! # Example
//!
//! ```
//! use param_tree_core::{ParamTree, Value};
//!
//! let mut tree = ParamTree::new();
//! tree.set_value("test:float", 17.4, "floatdesc");
//! tree.set_value("alg:mode", "fast", "Search mode");
//! tree.set_valid_strings("alg:mode", &["fast", "thorough"]).unwrap();
//!
//! let value = tree.get_value("test:float").unwrap();
//! assert_eq!(f64::try_from(value), Ok(17.4));
//! assert_eq!(tree.get_description("test:float").unwrap(), "floatdesc");
//!
//! // Defaults checking accumulates warnings instead of failing fast.
//! let mut config = ParamTree::new();
//! config.set_value("alg:mode", "sloppy", "");
//! let warnings = config.check_defaults("mytool", &tree, "");
//! assert_eq!(warnings.len(), 1);
//! ```

mod cmdline;
mod error;
mod iter;
mod merge;
mod tree;
mod types;
mod validate;
mod value;

pub use cmdline::FlagRules;
pub use error::{ParamError, Result};
pub use iter::{ParamIter, TraceAction, TraceEvent, VisitedEntry};
pub use merge::{ReservedPaths, UpdateReport};
pub use tree::ParamTree;
pub use types::{Entry, Node, Restriction, RestrictionError, ToolInfo};
pub use validate::DefaultsWarning;
pub use value::{Value, ValueKind};
