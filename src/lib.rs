//! Counted B-tree collections: sorted maps and sets with logarithmic rank queries.
//!
//! [`CountedTreeMap`] and [`CountedTreeSet`] keep their entries in key order, like
//! `BTreeMap` and `BTreeSet`, and additionally answer positional questions in
//! O(log n):
//!
//! - [`get_by_ordinal`](CountedTreeMap::get_by_ordinal) - the entry at a sorted position
//! - [`ordinal_of_key`](CountedTreeMap::ordinal_of_key) - the sorted position of a key
//! - [`remove_by_ordinal`](CountedTreeMap::remove_by_ordinal) - delete by position
//! - indexing by [`Ordinal`], e.g. `map[Ordinal(0)]`
//!
//! Bounded views ([`sub_map`](CountedTreeMap::sub_map),
//! [`head_map`](CountedTreeMap::head_map), [`tail_map`](CountedTreeMap::tail_map) and
//! their `_mut` forms) expose the same operations over a key window of the same
//! tree, with ordinals counted from the start of the window.
//!
//! # Example
//!
//! ```
//! use counted_tree::{CountedTreeMap, Ordinal, TreeError};
//!
//! let mut scores = CountedTreeMap::new();
//! scores.insert("alice", 100)?;
//! scores.insert("bob", 85)?;
//! scores.insert("carol", 92)?;
//!
//! // The median entry.
//! assert_eq!(scores.get_by_ordinal(scores.len() / 2)?, (&"bob", &85));
//! assert_eq!(scores.ordinal_of_key(&"carol")?, 2);
//! assert_eq!(scores[Ordinal(0)], 100);
//!
//! // Views share the tree.
//! let tail = scores.tail_map("b")?;
//! assert_eq!(tail.len()?, 2);
//! assert_eq!(tail.get_by_ordinal(0)?, (&"bob", &85));
//! # Ok::<(), TreeError>(())
//! ```
//!
//! # Ordering
//!
//! Keys are ordered by a [`Comparator`]. The default, [`NaturalOrder`], uses
//! [`PartialOrd`]; a key it cannot order (such as `f64::NAN`) is rejected with
//! [`TreeError::TypeMismatch`] instead of corrupting the tree. [`OrderBy`] wraps any
//! total-order closure.
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`
//! - **`serde`** - serializes maps as maps and sets as sequences, in key order
//! - **`tracing`** - emits `trace` events for node splits, rotations, fusions and
//!   changes of tree height
//!
//! # Implementation
//!
//! A B-tree of order `m` whose nodes hold between `m` and `2m` keys (the root may
//! hold fewer), with values stored next to their keys in branches and leaves alike.
//! Every node caches the number of entries in its subtree, so a rank is resolved
//! in one root-to-leaf descent. Deletion from a branch substitutes the in-order
//! predecessor; underfull nodes borrow from a sibling or fuse with it.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod error;
mod ordinal;
mod raw;
#[cfg(feature = "serde")]
mod serde;

pub mod counted_map;
pub mod counted_set;

pub use comparator::{Comparator, NaturalOrder, OrderBy};
pub use counted_map::{CountedTreeMap, DEFAULT_ORDER};
pub use counted_set::CountedTreeSet;
pub use error::TreeError;
pub use ordinal::Ordinal;
