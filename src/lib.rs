//! Height-balanced (AVL) ordered map for Rust.
//!
//! This crate provides [`AvlTreeMap`], an ordered map whose API follows the standard library's
//! `BTreeMap`, extended with:
//!
//! - [`Cursor`](avl_tree_map::Cursor)s that step in both directions and have an end sentinel
//! - [`lower_bound`](AvlTreeMap::lower_bound), [`upper_bound`](AvlTreeMap::upper_bound) and
//!   [`equal_range`](AvlTreeMap::equal_range)
//! - Set combinators [`union`](AvlTreeMap::union), [`intersection`](AvlTreeMap::intersection) and
//!   [`complement`](AvlTreeMap::complement) (symmetric difference)
//! - A pluggable key order through the [`Compare`] trait
//!
//! # Example
//!
//! ```
//! use avl_tree_map::AvlTreeMap;
//!
//! let mut scores = AvlTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // First key not less than "B".
//! assert_eq!(scores.lower_bound(&"B").key(), Some(&"Bob"));
//!
//! let others = AvlTreeMap::from([("Bob", 0), ("Dave", 70)]);
//! let both: Vec<_> = scores.intersection(&others).into_iter().collect();
//! assert_eq!(both, [("Bob", 85)]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **`datasets`** (default) - Named integer-keyed datasets and a small line-oriented command
//!   language over them, see [`Datasets`]
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by compact handles. Each node owns its two
//! child links and keeps a non-owning parent link, which is what lets cursors step to their
//! neighbours without a stack. Every insertion and removal walks back up to the root restoring
//! cached heights and rotating where a node's subtrees differ in height by two.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: `IterMut` hands out disjoint mutable references through a raw pointer to the tree.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod compare;
mod error;
mod raw;
mod set_ops;

pub mod avl_tree_map;
#[cfg(feature = "datasets")]
mod datasets;

pub use avl_tree_map::AvlTreeMap;
pub use compare::{Compare, Natural, Reversed};
#[cfg(feature = "datasets")]
pub use datasets::{Dataset, Datasets};
pub use error::{Error, Result};
