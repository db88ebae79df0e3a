//! A library for binary relations over a small finite set `{0, ..., n-1}`,
//! represented as square boolean matrices.
//!
//! A [`RelationMatrix`] is built once and then only read. New relations are
//! derived from it with a [`Closure`], and a [`History`] keeps every relation
//! of an editing session so the last steps can be undone.
//!
//! Example usage:
//! ```
//! use relations::{Closure, History, RelationMatrix};
//!
//! let seed: RelationMatrix = "010;001;000".parse().unwrap();
//! let mut history = History::new();
//! history.seed(seed);
//!
//! let closed = history.apply(Closure::Transitive).unwrap();
//! assert!(closed.get(0, 2).unwrap());
//!
//! history.undo();
//! assert!(!history.current().unwrap().get(0, 2).unwrap());
//! ```

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod closure;
mod error;
mod history;
mod matrix;

pub use closure::Closure;
pub use error::RelationError;
pub use history::History;
pub use matrix::{RelationMatrix, Triple};
