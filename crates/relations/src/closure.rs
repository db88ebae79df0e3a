//! Operations that derive a new relation from an existing one.
//!
//! Each operation is a pure function of its input and returns a relation over
//! the same set. The input is never changed.

use std::{fmt, str::FromStr};

use crate::{RelationError, RelationMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Closure {
    /// Remove every element's relation to itself.
    Irreflexive,
    /// Relate every element to itself.
    Reflexive,
    /// Relate `a` and `b` both ways if they were related in either direction.
    Symmetric,
    /// Keep `a → b` for `a < b` and drop `b → a` whenever `a → b` holds.
    AntiSymmetric,
    /// Like [`Closure::AntiSymmetric`], but also irreflexive.
    Asymmetric,
    /// Transitive closure, computed with Warshall's algorithm.
    Transitive,
    /// The smallest equivalence relation containing the input.
    Equivalence,
}

impl Closure {
    pub const ALL: [Closure; 7] = [
        Closure::Irreflexive,
        Closure::Reflexive,
        Closure::Symmetric,
        Closure::AntiSymmetric,
        Closure::Asymmetric,
        Closure::Transitive,
        Closure::Equivalence,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Closure::Irreflexive => "irreflexive",
            Closure::Reflexive => "reflexive",
            Closure::Symmetric => "symmetric",
            Closure::AntiSymmetric => "antisymmetric",
            Closure::Asymmetric => "asymmetric",
            Closure::Transitive => "transitive",
            Closure::Equivalence => "equivalence",
        }
    }

    #[must_use]
    pub fn apply(self, relation: &RelationMatrix) -> RelationMatrix {
        match self {
            Closure::Irreflexive => relation.to_irreflexive(),
            Closure::Reflexive => relation.to_reflexive(),
            Closure::Symmetric => relation.to_symmetric(),
            Closure::AntiSymmetric => relation.to_antisymmetric(),
            Closure::Asymmetric => relation.to_asymmetric(),
            Closure::Transitive => relation.to_transitive(),
            Closure::Equivalence => relation.to_equivalence(),
        }
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive, and `-` or `_` are ignored, so `Anti-Symmetric` works.
impl FromStr for Closure {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String =
            s.chars().filter(|c| *c != '-' && *c != '_').map(|c| c.to_ascii_lowercase()).collect();
        Closure::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| RelationError::UnknownClosure(s.to_owned()))
    }
}

impl RelationMatrix {
    fn with_diagonal(&self, value: bool) -> Self {
        let mut out = self.clone();
        for i in 0..self.size() {
            out.set(i, i, value);
        }
        out
    }

    // Pairs are visited with `i < j`, so `i → j` always wins over `j → i`
    fn drop_mirrored(&self) -> Self {
        let mut out = self.clone();
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                if self[(i, j)] {
                    out.set(j, i, false);
                }
            }
        }
        out
    }

    // Either direction set means both directions set, the diagonal is untouched
    fn symmetrize(&mut self) {
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                let v = self[(i, j)] || self[(j, i)];
                self.set(i, j, v);
                self.set(j, i, v);
            }
        }
    }

    // Warshall's algorithm. `k` has to be the outermost loop.
    fn close_transitively(&mut self) {
        let n = self.size();
        for k in 0..n {
            for i in 0..n {
                if !self[(i, k)] {
                    continue;
                }
                for j in 0..n {
                    if self[(k, j)] {
                        self.set(i, j, true);
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn to_irreflexive(&self) -> Self {
        self.with_diagonal(false)
    }

    #[must_use]
    pub fn to_reflexive(&self) -> Self {
        self.with_diagonal(true)
    }

    #[must_use]
    pub fn to_symmetric(&self) -> Self {
        let mut out = self.clone();
        out.symmetrize();
        out
    }

    #[must_use]
    pub fn to_antisymmetric(&self) -> Self {
        self.drop_mirrored()
    }

    #[must_use]
    pub fn to_asymmetric(&self) -> Self {
        self.drop_mirrored().with_diagonal(false)
    }

    /// Add `a → c` whenever there is a path from `a` to `c`. One Warshall pass
    /// over the intermediate elements is enough. Cells only ever go from
    /// `false` to `true`.
    #[must_use]
    pub fn to_transitive(&self) -> Self {
        let mut out = self.clone();
        out.close_transitively();
        out
    }

    /// Reflexive and symmetric closure first, then the transitive closure of
    /// that.
    #[must_use]
    pub fn to_equivalence(&self) -> Self {
        let mut out = self.with_diagonal(true);
        out.symmetrize();
        out.close_transitively();
        out
    }
}
