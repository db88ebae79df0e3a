use std::{fmt, ops::Index, str::FromStr};

use rand::{Rng, distr::Bernoulli};
use serde::{Deserialize, Serialize};

use crate::RelationError;

/// One stored cell of a relation, the unit persistence deals in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub row: usize,
    pub col: usize,
    pub value: bool,
}

impl Triple {
    pub fn new(row: usize, col: usize, value: bool) -> Self {
        Triple { row, col, value }
    }
}

/// A binary relation over `{0, ..., n-1}`, stored as a dense `n × n` matrix.
///
/// Every cell is defined. Once built, a relation is never changed through the
/// public API; the closures in [`crate::closure`] return new relations.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RelationMatrix {
    dim: usize,
    // Row-major, `elements[row * dim + col]` is `true` if `row` relates to `col`
    elements: Vec<bool>,
}

impl Clone for RelationMatrix {
    fn clone(&self) -> Self {
        Self { dim: self.dim, elements: self.elements.clone() }
    }

    fn clone_from(&mut self, source: &Self) {
        self.dim = source.dim;
        self.elements.clone_from(&source.elements);
    }
}

// Number of cells in a `dim × dim` relation
fn cell_count(dim: usize) -> Result<usize, RelationError> {
    if dim == 0 {
        return Err(RelationError::InvalidSize);
    }
    dim.checked_mul(dim).ok_or(RelationError::TooLarge { size: dim })
}

impl RelationMatrix {
    /// The empty relation, where nothing is related.
    pub fn empty(dim: usize) -> Result<Self, RelationError> {
        let cells = cell_count(dim)?;
        Ok(Self { dim, elements: vec![false; cells] })
    }

    /// Build from every cell, given in row-major order.
    pub fn from_dense(dim: usize, elements: Vec<bool>) -> Result<Self, RelationError> {
        if elements.len() != cell_count(dim)? {
            return Err(RelationError::ShapeMismatch { size: dim, found: elements.len() });
        }
        Ok(Self { dim, elements })
    }

    /// Build by asking `f(row, col)` for every cell.
    pub fn from_fn<F>(dim: usize, mut f: F) -> Result<Self, RelationError>
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut elements = Vec::with_capacity(cell_count(dim)?);
        for row in 0..dim {
            for col in 0..dim {
                elements.push(f(row, col));
            }
        }
        Ok(Self { dim, elements })
    }

    /// Build from a sparse list of cells. Cells that aren't listed are
    /// `false`. Listing a cell twice is fine as long as both values agree.
    pub fn from_sparse<I>(dim: usize, triples: I) -> Result<Self, RelationError>
    where
        I: IntoIterator<Item = Triple>,
    {
        let cells = cell_count(dim)?;
        let mut elements = vec![false; cells];
        let mut seen = vec![false; cells];
        for Triple { row, col, value } in triples {
            if row >= dim || col >= dim {
                return Err(RelationError::OutOfRange { row, col, size: dim });
            }
            let i = row * dim + col;
            if seen[i] && elements[i] != value {
                return Err(RelationError::DuplicateEntry { row, col });
            }
            seen[i] = true;
            elements[i] = value;
        }
        Ok(Self { dim, elements })
    }

    /// Sample a relation where every cell is independently `true` with
    /// probability `density`.
    pub fn random<R: Rng>(rng: &mut R, dim: usize, density: f64) -> Result<Self, RelationError> {
        let cells = cell_count(dim)?;
        let cell = Bernoulli::new(density).map_err(|_| RelationError::InvalidDensity(density))?;
        let elements = rng.sample_iter(cell).take(cells).collect();
        Ok(Self { dim, elements })
    }

    /// Number of elements in the underlying set.
    pub fn size(&self) -> usize {
        self.dim
    }

    /// Returns true if and only if `row` relates to `col`.
    pub fn get(&self, row: usize, col: usize) -> Result<bool, RelationError> {
        if row >= self.dim || col >= self.dim {
            return Err(RelationError::OutOfRange { row, col, size: self.dim });
        }
        Ok(self.elements[row * self.dim + col])
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> &[bool] {
        &self.elements
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.elements.chunks(self.dim)
    }

    /// The `true` cells in row-major order. `false` cells are left out, so
    /// [`RelationMatrix::from_sparse`] with the same size gives back `self`.
    pub fn to_sparse_triples(&self) -> Vec<Triple> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| Triple::new(i / self.dim, i % self.dim, true))
            .collect()
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: bool) {
        debug_assert!(row < self.dim && col < self.dim);
        self.elements[row * self.dim + col] = value;
    }

    pub fn is_reflexive(&self) -> bool {
        (0..self.dim).all(|i| self[(i, i)])
    }

    pub fn is_irreflexive(&self) -> bool {
        (0..self.dim).all(|i| !self[(i, i)])
    }

    pub fn is_symmetric(&self) -> bool {
        for a in 0..self.dim {
            for b in (a + 1)..self.dim {
                if self[(a, b)] != self[(b, a)] {
                    return false;
                }
            }
        }
        true
    }

    /// No two distinct elements relate to each other in both directions.
    pub fn is_antisymmetric(&self) -> bool {
        for a in 0..self.dim {
            for b in (a + 1)..self.dim {
                if self[(a, b)] && self[(b, a)] {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_asymmetric(&self) -> bool {
        self.is_irreflexive() && self.is_antisymmetric()
    }

    pub fn is_transitive(&self) -> bool {
        for a in 0..self.dim {
            for b in 0..self.dim {
                if !self[(a, b)] {
                    continue;
                }
                for c in 0..self.dim {
                    if self[(b, c)] && !self[(a, c)] {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn is_equivalence(&self) -> bool {
        self.is_reflexive() && self.is_symmetric() && self.is_transitive()
    }
}

impl Index<(usize, usize)> for RelationMatrix {
    type Output = bool;

    /// Panics if the cell is outside the matrix, use [`RelationMatrix::get`]
    /// for a checked lookup.
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.dim && col < self.dim);
        &self.elements[row * self.dim + col]
    }
}

impl fmt::Display for RelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            for (j, &cell) in row.iter().enumerate() {
                if j != 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", u8::from(cell))?;
            }
        }
        Ok(())
    }
}

/// Parses rows of `0` and `1`. Rows are separated by newlines or `;`, and
/// then spaces inside a row are ignored, so the output of `Display` reads
/// back. Input on a single line without `;` is split into rows on whitespace
/// instead, as in `"010 001 000"`.
impl FromStr for RelationMatrix {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<String> = if s.trim().contains(['\n', ';']) {
            s.split(['\n', ';'])
                .map(|r| r.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|r| !r.is_empty())
                .collect()
        } else {
            s.split_whitespace().map(str::to_owned).collect()
        };
        let dim = rows.len();
        let mut elements = Vec::with_capacity(cell_count(dim)?);
        for (row, line) in rows.iter().enumerate() {
            let before = elements.len();
            for found in line.chars() {
                match found {
                    '0' => elements.push(false),
                    '1' => elements.push(true),
                    _ => return Err(RelationError::InvalidCell { row, found }),
                }
            }
            let len = elements.len() - before;
            if len != dim {
                return Err(RelationError::RaggedRow { row, len, size: dim });
            }
        }
        Ok(Self { dim, elements })
    }
}
