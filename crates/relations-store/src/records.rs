use std::fmt;

use chrono::{DateTime, Utc};
use relations::{RelationError, RelationMatrix, Triple};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixId(u64);

impl MatrixId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatrixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A relation saved under a name, owned by one user.
///
/// Only the related cells are kept in `elements`. The size is stored next to
/// them because it can't be recovered from a sparse list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMatrix {
    pub id: MatrixId,
    pub owner: UserId,
    pub name: String,
    pub created: DateTime<Utc>,
    pub size: usize,
    pub elements: Vec<Triple>,
}

impl StoredMatrix {
    pub(crate) fn new(
        id: MatrixId,
        owner: UserId,
        name: String,
        created: DateTime<Utc>,
        matrix: &RelationMatrix,
    ) -> Self {
        StoredMatrix {
            id,
            owner,
            name,
            created,
            size: matrix.size(),
            elements: matrix.to_sparse_triples(),
        }
    }

    pub fn to_matrix(&self) -> Result<RelationMatrix, RelationError> {
        RelationMatrix::from_sparse(self.size, self.elements.iter().copied())
    }
}
