use crate::{Closure, RelationError, RelationMatrix};

/// The undo history of one editing session.
///
/// The last entry is the current relation. Once seeded the history never
/// becomes empty again, undo stops at the seed.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<RelationMatrix>,
}

impl History {
    pub fn new() -> Self {
        History { entries: Vec::new() }
    }

    /// Forget everything and start over from `matrix`.
    pub fn seed(&mut self, matrix: RelationMatrix) {
        self.entries.clear();
        self.entries.push(matrix);
    }

    pub fn push(&mut self, matrix: RelationMatrix) {
        self.entries.push(matrix);
    }

    pub fn current(&self) -> Result<&RelationMatrix, RelationError> {
        self.entries.last().ok_or(RelationError::EmptyHistory)
    }

    /// Go back one step. Does nothing when only the seed is left, and returns
    /// whether anything was removed.
    pub fn undo(&mut self) -> bool {
        if self.entries.len() < 2 {
            return false;
        }
        self.entries.pop();
        true
    }

    /// Apply `closure` to the current relation and make the result current.
    pub fn apply(&mut self, closure: Closure) -> Result<&RelationMatrix, RelationError> {
        let source = self.entries.last().ok_or(RelationError::EmptySource)?;
        let next = closure.apply(source);
        self.entries.push(next);
        self.current()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RelationMatrix> {
        self.entries.iter()
    }

    /// End the session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
