use relations::RelationError;

use crate::{MatrixId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no user with id {0}")]
    UnknownUser(UserId),

    #[error("no stored matrix with id {0}")]
    UnknownMatrix(MatrixId),

    #[error("names must not be blank")]
    BlankName,

    #[error("a user called `{0}` already exists")]
    DuplicateUser(String),

    #[error("user {owner} already has a matrix called `{name}`")]
    DuplicateName { owner: UserId, name: String },

    #[error("stored matrix is invalid: {0}")]
    Relation(#[from] RelationError),

    #[error("could not access the database file: {0}")]
    Io(#[from] std::io::Error),

    #[error("database file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
