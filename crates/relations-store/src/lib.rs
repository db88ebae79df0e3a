//! Persistence for relations: users, and named relations owned by them.
//!
//! The whole database is one JSON document. [`MatrixDatabase::open`] reads it
//! into memory, every change happens in memory, and
//! [`MatrixDatabase::save_to`] writes the document back.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use chrono::Utc;
use relations::RelationMatrix;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

mod error;
mod records;

pub use error::StoreError;
pub use records::{MatrixId, StoredMatrix, User, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDatabase {
    next_user: u64,
    next_matrix: u64,
    users: Vec<User>,
    matrices: Vec<StoredMatrix>,
}

fn check_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() { Err(StoreError::BlankName) } else { Ok(()) }
}

impl MatrixDatabase {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the database at `path`. A missing file is an empty database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no database file, starting empty");
                return Ok(Self::in_memory());
            }
            Err(e) => return Err(e.into()),
        };
        let db: Self = serde_json::from_str(&text)?;
        debug!(
            path = %path.display(),
            users = db.users.len(),
            matrices = db.matrices.len(),
            "loaded database"
        );
        Ok(db)
    }

    /// Write an empty database to `path` unless there already is a file.
    /// Returns `true` if a new file was created.
    pub fn ensure_exists(path: &Path) -> Result<bool, StoreError> {
        if path.exists() {
            return Ok(false);
        }
        Self::in_memory().save_to(path)?;
        info!(path = %path.display(), "created database");
        Ok(true)
    }

    /// Write the database to `path`. The document is written next to `path`
    /// first and then renamed over it, so a failed write leaves the old file.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(self)?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "saved database");
        Ok(())
    }

    pub fn add_user(&mut self, username: &str) -> Result<UserId, StoreError> {
        check_name(username)?;
        if self.user_by_name(username).is_some() {
            return Err(StoreError::DuplicateUser(username.to_owned()));
        }
        self.next_user += 1;
        let id = UserId::new(self.next_user);
        self.users.push(User { id, username: username.to_owned() });
        debug!(%id, username, "added user");
        Ok(id)
    }

    /// The user called `username`, created if there is none yet.
    pub fn ensure_user(&mut self, username: &str) -> Result<UserId, StoreError> {
        match self.user_by_name(username) {
            Some(user) => Ok(user.id),
            None => self.add_user(username),
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Remove a user together with everything they stored.
    pub fn remove_user(&mut self, id: UserId) -> Result<User, StoreError> {
        let pos =
            self.users.iter().position(|u| u.id == id).ok_or(StoreError::UnknownUser(id))?;
        self.matrices.retain(|m| m.owner != id);
        let user = self.users.remove(pos);
        debug!(%id, "removed user");
        Ok(user)
    }

    /// Store `matrix` as `name` for `owner`, stamped with the current time.
    pub fn save_matrix(
        &mut self,
        owner: UserId,
        name: &str,
        matrix: &RelationMatrix,
    ) -> Result<MatrixId, StoreError> {
        if self.user(owner).is_none() {
            return Err(StoreError::UnknownUser(owner));
        }
        check_name(name)?;
        if self.find_matrix(owner, name).is_some() {
            return Err(StoreError::DuplicateName { owner, name: name.to_owned() });
        }
        self.next_matrix += 1;
        let id = MatrixId::new(self.next_matrix);
        let stored = StoredMatrix::new(id, owner, name.to_owned(), Utc::now(), matrix);
        debug!(%id, %owner, name, size = stored.size, "stored matrix");
        self.matrices.push(stored);
        Ok(id)
    }

    /// Everything `owner` stored, newest first.
    pub fn matrices(&self, owner: UserId) -> Vec<&StoredMatrix> {
        let mut out: Vec<&StoredMatrix> =
            self.matrices.iter().filter(|m| m.owner == owner).collect();
        out.sort_by(|a, b| (b.created, b.id).cmp(&(a.created, a.id)));
        out
    }

    pub fn find_matrix(&self, owner: UserId, name: &str) -> Option<&StoredMatrix> {
        self.matrices.iter().find(|m| m.owner == owner && m.name == name)
    }

    pub fn stored_matrix(&self, id: MatrixId) -> Result<&StoredMatrix, StoreError> {
        self.matrices.iter().find(|m| m.id == id).ok_or(StoreError::UnknownMatrix(id))
    }

    pub fn load_matrix(&self, id: MatrixId) -> Result<RelationMatrix, StoreError> {
        Ok(self.stored_matrix(id)?.to_matrix()?)
    }

    pub fn delete_matrix(&mut self, id: MatrixId) -> Result<StoredMatrix, StoreError> {
        let pos =
            self.matrices.iter().position(|m| m.id == id).ok_or(StoreError::UnknownMatrix(id))?;
        debug!(%id, "deleted matrix");
        Ok(self.matrices.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use relations::{Closure, RelationError, Triple};

    use super::*;

    fn parse(s: &str) -> RelationMatrix {
        s.parse().unwrap()
    }

    #[test]
    fn save_and_load() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let m = parse("010;001;000");
        let id = db.save_matrix(alice, "chain", &m).unwrap();
        assert_eq!(db.load_matrix(id).unwrap(), m);

        let stored = db.find_matrix(alice, "chain").unwrap();
        assert_eq!(stored.size, 3);
        assert_eq!(stored.elements, vec![Triple::new(0, 1, true), Triple::new(1, 2, true)]);
    }

    #[test]
    fn empty_relation_keeps_size() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let id = db.save_matrix(alice, "nothing", &RelationMatrix::empty(4).unwrap()).unwrap();
        assert_eq!(db.load_matrix(id).unwrap(), RelationMatrix::empty(4).unwrap());
    }

    #[test]
    fn names_unique_per_owner() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let bob = db.add_user("bob").unwrap();
        let m = parse("1");
        db.save_matrix(alice, "one", &m).unwrap();
        assert!(matches!(
            db.save_matrix(alice, "one", &m),
            Err(StoreError::DuplicateName { owner, .. }) if owner == alice
        ));
        assert!(db.save_matrix(bob, "one", &m).is_ok());
    }

    #[test]
    fn blank_names() {
        let mut db = MatrixDatabase::in_memory();
        assert!(matches!(db.add_user("  "), Err(StoreError::BlankName)));
        let alice = db.add_user("alice").unwrap();
        assert!(matches!(db.save_matrix(alice, "", &parse("0")), Err(StoreError::BlankName)));
        assert!(matches!(db.save_matrix(alice, " \t", &parse("0")), Err(StoreError::BlankName)));
    }

    #[test]
    fn users() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        assert!(matches!(db.add_user("alice"), Err(StoreError::DuplicateUser(_))));
        assert_eq!(db.ensure_user("alice").unwrap(), alice);
        let bob = db.ensure_user("bob").unwrap();
        assert_ne!(bob, alice);
        assert_eq!(db.user(bob).map(|u| u.username.as_str()), Some("bob"));
        assert!(matches!(
            db.save_matrix(UserId::new(99), "x", &parse("0")),
            Err(StoreError::UnknownUser(_))
        ));
    }

    #[test]
    fn newest_first() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let first = db.save_matrix(alice, "first", &parse("0")).unwrap();
        let second = db.save_matrix(alice, "second", &parse("1")).unwrap();
        let ids: Vec<MatrixId> = db.matrices(alice).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn delete() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let id = db.save_matrix(alice, "gone", &parse("0")).unwrap();
        assert_eq!(db.delete_matrix(id).unwrap().name, "gone");
        assert!(matches!(db.load_matrix(id), Err(StoreError::UnknownMatrix(_))));
        assert!(matches!(db.delete_matrix(id), Err(StoreError::UnknownMatrix(_))));
        // The name is free again
        assert!(db.save_matrix(alice, "gone", &parse("0")).is_ok());
    }

    #[test]
    fn removing_user_removes_matrices() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let id = db.save_matrix(alice, "m", &parse("1")).unwrap();
        db.remove_user(alice).unwrap();
        assert!(db.user_by_name("alice").is_none());
        assert!(matches!(db.load_matrix(id), Err(StoreError::UnknownMatrix(_))));
        assert!(matches!(db.remove_user(alice), Err(StoreError::UnknownUser(_))));
    }

    #[test]
    fn corrupt_elements() {
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let id = db.save_matrix(alice, "m", &parse("10;01")).unwrap();
        db.matrices[0].elements.push(Triple::new(5, 0, true));
        assert!(matches!(
            db.load_matrix(id),
            Err(StoreError::Relation(RelationError::OutOfRange { row: 5, .. }))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relations.json");

        assert!(MatrixDatabase::ensure_exists(&path).unwrap());
        assert!(!MatrixDatabase::ensure_exists(&path).unwrap());
        assert_eq!(MatrixDatabase::open(&path).unwrap(), MatrixDatabase::in_memory());

        let mut db = MatrixDatabase::open(&path).unwrap();
        let alice = db.add_user("alice").unwrap();
        let m = Closure::Equivalence.apply(&parse("010;000;000"));
        let id = db.save_matrix(alice, "classes", &m).unwrap();
        db.save_to(&path).unwrap();

        let reopened = MatrixDatabase::open(&path).unwrap();
        assert_eq!(reopened, db);
        assert_eq!(reopened.load_matrix(id).unwrap(), m);
        // Ids keep counting after a reload
        let mut reopened = reopened;
        let bob = reopened.add_user("bob").unwrap();
        assert_ne!(bob, alice);
    }

    #[test]
    fn save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relations.json");
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        db.save_matrix(alice, "big", &RelationMatrix::empty(6).unwrap()).unwrap();
        db.save_to(&path).unwrap();

        let smaller = MatrixDatabase::in_memory();
        smaller.save_to(&path).unwrap();
        assert_eq!(MatrixDatabase::open(&path).unwrap(), smaller);
        // Only the database itself is left in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("relations.json");
        assert!(matches!(MatrixDatabase::in_memory().save_to(&path), Err(StoreError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn huge_stored_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relations.json");
        let mut db = MatrixDatabase::in_memory();
        let alice = db.add_user("alice").unwrap();
        let id = db.save_matrix(alice, "m", &parse("1")).unwrap();
        db.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap().replace("\"size\": 1", "\"size\": 4294967296");
        fs::write(&path, text).unwrap();
        let db = MatrixDatabase::open(&path).unwrap();
        assert_eq!(db.stored_matrix(id).unwrap().size, 1 << 32);
        assert!(matches!(
            db.load_matrix(id),
            Err(StoreError::Relation(RelationError::TooLarge { .. }))
        ));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = MatrixDatabase::open(&dir.path().join("absent.json")).unwrap();
        assert_eq!(db, MatrixDatabase::in_memory());
    }

    #[test]
    fn invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(MatrixDatabase::open(&path), Err(StoreError::Json(_))));
    }
}
