use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use relations::{History, RelationMatrix};
use relations_store::{MatrixDatabase, StoredMatrix};
use tracing::{debug, info, warn};

use crate::cli::{RunArgs, Step};

fn open(db: &Path) -> Result<MatrixDatabase> {
    MatrixDatabase::open(db).with_context(|| format!("could not open {}", db.display()))
}

fn save(db: &MatrixDatabase, path: &Path) -> Result<()> {
    db.save_to(path).with_context(|| format!("could not write {}", path.display()))
}

fn find<'a>(db: &'a MatrixDatabase, user: &str, name: &str) -> Result<&'a StoredMatrix> {
    let owner = db.user_by_name(user).ok_or_else(|| anyhow!("user `{user}` has no matrices"))?;
    db.find_matrix(owner.id, name).ok_or_else(|| anyhow!("user `{user}` has no matrix `{name}`"))
}

/// Names of the properties `m` has, e.g. `reflexive, transitive`.
pub fn describe(m: &RelationMatrix) -> String {
    let checks: [(&str, fn(&RelationMatrix) -> bool); 7] = [
        ("reflexive", RelationMatrix::is_reflexive),
        ("irreflexive", RelationMatrix::is_irreflexive),
        ("symmetric", RelationMatrix::is_symmetric),
        ("antisymmetric", RelationMatrix::is_antisymmetric),
        ("asymmetric", RelationMatrix::is_asymmetric),
        ("transitive", RelationMatrix::is_transitive),
        ("equivalence", RelationMatrix::is_equivalence),
    ];
    let found: Vec<&str> =
        checks.iter().filter(|(_, check)| check(m)).map(|(name, _)| *name).collect();
    if found.is_empty() { "-".to_owned() } else { found.join(", ") }
}

fn seed(db: &MatrixDatabase, user: &str, args: &RunArgs) -> Result<RelationMatrix> {
    let source = &args.source;
    if let Some(matrix) = &source.matrix {
        return Ok(matrix.clone());
    }
    if let Some(name) = &source.load {
        let stored = find(db, user, name)?;
        debug!(id = %stored.id, %name, "loading seed");
        return Ok(stored.to_matrix()?);
    }
    if let Some(size) = source.random {
        let matrix = match args.rng_seed {
            Some(s) => RelationMatrix::random(&mut ChaCha8Rng::seed_from_u64(s), size, args.density)?,
            None => RelationMatrix::random(&mut rand::rng(), size, args.density)?,
        };
        return Ok(matrix);
    }
    bail!("one of --matrix, --load or --random is needed")
}

/// Seed a history with `start` and run every step on it, calling `each` with
/// the step and the relation that is current afterwards.
pub fn replay<F>(start: RelationMatrix, steps: &[Step], mut each: F) -> Result<History>
where
    F: FnMut(Step, &RelationMatrix),
{
    let mut history = History::new();
    history.seed(start);
    for &step in steps {
        match step {
            Step::Apply(closure) => {
                history.apply(closure)?;
                info!(%closure, depth = history.len(), "applied closure");
            }
            Step::Undo => {
                if !history.undo() {
                    warn!("nothing to undo");
                }
            }
        }
        each(step, history.current()?);
    }
    Ok(history)
}

pub fn init(db: &Path) -> Result<()> {
    if MatrixDatabase::ensure_exists(db)? {
        println!("created {}", db.display());
    } else {
        println!("{} already exists", db.display());
    }
    Ok(())
}

pub fn run(db_path: &Path, user: &str, args: RunArgs) -> Result<()> {
    let mut db = open(db_path)?;
    let start = seed(&db, user, &args)?;
    println!("seed ({})\n{start}\n", describe(&start));

    let history = replay(start, &args.steps, |step, current| {
        println!("{step} ({})\n{current}\n", describe(current));
    })?;

    if let Some(name) = &args.save {
        let owner = db.ensure_user(user)?;
        let id = db.save_matrix(owner, name, history.current()?)?;
        save(&db, db_path)?;
        println!("saved as `{name}` ({id})");
    }
    Ok(())
}

pub fn list(db: &Path, user: &str) -> Result<()> {
    let db = open(db)?;
    let Some(owner) = db.user_by_name(user) else {
        return Ok(());
    };
    for m in db.matrices(owner.id) {
        println!("{}\t{}x{}\t{}", m.name, m.size, m.size, m.created.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

pub fn show(db: &Path, user: &str, name: &str) -> Result<()> {
    let db = open(db)?;
    let matrix = find(&db, user, name)?.to_matrix()?;
    println!("{matrix}\n({})", describe(&matrix));
    Ok(())
}

pub fn delete(db_path: &Path, user: &str, name: &str) -> Result<()> {
    let mut db = open(db_path)?;
    let id = find(&db, user, name)?.id;
    db.delete_matrix(id)?;
    save(&db, db_path)?;
    println!("deleted `{name}`");
    Ok(())
}
