use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use relations::{Closure, RelationError, RelationMatrix};

#[derive(Debug, Parser)]
#[command(name = "relations", version, about = "Build binary relations and apply closures to them")]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, default_value = "relations.json")]
    pub db: PathBuf,

    /// Whose matrices to read and write
    #[arg(long, global = true, default_value = "default")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database file if there is none
    Init,
    /// Start from a relation and apply closures or undo, one step at a time
    Run(RunArgs),
    /// List stored matrices, newest first
    List,
    /// Print a stored matrix
    Show { name: String },
    /// Delete a stored matrix
    Delete { name: String },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: Source,

    /// Chance of each cell being set, for `--random`
    #[arg(long, default_value_t = 0.5)]
    pub density: f64,

    /// Seed for `--random`, to get the same relation every time
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Store the final relation under this name
    #[arg(long)]
    pub save: Option<String>,

    /// Closure names (`reflexive`, `transitive`, ...) or `undo`
    pub steps: Vec<Step>,
}

/// Where the first relation of the session comes from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Rows of 0 and 1, separated by `;` or spaces, e.g. "010;001;000"
    #[arg(long)]
    pub matrix: Option<RelationMatrix>,

    /// Name of a stored matrix
    #[arg(long)]
    pub load: Option<String>,

    /// Size of a random relation
    #[arg(long)]
    pub random: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Apply(Closure),
    Undo,
}

impl FromStr for Step {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("undo") { Ok(Step::Undo) } else { s.parse().map(Step::Apply) }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Apply(c) => write!(f, "{c}"),
            Step::Undo => f.write_str("undo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn steps() {
        assert_eq!("undo".parse(), Ok(Step::Undo));
        assert_eq!("UNDO".parse(), Ok(Step::Undo));
        assert_eq!("transitive".parse(), Ok(Step::Apply(Closure::Transitive)));
        assert!("redo".parse::<Step>().is_err());
    }

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from([
            "relations",
            "--db",
            "x.json",
            "run",
            "--matrix",
            "01;00",
            "symmetric",
            "undo",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(cli.db, PathBuf::from("x.json"));
        assert_eq!(args.source.matrix, Some("01;00".parse().unwrap()));
        assert_eq!(args.steps, vec![Step::Apply(Closure::Symmetric), Step::Undo]);
    }

    #[test]
    fn one_source_only() {
        let both = ["relations", "run", "--matrix", "1", "--random", "3"];
        assert!(Cli::try_parse_from(both).is_err());
        assert!(Cli::try_parse_from(["relations", "run", "reflexive"]).is_err());
    }

    #[test]
    fn bad_matrix() {
        assert!(Cli::try_parse_from(["relations", "run", "--matrix", "012"]).is_err());
    }
}
