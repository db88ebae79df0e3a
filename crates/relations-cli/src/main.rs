use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;

use cli::{Cli, Commands};

// Log levels come from `RELATIONS_LOG`, e.g. `RELATIONS_LOG=relations_store=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RELATIONS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init(&cli.db),
        Commands::Run(args) => commands::run(&cli.db, &cli.user, args),
        Commands::List => commands::list(&cli.db, &cli.user),
        Commands::Show { name } => commands::show(&cli.db, &cli.user, &name),
        Commands::Delete { name } => commands::delete(&cli.db, &cli.user, &name),
    }
}
