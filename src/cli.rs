use clap::{Args, Parser, Subcommand};

/// Drinks menu API.
///
/// Without a subcommand the HTTP server is started.
#[derive(Parser, Debug)]
#[command(name = "drinks-api", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API (expects the database to be set up already)
    Serve,
    /// Create the drinks table; meant for deployment tooling, not the server
    SetupDb(SetupDbArgs),
}

#[derive(Args, Debug)]
pub struct SetupDbArgs {
    /// Drop the drinks table (and its migration history) first
    #[arg(long, default_value_t = false)]
    pub reset: bool,

    /// Insert a sample drink after migrating
    #[arg(long, default_value_t = false)]
    pub seed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["drinks-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn setup_db_flags() {
        let cli = Cli::try_parse_from(["drinks-api", "setup-db", "--reset", "--seed"]).unwrap();
        match cli.command {
            Some(Command::SetupDb(args)) => assert!(args.reset && args.seed),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
