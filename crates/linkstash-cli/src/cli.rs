use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linkstash", about = "Capture and browse followed links", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file
    #[arg(long, global = true, default_value = "linkstash.toml")]
    pub config: PathBuf,

    /// Store directory, overriding the configuration file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record a link followed from one page to another
    Add(AddArgs),
    /// List stored links, newest first
    List(ListArgs),
    /// Remove every stored link
    Clear,
    /// Probe the gateway until the store is ready
    Ping,
    /// Serve the gateway over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    pub source: String,
    pub target: String,
    /// Capture time in epoch milliseconds; defaults to now
    #[arg(long)]
    pub timestamp: Option<i64>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only links captured on this page
    #[arg(long, conflicts_with = "target")]
    pub source: Option<String>,
    /// Only links pointing at this address
    #[arg(long)]
    pub target: Option<String>,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add() {
        let cli = Cli::try_parse_from([
            "linkstash",
            "add",
            "https://a.example",
            "https://b.example",
            "--timestamp",
            "1000",
        ])
        .unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.source, "https://a.example");
            assert_eq!(args.target, "https://b.example");
            assert_eq!(args.timestamp, Some(1000));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "linkstash", "list", "--store", "/tmp/s", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::List(_)));
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("linkstash.toml"));
    }

    #[test]
    fn list_filters_conflict() {
        assert!(Cli::try_parse_from(["linkstash", "list", "--source", "a", "--target", "b"]).is_err());
    }

    #[test]
    fn parse_serve_bind() {
        let cli = Cli::try_parse_from(["linkstash", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.unwrap().port(), 9000);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn add_requires_both_urls() {
        assert!(Cli::try_parse_from(["linkstash", "add", "https://a.example"]).is_err());
    }
}
