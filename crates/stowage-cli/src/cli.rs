use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stowage",
    about = "Content-addressed bundle store: deduplicated file bundles, downloadable as tar.gz",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage root holding blobs and the bundle registry.
    #[arg(long, global = true, default_value = "data")]
    pub root: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a bundle from files or directories
    Create(CreateArgs),
    /// List all bundles
    List(ListArgs),
    /// Download a bundle as a tar.gz archive
    Download(DownloadArgs),
    /// Start the stowage HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Files or directories to include (directories are walked recursively)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct DownloadArgs {
    /// Bundle id to download
    pub id: String,
    /// Output path (defaults to <id>.tar.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create() {
        let cli = Cli::try_parse_from(["stowage", "create", "a.txt", "b.txt"]).unwrap();
        if let Command::Create(args) = cli.command {
            assert_eq!(args.paths, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn create_requires_a_path() {
        assert!(Cli::try_parse_from(["stowage", "create"]).is_err());
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["stowage", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn parse_download_with_output() {
        let cli =
            Cli::try_parse_from(["stowage", "download", "abc123", "-o", "out.tar.gz"]).unwrap();
        if let Command::Download(args) = cli.command {
            assert_eq!(args.id, "abc123");
            assert_eq!(args.output, Some(PathBuf::from("out.tar.gz")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["stowage", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, "0.0.0.0:9000");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_root() {
        let cli = Cli::try_parse_from(["stowage", "--root", "/var/stowage", "list"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/var/stowage"));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["stowage", "--verbose", "list"]).unwrap();
        assert!(cli.verbose);
    }
}
