use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use stowage_sdk::BundleService;
use stowage_server::{ServerConfig, StowageServer};
use stowage_types::BundleId;
use walkdir::WalkDir;

use crate::cli::{Cli, Command, CreateArgs, DownloadArgs, ServeArgs};

pub fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Create(args) => create(&cli.root, args),
        Command::List(_) => list(&cli.root),
        Command::Download(args) => download(&cli.root, args),
        Command::Serve(args) => serve(&cli.root, args),
    }
}

fn create(root: &Path, args: CreateArgs) -> Result<()> {
    let service = BundleService::open(root)?;

    let mut inputs = Vec::new();
    for path in &args.paths {
        for file_path in collect_files(path)? {
            let name = file_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .with_context(|| format!("unusable file name: {}", file_path.display()))?;
            let file = File::open(&file_path)
                .with_context(|| format!("failed to open {}", file_path.display()))?;
            inputs.push((name, file));
        }
    }
    if inputs.is_empty() {
        bail!("no files found under the given paths");
    }

    let count = inputs.len();
    let id = service.create_bundle(inputs)?;
    println!("{} bundle {} with {} file(s)", "created".green(), id, count);
    Ok(())
}

fn list(root: &Path) -> Result<()> {
    let service = BundleService::open(root)?;
    let summaries = service.list_bundles();
    if summaries.is_empty() {
        println!("no bundles");
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {:>5} file(s)  {:>12} bytes  {}",
            summary.id.to_string().yellow(),
            summary.file_count,
            summary.total_size_bytes,
            summary.created_at.to_rfc3339().dimmed(),
        );
    }
    Ok(())
}

fn download(root: &Path, args: DownloadArgs) -> Result<()> {
    let service = BundleService::open(root)?;
    let id = BundleId::from_string(&args.id);
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{id}.tar.gz")));

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    service.download_bundle_into(&id, file)?;
    println!("{} {}", "wrote".green(), output.display());
    Ok(())
}

fn serve(root: &Path, args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        bind_addr: args
            .bind
            .parse()
            .with_context(|| format!("invalid bind address: {}", args.bind))?,
        storage_root: root.to_path_buf(),
    };
    let server = StowageServer::new(config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Expand a path into the regular files beneath it, in a stable order.
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(path)
        .with_context(|| format!("cannot access {}", path.display()))?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
