use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docpatch::run::Action;
use docpatch::{run_manifest, FsStore, Manifest, Mode};

/// Apply a manifest of patches and fresh documents to a base directory.
#[derive(Parser, Debug)]
#[command(name = "docgen", version, about, long_about = None)]
struct Cli {
    /// Manifest describing the patches and documents
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Directory all document names are resolved against
    #[arg(long, value_name = "DIR")]
    base: PathBuf,

    /// Report what would happen without writing
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let manifest = match Manifest::load(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {:#}", anyhow::Error::new(e));
            process::exit(2);
        }
    };

    if !cli.base.is_dir() {
        eprintln!("error: base directory not found: {}", cli.base.display());
        process::exit(1);
    }

    debug!(
        patches = manifest.patches.len(),
        documents = manifest.documents.len(),
        base = %cli.base.display(),
        "running manifest"
    );

    let store = FsStore::new(&cli.base);
    let mode = if cli.dry_run { Mode::DryRun } else { Mode::Write };
    let report = run_manifest(&store, &manifest, mode);

    for entry in &report.entries {
        match entry.action {
            Action::Failed(_) => eprintln!("error: {entry}"),
            _ => println!("{entry}"),
        }
    }

    if report.has_failures() {
        process::exit(1);
    }
}
