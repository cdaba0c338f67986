use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docpatch::{patch_document, plan_patch, Error, FsStore, MemoryStore, Mode, Patch, PatchOutcome};

/// Insert a block before an anchor in a document, once.
///
/// The document is left alone when the marker is already present, so repeated
/// runs are safe.
#[derive(Parser, Debug)]
#[command(name = "docpatch", version, about, long_about = None)]
struct Cli {
    /// Document name relative to --base, or `-` with --stdin
    #[arg(value_name = "NAME")]
    name: String,

    /// Directory the document name is resolved against
    #[arg(long, value_name = "DIR", required_unless_present = "stdin")]
    base: Option<PathBuf>,

    /// Text the addition is inserted in front of (first occurrence)
    #[arg(long, allow_hyphen_values = true)]
    anchor: String,

    /// Text to insert
    #[arg(
        long,
        allow_hyphen_values = true,
        required_unless_present = "addition_file",
        conflicts_with = "addition_file"
    )]
    addition: Option<String>,

    /// Read the text to insert from a file
    #[arg(long, value_name = "PATH")]
    addition_file: Option<PathBuf>,

    /// Substring of the addition whose presence means the patch was already applied
    #[arg(long, allow_hyphen_values = true)]
    marker: String,

    /// Report what would happen without writing
    #[arg(long)]
    dry_run: bool,

    /// Read the document from stdin and print the patched text to stdout
    #[arg(long)]
    stdin: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_usage() => 2,
        _ => 1,
    }
}

fn load_patch(cli: &Cli) -> Result<Patch> {
    let addition = match (&cli.addition, &cli.addition_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read addition file {}", path.display()))?,
        (None, None) => bail!("one of --addition or --addition-file is required"),
    };
    let patch = Patch::new(cli.anchor.as_str(), addition, cli.marker.as_str()).map_err(Error::from)?;
    Ok(patch)
}

fn run_stdin(cli: &Cli) -> Result<()> {
    let patch = load_patch(cli)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let store = MemoryStore::new().with_document(&cli.name, &input);
    let patched = plan_patch(&store, &cli.name, &patch)?;
    print!("{}", patched.content);
    Ok(())
}

fn run_file(cli: &Cli, base: PathBuf) -> Result<()> {
    let patch = load_patch(cli)?;
    let store = FsStore::new(base);
    let mode = if cli.dry_run { Mode::DryRun } else { Mode::Write };

    match patch_document(&store, &cli.name, &patch, mode)? {
        PatchOutcome::Applied if mode == Mode::DryRun => println!("would expand {}", cli.name),
        PatchOutcome::Applied => println!("expanded {}", cli.name),
        PatchOutcome::AlreadyApplied => println!("already expanded {}", cli.name),
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = if cli.stdin {
        if cli.name != "-" {
            eprintln!("error: with --stdin, NAME must be '-' (got '{}')", cli.name);
            process::exit(2);
        }
        run_stdin(&cli)
    } else {
        match cli.base.clone() {
            Some(base) => run_file(&cli, base),
            None => {
                eprintln!("error: --base is required unless --stdin is given");
                process::exit(2);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(exit_code(&e));
    }
}
