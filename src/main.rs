use clap::Parser;
use paperback::shamir::MIN_COMBINE;
use paperback::{BackupConfig, Backupper, Compression, PaperbackError, Recoverer};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("PAPERBACK_VERSION");
const PROFILE: &str = env!("PAPERBACK_PROFILE");
const GIT_HASH: &str = env!("PAPERBACK_GIT_HASH");

const SAMPLE_SECRET: &str = "this is a secret which is a bit larger";

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "paperback")]
#[command(author, about = "Threshold-shared paper backups", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Shards needed to recover
    #[arg(short = 'k', long, default_value = "3")]
    threshold: usize,

    /// Shards to create
    #[arg(short = 'n', long, default_value = "6")]
    shards: usize,

    /// Compression algorithm
    #[arg(long, default_value = "zstd", value_parser = parse_compression)]
    compression: Compression,

    /// Write master.json and shard-N.json here instead of printing them
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Document to back up
    secret: Option<String>,
}

fn parse_compression(s: &str) -> Result<Compression, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn run(cli: &Cli) -> paperback::Result<()> {
    let secret = cli.secret.as_deref().unwrap_or(SAMPLE_SECRET);
    let config = BackupConfig {
        compression: cli.compression,
        ..Default::default()
    };

    let backup = Backupper::create_with_config(secret.as_bytes(), config)?;
    let shards = backup.shards(cli.threshold, cli.shards)?;

    match &cli.out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::write(dir.join("master.json"), backup.master().to_json()?)?;
            for (i, shard) in shards.iter().enumerate() {
                fs::write(dir.join(format!("shard-{}.json", i + 1)), shard.to_json()?)?;
            }
            println!("Wrote master and {} shards to {}", shards.len(), dir.display());
        }
        None => {
            println!("{}", backup.master().to_json()?);
            for shard in &shards {
                println!("{}", shard.to_json()?);
            }
        }
    }

    // Recovery combines at least two shards
    if shards.len() < MIN_COMBINE {
        println!(
            "Skipping recovery check: {} shard, at least {} needed to recover",
            shards.len(),
            MIN_COMBINE
        );
        return Ok(());
    }

    let mut recoverer = Recoverer::new(backup.master().clone());
    for shard in shards.iter().take(cli.threshold.max(MIN_COMBINE)) {
        recoverer.add_shard(shard)?;
    }
    let document = recoverer.recover()?;

    if &document[..] != secret.as_bytes() {
        return Err(PaperbackError::MasterDecryptionFailed);
    }
    println!("Recovered {} bytes from {} shards", document.len(), recoverer.shard_count());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("paperback {}", get_version());
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
