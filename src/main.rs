use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use soundmark::{audio, build, identify, load_manifest, make_hashes, local_maxima, spectrogram};
use soundmark::{Config, Store};

#[derive(Parser)]
#[command(name = "soundmark", about = "Landmark-pair audio fingerprint index and matcher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build (or extend) an index from a manifest file.
    Build {
        manifest: PathBuf,
        #[arg(long, default_value = "index.sqlite")]
        db: PathBuf,
        /// Restrict the build to these song_ids (comma-separated).
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<i64>>,
        /// Delete and re-insert any song that already exists.
        #[arg(long)]
        force: bool,
    },
    /// Identify one or more audio clips against an existing index.
    Identify {
        audio: Vec<PathBuf>,
        #[arg(long, default_value = "index.sqlite")]
        db: PathBuf,
        #[arg(long, default_value_t = 5)]
        topk: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build { manifest, db, ids, force } => run_build(&manifest, &db, ids, force),
        Command::Identify { audio, db, topk } => run_identify(&audio, &db, topk),
    }
}

fn run_build(manifest_path: &PathBuf, db: &PathBuf, ids: Option<Vec<i64>>, force: bool) -> Result<()> {
    let config = Config::default();
    let mut entries = load_manifest(manifest_path).context("loading manifest")?;
    if let Some(ids) = ids {
        entries.retain(|e| ids.contains(&e.song_id));
        if entries.is_empty() {
            anyhow::bail!("no manifest entries matched the requested --ids");
        }
    }

    let mut store = Store::init(db, &config).context("opening index store")?;
    let report = build(&mut store, &config, &entries, force).context("building index")?;

    println!(
        "build complete: {} stored, {} skipped, {} failed",
        report.stored, report.skipped, report.failed
    );
    Ok(())
}

fn run_identify(audio_paths: &[PathBuf], db: &PathBuf, topk: usize) -> Result<()> {
    if audio_paths.is_empty() {
        anyhow::bail!("identify requires at least one audio file");
    }

    let config = Config::default();
    let mut store = Store::init(db, &config).context("opening index store")?;

    for path in audio_paths {
        println!("== {} ==", path.display());
        if let Err(e) = identify_one(&mut store, path, &config, topk) {
            println!("  !! FAILED: {e:#}");
        }
    }

    Ok(())
}

/// Runs one file's decode -> fingerprint -> match -> print. A per-item error here (a bad file,
/// an unreadable codec) is reported and does not abort the other inputs (spec §4.9/§7).
fn identify_one(store: &mut Store, path: &PathBuf, config: &Config, topk: usize) -> Result<()> {
    let samples =
        audio::decode_file(path).with_context(|| format!("decoding {}", path.display()))?;
    let (spec, _) = spectrogram(&samples.data, samples.channels, samples.sample_rate, config);
    let peaks = local_maxima(&spec, config);
    let hashes = make_hashes(&peaks, config);

    let results = identify(store, &hashes, topk).context("matching query")?;
    if results.is_empty() {
        println!("  (no match)");
        return Ok(());
    }

    let meta = store.load_meta().context("loading song metadata")?;
    for candidate in results {
        let (artist, title) = meta
            .get(&candidate.song_id)
            .cloned()
            .unwrap_or_else(|| ("?".into(), "?".into()));
        println!(
            "  {artist} - {title}  votes={} offset={} hits={}",
            candidate.votes, candidate.best_offset, candidate.total_hits
        );
    }

    Ok(())
}
