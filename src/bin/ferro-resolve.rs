// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-resolve CLI
//!
//! Resolves HGVS c. notations to genomic coordinates.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;

use ferro_resolve::batch::{BatchConfig, BatchProcessor, ItemResult};
use ferro_resolve::{
    FerroConfig, FerroError, GenomicVariant, IndexedFasta, MmapFasta, ResolveOptions, Resolver,
    SequenceSource, TranscriptDb,
};

#[derive(Parser)]
#[command(name = "ferro-resolve")]
#[command(author, version, about = "Resolve HGVS c. notations to genomic coordinates")]
#[command(long_about = "Resolve HGVS c. notations to genomic chrom/pos/ref/alt records.

Examples:
  ferro-resolve --reference hg19.fa --genes refGene.txt 'NM_004333.4:c.1799T>A'
  ferro-resolve --reference hg19.fa --genes refGene.txt -i variants.txt
  cat variants.txt | ferro-resolve --reference hg19.fa --genes refGene.txt --format json")]
struct Cli {
    /// Notations to resolve (read from --input or stdin when absent)
    notations: Vec<String>,

    /// Reference FASTA file (uncompressed; .fai used when present)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// refGene / genePred annotation table
    #[arg(short, long)]
    genes: Option<PathBuf>,

    /// File with one notation per line (use - for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Stop at the first notation that fails
    #[arg(long)]
    fail_fast: bool,

    /// Memory-map the reference FASTA
    #[arg(long)]
    mmap: bool,

    /// Require exact transcript versions
    #[arg(long)]
    strict_version: bool,

    /// Do not check declared reference bases against the genome
    #[arg(long)]
    no_validate: bool,

    /// Worker threads (0 = one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file (default: .ferro.toml, then ~/.config/ferro/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// notation, chrom, pos, ref, alt separated by tabs
    Tsv,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    notation: &'a str,
    #[serde(flatten)]
    variant: &'a GenomicVariant,
}

/// Settings after merging the config file with CLI flags
struct Settings {
    reference: PathBuf,
    genes: PathBuf,
    mmap: bool,
    ignore_version: bool,
    options: ResolveOptions,
    threads: usize,
    fail_fast: bool,
}

impl Settings {
    fn merge(cli: &Cli, config: FerroConfig) -> Result<Self, FerroError> {
        let missing = |flag: &str| FerroError::Config {
            msg: format!("no {} given on the command line or in a config file", flag),
        };
        let reference = cli
            .reference
            .clone()
            .or(config.reference.fasta)
            .ok_or_else(|| missing("--reference"))?;
        let genes = cli
            .genes
            .clone()
            .or(config.annotation.genes)
            .ok_or_else(|| missing("--genes"))?;

        Ok(Self {
            reference,
            genes,
            mmap: cli.mmap || config.reference.mmap,
            ignore_version: config.annotation.ignore_version && !cli.strict_version,
            options: ResolveOptions::new().with_validate_reference(
                config.resolve.validate_reference && !cli.no_validate,
            ),
            threads: cli.threads.unwrap_or(config.resolve.threads),
            fail_fast: cli.fail_fast || config.resolve.fail_fast,
        })
    }
}

fn init_logging(level: Option<&str>) {
    let mut builder = match level {
        Some(level) => {
            let mut b = env_logger::Builder::new();
            b.parse_filters(level);
            b
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
    };
    builder.format_timestamp(None).init();
}

fn load_config(path: Option<&Path>) -> Result<FerroConfig, FerroError> {
    match path {
        Some(path) => FerroConfig::load_from_path(path),
        None => Ok(FerroConfig::load().unwrap_or_default()),
    }
}

/// Read notations, skipping blank lines and `#` comments
fn read_notations<R: BufRead>(reader: R, out: &mut Vec<String>) -> Result<(), FerroError> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        out.push(line.to_string());
    }
    Ok(())
}

fn collect_notations(cli: &Cli) -> Result<Vec<String>, FerroError> {
    let mut notations = cli.notations.clone();
    match &cli.input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path).map_err(|e| FerroError::Io {
                msg: format!("failed to open {}: {}", path.display(), e),
            })?;
            read_notations(BufReader::new(file), &mut notations)?;
        }
        Some(_) => read_notations(io::stdin().lock(), &mut notations)?,
        None if notations.is_empty() => read_notations(io::stdin().lock(), &mut notations)?,
        None => {}
    }
    Ok(notations)
}

fn open_reference(settings: &Settings) -> Result<Box<dyn SequenceSource + Sync>, FerroError> {
    if settings.mmap {
        Ok(Box::new(MmapFasta::open(&settings.reference)?))
    } else {
        Ok(Box::new(IndexedFasta::open(&settings.reference)?))
    }
}

fn resolve_items(
    resolver: &Resolver<'_, dyn SequenceSource + Sync>,
    notations: &[String],
    settings: &Settings,
) -> Result<Vec<ItemResult>, FerroError> {
    if settings.fail_fast {
        let config = BatchConfig::new().continue_on_error(false);
        return Ok(BatchProcessor::with_config(resolver, config)
            .resolve(notations)
            .results);
    }

    #[cfg(feature = "parallel")]
    let results = ferro_resolve::parallel::ParallelConfig::new()
        .with_num_threads(settings.threads)
        .install(|| ferro_resolve::parallel::resolve_parallel(resolver, notations));

    #[cfg(not(feature = "parallel"))]
    let results = Ok(ferro_resolve::batch::resolve_all(resolver, notations));

    results
}

fn write_results(results: &[ItemResult], format: OutputFormat) -> Result<usize, FerroError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut failures = 0;

    for item in results {
        match item {
            ItemResult::Ok { input, variant } => match format {
                OutputFormat::Tsv => writeln!(out, "{}\t{}", input, variant.to_tsv())?,
                OutputFormat::Json => {
                    let record = JsonRecord {
                        notation: input,
                        variant,
                    };
                    let line = serde_json::to_string(&record).map_err(|e| FerroError::Io {
                        msg: format!("failed to serialize {}: {}", input, e),
                    })?;
                    writeln!(out, "{}", line)?;
                }
            },
            ItemResult::Err { input, error } => {
                failures += 1;
                eprintln!("{}\t{}\t{}", input, error.code(), error);
            }
        }
    }
    out.flush()?;
    Ok(failures)
}

fn run(cli: Cli) -> Result<bool, FerroError> {
    let config = load_config(cli.config.as_deref())?;
    let settings = Settings::merge(&cli, config)?;

    let db = TranscriptDb::load_refgene(&settings.genes, settings.ignore_version)?;
    let reference = open_reference(&settings)?;
    let resolver = Resolver::new(&db, reference.as_ref()).with_options(settings.options);

    let notations = collect_notations(&cli)?;
    info!("Resolving {} notations", notations.len());

    let results = resolve_items(&resolver, &notations, &settings)?;
    let failures = write_results(&results, cli.format)?;
    info!(
        "Resolved {} of {} notations ({} failed)",
        results.len() - failures,
        notations.len(),
        failures
    );
    Ok(failures == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: [{}] {}", e.code(), e.detailed_message());
            ExitCode::from(2)
        }
    }
}
