//! Command-line surface and the translation from parsed flags into
//! `manager::AdjudicationParams`.

use crate::align::Scoring;
use crate::manager::AdjudicationParams;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "vadjudicate", version, about = "Graph-based realignment and per-allele evidence adjudication for short-read variant calls")]
pub struct Cli {
    /// Indexed reference FASTA (.fai required alongside it).
    #[arg(long)]
    pub fasta: String,

    /// Input VCF/BCF to adjudicate. May be repeated to merge multiple callers' output.
    #[arg(long = "vcf", required = true)]
    pub vcfs: Vec<String>,

    /// Indexed BAM/CRAM of reads supporting the calls.
    #[arg(long)]
    pub bam: String,

    /// Output VCF/BCF path. Format inferred from extension (.bcf => BCF, otherwise VCF).
    #[arg(long)]
    pub output: String,

    /// Restrict to one region, `chrom[:start[-end]]`. Defaults to the whole file.
    #[arg(long)]
    pub region: Option<String>,

    /// Worker threads for the alignment phase. Defaults to all available cores.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Optional TSV path recording every (allele, supporting read) pair.
    #[arg(long = "save-supporting-reads")]
    pub save_supporting_reads: Option<String>,

    /// Match score.
    #[arg(long = "match", default_value_t = 1)]
    pub match_score: i64,

    /// Mismatch penalty.
    #[arg(long, default_value_t = 4)]
    pub mismatch: i64,

    /// Gap open penalty.
    #[arg(long = "gap-open", default_value_t = 6)]
    pub gap_open: i64,

    /// Gap extend penalty.
    #[arg(long = "gap-extend", default_value_t = 1)]
    pub gap_extend: i64,

    /// Minimum percent identity a read must clear to count as a confident hit.
    #[arg(long, default_value_t = 70)]
    pub percent: i64,

    /// Count reads flagged as PCR/optical duplicates.
    #[arg(long)]
    pub include_duplicates: bool,

    /// Increase log verbosity; repeat for more (-v: debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all but error-level logging.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn adjudication_params(&self) -> AdjudicationParams {
        AdjudicationParams {
            scoring: Scoring {
                match_score: self.match_score,
                mismatch_penalty: self.mismatch,
                gap_open: self.gap_open,
                gap_extend: self.gap_extend,
            },
            percent_floor: self.percent,
            threads: self.threads.unwrap_or_else(rayon::current_num_threads),
            include_duplicates: self.include_duplicates,
        }
    }
}

/// Mirrors the teacher's verbosity convention: `-v` raises to debug,
/// `--quiet` lowers to error, `RUST_LOG` always wins if set.
pub fn init_logging(cli: &Cli) {
    let mut log_level = LevelFilter::Info;
    if cli.verbose > 0 {
        log_level = LevelFilter::Debug;
    }
    if cli.quiet {
        log_level = LevelFilter::Error;
    }

    let mut builder = Builder::new();
    builder.filter_level(log_level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        eprintln!("log level already initialized");
    }
}
