#[macro_use]
extern crate log;

use clap::Parser;
use std::process;
use vadjudicate::cli::{init_logging, Cli};
use vadjudicate::errors::AdjudicationError;
use vadjudicate::io::{
    BamAlignmentSource, BcfVariantSink, ConcatenatedVariantSource, FastaReferenceSource, RegionFilteredVariantSource,
    SupportingReadSink, VariantSink, VariantSource,
};
use vadjudicate::manager::GraphManager;
use vadjudicate::model::Region;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), AdjudicationError> {
    let region = match &cli.region {
        Some(s) => Some(Region::parse(s)?),
        None => None,
    };

    let sample_id = cli.bam.clone();
    let mut alignment_source = BamAlignmentSource::open(&cli.bam, sample_id, cli.include_duplicates)?;
    let reference_source = FastaReferenceSource::open(&cli.fasta)?;
    let supporting_sink = match &cli.save_supporting_reads {
        Some(path) => Some(SupportingReadSink::create(path)?),
        None => None,
    };

    if cli.vcfs.is_empty() {
        return Err(AdjudicationError::parse("cli", "at least one --vcf is required"));
    }
    let concatenated = ConcatenatedVariantSource::open(&cli.vcfs)?;
    let mut variant_source: Box<dyn VariantSource> = match &region {
        Some(region) => Box::new(RegionFilteredVariantSource::new(concatenated, region.clone())),
        None => Box::new(concatenated),
    };

    let params = cli.adjudication_params();
    let manager = GraphManager::new(params)?;

    info!("adjudicating {} against {} reads from {}", cli.vcfs.join(","), cli.fasta, cli.bam);
    let variants = manager.run(&mut *variant_source, &mut alignment_source, &reference_source, supporting_sink.as_ref())?;

    let mut sink = BcfVariantSink::new(cli.vcfs.clone(), &cli.output);
    sink.emit(&variants)?;

    if let Some(sink) = &supporting_sink {
        sink.flush()?;
    }

    info!("wrote {} adjudicated variants to {}", variants.len(), cli.output);
    Ok(())
}
