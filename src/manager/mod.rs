//! Fans a position-sorted run of variants out across a thread pool: cluster,
//! build one bubble graph per cluster, realign every overlapping read
//! against it, and fold the resulting evidence back onto the variants.

use crate::align::{Aligner, Scoring};
use crate::cluster::VariantClusterer;
use crate::errors::AdjudicationError;
use crate::evidence;
use crate::graph::Graph;
use crate::io::{AlignmentSource, ReferenceSource, SupportingReadSink, VariantSource};
use crate::model::Variant;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::Arc;

/// Flank added on each side of a cluster's variant span before fetching
/// reference sequence, wide enough to give the longest ordinary indel room
/// to re-anchor on unambiguous reference on both sides.
const GRAPH_SPACING: u64 = 150;

#[derive(Debug, Clone)]
pub struct AdjudicationParams {
    pub scoring: Scoring,
    pub percent_floor: i64,
    pub threads: usize,
    pub include_duplicates: bool,
}

impl Default for AdjudicationParams {
    fn default() -> Self {
        AdjudicationParams { scoring: Scoring::default(), percent_floor: 70, threads: 1, include_duplicates: false }
    }
}

pub struct GraphManager {
    params: AdjudicationParams,
    pool: rayon::ThreadPool,
}

impl GraphManager {
    pub fn new(params: AdjudicationParams) -> Result<Self, AdjudicationError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads)
            .build()
            .map_err(|e| AdjudicationError::resource_limit(format!("failed to start thread pool: {}", e)))?;
        Ok(GraphManager { params, pool })
    }

    /// Drains `variant_source` into memory, clusters it, and realigns every
    /// overlapping read from `alignment_source` against each cluster's
    /// graph. Returns the same variants, now carrying accumulated evidence,
    /// in their original order.
    pub fn run(
        &self,
        variant_source: &mut dyn VariantSource,
        alignment_source: &mut dyn AlignmentSource,
        reference_source: &dyn ReferenceSource,
        supporting_sink: Option<&SupportingReadSink>,
    ) -> Result<Vec<Arc<Variant>>, AdjudicationError> {
        let mut variants = Vec::new();
        while let Some(variant) = variant_source.next()? {
            variants.push(variant);
        }

        let clusters = VariantClusterer::cluster(variants)?;
        let aligner = Aligner::new(self.params.scoring);
        let mut output = Vec::with_capacity(clusters.len());

        let progress = ProgressBar::new(clusters.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} clusters") {
            progress.set_style(style);
        }

        for cluster in clusters {
            if !cluster.is_graphable() {
                output.extend(cluster.variants);
                progress.inc(1);
                continue;
            }

            let flanked_region = cluster.span.expanded(GRAPH_SPACING);
            let reference = reference_source.fetch(&flanked_region)?;
            let full_graph = Graph::build(&cluster.variants, &reference, flanked_region.clone(), true)?;
            let ref_graph = Graph::build(&cluster.variants, &reference, flanked_region, false)?;
            let reads = alignment_source.fetch(&cluster.span)?;

            self.pool.install(|| {
                reads.par_iter().for_each(|read| {
                    self.align_and_record(&aligner, &full_graph, &ref_graph, read, supporting_sink);
                });
            });

            output.extend(cluster.variants);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(output)
    }

    fn align_and_record(
        &self,
        aligner: &Aligner,
        full_graph: &Graph,
        ref_graph: &Graph,
        read: &crate::model::Read,
        supporting_sink: Option<&SupportingReadSink>,
    ) {
        if read.is_duplicate && !self.params.include_duplicates {
            return;
        }
        if !full_graph.claim_read(&read.id, read.mate_ordinal) {
            return;
        }

        let full_trace = match aligner.align_read(full_graph, &read.sequence) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping read {} ({}): {}", read.id, full_graph.region, e);
                return;
            }
        };
        let ref_trace = match aligner.align_read(ref_graph, &read.sequence) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping read {} ({}): {}", read.id, ref_graph.region, e);
                return;
            }
        };

        let total_pct = evidence::total_score_pct(&full_trace, read.sequence.len());
        let reference_pct = evidence::total_score_pct(&ref_trace, read.sequence.len());

        evidence::record_evidence(full_graph, read, &full_trace, total_pct, reference_pct, self.params.percent_floor, supporting_sink);
    }
}
