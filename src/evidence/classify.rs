use crate::align::{NodeSegment, Traceback};
use crate::evidence::CountStratum;
use crate::graph::{Graph, Node};
use crate::io::SupportingReadSink;
use crate::model::Read;

/// `100 * score / L`, where `L` excludes both soft-clip runs. A fully
/// soft-clipped read (`L == 0`) scores 0, which always lands it in `LowQual`.
pub fn total_score_pct(traceback: &Traceback, read_len: usize) -> i64 {
    let softclip_len = traceback.leading_softclip + traceback.trailing_softclip;
    let l = read_len as i64 - softclip_len as i64;
    if l <= 0 {
        0
    } else {
        (traceback.score * 100) / l
    }
}

fn softclip_count(traceback: &Traceback) -> u32 {
    [traceback.leading_softclip, traceback.trailing_softclip].iter().filter(|&&c| c > 0).count() as u32
}

/// Classifies one read's alignment into a stratum per traversed node and
/// records it into each node's overlapping alleles. `total_pct`/`reference_pct`
/// are the same read's percent score against the full graph and the
/// reference-only graph respectively, computed by the caller so a single
/// read-against-two-graphs alignment pair is never repeated here.
pub fn record_evidence(
    graph: &Graph,
    read: &Read,
    full_trace: &Traceback,
    total_pct: i64,
    reference_pct: i64,
    percent_floor: i64,
    supporting_sink: Option<&SupportingReadSink>,
) {
    let is_forward = read.is_forward_strand();
    let identity = read.identity();
    let has_alt = full_trace.segments.iter().any(|s| graph.graph[s.node].is_alt());

    if total_pct == reference_pct && has_alt {
        for segment in &full_trace.segments {
            let node = &graph.graph[segment.node];
            if node.is_alt() {
                node.record_evidence(&read.sample_id, CountStratum::Ambiguous, is_forward, identity.clone());
                emit_supporting(supporting_sink, graph, node, read);
            }
        }
        return;
    }

    if total_pct < percent_floor || softclip_count(full_trace) > 1 {
        for segment in &full_trace.segments {
            graph.graph[segment.node].record_evidence(&read.sample_id, CountStratum::LowQual, is_forward, identity.clone());
        }
        return;
    }

    for segment in &full_trace.segments {
        let node = &graph.graph[segment.node];
        let stratum = node_stratum(node, segment);
        node.record_evidence(&read.sample_id, stratum, is_forward, identity.clone());
        if node.is_alt() && stratum != CountStratum::Ambiguous {
            emit_supporting(supporting_sink, graph, node, read);
        }
    }
}

/// A perfect match confined to bases every sibling branch shares carries no
/// allele-specific signal, so a node wholly inside its own identical
/// prefix/suffix stretch is reported as ambiguous rather than as an
/// allele-specific threshold stratum.
fn node_stratum(node: &Node, segment: &NodeSegment) -> CountStratum {
    if node.is_alt() && node.len() <= node.identical_prefix_length.max(node.identical_suffix_length) {
        return CountStratum::Ambiguous;
    }
    CountStratum::from_node_percent(segment.percent_score())
}

fn emit_supporting(sink: Option<&SupportingReadSink>, graph: &Graph, node: &Node, read: &Read) {
    if let Some(sink) = sink {
        if let Err(e) = sink.record(&graph.region.chrom, node.position, &node.sequence, read) {
            warn!("failed to write supporting-read record: {}", e);
        }
    }
}
