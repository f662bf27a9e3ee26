//! Groups a position-sorted stream of variants into clusters that will
//! share one bubble graph: a run of mutually overlapping, non-structural
//! records. Structural variants always stand alone -- they are routed
//! straight to the sink without ever being graphed.

use crate::errors::AdjudicationError;
use crate::model::{Region, Variant};
use std::sync::Arc;

pub struct VariantCluster {
    pub span: Region,
    pub variants: Vec<Arc<Variant>>,
}

impl VariantCluster {
    pub fn is_graphable(&self) -> bool {
        !(self.variants.len() == 1 && self.variants[0].skip_adjudication)
    }
}

pub struct VariantClusterer;

impl VariantClusterer {
    /// `variants` must already be sorted by `(chrom, position)`, matching
    /// VCF file order; any record that isn't is reported as a parse error
    /// rather than silently re-sorted, since a sort here would hide an
    /// upstream corruption the caller needs to know about.
    pub fn cluster(variants: Vec<Arc<Variant>>) -> Result<Vec<VariantCluster>, AdjudicationError> {
        let mut clusters = Vec::new();
        let mut iter = variants.into_iter().peekable();
        let mut last_seen: Option<(String, i64)> = None;

        while let Some(variant) = iter.next() {
            check_order(&variant, &mut last_seen)?;

            if variant.skip_adjudication {
                let span = variant.reference_span();
                clusters.push(VariantCluster { span, variants: vec![variant] });
                continue;
            }

            let mut span = variant.reference_span();
            let mut members = vec![variant];
            while let Some(next) = iter.peek() {
                if next.skip_adjudication || !next.reference_span().overlaps(&span) {
                    break;
                }
                let next = iter.next().expect("just peeked Some");
                check_order(&next, &mut last_seen)?;
                span = span.union(&next.reference_span());
                members.push(next);
            }
            clusters.push(VariantCluster { span, variants: members });
        }

        Ok(clusters)
    }
}

fn check_order(variant: &Variant, last_seen: &mut Option<(String, i64)>) -> Result<(), AdjudicationError> {
    if let Some((chrom, pos)) = last_seen {
        if variant.chrom == *chrom && variant.position < *pos {
            return Err(AdjudicationError::parse(
                "vcf",
                format!("variant records are not sorted by position: {}:{} follows {}:{}", variant.chrom, variant.position, chrom, pos),
            ));
        }
    }
    *last_seen = Some((variant.chrom.clone(), variant.position));
    Ok(())
}
