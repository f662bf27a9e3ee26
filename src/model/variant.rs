use crate::model::{Allele, Region};
use std::sync::Arc;

/// Position + ref allele + alt alleles, plus whatever columns of the
/// source VCF record this crate doesn't interpret. `skip_adjudication`
/// is set for records the clusterer must never co-graph with anything else
/// -- structural variants today; kept as a flag rather than a
/// second `Variant` subtype because nothing else about a skipped record
/// differs.
#[derive(Debug, Clone)]
pub struct Variant {
    pub chrom: String,
    pub position: i64,
    pub reference: Arc<Allele>,
    pub alternates: Vec<Arc<Allele>>,
    pub original_columns: Vec<String>,
    pub skip_adjudication: bool,
}

impl Variant {
    pub fn new(
        chrom: impl Into<String>,
        position: i64,
        reference: impl Into<Vec<u8>>,
        alternates: Vec<Vec<u8>>,
        original_columns: Vec<String>,
        skip_adjudication: bool,
    ) -> Self {
        Variant {
            chrom: chrom.into(),
            position,
            reference: Arc::new(Allele::new(reference)),
            alternates: alternates.into_iter().map(|seq| Arc::new(Allele::new(seq))).collect(),
            original_columns,
            skip_adjudication,
        }
    }

    /// The half-open reference span `[position, position + len(ref))`, in
    /// the same 1-based coordinate system as `position`.
    pub fn reference_span(&self) -> Region {
        Region::new(self.chrom.clone(), self.position as u64, self.position as u64 + self.reference.len() as u64)
    }

    pub fn overlaps(&self, other: &Variant) -> bool {
        self.reference_span().overlaps(&other.reference_span())
    }

    pub fn all_alleles(&self) -> impl Iterator<Item = &Arc<Allele>> {
        std::iter::once(&self.reference).chain(self.alternates.iter())
    }
}
