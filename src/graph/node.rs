use crate::evidence::CountStratum;
use crate::model::Allele;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleType {
    Ref,
    Alt,
}

/// A vertex of a cluster's sequence graph. Built and
/// decorated single-threaded during `Graph::build`, then read-only for the
/// rest of the cluster's lifetime -- the only thing a traversing read
/// mutates is the evidence bank inside each of `overlapping_alleles`
/// .
#[derive(Debug, Clone)]
pub struct Node {
    pub sequence: Vec<u8>,
    pub position: i64,
    pub allele_type: AlleleType,
    pub overlapping_alleles: Vec<Arc<Allele>>,
    pub identical_prefix_length: usize,
    pub identical_suffix_length: usize,
}

impl Node {
    pub fn new_ref(base: u8, position: i64) -> Self {
        Node {
            sequence: vec![base],
            position,
            allele_type: AlleleType::Ref,
            overlapping_alleles: Vec::new(),
            identical_prefix_length: 0,
            identical_suffix_length: 0,
        }
    }

    pub fn new_alt(sequence: Vec<u8>, position: i64, allele: Arc<Allele>) -> Self {
        Node {
            sequence,
            position,
            allele_type: AlleleType::Alt,
            overlapping_alleles: vec![allele],
            identical_prefix_length: 0,
            identical_suffix_length: 0,
        }
    }

    pub fn is_alt(&self) -> bool {
        self.allele_type == AlleleType::Alt
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Merges `downstream` into `self` during condensation:
    /// sequence concatenates, `overlapping_alleles` unions (by pointer
    /// identity, since alleles are shared), position stays the upstream
    /// node's.
    pub fn absorb(&mut self, downstream: &Node) {
        self.sequence.extend_from_slice(&downstream.sequence);
        for allele in &downstream.overlapping_alleles {
            if !self.overlapping_alleles.iter().any(|a| Arc::ptr_eq(a, allele)) {
                self.overlapping_alleles.push(allele.clone());
            }
        }
    }

    /// Routes an alignment's classification into every allele this node
    /// overlaps, routing evidence from ref-node hits back to the right
    /// variants.
    pub fn record_evidence(&self, sample: &str, stratum: CountStratum, is_forward: bool, read: (String, u8)) {
        for allele in &self.overlapping_alleles {
            allele.record_evidence(sample, stratum, is_forward, read.clone());
        }
    }
}
