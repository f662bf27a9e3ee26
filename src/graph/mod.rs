//! Per-cluster sequence graph: build, condense, decorate.

pub mod node;

pub use node::{AlleleType, Node};

use crate::errors::AdjudicationError;
use crate::model::{Region, Variant};
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub type NodeIndex = petgraph::stable_graph::NodeIndex<u32>;

/// Owns every `Node` created for one cluster's bubble graph. Built and
/// decorated single-threaded; read-only for the rest of the cluster's
/// lifetime once `build` returns.
pub struct Graph {
    pub graph: StableDiGraph<Node, (), u32>,
    pub first_node: NodeIndex,
    pub last_node: NodeIndex,
    pub region: Region,
    pub variants: Vec<Arc<Variant>>,
    aligned_reads: Mutex<HashSet<(String, u8)>>,
}

impl Graph {
    /// Builds the graph for one cluster against an already-fetched,
    /// already-flanked reference slice. `flanked_region`
    /// is the exact region `reference` was fetched for -- its `.start` is
    /// the 1-based position of `reference[0]`.
    ///
    /// When `include_alt` is `false`, no alternate branches are added: this
    /// produces the reference-only graph alignments are compared
    /// against to detect reference ties.
    pub fn build(
        variants: &[Arc<Variant>],
        reference: &[u8],
        flanked_region: Region,
        include_alt: bool,
    ) -> Result<Graph, AdjudicationError> {
        if reference.is_empty() {
            return Err(AdjudicationError::graph_invariant("empty reference sequence for cluster"));
        }

        let mut graph = StableDiGraph::<Node, (), u32>::new();
        let mut position_index: HashMap<i64, NodeIndex> = HashMap::with_capacity(reference.len());
        let mut prev_idx: Option<NodeIndex> = None;
        let mut first_node = None;
        let mut last_node = None;

        for (i, &base) in reference.iter().enumerate() {
            let position = flanked_region.start as i64 + i as i64;
            let idx = graph.add_node(Node::new_ref(base, position));
            position_index.insert(position, idx);
            if first_node.is_none() {
                first_node = Some(idx);
            }
            if let Some(p) = prev_idx {
                graph.update_edge(p, idx, ());
            }
            prev_idx = Some(idx);
            last_node = Some(idx);
        }
        let first_node = first_node.unwrap();
        let last_node = last_node.unwrap();

        if include_alt {
            for variant in variants {
                let p = variant.position;
                let ref_len = variant.reference.len() as i64;

                for pos in p..=(p + ref_len - 1) {
                    if let Some(&idx) = position_index.get(&pos) {
                        graph[idx].overlapping_alleles.push(variant.reference.clone());
                    }
                }

                let in_idx = *position_index.get(&(p - 1)).ok_or_else(|| {
                    AdjudicationError::graph_invariant(format!("missing reference in-node for variant at {}", p))
                })?;
                let out_idx = *position_index.get(&(p + ref_len)).ok_or_else(|| {
                    AdjudicationError::graph_invariant(format!("missing reference out-node for variant at {}", p))
                })?;

                for alt in &variant.alternates {
                    let alt_idx = graph.add_node(Node::new_alt(alt.sequence().to_vec(), p, alt.clone()));
                    graph.update_edge(in_idx, alt_idx, ());
                    graph.update_edge(alt_idx, out_idx, ());
                }
            }
        }

        let mut built = Graph {
            graph,
            first_node,
            last_node,
            region: flanked_region,
            variants: variants.to_vec(),
            aligned_reads: Mutex::new(HashSet::new()),
        };
        built.condense()?;
        built.decorate_prefix_suffix();
        Ok(built)
    }

    fn ref_in_neighbor(graph: &StableDiGraph<Node, (), u32>, idx: NodeIndex) -> Option<NodeIndex> {
        graph.neighbors_directed(idx, Direction::Incoming).find(|&n| !graph[n].is_alt())
    }

    /// Walks the reference spine from the sink backward, merging
    /// unbranched adjacent ref nodes to a fixpoint.
    fn condense(&mut self) -> Result<(), AdjudicationError> {
        let mut cur = self.last_node;
        while self.graph.neighbors_directed(cur, Direction::Incoming).count() > 0 {
            let prev = Self::ref_in_neighbor(&self.graph, cur).ok_or_else(|| {
                AdjudicationError::graph_invariant(format!(
                    "missing reference in-node during condensation at node position {}",
                    self.graph[cur].position
                ))
            })?;
            let cur_in_degree = self.graph.neighbors_directed(cur, Direction::Incoming).count();
            let prev_out_degree = self.graph.neighbors_directed(prev, Direction::Outgoing).count();

            if cur_in_degree > 1 || prev_out_degree > 1 {
                cur = prev;
                continue;
            }

            let targets: Vec<NodeIndex> = self.graph.neighbors_directed(cur, Direction::Outgoing).collect();
            let cur_node = self.graph.remove_node(cur).expect("cur was just looked up in this graph");
            self.graph[prev].absorb(&cur_node);
            for target in targets {
                self.graph.update_edge(prev, target, ());
            }
            if cur == self.last_node {
                self.last_node = prev;
            }
            cur = prev;
        }
        Ok(())
    }

    /// For every bubble (a node with more than one out-neighbor), records
    /// the longest common prefix/suffix observed between each sibling pair
    /// into both siblings' `identical_*_length`.
    fn decorate_prefix_suffix(&mut self) {
        let branch_points: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&n| self.graph.neighbors_directed(n, Direction::Outgoing).count() > 1)
            .collect();

        for parent in branch_points {
            let siblings: Vec<NodeIndex> = self.graph.neighbors_directed(parent, Direction::Outgoing).collect();
            for i in 0..siblings.len() {
                for j in 0..siblings.len() {
                    if i == j {
                        continue;
                    }
                    let a = siblings[i];
                    let b = siblings[j];
                    let prefix = common_prefix_len(&self.graph[a].sequence, &self.graph[b].sequence);
                    let suffix = common_suffix_len(&self.graph[a].sequence, &self.graph[b].sequence);
                    if prefix > self.graph[a].identical_prefix_length {
                        self.graph[a].identical_prefix_length = prefix;
                    }
                    if suffix > self.graph[a].identical_suffix_length {
                        self.graph[a].identical_suffix_length = suffix;
                    }
                }
            }
        }
    }

    /// Topological order of nodes, required by the aligner to process
    /// predecessors before their successors.
    pub fn topo_order(&self) -> Result<Vec<NodeIndex>, AdjudicationError> {
        petgraph::algo::toposort(&self.graph, None)
            .map_err(|cycle| AdjudicationError::graph_invariant(format!("cycle detected at node {:?}", cycle.node_id())))
    }

    /// Concatenates the reference spine (following only non-alt edges)
    /// from source to sink; used to check the reference-spine invariant in tests.
    pub fn reference_sequence(&self) -> Vec<u8> {
        let mut bases = Vec::new();
        let mut cur = Some(self.first_node);
        while let Some(idx) = cur {
            bases.extend_from_slice(&self.graph[idx].sequence);
            cur = self.graph.neighbors_directed(idx, Direction::Outgoing).find(|&n| !self.graph[n].is_alt());
        }
        bases
    }

    /// Registers that `(read_id, mate_ordinal)` is about to be aligned
    /// against this graph. Returns `true` the first time, `false` on any
    /// later call for the same identity.
    pub fn claim_read(&self, read_id: &str, mate_ordinal: u8) -> bool {
        let mut aligned = self.aligned_reads.lock().unwrap();
        aligned.insert((read_id.to_string(), mate_ordinal))
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variant;

    fn single_snv_cluster() -> (Vec<Arc<Variant>>, Vec<u8>, Region) {
        // reference chr1:100-110 (1-based, inclusive start) = ACGTACGTACG
        let reference = b"ACGTACGTACG".to_vec();
        let region = Region::new("chr1", 100, 111);
        let variant = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
        (vec![variant], reference, region)
    }

    #[test]
    fn reference_spine_reproduces_fetched_sequence() {
        let (variants, reference, region) = single_snv_cluster();
        let graph = Graph::build(&variants, &reference, region, true).unwrap();
        assert_eq!(graph.reference_sequence(), reference);
    }

    #[test]
    fn single_snv_creates_one_alt_bubble() {
        let (variants, reference, region) = single_snv_cluster();
        let graph = Graph::build(&variants, &reference, region, true).unwrap();
        let alt_nodes: Vec<_> = graph.graph.node_indices().filter(|&n| graph.graph[n].is_alt()).collect();
        assert_eq!(alt_nodes.len(), 1);
        assert_eq!(graph.graph[alt_nodes[0]].sequence, b"T");
    }

    #[test]
    fn reference_only_graph_has_no_alt_nodes() {
        let (variants, reference, region) = single_snv_cluster();
        let graph = Graph::build(&variants, &reference, region, false).unwrap();
        assert!(graph.graph.node_indices().all(|n| !graph.graph[n].is_alt()));
    }

    #[test]
    fn single_source_and_sink() {
        let (variants, reference, region) = single_snv_cluster();
        let graph = Graph::build(&variants, &reference, region, true).unwrap();
        assert_eq!(graph.graph.neighbors_directed(graph.first_node, Direction::Incoming).count(), 0);
        assert_eq!(graph.graph.neighbors_directed(graph.last_node, Direction::Outgoing).count(), 0);
    }

    #[test]
    fn read_claim_is_idempotent() {
        let (variants, reference, region) = single_snv_cluster();
        let graph = Graph::build(&variants, &reference, region, true).unwrap();
        assert!(graph.claim_read("r1", 1));
        assert!(!graph.claim_read("r1", 1));
        assert!(graph.claim_read("r1", 2));
    }

    #[test]
    fn two_overlapping_snvs_produce_two_bubbles() {
        let reference = b"ACGTACGTACG".to_vec();
        let region = Region::new("chr1", 100, 111);
        let v1 = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
        let v2 = Arc::new(Variant::new("chr1", 107, "G", vec![b"C".to_vec()], vec![], false));
        let graph = Graph::build(&[v1, v2], &reference, region, true).unwrap();
        let alt_nodes: Vec<_> = graph.graph.node_indices().filter(|&n| graph.graph[n].is_alt()).collect();
        assert_eq!(alt_nodes.len(), 2);
    }
}
