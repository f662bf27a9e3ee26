//! End-to-end coverage of `GraphManager::run` against in-memory sources: no
//! BAM/FASTA/VCF files touch disk, so these exercise the same clustering,
//! graph-building, and alignment code a real run does without the I/O layer.

use std::sync::Arc;
use vadjudicate::errors::AdjudicationError;
use vadjudicate::evidence::format_sample_counts;
use vadjudicate::io::{AlignmentSource, ReferenceSource, VariantSource};
use vadjudicate::manager::{AdjudicationParams, GraphManager};
use vadjudicate::model::{Read, Region, Variant};

struct VecVariantSource {
    remaining: std::vec::IntoIter<Arc<Variant>>,
}

impl VecVariantSource {
    fn new(variants: Vec<Arc<Variant>>) -> Self {
        VecVariantSource { remaining: variants.into_iter() }
    }
}

impl VariantSource for VecVariantSource {
    fn next(&mut self) -> Result<Option<Arc<Variant>>, AdjudicationError> {
        Ok(self.remaining.next())
    }
}

struct FixedReference {
    chrom: String,
    sequence: Vec<u8>,
}

impl ReferenceSource for FixedReference {
    fn fetch(&self, region: &Region) -> Result<Vec<u8>, AdjudicationError> {
        assert_eq!(region.chrom, self.chrom, "test fixture only serves one contig");
        let start = (region.start as usize).min(self.sequence.len());
        let end = (region.end as usize).min(self.sequence.len());
        Ok(self.sequence[start..end].to_vec())
    }
}

struct FixedReads {
    reads: Vec<Read>,
}

impl AlignmentSource for FixedReads {
    fn fetch(&mut self, region: &Region) -> Result<Vec<Read>, AdjudicationError> {
        Ok(self
            .reads
            .iter()
            .filter(|r| {
                let end = r.position + r.length as i64;
                (r.position as u64) < region.end && (end as u64) > region.start
            })
            .cloned()
            .collect())
    }
}

fn make_read(id: &str, sample: &str, position: i64, sequence: &[u8], is_duplicate: bool) -> Read {
    Read {
        id: id.to_string(),
        mate_ordinal: 1,
        sample_id: sample.to_string(),
        sequence: sequence.to_vec(),
        base_qualities: vec![40; sequence.len()],
        position,
        length: sequence.len() as u32,
        mapq: 60,
        is_reverse_strand: false,
        is_duplicate,
        cigar: vec![],
        mate_position: -1,
        template_length: 0,
        flag: 0,
    }
}

/// An all-`A` background spanning well past the manager's internal flank on
/// both sides of any variant placed in the middle of it. Every test read is
/// cut from this exact same background, so its best alignment is always a
/// full-length, 100%-identity match along the reference spine regardless of
/// where the variant's alt bubble happens to sit.
fn background_reference(chrom: &str) -> FixedReference {
    FixedReference { chrom: chrom.to_string(), sequence: vec![b'A'; 400] }
}

/// A read cut from the all-`A` background with one base substituted at the
/// given 1-based genomic position, so it carries an alt allele rather than
/// reference at that site while matching the background everywhere else.
fn make_read_with_substitution(
    id: &str,
    sample: &str,
    position_0based: i64,
    length: usize,
    variant_position: i64,
    alt_base: u8,
) -> Read {
    let mut sequence = vec![b'A'; length];
    let offset = (variant_position - (position_0based + 1)) as usize;
    sequence[offset] = alt_base;
    make_read(id, sample, position_0based, &sequence, false)
}

fn run_pipeline(
    variants: Vec<Arc<Variant>>,
    reads: Vec<Read>,
    params: AdjudicationParams,
) -> Vec<Arc<Variant>> {
    let mut variant_source = VecVariantSource::new(variants);
    let mut alignment_source = FixedReads { reads };
    let reference_source = background_reference("chr1");
    let manager = GraphManager::new(params).unwrap();
    manager.run(&mut variant_source, &mut alignment_source, &reference_source, None).unwrap()
}

#[test]
fn perfectly_matching_read_supports_the_reference_allele() {
    let variant = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec!["rs1".into()], false));
    let read = make_read("r1", "S", 90, &vec![b'A'; 30], false);

    let out = run_pipeline(vec![variant], vec![read], AdjudicationParams::default());

    assert_eq!(out.len(), 1);
    let formatted = format_sample_counts(&out[0], "S");
    let dp_nfp: i64 = formatted.split(':').next().unwrap().parse().unwrap();
    assert!(dp_nfp >= 1, "expected the perfectly-matching read to land in the 95% stratum, got {}", formatted);
}

#[test]
fn duplicate_read_is_excluded_unless_include_duplicates_is_set() {
    let variant = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
    let read = make_read("dup1", "S", 90, &vec![b'A'; 30], true);

    let excluded = run_pipeline(vec![variant.clone()], vec![read.clone()], AdjudicationParams::default());
    assert_eq!(format_sample_counts(&excluded[0], "S"), format_sample_counts(&Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false), "S"));

    let included_params = AdjudicationParams { include_duplicates: true, ..AdjudicationParams::default() };
    let included = run_pipeline(vec![variant], vec![read], included_params);
    let formatted = format_sample_counts(&included[0], "S");
    let total: i64 = formatted.split(':').step_by(2).take(4).map(|f| f.parse::<i64>().unwrap()).sum();
    assert!(total >= 1, "expected the duplicate to be counted once --include-duplicates is set, got {}", formatted);
}

#[test]
fn structural_variant_passes_through_with_no_evidence() {
    let sv = Arc::new(Variant::new("chr1", 105, "A", vec![b"<DEL>".to_vec()], vec![], true));
    let read = make_read("r1", "S", 90, &vec![b'A'; 30], false);

    let out = run_pipeline(vec![sv], vec![read], AdjudicationParams::default());

    assert_eq!(out.len(), 1);
    let formatted = format_sample_counts(&out[0], "S");
    assert!(formatted.starts_with("0:0,0,0,0:0:0,0,0,0:"));
    assert!(formatted.ends_with(":."));
}

#[test]
fn two_overlapping_snvs_are_clustered_and_both_see_evidence() {
    let v1 = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
    let v2 = Arc::new(Variant::new("chr1", 107, "G", vec![b"C".to_vec()], vec![], false));
    let read = make_read("r1", "S", 90, &vec![b'A'; 30], false);

    let out = run_pipeline(vec![v1, v2], vec![read], AdjudicationParams::default());

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].position, 105);
    assert_eq!(out[1].position, 107);
}

#[test]
fn no_overlapping_reads_leaves_every_stratum_at_zero() {
    let variant = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
    let far_read = make_read("r1", "S", 1000, &vec![b'A'; 30], false);

    let out = run_pipeline(vec![variant], vec![far_read], AdjudicationParams::default());

    let formatted = format_sample_counts(&out[0], "S");
    assert!(formatted.starts_with("0:0,0,0,0:0:0,0,0,0:"));
}

#[test]
fn alt_supporting_read_is_recorded_against_the_alt_allele() {
    let variant = Arc::new(Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false));
    // Carries a T at the variant's site instead of the A background, so its
    // best alignment runs through the alt bubble, not the reference spine.
    let read = make_read_with_substitution("r1", "S", 90, 30, 105, b'T');

    let out = run_pipeline(vec![variant], vec![read], AdjudicationParams::default());

    assert_eq!(out.len(), 1);
    let formatted = format_sample_counts(&out[0], "S");
    let dp4_nfp = formatted.split(':').nth(1).unwrap();
    let alt_fwd: i64 = dp4_nfp.split(',').nth(2).unwrap().parse().unwrap();
    assert!(alt_fwd >= 1, "expected the alt-supporting read in the alt column of DP4_NFP, got {}", formatted);
}
