use crate::errors::AdjudicationError;
use crate::evidence::format_sample_counts;
use crate::model::{Region, Variant};
use bstr::ByteSlice;
use rust_htslib::bcf::{self, Read as HtslibBcfRead};
use std::sync::Arc;

/// The FORMAT field this crate adds to every output record. Its value packs
/// the per-stratum `DP_*`/`DP4_*` pairs plus `SEM`, colon-joined, matching
/// `evidence::format::ADJUDICATION_FORMAT_KEY`'s field order.
pub const ADJUDICATION_FORMAT_ID: &[u8] = b"ADJ";

/// Pull-based variant reader, mirroring the clusterer's own
/// peek-one-ahead consumption style: `next` hands back one variant at a
/// time rather than an iterator, so the clusterer can look one record ahead
/// without fighting the borrow checker over a held iterator.
pub trait VariantSource {
    fn next(&mut self) -> Result<Option<Arc<Variant>>, AdjudicationError>;
}

/// Writes the augmented output file. Takes the full adjudicated variant
/// list at once (rather than a streaming per-record API) because emission
/// re-reads the original file independently to preserve every column this
/// crate doesn't interpret -- see `BcfVariantSink::emit`.
pub trait VariantSink {
    fn emit(&mut self, variants: &[Arc<Variant>]) -> Result<(), AdjudicationError>;
}

/// Reads variant records via `rust_htslib::bcf::Reader`, which transparently
/// handles both textual VCF and binary BCF.
pub struct BcfVariantSource {
    reader: bcf::Reader,
}

impl BcfVariantSource {
    pub fn open(path: &str) -> Result<Self, AdjudicationError> {
        let reader = bcf::Reader::from_path(path)
            .map_err(|e| AdjudicationError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        Ok(BcfVariantSource { reader })
    }

    fn to_variant(&self, record: &bcf::Record) -> Result<Variant, AdjudicationError> {
        let rid = record.rid().ok_or_else(|| AdjudicationError::parse("vcf", "record missing reference id"))?;
        let chrom = record
            .header()
            .rid2name(rid)
            .map_err(|e| AdjudicationError::parse("vcf", e.to_string()))?
            .to_str_lossy()
            .into_owned();
        let position = record.pos() + 1;

        let alleles = record.alleles();
        if alleles.is_empty() {
            return Err(AdjudicationError::parse("vcf", format!("record at {}:{} has no alleles", chrom, position)));
        }
        let reference = alleles[0].to_vec();
        let alternates: Vec<Vec<u8>> = alleles[1..].iter().map(|a| a.to_vec()).collect();
        let skip_adjudication = is_structural(&alternates);
        let id = record.id();
        let original_columns = vec![id.to_str_lossy().into_owned()];

        Ok(Variant::new(chrom, position, reference, alternates, original_columns, skip_adjudication))
    }
}

impl VariantSource for BcfVariantSource {
    fn next(&mut self) -> Result<Option<Arc<Variant>>, AdjudicationError> {
        let mut record = self.reader.empty_record();
        match self.reader.read(&mut record) {
            None => Ok(None),
            Some(Err(e)) => Err(AdjudicationError::parse("vcf", e.to_string())),
            Some(Ok(())) => Ok(Some(Arc::new(self.to_variant(&record)?))),
        }
    }
}

/// Concatenates several `--vcf` inputs into one stream, in flag order. Each
/// file is expected to already be position-sorted and (in the common case
/// this supports, e.g. per-chromosome split call sets) to cover disjoint
/// chromosomes, so that the concatenation itself stays position-sorted --
/// the clusterer's order check resets at every chromosome boundary, so two
/// inputs that legitimately share a chromosome will fail that check rather
/// than silently interleave out of order.
pub struct ConcatenatedVariantSource {
    sources: Vec<BcfVariantSource>,
    current: usize,
}

impl ConcatenatedVariantSource {
    pub fn open(paths: &[String]) -> Result<Self, AdjudicationError> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(BcfVariantSource::open(path)?);
        }
        Ok(ConcatenatedVariantSource { sources, current: 0 })
    }
}

impl VariantSource for ConcatenatedVariantSource {
    fn next(&mut self) -> Result<Option<Arc<Variant>>, AdjudicationError> {
        while self.current < self.sources.len() {
            if let Some(variant) = self.sources[self.current].next()? {
                return Ok(Some(variant));
            }
            self.current += 1;
        }
        Ok(None)
    }
}

/// Restricts a `--region` run to the requested window without disturbing
/// record order or count: variants outside the window are passed through
/// with `skip_adjudication` forced on, the same routing a structural
/// variant gets, so they reach the sink untouched but are never graphed.
pub struct RegionFilteredVariantSource<S: VariantSource> {
    inner: S,
    region: Region,
}

impl<S: VariantSource> RegionFilteredVariantSource<S> {
    pub fn new(inner: S, region: Region) -> Self {
        RegionFilteredVariantSource { inner, region }
    }
}

impl<S: VariantSource> VariantSource for RegionFilteredVariantSource<S> {
    fn next(&mut self) -> Result<Option<Arc<Variant>>, AdjudicationError> {
        match self.inner.next()? {
            None => Ok(None),
            Some(variant) => {
                if variant.skip_adjudication || variant.reference_span().overlaps(&self.region) {
                    Ok(Some(variant))
                } else {
                    Ok(Some(Arc::new(Variant {
                        chrom: variant.chrom.clone(),
                        position: variant.position,
                        reference: variant.reference.clone(),
                        alternates: variant.alternates.clone(),
                        original_columns: variant.original_columns.clone(),
                        skip_adjudication: true,
                    })))
                }
            }
        }
    }
}

/// Structural variants are symbolic (`<DEL>`, `<INS>`, ...) or breakend
/// (`N[chr2:123[`) alleles; the linear-bubble topology can't represent
/// either, so these are excluded from graph clustering upstream.
fn is_structural(alternates: &[Vec<u8>]) -> bool {
    alternates.iter().any(|alt| alt.starts_with(b"<") || alt.contains(&b'[') || alt.contains(&b']'))
}

/// Writes the augmented VCF/BCF by re-reading the original input file(s)
/// and appending the `ADJ` FORMAT value computed from the in-memory,
/// already-adjudicated `Variant`s -- original columns and record order are
/// preserved exactly because they're never reconstructed, only re-emitted.
/// Input paths are walked in the same flag order `ConcatenatedVariantSource`
/// reads them in, so the two stay in lockstep over the same `variants` slice.
pub struct BcfVariantSink {
    input_paths: Vec<String>,
    output_path: String,
}

impl BcfVariantSink {
    pub fn new(input_paths: Vec<String>, output_path: impl Into<String>) -> Self {
        BcfVariantSink { input_paths, output_path: output_path.into() }
    }
}

impl VariantSink for BcfVariantSink {
    fn emit(&mut self, variants: &[Arc<Variant>]) -> Result<(), AdjudicationError> {
        let first_path = self
            .input_paths
            .first()
            .ok_or_else(|| AdjudicationError::parse("cli", "at least one input VCF path is required for emission"))?;
        let template_reader = bcf::Reader::from_path(first_path)
            .map_err(|e| AdjudicationError::io(first_path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        let sample_names: Vec<String> =
            template_reader.header().samples().iter().map(|s| String::from_utf8_lossy(s).into_owned()).collect();

        let mut header = bcf::Header::from_template(template_reader.header());
        header.push_record(
            format!(
                "##FORMAT=<ID=ADJ,Number=1,Type=String,Description=\"Graph realignment evidence, colon-joined as {}\">",
                crate::evidence::ADJUDICATION_FORMAT_KEY
            )
            .as_bytes(),
        );

        let is_vcf = !(self.output_path.ends_with(".bcf") || self.output_path.ends_with(".bcf.gz"));
        let format = if is_vcf { bcf::Format::Vcf } else { bcf::Format::Bcf };
        let uncompressed = !self.output_path.ends_with(".gz") && !self.output_path.ends_with(".bcf");
        let mut writer = bcf::Writer::from_path(&self.output_path, &header, uncompressed, format)
            .map_err(|e| AdjudicationError::io(&self.output_path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

        let mut variants_iter = variants.iter();
        for path in &self.input_paths {
            let mut reader = bcf::Reader::from_path(path)
                .map_err(|e| AdjudicationError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
            let mut record = reader.empty_record();
            while let Some(result) = reader.read(&mut record) {
                result.map_err(|e| AdjudicationError::parse("vcf", e.to_string()))?;
                let variant = variants_iter.next().ok_or_else(|| {
                    AdjudicationError::graph_invariant("fewer adjudicated variants than source records during emission")
                })?;

                writer.translate(&mut record);
                let values: Vec<Vec<u8>> = sample_names.iter().map(|s| format_sample_counts(variant, s).into_bytes()).collect();
                let value_refs: Vec<&[u8]> = values.iter().map(|v| v.as_slice()).collect();
                record
                    .push_format_string(ADJUDICATION_FORMAT_ID, &value_refs)
                    .map_err(|e| AdjudicationError::parse("vcf", e.to_string()))?;

                writer.write(&record).map_err(|e| AdjudicationError::parse("vcf", e.to_string()))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_allele_is_structural() {
        assert!(is_structural(&[b"<DEL>".to_vec()]));
        assert!(is_structural(&[b"N[chr2:123[".to_vec()]));
        assert!(!is_structural(&[b"T".to_vec()]));
        assert!(!is_structural(&[b"AA".to_vec()]));
    }
}
