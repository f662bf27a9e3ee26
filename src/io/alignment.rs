use crate::errors::AdjudicationError;
use crate::model::{Read as AdjRead, Region};
use bstr::ByteSlice;
use rust_htslib::bam::{self, Read as HtslibBamRead};

/// A windowed source of reads overlapping a region. Implementations own
/// whatever cursor/index state is needed to seek; `fetch` drains the
/// matching records into an owned, `Send + Sync` vector up front so the
/// parallel alignment phase never touches the underlying reader.
pub trait AlignmentSource {
    fn fetch(&mut self, region: &Region) -> Result<Vec<AdjRead>, AdjudicationError>;
}

/// Reads from an indexed BAM/CRAM file via `rust_htslib::bam::IndexedReader`.
pub struct BamAlignmentSource {
    reader: bam::IndexedReader,
    sample_id: String,
    include_duplicates: bool,
}

impl BamAlignmentSource {
    pub fn open(path: &str, sample_id: impl Into<String>, include_duplicates: bool) -> Result<Self, AdjudicationError> {
        let reader = bam::IndexedReader::from_path(path)
            .map_err(|e| AdjudicationError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        Ok(BamAlignmentSource { reader, sample_id: sample_id.into(), include_duplicates })
    }
}

impl AlignmentSource for BamAlignmentSource {
    fn fetch(&mut self, region: &Region) -> Result<Vec<AdjRead>, AdjudicationError> {
        let tid = self
            .reader
            .header()
            .tid(region.chrom.as_bytes())
            .ok_or_else(|| AdjudicationError::parse("bam", format!("unknown reference sequence '{}'", region.chrom)))?;
        self.reader
            .fetch((tid, region.start as i64, region.end as i64))
            .map_err(|e| AdjudicationError::parse("bam", format!("failed to seek to {}: {}", region, e)))?;

        let mut reads = Vec::new();
        let mut record = bam::Record::new();
        while let Some(result) = self.reader.read(&mut record) {
            result.map_err(|e| AdjudicationError::parse("bam", e.to_string()))?;
            if record.is_unmapped() {
                continue;
            }
            if record.is_duplicate() && !self.include_duplicates {
                continue;
            }
            reads.push(AdjRead {
                id: record.qname().to_str_lossy().into_owned(),
                mate_ordinal: if record.is_last_in_template() { 2 } else { 1 },
                sample_id: self.sample_id.clone(),
                sequence: record.seq().as_bytes(),
                base_qualities: record.qual().to_vec(),
                position: record.pos(),
                length: record.seq_len() as u32,
                mapq: record.mapq(),
                is_reverse_strand: record.is_reverse(),
                is_duplicate: record.is_duplicate(),
                cigar: record.cigar().iter().cloned().collect(),
                mate_position: record.mpos(),
                template_length: record.insert_size(),
                flag: record.flags(),
            });
        }
        Ok(reads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Read as AdjRead2;

    /// In-memory double used by integration tests; holds reads already
    /// grouped by region key so no real BAM file is needed.
    pub struct FixedAlignmentSource {
        pub reads: Vec<AdjRead2>,
    }

    impl AlignmentSource for FixedAlignmentSource {
        fn fetch(&mut self, region: &Region) -> Result<Vec<AdjRead2>, AdjudicationError> {
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

    #[test]
    fn fixed_source_filters_by_overlap() {
        let mut source = FixedAlignmentSource {
            reads: vec![AdjRead2 {
                id: "r1".into(),
                mate_ordinal: 1,
                sample_id: "S".into(),
                sequence: b"ACGT".to_vec(),
                base_qualities: vec![30; 4],
                position: 100,
                length: 4,
                mapq: 60,
                is_reverse_strand: false,
                is_duplicate: false,
                cigar: vec![],
                mate_position: -1,
                template_length: 0,
                flag: 0,
            }],
        };
        let hits = source.fetch(&Region::new("chr1", 99, 200)).unwrap();
        assert_eq!(hits.len(), 1);
        let misses = source.fetch(&Region::new("chr1", 500, 600)).unwrap();
        assert!(misses.is_empty());
    }
}
