use crate::errors::AdjudicationError;
use crate::model::Region;
use rust_htslib::faidx;

/// Random-access reference sequence retrieval for one region.
pub trait ReferenceSource {
    fn fetch(&self, region: &Region) -> Result<Vec<u8>, AdjudicationError>;
}

/// Backed by an indexed FASTA (`.fai`) via `rust_htslib::faidx::Reader`.
pub struct FastaReferenceSource {
    reader: faidx::Reader,
}

impl FastaReferenceSource {
    pub fn open(path: &str) -> Result<Self, AdjudicationError> {
        let reader = faidx::Reader::from_path(path)
            .map_err(|e| AdjudicationError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        Ok(FastaReferenceSource { reader })
    }
}

impl ReferenceSource for FastaReferenceSource {
    fn fetch(&self, region: &Region) -> Result<Vec<u8>, AdjudicationError> {
        // faidx coordinates are 0-based, end-inclusive.
        let start = region.start as usize;
        let end = region.end.saturating_sub(1) as usize;
        self.reader
            .fetch_seq(&region.chrom, start, end)
            .map(|seq| seq.to_ascii_uppercase())
            .map_err(|e| AdjudicationError::parse("fasta", format!("failed to fetch {}: {}", region, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory double for integration tests: a single contig's full
    /// sequence, sliced per fetch.
    pub struct FixedReferenceSource {
        pub chrom: String,
        pub sequence: Vec<u8>,
    }

    impl ReferenceSource for FixedReferenceSource {
        fn fetch(&self, region: &Region) -> Result<Vec<u8>, AdjudicationError> {
            if region.chrom != self.chrom {
                return Err(AdjudicationError::parse("fasta", format!("unknown contig '{}'", region.chrom)));
            }
            let start = region.start as usize;
            let end = (region.end as usize).min(self.sequence.len());
            Ok(self.sequence[start..end].to_vec())
        }
    }

    #[test]
    fn fixed_source_slices_the_requested_window() {
        let source = FixedReferenceSource { chrom: "chr1".into(), sequence: b"ACGTACGTACGT".to_vec() };
        let slice = source.fetch(&Region::new("chr1", 2, 6)).unwrap();
        assert_eq!(slice, b"GTAC");
    }
}
