/// A single aligned read, copied out of the source BAM record up front so
/// the parallel alignment phase never touches `rust_htslib::bam::Record`
/// directly -- reads are never cloned across threads once dispatched; the clone
/// that does happen is this one, once, before dispatch).
#[derive(Debug, Clone)]
pub struct Read {
    pub id: String,
    pub mate_ordinal: u8,
    pub sample_id: String,
    pub sequence: Vec<u8>,
    pub base_qualities: Vec<u8>,
    pub position: i64,
    pub length: u32,
    pub mapq: u8,
    pub is_reverse_strand: bool,
    pub is_duplicate: bool,
    pub cigar: Vec<rust_htslib::bam::record::Cigar>,
    pub mate_position: i64,
    pub template_length: i64,
    pub flag: u16,
}

impl Read {
    pub fn identity(&self) -> (String, u8) {
        (self.id.clone(), self.mate_ordinal)
    }

    pub fn is_forward_strand(&self) -> bool {
        !self.is_reverse_strand
    }
}
