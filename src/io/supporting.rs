use crate::errors::AdjudicationError;
use crate::model::Read;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;

/// Optional audit trail: one line per supporting read, written under a
/// single lock so concurrent alignment tasks can append without
/// interleaving records. Emitted only when `--save-supporting-reads` names
/// an output path.
pub struct SupportingReadSink {
    writer: Mutex<BufWriter<File>>,
}

impl SupportingReadSink {
    pub fn create(path: &str) -> Result<Self, AdjudicationError> {
        let file = File::create(path).map_err(|e| AdjudicationError::io(path, e))?;
        Ok(SupportingReadSink { writer: Mutex::new(BufWriter::new(file)) })
    }

    pub fn record(&self, chrom: &str, pos: i64, allele_seq: &[u8], read: &Read) -> Result<(), AdjudicationError> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            chrom,
            pos,
            String::from_utf8_lossy(allele_seq),
            read.id,
            read.mate_ordinal,
            read.sample_id,
        )
        .map_err(|e| AdjudicationError::io("supporting-reads", e))
    }

    pub fn flush(&self) -> Result<(), AdjudicationError> {
        self.writer.lock().unwrap().flush().map_err(|e| AdjudicationError::io("supporting-reads", e))
    }
}
