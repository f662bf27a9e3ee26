//! External collaborators the core pipeline treats as opaque sources and
//! sinks: alignments, variants, reference sequence, and the optional
//! supporting-read audit trail.

mod alignment;
mod reference;
mod supporting;
mod variant;

pub use alignment::{AlignmentSource, BamAlignmentSource};
pub use reference::{FastaReferenceSource, ReferenceSource};
pub use supporting::SupportingReadSink;
pub use variant::{BcfVariantSink, BcfVariantSource, ConcatenatedVariantSource, RegionFilteredVariantSource, VariantSink, VariantSource};
