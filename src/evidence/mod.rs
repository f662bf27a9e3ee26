//! Count strata, per-node stratum classification, and the final per-variant
//! FORMAT field emission.

mod classify;
mod stratum;
mod format;

pub use classify::{record_evidence, total_score_pct};
pub use format::{format_sample_counts, ADJUDICATION_FORMAT_KEY};
pub use stratum::CountStratum;
