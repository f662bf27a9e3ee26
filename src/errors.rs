use std::fmt;

/// Error taxonomy for the adjudication pipeline.
///
/// Structural errors (`GraphInvariant`, `ResourceLimit`, `SortOrder`) abort
/// the run. `Io` and `Parse` are fatal at the boundary where they're
/// produced (a missing file, an unreadable region) but per-record parse
/// problems inside a VCF pass are logged and skipped by the caller rather
/// than turned into this type -- see `VariantSource::next`.
#[derive(Debug)]
pub enum AdjudicationError {
    Io { path: String, source: std::io::Error },
    Parse { context: String, detail: String },
    SortOrder { chrom: String, previous: i64, found: i64 },
    GraphInvariant { detail: String },
    ResourceLimit { detail: String },
}

impl fmt::Display for AdjudicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjudicationError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path, source)
            }
            AdjudicationError::Parse { context, detail } => {
                write!(f, "failed to parse {}: {}", context, detail)
            }
            AdjudicationError::SortOrder { chrom, previous, found } => write!(
                f,
                "variants out of order on {}: saw position {} after {}",
                chrom, found, previous
            ),
            AdjudicationError::GraphInvariant { detail } => {
                write!(f, "graph invariant violated: {}", detail)
            }
            AdjudicationError::ResourceLimit { detail } => {
                write!(f, "resource limit: {}", detail)
            }
        }
    }
}

impl std::error::Error for AdjudicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdjudicationError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl AdjudicationError {
    /// Maps this error onto the process exit code documented for operators.
    pub fn exit_code(&self) -> i32 {
        match self {
            AdjudicationError::Io { .. } => 3,
            AdjudicationError::Parse { .. } | AdjudicationError::SortOrder { .. } => 4,
            AdjudicationError::GraphInvariant { .. } | AdjudicationError::ResourceLimit { .. } => 1,
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AdjudicationError::Io { path: path.into(), source }
    }

    pub fn parse(context: impl Into<String>, detail: impl Into<String>) -> Self {
        AdjudicationError::Parse { context: context.into(), detail: detail.into() }
    }

    pub fn graph_invariant(detail: impl Into<String>) -> Self {
        AdjudicationError::GraphInvariant { detail: detail.into() }
    }

    pub fn resource_limit(detail: impl Into<String>) -> Self {
        AdjudicationError::ResourceLimit { detail: detail.into() }
    }
}
