use strum_macros::EnumIter;

/// A discrete quality bucket a read's alignment percent-score falls into
/// Order is significant: a read is assigned to
/// the highest stratum whose threshold it clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CountStratum {
    Ninety5Percent,
    Ninety,
    Eighty,
    Seventy,
    LowQual,
    Ambiguous,
}

impl CountStratum {
    /// Minimum per-node percent score required to qualify for this stratum.
    /// `LowQual` and `Ambiguous` are not reached via threshold comparison
    /// (they're assigned directly by the tie/softclip rules in the aligner)
    /// so their thresholds are nominal.
    fn threshold(self) -> i64 {
        match self {
            CountStratum::Ninety5Percent => 95,
            CountStratum::Ninety => 90,
            CountStratum::Eighty => 80,
            CountStratum::Seventy => 70,
            CountStratum::LowQual => 0,
            CountStratum::Ambiguous => 0,
        }
    }

    /// The `DP_*`/`DP4_*` FORMAT suffix for this stratum.
    pub fn format_suffix(self) -> &'static str {
        match self {
            CountStratum::Ninety5Percent => "NFP",
            CountStratum::Ninety => "NP",
            CountStratum::Eighty => "EP",
            CountStratum::Seventy => "SP",
            CountStratum::LowQual => "LP",
            CountStratum::Ambiguous => "AP",
        }
    }

    /// Strata in FORMAT-field emission order.
    pub const EMISSION_ORDER: [CountStratum; 6] = [
        CountStratum::Ninety5Percent,
        CountStratum::Ninety,
        CountStratum::Eighty,
        CountStratum::Seventy,
        CountStratum::LowQual,
        CountStratum::Ambiguous,
    ];

    /// Picks the highest percent-threshold stratum a node-local score
    /// qualifies for, among the four score-based strata (the
    /// "assign to the highest stratum whose threshold is <= the per-node
    /// percent score"). Falls back to `LowQual` for a node whose own score
    /// undershoots every threshold even though the read's overall score
    /// cleared the run's `--percent` floor.
    pub fn from_node_percent(node_percent_score: i64) -> CountStratum {
        for stratum in [
            CountStratum::Ninety5Percent,
            CountStratum::Ninety,
            CountStratum::Eighty,
            CountStratum::Seventy,
        ] {
            if node_percent_score >= stratum.threshold() {
                return stratum;
            }
        }
        CountStratum::LowQual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_qualifying_stratum() {
        assert_eq!(CountStratum::from_node_percent(100), CountStratum::Ninety5Percent);
        assert_eq!(CountStratum::from_node_percent(95), CountStratum::Ninety5Percent);
        assert_eq!(CountStratum::from_node_percent(92), CountStratum::Ninety);
        assert_eq!(CountStratum::from_node_percent(85), CountStratum::Eighty);
        assert_eq!(CountStratum::from_node_percent(71), CountStratum::Seventy);
        assert_eq!(CountStratum::from_node_percent(40), CountStratum::LowQual);
    }
}
