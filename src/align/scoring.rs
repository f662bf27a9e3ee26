/// Affine-gap scoring parameters for one run of the aligner. Defaults mirror
/// the values commonly used for short-read realignment against a local
/// haplotype/bubble graph.
#[derive(Debug, Clone, Copy)]
pub struct Scoring {
    pub match_score: i64,
    pub mismatch_penalty: i64,
    pub gap_open: i64,
    pub gap_extend: i64,
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring { match_score: 1, mismatch_penalty: 4, gap_open: 6, gap_extend: 1 }
    }
}

impl Scoring {
    pub fn score(&self, read_base: u8, node_base: u8) -> i64 {
        if read_base.to_ascii_uppercase() == node_base.to_ascii_uppercase() {
            self.match_score
        } else {
            -self.mismatch_penalty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_match_and_mismatch() {
        let scoring = Scoring::default();
        assert_eq!(scoring.score(b'A', b'A'), 1);
        assert_eq!(scoring.score(b'A', b'a'), 1);
        assert_eq!(scoring.score(b'A', b'T'), -4);
    }
}
