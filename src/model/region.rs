use crate::errors::AdjudicationError;
use std::fmt;

/// Sentinel for "no upper bound" in a region string with a missing end,
/// per the CLI region grammar.
pub const MAX_POSITION: u64 = u64::MAX / 2;

/// A half-open genomic interval `[start, end)` on one chromosome, 1-based
/// at `start` to match the VCF/variant convention used throughout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Region { chrom: chrom.into(), start, end }
    }

    /// Parses the CLI region grammar:
    /// `^(?P<chr>[A-Za-z0-9_.]+)(:(?P<start>\d+)(-(?P<end>\d+))?)?$`
    /// Missing bounds default to `(0, MAX_POSITION)`; `start == end == 0`
    /// means "whole chromosome".
    pub fn parse(region_str: &str) -> Result<Region, AdjudicationError> {
        if region_str.is_empty() {
            return Err(AdjudicationError::parse("region", "empty region string"));
        }

        let (chrom, rest) = match region_str.find(':') {
            Some(idx) => (&region_str[..idx], Some(&region_str[idx + 1..])),
            None => (region_str, None),
        };
        if chrom.is_empty() || !chrom.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(AdjudicationError::parse("region", format!("invalid chromosome name '{}'", chrom)));
        }

        let (start, end) = match rest {
            None => (0, MAX_POSITION),
            Some(bounds) => match bounds.find('-') {
                Some(idx) => {
                    let start = bounds[..idx]
                        .parse::<u64>()
                        .map_err(|_| AdjudicationError::parse("region", format!("invalid start in '{}'", region_str)))?;
                    let end = bounds[idx + 1..]
                        .parse::<u64>()
                        .map_err(|_| AdjudicationError::parse("region", format!("invalid end in '{}'", region_str)))?;
                    (start, end)
                }
                None => {
                    let start = bounds
                        .parse::<u64>()
                        .map_err(|_| AdjudicationError::parse("region", format!("invalid start in '{}'", region_str)))?;
                    (start, MAX_POSITION)
                }
            },
        };

        let (start, end) = if start == 0 && end == 0 { (0, MAX_POSITION) } else { (start, end) };
        if start > end {
            return Err(AdjudicationError::parse("region", format!("start > end in '{}'", region_str)));
        }

        Ok(Region::new(chrom, start, end))
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Half-open interval overlap test, same chromosome required.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.chrom == other.chrom && self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Region) -> bool {
        self.chrom == other.chrom && self.start <= other.start && other.end <= self.end
    }

    /// Returns the smallest region spanning both `self` and `other`. Panics
    /// if they are on different chromosomes; callers only ever merge
    /// regions already known to share a chromosome (cluster extension).
    pub fn union(&self, other: &Region) -> Region {
        assert_eq!(self.chrom, other.chrom, "cannot union regions on different chromosomes");
        Region::new(self.chrom.clone(), self.start.min(other.start), self.end.max(other.end))
    }

    pub fn expanded(&self, flank: u64) -> Region {
        Region::new(self.chrom.clone(), self.start.saturating_sub(flank), self.end + flank)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_chromosome() {
        let r = Region::parse("chr1").unwrap();
        assert_eq!(r.start, 0);
        assert_eq!(r.end, MAX_POSITION);
    }

    #[test]
    fn parses_explicit_bounds() {
        let r = Region::parse("chr1:100-200").unwrap();
        assert_eq!(r, Region::new("chr1", 100, 200));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Region::parse("chr1:200-100").is_err());
    }

    #[test]
    fn overlap_requires_same_chromosome() {
        let a = Region::new("chr1", 100, 200);
        let b = Region::new("chr2", 100, 200);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn overlap_is_half_open() {
        let a = Region::new("chr1", 100, 200);
        let b = Region::new("chr1", 200, 300);
        assert!(!a.overlaps(&b));
        let c = Region::new("chr1", 199, 300);
        assert!(a.overlaps(&c));
    }
}
