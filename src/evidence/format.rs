use crate::evidence::CountStratum;
use crate::model::Variant;

/// The FORMAT key this crate appends to every variant record.
pub const ADJUDICATION_FORMAT_KEY: &str =
    "DP_NFP:DP4_NFP:DP_NP:DP4_NP:DP_EP:DP4_EP:DP_SP:DP4_SP:DP_LP:DP4_LP:DP_AP:DP4_AP:SEM";

/// Builds the augmented per-sample FORMAT value for `variant` and `sample`
/// : one `DP_*`/`DP4_*` pair per stratum in emission order, plus
/// a trailing `SEM` field.
///
/// `SEM` describes semantic/ambiguous haplotype paths. Nothing in this
/// pipeline's data model ever populates such a structure --
/// no operation writes to it -- so it is always emitted as `.`; see
/// DESIGN.md for the resolved open question.
pub fn format_sample_counts(variant: &Variant, sample: &str) -> String {
    let mut fields: Vec<String> = Vec::with_capacity(CountStratum::EMISSION_ORDER.len() * 2);

    for stratum in CountStratum::EMISSION_ORDER {
        let (ref_fwd, ref_rev) = variant.reference.counts_for(sample, stratum);
        let mut total = ref_fwd + ref_rev;
        let mut dp4 = format!("{},{}", ref_fwd, ref_rev);

        for alt in &variant.alternates {
            let (fwd, rev) = alt.counts_for(sample, stratum);
            total += fwd + rev;
            dp4.push(',');
            dp4.push_str(&format!("{},{}", fwd, rev));
        }

        fields.push(total.to_string());
        fields.push(dp4);
    }

    fields.push(".".to_string());
    fields.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::CountStratum;

    #[test]
    fn no_evidence_emits_zero_counts_and_no_semantics() {
        let variant = Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false);
        let formatted = format_sample_counts(&variant, "S1");
        assert!(formatted.starts_with("0:0,0,0,0:0:0,0,0,0:"));
        assert!(formatted.ends_with(":."));
    }

    #[test]
    fn single_ninety5_supporting_alt_read_is_reflected() {
        let variant = Variant::new("chr1", 105, "A", vec![b"T".to_vec()], vec![], false);
        variant.alternates[0].record_evidence("S1", CountStratum::Ninety5Percent, true, ("r1".into(), 1));
        let formatted = format_sample_counts(&variant, "S1");
        let nfp_field = formatted.split(':').next().unwrap();
        assert_eq!(nfp_field, "1");
        let dp4_field = formatted.split(':').nth(1).unwrap();
        assert_eq!(dp4_field, "0,0,1,0");
    }
}
