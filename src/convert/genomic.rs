//! Genomic variant records
//!
//! A [`GenomicVariant`] is the output of resolution: chromosome, 1-based
//! position, reference allele and alternate allele, all on the forward
//! genomic strand. Indels carry a left anchor base in the VCF convention.

use serde::Serialize;
use std::fmt;

/// A variant on the forward genomic strand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GenomicVariant {
    /// Chromosome name as given by the transcript annotation
    pub chromosome: String,
    /// 1-based position of the first reference base
    pub position: u64,
    /// Reference allele
    pub reference: String,
    /// Alternate allele
    pub alternate: String,
}

impl GenomicVariant {
    /// Create a new genomic variant
    pub fn new(
        chromosome: impl Into<String>,
        position: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// 1-based position of the last reference base
    pub fn end(&self) -> u64 {
        (self.position + self.reference.len() as u64).saturating_sub(1)
    }

    /// Whether this is a single-base substitution
    pub fn is_snv(&self) -> bool {
        self.reference.len() == 1 && self.alternate.len() == 1
    }

    /// Tab-separated `chrom pos ref alt`
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.chromosome, self.position, self.reference, self.alternate
        )
    }
}

impl fmt::Display for GenomicVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chromosome, self.position, self.reference, self.alternate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_tsv() {
        let v = GenomicVariant::new("chr7", 140453136, "A", "T");
        assert_eq!(v.to_string(), "chr7:140453136 A>T");
        assert_eq!(v.to_tsv(), "chr7\t140453136\tA\tT");
        assert!(v.is_snv());
        assert_eq!(v.end(), 140453136);
    }

    #[test]
    fn test_end_of_deletion() {
        let v = GenomicVariant::new("chr1", 100, "ACGT", "A");
        assert_eq!(v.end(), 103);
        assert!(!v.is_snv());
    }

    #[test]
    fn test_serialize() {
        let v = GenomicVariant::new("chr1", 5, "G", "C");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(
            json,
            r#"{"chromosome":"chr1","position":5,"reference":"G","alternate":"C"}"#
        );
    }
}
