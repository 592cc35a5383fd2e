//! Transcript and exon models
//!
//! # Coordinate System
//!
//! All coordinates in this module are **1-based inclusive**:
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `Exon.genomic_start`, `Exon.genomic_end` | 1-based | Genomic coordinates (inclusive) |
//! | `Exon.tx_start`, `Exon.tx_end` | 1-based | Transcript coordinates (inclusive) |
//! | `Intron.genomic_start`, `Intron.genomic_end` | 1-based | First/last intronic base |
//! | `Transcript.coding_start`, `Transcript.coding_end` | 1-based | CDS boundaries in transcript space |
//!
//! Exons are always stored in ascending genomic order. Transcript coordinates
//! run 5' to 3' along the transcript, so on the minus strand they decrease as
//! genomic coordinates increase.

use crate::error::FerroError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    /// Parse a `+`/`-` strand column
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// An exon in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    /// Exon number in transcript order (1-based)
    pub number: u32,
    /// Genomic start position (1-based, inclusive)
    pub genomic_start: u64,
    /// Genomic end position (1-based, inclusive)
    pub genomic_end: u64,
    /// Start position in transcript coordinates (1-based, inclusive)
    pub tx_start: u64,
    /// End position in transcript coordinates (1-based, inclusive)
    pub tx_end: u64,
}

impl Exon {
    /// Number of bases in the exon
    pub fn len(&self) -> u64 {
        self.genomic_end - self.genomic_start + 1
    }

    /// Exons always hold at least one base
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if a genomic position falls in this exon
    pub fn contains_genomic(&self, pos: u64) -> bool {
        pos >= self.genomic_start && pos <= self.genomic_end
    }

    /// Check if a transcript position falls in this exon
    pub fn contains_tx(&self, pos: u64) -> bool {
        pos >= self.tx_start && pos <= self.tx_end
    }
}

/// An intron between two genomically consecutive exons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intron {
    /// Genomic start position (1-based, first intronic base)
    pub genomic_start: u64,
    /// Genomic end position (1-based, last intronic base)
    pub genomic_end: u64,
}

impl Intron {
    /// Get the genomic length of the intron
    pub fn len(&self) -> u64 {
        self.genomic_end + 1 - self.genomic_start
    }

    /// Check if the intron holds no bases (abutting exons)
    pub fn is_empty(&self) -> bool {
        self.genomic_end < self.genomic_start
    }
}

/// A transcript with its exon structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcript identifier (e.g., "NM_004333.4")
    pub id: String,
    /// Gene symbol (e.g., "BRAF")
    pub gene_symbol: Option<String>,
    /// Chromosome name as given by the annotation table
    pub chromosome: String,
    /// Strand
    pub strand: Strand,
    /// Exons sorted by genomic start
    exons: Vec<Exon>,
    /// First coding base in transcript coordinates
    coding_start: Option<u64>,
    /// Last coding base in transcript coordinates
    coding_end: Option<u64>,
}

impl Transcript {
    /// Build a transcript from 1-based inclusive exon bounds
    ///
    /// Exons may be given in any order. Transcript offsets are accumulated
    /// 5' to 3' along the strand.
    ///
    /// # Errors
    ///
    /// Returns [`FerroError::InvalidAnnotation`] if there are no exons, an exon
    /// ends before it starts, or two exons overlap.
    pub fn new(
        id: impl Into<String>,
        chromosome: impl Into<String>,
        strand: Strand,
        mut bounds: Vec<(u64, u64)>,
    ) -> Result<Self, FerroError> {
        let id = id.into();
        let invalid = |msg: String| FerroError::InvalidAnnotation { line: 0, msg };

        if bounds.is_empty() {
            return Err(invalid(format!("transcript {} has no exons", id)));
        }
        bounds.sort_unstable();
        for &(start, end) in &bounds {
            if start == 0 || end < start {
                return Err(invalid(format!(
                    "transcript {} has invalid exon {}-{}",
                    id, start, end
                )));
            }
        }
        for pair in bounds.windows(2) {
            if pair[1].0 <= pair[0].1 {
                return Err(invalid(format!(
                    "transcript {} has overlapping exons {}-{} and {}-{}",
                    id, pair[0].0, pair[0].1, pair[1].0, pair[1].1
                )));
            }
        }

        let count = bounds.len();
        let mut exons: Vec<Exon> = bounds
            .into_iter()
            .map(|(genomic_start, genomic_end)| Exon {
                number: 0,
                genomic_start,
                genomic_end,
                tx_start: 0,
                tx_end: 0,
            })
            .collect();

        // Walk in transcript order accumulating lengths
        let mut cumulative = 0u64;
        for i in 0..count {
            let idx = match strand {
                Strand::Plus => i,
                Strand::Minus => count - 1 - i,
            };
            let exon = &mut exons[idx];
            exon.number = i as u32 + 1;
            exon.tx_start = cumulative + 1;
            cumulative += exon.len();
            exon.tx_end = cumulative;
        }

        Ok(Self {
            id,
            gene_symbol: None,
            chromosome: chromosome.into(),
            strand,
            exons,
            coding_start: None,
            coding_end: None,
        })
    }

    /// Set the gene symbol
    pub fn with_gene(mut self, symbol: impl Into<String>) -> Self {
        self.gene_symbol = Some(symbol.into());
        self
    }

    /// Set the coding region from its genomic bounds (1-based inclusive)
    ///
    /// Both bounds must be exonic. On the minus strand the higher genomic
    /// bound is the first coding base.
    pub fn with_coding_region(
        mut self,
        genomic_start: u64,
        genomic_end: u64,
    ) -> Result<Self, FerroError> {
        let (five, three) = match self.strand {
            Strand::Plus => (genomic_start, genomic_end),
            Strand::Minus => (genomic_end, genomic_start),
        };
        let not_exonic = |pos: u64| FerroError::InvalidAnnotation {
            line: 0,
            msg: format!("coding bound {} of {} is not in an exon", pos, self.id),
        };
        let start = self.genomic_to_tx(five).ok_or_else(|| not_exonic(five))?;
        let end = self.genomic_to_tx(three).ok_or_else(|| not_exonic(three))?;
        if end < start {
            return Err(FerroError::InvalidAnnotation {
                line: 0,
                msg: format!("coding region of {} ends before it starts", self.id),
            });
        }
        self.coding_start = Some(start);
        self.coding_end = Some(end);
        Ok(self)
    }

    /// Exons in ascending genomic order
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    /// Total exonic length
    pub fn len(&self) -> u64 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// A transcript always has at least one exon
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the transcript has a coding region
    pub fn is_coding(&self) -> bool {
        self.coding_start.is_some()
    }

    /// Transcript positions of the first and last coding bases
    ///
    /// Non-coding transcripts count c. positions from their first base.
    pub fn coding_bounds(&self) -> (u64, u64) {
        match (self.coding_start, self.coding_end) {
            (Some(start), Some(end)) => (start, end),
            _ => (1, self.len()),
        }
    }

    /// Lowest genomic position covered
    pub fn genomic_start(&self) -> u64 {
        self.exons.first().map_or(0, |e| e.genomic_start)
    }

    /// Highest genomic position covered
    pub fn genomic_end(&self) -> u64 {
        self.exons.last().map_or(0, |e| e.genomic_end)
    }

    /// Find the exon holding a transcript position
    pub fn exon_for_tx(&self, pos: u64) -> Option<&Exon> {
        self.exon_index_for_tx(pos).map(|i| &self.exons[i])
    }

    /// Index into [`exons`](Self::exons) of the exon holding a transcript position
    pub fn exon_index_for_tx(&self, pos: u64) -> Option<usize> {
        let strand = self.strand;
        self.exons
            .binary_search_by(|e| {
                let ord = if e.tx_end < pos {
                    Ordering::Less
                } else if e.tx_start > pos {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                };
                match strand {
                    Strand::Plus => ord,
                    Strand::Minus => ord.reverse(),
                }
            })
            .ok()
    }

    /// Find the exon holding a genomic position
    pub fn exon_for_genomic(&self, pos: u64) -> Option<&Exon> {
        self.exons
            .binary_search_by(|e| {
                if e.genomic_end < pos {
                    Ordering::Less
                } else if e.genomic_start > pos {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(|i| &self.exons[i])
    }

    /// Map a transcript position to its genomic position
    pub fn tx_to_genomic(&self, pos: u64) -> Option<u64> {
        let exon = self.exon_for_tx(pos)?;
        let offset = pos - exon.tx_start;
        Some(match self.strand {
            Strand::Plus => exon.genomic_start + offset,
            Strand::Minus => exon.genomic_end - offset,
        })
    }

    /// Map an exonic genomic position to its transcript position
    pub fn genomic_to_tx(&self, pos: u64) -> Option<u64> {
        let exon = self.exon_for_genomic(pos)?;
        Some(match self.strand {
            Strand::Plus => exon.tx_start + (pos - exon.genomic_start),
            Strand::Minus => exon.tx_start + (exon.genomic_end - pos),
        })
    }

    /// Introns in ascending genomic order
    pub fn introns(&self) -> impl Iterator<Item = Intron> + '_ {
        self.exons.windows(2).map(|pair| Intron {
            genomic_start: pair[0].genomic_end + 1,
            genomic_end: pair[1].genomic_start - 1,
        })
    }

    /// Check whether the genomic interval `[lo, hi]` crosses an intron
    /// without starting or ending inside it
    ///
    /// Such an interval mixes exonic bases of two exons with intronic bases
    /// the transcript-relative range does not cover.
    pub fn crosses_intron(&self, lo: u64, hi: u64) -> bool {
        self.introns().any(|intron| {
            !intron.is_empty() && lo < intron.genomic_start && hi > intron.genomic_end
        })
    }
}

/// A window of reference bases read for one resolution
///
/// Bases are on the forward genomic strand, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWindow {
    /// Chromosome the window was read from
    pub chromosome: String,
    /// 1-based position of the first base
    pub start: u64,
    /// The bases
    pub bases: String,
}

impl ReferenceWindow {
    /// Create a new window
    pub fn new(chromosome: impl Into<String>, start: u64, bases: impl Into<String>) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            bases: bases.into(),
        }
    }

    /// Number of bases in the window
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// 1-based position of the last base
    pub fn end(&self) -> u64 {
        (self.start + self.bases.len() as u64).saturating_sub(1)
    }

    /// The bases as a string slice
    pub fn as_str(&self) -> &str {
        &self.bases
    }
}

/// Complement of one base; anything other than `ACGT` is returned unchanged
#[inline]
pub fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

/// Reverse-complement a DNA sequence
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus_tx() -> Transcript {
        Transcript::new(
            "NM_PLUS",
            "chr1",
            Strand::Plus,
            vec![(3000, 3009), (1000, 1009), (2000, 2009)],
        )
        .unwrap()
    }

    fn minus_tx() -> Transcript {
        Transcript::new(
            "NM_MINUS",
            "chr1",
            Strand::Minus,
            vec![(1000, 1009), (2000, 2009), (3000, 3009)],
        )
        .unwrap()
    }

    #[test]
    fn test_exons_sorted_and_numbered_plus() {
        let tx = plus_tx();
        let exons = tx.exons();
        assert_eq!(exons[0].genomic_start, 1000);
        assert_eq!(exons[0].number, 1);
        assert_eq!((exons[0].tx_start, exons[0].tx_end), (1, 10));
        assert_eq!((exons[2].tx_start, exons[2].tx_end), (21, 30));
        assert_eq!(tx.len(), 30);
    }

    #[test]
    fn test_exons_numbered_minus() {
        let tx = minus_tx();
        let exons = tx.exons();
        // Highest genomic exon is first in transcript order
        assert_eq!(exons[2].number, 1);
        assert_eq!((exons[2].tx_start, exons[2].tx_end), (1, 10));
        assert_eq!(exons[0].number, 3);
        assert_eq!((exons[0].tx_start, exons[0].tx_end), (21, 30));
    }

    #[test]
    fn test_overlap_rejected() {
        let err = Transcript::new("X", "chr1", Strand::Plus, vec![(100, 200), (150, 300)]);
        assert!(matches!(err, Err(FerroError::InvalidAnnotation { .. })));
        let err = Transcript::new("X", "chr1", Strand::Plus, vec![]);
        assert!(err.is_err());
        let err = Transcript::new("X", "chr1", Strand::Plus, vec![(10, 5)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_exon_for_tx() {
        let tx = minus_tx();
        assert_eq!(tx.exon_for_tx(1).unwrap().genomic_start, 3000);
        assert_eq!(tx.exon_for_tx(15).unwrap().genomic_start, 2000);
        assert_eq!(tx.exon_for_tx(30).unwrap().genomic_start, 1000);
        assert!(tx.exon_for_tx(31).is_none());
        assert!(tx.exon_for_tx(0).is_none());
        assert!(tx.exon_for_tx(15).unwrap().contains_tx(15));
        assert_eq!(tx.exon_index_for_tx(1), Some(2));
        assert_eq!(tx.exon_index_for_tx(30), Some(0));
        assert_eq!(tx.exon_index_for_tx(31), None);

        let tx = plus_tx();
        assert_eq!(tx.exon_index_for_tx(11), Some(1));
        assert_eq!(tx.exon_for_tx(11).unwrap().genomic_start, 2000);
    }

    #[test]
    fn test_tx_genomic_round_trip() {
        for tx in [plus_tx(), minus_tx()] {
            for pos in 1..=tx.len() {
                let g = tx.tx_to_genomic(pos).unwrap();
                assert_eq!(tx.genomic_to_tx(g), Some(pos));
            }
        }
        assert_eq!(minus_tx().tx_to_genomic(1), Some(3009));
        assert_eq!(plus_tx().tx_to_genomic(1), Some(1000));
        assert_eq!(plus_tx().genomic_to_tx(1500), None);
    }

    #[test]
    fn test_coding_region() {
        let tx = plus_tx().with_coding_region(1005, 3004).unwrap();
        assert_eq!(tx.coding_bounds(), (6, 25));

        let tx = minus_tx().with_coding_region(1005, 3004).unwrap();
        assert_eq!(tx.coding_bounds(), (6, 25));

        assert!(plus_tx().with_coding_region(1500, 3004).is_err());
        assert_eq!(plus_tx().coding_bounds(), (1, 30));
    }

    #[test]
    fn test_crosses_intron() {
        let tx = plus_tx();
        assert!(tx.crosses_intron(1005, 2005));
        assert!(!tx.crosses_intron(1005, 1009));
        assert!(!tx.crosses_intron(1010, 2005));
        assert!(!tx.crosses_intron(1005, 1500));
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ATGC"), "GCAT");
        assert_eq!(reverse_complement("AAN"), "NTT");
        assert_eq!(reverse_complement(""), "");
    }

    #[test]
    fn test_window() {
        let w = ReferenceWindow::new("chr1", 100, "ACGT");
        assert_eq!(w.end(), 103);
        assert_eq!(w.len(), 4);
    }
}
