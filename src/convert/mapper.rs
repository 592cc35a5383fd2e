//! Coordinate mapper for converting between coordinate systems
//!
//! # Coordinate Systems
//!
//! | System | Basis | Notes |
//! |--------|-------|-------|
//! | Genomic | 1-based | Forward strand, inclusive |
//! | Transcript (tx) | 1-based | Counted 5' to 3' over exonic bases only |
//! | CDS (c.) | 1-based | `CdsPos.base` negative for 5' UTR, `*N` for 3' UTR |
//!
//! ## Key conversions:
//! - CDS → Tx: `cds_to_tx()` - relative to the first/last coding base
//! - Tx → CDS: `tx_to_cds()` - inverse of above
//! - CDS → Genomic: `cds_to_genomic()` - including intronic offsets
//! - Genomic → CDS: `genomic_to_cds()` - inverse, intronic positions anchored on the nearer exon
//!
//! ## Intronic positions:
//! `c.100+5` is only meaningful when `c.100` is the last base of an exon and
//! the following intron is at least five bases long; `c.101-3` likewise needs
//! `c.101` to be the first base of an exon. Anything else is rejected rather
//! than guessed.

use crate::error::FerroError;
use crate::hgvs::location::CdsPos;
use crate::reference::transcript::{Intron, Strand, Transcript};

/// Maps coordinates between different systems for a transcript
pub struct CoordinateMapper<'a> {
    transcript: &'a Transcript,
}

impl<'a> CoordinateMapper<'a> {
    /// Create a new mapper for a transcript
    pub fn new(transcript: &'a Transcript) -> Self {
        Self { transcript }
    }

    fn out_of_range(&self, position: impl ToString) -> FerroError {
        FerroError::PositionOutOfRange {
            transcript: self.transcript.id.clone(),
            position: position.to_string(),
            length: self.transcript.len(),
            notation: None,
        }
    }

    fn unsupported(&self, pos: &CdsPos, reason: impl Into<String>) -> FerroError {
        FerroError::IntronicPositionUnsupported {
            transcript: self.transcript.id.clone(),
            position: format!("c.{}", pos),
            reason: reason.into(),
            notation: None,
        }
    }

    /// Convert the exonic anchor of a CDS position to a transcript position
    ///
    /// Any intronic offset is ignored here.
    pub fn cds_to_tx(&self, pos: &CdsPos) -> Result<u64, FerroError> {
        let (coding_start, coding_end) = self.transcript.coding_bounds();
        let (coding_start, coding_end) = (coding_start as i64, coding_end as i64);

        let tx = if pos.utr3 {
            // *N = last coding base + N
            coding_end.checked_add(pos.base)
        } else if pos.base < 0 {
            // -N = first coding base - N
            coding_start.checked_add(pos.base)
        } else {
            // c.1 is the first coding base
            coding_start.checked_add(pos.base - 1)
        };

        match tx {
            Some(tx) if tx >= 1 && tx as u64 <= self.transcript.len() => Ok(tx as u64),
            _ => Err(self.out_of_range(format!("c.{}", pos))),
        }
    }

    /// Convert a transcript position to a CDS position
    pub fn tx_to_cds(&self, tx: u64) -> Result<CdsPos, FerroError> {
        if tx == 0 || tx > self.transcript.len() {
            return Err(self.out_of_range(format!("n.{}", tx)));
        }
        let (coding_start, coding_end) = self.transcript.coding_bounds();
        Ok(if tx < coding_start {
            CdsPos::new(tx as i64 - coding_start as i64)
        } else if tx > coding_end {
            CdsPos::utr3((tx - coding_end) as i64)
        } else {
            CdsPos::new((tx - coding_start + 1) as i64)
        })
    }

    /// Intron next to `exon_idx` on the genomic side given by `downstream`
    fn adjacent_intron(&self, exon_idx: usize, downstream: bool) -> Option<Intron> {
        let exons = self.transcript.exons();
        let (left, right) = if downstream {
            (exons.get(exon_idx)?, exons.get(exon_idx + 1)?)
        } else {
            (exons.get(exon_idx.checked_sub(1)?)?, exons.get(exon_idx)?)
        };
        Some(Intron {
            genomic_start: left.genomic_end + 1,
            genomic_end: right.genomic_start - 1,
        })
    }

    /// Convert a CDS position, including any intronic offset, to a genomic position
    ///
    /// # Errors
    ///
    /// - [`FerroError::PositionOutOfRange`] if the anchor is outside the transcript
    /// - [`FerroError::IntronicPositionUnsupported`] if the offset is not taken
    ///   from the matching exon edge or runs past the adjacent intron
    pub fn cds_to_genomic(&self, pos: &CdsPos) -> Result<u64, FerroError> {
        let tx = self.cds_to_tx(pos)?;
        let anchor = self
            .transcript
            .tx_to_genomic(tx)
            .ok_or_else(|| self.out_of_range(format!("c.{}", pos)))?;

        let offset = pos.offset_or_zero();
        if offset == 0 {
            return Ok(anchor);
        }

        let exons = self.transcript.exons();
        let exon_idx = self
            .transcript
            .exon_index_for_tx(tx)
            .ok_or_else(|| self.out_of_range(format!("c.{}", pos)))?;
        let exon = &exons[exon_idx];

        if offset > 0 && tx != exon.tx_end {
            return Err(self.unsupported(
                pos,
                "positive offset must follow the last base of an exon",
            ));
        }
        if offset < 0 && tx != exon.tx_start {
            return Err(self.unsupported(
                pos,
                "negative offset must precede the first base of an exon",
            ));
        }

        // Moving 3' on the minus strand moves toward lower genomic positions
        let downstream = (offset > 0) == (self.transcript.strand == Strand::Plus);
        let intron = self
            .adjacent_intron(exon_idx, downstream)
            .ok_or_else(|| self.unsupported(pos, "no intron beyond this exon"))?;

        let distance = offset.unsigned_abs();
        if intron.is_empty() || distance > intron.len() {
            return Err(self.unsupported(
                pos,
                format!("offset {} exceeds intron length {}", distance, intron.len()),
            ));
        }

        Ok(if downstream {
            anchor + distance
        } else {
            anchor - distance
        })
    }

    /// Convert a genomic position to a CDS position
    ///
    /// Intronic positions are anchored on the nearer exon edge; at the exact
    /// midpoint the upstream (5') exon is used.
    pub fn genomic_to_cds(&self, genomic_pos: u64) -> Result<CdsPos, FerroError> {
        if let Some(tx) = self.transcript.genomic_to_tx(genomic_pos) {
            return self.tx_to_cds(tx);
        }

        let exons = self.transcript.exons();
        let right_idx = exons.partition_point(|e| e.genomic_end < genomic_pos);
        if right_idx == 0 || right_idx == exons.len() {
            return Err(self.out_of_range(format!("g.{}", genomic_pos)));
        }
        let left = &exons[right_idx - 1];
        let right = &exons[right_idx];
        let from_left = genomic_pos - left.genomic_end;
        let from_right = right.genomic_start - genomic_pos;

        // (anchor genomic position, offset) on the transcript strand
        let (anchor, offset) = match self.transcript.strand {
            Strand::Plus if from_left <= from_right => (left.genomic_end, from_left as i64),
            Strand::Plus => (right.genomic_start, -(from_right as i64)),
            Strand::Minus if from_right <= from_left => (right.genomic_start, from_right as i64),
            Strand::Minus => (left.genomic_end, -(from_left as i64)),
        };
        let tx = self
            .transcript
            .genomic_to_tx(anchor)
            .ok_or_else(|| self.out_of_range(format!("g.{}", genomic_pos)))?;
        Ok(self.tx_to_cds(tx)?.offset_by(offset))
    }

    /// Get the chromosome
    pub fn chromosome(&self) -> &str {
        &self.transcript.chromosome
    }

    /// Get the strand
    pub fn strand(&self) -> Strand {
        self.transcript.strand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three 10-base exons at genomic 1000-1009, 2000-2009, 3000-3009,
    /// coding from the 6th to the 25th transcript base
    fn make_transcript(strand: Strand) -> Transcript {
        Transcript::new(
            "NM_TEST",
            "chr1",
            strand,
            vec![(1000, 1009), (2000, 2009), (3000, 3009)],
        )
        .unwrap()
        .with_coding_region(1005, 3004)
        .unwrap()
    }

    #[test]
    fn test_cds_to_tx_regions() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.cds_to_tx(&CdsPos::new(1)).unwrap(), 6);
        assert_eq!(mapper.cds_to_tx(&CdsPos::new(20)).unwrap(), 25);
        assert_eq!(mapper.cds_to_tx(&CdsPos::new(-1)).unwrap(), 5);
        assert_eq!(mapper.cds_to_tx(&CdsPos::new(-5)).unwrap(), 1);
        assert_eq!(mapper.cds_to_tx(&CdsPos::utr3(1)).unwrap(), 26);
        assert_eq!(mapper.cds_to_tx(&CdsPos::utr3(5)).unwrap(), 30);
    }

    #[test]
    fn test_cds_to_tx_out_of_range() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        assert!(matches!(
            mapper.cds_to_tx(&CdsPos::new(-6)),
            Err(FerroError::PositionOutOfRange { .. })
        ));
        assert!(mapper.cds_to_tx(&CdsPos::utr3(6)).is_err());
        assert!(mapper.cds_to_tx(&CdsPos::new(i64::MAX)).is_err());
    }

    #[test]
    fn test_tx_to_cds_inverse() {
        let tx = make_transcript(Strand::Minus);
        let mapper = CoordinateMapper::new(&tx);
        for t in 1..=30 {
            let cds = mapper.tx_to_cds(t).unwrap();
            assert_eq!(mapper.cds_to_tx(&cds).unwrap(), t);
        }
        assert!(mapper.tx_to_cds(0).is_err());
        assert!(mapper.tx_to_cds(31).is_err());
    }

    #[test]
    fn test_cds_to_genomic_plus() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(1)).unwrap(), 1005);
        // c.5 is the last base of exon 1
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(5)).unwrap(), 1009);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(6)).unwrap(), 2000);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::utr3(1)).unwrap(), 3005);
    }

    #[test]
    fn test_cds_to_genomic_minus() {
        let tx = make_transcript(Strand::Minus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(1)).unwrap(), 3004);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(-5)).unwrap(), 3009);
        // c.5 is the last base of exon 1 on the transcript, lowest genomic base of it
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(5)).unwrap(), 3000);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::new(6)).unwrap(), 2009);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::utr3(5)).unwrap(), 1000);
    }

    #[test]
    fn test_intronic_plus() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(5, 1)).unwrap(), 1010);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(5, 990)).unwrap(), 1999);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(6, -1)).unwrap(), 1999);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(6, -990)).unwrap(), 1010);
    }

    #[test]
    fn test_intronic_minus() {
        let tx = make_transcript(Strand::Minus);
        let mapper = CoordinateMapper::new(&tx);
        // c.5 sits at genomic 3000; +n walks down into the 2010-2999 intron
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(5, 1)).unwrap(), 2999);
        assert_eq!(mapper.cds_to_genomic(&CdsPos::with_offset(6, -1)).unwrap(), 2010);
    }

    #[test]
    fn test_intronic_rejections() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        // Not at an exon edge
        assert!(matches!(
            mapper.cds_to_genomic(&CdsPos::with_offset(3, 1)),
            Err(FerroError::IntronicPositionUnsupported { .. })
        ));
        // Wrong edge for the sign
        assert!(mapper.cds_to_genomic(&CdsPos::with_offset(5, -1)).is_err());
        // Longer than the intron
        assert!(mapper.cds_to_genomic(&CdsPos::with_offset(5, 991)).is_err());
        // Beyond the last exon
        assert!(mapper.cds_to_genomic(&CdsPos::utr3(5).offset_by(1)).is_err());
        // Before the first exon
        assert!(mapper.cds_to_genomic(&CdsPos::new(-5).offset_by(-1)).is_err());
    }

    #[test]
    fn test_abutting_exons_have_no_intron() {
        let tx =
            Transcript::new("NM_ABUT", "chr1", Strand::Plus, vec![(100, 109), (110, 119)]).unwrap();
        let mapper = CoordinateMapper::new(&tx);
        assert!(mapper.cds_to_genomic(&CdsPos::with_offset(10, 1)).is_err());
    }

    #[test]
    fn test_genomic_to_cds_intronic() {
        let tx = make_transcript(Strand::Plus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.genomic_to_cds(1010).unwrap(), CdsPos::with_offset(5, 1));
        assert_eq!(mapper.genomic_to_cds(1999).unwrap(), CdsPos::with_offset(6, -1));

        let tx = make_transcript(Strand::Minus);
        let mapper = CoordinateMapper::new(&tx);
        assert_eq!(mapper.genomic_to_cds(2999).unwrap(), CdsPos::with_offset(5, 1));
        assert_eq!(mapper.genomic_to_cds(2010).unwrap(), CdsPos::with_offset(6, -1));
        assert!(mapper.genomic_to_cds(999).is_err());
        assert!(mapper.genomic_to_cds(3010).is_err());
    }

    #[test]
    fn test_genomic_round_trip() {
        for strand in [Strand::Plus, Strand::Minus] {
            let tx = make_transcript(strand);
            let mapper = CoordinateMapper::new(&tx);
            for g in (1000..=3009).step_by(7) {
                let cds = mapper.genomic_to_cds(g).unwrap();
                assert_eq!(mapper.cds_to_genomic(&cds).unwrap(), g, "{:?} g.{}", strand, g);
            }
        }
    }
}
