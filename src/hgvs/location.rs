//! Coding-DNA positions
//!
//! A c. position is counted along the coding sequence of a transcript:
//!
//! - `c.1` is the A of the start codon; coding positions are positive
//! - `c.-14` lies 14 bases 5' of `c.1` (5' UTR); there is no `c.0`
//! - `c.*25` lies 25 bases 3' of the stop codon's last base (3' UTR)
//! - `c.100+5` / `c.101-3` are intronic: an exon-edge position plus an offset
//!   into the adjacent intron

use serde::Serialize;
use std::fmt;

/// Position in coding-DNA coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CdsPos {
    /// Base position in CDS (negative for 5' UTR, never zero)
    pub base: i64,
    /// Intronic offset (+ for downstream, - for upstream of exon)
    pub offset: Option<i64>,
    /// Whether this is a 3' UTR position (uses * notation)
    pub utr3: bool,
}

impl CdsPos {
    /// Create a simple exonic CDS position
    pub fn new(base: i64) -> Self {
        Self {
            base,
            offset: None,
            utr3: false,
        }
    }

    /// Create a CDS position with intronic offset
    pub fn with_offset(base: i64, offset: i64) -> Self {
        Self {
            base,
            offset: Some(offset),
            utr3: false,
        }
    }

    /// Create a 3' UTR position
    pub fn utr3(base: i64) -> Self {
        Self {
            base,
            offset: None,
            utr3: true,
        }
    }

    /// Return a copy of this position with an intronic offset attached
    pub fn offset_by(self, offset: i64) -> Self {
        Self {
            offset: Some(offset),
            ..self
        }
    }

    /// Check if this position is intronic
    pub fn is_intronic(&self) -> bool {
        self.offset.is_some() && self.offset != Some(0)
    }

    /// Check if this position is in 5' UTR
    pub fn is_5utr(&self) -> bool {
        !self.utr3 && self.base < 0
    }

    /// The intronic offset, zero for exonic positions
    pub fn offset_or_zero(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

impl fmt::Display for CdsPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.utr3 {
            write!(f, "*")?;
        }
        write!(f, "{}", self.base)?;
        match self.offset {
            Some(o) if o > 0 => write!(f, "+{}", o),
            Some(o) if o < 0 => write!(f, "{}", o),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CdsPos::new(100).to_string(), "100");
        assert_eq!(CdsPos::new(-14).to_string(), "-14");
        assert_eq!(CdsPos::utr3(25).to_string(), "*25");
        assert_eq!(CdsPos::with_offset(100, 5).to_string(), "100+5");
        assert_eq!(CdsPos::with_offset(101, -3).to_string(), "101-3");
        assert_eq!(CdsPos::utr3(2).offset_by(-1).to_string(), "*2-1");
        assert_eq!(CdsPos::new(-14).offset_by(3).to_string(), "-14+3");
    }

    #[test]
    fn test_intronic() {
        assert!(!CdsPos::new(5).is_intronic());
        assert!(CdsPos::with_offset(5, 1).is_intronic());
        assert!(!CdsPos::with_offset(5, 0).is_intronic());
    }

    #[test]
    fn test_regions() {
        assert!(CdsPos::new(-1).is_5utr());
        assert!(!CdsPos::new(1).is_5utr());
        assert!(!CdsPos::utr3(1).is_5utr());
    }
}
