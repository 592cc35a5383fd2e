//! Parsed variant tokens
//!
//! A [`VariantToken`] is the structured form of one c. notation. It is built
//! by the parser, validated at construction, and consumed by the resolver.

use crate::error::FerroError;
use crate::hgvs::location::CdsPos;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Kind of sequence change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Single-base change (`A>G`)
    Substitution,
    /// Removal of one or more bases (`del`, `delCT`, `del15`)
    Deletion,
    /// Bases inserted between two adjacent positions (`insAT`)
    Insertion,
    /// Copy of a range inserted directly after it (`dup`)
    Duplication,
    /// Range replaced by other bases (`delinsAT`)
    Delins,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VariantKind::Substitution => "substitution",
            VariantKind::Deletion => "deletion",
            VariantKind::Insertion => "insertion",
            VariantKind::Duplication => "duplication",
            VariantKind::Delins => "delins",
        };
        f.write_str(s)
    }
}

/// A variant expressed relative to a transcript's coding sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantToken {
    /// Transcript identifier, possibly versioned (`NM_004333.4`)
    pub transcript_id: String,
    /// First (or only) affected position
    pub start: CdsPos,
    /// Last affected position for ranged forms
    pub end: Option<CdsPos>,
    /// Kind of change
    pub kind: VariantKind,
    /// Declared reference bases on the transcript strand (may be empty)
    pub reference: String,
    /// Alternate bases on the transcript strand (empty for deletions)
    pub alternate: String,
    /// Declared deletion length (`del15`)
    pub deleted_length: Option<u64>,
}

/// Sort key placing c. positions in 5' to 3' transcript order
fn transcript_order(pos: &CdsPos) -> (bool, i64, i64) {
    (pos.utr3, pos.base, pos.offset_or_zero())
}

/// Compare two c. positions in transcript order
pub fn cmp_positions(a: &CdsPos, b: &CdsPos) -> Ordering {
    transcript_order(a).cmp(&transcript_order(b))
}

impl VariantToken {
    /// Build a token, checking the structural rules each kind must satisfy
    ///
    /// Fails with [`FerroError::InvalidRange`] when the range is reversed or the
    /// kind's shape is violated (ranged substitution, unranged insertion, empty
    /// inserted sequence, identical substitution bases).
    pub fn new(
        transcript_id: impl Into<String>,
        start: CdsPos,
        end: Option<CdsPos>,
        kind: VariantKind,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Result<Self, FerroError> {
        let token = Self {
            transcript_id: transcript_id.into(),
            start,
            end,
            kind,
            reference: reference.into(),
            alternate: alternate.into(),
            deleted_length: None,
        };
        token.validate()?;
        Ok(token)
    }

    /// Attach a declared deletion length
    pub fn with_deleted_length(mut self, length: u64) -> Self {
        self.deleted_length = Some(length);
        self
    }

    fn validate(&self) -> Result<(), FerroError> {
        let invalid = |msg: &str| FerroError::InvalidRange {
            notation: self.to_string(),
            msg: msg.to_string(),
        };

        if let Some(end) = &self.end {
            if cmp_positions(end, &self.start) != Ordering::Greater {
                return Err(invalid("range end must lie after range start"));
            }
        }

        match self.kind {
            VariantKind::Substitution => {
                if self.end.is_some() {
                    return Err(invalid("substitution cannot span a range"));
                }
                if self.reference.len() != 1 || self.alternate.len() != 1 {
                    return Err(invalid("substitution changes exactly one base"));
                }
                if self.reference == self.alternate {
                    return Err(invalid("substitution bases must differ"));
                }
            }
            VariantKind::Insertion => {
                if self.end.is_none() {
                    return Err(invalid("insertion needs two flanking positions"));
                }
                if self.alternate.is_empty() {
                    return Err(invalid("insertion needs inserted bases"));
                }
            }
            VariantKind::Delins => {
                if self.alternate.is_empty() {
                    return Err(invalid("delins needs inserted bases"));
                }
            }
            VariantKind::Deletion | VariantKind::Duplication => {}
        }
        Ok(())
    }

    /// Whether the token spans more than one position
    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// Last affected position (the start for single-position forms)
    pub fn last(&self) -> CdsPos {
        self.end.unwrap_or(self.start)
    }

    /// Whether either end of the token is intronic
    pub fn is_intronic(&self) -> bool {
        self.start.is_intronic() || self.end.is_some_and(|e| e.is_intronic())
    }
}

impl fmt::Display for VariantToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:c.{}", self.transcript_id, self.start)?;
        if let Some(end) = &self.end {
            write!(f, "_{}", end)?;
        }
        match self.kind {
            VariantKind::Substitution => write!(f, "{}>{}", self.reference, self.alternate),
            VariantKind::Deletion => match self.deleted_length {
                Some(n) if self.reference.is_empty() => write!(f, "del{}", n),
                _ => write!(f, "del{}", self.reference),
            },
            VariantKind::Insertion => write!(f, "ins{}", self.alternate),
            VariantKind::Duplication => write!(f, "dup{}", self.reference),
            VariantKind::Delins => write!(f, "del{}ins{}", self.reference, self.alternate),
        }
    }
}
