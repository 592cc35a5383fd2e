//! Reference sequence source trait
//!
//! Defines the interface for reading bases from a chromosome-indexed
//! reference genome. Positions are 1-based and inclusive.

use crate::error::FerroError;
use crate::reference::transcript::ReferenceWindow;

/// Trait for random access to reference sequence data
///
/// Implementations must be read-only once constructed, so a single source can
/// be shared by any number of concurrent readers.
///
/// Implementations include:
/// - [`IndexedFasta`](crate::reference::IndexedFasta): seek-based reads against an indexed FASTA
/// - [`MmapFasta`](crate::reference::MmapFasta): reads from a memory-mapped FASTA
/// - [`MockSequences`](crate::reference::MockSequences): in-memory sequences for testing
pub trait SequenceSource {
    /// Length of a chromosome
    ///
    /// Fails with [`FerroError::ReferenceNotFound`] when the chromosome is absent.
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError>;

    /// Fetch `length` bases starting at 1-based `start`, upper-cased
    ///
    /// # Errors
    ///
    /// - [`FerroError::ReferenceNotFound`] when the chromosome is absent
    /// - [`FerroError::ReferenceOutOfBounds`] when the window exceeds the chromosome
    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError>;

    /// Check if a chromosome exists
    fn has_sequence(&self, chromosome: &str) -> bool {
        self.sequence_length(chromosome).is_ok()
    }

    /// Fetch a window of bases along with its coordinates
    fn fetch_window(
        &self,
        chromosome: &str,
        start: u64,
        length: u64,
    ) -> Result<ReferenceWindow, FerroError> {
        let bases = self.fetch(chromosome, start, length)?;
        Ok(ReferenceWindow::new(chromosome, start, bases))
    }

    /// Fetch the single base at a 1-based position
    fn fetch_base(&self, chromosome: &str, position: u64) -> Result<char, FerroError> {
        self.fetch(chromosome, position, 1)?
            .chars()
            .next()
            .ok_or_else(|| FerroError::InvalidFasta {
                msg: format!("no base returned for {}:{}", chromosome, position),
            })
    }
}

impl<T: SequenceSource + ?Sized> SequenceSource for &T {
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError> {
        (**self).sequence_length(chromosome)
    }

    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError> {
        (**self).fetch(chromosome, start, length)
    }
}

impl<T: SequenceSource + ?Sized> SequenceSource for Box<T> {
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError> {
        (**self).sequence_length(chromosome)
    }

    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError> {
        (**self).fetch(chromosome, start, length)
    }
}

/// Check that a 1-based window lies inside a sequence of `total` bases
///
/// A zero-length window is valid anywhere from position 1 to `total + 1`.
pub fn check_window(
    chromosome: &str,
    start: u64,
    length: u64,
    total: u64,
) -> Result<(), FerroError> {
    let end = start.checked_add(length).map(|past| past.saturating_sub(1));
    let in_bounds = start >= 1
        && match end {
            Some(_) if length == 0 => start <= total.saturating_add(1),
            Some(end) => end <= total,
            None => false,
        };
    if in_bounds {
        Ok(())
    } else {
        Err(FerroError::ReferenceOutOfBounds {
            chromosome: chromosome.to_string(),
            start,
            end: end.unwrap_or(u64::MAX),
            length: total,
            notation: None,
        })
    }
}

/// Alternative spellings of a chromosome name to try, in order
///
/// Toggles the `chr` prefix and treats `M` and `MT` as the same sequence.
pub fn name_candidates(name: &str) -> Vec<String> {
    let bare = name.strip_prefix("chr").unwrap_or(name);
    let mut bares = vec![bare.to_string()];
    match bare {
        "M" => bares.push("MT".to_string()),
        "MT" => bares.push("M".to_string()),
        _ => {}
    }

    let mut candidates = vec![name.to_string()];
    for b in bares {
        for candidate in [format!("chr{}", b), b] {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_window() {
        assert!(check_window("chr1", 1, 10, 10).is_ok());
        assert!(check_window("chr1", 10, 1, 10).is_ok());
        assert!(check_window("chr1", 11, 0, 10).is_ok());

        let err = check_window("chr1", 5, 10, 10).unwrap_err();
        assert_eq!(
            err,
            FerroError::ReferenceOutOfBounds {
                chromosome: "chr1".to_string(),
                start: 5,
                end: 14,
                length: 10,
                notation: None,
            }
        );
        assert!(check_window("chr1", 0, 1, 10).is_err());
        assert!(check_window("chr1", 12, 0, 10).is_err());
    }

    #[test]
    fn test_check_window_rejects_overflowing_windows() {
        let err = check_window("chr1", u64::MAX, 2, 10).unwrap_err();
        assert_eq!(
            err,
            FerroError::ReferenceOutOfBounds {
                chromosome: "chr1".to_string(),
                start: u64::MAX,
                end: u64::MAX,
                length: 10,
                notation: None,
            }
        );
        assert!(check_window("chr1", 2, u64::MAX, 10).is_err());
    }

    #[test]
    fn test_name_candidates() {
        assert_eq!(name_candidates("chr1"), vec!["chr1", "1"]);
        assert_eq!(name_candidates("7"), vec!["7", "chr7"]);
        assert_eq!(name_candidates("chrM"), vec!["chrM", "M", "chrMT", "MT"]);
        assert_eq!(name_candidates("MT"), vec!["MT", "chrMT", "chrM", "M"]);
    }
}
