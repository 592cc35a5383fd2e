//! In-memory sequence source for testing

use std::collections::HashMap;

use crate::error::FerroError;
use crate::reference::provider::{check_window, name_candidates, SequenceSource};

/// Sequence source holding whole chromosomes in memory
#[derive(Debug, Clone, Default)]
pub struct MockSequences {
    sequences: HashMap<String, String>,
}

impl MockSequences {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chromosome sequence (upper-cased on insert)
    pub fn add_sequence(&mut self, chromosome: impl Into<String>, sequence: impl AsRef<str>) {
        self.sequences
            .insert(chromosome.into(), sequence.as_ref().to_ascii_uppercase());
    }

    /// Builder-style [`add_sequence`](Self::add_sequence)
    pub fn with_sequence(mut self, chromosome: impl Into<String>, sequence: impl AsRef<str>) -> Self {
        self.add_sequence(chromosome, sequence);
        self
    }

    fn lookup(&self, chromosome: &str) -> Result<&str, FerroError> {
        name_candidates(chromosome)
            .iter()
            .find_map(|name| self.sequences.get(name))
            .map(String::as_str)
            .ok_or_else(|| FerroError::ReferenceNotFound {
                chromosome: chromosome.to_string(),
                notation: None,
            })
    }
}

impl SequenceSource for MockSequences {
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError> {
        Ok(self.lookup(chromosome)?.len() as u64)
    }

    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError> {
        let seq = self.lookup(chromosome)?;
        check_window(chromosome, start, length, seq.len() as u64)?;
        let from = (start - 1) as usize;
        Ok(seq[from..from + length as usize].to_string())
    }
}
