//! Reference data access
//!
//! Provides the reference sequence accessor, the transcript annotation index,
//! and the transcript model they share.

pub mod fasta;
pub mod loader;
pub mod mock;
pub mod provider;
pub mod transcript;

pub use fasta::{FastaIndex, IndexedFasta, MmapFasta};
pub use loader::{AddOutcome, LoadStats, TranscriptDb};
pub use mock::MockSequences;
pub use provider::SequenceSource;
pub use transcript::{reverse_complement, Exon, ReferenceWindow, Strand, Transcript};
