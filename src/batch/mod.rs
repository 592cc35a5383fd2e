//! Batch resolution of many notations.
//!
//! Wraps a [`Resolver`](crate::Resolver) with progress tracking, error
//! aggregation and summary statistics. Output order always matches input
//! order.
//!
//! # Examples
//!
//! ```
//! use ferro_resolve::batch::{BatchConfig, BatchProcessor};
//! use ferro_resolve::{MockSequences, Resolver, Strand, Transcript, TranscriptDb};
//!
//! let mut db = TranscriptDb::new();
//! db.add(Transcript::new("NM_TEST", "chr1", Strand::Plus, vec![(1, 8)]).unwrap());
//! let genome = MockSequences::new().with_sequence("chr1", "ACGTACGT");
//! let resolver = Resolver::new(&db, &genome);
//!
//! let processor = BatchProcessor::new(&resolver);
//! let result = processor.resolve(&["NM_TEST:c.1A>G", "NM_OTHER:c.1A>G"]);
//! assert_eq!(result.success_count(), 1);
//! assert_eq!(result.error_count(), 1);
//!
//! let fail_fast = BatchProcessor::with_config(&resolver, BatchConfig::new().continue_on_error(false));
//! let result = fail_fast.resolve(&["NM_OTHER:c.1A>G", "NM_TEST:c.1A>G"]);
//! assert_eq!(result.total(), 1);
//! ```

mod processor;

pub use processor::{
    resolve_all, BatchConfig, BatchProcessor, BatchProgress, BatchResult, ItemResult,
};
