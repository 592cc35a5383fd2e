//! Parallel resolution for ferro-resolve
//!
//! Resolves many notations across a rayon thread pool. Enable with the
//! `parallel` feature (on by default).
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() -> Result<(), ferro_resolve::FerroError> {
//! use ferro_resolve::parallel::{resolve_parallel, ParallelConfig};
//! use ferro_resolve::{IndexedFasta, Resolver, TranscriptDb};
//!
//! let db = TranscriptDb::load_refgene("refGene.txt", true)?;
//! let genome = IndexedFasta::open("hg19.fa")?;
//! let resolver = Resolver::new(&db, &genome);
//!
//! let notations = vec!["NM_004333.4:c.1799T>A", "NM_000546.5:c.215C>G"];
//! let results = ParallelConfig::new()
//!     .with_num_threads(4)
//!     .install(|| resolve_parallel(&resolver, &notations))?;
//! assert_eq!(results.len(), 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::batch::ItemResult;
use crate::convert::genomic::GenomicVariant;
use crate::convert::resolver::Resolver;
use crate::error::FerroError;
use crate::reference::provider::SequenceSource;

/// Resolve notations in parallel
///
/// Returns one outcome per input, paired with its notation. Order is preserved.
pub fn resolve_parallel<S, T>(resolver: &Resolver<'_, S>, notations: &[T]) -> Vec<ItemResult>
where
    S: SequenceSource + Sync + ?Sized,
    T: AsRef<str> + Sync,
{
    notations
        .par_iter()
        .map(|n| {
            let input = n.as_ref();
            match resolver.resolve(input) {
                Ok(variant) => ItemResult::Ok {
                    input: input.to_string(),
                    variant,
                },
                Err(error) => ItemResult::Err {
                    input: input.to_string(),
                    error,
                },
            }
        })
        .collect()
}

/// Resolve notations in parallel, dropping failures
pub fn resolve_parallel_ok<S, T>(resolver: &Resolver<'_, S>, notations: &[T]) -> Vec<GenomicVariant>
where
    S: SequenceSource + Sync + ?Sized,
    T: AsRef<str> + Sync,
{
    notations
        .par_iter()
        .filter_map(|n| resolver.resolve(n.as_ref()).ok())
        .collect()
}

/// Configuration for parallel batch processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    /// Number of threads (0 = use rayon default)
    pub num_threads: usize,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of threads
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Run `op` inside a pool sized by this configuration
    pub fn install<R, F>(&self, op: F) -> Result<R, FerroError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        if self.num_threads == 0 {
            return Ok(op());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| FerroError::Config {
                msg: format!("failed to build thread pool: {}", e),
            })?;
        Ok(pool.install(op))
    }
}

/// Statistics from parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelStats {
    /// Total items processed
    pub total: usize,
    /// Successfully processed
    pub success: usize,
    /// Failed to process
    pub errors: usize,
}

impl ParallelStats {
    /// Tally a set of outcomes
    pub fn from_results(results: &[ItemResult]) -> Self {
        let success = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            success,
            errors: results.len() - success,
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}
