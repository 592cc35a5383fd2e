//! Batch processor implementation.

use std::time::{Duration, Instant};

use log::warn;

use crate::convert::genomic::GenomicVariant;
use crate::convert::resolver::Resolver;
use crate::error::FerroError;
use crate::reference::provider::SequenceSource;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Whether to continue processing on errors.
    pub continue_on_error: bool,
    /// Callback frequency (call progress callback every N items).
    pub progress_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            progress_interval: 1000,
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether to continue on errors.
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Set the progress callback interval.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

/// Progress information for batch operations.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Total items to process.
    pub total: usize,
    /// Items processed so far.
    pub processed: usize,
    /// Successful items so far.
    pub success: usize,
    /// Failed items so far.
    pub errors: usize,
    /// Time elapsed since start.
    pub elapsed: Duration,
}

impl BatchProgress {
    /// Completion percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    /// Items per second; 0.0 until time has elapsed.
    pub fn items_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs < f64::EPSILON {
            0.0
        } else {
            self.processed as f64 / secs
        }
    }
}

/// Result of a single item in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResult {
    /// Resolved variant.
    Ok {
        /// Original notation.
        input: String,
        /// Genomic record.
        variant: GenomicVariant,
    },
    /// Failed resolution.
    Err {
        /// Original notation.
        input: String,
        /// Error that occurred.
        error: FerroError,
    },
}

impl ItemResult {
    fn from_result(input: &str, result: Result<GenomicVariant, FerroError>) -> Self {
        match result {
            Ok(variant) => ItemResult::Ok {
                input: input.to_string(),
                variant,
            },
            Err(error) => ItemResult::Err {
                input: input.to_string(),
                error,
            },
        }
    }

    /// The notation this result belongs to.
    pub fn input(&self) -> &str {
        match self {
            ItemResult::Ok { input, .. } | ItemResult::Err { input, .. } => input,
        }
    }

    /// Check if this is a success.
    pub fn is_ok(&self) -> bool {
        matches!(self, ItemResult::Ok { .. })
    }

    /// Check if this is an error.
    pub fn is_err(&self) -> bool {
        matches!(self, ItemResult::Err { .. })
    }

    /// Borrow as a standard result.
    pub fn as_result(&self) -> Result<&GenomicVariant, &FerroError> {
        match self {
            ItemResult::Ok { variant, .. } => Ok(variant),
            ItemResult::Err { error, .. } => Err(error),
        }
    }
}

/// Result of a batch operation.
#[derive(Debug)]
pub struct BatchResult {
    /// Individual results, in input order.
    pub results: Vec<ItemResult>,
    /// Total processing time.
    pub duration: Duration,
}

impl BatchResult {
    /// Create a new batch result.
    pub fn new(results: Vec<ItemResult>, duration: Duration) -> Self {
        Self { results, duration }
    }

    /// Number of items processed.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of resolved items.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of failed items.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    /// Success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            100.0
        } else {
            (self.success_count() as f64 / self.results.len() as f64) * 100.0
        }
    }

    /// Check if any items failed.
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.is_err())
    }

    /// Resolved variants only, in input order.
    pub fn variants(&self) -> Vec<&GenomicVariant> {
        self.results
            .iter()
            .filter_map(|r| r.as_result().ok())
            .collect()
    }
}

/// Resolves batches of notations with one resolver.
pub struct BatchProcessor<'r, 'a, S: SequenceSource + ?Sized> {
    resolver: &'r Resolver<'a, S>,
    config: BatchConfig,
}

impl<'r, 'a, S: SequenceSource + ?Sized> BatchProcessor<'r, 'a, S> {
    /// Create a batch processor with default configuration.
    pub fn new(resolver: &'r Resolver<'a, S>) -> Self {
        Self {
            resolver,
            config: BatchConfig::default(),
        }
    }

    /// Create a batch processor with configuration.
    pub fn with_config(resolver: &'r Resolver<'a, S>, config: BatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Resolve every notation.
    pub fn resolve<T: AsRef<str>>(&self, notations: &[T]) -> BatchResult {
        self.resolve_with_progress(notations, |_| {})
    }

    /// Resolve every notation, reporting progress every `progress_interval` items.
    ///
    /// With `continue_on_error` off, processing stops after the first failure
    /// and the result holds only the items seen so far.
    pub fn resolve_with_progress<T, F>(&self, notations: &[T], mut progress_fn: F) -> BatchResult
    where
        T: AsRef<str>,
        F: FnMut(BatchProgress),
    {
        let start = Instant::now();
        let total = notations.len();
        let interval = self.config.progress_interval.max(1);
        let mut results = Vec::with_capacity(total);
        let mut success = 0;
        let mut errors = 0;

        for (i, input) in notations.iter().enumerate() {
            let input = input.as_ref();
            let item = ItemResult::from_result(input, self.resolver.resolve(input));
            if let ItemResult::Err { error, .. } = &item {
                warn!("{}: [{}] {}", input, error.code(), error);
                errors += 1;
            } else {
                success += 1;
            }
            let failed = item.is_err();
            results.push(item);

            if (i + 1) % interval == 0 || i + 1 == total {
                progress_fn(BatchProgress {
                    total,
                    processed: i + 1,
                    success,
                    errors,
                    elapsed: start.elapsed(),
                });
            }

            if failed && !self.config.continue_on_error {
                break;
            }
        }

        BatchResult::new(results, start.elapsed())
    }
}

/// Resolve every notation, one outcome per input in input order.
pub fn resolve_all<S, T>(resolver: &Resolver<'_, S>, notations: &[T]) -> Vec<ItemResult>
where
    S: SequenceSource + ?Sized,
    T: AsRef<str>,
{
    BatchProcessor::new(resolver).resolve(notations).results
}
