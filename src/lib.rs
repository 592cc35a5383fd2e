// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-resolve: HGVS c. notation to genomic coordinates
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Resolves transcript-relative notations such as `NM_004333.4:c.1799T>A`
//! to forward-strand genomic `chrom/pos/ref/alt` records using a refGene
//! annotation table and an indexed reference FASTA.
//!
//! # Example
//!
//! ```
//! use ferro_resolve::{MockSequences, Resolver, Strand, Transcript, TranscriptDb};
//!
//! // A two-exon minus-strand transcript on chr1
//! let mut db = TranscriptDb::new();
//! let tx = Transcript::new("NM_EXAMPLE.1", "chr1", Strand::Minus, vec![(2, 5), (8, 11)]).unwrap();
//! db.add(tx);
//!
//! let genome = MockSequences::new().with_sequence("chr1", "TTAGCAAGGCTA");
//! let resolver = Resolver::new(&db, &genome);
//!
//! // c.1 is the last exonic base on the genome; alleles come back complemented
//! let variant = resolver.resolve("NM_EXAMPLE.1:c.1A>G").unwrap();
//! assert_eq!(variant.chromosome, "chr1");
//! assert_eq!(variant.position, 11);
//! assert_eq!(variant.reference, "T");
//! assert_eq!(variant.alternate, "C");
//! ```

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod hgvs;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reference;

// Re-export commonly used types
pub use config::FerroConfig;
pub use convert::{CoordinateMapper, GenomicVariant, ResolveOptions, Resolver};
pub use error::{ErrorCode, FerroError};
pub use hgvs::parser::parse_notation;
pub use hgvs::{CdsPos, VariantKind, VariantToken};
pub use reference::{
    FastaIndex, IndexedFasta, MmapFasta, MockSequences, SequenceSource, Strand, Transcript,
    TranscriptDb,
};

/// Result type alias for ferro-resolve operations
pub type Result<T> = std::result::Result<T, FerroError>;
