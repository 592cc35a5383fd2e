//! Coordinate conversion
//!
//! Maps c. positions onto transcript and genomic coordinates and resolves
//! whole variants to forward-strand genomic records.

pub mod genomic;
pub mod mapper;
pub mod resolver;

pub use genomic::GenomicVariant;
pub use mapper::CoordinateMapper;
pub use resolver::{ResolveOptions, Resolver};
