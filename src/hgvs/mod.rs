//! Variant notation types and parser
//!
//! This module contains the structured form of a c. notation and a nom-based
//! parser that produces it.

pub mod location;
pub mod parser;
pub mod variant;

// Re-export commonly used types
pub use location::CdsPos;
pub use variant::{VariantKind, VariantToken};
