//! Error types for ferro-resolve
//!
//! Every failure of a resolution is terminal for that variant and is returned
//! to the caller as a [`FerroError`]. Errors carry enough context (notation,
//! transcript, resolved offset where known) to log and skip a single variant.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Parse errors (E1xxx)
    /// Notation does not match the variant grammar
    MalformedNotation = 1001,

    // Reference errors (E2xxx)
    /// Transcript not in the annotation index
    TranscriptNotFound = 2001,
    /// Chromosome not in the reference index
    ReferenceNotFound = 2002,
    /// Requested window lies outside the chromosome
    ReferenceOutOfBounds = 2003,

    // Validation errors (E3xxx)
    /// Declared reference disagrees with the genome
    ReferenceMismatch = 3001,
    /// Range is not usable for this variant kind
    InvalidRange = 3002,
    /// c. position falls outside the transcript
    PositionOutOfRange = 3003,

    // Conversion errors (E4xxx)
    /// Intronic offset cannot be placed
    IntronicPositionUnsupported = 4001,
    /// Range covers non-contiguous genomic bases
    SpansIntron = 4002,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// Malformed annotation table
    InvalidAnnotation = 9002,
    /// Malformed FASTA or FASTA index
    InvalidFasta = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MalformedNotation => "malformed variant notation",
            ErrorCode::TranscriptNotFound => "transcript not found",
            ErrorCode::ReferenceNotFound => "chromosome not found in reference",
            ErrorCode::ReferenceOutOfBounds => "reference window out of bounds",
            ErrorCode::ReferenceMismatch => "reference sequence mismatch",
            ErrorCode::InvalidRange => "invalid coordinate range",
            ErrorCode::PositionOutOfRange => "position outside transcript",
            ErrorCode::IntronicPositionUnsupported => "intronic position cannot be placed",
            ErrorCode::SpansIntron => "variant spans an intron",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::InvalidAnnotation => "malformed annotation table",
            ErrorCode::InvalidFasta => "malformed FASTA file",
            ErrorCode::ConfigError => "configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A span in the source input indicating error location
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Starting byte offset (0-indexed)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span for a single position
    pub fn point(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Format the source with the error highlighted
    ///
    /// Returns a string like:
    /// ```text
    /// NM_004333:c.1799T>Q
    ///                   ^
    /// ```
    pub fn highlight(&self, source: &str) -> String {
        if source.is_empty() {
            return String::new();
        }

        let safe_start = self.start.min(source.len());
        let safe_end = self.end.min(source.len()).max(safe_start);

        let mut pointer = " ".repeat(safe_start);
        pointer.push('^');
        if safe_end > safe_start + 1 {
            pointer.push_str(&"~".repeat(safe_end - safe_start - 1));
        }

        format!("{}\n{}", source, pointer)
    }
}

/// Main error type for ferro-resolve operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// Input does not match the variant notation grammar
    #[error("Malformed notation '{input}' at position {pos}: {msg}")]
    MalformedNotation {
        input: String,
        pos: usize,
        msg: String,
    },

    /// Transcript identifier absent from the annotation index
    #[error("Transcript not found: {id}{}", in_notation(.notation))]
    TranscriptNotFound {
        id: String,
        notation: Option<String>,
    },

    /// Intronic offset cannot be unambiguously placed
    #[error(
        "Intronic position {position} on {transcript} cannot be placed: {reason}{}",
        in_notation(.notation)
    )]
    IntronicPositionUnsupported {
        transcript: String,
        position: String,
        reason: String,
        notation: Option<String>,
    },

    /// Declared reference allele disagrees with the reference sequence
    #[error(
        "Reference mismatch for {notation} at {chromosome}:{position}: expected {expected}, found {found}"
    )]
    ReferenceMismatch {
        notation: String,
        chromosome: String,
        position: u64,
        expected: String,
        found: String,
    },

    /// Chromosome absent from the reference index
    #[error("Reference sequence not found: {chromosome}{}", in_notation(.notation))]
    ReferenceNotFound {
        chromosome: String,
        notation: Option<String>,
    },

    /// Requested window exceeds the chromosome
    #[error(
        "Reference window {chromosome}:{start}-{end} exceeds sequence length {length}{}",
        in_notation(.notation)
    )]
    ReferenceOutOfBounds {
        chromosome: String,
        start: u64,
        end: u64,
        length: u64,
        notation: Option<String>,
    },

    /// Range covers bases that are not contiguous on the genome
    #[error("Variant {notation} spans an intron of {transcript}")]
    SpansIntron { notation: String, transcript: String },

    /// c. position maps outside the transcript
    #[error(
        "Position {position} is outside transcript {transcript} (length {length}){}",
        in_notation(.notation)
    )]
    PositionOutOfRange {
        transcript: String,
        position: String,
        length: u64,
        notation: Option<String>,
    },

    /// Range is structurally unusable for the variant kind
    #[error("Invalid range in {notation}: {msg}")]
    InvalidRange { notation: String, msg: String },

    /// Malformed row in an annotation table
    #[error("Invalid annotation at line {line}: {msg}")]
    InvalidAnnotation { line: usize, msg: String },

    /// Malformed FASTA or FASTA index
    #[error("Invalid FASTA: {msg}")]
    InvalidFasta { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// Configuration error
    #[error("Configuration error: {msg}")]
    Config { msg: String },
}

fn in_notation(notation: &Option<String>) -> String {
    match notation {
        Some(n) => format!(" (in {})", n),
        None => String::new(),
    }
}

impl FerroError {
    /// Attach the notation being resolved to errors raised below the resolver
    ///
    /// Lookup, mapping and accessor errors are created without it. A notation
    /// already present is kept.
    pub fn with_notation(mut self, notation: &str) -> Self {
        match &mut self {
            FerroError::TranscriptNotFound { notation: slot, .. }
            | FerroError::IntronicPositionUnsupported { notation: slot, .. }
            | FerroError::ReferenceNotFound { notation: slot, .. }
            | FerroError::ReferenceOutOfBounds { notation: slot, .. }
            | FerroError::PositionOutOfRange { notation: slot, .. } => {
                if slot.is_none() {
                    *slot = Some(notation.to_string());
                }
            }
            _ => {}
        }
        self
    }

    /// The notation this error concerns, when known
    pub fn notation(&self) -> Option<&str> {
        match self {
            FerroError::MalformedNotation { input, .. } => Some(input),
            FerroError::ReferenceMismatch { notation, .. }
            | FerroError::SpansIntron { notation, .. }
            | FerroError::InvalidRange { notation, .. } => Some(notation),
            FerroError::TranscriptNotFound { notation, .. }
            | FerroError::IntronicPositionUnsupported { notation, .. }
            | FerroError::ReferenceNotFound { notation, .. }
            | FerroError::ReferenceOutOfBounds { notation, .. }
            | FerroError::PositionOutOfRange { notation, .. } => notation.as_deref(),
            _ => None,
        }
    }

    /// Create a malformed-notation error at a byte offset of `input`
    pub fn malformed(input: &str, pos: usize, msg: impl Into<String>) -> Self {
        FerroError::MalformedNotation {
            input: input.to_string(),
            pos,
            msg: msg.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::MalformedNotation { .. } => ErrorCode::MalformedNotation,
            FerroError::TranscriptNotFound { .. } => ErrorCode::TranscriptNotFound,
            FerroError::IntronicPositionUnsupported { .. } => {
                ErrorCode::IntronicPositionUnsupported
            }
            FerroError::ReferenceMismatch { .. } => ErrorCode::ReferenceMismatch,
            FerroError::ReferenceNotFound { .. } => ErrorCode::ReferenceNotFound,
            FerroError::ReferenceOutOfBounds { .. } => ErrorCode::ReferenceOutOfBounds,
            FerroError::SpansIntron { .. } => ErrorCode::SpansIntron,
            FerroError::PositionOutOfRange { .. } => ErrorCode::PositionOutOfRange,
            FerroError::InvalidRange { .. } => ErrorCode::InvalidRange,
            FerroError::InvalidAnnotation { .. } => ErrorCode::InvalidAnnotation,
            FerroError::InvalidFasta { .. } => ErrorCode::InvalidFasta,
            FerroError::Io { .. } => ErrorCode::IoError,
            FerroError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get a formatted error with full diagnostic output
    ///
    /// Malformed notations are rendered with the offending position highlighted.
    pub fn detailed_message(&self) -> String {
        match self {
            FerroError::MalformedNotation { input, pos, msg } => format!(
                "[{}] {}\n\n{}",
                self.code(),
                msg,
                SourceSpan::point(*pos).highlight(input)
            ),
            _ => format!("[{}] {}", self.code(), self),
        }
    }
}

impl From<std::io::Error> for FerroError {
    fn from(e: std::io::Error) -> Self {
        FerroError::Io { msg: e.to_string() }
    }
}
