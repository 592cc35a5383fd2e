//! Variant notation parser using nom
//!
//! Accepts coding-DNA notations of the form
//!
//! ```text
//! transcript_id ':' 'c.' position ['_' position] edit
//! ```
//!
//! where a position is `N`, `-N` or `*N` with an optional `+N`/`-N` intronic
//! offset, and the edit is one of `X>Y`, `del[bases|length]`, `insBASES`,
//! `dup[bases]` or `del[bases]insBASES`.
//!
//! The parser performs no lookups. Every failure is reported as
//! [`FerroError::MalformedNotation`] with the byte offset where parsing stopped.

pub mod accession;
pub mod edit;
pub mod position;

use crate::error::FerroError;
use crate::hgvs::variant::VariantToken;
use nom::Parser;

/// Byte offset of `rest` within `input`
fn offset_of(input: &str, rest: &str) -> usize {
    input.len() - rest.len()
}

/// Parse a variant notation into a [`VariantToken`]
///
/// Leading and trailing whitespace is ignored.
///
/// # Example
///
/// ```
/// use ferro_resolve::parse_notation;
///
/// let token = parse_notation("NM_004333.4:c.1799T>A").unwrap();
/// assert_eq!(token.transcript_id, "NM_004333.4");
/// assert_eq!(token.start.base, 1799);
/// ```
pub fn parse_notation(input: &str) -> Result<VariantToken, FerroError> {
    let input = input.trim();
    let malformed =
        |rest: &str, msg: &str| FerroError::malformed(input, offset_of(input, rest), msg);

    let (rest, transcript_id) = accession::parse_transcript_id(input)
        .map_err(|_| malformed(input, "expected transcript identifier"))?;

    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| malformed(rest, "expected ':' after transcript identifier"))?;
    let rest = rest
        .strip_prefix("c.")
        .ok_or_else(|| malformed(rest, "expected 'c.' coordinate prefix"))?;

    let (rest, (start, end)) =
        position::parse_cds_range(rest).map_err(|_| malformed(rest, "expected position"))?;
    if rest.starts_with('_') {
        return Err(malformed(&rest[1..], "expected range end position"));
    }

    let body_pos = offset_of(input, rest);
    let (rest, parsed) = edit::parse_edit
        .parse(rest)
        .map_err(|_| malformed(rest, "expected variant edit (>, del, ins, dup or delins)"))?;
    if !rest.is_empty() {
        return Err(malformed(rest, "unexpected trailing characters"));
    }

    let token = VariantToken::new(
        transcript_id,
        start,
        end,
        parsed.kind,
        parsed.reference,
        parsed.alternate,
    )
    .map_err(|e| match e {
        FerroError::InvalidRange { msg, .. } => FerroError::malformed(input, body_pos, msg),
        other => other,
    })?;

    Ok(match parsed.deleted_length {
        Some(n) => token.with_deleted_length(n),
        None => token,
    })
}
