//! Transcript identifier parsing
//!
//! Accepts RefSeq-style ids (`NM_004333`, `NM_004333.4`), Ensembl ids and
//! plain gene-model names: ASCII alphanumerics, `_`, `-` and a version dot.

use nom::{bytes::complete::take_while1, IResult, Parser};

#[inline]
fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Parse a transcript identifier
pub fn parse_transcript_id(input: &str) -> IResult<&str, &str> {
    let (remaining, id) = take_while1(is_id_char).parse(input)?;
    if id.starts_with('.') || id.ends_with('.') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((remaining, id))
}

/// Split an identifier into its base and numeric version, if any
///
/// `NM_004333.4` gives `("NM_004333", Some(4))`; an id without a numeric
/// suffix is returned whole.
pub fn split_version(id: &str) -> (&str, Option<u32>) {
    match id.rsplit_once('.') {
        Some((base, version)) if !base.is_empty() => match version.parse() {
            Ok(v) => (base, Some(v)),
            Err(_) => (id, None),
        },
        _ => (id, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refseq() {
        let (rest, id) = parse_transcript_id("NM_004333.4:c.1799T>A").unwrap();
        assert_eq!(id, "NM_004333.4");
        assert_eq!(rest, ":c.1799T>A");
    }

    #[test]
    fn test_unversioned() {
        let (rest, id) = parse_transcript_id("NM_004333:c.1").unwrap();
        assert_eq!(id, "NM_004333");
        assert_eq!(rest, ":c.1");
    }

    #[test]
    fn test_rejects_empty_and_dots() {
        assert!(parse_transcript_id(":c.1A>G").is_err());
        assert!(parse_transcript_id(".1:c.1A>G").is_err());
        assert!(parse_transcript_id("NM_1.:c.1A>G").is_err());
    }

    #[test]
    fn test_split_version() {
        assert_eq!(split_version("NM_004333.4"), ("NM_004333", Some(4)));
        assert_eq!(split_version("NM_004333"), ("NM_004333", None));
        assert_eq!(split_version("ABC.x"), ("ABC.x", None));
    }
}
