//! Edit parsing
//!
//! Parses the variant body that follows the position: `A>G`, `del`, `delCT`,
//! `del15`, `insAT`, `dup`, `dupA`, `delinsAT`, `delGAinsT`.

use crate::hgvs::variant::VariantKind;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt},
    sequence::preceded,
    IResult, Parser,
};

/// A parsed variant body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEdit {
    pub kind: VariantKind,
    pub reference: String,
    pub alternate: String,
    pub deleted_length: Option<u64>,
}

impl ParsedEdit {
    fn new(kind: VariantKind, reference: String, alternate: String) -> Self {
        Self {
            kind,
            reference,
            alternate,
            deleted_length: None,
        }
    }
}

/// Check if a character is an accepted base (case-insensitive)
#[inline]
pub fn is_base(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')
}

/// Parse a single base, upper-cased
fn parse_base(input: &str) -> IResult<&str, char> {
    match input.chars().next() {
        Some(c) if is_base(c) => Ok((&input[c.len_utf8()..], c.to_ascii_uppercase())),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::OneOf,
        ))),
    }
}

/// Parse a run of bases, upper-cased
#[inline]
pub fn parse_sequence(input: &str) -> IResult<&str, String> {
    map(take_while1(is_base), |s: &str| s.to_ascii_uppercase()).parse(input)
}

/// Parse a substitution (`A>G`)
pub fn parse_substitution(input: &str) -> IResult<&str, ParsedEdit> {
    let (remaining, reference) = parse_base(input)?;
    let (remaining, _) = char('>').parse(remaining)?;
    let (remaining, alternate) = parse_base(remaining)?;
    Ok((
        remaining,
        ParsedEdit::new(
            VariantKind::Substitution,
            reference.to_string(),
            alternate.to_string(),
        ),
    ))
}

/// What may follow `del`: a length or the deleted bases
enum Deleted {
    Length(u64),
    Bases(String),
}

fn parse_deleted(input: &str) -> IResult<&str, Deleted> {
    alt((
        map(map_res(digit1, |s: &str| s.parse::<u64>()), Deleted::Length),
        map(parse_sequence, Deleted::Bases),
    ))
    .parse(input)
}

/// Parse a deletion or deletion-insertion
///
/// `del`, `delCT` and `del15` are deletions; a trailing `insXYZ` turns any of
/// the first two into a delins.
pub fn parse_deletion(input: &str) -> IResult<&str, ParsedEdit> {
    let (remaining, _) = tag("del").parse(input)?;
    let (remaining, deleted) = opt(parse_deleted).parse(remaining)?;

    if !matches!(deleted, Some(Deleted::Length(_))) {
        let (after, inserted) = opt(preceded(tag("ins"), parse_sequence)).parse(remaining)?;
        if let Some(alternate) = inserted {
            let reference = match deleted {
                Some(Deleted::Bases(s)) => s,
                _ => String::new(),
            };
            return Ok((
                after,
                ParsedEdit::new(VariantKind::Delins, reference, alternate),
            ));
        }
    }

    let edit = match deleted {
        Some(Deleted::Length(n)) => ParsedEdit {
            deleted_length: Some(n),
            ..ParsedEdit::new(VariantKind::Deletion, String::new(), String::new())
        },
        Some(Deleted::Bases(s)) => ParsedEdit::new(VariantKind::Deletion, s, String::new()),
        None => ParsedEdit::new(VariantKind::Deletion, String::new(), String::new()),
    };
    Ok((remaining, edit))
}

/// Parse an insertion (`insAT`)
pub fn parse_insertion(input: &str) -> IResult<&str, ParsedEdit> {
    let (remaining, alternate) = preceded(tag("ins"), parse_sequence).parse(input)?;
    Ok((
        remaining,
        ParsedEdit::new(VariantKind::Insertion, String::new(), alternate),
    ))
}

/// Parse a duplication (`dup`, `dupA`)
pub fn parse_duplication(input: &str) -> IResult<&str, ParsedEdit> {
    let (remaining, reference) = preceded(tag("dup"), opt(parse_sequence)).parse(input)?;
    Ok((
        remaining,
        ParsedEdit::new(
            VariantKind::Duplication,
            reference.unwrap_or_default(),
            String::new(),
        ),
    ))
}

/// Parse any supported variant body
pub fn parse_edit(input: &str) -> IResult<&str, ParsedEdit> {
    alt((
        parse_deletion,
        parse_duplication,
        parse_insertion,
        parse_substitution,
    ))
    .parse(input)
}
