//! Position parsing
//!
//! Parses c. positions: coding (`100`), 5' UTR (`-14`), 3' UTR (`*25`), each
//! with an optional intronic offset (`100+5`, `-14+3`, `*2-1`).

use crate::hgvs::location::CdsPos;
use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::opt,
    sequence::preceded,
    IResult, Parser,
};

/// Parse an unsigned, non-zero integer
fn parse_nonzero(input: &str) -> IResult<&str, i64> {
    let (remaining, s) = digit1.parse(input)?;
    // Use checked parsing to detect overflow
    let value: i64 = s.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((remaining, value))
}

/// Parse an intronic offset (+5, -10)
///
/// A zero offset is rejected; `c.100+0` is just `c.100`.
#[inline]
pub fn parse_offset(input: &str) -> IResult<&str, i64> {
    let (remaining, sign) = alt((char('+'), char('-'))).parse(input)?;
    let (remaining, value) = parse_nonzero(remaining)?;
    Ok((remaining, if sign == '-' { -value } else { value }))
}

/// Parse a c. position with optional UTR marker and intronic offset
#[inline]
pub fn parse_cds_pos(input: &str) -> IResult<&str, CdsPos> {
    let (remaining, marker) = opt(alt((char('*'), char('-')))).parse(input)?;
    let (remaining, base) = parse_nonzero(remaining)?;
    let (remaining, offset) = opt(parse_offset).parse(remaining)?;

    let pos = match marker {
        Some('*') => CdsPos::utr3(base),
        Some(_) => CdsPos::new(-base),
        None => CdsPos::new(base),
    };
    Ok((
        remaining,
        match offset {
            Some(off) => pos.offset_by(off),
            None => pos,
        },
    ))
}

/// Parse a position or a `start_end` range
pub fn parse_cds_range(input: &str) -> IResult<&str, (CdsPos, Option<CdsPos>)> {
    let (remaining, start) = parse_cds_pos(input)?;
    let (remaining, end) = opt(preceded(char('_'), parse_cds_pos)).parse(remaining)?;
    Ok((remaining, (start, end)))
}
