//! Structured fuzz target for resolution
//!
//! Builds notation-like strings from structured input and resolves them
//! against a small in-memory transcript on each strand.

#![no_main]

use arbitrary::Arbitrary;
use ferro_resolve::{MockSequences, Resolver, Strand, Transcript, TranscriptDb};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Marker {
    None,
    Utr5,
    Utr3,
}

#[derive(Debug, Arbitrary)]
struct Position {
    marker: Marker,
    base: u16,
    offset: Option<i8>,
}

impl Position {
    fn render(&self) -> String {
        let marker = match self.marker {
            Marker::None => "",
            Marker::Utr5 => "-",
            Marker::Utr3 => "*",
        };
        match self.offset {
            Some(o) if o > 0 => format!("{}{}+{}", marker, self.base, o),
            Some(o) if o < 0 => format!("{}{}{}", marker, self.base, o),
            _ => format!("{}{}", marker, self.base),
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Edit {
    Substitution(u8, u8),
    Deletion(Option<u8>),
    Insertion(Vec<u8>),
    Duplication,
    Delins(Vec<u8>),
}

fn bases(raw: &[u8]) -> String {
    raw.iter().take(20).map(|b| b"ACGTN"[*b as usize % 5] as char).collect()
}

#[derive(Debug, Arbitrary)]
struct NotationInput {
    minus: bool,
    start: Position,
    end: Option<Position>,
    edit: Edit,
}

impl NotationInput {
    fn render(&self) -> String {
        let mut s = format!("NM_FUZZ.1:c.{}", self.start.render());
        if let Some(end) = &self.end {
            s.push('_');
            s.push_str(&end.render());
        }
        match &self.edit {
            Edit::Substitution(r, a) => {
                s.push_str(&format!("{}>{}", bases(&[*r]), bases(&[*a])));
            }
            Edit::Deletion(Some(n)) => s.push_str(&format!("del{}", n)),
            Edit::Deletion(None) => s.push_str("del"),
            Edit::Insertion(seq) => s.push_str(&format!("ins{}", bases(seq))),
            Edit::Duplication => s.push_str("dup"),
            Edit::Delins(seq) => s.push_str(&format!("delins{}", bases(seq))),
        }
        s
    }
}

fuzz_target!(|input: NotationInput| {
    let strand = if input.minus { Strand::Minus } else { Strand::Plus };
    let Ok(transcript) = Transcript::new("NM_FUZZ.1", "chr1", strand, vec![(1, 20), (31, 50), (61, 80)])
    else {
        return;
    };
    let Ok(transcript) = transcript.with_coding_region(11, 70) else {
        return;
    };
    let mut db = TranscriptDb::new();
    db.add(transcript);
    let genome = MockSequences::new().with_sequence("chr1", "ACGT".repeat(25));

    let resolver = Resolver::new(&db, &genome);
    if let Ok(variant) = resolver.resolve(&input.render()) {
        assert!(variant.position >= 1 && variant.end() <= 100);
        assert!(!variant.reference.is_empty());
    }
});
