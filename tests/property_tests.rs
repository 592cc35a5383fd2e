//! Property-based tests for resolution
//!
//! Random transcript layouts and genomes check that:
//! - resolving a substitution and describing the result gives back the notation
//! - any parsed notation renders to text that parses to the same token
//! - resolution never panics on arbitrary input

use ferro_resolve::reference::transcript::reverse_complement;
use ferro_resolve::{
    parse_notation, CoordinateMapper, MockSequences, Resolver, Strand, Transcript, TranscriptDb,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

// =============================================================================
// Strategies
// =============================================================================

fn base() -> impl Strategy<Value = char> {
    prop_oneof![Just('A'), Just('C'), Just('G'), Just('T')]
}

fn strand() -> impl Strategy<Value = Strand> {
    prop_oneof![Just(Strand::Plus), Just(Strand::Minus)]
}

/// (exon length, gap before the next exon) pairs
fn layout() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((1u64..40, 1u64..30), 1..5)
}

/// Exon bounds starting at chr1:2 plus the genome length needed to hold them
fn exon_bounds(layout: &[(u64, u64)]) -> (Vec<(u64, u64)>, u64) {
    let mut start = 2;
    let mut bounds = Vec::with_capacity(layout.len());
    for (len, gap) in layout {
        bounds.push((start, start + len - 1));
        start += len + gap;
    }
    (bounds, start + 1)
}

struct Case {
    db: TranscriptDb,
    genome: MockSequences,
    sequence: String,
}

fn build_case(layout: &[(u64, u64)], strand: Strand, bases: &[char]) -> Case {
    let (bounds, length) = exon_bounds(layout);
    let sequence: String = (0..length as usize).map(|i| bases[i % bases.len()]).collect();
    let mut db = TranscriptDb::new();
    db.add(Transcript::new("NM_PROP.1", "chr1", strand, bounds).unwrap());
    let genome = MockSequences::new().with_sequence("chr1", &sequence);
    Case {
        db,
        genome,
        sequence,
    }
}

fn notation_strategy() -> impl Strategy<Value = String> {
    let pos = (prop_oneof![Just(""), Just("-"), Just("*")], 1u32..5000, prop::option::of(-20i32..20))
        .prop_map(|(marker, base, offset)| match offset {
            Some(o) if o > 0 => format!("{}{}+{}", marker, base, o),
            Some(o) if o < 0 => format!("{}{}{}", marker, base, o),
            _ => format!("{}{}", marker, base),
        });
    let bases = "[ACGT]{1,6}";
    prop_oneof![
        (pos.clone(), base(), base())
            .prop_filter("ref != alt", |(_, r, a)| r != a)
            .prop_map(|(p, r, a)| format!("c.{}{}>{}", p, r, a)),
        (pos.clone(), 0u32..10).prop_map(|(p, n)| format!("c.{}_{}del", p, 5000 + n)),
        (1u32..4000, bases).prop_map(|(p, s)| format!("c.{}_{}ins{}", p, p + 1, s)),
        pos.clone().prop_map(|p| format!("c.{}dup", p)),
        (1u32..4000, 1u32..10, bases).prop_map(|(p, n, s)| format!("c.{}_{}delins{}", p, p + n, s)),
    ]
    .prop_map(|body| format!("NM_000546.5:{}", body))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_substitution_round_trip(
        layout in layout(),
        strand in strand(),
        bases in prop::collection::vec(base(), 1..64),
        pick in any::<prop::sample::Index>(),
        alt_shift in 1usize..4,
    ) {
        let case = build_case(&layout, strand, &bases);
        let resolver = Resolver::new(&case.db, &case.genome);
        let transcript = case.db.get("NM_PROP.1").unwrap();
        let mapper = CoordinateMapper::new(transcript);

        let tx_pos = pick.index(transcript.len() as usize) as u64 + 1;
        let cds = mapper.tx_to_cds(tx_pos).unwrap();
        let genomic = transcript.tx_to_genomic(tx_pos).unwrap();

        let found = case.sequence.as_bytes()[(genomic - 1) as usize] as char;
        let idx = "ACGT".find(found).unwrap();
        let alt = "ACGT".as_bytes()[(idx + alt_shift) % 4] as char;
        let (tx_ref, tx_alt) = match strand {
            Strand::Plus => (found.to_string(), alt.to_string()),
            Strand::Minus => (reverse_complement(&found.to_string()), reverse_complement(&alt.to_string())),
        };
        let notation = format!("NM_PROP.1:c.{}{}>{}", cds, tx_ref, tx_alt);

        let variant = resolver.resolve(&notation).unwrap();
        prop_assert_eq!(variant.position, genomic);
        prop_assert_eq!(&variant.reference, &found.to_string());
        prop_assert_eq!(&variant.alternate, &alt.to_string());

        let token = resolver.describe(&variant, "NM_PROP.1").unwrap();
        prop_assert_eq!(token.to_string(), notation);
    }

    #[test]
    fn prop_intronic_positions_round_trip(
        layout in layout(),
        strand in strand(),
        pick in any::<prop::sample::Index>(),
    ) {
        let case = build_case(&layout, strand, &['A', 'C', 'G', 'T']);
        let transcript = case.db.get("NM_PROP.1").unwrap();
        let mapper = CoordinateMapper::new(transcript);

        let span = transcript.genomic_end() - transcript.genomic_start() + 1;
        let g = transcript.genomic_start() + pick.index(span as usize) as u64;
        let cds = mapper.genomic_to_cds(g).unwrap();
        prop_assert_eq!(mapper.cds_to_genomic(&cds).unwrap(), g);
        prop_assert_eq!(cds.is_intronic(), transcript.genomic_to_tx(g).is_none());
    }

    #[test]
    fn prop_rendering_reparses(notation in notation_strategy()) {
        if let Ok(token) = parse_notation(&notation) {
            let rendered = token.to_string();
            let reparsed = parse_notation(&rendered).unwrap();
            prop_assert_eq!(reparsed, token);
        }
    }

    #[test]
    fn prop_resolve_never_panics(input in "\\PC{0,40}") {
        let case = build_case(&[(30, 5), (30, 5)], Strand::Minus, &['G', 'A', 'T', 'C']);
        let resolver = Resolver::new(&case.db, &case.genome);
        let _ = resolver.resolve(&input);
        let _ = resolver.resolve(&format!("NM_PROP.1:{}", input));
    }
}
