//! Coordinate resolver
//!
//! Turns a c. notation into a [`GenomicVariant`]:
//!
//! 1. parse the notation
//! 2. look up the transcript
//! 3. map both ends of the token to genomic positions (intronic offsets included)
//! 4. fetch the affected reference bases and check any declared reference
//! 5. orient alleles to the forward strand
//! 6. build the VCF-style allele pair for the variant kind
//!
//! Every failure is returned for that one variant; nothing is retried or
//! corrected.

use log::debug;

use crate::convert::genomic::GenomicVariant;
use crate::convert::mapper::CoordinateMapper;
use crate::error::FerroError;
use crate::hgvs::parser::parse_notation;
use crate::hgvs::variant::{VariantKind, VariantToken};
use crate::reference::loader::TranscriptDb;
use crate::reference::provider::{name_candidates, SequenceSource};
use crate::reference::transcript::{reverse_complement, Strand, Transcript};

/// Runtime options for resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Compare declared reference bases against the genome
    pub validate_reference: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            validate_reference: true,
        }
    }
}

impl ResolveOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether declared reference bases are checked
    pub fn with_validate_reference(mut self, validate: bool) -> Self {
        self.validate_reference = validate;
        self
    }
}

/// Declared bases match the genome; `N` in the declared text matches any base
fn bases_match(declared: &str, found: &str) -> bool {
    declared.len() == found.len()
        && declared
            .bytes()
            .zip(found.bytes())
            .all(|(d, f)| d == b'N' || d == f)
}

/// Resolves c. notations against an annotation index and a reference genome
///
/// Both collaborators are borrowed and read-only, so one resolver can serve
/// any number of threads when the sequence source is `Sync`.
///
/// # Example
///
/// ```
/// use ferro_resolve::{MockSequences, Resolver, Strand, Transcript, TranscriptDb};
///
/// let mut db = TranscriptDb::new();
/// db.add(Transcript::new("NM_TEST", "chr1", Strand::Plus, vec![(3, 8)]).unwrap());
/// let genome = MockSequences::new().with_sequence("chr1", "AAAGCTACAA");
///
/// let resolver = Resolver::new(&db, &genome);
/// let variant = resolver.resolve("NM_TEST:c.2G>T").unwrap();
/// assert_eq!(variant.position, 4);
/// assert_eq!(variant.reference, "G");
/// assert_eq!(variant.alternate, "T");
/// ```
pub struct Resolver<'a, S: SequenceSource + ?Sized> {
    transcripts: &'a TranscriptDb,
    reference: &'a S,
    options: ResolveOptions,
}

impl<'a, S: SequenceSource + ?Sized> Resolver<'a, S> {
    /// Create a resolver with default options
    pub fn new(transcripts: &'a TranscriptDb, reference: &'a S) -> Self {
        Self {
            transcripts,
            reference,
            options: ResolveOptions::default(),
        }
    }

    /// Replace the resolver options
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// The annotation index
    pub fn transcripts(&self) -> &'a TranscriptDb {
        self.transcripts
    }

    /// Look up a transcript by identifier
    pub fn lookup_transcript(&self, id: &str) -> Result<&'a Transcript, FerroError> {
        self.transcripts.lookup(id)
    }

    /// Resolve a notation string to a genomic variant
    pub fn resolve(&self, notation: &str) -> Result<GenomicVariant, FerroError> {
        let token = parse_notation(notation)?;
        self.resolve_token(&token)
    }

    /// Resolve an already-parsed token to a genomic variant
    pub fn resolve_token(&self, token: &VariantToken) -> Result<GenomicVariant, FerroError> {
        let notation = token.to_string();
        let transcript = self
            .lookup_transcript(&token.transcript_id)
            .map_err(|e| e.with_notation(&notation))?;
        let resolution = Resolution {
            token,
            transcript,
            notation,
            reference: self.reference,
            options: self.options,
        };
        let variant = resolution
            .run()
            .map_err(|e| e.with_notation(&resolution.notation))?;
        debug!(
            "{} -> {} ({} strand)",
            resolution.notation, variant, transcript.strand
        );
        Ok(variant)
    }

    /// Describe a single-base genomic substitution relative to a transcript
    ///
    /// This is the inverse of [`resolve`](Self::resolve) for substitutions.
    pub fn describe(
        &self,
        variant: &GenomicVariant,
        transcript_id: &str,
    ) -> Result<VariantToken, FerroError> {
        let transcript = self.lookup_transcript(transcript_id)?;
        let invalid = |msg: String| FerroError::InvalidRange {
            notation: variant.to_string(),
            msg,
        };

        if !name_candidates(&transcript.chromosome).contains(&variant.chromosome) {
            return Err(invalid(format!(
                "variant is on {} but {} is on {}",
                variant.chromosome, transcript.id, transcript.chromosome
            )));
        }
        if !variant.is_snv() {
            return Err(invalid(
                "only single-base substitutions can be described".to_string(),
            ));
        }

        let position = CoordinateMapper::new(transcript).genomic_to_cds(variant.position)?;
        let orient = |s: &str| match transcript.strand {
            Strand::Plus => s.to_string(),
            Strand::Minus => reverse_complement(s),
        };
        VariantToken::new(
            transcript_id,
            position,
            None,
            VariantKind::Substitution,
            orient(&variant.reference),
            orient(&variant.alternate),
        )
    }
}

/// State for resolving one token
struct Resolution<'r, S: SequenceSource + ?Sized> {
    token: &'r VariantToken,
    transcript: &'r Transcript,
    notation: String,
    reference: &'r S,
    options: ResolveOptions,
}

impl<S: SequenceSource + ?Sized> Resolution<'_, S> {
    fn chromosome(&self) -> &str {
        &self.transcript.chromosome
    }

    /// Transcript-strand bases as forward-strand bases
    fn orient(&self, bases: &str) -> String {
        match self.transcript.strand {
            Strand::Plus => bases.to_string(),
            Strand::Minus => reverse_complement(bases),
        }
    }

    fn fetch(&self, start: u64, length: u64) -> Result<String, FerroError> {
        self.reference.fetch(self.chromosome(), start, length)
    }

    fn base(&self, position: u64) -> Result<String, FerroError> {
        self.fetch(position, 1)
    }

    fn invalid_range(&self, msg: impl Into<String>) -> FerroError {
        FerroError::InvalidRange {
            notation: self.notation.clone(),
            msg: msg.into(),
        }
    }

    fn spans_intron(&self) -> FerroError {
        FerroError::SpansIntron {
            notation: self.notation.clone(),
            transcript: self.transcript.id.clone(),
        }
    }

    /// Compare the token's declared reference (if any) with genomic bases at `position`
    fn check_reference(&self, position: u64, found: &str) -> Result<(), FerroError> {
        if !self.options.validate_reference || self.token.reference.is_empty() {
            return Ok(());
        }
        let expected = self.orient(&self.token.reference);
        if bases_match(&expected, found) {
            return Ok(());
        }
        Err(FerroError::ReferenceMismatch {
            notation: self.notation.clone(),
            chromosome: self.transcript.chromosome.clone(),
            position,
            expected,
            found: found.to_string(),
        })
    }

    /// Genomic positions of the token's first and last positions
    fn genomic_ends(&self) -> Result<(u64, u64), FerroError> {
        let mapper = CoordinateMapper::new(self.transcript);
        let first = mapper.cds_to_genomic(&self.token.start)?;
        let last = match &self.token.end {
            Some(end) => mapper.cds_to_genomic(end)?,
            None => first,
        };
        Ok((first, last))
    }

    fn run(&self) -> Result<GenomicVariant, FerroError> {
        let (first, last) = self.genomic_ends()?;
        let (lo, hi) = (first.min(last), first.max(last));

        match self.token.kind {
            VariantKind::Substitution => self.substitution(lo),
            VariantKind::Insertion => self.insertion(first, last, lo, hi),
            VariantKind::Deletion | VariantKind::Duplication | VariantKind::Delins => {
                if self.transcript.crosses_intron(lo, hi) {
                    return Err(self.spans_intron());
                }
                let window = self.fetch(lo, hi - lo + 1)?;
                self.check_reference(lo, &window)?;
                match self.token.kind {
                    VariantKind::Deletion => self.deletion(lo, hi, window),
                    VariantKind::Duplication => self.duplication(lo, hi, window),
                    _ => Ok(GenomicVariant::new(
                        self.chromosome(),
                        lo,
                        window,
                        self.orient(&self.token.alternate),
                    )),
                }
            }
        }
    }

    fn substitution(&self, position: u64) -> Result<GenomicVariant, FerroError> {
        let found = self.base(position)?;
        self.check_reference(position, &found)?;
        Ok(GenomicVariant::new(
            self.chromosome(),
            position,
            found,
            self.orient(&self.token.alternate),
        ))
    }

    fn deletion(&self, lo: u64, hi: u64, window: String) -> Result<GenomicVariant, FerroError> {
        let span = hi - lo + 1;
        if let Some(n) = self.token.deleted_length {
            if n != span {
                return Err(self.invalid_range(format!(
                    "declared deletion length {} but range covers {} bases",
                    n, span
                )));
            }
        }

        if lo > 1 {
            let anchor = self.base(lo - 1)?;
            Ok(GenomicVariant::new(
                self.chromosome(),
                lo - 1,
                format!("{}{}", anchor, window),
                anchor,
            ))
        } else {
            // Nothing to the left of the first base; anchor on the next one
            let anchor = self.base(hi + 1)?;
            Ok(GenomicVariant::new(
                self.chromosome(),
                lo,
                format!("{}{}", window, anchor),
                anchor,
            ))
        }
    }

    fn duplication(&self, lo: u64, hi: u64, window: String) -> Result<GenomicVariant, FerroError> {
        if lo > 1 {
            let anchor = self.base(lo - 1)?;
            Ok(GenomicVariant::new(
                self.chromosome(),
                lo - 1,
                anchor.clone(),
                format!("{}{}", anchor, window),
            ))
        } else {
            let anchor = self.base(hi)?;
            Ok(GenomicVariant::new(
                self.chromosome(),
                hi,
                anchor.clone(),
                format!("{}{}", anchor, window),
            ))
        }
    }

    fn insertion(&self, first: u64, last: u64, lo: u64, hi: u64) -> Result<GenomicVariant, FerroError> {
        if hi - lo != 1 {
            let tx_first = self.transcript.genomic_to_tx(first);
            let tx_last = self.transcript.genomic_to_tx(last);
            return Err(match (tx_first, tx_last) {
                (Some(a), Some(b)) if a.abs_diff(b) == 1 => self.spans_intron(),
                _ => self.invalid_range("insertion flanks are not adjacent on the genome"),
            });
        }

        let anchor = self.base(lo)?;
        let inserted = self.orient(&self.token.alternate);
        Ok(GenomicVariant::new(
            self.chromosome(),
            lo,
            anchor.clone(),
            format!("{}{}", anchor, inserted),
        ))
    }
}
