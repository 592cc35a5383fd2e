//! Transcript annotation index
//!
//! Loads UCSC refGene / genePred tables into a [`TranscriptDb`] keyed by
//! transcript identifier. Both layouts are accepted and detected per row:
//!
//! ```text
//! bin name chrom strand txStart txEnd cdsStart cdsEnd exonCount exonStarts exonEnds score name2 ...
//!     name chrom strand txStart txEnd cdsStart cdsEnd exonCount exonStarts exonEnds [score name2 ...]
//! ```
//!
//! Table starts are 0-based and ends exclusive; they are converted to 1-based
//! inclusive coordinates on load.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};

use crate::error::FerroError;
use crate::hgvs::parser::accession::split_version;
use crate::reference::transcript::{Strand, Transcript};

/// Counters collected while loading an annotation table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows turned into transcripts
    pub loaded: usize,
    /// Malformed rows skipped
    pub skipped: usize,
    /// Rows dropped or superseded because the id was already present
    pub duplicates: usize,
}

/// What [`TranscriptDb::add`] did with a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was new
    Added,
    /// A primary placement superseded an alt-contig record with the same id
    Replaced,
    /// The id was already present and the new record was dropped
    Skipped,
}

/// A database of transcripts indexed for efficient lookup
#[derive(Debug, Default)]
pub struct TranscriptDb {
    /// Transcripts indexed by accession ID
    transcripts: HashMap<String, Transcript>,
    /// Index from gene symbol to transcript IDs
    gene_index: HashMap<String, Vec<String>>,
    /// Index from version-less accession to full IDs
    base_index: HashMap<String, Vec<String>>,
    /// Fall back to version-less matching on lookup
    ignore_version: bool,
    stats: LoadStats,
}

/// Whether a chromosome name belongs to the primary assembly
fn is_primary(chromosome: &str) -> bool {
    !chromosome.contains('_')
}

impl TranscriptDb {
    /// Create a new empty transcript database
    ///
    /// Lookups ignore version suffixes by default.
    pub fn new() -> Self {
        Self {
            ignore_version: true,
            ..Default::default()
        }
    }

    /// Set whether lookups fall back to version-less matching
    pub fn with_ignore_version(mut self, ignore_version: bool) -> Self {
        self.ignore_version = ignore_version;
        self
    }

    /// Add a transcript to the database
    ///
    /// When the id is already present, the first record on a primary
    /// chromosome wins.
    pub fn add(&mut self, transcript: Transcript) -> AddOutcome {
        let id = transcript.id.clone();

        if let Some(existing) = self.transcripts.get(&id) {
            if is_primary(&existing.chromosome) || !is_primary(&transcript.chromosome) {
                debug!(
                    "Skipping duplicate {} on {} (kept {})",
                    id, transcript.chromosome, existing.chromosome
                );
                return AddOutcome::Skipped;
            }
            debug!(
                "Replacing {} on {} with primary placement on {}",
                id, existing.chromosome, transcript.chromosome
            );
            self.transcripts.insert(id, transcript);
            return AddOutcome::Replaced;
        }

        if let Some(ref gene) = transcript.gene_symbol {
            self.gene_index
                .entry(gene.clone())
                .or_default()
                .push(id.clone());
        }
        let (base, _) = split_version(&id);
        self.base_index
            .entry(base.to_string())
            .or_default()
            .push(id.clone());

        self.transcripts.insert(id, transcript);
        AddOutcome::Added
    }

    /// Get a transcript by its accession ID
    ///
    /// Tries the exact id first. With version-less matching on, then tries
    /// the id without its `.N` suffix, and finally the single stored id
    /// sharing the same base accession.
    pub fn get(&self, id: &str) -> Option<&Transcript> {
        if let Some(tx) = self.transcripts.get(id) {
            return Some(tx);
        }
        if !self.ignore_version {
            return None;
        }

        let (base, _) = split_version(id);
        if let Some(tx) = self.transcripts.get(base) {
            debug!("Resolved {} to {} ignoring version", id, base);
            return Some(tx);
        }
        match self.base_index.get(base).map(Vec::as_slice) {
            Some([only]) => {
                debug!("Resolved {} to {} ignoring version", id, only);
                self.transcripts.get(only)
            }
            Some(many) if many.len() > 1 => {
                debug!("{} matches {} versions, refusing to guess", id, many.len());
                None
            }
            _ => None,
        }
    }

    /// Get a transcript or fail with [`FerroError::TranscriptNotFound`]
    pub fn lookup(&self, id: &str) -> Result<&Transcript, FerroError> {
        self.get(id).ok_or_else(|| FerroError::TranscriptNotFound {
            id: id.to_string(),
            notation: None,
        })
    }

    /// Get all transcripts for a gene
    pub fn get_by_gene(&self, gene: &str) -> Vec<&Transcript> {
        self.gene_index
            .get(gene)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.transcripts.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of transcripts
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Get all transcript IDs
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.transcripts.keys()
    }

    /// Iterate over all transcripts
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Transcript)> {
        self.transcripts.iter()
    }

    /// Counters from the last load
    pub fn load_stats(&self) -> LoadStats {
        self.stats
    }

    /// Load a refGene / genePred table from a file
    pub fn load_refgene<P: AsRef<Path>>(path: P, ignore_version: bool) -> Result<Self, FerroError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FerroError::Io {
            msg: format!("Failed to open annotation file {}: {}", path.display(), e),
        })?;
        let db = Self::read_refgene(BufReader::new(file), ignore_version)?;
        info!(
            "Loaded {} transcripts from {} ({} rows skipped, {} duplicates)",
            db.len(),
            path.display(),
            db.stats.skipped,
            db.stats.duplicates
        );
        Ok(db)
    }

    /// Load a refGene / genePred table from any buffered reader
    ///
    /// Malformed rows are logged and skipped; only I/O failures abort.
    pub fn read_refgene<R: BufRead>(reader: R, ignore_version: bool) -> Result<Self, FerroError> {
        let mut db = Self::new().with_ignore_version(ignore_version);

        for (idx, line) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line.map_err(|e| FerroError::Io {
                msg: format!("Failed to read annotation line {}: {}", line_number, e),
            })?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            match parse_refgene_line(&line, line_number) {
                Ok(transcript) => match db.add(transcript) {
                    AddOutcome::Added => db.stats.loaded += 1,
                    AddOutcome::Replaced | AddOutcome::Skipped => db.stats.duplicates += 1,
                },
                Err(e) => {
                    warn!("Skipping annotation row: {}", e);
                    db.stats.skipped += 1;
                }
            }
        }

        Ok(db)
    }
}

/// Parse a comma-separated coordinate list (`"100,200,"`)
fn parse_coord_list(field: &str, what: &str, line: usize) -> Result<Vec<u64>, FerroError> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim().parse().map_err(|_| FerroError::InvalidAnnotation {
                line,
                msg: format!("invalid {} value '{}'", what, s),
            })
        })
        .collect()
}

/// Parse one refGene / genePred row into a transcript
pub fn parse_refgene_line(line: &str, line_number: usize) -> Result<Transcript, FerroError> {
    let invalid = |msg: String| FerroError::InvalidAnnotation {
        line: line_number,
        msg,
    };
    let fields: Vec<&str> = line.split('\t').collect();

    // With a bin column the strand is the fourth field, without it the third
    let base = if fields.len() > 3 && Strand::from_symbol(fields[3]).is_some() {
        1
    } else if fields.len() > 2 && Strand::from_symbol(fields[2]).is_some() {
        0
    } else {
        return Err(invalid("no strand column found".to_string()));
    };
    if fields.len() < base + 10 {
        return Err(invalid(format!(
            "expected at least {} columns, found {}",
            base + 10,
            fields.len()
        )));
    }

    let name = fields[base];
    let chromosome = fields[base + 1];
    let strand = Strand::from_symbol(fields[base + 2])
        .ok_or_else(|| invalid(format!("invalid strand '{}'", fields[base + 2])))?;
    let parse_u64 = |idx: usize, what: &str| -> Result<u64, FerroError> {
        fields[idx]
            .parse()
            .map_err(|_| invalid(format!("invalid {} '{}'", what, fields[idx])))
    };
    let cds_start = parse_u64(base + 5, "cdsStart")?;
    let cds_end = parse_u64(base + 6, "cdsEnd")?;
    let exon_count = parse_u64(base + 7, "exonCount")? as usize;
    let starts = parse_coord_list(fields[base + 8], "exonStarts", line_number)?;
    let ends = parse_coord_list(fields[base + 9], "exonEnds", line_number)?;

    if name.is_empty() || chromosome.is_empty() {
        return Err(invalid("empty transcript name or chromosome".to_string()));
    }
    if starts.len() != exon_count || ends.len() != exon_count {
        return Err(invalid(format!(
            "{}: exonCount {} but {} starts and {} ends",
            name,
            exon_count,
            starts.len(),
            ends.len()
        )));
    }

    let bounds: Vec<(u64, u64)> = starts
        .into_iter()
        .zip(ends)
        .map(|(s, e)| (s + 1, e))
        .collect();

    let relabel = |e: FerroError| match e {
        FerroError::InvalidAnnotation { msg, .. } => invalid(msg),
        other => other,
    };
    let mut transcript = Transcript::new(name, chromosome, strand, bounds).map_err(relabel)?;

    if cds_end > cds_start {
        transcript = transcript
            .with_coding_region(cds_start + 1, cds_end)
            .map_err(relabel)?;
    }
    if let Some(gene) = fields.get(base + 11).filter(|g| !g.is_empty()) {
        transcript = transcript.with_gene(*gene);
    }

    Ok(transcript)
}
