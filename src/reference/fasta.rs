//! FASTA reference sequence access
//!
//! Reads bases from an uncompressed FASTA file through a `.fai`-style index:
//! for every record the sequence length, the byte offset of its first base,
//! and the number of bases and bytes per line. With that, any 1-based window
//! maps to one contiguous byte span that is read with a single seek.
//!
//! The index is loaded from `<path>.fai` (or `<stem>.fa.fai`) when present and
//! otherwise built with one scan over the file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::FerroError;
use crate::reference::provider::{check_window, name_candidates, SequenceSource};

/// Index entry for a sequence in a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaIndexEntry {
    /// Sequence name
    pub name: String,
    /// Length of the sequence
    pub length: u64,
    /// Byte offset to the start of sequence data
    pub offset: u64,
    /// Number of bases per line
    pub line_bases: u64,
    /// Number of bytes per line (including newline)
    pub line_bytes: u64,
}

impl FastaIndexEntry {
    /// File offset of the base at 0-based position `pos`
    pub fn byte_offset(&self, pos: u64) -> u64 {
        self.offset + (pos / self.line_bases) * self.line_bytes + pos % self.line_bases
    }

    /// Inclusive-exclusive byte span covering `length` bases from 1-based `start`
    ///
    /// The caller must have checked the window is non-empty and in bounds.
    fn byte_span(&self, start: u64, length: u64) -> (u64, u64) {
        let first = self.byte_offset(start - 1);
        let last = self.byte_offset(start - 1 + length - 1);
        (first, last + 1)
    }
}

/// Chromosome-indexed FASTA index
#[derive(Debug, Clone, Default)]
pub struct FastaIndex {
    entries: HashMap<String, FastaIndexEntry>,
    /// Names in file order
    names: Vec<String>,
}

impl FastaIndex {
    fn insert(&mut self, entry: FastaIndexEntry) -> Result<(), FerroError> {
        if self.entries.contains_key(&entry.name) {
            return Err(FerroError::InvalidFasta {
                msg: format!("duplicate sequence name '{}'", entry.name),
            });
        }
        self.names.push(entry.name.clone());
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Load or build the index for a FASTA file
    pub fn for_fasta<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let path = path.as_ref();
        match find_fai(path) {
            Some(fai) => {
                debug!("Loading FASTA index {}", fai.display());
                Self::load_fai(&fai)
            }
            None => {
                debug!("No .fai for {}, scanning file", path.display());
                Self::build(path)
            }
        }
    }

    /// Load a FASTA index (.fai) file
    pub fn load_fai<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let file = File::open(path.as_ref()).map_err(|e| FerroError::Io {
            msg: format!("Failed to open FAI file: {}", e),
        })?;
        let reader = BufReader::new(file);

        let mut index = Self::default();
        for line in reader.lines() {
            let line = line.map_err(|e| FerroError::Io {
                msg: format!("Failed to read FAI line: {}", e),
            })?;

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                continue;
            }

            let name = fields[0].to_string();
            let parse_field = |value: &str, what: &str| {
                value.parse::<u64>().map_err(|_| FerroError::InvalidFasta {
                    msg: format!("invalid {} '{}' in FAI for sequence '{}'", what, value, name),
                })
            };
            let length = parse_field(fields[1], "length")?;
            let offset = parse_field(fields[2], "offset")?;
            let line_bases = parse_field(fields[3], "line_bases")?;
            let line_bytes = parse_field(fields[4], "line_bytes")?;

            // Zero widths would make every offset computation divide by zero
            if line_bases == 0 || line_bytes < line_bases {
                return Err(FerroError::InvalidFasta {
                    msg: format!(
                        "invalid FAI entry for '{}': line_bases={}, line_bytes={}",
                        name, line_bases, line_bytes
                    ),
                });
            }

            index.insert(FastaIndexEntry {
                name,
                length,
                offset,
                line_bases,
                line_bytes,
            })?;
        }

        Ok(index)
    }

    /// Build a FASTA index by scanning the file
    ///
    /// Every line of a record except the last must hold the same number of
    /// bases and bytes; anything else cannot be addressed by offset and is
    /// rejected with [`FerroError::InvalidFasta`].
    pub fn build<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let file = File::open(path.as_ref()).map_err(|e| FerroError::Io {
            msg: format!("Failed to open FASTA file: {}", e),
        })?;
        let reader = BufReader::new(file);
        Self::scan(reader)
    }

    /// Build an index from FASTA bytes read from `reader`
    pub fn scan<R: BufRead>(mut reader: R) -> Result<Self, FerroError> {
        let mut index = Self::default();
        let mut current: Option<RecordScan> = None;
        let mut byte_position = 0u64;
        let mut line_number = 0usize;
        let mut line = Vec::new();

        loop {
            line.clear();
            let bytes_read = reader.read_until(b'\n', &mut line).map_err(|e| FerroError::Io {
                msg: format!("Failed to read FASTA line: {}", e),
            })?;
            if bytes_read == 0 {
                break;
            }
            let line_start = byte_position;
            byte_position += bytes_read as u64;
            line_number += 1;

            if line.first() == Some(&b'>') {
                if let Some(record) = current.take() {
                    index.insert(record.finish())?;
                }
                let header = String::from_utf8_lossy(&line[1..]);
                let name = header.split_whitespace().next().unwrap_or("").to_string();
                if name.is_empty() {
                    return Err(FerroError::InvalidFasta {
                        msg: format!("empty sequence name at line {}", line_number),
                    });
                }
                current = Some(RecordScan::new(name, byte_position));
                continue;
            }

            let bases = line
                .iter()
                .take_while(|&&b| b != b'\n' && b != b'\r')
                .count() as u64;
            match current.as_mut() {
                Some(record) => record.add_line(bases, bytes_read as u64, line_start, line_number)?,
                None if bases == 0 => {}
                None => {
                    return Err(FerroError::InvalidFasta {
                        msg: format!("sequence data before first header at line {}", line_number),
                    })
                }
            }
        }

        if let Some(record) = current.take() {
            index.insert(record.finish())?;
        }
        Ok(index)
    }

    /// Look up an entry, tolerating `chr` prefix and `M`/`MT` differences
    pub fn resolve(&self, name: &str) -> Option<&FastaIndexEntry> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry);
        }
        name_candidates(name)
            .iter()
            .find_map(|candidate| self.entries.get(candidate))
    }

    /// Look up an entry or fail with [`FerroError::ReferenceNotFound`]
    pub fn entry(&self, name: &str) -> Result<&FastaIndexEntry, FerroError> {
        self.resolve(name)
            .ok_or_else(|| FerroError::ReferenceNotFound {
                chromosome: name.to_string(),
                notation: None,
            })
    }

    /// Sequence names in file order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of indexed sequences
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render in `.fai` format
    pub fn to_fai(&self) -> String {
        self.names
            .iter()
            .filter_map(|n| self.entries.get(n))
            .map(|e| {
                format!(
                    "{}\t{}\t{}\t{}\t{}\n",
                    e.name, e.length, e.offset, e.line_bases, e.line_bytes
                )
            })
            .collect()
    }
}

/// Line-width bookkeeping while scanning one record
struct RecordScan {
    entry: FastaIndexEntry,
    /// A line shorter than the record width has been seen
    saw_short_line: bool,
}

impl RecordScan {
    fn new(name: String, offset: u64) -> Self {
        Self {
            entry: FastaIndexEntry {
                name,
                length: 0,
                offset,
                line_bases: 0,
                line_bytes: 0,
            },
            saw_short_line: false,
        }
    }

    fn add_line(
        &mut self,
        bases: u64,
        bytes: u64,
        line_start: u64,
        line_number: usize,
    ) -> Result<(), FerroError> {
        let irregular = || FerroError::InvalidFasta {
            msg: format!(
                "irregular line width in '{}' at line {}",
                self.entry.name, line_number
            ),
        };

        if bases == 0 {
            self.saw_short_line = true;
            return Ok(());
        }
        if self.saw_short_line {
            return Err(irregular());
        }

        if self.entry.line_bases == 0 {
            self.entry.offset = line_start;
            self.entry.line_bases = bases;
            self.entry.line_bytes = bytes;
        } else if bases > self.entry.line_bases {
            return Err(irregular());
        } else if bases < self.entry.line_bases {
            self.saw_short_line = true;
        } else if bytes != self.entry.line_bytes {
            // Same bases but different terminator: only the final unterminated line may differ
            if bytes > bases {
                return Err(irregular());
            }
            self.saw_short_line = true;
        }
        self.entry.length += bases;
        Ok(())
    }

    fn finish(mut self) -> FastaIndexEntry {
        // An empty record still needs non-zero widths for offset arithmetic
        if self.entry.line_bases == 0 {
            self.entry.line_bases = 1;
            self.entry.line_bytes = 1;
        }
        self.entry
    }
}

/// Find an adjacent `.fai` file
fn find_fai(path: &Path) -> Option<PathBuf> {
    let appended = PathBuf::from(format!("{}.fai", path.display()));
    if appended.exists() {
        return Some(appended);
    }
    let replaced = path.with_extension("fa.fai");
    if replaced.exists() {
        return Some(replaced);
    }
    None
}

/// Check if a file is gzip-compressed by reading its magic bytes
///
/// Gzip files start with the magic bytes 0x1f 0x8b
fn is_gzip_file<P: AsRef<Path>>(path: P) -> Result<bool, FerroError> {
    let mut file = File::open(path.as_ref()).map_err(|e| FerroError::Io {
        msg: format!("Failed to open file: {}", e),
    })?;

    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(FerroError::Io {
            msg: format!("Failed to read file: {}", e),
        }),
    }
}

fn reject_gzip(path: &Path) -> Result<(), FerroError> {
    if is_gzip_file(path)? {
        return Err(FerroError::InvalidFasta {
            msg: format!(
                "{} appears to be gzip-compressed; decompress it first (e.g. 'gunzip {}')",
                path.display(),
                path.display()
            ),
        });
    }
    Ok(())
}

/// Strip line terminators and upper-case, checking the window holds exactly `length` bases
///
/// A header or any other non-sequence byte means the index is stale.
fn collect_bases(name: &str, bytes: &[u8], length: u64) -> Result<String, FerroError> {
    let mismatch = || FerroError::InvalidFasta {
        msg: format!("index for '{}' does not match file contents", name),
    };
    let mut bases = String::with_capacity(length as usize);
    for &b in bytes.iter().filter(|&&b| b != b'\n' && b != b'\r') {
        if !(b.is_ascii_alphabetic() || b == b'*' || b == b'-') {
            return Err(mismatch());
        }
        bases.push(b.to_ascii_uppercase() as char);
    }
    if bases.len() as u64 != length {
        return Err(mismatch());
    }
    Ok(bases)
}

/// Seek-based FASTA reader
///
/// Each fetch opens the file, seeks to the window and reads exactly the bytes
/// it spans. No handle is shared between calls, so the reader is `Sync`.
#[derive(Debug, Clone)]
pub struct IndexedFasta {
    path: PathBuf,
    index: FastaIndex,
}

impl IndexedFasta {
    /// Open a FASTA file, loading or building its index
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The file is gzip-compressed (not supported)
    /// - The index is malformed or the file has irregular line widths
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let path = path.as_ref().to_path_buf();
        reject_gzip(&path)?;
        let index = FastaIndex::for_fasta(&path)?;
        info!(
            "Indexed {} sequences in {}",
            index.len(),
            path.display()
        );
        Ok(Self { path, index })
    }

    /// The sequence index
    pub fn index(&self) -> &FastaIndex {
        &self.index
    }

    /// Path of the FASTA file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SequenceSource for IndexedFasta {
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError> {
        Ok(self.index.entry(chromosome)?.length)
    }

    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError> {
        let entry = self.index.entry(chromosome)?;
        check_window(chromosome, start, length, entry.length)?;
        if length == 0 {
            return Ok(String::new());
        }

        let (first, end) = entry.byte_span(start, length);
        let mut file = File::open(&self.path).map_err(|e| FerroError::Io {
            msg: format!("Failed to open FASTA file: {}", e),
        })?;
        file.seek(SeekFrom::Start(first)).map_err(|e| FerroError::Io {
            msg: format!("Failed to seek in FASTA file: {}", e),
        })?;

        let mut buffer = vec![0u8; (end - first) as usize];
        file.read_exact(&mut buffer).map_err(|e| FerroError::Io {
            msg: format!("Failed to read from FASTA file: {}", e),
        })?;

        collect_bases(&entry.name, &buffer, length)
    }
}

/// Memory-mapped FASTA reader
pub struct MmapFasta {
    /// Memory-mapped file
    mmap: memmap2::Mmap,
    index: FastaIndex,
}

impl MmapFasta {
    /// Map a FASTA file into memory, loading or building its index
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FerroError> {
        let path = path.as_ref();
        reject_gzip(path)?;
        let file = File::open(path).map_err(|e| FerroError::Io {
            msg: format!("Failed to open FASTA file: {}", e),
        })?;

        // SAFETY: the file is opened read-only and never written by this process
        let mmap = unsafe {
            memmap2::Mmap::map(&file).map_err(|e| FerroError::Io {
                msg: format!("Failed to memory-map FASTA file: {}", e),
            })?
        };

        let index = match find_fai(path) {
            Some(fai) => FastaIndex::load_fai(&fai)?,
            None => FastaIndex::scan(&mmap[..])?,
        };
        info!(
            "Memory-mapped {} sequences from {}",
            index.len(),
            path.display()
        );
        Ok(Self { mmap, index })
    }

    /// The sequence index
    pub fn index(&self) -> &FastaIndex {
        &self.index
    }
}

impl SequenceSource for MmapFasta {
    fn sequence_length(&self, chromosome: &str) -> Result<u64, FerroError> {
        Ok(self.index.entry(chromosome)?.length)
    }

    fn fetch(&self, chromosome: &str, start: u64, length: u64) -> Result<String, FerroError> {
        let entry = self.index.entry(chromosome)?;
        check_window(chromosome, start, length, entry.length)?;
        if length == 0 {
            return Ok(String::new());
        }

        let (first, end) = entry.byte_span(start, length);
        let bytes = self
            .mmap
            .get(first as usize..end as usize)
            .ok_or_else(|| FerroError::InvalidFasta {
                msg: format!("index for '{}' points past end of file", entry.name),
            })?;
        collect_bases(&entry.name, bytes, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fasta(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    const FASTA: &str = ">chr1 test\nACGTACGTAC\nGTACGTACGT\nACG\n>chr2\nttttgggg\ncc\n";

    #[test]
    fn test_scan_index() {
        let index = FastaIndex::scan(FASTA.as_bytes()).unwrap();
        assert_eq!(index.names(), &["chr1".to_string(), "chr2".to_string()]);
        let e = index.resolve("chr1").unwrap();
        assert_eq!((e.length, e.offset, e.line_bases, e.line_bytes), (23, 11, 10, 11));
        let e = index.resolve("chr2").unwrap();
        assert_eq!((e.length, e.offset, e.line_bases, e.line_bytes), (10, 43, 8, 9));
    }

    #[test]
    fn test_fai_round_trip() {
        let index = FastaIndex::scan(FASTA.as_bytes()).unwrap();
        let fai = write_fasta(&index.to_fai());
        let loaded = FastaIndex::load_fai(fai.path()).unwrap();
        assert_eq!(loaded.resolve("chr2"), index.resolve("chr2"));
    }

    #[test]
    fn test_irregular_lines_rejected() {
        let err = FastaIndex::scan(">c\nACGT\nAC\nACGT\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FerroError::InvalidFasta { .. }));
        let err = FastaIndex::scan(">c\nACGT\nACGTA\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FerroError::InvalidFasta { .. }));
        let err = FastaIndex::scan(">c\nACGT\n\nACGT\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FerroError::InvalidFasta { .. }));
    }

    #[test]
    fn test_crlf_and_trailing_blank_lines() {
        let index = FastaIndex::scan(">c\r\nACGT\r\nAC\r\n\r\n".as_bytes()).unwrap();
        let e = index.resolve("c").unwrap();
        assert_eq!((e.length, e.line_bases, e.line_bytes), (6, 4, 6));
    }

    #[test]
    fn test_data_before_header_rejected() {
        assert!(FastaIndex::scan("ACGT\n>c\nAC\n".as_bytes()).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(FastaIndex::scan(">c\nAC\n>c\nGT\n".as_bytes()).is_err());
    }

    #[test]
    fn test_bad_fai_rejected() {
        let fai = write_fasta("chr1\t100\t6\t0\t0\n");
        assert!(matches!(
            FastaIndex::load_fai(fai.path()),
            Err(FerroError::InvalidFasta { .. })
        ));
        let fai = write_fasta("chr1\tabc\t6\t60\t61\n");
        assert!(FastaIndex::load_fai(fai.path()).is_err());
    }

    #[test]
    fn test_indexed_fetch_across_lines() {
        let file = write_fasta(FASTA);
        let fasta = IndexedFasta::open(file.path()).unwrap();
        assert_eq!(fasta.fetch("chr1", 1, 4).unwrap(), "ACGT");
        assert_eq!(fasta.fetch("chr1", 9, 4).unwrap(), "ACGT");
        assert_eq!(fasta.fetch("chr1", 21, 3).unwrap(), "ACG");
        assert_eq!(fasta.fetch("chr1", 23, 1).unwrap(), "G");
        assert_eq!(fasta.fetch("chr2", 7, 4).unwrap(), "GGCC");
        assert_eq!(fasta.fetch("chr1", 5, 0).unwrap(), "");
    }

    #[test]
    fn test_fetch_errors() {
        let file = write_fasta(FASTA);
        let fasta = IndexedFasta::open(file.path()).unwrap();
        assert!(matches!(
            fasta.fetch("chr9", 1, 1),
            Err(FerroError::ReferenceNotFound { .. })
        ));
        assert!(matches!(
            fasta.fetch("chr1", 22, 5),
            Err(FerroError::ReferenceOutOfBounds { .. })
        ));
        assert!(matches!(
            fasta.fetch("chr1", 0, 1),
            Err(FerroError::ReferenceOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_name_aliases() {
        let file = write_fasta(">1\nACGT\n>MT\nGGCC\n");
        let fasta = IndexedFasta::open(file.path()).unwrap();
        assert_eq!(fasta.fetch("chr1", 2, 2).unwrap(), "CG");
        assert_eq!(fasta.fetch("chrM", 1, 1).unwrap(), "G");
        assert!(fasta.has_sequence("chrMT"));
        assert!(!fasta.has_sequence("chr2"));
    }

    #[test]
    fn test_uses_adjacent_fai() {
        let dir = tempfile::tempdir().unwrap();
        let fa = dir.path().join("ref.fa");
        std::fs::write(&fa, ">c\nAAAA\nCCCC\n").unwrap();
        // Deliberately wrong length so the index is visibly the one used
        std::fs::write(dir.path().join("ref.fa.fai"), "c\t6\t3\t4\t5\n").unwrap();
        let fasta = IndexedFasta::open(&fa).unwrap();
        assert_eq!(fasta.sequence_length("c").unwrap(), 6);
        assert_eq!(fasta.fetch("c", 4, 3).unwrap(), "ACC");
    }

    #[test]
    fn test_stale_fai_rejected_by_both_readers() {
        let dir = tempfile::tempdir().unwrap();
        let fa = dir.path().join("ref.fa");
        std::fs::write(&fa, ">c\nAAAA\nCCCC\n>d\nGGGG\n").unwrap();
        std::fs::write(
            dir.path().join("ref.fa.fai"),
            "c\t12\t3\t4\t5\nd\t4\t16\t4\t5\n",
        )
        .unwrap();

        let indexed = IndexedFasta::open(&fa).unwrap();
        let mapped = MmapFasta::open(&fa).unwrap();
        for source in [&indexed as &dyn SequenceSource, &mapped] {
            assert_eq!(source.fetch("c", 5, 4).unwrap(), "CCCC");
            assert!(matches!(
                source.fetch("c", 9, 4),
                Err(FerroError::InvalidFasta { .. })
            ));
        }
    }

    #[test]
    fn test_gzip_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x1f, 0x8b, 0x08, 0x00]).unwrap();
        file.flush().unwrap();
        let err = IndexedFasta::open(file.path()).unwrap_err();
        assert!(err.to_string().contains("gzip"));
    }

    #[test]
    fn test_mmap_matches_indexed() {
        let file = write_fasta(FASTA);
        let indexed = IndexedFasta::open(file.path()).unwrap();
        let mapped = MmapFasta::open(file.path()).unwrap();
        for start in 1..=20 {
            assert_eq!(
                indexed.fetch("chr1", start, 4).unwrap(),
                mapped.fetch("chr1", start, 4).unwrap()
            );
        }
        assert!(mapped.fetch("chr2", 10, 2).is_err());
    }
}
