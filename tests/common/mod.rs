//! Shared fixtures: a small genome and refGene table written to a temp directory
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use ferro_resolve::reference::transcript::complement;
use ferro_resolve::TranscriptDb;
use tempfile::TempDir;

pub const LINE_WIDTH: usize = 60;

/// Deterministic ACGT sequence
pub fn pseudo_random_sequence(len: usize, seed: u64) -> String {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize] as char
        })
        .collect()
}

/// refGene rows (with bin column). Coordinates are 0-based half-open.
///
/// - NM_PLUS.1 / NM_MINUS.1: one exon at chr1:1000-2000, fully coding
/// - NM_SPLIT.2 / NM_SPLITM.1: exons chr1:101-200, 301-400, 501-600, coding 151-550
/// - NM_PLUS.1 also placed on an alt contig first; the chr1 record must win
/// - NM_OUT.1: runs past the end of chr2
pub const REFGENE: &str = "\
#bin\tname\tchrom\tstrand\ttxStart\ttxEnd\tcdsStart\tcdsEnd\texonCount\texonStarts\texonEnds\tscore\tname2\tcdsStartStat\tcdsEndStat\texonFrames
0\tNM_PLUS.1\tchr1_gl000191_random\t+\t0\t50\t0\t50\t1\t0,\t50,\t0\tPLUSG\tcmpl\tcmpl\t0,
585\tNM_PLUS.1\tchr1\t+\t999\t2000\t999\t2000\t1\t999,\t2000,\t0\tPLUSG\tcmpl\tcmpl\t0,
585\tNM_MINUS.1\tchr1\t-\t999\t2000\t999\t2000\t1\t999,\t2000,\t0\tMINUSG\tcmpl\tcmpl\t0,
585\tNM_SPLIT.2\tchr1\t+\t100\t600\t150\t550\t3\t100,300,500,\t200,400,600,\t0\tSPLIT\tcmpl\tcmpl\t0,2,1,
585\tNM_SPLITM.1\tchr1\t-\t100\t600\t150\t550\t3\t100,300,500,\t200,400,600,\t0\tSPLIT\tcmpl\tcmpl\t0,2,1,
585\tNM_BROKEN.1\tchr1\t+\t100\t600\t150\t550\t3\t100,300,\t200,400,600,\t0\tBROKEN\tcmpl\tcmpl\t0,
NM_OUT.1\tchr2\t+\t0\t500\t0\t500\t1\t0,\t500,\t0\tOUT\tcmpl\tcmpl\t0,
";

pub struct Fixture {
    pub dir: TempDir,
    pub chr1: String,
    pub chr2: String,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let chr1 = pseudo_random_sequence(2500, 17);
        let chr2 = pseudo_random_sequence(100, 29);

        let mut fasta = String::new();
        for (name, seq) in [("chr1", &chr1), ("chr2", &chr2)] {
            fasta.push_str(&format!(">{} test sequence\n", name));
            for line in seq.as_bytes().chunks(LINE_WIDTH) {
                fasta.push_str(std::str::from_utf8(line).unwrap());
                fasta.push('\n');
            }
        }
        fs::write(dir.path().join("genome.fa"), fasta).unwrap();
        fs::write(dir.path().join("refGene.txt"), REFGENE).unwrap();

        Self { dir, chr1, chr2 }
    }

    pub fn fasta_path(&self) -> PathBuf {
        self.dir.path().join("genome.fa")
    }

    pub fn genes_path(&self) -> PathBuf {
        self.dir.path().join("refGene.txt")
    }

    pub fn db(&self) -> TranscriptDb {
        TranscriptDb::load_refgene(self.genes_path(), true).unwrap()
    }

    /// chr1 base at a 1-based position
    pub fn base(&self, pos: u64) -> char {
        self.chr1.as_bytes()[(pos - 1) as usize] as char
    }

    /// chr1 bases over a 1-based inclusive range
    pub fn slice(&self, start: u64, end: u64) -> &str {
        &self.chr1[(start - 1) as usize..end as usize]
    }

    /// A base different from the chr1 base at `pos`
    pub fn other_base(&self, pos: u64) -> char {
        if self.base(pos) == 'A' {
            'C'
        } else {
            'A'
        }
    }

    /// chr1 base at `pos` as read on the minus strand
    pub fn minus_base(&self, pos: u64) -> char {
        complement(self.base(pos))
    }
}
