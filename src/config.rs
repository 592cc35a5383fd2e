//! Configuration file support for ferro-resolve.
//!
//! Settings come from a `.ferro.toml` file. Every key is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! [reference]
//! fasta = "/data/hg19.fa"
//! mmap = true
//!
//! [annotation]
//! genes = "/data/refGene.txt"
//! ignore_version = true
//!
//! [resolve]
//! validate_reference = true
//! threads = 8
//! fail_fast = false
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro.toml` in current directory
//! 2. `~/.config/ferro/config.toml`
//!
//! CLI flags take precedence over config file settings.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::convert::resolver::ResolveOptions;
use crate::error::FerroError;

/// Parsed configuration from a .ferro.toml file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FerroConfig {
    /// Reference genome settings.
    pub reference: ReferenceConfig,
    /// Annotation table settings.
    pub annotation: AnnotationConfig,
    /// Resolution settings.
    pub resolve: ResolveConfig,
}

/// `[reference]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Path to the reference FASTA.
    pub fasta: Option<PathBuf>,
    /// Memory-map the FASTA instead of reading per fetch.
    pub mmap: bool,
}

/// `[annotation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    /// Path to the refGene table.
    pub genes: Option<PathBuf>,
    /// Fall back to version-less transcript lookup.
    pub ignore_version: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            genes: None,
            ignore_version: true,
        }
    }
}

/// `[resolve]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Compare declared reference bases against the genome.
    pub validate_reference: bool,
    /// Worker threads (0 = rayon default).
    pub threads: usize,
    /// Stop at the first failed notation.
    pub fail_fast: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            validate_reference: true,
            threads: 0,
            fail_fast: false,
        }
    }
}

impl FerroConfig {
    /// Load configuration from the default locations.
    ///
    /// A file that exists but fails to parse is reported and skipped.
    pub fn load() -> Option<Self> {
        let mut candidates = vec![PathBuf::from(".ferro.toml")];
        if let Some(home) = dirs_home() {
            candidates.push(home.join(".config").join("ferro").join("config.toml"));
        }

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_path(path) {
                Ok(config) => {
                    debug!("Loaded configuration from {}", path.display());
                    return Some(config);
                }
                Err(e) => warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, FerroError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| FerroError::Config {
            msg: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, FerroError> {
        toml::from_str(content).map_err(|e| FerroError::Config {
            msg: e.message().to_string(),
        })
    }

    /// Resolver options implied by this configuration.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::new().with_validate_reference(self.resolve.validate_reference)
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
