// Club Log cty.xml dataset module
//
// Locates, loads, and parses the cty.xml reference document into the typed
// record collections the lookup database is built from. Also provides the
// Club Log API download for keeping a local copy current.
//
// Search order for the dataset: an explicit path if given, then the shared
// system location, then a cty.xml beside the executable.

mod download;
mod parser;

pub use download::download_cty_xml;
pub use parser::parse_cty_xml;

use crate::db::{
    EntityRecord, ExceptionRecord, InvalidRecord, PrefixRecord, ZoneExceptionRecord,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shared system location for cty.xml.
pub const SYSTEM_CTY_PATH: &str = "/usr/local/share/dxcc/cty.xml";

#[derive(Error, Debug)]
pub enum CtyError {
    #[error("cty.xml not found (searched {0})")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse cty.xml: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decompress cty.xml: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("download failed: {0}")]
    Download(String),
}

/// The five record collections of a parsed cty.xml, in document order.
#[derive(Debug)]
pub struct CtyDataset {
    /// The dataset's release date attribute, verbatim.
    pub date: String,
    pub entities: Vec<EntityRecord>,
    pub exceptions: Vec<ExceptionRecord>,
    pub prefixes: Vec<PrefixRecord>,
    pub invalid_operations: Vec<InvalidRecord>,
    pub zone_exceptions: Vec<ZoneExceptionRecord>,
}

/// Find cty.xml: explicit path, system location, executable directory.
pub fn locate_cty_file(explicit: Option<&Path>) -> Result<PathBuf, CtyError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(CtyError::NotFound(path.display().to_string()));
    }

    let system = Path::new(SYSTEM_CTY_PATH);
    if system.exists() {
        return Ok(system.to_path_buf());
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let local = dir.join("cty.xml");
            if local.exists() {
                return Ok(local);
            }
        }
    }

    Err(CtyError::NotFound(format!(
        "{SYSTEM_CTY_PATH} and the executable directory"
    )))
}

/// Read and parse a cty.xml file.
pub fn load_cty_file(path: &Path) -> Result<CtyDataset, CtyError> {
    log::info!("loading dataset from {}", path.display());
    let xml = std::fs::read_to_string(path).map_err(|source| CtyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_cty_xml(&xml)
}
