//! JSON storage for dictionaries.
//!
//! Dictionaries are written pretty-printed with keys in sorted order, so
//! the same manifest always produces the same file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::Dict;
use crate::error::DictaugError;

/// Reads a dictionary from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_dict(path: &Path) -> Result<Dict, DictaugError> {
    let file = File::open(path).map_err(DictaugError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| DictaugError::DictParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a dictionary to a JSON file, creating parent directories.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_dict(path: &Path, dict: &Dict) -> Result<(), DictaugError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(DictaugError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, dict).map_err(|source| DictaugError::DictWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush()?;
    Ok(())
}

/// Reads a dictionary from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<Dict, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a dictionary from raw JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<Dict, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a dictionary to a pretty-printed JSON string.
pub fn to_json_string(dict: &Dict) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(dict)
}
