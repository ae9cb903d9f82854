pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use std::error::Error;

/// Resolve a command's JSON payload: `--input` file first, then piped stdin.
///
/// Returns `None` when neither is present so the caller can fall back to flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    stdin::read_stdin()
}

/// Like [`load`], for commands whose input is too structured for flags.
pub fn require<T: DeserializeOwned>(path: Option<&str>, what: &str) -> Result<T, Box<dyn Error>> {
    load(path)?.ok_or_else(|| format!("--input file (or piped JSON) is required for {what}").into())
}
