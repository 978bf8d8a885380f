//! Loading input batches from JSON files.

use crate::error::{Error, Result};
use crate::record::Record;
use std::path::Path;

/// Read a JSON array of `{name, age, salary}` objects.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
