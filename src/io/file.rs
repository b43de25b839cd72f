use std::fs::File;
use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// Open a file for reading, mapping failures into [`IoError::Read`].
pub fn open_file(path: &Path) -> Result<File, IoError> {
    File::open(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read a whole file into a shared buffer.
pub fn read_file(path: &Path) -> Result<Bytes, IoError> {
    let data = std::fs::read(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(Bytes::from(data))
}
