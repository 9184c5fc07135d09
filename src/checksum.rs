//! SHA-256 of files on disk, used to decide whether a download changed anything.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::Result;

const BUF_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of the file at `path`, or `None` when it does not exist.
pub fn sha256_file(path: &Path) -> Result<Option<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}
