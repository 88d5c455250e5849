use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Returned for files that could not be read. Never matches a cache row.
pub const UNHASHABLE: &str = "";

const CHUNK_SIZE: usize = 8 * 1024;

/// Lowercase hex SHA-256 of the file, streamed in fixed-size chunks.
pub fn hash_file(path: &Path) -> String {
    match try_hash_file(path) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Cannot hash {}: {}", path.display(), e);
            UNHASHABLE.to_string()
        }
    }
}

fn try_hash_file(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(to_hex(&hasher.finalize()))
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

fn to_hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_hash_bytes_known_vectors() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_file_matches_hash_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "print('hi')\n").unwrap();

        assert_eq!(hash_file(&path), hash_bytes(b"print('hi')\n"));
    }

    #[test]
    fn test_hash_file_spanning_several_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        let content: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        assert_eq!(hash_file(&path), hash_bytes(&content));
    }

    #[test]
    fn test_hash_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();
        let before = hash_file(&path);
        fs::write(&path, "x = 2\n").unwrap();

        assert_ne!(before, hash_file(&path));
    }

    #[test]
    fn test_unreadable_file_is_unhashable() {
        let dir = TempDir::new().unwrap();
        assert_eq!(hash_file(&dir.path().join("missing.py")), UNHASHABLE);
        assert_eq!(hash_file(dir.path()), UNHASHABLE);
    }
}
