use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Length of the stored digest prefix. Sixteen hex characters are enough to
/// diff dependency files by eye while keeping registry records compact.
pub const FINGERPRINT_LEN: usize = 16;

/// Content fingerprint of a byte slice: truncated hex sha256.
#[must_use]
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// Content fingerprint of a file, or `None` when the file does not exist.
///
/// Missing files are the "not tracked" sentinel, not an error: callers must
/// treat the absence of a fingerprint as the absence of tracking. Read
/// failures on an existing file (permissions, races) degrade to `None` as
/// well, with a trace so the skip is visible.
#[must_use]
pub fn fingerprint_file(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(fingerprint_bytes(&bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            tracing::debug!("skipping fingerprint for {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fingerprint_is_deterministic() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("requirements.txt");
        fs::write(&file, "foo==1.0\n").expect("write");

        let first = fingerprint_file(&file).expect("fingerprint");
        let second = fingerprint_file(&file).expect("fingerprint");
        assert_eq!(first, second);
        assert_eq!(first.len(), FINGERPRINT_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("requirements.txt");
        fs::write(&file, "foo==1.0\n").expect("write");
        let before = fingerprint_file(&file).expect("fingerprint");

        fs::write(&file, "foo==2.0\n").expect("write");
        let after = fingerprint_file(&file).expect("fingerprint");
        assert_ne!(before, after);
    }

    #[test]
    fn single_byte_flip_changes_digest() {
        let a = fingerprint_bytes(b"foo==1.0");
        let b = fingerprint_bytes(b"foo==1.1");
        assert_ne!(a, b);
    }

    #[test]
    fn identical_content_matches_across_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("nested").join("b.txt");
        fs::create_dir_all(b.parent().unwrap()).expect("mkdir");
        fs::write(&a, "foo==1.0\n").expect("write");
        fs::write(&b, "foo==1.0\n").expect("write");
        assert_eq!(fingerprint_file(&a), fingerprint_file(&b));
    }

    #[test]
    fn missing_file_yields_sentinel() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(fingerprint_file(&temp.path().join("absent.txt")), None);
    }
}
