//! BLAKE3 content hashing.

/// Hex-encoded BLAKE3 digest of an in-memory buffer.
///
/// The processor reads each file once and hashes the same bytes it decodes.
pub fn content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_digest() {
        let hash = content_hash(b"pictag");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, content_hash(b"pictag "));
    }

    #[test]
    fn test_matches_streaming_hasher() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut hasher = blake3::Hasher::new();
        for chunk in data.chunks(65536) {
            hasher.update(chunk);
        }
        assert_eq!(content_hash(&data), hasher.finalize().to_hex().to_string());
    }
}
