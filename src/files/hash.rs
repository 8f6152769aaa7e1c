use sha2::{Digest, Sha256};

/// Fingerprint of an entity's user-visible content. Summary and body are
/// hashed as an ordered pair (a NUL separator keeps `("ab", "c")` distinct
/// from `("a", "bc")`), with CRLF normalized to LF first so line-ending style
/// never reads as an edit.
pub fn content_hash(summary: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(summary).as_bytes());
    hasher.update([0u8]);
    hasher.update(normalize(body).as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = content_hash("Bug", "desc");
        let b = content_hash("Bug", "desc");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_is_short_hex() {
        let h = content_hash("Bug", "desc");
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn summary_and_body_are_ordered() {
        assert_ne!(content_hash("a", "b"), content_hash("b", "a"));
    }

    #[test]
    fn pair_boundary_is_unambiguous() {
        assert_ne!(content_hash("ab", "c"), content_hash("a", "bc"));
    }

    #[test]
    fn crlf_does_not_change_the_hash() {
        assert_eq!(
            content_hash("Bug", "line one\r\nline two"),
            content_hash("Bug", "line one\nline two"),
        );
    }

    #[test]
    fn content_changes_the_hash() {
        assert_ne!(content_hash("Bug", "desc"), content_hash("Bug", "desc v2"));
        assert_ne!(content_hash("Bug", "desc"), content_hash("Bug!", "desc"));
    }
}
