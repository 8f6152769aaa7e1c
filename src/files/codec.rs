use std::path::Path;

use thiserror::Error;

use crate::model::entity::EntityKey;
use crate::model::local_file::{FileMetadata, LocalFile};

/// Extension of mirror files.
pub const FILE_EXTENSION: &str = "yt";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing frontmatter delimiters")]
    MissingFrontmatter,
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    InvalidKey(String),
}

/// Render a file as `---\n<YAML>\n---\n<body>`. The body is stored trimmed
/// with a single trailing newline; the YAML block keeps whatever extra keys
/// the metadata carries.
pub fn encode(metadata: &FileMetadata, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(metadata)?;
    let yaml = yaml.trim_end_matches('\n');
    let body = body.trim();
    if body.is_empty() {
        Ok(format!("---\n{yaml}\n---\n"))
    } else {
        Ok(format!("---\n{yaml}\n---\n{body}\n"))
    }
}

/// Parse raw file text into a LocalFile. Fails when the delimiter pair is
/// absent, the YAML does not parse, required keys are missing, or the stored
/// `idReadable` is not a valid entity key. The key is parsed (and the entity
/// kind fixed) here, not trusted from any stored field, since the file is
/// hand-editable.
pub fn decode(path: &Path, text: &str) -> Result<LocalFile, DecodeError> {
    let (yaml, body) = split_frontmatter(text).ok_or(DecodeError::MissingFrontmatter)?;
    let metadata: FileMetadata = serde_yaml::from_str(yaml)?;
    let key: EntityKey = metadata
        .id_readable
        .parse()
        .map_err(|e: anyhow::Error| DecodeError::InvalidKey(e.to_string()))?;
    Ok(LocalFile {
        path: path.to_path_buf(),
        key,
        metadata,
        content: body.trim().to_string(),
    })
}

/// Split off the first `---` delimited block. Accepts LF and CRLF delimiter
/// lines, and a closing delimiter at end of file without a trailing newline.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let closing = [("\n---\n", 5), ("\n---\r\n", 6)]
        .into_iter()
        .filter_map(|(marker, len)| rest.find(marker).map(|idx| (idx, len)))
        .min();

    match closing {
        Some((idx, len)) => Some((&rest[..idx], &rest[idx + len..])),
        None => rest.strip_suffix("\n---").map(|yaml| (yaml, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use crate::model::entity::EntityKind;

    fn metadata(id: &str, summary: &str, hash: &str) -> FileMetadata {
        FileMetadata {
            id_readable: id.to_string(),
            summary: summary.to_string(),
            original_hash: hash.to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn round_trip_preserves_the_file() {
        let mut meta = metadata("TEST-123", "Fix login", "abc123");
        meta.extra.insert(
            "attachments".to_string(),
            serde_yaml::to_value(BTreeMap::from([(
                "screenshot.png".to_string(),
                "https://example.test/a/1".to_string(),
            )]))
            .unwrap(),
        );
        let original = LocalFile {
            path: PathBuf::from("/tmp/TEST-123.yt"),
            key: "TEST-123".parse().unwrap(),
            metadata: meta,
            content: "line one\n\nline two".to_string(),
        };

        let text = encode(&original.metadata, &original.content).unwrap();
        let decoded = decode(&original.path, &text).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn round_trip_with_empty_body() {
        let original = LocalFile {
            path: PathBuf::from("/tmp/TEST-1.yt"),
            key: "TEST-1".parse().unwrap(),
            metadata: metadata("TEST-1", "Bug", "ff00"),
            content: String::new(),
        };
        let text = encode(&original.metadata, &original.content).unwrap();
        let decoded = decode(&original.path, &text).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_fixes_kind_from_key_shape() {
        let text = encode(&metadata("TEST-A-9", "Howto", "aa"), "steps").unwrap();
        let file = decode(Path::new("/tmp/a.yt"), &text).unwrap();
        assert_eq!(file.key.kind(), EntityKind::Article);

        let text = encode(&metadata("TEST-9", "Bug", "aa"), "desc").unwrap();
        let file = decode(Path::new("/tmp/i.yt"), &text).unwrap();
        assert_eq!(file.key.kind(), EntityKind::Issue);
    }

    #[test]
    fn decode_trims_the_body() {
        let text = "---\nidReadable: TEST-1\nsummary: Bug\noriginalHash: aa\n---\n\n  desc  \n\n";
        let file = decode(Path::new("/tmp/t.yt"), text).unwrap();
        assert_eq!(file.content, "desc");
    }

    #[test]
    fn decode_without_delimiters_fails() {
        let err = decode(Path::new("/tmp/t.yt"), "just some text").unwrap_err();
        assert!(matches!(err, DecodeError::MissingFrontmatter));
    }

    #[test]
    fn decode_with_unterminated_frontmatter_fails() {
        let err = decode(Path::new("/tmp/t.yt"), "---\nidReadable: TEST-1\n").unwrap_err();
        assert!(matches!(err, DecodeError::MissingFrontmatter));
    }

    #[test]
    fn decode_with_broken_yaml_fails() {
        let text = "---\nidReadable: [unterminated\n---\nbody";
        let err = decode(Path::new("/tmp/t.yt"), text).unwrap_err();
        assert!(matches!(err, DecodeError::Yaml(_)));
    }

    #[test]
    fn decode_with_missing_summary_fails() {
        let text = "---\nidReadable: TEST-1\noriginalHash: aa\n---\nbody";
        let err = decode(Path::new("/tmp/t.yt"), text).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn decode_with_invalid_key_fails() {
        let text = "---\nidReadable: NOPE\nsummary: Bug\noriginalHash: aa\n---\nbody";
        let err = decode(Path::new("/tmp/t.yt"), text).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidKey(_)));
    }

    #[test]
    fn decode_accepts_crlf_files() {
        let text = "---\r\nidReadable: TEST-1\r\nsummary: Bug\r\noriginalHash: aa\r\n---\r\ndesc\r\n";
        let file = decode(Path::new("/tmp/t.yt"), text).unwrap();
        assert_eq!(file.metadata.summary, "Bug");
        assert_eq!(file.content, "desc");
    }

    #[test]
    fn decode_accepts_closing_delimiter_at_eof() {
        let text = "---\nidReadable: TEST-1\nsummary: Bug\noriginalHash: aa\n---";
        let file = decode(Path::new("/tmp/t.yt"), text).unwrap();
        assert_eq!(file.content, "");
    }

    #[test]
    fn unknown_keys_pass_through_encode() {
        let mut meta = metadata("TEST-2", "Bug", "aa");
        meta.extra.insert(
            "reviewer".to_string(),
            serde_yaml::Value::String("sam".to_string()),
        );
        let text = encode(&meta, "desc").unwrap();
        assert!(text.contains("reviewer: sam"));

        let decoded = decode(Path::new("/tmp/t.yt"), &text).unwrap();
        assert_eq!(
            decoded.metadata.extra.get("reviewer"),
            Some(&serde_yaml::Value::String("sam".to_string()))
        );
    }
}
