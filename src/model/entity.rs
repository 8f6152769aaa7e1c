use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};

/// Marker segment that distinguishes article keys (`TEST-A-123`) from issue
/// keys (`TEST-123`).
const ARTICLE_MARKER: &str = "A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Issue,
    Article,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Issue => "issue",
            EntityKind::Article => "article",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated human-readable entity key. The entity kind is decided here,
/// once, from the key's segment shape; downstream code reads `kind()` instead
/// of re-inspecting the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKey {
    raw: String,
    project: String,
    kind: EntityKind,
}

impl EntityKey {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl FromStr for EntityKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_uppercase();
        let segments: Vec<&str> = raw.split('-').collect();

        let kind = if segments.len() == 2
            && is_project(segments[0])
            && is_numeric(segments[1])
        {
            EntityKind::Issue
        } else if segments.len() == 3
            && is_project(segments[0])
            && segments[1] == ARTICLE_MARKER
            && is_numeric(segments[2])
        {
            EntityKind::Article
        } else {
            bail!("invalid entity key '{s}': expected PROJECT-123 or PROJECT-A-123");
        };

        let project = segments[0].to_string();
        Ok(EntityKey { raw, project, kind })
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_project(segment: &str) -> bool {
    segment.starts_with(|c: char| c.is_ascii_alphabetic())
        && segment.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// An issue or knowledge-base article as it exists on the server. Issues
/// carry their text as a description, articles as page content; both arrive
/// here unified as `body`, trimmed.
#[derive(Debug, Clone)]
pub struct RemoteEntity {
    pub key: EntityKey,
    pub summary: String,
    pub body: String,
    pub updated: Option<DateTime<Utc>>,
    /// Attachment name -> download URL.
    pub attachments: BTreeMap<String, String>,
}
