use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::Tracker;
use crate::model::entity::{EntityKey, EntityKind, RemoteEntity};

const ISSUE_FIELDS: &str = "idReadable,summary,description,updated,attachments(name,url)";
const ARTICLE_FIELDS: &str = "idReadable,summary,content,updated,attachments(name,url)";

pub struct YouTrackClient {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl YouTrackClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {token}"),
            client: reqwest::Client::new(),
        }
    }

    /// Issues and articles live under different endpoints and store their
    /// body in differently named fields.
    fn endpoint(&self, key: &EntityKey) -> (String, &'static str) {
        match key.kind() {
            EntityKind::Issue => (format!("{}/api/issues/{key}", self.base_url), ISSUE_FIELDS),
            EntityKind::Article => {
                (format!("{}/api/articles/{key}", self.base_url), ARTICLE_FIELDS)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityResponse {
    id_readable: String,
    summary: Option<String>,
    description: Option<String>,
    content: Option<String>,
    updated: Option<i64>,
    #[serde(default)]
    attachments: Vec<AttachmentResponse>,
}

#[derive(Deserialize)]
struct AttachmentResponse {
    name: Option<String>,
    url: Option<String>,
}

impl EntityResponse {
    fn into_entity(self) -> Result<RemoteEntity> {
        let key: EntityKey = self.id_readable.parse()?;
        let body = self.description.or(self.content).unwrap_or_default();
        let attachments = self
            .attachments
            .into_iter()
            .filter_map(|a| Some((a.name?, a.url?)))
            .collect();
        Ok(RemoteEntity {
            key,
            summary: self.summary.unwrap_or_default().trim().to_string(),
            body: body.trim().to_string(),
            updated: self.updated.and_then(DateTime::from_timestamp_millis),
            attachments,
        })
    }
}

#[async_trait]
impl Tracker for YouTrackClient {
    fn name(&self) -> &str {
        "YouTrack"
    }

    async fn get_entity(&self, key: &EntityKey) -> Result<Option<RemoteEntity>> {
        let (url, fields) = self.endpoint(key);
        let resp = self
            .client
            .get(&url)
            .query(&[("fields", fields)])
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("YouTrack request failed")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("YouTrack returned {} for {key}", resp.status());
        }

        let entity: EntityResponse =
            resp.json().await.context("Failed to parse YouTrack response")?;
        entity.into_entity().map(Some)
    }

    async fn update_entity(
        &self,
        key: &EntityKey,
        body: &str,
        summary: Option<&str>,
    ) -> Result<RemoteEntity> {
        let (url, fields) = self.endpoint(key);
        let body_field = match key.kind() {
            EntityKind::Issue => "description",
            EntityKind::Article => "content",
        };
        let mut payload = serde_json::Map::new();
        payload.insert(
            body_field.to_string(),
            serde_json::Value::String(body.to_string()),
        );
        if let Some(summary) = summary {
            payload.insert(
                "summary".to_string(),
                serde_json::Value::String(summary.to_string()),
            );
        }

        let resp = self
            .client
            .post(&url)
            .query(&[("fields", fields)])
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .context("YouTrack request failed")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("{key} was not found on the server");
        }
        if !resp.status().is_success() {
            anyhow::bail!("YouTrack returned {} updating {key}", resp.status());
        }

        let entity: EntityResponse =
            resp.json().await.context("Failed to parse YouTrack response")?;
        entity.into_entity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YouTrackClient {
        YouTrackClient::new("https://yt.example.test/".to_string(), "secret".to_string())
    }

    #[test]
    fn endpoints_differ_by_kind() {
        let client = client();
        let issue: EntityKey = "TEST-1".parse().unwrap();
        let article: EntityKey = "TEST-A-1".parse().unwrap();

        let (url, fields) = client.endpoint(&issue);
        assert_eq!(url, "https://yt.example.test/api/issues/TEST-1");
        assert!(fields.contains("description"));

        let (url, fields) = client.endpoint(&article);
        assert_eq!(url, "https://yt.example.test/api/articles/TEST-A-1");
        assert!(fields.contains("content"));
    }

    #[test]
    fn response_maps_issue_fields() {
        let raw = r#"{
            "idReadable": "TEST-1",
            "summary": "  Bug  ",
            "description": "desc\n",
            "updated": 1700000000000,
            "attachments": [
                {"name": "shot.png", "url": "/a/1"},
                {"name": "no-url", "url": null}
            ]
        }"#;
        let resp: EntityResponse = serde_json::from_str(raw).unwrap();
        let entity = resp.into_entity().unwrap();

        assert_eq!(entity.key.as_str(), "TEST-1");
        assert_eq!(entity.summary, "Bug");
        assert_eq!(entity.body, "desc");
        assert!(entity.updated.is_some());
        assert_eq!(entity.attachments.len(), 1);
        assert_eq!(entity.attachments["shot.png"], "/a/1");
    }

    #[test]
    fn response_maps_article_content() {
        let raw = r#"{"idReadable": "TEST-A-1", "summary": "Guide", "content": "text"}"#;
        let resp: EntityResponse = serde_json::from_str(raw).unwrap();
        let entity = resp.into_entity().unwrap();

        assert_eq!(entity.key.kind(), EntityKind::Article);
        assert_eq!(entity.body, "text");
    }

    #[test]
    fn response_with_unusable_key_fails() {
        let raw = r#"{"idReadable": "nonsense", "summary": "x"}"#;
        let resp: EntityResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.into_entity().is_err());
    }
}
