// src/services/bluesky.rs

//! Bluesky publisher.
//!
//! Talks XRPC to a PDS: `com.atproto.server.createSession` for a bearer
//! token, then `com.atproto.repo.createRecord` for the post.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FacetFeature, PostDraft, PublishSettings};

const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Reference to a created post record.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PublishReceipt {
    pub uri: String,
    pub cid: String,
}

/// Destination for composed posts.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, draft: &PostDraft) -> Result<PublishReceipt>;
}

/// [`Publisher`] that posts to a Bluesky PDS with an app password.
pub struct BlueskyPublisher {
    client: Client,
    service: String,
    handle: String,
    app_password: String,
}

impl BlueskyPublisher {
    pub fn new(client: Client, settings: &PublishSettings) -> Self {
        Self {
            client,
            service: settings.service.trim_end_matches('/').to_string(),
            handle: settings.handle.clone(),
            app_password: settings.app_password.clone(),
        }
    }

    fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    async fn create_session(&self) -> Result<Session> {
        let response = self
            .client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &self.handle,
                password: &self.app_password,
            })
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create_record(&self, session: &Session, draft: &PostDraft) -> Result<PublishReceipt> {
        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord::new(draft),
        };
        let response = self
            .client
            .post(self.xrpc_url("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn publish(&self, draft: &PostDraft) -> Result<PublishReceipt> {
        let session = self.create_session().await?;
        log::debug!("Logged in to {} as {}", self.service, session.did);
        self.create_record(&session, draft).await
    }
}

/// Turn a non-2xx XRPC response into [`AppError::Publish`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<XrpcError>(&body) {
        Ok(XrpcError {
            error: Some(error),
            message: Some(message),
        }) => format!("{error}: {message}"),
        Ok(XrpcError {
            error: Some(error), ..
        }) => error,
        _ if body.is_empty() => status.canonical_reason().unwrap_or("no body").to_string(),
        _ => body,
    };
    Err(AppError::publish(status.as_u16(), message))
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Deserialize)]
struct XrpcError {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    created_at: String,
    langs: [&'static str; 1],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<WireFacet<'a>>,
}

impl<'a> PostRecord<'a> {
    fn new(draft: &'a PostDraft) -> Self {
        Self {
            record_type: POST_COLLECTION,
            text: &draft.text,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            langs: ["en"],
            facets: draft
                .facets
                .iter()
                .map(|f| WireFacet {
                    index: ByteSlice {
                        byte_start: f.byte_start,
                        byte_end: f.byte_end,
                    },
                    features: [&f.feature],
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct WireFacet<'a> {
    index: ByteSlice,
    features: [&'a FacetFeature; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ByteSlice {
    byte_start: usize,
    byte_end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Facet;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(service: &str) -> PublishSettings {
        PublishSettings {
            service: service.to_string(),
            handle: "digest.bsky.social".into(),
            app_password: "abcd-efgh-ijkl-mnop".into(),
            repository: "someone/site-updates".into(),
            branch: "main".into(),
            hashtag: "#MassGov".into(),
        }
    }

    fn draft() -> PostDraft {
        PostDraft {
            text: "https://e.gov/a was updated. #MassGov".into(),
            facets: vec![
                Facet::link(0..15, "https://e.gov/a"),
                Facet::tag(29..37, "MassGov"),
            ],
        }
    }

    #[test]
    fn test_record_wire_format() {
        let draft = draft();
        let value = serde_json::to_value(PostRecord::new(&draft)).unwrap();

        assert_eq!(value["$type"], "app.bsky.feed.post");
        assert_eq!(value["text"], draft.text);
        assert!(value["createdAt"].as_str().unwrap().ends_with('Z'));
        assert_eq!(
            value["facets"],
            json!([
                {
                    "index": { "byteStart": 0, "byteEnd": 15 },
                    "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": "https://e.gov/a" }]
                },
                {
                    "index": { "byteStart": 29, "byteEnd": 37 },
                    "features": [{ "$type": "app.bsky.richtext.facet#tag", "tag": "MassGov" }]
                }
            ])
        );
    }

    #[tokio::test]
    async fn test_publish_logs_in_and_creates_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.server.createSession"))
            .and(body_partial_json(json!({
                "identifier": "digest.bsky.social",
                "password": "abcd-efgh-ijkl-mnop"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessJwt": "jwt-token",
                "refreshJwt": "refresh-token",
                "handle": "digest.bsky.social",
                "did": "did:plc:abc123"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .and(header("authorization", "Bearer jwt-token"))
            .and(body_partial_json(json!({
                "repo": "did:plc:abc123",
                "collection": "app.bsky.feed.post",
                "record": { "text": "https://e.gov/a was updated. #MassGov" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "at://did:plc:abc123/app.bsky.feed.post/3k2a",
                "cid": "bafyreib2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = BlueskyPublisher::new(Client::new(), &settings(&server.uri()));
        let receipt = publisher.publish(&draft()).await.unwrap();

        assert_eq!(
            receipt,
            PublishReceipt {
                uri: "at://did:plc:abc123/app.bsky.feed.post/3k2a".into(),
                cid: "bafyreib2".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_login_rejection_is_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.server.createSession"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "AuthenticationRequired",
                "message": "Invalid identifier or password"
            })))
            .mount(&server)
            .await;

        let publisher = BlueskyPublisher::new(Client::new(), &settings(&server.uri()));
        let err = publisher.publish(&draft()).await.unwrap_err();

        match err {
            AppError::Publish { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "AuthenticationRequired: Invalid identifier or password");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
