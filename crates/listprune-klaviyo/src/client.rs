//! HTTP client for the Klaviyo list and data-privacy endpoints

use crate::wire::{DeletionJobRequest, ErrorDocument, ListProfilesResponse};
use async_trait::async_trait;
use listprune_core::{Cursor, Identifier, MembershipSource, Page, ProfileEraser, RemoteError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com";
pub const DEFAULT_REVISION: &str = "2024-10-15";

const JSON_API: &str = "application/vnd.api+json";
const CURSOR_PARAM: &str = "page[cursor]";
const MAX_DETAIL_LEN: usize = 200;

/// How a 404 response is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFoundRule {
    /// Any 404 means the subject is missing
    Status,
    /// Only a JSON:API error with a not-found code does; a bare 404 may be
    /// a wrong route or proxy and confirms nothing
    ErrorCode,
}

/// Client construction errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings for [`KlaviyoClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub revision: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }
}

/// Authenticated Klaviyo API handle
#[derive(Debug, Clone)]
pub struct KlaviyoClient {
    http: Client,
    base_url: Url,
}

impl KlaviyoClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ClientError::InvalidBaseUrl(format!("{}: {}", config.base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url));
        }

        let mut auth = HeaderValue::from_str(&format!("Klaviyo-API-Key {}", config.api_key))
            .map_err(|_| ClientError::InvalidHeader("authorization"))?;
        auth.set_sensitive(true);
        let revision = HeaderValue::from_str(&config.revision)
            .map_err(|_| ClientError::InvalidHeader("revision"))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("revision", revision);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }
}

#[async_trait]
impl MembershipSource for KlaviyoClient {
    async fn fetch_page(
        &self,
        list_id: &str,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page, RemoteError> {
        let mut url = self.endpoint(&["api", "lists", list_id, "profiles"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("fields[profile]", "id")
                .append_pair("page[size]", &page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair(CURSOR_PARAM, cursor.as_str());
            }
        }

        let response = self.http.get(url).send().await.map_err(transport)?;
        let response = check_status(response, list_id, NotFoundRule::Status).await?;
        let body: ListProfilesResponse = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))?;

        debug!(list_id, records = body.data.len(), "Received list profiles page");
        Ok(Page {
            next_cursor: body.next_link().map(cursor_from_next),
            identifiers: body
                .data
                .into_iter()
                .map(|profile| Identifier::from(profile.id))
                .collect(),
        })
    }
}

#[async_trait]
impl ProfileEraser for KlaviyoClient {
    async fn request_deletion(&self, identifier: &Identifier) -> Result<(), RemoteError> {
        let url = self.endpoint(&["api", "data-privacy-deletion-jobs"]);
        let body = serde_json::to_vec(&DeletionJobRequest::for_profile(identifier.as_str()))
            .map_err(|err| RemoteError::Decode(err.to_string()))?;

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_API)
            .body(body)
            .send()
            .await
            .map_err(transport)?;
        check_status(response, identifier.as_str(), NotFoundRule::ErrorCode).await?;
        Ok(())
    }
}

/// Opaque cursor from a `links.next` value.
///
/// Klaviyo returns a full URL; only its `page[cursor]` parameter is kept.
fn cursor_from_next(next: &str) -> Cursor {
    let from_url = Url::parse(next).ok().and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == CURSOR_PARAM)
            .map(|(_, value)| value.into_owned())
    });
    Cursor(from_url.unwrap_or_else(|| next.to_string()))
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

async fn check_status(
    response: reqwest::Response,
    subject: &str,
    not_found: NotFoundRule,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let document = serde_json::from_str::<ErrorDocument>(&text).ok();
    let documented_missing = document.as_ref().is_some_and(ErrorDocument::is_not_found);
    let detail = document
        .and_then(|doc| doc.summary())
        .unwrap_or_else(|| text.chars().take(MAX_DETAIL_LEN).collect());

    Err(match status {
        StatusCode::NOT_FOUND if not_found == NotFoundRule::Status || documented_missing => {
            RemoteError::NotFound(subject.to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(detail),
        _ => RemoteError::Rejected {
            status: status.as_u16(),
            detail,
        },
    })
}
