// API client module: a small blocking HTTP client for the OpenAI
// assistants, threads and files endpoints.
// The menu never talks to `reqwest` directly. Actions receive something
// implementing `AssistantsApi`, so tests can hand them a fake.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Number of assistants requested by the "List Assistants" action.
pub const ASSISTANT_LIST_LIMIT: u32 = 20;

/// Messages are fetched as a single page of this size.
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// Failures reported by the remote service or the transport.
///
/// These are recoverable from the menu's point of view: the dispatcher
/// prints them and keeps prompting.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{what} failed: could not reach the API ({source})")]
    Transport {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{what} failed: {status} - {message}")]
    Status {
        what: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("{what} failed: unexpected response ({source})")]
    Decode {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Purpose tag attached to an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Assistants,
    FineTune,
}

impl Purpose {
    /// Map the upload prompt answer to a purpose. Only `"2"` selects
    /// fine-tune; everything else falls back to assistants.
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "2" => Purpose::FineTune,
            _ => Purpose::Assistants,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Assistants => "assistants",
            Purpose::FineTune => "fine-tune",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Thread {
    pub id: String,
}

/// A message on a thread. Only the parts needed for display are kept.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// One entry of a message's `content` array. Text parts carry their
/// value; anything else (images, refusals...) is kept by type name.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Other(String),
}

impl Message {
    /// Textual rendering of the message content.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text(value) => value.clone(),
                ContentPart::Other(kind) => format!("[{}]", kind),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Deserialize)]
struct RawContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<RawText>,
}

#[derive(Deserialize)]
struct RawText {
    value: String,
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawContentPart::deserialize(deserializer)?;
        Ok(match (raw.kind.as_str(), raw.text) {
            ("text", Some(text)) => ContentPart::Text(text.value),
            _ => ContentPart::Other(raw.kind),
        })
    }
}

impl Serialize for ContentPart {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ContentPart::Text(value) => serde_json::json!({
                "type": "text",
                "text": { "value": value },
            })
            .serialize(serializer),
            ContentPart::Other(kind) => serde_json::json!({ "type": kind }).serialize(serializer),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

/// Response of the delete endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Deletion {
    pub id: String,
    pub deleted: bool,
}

/// `{"object": "list", "data": [...]}` envelope used by every list call.
#[derive(Deserialize, Debug)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The remote operations the menu actions rely on. Each method maps to
/// exactly one HTTP request.
pub trait AssistantsApi {
    /// Newest assistants first, at most `limit` of them.
    fn list_assistants(&self, limit: u32) -> std::result::Result<Vec<Assistant>, ApiError>;
    fn create_thread(&self) -> std::result::Result<Thread, ApiError>;
    fn delete_thread(&self, thread_id: &str) -> std::result::Result<Deletion, ApiError>;
    fn list_messages(&self, thread_id: &str) -> std::result::Result<Vec<Message>, ApiError>;
    fn list_files(&self) -> std::result::Result<Vec<FileObject>, ApiError>;
    fn upload_file(
        &self,
        file: File,
        file_name: &str,
        purpose: Purpose,
    ) -> std::result::Result<FileObject, ApiError>;
    fn delete_file(&self, file_id: &str) -> std::result::Result<Deletion, ApiError>;
}

/// Blocking client holding a reqwest client preconfigured with the
/// credential and beta headers, plus the API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the loaded configuration. A missing API key is
    /// not an error here: requests simply go out unauthenticated and the
    /// service rejects them.
    ///
    /// Requests have no overall timeout; large uploads can take minutes.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(config.api_key.as_deref())?)
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "sending request");
        self.client.request(method, url)
    }

    /// Send the request and decode a successful JSON body, turning non-2xx
    /// responses into `ApiError::Status`.
    fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &'static str,
    ) -> std::result::Result<T, ApiError> {
        let res = req
            .send()
            .map_err(|source| ApiError::Transport { what, source })?;
        let status = res.status();
        if !status.is_success() {
            let txt = res.text().unwrap_or_else(|_| "".into());
            let message = error_message(&txt);
            warn!(what, %status, %message, "request rejected");
            return Err(ApiError::Status {
                what,
                status,
                message,
            });
        }
        res.json().map_err(|source| ApiError::Decode { what, source })
    }
}

impl AssistantsApi for ApiClient {
    fn list_assistants(&self, limit: u32) -> std::result::Result<Vec<Assistant>, ApiError> {
        let limit = limit.to_string();
        let req = self
            .request(Method::GET, "assistants")
            .query(&[("order", "desc"), ("limit", limit.as_str())]);
        let list: ListResponse<Assistant> = self.send(req, "List assistants")?;
        Ok(list.data)
    }

    fn create_thread(&self) -> std::result::Result<Thread, ApiError> {
        let req = self
            .request(Method::POST, "threads")
            .json(&serde_json::json!({}));
        self.send(req, "Create thread")
    }

    fn delete_thread(&self, thread_id: &str) -> std::result::Result<Deletion, ApiError> {
        let req = self.request(Method::DELETE, &format!("threads/{}", thread_id));
        self.send(req, "Delete thread")
    }

    fn list_messages(&self, thread_id: &str) -> std::result::Result<Vec<Message>, ApiError> {
        let req = self
            .request(Method::GET, &format!("threads/{}/messages", thread_id))
            .query(&[("limit", MESSAGE_PAGE_LIMIT)]);
        let list: ListResponse<Message> = self.send(req, "List messages")?;
        Ok(list.data)
    }

    fn list_files(&self) -> std::result::Result<Vec<FileObject>, ApiError> {
        let list: ListResponse<FileObject> =
            self.send(self.request(Method::GET, "files"), "List files")?;
        Ok(list.data)
    }

    fn upload_file(
        &self,
        file: File,
        file_name: &str,
        purpose: Purpose,
    ) -> std::result::Result<FileObject, ApiError> {
        let part = multipart::Part::reader(file).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("purpose", purpose.as_str())
            .part("file", part);
        let req = self.request(Method::POST, "files").multipart(form);
        self.send(req, "Upload file")
    }

    fn delete_file(&self, file_id: &str) -> std::result::Result<Deletion, ApiError> {
        let req = self.request(Method::DELETE, &format!("files/{}", file_id));
        self.send(req, "Delete file")
    }
}

/// Headers sent with every request: the bearer credential (when present)
/// and the assistants beta opt-in.
fn default_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
    if let Some(key) = api_key {
        let mut val = HeaderValue::from_str(&format!("Bearer {}", key))
            .context("OPENAI_API_KEY contains characters not allowed in a header")?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
    }
    Ok(headers)
}

/// Pull the human readable message out of an OpenAI error body, falling
/// back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "no response body".into(),
        Err(_) => body.trim().to_string(),
    }
}
