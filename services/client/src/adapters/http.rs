//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, the concrete implementation of the
//! `ChunkService` port from the core crate. It talks to the search service
//! with `reqwest` and maps the JSON bodies into domain types.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use chunk_view_core::domain::{Chunk, Collection, CollectionPage};
use chunk_view_core::ports::{ChunkService, PortError, PortResult};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

/// Header carrying the dataset selector on every request.
pub const DATASET_HEADER: &str = "TR-Dataset";

const USER_AGENT: &str = concat!("chunk-view/", env!("CARGO_PKG_VERSION"));

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ChunkService` port over HTTP.
///
/// No retry and no timeout are built in; a failed network call surfaces as
/// `PortError::Transport`.
#[derive(Clone)]
pub struct HttpChunkAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpChunkAdapter {
    /// Creates a new `HttpChunkAdapter` for the service rooted at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, dataset: Uuid, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(DATASET_HEADER, dataset.to_string());
        match &self.api_key {
            Some(key) => builder.header(reqwest::header::AUTHORIZATION, key),
            None => builder,
        }
    }

    fn delete_chunk_request(&self, dataset: Uuid, chunk_id: Uuid) -> RequestBuilder {
        self.request(Method::DELETE, dataset, &format!("/chunk/{}", chunk_id))
    }

    fn delete_collection_request(&self, dataset: Uuid, collection_id: Uuid) -> RequestBuilder {
        self.request(Method::DELETE, dataset, "/chunk_collection")
            .json(&json!({ "collection_id": collection_id }))
    }

    async fn send(&self, builder: RequestBuilder) -> PortResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(url = %response.url(), %status, "Search service responded");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }

    async fn body_text(response: Response) -> PortResult<String> {
        response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))
    }
}

/// Maps a non-success status onto the port's error taxonomy.
fn status_error(status: StatusCode, body: String) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::FORBIDDEN => PortError::Forbidden,
        StatusCode::NOT_FOUND => PortError::NotFound(body),
        other => PortError::Status(other.as_u16(), body),
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct ChunkRecord {
    id: Uuid,
    #[serde(default)]
    chunk_html: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    tag_set: Option<String>,
    #[serde(default)]
    time_stamp: Option<String>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    author_id: Uuid,
}
impl ChunkRecord {
    fn to_domain(self) -> Chunk {
        Chunk {
            id: self.id,
            chunk_html: self.chunk_html.unwrap_or_default(),
            link: self.link,
            tag_set: self.tag_set,
            time_stamp: self.time_stamp,
            // Only a JSON object is a usable metadata mapping.
            metadata: match self.metadata {
                Some(serde_json::Value::Object(map)) => Some(map),
                _ => None,
            },
            author_id: self.author_id,
        }
    }
}

#[derive(Deserialize)]
struct CollectionRecord {
    id: Uuid,
    name: String,
    #[serde(default)]
    description: String,
    created_at: NaiveDateTime,
    author_id: Uuid,
}
impl CollectionRecord {
    fn to_domain(self) -> Collection {
        Collection {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            author_id: self.author_id,
        }
    }
}

#[derive(Deserialize)]
struct CollectionPageRecord {
    collections: Vec<CollectionRecord>,
    total_pages: u64,
}
impl CollectionPageRecord {
    fn to_domain(self) -> CollectionPage {
        CollectionPage {
            collections: self
                .collections
                .into_iter()
                .map(CollectionRecord::to_domain)
                .collect(),
            total_pages: self.total_pages,
        }
    }
}

/// Validates a collections body against `{ collections, total_pages }`.
fn parse_collection_page(body: &str) -> PortResult<CollectionPage> {
    serde_json::from_str::<CollectionPageRecord>(body)
        .map(CollectionPageRecord::to_domain)
        .map_err(|e| PortError::Malformed(e.to_string()))
}

fn parse_chunk(body: &str) -> PortResult<Chunk> {
    serde_json::from_str::<ChunkRecord>(body)
        .map(ChunkRecord::to_domain)
        .map_err(|e| PortError::Malformed(e.to_string()))
}

//=========================================================================================
// `ChunkService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChunkService for HttpChunkAdapter {
    async fn get_chunk(&self, dataset: Uuid, chunk_id: Uuid) -> PortResult<Chunk> {
        let path = format!("/chunk/{}", chunk_id);
        let response = self.send(self.request(Method::GET, dataset, &path)).await?;
        parse_chunk(&Self::body_text(response).await?)
    }

    async fn delete_chunk(&self, dataset: Uuid, chunk_id: Uuid) -> PortResult<()> {
        self.send(self.delete_chunk_request(dataset, chunk_id)).await?;
        Ok(())
    }

    async fn get_user_collections(
        &self,
        dataset: Uuid,
        user_id: Uuid,
        page: u64,
    ) -> PortResult<CollectionPage> {
        let path = format!("/user/collections/{}/{}", user_id, page);
        let response = self.send(self.request(Method::GET, dataset, &path)).await?;
        parse_collection_page(&Self::body_text(response).await?)
    }

    async fn delete_collection(&self, dataset: Uuid, collection_id: Uuid) -> PortResult<()> {
        self.send(self.delete_collection_request(dataset, collection_id))
            .await?;
        Ok(())
    }
}
