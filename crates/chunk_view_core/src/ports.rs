//! crates/chunk_view_core/src/ports.rs
//!
//! Defines the service contract for the remote search service.
//! The views in this crate only talk to the service through this trait, so the
//! HTTP transport lives in an adapter outside the core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Chunk, CollectionPage};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Errors reported by the remote service port.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A non-success status other than 401, 403 or 404.
    #[error("Request failed with status {0}: {1}")]
    Status(u16, String),
    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// The network call itself failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl PortError {
    /// 401 and 403 are recovered from silently by the views.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PortError::Unauthorized | PortError::Forbidden)
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Port
//=========================================================================================

/// Every call is scoped by the dataset selector it is issued for.
#[async_trait]
pub trait ChunkService: Send + Sync {
    async fn get_chunk(&self, dataset: Uuid, chunk_id: Uuid) -> PortResult<Chunk>;

    async fn delete_chunk(&self, dataset: Uuid, chunk_id: Uuid) -> PortResult<()>;

    /// Fetches one 1-based page of the collections authored by `user_id`.
    async fn get_user_collections(
        &self,
        dataset: Uuid,
        user_id: Uuid,
        page: u64,
    ) -> PortResult<CollectionPage>;

    async fn delete_collection(&self, dataset: Uuid, collection_id: Uuid) -> PortResult<()>;
}
