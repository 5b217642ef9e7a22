//! crates/chunk_view_core/src/chunk_view.rs
//!
//! The chunk row view and the list of rows a page holds locally.
//!
//! A row owns its chunk, its expand/collapse flag and the derived values
//! computed from the chunk (truncation decision and image range). The list
//! wires row deletions through the shared `DeferredActionCoordinator`.

use std::sync::{Arc, Mutex};
use tracing::{debug, error};
use uuid::Uuid;

use crate::coordinator::{lock, DeferredActionCoordinator};
use crate::domain::Chunk;
use crate::image_range::{ImageRange, ImageRangeResolver};
use crate::ports::ChunkService;
use crate::truncation::ContentTruncationPolicy;

/// Configuration shared by every row of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkViewSettings {
    pub truncation: ContentTruncationPolicy,
    pub image_range: ImageRangeResolver,
}

//=========================================================================================
// ChunkView (one row)
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ChunkView {
    chunk: Chunk,
    settings: ChunkViewSettings,
    needs_truncation: bool,
    image_range: Option<ImageRange>,
    expanded: bool,
}

impl ChunkView {
    /// Creates a collapsed row and derives its values from `chunk`.
    pub fn new(chunk: Chunk, settings: ChunkViewSettings) -> Self {
        let mut view = Self {
            needs_truncation: false,
            image_range: None,
            expanded: false,
            chunk,
            settings,
        };
        view.derive();
        view
    }

    /// Swaps in a refetched chunk and recomputes the derived values.
    /// The expanded flag belongs to the row and is kept.
    pub fn replace_chunk(&mut self, chunk: Chunk) {
        self.chunk = chunk;
        self.derive();
    }

    fn derive(&mut self) {
        self.needs_truncation = self
            .settings
            .truncation
            .needs_truncation(&self.chunk.chunk_html);
        self.image_range = self
            .settings
            .image_range
            .resolve(self.chunk.metadata.as_ref());
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn image_range(&self) -> Option<&ImageRange> {
        self.image_range.as_ref()
    }

    /// Whether the "Show more" / "Show less" control is offered.
    pub fn needs_truncation(&self) -> bool {
        self.needs_truncation
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Collapse styling applies only while collapsed and the content is long.
    pub fn is_collapsed(&self) -> bool {
        !self.expanded && self.needs_truncation
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}

//=========================================================================================
// ChunkList (locally held rows)
//=========================================================================================

/// The rows currently shown by one list view.
///
/// Rows are removed locally once the service confirms their deletion; nothing
/// is refetched.
#[derive(Clone)]
pub struct ChunkList {
    service: Arc<dyn ChunkService>,
    dataset: Uuid,
    settings: ChunkViewSettings,
    coordinator: DeferredActionCoordinator,
    rows: Arc<Mutex<Vec<ChunkView>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl ChunkList {
    pub fn new(
        service: Arc<dyn ChunkService>,
        dataset: Uuid,
        settings: ChunkViewSettings,
        coordinator: DeferredActionCoordinator,
    ) -> Self {
        Self {
            service,
            dataset,
            settings,
            coordinator,
            rows: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces every row with freshly fetched chunks.
    pub fn replace_chunks(&self, chunks: Vec<Chunk>) {
        let rows = chunks
            .into_iter()
            .map(|chunk| ChunkView::new(chunk, self.settings.clone()))
            .collect();
        *lock(&self.rows) = rows;
    }

    pub fn rows(&self) -> Vec<ChunkView> {
        lock(&self.rows).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }

    pub fn coordinator(&self) -> &DeferredActionCoordinator {
        &self.coordinator
    }

    /// Toggles a row's expanded flag. Returns `false` if the row is gone.
    pub fn toggle_expanded(&self, chunk_id: Uuid) -> bool {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|row| row.chunk.id == chunk_id) {
            Some(row) => {
                row.toggle_expanded();
                true
            }
            None => false,
        }
    }

    /// Registers the deletion of `chunk_id` with the shared coordinator and
    /// raises the confirmation surface.
    ///
    /// Nothing is sent until the coordinator confirms. Returns `false` when no
    /// such row is shown.
    pub fn request_delete(&self, chunk_id: Uuid) -> bool {
        if !lock(&self.rows).iter().any(|row| row.chunk.id == chunk_id) {
            return false;
        }

        let service = self.service.clone();
        let rows = self.rows.clone();
        let failures = self.failures.clone();
        let dataset = self.dataset;

        self.coordinator.register_pending_action(move || async move {
            match service.delete_chunk(dataset, chunk_id).await {
                Ok(()) => {
                    debug!("Deleted chunk {}", chunk_id);
                    lock(&rows).retain(|row| row.chunk.id != chunk_id);
                }
                Err(e) => {
                    error!("Failed to delete chunk {}: {:?}", chunk_id, e);
                    lock(&failures).push(format!("Failed to delete chunk: {}", e));
                }
            }
        });
        self.coordinator.request_confirmation()
    }

    /// Drains the user-visible failure messages recorded so far.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CollectionPage;
    use crate::metadata::Metadata;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Default)]
    struct FakeService {
        fail_deletes: bool,
        deleted: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl ChunkService for FakeService {
        async fn get_chunk(&self, _dataset: Uuid, chunk_id: Uuid) -> PortResult<Chunk> {
            Err(PortError::NotFound(chunk_id.to_string()))
        }

        async fn delete_chunk(&self, _dataset: Uuid, chunk_id: Uuid) -> PortResult<()> {
            if self.fail_deletes {
                return Err(PortError::Status(500, "boom".to_string()));
            }
            self.deleted.lock().unwrap().push(chunk_id);
            Ok(())
        }

        async fn get_user_collections(
            &self,
            _dataset: Uuid,
            _user_id: Uuid,
            _page: u64,
        ) -> PortResult<CollectionPage> {
            Err(PortError::Transport("unused".to_string()))
        }

        async fn delete_collection(&self, _dataset: Uuid, _id: Uuid) -> PortResult<()> {
            Ok(())
        }
    }

    fn chunk(content: &str, metadata: Option<Metadata>) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            chunk_html: content.to_string(),
            link: None,
            tag_set: None,
            time_stamp: None,
            metadata,
            author_id: Uuid::new_v4(),
        }
    }

    fn settings() -> ChunkViewSettings {
        ChunkViewSettings {
            truncation: ContentTruncationPolicy::new(1),
            image_range: ImageRangeResolver::new(Some("start".into()), Some("end".into())),
        }
    }

    fn list(service: Arc<FakeService>) -> ChunkList {
        ChunkList::new(
            service,
            Uuid::new_v4(),
            settings(),
            DeferredActionCoordinator::new(),
        )
    }

    #[test]
    fn long_content_starts_collapsed() {
        let long = vec!["w"; 21].join(" ");
        let mut view = ChunkView::new(chunk(&long, None), settings());
        assert!(view.needs_truncation());
        assert!(view.is_collapsed());

        view.toggle_expanded();
        assert!(view.is_expanded());
        assert!(!view.is_collapsed());
        assert!(view.needs_truncation());
    }

    #[test]
    fn short_content_is_never_collapsed() {
        let view = ChunkView::new(chunk("short text", None), settings());
        assert!(!view.needs_truncation());
        assert!(!view.is_collapsed());
    }

    #[test]
    fn image_range_follows_replaced_metadata() {
        let mut view = ChunkView::new(chunk("text", None), settings());
        assert!(view.image_range().is_none());

        let meta = json!({ "start": "img_7", "end": "img_9" });
        let meta = meta.as_object().cloned();
        view.replace_chunk(chunk("text", meta));

        let range = view.image_range().unwrap();
        assert_eq!((range.start, range.end, range.prefix.as_str()), (7, 9, "img_"));
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_row() {
        let service = Arc::new(FakeService::default());
        let list = list(service.clone());
        let keep = chunk("keep", None);
        let gone = chunk("gone", None);
        let gone_id = gone.id;
        list.replace_chunks(vec![keep.clone(), gone]);

        assert!(list.request_delete(gone_id));
        assert!(list.coordinator().is_confirmation_visible());
        assert_eq!(list.len(), 2);

        assert!(list.coordinator().confirm().await);
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].chunk().id, keep.id);
        assert_eq!(*service.deleted.lock().unwrap(), vec![gone_id]);
    }

    #[tokio::test]
    async fn cancelled_delete_sends_nothing() {
        let service = Arc::new(FakeService::default());
        let list = list(service.clone());
        let row = chunk("row", None);
        let id = row.id;
        list.replace_chunks(vec![row]);

        assert!(list.request_delete(id));
        assert!(list.coordinator().cancel());
        assert_eq!(list.len(), 1);
        assert!(service.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_row_and_reports() {
        let service = Arc::new(FakeService {
            fail_deletes: true,
            ..Default::default()
        });
        let list = list(service);
        let row = chunk("row", None);
        let id = row.id;
        list.replace_chunks(vec![row]);

        list.request_delete(id);
        list.coordinator().confirm().await;

        assert_eq!(list.len(), 1);
        let failures = list.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Failed to delete chunk"));
        assert!(list.take_failures().is_empty());
    }

    #[test]
    fn unknown_rows_cannot_be_deleted() {
        let list = list(Arc::new(FakeService::default()));
        assert!(!list.request_delete(Uuid::new_v4()));
        assert!(!list.coordinator().has_pending_action());
    }

    #[test]
    fn toggling_a_row_in_the_list() {
        let list = list(Arc::new(FakeService::default()));
        let row = chunk("row", None);
        let id = row.id;
        list.replace_chunks(vec![row]);

        assert!(list.toggle_expanded(id));
        assert!(list.rows()[0].is_expanded());
        assert!(!list.toggle_expanded(Uuid::new_v4()));
    }
}
