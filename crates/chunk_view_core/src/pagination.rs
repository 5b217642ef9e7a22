//! crates/chunk_view_core/src/pagination.rs
//!
//! The paginated collection list of one user.
//!
//! The pager keeps a page cursor against the page count reported by the
//! service. Every change of the `(dataset, user, page)` key is announced on a
//! channel; the refetch effect issues exactly one fetch per announced key.
//! Fetches may complete out of order, so a response is applied only while the
//! key it was issued for is still the current one.

use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::coordinator::{lock, DeferredActionCoordinator};
use crate::domain::{Collection, CollectionPage};
use crate::ports::{ChunkService, PortError, PortResult};

/// The query a fetch is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub dataset: Uuid,
    pub user_id: Uuid,
    /// 1-based.
    pub page: u64,
}

/// What became of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the shown items and page count.
    Applied,
    /// The key changed while the request was in flight; the response was dropped.
    Stale,
    /// The payload failed the shape check; state is unchanged.
    Malformed,
    /// The request failed; state is unchanged.
    Failed,
}

/// What became of a collection deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// 401/403: the deleting indicator is reset and nothing else happens.
    Denied,
}

struct PagerState {
    key: PageKey,
    /// Page whose items are currently shown.
    shown_page: u64,
    page_count: u64,
    items: Vec<Collection>,
    deleting: Option<Uuid>,
    failures: Vec<String>,
}

pub struct CollectionPager {
    service: Arc<dyn ChunkService>,
    state: Mutex<PagerState>,
    changes: mpsc::UnboundedSender<PageKey>,
    change_rx: Mutex<Option<mpsc::UnboundedReceiver<PageKey>>>,
}

impl CollectionPager {
    /// Creates a pager on page 1 of a single, empty page.
    ///
    /// Nothing is fetched until `refresh` is called or the refetch effect is
    /// spawned.
    pub fn new(service: Arc<dyn ChunkService>, dataset: Uuid, user_id: Uuid) -> Self {
        let (changes, change_rx) = mpsc::unbounded_channel();
        Self {
            service,
            state: Mutex::new(PagerState {
                key: PageKey {
                    dataset,
                    user_id,
                    page: 1,
                },
                shown_page: 1,
                page_count: 1,
                items: Vec::new(),
                deleting: None,
                failures: Vec::new(),
            }),
            changes,
            change_rx: Mutex::new(Some(change_rx)),
        }
    }

    //-------------------------------------------------------------------------------------
    // Read access
    //-------------------------------------------------------------------------------------

    pub fn key(&self) -> PageKey {
        lock(&self.state).key
    }

    /// The requested page.
    pub fn page(&self) -> u64 {
        lock(&self.state).key.page
    }

    pub fn shown_page(&self) -> u64 {
        lock(&self.state).shown_page
    }

    pub fn page_count(&self) -> u64 {
        lock(&self.state).page_count
    }

    pub fn items(&self) -> Vec<Collection> {
        lock(&self.state).items.clone()
    }

    /// The collection whose deletion is in progress, if any.
    pub fn deleting(&self) -> Option<Uuid> {
        lock(&self.state).deleting
    }

    /// Pagination label for the shown items, e.g. `"1 / 2"`.
    pub fn label(&self) -> String {
        let state = lock(&self.state);
        format!("{} / {}", state.shown_page, state.page_count)
    }

    pub fn can_go_previous(&self) -> bool {
        lock(&self.state).key.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        let state = lock(&self.state);
        state.key.page < state.page_count
    }

    /// Drains the user-visible failure messages recorded so far.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut lock(&self.state).failures)
    }

    //-------------------------------------------------------------------------------------
    // Key changes
    //-------------------------------------------------------------------------------------

    /// Moves to the next page. A no-op on the last page.
    pub fn next_page(&self) -> bool {
        self.update_key(|state| {
            if state.key.page < state.page_count {
                state.key.page += 1;
            }
        })
    }

    /// Moves to the previous page. A no-op on page 1.
    pub fn previous_page(&self) -> bool {
        self.update_key(|state| {
            if state.key.page > 1 {
                state.key.page -= 1;
            }
        })
    }

    pub fn set_user(&self, user_id: Uuid) -> bool {
        self.update_key(|state| state.key.user_id = user_id)
    }

    pub fn set_dataset(&self, dataset: Uuid) -> bool {
        self.update_key(|state| state.key.dataset = dataset)
    }

    /// Applies `change` and announces the new key if it differs from the old one.
    fn update_key(&self, change: impl FnOnce(&mut PagerState)) -> bool {
        let mut state = lock(&self.state);
        let before = state.key;
        change(&mut *state);
        if state.key == before {
            return false;
        }
        debug!(key = ?state.key, "Collection page key changed");
        // The receiver only goes away with the effect task, which stops on its own.
        let _ = self.changes.send(state.key);
        true
    }

    //-------------------------------------------------------------------------------------
    // Fetching
    //-------------------------------------------------------------------------------------

    /// Fetches the current key.
    pub async fn refresh(&self) -> FetchOutcome {
        let key = self.key();
        self.fetch(key).await
    }

    /// Fetches `key` and applies the response if `key` is still current.
    pub async fn fetch(&self, key: PageKey) -> FetchOutcome {
        debug!(?key, "Fetching collections page");
        let result = self
            .service
            .get_user_collections(key.dataset, key.user_id, key.page)
            .await;

        let mut state = lock(&self.state);
        if state.key != key {
            debug!(?key, current = ?state.key, "Discarding stale collections response");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(CollectionPage {
                collections,
                total_pages,
            }) => {
                state.items = collections;
                state.page_count = total_pages.max(1);
                state.shown_page = key.page;
                FetchOutcome::Applied
            }
            Err(PortError::Malformed(reason)) => {
                warn!(?key, "Malformed collections response: {}", reason);
                FetchOutcome::Malformed
            }
            Err(e) => {
                warn!(?key, "Failed to fetch collections: {:?}", e);
                FetchOutcome::Failed
            }
        }
    }

    /// Spawns the refetch effect: one fetch for the current key (mount), then
    /// one fetch per announced key change. Fetches run concurrently.
    ///
    /// Returns `None` if the effect was already spawned. The task ends once
    /// the pager is dropped.
    pub fn spawn_refetch_effect(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut changes = lock(&self.change_rx).take()?;
        let pager: Weak<Self> = Arc::downgrade(self);
        let mounted = self.key();

        Some(tokio::spawn(async move {
            spawn_fetch(&pager, mounted);
            while let Some(key) = changes.recv().await {
                if !spawn_fetch(&pager, key) {
                    break;
                }
            }
        }))
    }

    //-------------------------------------------------------------------------------------
    // Deletion
    //-------------------------------------------------------------------------------------

    /// Deletes a collection and drops it from the shown items on success.
    ///
    /// The page count is left alone and nothing is refetched, so the page may
    /// be short until the next fetch. 401/403 only reset the deleting
    /// indicator; other failures are returned for the caller to surface.
    pub async fn delete_collection(&self, collection_id: Uuid) -> PortResult<DeleteOutcome> {
        let dataset = {
            let mut state = lock(&self.state);
            state.deleting = Some(collection_id);
            state.key.dataset
        };

        let result = self.service.delete_collection(dataset, collection_id).await;

        let mut state = lock(&self.state);
        // Another deletion may have started meanwhile; leave its indicator.
        if state.deleting == Some(collection_id) {
            state.deleting = None;
        }
        match result {
            Ok(()) => {
                state.items.retain(|collection| collection.id != collection_id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.is_auth_failure() => {
                debug!("Collection delete denied: {:?}", e);
                Ok(DeleteOutcome::Denied)
            }
            Err(e) => Err(e),
        }
    }

    /// Registers the deletion of `collection_id` with the shared coordinator
    /// and raises the confirmation surface.
    ///
    /// Failures other than 401/403 are recorded as user-visible messages.
    pub fn request_delete(
        self: &Arc<Self>,
        coordinator: &DeferredActionCoordinator,
        collection_id: Uuid,
    ) -> bool {
        let pager = self.clone();
        coordinator.register_pending_action(move || async move {
            if let Err(e) = pager.delete_collection(collection_id).await {
                error!("Failed to delete collection {}: {:?}", collection_id, e);
                lock(&pager.state)
                    .failures
                    .push(format!("Failed to delete collection: {}", e));
            }
        });
        coordinator.request_confirmation()
    }
}

/// Spawns one fetch for `key`. Returns `false` once the pager is gone.
fn spawn_fetch(pager: &Weak<CollectionPager>, key: PageKey) -> bool {
    match pager.upgrade() {
        Some(pager) => {
            tokio::spawn(async move {
                pager.fetch(key).await;
            });
            true
        }
        None => false,
    }
}
