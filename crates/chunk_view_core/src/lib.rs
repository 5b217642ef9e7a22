pub mod chunk_view;
pub mod coordinator;
pub mod domain;
pub mod image_range;
pub mod metadata;
pub mod pagination;
pub mod ports;
pub mod truncation;

pub use chunk_view::{ChunkList, ChunkView, ChunkViewSettings};
pub use coordinator::{DeferredAction, DeferredActionCoordinator};
pub use domain::{Chunk, Collection, CollectionPage};
pub use image_range::{ImageRange, ImageRangeResolver};
pub use metadata::Metadata;
pub use pagination::{CollectionPager, DeleteOutcome, FetchOutcome, PageKey};
pub use ports::{ChunkService, PortError, PortResult};
pub use truncation::ContentTruncationPolicy;
