pub mod http;

pub use http::HttpChunkAdapter;
