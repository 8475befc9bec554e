//! geoexplorer gateway - Remote data port and adapters
//!
//! This crate defines the [`Gateway`] port used to reach the backend, an HTTP
//! adapter and an in-memory adapter, plus the dataset loader functions, the
//! downloaded-data cache and the server-sent event stream consumer.

pub mod cache;
pub mod catalog;
pub mod http;
pub mod loader;
pub mod memory;
pub mod ports;
pub mod stream;

pub use cache::DatasetDataCache;
pub use http::RestGateway;
pub use memory::MemoryGateway;
pub use ports::Gateway;
pub use stream::{EventStream, SseDecoder, SseFrame, TimestampStore};
