use async_trait::async_trait;
use geoexplorer_core::error::Result;
use serde_json::Value;

/// Query parameters attached to a GET request
pub type Params<'a> = &'a [(&'a str, String)];

/// Port for the remote content-management backend.
///
/// Paths are relative to the API root (`dataset/{id}`, `workingSet`, ...).
/// Every call resolves to the response body, already decoded as JSON.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch a resource
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value>;

    /// Create a resource, returning the created entity
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;

    /// Replace a resource, returning the stored entity
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;

    /// Delete a resource
    async fn delete(&self, path: &str) -> Result<Value>;
}
