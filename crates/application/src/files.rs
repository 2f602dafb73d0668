// File manager contract consumed by the photo commands. The implementation
// lives in the infrastructure crate.

use async_trait::async_trait;
use person_registry_domain::Result;

#[async_trait]
pub trait FileManager: Send + Sync {
    /// Stores a new file and returns the path it can be retrieved under.
    async fn upload(&self, file_name: &str, content: &[u8]) -> Result<String>;

    /// Removes a stored file. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Stores a new file and removes the previously stored one, returning
    /// the new path.
    async fn replace(&self, file_name: &str, content: &[u8], existing_path: &str)
        -> Result<String>;

    async fn download(&self, path: &str) -> Result<Vec<u8>>;
}
