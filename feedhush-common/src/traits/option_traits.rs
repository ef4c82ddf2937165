use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;

/// Key-value settings storage, read one key at a time.
///
/// `Ok(None)` means the key was never stored; failures of the storage facility
/// itself are reported as errors.
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get_option(&self, name: &str) -> Result<Option<Value>, Error>;
}
