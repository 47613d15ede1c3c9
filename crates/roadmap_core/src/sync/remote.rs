//! Remote product storage seam used by the board store.

use crate::model::product::Product;
use crate::sync::error::{RemoteError, RemoteResult};
use async_trait::async_trait;

/// Author and reason recorded in the remote commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub user_name: String,
    pub reason: String,
}

impl PushRequest {
    pub fn new(user_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            reason: reason.into(),
        }
    }

    /// Both fields are required before a push is attempted.
    pub fn validate(&self) -> RemoteResult<()> {
        if self.user_name.trim().is_empty() {
            return Err(RemoteError::InvalidRequest(
                "user name is required to push".to_string(),
            ));
        }
        if self.reason.trim().is_empty() {
            return Err(RemoteError::InvalidRequest(
                "a change reason is required to push".to_string(),
            ));
        }
        Ok(())
    }

    /// `"<user> - <product> - <reason>"`, with both fields as entered.
    pub fn commit_message(&self, product_name: &str) -> String {
        format!("{} - {} - {}", self.user_name, product_name, self.reason)
    }
}

/// Outcome of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub path: String,
    pub commit_message: String,
    /// `true` when no prior file existed and one was created.
    pub created: bool,
    /// Blob sha of the written content, when the remote reported it.
    pub content_sha: Option<String>,
}

/// Remote storage holding one snapshot per product.
#[async_trait]
pub trait ProductRemote: Send + Sync {
    /// Display names of every product stored remotely.
    async fn list_products(&self) -> RemoteResult<Vec<String>>;

    /// Fetches one product snapshot.
    async fn pull_product(&self, name: &str) -> RemoteResult<Product>;

    /// Replaces (or creates) one product snapshot.
    async fn push_product(
        &self,
        product: &Product,
        request: &PushRequest,
    ) -> RemoteResult<PushReceipt>;
}
