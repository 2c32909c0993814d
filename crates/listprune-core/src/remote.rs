//! Seams to the marketing platform

use crate::error::RemoteError;
use crate::types::{Cursor, Identifier, Page};
use async_trait::async_trait;

/// Paged access to list memberships
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Fetch one page of members. `cursor` is `None` for the first page.
    async fn fetch_page(
        &self,
        list_id: &str,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page, RemoteError>;
}

/// Irreversible deletion of a contact record.
///
/// Implementations must tolerate repeated calls for the same identifier.
#[async_trait]
pub trait ProfileEraser: Send + Sync {
    async fn request_deletion(&self, identifier: &Identifier) -> Result<(), RemoteError>;
}
