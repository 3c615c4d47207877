//! Access to the platform's public endpoints.
//!
//! `PlatformApi` is the seam between the finder logic and the network:
//! `HttpPlatform` talks to the real endpoints, tests substitute in-memory
//! platforms.

mod http;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpPlatform;
pub use types::{
    ListingPage, Occupant, PresenceRecord, PresenceResponse, Session, Thumbnail, UserRecord,
};

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Look a user up by handle. A missing user yields an empty record.
    async fn user_by_name(&self, handle: &str) -> Result<UserRecord>;

    /// Look a user up by numeric id. A missing user yields an empty record.
    async fn user_by_id(&self, id: u64) -> Result<UserRecord>;

    /// Final (post-redirect) avatar headshot URL, or `None` for an unknown id.
    async fn avatar_url(&self, id: u64) -> Result<Option<String>>;

    /// Presence records for `ids`. Requires a logged-in session.
    async fn presence(&self, ids: &[u64]) -> Result<Vec<PresenceRecord>>;

    /// One page of the live server listing for `place_id`.
    async fn listing_page(&self, place_id: u64, page: u32) -> Result<ListingPage>;
}
