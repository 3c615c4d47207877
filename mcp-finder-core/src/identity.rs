//! Handle <-> id resolution and avatar fingerprints.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::{FinderError, Result};
use crate::platform::PlatformApi;
use crate::util::url_path_segment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub handle: String,
    pub id: u64,
}

/// Opaque match key taken from an avatar image URL. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_avatar_url(url: &str) -> Option<Self> {
        url_path_segment(url).map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    api: Arc<dyn PlatformApi>,
}

impl IdentityResolver {
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api }
    }

    /// Resolve a handle to its id. The returned handle uses the platform's casing.
    pub async fn resolve_id(&self, handle: &str) -> Result<Identity> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(FinderError::InvalidInput("username is empty".to_string()));
        }

        let record = self.api.user_by_name(handle).await?;
        match record.id {
            Some(id) => Ok(Identity {
                handle: record.username.unwrap_or_else(|| handle.to_string()),
                id,
            }),
            None => Err(FinderError::not_found(format!("user '{}'", handle))),
        }
    }

    pub async fn resolve_handle(&self, id: u64) -> Result<Identity> {
        let record = self.api.user_by_id(id).await?;
        match record.username {
            Some(handle) => Ok(Identity { handle, id }),
            None => Err(FinderError::not_found(format!("user {}", id))),
        }
    }

    pub async fn resolve_fingerprint(&self, id: u64) -> Result<Fingerprint> {
        let url = self
            .api
            .avatar_url(id)
            .await?
            .ok_or_else(|| FinderError::not_found(format!("avatar for user {}", id)))?;

        tracing::debug!(user_id = id, avatar = %url, "resolved avatar");

        Fingerprint::from_avatar_url(&url)
            .ok_or_else(|| FinderError::not_found(format!("avatar fingerprint for user {}", id)))
    }
}
