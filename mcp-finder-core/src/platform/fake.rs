//! In-memory platform for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{ListingPage, Occupant, PlatformApi, PresenceRecord, Session, Thumbnail, UserRecord};
use crate::error::{FinderError, Result};
use crate::join::JoinCredential;

pub fn avatar(fingerprint: &str) -> String {
    format!("https://tr.rbxcdn.com/{}/48/48/AvatarHeadshot/Png", fingerprint)
}

/// A session whose occupants carry the given fingerprints.
pub fn session(guid: &str, fingerprints: &[&str]) -> Session {
    Session {
        guid: Some(guid.to_string()),
        join_credential: JoinCredential::new(format!("join('{}')", guid)),
        occupants: fingerprints
            .iter()
            .enumerate()
            .map(|(i, fp)| Occupant {
                id: Some(i as u64 + 1),
                username: Some(format!("player{}", i + 1)),
                thumbnail: Thumbnail {
                    url: avatar(fp),
                    is_final: true,
                },
            })
            .collect(),
        capacity: Some(12),
    }
}

/// A page of `count` sessions with no interesting occupants.
pub fn filler_page(page: u32, count: usize) -> ListingPage {
    ListingPage {
        sessions: (0..count)
            .map(|i| session(&format!("p{}-s{}", page, i), &["nobody-a", "nobody-b"]))
            .collect(),
        total_size: None,
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub users: Vec<(u64, String)>,
    pub avatars: HashMap<u64, String>,
    pub presences: HashMap<u64, PresenceRecord>,
    /// Pages by index; anything past the end is an empty page.
    pub pages: Vec<ListingPage>,
    /// Artificial per-page latency, to reorder response arrival.
    pub delays: HashMap<u32, Duration>,
    pub failing_page: Option<u32>,
    requested: Mutex<Vec<u32>>,
}

impl FakePlatform {
    pub fn with_pages(pages: Vec<ListingPage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// Page indices requested so far, in request order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn user_by_name(&self, handle: &str) -> Result<UserRecord> {
        Ok(self
            .users
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(handle))
            .map(|(id, name)| UserRecord {
                id: Some(*id),
                username: Some(name.clone()),
            })
            .unwrap_or_default())
    }

    async fn user_by_id(&self, id: u64) -> Result<UserRecord> {
        Ok(self
            .users
            .iter()
            .find(|(uid, _)| *uid == id)
            .map(|(id, name)| UserRecord {
                id: Some(*id),
                username: Some(name.clone()),
            })
            .unwrap_or_default())
    }

    async fn avatar_url(&self, id: u64) -> Result<Option<String>> {
        Ok(self.avatars.get(&id).cloned())
    }

    async fn presence(&self, ids: &[u64]) -> Result<Vec<PresenceRecord>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.presences.get(id).cloned())
            .collect())
    }

    async fn listing_page(&self, _place_id: u64, page: u32) -> Result<ListingPage> {
        self.requested.lock().unwrap().push(page);

        if let Some(delay) = self.delays.get(&page) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_page == Some(page) {
            return Err(FinderError::Status {
                status: 503,
                url: format!("fake://listing/{}", page),
            });
        }

        Ok(self.pages.get(page as usize).cloned().unwrap_or_default())
    }
}
