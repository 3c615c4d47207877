//! Wire records returned by the platform endpoints.

use serde::{Deserialize, Serialize};

use crate::join::JoinCredential;
use crate::util::url_path_segment;

/// Body of the by-name and by-id user lookups.
///
/// On failure the platform answers `{"success": false, "errorMessage": ...}`,
/// which decodes to a record with neither field set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
}

/// One page of the live server listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(rename = "Collection", default)]
    pub sessions: Vec<Session>,
    #[serde(rename = "TotalCollectionSize", default)]
    pub total_size: Option<u64>,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A live game server instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "Guid", default)]
    pub guid: Option<String>,
    #[serde(rename = "JoinScript", default, skip_serializing)]
    pub join_credential: JoinCredential,
    #[serde(rename = "CurrentPlayers", default)]
    pub occupants: Vec<Occupant>,
    #[serde(rename = "Capacity", default)]
    pub capacity: Option<u32>,
}

impl Session {
    /// Index of the first occupant whose avatar fingerprint equals `fingerprint`.
    pub fn occupant_index(&self, fingerprint: &str) -> Option<usize> {
        self.occupants
            .iter()
            .position(|o| o.fingerprint() == Some(fingerprint))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "Thumbnail", default)]
    pub thumbnail: Thumbnail,
}

impl Occupant {
    pub fn fingerprint(&self) -> Option<&str> {
        url_path_segment(&self.thumbnail.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(rename = "Url", default)]
    pub url: String,
    #[serde(rename = "IsFinal", default)]
    pub is_final: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    #[serde(default)]
    pub user_presences: Vec<PresenceRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    #[serde(default)]
    pub user_presence_type: u8,
    #[serde(default)]
    pub last_location: String,
    /// ISO-8601; parsed leniently by the presence report.
    #[serde(default)]
    pub last_online: Option<String>,
    #[serde(default)]
    pub place_id: Option<u64>,
    #[serde(default)]
    pub root_place_id: Option<u64>,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub universe_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresenceRequest<'a> {
    pub user_ids: &'a [u64],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_sentinel_decodes_to_empty_record() {
        let record: UserRecord =
            serde_json::from_str(r#"{"success":false,"errorMessage":"User not found"}"#).unwrap();
        assert!(record.id.is_none());
        assert!(record.username.is_none());
    }

    #[test]
    fn test_listing_page_decode() {
        let page: ListingPage = serde_json::from_str(
            r#"{
                "PlaceId": 301549746,
                "TotalCollectionSize": 2,
                "Collection": [
                    {
                        "Guid": "a-b-c",
                        "Capacity": 12,
                        "JoinScript": "Roblox.GameLauncher.joinGameInstance(301549746, \"a-b-c\")",
                        "CurrentPlayers": [
                            {"Id": 1, "Username": "one", "Thumbnail": {"Url": "https://tr.rbxcdn.com/f1/48/48/AvatarHeadshot/Png", "IsFinal": true}},
                            {"Id": 2, "Username": "two", "Thumbnail": {"Url": "https://tr.rbxcdn.com/f2/48/48/AvatarHeadshot/Png", "IsFinal": true}}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.total_size, Some(2));
        assert_eq!(page.sessions.len(), 1);
        let session = &page.sessions[0];
        assert_eq!(session.guid.as_deref(), Some("a-b-c"));
        assert_eq!(session.capacity, Some(12));
        assert_eq!(session.occupant_index("f2"), Some(1));
        assert_eq!(session.occupant_index("f3"), None);
    }

    #[test]
    fn test_missing_collection_is_empty_page() {
        let page: ListingPage = serde_json::from_str("{}").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_presence_decode() {
        let response: PresenceResponse = serde_json::from_str(
            r#"{"userPresences":[{"userPresenceType":2,"lastLocation":"Jailbreak","placeId":606849621,"rootPlaceId":606849621,"gameId":null,"universeId":245683,"userId":42,"lastOnline":"2020-01-02T03:04:05.000Z"}]}"#,
        )
        .unwrap();

        let record = &response.user_presences[0];
        assert_eq!(record.user_presence_type, 2);
        assert_eq!(record.last_location, "Jailbreak");
        assert_eq!(record.universe_id, Some(245683));
        assert!(record.game_id.is_none());
    }
}
