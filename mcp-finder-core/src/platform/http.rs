//! reqwest-backed platform client.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{ListingPage, PresenceRecord, PresenceRequest, PresenceResponse, UserRecord};
use super::PlatformApi;
use crate::config::Endpoints;
use crate::error::{FinderError, Result};

const SESSION_COOKIE_NAME: &str = ".ROBLOSECURITY";
const CSRF_HEADER: &str = "x-csrf-token";
const AVATAR_SIZE: &str = "48";

#[derive(Debug, Clone)]
pub struct HttpPlatform {
    http: Client,
    endpoints: Endpoints,
    session_cookie: Option<String>,
}

impl HttpPlatform {
    pub fn new(
        endpoints: Endpoints,
        session_cookie: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "finder/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoints: Endpoints {
                users: trim_base(&endpoints.users),
                thumbnails: trim_base(&endpoints.thumbnails),
                presence: trim_base(&endpoints.presence),
                games: trim_base(&endpoints.games),
            },
            session_cookie,
        })
    }

    pub fn has_session_cookie(&self) -> bool {
        self.session_cookie.is_some()
    }

    fn with_cookie(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => {
                request.header(COOKIE, format!("{}={}", SESSION_COOKIE_NAME, cookie))
            }
            None => request,
        }
    }

    /// Decode a user lookup. 400/404 are the platform's "no such user"
    /// answer and decode to an empty record; other failures stay errors.
    async fn user_record(&self, url: String, request: RequestBuilder) -> Result<UserRecord> {
        let response = request.send().await?;
        if is_unknown_user(response.status()) {
            tracing::debug!(%url, status = %response.status(), "user lookup rejected");
            return Ok(UserRecord::default());
        }
        decode(url, response).await
    }
}

/// Statuses that mean the requested user does not exist. Rate limiting and
/// auth refusals are not among them.
fn is_unknown_user(status: StatusCode) -> bool {
    matches!(status, StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND)
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

async fn decode<T: DeserializeOwned>(url: String, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(FinderError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FinderError::Decode {
        url,
        message: e.to_string(),
    })
}

#[async_trait]
impl PlatformApi for HttpPlatform {
    async fn user_by_name(&self, handle: &str) -> Result<UserRecord> {
        let url = format!("{}/users/get-by-username", self.endpoints.users);
        let request = self.http.get(&url).query(&[("username", handle)]);
        self.user_record(url, request).await
    }

    async fn user_by_id(&self, id: u64) -> Result<UserRecord> {
        let url = format!("{}/users/{}", self.endpoints.users, id);
        let request = self.http.get(&url);
        self.user_record(url, request).await
    }

    async fn avatar_url(&self, id: u64) -> Result<Option<String>> {
        let url = format!("{}/headshot-thumbnail/image", self.endpoints.thumbnails);
        let id = id.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("userId", id.as_str()),
                ("width", AVATAR_SIZE),
                ("height", AVATAR_SIZE),
                ("format", "png"),
            ])
            .send()
            .await?;

        let status = response.status();
        if is_unknown_user(status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FinderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        // Redirects are followed; the final location carries the fingerprint.
        Ok(Some(response.url().to_string()))
    }

    async fn presence(&self, ids: &[u64]) -> Result<Vec<PresenceRecord>> {
        if !self.has_session_cookie() {
            return Err(FinderError::MissingCredentials("presence lookups"));
        }

        let url = format!("{}/v1/presence/users", self.endpoints.presence);
        let body = PresenceRequest { user_ids: ids };

        let mut response = self
            .with_cookie(self.http.post(&url))
            .json(&body)
            .send()
            .await?;

        // The first POST of a session is refused with a CSRF token to echo back.
        if response.status() == StatusCode::FORBIDDEN {
            if let Some(token) = response.headers().get(CSRF_HEADER).cloned() {
                response = self
                    .with_cookie(self.http.post(&url))
                    .header(CSRF_HEADER, token)
                    .json(&body)
                    .send()
                    .await?;
            }
        }

        let presences: PresenceResponse = decode(url, response).await?;
        Ok(presences.user_presences)
    }

    async fn listing_page(&self, place_id: u64, page: u32) -> Result<ListingPage> {
        let url = format!("{}/games/getgameinstancesjson", self.endpoints.games);
        let response = self
            .with_cookie(self.http.get(&url))
            .query(&[("placeId", place_id.to_string()), ("startindex", page.to_string())])
            .send()
            .await?;
        decode(format!("{}?placeId={}&startindex={}", url, place_id, page), response).await
    }
}
