//! Finding a live session on the paged server listing.
//!
//! `locate` scans for a target fingerprint in batches of concurrently fetched
//! pages. `locate_emptiest` binary-searches page indices for the listing's
//! tail, a cheap proxy for a low-population server: population is not
//! guaranteed to fall monotonically with page index, so the result is a
//! heuristic, not the true minimum.

use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;

use crate::config::SearchSettings;
use crate::error::Result;
use crate::identity::Fingerprint;
use crate::platform::{ListingPage, PlatformApi, Session};

/// Reported after every batch that did not end the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchProgress {
    pub pages_checked: u32,
    pub rounds: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionMatch {
    pub session: Session,
    pub page: u32,
    pub session_index: usize,
    /// Position of the target among the occupants; `None` for emptiest-server picks.
    pub occupant_index: Option<usize>,
    pub rounds: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocateOutcome {
    Found(SessionMatch),
    /// Ran out of non-empty pages. A normal terminal outcome.
    Exhausted { pages_checked: u32, rounds: u32 },
}

impl LocateOutcome {
    pub fn found(&self) -> Option<&SessionMatch> {
        match self {
            Self::Found(m) => Some(m),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn into_found(self) -> Option<SessionMatch> {
        match self {
            Self::Found(m) => Some(m),
            Self::Exhausted { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct ServerLocator {
    api: Arc<dyn PlatformApi>,
    settings: SearchSettings,
}

impl ServerLocator {
    pub fn new(api: Arc<dyn PlatformApi>, settings: SearchSettings) -> Self {
        Self { api, settings }
    }

    /// Find the first session, in listing order, holding an occupant with `fingerprint`.
    ///
    /// Each round fetches `batch_width` pages concurrently and waits for all
    /// of them; one failed request fails the search. Pages are then scanned
    /// in index order, so the result does not depend on response arrival
    /// order. The first page with no sessions ends the search.
    pub async fn locate(
        &self,
        place_id: u64,
        fingerprint: &Fingerprint,
        on_progress: &(dyn Fn(SearchProgress) + Send + Sync),
    ) -> Result<LocateOutcome> {
        let width = self.settings.batch_width.max(1);
        let mut start: u32 = 0;
        let mut rounds: u32 = 0;

        loop {
            let end = start.saturating_add(width);
            let pages = try_join_all((start..end).map(|page| self.api.listing_page(place_id, page)))
                .await?;
            rounds += 1;

            tracing::debug!(place_id, start, end, rounds, "listing batch received");

            for (page, listing) in (start..end).zip(pages) {
                if listing.is_empty() {
                    tracing::info!(place_id, pages_checked = page, rounds, "listing exhausted");
                    return Ok(LocateOutcome::Exhausted {
                        pages_checked: page,
                        rounds,
                    });
                }

                if let Some((session_index, occupant_index, session)) =
                    find_occupant(listing, fingerprint)
                {
                    tracing::info!(place_id, page, session_index, rounds, "target located");
                    return Ok(LocateOutcome::Found(SessionMatch {
                        session,
                        page,
                        session_index,
                        occupant_index: Some(occupant_index),
                        rounds,
                    }));
                }
            }

            if end == u32::MAX {
                return Ok(LocateOutcome::Exhausted {
                    pages_checked: end,
                    rounds,
                });
            }

            start = end;
            on_progress(SearchProgress {
                pages_checked: start,
                rounds,
            });
        }
    }

    /// Binary-search page indices in `[0, emptiest_upper_bound]` for a page
    /// holding fewer than `full_page_threshold` (but some) sessions, and pick
    /// its last-listed session.
    ///
    /// An empty midpoint lowers the upper bound, a full one raises the lower
    /// bound; the midpoint rounds half up. When the bounds meet without a
    /// hit the lower bound is checked once (it is never the midpoint), then
    /// the search reports `Exhausted`.
    pub async fn locate_emptiest(&self, place_id: u64) -> Result<LocateOutcome> {
        let threshold = self.settings.full_page_threshold.max(1);
        let mut lo: u32 = 0;
        let mut hi: u32 = self.settings.emptiest_upper_bound;
        let mut lo_checked = false;
        let mut hi_checked = false;
        let max_rounds = max_emptiest_rounds(hi);
        let mut rounds: u32 = 0;

        while rounds < max_rounds {
            let mut page = lo + (hi - lo).div_ceil(2);
            if (page == hi && hi_checked) || (page == lo && lo_checked) {
                if lo_checked {
                    break;
                }
                page = lo;
            }

            rounds += 1;
            let listing = self.api.listing_page(place_id, page).await?;
            let count = listing.sessions.len();

            tracing::debug!(place_id, page, count, lo, hi, rounds, "emptiest page check");

            if count == 0 {
                hi = page;
                hi_checked = true;
                if page == lo {
                    lo_checked = true;
                }
            } else if count < threshold {
                let session_index = count - 1;
                let session = last_session(listing);
                tracing::info!(place_id, page, rounds, players = session.occupants.len(), "tail page found");
                return Ok(LocateOutcome::Found(SessionMatch {
                    session,
                    page,
                    session_index,
                    occupant_index: None,
                    rounds,
                }));
            } else {
                lo = page;
                lo_checked = true;
            }
        }

        tracing::info!(place_id, rounds, "no partially filled page found");
        Ok(LocateOutcome::Exhausted {
            pages_checked: rounds,
            rounds,
        })
    }
}

fn find_occupant(listing: ListingPage, fingerprint: &Fingerprint) -> Option<(usize, usize, Session)> {
    listing
        .sessions
        .into_iter()
        .enumerate()
        .find_map(|(i, session)| {
            session
                .occupant_index(fingerprint.as_str())
                .map(|occupant| (i, occupant, session))
        })
}

fn last_session(mut listing: ListingPage) -> Session {
    listing.sessions.pop().unwrap_or_default()
}

/// `ceil(log2(upper))` halvings plus the two boundary checks.
fn max_emptiest_rounds(upper: u32) -> u32 {
    let halvings = match upper {
        0 | 1 => 0,
        n => u32::BITS - (n - 1).leading_zeros(),
    };
    halvings + 2
}
