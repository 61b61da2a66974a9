// Football data feeds: the source trait, provenance tagging, and the
// per-feed fallback to placeholder data.

pub mod client;
pub mod fallback;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use matchday_core::club::ClubCatalog;
use matchday_core::fixture::MatchResult;

use crate::season::SeasonCalendar;
use types::{Scorer, StandingRow};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no football-data API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("invalid feed data: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Feed data tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    Live(T),
    Placeholder(T),
}

impl<T> Sourced<T> {
    pub fn value(&self) -> &T {
        match self {
            Sourced::Live(v) | Sourced::Placeholder(v) => v,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live(_))
    }
}

/// Overall provenance of a set of feeds, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Live,
    Mixed,
    Placeholder,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Live => write!(f, "Live data"),
            DataSource::Mixed => write!(f, "Partly placeholder"),
            DataSource::Placeholder => write!(f, "Placeholder data"),
        }
    }
}

/// The three feeds as last loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feeds {
    pub matches: Sourced<Vec<MatchResult>>,
    pub standings: Sourced<Vec<StandingRow>>,
    pub scorers: Sourced<Vec<Scorer>>,
    pub fetched_at: DateTime<Utc>,
}

impl Feeds {
    pub fn source(&self) -> DataSource {
        let live = [
            self.matches.is_live(),
            self.standings.is_live(),
            self.scorers.is_live(),
        ];
        if live.iter().all(|l| *l) {
            DataSource::Live
        } else if live.iter().any(|l| *l) {
            DataSource::Mixed
        } else {
            DataSource::Placeholder
        }
    }
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// A provider of league data.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fixtures from `today` through the lookahead window. `fallback_matchday`
    /// is used when the provider cannot say which matchday is current.
    async fn fetch_matches(
        &self,
        fallback_matchday: u32,
        today: NaiveDate,
    ) -> Result<Vec<MatchResult>, FeedError>;

    async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FeedError>;

    async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FeedError>;
}

/// Fetch all three feeds concurrently. Each feed that fails is replaced by
/// placeholder data on its own; the others stay live.
pub async fn load_feeds<R: Rng + ?Sized>(
    source: &dyn FeedSource,
    catalog: &ClubCatalog,
    season: &SeasonCalendar,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Feeds {
    let week = season.current_gameweek(now.date_naive());
    let (matches, standings, scorers) = futures_util::future::join3(
        source.fetch_matches(week, now.date_naive()),
        source.fetch_standings(),
        source.fetch_scorers(),
    )
    .await;

    let matches = match matches {
        Ok(m) => Sourced::Live(m),
        Err(e) => {
            warn!("Match feed unavailable, using placeholder data: {}", e);
            Sourced::Placeholder(fallback::placeholder_matches(catalog, season, now, rng))
        }
    };
    let standings = match standings {
        Ok(s) => Sourced::Live(s),
        Err(e) => {
            warn!("Standings feed unavailable, using placeholder data: {}", e);
            Sourced::Placeholder(fallback::placeholder_standings(catalog, rng))
        }
    };
    let scorers = match scorers {
        Ok(s) => Sourced::Live(s),
        Err(e) => {
            warn!("Scorers feed unavailable, using placeholder data: {}", e);
            Sourced::Placeholder(fallback::placeholder_scorers(rng))
        }
    };

    let feeds = Feeds {
        matches,
        standings,
        scorers,
        fetched_at: now,
    };
    info!(
        "Feeds loaded ({}): {} matches, {} standings rows, {} scorers",
        feeds.source(),
        feeds.matches.value().len(),
        feeds.standings.value().len(),
        feeds.scorers.value().len()
    );
    feeds
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use matchday_core::fixture::{MatchStatus, Score};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Feed source with canned per-feed outcomes.
    pub(crate) struct StubFeed {
        pub matches: Option<Vec<MatchResult>>,
        pub standings: Option<Vec<StandingRow>>,
        pub scorers: Option<Vec<Scorer>>,
    }

    impl StubFeed {
        pub(crate) fn offline() -> Self {
            StubFeed {
                matches: None,
                standings: None,
                scorers: None,
            }
        }
    }

    #[async_trait]
    impl FeedSource for StubFeed {
        async fn fetch_matches(
            &self,
            _week: u32,
            _today: NaiveDate,
        ) -> Result<Vec<MatchResult>, FeedError> {
            self.matches.clone().ok_or(FeedError::MissingApiKey)
        }

        async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FeedError> {
            self.standings
                .clone()
                .ok_or_else(|| FeedError::Invalid("no table".into()))
        }

        async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FeedError> {
            self.scorers.clone().ok_or(FeedError::Status {
                status: 503,
                url: "stub".into(),
            })
        }
    }

    pub(crate) fn season() -> SeasonCalendar {
        SeasonCalendar {
            name: "2025-26".into(),
            start: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 5, 24).unwrap(),
        }
    }

    fn in_season() -> DateTime<Utc> {
        "2025-10-04T14:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn offline_source_falls_back_everywhere() {
        let mut rng = StdRng::seed_from_u64(7);
        let feeds = load_feeds(
            &StubFeed::offline(),
            &ClubCatalog::premier_league(),
            &season(),
            in_season(),
            &mut rng,
        )
        .await;

        assert_eq!(feeds.source(), DataSource::Placeholder);
        assert_eq!(feeds.matches.value().len(), 6);
        assert_eq!(feeds.standings.value().len(), 20);
        assert_eq!(feeds.scorers.value().len(), 10);
    }

    #[tokio::test]
    async fn each_feed_falls_back_independently() {
        let live_match = MatchResult {
            id: 42,
            home: "Arsenal".into(),
            away: "Chelsea".into(),
            score: Some(Score { home: 1, away: 0 }),
            status: MatchStatus::Finished,
            minute: None,
            kickoff: in_season(),
        };
        let stub = StubFeed {
            matches: Some(vec![live_match.clone()]),
            standings: None,
            scorers: Some(vec![]),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let feeds = load_feeds(
            &stub,
            &ClubCatalog::premier_league(),
            &season(),
            in_season(),
            &mut rng,
        )
        .await;

        assert_eq!(feeds.matches, Sourced::Live(vec![live_match]));
        assert!(!feeds.standings.is_live());
        assert!(feeds.scorers.is_live());
        assert_eq!(feeds.source(), DataSource::Mixed);
    }

    /// Serves matches only when asked for the expected day.
    struct DayFeed(NaiveDate);

    #[async_trait]
    impl FeedSource for DayFeed {
        async fn fetch_matches(
            &self,
            _week: u32,
            today: NaiveDate,
        ) -> Result<Vec<MatchResult>, FeedError> {
            if today == self.0 {
                Ok(Vec::new())
            } else {
                Err(FeedError::Invalid(format!("asked for {today}")))
            }
        }

        async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FeedError> {
            Ok(Vec::new())
        }

        async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FeedError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn match_window_uses_the_given_clock() {
        let mut rng = StdRng::seed_from_u64(3);
        let feed = DayFeed(NaiveDate::from_ymd_opt(2025, 10, 4).unwrap());
        let feeds = load_feeds(
            &feed,
            &ClubCatalog::premier_league(),
            &season(),
            in_season(),
            &mut rng,
        )
        .await;
        assert!(feeds.matches.is_live());
        assert_eq!(feeds.source(), DataSource::Live);
    }

    #[test]
    fn sourced_accessors() {
        let s = Sourced::Placeholder(vec![1, 2]);
        assert!(!s.is_live());
        assert_eq!(s.value().len(), 2);
        assert!(Sourced::Live(5).is_live());
    }
}
