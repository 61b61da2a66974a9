// football-data.org v4 client: raw response shapes and their conversion
// into typed feed records.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use matchday_core::club::ClubCatalog;
use matchday_core::fixture::{MatchResult, MatchStatus, Score};

use super::types::{Scorer, StandingRow};
use super::{FeedError, FeedSource};
use crate::config::Config;

// ---------------------------------------------------------------------------
// Raw response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompetitionResponse {
    current_season: Option<RawSeason>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeason {
    current_matchday: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    id: u64,
    utc_date: DateTime<Utc>,
    status: String,
    /// Sent as a number or a string depending on the plan; parsed leniently.
    #[serde(default)]
    minute: Option<serde_json::Value>,
    home_team: RawTeam,
    away_team: RawTeam,
    #[serde(default)]
    score: Option<RawScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTeam {
    id: Option<u32>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScore {
    full_time: Option<RawGoals>,
}

#[derive(Debug, Deserialize)]
struct RawGoals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    standings: Vec<RawStanding>,
}

#[derive(Debug, Deserialize)]
struct RawStanding {
    #[serde(default)]
    table: Vec<RawTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTableRow {
    position: u32,
    team: RawTeam,
    played_games: u32,
    won: u32,
    draw: u32,
    lost: u32,
    points: u32,
    goals_for: u32,
    goals_against: u32,
}

#[derive(Debug, Deserialize)]
struct ScorersResponse {
    #[serde(default)]
    scorers: Vec<RawScorer>,
}

#[derive(Debug, Deserialize)]
struct RawScorer {
    player: RawPlayer,
    team: RawTeam,
    #[serde(default)]
    goals: Option<u32>,
    #[serde(default)]
    assists: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    name: String,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn parse_status(raw: &str) -> Result<MatchStatus, FeedError> {
    match raw {
        "SCHEDULED" | "TIMED" => Ok(MatchStatus::Scheduled),
        "IN_PLAY" | "LIVE" => Ok(MatchStatus::InPlay),
        "PAUSED" => Ok(MatchStatus::Paused),
        "FINISHED" | "AWARDED" => Ok(MatchStatus::Finished),
        "POSTPONED" | "SUSPENDED" | "CANCELLED" => Ok(MatchStatus::Postponed),
        other => Err(FeedError::Invalid(format!("unknown match status {other:?}"))),
    }
}

/// Map a feed team to the catalog's club name. Teams are matched by feed id
/// first; otherwise the feed name is used with a trailing " FC" removed.
fn club_name(team: &RawTeam, catalog: &ClubCatalog) -> Result<String, FeedError> {
    if let Some(id) = team.id {
        if let Some(club) = catalog.iter().find(|c| c.feed_id == id) {
            return Ok(club.name.clone());
        }
    }
    match team.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            Ok(name.strip_suffix(" FC").unwrap_or(name).to_string())
        }
        _ => Err(FeedError::Invalid("team without id or name".into())),
    }
}

fn parse_minute(raw: &Option<serde_json::Value>) -> Option<u8> {
    match raw.as_ref()? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|m| u8::try_from(m).ok()),
        serde_json::Value::String(s) => s.trim_end_matches('\'').parse().ok(),
        _ => None,
    }
}

fn convert_match(raw: RawMatch, catalog: &ClubCatalog) -> Result<MatchResult, FeedError> {
    let status = parse_status(&raw.status)?;
    let goals = raw.score.and_then(|s| s.full_time);
    let score = match goals {
        Some(RawGoals {
            home: Some(home),
            away: Some(away),
        }) => Some(Score { home, away }),
        _ => None,
    };
    if status == MatchStatus::Finished && score.is_none() {
        return Err(FeedError::Invalid(format!(
            "finished match {} has no full-time score",
            raw.id
        )));
    }

    Ok(MatchResult {
        id: raw.id,
        home: club_name(&raw.home_team, catalog)?,
        away: club_name(&raw.away_team, catalog)?,
        score,
        status,
        minute: if status.is_live() {
            parse_minute(&raw.minute)
        } else {
            None
        },
        kickoff: raw.utc_date,
    })
}

fn convert_matches(
    raw: MatchesResponse,
    catalog: &ClubCatalog,
) -> Result<Vec<MatchResult>, FeedError> {
    raw.matches
        .into_iter()
        .map(|m| convert_match(m, catalog))
        .collect()
}

fn convert_standings(
    raw: StandingsResponse,
    catalog: &ClubCatalog,
) -> Result<Vec<StandingRow>, FeedError> {
    let table = raw
        .standings
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::Invalid("standings response has no table".into()))?
        .table;

    table
        .into_iter()
        .map(|row| {
            Ok(StandingRow {
                position: row.position,
                club: club_name(&row.team, catalog)?,
                played: row.played_games,
                won: row.won,
                draw: row.draw,
                lost: row.lost,
                points: row.points,
                goals_for: row.goals_for,
                goals_against: row.goals_against,
            })
        })
        .collect()
}

fn convert_scorers(
    raw: ScorersResponse,
    catalog: &ClubCatalog,
) -> Result<Vec<Scorer>, FeedError> {
    raw.scorers
        .into_iter()
        .map(|s| {
            Ok(Scorer {
                name: s.player.name,
                club: club_name(&s.team, catalog)?,
                goals: s.goals.unwrap_or(0),
                assists: s.assists,
            })
        })
        .collect()
}

/// Append matches from `extra` whose ids are not yet present, then order
/// everything by kickoff.
fn merge_matches(mut base: Vec<MatchResult>, extra: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut seen: HashSet<u64> = base.iter().map(|m| m.id).collect();
    base.extend(extra.into_iter().filter(|m| seen.insert(m.id)));
    base.sort_by_key(|m| m.kickoff);
    base
}

/// Top up a thin date window with the current matchday's fixtures. A failed
/// or malformed matchday response leaves the window as it is.
fn top_up_with_round(
    window: Vec<MatchResult>,
    round: Result<MatchesResponse, FeedError>,
    catalog: &ClubCatalog,
) -> Vec<MatchResult> {
    match round.and_then(|raw| convert_matches(raw, catalog)) {
        Ok(extra) => merge_matches(window, extra),
        Err(e) => {
            warn!("Matchday fixtures unavailable, keeping {} windowed matches: {}", window.len(), e);
            window
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct FootballDataClient {
    http: reqwest::Client,
    base_url: String,
    competition_id: u32,
    api_key: Option<String>,
    lookahead_days: u32,
    min_matches: usize,
    catalog: ClubCatalog,
}

impl FootballDataClient {
    pub fn from_config(config: &Config, catalog: ClubCatalog) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.feed.timeout_secs))
            .build()?;
        Ok(FootballDataClient {
            http,
            base_url: config.feed.base_url.trim_end_matches('/').to_string(),
            competition_id: config.feed.competition_id,
            api_key: config.api_key().map(str::to_string),
            lookahead_days: config.feed.lookahead_days,
            min_matches: config.feed.min_matches,
            catalog,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET `{base}/competitions/{id}{path}` and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FeedError> {
        let key = self.api_key.as_deref().ok_or(FeedError::MissingApiKey)?;
        let url = format!(
            "{}/competitions/{}{}",
            self.base_url, self.competition_id, path
        );
        debug!("GET {} {:?}", url, query);

        let resp = self
            .http
            .get(&url)
            .header("X-Auth-Token", key)
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    async fn current_matchday(&self, fallback: u32) -> u32 {
        match self.get::<CompetitionResponse>("", &[]).await {
            Ok(CompetitionResponse {
                current_season:
                    Some(RawSeason {
                        current_matchday: Some(n),
                    }),
            }) => n,
            Ok(_) => fallback,
            Err(e) => {
                debug!("Could not read current matchday, using {}: {}", fallback, e);
                fallback
            }
        }
    }
}

#[async_trait]
impl FeedSource for FootballDataClient {
    async fn fetch_matches(
        &self,
        fallback_matchday: u32,
        today: NaiveDate,
    ) -> Result<Vec<MatchResult>, FeedError> {
        if self.api_key.is_none() {
            return Err(FeedError::MissingApiKey);
        }
        let matchday = self.current_matchday(fallback_matchday).await;

        let until = today + chrono::Duration::days(self.lookahead_days as i64);
        let window: MatchesResponse = self
            .get(
                "/matches",
                &[
                    ("dateFrom", today.format("%Y-%m-%d").to_string()),
                    ("dateTo", until.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;
        let matches = convert_matches(window, &self.catalog)?;

        if matches.len() < self.min_matches && matchday > 0 {
            let round = self
                .get("/matches", &[("matchday", matchday.to_string())])
                .await;
            return Ok(top_up_with_round(matches, round, &self.catalog));
        }
        Ok(matches)
    }

    async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FeedError> {
        let raw: StandingsResponse = self.get("/standings", &[]).await?;
        convert_standings(raw, &self.catalog)
    }

    async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FeedError> {
        let raw: ScorersResponse = self.get("/scorers", &[]).await?;
        convert_scorers(raw, &self.catalog)
    }
}
