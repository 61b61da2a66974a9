// Placeholder data used when the live feed is unavailable, plus the
// simulated match clock and gameweek generator.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use matchday_core::club::ClubCatalog;
use matchday_core::fixture::{MatchResult, MatchStatus, Score};
use matchday_core::participant::{default_participants, Participant, PROMOTED_TEAM_SUPPORT};

use super::types::{Scorer, StandingRow};
use crate::season::SeasonCalendar;

const LIVE_MATCHES: u64 = 2;
const SCHEDULED_MATCHES: u64 = 4;

/// Ten well-known forwards for the placeholder scorer chart.
const SAMPLE_SCORERS: [(&str, &str); 10] = [
    ("Erling Haaland", "Manchester City"),
    ("Mohamed Salah", "Liverpool"),
    ("Cole Palmer", "Chelsea"),
    ("Ollie Watkins", "Aston Villa"),
    ("Alexander Isak", "Newcastle United"),
    ("Bukayo Saka", "Arsenal"),
    ("Ivan Toney", "Brentford"),
    ("Jamie Vardy", "Leicester City"),
    ("Heung-min Son", "Tottenham Hotspur"),
    ("Dominik Szoboszlai", "Liverpool"),
];

/// Two distinct club names picked at random.
fn random_pairing<R: Rng + ?Sized>(catalog: &ClubCatalog, rng: &mut R) -> Option<(String, String)> {
    let clubs = catalog.clubs();
    if clubs.len() < 2 {
        return None;
    }
    let home = rng.gen_range(0..clubs.len());
    let mut away = rng.gen_range(0..clubs.len() - 1);
    if away >= home {
        away += 1;
    }
    Some((clubs[home].name.clone(), clubs[away].name.clone()))
}

/// Two in-play and four upcoming fixtures. Empty before the season starts.
pub fn placeholder_matches<R: Rng + ?Sized>(
    catalog: &ClubCatalog,
    season: &SeasonCalendar,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<MatchResult> {
    if !season.is_started(now.date_naive()) {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for id in 0..LIVE_MATCHES + SCHEDULED_MATCHES {
        let Some((home, away)) = random_pairing(catalog, rng) else {
            break;
        };
        let live = id < LIVE_MATCHES;
        let m = if live {
            MatchResult {
                id,
                home,
                away,
                score: Some(Score {
                    home: rng.gen_range(0..3),
                    away: rng.gen_range(0..3),
                }),
                status: MatchStatus::InPlay,
                minute: Some(rng.gen_range(1..=90)),
                kickoff: now - Duration::seconds(rng.gen_range(0..3600)),
            }
        } else {
            MatchResult {
                id,
                home,
                away,
                score: None,
                status: MatchStatus::Scheduled,
                minute: None,
                kickoff: now + Duration::seconds(rng.gen_range(0..48 * 3600)),
            }
        };
        matches.push(m);
    }
    matches
}

/// League table in catalog order with plausible random figures.
pub fn placeholder_standings<R: Rng + ?Sized>(
    catalog: &ClubCatalog,
    rng: &mut R,
) -> Vec<StandingRow> {
    catalog
        .iter()
        .enumerate()
        .map(|(i, club)| StandingRow {
            position: i as u32 + 1,
            club: club.name.clone(),
            points: (60 - 2 * i as i64).max(0) as u32 + rng.gen_range(0..8),
            played: 20 + rng.gen_range(0..5),
            won: 10 + rng.gen_range(0..8),
            draw: 3 + rng.gen_range(0..5),
            lost: 2 + rng.gen_range(0..7),
            goals_for: 25 + rng.gen_range(0..20),
            goals_against: 15 + rng.gen_range(0..15),
        })
        .collect()
}

/// Scorer chart with roughly descending goal counts.
pub fn placeholder_scorers<R: Rng + ?Sized>(rng: &mut R) -> Vec<Scorer> {
    SAMPLE_SCORERS
        .iter()
        .enumerate()
        .map(|(i, (name, club))| Scorer {
            name: name.to_string(),
            club: club.to_string(),
            goals: (8 - (i / 2) as i64 + rng.gen_range(0..4)).max(1) as u32,
            assists: None,
        })
        .collect()
}

/// Advance every in-play match by one simulated minute.
///
/// Each live match has a 10% chance of a goal (either side equally). Past
/// the 90th minute a match finishes with 20% probability per tick.
/// Returns how many matches finished on this tick.
pub fn advance_live_matches<R: Rng + ?Sized>(matches: &mut [MatchResult], rng: &mut R) -> usize {
    let mut finished = 0;
    for m in matches.iter_mut().filter(|m| m.status == MatchStatus::InPlay) {
        let score = m.score.get_or_insert(Score { home: 0, away: 0 });
        if rng.gen_bool(0.1) {
            if rng.gen_bool(0.5) {
                score.home += 1;
            } else {
                score.away += 1;
            }
        }

        let minute = m.minute.unwrap_or(0);
        if minute < 90 {
            m.minute = Some(minute + 1);
        } else if rng.gen_bool(0.2) {
            m.status = MatchStatus::Finished;
            m.minute = None;
            finished += 1;
        }
    }
    finished
}

/// A full simulated round: every club plays once, scores 0-3 at home and
/// 0-2 away. Fixture ids start at `first_id`.
pub fn simulate_gameweek<R: Rng + ?Sized>(
    catalog: &ClubCatalog,
    first_id: u64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<MatchResult> {
    let mut names: Vec<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
    names.shuffle(rng);

    names
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| MatchResult {
            id: first_id + i as u64,
            home: pair[0].to_string(),
            away: pair[1].to_string(),
            score: Some(Score {
                home: rng.gen_range(0..4),
                away: rng.gen_range(0..3),
            }),
            status: MatchStatus::Finished,
            minute: None,
            kickoff: now,
        })
        .collect()
}

/// The demo draft shown on a first run without saved data or a live feed.
/// Once the season has started it also carries demo scores.
pub fn sample_rosters(season_started: bool) -> Vec<Participant> {
    let rosters: [(&[&str], i64, i64); 4] = [
        (
            &["Manchester City", "Arsenal", "Brighton & Hove Albion", "Fulham", "Brentford"],
            45,
            12,
        ),
        (
            &["Liverpool", "Chelsea", "Aston Villa", "Crystal Palace", "Wolverhampton Wanderers"],
            38,
            8,
        ),
        (
            &["Manchester United", "Tottenham Hotspur", "West Ham United", "AFC Bournemouth", "Everton"],
            32,
            15,
        ),
        (
            &["Newcastle United", "Nottingham Forest", "Leeds United", "Burnley", "Sheffield United"],
            28,
            6,
        ),
    ];

    let mut participants = default_participants();
    for (p, (teams, score, weekly)) in participants.iter_mut().zip(rosters) {
        p.teams = teams.iter().map(|t| t.to_string()).collect();
        if season_started {
            p.score = score;
            p.weekly_points = weekly;
        }
    }
    if season_started {
        if let Some(phil) = participants.get_mut(3) {
            phil.award(PROMOTED_TEAM_SUPPORT);
        }
    }
    participants
}
