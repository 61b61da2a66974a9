// Weekly scoring: points from finished results, underdog bonus, team value.

use tracing::{debug, info};

use crate::club::ClubCatalog;
use crate::draft::GameState;
use crate::fixture::MatchResult;
use crate::participant::{Participant, UNDERDOG_VICTORY};

/// Points for a win.
pub const WIN_POINTS: i64 = 3;

/// Extra points when a club beats an opponent worth at least
/// `UNDERDOG_VALUE_RATIO` times its own value.
pub const UNDERDOG_BONUS: i64 = 5;
pub const UNDERDOG_VALUE_RATIO: u32 = 2;

/// How one finished result contributed to a participant's week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub club: String,
    pub opponent: String,
    pub goals_for: u32,
    pub goals_against: u32,
    pub win_points: i64,
    /// Negative or zero: one point lost per two goals conceded.
    pub conceded_penalty: i64,
    pub underdog_bonus: i64,
}

impl ScoreLine {
    pub fn won(&self) -> bool {
        self.goals_for > self.goals_against
    }

    pub fn total(&self) -> i64 {
        self.win_points + self.goals_for as i64 + self.conceded_penalty + self.underdog_bonus
    }
}

/// Line items for every finished result involving one of the participant's
/// clubs, in roster order then result order. Pure.
pub fn club_score_breakdown(
    participant: &Participant,
    results: &[MatchResult],
    catalog: &ClubCatalog,
) -> Vec<ScoreLine> {
    let mut lines = Vec::new();
    for club in &participant.teams {
        for result in results.iter().filter(|r| r.is_finished()) {
            let Some(side) = result.side(club) else {
                continue;
            };
            let won = side.goals_for > side.goals_against;

            // Either value missing from the catalog disables the bonus.
            let underdog = won
                && match (catalog.value_of(club), catalog.value_of(side.opponent)) {
                    (Some(own), Some(opp)) => opp >= own.saturating_mul(UNDERDOG_VALUE_RATIO),
                    _ => false,
                };

            lines.push(ScoreLine {
                club: club.clone(),
                opponent: side.opponent.to_string(),
                goals_for: side.goals_for,
                goals_against: side.goals_against,
                win_points: if won { WIN_POINTS } else { 0 },
                conceded_penalty: -((side.goals_against / 2) as i64),
                underdog_bonus: if underdog { UNDERDOG_BONUS } else { 0 },
            });
        }
    }
    lines
}

/// Recompute a participant's weekly delta from `results`.
///
/// Overwrites `weekly_points` (never accumulates) and awards
/// "Underdog Victory" on any underdog win. The cumulative score is left to
/// the caller.
pub fn compute_weekly_score(
    participant: &mut Participant,
    results: &[MatchResult],
    catalog: &ClubCatalog,
) -> i64 {
    let lines = club_score_breakdown(participant, results, catalog);
    let total: i64 = lines.iter().map(ScoreLine::total).sum();

    if lines.iter().any(|l| l.underdog_bonus > 0) && participant.award(UNDERDOG_VICTORY) {
        info!("{} earned {}", participant.name, UNDERDOG_VICTORY);
    }

    debug!(
        "{}: {} points from {} results",
        participant.name,
        total,
        lines.len()
    );
    participant.weekly_points = total;
    total
}

/// Score every participant and add the delta to their cumulative score.
/// Returns `(participant id, delta)` pairs in participant order.
pub fn apply_weekly_scores(
    state: &mut GameState,
    results: &[MatchResult],
    catalog: &ClubCatalog,
) -> Vec<(u32, i64)> {
    let mut deltas = Vec::with_capacity(state.participants.len());
    for participant in state.participants.iter_mut() {
        let delta = compute_weekly_score(participant, results, catalog);
        participant.score += delta;
        deltas.push((participant.id, delta));
    }
    info!(
        "Applied week {} scores: {:?}",
        state.current_week, deltas
    );
    deltas
}

/// Sum of market values of the participant's clubs. Unknown clubs count 0.
pub fn compute_team_value(participant: &Participant, catalog: &ClubCatalog) -> u32 {
    participant
        .teams
        .iter()
        .filter_map(|club| catalog.value_of(club))
        .sum()
}
