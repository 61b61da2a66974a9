// Season calendar: gameweek arithmetic relative to the configured start date.

use chrono::NaiveDate;

use crate::config::SeasonConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCalendar {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<&SeasonConfig> for SeasonCalendar {
    fn from(cfg: &SeasonConfig) -> Self {
        SeasonCalendar {
            name: cfg.name.clone(),
            start: cfg.start,
            end: cfg.end,
        }
    }
}

impl SeasonCalendar {
    pub fn is_started(&self, today: NaiveDate) -> bool {
        today >= self.start
    }

    /// Gameweek for `today`: 0 before the season, then one week per seven
    /// days starting at 1. Dates after the season end count as the last week.
    pub fn current_gameweek(&self, today: NaiveDate) -> u32 {
        if !self.is_started(today) {
            return 0;
        }
        let days = (today.min(self.end) - self.start).num_days();
        (days / 7 + 1).max(1) as u32
    }

    /// Whole days until kick-off, 0 once the season has started.
    pub fn days_until_start(&self, today: NaiveDate) -> i64 {
        (self.start - today).num_days().max(0)
    }
}
