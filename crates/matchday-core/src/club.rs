// Club reference data: the 20-club Premier League catalog.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A Premier League club available for drafting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Unique club name (the draft key).
    pub name: String,
    /// Market value in millions of euros.
    pub value: u32,
    /// Projected finishing position (1 = champion).
    pub expected_position: u8,
    /// Whether the club was promoted into the division this season.
    #[serde(default)]
    pub promoted: bool,
    /// football-data.org team identifier.
    #[serde(default)]
    pub feed_id: u32,
    /// Three-letter display code (e.g. "MCI").
    #[serde(default)]
    pub short_code: String,
}

impl Club {
    fn new(
        name: &str,
        value: u32,
        expected_position: u8,
        feed_id: u32,
        short_code: &str,
        promoted: bool,
    ) -> Self {
        Club {
            name: name.to_string(),
            value,
            expected_position,
            promoted,
            feed_id,
            short_code: short_code.to_string(),
        }
    }
}

/// Ordered, read-only lookup table of clubs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubCatalog {
    clubs: Vec<Club>,
}

impl Default for ClubCatalog {
    fn default() -> Self {
        Self::premier_league()
    }
}

impl ClubCatalog {
    /// Build a catalog from an explicit list. Later duplicates of a name are
    /// dropped so lookups stay unambiguous.
    pub fn new(clubs: Vec<Club>) -> Self {
        let mut unique: Vec<Club> = Vec::with_capacity(clubs.len());
        for club in clubs {
            if unique.iter().any(|c| c.name == club.name) {
                warn!("Duplicate club '{}' in catalog, ignoring", club.name);
                continue;
            }
            unique.push(club);
        }
        ClubCatalog { clubs: unique }
    }

    /// The projected 2025-26 Premier League, in expected-finish order.
    pub fn premier_league() -> Self {
        ClubCatalog::new(vec![
            Club::new("Manchester City", 1000, 1, 65, "MCI", false),
            Club::new("Arsenal", 950, 2, 57, "ARS", false),
            Club::new("Liverpool", 920, 3, 64, "LIV", false),
            Club::new("Chelsea", 850, 4, 61, "CHE", false),
            Club::new("Tottenham Hotspur", 750, 5, 73, "TOT", false),
            Club::new("Manchester United", 700, 6, 66, "MUN", false),
            Club::new("Newcastle United", 650, 7, 67, "NEW", false),
            Club::new("Aston Villa", 600, 8, 58, "AVL", false),
            Club::new("Brighton & Hove Albion", 520, 9, 397, "BHA", false),
            Club::new("West Ham United", 450, 10, 563, "WHU", false),
            Club::new("Crystal Palace", 400, 11, 354, "CRY", false),
            Club::new("Fulham", 420, 12, 63, "FUL", false),
            Club::new("Wolverhampton Wanderers", 350, 13, 76, "WOL", false),
            Club::new("Everton", 320, 14, 62, "EVE", false),
            Club::new("Brentford", 380, 15, 402, "BRE", false),
            Club::new("Nottingham Forest", 300, 16, 351, "NFO", false),
            Club::new("AFC Bournemouth", 320, 17, 1044, "BOU", false),
            Club::new("Leeds United", 280, 18, 341, "LEE", true),
            Club::new("Burnley", 250, 19, 328, "BUR", true),
            Club::new("Sheffield United", 240, 20, 356, "SHU", true),
        ])
    }

    /// Look up a club by exact name.
    pub fn get(&self, name: &str) -> Option<&Club> {
        self.clubs.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Market value of a club, or `None` when the name is unknown.
    pub fn value_of(&self, name: &str) -> Option<u32> {
        self.get(name).map(|c| c.value)
    }

    /// Three-letter code for a club name. Names outside the catalog fall back
    /// to their first three characters, upper-cased.
    pub fn abbreviation(&self, name: &str) -> String {
        match self.get(name) {
            Some(club) if !club.short_code.is_empty() => club.short_code.clone(),
            _ => name.chars().take(3).collect::<String>().to_uppercase(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Club> {
        self.clubs.iter()
    }

    pub fn clubs(&self) -> &[Club] {
        &self.clubs
    }

    pub fn len(&self) -> usize {
        self.clubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CSV override
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read club file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("club catalog is empty")]
    Empty,
}

/// One CSV row: `name,value,expected_position,promoted,feed_id,short_code`.
#[derive(Debug, Deserialize)]
struct RawClubRow {
    name: String,
    value: u32,
    expected_position: u8,
    #[serde(default)]
    promoted: bool,
    #[serde(default)]
    feed_id: u32,
    #[serde(default)]
    short_code: String,
}

/// Load a catalog from a CSV file with a header row.
pub fn load_catalog_csv(path: &Path) -> Result<ClubCatalog, CatalogError> {
    let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_catalog_from_reader(file, &path.display().to_string())
}

/// Load a catalog from any reader. `label` is only used in error messages.
pub fn load_catalog_from_reader<R: Read>(
    reader: R,
    label: &str,
) -> Result<ClubCatalog, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut clubs = Vec::new();
    for row in rdr.deserialize::<RawClubRow>() {
        let row = row.map_err(|e| CatalogError::Csv {
            path: label.to_string(),
            source: e,
        })?;
        clubs.push(Club {
            name: row.name,
            value: row.value,
            expected_position: row.expected_position,
            promoted: row.promoted,
            feed_id: row.feed_id,
            short_code: row.short_code,
        });
    }

    if clubs.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(ClubCatalog::new(clubs))
}
