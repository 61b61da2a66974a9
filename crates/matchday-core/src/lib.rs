// Library root: the draft and scoring engine. No I/O beyond snapshot files
// and the optional club CSV.

pub mod club;
pub mod draft;
pub mod fixture;
pub mod participant;
pub mod scoring;
pub mod snapshot;

pub use club::{Club, ClubCatalog};
pub use draft::{DraftError, DraftOutcome, GameState};
pub use fixture::{MatchResult, MatchStatus, Score};
pub use participant::Participant;
pub use snapshot::{ImportReport, Snapshot, SnapshotError};
