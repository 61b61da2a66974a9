// Library root: the application layer between the scoring engine and the
// terminal UI.

pub mod app;
pub mod config;
pub mod db;
pub mod feed;
pub mod protocol;
pub mod season;
