pub mod config;
pub mod measurement;
pub mod profile;
pub mod recommendation;
pub mod report;
