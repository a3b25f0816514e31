// Library for tests to access modules

pub mod config;
pub mod detector;
pub mod error;
pub mod format;
pub mod history;
pub mod models;
pub mod monitor;
pub mod race;
pub mod sources;
pub mod threshold;
pub mod version;
