pub mod app;
pub mod artwork;
pub mod config;
pub mod display;
pub mod playback;
pub mod scroll;
pub mod ui;
pub mod vinyl;
