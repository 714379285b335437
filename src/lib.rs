//! # Precis
//!
//! Extractive webpage summaries with read-aloud playback, search highlighting
//! and plain-text export.
//!
//! ## Features
//!
//! - **Extractive summaries**: first, middle and last sentences plus random
//!   filler up to a word floor, reproducible with a fixed seed
//! - **Read aloud**: pause, resume and fast forward over a system speech program
//! - **Remote variant**: hand the page text to an external `/summarize` service

pub mod config;
pub mod export;
pub mod logging;
pub mod playback;
pub mod remote;
pub mod scraper;
pub mod search;
pub mod speech;
pub mod summary;
pub mod ui;

pub use config::Config;
pub use playback::{Playback, PlaybackState};
pub use summary::{Summarizer, Summary};
