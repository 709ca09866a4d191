//! Exploration and clean-up of the Spotify top-hits dataset.

pub mod config;
pub mod data;
pub mod error;
