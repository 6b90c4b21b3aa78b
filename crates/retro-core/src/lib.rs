//! Station directory core for retro-radio.
//!
//! Everything here is independent of the terminal and of the audio engine:
//! the UI crate drives these types and renders their results.

pub mod config;
pub mod directory;
pub mod favorites;
pub mod mirror;
pub mod model;
pub mod platform;
pub mod playback;
pub mod prefs;
pub mod query;
pub mod search;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
