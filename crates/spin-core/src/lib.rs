pub mod catalog;
pub mod config;
pub mod duration;
pub mod error;
pub mod platform;
pub mod playback;
